//! Runtime configuration loaded from environment variables.

/// Bounds for the runtime's two retry loops, with sensible defaults.
///
/// Reads from environment variables:
/// - `SAGA_MAX_STEP_RETRIES` — executor failures tolerated per stage
///   before the instance is abandoned to its failure state (default: `3`)
/// - `SAGA_MAX_SAVE_ATTEMPTS` — reload-and-retry rounds on a
///   persistence conflict before giving up on the message (default: `3`)
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub max_step_retries: u32,
    pub max_save_attempts: u32,
}

impl RuntimeConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            max_step_retries: std::env::var("SAGA_MAX_STEP_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            max_save_attempts: std::env::var("SAGA_MAX_SAVE_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_step_retries: 3,
            max_save_attempts: 3,
        }
    }
}
