//! Command publisher trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;

/// Error handed back by a publisher when the transport rejects a command.
#[derive(Debug, Error)]
#[error("Transport rejected command: {0}")]
pub struct PublishError(pub String);

/// Delivers outbound commands to the message transport.
///
/// The runtime never calls a step-executor directly; it publishes
/// commands here after the transition is persisted and relies on the
/// transport's at-least-once delivery from that point on.
#[async_trait]
pub trait CommandPublisher<C: Send + Sync + 'static>: Send + Sync {
    /// Publishes one command.
    async fn publish(&self, command: C) -> Result<(), PublishError>;
}

#[derive(Debug)]
struct InMemoryPublisherState<C> {
    published: Vec<C>,
    fail_on_publish: bool,
}

impl<C> Default for InMemoryPublisherState<C> {
    fn default() -> Self {
        Self {
            published: Vec::new(),
            fail_on_publish: false,
        }
    }
}

/// In-memory publisher for testing.
///
/// Records every published command and can be told to fail, standing in
/// for a transport outage.
#[derive(Debug, Clone)]
pub struct InMemoryPublisher<C> {
    state: Arc<RwLock<InMemoryPublisherState<C>>>,
}

impl<C> Default for InMemoryPublisher<C> {
    fn default() -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryPublisherState::default())),
        }
    }
}

impl<C: Clone> InMemoryPublisher<C> {
    /// Creates a new in-memory publisher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the publisher to reject the next publish calls.
    pub fn set_fail_on_publish(&self, fail: bool) {
        self.state.write().unwrap().fail_on_publish = fail;
    }

    /// Returns all commands published so far.
    pub fn published(&self) -> Vec<C> {
        self.state.read().unwrap().published.clone()
    }

    /// Returns the number of commands published so far.
    pub fn published_count(&self) -> usize {
        self.state.read().unwrap().published.len()
    }

    /// Clears the recorded commands.
    pub fn clear(&self) {
        self.state.write().unwrap().published.clear();
    }
}

#[async_trait]
impl<C: Clone + Send + Sync + 'static> CommandPublisher<C> for InMemoryPublisher<C> {
    async fn publish(&self, command: C) -> Result<(), PublishError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_publish {
            return Err(PublishError("transport unavailable".to_string()));
        }

        state.published.push(command);
        Ok(())
    }
}
