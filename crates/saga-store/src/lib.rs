//! Saga instance store.
//!
//! A saga instance is the persisted record of one in-flight workflow:
//! its current state, accumulated business data, and audit fields. The
//! store is the only mutable shared resource in the orchestration core;
//! every mutation goes through an optimistic-concurrency `save` so two
//! concurrent writers for the same instance can never both win.

pub mod error;
pub mod instance;
pub mod memory;
pub mod postgres;
pub mod store;
pub mod version;

pub use common::CorrelationId;
pub use error::{Result, StoreError};
pub use instance::InstanceRecord;
pub use memory::InMemorySagaStore;
pub use postgres::PostgresSagaStore;
pub use store::{SagaStore, SaveOptions};
pub use version::Version;
