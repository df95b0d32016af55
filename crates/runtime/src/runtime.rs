//! Event correlator and state-machine runtime.

use std::marker::PhantomData;

use chrono::Utc;
use saga_store::{InstanceRecord, SagaStore, SaveOptions};
use workflow::{Applied, Workflow, WorkflowCommand, WorkflowEvent, WorkflowState};

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::publisher::CommandPublisher;

/// Why an event was absorbed without touching the instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Non-initiating event with no instance to route to.
    Unroutable,

    /// No transition registered for `(current state, event type)` —
    /// duplicate or late delivery.
    NoTransition,

    /// The instance already reached a terminal state.
    TerminalState,

    /// Rows exist for `(state, event type)` but no guard matched.
    UndefinedBranch,

    /// Step-failure report for a stage the instance is not currently
    /// waiting on — a late redelivery for work that already resolved.
    StaleFailure,
}

/// What the runtime did with one event.
pub enum Disposition<W: Workflow> {
    /// A transition was accepted and persisted; the listed commands
    /// were handed to the publisher afterwards.
    Transitioned {
        from: W::State,
        to: W::State,
        commands: Vec<W::Command>,
    },

    /// A step-executor failure was recorded; the instance stays in its
    /// state and the transport's redelivery re-drives the stage.
    RetryPending { stage: String, retry_count: u32 },

    /// The stage kept failing past the retry budget; the instance was
    /// moved to the workflow's failure state.
    Abandoned { stage: String, reason: String },

    /// The event was absorbed as a no-op.
    Ignored(IgnoreReason),
}

impl<W: Workflow> std::fmt::Debug for Disposition<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Disposition::Transitioned { from, to, commands } => f
                .debug_struct("Transitioned")
                .field("from", from)
                .field("to", to)
                .field("commands", &commands.len())
                .finish(),
            Disposition::RetryPending { stage, retry_count } => f
                .debug_struct("RetryPending")
                .field("stage", stage)
                .field("retry_count", retry_count)
                .finish(),
            Disposition::Abandoned { stage, reason } => f
                .debug_struct("Abandoned")
                .field("stage", stage)
                .field("reason", reason)
                .finish(),
            Disposition::Ignored(reason) => f.debug_tuple("Ignored").field(reason).finish(),
        }
    }
}

/// Drives one workflow definition over a saga store and a command
/// publisher.
///
/// `handle_event` correlates the event to its instance by
/// `(workflow type, correlation id)`, evaluates the transition table,
/// persists the outcome with compare-and-swap, and only then publishes
/// the emitted commands. A persistence conflict causes a bounded
/// reload-and-re-evaluate loop, so the per-correlation-id single-writer
/// discipline holds without any cross-instance coordination.
pub struct WorkflowRuntime<W, S, P>
where
    W: Workflow,
    S: SagaStore,
    P: CommandPublisher<W::Command>,
{
    store: S,
    publisher: P,
    config: RuntimeConfig,
    _workflow: PhantomData<W>,
}

impl<W, S, P> WorkflowRuntime<W, S, P>
where
    W: Workflow,
    S: SagaStore,
    P: CommandPublisher<W::Command>,
{
    /// Creates a runtime with the default configuration.
    pub fn new(store: S, publisher: P) -> Self {
        Self::with_config(store, publisher, RuntimeConfig::default())
    }

    /// Creates a runtime with an explicit configuration.
    pub fn with_config(store: S, publisher: P, config: RuntimeConfig) -> Self {
        Self {
            store,
            publisher,
            config,
            _workflow: PhantomData,
        }
    }

    /// Handles one inbound event.
    ///
    /// Infrastructure trouble is the only `Err`; business failures,
    /// duplicates, and unroutable events come back as dispositions.
    #[tracing::instrument(
        skip(self, event),
        fields(
            workflow_type = W::workflow_type(),
            event_type = event.event_type(),
            correlation_id = %event.correlation_id(),
        )
    )]
    pub async fn handle_event(&self, event: W::Event) -> Result<Disposition<W>> {
        metrics::counter!("saga_events_received_total").increment(1);
        let started = std::time::Instant::now();
        let correlation_id = event.correlation_id();

        let mut attempts = 0u32;
        let disposition = loop {
            attempts += 1;
            match self.process_once(&event).await {
                Ok(disposition) => break disposition,
                Err(RuntimeError::Store(store_err)) if store_err.is_conflict() => {
                    if attempts >= self.config.max_save_attempts {
                        metrics::counter!("saga_conflicts_exhausted_total").increment(1);
                        return Err(RuntimeError::ConflictRetriesExhausted {
                            workflow_type: W::workflow_type(),
                            correlation_id,
                            attempts,
                        });
                    }
                    tracing::debug!(attempts, "save conflict, reloading instance");
                }
                Err(other) => return Err(other),
            }
        };

        metrics::histogram!("saga_transition_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        Ok(disposition)
    }

    /// One load-evaluate-save round. Conflict errors bubble up to the
    /// retry loop in `handle_event`.
    async fn process_once(&self, event: &W::Event) -> Result<Disposition<W>> {
        let correlation_id = event.correlation_id();

        match self.store.load(W::workflow_type(), correlation_id).await? {
            Some(record) => self.advance(record, event).await,
            None if event.is_initiating() => self.initiate(event).await,
            None => {
                tracing::warn!("unroutable event, no instance to deliver to");
                metrics::counter!("saga_events_unroutable_total").increment(1);
                Ok(Disposition::Ignored(IgnoreReason::Unroutable))
            }
        }
    }

    /// Creates the instance for an initiating event and applies the
    /// event's own transition from the initial state, as one save.
    async fn initiate(&self, event: &W::Event) -> Result<Disposition<W>> {
        let initial = W::initial_state();
        let data = W::Data::default();

        match W::table().apply(initial, &data, event) {
            Applied::Transitioned {
                next,
                data,
                commands,
            } => {
                let mut record = InstanceRecord::new(
                    W::workflow_type(),
                    event.correlation_id(),
                    initial.as_str(),
                    serde_json::to_value(&data)?,
                );
                record.enter_state(next.as_str());

                self.store.save(record, SaveOptions::expect_new()).await?;
                metrics::counter!("saga_instances_created").increment(1);
                tracing::info!(
                    from = initial.as_str(),
                    to = next.as_str(),
                    "saga instance created"
                );

                self.dispatch(&commands).await?;
                Ok(Disposition::Transitioned {
                    from: initial,
                    to: next,
                    commands,
                })
            }
            // The initiating event must match a row out of the initial
            // state; a definition where it doesn't gets no instance.
            Applied::Ignored => {
                tracing::warn!("initiating event has no transition from the initial state");
                Ok(Disposition::Ignored(IgnoreReason::NoTransition))
            }
            Applied::Undefined => {
                tracing::warn!("no guard matched for initiating event");
                metrics::counter!("saga_undefined_branches_total").increment(1);
                Ok(Disposition::Ignored(IgnoreReason::UndefinedBranch))
            }
        }
    }

    /// Evaluates one event against an existing instance.
    async fn advance(&self, record: InstanceRecord, event: &W::Event) -> Result<Disposition<W>> {
        let state = W::State::parse(&record.current_state).ok_or_else(|| {
            RuntimeError::CorruptState {
                workflow_type: W::workflow_type(),
                correlation_id: record.correlation_id,
                state: record.current_state.clone(),
            }
        })?;

        // Terminal states are absorbing; redelivered history is expected
        // under at-least-once transport semantics.
        if state.is_terminal() {
            tracing::debug!(state = state.as_str(), "event absorbed by terminal instance");
            metrics::counter!("saga_events_ignored_total").increment(1);
            return Ok(Disposition::Ignored(IgnoreReason::TerminalState));
        }

        if let Some((stage, reason)) = event.executor_failure() {
            let stage = stage.to_string();
            let reason = reason.to_string();
            return self.record_step_failure(record, state, stage, reason).await;
        }

        let data: W::Data = serde_json::from_value(record.data.clone())?;

        match W::table().apply(state, &data, event) {
            Applied::Transitioned {
                next,
                data,
                commands,
            } => {
                let expected = record.version;
                let mut record = record;
                record.data = serde_json::to_value(&data)?;
                record.enter_state(next.as_str());
                record.bump_version();

                self.store
                    .save(record, SaveOptions::expect_version(expected))
                    .await?;
                metrics::counter!("saga_transitions_total").increment(1);
                tracing::info!(
                    from = state.as_str(),
                    to = next.as_str(),
                    "transition applied"
                );

                self.dispatch(&commands).await?;
                Ok(Disposition::Transitioned {
                    from: state,
                    to: next,
                    commands,
                })
            }
            Applied::Ignored => {
                tracing::debug!(
                    state = state.as_str(),
                    "no transition registered, event absorbed"
                );
                metrics::counter!("saga_events_ignored_total").increment(1);
                Ok(Disposition::Ignored(IgnoreReason::NoTransition))
            }
            Applied::Undefined => {
                tracing::warn!(
                    state = state.as_str(),
                    "no guard matched, instance left unchanged"
                );
                metrics::counter!("saga_undefined_branches_total").increment(1);
                Ok(Disposition::Ignored(IgnoreReason::UndefinedBranch))
            }
        }
    }

    /// Applies the bounded-retry policy to a step-executor failure
    /// report: count it, and abandon the instance to the workflow's
    /// failure state once the budget is spent.
    ///
    /// Only reports for the stage the instance is currently waiting on
    /// count; anything else is a redelivered report for a stage that
    /// has since succeeded and must not drain the current allowance.
    async fn record_step_failure(
        &self,
        mut record: InstanceRecord,
        state: W::State,
        stage: String,
        reason: String,
    ) -> Result<Disposition<W>> {
        let pending = W::pending_stage(state);
        if pending != Some(stage.as_str()) {
            tracing::debug!(
                %stage,
                pending = pending.unwrap_or("none"),
                state = state.as_str(),
                "failure report for a stage the instance is not waiting on, absorbed"
            );
            metrics::counter!("saga_events_ignored_total").increment(1);
            return Ok(Disposition::Ignored(IgnoreReason::StaleFailure));
        }

        let expected = record.version;
        record.retry_count += 1;
        let retry_count = record.retry_count;

        if retry_count < self.config.max_step_retries {
            record.updated_at = Utc::now();
            record.bump_version();
            self.store
                .save(record, SaveOptions::expect_version(expected))
                .await?;
            metrics::counter!("saga_step_failures_total").increment(1);
            tracing::warn!(
                %stage,
                %reason,
                retry_count,
                "step failure recorded, awaiting redelivery"
            );
            Ok(Disposition::RetryPending { stage, retry_count })
        } else {
            let failure = W::failure_state();
            record.enter_state(failure.as_str());
            record.retry_count = retry_count;
            record.failure_reason = Some(reason.clone());
            record.bump_version();
            self.store
                .save(record, SaveOptions::expect_version(expected))
                .await?;
            metrics::counter!("saga_retries_exhausted_total").increment(1);
            tracing::warn!(
                %stage,
                %reason,
                from = state.as_str(),
                to = failure.as_str(),
                "retry budget exhausted, instance abandoned"
            );
            Ok(Disposition::Abandoned { stage, reason })
        }
    }

    /// Publishes the commands of a persisted transition, in order.
    async fn dispatch(&self, commands: &[W::Command]) -> Result<()> {
        for command in commands {
            tracing::debug!(command_type = command.command_type(), "publishing command");
            self.publisher.publish(command.clone()).await?;
            metrics::counter!("saga_commands_published_total").increment(1);
        }
        Ok(())
    }
}
