//! Core state-machine traits and the explicit transition table.

use common::CorrelationId;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Trait for workflow state enums.
///
/// States are small `Copy` enums; the string form is what gets
/// persisted in the instance store.
pub trait WorkflowState:
    Copy + PartialEq + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static
{
    /// Returns the state name as a string.
    fn as_str(&self) -> &'static str;

    /// Parses a persisted state tag back into the enum.
    fn parse(s: &str) -> Option<Self>;

    /// Returns true if this is a terminal state (absorbing; no outgoing
    /// transitions under normal operation).
    fn is_terminal(&self) -> bool;

    /// Returns false for declared-but-non-addressable intermediates.
    ///
    /// The original design chained compound transitions
    /// (`A` then immediately `B` within one handler); those chains are
    /// collapsed to their final target, so the intermediate states are
    /// never persisted and no transition may target them.
    fn is_addressable(&self) -> bool {
        true
    }

    /// All declared states, in graph order.
    fn all() -> &'static [Self];
}

/// Trait for workflow event enums.
///
/// Events flow step-executor → runtime (or external trigger → runtime
/// for initiating events) and carry the business correlation id.
pub trait WorkflowEvent:
    Serialize + DeserializeOwned + Clone + std::fmt::Debug + Send + Sync + 'static
{
    /// Returns the event type tag used for transition lookup.
    fn event_type(&self) -> &'static str;

    /// Returns the correlation id this event belongs to.
    fn correlation_id(&self) -> CorrelationId;

    /// Returns true if this event may create a new saga instance.
    fn is_initiating(&self) -> bool {
        false
    }

    /// Returns `(stage, reason)` when this event reports a step-executor
    /// failure rather than a business outcome. Failure reports feed the
    /// bounded-retry policy instead of the transition table.
    fn executor_failure(&self) -> Option<(&str, &str)> {
        None
    }
}

/// Trait for workflow command enums.
///
/// Commands flow runtime → step-executor; each command type has exactly
/// one corresponding completion event type.
pub trait WorkflowCommand:
    Serialize + DeserializeOwned + Clone + std::fmt::Debug + Send + Sync + 'static
{
    /// Returns the command type tag.
    fn command_type(&self) -> &'static str;

    /// Returns the correlation id this command belongs to.
    fn correlation_id(&self) -> CorrelationId;
}

/// A workflow definition: states, events, commands, business data, and
/// the transition table tying them together.
pub trait Workflow: Sized + Send + Sync + 'static {
    /// The workflow's state enum.
    type State: WorkflowState;

    /// Inbound events (initiating trigger plus step-executor outcomes).
    type Event: WorkflowEvent;

    /// Outbound commands handed to step-executors.
    type Command: WorkflowCommand;

    /// Business data accumulated as the instance progresses.
    type Data: Clone + Default + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Stable workflow type tag (e.g. "ApplicationRequest").
    fn workflow_type() -> &'static str;

    /// The single initial state, entered only via the initiating event.
    fn initial_state() -> Self::State;

    /// The terminal state the bounded-retry policy abandons to when a
    /// stage keeps failing.
    fn failure_state() -> Self::State;

    /// The stage (command type) a step-executor is expected to be
    /// driving while the instance sits in `state`. None for states that
    /// wait on something other than a step-executor.
    ///
    /// Failure reports naming any other stage are late redeliveries for
    /// work that already resolved; they must not count against the
    /// current stage's retry allowance.
    fn pending_stage(state: Self::State) -> Option<&'static str>;

    /// The workflow's transition table.
    fn table() -> &'static TransitionTable<Self>;
}

/// Payload of a step-executor failure report.
///
/// Shared by all workflows: the executor names the stage it was driving
/// and why it gave up, and the runtime's bounded-retry policy takes it
/// from there.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StepFailure {
    /// Correlation id of the instance whose stage failed.
    pub correlation_id: CorrelationId,
    /// The stage (command type) that failed.
    pub stage: String,
    /// Error message reported by the executor.
    pub reason: String,
}

impl StepFailure {
    /// Creates a failure report.
    pub fn new(
        correlation_id: CorrelationId,
        stage: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            correlation_id,
            stage: stage.into(),
            reason: reason.into(),
        }
    }
}

/// Guard predicate over the incoming event and current business data.
pub type Guard<W> = fn(&<W as Workflow>::Event, &<W as Workflow>::Data) -> bool;

/// Pure mutation applied to business data on an accepted transition.
pub type Mutate<W> = fn(&<W as Workflow>::Event, &mut <W as Workflow>::Data);

/// Command emission for an accepted transition.
pub type Emit<W> = fn(&<W as Workflow>::Event, &<W as Workflow>::Data) -> Vec<<W as Workflow>::Command>;

/// One row of a transition table:
/// `(from, event tag) → {guard, mutate, next, emit}`.
///
/// Conditional outcomes are modeled as two rows with mutually exclusive
/// guards (e.g. `is_valid` / `!is_valid`), never as a guard "failure".
pub struct Transition<W: Workflow> {
    /// Source state.
    pub from: W::State,

    /// Event type tag that triggers this row.
    pub event_type: &'static str,

    /// Branch predicate; an unguarded row always matches.
    pub guard: Option<Guard<W>>,

    /// Business-data mutation.
    pub mutate: Mutate<W>,

    /// Target state.
    pub next: W::State,

    /// Commands published after the new state is persisted.
    pub emit: Emit<W>,
}

impl<W: Workflow> Transition<W> {
    /// Creates an unguarded row with no mutation and no emitted commands.
    pub fn new(from: W::State, event_type: &'static str, next: W::State) -> Self {
        Self {
            from,
            event_type,
            guard: None,
            mutate: |_, _| {},
            next,
            emit: |_, _| Vec::new(),
        }
    }

    /// Attaches a branch guard.
    pub fn when(mut self, guard: Guard<W>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Attaches a business-data mutation.
    pub fn mutating(mut self, mutate: Mutate<W>) -> Self {
        self.mutate = mutate;
        self
    }

    /// Attaches command emission.
    pub fn emitting(mut self, emit: Emit<W>) -> Self {
        self.emit = emit;
        self
    }
}

impl<W: Workflow> std::fmt::Debug for Transition<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("event_type", &self.event_type)
            .field("guarded", &self.guard.is_some())
            .field("next", &self.next)
            .finish()
    }
}

/// Result of a transition-table lookup.
pub enum Lookup<'a, W: Workflow> {
    /// Exactly one row matched (its guard, if any, is satisfied).
    Matched(&'a Transition<W>),

    /// No row is registered for `(state, event tag)` — the designed
    /// no-op for duplicate/late delivery.
    Unmatched,

    /// Rows are registered but no guard is satisfied. An undefined
    /// branch is a definition bug; the instance is left unchanged.
    UndefinedBranch,
}

impl<W: Workflow> std::fmt::Debug for Lookup<'_, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lookup::Matched(transition) => f.debug_tuple("Matched").field(transition).finish(),
            Lookup::Unmatched => write!(f, "Unmatched"),
            Lookup::UndefinedBranch => write!(f, "UndefinedBranch"),
        }
    }
}

/// Outcome of applying one event to `(state, data)` through the table.
pub enum Applied<W: Workflow> {
    /// The event was accepted: new state, new data, commands to publish.
    Transitioned {
        next: W::State,
        data: W::Data,
        commands: Vec<W::Command>,
    },

    /// The event was absorbed as a no-op (terminal state or no
    /// registered row).
    Ignored,

    /// Rows exist but no guard matched; the instance must stay unchanged.
    Undefined,
}

impl<W: Workflow> std::fmt::Debug for Applied<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Applied::Transitioned {
                next,
                data,
                commands,
            } => f
                .debug_struct("Transitioned")
                .field("next", next)
                .field("data", data)
                .field("commands", &commands.len())
                .finish(),
            Applied::Ignored => write!(f, "Ignored"),
            Applied::Undefined => write!(f, "Undefined"),
        }
    }
}

/// Errors detected when validating a workflow definition.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// A transition leaves a terminal state.
    #[error("Transition out of terminal state {state} on {event_type}")]
    TransitionFromTerminal {
        state: &'static str,
        event_type: &'static str,
    },

    /// A transition targets a non-addressable intermediate state.
    #[error("Transition into non-addressable state {state} on {event_type}")]
    NonAddressableTarget {
        state: &'static str,
        event_type: &'static str,
    },

    /// A transition targets the initial state (states never regress).
    #[error("Transition back into initial state on {event_type}")]
    TargetsInitialState { event_type: &'static str },
}

/// An explicit, inspectable transition table for one workflow.
pub struct TransitionTable<W: Workflow> {
    transitions: Vec<Transition<W>>,
}

impl<W: Workflow> TransitionTable<W> {
    /// Builds a table from its rows.
    pub fn new(transitions: Vec<Transition<W>>) -> Self {
        Self { transitions }
    }

    /// Returns all declared rows.
    pub fn transitions(&self) -> &[Transition<W>] {
        &self.transitions
    }

    /// Returns the rows leaving a given state.
    pub fn edges_from(&self, state: W::State) -> impl Iterator<Item = &Transition<W>> {
        self.transitions.iter().filter(move |t| t.from == state)
    }

    /// Returns true if the table declares an edge `from → next`.
    pub fn declares_edge(&self, from: W::State, next: W::State) -> bool {
        self.transitions
            .iter()
            .any(|t| t.from == from && t.next == next)
    }

    /// Looks up the row for `(state, event)` given the current data.
    pub fn lookup(&self, state: W::State, event: &W::Event, data: &W::Data) -> Lookup<'_, W> {
        let mut saw_row = false;
        for transition in &self.transitions {
            if transition.from != state || transition.event_type != event.event_type() {
                continue;
            }
            saw_row = true;
            match transition.guard {
                None => return Lookup::Matched(transition),
                Some(guard) if guard(event, data) => return Lookup::Matched(transition),
                Some(_) => {}
            }
        }

        if saw_row {
            Lookup::UndefinedBranch
        } else {
            Lookup::Unmatched
        }
    }

    /// Applies one event to `(state, data)`.
    ///
    /// Pure: clones the data, runs the matched row's mutation, and
    /// collects the commands to publish. Terminal states absorb every
    /// event.
    pub fn apply(&self, state: W::State, data: &W::Data, event: &W::Event) -> Applied<W> {
        if state.is_terminal() {
            return Applied::Ignored;
        }

        match self.lookup(state, event, data) {
            Lookup::Matched(transition) => {
                let mut data = data.clone();
                (transition.mutate)(event, &mut data);
                let commands = (transition.emit)(event, &data);
                Applied::Transitioned {
                    next: transition.next,
                    data,
                    commands,
                }
            }
            Lookup::Unmatched => Applied::Ignored,
            Lookup::UndefinedBranch => Applied::Undefined,
        }
    }

    /// Checks the structural invariants of the definition.
    ///
    /// - Terminal states are absorbing (no outgoing rows).
    /// - No row targets a non-addressable intermediate.
    /// - No row re-enters the initial state.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        for transition in &self.transitions {
            if transition.from.is_terminal() {
                return Err(DefinitionError::TransitionFromTerminal {
                    state: transition.from.as_str(),
                    event_type: transition.event_type,
                });
            }
            if !transition.next.is_addressable() {
                return Err(DefinitionError::NonAddressableTarget {
                    state: transition.next.as_str(),
                    event_type: transition.event_type,
                });
            }
            if transition.next == W::initial_state() {
                return Err(DefinitionError::TargetsInitialState {
                    event_type: transition.event_type,
                });
            }
        }
        Ok(())
    }
}
