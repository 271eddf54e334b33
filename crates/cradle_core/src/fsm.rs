//! State Machine Runtime
//!
//! Flat, table-driven state machines for interaction lifecycles such as the
//! cradle's idle / dragging / swinging cycle.
//!
//! States and events are small `Copy` enums supplied by the caller. Events
//! that have no transition from the current state are rejected and leave the
//! machine untouched.

use rustc_hash::FxHashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Bound shared by state and event types
pub trait Token: Copy + Eq + Hash + Debug {}

impl<T: Copy + Eq + Hash + Debug> Token for T {}

/// A transition in the state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition<S, E> {
    pub from_state: S,
    pub event: E,
    pub to_state: S,
}

impl<S: Token, E: Token> Transition<S, E> {
    pub fn new(from: S, event: E, to: S) -> Self {
        Self {
            from_state: from,
            event,
            to_state: to,
        }
    }
}

/// Builder for creating state machines
pub struct StateMachineBuilder<S, E> {
    initial_state: S,
    transitions: Vec<Transition<S, E>>,
}

impl<S: Token, E: Token> StateMachineBuilder<S, E> {
    pub fn new(initial_state: S) -> Self {
        Self {
            initial_state,
            transitions: Vec::new(),
        }
    }

    /// Add a transition
    pub fn transition(mut self, transition: Transition<S, E>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add a simple transition (from, event, to)
    pub fn on(self, from: S, event: E, to: S) -> Self {
        self.transition(Transition::new(from, event, to))
    }

    /// Build the state machine
    ///
    /// When two transitions share a `(from, event)` pair the later one wins.
    pub fn build(self) -> StateMachine<S, E> {
        StateMachine::new(self.initial_state, self.transitions)
    }
}

/// A state machine instance
#[derive(Clone, Debug)]
pub struct StateMachine<S, E> {
    current_state: S,
    transitions: FxHashMap<(S, E), S>,
    /// History of state transitions (for debugging)
    history: Vec<(S, E, S)>,
}

impl<S: Token, E: Token> StateMachine<S, E> {
    /// Create a new state machine with an initial state and transitions
    pub fn new(initial_state: S, transitions: Vec<Transition<S, E>>) -> Self {
        let transitions = transitions
            .into_iter()
            .map(|t| ((t.from_state, t.event), t.to_state))
            .collect();

        Self {
            current_state: initial_state,
            transitions,
            history: Vec::new(),
        }
    }

    /// Create a builder for a state machine
    pub fn builder(initial_state: S) -> StateMachineBuilder<S, E> {
        StateMachineBuilder::new(initial_state)
    }

    /// Get the current state
    pub fn current_state(&self) -> S {
        self.current_state
    }

    /// Check if we're in a specific state
    pub fn is_in(&self, state: S) -> bool {
        self.current_state == state
    }

    /// Get transition history
    pub fn history(&self) -> &[(S, E, S)] {
        &self.history
    }

    /// Send an event to the state machine.
    ///
    /// Returns the new state, or `None` if the event is not accepted in the
    /// current state.
    pub fn send(&mut self, event: E) -> Option<S> {
        let current = self.current_state;
        let to_state = *self.transitions.get(&(current, event))?;

        self.current_state = to_state;
        self.history.push((current, event, to_state));

        tracing::trace!(?current, ?event, ?to_state, "fsm transition");

        Some(to_state)
    }
}
