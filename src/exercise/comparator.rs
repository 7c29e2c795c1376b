//! Two-state hysteresis comparator (Schmitt trigger) for repetition counting.
//!
//! Two independent predicates keep the state from chattering while the
//! metric hovers near a single boundary: the comparator only leaves `Idle`
//! when the activation predicate holds and only leaves `Active` when the
//! completion predicate holds.

use crate::exercise::metric::{MetricSpec, Predicate};

/// Current comparator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationState {
    /// Waiting for the movement to start.
    #[default]
    Idle,
    /// Movement started, waiting for it to complete.
    Active,
}

/// Result of feeding one metric sample to the comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State unchanged.
    None,
    /// Idle -> Active.
    Activated,
    /// Active -> Idle; carries the repetition count after the increment.
    Completed { repetitions: u64 },
}

/// Hysteresis comparator with a repetition counter.
#[derive(Debug, Clone, PartialEq)]
pub struct Hysteresis {
    activate: Predicate,
    complete: Predicate,
    state: ActivationState,
    repetitions: u64,
}

impl Hysteresis {
    pub fn new(activate: Predicate, complete: Predicate) -> Self {
        Self {
            activate,
            complete,
            state: ActivationState::Idle,
            repetitions: 0,
        }
    }

    pub fn from_spec(spec: &MetricSpec) -> Self {
        Self::new(spec.activate, spec.complete)
    }

    /// Feeds one metric sample.
    pub fn update(&mut self, value: f64) -> Transition {
        match self.state {
            ActivationState::Idle if self.activate.holds(value) => {
                self.state = ActivationState::Active;
                Transition::Activated
            }
            ActivationState::Active if self.complete.holds(value) => {
                self.state = ActivationState::Idle;
                self.repetitions += 1;
                Transition::Completed {
                    repetitions: self.repetitions,
                }
            }
            _ => Transition::None,
        }
    }

    pub fn state(&self) -> ActivationState {
        self.state
    }

    pub fn repetitions(&self) -> u64 {
        self.repetitions
    }
}
