//! Per-run counting state.
//!
//! One [`Session`] exists per process. It is owned by the pipeline driver and
//! mutated only by frames that carry a pose from which the metric can be
//! computed.

use crate::exercise::{
    ActivationState, ExerciseKind, Hysteresis, MetricExtractor, Transition,
};
use crate::pose::Pose;

/// What one frame did to the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Metric value, when a pose was present and the metric computable.
    pub metric: Option<f64>,
    pub transition: Transition,
}

impl Observation {
    const SKIPPED: Observation = Observation {
        metric: None,
        transition: Transition::None,
    };
}

/// Mutable repetition-counting state for one exercise session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    requested: String,
    exercise: Option<ExerciseKind>,
    comparator: Option<Hysteresis>,
    extractor: MetricExtractor,
}

impl Session {
    /// Creates a session from the exercise name given by the user.
    ///
    /// Unknown names are accepted: such a session never computes a metric
    /// and its count stays at zero.
    pub fn new(exercise: &str, extractor: MetricExtractor) -> Self {
        let kind = exercise.parse::<ExerciseKind>().ok();
        if kind.is_none() {
            tracing::warn!(exercise, "unrecognized exercise, repetitions will not be counted");
        }
        Self::build(exercise.to_string(), kind, extractor)
    }

    pub fn for_kind(kind: ExerciseKind, extractor: MetricExtractor) -> Self {
        Self::build(kind.display_name().to_string(), Some(kind), extractor)
    }

    fn build(requested: String, exercise: Option<ExerciseKind>, extractor: MetricExtractor) -> Self {
        if let Some(kind) = exercise {
            tracing::debug!(
                exercise = kind.display_name(),
                landmarks = ?kind.metric_spec().metric.landmarks(),
                "counting rule selected"
            );
        }
        Self {
            requested,
            exercise,
            comparator: exercise.map(|kind| Hysteresis::from_spec(kind.metric_spec())),
            extractor,
        }
    }

    /// Feeds one frame's pose (or its absence) to the session.
    pub fn observe(&mut self, pose: Option<&Pose>) -> Observation {
        let (Some(kind), Some(comparator), Some(pose)) =
            (self.exercise, self.comparator.as_mut(), pose)
        else {
            return Observation::SKIPPED;
        };
        let Some(value) = self.extractor.extract(pose, kind) else {
            return Observation::SKIPPED;
        };
        Observation {
            metric: Some(value),
            transition: comparator.update(value),
        }
    }

    pub fn repetition_count(&self) -> u64 {
        self.comparator.as_ref().map_or(0, Hysteresis::repetitions)
    }

    pub fn activation_state(&self) -> ActivationState {
        self.comparator
            .as_ref()
            .map_or(ActivationState::Idle, Hysteresis::state)
    }

    /// The recognized exercise, if any.
    pub fn exercise(&self) -> Option<ExerciseKind> {
        self.exercise
    }

    /// The exercise name as requested.
    pub fn requested(&self) -> &str {
        &self.requested
    }
}
