//! Exercise kinds and the per-kind counting rules.

pub mod comparator;
pub mod metric;

pub use comparator::{ActivationState, Hysteresis, Transition};
pub use metric::{Metric, MetricExtractor, MetricSpec, Predicate, joint_angle};

use std::fmt;
use std::str::FromStr;

/// The supported exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExerciseKind {
    BenchPress,
    BicepCurls,
    LateralRaises,
    Squats,
    PushUps,
    ShoulderPresses,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 6] = [
        ExerciseKind::BenchPress,
        ExerciseKind::BicepCurls,
        ExerciseKind::LateralRaises,
        ExerciseKind::Squats,
        ExerciseKind::PushUps,
        ExerciseKind::ShoulderPresses,
    ];

    /// Display name, as accepted on the command line.
    pub fn display_name(self) -> &'static str {
        match self {
            ExerciseKind::BenchPress => "Bench Press",
            ExerciseKind::BicepCurls => "Bicep Curls",
            ExerciseKind::LateralRaises => "Lateral Raises",
            ExerciseKind::Squats => "Squats",
            ExerciseKind::PushUps => "Push-ups",
            ExerciseKind::ShoulderPresses => "Shoulder Presses",
        }
    }

    /// Kebab-case alias (`bench-press`).
    pub fn slug(self) -> &'static str {
        match self {
            ExerciseKind::BenchPress => "bench-press",
            ExerciseKind::BicepCurls => "bicep-curls",
            ExerciseKind::LateralRaises => "lateral-raises",
            ExerciseKind::Squats => "squats",
            ExerciseKind::PushUps => "push-ups",
            ExerciseKind::ShoulderPresses => "shoulder-presses",
        }
    }

    /// Counting rule for this exercise.
    pub fn metric_spec(self) -> &'static MetricSpec {
        metric::spec_for(self)
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Returned when a string names none of the supported exercises.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown exercise '{0}'")]
pub struct UnknownExercise(pub String);

impl FromStr for ExerciseKind {
    type Err = UnknownExercise;

    /// Accepts the exact display name or the kebab-case slug.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExerciseKind::ALL
            .into_iter()
            .find(|kind| kind.display_name() == s || kind.slug() == s)
            .ok_or_else(|| UnknownExercise(s.to_string()))
    }
}
