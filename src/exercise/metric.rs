//! Scalar metrics derived from a pose, and the declarative per-exercise table.
//!
//! Each exercise is described by one [`MetricSpec`] row: which landmarks feed
//! the metric, how they are combined, and the two predicates driving the
//! hysteresis comparator. Adding an exercise means adding a row.

use crate::defaults;
use crate::exercise::ExerciseKind;
use crate::pose::{Landmark, LandmarkName, Pose};

/// How a scalar is derived from a pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    /// Angle in degrees at `vertex`, between the segments to `proximal` and `distal`.
    JointAngle {
        proximal: LandmarkName,
        vertex: LandmarkName,
        distal: LandmarkName,
    },
    /// `first.y - second.y` in image coordinates (y grows downward).
    VerticalOffset {
        first: LandmarkName,
        second: LandmarkName,
    },
}

impl Metric {
    /// Landmarks the metric reads.
    pub fn landmarks(&self) -> Vec<LandmarkName> {
        match *self {
            Metric::JointAngle {
                proximal,
                vertex,
                distal,
            } => vec![proximal, vertex, distal],
            Metric::VerticalOffset { first, second } => vec![first, second],
        }
    }

    /// Unit label for display.
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::JointAngle { .. } => "deg",
            Metric::VerticalOffset { .. } => "dy",
        }
    }
}

/// Strict threshold comparison over a metric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    Below(f64),
    Above(f64),
}

impl Predicate {
    pub fn holds(&self, value: f64) -> bool {
        match *self {
            Predicate::Below(threshold) => value < threshold,
            Predicate::Above(threshold) => value > threshold,
        }
    }
}

/// Counting rule for one exercise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSpec {
    pub kind: ExerciseKind,
    pub metric: Metric,
    /// Idle -> Active when this holds.
    pub activate: Predicate,
    /// Active -> Idle (one repetition) when this holds.
    pub complete: Predicate,
}

const LEFT_ARM_ANGLE: Metric = Metric::JointAngle {
    proximal: LandmarkName::LeftShoulder,
    vertex: LandmarkName::LeftElbow,
    distal: LandmarkName::LeftWrist,
};

const TABLE: [MetricSpec; 6] = [
    MetricSpec {
        kind: ExerciseKind::BenchPress,
        metric: LEFT_ARM_ANGLE,
        activate: Predicate::Below(90.0),
        complete: Predicate::Above(160.0),
    },
    MetricSpec {
        kind: ExerciseKind::BicepCurls,
        metric: LEFT_ARM_ANGLE,
        activate: Predicate::Below(45.0),
        complete: Predicate::Above(160.0),
    },
    MetricSpec {
        kind: ExerciseKind::LateralRaises,
        metric: LEFT_ARM_ANGLE,
        activate: Predicate::Above(90.0),
        complete: Predicate::Below(40.0),
    },
    MetricSpec {
        kind: ExerciseKind::Squats,
        metric: Metric::VerticalOffset {
            first: LandmarkName::LeftHip,
            second: LandmarkName::LeftKnee,
        },
        activate: Predicate::Above(0.0),
        complete: Predicate::Below(0.0),
    },
    MetricSpec {
        kind: ExerciseKind::PushUps,
        metric: Metric::VerticalOffset {
            first: LandmarkName::LeftShoulder,
            second: LandmarkName::LeftElbow,
        },
        activate: Predicate::Above(0.0),
        complete: Predicate::Below(0.0),
    },
    MetricSpec {
        kind: ExerciseKind::ShoulderPresses,
        metric: Metric::VerticalOffset {
            first: LandmarkName::LeftElbow,
            second: LandmarkName::LeftShoulder,
        },
        activate: Predicate::Above(0.0),
        complete: Predicate::Below(0.0),
    },
];

/// The whole rule table, in [`ExerciseKind::ALL`] order.
pub fn table() -> &'static [MetricSpec] {
    &TABLE
}

pub(crate) fn spec_for(kind: ExerciseKind) -> &'static MetricSpec {
    // TABLE is in ALL order; the index lookup is checked by a test.
    &TABLE[kind as usize]
}

/// Angle in degrees at `b` formed by `a` and `c`, in `[0, 180]`.
///
/// Returns `None` when either segment has zero length.
pub fn joint_angle(a: &Landmark, b: &Landmark, c: &Landmark) -> Option<f64> {
    let (bax, bay) = (a.x - b.x, a.y - b.y);
    let (bcx, bcy) = (c.x - b.x, c.y - b.y);
    let norms = bax.hypot(bay) * bcx.hypot(bcy);
    if norms == 0.0 || !norms.is_finite() {
        return None;
    }
    // Rounding can push the cosine just outside [-1, 1]; acos would give NaN.
    let cosine = ((bax * bcx + bay * bcy) / norms).clamp(-1.0, 1.0);
    Some(cosine.acos().to_degrees())
}

/// Computes metrics from poses, ignoring landmarks below a visibility floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricExtractor {
    min_visibility: f32,
}

impl Default for MetricExtractor {
    fn default() -> Self {
        Self {
            min_visibility: defaults::MIN_VISIBILITY,
        }
    }
}

impl MetricExtractor {
    pub fn new(min_visibility: f32) -> Self {
        Self { min_visibility }
    }

    /// Metric value for `kind`, or `None` when a required landmark is missing.
    pub fn extract(&self, pose: &Pose, kind: ExerciseKind) -> Option<f64> {
        self.evaluate(pose, &kind.metric_spec().metric)
    }

    pub fn evaluate(&self, pose: &Pose, metric: &Metric) -> Option<f64> {
        match *metric {
            Metric::JointAngle {
                proximal,
                vertex,
                distal,
            } => joint_angle(
                self.landmark(pose, proximal)?,
                self.landmark(pose, vertex)?,
                self.landmark(pose, distal)?,
            ),
            Metric::VerticalOffset { first, second } => {
                Some(self.landmark(pose, first)?.y - self.landmark(pose, second)?.y)
            }
        }
    }

    fn landmark<'a>(&self, pose: &'a Pose, name: LandmarkName) -> Option<&'a Landmark> {
        pose.get(name)
            .filter(|lm| lm.visibility >= self.min_visibility)
    }
}
