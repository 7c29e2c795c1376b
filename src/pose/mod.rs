//! Body pose data model and pose estimator adapters.
//!
//! A [`Pose`] is the set of 2-D landmarks the estimator found for the single
//! tracked subject in one frame. Frames without a subject carry no pose at all
//! (`Option<Pose>::None`), never an empty one.

pub mod estimator;
pub mod protocol;
pub mod sidecar;

pub use estimator::{MockPoseEstimator, NoPoseEstimator, PoseEstimator, ReplayEstimator};
pub use protocol::{LandmarkRecord, PoseMessage};
pub use sidecar::SidecarEstimator;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Write};

/// MediaPipe body landmark names (33 total), in index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkName {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl LandmarkName {
    /// All landmarks in MediaPipe index order.
    pub const ALL: [LandmarkName; 33] = [
        LandmarkName::Nose,
        LandmarkName::LeftEyeInner,
        LandmarkName::LeftEye,
        LandmarkName::LeftEyeOuter,
        LandmarkName::RightEyeInner,
        LandmarkName::RightEye,
        LandmarkName::RightEyeOuter,
        LandmarkName::LeftEar,
        LandmarkName::RightEar,
        LandmarkName::MouthLeft,
        LandmarkName::MouthRight,
        LandmarkName::LeftShoulder,
        LandmarkName::RightShoulder,
        LandmarkName::LeftElbow,
        LandmarkName::RightElbow,
        LandmarkName::LeftWrist,
        LandmarkName::RightWrist,
        LandmarkName::LeftPinky,
        LandmarkName::RightPinky,
        LandmarkName::LeftIndex,
        LandmarkName::RightIndex,
        LandmarkName::LeftThumb,
        LandmarkName::RightThumb,
        LandmarkName::LeftHip,
        LandmarkName::RightHip,
        LandmarkName::LeftKnee,
        LandmarkName::RightKnee,
        LandmarkName::LeftAnkle,
        LandmarkName::RightAnkle,
        LandmarkName::LeftHeel,
        LandmarkName::RightHeel,
        LandmarkName::LeftFootIndex,
        LandmarkName::RightFootIndex,
    ];

    /// MediaPipe landmark index.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Looks up a landmark by its MediaPipe index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Snake-case name, matching the serialized form (`left_shoulder`).
impl fmt::Display for LandmarkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let camel = format!("{:?}", self);
        for (i, ch) in camel.char_indices() {
            if ch.is_ascii_uppercase() {
                if i > 0 {
                    f.write_char('_')?;
                }
                f.write_char(ch.to_ascii_lowercase())?;
            } else {
                f.write_char(ch)?;
            }
        }
        Ok(())
    }
}

/// Skeleton edges drawn by the annotator.
pub const SKELETON_EDGES: [(LandmarkName, LandmarkName); 12] = [
    (LandmarkName::LeftShoulder, LandmarkName::RightShoulder),
    (LandmarkName::LeftShoulder, LandmarkName::LeftElbow),
    (LandmarkName::LeftElbow, LandmarkName::LeftWrist),
    (LandmarkName::RightShoulder, LandmarkName::RightElbow),
    (LandmarkName::RightElbow, LandmarkName::RightWrist),
    (LandmarkName::LeftShoulder, LandmarkName::LeftHip),
    (LandmarkName::RightShoulder, LandmarkName::RightHip),
    (LandmarkName::LeftHip, LandmarkName::RightHip),
    (LandmarkName::LeftHip, LandmarkName::LeftKnee),
    (LandmarkName::LeftKnee, LandmarkName::LeftAnkle),
    (LandmarkName::RightHip, LandmarkName::RightKnee),
    (LandmarkName::RightKnee, LandmarkName::RightAnkle),
];

/// A single estimated joint position in normalized frame coordinates.
///
/// `x` grows to the right and `y` grows downward, both nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    /// Estimator confidence that the landmark is visible (0.0 to 1.0).
    #[serde(default = "full_visibility")]
    pub visibility: f32,
}

fn full_visibility() -> f32 {
    1.0
}

impl Landmark {
    /// Creates a fully visible landmark.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            visibility: 1.0,
        }
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = visibility;
        self
    }
}

/// All landmarks detected for one subject in one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pose {
    landmarks: BTreeMap<LandmarkName, Landmark>,
}

impl Pose {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: LandmarkName, landmark: Landmark) -> Self {
        self.landmarks.insert(name, landmark);
        self
    }

    pub fn insert(&mut self, name: LandmarkName, landmark: Landmark) {
        self.landmarks.insert(name, landmark);
    }

    pub fn get(&self, name: LandmarkName) -> Option<&Landmark> {
        self.landmarks.get(&name)
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Landmarks in MediaPipe index order.
    pub fn iter(&self) -> impl Iterator<Item = (LandmarkName, &Landmark)> {
        self.landmarks.iter().map(|(name, lm)| (*name, lm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landmark_indices_match_mediapipe() {
        assert_eq!(LandmarkName::Nose.index(), 0);
        assert_eq!(LandmarkName::LeftShoulder.index(), 11);
        assert_eq!(LandmarkName::LeftElbow.index(), 13);
        assert_eq!(LandmarkName::LeftWrist.index(), 15);
        assert_eq!(LandmarkName::LeftHip.index(), 23);
        assert_eq!(LandmarkName::LeftKnee.index(), 25);
        assert_eq!(LandmarkName::RightFootIndex.index(), 32);
    }

    #[test]
    fn from_index_roundtrips_every_landmark() {
        for name in LandmarkName::ALL {
            assert_eq!(LandmarkName::from_index(name.index()), Some(name));
        }
        assert_eq!(LandmarkName::from_index(33), None);
    }

    #[test]
    fn landmark_names_serialize_snake_case() {
        let json = serde_json::to_string(&LandmarkName::LeftFootIndex).unwrap();
        assert_eq!(json, "\"left_foot_index\"");
    }

    #[test]
    fn landmark_display_matches_serialized_name() {
        for name in LandmarkName::ALL {
            let json = serde_json::to_string(&name).unwrap();
            assert_eq!(format!("\"{}\"", name), json);
        }
    }

    #[test]
    fn landmark_visibility_defaults_to_visible() {
        let lm: Landmark = serde_json::from_str(r#"{"x":0.25,"y":0.5}"#).unwrap();
        assert_eq!(lm.visibility, 1.0);
    }

    #[test]
    fn pose_iterates_in_index_order() {
        let pose = Pose::new()
            .with(LandmarkName::LeftKnee, Landmark::new(0.5, 0.8))
            .with(LandmarkName::Nose, Landmark::new(0.5, 0.1))
            .with(LandmarkName::LeftHip, Landmark::new(0.5, 0.6));

        let names: Vec<LandmarkName> = pose.iter().map(|(name, _)| name).collect();
        assert_eq!(
            names,
            vec![
                LandmarkName::Nose,
                LandmarkName::LeftHip,
                LandmarkName::LeftKnee
            ]
        );
    }

    #[test]
    fn pose_get_missing_landmark_is_none() {
        let pose = Pose::new().with(LandmarkName::Nose, Landmark::new(0.5, 0.1));
        assert!(pose.get(LandmarkName::LeftWrist).is_none());
        assert_eq!(pose.len(), 1);
        assert!(!pose.is_empty());
    }
}
