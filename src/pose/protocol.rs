//! JSON message format for pose estimates exchanged with external estimators.
//!
//! One message per frame:
//!
//! ```json
//! {"landmarks":[{"name":"left_shoulder","x":0.41,"y":0.32,"visibility":0.98}]}
//! ```
//!
//! `"landmarks": null` (or a missing field) means no pose was found.
//! Landmarks may be identified by `name` or by MediaPipe `index`.

use crate::error::{RepcountError, Result};
use crate::pose::{Landmark, LandmarkName, Pose};
use serde::{Deserialize, Serialize};

/// A single landmark as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<LandmarkName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_visibility")]
    pub visibility: f32,
}

fn default_visibility() -> f32 {
    1.0
}

/// Pose estimate for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseMessage {
    #[serde(default)]
    pub landmarks: Option<Vec<LandmarkRecord>>,
}

impl PoseMessage {
    /// Serialize message to a JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize message from a JSON string.
    pub fn from_json(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Builds a message describing `pose` (or its absence).
    pub fn from_pose(pose: Option<&Pose>) -> Self {
        let landmarks = pose.map(|pose| {
            pose.iter()
                .map(|(name, lm)| LandmarkRecord {
                    name: Some(name),
                    index: None,
                    x: lm.x,
                    y: lm.y,
                    visibility: lm.visibility,
                })
                .collect()
        });
        Self { landmarks }
    }

    /// Converts the message into a pose.
    ///
    /// An absent or empty landmark list means "no pose". A record that names
    /// neither a known landmark nor a valid index is a protocol error.
    pub fn into_pose(self) -> Result<Option<Pose>> {
        let Some(records) = self.landmarks else {
            return Ok(None);
        };
        if records.is_empty() {
            return Ok(None);
        }

        let mut pose = Pose::new();
        for record in records {
            let name = match (record.name, record.index) {
                (Some(name), _) => name,
                (None, Some(index)) => LandmarkName::from_index(index).ok_or_else(|| {
                    RepcountError::EstimatorProtocol {
                        message: format!("landmark index {} out of range", index),
                    }
                })?,
                (None, None) => {
                    return Err(RepcountError::EstimatorProtocol {
                        message: "landmark without name or index".to_string(),
                    });
                }
            };
            pose.insert(
                name,
                Landmark {
                    x: record.x,
                    y: record.y,
                    visibility: record.visibility,
                },
            );
        }
        Ok(Some(pose))
    }
}
