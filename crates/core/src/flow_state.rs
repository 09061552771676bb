//! The semi-structured state document of a shared flow record.
//!
//! Desktop and mobile sessions coordinate exclusively through this
//! document. It is an open key/value mapping: writers merge partial
//! updates into what they last saw and send the merged whole, so a
//! write never destroys keys the writer does not know about.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::measurements::Measurements;
use crate::recommendation::Recommendation;
use crate::types::PhotoSlot;

/// Well-known state keys.
pub const KEY_STATUS: &str = "status";
pub const KEY_FRONT_IMAGE: &str = "frontImage";
pub const KEY_SIDE_IMAGE: &str = "sideImage";
pub const KEY_RECOMMENDATIONS: &str = "recommendations";
pub const KEY_MEASUREMENTS: &str = "measurements";

// ---------------------------------------------------------------------------
// FlowStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a flow, as carried in the state document.
///
/// The mapping is open-ended on the wire; unknown statuses are kept
/// verbatim in `Other` so that polling logic can ignore them without
/// losing information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowStatus {
    Created,
    OpenedOnMobile,
    Finished,
    Other(String),
}

impl FlowStatus {
    /// String representation used in the state document.
    pub fn as_str(&self) -> &str {
        match self {
            FlowStatus::Created => "created",
            FlowStatus::OpenedOnMobile => "opened-on-mobile",
            FlowStatus::Finished => "finished",
            FlowStatus::Other(s) => s,
        }
    }

    /// Parse from a string. Unknown values are preserved as `Other`.
    pub fn from_str(s: &str) -> Self {
        match s {
            "created" => FlowStatus::Created,
            "opened-on-mobile" => FlowStatus::OpenedOnMobile,
            "finished" => FlowStatus::Finished,
            other => FlowStatus::Other(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// FlowState
// ---------------------------------------------------------------------------

/// The open key/value state document of a flow record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowState(serde_json::Map<String, Value>);

impl FlowState {
    /// An empty partial state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The initial state of a freshly created flow: `{status: "created"}`.
    pub fn created() -> Self {
        let mut state = Self::new();
        state.set_status(FlowStatus::Created);
        state
    }

    /// Merge a partial state into this one, key by key.
    ///
    /// Left-biased toward the partial: keys present in `partial` win,
    /// keys absent from it are retained unchanged. The merge is shallow,
    /// matching the reference behavior of spreading one object over
    /// another.
    pub fn merge(&mut self, partial: &FlowState) {
        for (key, value) in &partial.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Raw access to a state key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a raw state key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // ---- typed accessors ----

    pub fn status(&self) -> Option<FlowStatus> {
        self.get(KEY_STATUS)
            .and_then(Value::as_str)
            .map(FlowStatus::from_str)
    }

    pub fn set_status(&mut self, status: FlowStatus) {
        self.set(KEY_STATUS, status.as_str().to_string());
    }

    /// The recommendations stored in the state, normalized. `None` when
    /// the key is absent or carries no usable sizes.
    pub fn recommendations(&self) -> Option<Recommendation> {
        self.get(KEY_RECOMMENDATIONS)
            .and_then(Recommendation::normalize)
    }

    pub fn set_recommendations(&mut self, recommendation: &Recommendation) {
        if let Ok(value) = serde_json::to_value(recommendation) {
            self.set(KEY_RECOMMENDATIONS, value);
        }
    }

    pub fn set_measurements(&mut self, measurements: &Measurements) {
        if let Ok(value) = serde_json::to_value(measurements) {
            self.set(KEY_MEASUREMENTS, value);
        }
    }

    /// Flag whether a photo slot is satisfied. Written `false` after a
    /// failed validation so the paired device prompts a retake.
    pub fn set_image_flag(&mut self, slot: PhotoSlot, present: bool) {
        let key = match slot {
            PhotoSlot::Front => KEY_FRONT_IMAGE,
            PhotoSlot::Side => KEY_SIDE_IMAGE,
        };
        self.set(key, present);
    }
}
