//! Shared identifier aliases and small enums used across the workspace.

use serde::{Deserialize, Serialize};

/// Flow records are identified by a server-assigned UUID.
pub type FlowId = uuid::Uuid;

/// Person resources are identified by an integer id.
pub type PersonId = i64;

/// A calculation task-set is identified by an opaque string token.
pub type TaskSetId = String;

/// Person gender, as accepted by the measurement service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// String representation used in request payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Parse from a string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// The two photo slots a capture session works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoSlot {
    Front,
    Side,
}

impl PhotoSlot {
    /// Slot noun used in user-facing guidance and flow-state keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoSlot::Front => "front",
            PhotoSlot::Side => "side",
        }
    }

    /// The opposite slot.
    pub fn other(&self) -> Self {
        match self {
            PhotoSlot::Front => PhotoSlot::Side,
            PhotoSlot::Side => PhotoSlot::Front,
        }
    }
}
