//! Hard-validation message classification.
//!
//! The remote calculation step rejects bad photos with free-text
//! messages. This module maps those messages onto a closed taxonomy
//! through an ordered rule table (first match wins) and derives the
//! user-facing guidance for each outcome. Classification is pure and
//! total: unrecognized text degrades to [`ValidationOutcome::None`],
//! it never fails.

use serde::{Deserialize, Serialize};

use crate::types::PhotoSlot;

/// Rejection text when the front slot received a side photo.
pub const MSG_SIDE_PHOTO_IN_FRONT: &str = "Side photo in the front";

/// Rejection text when the side slot received a front photo.
pub const MSG_FRONT_PHOTO_IN_SIDE: &str = "Front photo in the side";

/// Rejection text when no human body was found on the photo.
pub const MSG_BODY_NOT_DETECTED: &str = "Can't detect the human body";

/// Rejection text when the body is only partially visible.
pub const MSG_BODY_NOT_FULL: &str = "The body is not full";

/// Prefix of pose rejections; the remainder names the missing body
/// parts with underscores for spaces.
pub const MSG_POSE_PREFIX: &str = "The pose is wrong, check: ";

// ---------------------------------------------------------------------------
// ValidationOutcome
// ---------------------------------------------------------------------------

/// Classified hard-validation outcome for one photo slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// No failure, or a message this taxonomy does not recognize.
    #[default]
    None,
    /// The photo of the opposite slot was supplied.
    WrongPhotoType,
    /// No human body was detected.
    BodyNotDetected,
    /// The body is not fully visible.
    BodyNotFull,
    /// The pose is wrong; `missing_parts` is a human-readable phrase
    /// naming the body parts that could not be detected.
    WrongPose { missing_parts: String },
}

impl ValidationOutcome {
    /// Whether this outcome represents an actual failure.
    pub fn is_failure(&self) -> bool {
        !matches!(self, ValidationOutcome::None)
    }
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

/// How a rule matches the raw message.
enum Matcher {
    Exact(&'static str),
    Prefix(&'static str),
}

/// Which outcome a matched rule produces.
enum RuleKind {
    WrongPhotoType,
    BodyNotDetected,
    BodyNotFull,
    WrongPose,
}

/// The ordered rule table for one slot. Only the wrong-photo-type
/// literal differs between slots.
fn rule_table(slot: PhotoSlot) -> [(Matcher, RuleKind); 4] {
    let wrong_type = match slot {
        PhotoSlot::Front => MSG_SIDE_PHOTO_IN_FRONT,
        PhotoSlot::Side => MSG_FRONT_PHOTO_IN_SIDE,
    };
    [
        (Matcher::Exact(wrong_type), RuleKind::WrongPhotoType),
        (Matcher::Exact(MSG_BODY_NOT_DETECTED), RuleKind::BodyNotDetected),
        (Matcher::Exact(MSG_BODY_NOT_FULL), RuleKind::BodyNotFull),
        (Matcher::Prefix(MSG_POSE_PREFIX), RuleKind::WrongPose),
    ]
}

/// Classify a raw rejection message for one slot.
///
/// Rules are applied in order; the first match wins. `None`, empty, and
/// unrecognized messages all classify as [`ValidationOutcome::None`].
pub fn classify(slot: PhotoSlot, message: Option<&str>) -> ValidationOutcome {
    let Some(message) = message else {
        return ValidationOutcome::None;
    };
    if message.is_empty() {
        return ValidationOutcome::None;
    }

    for (matcher, kind) in rule_table(slot) {
        let matched = match matcher {
            Matcher::Exact(text) => message == text,
            Matcher::Prefix(prefix) => message.starts_with(prefix),
        };
        if matched {
            return match kind {
                RuleKind::WrongPhotoType => ValidationOutcome::WrongPhotoType,
                RuleKind::BodyNotDetected => ValidationOutcome::BodyNotDetected,
                RuleKind::BodyNotFull => ValidationOutcome::BodyNotFull,
                RuleKind::WrongPose => ValidationOutcome::WrongPose {
                    missing_parts: message[MSG_POSE_PREFIX.len()..].replace('_', " "),
                },
            };
        }
    }

    tracing::debug!(slot = slot.as_str(), message, "Unrecognized validation message");
    ValidationOutcome::None
}

// ---------------------------------------------------------------------------
// ValidationReport
// ---------------------------------------------------------------------------

/// Classified outcomes for both slots of a rejected submission.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub front: ValidationOutcome,
    pub side: ValidationOutcome,
}

impl ValidationReport {
    /// Classify the raw per-slot messages of a rejection.
    pub fn from_messages(front: Option<&str>, side: Option<&str>) -> Self {
        Self {
            front: classify(PhotoSlot::Front, front),
            side: classify(PhotoSlot::Side, side),
        }
    }

    pub fn has_failures(&self) -> bool {
        self.front.is_failure() || self.side.is_failure()
    }

    /// The slots that must be retaken.
    pub fn failed_slots(&self) -> Vec<PhotoSlot> {
        let mut slots = Vec::new();
        if self.front.is_failure() {
            slots.push(PhotoSlot::Front);
        }
        if self.side.is_failure() {
            slots.push(PhotoSlot::Side);
        }
        slots
    }

    pub fn outcome(&self, slot: PhotoSlot) -> &ValidationOutcome {
        match slot {
            PhotoSlot::Front => &self.front,
            PhotoSlot::Side => &self.side,
        }
    }
}

// ---------------------------------------------------------------------------
// Guidance
// ---------------------------------------------------------------------------

/// The user-facing two-line message pair for a failed slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guidance {
    /// What went wrong.
    pub headline: String,
    /// How to fix it on the retake.
    pub tip: String,
}

/// Derive the guidance for a slot's outcome. Deterministic: the text
/// differs between slots only in which slot noun is substituted.
pub fn guidance(slot: PhotoSlot, outcome: &ValidationOutcome) -> Option<Guidance> {
    let name = slot.as_str();
    let other = slot.other().as_str();

    match outcome {
        ValidationOutcome::None => None,
        ValidationOutcome::WrongPhotoType => Some(Guidance {
            headline: format!("It seems you uploaded {other} photo instead of the {name} one"),
            tip: format!("Please upload the {name} photo."),
        }),
        ValidationOutcome::BodyNotDetected => Some(Guidance {
            headline: format!("We can't detect your body on the {name} photo"),
            tip: format!(
                "Please retake the {name} photo. Make sure your whole body is present on the photo."
            ),
        }),
        ValidationOutcome::BodyNotFull => Some(Guidance {
            headline: format!("Your full body should be present on the {name} photo"),
            tip: format!(
                "Please retake the {name} photo. Make sure your whole body is present and the pose is correct."
            ),
        }),
        ValidationOutcome::WrongPose { missing_parts } => Some(Guidance {
            headline: format!(
                "The pose on the {name} photo is a bit off, we couldn't detect your {missing_parts}"
            ),
            tip: format!("Make sure your {missing_parts} is present on a photo"),
        }),
    }
}
