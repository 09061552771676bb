//! Calculation result payloads and their stable projections.
//!
//! The remote queue resolves a calculation into a loosely shaped
//! `CalculationResult`; everything downstream consumes only the
//! [`Measurements`] and [`SoftValidation`] projections derived here.

use serde::{Deserialize, Serialize};

use crate::types::Gender;

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// Raw result of a completed calculation task-set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub front_params: PhotoParams,
    pub side_params: PhotoParams,
    pub volume_params: VolumeParams,
}

/// Per-photo quality parameters, including advisory messages.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PhotoParams {
    pub body_area_percentage: Option<f64>,
    /// Only meaningful for the front photo; the side photo usually
    /// carries no leg-distance estimate.
    pub legs_distance: Option<f64>,
    #[serde(default)]
    pub soft_validation: SoftMessages,
}

/// The advisory message list nested under each photo's parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SoftMessages {
    #[serde(default)]
    pub messages: Vec<String>,
}

/// Body volume estimates in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeParams {
    pub chest: f64,
    pub waist: f64,
    pub high_hips: f64,
}

// ---------------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------------

/// The stable measurement set handed to the host page and persisted for
/// flow resumption.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub hips: f64,
    pub chest: f64,
    pub waist: f64,
    pub gender: Gender,
    /// Body height in centimeters, as entered by the user.
    pub height: f64,
}

impl Measurements {
    /// Project a calculation result onto the stable shape, folding in
    /// the session's gender and height. `high_hips` maps to `hips`.
    pub fn from_calculation(result: &CalculationResult, gender: Gender, height: f64) -> Self {
        Self {
            hips: result.volume_params.high_hips,
            chest: result.volume_params.chest,
            waist: result.volume_params.waist,
            gender,
            height,
        }
    }
}

/// Non-blocking quality signals for one photo slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SoftValidationSlot {
    pub body_area_percentage: Option<f64>,
    pub legs_distance: Option<f64>,
    pub messages: Vec<String>,
}

/// Soft validation for both slots, always populated on success.
///
/// Independent from hard validation: these signals accompany a
/// *successful* calculation and never block the flow.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SoftValidation {
    pub front: SoftValidationSlot,
    pub side: SoftValidationSlot,
}

impl SoftValidation {
    pub fn from_calculation(result: &CalculationResult) -> Self {
        Self {
            front: slot_from_params(&result.front_params),
            side: slot_from_params(&result.side_params),
        }
    }
}

fn slot_from_params(params: &PhotoParams) -> SoftValidationSlot {
    SoftValidationSlot {
        body_area_percentage: params.body_area_percentage,
        legs_distance: params.legs_distance,
        messages: params.soft_validation.messages.clone(),
    }
}
