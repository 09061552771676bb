//! Person creation parameters and their validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Gender;

/// Minimum accepted body height in centimeters.
pub const MIN_HEIGHT_CM: f64 = 150.0;

/// Maximum accepted body height in centimeters.
pub const MAX_HEIGHT_CM: f64 = 220.0;

/// Parameters for creating a person resource on the measurement service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonParams {
    pub gender: Gender,
    /// Body height in centimeters.
    pub height: f64,
}

impl PersonParams {
    pub fn new(gender: Gender, height: f64) -> Self {
        Self { gender, height }
    }

    /// Validate that the height lies within the range the capture flow
    /// accepts.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.height.is_finite() {
            return Err(CoreError::Validation(format!(
                "Height must be a finite number, got {}",
                self.height
            )));
        }
        if self.height < MIN_HEIGHT_CM || self.height > MAX_HEIGHT_CM {
            return Err(CoreError::Validation(format!(
                "Height {} cm is outside the accepted range {MIN_HEIGHT_CM}-{MAX_HEIGHT_CM} cm",
                self.height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_heights_within_range() {
        assert!(PersonParams::new(Gender::Female, 150.0).validate().is_ok());
        assert!(PersonParams::new(Gender::Male, 178.5).validate().is_ok());
        assert!(PersonParams::new(Gender::Male, 220.0).validate().is_ok());
    }

    #[test]
    fn rejects_heights_outside_range() {
        assert!(PersonParams::new(Gender::Male, 149.9).validate().is_err());
        assert!(PersonParams::new(Gender::Female, 220.1).validate().is_err());
        assert!(PersonParams::new(Gender::Male, 0.0).validate().is_err());
    }

    #[test]
    fn rejects_non_finite_heights() {
        assert!(PersonParams::new(Gender::Male, f64::NAN).validate().is_err());
        assert!(PersonParams::new(Gender::Male, f64::INFINITY)
            .validate()
            .is_err());
    }

    #[test]
    fn serializes_with_lowercase_gender() {
        let params = PersonParams::new(Gender::Female, 170.0);
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["gender"], "female");
        assert_eq!(json["height"], 170.0);
    }
}
