//! Pipeline-owned capture session state.
//!
//! Deliberately not the application's UI state container: this struct
//! holds only what the pipeline reads and mutates -- the photo slots,
//! the person binding, and the lookup configuration.

use saia_core::image::{CapturedImage, ImageSet};
use saia_core::person::PersonParams;
use saia_core::types::{Gender, PersonId, PhotoSlot};

/// State of one capture session on one device.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    pub gender: Gender,
    /// Body height in centimeters.
    pub height: f64,
    /// Set once the person resource exists; later runs update the same
    /// resource instead of creating a new one.
    pub person_id: Option<PersonId>,
    pub front_image: CapturedImage,
    pub side_image: CapturedImage,
    /// Sizechart lookup configuration; both must be set for the
    /// brand/body-part path to be used.
    pub brand: Option<String>,
    pub body_part: Option<String>,
    pub product_url: Option<String>,
    /// True when this session completes a flow a desktop initiated and
    /// handed off via QR code. Gates the snapshot write and the
    /// finished-state push that let the other device converge.
    pub desktop_to_mobile: bool,
}

impl CaptureSession {
    pub fn new(gender: Gender, height: f64) -> Self {
        Self {
            gender,
            height,
            person_id: None,
            front_image: CapturedImage::Missing,
            side_image: CapturedImage::Missing,
            brand: None,
            body_part: None,
            product_url: None,
            desktop_to_mobile: false,
        }
    }

    pub fn params(&self) -> PersonParams {
        PersonParams::new(self.gender, self.height)
    }

    pub fn image(&self, slot: PhotoSlot) -> &CapturedImage {
        match slot {
            PhotoSlot::Front => &self.front_image,
            PhotoSlot::Side => &self.side_image,
        }
    }

    pub fn set_image(&mut self, slot: PhotoSlot, image: CapturedImage) {
        match slot {
            PhotoSlot::Front => self.front_image = image,
            PhotoSlot::Side => self.side_image = image,
        }
    }

    /// Reset a slot so the user is prompted to retake it.
    pub fn clear_image(&mut self, slot: PhotoSlot) {
        self.set_image(slot, CapturedImage::Missing);
    }

    /// The slots with no image, locally or remotely.
    pub fn missing_slots(&self) -> Vec<PhotoSlot> {
        let mut missing = Vec::new();
        if !self.front_image.is_present() {
            missing.push(PhotoSlot::Front);
        }
        if !self.side_image.is_present() {
            missing.push(PhotoSlot::Side);
        }
        missing
    }

    /// The local payloads to submit, sentinels filtered out.
    pub fn image_set(&self) -> ImageSet {
        ImageSet::from_captures(&self.front_image, &self.side_image)
    }

    /// Whether the brand/body-part sizechart path applies.
    pub fn sizechart_configured(&self) -> bool {
        matches!((&self.brand, &self.body_part), (Some(b), Some(p)) if !b.is_empty() && !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_misses_both_slots() {
        let session = CaptureSession::new(Gender::Female, 170.0);
        assert_eq!(
            session.missing_slots(),
            vec![PhotoSlot::Front, PhotoSlot::Side]
        );
    }

    #[test]
    fn remote_only_counts_as_present() {
        let mut session = CaptureSession::new(Gender::Male, 180.0);
        session.set_image(PhotoSlot::Front, CapturedImage::RemoteOnly);
        session.set_image(PhotoSlot::Side, CapturedImage::Local(vec![1]));
        assert!(session.missing_slots().is_empty());
    }

    #[test]
    fn clear_image_resets_the_slot() {
        let mut session = CaptureSession::new(Gender::Male, 180.0);
        session.set_image(PhotoSlot::Side, CapturedImage::Local(vec![1]));
        session.clear_image(PhotoSlot::Side);
        assert_eq!(session.side_image, CapturedImage::Missing);
    }

    #[test]
    fn sizechart_needs_both_brand_and_body_part() {
        let mut session = CaptureSession::new(Gender::Male, 180.0);
        assert!(!session.sizechart_configured());
        session.brand = Some("Acme".to_string());
        assert!(!session.sizechart_configured());
        session.body_part = Some("top".to_string());
        assert!(session.sizechart_configured());
        session.brand = Some(String::new());
        assert!(!session.sizechart_configured());
    }
}
