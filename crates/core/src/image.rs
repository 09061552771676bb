//! Captured-image representation for a two-device capture session.
//!
//! A photo slot can be locally absent, already uploaded by the paired
//! device, or present as real image data. The wire form mirrors the
//! flow-state document: `null` for missing, `true` for remotely
//! uploaded, a base64 string for local data.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::PhotoSlot;

/// One photo slot of a capture session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CapturedImage {
    /// No image for this slot yet; the user must capture one.
    #[default]
    Missing,
    /// The paired device already uploaded this slot to the person
    /// resource; there is no local payload to submit.
    RemoteOnly,
    /// Raw image bytes captured on this device.
    Local(Vec<u8>),
}

impl CapturedImage {
    /// Whether the slot is satisfied, locally or remotely.
    pub fn is_present(&self) -> bool {
        !matches!(self, CapturedImage::Missing)
    }

    /// The local payload to submit, if any. `RemoteOnly` slots yield
    /// `None`: the image already lives on the person resource.
    pub fn upload_payload(&self) -> Option<&[u8]> {
        match self {
            CapturedImage::Local(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl Serialize for CapturedImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CapturedImage::Missing => serializer.serialize_none(),
            CapturedImage::RemoteOnly => serializer.serialize_bool(true),
            CapturedImage::Local(bytes) => serializer.serialize_str(&BASE64.encode(bytes)),
        }
    }
}

impl<'de> Deserialize<'de> for CapturedImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::Null => Ok(CapturedImage::Missing),
            serde_json::Value::Bool(true) => Ok(CapturedImage::RemoteOnly),
            // `false` is how a cleared slot is flagged after a failed
            // validation: the photo must be retaken.
            serde_json::Value::Bool(false) => Ok(CapturedImage::Missing),
            serde_json::Value::String(s) => BASE64
                .decode(s.as_bytes())
                .map(CapturedImage::Local)
                .map_err(|e| D::Error::custom(format!("invalid base64 image payload: {e}"))),
            other => Err(D::Error::custom(format!(
                "expected null, bool or base64 string for image slot, got {other}"
            ))),
        }
    }
}

/// The set of real image payloads to submit to the person resource.
///
/// Built from a session's two slots with sentinel filtering applied:
/// `RemoteOnly` slots are dropped because the remote side already holds
/// them, `Missing` slots are simply absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageSet {
    pub front: Option<Vec<u8>>,
    pub side: Option<Vec<u8>>,
}

impl ImageSet {
    /// Filter a session's slots down to the locally captured payloads.
    pub fn from_captures(front: &CapturedImage, side: &CapturedImage) -> Self {
        Self {
            front: front.upload_payload().map(|b| b.to_vec()),
            side: side.upload_payload().map(|b| b.to_vec()),
        }
    }

    /// Whether no real payload remains after filtering.
    pub fn is_empty(&self) -> bool {
        self.front.is_none() && self.side.is_none()
    }

    /// The slots that carry a payload.
    pub fn slots(&self) -> Vec<PhotoSlot> {
        let mut slots = Vec::new();
        if self.front.is_some() {
            slots.push(PhotoSlot::Front);
        }
        if self.side.is_some() {
            slots.push(PhotoSlot::Side);
        }
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_serializes_to_null() {
        let json = serde_json::to_value(CapturedImage::Missing).unwrap();
        assert!(json.is_null());
    }

    #[test]
    fn remote_only_serializes_to_true() {
        let json = serde_json::to_value(CapturedImage::RemoteOnly).unwrap();
        assert_eq!(json, serde_json::Value::Bool(true));
    }

    #[test]
    fn local_serializes_to_base64_string() {
        let image = CapturedImage::Local(vec![1, 2, 3]);
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json, serde_json::json!("AQID"));
        assert_eq!(serde_json::from_value::<CapturedImage>(json).unwrap(), image);
    }

    #[test]
    fn false_deserializes_to_missing() {
        let image: CapturedImage = serde_json::from_value(serde_json::json!(false)).unwrap();
        assert_eq!(image, CapturedImage::Missing);
    }

    #[test]
    fn garbage_base64_is_rejected() {
        let result = serde_json::from_value::<CapturedImage>(serde_json::json!("not base64!!"));
        assert!(result.is_err());
    }

    #[test]
    fn image_set_filters_sentinels() {
        let set = ImageSet::from_captures(&CapturedImage::RemoteOnly, &CapturedImage::Local(vec![9]));
        assert_eq!(set.front, None);
        assert_eq!(set.side, Some(vec![9]));
        assert_eq!(set.slots(), vec![PhotoSlot::Side]);
    }

    #[test]
    fn image_set_from_two_sentinels_is_empty() {
        let set = ImageSet::from_captures(&CapturedImage::RemoteOnly, &CapturedImage::RemoteOnly);
        assert!(set.is_empty());
    }
}
