//! Size recommendation normalization.
//!
//! The sizechart and product lookup endpoints return loosely shaped
//! payloads; everything downstream works with the fixed
//! `{tight, normal, loose}` shape produced here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A normalized size recommendation. Absent fits are `None`, never
/// empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Recommendation {
    pub tight: Option<String>,
    pub normal: Option<String>,
    pub loose: Option<String>,
}

impl Recommendation {
    /// Whether no fit carries a size label.
    pub fn is_empty(&self) -> bool {
        self.tight.is_none() && self.normal.is_none() && self.loose.is_none()
    }

    /// Normalize a raw lookup payload.
    ///
    /// Accepted shapes per fit slot: a plain size string, or a nested
    /// object carrying a `size` string. A bare top-level `size` string
    /// is treated as the normal fit. Unknown fields are ignored; empty
    /// strings count as absent. Returns `None` when nothing usable
    /// remains, so callers uniformly treat "no recommendation" and
    /// "empty recommendation" the same way.
    ///
    /// Normalizing an already-normalized payload yields the same value.
    pub fn normalize(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;

        let mut rec = Recommendation {
            tight: size_label(obj.get("tight")),
            normal: size_label(obj.get("normal")),
            loose: size_label(obj.get("loose")),
        };

        if rec.normal.is_none() {
            rec.normal = size_label(obj.get("size"));
        }

        if rec.is_empty() {
            None
        } else {
            Some(rec)
        }
    }
}

/// Extract a size label from one fit slot of a raw payload.
fn size_label(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Object(nested)) => match nested.get("size") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        },
        _ => None,
    }
}
