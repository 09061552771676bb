//! The widget ↔ host messaging contract.
//!
//! Exactly three commands are recognized; anything else is ignored by
//! the receiving side.

use serde::{Deserialize, Serialize};

use saia_core::measurements::Measurements;
use saia_core::recommendation::Recommendation;

/// Command names carried by widget messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidgetCommand {
    /// The widget computed measurements.
    #[serde(rename = "saia-pf-widget.data")]
    Data,
    /// The widget computed a size recommendation.
    #[serde(rename = "saia-pf-widget.recommendations")]
    Recommendations,
    /// The widget asks the host to close the embedded view.
    #[serde(rename = "saia-pf-widget.close")]
    Close,
}

impl WidgetCommand {
    /// The command name on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetCommand::Data => "saia-pf-widget.data",
            WidgetCommand::Recommendations => "saia-pf-widget.recommendations",
            WidgetCommand::Close => "saia-pf-widget.close",
        }
    }

    /// Parse a command name. Returns `None` for unrecognized commands.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "saia-pf-widget.data" => Some(WidgetCommand::Data),
            "saia-pf-widget.recommendations" => Some(WidgetCommand::Recommendations),
            "saia-pf-widget.close" => Some(WidgetCommand::Close),
            _ => None,
        }
    }
}

/// One message of the widget ↔ host contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetMessage {
    pub command: WidgetCommand,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl WidgetMessage {
    /// A `data` message carrying the measurements.
    pub fn data(measurements: &Measurements) -> Self {
        Self {
            command: WidgetCommand::Data,
            data: serde_json::to_value(measurements).expect("measurements serialize cleanly"),
        }
    }

    /// A `recommendations` message. A missing recommendation is sent as
    /// `null`, matching the reference behavior of notifying the host
    /// even when nothing was found.
    pub fn recommendations(recommendation: Option<&Recommendation>) -> Self {
        Self {
            command: WidgetCommand::Recommendations,
            data: recommendation
                .map(|r| serde_json::to_value(r).expect("recommendation serializes cleanly"))
                .unwrap_or(serde_json::Value::Null),
        }
    }

    /// A `close` message.
    pub fn close() -> Self {
        Self {
            command: WidgetCommand::Close,
            data: serde_json::Value::Null,
        }
    }

    /// Parse an inbound message. Returns `None` when the value is not a
    /// message or carries an unrecognized command.
    pub fn parse(value: &serde_json::Value) -> Option<Self> {
        let command = WidgetCommand::from_str(value.get("command")?.as_str()?)?;
        Some(Self {
            command,
            data: value.get("data").cloned().unwrap_or(serde_json::Value::Null),
        })
    }
}
