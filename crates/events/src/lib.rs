//! Host-page messaging and flow-resumption storage.
//!
//! The widget runs embedded in a hosting page; this crate provides the
//! building blocks of that boundary:
//!
//! - [`WidgetMessage`] -- the three-command messaging contract between
//!   widget and host.
//! - [`HostMessenger`] -- in-process publish/subscribe hub relaying
//!   measurement and recommendation events to the hosting context.
//! - [`storage`] -- the `saia-pf-widget-data` snapshot slot used to hand
//!   measurements from one session to another.
//! - [`ButtonIntegration`] -- the receiving side: inbound command
//!   dispatch, hash-fragment bootstrap, and saved-size lookup.

pub mod button;
pub mod message;
pub mod messenger;
pub mod storage;

pub use button::{ButtonConfig, ButtonIntegration, HostAction, ProductOptions};
pub use message::{WidgetCommand, WidgetMessage};
pub use messenger::{HostMessenger, OutboundMessage};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, STORAGE_KEY};
