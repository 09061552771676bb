//! Flow orchestration: the capture & measurement pipeline and the
//! cross-device synchronizer.
//!
//! [`CapturePipeline`] drives the image-upload -> person-creation ->
//! calculation -> result-polling sequence on the device holding the
//! photos, classifies failures, and always leaves the session in a
//! well-defined terminal or remediation state.
//!
//! [`DeviceSynchronizer`] runs on the initiating device of a
//! cross-device pairing and polls the shared flow record until the
//! paired device finishes, surfacing the transitions as events.

pub mod capture;
pub mod outcome;
pub mod session;
pub mod sync;

pub use capture::CapturePipeline;
pub use outcome::{classify_failure, FailureKind, MissingImages, PipelineOutcome};
pub use session::CaptureSession;
pub use sync::{DeviceSynchronizer, SyncEvent};
