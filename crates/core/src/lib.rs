//! Domain types and pure logic for the perfect-fit widget core.
//!
//! Everything in this crate is I/O-free: the semi-structured flow-state
//! document and its merge rules, the captured-image representation, the
//! measurement and soft-validation projections, the hard-validation
//! message classifier, and recommendation normalization. The HTTP layer
//! lives in `saia-api`; orchestration lives in `saia-pipeline`.

pub mod error;
pub mod flow_state;
pub mod image;
pub mod measurements;
pub mod person;
pub mod recommendation;
pub mod types;
pub mod validation;

pub use error::CoreError;
pub use flow_state::{FlowState, FlowStatus};
pub use image::{CapturedImage, ImageSet};
pub use measurements::{CalculationResult, Measurements, SoftValidation};
pub use recommendation::Recommendation;
pub use types::{FlowId, Gender, PersonId, PhotoSlot, TaskSetId};
pub use validation::{ValidationOutcome, ValidationReport};
