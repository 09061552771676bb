//! Error type for local domain validation.

/// Errors produced by pure domain logic.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A local input failed validation before any remote call was made.
    #[error("Validation error: {0}")]
    Validation(String),
}
