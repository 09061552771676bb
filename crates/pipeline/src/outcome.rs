//! Pipeline outcomes and remote-failure classification.

use saia_api::error::ApiError;
use saia_core::measurements::{Measurements, SoftValidation};
use saia_core::recommendation::Recommendation;
use saia_core::types::PhotoSlot;
use saia_core::validation::ValidationReport;

/// Terminal outcome of one pipeline run.
///
/// A separate router maps these to navigation; the pipeline itself
/// stays UI-framework-agnostic.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Measurements computed and a usable recommendation found.
    Results {
        measurements: Measurements,
        soft_validation: SoftValidation,
        recommendation: Recommendation,
    },
    /// The flow completed without a usable recommendation. The message,
    /// when present, is the service's own wording and is surfaced to
    /// the user verbatim.
    NotFound { message: Option<String> },
    /// The submission was rejected; the offending slots were cleared
    /// and the user must retake them.
    Remediation { report: ValidationReport },
}

/// Local precondition failure: one or both photo slots are empty.
///
/// Raised before any remote call is made; the session is untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingImages {
    pub slots: Vec<PhotoSlot>,
}

impl std::fmt::Display for MissingImages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.slots.iter().map(PhotoSlot::as_str).collect();
        write!(f, "Missing {} photo(s)", names.join(" and "))
    }
}

impl std::error::Error for MissingImages {}

/// The recovery-relevant shape of a remote failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// One or both images were rejected; the raw per-slot messages are
    /// classified downstream.
    HardValidation {
        front: Option<String>,
        side: Option<String>,
    },
    /// A bad-request rejection, or nothing usable came back.
    NotFound,
    /// The service explained itself; surface the message verbatim.
    Generic(String),
    /// Anything else.
    Unclassified(String),
}

/// Classify a remote failure into the recovery taxonomy.
///
/// Checks are ordered: a sub-task payload always means hard validation,
/// regardless of status code; a plain bad request means "not found"; a
/// body carrying `detail`/`brand`/`body_part` text is surfaced
/// verbatim; everything else is unclassified.
pub fn classify_failure(error: &ApiError) -> FailureKind {
    if let Some(sub_tasks) = error.sub_tasks() {
        let slot_message = |prefix: &str| {
            sub_tasks
                .iter()
                .find(|task| task.name.contains(prefix))
                .and_then(|task| task.message.clone())
        };
        return FailureKind::HardValidation {
            front: slot_message("front_"),
            side: slot_message("side_"),
        };
    }

    match error {
        ApiError::Status { status: 400, .. } => FailureKind::NotFound,
        ApiError::Status { body, .. } => match body.message() {
            Some(message) => FailureKind::Generic(message.to_string()),
            None => FailureKind::Unclassified(error.to_string()),
        },
        other => FailureKind::Unclassified(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saia_api::error::{ErrorBody, SubTask};

    fn sub_task(name: &str, message: Option<&str>) -> SubTask {
        SubTask {
            name: name.to_string(),
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn sub_tasks_classify_as_hard_validation() {
        let error = ApiError::Calculation {
            sub_tasks: vec![
                sub_task("front_pose", Some("The pose is wrong, check: left_arm")),
                sub_task("side_body", None),
            ],
        };
        assert_eq!(
            classify_failure(&error),
            FailureKind::HardValidation {
                front: Some("The pose is wrong, check: left_arm".to_string()),
                side: None,
            }
        );
    }

    #[test]
    fn sub_tasks_in_a_status_body_also_classify_as_hard_validation() {
        let error = ApiError::Status {
            status: 400,
            body: ErrorBody::parse(
                r#"{"sub_tasks": [{"name": "side_body", "message": "The body is not full"}]}"#
                    .to_string(),
            ),
        };
        assert_eq!(
            classify_failure(&error),
            FailureKind::HardValidation {
                front: None,
                side: Some("The body is not full".to_string()),
            }
        );
    }

    #[test]
    fn plain_bad_request_classifies_as_not_found() {
        let error = ApiError::Status {
            status: 400,
            body: ErrorBody::parse("{}".to_string()),
        };
        assert_eq!(classify_failure(&error), FailureKind::NotFound);
    }

    #[test]
    fn detail_text_is_surfaced_verbatim() {
        let error = ApiError::Status {
            status: 422,
            body: ErrorBody::parse(r#"{"detail": "Unknown brand"}"#.to_string()),
        };
        assert_eq!(
            classify_failure(&error),
            FailureKind::Generic("Unknown brand".to_string())
        );
    }

    #[test]
    fn everything_else_is_unclassified() {
        assert_matches::assert_matches!(
            classify_failure(&ApiError::MissingFlowId),
            FailureKind::Unclassified(_)
        );
        assert_matches::assert_matches!(
            classify_failure(&ApiError::Status {
                status: 500,
                body: ErrorBody::parse("<html>".to_string()),
            }),
            FailureKind::Unclassified(_)
        );
    }

    #[test]
    fn missing_images_names_the_slots() {
        let error = MissingImages {
            slots: vec![PhotoSlot::Front, PhotoSlot::Side],
        };
        assert_eq!(error.to_string(), "Missing front and side photo(s)");
    }
}
