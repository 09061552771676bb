//! The capture & measurement pipeline.
//!
//! Drives the strict sequence: person creation/update -> calculation
//! submission -> result polling -> measurement projection ->
//! recommendation lookup, every step awaited before the next. This is
//! the sole recovery boundary for remote failures: whatever happens,
//! the session ends in a well-defined terminal or remediation state,
//! never "pending".

use std::sync::Arc;

use saia_api::catalog::{ProductQuery, RecommendationSource, SizeChartQuery};
use saia_api::error::ApiError;
use saia_api::flow::{FlowStore, FlowUpdate};
use saia_api::person::PersonGateway;
use saia_api::queue::ResultsQueue;
use saia_core::flow_state::{FlowState, FlowStatus};
use saia_core::measurements::{Measurements, SoftValidation};
use saia_core::recommendation::Recommendation;
use saia_core::types::PhotoSlot;
use saia_core::validation::ValidationReport;
use saia_events::messenger::HostMessenger;
use saia_events::storage::{save_measurements, KeyValueStore};

use crate::outcome::{classify_failure, FailureKind, MissingImages, PipelineOutcome};
use crate::session::CaptureSession;

/// The measurement pipeline for one capture session.
pub struct CapturePipeline {
    person: Arc<dyn PersonGateway>,
    queue: Arc<dyn ResultsQueue>,
    catalog: Arc<dyn RecommendationSource>,
    flow: Arc<dyn FlowStore>,
    messenger: HostMessenger,
    store: Arc<dyn KeyValueStore>,
}

impl CapturePipeline {
    pub fn new(
        person: Arc<dyn PersonGateway>,
        queue: Arc<dyn ResultsQueue>,
        catalog: Arc<dyn RecommendationSource>,
        flow: Arc<dyn FlowStore>,
        messenger: HostMessenger,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            person,
            queue,
            catalog,
            flow,
            messenger,
            store,
        }
    }

    /// Run the pipeline over the session's current images.
    ///
    /// Fails fast with [`MissingImages`] when a slot is empty -- no
    /// remote call is made and the session is untouched. Every remote
    /// failure is recovered into an outcome; only the local
    /// precondition surfaces as an error.
    pub async fn run(
        &self,
        session: &mut CaptureSession,
    ) -> Result<PipelineOutcome, MissingImages> {
        let missing = session.missing_slots();
        if !missing.is_empty() {
            tracing::info!(?missing, "Capture submitted with missing photo slots");
            return Err(MissingImages { slots: missing });
        }

        match self.measure(session).await {
            Ok(outcome) => Ok(outcome),
            Err(error) => Ok(self.recover(session, &error).await),
        }
    }

    // ---- success path ----

    async fn measure(&self, session: &mut CaptureSession) -> Result<PipelineOutcome, ApiError> {
        // Sentinels are filtered once, up front: a slot the paired
        // device already uploaded is never re-submitted.
        let images = session.image_set();

        let task_set_id = match session.person_id {
            None => {
                let person_id = self.person.create(&session.params()).await?;
                session.person_id = Some(person_id);

                self.flow
                    .update(FlowUpdate {
                        person: Some(person_id),
                        state: None,
                    })
                    .await?;

                self.person.update_and_calculate(person_id, &images).await?
            }
            Some(person_id) => {
                self.person.update(person_id, &images).await?;
                self.person.calculate(person_id).await?
            }
        };

        tracing::info!(%task_set_id, "Awaiting calculation results");
        let result = self.queue.get_results(&task_set_id).await?;

        let measurements = Measurements::from_calculation(&result, session.gender, session.height);
        let soft_validation = SoftValidation::from_calculation(&result);

        self.messenger.send_data(&measurements);
        if session.desktop_to_mobile {
            if let Err(e) = save_measurements(self.store.as_ref(), &measurements) {
                tracing::warn!(error = %e, "Failed to write measurement snapshot");
            }
        }

        let recommendation = self.lookup_recommendation(session, &measurements).await?;
        self.messenger.send_recommendations(recommendation.as_ref());

        if session.desktop_to_mobile {
            self.push_finished(&measurements, recommendation.as_ref())
                .await;
        }

        match recommendation {
            Some(recommendation) if !recommendation.is_empty() => Ok(PipelineOutcome::Results {
                measurements,
                soft_validation,
                recommendation,
            }),
            _ => Ok(PipelineOutcome::NotFound { message: None }),
        }
    }

    async fn lookup_recommendation(
        &self,
        session: &CaptureSession,
        measurements: &Measurements,
    ) -> Result<Option<Recommendation>, ApiError> {
        if session.sizechart_configured() {
            self.catalog
                .size_chart(&SizeChartQuery {
                    gender: measurements.gender,
                    hips: measurements.hips,
                    chest: measurements.chest,
                    waist: measurements.waist,
                    brand: session.brand.clone().unwrap_or_default(),
                    body_part: session.body_part.clone().unwrap_or_default(),
                })
                .await
        } else {
            self.catalog
                .product_recommendation(&ProductQuery {
                    gender: measurements.gender,
                    hips: measurements.hips,
                    chest: measurements.chest,
                    waist: measurements.waist,
                    url: session.product_url.clone().unwrap_or_default(),
                })
                .await
        }
    }

    /// Push the terminal state into the flow record so the initiating
    /// device's poll converges. Errors here must not fail an otherwise
    /// complete run; they are logged and dropped.
    async fn push_finished(
        &self,
        measurements: &Measurements,
        recommendation: Option<&Recommendation>,
    ) {
        let mut state = FlowState::new();
        state.set_status(FlowStatus::Finished);
        state.set_measurements(measurements);
        if let Some(recommendation) = recommendation {
            state.set_recommendations(recommendation);
        }

        if let Err(e) = self.flow.update_state(state).await {
            tracing::warn!(error = %e, "Failed to push finished state to the flow record");
        }
    }

    // ---- failure path ----

    /// Recover a remote failure into an outcome, applying the
    /// image-reset side effect where the remote flagged a slot.
    async fn recover(&self, session: &mut CaptureSession, error: &ApiError) -> PipelineOutcome {
        match classify_failure(error) {
            FailureKind::HardValidation { front, side } => {
                self.remediate(session, front, side).await
            }
            FailureKind::NotFound => {
                tracing::info!(error = %error, "No recommendation available");
                PipelineOutcome::NotFound { message: None }
            }
            FailureKind::Generic(message) => {
                tracing::warn!(%message, "Measurement flow failed");
                PipelineOutcome::NotFound {
                    message: Some(message),
                }
            }
            FailureKind::Unclassified(message) => {
                tracing::error!(%message, "Measurement flow failed unexpectedly");
                PipelineOutcome::NotFound {
                    message: Some(message),
                }
            }
        }
    }

    async fn remediate(
        &self,
        session: &mut CaptureSession,
        front: Option<String>,
        side: Option<String>,
    ) -> PipelineOutcome {
        let report = ValidationReport::from_messages(front.as_deref(), side.as_deref());

        // Clear exactly the slots the remote flagged, so only those are
        // recaptured, and mirror the flags into the flow record for the
        // paired device.
        let mut flags = FlowState::new();
        if front.is_some() {
            session.clear_image(PhotoSlot::Front);
        }
        flags.set_image_flag(PhotoSlot::Front, front.is_none());
        if side.is_some() {
            session.clear_image(PhotoSlot::Side);
        }
        flags.set_image_flag(PhotoSlot::Side, side.is_none());

        if let Err(e) = self.flow.update_state(flags).await {
            tracing::warn!(error = %e, "Failed to push retake flags to the flow record");
        }

        tracing::info!(
            front_failed = front.is_some(),
            side_failed = side.is_some(),
            "Submission rejected, photos must be retaken",
        );
        PipelineOutcome::Remediation { report }
    }
}
