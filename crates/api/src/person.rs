//! Person resource client.
//!
//! A person is created once per flow with gender and height; image
//! captures are attached to the same resource afterwards. Calculation
//! can be requested together with an image update or separately.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use saia_core::image::ImageSet;
use saia_core::person::PersonParams;
use saia_core::types::{PersonId, TaskSetId};

use crate::client::{build_http_client, check_status, parse_json, trim_base_url};
use crate::config::WidgetConfig;
use crate::error::ApiError;

/// The person endpoint, as the pipeline consumes it.
#[async_trait]
pub trait PersonGateway: Send + Sync {
    /// Create a person resource, returning its id.
    async fn create(&self, params: &PersonParams) -> Result<PersonId, ApiError>;

    /// Attach image payloads to an existing person.
    async fn update(&self, person_id: PersonId, images: &ImageSet) -> Result<(), ApiError>;

    /// Attach image payloads and request calculation in one submission.
    async fn update_and_calculate(
        &self,
        person_id: PersonId,
        images: &ImageSet,
    ) -> Result<TaskSetId, ApiError>;

    /// Request calculation for images already on the resource.
    async fn calculate(&self, person_id: PersonId) -> Result<TaskSetId, ApiError>;
}

#[derive(Debug, Deserialize)]
struct CreatePersonResponse {
    id: PersonId,
}

#[derive(Debug, Deserialize)]
struct CalculateResponse {
    task_set_id: TaskSetId,
}

/// Image attachment payload. Slots without a local capture are omitted
/// entirely -- absent keys leave the server-side attachment untouched.
#[derive(Debug, Serialize)]
struct ImagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    front_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    side_image: Option<String>,
}

impl ImagePayload {
    fn from_set(images: &ImageSet) -> Self {
        Self {
            front_image: images.front.as_deref().map(|b| BASE64.encode(b)),
            side_image: images.side.as_deref().map(|b| BASE64.encode(b)),
        }
    }
}

/// HTTP client for the person endpoint.
pub struct PersonClient {
    http: reqwest::Client,
    base_url: String,
}

impl PersonClient {
    pub fn new(config: &WidgetConfig) -> Result<Self, ApiError> {
        Ok(Self::with_client(
            build_http_client(&config.api_key)?,
            &config.api_host,
        ))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: trim_base_url(base_url),
        }
    }

    fn person_url(&self, person_id: PersonId) -> String {
        format!("{}/persons/{}/", self.base_url, person_id)
    }
}

#[async_trait]
impl PersonGateway for PersonClient {
    async fn create(&self, params: &PersonParams) -> Result<PersonId, ApiError> {
        let response = self
            .http
            .post(format!("{}/persons/", self.base_url))
            .json(params)
            .send()
            .await?;
        let created: CreatePersonResponse = parse_json(response).await?;

        tracing::info!(person_id = created.id, "Person created");
        Ok(created.id)
    }

    async fn update(&self, person_id: PersonId, images: &ImageSet) -> Result<(), ApiError> {
        let response = self
            .http
            .patch(self.person_url(person_id))
            .json(&ImagePayload::from_set(images))
            .send()
            .await?;
        check_status(response).await
    }

    async fn update_and_calculate(
        &self,
        person_id: PersonId,
        images: &ImageSet,
    ) -> Result<TaskSetId, ApiError> {
        let response = self
            .http
            .patch(self.person_url(person_id))
            .query(&[("calculate", "true")])
            .json(&ImagePayload::from_set(images))
            .send()
            .await?;
        let calculated: CalculateResponse = parse_json(response).await?;

        tracing::info!(
            person_id,
            task_set_id = %calculated.task_set_id,
            "Calculation submitted with image update",
        );
        Ok(calculated.task_set_id)
    }

    async fn calculate(&self, person_id: PersonId) -> Result<TaskSetId, ApiError> {
        let response = self
            .http
            .post(format!("{}calculate/", self.person_url(person_id)))
            .send()
            .await?;
        let calculated: CalculateResponse = parse_json(response).await?;

        tracing::info!(
            person_id,
            task_set_id = %calculated.task_set_id,
            "Calculation submitted",
        );
        Ok(calculated.task_set_id)
    }
}
