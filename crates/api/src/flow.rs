//! Shared flow record client.
//!
//! A flow record is the single piece of server state both devices of a
//! session pairing read and write. Every write merges the caller's
//! partial state into this client's cached snapshot and sends the
//! merged whole, so a write never clobbers keys the writer did not
//! touch -- the mobile device's "I captured the front image" survives
//! the desktop's concurrent status update and vice versa.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;

use saia_core::flow_state::FlowState;
use saia_core::types::{FlowId, PersonId};

use crate::client::{build_http_client, parse_json, trim_base_url};
use crate::config::WidgetConfig;
use crate::error::ApiError;

/// A flow record as returned by the service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FlowRecord {
    pub uuid: FlowId,
    #[serde(default)]
    pub state: FlowState,
    #[serde(default)]
    pub person: Option<PersonId>,
}

/// A partial flow update: top-level fields plus an optional state
/// fragment, which is merged like any other state write.
#[derive(Debug, Clone, Default)]
pub struct FlowUpdate {
    pub person: Option<PersonId>,
    pub state: Option<FlowState>,
}

/// Access to the shared flow record.
///
/// The pipeline and the synchronizer are written against this trait;
/// tests substitute scripted in-memory stores.
#[async_trait]
pub trait FlowStore: Send + Sync {
    /// Create the flow record, returning its server-assigned id.
    async fn create(&self, partial: FlowState) -> Result<FlowId, ApiError>;

    /// Fetch the current record.
    async fn get(&self) -> Result<FlowRecord, ApiError>;

    /// Patch top-level fields and merge an optional state fragment.
    async fn update(&self, update: FlowUpdate) -> Result<FlowRecord, ApiError>;

    /// Merge a partial state and send the merged whole.
    async fn update_state(&self, partial: FlowState) -> Result<FlowRecord, ApiError>;
}

/// HTTP client for the flow endpoint.
///
/// Owns one cached [`FlowState`] snapshot, scoped to one flow
/// lifecycle. The cache lock is held across each merge-and-send cycle,
/// serializing writes per client instance so overlapping calls cannot
/// apply their merges out of order.
pub struct FlowClient {
    http: reqwest::Client,
    base_url: String,
    flow_id: std::sync::Mutex<Option<FlowId>>,
    cache: Mutex<FlowState>,
}

impl FlowClient {
    /// Create a client from the widget configuration.
    pub fn new(config: &WidgetConfig) -> Result<Self, ApiError> {
        Ok(Self::with_client(
            build_http_client(&config.api_key)?,
            &config.api_host,
        ))
    }

    /// Create a client reusing an existing [`reqwest::Client`] (useful
    /// for connection pooling across endpoint wrappers).
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: trim_base_url(base_url),
            flow_id: std::sync::Mutex::new(None),
            cache: Mutex::new(FlowState::created()),
        }
    }

    /// Adopt an existing flow id (the mobile session joins the flow the
    /// desktop created).
    pub fn set_flow_id(&self, flow_id: FlowId) {
        *self.flow_id.lock().expect("flow id lock poisoned") = Some(flow_id);
    }

    /// The flow id this client operates on, if known.
    pub fn flow_id(&self) -> Option<FlowId> {
        *self.flow_id.lock().expect("flow id lock poisoned")
    }

    fn collection_url(&self) -> String {
        format!("{}/persons/widget/", self.base_url)
    }

    fn record_url(&self, flow_id: FlowId) -> String {
        format!("{}/persons/widget/{}/", self.base_url, flow_id)
    }

    fn known_flow_id(&self) -> Result<FlowId, ApiError> {
        self.flow_id().ok_or(ApiError::MissingFlowId)
    }
}

#[async_trait]
impl FlowStore for FlowClient {
    async fn create(&self, partial: FlowState) -> Result<FlowId, ApiError> {
        let mut cache = self.cache.lock().await;
        cache.merge(&partial);

        let body = serde_json::json!({ "state": &*cache });
        let response = self
            .http
            .post(self.collection_url())
            .json(&body)
            .send()
            .await?;
        let record: FlowRecord = parse_json(response).await?;

        self.set_flow_id(record.uuid);
        tracing::info!(flow_id = %record.uuid, "Flow created");
        Ok(record.uuid)
    }

    async fn get(&self) -> Result<FlowRecord, ApiError> {
        let flow_id = self.known_flow_id()?;
        let response = self.http.get(self.record_url(flow_id)).send().await?;
        parse_json(response).await
    }

    async fn update(&self, update: FlowUpdate) -> Result<FlowRecord, ApiError> {
        let flow_id = self.known_flow_id()?;

        let mut cache = self.cache.lock().await;
        if let Some(fragment) = &update.state {
            cache.merge(fragment);
        }

        let mut body = serde_json::Map::new();
        if let Some(person) = update.person {
            body.insert("person".to_string(), person.into());
        }
        body.insert(
            "state".to_string(),
            serde_json::to_value(&*cache).expect("flow state is always valid JSON"),
        );

        tracing::debug!(%flow_id, person = ?update.person, "Patching flow record");
        let response = self
            .http
            .patch(self.record_url(flow_id))
            .json(&body)
            .send()
            .await?;
        parse_json(response).await
    }

    async fn update_state(&self, partial: FlowState) -> Result<FlowRecord, ApiError> {
        let flow_id = self.known_flow_id()?;

        let mut cache = self.cache.lock().await;
        cache.merge(&partial);

        let body = serde_json::json!({ "state": &*cache });
        tracing::debug!(%flow_id, "Patching flow state");
        let response = self
            .http
            .patch(self.record_url(flow_id))
            .json(&body)
            .send()
            .await?;
        parse_json(response).await
    }
}
