//! Recording in-memory gateways for pipeline tests.

// Each test binary uses its own subset of these helpers.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use saia_api::catalog::{ProductQuery, RecommendationSource, SizeChartQuery};
use saia_api::error::{ApiError, ErrorBody, SubTask};
use saia_api::flow::{FlowRecord, FlowStore, FlowUpdate};
use saia_api::person::PersonGateway;
use saia_api::queue::ResultsQueue;
use saia_core::flow_state::FlowState;
use saia_core::image::ImageSet;
use saia_core::measurements::CalculationResult;
use saia_core::person::PersonParams;
use saia_core::recommendation::Recommendation;
use saia_core::types::{FlowId, PersonId, TaskSetId};

/// Person id assigned by [`RecordingPerson::create`].
pub const CREATED_PERSON_ID: PersonId = 42;

/// Task-set id returned by every calculation submission.
pub const TASK_SET_ID: &str = "task-set-1";

pub fn flow_record(state: serde_json::Value) -> FlowRecord {
    FlowRecord {
        uuid: FlowId::nil(),
        state: serde_json::from_value(state).expect("valid state JSON"),
        person: None,
    }
}

pub fn calculation_result(chest: f64, waist: f64, high_hips: f64) -> CalculationResult {
    serde_json::from_value(serde_json::json!({
        "front_params": {"body_area_percentage": 0.8, "legs_distance": 5.0},
        "side_params": {"body_area_percentage": 0.8},
        "volume_params": {"chest": chest, "waist": waist, "high_hips": high_hips},
    }))
    .expect("valid calculation result")
}

pub fn sub_task(name: &str, message: Option<&str>) -> SubTask {
    SubTask {
        name: name.to_string(),
        message: message.map(str::to_string),
    }
}

// ---------------------------------------------------------------------------
// Flow store
// ---------------------------------------------------------------------------

/// One scripted answer of [`ScriptedFlow::get`].
pub enum ScriptedGet {
    Record(FlowRecord),
    Error,
}

/// Flow store that answers `get` from a script and records every write.
#[derive(Default)]
pub struct ScriptedFlow {
    script: Mutex<VecDeque<ScriptedGet>>,
    last: Mutex<Option<FlowRecord>>,
    pub get_calls: AtomicUsize,
    pub updates: Mutex<Vec<FlowUpdate>>,
    pub state_updates: Mutex<Vec<FlowState>>,
}

impl ScriptedFlow {
    pub fn with_script(script: Vec<ScriptedGet>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    pub fn get_count(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    fn tick_error() -> ApiError {
        ApiError::Status {
            status: 503,
            body: ErrorBody::parse("service unavailable".to_string()),
        }
    }
}

#[async_trait]
impl FlowStore for ScriptedFlow {
    async fn create(&self, _partial: FlowState) -> Result<FlowId, ApiError> {
        Ok(FlowId::nil())
    }

    async fn get(&self) -> Result<FlowRecord, ApiError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);

        match self.script.lock().unwrap().pop_front() {
            Some(ScriptedGet::Record(record)) => {
                *self.last.lock().unwrap() = Some(record.clone());
                Ok(record)
            }
            Some(ScriptedGet::Error) => Err(Self::tick_error()),
            // Script exhausted: keep answering with the last record.
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .ok_or(ApiError::MissingFlowId),
        }
    }

    async fn update(&self, update: FlowUpdate) -> Result<FlowRecord, ApiError> {
        self.updates.lock().unwrap().push(update);
        Ok(flow_record(serde_json::json!({"status": "created"})))
    }

    async fn update_state(&self, partial: FlowState) -> Result<FlowRecord, ApiError> {
        self.state_updates.lock().unwrap().push(partial);
        Ok(flow_record(serde_json::json!({"status": "created"})))
    }
}

// ---------------------------------------------------------------------------
// Person gateway
// ---------------------------------------------------------------------------

/// Person gateway recording every call.
#[derive(Default)]
pub struct RecordingPerson {
    pub created: Mutex<Vec<PersonParams>>,
    pub updated: Mutex<Vec<(PersonId, ImageSet)>>,
    pub update_and_calculated: Mutex<Vec<(PersonId, ImageSet)>>,
    pub calculated: Mutex<Vec<PersonId>>,
}

impl RecordingPerson {
    pub fn call_count(&self) -> usize {
        self.created.lock().unwrap().len()
            + self.updated.lock().unwrap().len()
            + self.update_and_calculated.lock().unwrap().len()
            + self.calculated.lock().unwrap().len()
    }
}

#[async_trait]
impl PersonGateway for RecordingPerson {
    async fn create(&self, params: &PersonParams) -> Result<PersonId, ApiError> {
        self.created.lock().unwrap().push(*params);
        Ok(CREATED_PERSON_ID)
    }

    async fn update(&self, person_id: PersonId, images: &ImageSet) -> Result<(), ApiError> {
        self.updated.lock().unwrap().push((person_id, images.clone()));
        Ok(())
    }

    async fn update_and_calculate(
        &self,
        person_id: PersonId,
        images: &ImageSet,
    ) -> Result<TaskSetId, ApiError> {
        self.update_and_calculated
            .lock()
            .unwrap()
            .push((person_id, images.clone()));
        Ok(TASK_SET_ID.to_string())
    }

    async fn calculate(&self, person_id: PersonId) -> Result<TaskSetId, ApiError> {
        self.calculated.lock().unwrap().push(person_id);
        Ok(TASK_SET_ID.to_string())
    }
}

// ---------------------------------------------------------------------------
// Results queue
// ---------------------------------------------------------------------------

/// How the scripted queue resolves.
pub enum QueueScript {
    Succeed(CalculationResult),
    FailSubTasks(Vec<SubTask>),
    FailStatus { status: u16, body: String },
}

/// Results queue resolving according to a fixed script.
pub struct ScriptedQueue {
    script: QueueScript,
    pub calls: AtomicUsize,
}

impl ScriptedQueue {
    pub fn new(script: QueueScript) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResultsQueue for ScriptedQueue {
    async fn get_results(&self, _task_set_id: &str) -> Result<CalculationResult, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            QueueScript::Succeed(result) => Ok(result.clone()),
            QueueScript::FailSubTasks(sub_tasks) => Err(ApiError::Calculation {
                sub_tasks: sub_tasks.clone(),
            }),
            QueueScript::FailStatus { status, body } => Err(ApiError::Status {
                status: *status,
                body: ErrorBody::parse(body.clone()),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Recommendation source
// ---------------------------------------------------------------------------

/// Catalog answering every lookup with a fixed recommendation.
#[derive(Default)]
pub struct RecordingCatalog {
    pub recommendation: Option<Recommendation>,
    pub size_chart_queries: Mutex<Vec<SizeChartQuery>>,
    pub product_queries: Mutex<Vec<ProductQuery>>,
}

impl RecordingCatalog {
    pub fn with_recommendation(recommendation: Option<Recommendation>) -> Self {
        Self {
            recommendation,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.size_chart_queries.lock().unwrap().len() + self.product_queries.lock().unwrap().len()
    }
}

#[async_trait]
impl RecommendationSource for RecordingCatalog {
    async fn size_chart(
        &self,
        query: &SizeChartQuery,
    ) -> Result<Option<Recommendation>, ApiError> {
        self.size_chart_queries.lock().unwrap().push(query.clone());
        Ok(self.recommendation.clone())
    }

    async fn product_recommendation(
        &self,
        query: &ProductQuery,
    ) -> Result<Option<Recommendation>, ApiError> {
        self.product_queries.lock().unwrap().push(query.clone());
        Ok(self.recommendation.clone())
    }

    async fn product_visibility(&self, _product_url: &str) -> Result<bool, ApiError> {
        Ok(true)
    }
}
