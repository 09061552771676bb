//! HTTP clients for the perfect-fit measurement service.
//!
//! Wraps the remote endpoints behind typed clients and gateway traits:
//!
//! - [`FlowClient`] -- shared flow record CRUD with merge-then-send
//!   state caching.
//! - [`PersonClient`] -- person resource creation, image attachment, and
//!   calculation triggering.
//! - [`QueueClient`] -- poll-until-ready retrieval of calculation
//!   results.
//! - [`CatalogClient`] -- sizechart and product recommendation lookups.
//!
//! The traits ([`FlowStore`], [`PersonGateway`], [`ResultsQueue`],
//! [`RecommendationSource`]) are the seams the pipeline is driven
//! through; tests substitute in-memory implementations.

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod person;
pub mod queue;

pub use catalog::{CatalogClient, ProductQuery, RecommendationSource, SizeChartQuery};
pub use config::WidgetConfig;
pub use error::{ApiError, ErrorBody, SubTask};
pub use flow::{FlowClient, FlowRecord, FlowStore, FlowUpdate};
pub use person::{PersonClient, PersonGateway};
pub use queue::{QueueClient, QueuePollConfig, ResultsQueue};
