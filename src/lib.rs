#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Host Update Core
//!
//! Runs privileged, potentially long-running host operations in the background
//! and reports everything they produced, with a software-update orchestrator as
//! the concrete operation.
//!
//! ## Architecture
//!
//! The caller never blocks past a short start budget. Work is registered under a
//! stable name, launched as a detached task, polled until it reports itself
//! started, then awaited. Its output lives in a persisted append-only log, so
//! nothing it wrote is lost when it fails.
//!
//! ## Module Organization
//!
//! - [`runner`] - Named task registry, launcher, start polling and output collection
//! - [`orchestrator`] - Search, EULA, reboot gate, download and install state machine
//! - [`provider`] - Capability interface over the host's update source
//! - [`aggregator`] - Shapes runner output into the boundary response
//! - [`service`] - One-call façade wiring the pieces together
//! - [`categories`] - Update category names and provider identifiers
//! - [`config`] - YAML configuration with environment overrides
//! - [`logging`] - Structured logging setup and helpers
//! - [`error`] - Crate-level error type
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hostupdate_core::config::HostUpdateConfig;
//! use hostupdate_core::orchestrator::UpdateRequest;
//! use hostupdate_core::provider::UpdateSourceProvider;
//! use hostupdate_core::service::HostUpdateService;
//! use std::sync::Arc;
//!
//! # async fn example(provider: Arc<dyn UpdateSourceProvider>) {
//! let service = HostUpdateService::new(&HostUpdateConfig::default(), provider);
//!
//! let response = service
//!     .run(UpdateRequest::new("SecurityUpdates").check_mode(true))
//!     .await;
//! println!("{}", serde_json::to_string_pretty(&response).unwrap());
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit, integration and property tests
//! ```

pub mod aggregator;
pub mod categories;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod provider;
pub mod runner;
pub mod service;

pub use aggregator::{ResultAggregator, UpdateResponse};
pub use categories::{UnknownCategoryError, UpdateCategory};
pub use config::{ConfigManager, ConfigurationError, HostUpdateConfig};
pub use constants::{events as lifecycle_events, system, OrchestrationPhase, TaskState};
pub use error::{HostUpdateError, Result};
pub use orchestrator::{
    OrchestrationFailure, UpdateError, UpdateItem, UpdateOrchestrator, UpdateRequest,
    UpdateStatus, UpdateUnitOfWork,
};
pub use provider::{
    OperationOutcome, OperationResultCode, ProviderError, ProviderUpdate, SearchCriteria,
    UpdateSourceProvider,
};
pub use runner::{
    OutputLog, RegistryError, RunnerError, TaskHandle, TaskRegistry, TaskResult, TaskRunner,
    UnitOfWork,
};
pub use service::HostUpdateService;
