//! Editorial review workflows for journal manuscripts and conference abstracts.
//!
//! The [`workflow`] module holds the entities and the pure transition guard;
//! [`service`] backs them with either a local JSON store or the remote REST
//! API, and [`desk::ReviewDesk`] is the per-user entry point the CLI drives.

pub mod cli;
pub mod commands;
pub mod config;
pub mod desk;
pub mod error;
pub mod service;
pub mod telemetry;
pub mod ui;
pub mod workflow;

pub use config::EditorialConfig;
pub use desk::{Assignments, ReviewDesk, WatchOptions};
pub use error::{ApiError, EditorialError, RequiredField, WorkflowError};
pub use service::{InMemoryWorkflowService, RestWorkflowService, StoreSnapshot, WorkflowService};
