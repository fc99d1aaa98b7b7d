//! fieldsync-core - Core library for fieldsync
//!
//! Mirrors a remote health information dataset into a local SQLite store.
//! The reconciliation engine applies server entity graphs (upsert or delete,
//! parent before child) inside one transaction per pass; the status tracker
//! follows locally authored rows until they are pushed.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handler;
pub mod models;
pub mod payload;
pub mod status;
pub mod sync;
pub mod task;

pub use auth::{Authentication, Credentials, HttpUserService, UserService};
pub use config::EngineConfig;
pub use db::{Database, SharedDatabase, Stores};
pub use error::{Error, Result};
pub use handler::{Counts, EntityFailure, EntityKind, ReconcileReport};
pub use models::State;
pub use payload::Batch;
pub use status::{LocalWriter, StatusTracker};
pub use sync::{FailurePolicy, PassState, Reconciler};
pub use task::{Task, TaskHandle, UserAuthenticateTask};
