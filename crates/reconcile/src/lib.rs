//! # reconcile
//!
//! Lifecycle engine for Xata workspaces managed as declarative resources.
//!
//! A host (CLI, plan/apply engine) owns persisted state and calls into this
//! crate with declared and prior state. Every call returns the state change
//! the host should apply together with the [`Diagnostics`] produced; fatal
//! diagnostics mean the call aborted and prior state stays authoritative.
//!
//! ## Components
//!
//! - [`credential`] - resolves the API key and masks it in output
//! - [`lifecycle`] - create/read/update/delete/import for one workspace
//! - [`collection`] - lists every workspace visible to the key
//! - [`mapper`] - pure translation between state and API payloads
//! - [`planner`] - decides which lifecycle call a workspace needs
//! - [`provider`] - configuration and wiring
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use reconcile::{Provider, WorkspaceConfig};
//! use xata::MockGateway;
//!
//! let provider = Provider::with_gateway(Arc::new(MockGateway::new()));
//! let response = provider.workspaces().create(&WorkspaceConfig::new("acme"));
//! assert!(response.is_success());
//! ```

#![warn(clippy::all)]

pub mod collection;
pub mod credential;
pub mod diagnostics;
pub mod lifecycle;
pub mod mapper;
pub mod planner;
pub mod provider;
pub mod types;

pub use collection::WorkspaceCollection;
pub use credential::{Credential, CredentialError, Redactor};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use lifecycle::WorkspaceController;
pub use mapper::MappingError;
pub use planner::{Action, AttributeChange, DiffSummary, PlannedChange};
pub use provider::{Provider, ProviderConfig};
pub use types::{
    FieldKind, ListResponse, Response, StateChange, Value, WorkspaceConfig, WorkspaceEntry,
    WorkspaceState,
};
