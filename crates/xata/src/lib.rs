//! # xata
//!
//! Blocking client for the Xata workspace management API.
//!
//! The crate exposes the [`Gateway`](gateway::Gateway) trait, which covers the
//! create/get/update/delete/list operations on workspaces, together with two
//! implementations:
//!
//! - [`HttpGateway`](gateway::http::HttpGateway) talks to the REST API with a
//!   bearer token.
//! - [`MockGateway`](gateway::MockGateway) keeps workspaces in memory and
//!   supports failure injection for tests.
//!
//! ## Example
//!
//! ```no_run
//! use xata::gateway::Gateway;
//! use xata::gateway::http::HttpGateway;
//! use xata::WorkspaceMeta;
//!
//! let gateway = HttpGateway::new(std::env::var("XATA_API_KEY").unwrap());
//! let workspace = gateway.create(&WorkspaceMeta::new("acme")).unwrap();
//! println!("created {:?}", workspace.id);
//! ```

#![warn(clippy::all)]

pub mod error;
pub mod gateway;
pub mod types;

pub use error::{Error, ErrorCategory, Result};
pub use gateway::{Gateway, MockGateway};
pub use types::{Plan, Role, Workspace, WorkspaceMeta, WorkspaceSummary};
