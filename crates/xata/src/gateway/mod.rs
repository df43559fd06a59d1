//! Gateway trait and implementations for the workspace API.
//!
//! [`Gateway`] is the seam between reconciliation logic and the network.
//! [`http::HttpGateway`] talks to the real API; [`MockGateway`] keeps
//! workspaces in memory for tests.
//!
//! # Testing
//!
//! ```
//! use xata::gateway::{Gateway, MockGateway};
//! use xata::WorkspaceMeta;
//!
//! let mock = MockGateway::new().with_next_id(123);
//! let created = mock.create(&WorkspaceMeta::new("acme")).unwrap();
//! assert_eq!(created.id.as_deref(), Some("w-123"));
//! assert_eq!(mock.list().unwrap().len(), 1);
//! ```

pub mod http;

use crate::error::{Error, Result};
use crate::types::{Plan, Role, Workspace, WorkspaceMeta, WorkspaceSummary};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Remote operations over the workspace resource type.
///
/// Implementations own transport, authentication and any retry policy.
/// A missing workspace must be reported as [`Error::NotFound`] so callers
/// can distinguish drift from failure.
pub trait Gateway: Send + Sync {
    /// Create a workspace.
    fn create(&self, payload: &WorkspaceMeta) -> Result<Workspace>;

    /// Fetch a workspace by identifier.
    fn get(&self, id: &str) -> Result<Workspace>;

    /// Replace a workspace's mutable attributes.
    fn update(&self, id: &str, payload: &WorkspaceMeta) -> Result<Workspace>;

    /// Delete a workspace.
    fn delete(&self, id: &str) -> Result<()>;

    /// List all workspaces visible to the caller.
    fn list(&self) -> Result<Vec<WorkspaceSummary>>;
}

/// Gateway operation, used to record calls and inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Get,
    Update,
    Delete,
    List,
}

/// A call observed by [`MockGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(WorkspaceMeta),
    Get(String),
    Update(String, WorkspaceMeta),
    Delete(String),
    List,
}

impl Call {
    /// The operation this call performed.
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::Create(_) => Operation::Create,
            Self::Get(_) => Operation::Get,
            Self::Update(..) => Operation::Update,
            Self::Delete(_) => Operation::Delete,
            Self::List => Operation::List,
        }
    }
}

#[derive(Debug, Clone)]
enum Fault {
    Status { status: u16, message: String },
    Malformed,
    ForeignId(String),
}

#[derive(Debug)]
struct MockState {
    workspaces: Vec<Workspace>,
    next_id: u64,
    faults: HashMap<Operation, Fault>,
    calls: Vec<Call>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            workspaces: Vec::new(),
            next_id: 1,
            faults: HashMap::new(),
            calls: Vec::new(),
        }
    }
}

/// In-memory gateway for testing without network access.
///
/// Created workspaces get identifiers `w-<n>`, plan `free` and one member.
/// Slugs not supplied by the caller are derived from the name. Clones share
/// the same backing store.
#[derive(Debug, Clone, Default)]
pub struct MockGateway {
    state: Arc<Mutex<MockState>>,
}

impl MockGateway {
    /// Create an empty mock gateway.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the numeric suffix of the next generated identifier.
    #[must_use]
    pub fn with_next_id(self, next_id: u64) -> Self {
        self.lock().next_id = next_id;
        self
    }

    /// Make every call of `operation` fail with the given HTTP status.
    pub fn fail(&self, operation: Operation, status: u16, message: impl Into<String>) {
        self.lock().faults.insert(
            operation,
            Fault::Status {
                status,
                message: message.into(),
            },
        );
    }

    /// Make `operation` succeed but return a response missing computed fields.
    pub fn malformed(&self, operation: Operation) {
        self.lock().faults.insert(operation, Fault::Malformed);
    }

    /// Make `operation` succeed but report `id` as the workspace identifier.
    pub fn foreign_id(&self, operation: Operation, id: impl Into<String>) {
        self.lock()
            .faults
            .insert(operation, Fault::ForeignId(id.into()));
    }

    /// Remove any injected failure for `operation`.
    pub fn recover(&self, operation: Operation) {
        self.lock().faults.remove(&operation);
    }

    /// Remove a workspace behind the caller's back (simulates drift).
    pub fn remove_out_of_band(&self, id: &str) {
        self.lock()
            .workspaces
            .retain(|w| w.id.as_deref() != Some(id));
    }

    /// All calls made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Number of calls made for `operation`.
    #[must_use]
    pub fn count(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    /// Snapshot of a stored workspace.
    #[must_use]
    pub fn workspace(&self, id: &str) -> Option<Workspace> {
        self.lock()
            .workspaces
            .iter()
            .find(|w| w.id.as_deref() == Some(id))
            .cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MockState {
    fn record(&mut self, call: Call) -> Result<Option<Fault>> {
        let operation = call.operation();
        self.calls.push(call);
        match self.faults.get(&operation).cloned() {
            Some(Fault::Status { status, message }) => {
                Err(Error::from_status(status, "workspace", message))
            }
            fault => Ok(fault),
        }
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.workspaces
            .iter()
            .position(|w| w.id.as_deref() == Some(id))
            .ok_or_else(|| Error::NotFound {
                resource: format!("workspace {id}"),
                message: "workspace not found".to_string(),
            })
    }
}

/// Lowercase the name and collapse anything non-alphanumeric into `-`.
fn derive_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

fn respond(workspace: &Workspace, fault: Option<Fault>) -> Workspace {
    match fault {
        Some(Fault::Malformed) => Workspace {
            member_count: None,
            plan: None,
            ..workspace.clone()
        },
        Some(Fault::ForeignId(id)) => Workspace {
            id: Some(id),
            ..workspace.clone()
        },
        Some(Fault::Status { .. }) | None => workspace.clone(),
    }
}

impl Gateway for MockGateway {
    fn create(&self, payload: &WorkspaceMeta) -> Result<Workspace> {
        let mut state = self.lock();
        let fault = state.record(Call::Create(payload.clone()))?;

        let slug = payload
            .slug
            .clone()
            .unwrap_or_else(|| derive_slug(&payload.name));
        if state
            .workspaces
            .iter()
            .any(|w| w.slug.as_deref() == Some(slug.as_str()))
        {
            return Err(Error::Conflict {
                message: format!("workspace with slug {slug} already exists"),
            });
        }

        let id = format!("w-{}", state.next_id);
        state.next_id += 1;

        let workspace = Workspace {
            id: Some(id),
            name: Some(payload.name.clone()),
            slug: Some(slug),
            member_count: Some(1),
            plan: Some(Plan::Free),
        };
        state.workspaces.push(workspace.clone());
        Ok(respond(&workspace, fault))
    }

    fn get(&self, id: &str) -> Result<Workspace> {
        let mut state = self.lock();
        let fault = state.record(Call::Get(id.to_string()))?;
        let index = state.position(id)?;
        Ok(respond(&state.workspaces[index], fault))
    }

    fn update(&self, id: &str, payload: &WorkspaceMeta) -> Result<Workspace> {
        let mut state = self.lock();
        let fault = state.record(Call::Update(id.to_string(), payload.clone()))?;
        let index = state.position(id)?;

        let workspace = &mut state.workspaces[index];
        workspace.name = Some(payload.name.clone());
        workspace.slug = Some(
            payload
                .slug
                .clone()
                .unwrap_or_else(|| derive_slug(&payload.name)),
        );
        let updated = workspace.clone();
        Ok(respond(&updated, fault))
    }

    fn delete(&self, id: &str) -> Result<()> {
        let mut state = self.lock();
        state.record(Call::Delete(id.to_string()))?;
        let index = state.position(id)?;
        state.workspaces.remove(index);
        Ok(())
    }

    fn list(&self) -> Result<Vec<WorkspaceSummary>> {
        let mut state = self.lock();
        let fault = state.record(Call::List)?;
        Ok(state
            .workspaces
            .iter()
            .map(|w| WorkspaceSummary {
                id: w.id.clone(),
                name: w.name.clone(),
                slug: w.slug.clone(),
                role: match fault {
                    Some(Fault::Malformed) => None,
                    _ => Some(Role::Owner),
                },
                plan: w.plan.clone(),
            })
            .collect())
    }
}
