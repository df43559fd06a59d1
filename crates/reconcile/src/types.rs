//! Core types for workspace reconciliation

use crate::diagnostics::Diagnostics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use xata::{Plan, Role};

/// An attribute value as seen at plan time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value<T> {
    /// Not set by the author.
    #[default]
    Null,
    /// Set, but not resolvable until another resource is applied.
    Unknown,
    /// Set and resolved.
    Known(T),
}

impl<T> Value<T> {
    /// Get the resolved value, if any
    pub fn known(&self) -> Option<&T> {
        match self {
            Self::Known(value) => Some(value),
            _ => None,
        }
    }

    /// Check if the value is resolved
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// Check if the value is deferred
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Check if the value was left unset
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl Value<String> {
    /// The resolved value, unless it is empty
    pub fn non_empty(&self) -> Option<&str> {
        self.known().map(String::as_str).filter(|v| !v.is_empty())
    }
}

impl<T> From<Option<T>> for Value<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Known)
    }
}

/// How an attribute's value comes into being
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Must be supplied by the author before create
    Required,
    /// May be supplied; the API applies a default otherwise
    Optional,
    /// Only ever produced by the API
    Computed,
    /// May be supplied; otherwise produced by the API once and then kept
    ComputedWithFallback,
}

impl FieldKind {
    /// Whether the author may set this attribute
    pub fn is_settable(&self) -> bool {
        !matches!(self, Self::Computed)
    }
}

/// Schema entry for one workspace attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
}

/// Attributes of the `xata_workspace` resource
pub const WORKSPACE_ATTRIBUTES: &[Attribute] = &[
    Attribute {
        name: "name",
        kind: FieldKind::Required,
        description: "Name of the workspace.",
    },
    Attribute {
        name: "slug",
        kind: FieldKind::ComputedWithFallback,
        description: "Slug identifier of the workspace.",
    },
    Attribute {
        name: "id",
        kind: FieldKind::Computed,
        description: "Identifier of the workspace.",
    },
    Attribute {
        name: "member_count",
        kind: FieldKind::Computed,
        description: "Member count of the workspace.",
    },
    Attribute {
        name: "plan",
        kind: FieldKind::Computed,
        description: "Tier of the workspace.",
    },
    Attribute {
        name: "last_updated",
        kind: FieldKind::Computed,
        description: "Timestamp of the last update applied by this provider.",
    },
];

/// Look up an attribute's kind by name
pub fn attribute_kind(name: &str) -> Option<FieldKind> {
    WORKSPACE_ATTRIBUTES
        .iter()
        .find(|a| a.name == name)
        .map(|a| a.kind)
}

/// Desired state of one workspace, as declared by the author
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkspaceConfig {
    /// Identifier; absent before create, carried from state afterwards
    pub id: Value<String>,
    pub name: Value<String>,
    pub slug: Value<String>,
}

impl WorkspaceConfig {
    /// Declare a workspace by name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Value::Known(name.into()),
            ..Self::default()
        }
    }

    /// Set an explicit slug
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Value::Known(slug.into());
        self
    }

    /// Attach the identifier of an existing workspace
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Value::Known(id.into());
        self
    }

    /// Get a string attribute by schema name
    pub fn get(&self, attribute: &str) -> Option<&Value<String>> {
        match attribute {
            "id" => Some(&self.id),
            "name" => Some(&self.name),
            "slug" => Some(&self.slug),
            _ => None,
        }
    }

    /// Get a mutable string attribute by schema name
    pub fn get_mut(&mut self, attribute: &str) -> Option<&mut Value<String>> {
        match attribute {
            "id" => Some(&mut self.id),
            "name" => Some(&mut self.name),
            "slug" => Some(&mut self.slug),
            _ => None,
        }
    }
}

/// Observed state of one workspace, as last reported by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceState {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub member_count: i64,
    pub plan: Plan,
    /// Set by update; absent after create and import
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl WorkspaceState {
    /// Desired state that would reproduce this workspace unchanged
    pub fn to_config(&self) -> WorkspaceConfig {
        WorkspaceConfig {
            id: Value::Known(self.id.clone()),
            name: Value::Known(self.name.clone()),
            slug: Value::Known(self.slug.clone()),
        }
    }

    /// Render an attribute by schema name for display
    pub fn attribute(&self, attribute: &str) -> Option<String> {
        match attribute {
            "id" => Some(self.id.clone()),
            "name" => Some(self.name.clone()),
            "slug" => Some(self.slug.clone()),
            "member_count" => Some(self.member_count.to_string()),
            "plan" => Some(self.plan.to_string()),
            "last_updated" => self.last_updated.map(|t| t.to_rfc3339()),
            _ => None,
        }
    }
}

/// Read-only projection of a workspace for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceEntry {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub role: Role,
    pub plan: Plan,
}

/// What the host should do with its tracked state after a call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange<T> {
    /// Replace tracked state with this value
    Set(T),
    /// Stop tracking the instance
    Remove,
    /// Leave tracked state as it was
    Keep,
}

/// Result of one lifecycle call
#[derive(Debug, Clone)]
pub struct Response<T> {
    pub state: StateChange<T>,
    pub diagnostics: Diagnostics,
}

impl<T> Response<T> {
    pub(crate) fn set(state: T, diagnostics: Diagnostics) -> Self {
        Self {
            state: StateChange::Set(state),
            diagnostics,
        }
    }

    pub(crate) fn remove(diagnostics: Diagnostics) -> Self {
        Self {
            state: StateChange::Remove,
            diagnostics,
        }
    }

    pub(crate) fn keep(diagnostics: Diagnostics) -> Self {
        Self {
            state: StateChange::Keep,
            diagnostics,
        }
    }

    /// Check if the call finished without a fatal diagnostic
    pub fn is_success(&self) -> bool {
        !self.diagnostics.has_error()
    }

    /// The new state, if the call produced one
    pub fn state(&self) -> Option<&T> {
        match &self.state {
            StateChange::Set(state) => Some(state),
            _ => None,
        }
    }

    /// Consume the response, returning the new state if any
    pub fn into_state(self) -> Option<T> {
        match self.state {
            StateChange::Set(state) => Some(state),
            _ => None,
        }
    }
}

/// Result of listing workspaces
#[derive(Debug, Clone, Default)]
pub struct ListResponse {
    pub entries: Vec<WorkspaceEntry>,
    pub diagnostics: Diagnostics,
}
