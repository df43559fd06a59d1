//! Wire types for the Xata workspace API.
//!
//! Response types keep every field optional: the API is the source of truth
//! and callers decide which fields they require.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Billing tier of a workspace.
///
/// Unrecognized tiers are preserved verbatim in [`Plan::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Plan {
    /// Free tier.
    Free,
    /// Paid tier.
    Pro,
    /// A tier this client does not know about yet.
    Unknown(String),
}

impl Plan {
    /// Wire representation of the plan.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Unknown(other) => other,
        }
    }
}

impl From<String> for Plan {
    fn from(value: String) -> Self {
        match value.as_str() {
            "free" => Self::Free,
            "pro" => Self::Pro,
            _ => Self::Unknown(value),
        }
    }
}

impl From<Plan> for String {
    fn from(plan: Plan) -> Self {
        match plan {
            Plan::Unknown(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of the calling user inside a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Full control over the workspace.
    Owner,
    /// Can manage databases but not members or billing.
    Maintainer,
    /// A role this client does not know about yet.
    Unknown(String),
}

impl Role {
    /// Wire representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Owner => "owner",
            Self::Maintainer => "maintainer",
            Self::Unknown(other) => other,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "owner" => Self::Owner,
            "maintainer" => Self::Maintainer,
            _ => Self::Unknown(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Unknown(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body for creating or updating a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceMeta {
    /// Display name.
    pub name: String,
    /// URL-safe identifier; derived from the name by the API when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl WorkspaceMeta {
    /// Create a payload with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: None,
        }
    }

    /// Set an explicit slug.
    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }
}

/// A workspace as returned by create, get and update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub member_count: Option<i64>,
    #[serde(default)]
    pub plan: Option<Plan>,
}

/// A workspace entry as returned by the list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSummary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub plan: Option<Plan>,
}
