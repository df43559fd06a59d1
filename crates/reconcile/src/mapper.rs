//! Translation between declared state, API payloads and observed state
//!
//! Everything here is pure. Responses are the source of truth: every computed
//! field must be present, otherwise mapping fails and the caller records a
//! diagnostic instead of persisting a partial state.

use crate::types::{Value, WorkspaceConfig, WorkspaceEntry, WorkspaceState};
use xata::{Workspace, WorkspaceMeta, WorkspaceSummary};

/// Errors from mapping between representations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    /// The API response omitted a field the state requires
    #[error("response is missing required field `{0}`")]
    MissingField(&'static str),

    /// A required input attribute was not set
    #[error("attribute `{0}` is required")]
    MissingInput(&'static str),

    /// An input attribute is still unknown at apply time
    #[error("attribute `{0}` is not known yet")]
    UnresolvedInput(&'static str),
}

impl MappingError {
    /// The attribute the error refers to
    pub fn attribute(&self) -> &'static str {
        match self {
            Self::MissingField(name) | Self::MissingInput(name) | Self::UnresolvedInput(name) => {
                *name
            }
        }
    }
}

/// Build the create request from declared state
pub fn to_create_payload(config: &WorkspaceConfig) -> Result<WorkspaceMeta, MappingError> {
    let name = required_input(&config.name, "name")?;
    if config.slug.is_unknown() {
        return Err(MappingError::UnresolvedInput("slug"));
    }
    let meta = WorkspaceMeta::new(name);
    Ok(match config.slug.non_empty() {
        Some(slug) => meta.with_slug(slug),
        None => meta,
    })
}

/// Build the update request from declared state
///
/// A slug the author did not pin (unset, unknown or empty) is carried over
/// from the prior state so the API never derives a new one.
pub fn to_update_payload(
    config: &WorkspaceConfig,
    prior: &WorkspaceState,
) -> Result<WorkspaceMeta, MappingError> {
    let name = required_input(&config.name, "name")?;
    let slug = config.slug.non_empty().unwrap_or(&prior.slug);
    Ok(WorkspaceMeta::new(name).with_slug(slug))
}

/// Map a full workspace response into observed state
///
/// `last_updated` is left empty; only the update path stamps it.
pub fn from_response(workspace: Workspace) -> Result<WorkspaceState, MappingError> {
    Ok(WorkspaceState {
        id: non_empty(workspace.id, "id")?,
        name: present(workspace.name, "name")?,
        slug: present(workspace.slug, "slug")?,
        member_count: present(workspace.member_count, "member_count")?,
        plan: present(workspace.plan, "plan")?,
        last_updated: None,
    })
}

/// Map a list entry into its read-only projection
pub fn entry_from_summary(summary: WorkspaceSummary) -> Result<WorkspaceEntry, MappingError> {
    Ok(WorkspaceEntry {
        id: non_empty(summary.id, "id")?,
        name: present(summary.name, "name")?,
        slug: present(summary.slug, "slug")?,
        role: present(summary.role, "role")?,
        plan: present(summary.plan, "plan")?,
    })
}

fn required_input(value: &Value<String>, name: &'static str) -> Result<String, MappingError> {
    match value {
        Value::Known(v) if !v.is_empty() => Ok(v.clone()),
        Value::Unknown => Err(MappingError::UnresolvedInput(name)),
        _ => Err(MappingError::MissingInput(name)),
    }
}

fn present<T>(value: Option<T>, name: &'static str) -> Result<T, MappingError> {
    value.ok_or(MappingError::MissingField(name))
}

fn non_empty(value: Option<String>, name: &'static str) -> Result<String, MappingError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(MappingError::MissingField(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use xata::{Plan, Role};

    fn full_response() -> Workspace {
        Workspace {
            id: Some("w-123".to_string()),
            name: Some("acme".to_string()),
            slug: Some("acme".to_string()),
            member_count: Some(1),
            plan: Some(Plan::Free),
        }
    }

    fn prior() -> WorkspaceState {
        from_response(full_response()).unwrap()
    }

    #[test]
    fn test_create_payload_name_only() {
        let meta = to_create_payload(&WorkspaceConfig::new("acme")).unwrap();
        assert_eq!(meta, WorkspaceMeta::new("acme"));
    }

    #[test]
    fn test_create_payload_with_slug() {
        let meta = to_create_payload(&WorkspaceConfig::new("acme").with_slug("ac")).unwrap();
        assert_eq!(meta.slug.as_deref(), Some("ac"));
    }

    #[test]
    fn test_create_payload_rejects_missing_or_unknown_inputs() {
        assert_eq!(
            to_create_payload(&WorkspaceConfig::default()),
            Err(MappingError::MissingInput("name"))
        );

        let mut config = WorkspaceConfig::new("acme");
        config.slug = Value::Unknown;
        assert_eq!(
            to_create_payload(&config),
            Err(MappingError::UnresolvedInput("slug"))
        );

        config.name = Value::Unknown;
        assert_eq!(
            to_create_payload(&config),
            Err(MappingError::UnresolvedInput("name"))
        );
    }

    #[test]
    fn test_update_payload_keeps_prior_slug() {
        let meta = to_update_payload(&WorkspaceConfig::new("acme2"), &prior()).unwrap();
        assert_eq!(meta.name, "acme2");
        assert_eq!(meta.slug.as_deref(), Some("acme"));

        let mut config = WorkspaceConfig::new("acme2");
        config.slug = Value::Unknown;
        let meta = to_update_payload(&config, &prior()).unwrap();
        assert_eq!(meta.slug.as_deref(), Some("acme"));
    }

    #[test]
    fn test_empty_slug_counts_as_unset() {
        let config = WorkspaceConfig::new("acme").with_slug("");
        assert_eq!(to_create_payload(&config).unwrap().slug, None);

        let config = WorkspaceConfig::new("acme2").with_slug("");
        let meta = to_update_payload(&config, &prior()).unwrap();
        assert_eq!(meta.slug.as_deref(), Some("acme"));
    }

    #[test]
    fn test_update_payload_prefers_declared_slug() {
        let config = WorkspaceConfig::new("acme").with_slug("new-slug");
        let meta = to_update_payload(&config, &prior()).unwrap();
        assert_eq!(meta.slug.as_deref(), Some("new-slug"));
    }

    #[test]
    fn test_from_response_full() {
        let state = from_response(full_response()).unwrap();
        assert_eq!(state.id, "w-123");
        assert_eq!(state.member_count, 1);
        assert_eq!(state.plan, Plan::Free);
        assert_eq!(state.last_updated, None);
    }

    #[test]
    fn test_from_response_missing_fields() {
        let missing_plan = Workspace {
            plan: None,
            ..full_response()
        };
        assert_eq!(
            from_response(missing_plan),
            Err(MappingError::MissingField("plan"))
        );

        let empty_id = Workspace {
            id: Some(String::new()),
            ..full_response()
        };
        assert_eq!(
            from_response(empty_id),
            Err(MappingError::MissingField("id"))
        );
    }

    #[test]
    fn test_round_trip_restores_inputs() {
        let original = prior();
        let payload = to_update_payload(&original.to_config(), &original).unwrap();
        let echoed = Workspace {
            name: Some(payload.name),
            slug: payload.slug,
            ..full_response()
        };
        let restored = from_response(echoed).unwrap();
        assert_eq!(restored.name, original.name);
        assert_eq!(restored.slug, original.slug);
        assert!(!restored.id.is_empty());
    }

    #[test]
    fn test_entry_from_summary() {
        let summary = WorkspaceSummary {
            id: Some("w-1".to_string()),
            name: Some("acme".to_string()),
            slug: Some("acme".to_string()),
            role: Some(Role::Owner),
            plan: Some(Plan::Pro),
        };
        let entry = entry_from_summary(summary.clone()).unwrap();
        assert_eq!(entry.role, Role::Owner);
        assert_eq!(entry.plan, Plan::Pro);

        let no_role = WorkspaceSummary {
            role: None,
            ..summary
        };
        let err = entry_from_summary(no_role).unwrap_err();
        assert_eq!(err.attribute(), "role");
    }
}
