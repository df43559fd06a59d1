//! Plan computation - decide which lifecycle call a workspace needs
//!
//! Planning is driven by the attribute table in [`WORKSPACE_ATTRIBUTES`]:
//! settable attributes are compared against prior state, computed ones are
//! carried over from prior state or marked as known after apply.

use crate::types::{FieldKind, Value, WORKSPACE_ATTRIBUTES, WorkspaceConfig, WorkspaceState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle call a planned change maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
    #[serde(rename = "no-op")]
    NoOp,
}

impl Action {
    /// Symbol used when rendering a plan
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Create => "+",
            Self::Update => "~",
            Self::Delete => "-",
            Self::NoOp => " ",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::NoOp => "no-op",
        };
        f.write_str(name)
    }
}

/// One attribute that will change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    pub attribute: &'static str,
    /// Value in prior state, if any
    pub from: Option<String>,
    /// Planned value; `Unknown` means known after apply, `Null` means removed
    pub to: Value<String>,
}

/// Planned change for one workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedChange {
    pub action: Action,
    /// Declared state with prior values filled in where the author left gaps
    pub planned: WorkspaceConfig,
    pub changes: Vec<AttributeChange>,
}

impl PlannedChange {
    /// Check if applying this plan would call the API
    pub fn has_changes(&self) -> bool {
        self.action != Action::NoOp
    }
}

/// Plan the transition from `prior` to the declared `config`
pub fn plan(prior: Option<&WorkspaceState>, config: &WorkspaceConfig) -> PlannedChange {
    match prior {
        None => plan_create(config),
        Some(prior) => plan_update(prior, config),
    }
}

/// Plan the removal of a tracked workspace
pub fn plan_destroy(prior: &WorkspaceState) -> PlannedChange {
    let changes = WORKSPACE_ATTRIBUTES
        .iter()
        .filter_map(|attr| {
            prior.attribute(attr.name).map(|from| AttributeChange {
                attribute: attr.name,
                from: Some(from),
                to: Value::Null,
            })
        })
        .collect();

    PlannedChange {
        action: Action::Delete,
        planned: WorkspaceConfig {
            id: Value::Known(prior.id.clone()),
            ..WorkspaceConfig::default()
        },
        changes,
    }
}

fn plan_create(config: &WorkspaceConfig) -> PlannedChange {
    let mut planned = config.clone();
    planned.id = Value::Unknown;
    if planned.slug.non_empty().is_none() {
        planned.slug = Value::Unknown;
    }

    let changes = WORKSPACE_ATTRIBUTES
        .iter()
        .filter(|attr| attr.name != "last_updated")
        .map(|attr| AttributeChange {
            attribute: attr.name,
            from: None,
            to: match planned.get(attr.name) {
                Some(value) => value.clone(),
                None => Value::Unknown,
            },
        })
        .collect();

    PlannedChange {
        action: Action::Create,
        planned,
        changes,
    }
}

fn plan_update(prior: &WorkspaceState, config: &WorkspaceConfig) -> PlannedChange {
    let mut planned = config.clone();
    let mut changes = Vec::new();

    for attr in WORKSPACE_ATTRIBUTES {
        let from = prior.attribute(attr.name);
        match attr.kind {
            FieldKind::Computed => {
                if let Some(value) = planned.get_mut(attr.name) {
                    *value = from.clone().into();
                }
            }
            FieldKind::ComputedWithFallback => {
                let Some(value) = planned.get_mut(attr.name) else {
                    continue;
                };
                if value.non_empty().is_none() {
                    *value = from.clone().into();
                }
                if value.known() != from.as_ref() {
                    changes.push(AttributeChange {
                        attribute: attr.name,
                        from,
                        to: value.clone(),
                    });
                }
            }
            FieldKind::Required | FieldKind::Optional => {
                let Some(value) = planned.get(attr.name) else {
                    continue;
                };
                if value.known() != from.as_ref() {
                    changes.push(AttributeChange {
                        attribute: attr.name,
                        from,
                        to: value.clone(),
                    });
                }
            }
        }
    }

    let action = if changes.is_empty() {
        Action::NoOp
    } else {
        changes.push(AttributeChange {
            attribute: "last_updated",
            from: prior.attribute("last_updated"),
            to: Value::Unknown,
        });
        Action::Update
    };

    PlannedChange {
        action,
        planned,
        changes,
    }
}

/// Counts of planned actions across instances
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub no_op: usize,
}

impl DiffSummary {
    /// Count one planned change
    pub fn add(&mut self, change: &PlannedChange) {
        match change.action {
            Action::Create => self.create += 1,
            Action::Update => self.update += 1,
            Action::Delete => self.delete += 1,
            Action::NoOp => self.no_op += 1,
        }
    }

    /// Number of instances that would change
    pub fn total_changes(&self) -> usize {
        self.create + self.update + self.delete
    }

    pub fn has_changes(&self) -> bool {
        self.total_changes() > 0
    }
}

impl<'a> FromIterator<&'a PlannedChange> for DiffSummary {
    fn from_iter<I: IntoIterator<Item = &'a PlannedChange>>(iter: I) -> Self {
        let mut summary = Self::default();
        for change in iter {
            summary.add(change);
        }
        summary
    }
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to delete",
            self.create, self.update, self.delete
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xata::Plan;

    fn prior() -> WorkspaceState {
        WorkspaceState {
            id: "w-123".to_string(),
            name: "acme".to_string(),
            slug: "acme".to_string(),
            member_count: 1,
            plan: Plan::Free,
            last_updated: None,
        }
    }

    fn change<'a>(plan: &'a PlannedChange, attribute: &str) -> Option<&'a AttributeChange> {
        plan.changes.iter().find(|c| c.attribute == attribute)
    }

    #[test]
    fn test_plan_create() {
        let planned = plan(None, &WorkspaceConfig::new("acme"));
        assert_eq!(planned.action, Action::Create);
        assert_eq!(planned.planned.id, Value::Unknown);
        assert_eq!(planned.planned.slug, Value::Unknown);
        assert_eq!(
            change(&planned, "name").unwrap().to,
            Value::Known("acme".to_string())
        );
        assert_eq!(change(&planned, "plan").unwrap().to, Value::Unknown);
        assert!(change(&planned, "last_updated").is_none());
    }

    #[test]
    fn test_plan_create_keeps_declared_slug() {
        let planned = plan(None, &WorkspaceConfig::new("acme").with_slug("ac"));
        assert_eq!(planned.planned.slug, Value::Known("ac".to_string()));
    }

    #[test]
    fn test_plan_unchanged_is_noop() {
        let prior = prior();
        let planned = plan(Some(&prior), &WorkspaceConfig::new("acme"));
        assert_eq!(planned.action, Action::NoOp);
        assert!(planned.changes.is_empty());
        assert_eq!(planned.planned.id, Value::Known("w-123".to_string()));
        assert_eq!(planned.planned.slug, Value::Known("acme".to_string()));
    }

    #[test]
    fn test_plan_unknown_slug_uses_prior() {
        let prior = prior();
        let mut config = WorkspaceConfig::new("acme");
        config.slug = Value::Unknown;
        let planned = plan(Some(&prior), &config);
        assert_eq!(planned.action, Action::NoOp);
        assert_eq!(planned.planned.slug, Value::Known("acme".to_string()));
    }

    #[test]
    fn test_plan_empty_slug_uses_prior() {
        let prior = prior();
        let planned = plan(Some(&prior), &WorkspaceConfig::new("acme").with_slug(""));
        assert_eq!(planned.action, Action::NoOp);
        assert_eq!(planned.planned.slug, Value::Known("acme".to_string()));

        let created = plan(None, &WorkspaceConfig::new("acme").with_slug(""));
        assert_eq!(created.planned.slug, Value::Unknown);
    }

    #[test]
    fn test_plan_rename() {
        let prior = prior();
        let planned = plan(Some(&prior), &WorkspaceConfig::new("acme2"));
        assert_eq!(planned.action, Action::Update);
        let name = change(&planned, "name").unwrap();
        assert_eq!(name.from.as_deref(), Some("acme"));
        assert_eq!(name.to, Value::Known("acme2".to_string()));
        assert_eq!(change(&planned, "last_updated").unwrap().to, Value::Unknown);
        assert!(change(&planned, "slug").is_none());
    }

    #[test]
    fn test_plan_new_slug() {
        let prior = prior();
        let planned = plan(Some(&prior), &WorkspaceConfig::new("acme").with_slug("other"));
        assert_eq!(planned.action, Action::Update);
        assert!(change(&planned, "slug").is_some());
    }

    #[test]
    fn test_plan_destroy() {
        let planned = plan_destroy(&prior());
        assert_eq!(planned.action, Action::Delete);
        assert!(planned.changes.iter().all(|c| c.to.is_null()));
        assert_eq!(planned.planned.id, Value::Known("w-123".to_string()));
    }

    #[test]
    fn test_diff_summary() {
        let prior = prior();
        let plans = [
            plan(None, &WorkspaceConfig::new("new")),
            plan(Some(&prior), &WorkspaceConfig::new("renamed")),
            plan(Some(&prior), &WorkspaceConfig::new("acme")),
            plan_destroy(&prior),
        ];
        let summary: DiffSummary = plans.iter().collect();
        assert_eq!(summary.create, 1);
        assert_eq!(summary.update, 1);
        assert_eq!(summary.delete, 1);
        assert_eq!(summary.no_op, 1);
        assert_eq!(summary.total_changes(), 3);
        assert_eq!(summary.to_string(), "1 to create, 1 to update, 1 to delete");
    }
}
