//! Plan computation and display

use crate::config::Declaration;
use crate::state::ProviderState;
use colored::Colorize;
use reconcile::planner::{self, Action, PlannedChange};
use reconcile::{DiffSummary, Value, WorkspaceConfig, WorkspaceState};

/// Planned change for one instance, with the inputs needed to apply it
#[derive(Debug, Clone)]
pub struct InstancePlan {
    pub key: String,
    pub prior: Option<WorkspaceState>,
    pub config: WorkspaceConfig,
    pub change: PlannedChange,
}

impl InstancePlan {
    pub fn action(&self) -> Action {
        self.change.action
    }
}

/// Plan every declared instance, then every tracked instance that is no
/// longer declared
pub fn compute_plans(declaration: &Declaration, state: &ProviderState) -> Vec<InstancePlan> {
    let mut plans: Vec<InstancePlan> = declaration
        .workspaces
        .iter()
        .map(|decl| {
            let prior = state.get(&decl.key).cloned();
            let config = decl.to_config(prior.as_ref());
            let change = planner::plan(prior.as_ref(), &config);
            InstancePlan {
                key: decl.key.clone(),
                prior,
                config,
                change,
            }
        })
        .collect();

    plans.extend(
        state
            .workspaces
            .iter()
            .filter(|(key, _)| declaration.get(key).is_none())
            .map(|(key, prior)| destroy_plan(key, prior)),
    );
    plans
}

/// Plan the removal of every tracked instance
pub fn compute_destroy_plans(state: &ProviderState) -> Vec<InstancePlan> {
    state
        .workspaces
        .iter()
        .map(|(key, prior)| destroy_plan(key, prior))
        .collect()
}

fn destroy_plan(key: &str, prior: &WorkspaceState) -> InstancePlan {
    InstancePlan {
        key: key.to_string(),
        prior: Some(prior.clone()),
        config: prior.to_config(),
        change: planner::plan_destroy(prior),
    }
}

/// Display planned changes in a user-friendly format
pub fn display_plans(plans: &[InstancePlan]) -> DiffSummary {
    let summary: DiffSummary = plans.iter().map(|p| &p.change).collect();

    if !summary.has_changes() {
        println!();
        println!("  {} No changes. Workspaces match the declaration.", "✓".green());
        return summary;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Workspace Plan".bold()
    );
    println!("│");

    for plan in plans.iter().filter(|p| p.change.has_changes()) {
        let symbol = match plan.action() {
            Action::Create => "+".green(),
            Action::Update => "~".yellow(),
            Action::Delete => "-".red(),
            Action::NoOp => " ".normal(),
        };
        println!(
            "│ {} {} {}",
            symbol,
            plan.key.bold(),
            format!("(will {})", plan.action()).dimmed()
        );

        for change in &plan.change.changes {
            println!("│     {:<14} {}", change.attribute, describe(change));
        }
        println!("│");
    }

    println!("└─ {summary}");
    summary
}

fn describe(change: &reconcile::AttributeChange) -> String {
    let to = match &change.to {
        Value::Known(value) => format!("{value:?}"),
        Value::Unknown => "(known after apply)".to_string(),
        Value::Null => "null".to_string(),
    };
    match &change.from {
        Some(from) => format!("{from:?} → {to}"),
        None => to,
    }
}
