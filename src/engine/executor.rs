//! Execution engine - applies planned changes with parallelism

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use rayon::prelude::*;

use reconcile::planner::Action;
use reconcile::{Response, WorkspaceController, WorkspaceState};

use super::differ::{InstancePlan, display_plans};

/// Options for execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Number of parallel jobs
    pub jobs: usize,
    /// Skip confirmation prompts
    pub yes: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
            yes: false,
        }
    }
}

/// Summary of execution results
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExecuteSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub no_change: usize,
}

impl ExecuteSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn add(&mut self, action: Action, response: &Response<WorkspaceState>) {
        if !response.is_success() {
            self.failed += 1;
            return;
        }
        match action {
            Action::Create => self.created += 1,
            Action::Update => self.updated += 1,
            Action::Delete => self.deleted += 1,
            Action::NoOp => self.no_change += 1,
        }
    }
}

/// Result of one lifecycle call made during execution
#[derive(Debug)]
pub struct InstanceOutcome {
    pub key: String,
    pub action: Action,
    pub response: Response<WorkspaceState>,
}

#[derive(Debug, Default)]
pub struct Execution {
    pub summary: ExecuteSummary,
    pub outcomes: Vec<InstanceOutcome>,
}

/// Display, confirm and apply a set of planned changes
pub fn execute(
    controller: &WorkspaceController,
    plans: Vec<InstancePlan>,
    opts: &ExecuteOptions,
) -> Result<Execution> {
    let diff = display_plans(&plans);

    if !diff.has_changes() {
        return Ok(Execution {
            summary: ExecuteSummary {
                no_change: diff.no_op,
                ..Default::default()
            },
            outcomes: Vec::new(),
        });
    }

    if !opts.yes && !opts.dry_run && !confirm_proceed()? {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(Execution {
            summary: ExecuteSummary {
                skipped: diff.total_changes(),
                ..Default::default()
            },
            outcomes: Vec::new(),
        });
    }

    if opts.dry_run {
        println!();
        println!("  {} Dry run - no changes made", "ℹ".blue());
        return Ok(Execution::default());
    }

    let pending: Vec<InstancePlan> = plans
        .into_iter()
        .filter(|plan| plan.change.has_changes())
        .collect();

    println!();
    println!(
        "  {} Applying {} workspace changes...",
        "→".cyan(),
        pending.len()
    );

    let outcomes = execute_parallel(controller, &pending, opts.jobs)?;

    let mut summary = ExecuteSummary {
        no_change: diff.no_op,
        ..Default::default()
    };
    for outcome in &outcomes {
        summary.add(outcome.action, &outcome.response);
    }

    print_summary(&summary);
    Ok(Execution { summary, outcomes })
}

/// Apply plans in parallel; no two plans share an instance
fn execute_parallel(
    controller: &WorkspaceController,
    plans: &[InstancePlan],
    jobs: usize,
) -> Result<Vec<InstanceOutcome>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .context("Failed to create apply thread pool")?;

    let outcomes: Vec<InstanceOutcome> = pool.install(|| {
        plans
            .par_iter()
            .filter_map(|plan| {
                let response = apply_instance(controller, plan)?;
                let symbol = if response.is_success() {
                    "✓".green()
                } else {
                    "✗".red()
                };
                println!("    {} {} {}", symbol, plan.action(), plan.key);
                Some(InstanceOutcome {
                    key: plan.key.clone(),
                    action: plan.action(),
                    response,
                })
            })
            .collect()
    });

    Ok(outcomes)
}

fn apply_instance(
    controller: &WorkspaceController,
    plan: &InstancePlan,
) -> Option<Response<WorkspaceState>> {
    match (plan.action(), &plan.prior) {
        (Action::NoOp, _) | (Action::Delete, None) => None,
        (Action::Create, _) | (Action::Update, None) => Some(controller.create(&plan.config)),
        (Action::Update, Some(prior)) => {
            Some(controller.update(&prior.id, &plan.change.planned, prior))
        }
        (Action::Delete, Some(prior)) => Some(controller.delete(&prior.id)),
    }
}

/// Confirm with user
fn confirm_proceed() -> Result<bool> {
    use dialoguer::Confirm;

    let confirmed = Confirm::new()
        .with_prompt("Continue?")
        .default(true)
        .interact()?;

    Ok(confirmed)
}

/// Print final summary
fn print_summary(summary: &ExecuteSummary) {
    println!();
    if summary.is_success() {
        println!("  {} Workspaces applied successfully!", "✓".green().bold());
    } else {
        println!("  {} Workspaces applied with errors", "⚠".yellow().bold());
    }

    if summary.created > 0 {
        println!("    • {} workspaces created", summary.created);
    }
    if summary.updated > 0 {
        println!("    • {} workspaces updated", summary.updated);
    }
    if summary.deleted > 0 {
        println!("    • {} workspaces deleted", summary.deleted);
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "workspaces".red());
    }
}
