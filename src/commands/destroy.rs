//! `destroy` - delete every tracked workspace

use anyhow::{Result, bail};

use super::{configure, load_declaration_or_default, load_state, record};
use crate::Context;
use crate::engine::{self, ExecuteOptions};
use crate::ui;

pub fn run(ctx: &Context, yes: bool, dry_run: bool) -> Result<()> {
    let (path, mut state) = load_state(ctx)?;
    if state.workspaces.is_empty() {
        ui::info("No tracked workspaces to destroy");
        return Ok(());
    }

    let declaration = load_declaration_or_default(ctx)?;
    let provider = configure(&declaration)?;

    if !ctx.quiet {
        ui::header("Destroy");
    }

    let opts = ExecuteOptions {
        dry_run,
        yes,
        ..ExecuteOptions::default()
    };
    let plans = engine::compute_destroy_plans(&state);
    let execution = engine::execute(&provider.workspaces(), plans, &opts)?;

    record(&provider, &mut state, &path, execution.outcomes)?;
    let summary = execution.summary;
    if summary.skipped > 0 {
        ui::dim(&format!("{} change(s) not applied", summary.skipped));
    }
    if !summary.is_success() {
        bail!("{} workspace(s) could not be deleted", summary.failed);
    }
    Ok(())
}
