//! `apply` - make remote workspaces match the declaration

use anyhow::{Result, bail};

use super::{configure, load_declaration, load_state, record};
use crate::Context;
use crate::cli::ApplyArgs;
use crate::engine::{self, ExecuteOptions};
use crate::ui;

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let declaration = load_declaration(ctx)?;
    let (path, mut state) = load_state(ctx)?;
    let provider = configure(&declaration)?;

    if !ctx.quiet {
        ui::header("Apply");
    }

    let opts = ExecuteOptions {
        dry_run: args.dry_run,
        jobs: usize::from(args.jobs),
        yes: args.yes,
    };
    let plans = engine::compute_plans(&declaration, &state);
    let execution = engine::execute(&provider.workspaces(), plans, &opts)?;

    record(&provider, &mut state, &path, execution.outcomes)?;
    let summary = execution.summary;
    if summary.skipped > 0 {
        ui::dim(&format!("{} change(s) not applied", summary.skipped));
    }
    if !summary.is_success() {
        bail!("{} workspace change(s) failed", summary.failed);
    }
    Ok(())
}
