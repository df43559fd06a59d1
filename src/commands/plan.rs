//! `plan` - preview what apply would change
//!
//! Works from tracked state only; run `refresh` first to pick up drift.

use anyhow::Result;

use super::{load_declaration, load_state};
use crate::Context;
use crate::engine;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    let declaration = load_declaration(ctx)?;
    let (_, state) = load_state(ctx)?;

    if !ctx.quiet {
        ui::header("Plan");
    }

    let plans = engine::compute_plans(&declaration, &state);
    let summary = engine::display_plans(&plans);

    if summary.has_changes() && !ctx.quiet {
        println!();
        ui::dim("Run 'xata-provider apply' to make these changes.");
    }
    Ok(())
}
