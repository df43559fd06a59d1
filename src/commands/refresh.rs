//! `refresh` - re-read tracked workspaces and record drift

use anyhow::{Result, bail};
use reconcile::StateChange;

use super::{configure, load_declaration_or_default, load_state};
use crate::Context;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    let (path, mut state) = load_state(ctx)?;
    if state.workspaces.is_empty() {
        ui::info("No tracked workspaces to refresh");
        return Ok(());
    }

    let declaration = load_declaration_or_default(ctx)?;
    let provider = configure(&declaration)?;
    let controller = provider.workspaces();

    if !ctx.quiet {
        ui::header("Refresh");
    }

    let tracked: Vec<_> = state
        .workspaces
        .iter()
        .map(|(key, prior)| (key.clone(), prior.clone()))
        .collect();

    let mut failed = 0;
    let mut changed = false;
    for (key, prior) in tracked {
        let response = controller.refresh(&prior);
        ui::diagnostics(&key, &response.diagnostics, provider.redactor());

        match &response.state {
            StateChange::Set(current) if current != &prior => {
                ui::warn(&format!("{key}: changed outside of xata-provider"));
            }
            StateChange::Set(current) => {
                ui::success(&format!("{key}: up to date"));
                if let Some(stamp) = current.last_updated {
                    ui::dim(&format!("last updated {}", ui::format_timestamp(stamp)));
                }
            }
            StateChange::Remove => ui::warn(&format!("{key}: removed from state")),
            StateChange::Keep => failed += 1,
        }
        changed |= state.apply(&key, response.state);
    }

    if changed {
        state.save(&path)?;
    }
    if failed > 0 {
        bail!("{failed} workspace(s) could not be refreshed");
    }
    Ok(())
}
