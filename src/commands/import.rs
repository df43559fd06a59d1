//! `import` - start tracking an existing workspace

use anyhow::{Result, bail};
use reconcile::StateChange;

use super::{configure, load_declaration_or_default, load_state};
use crate::Context;
use crate::ui;

pub fn run(ctx: &Context, key: &str, id: &str) -> Result<()> {
    let (path, mut state) = load_state(ctx)?;

    if state.get(key).is_some() {
        bail!("'{key}' is already tracked; destroy or rename it before importing");
    }
    if let Some(existing) = state.key_for_id(id) {
        bail!("Workspace {id} is already tracked as '{existing}'");
    }

    let declaration = load_declaration_or_default(ctx)?;
    let provider = configure(&declaration)?;

    let response = provider.workspaces().import(id);
    ui::diagnostics(key, &response.diagnostics, provider.redactor());

    let StateChange::Set(imported) = response.state else {
        bail!("Import of workspace {id} failed");
    };

    ui::success(&format!("Imported {} as '{key}'", imported.id));
    ui::kv("name", &imported.name);
    ui::kv("slug", &imported.slug);
    ui::kv("plan", imported.plan.as_str());
    ui::kv("members", &imported.member_count.to_string());

    state.apply(key, StateChange::Set(imported));
    state.save(&path)?;

    if declaration.get(key).is_none() {
        ui::warn(&format!(
            "'{key}' is not declared; the next apply will delete it"
        ));
    }
    Ok(())
}
