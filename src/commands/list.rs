//! `list` - show every workspace visible to the API key

use anyhow::{Context as AnyhowContext, Result, bail};
use colored::Colorize;
use reconcile::WorkspaceEntry;

use super::{configure, load_declaration_or_default};
use crate::Context;
use crate::ui;

pub fn run(ctx: &Context, json: bool) -> Result<()> {
    let declaration = load_declaration_or_default(ctx)?;
    let provider = configure(&declaration)?;

    let response = provider.workspace_list().list_all();
    ui::diagnostics("", &response.diagnostics, provider.redactor());
    if response.diagnostics.has_error() {
        bail!("Could not list workspaces");
    }

    if json {
        let out = serde_json::to_string_pretty(&response.entries)
            .context("Failed to serialize workspaces")?;
        println!("{out}");
        return Ok(());
    }

    if response.entries.is_empty() {
        ui::info("No workspaces");
        return Ok(());
    }

    ui::header(&format!("Workspaces ({})", response.entries.len()));
    for entry in &response.entries {
        println!("{}", format_row(entry));
    }
    Ok(())
}

fn format_row(entry: &WorkspaceEntry) -> String {
    format!(
        "  {:<16} {:<24} {:<24} {:<12} {}",
        entry.id,
        entry.name.bold(),
        entry.slug.dimmed(),
        entry.role.as_str(),
        entry.plan.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use xata::{Plan, Role};

    #[test]
    fn test_format_row_contains_fields() {
        colored::control::set_override(false);
        let entry = WorkspaceEntry {
            id: "w-1".to_string(),
            name: "acme".to_string(),
            slug: "acme-slug".to_string(),
            role: Role::Owner,
            plan: Plan::Pro,
        };
        let row = format_row(&entry);
        assert!(row.starts_with("  w-1 "));
        assert!(row.contains("acme-slug"));
        assert!(row.contains("owner"));
        assert!(row.trim_end().ends_with("pro"));
    }
}
