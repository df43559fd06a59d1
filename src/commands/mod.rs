//! Command implementations and the helpers they share

pub mod apply;
pub mod destroy;
pub mod import;
pub mod info;
pub mod list;
pub mod plan;
pub mod refresh;

use anyhow::{Result, bail};
use reconcile::{Provider, Redactor};
use std::path::PathBuf;

use crate::Context;
use crate::config::Declaration;
use crate::engine::executor::InstanceOutcome;
use crate::logging;
use crate::paths;
use crate::state::ProviderState;
use crate::ui;

/// Path of the declaration file for this invocation
fn declaration_path(ctx: &Context) -> Result<PathBuf> {
    match &ctx.file {
        Some(path) => Ok(path.clone()),
        None => paths::declaration_file(),
    }
}

/// Load the declaration, which must exist
pub fn load_declaration(ctx: &Context) -> Result<Declaration> {
    let path = declaration_path(ctx)?;
    if !path.exists() {
        bail!(
            "No declaration found at {}. Create it or pass --file.",
            path.display()
        );
    }
    Declaration::load(&path)
}

/// Load the declaration if present; commands that only touch tracked state
/// still read the provider block from it
pub fn load_declaration_or_default(ctx: &Context) -> Result<Declaration> {
    let path = declaration_path(ctx)?;
    if path.exists() {
        Declaration::load(&path)
    } else {
        log::debug!("No declaration at {}, using defaults", path.display());
        Ok(Declaration::default())
    }
}

/// Load tracked state, returning the path it should be saved back to
pub fn load_state(ctx: &Context) -> Result<(PathBuf, ProviderState)> {
    let path = match &ctx.state {
        Some(path) => path.clone(),
        None => paths::state_file()?,
    };
    let state = ProviderState::load(&path)?;
    Ok((path, state))
}

/// Configure the provider and install its redactor for log output
pub fn configure(declaration: &Declaration) -> Result<Provider> {
    let (provider, diagnostics) = Provider::configure(&declaration.provider_config());
    ui::diagnostics("provider", &diagnostics, &Redactor::new());

    match provider {
        Some(provider) => {
            logging::set_redactor(provider.redactor().clone());
            Ok(provider)
        }
        None => bail!("Provider configuration failed"),
    }
}

/// Print diagnostics for each outcome and fold state changes into `state`
///
/// Saves the state file if anything changed.
pub fn record(
    provider: &Provider,
    state: &mut ProviderState,
    path: &std::path::Path,
    outcomes: Vec<InstanceOutcome>,
) -> Result<()> {
    let mut changed = false;
    for outcome in outcomes {
        ui::diagnostics(&outcome.key, &outcome.response.diagnostics, provider.redactor());
        changed |= state.apply(&outcome.key, outcome.response.state);
    }

    if changed {
        state.save(path)?;
    }
    Ok(())
}
