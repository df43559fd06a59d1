//! `info` - provider metadata and where files live

use anyhow::Result;
use reconcile::Provider;
use reconcile::credential::ENV_API_KEY;

use crate::Context;
use crate::paths;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    let metadata = Provider::metadata();

    ui::header("xata-provider");
    ui::kv("type", metadata.type_name);
    ui::kv("version", metadata.version);
    ui::kv("resources", &metadata.resources.join(", "));
    ui::kv("data sources", &metadata.data_sources.join(", "));

    let declaration = match &ctx.file {
        Some(path) => path.clone(),
        None => paths::declaration_file()?,
    };
    let state = match &ctx.state {
        Some(path) => path.clone(),
        None => paths::state_file()?,
    };
    ui::kv("declaration", &declaration.display().to_string());
    ui::kv("state", &state.display().to_string());

    let key_status = if std::env::var(ENV_API_KEY).is_ok_and(|v| !v.is_empty()) {
        "set"
    } else {
        "not set"
    };
    ui::kv(ENV_API_KEY, key_status);
    Ok(())
}
