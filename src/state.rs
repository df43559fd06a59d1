use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reconcile::{StateChange, WorkspaceState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

// ============================================================================
// State Structures
// ============================================================================

/// Tracked state of every managed workspace, keyed by declaration key
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderState {
    /// Last time the state was written
    pub last_updated: DateTime<Utc>,

    #[serde(default)]
    pub workspaces: BTreeMap<String, WorkspaceState>,
}

impl Default for ProviderState {
    fn default() -> Self {
        Self {
            last_updated: Utc::now(),
            workspaces: BTreeMap::new(),
        }
    }
}

// ============================================================================
// ProviderState Implementation
// ============================================================================

impl ProviderState {
    /// Load state from disk, or return default if file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file does not exist, using default state");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!("Loaded state from {}", path.display());
        Ok(state)
    }

    /// Save state to disk, stamping `last_updated`
    pub fn save(&mut self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        self.last_updated = Utc::now();
        let content = toml::to_string_pretty(&self).context("Failed to serialize state to TOML")?;

        fs::write(path, &content)
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&WorkspaceState> {
        self.workspaces.get(key)
    }

    /// Apply the outcome of a lifecycle call to the entry at `key`
    ///
    /// Returns true if the tracked state changed.
    pub fn apply(&mut self, key: &str, change: StateChange<WorkspaceState>) -> bool {
        match change {
            StateChange::Set(state) => {
                let changed = self.workspaces.get(key) != Some(&state);
                self.workspaces.insert(key.to_string(), state);
                changed
            }
            StateChange::Remove => self.workspaces.remove(key).is_some(),
            StateChange::Keep => false,
        }
    }

    /// Key of the tracked instance with the given remote identifier
    pub fn key_for_id(&self, id: &str) -> Option<&str> {
        self.workspaces
            .iter()
            .find(|(_, state)| state.id == id)
            .map(|(key, _)| key.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
