//! Declaration file (`workspaces.toml`)
//!
//! ```toml
//! [provider]
//! apikey = "xau_..."               # optional, XATA_API_KEY otherwise
//! api_base = "https://api.xata.io" # optional
//!
//! [[workspace]]
//! key = "main"
//! name = "acme"
//! slug = "acme"                    # optional
//! ```

use anyhow::{Context, Result};
use reconcile::{ProviderConfig, Value, WorkspaceConfig, WorkspaceState};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Problems with an otherwise well-formed declaration
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationError {
    #[error("workspace #{index} has an empty key")]
    EmptyKey { index: usize },

    #[error("workspace key '{0}' is declared more than once")]
    DuplicateKey(String),

    #[error("workspace '{0}' has an empty name")]
    EmptyName(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apikey: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

/// One declared workspace instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceDecl {
    /// Local address of the instance in state
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl WorkspaceDecl {
    /// Declared state, with the identifier carried from prior state
    pub fn to_config(&self, prior: Option<&WorkspaceState>) -> WorkspaceConfig {
        WorkspaceConfig {
            id: prior.map(|p| p.id.clone()).into(),
            name: Value::Known(self.name.clone()),
            slug: self.slug.clone().filter(|s| !s.is_empty()).into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    #[serde(default)]
    pub provider: ProviderBlock,
    #[serde(default, rename = "workspace")]
    pub workspaces: Vec<WorkspaceDecl>,
}

impl Declaration {
    /// Load and validate a declaration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let declaration = Self::parse(&content)
            .with_context(|| format!("Invalid declaration in {}", path.display()))?;
        log::debug!(
            "Loaded {} workspace declarations from {}",
            declaration.workspaces.len(),
            path.display()
        );
        Ok(declaration)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let declaration: Self = toml::from_str(content)?;
        declaration.validate()?;
        Ok(declaration)
    }

    pub fn validate(&self) -> Result<(), DeclarationError> {
        let mut seen = HashSet::new();
        for (index, workspace) in self.workspaces.iter().enumerate() {
            if workspace.key.trim().is_empty() {
                return Err(DeclarationError::EmptyKey { index });
            }
            if !seen.insert(workspace.key.as_str()) {
                return Err(DeclarationError::DuplicateKey(workspace.key.clone()));
            }
            if workspace.name.trim().is_empty() {
                return Err(DeclarationError::EmptyName(workspace.key.clone()));
            }
        }
        Ok(())
    }

    /// Provider block as the engine expects it
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            apikey: self.provider.apikey.clone().into(),
            api_base: self.provider.api_base.clone(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&WorkspaceDecl> {
        self.workspaces.iter().find(|w| w.key == key)
    }
}
