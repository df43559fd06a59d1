//! Provider configuration and entry point
//!
//! [`Provider::configure`] resolves the credential, builds the HTTP gateway
//! and hands out controllers that share it.

use crate::collection::WorkspaceCollection;
use crate::credential::{self, Redactor};
use crate::diagnostics::Diagnostics;
use crate::lifecycle::WorkspaceController;
use crate::types::Value;
use serde::Serialize;
use std::sync::Arc;
use xata::Gateway;
use xata::gateway::http::{DEFAULT_API_BASE, HttpGateway};

/// Environment variable overriding the API base URL
pub const ENV_API_BASE: &str = "XATA_API_BASE";

/// Provider-level configuration block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    /// API key; falls back to `XATA_API_KEY` when null or empty
    pub apikey: Value<String>,
    /// Base URL of the API
    pub api_base: Option<String>,
}

/// Static description of what the provider serves
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub type_name: &'static str,
    pub version: &'static str,
    pub resources: &'static [&'static str],
    pub data_sources: &'static [&'static str],
}

/// A configured provider
#[derive(Clone)]
pub struct Provider {
    gateway: Arc<dyn Gateway>,
    redactor: Redactor,
}

impl Provider {
    pub const TYPE_NAME: &'static str = "xata";
    pub const RESOURCE_WORKSPACE: &'static str = "xata_workspace";
    pub const DATA_SOURCE_WORKSPACES: &'static str = "xata_workspaces";
    pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    /// Configure from the provider block and the process environment
    pub fn configure(config: &ProviderConfig) -> (Option<Self>, Diagnostics) {
        Self::configure_with(config, |key| std::env::var(key).ok())
    }

    /// Configure with an injected environment lookup
    ///
    /// Returns no provider when any fatal diagnostic was recorded.
    pub fn configure_with<F>(config: &ProviderConfig, lookup: F) -> (Option<Self>, Diagnostics)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut diagnostics = Diagnostics::new();

        let credential = match credential::resolve_with(&config.apikey, &lookup) {
            Ok(credential) => credential,
            Err(err) => {
                diagnostics.push(err.to_diagnostic());
                return (None, diagnostics);
            }
        };

        let api_base = config
            .api_base
            .clone()
            .or_else(|| lookup(ENV_API_BASE))
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        log::debug!("Configuring provider against {api_base}");
        let redactor = Redactor::for_credential(&credential);
        let gateway = HttpGateway::with_api_base(api_base, credential.into_secret());

        let provider = Self {
            gateway: Arc::new(gateway),
            redactor,
        };
        (Some(provider), diagnostics)
    }

    /// Build a provider around an existing gateway
    pub fn with_gateway(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            redactor: Redactor::new(),
        }
    }

    /// Replace the redactor, e.g. to mask a key the gateway was built with
    pub fn with_redactor(mut self, redactor: Redactor) -> Self {
        self.redactor = redactor;
        self
    }

    /// Controller for the `xata_workspace` resource
    pub fn workspaces(&self) -> WorkspaceController {
        WorkspaceController::new(Arc::clone(&self.gateway)).with_redactor(self.redactor.clone())
    }

    /// Reader for the `xata_workspaces` data source
    pub fn workspace_list(&self) -> WorkspaceCollection {
        WorkspaceCollection::new(Arc::clone(&self.gateway)).with_redactor(self.redactor.clone())
    }

    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    pub fn metadata() -> Metadata {
        Metadata {
            type_name: Self::TYPE_NAME,
            version: Self::VERSION,
            resources: &[Self::RESOURCE_WORKSPACE],
            data_sources: &[Self::DATA_SOURCE_WORKSPACES],
        }
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("redactor", &self.redactor)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use crate::types::WorkspaceConfig;
    use xata::MockGateway;

    #[test]
    fn test_configure_missing_key() {
        let (provider, diagnostics) =
            Provider::configure_with(&ProviderConfig::default(), |_| None);
        assert!(provider.is_none());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.has_kind(DiagnosticKind::MissingCredential));
        assert_eq!(
            diagnostics.iter().next().unwrap().attribute.as_deref(),
            Some("apikey")
        );
    }

    #[test]
    fn test_configure_unknown_key() {
        let config = ProviderConfig {
            apikey: Value::Unknown,
            api_base: None,
        };
        let (provider, diagnostics) =
            Provider::configure_with(&config, |_| Some("from-env".to_string()));
        assert!(provider.is_none());
        assert!(diagnostics.has_kind(DiagnosticKind::UnknownCredential));
    }

    #[test]
    fn test_configure_from_env_registers_redaction() {
        let (provider, diagnostics) = Provider::configure_with(&ProviderConfig::default(), |key| {
            (key == credential::ENV_API_KEY).then(|| "xau_env".to_string())
        });
        assert!(diagnostics.is_empty());
        let provider = provider.unwrap();
        assert_eq!(provider.redactor().redact("key xau_env"), "key ***");
        assert!(!format!("{provider:?}").contains("xau_env"));
    }

    #[test]
    fn test_metadata() {
        let metadata = Provider::metadata();
        assert_eq!(metadata.type_name, "xata");
        assert_eq!(metadata.resources, ["xata_workspace"]);
        assert_eq!(metadata.data_sources, ["xata_workspaces"]);
    }

    #[test]
    fn test_controllers_share_gateway() {
        let mock = MockGateway::new().with_next_id(7);
        let provider = Provider::with_gateway(Arc::new(mock.clone()));

        let created = provider
            .workspaces()
            .create(&WorkspaceConfig::new("acme"))
            .into_state()
            .unwrap();
        assert_eq!(created.id, "w-7");

        let listed = provider.workspace_list().list_all();
        assert_eq!(listed.entries.len(), 1);
        assert_eq!(listed.entries[0].id, "w-7");
        assert!(mock.workspace("w-7").is_some());
    }
}
