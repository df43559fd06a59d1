//! API key resolution and redaction
//!
//! The key comes from the provider configuration when set, otherwise from
//! the `XATA_API_KEY` environment variable. Once resolved it is registered
//! with a [`Redactor`]; diagnostics and log output pass through the redactor
//! so the key never leaves the process in clear text.

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::types::Value;
use secrecy::{ExposeSecret, SecretString};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Environment variable holding the default API key
pub const ENV_API_KEY: &str = "XATA_API_KEY";

/// Provider configuration field holding the API key
pub const CONFIG_FIELD: &str = "apikey";

const MASK: &str = "***";

/// Where a credential was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Config,
    Environment,
}

/// A resolved API key
#[derive(Debug)]
pub struct Credential {
    secret: SecretString,
    source: CredentialSource,
}

impl Credential {
    fn new(secret: String, source: CredentialSource) -> Self {
        Self {
            secret: secret.into(),
            source,
        }
    }

    pub fn secret(&self) -> &SecretString {
        &self.secret
    }

    /// Hand the key over, e.g. to the HTTP client
    pub fn into_secret(self) -> SecretString {
        self.secret
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

/// Errors from credential resolution
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error(
        "no API key configured: set `{field}` in the provider configuration or the {env_var} \
         environment variable, and make sure the value is not empty"
    )]
    Missing {
        field: &'static str,
        env_var: &'static str,
    },

    #[error(
        "the `{field}` value is not known yet: apply the resource it depends on first, set it \
         statically, or use the {env_var} environment variable"
    )]
    Unknown {
        field: &'static str,
        env_var: &'static str,
    },
}

impl CredentialError {
    /// Convert into an attribute diagnostic on the configuration field
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (summary, kind, field) = match self {
            Self::Missing { field, .. } => (
                "Missing Xata API Key",
                DiagnosticKind::MissingCredential,
                *field,
            ),
            Self::Unknown { field, .. } => (
                "Unknown Xata API Key",
                DiagnosticKind::UnknownCredential,
                *field,
            ),
        };
        Diagnostic::error(summary, self.to_string())
            .with_kind(kind)
            .with_attribute(field)
    }
}

/// Resolve the API key from configuration or the process environment
pub fn resolve(explicit: &Value<String>) -> Result<Credential, CredentialError> {
    resolve_with(explicit, |key| std::env::var(key).ok())
}

/// Resolve the API key with an injected environment lookup
///
/// An unknown explicit value fails before the environment is consulted.
pub fn resolve_with<F>(explicit: &Value<String>, lookup: F) -> Result<Credential, CredentialError>
where
    F: Fn(&str) -> Option<String>,
{
    match explicit {
        Value::Unknown => {
            return Err(CredentialError::Unknown {
                field: CONFIG_FIELD,
                env_var: ENV_API_KEY,
            });
        }
        Value::Known(secret) if !secret.is_empty() => {
            log::debug!("Using API key from provider configuration");
            return Ok(Credential::new(secret.clone(), CredentialSource::Config));
        }
        _ => {}
    }

    match lookup(ENV_API_KEY) {
        Some(secret) if !secret.is_empty() => {
            log::debug!("Using API key from {ENV_API_KEY}");
            Ok(Credential::new(secret, CredentialSource::Environment))
        }
        _ => Err(CredentialError::Missing {
            field: CONFIG_FIELD,
            env_var: ENV_API_KEY,
        }),
    }
}

/// Masks registered secrets in free text
///
/// Built once at configure time and shared read-only afterwards.
#[derive(Clone, Default)]
pub struct Redactor {
    secrets: Arc<[String]>,
}

impl Redactor {
    /// A redactor with no secrets registered
    pub fn new() -> Self {
        Self::default()
    }

    /// A redactor that masks the given credential
    pub fn for_credential(credential: &Credential) -> Self {
        Self {
            secrets: Arc::from(vec![credential.secret().expose_secret().to_owned()]),
        }
    }

    /// Replace every registered secret in `text` with a mask
    pub fn redact<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut out = Cow::Borrowed(text);
        for secret in self.secrets.iter().filter(|s| !s.is_empty()) {
            if out.contains(secret.as_str()) {
                out = Cow::Owned(out.replace(secret.as_str(), MASK));
            }
        }
        out
    }
}

impl fmt::Debug for Redactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Redactor")
            .field("secrets", &self.secrets.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(value: &'static str) -> impl Fn(&str) -> Option<String> {
        move |key| (key == ENV_API_KEY).then(|| value.to_string())
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_empty_explicit_falls_back_to_env() {
        let credential = resolve_with(&Value::Known(String::new()), env("E")).unwrap();
        assert_eq!(credential.secret().expose_secret(), "E");
        assert_eq!(credential.source(), CredentialSource::Environment);
    }

    #[test]
    fn test_null_explicit_falls_back_to_env() {
        let credential = resolve_with(&Value::Null, env("E")).unwrap();
        assert_eq!(credential.secret().expose_secret(), "E");
    }

    #[test]
    fn test_explicit_wins_over_env() {
        let credential = resolve_with(&Value::Known("X".to_string()), env("E")).unwrap();
        assert_eq!(credential.secret().expose_secret(), "X");
        assert_eq!(credential.source(), CredentialSource::Config);
    }

    #[test]
    fn test_missing_everywhere() {
        let err = resolve_with(&Value::Known(String::new()), env("")).unwrap_err();
        assert_eq!(
            err,
            CredentialError::Missing {
                field: CONFIG_FIELD,
                env_var: ENV_API_KEY,
            }
        );
        assert!(err.to_string().contains("apikey"));
        assert!(err.to_string().contains("XATA_API_KEY"));

        assert!(resolve_with(&Value::Null, no_env).is_err());
    }

    #[test]
    fn test_unknown_fails_without_consulting_env() {
        let consulted = std::cell::Cell::new(false);
        let err = resolve_with(&Value::Unknown, |_| {
            consulted.set(true);
            Some("E".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, CredentialError::Unknown { .. }));
        assert!(!consulted.get());
    }

    #[test]
    fn test_error_diagnostics() {
        let missing = CredentialError::Missing {
            field: CONFIG_FIELD,
            env_var: ENV_API_KEY,
        }
        .to_diagnostic();
        assert!(missing.is_error());
        assert_eq!(missing.kind, Some(DiagnosticKind::MissingCredential));
        assert_eq!(missing.attribute.as_deref(), Some("apikey"));

        let unknown = CredentialError::Unknown {
            field: CONFIG_FIELD,
            env_var: ENV_API_KEY,
        }
        .to_diagnostic();
        assert_eq!(unknown.kind, Some(DiagnosticKind::UnknownCredential));
    }

    #[test]
    fn test_credential_debug_hides_secret() {
        let credential = resolve_with(&Value::Known("xau_secret".to_string()), no_env).unwrap();
        let debug = format!("{credential:?}");
        assert!(!debug.contains("xau_secret"));
        assert!(debug.contains("Config"));
        assert_eq!(credential.into_secret().expose_secret(), "xau_secret");
    }

    #[test]
    fn test_redactor_masks_secret() {
        let credential = resolve_with(&Value::Known("xau_secret".to_string()), no_env).unwrap();
        let redactor = Redactor::for_credential(&credential);
        assert_eq!(
            redactor.redact("auth failed for xau_secret (xau_secret)"),
            "auth failed for *** (***)"
        );
        assert!(matches!(redactor.redact("nothing here"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_empty_redactor_is_noop() {
        assert_eq!(Redactor::new().redact("plain"), "plain");
        assert!(format!("{:?}", Redactor::new()).contains('0'));
    }
}
