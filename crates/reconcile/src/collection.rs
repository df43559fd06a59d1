//! Read-only listing for the `xata_workspaces` data source

use crate::credential::Redactor;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::mapper;
use crate::types::ListResponse;
use std::sync::Arc;
use xata::Gateway;

/// Lists every workspace visible to the credential
#[derive(Clone)]
pub struct WorkspaceCollection {
    gateway: Arc<dyn Gateway>,
    redactor: Redactor,
}

impl WorkspaceCollection {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            redactor: Redactor::new(),
        }
    }

    pub fn with_redactor(mut self, redactor: Redactor) -> Self {
        self.redactor = redactor;
        self
    }

    /// Take one snapshot of all workspaces, in the order the API returns them
    ///
    /// Any failure yields no entries and a single fatal diagnostic.
    pub fn list_all(&self) -> ListResponse {
        log::debug!("Listing workspaces");
        let summaries = match self.gateway.list() {
            Ok(summaries) => summaries,
            Err(err) => {
                let detail = self.redactor.redact(&err.to_string()).into_owned();
                return failed(
                    Diagnostic::error("Unable to list workspaces", detail)
                        .with_kind(DiagnosticKind::Gateway),
                );
            }
        };

        let entries = match summaries
            .into_iter()
            .map(mapper::entry_from_summary)
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(entries) => entries,
            Err(err) => {
                return failed(
                    Diagnostic::error("Unable to read workspace list", err.to_string())
                        .with_kind(DiagnosticKind::Mapping)
                        .with_attribute(err.attribute()),
                );
            }
        };

        log::debug!("Listed {} workspaces", entries.len());
        ListResponse {
            entries,
            diagnostics: Diagnostics::new(),
        }
    }
}

impl std::fmt::Debug for WorkspaceCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceCollection").finish_non_exhaustive()
    }
}

fn failed(diagnostic: Diagnostic) -> ListResponse {
    ListResponse {
        entries: Vec::new(),
        diagnostics: Diagnostics::from(diagnostic),
    }
}
