//! Lifecycle controller for the `xata_workspace` resource
//!
//! Each entry point makes at most one gateway call and reports the outcome as
//! a [`Response`]: the state change the host should apply plus the
//! diagnostics collected along the way. Domain failures never surface as
//! `Err`; a fatal diagnostic always comes with [`StateChange::Keep`].
//!
//! [`StateChange::Keep`]: crate::types::StateChange::Keep

use crate::credential::Redactor;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::mapper::{self, MappingError};
use crate::types::{Response, StateChange, Value, WorkspaceConfig, WorkspaceState};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use xata::Gateway;

/// Source of the `last_updated` stamp
pub type Clock = fn() -> DateTime<Utc>;

/// Drives create/read/update/delete/import against a gateway
///
/// Holds no per-instance state; one controller may serve any number of
/// workspaces.
#[derive(Clone)]
pub struct WorkspaceController {
    gateway: Arc<dyn Gateway>,
    redactor: Redactor,
    clock: Clock,
}

impl WorkspaceController {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            gateway,
            redactor: Redactor::new(),
            clock: Utc::now,
        }
    }

    /// Mask secrets in every diagnostic detail
    pub fn with_redactor(mut self, redactor: Redactor) -> Self {
        self.redactor = redactor;
        self
    }

    /// Replace the clock used to stamp updates
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Create a workspace from declared state
    pub fn create(&self, desired: &WorkspaceConfig) -> Response<WorkspaceState> {
        let mut diagnostics = Diagnostics::new();

        if let Value::Known(id) = &desired.id {
            diagnostics.push(contract_violation(
                "Workspace already has an identifier",
                format!("create was called for a workspace that already exists as {id}"),
            ));
        }

        let payload = match mapper::to_create_payload(desired) {
            Ok(payload) if !diagnostics.has_error() => payload,
            Ok(_) => return Response::keep(diagnostics),
            Err(err) => {
                diagnostics.push(input_error(&err));
                return Response::keep(diagnostics);
            }
        };

        log::debug!("Creating workspace '{}'", payload.name);
        let workspace = match self.gateway.create(&payload) {
            Ok(workspace) => workspace,
            Err(err) => {
                let kind = if err.is_conflict() {
                    DiagnosticKind::AlreadyExists
                } else {
                    DiagnosticKind::Gateway
                };
                diagnostics.push(self.remote_error("Unable to create workspace", &err, kind));
                return Response::keep(diagnostics);
            }
        };

        match mapper::from_response(workspace) {
            Ok(state) => {
                log::info!("Created workspace {} ({})", state.id, state.name);
                Response::set(state, diagnostics)
            }
            Err(err) => {
                diagnostics.push(response_error(
                    "Workspace was created but the response could not be read",
                    &err,
                ));
                Response::keep(diagnostics)
            }
        }
    }

    /// Read the current remote state of a workspace
    ///
    /// A workspace that no longer exists is reported as drift: the response
    /// asks the host to stop tracking it and carries only a warning.
    pub fn read(&self, id: &str) -> Response<WorkspaceState> {
        let mut diagnostics = Diagnostics::new();
        if id.is_empty() {
            diagnostics.push(missing_identifier("read"));
            return Response::keep(diagnostics);
        }

        log::debug!("Reading workspace {id}");
        let workspace = match self.gateway.get(id) {
            Ok(workspace) => workspace,
            Err(err) if err.is_not_found() => {
                log::warn!("Workspace {id} no longer exists, removing it from state");
                diagnostics.push(
                    Diagnostic::warning(
                        "Workspace not found",
                        format!("workspace {id} was removed outside of this provider"),
                    )
                    .with_kind(DiagnosticKind::NotFound),
                );
                return Response::remove(diagnostics);
            }
            Err(err) => {
                diagnostics.push(self.remote_error(
                    "Unable to read workspace",
                    &err,
                    DiagnosticKind::Gateway,
                ));
                return Response::keep(diagnostics);
            }
        };

        self.observed(id, workspace, "Unable to read workspace", diagnostics)
    }

    /// Read a tracked workspace, carrying over the fields only this
    /// provider knows about
    pub fn refresh(&self, prior: &WorkspaceState) -> Response<WorkspaceState> {
        let mut response = self.read(&prior.id);
        if let StateChange::Set(state) = &mut response.state {
            state.last_updated = prior.last_updated;
        }
        response
    }

    /// Apply declared state to an existing workspace
    pub fn update(
        &self,
        id: &str,
        desired: &WorkspaceConfig,
        prior: &WorkspaceState,
    ) -> Response<WorkspaceState> {
        let mut diagnostics = Diagnostics::new();

        if id.is_empty() {
            diagnostics.push(missing_identifier("update"));
        }
        match &desired.id {
            Value::Known(desired_id) if desired_id == id => {}
            Value::Known(desired_id) => diagnostics.push(contract_violation(
                "Workspace identifier mismatch",
                format!("update was called for {id} with declared identifier {desired_id}"),
            )),
            _ => diagnostics.push(contract_violation(
                "Workspace identifier missing",
                format!("update was called for {id} without a known declared identifier"),
            )),
        }
        if prior.id != id {
            diagnostics.push(contract_violation(
                "Workspace identifier mismatch",
                format!("update was called for {id} with prior state of {}", prior.id),
            ));
        }

        let payload = match mapper::to_update_payload(desired, prior) {
            Ok(payload) if !diagnostics.has_error() => payload,
            Ok(_) => return Response::keep(diagnostics),
            Err(err) => {
                diagnostics.push(input_error(&err));
                return Response::keep(diagnostics);
            }
        };

        log::debug!("Updating workspace {id}");
        let workspace = match self.gateway.update(id, &payload) {
            Ok(workspace) => workspace,
            Err(err) => {
                let kind = if err.is_not_found() {
                    DiagnosticKind::NotFound
                } else {
                    DiagnosticKind::Gateway
                };
                diagnostics.push(self.remote_error("Unable to update workspace", &err, kind));
                return Response::keep(diagnostics);
            }
        };

        let mut response = self.observed(id, workspace, "Unable to update workspace", diagnostics);
        if let StateChange::Set(state) = &mut response.state {
            state.last_updated = Some(self.stamp(prior.last_updated));
            log::info!("Updated workspace {id}");
        }
        response
    }

    /// Delete a workspace
    ///
    /// Deleting a workspace that is already gone succeeds.
    pub fn delete(&self, id: &str) -> Response<WorkspaceState> {
        let mut diagnostics = Diagnostics::new();
        if id.is_empty() {
            diagnostics.push(missing_identifier("delete"));
            return Response::keep(diagnostics);
        }

        log::debug!("Deleting workspace {id}");
        match self.gateway.delete(id) {
            Ok(()) => {
                log::info!("Deleted workspace {id}");
                Response::remove(diagnostics)
            }
            Err(err) if err.is_not_found() => {
                log::debug!("Workspace {id} was already deleted");
                Response::remove(diagnostics)
            }
            Err(err) => {
                diagnostics.push(self.remote_error(
                    "Unable to delete workspace",
                    &err,
                    DiagnosticKind::Gateway,
                ));
                Response::keep(diagnostics)
            }
        }
    }

    /// Adopt an existing workspace by identifier
    pub fn import(&self, id: &str) -> Response<WorkspaceState> {
        let mut diagnostics = Diagnostics::new();
        if id.is_empty() {
            diagnostics.push(missing_identifier("import"));
            return Response::keep(diagnostics);
        }

        log::debug!("Importing workspace {id}");
        let workspace = match self.gateway.get(id) {
            Ok(workspace) => workspace,
            Err(err) => {
                let kind = if err.is_not_found() {
                    DiagnosticKind::NotFound
                } else {
                    DiagnosticKind::Gateway
                };
                diagnostics.push(self.remote_error("Unable to import workspace", &err, kind));
                return Response::keep(diagnostics);
            }
        };

        let response = self.observed(id, workspace, "Unable to import workspace", diagnostics);
        if response.is_success() {
            log::info!("Imported workspace {id}");
        }
        response
    }

    /// Map a response for `id`, rejecting incomplete or foreign workspaces
    fn observed(
        &self,
        id: &str,
        workspace: xata::Workspace,
        summary: &str,
        mut diagnostics: Diagnostics,
    ) -> Response<WorkspaceState> {
        match mapper::from_response(workspace) {
            Ok(state) if state.id == id => Response::set(state, diagnostics),
            Ok(state) => {
                diagnostics.push(
                    Diagnostic::error(
                        summary,
                        format!("requested workspace {id} but the API returned {}", state.id),
                    )
                    .with_kind(DiagnosticKind::Mapping)
                    .with_attribute("id"),
                );
                Response::keep(diagnostics)
            }
            Err(err) => {
                diagnostics.push(response_error(summary, &err));
                Response::keep(diagnostics)
            }
        }
    }

    fn remote_error(&self, summary: &str, err: &xata::Error, kind: DiagnosticKind) -> Diagnostic {
        let detail = self.redactor.redact(&err.to_string()).into_owned();
        Diagnostic::error(summary, detail).with_kind(kind)
    }

    /// Current time, nudged past `prior` if the clock has not moved on
    fn stamp(&self, prior: Option<DateTime<Utc>>) -> DateTime<Utc> {
        let now = (self.clock)();
        match prior {
            Some(prior) if now <= prior => prior + TimeDelta::microseconds(1),
            _ => now,
        }
    }
}

impl std::fmt::Debug for WorkspaceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceController")
            .field("redactor", &self.redactor)
            .finish_non_exhaustive()
    }
}

fn contract_violation(summary: &str, detail: String) -> Diagnostic {
    Diagnostic::error(summary, detail)
        .with_kind(DiagnosticKind::ContractViolation)
        .with_attribute("id")
}

fn missing_identifier(operation: &str) -> Diagnostic {
    contract_violation(
        "Missing workspace identifier",
        format!("{operation} requires a non-empty workspace identifier"),
    )
}

fn input_error(err: &MappingError) -> Diagnostic {
    Diagnostic::error("Invalid workspace configuration", err.to_string())
        .with_kind(DiagnosticKind::Mapping)
        .with_attribute(err.attribute())
}

fn response_error(summary: &str, err: &MappingError) -> Diagnostic {
    Diagnostic::error(summary, err.to_string())
        .with_kind(DiagnosticKind::Mapping)
        .with_attribute(err.attribute())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::resolve_with;
    use xata::gateway::Operation;
    use xata::{MockGateway, Plan};

    fn fixed_clock() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn setup() -> (MockGateway, WorkspaceController) {
        let mock = MockGateway::new().with_next_id(123);
        let controller = WorkspaceController::new(Arc::new(mock.clone())).with_clock(fixed_clock);
        (mock, controller)
    }

    fn created(controller: &WorkspaceController, name: &str) -> WorkspaceState {
        controller
            .create(&WorkspaceConfig::new(name))
            .into_state()
            .unwrap()
    }

    #[test]
    fn test_create_then_read() {
        let (_, controller) = setup();
        let response = controller.create(&WorkspaceConfig::new("acme"));
        assert!(response.is_success());
        let state = response.into_state().unwrap();
        assert_eq!(state.id, "w-123");
        assert_eq!(state.plan, Plan::Free);
        assert_eq!(state.slug, "acme");
        assert_eq!(state.last_updated, None);

        let read = controller.read("w-123").into_state().unwrap();
        assert_eq!(read.name, "acme");
        assert_eq!(read.plan, Plan::Free);
    }

    #[test]
    fn test_create_rejects_known_id() {
        let (mock, controller) = setup();
        let response = controller.create(&WorkspaceConfig::new("acme").with_id("w-1"));
        assert_eq!(response.state, StateChange::Keep);
        assert!(response.diagnostics.has_kind(DiagnosticKind::ContractViolation));
        assert_eq!(mock.count(Operation::Create), 0);
    }

    #[test]
    fn test_create_failure_keeps_state() {
        let (mock, controller) = setup();
        mock.fail(Operation::Create, 500, "internal error");
        let response = controller.create(&WorkspaceConfig::new("acme"));
        assert_eq!(response.state, StateChange::Keep);
        assert_eq!(response.diagnostics.errors().count(), 1);
        let error = response.diagnostics.errors().next().unwrap();
        assert_eq!(error.kind, Some(DiagnosticKind::Gateway));
        assert!(error.detail.contains("internal error"));
    }

    #[test]
    fn test_create_conflict_is_already_exists() {
        let (_, controller) = setup();
        created(&controller, "acme");
        let response = controller.create(&WorkspaceConfig::new("acme"));
        assert!(!response.is_success());
        assert_eq!(response.state, StateChange::Keep);
        assert!(response.diagnostics.has_kind(DiagnosticKind::AlreadyExists));
    }

    #[test]
    fn test_create_incomplete_response() {
        let (mock, controller) = setup();
        mock.malformed(Operation::Create);
        let response = controller.create(&WorkspaceConfig::new("acme"));
        assert_eq!(response.state, StateChange::Keep);
        assert!(response.diagnostics.has_kind(DiagnosticKind::Mapping));
    }

    #[test]
    fn test_create_missing_name_makes_no_call() {
        let (mock, controller) = setup();
        let response = controller.create(&WorkspaceConfig::default());
        assert!(!response.is_success());
        assert_eq!(mock.count(Operation::Create), 0);
    }

    #[test]
    fn test_read_drift_removes() {
        let (mock, controller) = setup();
        let state = created(&controller, "acme");
        mock.remove_out_of_band(&state.id);

        let response = controller.read(&state.id);
        assert_eq!(response.state, StateChange::Remove);
        assert!(response.is_success());
        assert_eq!(response.diagnostics.warnings().count(), 1);
        assert!(response.diagnostics.has_kind(DiagnosticKind::NotFound));
    }

    #[test]
    fn test_read_failure_keeps() {
        let (mock, controller) = setup();
        let state = created(&controller, "acme");
        mock.fail(Operation::Get, 503, "unavailable");
        let response = controller.read(&state.id);
        assert_eq!(response.state, StateChange::Keep);
        assert!(response.diagnostics.has_error());
    }

    #[test]
    fn test_refresh_carries_stamp() {
        let (_, controller) = setup();
        let mut prior = created(&controller, "acme");
        prior.last_updated = Some(fixed_clock());
        let refreshed = controller.refresh(&prior).into_state().unwrap();
        assert_eq!(refreshed.last_updated, Some(fixed_clock()));
    }

    #[test]
    fn test_update_keeps_id_and_stamps() {
        let (_, controller) = setup();
        let prior = created(&controller, "acme");
        let desired = WorkspaceConfig::new("acme2").with_id("w-123");

        let state = controller
            .update("w-123", &desired, &prior)
            .into_state()
            .unwrap();
        assert_eq!(state.id, "w-123");
        assert_eq!(state.name, "acme2");
        assert_eq!(state.slug, "acme");
        assert_eq!(state.last_updated, Some(fixed_clock()));
    }

    #[test]
    fn test_update_stamp_is_monotonic() {
        let (_, controller) = setup();
        let mut prior = created(&controller, "acme");
        let later = fixed_clock() + TimeDelta::hours(1);
        prior.last_updated = Some(later);

        let desired = prior.to_config();
        let state = controller
            .update(&prior.id, &desired, &prior)
            .into_state()
            .unwrap();
        assert!(state.last_updated.unwrap() > later);
    }

    #[test]
    fn test_empty_slug_keeps_remote_slug() {
        let (mock, controller) = setup();
        let state = controller
            .create(&WorkspaceConfig::new("acme").with_slug(""))
            .into_state()
            .unwrap();
        assert_eq!(state.slug, "acme");
        assert_eq!(
            mock.calls()[0],
            xata::gateway::Call::Create(xata::WorkspaceMeta::new("acme"))
        );

        let desired = WorkspaceConfig::new("acme2").with_id("w-123").with_slug("");
        let updated = controller
            .update("w-123", &desired, &state)
            .into_state()
            .unwrap();
        assert_eq!(updated.slug, "acme");
        assert_eq!(mock.workspace("w-123").unwrap().slug.as_deref(), Some("acme"));
    }

    #[test]
    fn test_update_missing_workspace_is_fatal() {
        let (mock, controller) = setup();
        let prior = created(&controller, "acme");
        mock.remove_out_of_band(&prior.id);

        let desired = WorkspaceConfig::new("acme2").with_id("w-123");
        let response = controller.update("w-123", &desired, &prior);
        assert_eq!(response.state, StateChange::Keep);
        assert_eq!(response.diagnostics.errors().count(), 1);
        assert!(response.diagnostics.has_kind(DiagnosticKind::NotFound));

        mock.fail(Operation::Update, 404, "no such workspace");
        let response = controller.update("w-123", &desired, &prior);
        assert_eq!(response.state, StateChange::Keep);
        assert!(response.diagnostics.has_kind(DiagnosticKind::NotFound));
    }

    #[test]
    fn test_update_foreign_id_is_mapping_error() {
        let (mock, controller) = setup();
        let prior = created(&controller, "acme");
        mock.foreign_id(Operation::Update, "w-999");

        let desired = WorkspaceConfig::new("acme2").with_id("w-123");
        let response = controller.update("w-123", &desired, &prior);
        assert_eq!(response.state, StateChange::Keep);
        let error = response.diagnostics.errors().next().unwrap();
        assert_eq!(error.kind, Some(DiagnosticKind::Mapping));
        assert_eq!(error.attribute.as_deref(), Some("id"));
        assert!(error.detail.contains("w-999"));
    }

    #[test]
    fn test_update_id_mismatch_makes_no_call() {
        let (mock, controller) = setup();
        let prior = created(&controller, "acme");
        let desired = WorkspaceConfig::new("acme2").with_id("w-999");

        let response = controller.update("w-123", &desired, &prior);
        assert_eq!(response.state, StateChange::Keep);
        assert!(response.diagnostics.has_kind(DiagnosticKind::ContractViolation));
        assert_eq!(mock.count(Operation::Update), 0);
    }

    #[test]
    fn test_update_failure_keeps_prior() {
        let (mock, controller) = setup();
        let prior = created(&controller, "acme");
        mock.fail(Operation::Update, 500, "boom");

        let desired = WorkspaceConfig::new("x").with_id("w-123");
        let response = controller.update("w-123", &desired, &prior);
        assert_eq!(response.state, StateChange::Keep);
        assert_eq!(response.diagnostics.errors().count(), 1);
    }

    #[test]
    fn test_delete_twice_succeeds() {
        let (_, controller) = setup();
        let state = created(&controller, "acme");

        let first = controller.delete(&state.id);
        assert!(first.is_success());
        assert_eq!(first.state, StateChange::Remove);

        let second = controller.delete(&state.id);
        assert!(second.is_success());
        assert_eq!(second.state, StateChange::Remove);
    }

    #[test]
    fn test_delete_failure_keeps() {
        let (mock, controller) = setup();
        let state = created(&controller, "acme");
        mock.fail(Operation::Delete, 500, "boom");
        let response = controller.delete(&state.id);
        assert_eq!(response.state, StateChange::Keep);
        assert!(response.diagnostics.has_error());
    }

    #[test]
    fn test_import_existing() {
        let (_, controller) = setup();
        created(&controller, "acme");
        let state = controller.import("w-123").into_state().unwrap();
        assert_eq!(state.name, "acme");
        assert_eq!(state.last_updated, None);
    }

    #[test]
    fn test_import_not_found_is_fatal() {
        let (_, controller) = setup();
        let response = controller.import("w-404");
        assert_eq!(response.state, StateChange::Keep);
        assert!(response.diagnostics.has_error());
        assert!(response.diagnostics.has_kind(DiagnosticKind::NotFound));
    }

    #[test]
    fn test_import_empty_id() {
        let (mock, controller) = setup();
        let response = controller.import("");
        assert!(!response.is_success());
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_error_detail_is_redacted() {
        let (mock, controller) = setup();
        let credential = resolve_with(&Value::Known("xau_secret".to_string()), |_| None).unwrap();
        let controller = controller.with_redactor(Redactor::for_credential(&credential));
        mock.fail(Operation::Get, 401, "bad key xau_secret");

        let response = controller.read("w-1");
        let error = response.diagnostics.errors().next().unwrap();
        assert!(!error.detail.contains("xau_secret"));
        assert!(error.detail.contains("***"));
    }
}
