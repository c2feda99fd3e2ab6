//! Deployment engines and engine selection.
//!
//! Two engine families share one contract: a direct-apply engine that
//! installs releases straight onto the cluster, and a GitOps engine that
//! publishes application manifests for a sync controller to pick up.
//! Which one governs a record is decided by [`select_kind`].

pub mod ledger;
pub mod manifest;

use std::fmt;
use std::sync::Arc;

use appstore_core::OperatingMode;
use appstore_state::{InstalledApp, UnitOfWork};

use crate::context::DeployContext;
use crate::error::EngineResult;
use crate::request::{InstallAppRequest, InstalledAppRecord};

pub use ledger::ReleaseLedgerEngine;
pub use manifest::ManifestEngine;

/// Engine family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    DirectApply,
    GitOps,
}

impl EngineKind {
    pub fn label(&self) -> &'static str {
        match self {
            EngineKind::DirectApply => "direct-apply",
            EngineKind::GitOps => "gitops",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Contract shared by both engine families.
///
/// Implementations must not begin a unit of work from inside
/// [`DeploymentEngine::delete_installed_app`]: the caller's unit of work is
/// still open, and the store admits one writer at a time.
pub trait DeploymentEngine: Send + Sync {
    fn kind(&self) -> EngineKind;

    /// Deploy the chart described by an already-recorded install request.
    fn install_app(&self, request: &InstallAppRequest, ctx: &DeployContext) -> EngineResult<()>;

    /// Tear down an installed app. Writes made through `uow` commit or roll
    /// back together with the caller's soft-deletes.
    fn delete_installed_app(
        &self,
        ctx: &DeployContext,
        app_name: &str,
        environment_name: &str,
        request: &InstallAppRequest,
        installed_app: &InstalledApp,
        uow: &mut UnitOfWork,
    ) -> EngineResult<()>;

    /// Current display status of an installed app.
    fn app_status(&self, record: &InstalledAppRecord) -> EngineResult<String>;
}

/// Pick the engine family for a record.
///
/// Lightweight wins if either the server or the record says so, so records
/// created in lightweight mode stay on the direct-apply engine after the
/// server switches to full mode.
pub fn select_kind(global: OperatingMode, record: OperatingMode) -> EngineKind {
    if global.is_lightweight() || record.is_lightweight() {
        EngineKind::DirectApply
    } else {
        EngineKind::GitOps
    }
}

/// An engine chosen for a record.
pub struct SelectedEngine<'a> {
    pub kind: EngineKind,
    pub engine: &'a dyn DeploymentEngine,
}

/// Holds both engines and the server-wide operating mode.
#[derive(Clone)]
pub struct EngineSelector {
    mode: OperatingMode,
    direct_apply: Arc<dyn DeploymentEngine>,
    gitops: Arc<dyn DeploymentEngine>,
}

impl EngineSelector {
    pub fn new(
        mode: OperatingMode,
        direct_apply: Arc<dyn DeploymentEngine>,
        gitops: Arc<dyn DeploymentEngine>,
    ) -> Self {
        Self {
            mode,
            direct_apply,
            gitops,
        }
    }

    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// Select the engine governing a record created under `record_mode`.
    pub fn select(&self, record_mode: OperatingMode) -> SelectedEngine<'_> {
        let kind = select_kind(self.mode, record_mode);
        let engine = match kind {
            EngineKind::DirectApply => self.direct_apply.as_ref(),
            EngineKind::GitOps => self.gitops.as_ref(),
        };
        SelectedEngine { kind, engine }
    }
}
