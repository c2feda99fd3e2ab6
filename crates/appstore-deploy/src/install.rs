//! Install orchestration.
//!
//! Bookkeeping rows are written and committed in one unit of work before the
//! engine is called. An engine failure after that commit leaves the installed
//! app at `INIT`; only a successful engine call advances it to `SUCCESS`,
//! through a second, independent unit of work.

use appstore_core::{DeploymentStatus, OperatingMode};
use appstore_state::{
    AuditLog, ChartHistory, ClusterInstalledApp, Environment, InstalledApp, InstalledAppVersion,
    StateReader, UnitOfWork, epoch_secs,
};
use tracing::{error, info};

use crate::context::DeployContext;
use crate::environment::{ensure_environment, require_environment};
use crate::error::{DeployError, DeployResult};
use crate::registrar::ensure_app;
use crate::request::{InstallAppRequest, require_path_segment};
use crate::service::DeploymentService;

impl DeploymentService {
    /// Install an app: record it, hand it to the selected engine, then mark
    /// it `SUCCESS`. Returns the request with every resolved id filled in.
    pub fn install_app(
        &self,
        mut request: InstallAppRequest,
        ctx: &DeployContext,
    ) -> DeployResult<InstallAppRequest> {
        let mut uow = self.store.begin()?;
        // Dropping `uow` on the error path rolls the bookkeeping back.
        self.record_install(&mut request, &mut uow).inspect_err(|e| {
            error!(app = %request.app_name, error = %e, "install bookkeeping failed")
        })?;
        uow.commit()
            .inspect_err(|e| error!(app = %request.app_name, error = %e, "install commit failed"))?;

        let installed_app_id =
            InstallAppRequest::require(request.installed_app_id, "installed_app_id")?;
        let record_mode = request.offering_mode.unwrap_or(self.mode());
        let selected = self.selector.select(record_mode);
        info!(
            app = %request.app_name,
            installed_app_id,
            engine = %selected.kind,
            "bookkeeping committed, delegating to engine"
        );

        ctx.check()
            .and_then(|()| selected.engine.install_app(&request, ctx))
            .map_err(DeployError::from)
            .inspect_err(|e| {
                error!(
                    app = %request.app_name,
                    installed_app_id,
                    engine = %selected.kind,
                    error = %e,
                    "engine install failed, installed app left at INIT"
                )
            })?;

        self.update_status(installed_app_id, DeploymentStatus::Success)?;
        request.status = Some(DeploymentStatus::Success);
        info!(app = %request.app_name, installed_app_id, "app installed");
        Ok(request)
    }

    /// Write every bookkeeping row of an install into `uow`.
    ///
    /// Nothing is committed here; the caller owns the unit of work.
    pub fn record_install(
        &self,
        request: &mut InstallAppRequest,
        uow: &mut UnitOfWork,
    ) -> DeployResult<()> {
        if request.app_name.trim().is_empty() {
            return Err(DeployError::InvalidRequest("app name must not be empty".to_string()));
        }
        // App and environment names double as manifest path segments.
        require_path_segment(&request.app_name, "app name")?;
        uow.chart_version(request.chart_version_id)?
            .ok_or(DeployError::ChartVersionNotFound(request.chart_version_id))?;

        let environment = self.resolve_install_environment(request, uow)?;
        require_path_segment(&environment.name, "environment name")?;
        request.environment_id = Some(environment.id);
        request.environment_name = Some(environment.name.clone());
        request.cluster_id = Some(environment.cluster_id);
        request.namespace = Some(environment.namespace.clone());

        let mode = self.mode();
        let app = ensure_app(uow, &request.app_name, request.team_id, request.user_id, mode)?;
        request.app_id = Some(app.id);
        request.offering_mode = Some(app.offering_mode);

        let installed = uow.insert_installed_app(InstalledApp {
            id: 0,
            app_id: app.id,
            environment_id: environment.id,
            status: DeploymentStatus::Init,
            active: true,
            audit: AuditLog::new(request.user_id),
        })?;
        request.installed_app_id = Some(installed.id);
        request.status = Some(installed.status);

        let version = uow.insert_installed_app_version(InstalledAppVersion {
            id: 0,
            installed_app_id: installed.id,
            chart_version_id: request.chart_version_id,
            values_yaml: request.values_override_yaml.clone(),
            reference_value_id: request.reference_value_id,
            reference_value_kind: request.reference_value_kind.clone(),
            active: true,
            audit: AuditLog::new(request.user_id),
        })?;
        request.installed_app_version_id = Some(version.id);

        uow.insert_chart_history(ChartHistory {
            id: 0,
            installed_app_version_id: version.id,
            values: version.values_yaml.clone(),
            deployed_by: request.user_id,
            deployed_on: epoch_secs(),
            audit: AuditLog::new(request.user_id),
        })?;

        if request.default_cluster_component {
            uow.insert_cluster_installed_app(ClusterInstalledApp {
                id: 0,
                cluster_id: environment.cluster_id,
                installed_app_id: installed.id,
                audit: AuditLog::new(request.user_id),
            })?;
        }
        Ok(())
    }

    /// Lightweight mode may create the environment on the fly; full mode
    /// requires a pre-provisioned one.
    fn resolve_install_environment(
        &self,
        request: &InstallAppRequest,
        uow: &mut UnitOfWork,
    ) -> DeployResult<Environment> {
        if let Some(environment_id) = request.environment_id {
            return require_environment(&*uow, environment_id);
        }
        match self.mode() {
            OperatingMode::Lightweight => {
                let cluster_id = InstallAppRequest::require(request.cluster_id, "cluster_id")?;
                let namespace = request.namespace.as_deref().ok_or_else(|| {
                    DeployError::InvalidRequest("namespace is required".to_string())
                })?;
                ensure_environment(uow, cluster_id, namespace, request.user_id)
            }
            OperatingMode::Full => Err(DeployError::InvalidRequest(
                "environment_id is required in full mode".to_string(),
            )),
        }
    }
}
