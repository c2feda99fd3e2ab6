//! Delete orchestration.
//!
//! One unit of work covers the soft-deletes and the engine's delete call.
//! Any failure, including the engine's, rolls everything back and leaves the
//! installed app fully active.

use appstore_core::{DeploymentStatus, RowId};
use appstore_state::{StateReader, UnitOfWork};
use tracing::{debug, error, info};

use crate::context::DeployContext;
use crate::environment::require_environment;
use crate::error::{DeployError, DeployResult};
use crate::request::InstallAppRequest;
use crate::service::DeploymentService;

impl DeploymentService {
    /// Soft-delete an installed app together with its app row and versions,
    /// and tear it down through the selected engine.
    pub fn delete_installed_app(
        &self,
        ctx: &DeployContext,
        mut request: InstallAppRequest,
    ) -> DeployResult<InstallAppRequest> {
        let installed_app_id =
            InstallAppRequest::require(request.installed_app_id, "installed_app_id")?;

        let mut uow = self.store.begin()?;
        if let Err(e) = self.delete_within(ctx, &mut request, installed_app_id, &mut uow) {
            error!(installed_app_id, error = %e, "delete failed, rolling back");
            if let Err(rollback) = uow.rollback() {
                error!(installed_app_id, error = %rollback, "delete rollback failed");
            }
            return Err(e);
        }
        uow.commit()
            .inspect_err(|e| error!(installed_app_id, error = %e, "delete commit failed"))?;

        request.status = Some(DeploymentStatus::Deleted);
        info!(app = %request.app_name, installed_app_id, "installed app deleted");
        Ok(request)
    }

    fn delete_within(
        &self,
        ctx: &DeployContext,
        request: &mut InstallAppRequest,
        installed_app_id: RowId,
        uow: &mut UnitOfWork,
    ) -> DeployResult<()> {
        let mut installed = uow
            .active_installed_app(installed_app_id)?
            .ok_or(DeployError::InstalledAppNotFound(installed_app_id))?;
        let environment = require_environment(&*uow, installed.environment_id)?;
        let mut app = uow
            .app(installed.app_id)?
            .ok_or(DeployError::AppNotFound(installed.app_id))?;

        app.active = false;
        app.audit.touch(request.user_id);
        uow.update_app(&app)?;

        installed.active = false;
        installed.audit.touch(request.user_id);
        uow.update_installed_app(&installed)?;

        for mut version in uow.installed_app_versions(installed.id)? {
            if !version.active {
                continue;
            }
            version.active = false;
            version.audit.touch(request.user_id);
            uow.update_installed_app_version(&version)?;
            debug!(installed_app_version_id = version.id, "installed app version deactivated");
        }

        request.app_name = app.name.clone();
        request.app_id = Some(app.id);
        request.environment_id = Some(environment.id);
        request.environment_name = Some(environment.name.clone());
        request.cluster_id = Some(environment.cluster_id);
        request.namespace = Some(environment.namespace.clone());
        request.offering_mode = Some(app.offering_mode);

        let selected = self.selector.select(app.offering_mode);
        debug!(app = %app.name, engine = %selected.kind, "delegating delete to engine");
        ctx.check()?;
        selected
            .engine
            .delete_installed_app(ctx, &app.name, &environment.name, request, &installed, uow)?;
        Ok(())
    }
}
