//! Direct-apply engine backed by a release ledger.
//!
//! Each installed app owns at most one [`Release`] row, keyed by its
//! installed app id. Installing bumps the release revision; deleting removes
//! the row through the caller's unit of work.

use appstore_state::{
    InstalledApp, Release, ReleaseStatus, StateReader, StateStore, UnitOfWork, epoch_secs,
};
use tracing::{debug, info, warn};

use super::{DeploymentEngine, EngineKind};
use crate::context::DeployContext;
use crate::error::{EngineError, EngineResult};
use crate::request::{InstallAppRequest, InstalledAppRecord};

/// Direct-apply engine recording releases in the state store.
#[derive(Clone)]
pub struct ReleaseLedgerEngine {
    store: StateStore,
}

impl ReleaseLedgerEngine {
    pub fn new(store: StateStore) -> Self {
        Self { store }
    }
}

fn missing(field: &str) -> EngineError {
    EngineError::Rejected(format!("install request has no {field}"))
}

impl DeploymentEngine for ReleaseLedgerEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::DirectApply
    }

    fn install_app(&self, request: &InstallAppRequest, ctx: &DeployContext) -> EngineResult<()> {
        ctx.check()?;
        let installed_app_id = request
            .installed_app_id
            .ok_or_else(|| missing("installed app id"))?;
        let cluster_id = request.cluster_id.ok_or_else(|| missing("cluster id"))?;
        let namespace = request
            .namespace
            .clone()
            .ok_or_else(|| missing("namespace"))?;

        let mut uow = self.store.begin()?;
        let revision = uow
            .release(installed_app_id)?
            .map(|previous| previous.revision + 1)
            .unwrap_or(1);
        let release = Release {
            installed_app_id,
            release_name: request.app_name.clone(),
            cluster_id,
            namespace,
            chart_version_id: request.chart_version_id,
            values_yaml: request.values_override_yaml.clone(),
            revision,
            status: ReleaseStatus::Deployed,
            updated_on: epoch_secs(),
        };
        uow.put_release(&release)?;
        uow.commit()?;

        info!(
            release = %release.release_name,
            installed_app_id,
            revision,
            "release applied"
        );
        Ok(())
    }

    fn delete_installed_app(
        &self,
        ctx: &DeployContext,
        app_name: &str,
        environment_name: &str,
        _request: &InstallAppRequest,
        installed_app: &InstalledApp,
        uow: &mut UnitOfWork,
    ) -> EngineResult<()> {
        ctx.check()?;
        if uow.remove_release(installed_app.id)? {
            debug!(app = %app_name, environment = %environment_name, "release removed");
        } else {
            warn!(
                app = %app_name,
                environment = %environment_name,
                installed_app_id = installed_app.id,
                "no release recorded, nothing to uninstall"
            );
        }
        Ok(())
    }

    fn app_status(&self, record: &InstalledAppRecord) -> EngineResult<String> {
        let snapshot = self.store.snapshot()?;
        match snapshot.release(record.installed_app_id)? {
            Some(release) => Ok(release.status.label().to_string()),
            None => Err(EngineError::ResourceTreeNotFound(record.app_name.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appstore_core::{DeploymentStatus, OperatingMode};
    use appstore_state::AuditLog;

    fn request(installed_app_id: u64) -> InstallAppRequest {
        let mut request = InstallAppRequest::new("demo", 1, "key: v").on_cluster(1, "ns1");
        request.installed_app_id = Some(installed_app_id);
        request
    }

    fn record(installed_app_id: u64) -> InstalledAppRecord {
        InstalledAppRecord {
            installed_app_id,
            installed_app_version_id: 1,
            app_id: 1,
            app_name: "demo".to_string(),
            environment_id: 1,
            environment_name: "clusterA__ns1".to_string(),
            cluster_id: 1,
            namespace: "ns1".to_string(),
            chart_version_id: 1,
            offering_mode: OperatingMode::Lightweight,
            status: DeploymentStatus::Success,
            deployed_at: 0,
            deployed_by: 7,
        }
    }

    fn installed(id: u64) -> InstalledApp {
        InstalledApp {
            id,
            app_id: 1,
            environment_id: 1,
            status: DeploymentStatus::Success,
            active: true,
            audit: AuditLog::new(7),
        }
    }

    #[test]
    fn install_records_release_and_bumps_revision() {
        let store = StateStore::open_in_memory().unwrap();
        let engine = ReleaseLedgerEngine::new(store.clone());
        let ctx = DeployContext::background();

        engine.install_app(&request(3), &ctx).unwrap();
        engine.install_app(&request(3), &ctx).unwrap();

        let release = store.snapshot().unwrap().release(3).unwrap().unwrap();
        assert_eq!(release.revision, 2);
        assert_eq!(release.values_yaml, "key: v");
        assert_eq!(engine.app_status(&record(3)).unwrap(), "Healthy");
    }

    #[test]
    fn status_without_release_is_resource_tree_not_found() {
        let store = StateStore::open_in_memory().unwrap();
        let engine = ReleaseLedgerEngine::new(store);
        let err = engine.app_status(&record(9)).unwrap_err();
        assert!(matches!(err, EngineError::ResourceTreeNotFound(_)));
    }

    #[test]
    fn cancelled_install_writes_nothing() {
        let store = StateStore::open_in_memory().unwrap();
        let engine = ReleaseLedgerEngine::new(store.clone());
        let (ctx, handle) = DeployContext::new();
        handle.cancel();

        let err = engine.install_app(&request(3), &ctx).unwrap_err();
        assert!(matches!(err, EngineError::Cancelled));
        assert!(store.snapshot().unwrap().release(3).unwrap().is_none());
    }

    #[test]
    fn install_without_target_is_rejected() {
        let store = StateStore::open_in_memory().unwrap();
        let engine = ReleaseLedgerEngine::new(store);
        let mut request = InstallAppRequest::new("demo", 1, "");
        request.installed_app_id = Some(1);
        let err = engine
            .install_app(&request, &DeployContext::background())
            .unwrap_err();
        assert!(matches!(err, EngineError::Rejected(_)));
    }

    #[test]
    fn delete_removes_release_only_when_committed() {
        let store = StateStore::open_in_memory().unwrap();
        let engine = ReleaseLedgerEngine::new(store.clone());
        let ctx = DeployContext::background();
        engine.install_app(&request(3), &ctx).unwrap();

        let mut uow = store.begin().unwrap();
        engine
            .delete_installed_app(
                &ctx,
                "demo",
                "clusterA__ns1",
                &request(3),
                &installed(3),
                &mut uow,
            )
            .unwrap();
        uow.rollback().unwrap();
        assert!(store.snapshot().unwrap().release(3).unwrap().is_some());

        let mut uow = store.begin().unwrap();
        engine
            .delete_installed_app(
                &ctx,
                "demo",
                "clusterA__ns1",
                &request(3),
                &installed(3),
                &mut uow,
            )
            .unwrap();
        uow.commit().unwrap();
        assert!(store.snapshot().unwrap().release(3).unwrap().is_none());
    }
}
