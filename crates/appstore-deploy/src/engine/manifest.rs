//! GitOps engine that publishes application manifests.
//!
//! Layout: `<root>/<environment>/<app>.json`. A sync controller watching
//! `root` reconciles the cluster against whatever manifests exist.

use std::fs;
use std::io;
use std::path::PathBuf;

use appstore_core::RowId;
use appstore_state::{InstalledApp, UnitOfWork, epoch_secs};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{DeploymentEngine, EngineKind};
use crate::context::DeployContext;
use crate::error::{EngineError, EngineResult};
use crate::request::{InstallAppRequest, InstalledAppRecord, is_path_segment};

/// Status reported for an app whose manifest is published.
pub const SYNCED: &str = "Synced";

/// Application manifest as written for the sync controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationManifest {
    pub name: String,
    pub environment: String,
    pub cluster_id: Option<RowId>,
    pub namespace: Option<String>,
    pub installed_app_id: RowId,
    pub chart_version_id: RowId,
    pub values_yaml: String,
    pub published_at: u64,
}

/// GitOps engine writing one manifest file per installed app.
#[derive(Debug, Clone)]
pub struct ManifestEngine {
    root: PathBuf,
}

impl ManifestEngine {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Manifest location, or `None` when either name cannot be a path segment.
    pub fn manifest_path(&self, environment_name: &str, app_name: &str) -> Option<PathBuf> {
        if !is_path_segment(environment_name) || !is_path_segment(app_name) {
            return None;
        }
        Some(
            self.root
                .join(environment_name)
                .join(format!("{app_name}.json")),
        )
    }

    /// Read a published manifest back, if present.
    pub fn read_manifest(
        &self,
        environment_name: &str,
        app_name: &str,
    ) -> EngineResult<Option<ApplicationManifest>> {
        let Some(path) = self.manifest_path(environment_name, app_name) else {
            return Ok(None);
        };
        match fs::read(path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl DeploymentEngine for ManifestEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::GitOps
    }

    fn install_app(&self, request: &InstallAppRequest, ctx: &DeployContext) -> EngineResult<()> {
        ctx.check()?;
        let environment = request.environment_name.clone().ok_or_else(|| {
            EngineError::Rejected("install request has no environment".to_string())
        })?;
        let installed_app_id = request.installed_app_id.ok_or_else(|| {
            EngineError::Rejected("install request has no installed app id".to_string())
        })?;
        let path = self
            .manifest_path(&environment, &request.app_name)
            .ok_or_else(|| {
                EngineError::Rejected(format!(
                    "{environment}/{} is not a valid manifest location",
                    request.app_name
                ))
            })?;

        let manifest = ApplicationManifest {
            name: request.app_name.clone(),
            environment: environment.clone(),
            cluster_id: request.cluster_id,
            namespace: request.namespace.clone(),
            installed_app_id,
            chart_version_id: request.chart_version_id,
            values_yaml: request.values_override_yaml.clone(),
            published_at: epoch_secs(),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write-then-rename so the controller never sees a partial manifest.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&manifest)?)?;
        fs::rename(&tmp, &path)?;

        info!(
            app = %request.app_name,
            environment = %environment,
            path = %path.display(),
            "manifest published"
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
        _uow: &mut UnitOfWork,
    ) -> EngineResult<()> {
        ctx.check()?;
        // Such a name was never published, so there is nothing to remove.
        let Some(path) = self.manifest_path(environment_name, app_name) else {
            warn!(
                app = %app_name,
                environment = %environment_name,
                installed_app_id = installed_app.id,
                "no publishable manifest location, nothing to remove"
            );
            return Ok(());
        };
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(app = %app_name, environment = %environment_name, "manifest removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(
                    app = %app_name,
                    environment = %environment_name,
                    installed_app_id = installed_app.id,
                    "manifest already absent"
                );
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn app_status(&self, record: &InstalledAppRecord) -> EngineResult<String> {
        let published = self
            .manifest_path(&record.environment_name, &record.app_name)
            .is_some_and(|path| path.is_file());
        if published {
            Ok(SYNCED.to_string())
        } else {
            Err(EngineError::ResourceTreeNotFound(record.app_name.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appstore_core::{DeploymentStatus, OperatingMode};
    use appstore_state::{AuditLog, StateStore};

    fn request() -> InstallAppRequest {
        let mut request = InstallAppRequest::new("demo", 4, "key: v").in_environment(2);
        request.environment_name = Some("clusterA__ns1".to_string());
        request.installed_app_id = Some(5);
        request
    }

    fn record() -> InstalledAppRecord {
        InstalledAppRecord {
            installed_app_id: 5,
            installed_app_version_id: 1,
            app_id: 1,
            app_name: "demo".to_string(),
            environment_id: 2,
            environment_name: "clusterA__ns1".to_string(),
            cluster_id: 1,
            namespace: "ns1".to_string(),
            chart_version_id: 4,
            offering_mode: OperatingMode::Full,
            status: DeploymentStatus::Success,
            deployed_at: 0,
            deployed_by: 7,
        }
    }

    fn installed() -> InstalledApp {
        InstalledApp {
            id: 5,
            app_id: 1,
            environment_id: 2,
            status: DeploymentStatus::Success,
            active: true,
            audit: AuditLog::new(7),
        }
    }

    #[test]
    fn install_publishes_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let engine = ManifestEngine::new(dir.path());
        engine
            .install_app(&request(), &DeployContext::background())
            .unwrap();

        let manifest = engine
            .read_manifest("clusterA__ns1", "demo")
            .unwrap()
            .unwrap();
        assert_eq!(manifest.values_yaml, "key: v");
        assert_eq!(manifest.chart_version_id, 4);
        assert!(!dir.path().join("clusterA__ns1/demo.json.tmp").exists());
        assert_eq!(engine.app_status(&record()).unwrap(), SYNCED);
    }

    #[test]
    fn status_without_manifest_is_resource_tree_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let engine = ManifestEngine::new(dir.path());
        assert!(matches!(
            engine.app_status(&record()),
            Err(EngineError::ResourceTreeNotFound(_))
        ));
    }

    #[test]
    fn delete_removes_manifest_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let engine = ManifestEngine::new(dir.path());
        let ctx = DeployContext::background();
        engine.install_app(&request(), &ctx).unwrap();

        let store = StateStore::open_in_memory().unwrap();
        for _ in 0..2 {
            let mut uow = store.begin().unwrap();
            engine
                .delete_installed_app(
                    &ctx,
                    "demo",
                    "clusterA__ns1",
                    &request(),
                    &installed(),
                    &mut uow,
                )
                .unwrap();
            uow.commit().unwrap();
        }
        assert!(
            engine
                .read_manifest("clusterA__ns1", "demo")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn path_traversal_is_rejected_on_install() {
        let dir = tempfile::tempdir().unwrap();
        let engine = ManifestEngine::new(dir.path());
        let mut bad = request();
        bad.app_name = "../escape".to_string();
        let err = engine
            .install_app(&bad, &DeployContext::background())
            .unwrap_err();
        assert!(matches!(err, EngineError::Rejected(_)));
    }

    #[test]
    fn delete_of_unpublishable_name_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let engine = ManifestEngine::new(dir.path());
        let store = StateStore::open_in_memory().unwrap();
        let mut uow = store.begin().unwrap();

        engine
            .delete_installed_app(
                &DeployContext::background(),
                "team/demo",
                "clusterA__ns1",
                &request(),
                &installed(),
                &mut uow,
            )
            .unwrap();
        assert!(engine.read_manifest("clusterA__ns1", "team/demo").unwrap().is_none());
    }

    #[test]
    fn install_without_environment_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let engine = ManifestEngine::new(dir.path());
        let mut request = request();
        request.environment_name = None;
        assert!(matches!(
            engine.install_app(&request, &DeployContext::background()),
            Err(EngineError::Rejected(_))
        ));
    }
}
