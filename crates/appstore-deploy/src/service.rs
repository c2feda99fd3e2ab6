//! The deployment service: entry point for every orchestrator operation.
//!
//! Install, delete and status operations live in their own modules as
//! further `impl DeploymentService` blocks.

use std::sync::Arc;

use appstore_core::{OperatingMode, RowId};
use appstore_state::{InstalledApp, StateReader, StateStore};

use crate::engine::{DeploymentEngine, EngineSelector};
use crate::error::{DeployError, DeployResult};
use crate::request::{InstallAppRequest, InstalledAppRecord};

/// Coordinates the state store and the two deployment engines.
#[derive(Clone)]
pub struct DeploymentService {
    pub(crate) store: StateStore,
    pub(crate) selector: EngineSelector,
}

impl DeploymentService {
    pub fn new(
        store: StateStore,
        mode: OperatingMode,
        direct_apply: Arc<dyn DeploymentEngine>,
        gitops: Arc<dyn DeploymentEngine>,
    ) -> Self {
        Self::with_selector(store, EngineSelector::new(mode, direct_apply, gitops))
    }

    pub fn with_selector(store: StateStore, selector: EngineSelector) -> Self {
        Self { store, selector }
    }

    /// Server-wide operating mode.
    pub fn mode(&self) -> OperatingMode {
        self.selector.mode()
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn selector(&self) -> &EngineSelector {
        &self.selector
    }

    /// Describe an active installed app as a request, joined with its app,
    /// environment and effective version.
    pub fn get_installed_app(&self, installed_app_id: RowId) -> DeployResult<InstallAppRequest> {
        let snapshot = self.store.snapshot()?;
        let installed = snapshot
            .active_installed_app(installed_app_id)?
            .ok_or(DeployError::InstalledAppNotFound(installed_app_id))?;
        let record = installed_app_record(&snapshot, &installed)?;

        let mut request = InstallAppRequest::new(
            &record.app_name,
            record.chart_version_id,
            "",
        );
        if let Some(version) = snapshot.installed_app_version(record.installed_app_version_id)? {
            request.values_override_yaml = version.values_yaml;
            request.reference_value_id = version.reference_value_id;
            request.reference_value_kind = version.reference_value_kind;
        }
        if let Some(app) = snapshot.app(record.app_id)? {
            request.team_id = app.team_id;
        }
        request.user_id = record.deployed_by;
        request.app_id = Some(record.app_id);
        request.installed_app_id = Some(record.installed_app_id);
        request.installed_app_version_id = Some(record.installed_app_version_id);
        request.environment_id = Some(record.environment_id);
        request.environment_name = Some(record.environment_name);
        request.cluster_id = Some(record.cluster_id);
        request.namespace = Some(record.namespace);
        request.offering_mode = Some(record.offering_mode);
        request.status = Some(record.status);
        Ok(request)
    }

    /// Whether the chart repository publishing a chart version is active.
    pub fn is_chart_repo_active(&self, chart_version_id: RowId) -> DeployResult<bool> {
        let snapshot = self.store.snapshot()?;
        let version = snapshot
            .chart_version(chart_version_id)?
            .ok_or(DeployError::ChartVersionNotFound(chart_version_id))?;
        Ok(version.repo_active)
    }
}

/// Join an installed app with its app, environment and effective version.
pub(crate) fn installed_app_record<R: StateReader>(
    reader: &R,
    installed: &InstalledApp,
) -> DeployResult<InstalledAppRecord> {
    let app = reader
        .app(installed.app_id)?
        .ok_or(DeployError::AppNotFound(installed.app_id))?;
    let environment = reader
        .environment(installed.environment_id)?
        .ok_or(DeployError::EnvironmentNotFound(installed.environment_id))?;
    let version = reader
        .active_installed_app_version(installed.id)?
        .ok_or(DeployError::InstalledAppNotFound(installed.id))?;

    Ok(InstalledAppRecord {
        installed_app_id: installed.id,
        installed_app_version_id: version.id,
        app_id: app.id,
        app_name: app.name,
        environment_id: environment.id,
        environment_name: environment.name,
        cluster_id: environment.cluster_id,
        namespace: environment.namespace,
        chart_version_id: version.chart_version_id,
        offering_mode: app.offering_mode,
        status: installed.status,
        deployed_at: version.audit.updated_on,
        deployed_by: version.audit.updated_by,
    })
}
