//! Status updates and installed-app listings.

use std::collections::HashSet;

use appstore_core::{DeploymentStatus, RowId};
use appstore_state::StateReader;
use tracing::{error, info};

use crate::error::{DeployError, DeployResult, EngineError};
use crate::request::{InstalledAppRecord, InstalledAppSummary};
use crate::service::{DeploymentService, installed_app_record};

/// Display status for an app the engine has no resources for.
pub const NOT_FOUND_STATUS: &str = "Not Found";

impl DeploymentService {
    /// Set the status of an installed app in its own unit of work.
    pub fn update_status(
        &self,
        installed_app_id: RowId,
        status: DeploymentStatus,
    ) -> DeployResult<bool> {
        let mut uow = self.store.begin()?;
        let mut installed = uow
            .installed_app(installed_app_id)
            .map_err(DeployError::from)
            .and_then(|found| found.ok_or(DeployError::InstalledAppNotFound(installed_app_id)))
            .inspect_err(|e| error!(installed_app_id, error = %e, "status update load failed"))?;
        let previous = installed.status;
        installed.status = status;
        uow.update_installed_app(&installed)
            .inspect_err(|e| error!(installed_app_id, error = %e, "status update write failed"))?;
        uow.commit()
            .inspect_err(|e| error!(installed_app_id, error = %e, "status update commit failed"))?;
        info!(installed_app_id, from = %previous, to = %status, "installed app status updated");
        Ok(true)
    }

    /// Engine-reported status of one active installed app.
    pub fn app_status(&self, installed_app_id: RowId) -> DeployResult<String> {
        let record = {
            let snapshot = self.store.snapshot()?;
            let installed = snapshot
                .active_installed_app(installed_app_id)?
                .ok_or(DeployError::InstalledAppNotFound(installed_app_id))?;
            installed_app_record(&snapshot, &installed)?
        };
        self.display_status(&record)
    }

    /// Every active installed app deployed from any version of `chart_id`,
    /// with its engine-reported status.
    pub fn list_installed_apps_for_chart(
        &self,
        chart_id: RowId,
    ) -> DeployResult<Vec<InstalledAppSummary>> {
        let records = {
            let snapshot = self.store.snapshot()?;
            let version_ids: HashSet<RowId> = snapshot
                .chart_versions_for_chart(chart_id)?
                .into_iter()
                .map(|version| version.id)
                .collect();
            let mut records = Vec::new();
            for installed in snapshot.list_installed_apps()? {
                if !installed.active {
                    continue;
                }
                let record = installed_app_record(&snapshot, &installed)?;
                if version_ids.contains(&record.chart_version_id) {
                    records.push(record);
                }
            }
            records
        };

        let mut summaries = Vec::with_capacity(records.len());
        for record in records {
            let status = self.display_status(&record)?;
            // Cluster coordinates are only meaningful for apps recorded in
            // lightweight mode, whatever mode the server runs in now.
            let lightweight = record.offering_mode.is_lightweight();
            summaries.push(InstalledAppSummary {
                environment_name: record.environment_name,
                app_name: record.app_name,
                deployed_at: record.deployed_at,
                deployed_by: record.deployed_by,
                status,
                chart_version_id: record.chart_version_id,
                installed_app_version_id: record.installed_app_version_id,
                installed_app_id: record.installed_app_id,
                environment_id: record.environment_id,
                offering_mode: record.offering_mode,
                cluster_id: lightweight.then_some(record.cluster_id),
                namespace: lightweight.then_some(record.namespace),
            });
        }
        Ok(summaries)
    }

    fn display_status(&self, record: &InstalledAppRecord) -> DeployResult<String> {
        let selected = self.selector.select(record.offering_mode);
        match selected.engine.app_status(record) {
            Ok(status) => Ok(status),
            Err(EngineError::ResourceTreeNotFound(_)) => Ok(NOT_FOUND_STATUS.to_string()),
            Err(e) => {
                error!(
                    app = %record.app_name,
                    installed_app_id = record.installed_app_id,
                    engine = %selected.kind,
                    error = %e,
                    "engine status lookup failed"
                );
                Err(e.into())
            }
        }
    }
}
