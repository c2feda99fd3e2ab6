//! Request and response shapes exchanged with callers and engines.

use serde::{Deserialize, Serialize};

use appstore_core::{DeploymentStatus, OperatingMode, RowId, UserId};

use crate::error::{DeployError, DeployResult};

/// An install or delete request. Orchestrators fill in the ids they resolve
/// and hand the updated request back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstallAppRequest {
    pub app_name: String,
    pub team_id: RowId,
    pub user_id: UserId,
    pub chart_version_id: RowId,
    /// Serialized override values passed to the chart.
    pub values_override_yaml: String,
    pub reference_value_id: Option<RowId>,
    pub reference_value_kind: Option<String>,
    /// Required in full mode; resolved from `cluster_id` + `namespace` in lightweight mode.
    pub environment_id: Option<RowId>,
    pub cluster_id: Option<RowId>,
    pub namespace: Option<String>,
    /// Platform-managed install, tracked once per cluster.
    pub default_cluster_component: bool,

    // Filled in by the orchestrators.
    pub app_id: Option<RowId>,
    pub installed_app_id: Option<RowId>,
    pub installed_app_version_id: Option<RowId>,
    pub environment_name: Option<String>,
    pub offering_mode: Option<OperatingMode>,
    pub status: Option<DeploymentStatus>,
}

impl InstallAppRequest {
    pub fn new(app_name: &str, chart_version_id: RowId, values_override_yaml: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            chart_version_id,
            values_override_yaml: values_override_yaml.to_string(),
            ..Default::default()
        }
    }

    /// Target a namespace on a cluster (lightweight mode).
    pub fn on_cluster(mut self, cluster_id: RowId, namespace: &str) -> Self {
        self.cluster_id = Some(cluster_id);
        self.namespace = Some(namespace.to_string());
        self
    }

    /// Target a pre-provisioned environment (full mode).
    pub fn in_environment(mut self, environment_id: RowId) -> Self {
        self.environment_id = Some(environment_id);
        self
    }

    pub fn by_user(mut self, team_id: RowId, user_id: UserId) -> Self {
        self.team_id = team_id;
        self.user_id = user_id;
        self
    }

    pub(crate) fn require(field: Option<RowId>, name: &str) -> DeployResult<RowId> {
        field.ok_or_else(|| DeployError::InvalidRequest(format!("{name} is required")))
    }
}

/// Whether `name` can be used as a single path segment. App and environment
/// names become directory and file names in published manifests.
pub fn is_path_segment(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

/// Reject `name` unless it is a valid path segment.
pub(crate) fn require_path_segment(name: &str, what: &str) -> DeployResult<()> {
    if !is_path_segment(name) {
        return Err(DeployError::InvalidRequest(format!(
            "{what} {name:?} must not be empty, contain path separators or be a relative path"
        )));
    }
    Ok(())
}

/// Joined view of one installed app, handed to engines for status lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledAppRecord {
    pub installed_app_id: RowId,
    pub installed_app_version_id: RowId,
    pub app_id: RowId,
    pub app_name: String,
    pub environment_id: RowId,
    pub environment_name: String,
    pub cluster_id: RowId,
    pub namespace: String,
    pub chart_version_id: RowId,
    pub offering_mode: OperatingMode,
    pub status: DeploymentStatus,
    /// Unix timestamp (seconds) of the last deploy.
    pub deployed_at: u64,
    pub deployed_by: UserId,
}

/// One row of the installed-apps listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledAppSummary {
    pub environment_name: String,
    pub app_name: String,
    pub deployed_at: u64,
    pub deployed_by: UserId,
    /// Engine-reported status, or `"Not Found"` when the engine has no resources.
    pub status: String,
    pub chart_version_id: RowId,
    pub installed_app_version_id: RowId,
    pub installed_app_id: RowId,
    pub environment_id: RowId,
    pub offering_mode: OperatingMode,
    /// Only filled for lightweight-mode records.
    pub cluster_id: Option<RowId>,
    pub namespace: Option<String>,
}
