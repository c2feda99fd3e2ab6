//! Row types for the app store state store.
//!
//! Every entity is soft-deleted through its `active` flag; rows are never
//! removed. All types are JSON-serialized into redb value columns.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

pub use appstore_core::{DeploymentStatus, OperatingMode, RowId, UserId};

/// Created/updated bookkeeping shared by every mutable row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLog {
    pub created_by: UserId,
    /// Unix timestamp (seconds).
    pub created_on: u64,
    pub updated_by: UserId,
    /// Unix timestamp (seconds).
    pub updated_on: u64,
}

impl AuditLog {
    pub fn new(user: UserId) -> Self {
        let now = epoch_secs();
        Self {
            created_by: user,
            created_on: now,
            updated_by: user,
            updated_on: now,
        }
    }

    /// Stamp an update by `user`.
    pub fn touch(&mut self, user: UserId) {
        self.updated_by = user;
        self.updated_on = epoch_secs();
    }
}

// ── App ───────────────────────────────────────────────────────────

/// An application registered from the app store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub id: RowId,
    /// Unique among active rows.
    pub name: String,
    pub team_id: RowId,
    pub active: bool,
    /// Operating mode the app was created under.
    pub offering_mode: OperatingMode,
    pub audit: AuditLog,
}

// ── Cluster / Environment ─────────────────────────────────────────

/// Target cluster metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: RowId,
    pub name: String,
    pub server_url: String,
    pub active: bool,
}

/// A namespace on a cluster that apps are installed into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub id: RowId,
    pub cluster_id: RowId,
    pub namespace: String,
    /// Display identifier, e.g. `{cluster_name}__{namespace}`.
    pub name: String,
    pub is_default: bool,
    pub active: bool,
    pub audit: AuditLog,
}

// ── Installed apps ────────────────────────────────────────────────

/// One installation of an app into an environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledApp {
    pub id: RowId,
    pub app_id: RowId,
    pub environment_id: RowId,
    pub status: DeploymentStatus,
    pub active: bool,
    pub audit: AuditLog,
}

/// A deploy attempt of an installed app. Append-only; `active` marks the effective one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledAppVersion {
    pub id: RowId,
    pub installed_app_id: RowId,
    pub chart_version_id: RowId,
    pub values_yaml: String,
    pub reference_value_id: Option<RowId>,
    pub reference_value_kind: Option<String>,
    pub active: bool,
    pub audit: AuditLog,
}

/// Join row for installs flagged as default cluster components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterInstalledApp {
    pub id: RowId,
    pub cluster_id: RowId,
    pub installed_app_id: RowId,
    pub audit: AuditLog,
}

// ── Charts ────────────────────────────────────────────────────────

/// A published version of a chart in a chart repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartVersion {
    pub id: RowId,
    /// The chart (app store entry) this version belongs to.
    pub chart_id: RowId,
    pub chart_name: String,
    pub version: String,
    pub repo_name: String,
    pub repo_active: bool,
}

/// Values deployed for an installed app version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartHistory {
    pub id: RowId,
    pub installed_app_version_id: RowId,
    pub values: String,
    pub deployed_by: UserId,
    pub deployed_on: u64,
    pub audit: AuditLog,
}

// ── Releases ──────────────────────────────────────────────────────

/// Release record kept by the direct-apply engine, keyed by installed app id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub installed_app_id: RowId,
    pub release_name: String,
    pub cluster_id: RowId,
    pub namespace: String,
    pub chart_version_id: RowId,
    pub values_yaml: String,
    pub revision: u32,
    pub status: ReleaseStatus,
    pub updated_on: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseStatus {
    Deployed,
}

impl ReleaseStatus {
    /// Health label reported for the release.
    pub fn label(&self) -> &'static str {
        match self {
            ReleaseStatus::Deployed => "Healthy",
        }
    }
}

/// Current unix time in seconds.
pub fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
