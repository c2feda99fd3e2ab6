//! Shared types used across app store crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Row identifier. Allocated from a per-table sequence, so lower ids were created earlier.
pub type RowId = u64;

/// Identifier of the user performing an operation (audit fields).
pub type UserId = u64;

/// Which deployment engine family governs the server, or a single record.
///
/// `Lightweight` runs without a GitOps repository: charts are applied
/// directly to the target cluster and environments are created on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    #[default]
    Full,
    Lightweight,
}

impl OperatingMode {
    pub fn is_lightweight(&self) -> bool {
        matches!(self, OperatingMode::Lightweight)
    }

    pub fn label(&self) -> &'static str {
        match self {
            OperatingMode::Full => "full",
            OperatingMode::Lightweight => "lightweight",
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OperatingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(OperatingMode::Full),
            "lightweight" => Ok(OperatingMode::Lightweight),
            other => Err(format!("unknown operating mode: {other}")),
        }
    }
}

/// Lifecycle status of an installed app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    /// Bookkeeping committed, engine not yet confirmed.
    Init,
    InProgress,
    Success,
    Failed,
    DeleteInProgress,
    Deleted,
}

impl DeploymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DeploymentStatus::Init => "INIT",
            DeploymentStatus::InProgress => "IN_PROGRESS",
            DeploymentStatus::Success => "SUCCESS",
            DeploymentStatus::Failed => "FAILED",
            DeploymentStatus::DeleteInProgress => "DELETE_IN_PROGRESS",
            DeploymentStatus::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DeploymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "INIT" => Ok(DeploymentStatus::Init),
            "IN_PROGRESS" => Ok(DeploymentStatus::InProgress),
            "SUCCESS" => Ok(DeploymentStatus::Success),
            "FAILED" => Ok(DeploymentStatus::Failed),
            "DELETE_IN_PROGRESS" => Ok(DeploymentStatus::DeleteInProgress),
            "DELETED" => Ok(DeploymentStatus::Deleted),
            _ => Err(format!("unknown deployment status: {s}")),
        }
    }
}

/// Parse a chart version string, accepting an optional leading `v`.
pub fn parse_chart_version(version: &str) -> Result<semver::Version, semver::Error> {
    semver::Version::parse(version.trim_start_matches('v'))
}
