//! Orchestration and engine error types.

use appstore_core::RowId;
use appstore_state::StateError;
use thiserror::Error;

/// Errors returned by a deployment engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine has no resources for the app. Listing reports this as "Not Found".
    #[error("resource tree not found for {0}")]
    ResourceTreeNotFound(String),

    #[error("deployment cancelled")]
    Cancelled,

    #[error("engine rejected request: {0}")]
    Rejected(String),

    #[error("engine state error: {0}")]
    State(#[from] StateError),

    #[error("engine i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("manifest encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur during deployment orchestration.
#[derive(Debug, Error)]
pub enum DeployError {
    /// Another active app already uses the name.
    #[error("app already exists with name {name}")]
    AppAlreadyExists { name: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("app not found: {0}")]
    AppNotFound(RowId),

    #[error("cluster not found: {0}")]
    ClusterNotFound(RowId),

    #[error("environment not found: {0}")]
    EnvironmentNotFound(RowId),

    #[error("chart version not found: {0}")]
    ChartVersionNotFound(RowId),

    #[error("installed app not found: {0}")]
    InstalledAppNotFound(RowId),

    #[error("state store error: {0}")]
    State(#[from] StateError),

    #[error("deployment engine error: {0}")]
    Engine(#[from] EngineError),
}

pub type DeployResult<T> = Result<T, DeployError>;

impl DeployError {
    /// Recoverable business conflict, safe to show to the user.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DeployError::AppAlreadyExists { .. })
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            DeployError::AppNotFound(_)
            | DeployError::ClusterNotFound(_)
            | DeployError::EnvironmentNotFound(_)
            | DeployError::ChartVersionNotFound(_)
            | DeployError::InstalledAppNotFound(_) => true,
            DeployError::State(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Message suitable for end users; internal errors collapse to a generic line.
    pub fn user_message(&self) -> String {
        match self {
            DeployError::State(_) => "internal storage error".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_classification() {
        let err = DeployError::AppAlreadyExists {
            name: "demo".to_string(),
        };
        assert!(err.is_conflict());
        assert!(!err.is_not_found());
        assert_eq!(err.user_message(), "app already exists with name demo");
    }

    #[test]
    fn not_found_classification_includes_state_rows() {
        assert!(DeployError::EnvironmentNotFound(3).is_not_found());
        let state = StateError::NotFound {
            table: "apps".to_string(),
            id: 1,
        };
        assert!(DeployError::State(state).is_not_found());
        assert!(!DeployError::State(StateError::Commit("disk full".to_string())).is_not_found());
    }

    #[test]
    fn engine_errors_surface_verbatim() {
        let err = DeployError::from(EngineError::Rejected("chart pull failed".to_string()));
        assert!(err.to_string().contains("chart pull failed"));
    }
}
