//! Environment resolution for install and delete.

use appstore_core::{RowId, UserId};
use appstore_state::{AuditLog, Environment, StateReader, UnitOfWork};
use tracing::info;

use crate::error::{DeployError, DeployResult};
use crate::request::require_path_segment;

/// Deterministic environment identifier for a namespace on a cluster.
pub fn environment_identifier(cluster_name: &str, namespace: &str) -> String {
    format!("{cluster_name}__{namespace}")
}

/// Find the active environment for (`cluster_id`, `namespace`), creating it
/// inside the caller's unit of work when none exists.
pub fn ensure_environment(
    uow: &mut UnitOfWork,
    cluster_id: RowId,
    namespace: &str,
    user_id: UserId,
) -> DeployResult<Environment> {
    if namespace.is_empty() {
        return Err(DeployError::InvalidRequest(
            "namespace must not be empty".to_string(),
        ));
    }
    if let Some(environment) = uow.find_environment(cluster_id, namespace)? {
        return Ok(environment);
    }

    let cluster = uow
        .cluster(cluster_id)?
        .filter(|cluster| cluster.active)
        .ok_or(DeployError::ClusterNotFound(cluster_id))?;
    let name = environment_identifier(&cluster.name, namespace);
    require_path_segment(&name, "environment name")?;
    let environment = uow.insert_environment(Environment {
        id: 0,
        cluster_id,
        namespace: namespace.to_string(),
        name,
        is_default: false,
        active: true,
        audit: AuditLog::new(user_id),
    })?;
    info!(
        environment = %environment.name,
        environment_id = environment.id,
        "environment created"
    );
    Ok(environment)
}

/// Load an existing active environment by id.
pub fn require_environment<R: StateReader>(
    reader: &R,
    environment_id: RowId,
) -> DeployResult<Environment> {
    reader
        .environment(environment_id)?
        .filter(|environment| environment.active)
        .ok_or(DeployError::EnvironmentNotFound(environment_id))
}
