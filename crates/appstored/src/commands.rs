//! Subcommand handlers.
//!
//! Registry and query commands run inline. Install and delete run the
//! blocking orchestration on the blocking pool; Ctrl-C cancels the engine
//! call through the deploy context.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use appstore_core::{AppStoreConfig, DeploymentStatus, RowId, UserId, parse_chart_version};
use appstore_deploy::environment::ensure_environment;
use appstore_deploy::{
    DeployContext, DeployResult, DeploymentService, InstallAppRequest, ManifestEngine,
    ReleaseLedgerEngine,
};
use appstore_state::{StateReader, StateStore};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Serialize)]
struct StatusReport {
    installed_app_id: RowId,
    status: String,
}

#[derive(Serialize)]
struct RepoReport {
    chart_version_id: RowId,
    active: bool,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn open_store(config: &AppStoreConfig) -> anyhow::Result<StateStore> {
    std::fs::create_dir_all(&config.server.data_dir)
        .with_context(|| format!("creating {}", config.server.data_dir.display()))?;
    let db_path = config.database_path();
    let store = StateStore::open(&db_path)?;
    info!(path = ?db_path, "state store opened");
    Ok(store)
}

fn open_service(config: &AppStoreConfig) -> anyhow::Result<DeploymentService> {
    let store = open_store(config)?;
    let direct_apply = Arc::new(ReleaseLedgerEngine::new(store.clone()));
    let gitops = Arc::new(ManifestEngine::new(config.gitops.manifest_dir.clone()));
    info!(
        mode = %config.server.mode,
        manifest_dir = ?config.gitops.manifest_dir,
        "deployment service ready"
    );
    Ok(DeploymentService::new(store, config.server.mode, direct_apply, gitops))
}

/// Run a blocking orchestration, cancelling its engine call on Ctrl-C.
async fn run_cancellable<T, F>(work: F) -> anyhow::Result<T>
where
    T: Send + 'static,
    F: FnOnce(DeployContext) -> DeployResult<T> + Send + 'static,
{
    let (ctx, cancel) = DeployContext::new();
    let mut task = tokio::task::spawn_blocking(move || work(ctx));
    tokio::select! {
        joined = &mut task => Ok(joined??),
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to install Ctrl-C handler")?;
            warn!("interrupt received, cancelling engine call");
            cancel.cancel();
            Ok(task.await??)
        }
    }
}

pub fn init_config(config: &AppStoreConfig, output: &Path, force: bool) -> anyhow::Result<()> {
    if output.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", output.display());
    }
    let scaffold = AppStoreConfig::scaffold(config.server.mode, &config.server.data_dir);
    std::fs::write(output, scaffold.to_toml_string()?)?;
    info!(path = %output.display(), mode = %config.server.mode, "config written");
    Ok(())
}

pub fn add_cluster(config: &AppStoreConfig, name: &str, server_url: &str) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let cluster = store.register_cluster(name, server_url)?;
    info!(cluster_id = cluster.id, name = %cluster.name, "cluster registered");
    print_json(&cluster)
}

pub fn list_clusters(config: &AppStoreConfig) -> anyhow::Result<()> {
    let store = open_store(config)?;
    print_json(&store.snapshot()?.list_clusters()?)
}

pub fn add_environment(
    config: &AppStoreConfig,
    cluster_id: RowId,
    namespace: &str,
    user_id: UserId,
) -> anyhow::Result<()> {
    let store = open_store(config)?;
    let mut uow = store.begin()?;
    let environment = ensure_environment(&mut uow, cluster_id, namespace, user_id)?;
    uow.commit()?;
    print_json(&environment)
}

pub fn list_environments(config: &AppStoreConfig) -> anyhow::Result<()> {
    let store = open_store(config)?;
    print_json(&store.snapshot()?.list_environments()?)
}

pub fn add_chart_version(
    config: &AppStoreConfig,
    chart_id: RowId,
    name: &str,
    version: &str,
    repo: &str,
    repo_active: bool,
) -> anyhow::Result<()> {
    let parsed = parse_chart_version(version)
        .with_context(|| format!("invalid chart version {version:?}"))?;
    let store = open_store(config)?;
    let chart_version =
        store.register_chart_version(chart_id, name, &parsed.to_string(), repo, repo_active)?;
    info!(
        chart_version_id = chart_version.id,
        chart = %name,
        version = %parsed,
        "chart version registered"
    );
    print_json(&chart_version)
}

pub async fn install(config: &AppStoreConfig, request: InstallAppRequest) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let installed = run_cancellable(move |ctx| service.install_app(request, &ctx)).await?;
    print_json(&installed)
}

pub async fn delete(
    config: &AppStoreConfig,
    installed_app_id: RowId,
    user_id: UserId,
) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let mut request = InstallAppRequest::default();
    request.installed_app_id = Some(installed_app_id);
    request.user_id = user_id;
    let deleted = run_cancellable(move |ctx| service.delete_installed_app(&ctx, request)).await?;
    print_json(&deleted)
}

pub fn status(
    config: &AppStoreConfig,
    installed_app_id: RowId,
    set: Option<DeploymentStatus>,
) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let status = match set {
        Some(status) => {
            service.update_status(installed_app_id, status)?;
            status.to_string()
        }
        None => service.app_status(installed_app_id)?,
    };
    print_json(&StatusReport {
        installed_app_id,
        status,
    })
}

pub fn show(config: &AppStoreConfig, installed_app_id: RowId) -> anyhow::Result<()> {
    let service = open_service(config)?;
    print_json(&service.get_installed_app(installed_app_id)?)
}

pub fn list(config: &AppStoreConfig, chart_id: RowId) -> anyhow::Result<()> {
    let service = open_service(config)?;
    print_json(&service.list_installed_apps_for_chart(chart_id)?)
}

pub fn repo_active(config: &AppStoreConfig, chart_version_id: RowId) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let active = service.is_chart_repo_active(chart_version_id)?;
    print_json(&RepoReport {
        chart_version_id,
        active,
    })
}
