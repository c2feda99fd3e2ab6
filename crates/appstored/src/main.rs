//! App store deployment orchestrator binary.
//!
//! Operator binary over the deployment service:
//! - State store (redb)
//! - Direct-apply engine (release ledger in the store)
//! - GitOps engine (application manifests on disk)
//!
//! # Usage
//!
//! ```text
//! appstored init-config --mode lightweight --data-dir /var/lib/appstore
//! appstored --config appstore.toml cluster add clusterA https://a.example
//! appstored --config appstore.toml install demo 1 --cluster-id 1 --namespace ns1
//! ```

mod commands;

use std::path::PathBuf;

use appstore_core::{AppStoreConfig, DeploymentStatus, OperatingMode, RowId, UserId};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,appstore=debug,appstored=debug";

#[derive(Parser)]
#[command(name = "appstored", about = "App store deployment orchestrator")]
struct Cli {
    /// Path to appstore.toml. Defaults apply when omitted.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Override the server operating mode.
    #[arg(long, global = true)]
    mode: Option<OperatingMode>,

    /// Override the data directory holding the state store.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a scaffolded appstore.toml.
    InitConfig {
        #[arg(default_value = "appstore.toml")]
        output: PathBuf,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Manage target clusters.
    Cluster {
        #[command(subcommand)]
        command: ClusterCommand,
    },

    /// Manage environments.
    Env {
        #[command(subcommand)]
        command: EnvCommand,
    },

    /// Manage chart versions.
    Chart {
        #[command(subcommand)]
        command: ChartCommand,
    },

    /// Install an app from a chart version.
    Install(InstallArgs),

    /// Delete an installed app.
    Delete {
        installed_app_id: RowId,

        #[arg(long, default_value = "1")]
        user_id: UserId,
    },

    /// Show the engine status of an installed app, or set its stored status.
    Status {
        installed_app_id: RowId,

        /// Store this status instead of querying the engine.
        #[arg(long)]
        set: Option<DeploymentStatus>,
    },

    /// Show an installed app.
    Show { installed_app_id: RowId },

    /// List installed apps deployed from a chart.
    List { chart_id: RowId },

    /// Report whether the repository of a chart version is active.
    RepoActive { chart_version_id: RowId },
}

#[derive(Subcommand)]
enum ClusterCommand {
    /// Register a cluster.
    Add { name: String, server_url: String },
    /// List registered clusters.
    List,
}

#[derive(Subcommand)]
enum EnvCommand {
    /// Create (or find) the environment for a namespace on a cluster.
    Add {
        #[arg(long)]
        cluster_id: RowId,

        #[arg(long)]
        namespace: String,

        #[arg(long, default_value = "1")]
        user_id: UserId,
    },
    /// List environments.
    List,
}

#[derive(Subcommand)]
enum ChartCommand {
    /// Register a chart version.
    Add {
        #[arg(long)]
        chart_id: RowId,

        #[arg(long)]
        name: String,

        #[arg(long)]
        version: String,

        #[arg(long)]
        repo: String,

        /// Mark the chart repository as inactive.
        #[arg(long)]
        inactive_repo: bool,
    },
}

#[derive(Args)]
struct InstallArgs {
    app_name: String,

    chart_version_id: RowId,

    /// File holding the override values.
    #[arg(long)]
    values: Option<PathBuf>,

    /// Pre-provisioned environment (required in full mode).
    #[arg(long)]
    environment_id: Option<RowId>,

    #[arg(long)]
    cluster_id: Option<RowId>,

    #[arg(long)]
    namespace: Option<String>,

    #[arg(long, default_value = "1")]
    team_id: RowId,

    #[arg(long, default_value = "1")]
    user_id: UserId,

    /// Track the install as a default cluster component.
    #[arg(long)]
    default_component: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppStoreConfig::from_file(path)?,
        None => AppStoreConfig::default(),
    };
    if let Some(mode) = cli.mode {
        config.server.mode = mode;
    }
    if let Some(data_dir) = &cli.data_dir {
        config.server.data_dir = data_dir.clone();
    }

    // RUST_LOG wins over the config file's filter.
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            EnvFilter::try_new(config.logging.filter.as_deref().unwrap_or(DEFAULT_FILTER))?
        }
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::InitConfig { output, force } => commands::init_config(&config, &output, force),
        Command::Cluster { command } => match command {
            ClusterCommand::Add { name, server_url } => {
                commands::add_cluster(&config, &name, &server_url)
            }
            ClusterCommand::List => commands::list_clusters(&config),
        },
        Command::Env { command } => match command {
            EnvCommand::Add {
                cluster_id,
                namespace,
                user_id,
            } => commands::add_environment(&config, cluster_id, &namespace, user_id),
            EnvCommand::List => commands::list_environments(&config),
        },
        Command::Chart { command } => match command {
            ChartCommand::Add {
                chart_id,
                name,
                version,
                repo,
                inactive_repo,
            } => commands::add_chart_version(
                &config,
                chart_id,
                &name,
                &version,
                &repo,
                !inactive_repo,
            ),
        },
        Command::Install(args) => commands::install(&config, args.into_request()?).await,
        Command::Delete {
            installed_app_id,
            user_id,
        } => commands::delete(&config, installed_app_id, user_id).await,
        Command::Status {
            installed_app_id,
            set,
        } => commands::status(&config, installed_app_id, set),
        Command::Show { installed_app_id } => commands::show(&config, installed_app_id),
        Command::List { chart_id } => commands::list(&config, chart_id),
        Command::RepoActive { chart_version_id } => {
            commands::repo_active(&config, chart_version_id)
        }
    }
}

impl InstallArgs {
    fn into_request(self) -> anyhow::Result<appstore_deploy::InstallAppRequest> {
        let values = match &self.values {
            Some(path) => std::fs::read_to_string(path)?,
            None => String::new(),
        };
        let mut request =
            appstore_deploy::InstallAppRequest::new(&self.app_name, self.chart_version_id, &values)
                .by_user(self.team_id, self.user_id);
        request.environment_id = self.environment_id;
        request.cluster_id = self.cluster_id;
        request.namespace = self.namespace;
        request.default_cluster_component = self.default_component;
        Ok(request)
    }
}
