//! redb table definitions for the app store state store.
//!
//! Row tables use `u64` keys (ids allocated from `SEQUENCES`) and `&[u8]`
//! values (JSON-serialized row types).

use redb::TableDefinition;

/// Shape shared by every row table.
pub type RowTable = TableDefinition<'static, u64, &'static [u8]>;

/// Apps keyed by `{app_id}`.
pub const APPS: RowTable = TableDefinition::new("apps");

/// Clusters keyed by `{cluster_id}`.
pub const CLUSTERS: RowTable = TableDefinition::new("clusters");

/// Environments keyed by `{environment_id}`.
pub const ENVIRONMENTS: RowTable = TableDefinition::new("environments");

/// Installed apps keyed by `{installed_app_id}`.
pub const INSTALLED_APPS: RowTable = TableDefinition::new("installed_apps");

/// Installed app versions keyed by `{installed_app_version_id}`.
pub const INSTALLED_APP_VERSIONS: RowTable = TableDefinition::new("installed_app_versions");

/// Default cluster component joins keyed by `{row_id}`.
pub const CLUSTER_INSTALLED_APPS: RowTable = TableDefinition::new("cluster_installed_apps");

/// Chart versions keyed by `{chart_version_id}`.
pub const CHART_VERSIONS: RowTable = TableDefinition::new("chart_versions");

/// Deployed values history keyed by `{history_id}`.
pub const CHART_HISTORY: RowTable = TableDefinition::new("chart_history");

/// Direct-apply releases keyed by `{installed_app_id}`.
pub const RELEASES: RowTable = TableDefinition::new("releases");

/// Last allocated id per row table, keyed by table name.
pub const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

/// Every row table, for schema creation.
pub const ROW_TABLES: [RowTable; 9] = [
    APPS,
    CLUSTERS,
    ENVIRONMENTS,
    INSTALLED_APPS,
    INSTALLED_APP_VERSIONS,
    CLUSTER_INSTALLED_APPS,
    CHART_VERSIONS,
    CHART_HISTORY,
    RELEASES,
];
