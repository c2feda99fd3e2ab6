//! redb-backed state store.
//!
//! Writes go through a [`UnitOfWork`], which wraps a single redb write
//! transaction: every insert/update made through it commits or rolls back
//! together, and dropping an uncommitted unit rolls it back. Reads go
//! through the [`StateReader`] trait, implemented both by a unit of work
//! (seeing its own uncommitted writes) and by a read-only [`Snapshot`].
//!
//! redb serializes write transactions: `begin` blocks while another unit
//! of work is open. A thread holding a unit of work must not begin another.

use std::path::Path;
use std::sync::Arc;

use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, TableHandle, WriteTransaction,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        for table in ROW_TABLES {
            txn.open_table(table).map_err(map_err!(Table))?;
        }
        txn.open_table(SEQUENCES).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Commit))?;
        Ok(())
    }

    /// Begin a unit of work. Blocks while another unit of work is open.
    pub fn begin(&self) -> StateResult<UnitOfWork> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        Ok(UnitOfWork { txn: Some(txn) })
    }

    /// Open a consistent read-only view of committed state.
    pub fn snapshot(&self) -> StateResult<Snapshot> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        Ok(Snapshot { txn })
    }

    // ── Registry seeding ───────────────────────────────────────────

    /// Register a target cluster.
    pub fn register_cluster(&self, name: &str, server_url: &str) -> StateResult<Cluster> {
        let mut uow = self.begin()?;
        let cluster = uow.insert_cluster(Cluster {
            id: 0,
            name: name.to_string(),
            server_url: server_url.to_string(),
            active: true,
        })?;
        uow.commit()?;
        Ok(cluster)
    }

    /// Register a chart version published by `repo_name`.
    pub fn register_chart_version(
        &self,
        chart_id: RowId,
        chart_name: &str,
        version: &str,
        repo_name: &str,
        repo_active: bool,
    ) -> StateResult<ChartVersion> {
        let mut uow = self.begin()?;
        let chart_version = uow.insert_chart_version(ChartVersion {
            id: 0,
            chart_id,
            chart_name: chart_name.to_string(),
            version: version.to_string(),
            repo_name: repo_name.to_string(),
            repo_active,
        })?;
        uow.commit()?;
        Ok(chart_version)
    }
}

// ── Reads ──────────────────────────────────────────────────────────

fn encode<T: Serialize>(row: &T) -> StateResult<Vec<u8>> {
    serde_json::to_vec(row).map_err(map_err!(Serialize))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StateResult<T> {
    serde_json::from_slice(bytes).map_err(map_err!(Deserialize))
}

fn read_row<T, R>(table: &R, id: RowId) -> StateResult<Option<T>>
where
    T: DeserializeOwned,
    R: ReadableTable<u64, &'static [u8]>,
{
    match table.get(id).map_err(map_err!(Read))? {
        Some(guard) => Ok(Some(decode(guard.value())?)),
        None => Ok(None),
    }
}

fn read_rows<T, R>(table: &R) -> StateResult<Vec<T>>
where
    T: DeserializeOwned,
    R: ReadableTable<u64, &'static [u8]>,
{
    let mut results = Vec::new();
    for entry in table.iter().map_err(map_err!(Read))? {
        let (_, value) = entry.map_err(map_err!(Read))?;
        results.push(decode(value.value())?);
    }
    Ok(results)
}

/// Typed queries over the row tables.
///
/// Rows come back in id order, which is creation order. Methods named
/// `active_*` / `find_*` skip soft-deleted rows; plain getters do not.
pub trait StateReader {
    fn row<T: DeserializeOwned>(&self, table: RowTable, id: RowId) -> StateResult<Option<T>>;

    fn rows<T: DeserializeOwned>(&self, table: RowTable) -> StateResult<Vec<T>>;

    fn app(&self, id: RowId) -> StateResult<Option<App>> {
        self.row(APPS, id)
    }

    /// Every app row with `name`, active or not, earliest first.
    fn apps_by_name(&self, name: &str) -> StateResult<Vec<App>> {
        let mut apps: Vec<App> = self.rows(APPS)?;
        apps.retain(|app| app.name == name);
        apps.sort_by_key(|app| (app.audit.created_on, app.id));
        Ok(apps)
    }

    fn find_active_app_by_name(&self, name: &str) -> StateResult<Option<App>> {
        Ok(self.apps_by_name(name)?.into_iter().find(|app| app.active))
    }

    fn cluster(&self, id: RowId) -> StateResult<Option<Cluster>> {
        self.row(CLUSTERS, id)
    }

    fn list_clusters(&self) -> StateResult<Vec<Cluster>> {
        self.rows(CLUSTERS)
    }

    fn environment(&self, id: RowId) -> StateResult<Option<Environment>> {
        self.row(ENVIRONMENTS, id)
    }

    /// The active environment for (`cluster_id`, `namespace`).
    fn find_environment(
        &self,
        cluster_id: RowId,
        namespace: &str,
    ) -> StateResult<Option<Environment>> {
        let environments: Vec<Environment> = self.rows(ENVIRONMENTS)?;
        Ok(environments
            .into_iter()
            .find(|env| env.active && env.cluster_id == cluster_id && env.namespace == namespace))
    }

    fn list_environments(&self) -> StateResult<Vec<Environment>> {
        self.rows(ENVIRONMENTS)
    }

    fn installed_app(&self, id: RowId) -> StateResult<Option<InstalledApp>> {
        self.row(INSTALLED_APPS, id)
    }

    fn active_installed_app(&self, id: RowId) -> StateResult<Option<InstalledApp>> {
        Ok(self.installed_app(id)?.filter(|installed| installed.active))
    }

    fn list_installed_apps(&self) -> StateResult<Vec<InstalledApp>> {
        self.rows(INSTALLED_APPS)
    }

    fn installed_app_version(&self, id: RowId) -> StateResult<Option<InstalledAppVersion>> {
        self.row(INSTALLED_APP_VERSIONS, id)
    }

    /// Every version row of an installed app, oldest first.
    fn installed_app_versions(
        &self,
        installed_app_id: RowId,
    ) -> StateResult<Vec<InstalledAppVersion>> {
        let mut versions: Vec<InstalledAppVersion> = self.rows(INSTALLED_APP_VERSIONS)?;
        versions.retain(|version| version.installed_app_id == installed_app_id);
        Ok(versions)
    }

    /// The most recent active version row of an installed app.
    fn active_installed_app_version(
        &self,
        installed_app_id: RowId,
    ) -> StateResult<Option<InstalledAppVersion>> {
        Ok(self
            .installed_app_versions(installed_app_id)?
            .into_iter()
            .rev()
            .find(|version| version.active))
    }

    fn cluster_installed_apps(&self, cluster_id: RowId) -> StateResult<Vec<ClusterInstalledApp>> {
        let mut joins: Vec<ClusterInstalledApp> = self.rows(CLUSTER_INSTALLED_APPS)?;
        joins.retain(|join| join.cluster_id == cluster_id);
        Ok(joins)
    }

    fn chart_version(&self, id: RowId) -> StateResult<Option<ChartVersion>> {
        self.row(CHART_VERSIONS, id)
    }

    fn chart_versions_for_chart(&self, chart_id: RowId) -> StateResult<Vec<ChartVersion>> {
        let mut versions: Vec<ChartVersion> = self.rows(CHART_VERSIONS)?;
        versions.retain(|version| version.chart_id == chart_id);
        Ok(versions)
    }

    fn chart_history_for_version(
        &self,
        installed_app_version_id: RowId,
    ) -> StateResult<Vec<ChartHistory>> {
        let mut history: Vec<ChartHistory> = self.rows(CHART_HISTORY)?;
        history.retain(|entry| entry.installed_app_version_id == installed_app_version_id);
        Ok(history)
    }

    fn release(&self, installed_app_id: RowId) -> StateResult<Option<Release>> {
        self.row(RELEASES, installed_app_id)
    }
}

/// A read-only view of committed state.
pub struct Snapshot {
    txn: ReadTransaction,
}

impl StateReader for Snapshot {
    fn row<T: DeserializeOwned>(&self, table: RowTable, id: RowId) -> StateResult<Option<T>> {
        let table = self.txn.open_table(table).map_err(map_err!(Table))?;
        read_row(&table, id)
    }

    fn rows<T: DeserializeOwned>(&self, table: RowTable) -> StateResult<Vec<T>> {
        let table = self.txn.open_table(table).map_err(map_err!(Table))?;
        read_rows(&table)
    }
}

// ── Writes ─────────────────────────────────────────────────────────

/// A transactional scope: every write made through it commits or rolls back together.
///
/// Dropping a unit of work without calling [`UnitOfWork::commit`] rolls it back,
/// so `?` on any step leaves committed state untouched.
pub struct UnitOfWork {
    txn: Option<WriteTransaction>,
}

impl UnitOfWork {
    fn txn(&self) -> StateResult<&WriteTransaction> {
        self.txn
            .as_ref()
            .ok_or_else(|| StateError::Transaction("unit of work already completed".to_string()))
    }

    /// Allocate the next id for `table`.
    pub fn next_id(&mut self, table: RowTable) -> StateResult<RowId> {
        let txn = self.txn()?;
        let mut sequences = txn.open_table(SEQUENCES).map_err(map_err!(Table))?;
        let current = sequences
            .get(table.name())
            .map_err(map_err!(Read))?
            .map(|guard| guard.value())
            .unwrap_or(0);
        let next = current + 1;
        sequences
            .insert(table.name(), next)
            .map_err(map_err!(Write))?;
        Ok(next)
    }

    fn put_row<T: Serialize>(&mut self, table: RowTable, id: RowId, row: &T) -> StateResult<()> {
        let value = encode(row)?;
        let txn = self.txn()?;
        let mut table = txn.open_table(table).map_err(map_err!(Table))?;
        table
            .insert(id, value.as_slice())
            .map_err(map_err!(Write))?;
        Ok(())
    }

    /// Overwrite an existing row; fails with `NotFound` if `id` was never inserted.
    fn replace_row<T: Serialize>(
        &mut self,
        table: RowTable,
        id: RowId,
        row: &T,
    ) -> StateResult<()> {
        let exists = {
            let txn = self.txn()?;
            let handle = txn.open_table(table).map_err(map_err!(Table))?;
            handle.get(id).map_err(map_err!(Read))?.is_some()
        };
        if !exists {
            return Err(StateError::NotFound {
                table: table.name().to_string(),
                id,
            });
        }
        self.put_row(table, id, row)
    }

    pub fn insert_app(&mut self, mut app: App) -> StateResult<App> {
        app.id = self.next_id(APPS)?;
        self.put_row(APPS, app.id, &app)?;
        debug!(app_id = app.id, name = %app.name, "app inserted");
        Ok(app)
    }

    pub fn update_app(&mut self, app: &App) -> StateResult<()> {
        self.replace_row(APPS, app.id, app)
    }

    pub fn insert_cluster(&mut self, mut cluster: Cluster) -> StateResult<Cluster> {
        cluster.id = self.next_id(CLUSTERS)?;
        self.put_row(CLUSTERS, cluster.id, &cluster)?;
        Ok(cluster)
    }

    pub fn insert_environment(&mut self, mut environment: Environment) -> StateResult<Environment> {
        environment.id = self.next_id(ENVIRONMENTS)?;
        self.put_row(ENVIRONMENTS, environment.id, &environment)?;
        debug!(environment_id = environment.id, name = %environment.name, "environment inserted");
        Ok(environment)
    }

    pub fn insert_installed_app(
        &mut self,
        mut installed: InstalledApp,
    ) -> StateResult<InstalledApp> {
        installed.id = self.next_id(INSTALLED_APPS)?;
        self.put_row(INSTALLED_APPS, installed.id, &installed)?;
        debug!(
            installed_app_id = installed.id,
            app_id = installed.app_id,
            "installed app inserted"
        );
        Ok(installed)
    }

    pub fn update_installed_app(&mut self, installed: &InstalledApp) -> StateResult<()> {
        self.replace_row(INSTALLED_APPS, installed.id, installed)
    }

    pub fn insert_installed_app_version(
        &mut self,
        mut version: InstalledAppVersion,
    ) -> StateResult<InstalledAppVersion> {
        version.id = self.next_id(INSTALLED_APP_VERSIONS)?;
        self.put_row(INSTALLED_APP_VERSIONS, version.id, &version)?;
        Ok(version)
    }

    pub fn update_installed_app_version(
        &mut self,
        version: &InstalledAppVersion,
    ) -> StateResult<()> {
        self.replace_row(INSTALLED_APP_VERSIONS, version.id, version)
    }

    pub fn insert_cluster_installed_app(
        &mut self,
        mut join: ClusterInstalledApp,
    ) -> StateResult<ClusterInstalledApp> {
        join.id = self.next_id(CLUSTER_INSTALLED_APPS)?;
        self.put_row(CLUSTER_INSTALLED_APPS, join.id, &join)?;
        Ok(join)
    }

    pub fn insert_chart_version(&mut self, mut version: ChartVersion) -> StateResult<ChartVersion> {
        version.id = self.next_id(CHART_VERSIONS)?;
        self.put_row(CHART_VERSIONS, version.id, &version)?;
        Ok(version)
    }

    pub fn insert_chart_history(&mut self, mut entry: ChartHistory) -> StateResult<ChartHistory> {
        entry.id = self.next_id(CHART_HISTORY)?;
        self.put_row(CHART_HISTORY, entry.id, &entry)?;
        Ok(entry)
    }

    /// Insert or replace the release for `release.installed_app_id`.
    pub fn put_release(&mut self, release: &Release) -> StateResult<()> {
        self.put_row(RELEASES, release.installed_app_id, release)
    }

    /// Remove the release of an installed app. Returns true if it existed.
    pub fn remove_release(&mut self, installed_app_id: RowId) -> StateResult<bool> {
        let txn = self.txn()?;
        let mut table = txn.open_table(RELEASES).map_err(map_err!(Table))?;
        let existed = table
            .remove(installed_app_id)
            .map_err(map_err!(Write))?
            .is_some();
        Ok(existed)
    }

    /// Commit every write made through this unit of work.
    pub fn commit(mut self) -> StateResult<()> {
        let txn = self
            .txn
            .take()
            .ok_or_else(|| StateError::Transaction("unit of work already completed".to_string()))?;
        txn.commit().map_err(map_err!(Commit))?;
        debug!("unit of work committed");
        Ok(())
    }

    /// Discard every write made through this unit of work.
    pub fn rollback(mut self) -> StateResult<()> {
        if let Some(txn) = self.txn.take() {
            txn.abort().map_err(map_err!(Transaction))?;
            debug!("unit of work rolled back");
        }
        Ok(())
    }
}

impl StateReader for UnitOfWork {
    fn row<T: DeserializeOwned>(&self, table: RowTable, id: RowId) -> StateResult<Option<T>> {
        let txn = self.txn()?;
        let table = txn.open_table(table).map_err(map_err!(Table))?;
        read_row(&table, id)
    }

    fn rows<T: DeserializeOwned>(&self, table: RowTable) -> StateResult<Vec<T>> {
        let txn = self.txn()?;
        let table = txn.open_table(table).map_err(map_err!(Table))?;
        read_rows(&table)
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        // No-op after commit or explicit rollback.
        if let Some(txn) = self.txn.take() {
            match txn.abort() {
                Ok(()) => debug!("uncommitted unit of work rolled back"),
                Err(e) => warn!(error = %e, "failed to roll back unit of work"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app(name: &str) -> App {
        App {
            id: 0,
            name: name.to_string(),
            team_id: 1,
            active: true,
            offering_mode: OperatingMode::Full,
            audit: AuditLog::new(7),
        }
    }

    fn test_environment(cluster_id: RowId, namespace: &str) -> Environment {
        Environment {
            id: 0,
            cluster_id,
            namespace: namespace.to_string(),
            name: format!("c{cluster_id}__{namespace}"),
            is_default: false,
            active: true,
            audit: AuditLog::new(7),
        }
    }

    // ── App rows ───────────────────────────────────────────────────

    #[test]
    fn app_insert_assigns_increasing_ids() {
        let store = StateStore::open_in_memory().unwrap();
        let mut uow = store.begin().unwrap();
        let first = uow.insert_app(test_app("a")).unwrap();
        let second = uow.insert_app(test_app("b")).unwrap();
        uow.commit().unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.app(2).unwrap(), Some(second));
    }

    #[test]
    fn find_active_app_skips_deactivated_rows() {
        let store = StateStore::open_in_memory().unwrap();
        let mut uow = store.begin().unwrap();
        let mut old = uow.insert_app(test_app("demo")).unwrap();
        old.active = false;
        uow.update_app(&old).unwrap();
        let current = uow.insert_app(test_app("demo")).unwrap();

        assert_eq!(uow.find_active_app_by_name("demo").unwrap(), Some(current));
        assert_eq!(uow.apps_by_name("demo").unwrap().len(), 2);
        assert!(uow.find_active_app_by_name("other").unwrap().is_none());
    }

    #[test]
    fn update_of_missing_row_is_not_found() {
        let store = StateStore::open_in_memory().unwrap();
        let mut uow = store.begin().unwrap();
        let mut ghost = test_app("ghost");
        ghost.id = 42;

        let err = uow.update_app(&ghost).unwrap_err();
        assert!(err.is_not_found());
    }

    // ── Transactions ───────────────────────────────────────────────

    #[test]
    fn dropped_unit_of_work_rolls_back() {
        let store = StateStore::open_in_memory().unwrap();
        {
            let mut uow = store.begin().unwrap();
            uow.insert_app(test_app("temp")).unwrap();
        }

        let snapshot = store.snapshot().unwrap();
        assert!(snapshot.find_active_app_by_name("temp").unwrap().is_none());
    }

    #[test]
    fn explicit_rollback_discards_writes_and_ids() {
        let store = StateStore::open_in_memory().unwrap();
        let mut uow = store.begin().unwrap();
        uow.insert_app(test_app("temp")).unwrap();
        uow.rollback().unwrap();

        let mut uow = store.begin().unwrap();
        let app = uow.insert_app(test_app("kept")).unwrap();
        uow.commit().unwrap();
        assert_eq!(app.id, 1);
    }

    #[test]
    fn unit_of_work_reads_its_own_writes() {
        let store = StateStore::open_in_memory().unwrap();
        let mut uow = store.begin().unwrap();
        let env = uow.insert_environment(test_environment(3, "ns1")).unwrap();

        assert_eq!(uow.find_environment(3, "ns1").unwrap(), Some(env));
        // Not visible to readers until commit.
        assert!(store.snapshot().unwrap().find_environment(3, "ns1").unwrap().is_none());
        uow.commit().unwrap();
        assert!(store.snapshot().unwrap().find_environment(3, "ns1").unwrap().is_some());
    }

    // ── Installed apps ─────────────────────────────────────────────

    #[test]
    fn installed_app_versions_are_scoped_and_ordered() {
        let store = StateStore::open_in_memory().unwrap();
        let mut uow = store.begin().unwrap();
        for (installed_app_id, values) in [(1, "a: 1"), (2, "b: 1"), (1, "a: 2")] {
            uow.insert_installed_app_version(InstalledAppVersion {
                id: 0,
                installed_app_id,
                chart_version_id: 5,
                values_yaml: values.to_string(),
                reference_value_id: None,
                reference_value_kind: None,
                active: true,
                audit: AuditLog::new(7),
            })
            .unwrap();
        }
        uow.commit().unwrap();

        let snapshot = store.snapshot().unwrap();
        let versions = snapshot.installed_app_versions(1).unwrap();
        assert_eq!(versions.len(), 2);
        let latest = snapshot.active_installed_app_version(1).unwrap().unwrap();
        assert_eq!(latest.values_yaml, "a: 2");
    }

    #[test]
    fn active_installed_app_filters_soft_deleted() {
        let store = StateStore::open_in_memory().unwrap();
        let mut uow = store.begin().unwrap();
        let mut installed = uow
            .insert_installed_app(InstalledApp {
                id: 0,
                app_id: 1,
                environment_id: 1,
                status: DeploymentStatus::Init,
                active: true,
                audit: AuditLog::new(7),
            })
            .unwrap();
        installed.active = false;
        uow.update_installed_app(&installed).unwrap();
        uow.commit().unwrap();

        let snapshot = store.snapshot().unwrap();
        assert!(snapshot.active_installed_app(installed.id).unwrap().is_none());
        assert!(snapshot.installed_app(installed.id).unwrap().is_some());
    }

    // ── Registry seeding ───────────────────────────────────────────

    #[test]
    fn registry_seeding() {
        let store = StateStore::open_in_memory().unwrap();
        let cluster = store.register_cluster("clusterA", "https://a.example").unwrap();
        let version = store
            .register_chart_version(9, "nginx", "1.2.0", "bitnami", false)
            .unwrap();

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.cluster(cluster.id).unwrap().unwrap().name, "clusterA");
        assert_eq!(snapshot.chart_versions_for_chart(9).unwrap(), vec![version]);
    }

    #[test]
    fn release_put_and_remove() {
        let store = StateStore::open_in_memory().unwrap();
        let release = Release {
            installed_app_id: 4,
            release_name: "demo".to_string(),
            cluster_id: 1,
            namespace: "ns1".to_string(),
            chart_version_id: 2,
            values_yaml: String::new(),
            revision: 1,
            status: ReleaseStatus::Deployed,
            updated_on: 1000,
        };
        let mut uow = store.begin().unwrap();
        uow.put_release(&release).unwrap();
        uow.commit().unwrap();
        assert_eq!(store.snapshot().unwrap().release(4).unwrap(), Some(release));

        let mut uow = store.begin().unwrap();
        assert!(uow.remove_release(4).unwrap());
        assert!(!uow.remove_release(4).unwrap());
        uow.commit().unwrap();
        assert!(store.snapshot().unwrap().release(4).unwrap().is_none());
    }

    // ── Persistence (on-disk) ──────────────────────────────────────

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        {
            let store = StateStore::open(&db_path).unwrap();
            let mut uow = store.begin().unwrap();
            uow.insert_app(test_app("api")).unwrap();
            uow.commit().unwrap();
        }

        // Reopen the same database file.
        let store = StateStore::open(&db_path).unwrap();
        let app = store.snapshot().unwrap().find_active_app_by_name("api").unwrap();
        assert_eq!(app.map(|a| a.id), Some(1));
    }

    #[test]
    fn empty_store_operations() {
        let store = StateStore::open_in_memory().unwrap();
        let snapshot = store.snapshot().unwrap();

        assert!(snapshot.list_clusters().unwrap().is_empty());
        assert!(snapshot.list_environments().unwrap().is_empty());
        assert!(snapshot.list_installed_apps().unwrap().is_empty());
        assert!(snapshot.installed_app_versions(1).unwrap().is_empty());
        assert!(snapshot.app(1).unwrap().is_none());
        assert!(snapshot.release(1).unwrap().is_none());
    }
}
