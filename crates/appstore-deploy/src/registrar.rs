//! App registration with read-after-write duplicate reconciliation.
//!
//! App names are unique among active rows, but the store has no unique
//! constraint. After inserting, the registrar re-reads every active row with
//! the name and deactivates all but the earliest-created one.

use appstore_core::{OperatingMode, RowId, UserId};
use appstore_state::{App, AuditLog, StateReader, UnitOfWork};
use tracing::{debug, warn};

use crate::error::{DeployError, DeployResult};

/// Create the active app row for `name` inside the caller's unit of work.
///
/// Fails with [`DeployError::AppAlreadyExists`] when an active app already
/// uses the name, or when reconciliation finds that another row won.
pub fn ensure_app(
    uow: &mut UnitOfWork,
    name: &str,
    team_id: RowId,
    user_id: UserId,
    mode: OperatingMode,
) -> DeployResult<App> {
    if let Some(existing) = uow.find_active_app_by_name(name)? {
        debug!(app = %name, app_id = existing.id, "active app already registered");
        return Err(DeployError::AppAlreadyExists {
            name: name.to_string(),
        });
    }

    let app = uow.insert_app(App {
        id: 0,
        name: name.to_string(),
        team_id,
        active: true,
        offering_mode: mode,
        audit: AuditLog::new(user_id),
    })?;

    let keeper = reconcile_duplicates(uow, name, user_id)?;
    if keeper.id != app.id {
        return Err(DeployError::AppAlreadyExists {
            name: name.to_string(),
        });
    }
    Ok(app)
}

/// Deactivate every active row named `name` except the earliest-created.
/// Returns the row left active.
pub(crate) fn reconcile_duplicates(
    uow: &mut UnitOfWork,
    name: &str,
    user_id: UserId,
) -> DeployResult<App> {
    let mut active: Vec<App> = uow
        .apps_by_name(name)?
        .into_iter()
        .filter(|app| app.active)
        .collect();
    if active.is_empty() {
        return Err(DeployError::InvalidRequest(format!(
            "no active app named {name} to reconcile"
        )));
    }

    let keeper = active.remove(0);
    for mut duplicate in active {
        warn!(
            app = %name,
            keep = keeper.id,
            deactivate = duplicate.id,
            "deactivating duplicate app row"
        );
        duplicate.active = false;
        duplicate.audit.touch(user_id);
        uow.update_app(&duplicate)?;
    }
    Ok(keeper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use appstore_state::StateStore;

    fn raw_app(uow: &mut UnitOfWork, name: &str, active: bool) -> App {
        uow.insert_app(App {
            id: 0,
            name: name.to_string(),
            team_id: 1,
            active,
            offering_mode: OperatingMode::Full,
            audit: AuditLog::new(7),
        })
        .unwrap()
    }

    #[test]
    fn fresh_name_is_registered_with_mode() {
        let store = StateStore::open_in_memory().unwrap();
        let mut uow = store.begin().unwrap();
        let app = ensure_app(&mut uow, "demo", 1, 7, OperatingMode::Lightweight).unwrap();
        uow.commit().unwrap();

        assert!(app.active);
        assert_eq!(app.offering_mode, OperatingMode::Lightweight);
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.find_active_app_by_name("demo").unwrap(), Some(app));
    }

    #[test]
    fn existing_active_name_conflicts() {
        let store = StateStore::open_in_memory().unwrap();
        let mut uow = store.begin().unwrap();
        ensure_app(&mut uow, "demo", 1, 7, OperatingMode::Full).unwrap();

        let err = ensure_app(&mut uow, "demo", 1, 7, OperatingMode::Full).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(uow.apps_by_name("demo").unwrap().len(), 1);
    }

    #[test]
    fn deactivated_name_can_be_registered_again() {
        let store = StateStore::open_in_memory().unwrap();
        let mut uow = store.begin().unwrap();
        raw_app(&mut uow, "demo", false);

        let app = ensure_app(&mut uow, "demo", 1, 7, OperatingMode::Full).unwrap();
        assert_eq!(app.id, 2);
        assert_eq!(uow.find_active_app_by_name("demo").unwrap(), Some(app));
    }

    #[test]
    fn reconcile_keeps_earliest_active_row() {
        let store = StateStore::open_in_memory().unwrap();
        let mut uow = store.begin().unwrap();
        let first = raw_app(&mut uow, "demo", true);
        let second = raw_app(&mut uow, "demo", true);
        let third = raw_app(&mut uow, "demo", true);

        let keeper = reconcile_duplicates(&mut uow, "demo", 9).unwrap();
        assert_eq!(keeper.id, first.id);

        for id in [second.id, third.id] {
            let row = uow.app(id).unwrap().unwrap();
            assert!(!row.active);
            assert_eq!(row.audit.updated_by, 9);
        }
        assert!(uow.app(first.id).unwrap().unwrap().active);
    }

    #[test]
    fn reconcile_ignores_historical_inactive_rows() {
        let store = StateStore::open_in_memory().unwrap();
        let mut uow = store.begin().unwrap();
        raw_app(&mut uow, "demo", false);
        let current = raw_app(&mut uow, "demo", true);

        assert_eq!(reconcile_duplicates(&mut uow, "demo", 7).unwrap().id, current.id);
    }
}
