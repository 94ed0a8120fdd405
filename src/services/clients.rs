use crate::domain::client::{ClientRecord, NewClientRecord};
use crate::domain::field::{FieldPath, TopLevelField};
use crate::dto::clients::DashboardPageData;
use crate::forms::clients::{
    AddClientForm, ChangeTarget, CommissionForm, DeleteClientForm, FieldChangeForm,
};
use crate::repository::{ClientReader, ClientWriter};
use crate::services::{InFlight, ServiceError, ServiceResult, lock};
use crate::state::SharedDashboard;
use crate::store::SyncOperation;

/// Result of a save request.
#[derive(Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The live list already matched the baseline; nothing was sent.
    NothingToSave,
    /// The whole collection was written to the backend.
    Saved(usize),
}

/// Builds the dashboard, fetching clients on the first visit.
///
/// A failed first fetch is reported on the page instead of failing the request.
pub async fn load_dashboard<R>(
    repo: &R,
    state: &SharedDashboard,
    actor: &str,
) -> ServiceResult<DashboardPageData>
where
    R: ClientReader + ?Sized,
{
    let needs_load = {
        let dashboard = lock(state)?;
        !dashboard.store.is_synced() && dashboard.store.in_flight().is_none()
    };

    let load_error = if needs_load {
        match reload_clients(repo, state).await {
            Ok(_) => None,
            Err(ServiceError::Fetch(_)) => Some("Failed to load clients from the backend.".into()),
            Err(err) => return Err(err),
        }
    } else {
        None
    };

    let dashboard = lock(state)?;
    Ok(DashboardPageData::new(&dashboard.store, actor, load_error))
}

/// Replaces local state with the backend collection. Local edits are lost.
pub async fn reload_clients<R>(repo: &R, state: &SharedDashboard) -> ServiceResult<usize>
where
    R: ClientReader + ?Sized,
{
    let in_flight = InFlight::begin(state, SyncOperation::Load)?;

    match repo.list_clients().await {
        Ok(records) => {
            let count = records.len();
            lock(state)?.store.finish_load(records);
            in_flight.disarm();
            log::info!("Loaded {count} clients");
            Ok(count)
        }
        Err(err) => {
            log::error!("Failed to fetch clients: {err}");
            Err(ServiceError::Fetch(err.to_string()))
        }
    }
}

/// Pushes the live list to the backend when it differs from the baseline.
///
/// Edits made while the request is in flight stay pending.
pub async fn save_clients<R>(repo: &R, state: &SharedDashboard) -> ServiceResult<SaveOutcome>
where
    R: ClientWriter + ?Sized,
{
    if !lock(state)?.store.has_pending_changes() {
        return Ok(SaveOutcome::NothingToSave);
    }
    let in_flight = InFlight::begin(state, SyncOperation::Save)?;
    let snapshot = lock(state)?.store.clients().clone();

    match repo.replace_clients(snapshot.as_slice()).await {
        Ok(()) => {
            let count = snapshot.len();
            lock(state)?.store.finish_save(snapshot);
            in_flight.disarm();
            log::info!("Saved {count} clients");
            Ok(SaveOutcome::Saved(count))
        }
        Err(err) => {
            log::error!("Failed to update clients: {err}");
            Err(ServiceError::UpdateFailed(err.to_string()))
        }
    }
}

/// Applies a single-field change posted from the dashboard.
pub fn change_field(state: &SharedDashboard, actor: &str, form: FieldChangeForm) -> ServiceResult<()> {
    let target = form.target().map_err(|err| {
        log::error!("Invalid field change for {}: {err}", form.username);
        ServiceError::from(err)
    })?;

    let mut dashboard = lock(state)?;
    match target {
        ChangeTarget::Active(value) => dashboard.store.set_active(&form.username, actor, value)?,
        ChangeTarget::Field(path, value) => {
            dashboard.store.apply_field_change(&form.username, path, value)?
        }
    }
    Ok(())
}

/// Sets a partner's commission.
pub fn update_commission(state: &SharedDashboard, form: CommissionForm) -> ServiceResult<()> {
    let value = form.value()?;
    lock(state)?.store.apply_field_change(
        &form.username,
        FieldPath::TopLevel(TopLevelField::Commission),
        value,
    )?;
    Ok(())
}

/// Validates the create form and appends the new client locally.
pub fn add_client(state: &SharedDashboard, form: AddClientForm) -> ServiceResult<String> {
    let new = NewClientRecord::try_from(form).map_err(|err| {
        log::error!("Failed to validate form: {err}");
        ServiceError::from(err)
    })?;
    let record = ClientRecord::from(new);
    let username = record.username.clone();

    lock(state)?.store.add_record(record)?;
    Ok(username)
}

/// Removes a client locally once the deletion is confirmed.
pub fn delete_client(state: &SharedDashboard, form: DeleteClientForm) -> ServiceResult<()> {
    let username = form.confirmed_username()?;
    lock(state)?.store.remove_record(username);
    Ok(())
}

/// Drops every local edit since the last sync.
pub fn discard_changes(state: &SharedDashboard) -> ServiceResult<()> {
    lock(state)?.store.discard_changes();
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use actix_web::rt::time::timeout;

    use super::*;
    use crate::domain::permissions::{FeatureKey, SUPER_ADMIN_USERNAME};
    use crate::services::test_support::{FakeBackend, record};
    use crate::state::Dashboard;
    use crate::store::ClientStore;

    fn state_with(records: Vec<ClientRecord>) -> SharedDashboard {
        Mutex::new(Dashboard::new(ClientStore::with_records(records)))
    }

    fn add_form(username: &str, client_id: &str) -> AddClientForm {
        AddClientForm {
            username: username.into(),
            password: "pw".into(),
            client_id: client_id.into(),
            contact_name: String::new(),
            contact_email: String::new(),
            defaultlanguage: None,
            partner: None,
            commission: None,
        }
    }

    fn toggle(username: &str, field: &str, value: &str) -> FieldChangeForm {
        FieldChangeForm {
            username: username.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    #[actix_web::test]
    async fn first_visit_loads_from_backend() {
        let repo = FakeBackend::with_clients(vec![record("x", "X")]);
        let state = SharedDashboard::default();

        let page = load_dashboard(&repo, &state, "operator").await.unwrap();
        assert_eq!(page.clients.len(), 1);
        assert!(page.load_error.is_none());

        load_dashboard(&repo, &state, "operator").await.unwrap();
        assert_eq!(repo.fetches.get(), 1);
    }

    #[actix_web::test]
    async fn failed_first_load_is_reported_on_page() {
        let repo = FakeBackend::default();
        repo.fail.set(true);
        let state = SharedDashboard::default();

        let page = load_dashboard(&repo, &state, "operator").await.unwrap();

        assert!(page.load_error.is_some());
        assert!(page.clients.is_empty());
        assert_eq!(state.lock().unwrap().store.in_flight(), None);
    }

    #[actix_web::test]
    async fn failed_reload_keeps_prior_state() {
        let repo = FakeBackend::default();
        repo.fail.set(true);
        let state = state_with(vec![record("a", "A")]);

        let result = reload_clients(&repo, &state).await;

        assert!(matches!(result, Err(ServiceError::Fetch(_))));
        assert!(state.lock().unwrap().store.get("a").is_some());
    }

    #[actix_web::test]
    async fn save_without_changes_skips_backend() {
        let repo = FakeBackend::default();
        let state = SharedDashboard::default();
        repo.clients.borrow_mut().push(record("x", "X"));
        reload_clients(&repo, &state).await.unwrap();

        let outcome = save_clients(&repo, &state).await.unwrap();

        assert_eq!(outcome, SaveOutcome::NothingToSave);
        assert!(repo.puts.borrow().is_empty());
    }

    #[actix_web::test]
    async fn add_then_save_writes_everything() {
        let repo = FakeBackend::default();
        let state = state_with(vec![record("a", "A")]);

        add_client(&state, add_form("b", "b1")).unwrap();
        let outcome = save_clients(&repo, &state).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Saved(2));
        let puts = repo.puts.borrow();
        assert_eq!(puts[0][1].client_id, "B1");
        assert!(!state.lock().unwrap().store.has_pending_changes());
    }

    #[actix_web::test]
    async fn failed_save_keeps_local_edits() {
        let repo = FakeBackend::default();
        repo.fail.set(true);
        let state = state_with(vec![record("a", "A")]);
        change_field(&state, "operator", toggle("a", "features.rentals", "true")).unwrap();

        let result = save_clients(&repo, &state).await;

        assert!(matches!(result, Err(ServiceError::UpdateFailed(_))));
        let dashboard = state.lock().unwrap();
        assert!(dashboard.store.has_pending_changes());
        assert_eq!(dashboard.store.in_flight(), None);
    }

    #[actix_web::test]
    async fn save_while_loading_is_rejected() {
        let repo = FakeBackend::default();
        let state = state_with(vec![record("a", "A")]);
        change_field(&state, "operator", toggle("a", "commands.lock", "true")).unwrap();
        state.lock().unwrap().store.begin(SyncOperation::Load).unwrap();

        let result = save_clients(&repo, &state).await;

        assert!(matches!(
            result,
            Err(ServiceError::OperationInProgress(SyncOperation::Load))
        ));
        assert!(repo.puts.borrow().is_empty());
    }

    #[actix_web::test]
    async fn dropped_save_releases_the_store() {
        let stalled = FakeBackend::default();
        stalled.stall.set(true);
        let state = state_with(vec![record("a", "A")]);
        change_field(&state, "operator", toggle("a", "features.rentals", "true")).unwrap();

        let dropped = timeout(Duration::from_millis(20), save_clients(&stalled, &state)).await;
        assert!(dropped.is_err());
        assert_eq!(state.lock().unwrap().store.in_flight(), None);

        let repo = FakeBackend::default();
        let outcome = save_clients(&repo, &state).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Saved(1));
    }

    #[actix_web::test]
    async fn dropped_reload_releases_the_store() {
        let stalled = FakeBackend::default();
        stalled.stall.set(true);
        let state = state_with(vec![record("a", "A")]);

        let dropped = timeout(Duration::from_millis(20), reload_clients(&stalled, &state)).await;
        assert!(dropped.is_err());
        assert_eq!(state.lock().unwrap().store.in_flight(), None);
        assert!(state.lock().unwrap().store.get("a").is_some());
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let state = state_with(vec![record("a", "X1")]);

        let result = add_client(&state, add_form("a", "x2"));

        assert!(matches!(result, Err(ServiceError::DuplicateUsername(_))));
        assert_eq!(state.lock().unwrap().store.clients().len(), 1);
    }

    #[test]
    fn active_toggle_is_gated() {
        let state = state_with(vec![record("a", "A")]);

        let refused = change_field(&state, "operator", toggle("a", "active", "true"));
        assert!(matches!(refused, Err(ServiceError::NotPermitted(_))));

        change_field(&state, SUPER_ADMIN_USERNAME, toggle("a", "active", "true")).unwrap();
        assert!(state.lock().unwrap().store.get("a").unwrap().is_active());
    }

    #[test]
    fn field_toggle_and_discard() {
        let state = state_with(vec![record("a", "A")]);

        change_field(&state, "operator", toggle("a", "features.reporting", "on")).unwrap();
        assert!(
            state.lock().unwrap().store.get("a").unwrap().features.get(FeatureKey::Reporting)
        );

        discard_changes(&state).unwrap();
        assert!(!state.lock().unwrap().store.has_pending_changes());
    }

    #[test]
    fn commission_requires_partner() {
        let mut partner = record("p", "P");
        partner.partner = true;
        let state = state_with(vec![record("a", "A"), partner]);

        let refused = update_commission(
            &state,
            CommissionForm {
                username: "a".into(),
                commission: "10".into(),
            },
        );
        assert!(matches!(refused, Err(ServiceError::TypeConstraint(_))));

        update_commission(
            &state,
            CommissionForm {
                username: "p".into(),
                commission: "12.5".into(),
            },
        )
        .unwrap();
        assert_eq!(state.lock().unwrap().store.get("p").unwrap().commission, 12.5);
    }

    #[test]
    fn delete_needs_confirmation() {
        let state = state_with(vec![record("a", "A")]);

        let refused = delete_client(
            &state,
            DeleteClientForm {
                username: "a".into(),
                confirm: None,
            },
        );
        assert!(matches!(refused, Err(ServiceError::Form(_))));

        delete_client(
            &state,
            DeleteClientForm {
                username: "a".into(),
                confirm: Some("on".into()),
            },
        )
        .unwrap();
        assert!(state.lock().unwrap().store.clients().is_empty());
    }
}
