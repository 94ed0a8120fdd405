use crate::domain::permissions::can_toggle_active;
use crate::dto::clients::EditPageData;
use crate::forms::edit::EditClientForm;
use crate::services::{ServiceError, ServiceResult, lock};
use crate::state::SharedDashboard;

/// Shows the edit form for `username`.
///
/// The session is reopened from the current record, except right after a
/// rejected commit for the same client, where the rejected draft is shown.
pub fn open_edit(state: &SharedDashboard, actor: &str, username: &str) -> ServiceResult<EditPageData> {
    let mut guard = lock(state)?;
    let dashboard = &mut *guard;

    if !dashboard.session.take_rejected(username) {
        dashboard.session.open(&dashboard.store, username)?;
    }

    let draft = dashboard.session.draft().ok_or(ServiceError::NoEditSession)?;
    Ok(EditPageData::new(username, draft, actor))
}

/// Applies the posted edit form to the open session and commits it.
///
/// Returns the username the client was saved under.
pub fn commit_edit(state: &SharedDashboard, actor: &str, body: &[u8]) -> ServiceResult<String> {
    let form = EditClientForm::from_bytes(body).map_err(|err| {
        log::error!("Failed to parse edit form: {err}");
        ServiceError::from(err)
    })?;
    let changes = form.field_changes()?;

    let mut guard = lock(state)?;
    let dashboard = &mut *guard;

    let committed = dashboard
        .session
        .edit_all(changes)
        .and_then(|()| {
            if can_toggle_active(actor) {
                dashboard.session.set_active(actor, form.active())?;
            }
            dashboard.session.commit(&mut dashboard.store)
        })
        .inspect_err(|_| dashboard.session.mark_rejected());

    Ok(committed?)
}

/// Closes the open session without touching the store.
pub fn cancel_edit(state: &SharedDashboard) -> ServiceResult<()> {
    lock(state)?.session.cancel()?;
    Ok(())
}

/// Username of the client currently being edited.
pub fn editing_username(state: &SharedDashboard) -> ServiceResult<Option<String>> {
    Ok(lock(state)?.session.original_username().map(str::to_string))
}
