use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::forms::clients::{AddClientForm, CommissionForm, DeleteClientForm, FieldChangeForm};
use crate::models::config::ServerConfig;
use crate::repository::HttpRepository;
use crate::routes::{base_context, flash_service_error, redirect, render_template};
use crate::services::clients as clients_service;
use crate::services::clients::SaveOutcome;
use crate::state::SharedDashboard;

#[get("/")]
pub async fn show_index(
    repo: web::Data<HttpRepository>,
    dashboard: web::Data<SharedDashboard>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let operator = &server_config.operator_username;

    let data =
        match clients_service::load_dashboard(repo.get_ref(), dashboard.get_ref(), operator).await {
            Ok(data) => data,
            Err(err) => {
                log::error!("Failed to load dashboard: {err}");
                return HttpResponse::InternalServerError().finish();
            }
        };

    let mut context = base_context(&flash_messages, "index", operator);
    context.insert("clients", &data.clients);
    context.insert("has_pending_changes", &data.has_pending_changes);
    context.insert("can_toggle_active", &data.can_toggle_active);
    context.insert("synced_at", &data.synced_at);
    context.insert("in_flight", &data.in_flight);
    context.insert("load_error", &data.load_error);
    context.insert("feature_keys", &data.feature_keys);
    context.insert("command_keys", &data.command_keys);
    context.insert("languages", &data.languages);

    render_template(&tera, "clients/index.html", &context)
}

#[post("/clients/reload")]
pub async fn reload_clients(
    repo: web::Data<HttpRepository>,
    dashboard: web::Data<SharedDashboard>,
) -> impl Responder {
    match clients_service::reload_clients(repo.get_ref(), dashboard.get_ref()).await {
        Ok(count) => FlashMessage::success(format!("Loaded {count} clients.")).send(),
        Err(err) => flash_service_error(&err),
    }
    redirect("/")
}

#[post("/clients/save")]
pub async fn save_clients(
    repo: web::Data<HttpRepository>,
    dashboard: web::Data<SharedDashboard>,
) -> impl Responder {
    match clients_service::save_clients(repo.get_ref(), dashboard.get_ref()).await {
        Ok(SaveOutcome::Saved(count)) => {
            FlashMessage::success(format!("Saved {count} clients.")).send()
        }
        Ok(SaveOutcome::NothingToSave) => FlashMessage::info("No changes to save.").send(),
        Err(err) => flash_service_error(&err),
    }
    redirect("/")
}

#[post("/clients/discard")]
pub async fn discard_changes(dashboard: web::Data<SharedDashboard>) -> impl Responder {
    match clients_service::discard_changes(dashboard.get_ref()) {
        Ok(()) => FlashMessage::info("Local changes discarded.").send(),
        Err(err) => flash_service_error(&err),
    }
    redirect("/")
}

#[post("/clients/add")]
pub async fn add_client(
    dashboard: web::Data<SharedDashboard>,
    web::Form(form): web::Form<AddClientForm>,
) -> impl Responder {
    match clients_service::add_client(dashboard.get_ref(), form) {
        Ok(username) => FlashMessage::success(format!(
            "Client \"{username}\" added. Save to send it to the backend."
        ))
        .send(),
        Err(err) => flash_service_error(&err),
    }
    redirect("/")
}

#[post("/clients/delete")]
pub async fn delete_client(
    dashboard: web::Data<SharedDashboard>,
    web::Form(form): web::Form<DeleteClientForm>,
) -> impl Responder {
    let username = form.username.clone();
    match clients_service::delete_client(dashboard.get_ref(), form) {
        Ok(()) => FlashMessage::success(format!("Client \"{username}\" removed.")).send(),
        Err(err) => flash_service_error(&err),
    }
    redirect("/")
}

#[post("/clients/toggle")]
pub async fn change_field(
    dashboard: web::Data<SharedDashboard>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<FieldChangeForm>,
) -> impl Responder {
    if let Err(err) = clients_service::change_field(
        dashboard.get_ref(),
        &server_config.operator_username,
        form,
    ) {
        flash_service_error(&err);
    }
    redirect("/")
}

#[post("/clients/commission")]
pub async fn update_commission(
    dashboard: web::Data<SharedDashboard>,
    web::Form(form): web::Form<CommissionForm>,
) -> impl Responder {
    if let Err(err) = clients_service::update_commission(dashboard.get_ref(), form) {
        flash_service_error(&err);
    }
    redirect("/")
}
