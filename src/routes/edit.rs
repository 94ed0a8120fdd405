use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::models::config::ServerConfig;
use crate::routes::{base_context, flash_service_error, redirect, render_template};
use crate::services::edit as edit_service;
use crate::state::SharedDashboard;

#[get("/clients/edit/{username}")]
pub async fn show_edit(
    username: web::Path<String>,
    dashboard: web::Data<SharedDashboard>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let operator = &server_config.operator_username;

    let data = match edit_service::open_edit(dashboard.get_ref(), operator, &username) {
        Ok(data) => data,
        Err(err) => {
            flash_service_error(&err);
            return redirect("/");
        }
    };

    let mut context = base_context(&flash_messages, "edit", operator);
    context.insert("original_username", &data.original_username);
    context.insert("client", &data.client);
    context.insert("can_toggle_active", &data.can_toggle_active);
    context.insert("languages", &data.languages);

    render_template(&tera, "clients/edit.html", &context)
}

#[post("/clients/edit")]
pub async fn save_edit(
    dashboard: web::Data<SharedDashboard>,
    server_config: web::Data<ServerConfig>,
    body: web::Bytes,
) -> impl Responder {
    let operator = &server_config.operator_username;
    match edit_service::commit_edit(dashboard.get_ref(), operator, body.as_ref()) {
        Ok(username) => {
            FlashMessage::success(format!(
                "Client \"{username}\" updated. Save to send it to the backend."
            ))
            .send();
            redirect("/")
        }
        Err(err) => {
            flash_service_error(&err);
            match edit_service::editing_username(dashboard.get_ref()) {
                Ok(Some(username)) => {
                    redirect(&format!("/clients/edit/{}", urlencoding::encode(&username)))
                }
                _ => redirect("/"),
            }
        }
    }
}

#[post("/clients/edit/cancel")]
pub async fn cancel_edit(dashboard: web::Data<SharedDashboard>) -> impl Responder {
    if let Err(err) = edit_service::cancel_edit(dashboard.get_ref()) {
        flash_service_error(&err);
    }
    redirect("/")
}
