//! HTTP handlers of the dashboard and their shared helpers.

use actix_web::HttpResponse;
use actix_web::http::header;
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};
use tera::{Context, Tera};

use crate::services::ServiceError;

pub mod clients;
pub mod edit;

/// Maps a flash message level to the Bootstrap alert class.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Context every page template expects.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    current_page: &str,
    operator: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_page", current_page);
    context.insert("operator", operator);
    context
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Queues the operator-facing message for a failed workflow.
pub fn flash_service_error(err: &ServiceError) {
    match err {
        ServiceError::Fetch(_) => {
            FlashMessage::error("Failed to load clients from the backend.").send()
        }
        ServiceError::UpdateFailed(_) => {
            FlashMessage::error("Failed to save clients. Your changes are kept locally.").send()
        }
        ServiceError::DuplicateUsername(username) => {
            FlashMessage::error(format!("Username \"{username}\" is already taken.")).send()
        }
        ServiceError::NotFound(username) => {
            FlashMessage::error(format!("Client \"{username}\" not found.")).send()
        }
        ServiceError::NotPermitted(_) => {
            FlashMessage::error("You are not allowed to change the active flag.").send()
        }
        ServiceError::OperationInProgress(operation) => {
            FlashMessage::warning(format!("A {operation} is already in progress.")).send()
        }
        ServiceError::NoEditSession => FlashMessage::warning("No client is being edited.").send(),
        ServiceError::Form(message) => {
            FlashMessage::error(format!("Invalid form: {message}")).send()
        }
        ServiceError::TypeConstraint(err) => {
            FlashMessage::error(format!("Invalid value: {err}")).send()
        }
        ServiceError::Internal => FlashMessage::error("Internal error.").send(),
    }
}
