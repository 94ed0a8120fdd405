//! Admin dashboard for the clients of a kiosk-rental backend.
//!
//! Clients are fetched into an in-memory store, edited locally and written
//! back to the backend as a whole collection on save.

pub mod domain;
pub mod store;

#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod models;
#[cfg(feature = "server")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;
#[cfg(feature = "server")]
pub mod state;

#[cfg(feature = "server")]
pub use server::{configure, run};

#[cfg(feature = "server")]
mod server {
    use std::sync::Mutex;

    use actix_cors::Cors;
    use actix_files::Files;
    use actix_web::cookie::Key;
    use actix_web::{App, HttpServer, middleware, web};
    use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
    use tera::Tera;

    use crate::models::config::ServerConfig;
    use crate::repository::HttpRepository;
    use crate::routes::clients::{
        add_client, change_field, delete_client, discard_changes, reload_clients, save_clients,
        show_index, update_commission,
    };
    use crate::routes::edit::{cancel_edit, save_edit, show_edit};
    use crate::state::Dashboard;

    /// Registers every dashboard route.
    pub fn configure(cfg: &mut web::ServiceConfig) {
        cfg.service(show_index)
            .service(reload_clients)
            .service(save_clients)
            .service(discard_changes)
            .service(add_client)
            .service(delete_client)
            .service(change_field)
            .service(update_commission)
            .service(cancel_edit)
            .service(save_edit)
            .service(show_edit);
    }

    /// Builds and runs the Actix-Web HTTP server using the provided configuration.
    pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
        let repo = HttpRepository::new(
            &server_config.api_url,
            server_config.api_token.clone(),
            server_config.request_timeout(),
        )
        .map_err(|e| std::io::Error::other(format!("Failed to build backend client: {e}")))?;

        let dashboard = web::Data::new(Mutex::new(Dashboard::default()));

        let secret_key = Key::try_from(server_config.secret.as_bytes())
            .map_err(|e| std::io::Error::other(format!("Invalid secret: {e}")))?;
        let message_store = CookieMessageStore::builder(secret_key).build();
        let message_framework = FlashMessagesFramework::builder(message_store).build();

        let tera = Tera::new(&server_config.templates_dir)
            .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

        let bind_address = (server_config.address.clone(), server_config.port);
        log::info!(
            "Serving {} on {}:{} against {}",
            server_config.domain,
            bind_address.0,
            bind_address.1,
            repo.clients_url()
        );

        HttpServer::new(move || {
            App::new()
                .wrap(Cors::permissive())
                .wrap(message_framework.clone())
                .wrap(middleware::Compress::default())
                .wrap(middleware::Logger::default())
                .service(Files::new("/assets", "./assets"))
                .configure(configure)
                .app_data(web::Data::new(tera.clone()))
                .app_data(web::Data::new(repo.clone()))
                .app_data(dashboard.clone())
                .app_data(web::Data::new(server_config.clone()))
        })
        .bind(bind_address)?
        .run()
        .await
    }
}
