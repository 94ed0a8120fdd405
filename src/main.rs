use std::path::Path;

use dotenvy::dotenv;
use kiosk_admin::models::config::ServerConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());

    let server_config = match ServerConfig::load(Path::new("config"), &app_env) {
        Ok(config) => config,
        Err(err) => {
            log::error!("Failed to load configuration for `{app_env}`: {err}");
            std::process::exit(1);
        }
    };

    kiosk_admin::run(server_config).await
}
