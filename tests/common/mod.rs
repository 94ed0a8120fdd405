//! Fake kiosk backend for integration tests.
//!
//! Serves `GET`/`PUT /api/v1/clients` on an ephemeral port and keeps the
//! collection as raw JSON so tests can check that unknown members survive.
#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::dev::ServerHandle;
use actix_web::http::header;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use kiosk_admin::models::config::ServerConfig;
use serde_json::Value;

pub const TOKEN: &str = "test-token";

#[derive(Default)]
pub struct BackendState {
    pub clients: Mutex<Vec<Value>>,
    pub fail: AtomicBool,
    pub fetches: AtomicUsize,
    pub puts: AtomicUsize,
}

pub struct FakeBackend {
    pub url: String,
    pub state: Arc<BackendState>,
    handle: ServerHandle,
}

impl FakeBackend {
    pub async fn start(clients: Vec<Value>) -> Self {
        let state = Arc::new(BackendState {
            clients: Mutex::new(clients),
            ..BackendState::default()
        });
        let data = web::Data::from(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = HttpServer::new(move || {
            App::new().app_data(data.clone()).service(
                web::resource("/api/v1/clients")
                    .route(web::get().to(list_clients))
                    .route(web::put().to(replace_clients)),
            )
        })
        .workers(1)
        .listen(listener)
        .unwrap()
        .run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            url: format!("http://127.0.0.1:{port}"),
            state,
            handle,
        }
    }

    pub fn clients(&self) -> Vec<Value> {
        self.state.clients.lock().unwrap().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        self.state.fail.store(fail, Ordering::SeqCst);
    }

    pub fn puts(&self) -> usize {
        self.state.puts.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.state.fetches.load(Ordering::SeqCst)
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

fn authorized(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {TOKEN}"))
}

async fn list_clients(req: HttpRequest, state: web::Data<BackendState>) -> HttpResponse {
    if !authorized(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    state.fetches.fetch_add(1, Ordering::SeqCst);
    if state.fail.load(Ordering::SeqCst) {
        return HttpResponse::InternalServerError().body("backend exploded");
    }
    HttpResponse::Ok().json(&*state.clients.lock().unwrap())
}

async fn replace_clients(
    req: HttpRequest,
    state: web::Data<BackendState>,
    body: web::Json<Vec<Value>>,
) -> HttpResponse {
    if !authorized(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    if state.fail.load(Ordering::SeqCst) {
        return HttpResponse::BadGateway().body("write rejected");
    }
    state.puts.fetch_add(1, Ordering::SeqCst);
    *state.clients.lock().unwrap() = body.into_inner();
    HttpResponse::NoContent().finish()
}

pub fn server_config(api_url: &str, operator: &str) -> ServerConfig {
    ServerConfig {
        domain: "localhost".into(),
        address: "127.0.0.1".into(),
        port: 0,
        templates_dir: "templates/**/*".into(),
        secret: "x".repeat(64),
        api_url: api_url.into(),
        api_token: TOKEN.into(),
        operator_username: operator.into(),
        request_timeout_secs: 5,
    }
}
