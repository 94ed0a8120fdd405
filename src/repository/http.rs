use std::time::Duration;

use reqwest::{Client, Response};

use crate::{
    domain::client::ClientRecord,
    repository::{
        ClientReader, ClientWriter,
        errors::{RepositoryError, RepositoryResult},
    },
};

const CLIENTS_PATH: &str = "/api/v1/clients";

/// Backend client collection reached over HTTP with a bearer token.
#[derive(Clone)]
pub struct HttpRepository {
    client: Client,
    clients_url: String,
    token: String,
}

impl HttpRepository {
    pub fn new(
        api_url: &str,
        token: impl Into<String>,
        timeout: Duration,
    ) -> RepositoryResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            clients_url: format!("{}{CLIENTS_PATH}", api_url.trim_end_matches('/')),
            token: token.into(),
        })
    }

    pub fn clients_url(&self) -> &str {
        &self.clients_url
    }
}

async fn ensure_success(response: Response) -> RepositoryResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RepositoryError::from_status(status, &body))
}

impl ClientReader for HttpRepository {
    async fn list_clients(&self) -> RepositoryResult<Vec<ClientRecord>> {
        let response = self
            .client
            .get(&self.clients_url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let clients = response.json::<Vec<ClientRecord>>().await?;
        log::debug!("Fetched {} clients from {}", clients.len(), self.clients_url);
        Ok(clients)
    }
}

impl ClientWriter for HttpRepository {
    async fn replace_clients(&self, clients: &[ClientRecord]) -> RepositoryResult<()> {
        let response = self
            .client
            .put(&self.clients_url)
            .bearer_auth(&self.token)
            .json(clients)
            .send()
            .await?;
        ensure_success(response).await?;
        log::debug!("Replaced {} clients at {}", clients.len(), self.clients_url);
        Ok(())
    }
}
