use crate::{domain::client::ClientRecord, repository::errors::RepositoryResult};

pub mod errors;
pub mod http;

pub use http::HttpRepository;

/// Read access to the backend client collection.
#[allow(async_fn_in_trait)]
pub trait ClientReader {
    async fn list_clients(&self) -> RepositoryResult<Vec<ClientRecord>>;
}

/// Write access to the backend client collection.
#[allow(async_fn_in_trait)]
pub trait ClientWriter {
    /// Replaces the whole collection with `clients`.
    async fn replace_clients(&self, clients: &[ClientRecord]) -> RepositoryResult<()>;
}
