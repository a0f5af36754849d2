//! Remote Source Module
//!
//! Raw access to the external JSON collection, without caching.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

use super::model::User;

// == Remote Error ==
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The remote reported the item absent (404)
    #[error("user with ID {0} not found")]
    NotFound(u64),

    /// Any other non-success status, transport or decode failure
    #[error("{0}")]
    Unavailable(String),
}

// == Remote Source Trait ==
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetches the whole collection.
    async fn fetch_all(&self) -> Result<Vec<User>, RemoteError>;

    /// Fetches a single item by id.
    async fn fetch_one(&self, id: u64) -> Result<User, RemoteError>;
}

// == HTTP Remote Source ==
/// Reads `GET <base>/<collection>` and `GET <base>/<collection>/<id>`.
#[derive(Debug, Clone)]
pub struct HttpRemoteSource {
    client: Client,
    base_url: String,
    collection: String,
}

impl HttpRemoteSource {
    pub fn new(client: Client, base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.collection)
    }
}

fn unavailable(err: reqwest::Error) -> RemoteError {
    RemoteError::Unavailable(err.to_string())
}

fn status_error(status: StatusCode) -> RemoteError {
    RemoteError::Unavailable(format!("External API error: {}", status))
}

#[async_trait]
impl RemoteSource for HttpRemoteSource {
    async fn fetch_all(&self) -> Result<Vec<User>, RemoteError> {
        let url = self.collection_url();
        debug!(%url, "fetching collection");

        let response = self.client.get(&url).send().await.map_err(unavailable)?;
        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }
        response.json().await.map_err(unavailable)
    }

    async fn fetch_one(&self, id: u64) -> Result<User, RemoteError> {
        let url = format!("{}/{}", self.collection_url(), id);
        debug!(%url, "fetching item");

        let response = self.client.get(&url).send().await.map_err(unavailable)?;
        match response.status() {
            status if status.is_success() => response.json().await.map_err(unavailable),
            StatusCode::NOT_FOUND => Err(RemoteError::NotFound(id)),
            status => Err(status_error(status)),
        }
    }
}
