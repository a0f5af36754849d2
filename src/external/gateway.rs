//! External Gateway Module
//!
//! Serves the remote users collection through the cache layer.

use std::sync::Arc;

use tracing::{error, info};

use super::model::User;
use super::source::{RemoteError, RemoteSource};
use crate::cache::CacheLayer;
use crate::error::{AppError, Result};

/// Cache key of the full collection
pub const USERS_CACHE_KEY: &str = "users";

// == External Gateway ==
#[derive(Clone)]
pub struct ExternalGateway {
    source: Arc<dyn RemoteSource>,
    cache: CacheLayer,
    ttl_seconds: u64,
}

impl ExternalGateway {
    pub fn new(source: Arc<dyn RemoteSource>, cache: CacheLayer, ttl_seconds: u64) -> Self {
        Self {
            source,
            cache,
            ttl_seconds,
        }
    }

    // == List All ==
    /// Returns the full collection, from cache when a live entry exists.
    ///
    /// On a miss the remote is fetched once and the result cached for the
    /// configured TTL.
    pub async fn list_all(&self) -> Result<Vec<User>> {
        if let Some(users) = self.cache.get::<Vec<User>>(USERS_CACHE_KEY).await? {
            info!("Returning users from cache");
            return Ok(users);
        }

        info!("Fetching users from external API");
        let users = self.source.fetch_all().await.map_err(|e| {
            error!("Error fetching users from external API: {}", e);
            AppError::RemoteUnavailable(e.to_string())
        })?;

        self.cache
            .put(USERS_CACHE_KEY, &users, self.ttl_seconds)
            .await?;
        Ok(users)
    }

    // == Get By Id ==
    /// Looks the user up in the cached collection, then remotely.
    ///
    /// Returns `None` when the remote reports the user absent.
    pub async fn get_by_id(&self, id: u64) -> Result<Option<User>> {
        if let Some(users) = self.cache.get::<Vec<User>>(USERS_CACHE_KEY).await? {
            if let Some(user) = users.into_iter().find(|u| u.id == id) {
                info!("Returning user {} from cache", id);
                return Ok(Some(user));
            }
        }

        info!("Fetching user {} from external API", id);
        match self.source.fetch_one(id).await {
            Ok(user) => Ok(Some(user)),
            Err(RemoteError::NotFound(_)) => Ok(None),
            Err(e) => {
                error!("Error fetching user with ID {} from external API: {}", id, e);
                Err(AppError::RemoteUnavailable(e.to_string()))
            }
        }
    }
}
