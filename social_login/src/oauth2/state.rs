use chrono::{Duration, Utc};
use subtle::ConstantTimeEq;

use super::types::{Provider, StoredStateToken};
use crate::config::STATE_TOKEN_MAX_AGE;
use crate::storage::{SharedCacheStore, StorageError};
use crate::utils::gen_random_string;

const STATE_PREFIX: &str = "state";

/// Issues and validates the anti-CSRF state tokens bound to a browser
/// session. One active token per `(session, provider)` pair; issuing again
/// supersedes the prior token, consuming is read-once.
pub struct StateTokenIssuer {
    cache: SharedCacheStore,
    ttl: u64,
}

fn make_key(session_id: &str, provider: Provider) -> String {
    format!("{session_id}:{provider}")
}

impl StateTokenIssuer {
    pub fn new(cache: SharedCacheStore) -> Self {
        Self {
            cache,
            ttl: *STATE_TOKEN_MAX_AGE,
        }
    }

    /// Generate a fresh 256-bit token for `(session_id, provider)`,
    /// overwriting any token previously issued for the pair.
    pub async fn issue(
        &self,
        session_id: &str,
        provider: Provider,
    ) -> Result<String, StorageError> {
        let token = gen_random_string(32).map_err(|e| StorageError::Storage(e.to_string()))?;
        let stored = StoredStateToken {
            token: token.clone(),
            expires_at: Utc::now() + Duration::seconds(self.ttl as i64),
        };

        self.cache
            .lock()
            .await
            .put_with_ttl(
                STATE_PREFIX,
                &make_key(session_id, provider),
                stored.into(),
                self.ttl as usize,
            )
            .await?;

        Ok(token)
    }

    /// Check-and-delete the stored token for `(session_id, provider)`.
    ///
    /// Returns true iff a token exists, has not expired, and is byte-equal to
    /// `presented`. The stored token is deleted in every case, so a replayed
    /// callback can never validate twice. A `false` here is a normal outcome
    /// (the authentication attempt may be compromised), not an error.
    pub async fn consume(
        &self,
        session_id: &str,
        provider: Provider,
        presented: &str,
    ) -> Result<bool, StorageError> {
        let key = make_key(session_id, provider);

        // Single lock scope: the get and the delete must be atomic so a
        // concurrent replay cannot observe the token between them.
        let mut cache = self.cache.lock().await;
        let stored = cache.get(STATE_PREFIX, &key).await?;
        cache.remove(STATE_PREFIX, &key).await?;
        drop(cache);

        let Some(data) = stored else {
            tracing::debug!("No state token stored for {}", key);
            return Ok(false);
        };
        let stored: StoredStateToken = data.try_into()?;

        if Utc::now() > stored.expires_at {
            tracing::debug!("State token for {} expired", key);
            return Ok(false);
        }

        let matches: bool = stored
            .token
            .as_bytes()
            .ct_eq(presented.as_bytes())
            .into();
        if !matches {
            tracing::error!("State token mismatch for {}", key);
        }
        Ok(matches)
    }
}
