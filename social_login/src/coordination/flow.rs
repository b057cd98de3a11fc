use std::sync::Arc;
use url::Url;

use super::errors::CoordinationError;
use super::linker::{AccountLinker, LinkError};
use crate::account::{AccountStore, LinkStore};
use crate::client::HttpClient;
use crate::oauth2::{
    ExternalIdentity, Provider, ProviderRegistry, StateTokenIssuer, exchange_code, fetch_profile,
    verify_access_token,
};
use crate::session::{PENDING_SOCIAL_DATA_KEY, CUSTOMER_ID_KEY, PendingSocialData, SessionStore};
use crate::storage::SharedCacheStore;

/// Terminal result of a callback or finalize request. Every variant except
/// `LoggedIn`/`Verified` is a user-recoverable condition with a single
/// human-readable presentation; none of them is an error in the `Result`
/// sense.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// Callback succeeded: the identity is verified and parked in the
    /// session, waiting for the finalize step.
    Verified(ExternalIdentity),
    /// Finalize succeeded: a local session was established under a freshly
    /// rotated session id.
    LoggedIn {
        account_id: String,
        session_id: String,
    },
    /// Finalize found nothing pending; an idempotent no-op.
    NoPendingIdentity,
    /// The presented state did not match the issued one; the authentication
    /// attempt may have been compromised. No provider calls were made.
    StateMismatch,
    /// The code → token exchange failed; carries the user-facing message.
    ExchangeFailed(String),
    /// The provider rejected the access token on the secondary verification.
    VerificationFailed,
    /// The profile endpoint was unreachable or returned garbage.
    ProfileUnavailable(String),
    /// No link exists and the profile has no email to link or create by.
    NeedsEmail(Provider),
    /// Persistence refused the account/link creation; the user must not
    /// simply retry.
    AccountConflict(String),
}

/// Top-level state machine for the connect and callback requests of every
/// provider. All collaborators are injected; the orchestrator holds no
/// process-wide state.
pub struct LoginOrchestrator {
    registry: ProviderRegistry,
    state: StateTokenIssuer,
    http: Arc<dyn HttpClient>,
    sessions: Arc<dyn SessionStore>,
    linker: AccountLinker,
}

impl LoginOrchestrator {
    pub fn new(
        registry: ProviderRegistry,
        cache: SharedCacheStore,
        http: Arc<dyn HttpClient>,
        sessions: Arc<dyn SessionStore>,
        accounts: Arc<dyn AccountStore>,
        links: Arc<dyn LinkStore>,
    ) -> Self {
        Self {
            registry,
            state: StateTokenIssuer::new(cache),
            http,
            sessions,
            linker: AccountLinker::new(accounts, links),
        }
    }

    /// Build the provider's authorization URL for this session: issue a fresh
    /// state token and assemble `client_id`, `redirect_uri`, `state` plus the
    /// provider's fixed parameters and scopes. The state issuance is the only
    /// side effect.
    pub async fn begin_connect(
        &self,
        session_id: &str,
        provider: Provider,
        website_id: i64,
    ) -> Result<String, CoordinationError> {
        let config = self
            .registry
            .get(provider)
            .ok_or_else(|| CoordinationError::UnknownProvider(provider.to_string()).log())?;

        let state = self.state.issue(session_id, provider).await?;

        let mut url = Url::parse(&config.auth_url)
            .map_err(|e| CoordinationError::Storage(e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &config.client_id)
                .append_pair("redirect_uri", &config.redirect_uri)
                .append_pair("state", &state);
            if !config.scopes.is_empty() {
                query.append_pair("scope", &config.scopes.join(" "));
            }
            for (name, value) in &config.auth_params {
                query.append_pair(name, value);
            }
        }

        tracing::debug!(
            "Connect for {} in scope {}: {}",
            provider,
            website_id,
            url
        );
        Ok(url.into())
    }

    /// Validate the provider callback: consume the state token, exchange the
    /// code, verify the token where the provider requires it, fetch the
    /// profile, and park the verified identity in the session. No account is
    /// touched here; that is the finalize step's job.
    pub async fn handle_callback(
        &self,
        session_id: &str,
        provider: Provider,
        presented_state: &str,
        code: &str,
        website_id: i64,
    ) -> Result<LoginOutcome, CoordinationError> {
        let config = self
            .registry
            .get(provider)
            .ok_or_else(|| CoordinationError::UnknownProvider(provider.to_string()).log())?;

        if !self
            .state
            .consume(session_id, provider, presented_state)
            .await?
        {
            tracing::error!("State mismatch on {} callback", provider);
            return Ok(LoginOutcome::StateMismatch);
        }

        let access_token = match exchange_code(self.http.as_ref(), config, code).await {
            Ok(token) => token,
            Err(e) => {
                tracing::error!("Token exchange failed for {}: {}", provider, e);
                return Ok(LoginOutcome::ExchangeFailed(e.to_string()));
            }
        };

        if let Some(verify_url) = &config.verify_url {
            match verify_access_token(self.http.as_ref(), verify_url, &access_token).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::error!("Access token verification failed for {}", provider);
                    return Ok(LoginOutcome::VerificationFailed);
                }
                Err(e) => {
                    tracing::error!("Access token verification errored for {}: {}", provider, e);
                    return Ok(LoginOutcome::ExchangeFailed(e.to_string()));
                }
            }
        }

        let identity = match fetch_profile(self.http.as_ref(), config, &access_token).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::error!("Profile fetch failed for {}: {}", provider, e);
                return Ok(LoginOutcome::ProfileUnavailable(e.to_string()));
            }
        };

        let pending = PendingSocialData {
            identity: identity.clone(),
            password: None,
            website_id,
        };
        let payload = serde_json::to_string(&pending)
            .map_err(|e| CoordinationError::Storage(e.to_string()))?;

        self.sessions.start(session_id).await?;
        self.sessions
            .set(session_id, PENDING_SOCIAL_DATA_KEY, payload)
            .await?;

        Ok(LoginOutcome::Verified(identity))
    }

    /// Consume the pending identity and log the user in: run the linking
    /// decision, establish the session for the resolved account, and rotate
    /// the session id. The pending data is cleared no matter how this ends.
    pub async fn finalize(&self, session_id: &str) -> Result<LoginOutcome, CoordinationError> {
        self.sessions.start(session_id).await?;

        let Some(raw) = self
            .sessions
            .get(session_id, PENDING_SOCIAL_DATA_KEY)
            .await?
        else {
            return Ok(LoginOutcome::NoPendingIdentity);
        };

        // Read-once: gone before any outcome is decided
        self.sessions
            .unset(session_id, PENDING_SOCIAL_DATA_KEY)
            .await?;

        let pending: PendingSocialData = serde_json::from_str(&raw)
            .map_err(|e| CoordinationError::Storage(e.to_string()).log())?;
        let provider = pending.identity.provider;

        match self
            .linker
            .resolve(
                &pending.identity,
                pending.password.as_deref(),
                pending.website_id,
            )
            .await
        {
            Ok(linked) => {
                self.sessions
                    .set(session_id, CUSTOMER_ID_KEY, linked.account_id.clone())
                    .await?;
                // Rotating the id defeats session fixation across the login
                let new_session_id = self.sessions.regenerate_id(session_id).await?;

                tracing::debug!(
                    "Logged in account {} via {} ({:?})",
                    linked.account_id,
                    provider,
                    linked.disposition
                );
                Ok(LoginOutcome::LoggedIn {
                    account_id: linked.account_id,
                    session_id: new_session_id,
                })
            }
            Err(LinkError::NeedsEmail) => Ok(LoginOutcome::NeedsEmail(provider)),
            Err(LinkError::Conflict(message)) => Ok(LoginOutcome::AccountConflict(message)),
            Err(LinkError::Storage(message)) => {
                Err(CoordinationError::Storage(message).log())
            }
        }
    }
}
