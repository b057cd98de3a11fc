//! social-login - OAuth2 social login and account linking for Rust web applications
//!
//! This crate implements the OAuth2 Authorization Code flow against
//! third-party identity providers (Facebook, Google) and maps the verified
//! external identity onto a local account: reusing an existing link, linking
//! by verified email, or creating a fresh account.
//!
//! The host application supplies its session storage, account datastore and
//! (optionally) HTTP transport through small trait interfaces; the
//! [`LoginOrchestrator`] wires them together per request and holds no
//! process-wide state.

mod account;
mod client;
mod config;
mod coordination;
mod oauth2;
mod session;
mod storage;
mod utils;

#[cfg(test)]
mod test_utils;

pub use coordination::{
    AccountLinker, CoordinationError, LinkDisposition, LinkError, LinkedAccount,
    LoginOrchestrator, LoginOutcome,
};

pub use oauth2::{
    ConfigError, ExchangeError, ExternalIdentity, ProfileError, Provider, ProviderConfig,
    ProviderRegistry, StateTokenIssuer, TokenPlacement, TokenRequestStyle,
};

pub use account::{
    AccountError, AccountStore, IdentityLink, InMemoryAccountStore, InMemoryLinkStore, LinkStore,
    LocalAccount, NewAccountNotice, NewAccountRequest, SqliteLinkStore,
};

pub use session::{
    CUSTOMER_ID_KEY, InMemorySessionStore, PENDING_SOCIAL_DATA_KEY, PendingSocialData,
    SessionError, SessionStore,
};

pub use client::{
    HttpClient, HttpClientError, HttpResponse, PROVIDER_REQUEST_TIMEOUT_SECS, ReqwestHttpClient,
};

pub use storage::{
    CacheData, CacheStore, InMemoryCacheStore, RedisCacheStore, SharedCacheStore, StorageError,
    shared_cache_store,
};

pub use config::{SOCIAL_ROUTE_PREFIX, STATE_TOKEN_MAX_AGE};

pub use utils::{UtilError, gen_random_string};
