mod config;
mod errors;
mod exchange;
mod profile;
mod state;
mod types;

pub use config::{ProviderConfig, ProviderRegistry, TokenPlacement, TokenRequestStyle};
pub use errors::{ConfigError, ExchangeError, ProfileError};
pub use state::StateTokenIssuer;
pub use types::{ExternalIdentity, Provider};

pub(crate) use exchange::{exchange_code, verify_access_token};
pub(crate) use profile::fetch_profile;
