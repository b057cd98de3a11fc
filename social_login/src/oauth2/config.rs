use std::collections::HashMap;
use std::env;
use url::Url;

use super::errors::ConfigError;
use super::types::Provider;
use crate::config::SOCIAL_ROUTE_PREFIX;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://www.googleapis.com/oauth2/v4/token";
const GOOGLE_PROFILE_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const GOOGLE_SCOPE_PROFILE: &str = "https://www.googleapis.com/auth/userinfo.profile";
const GOOGLE_SCOPE_EMAIL: &str = "https://www.googleapis.com/auth/userinfo.email";
const GOOGLE_PROFILE_FIELDS: &str = "name,email,gender,id,picture,verified_email";

const FACEBOOK_AUTH_URL: &str = "https://www.facebook.com/v16.0/dialog/oauth";
const FACEBOOK_TOKEN_URL: &str = "https://graph.facebook.com/v16.0/oauth/access_token";
const FACEBOOK_VERIFY_URL: &str = "https://graph.facebook.com/me";
const FACEBOOK_PROFILE_URL: &str = "https://graph.facebook.com/v16.0/me";
const FACEBOOK_PROFILE_FIELDS: &str = "id,first_name,last_name,email";

/// How the token endpoint expects the code exchange request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRequestStyle {
    /// Form-encoded POST (Google).
    FormPost,
    /// GET with query parameters (Facebook-style Graph endpoints).
    QueryGet,
}

/// How the profile endpoint expects the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPlacement {
    BearerHeader,
    QueryParam,
}

/// Immutable per-provider settings, loaded once at startup and never mutated
/// at request time.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub auth_url: String,
    pub token_url: String,
    /// Secondary access-token verification endpoint; when set, the flow
    /// aborts unless the verification call succeeds.
    pub verify_url: Option<String>,
    pub profile_url: String,
    pub profile_fields: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    /// Extra fixed query parameters on the authorization URL
    /// (e.g. `response_type=code`, `access_type=online` for Google).
    pub auth_params: Vec<(&'static str, &'static str)>,
    pub token_request: TokenRequestStyle,
    pub token_placement: TokenPlacement,
}

impl ProviderConfig {
    /// Built-in Google settings for the given credentials.
    pub fn google(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            provider: Provider::Google,
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            verify_url: None,
            profile_url: GOOGLE_PROFILE_URL.to_string(),
            profile_fields: GOOGLE_PROFILE_FIELDS.to_string(),
            client_id,
            client_secret,
            redirect_uri,
            scopes: vec![
                GOOGLE_SCOPE_PROFILE.to_string(),
                GOOGLE_SCOPE_EMAIL.to_string(),
            ],
            auth_params: vec![("response_type", "code"), ("access_type", "online")],
            token_request: TokenRequestStyle::FormPost,
            token_placement: TokenPlacement::BearerHeader,
        }
    }

    /// Built-in Facebook settings for the given credentials.
    pub fn facebook(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            provider: Provider::Facebook,
            auth_url: FACEBOOK_AUTH_URL.to_string(),
            token_url: FACEBOOK_TOKEN_URL.to_string(),
            verify_url: Some(FACEBOOK_VERIFY_URL.to_string()),
            profile_url: FACEBOOK_PROFILE_URL.to_string(),
            profile_fields: FACEBOOK_PROFILE_FIELDS.to_string(),
            client_id,
            client_secret,
            redirect_uri,
            scopes: Vec::new(),
            auth_params: Vec::new(),
            token_request: TokenRequestStyle::QueryGet,
            token_placement: TokenPlacement::QueryParam,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for url in [&self.auth_url, &self.token_url, &self.profile_url] {
            Url::parse(url).map_err(|_| ConfigError::InvalidEndpoint {
                provider: self.provider.to_string(),
                url: url.clone(),
            })?;
        }
        Ok(())
    }
}

/// Static catalog of the providers enabled for this deployment.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<Provider, ProviderConfig>,
}

impl ProviderRegistry {
    pub fn new(configs: Vec<ProviderConfig>) -> Result<Self, ConfigError> {
        let mut providers = HashMap::new();
        for config in configs {
            config.validate()?;
            providers.insert(config.provider, config);
        }
        Ok(Self { providers })
    }

    /// Build the registry from the environment.
    ///
    /// A provider is registered when `SOCIAL_<PROVIDER>_CLIENT_ID` and
    /// `SOCIAL_<PROVIDER>_CLIENT_SECRET` are present and
    /// `SOCIAL_<PROVIDER>_ENABLED` is not set to a false value. The redirect
    /// URI is `{SOCIAL_LOGIN_ORIGIN}{SOCIAL_ROUTE_PREFIX}/callback/{provider}`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let origin = env::var("SOCIAL_LOGIN_ORIGIN")
            .map_err(|_| ConfigError::MissingEnv("SOCIAL_LOGIN_ORIGIN".to_string()))?;

        let mut configs = Vec::new();
        for provider in Provider::ALL {
            let upper = provider.as_str().to_uppercase();
            if !env_flag(&format!("SOCIAL_{upper}_ENABLED"), true) {
                tracing::debug!("Provider {} disabled by configuration", provider);
                continue;
            }
            let (Ok(client_id), Ok(client_secret)) = (
                env::var(format!("SOCIAL_{upper}_CLIENT_ID")),
                env::var(format!("SOCIAL_{upper}_CLIENT_SECRET")),
            ) else {
                tracing::debug!("Provider {} has no credentials configured", provider);
                continue;
            };

            let redirect_uri = format!(
                "{}{}/callback/{}",
                origin.trim_end_matches('/'),
                SOCIAL_ROUTE_PREFIX.as_str(),
                provider
            );

            configs.push(match provider {
                Provider::Google => ProviderConfig::google(client_id, client_secret, redirect_uri),
                Provider::Facebook => {
                    ProviderConfig::facebook(client_id, client_secret, redirect_uri)
                }
            });
        }

        Self::new(configs)
    }

    /// Look up an enabled provider. `None` means unknown or disabled and the
    /// caller must refuse the request.
    pub fn get(&self, provider: Provider) -> Option<&ProviderConfig> {
        self.providers.get(&provider)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => !matches!(v.to_lowercase().as_str(), "0" | "false" | "no" | "off"),
        Err(_) => default,
    }
}
