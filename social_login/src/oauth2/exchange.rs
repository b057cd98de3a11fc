use url::Url;

use super::config::{ProviderConfig, TokenRequestStyle};
use super::errors::ExchangeError;
use super::types::TokenResponse;
use crate::client::{HttpClient, HttpClientError, HttpResponse};

const UNSPECIFIED_OAUTH_ERROR: &str =
    "Unspecified OAuth error occurred. Please check client id and secret.";

/// Exchange an authorization code for an access token at the provider's
/// token endpoint, using the request style the provider declares.
pub(crate) async fn exchange_code(
    http: &dyn HttpClient,
    config: &ProviderConfig,
    code: &str,
) -> Result<String, ExchangeError> {
    let response = match config.token_request {
        TokenRequestStyle::FormPost => {
            let form = [
                ("code".to_string(), code.to_string()),
                ("client_id".to_string(), config.client_id.clone()),
                ("client_secret".to_string(), config.client_secret.clone()),
                ("redirect_uri".to_string(), config.redirect_uri.clone()),
                ("grant_type".to_string(), "authorization_code".to_string()),
            ];
            http.post_form(&config.token_url, &form)
                .await
                .map_err(network_failure)?
        }
        TokenRequestStyle::QueryGet => {
            let mut url = Url::parse(&config.token_url)
                .map_err(|e| ExchangeError::Provider(e.to_string()))?;
            url.query_pairs_mut()
                .append_pair("client_id", &config.client_id)
                .append_pair("client_secret", &config.client_secret)
                .append_pair("redirect_uri", &config.redirect_uri)
                .append_pair("code", code);
            http.get(url.as_str(), &[]).await.map_err(network_failure)?
        }
    };

    if !response.is_success() {
        tracing::error!(
            "Token exchange for {} failed with status {}",
            config.provider,
            response.status
        );
        return Err(ExchangeError::Provider(
            provider_error_text(&response)
                .unwrap_or_else(|| UNSPECIFIED_OAUTH_ERROR.to_string()),
        ));
    }

    let parsed: TokenResponse = serde_json::from_str(&response.body).map_err(|e| {
        tracing::error!("Token endpoint returned an unparseable body: {}", e);
        ExchangeError::Provider(UNSPECIFIED_OAUTH_ERROR.to_string())
    })?;

    match parsed.access_token {
        Some(token) => Ok(token),
        None => Err(ExchangeError::Provider(
            provider_error_text(&response)
                .unwrap_or_else(|| UNSPECIFIED_OAUTH_ERROR.to_string()),
        )),
    }
}

/// Confirm that a just-obtained access token is live, for providers that
/// require it. `Ok(false)` means the provider rejected the token; the caller
/// aborts the flow.
pub(crate) async fn verify_access_token(
    http: &dyn HttpClient,
    verify_url: &str,
    access_token: &str,
) -> Result<bool, ExchangeError> {
    let mut url =
        Url::parse(verify_url).map_err(|e| ExchangeError::Provider(e.to_string()))?;
    url.query_pairs_mut()
        .append_pair("access_token", access_token);

    let response = http.get(url.as_str(), &[]).await.map_err(network_failure)?;

    if !response.is_success() {
        tracing::error!(
            "Access token verification failed with status {}",
            response.status
        );
        return Ok(false);
    }

    // An explicit failure flag in a 2xx body also counts as rejection
    match serde_json::from_str::<serde_json::Value>(&response.body) {
        Ok(value) => {
            let rejected = value.get("error").is_some()
                || value.get("success").and_then(|v| v.as_bool()) == Some(false);
            Ok(!rejected)
        }
        Err(_) => Ok(false),
    }
}

fn network_failure(e: HttpClientError) -> ExchangeError {
    ExchangeError::NetworkFailure(e.to_string())
}

/// Pull a human-readable error out of a provider response body, if there is
/// one. Providers disagree on shape: `error_description`, a bare `error`
/// string, or an `error.message` object are all seen in the wild.
fn provider_error_text(response: &HttpResponse) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(&response.body).ok()?;
    if let Some(desc) = value.get("error_description").and_then(|v| v.as_str()) {
        return Some(desc.to_string());
    }
    match value.get("error") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(obj) => obj
            .get("message")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        None => None,
    }
}
