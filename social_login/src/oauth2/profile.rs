use url::Url;

use super::config::{ProviderConfig, TokenPlacement};
use super::errors::ProfileError;
use super::types::{ExternalIdentity, FacebookUserInfo, GoogleUserInfo, Provider};
use crate::client::HttpClient;

/// Retrieve the authenticated user's profile from the provider's resource
/// endpoint and normalize it to an [`ExternalIdentity`].
///
/// Optional fields the provider omits stay absent; nothing is defaulted here
/// so the linking policy can react to what the provider actually attested.
pub(crate) async fn fetch_profile(
    http: &dyn HttpClient,
    config: &ProviderConfig,
    access_token: &str,
) -> Result<ExternalIdentity, ProfileError> {
    let mut url = Url::parse(&config.profile_url)
        .map_err(|e| ProfileError::InvalidResponse(e.to_string()))?;
    url.query_pairs_mut()
        .append_pair("fields", &config.profile_fields);

    let headers = match config.token_placement {
        TokenPlacement::BearerHeader => vec![(
            "Authorization".to_string(),
            format!("Bearer {access_token}"),
        )],
        TokenPlacement::QueryParam => {
            url.query_pairs_mut()
                .append_pair("access_token", access_token);
            Vec::new()
        }
    };

    let response = http
        .get(url.as_str(), &headers)
        .await
        .map_err(|e| ProfileError::NetworkFailure(e.to_string()))?;

    if !response.is_success() {
        tracing::error!(
            "Profile fetch for {} failed with status {}",
            config.provider,
            response.status
        );
        return Err(ProfileError::Unavailable(response.status));
    }

    let identity = match config.provider {
        Provider::Google => serde_json::from_str::<GoogleUserInfo>(&response.body)
            .map(ExternalIdentity::from),
        Provider::Facebook => serde_json::from_str::<FacebookUserInfo>(&response.body)
            .map(ExternalIdentity::from),
    }
    .map_err(|e| ProfileError::InvalidResponse(e.to_string()))?;

    tracing::debug!(
        "Fetched profile {}:{}",
        identity.provider,
        identity.external_id
    );
    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth2::config::ProviderConfig;
    use crate::test_utils::MockHttpClient;

    fn google_config() -> ProviderConfig {
        ProviderConfig::google(
            "gid".to_string(),
            "gsecret".to_string(),
            "https://shop.example/auth/social/callback/google".to_string(),
        )
    }

    fn facebook_config() -> ProviderConfig {
        ProviderConfig::facebook(
            "fid".to_string(),
            "fsecret".to_string(),
            "https://shop.example/auth/social/callback/facebook".to_string(),
        )
    }

    #[tokio::test]
    async fn test_fetch_google_profile_uses_bearer_header() {
        let http = MockHttpClient::new().with_response(
            200,
            r#"{"id":"g1","name":"Test User","email":"t@example.com","given_name":"Test","family_name":"User"}"#,
        );

        let identity = fetch_profile(&http, &google_config(), "tok")
            .await
            .unwrap();

        assert_eq!(identity.provider, Provider::Google);
        assert_eq!(identity.external_id, "g1");
        assert_eq!(identity.email.as_deref(), Some("t@example.com"));

        let calls = http.calls();
        assert!(calls[0].url.contains("fields="));
        assert!(!calls[0].url.contains("access_token="));
        assert!(
            calls[0]
                .headers
                .contains(&("Authorization".to_string(), "Bearer tok".to_string()))
        );
    }

    #[tokio::test]
    async fn test_fetch_facebook_profile_uses_query_token() {
        let http = MockHttpClient::new().with_response(
            200,
            r#"{"id":"123","first_name":"A","last_name":"B","email":"a@b.com"}"#,
        );

        let identity = fetch_profile(&http, &facebook_config(), "fb_tok")
            .await
            .unwrap();

        assert_eq!(identity.provider, Provider::Facebook);
        assert_eq!(identity.external_id, "123");

        let calls = http.calls();
        assert!(calls[0].url.contains("access_token=fb_tok"));
        assert!(calls[0].headers.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_profile_without_email_keeps_it_absent() {
        let http = MockHttpClient::new()
            .with_response(200, r#"{"id":"123","first_name":"A","last_name":"B"}"#);

        let identity = fetch_profile(&http, &facebook_config(), "tok")
            .await
            .unwrap();
        assert_eq!(identity.email, None);
    }

    #[tokio::test]
    async fn test_fetch_profile_non_2xx_is_unavailable() {
        let http = MockHttpClient::new().with_response(503, "upstream down");

        let err = fetch_profile(&http, &google_config(), "tok")
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileError::Unavailable(503)));
    }

    #[tokio::test]
    async fn test_fetch_profile_malformed_body_is_invalid_response() {
        let http = MockHttpClient::new().with_response(200, r#"{"id":"#);

        let err = fetch_profile(&http, &google_config(), "tok")
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_fetch_profile_timeout_is_network_failure() {
        let http = MockHttpClient::new().with_timeout();

        let err = fetch_profile(&http, &google_config(), "tok")
            .await
            .unwrap_err();
        assert!(matches!(err, ProfileError::NetworkFailure(_)));
    }
}
