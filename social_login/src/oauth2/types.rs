use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ConfigError;
use crate::storage::CacheData;
use crate::storage::StorageError;

/// Identity providers supported by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Facebook,
    Google,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facebook => "facebook",
            Self::Google => "google",
        }
    }

    pub const ALL: [Provider; 2] = [Provider::Facebook, Provider::Google];
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "facebook" => Ok(Self::Facebook),
            "google" => Ok(Self::Google),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}

/// A provider-attested user profile, normalized across providers and not yet
/// linked to a local account.
///
/// `provider` + `external_id` form the natural key. `email` is genuinely
/// optional: providers return profiles without one, and downstream policy
/// must decide what to do about it rather than have a default invented here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    pub provider: Provider,
    pub external_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// The user data we get back from Google's userinfo endpoint
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GoogleUserInfo {
    pub(crate) id: String,
    pub(crate) name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) given_name: Option<String>,
    pub(crate) family_name: Option<String>,
}

impl From<GoogleUserInfo> for ExternalIdentity {
    fn from(info: GoogleUserInfo) -> Self {
        Self {
            provider: Provider::Google,
            external_id: info.id,
            email: non_empty(info.email),
            first_name: non_empty(info.given_name),
            last_name: non_empty(info.family_name),
            display_name: non_empty(info.name),
        }
    }
}

// The user data we get back from Facebook's Graph API `me` endpoint
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FacebookUserInfo {
    pub(crate) id: String,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) email: Option<String>,
}

impl From<FacebookUserInfo> for ExternalIdentity {
    fn from(info: FacebookUserInfo) -> Self {
        Self {
            provider: Provider::Facebook,
            external_id: info.id,
            email: non_empty(info.email),
            first_name: non_empty(info.first_name),
            last_name: non_empty(info.last_name),
            display_name: None,
        }
    }
}

/// Token endpoint response. Only `access_token` is load-bearing; the rest is
/// accepted so provider responses parse whole.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: Option<String>,
    #[allow(dead_code)]
    pub(crate) token_type: Option<String>,
    #[allow(dead_code)]
    pub(crate) expires_in: Option<u64>,
}

/// Anti-CSRF state token at rest, keyed by `(session, provider)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredStateToken {
    pub(crate) token: String,
    pub(crate) expires_at: DateTime<Utc>,
}

impl From<StoredStateToken> for CacheData {
    fn from(data: StoredStateToken) -> Self {
        Self {
            value: serde_json::to_string(&data).expect("Failed to serialize StoredStateToken"),
        }
    }
}

impl TryFrom<CacheData> for StoredStateToken {
    type Error = StorageError;

    fn try_from(data: CacheData) -> Result<Self, Self::Error> {
        serde_json::from_str(&data.value).map_err(|e| StorageError::Serde(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_provider_round_trip() {
        for provider in Provider::ALL {
            let parsed: Provider = provider.as_str().parse().unwrap();
            assert_eq!(parsed, provider);
        }
    }

    #[test]
    fn test_provider_unknown() {
        let result = "twitter".parse::<Provider>();
        assert!(matches!(result, Err(ConfigError::UnknownProvider(_))));
    }

    #[test]
    fn test_google_user_info_normalization() {
        let json_data = json!({
            "id": "123456789",
            "email": "test@example.com",
            "verified_email": true,
            "name": "Test User",
            "given_name": "Test",
            "family_name": "User",
            "picture": "https://example.com/pic.jpg"
        });

        let info: GoogleUserInfo = serde_json::from_value(json_data).unwrap();
        let identity = ExternalIdentity::from(info);

        assert_eq!(identity.provider, Provider::Google);
        assert_eq!(identity.external_id, "123456789");
        assert_eq!(identity.email.as_deref(), Some("test@example.com"));
        assert_eq!(identity.display_name.as_deref(), Some("Test User"));
    }

    #[test]
    fn test_google_user_info_empty_email_becomes_absent() {
        let json_data = json!({ "id": "42", "email": "", "name": "No Mail" });

        let info: GoogleUserInfo = serde_json::from_value(json_data).unwrap();
        let identity = ExternalIdentity::from(info);

        assert_eq!(identity.email, None);
    }

    #[test]
    fn test_facebook_user_info_normalization() {
        let json_data = json!({
            "id": "123",
            "first_name": "A",
            "last_name": "B",
            "email": "a@b.com"
        });

        let info: FacebookUserInfo = serde_json::from_value(json_data).unwrap();
        let identity = ExternalIdentity::from(info);

        assert_eq!(identity.provider, Provider::Facebook);
        assert_eq!(identity.external_id, "123");
        assert_eq!(identity.first_name.as_deref(), Some("A"));
        assert_eq!(identity.last_name.as_deref(), Some("B"));
        assert_eq!(identity.display_name, None);
    }

    #[test]
    fn test_facebook_user_info_missing_id_fails() {
        let json_data = json!({ "first_name": "A" });
        let result: Result<FacebookUserInfo, _> = serde_json::from_value(json_data);
        assert!(result.is_err(), "id is required in a profile response");
    }

    #[test]
    fn test_token_response_without_access_token_parses() {
        // Error bodies still parse; the missing token is handled by the caller
        let json_data = json!({ "error": "invalid_grant" });
        let response: TokenResponse = serde_json::from_value(json_data).unwrap();
        assert!(response.access_token.is_none());
    }

    proptest! {
        /// Any identity survives a serde round trip unchanged.
        #[test]
        fn test_external_identity_serde_roundtrip(
            external_id in "[a-zA-Z0-9_-]{1,64}",
            email in proptest::option::of("[a-z0-9]{1,16}@[a-z0-9]{1,16}\\.[a-z]{2,4}"),
            first_name in proptest::option::of("[A-Za-z]{1,32}"),
            last_name in proptest::option::of("[A-Za-z]{1,32}"),
        ) {
            let identity = ExternalIdentity {
                provider: Provider::Facebook,
                external_id,
                email,
                first_name,
                last_name,
                display_name: None,
            };

            let serialized = serde_json::to_string(&identity).expect("Failed to serialize");
            let deserialized: ExternalIdentity =
                serde_json::from_str(&serialized).expect("Failed to deserialize");

            prop_assert_eq!(identity, deserialized);
        }
    }
}
