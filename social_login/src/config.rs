use std::env;
use std::sync::LazyLock;

/// Route prefix under which the social-login endpoints are mounted,
/// e.g. `{prefix}/connect/google` and `{prefix}/callback/google`.
pub static SOCIAL_ROUTE_PREFIX: LazyLock<String> = LazyLock::new(|| {
    env::var("SOCIAL_ROUTE_PREFIX")
        .ok()
        .unwrap_or("/auth/social".to_string())
});

/// Lifetime of an issued anti-CSRF state token, in seconds. A callback
/// arriving later than this forces a fresh connect.
pub static STATE_TOKEN_MAX_AGE: LazyLock<u64> = LazyLock::new(|| {
    env::var("SOCIAL_STATE_TOKEN_MAX_AGE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(600)
});
