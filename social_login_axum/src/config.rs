use std::env;
use std::sync::LazyLock;

/// Where the finalize endpoint sends the browser after a successful login or
/// an idempotent no-op.
pub static SOCIAL_REDIRECT_HOME: LazyLock<String> = LazyLock::new(|| {
    env::var("SOCIAL_REDIRECT_HOME")
        .ok()
        .unwrap_or("/".to_string())
});

/// Where the finalize endpoint sends the browser on a failure outcome; the
/// user-facing message travels in the `error` query parameter.
pub static SOCIAL_REDIRECT_LOGIN: LazyLock<String> = LazyLock::new(|| {
    env::var("SOCIAL_REDIRECT_LOGIN")
        .ok()
        .unwrap_or("/login".to_string())
});

/// Name of the browser session cookie.
pub static SOCIAL_SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    env::var("SOCIAL_SESSION_COOKIE_NAME")
        .ok()
        .unwrap_or("social_session".to_string())
});

/// Max-Age of the session cookie, in seconds.
pub static SOCIAL_SESSION_COOKIE_MAX_AGE: LazyLock<u64> = LazyLock::new(|| {
    env::var("SOCIAL_SESSION_COOKIE_MAX_AGE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(600)
});
