use http::HeaderMap;
use http::header::SET_COOKIE;

use social_login::gen_random_string;

use super::config::{SOCIAL_SESSION_COOKIE_MAX_AGE, SOCIAL_SESSION_COOKIE_NAME};

/// Read the browser session id from the request cookies, if present. The
/// Cookie header itself is optional; a first visit has none.
pub(super) fn session_id_from_cookies(cookies: Option<&headers::Cookie>) -> Option<String> {
    cookies
        .and_then(|c| c.get(SOCIAL_SESSION_COOKIE_NAME.as_str()))
        .map(|v| v.to_string())
}

/// Session id to use for this request: the cookie value, or a fresh one
/// (returned with `true` so the caller knows to set the cookie).
pub(super) fn ensure_session_id(
    cookies: Option<&headers::Cookie>,
) -> Result<(String, bool), social_login::UtilError> {
    match session_id_from_cookies(cookies) {
        Some(id) => Ok((id, false)),
        None => Ok((gen_random_string(32)?, true)),
    }
}

/// Append a Set-Cookie header carrying the session id.
pub(super) fn set_session_cookie(headers: &mut HeaderMap, session_id: &str) {
    let cookie = format!(
        "{}={}; SameSite=Lax; Secure; HttpOnly; Path=/; Max-Age={}",
        SOCIAL_SESSION_COOKIE_NAME.as_str(),
        session_id,
        *SOCIAL_SESSION_COOKIE_MAX_AGE
    );
    if let Ok(value) = cookie.parse() {
        headers.append(SET_COOKIE, value);
    } else {
        tracing::error!("Failed to build session cookie header");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_session_cookie_attributes() {
        let mut headers = HeaderMap::new();
        set_session_cookie(&mut headers, "abc123");

        let cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("abc123"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Secure"));
    }
}
