//! Axum integration for the `social-login` crate: the connect, callback and
//! finalize endpoints, session-cookie plumbing and the popup-close page.
//!
//! Mount the router under [`SOCIAL_ROUTE_PREFIX`]:
//!
//! ```ignore
//! let app = Router::new()
//!     .nest(SOCIAL_ROUTE_PREFIX.as_str(), social_login_router(state));
//! ```

mod config;
mod error;
mod oauth2;
mod session;

pub use config::{
    SOCIAL_REDIRECT_HOME, SOCIAL_REDIRECT_LOGIN, SOCIAL_SESSION_COOKIE_MAX_AGE,
    SOCIAL_SESSION_COOKIE_NAME,
};
pub use oauth2::{SocialLoginState, social_login_router};

// Re-export the route prefix so hosts can nest the router without also
// depending on the core crate directly.
pub use social_login::SOCIAL_ROUTE_PREFIX;
