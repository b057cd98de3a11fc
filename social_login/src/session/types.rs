use serde::{Deserialize, Serialize};

use crate::oauth2::ExternalIdentity;

/// Session key under which the verified-but-not-yet-linked identity waits
/// between the callback and the finalize step.
pub const PENDING_SOCIAL_DATA_KEY: &str = "social_user_data";

/// Session key holding the id of the logged-in local account.
pub const CUSTOMER_ID_KEY: &str = "customer_id";

/// Transient payload carrying a just-verified identity from the callback to
/// the finalize step. Written by `handle_callback`, consumed exactly once by
/// `finalize`, cleared regardless of the finalize outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingSocialData {
    pub identity: ExternalIdentity,
    /// Password supplied by the client alongside the social profile; when
    /// absent a random credential is generated on account creation.
    pub password: Option<String>,
    /// Website scope the callback was served under; linking happens within it.
    pub website_id: i64,
}
