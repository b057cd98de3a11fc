use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::oauth2::Provider;

/// A local account as seen through the injected [`super::AccountStore`]. The
/// account lifecycle is owned by the host application; this crate only reads
/// accounts and requests creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalAccount {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Fields for a requested account creation. `password` is always concrete at
/// this point: either supplied by the client or generated by the linker.
#[derive(Debug, Clone)]
pub struct NewAccountRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Which "new account" notification to send after a creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewAccountNotice {
    /// The client supplied a password; a standard registration notice.
    Registered,
    /// The account was created with a generated credential; the notice
    /// carries a password-reset token so the user can pick their own.
    RegisteredNoPassword { reset_token: String },
}

/// Persistent mapping from an external identity to a local account.
///
/// `(social_id, type, website_id)` is unique: at most one local account per
/// external identity per website scope. Rows are only ever inserted, never
/// updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct IdentityLink {
    /// Database-assigned row id; `None` until persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub social_id: String,
    pub customer_id: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub link_type: String,
    pub website_id: i64,
    pub created_at: DateTime<Utc>,
}

impl IdentityLink {
    pub fn new(
        provider: Provider,
        external_id: impl Into<String>,
        customer_id: impl Into<String>,
        website_id: i64,
    ) -> Self {
        Self {
            id: None,
            social_id: external_id.into(),
            customer_id: customer_id.into(),
            link_type: provider.as_str().to_string(),
            website_id,
            created_at: Utc::now(),
        }
    }
}
