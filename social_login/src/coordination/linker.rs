use std::sync::Arc;
use thiserror::Error;

use crate::account::{
    AccountError, AccountStore, IdentityLink, LinkStore, NewAccountNotice, NewAccountRequest,
};
use crate::oauth2::ExternalIdentity;
use crate::utils::gen_random_string;

/// Placeholder names for profiles that attest neither a usable display name
/// nor explicit first/last fields. Accounts are never created with empty names.
const FALLBACK_FIRST_NAME: &str = "New";
const FALLBACK_LAST_NAME: &str = "User";

/// User-recoverable failures of the linking decision. Infrastructure
/// failures travel separately as [`LinkError::Storage`].
#[derive(Debug, Error, Clone)]
pub enum LinkError {
    /// No existing link and the profile carries no email: nothing can be
    /// safely created or merged. The caller prompts the user; no record is
    /// written.
    #[error("External profile has no email address")]
    NeedsEmail,

    /// Persistence rejected the link or account creation (typically a
    /// uniqueness race). Reported to the user, never retried automatically.
    #[error("Account conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// How the linker arrived at the resolved account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDisposition {
    /// A link for `(provider, external_id, scope)` already existed.
    ExistingLink,
    /// No link existed; an account with the same verified email was bound.
    LinkedByEmail,
    /// No link and no matching account; a new local account was created.
    Created,
}

#[derive(Debug, Clone)]
pub struct LinkedAccount {
    pub account_id: String,
    pub disposition: LinkDisposition,
}

/// The account-linking decision engine: given a verified external identity
/// and a website scope, decides whether to reuse an existing link, bind by
/// email, or create a local account, and persists the link.
pub struct AccountLinker {
    accounts: Arc<dyn AccountStore>,
    links: Arc<dyn LinkStore>,
}

impl AccountLinker {
    pub fn new(accounts: Arc<dyn AccountStore>, links: Arc<dyn LinkStore>) -> Self {
        Self { accounts, links }
    }

    /// Resolve `identity` to a local account within `website_id`.
    ///
    /// The external-id match always wins over the email match: once an
    /// identity is linked, a changed profile email can never move it to a
    /// different local account.
    pub async fn resolve(
        &self,
        identity: &ExternalIdentity,
        password: Option<&str>,
        website_id: i64,
    ) -> Result<LinkedAccount, LinkError> {
        // 1. Returning user: a link for this external identity exists
        if let Some(link) = self
            .links
            .find(identity.provider, &identity.external_id, website_id)
            .await
            .map_err(lookup_error)?
        {
            tracing::debug!(
                "Existing link for {}:{} resolves to account {}",
                identity.provider,
                identity.external_id,
                link.customer_id
            );
            return Ok(LinkedAccount {
                account_id: link.customer_id,
                disposition: LinkDisposition::ExistingLink,
            });
        }

        // 2. No link and no email: refuse rather than guess
        let Some(email) = identity.email.as_deref() else {
            tracing::debug!(
                "No email attested for {}:{}, cannot link",
                identity.provider,
                identity.external_id
            );
            return Err(LinkError::NeedsEmail);
        };

        // 3. Bind by verified email, or create a fresh account
        let existing = self
            .accounts
            .find_by_email(email, website_id)
            .await
            .map_err(lookup_error)?;

        match existing {
            Some(account) => {
                // 3a. Merge onto the existing account; its credentials are
                // left untouched
                self.links
                    .insert(IdentityLink::new(
                        identity.provider,
                        identity.external_id.clone(),
                        account.id.clone(),
                        website_id,
                    ))
                    .await
                    .map_err(persistence_error)?;

                tracing::debug!(
                    "Linked {}:{} to existing account {}",
                    identity.provider,
                    identity.external_id,
                    account.id
                );
                Ok(LinkedAccount {
                    account_id: account.id,
                    disposition: LinkDisposition::LinkedByEmail,
                })
            }
            None => {
                // 3b. Create a new local account, then the link
                let account = self
                    .create_account(identity, email, password, website_id)
                    .await?;

                self.links
                    .insert(IdentityLink::new(
                        identity.provider,
                        identity.external_id.clone(),
                        account.id.clone(),
                        website_id,
                    ))
                    .await
                    .map_err(persistence_error)?;

                tracing::debug!(
                    "Created account {} for {}:{}",
                    account.id,
                    identity.provider,
                    identity.external_id
                );
                Ok(LinkedAccount {
                    account_id: account.id,
                    disposition: LinkDisposition::Created,
                })
            }
        }
    }

    async fn create_account(
        &self,
        identity: &ExternalIdentity,
        email: &str,
        password: Option<&str>,
        website_id: i64,
    ) -> Result<crate::account::LocalAccount, LinkError> {
        let (first_name, last_name) = derive_names(identity);

        let (password, notice) = match password {
            Some(supplied) => (supplied.to_string(), NewAccountNotice::Registered),
            None => {
                let generated =
                    gen_random_string(32).map_err(|e| LinkError::Storage(e.to_string()))?;
                let reset_token =
                    gen_random_string(32).map_err(|e| LinkError::Storage(e.to_string()))?;
                (
                    generated,
                    NewAccountNotice::RegisteredNoPassword { reset_token },
                )
            }
        };

        let account = self
            .accounts
            .create(
                NewAccountRequest {
                    first_name,
                    last_name,
                    email: email.to_string(),
                    password,
                },
                website_id,
            )
            .await
            .map_err(persistence_error)?;

        // Welcome mail is best-effort; login never depends on it
        if let Err(e) = self
            .accounts
            .notify_new_account(&account, &notice, website_id)
            .await
        {
            tracing::warn!(
                "Failed to send new-account notification for {}: {}",
                account.id,
                e
            );
        }

        Ok(account)
    }
}

/// Derive a non-empty `(first, last)` name pair from the identity: a combined
/// display name splits on its first space, explicit fields come next, and
/// placeholders fill whatever remains.
pub(crate) fn derive_names(identity: &ExternalIdentity) -> (String, String) {
    let explicit_first = identity
        .first_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let explicit_last = identity
        .last_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    if let Some(display) = identity
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
    {
        return match display.split_once(' ') {
            Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
            None => (
                display.to_string(),
                explicit_last.unwrap_or(FALLBACK_LAST_NAME).to_string(),
            ),
        };
    }

    (
        explicit_first.unwrap_or(FALLBACK_FIRST_NAME).to_string(),
        explicit_last.unwrap_or(FALLBACK_LAST_NAME).to_string(),
    )
}

fn lookup_error(e: AccountError) -> LinkError {
    LinkError::Storage(e.to_string())
}

// Persistence refusals during creation/linking are conflicts the user
// resolves, not infrastructure failures.
fn persistence_error(e: AccountError) -> LinkError {
    match e {
        AccountError::AlreadyExists(what) => LinkError::Conflict(format!(
            "An account for this identity already exists: {what}"
        )),
        other => LinkError::Conflict(other.to_string()),
    }
}
