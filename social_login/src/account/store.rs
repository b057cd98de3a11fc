use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use super::errors::AccountError;
use super::types::{LocalAccount, NewAccountNotice, NewAccountRequest};

/// The local account datastore, owned by the host application. The linking
/// engine reads accounts, requests creation, and asks for "new account"
/// notifications through this interface; it never manages account lifecycle
/// beyond that.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(
        &self,
        email: &str,
        website_id: i64,
    ) -> Result<Option<LocalAccount>, AccountError>;

    async fn find_by_id(
        &self,
        account_id: &str,
        website_id: i64,
    ) -> Result<Option<LocalAccount>, AccountError>;

    /// Create a new account. A uniqueness violation (e.g. the email was
    /// registered concurrently) must surface as [`AccountError::AlreadyExists`].
    async fn create(
        &self,
        request: NewAccountRequest,
        website_id: i64,
    ) -> Result<LocalAccount, AccountError>;

    async fn notify_new_account(
        &self,
        account: &LocalAccount,
        notice: &NewAccountNotice,
        website_id: i64,
    ) -> Result<(), AccountError>;
}

/// HashMap-backed [`AccountStore`] for demos and tests. Records the
/// notifications it was asked to send.
pub struct InMemoryAccountStore {
    accounts: Mutex<HashMap<(i64, String), LocalAccount>>,
    notices: Mutex<Vec<(String, NewAccountNotice)>>,
    fail_notifications: AtomicBool,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            notices: Mutex::new(Vec::new()),
            fail_notifications: AtomicBool::new(false),
        }
    }

    /// Make every `notify_new_account` call fail, for exercising the
    /// "notification failure never fails login" policy.
    pub fn failing_notifications(self) -> Self {
        self.fail_notifications.store(true, Ordering::Relaxed);
        self
    }

    /// Seed an existing account, as the host application would have created it.
    pub fn with_account(self, account: LocalAccount, website_id: i64) -> Self {
        self.accounts
            .lock()
            .unwrap()
            .insert((website_id, account.email.clone()), account);
        self
    }

    /// Notifications requested so far, as `(account_id, notice)` pairs.
    pub fn notices(&self) -> Vec<(String, NewAccountNotice)> {
        self.notices.lock().unwrap().clone()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_email(
        &self,
        email: &str,
        website_id: i64,
    ) -> Result<Option<LocalAccount>, AccountError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(&(website_id, email.to_string()))
            .cloned())
    }

    async fn find_by_id(
        &self,
        account_id: &str,
        website_id: i64,
    ) -> Result<Option<LocalAccount>, AccountError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|((scope, _), account)| *scope == website_id && account.id == account_id)
            .map(|(_, account)| account.clone()))
    }

    async fn create(
        &self,
        request: NewAccountRequest,
        website_id: i64,
    ) -> Result<LocalAccount, AccountError> {
        let mut accounts = self.accounts.lock().unwrap();
        let key = (website_id, request.email.clone());
        if accounts.contains_key(&key) {
            return Err(AccountError::AlreadyExists(request.email));
        }

        let account = LocalAccount {
            id: uuid::Uuid::new_v4().to_string(),
            email: request.email,
            first_name: request.first_name,
            last_name: request.last_name,
        };
        accounts.insert(key, account.clone());
        Ok(account)
    }

    async fn notify_new_account(
        &self,
        account: &LocalAccount,
        notice: &NewAccountNotice,
        _website_id: i64,
    ) -> Result<(), AccountError> {
        if self.fail_notifications.load(Ordering::Relaxed) {
            return Err(AccountError::Notification(
                "mail transport unavailable".to_string(),
            ));
        }
        self.notices
            .lock()
            .unwrap()
            .push((account.id.clone(), notice.clone()));
        Ok(())
    }
}
