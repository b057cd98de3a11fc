use async_trait::async_trait;
use std::sync::Mutex;

use super::errors::AccountError;
use super::types::IdentityLink;
use crate::oauth2::Provider;

/// Persistence for [`IdentityLink`] rows. Insert-only: links are created on
/// first successful linking and read on every subsequent login; the unique
/// `(social_id, type, website_id)` constraint is enforced by the store and
/// surfaces as [`AccountError::AlreadyExists`].
#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn find(
        &self,
        provider: Provider,
        external_id: &str,
        website_id: i64,
    ) -> Result<Option<IdentityLink>, AccountError>;

    async fn insert(&self, link: IdentityLink) -> Result<IdentityLink, AccountError>;
}

/// Vec-backed [`LinkStore`] for demos and tests.
pub struct InMemoryLinkStore {
    links: Mutex<Vec<IdentityLink>>,
}

impl InMemoryLinkStore {
    pub fn new() -> Self {
        Self {
            links: Mutex::new(Vec::new()),
        }
    }

    pub fn link_count(&self) -> usize {
        self.links.lock().unwrap().len()
    }
}

impl Default for InMemoryLinkStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkStore for InMemoryLinkStore {
    async fn find(
        &self,
        provider: Provider,
        external_id: &str,
        website_id: i64,
    ) -> Result<Option<IdentityLink>, AccountError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|link| {
                link.link_type == provider.as_str()
                    && link.social_id == external_id
                    && link.website_id == website_id
            })
            .cloned())
    }

    async fn insert(&self, mut link: IdentityLink) -> Result<IdentityLink, AccountError> {
        let mut links = self.links.lock().unwrap();
        let duplicate = links.iter().any(|existing| {
            existing.link_type == link.link_type
                && existing.social_id == link.social_id
                && existing.website_id == link.website_id
        });
        if duplicate {
            return Err(AccountError::AlreadyExists(format!(
                "{}:{}",
                link.link_type, link.social_id
            )));
        }

        link.id = Some(links.len() as i64 + 1);
        links.push(link.clone());
        Ok(link)
    }
}
