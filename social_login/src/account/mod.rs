mod errors;
mod link_store;
mod sqlite;
mod store;
mod types;

pub use errors::AccountError;
pub use link_store::{InMemoryLinkStore, LinkStore};
pub use sqlite::SqliteLinkStore;
pub use store::{AccountStore, InMemoryAccountStore};
pub use types::{IdentityLink, LocalAccount, NewAccountNotice, NewAccountRequest};
