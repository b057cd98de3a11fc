mod errors;
mod store;
mod types;

pub use errors::SessionError;
pub use store::{InMemorySessionStore, SessionStore};
pub use types::{CUSTOMER_ID_KEY, PENDING_SOCIAL_DATA_KEY, PendingSocialData};
