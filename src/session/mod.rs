mod models;
mod store;
pub use models::{Message, Role, Session, SessionMeta};
pub use store::{SessionStore, StoreError};
