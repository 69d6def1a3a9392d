//! Credential storage: the store trait plus PostgreSQL and in-memory adapters.

mod memory;
mod postgres;
mod store;

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;
pub use store::{CredentialStore, StoreError};
