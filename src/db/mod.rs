pub mod memory;
pub mod postgrest;
pub mod repository;
pub mod sqlite;
pub mod store;

pub use memory::MemoryStore;
pub use postgrest::PostgrestStore;
pub use sqlite::*;
pub use store::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Invalid stored value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Remote store returned error (status {status}): {body}")]
    Remote { status: u16, body: String },

    #[error("Remote store request failed: {0}")]
    Http(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}
