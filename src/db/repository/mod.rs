//! Repository layer: entity-scoped SQLite operations over a borrowed connection.

mod call_log;
mod document_chunk;
mod event;

pub use call_log::*;
pub use document_chunk::*;
pub use event::*;
