//! API endpoint handlers.
//!
//! Pipelines and stores are synchronous; handlers move that work onto the
//! blocking pool.

pub mod documents;
pub mod events;
pub mod health;
pub mod voice;
