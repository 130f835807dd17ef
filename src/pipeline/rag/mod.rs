//! Care-plan question answering over stored document chunks.

pub mod orchestrator;
pub mod prompt;
pub mod retrieval;

pub use orchestrator::*;
pub use prompt::*;
pub use retrieval::*;
