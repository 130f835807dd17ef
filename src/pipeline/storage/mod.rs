pub mod chunker;
pub mod orchestrator;

pub use chunker::*;
pub use orchestrator::*;
