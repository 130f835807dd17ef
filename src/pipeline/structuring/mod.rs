pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod types;

pub use orchestrator::*;
pub use parser::*;
pub use prompt::*;
pub use types::*;
