//! Post-call processing: transcript → LLM analysis → event reconciliation → call log.
//!
//! Nothing here returns an error to the caller. The voice agent must always
//! get a summary back, so failures are folded into `PostCallReport`.

pub mod analysis;
pub mod orchestrator;
pub mod prompt;
pub mod reconcile;
pub mod types;

pub use analysis::*;
pub use orchestrator::*;
pub use prompt::*;
pub use reconcile::*;
pub use types::*;
