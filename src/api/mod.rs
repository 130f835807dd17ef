//! HTTP surface of the CareFlow backend.
//!
//! Care-plan upload and ingestion, event tracking for the dashboard, and
//! the voice-agent endpoints (live Q&A and the signed post-call webhook).

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::careflow_router;
pub use server::{serve, serve_on};
pub use types::ApiContext;
