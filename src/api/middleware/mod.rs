//! API middleware.
//!
//! Execution order (outermost → innermost):
//! 1. Audit logger: every request, with final status
//! 2. Signature verifier: webhook route only, before the body is parsed

pub mod audit;
pub mod signature;
