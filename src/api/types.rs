//! Shared handler context.

use std::sync::Arc;

use crate::core_state::CoreState;

/// State handed to every handler and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}
