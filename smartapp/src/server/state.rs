//! Server state

use std::sync::Arc;

use crate::dispatch::LifecycleDispatcher;

/// Server state shared across handlers
pub struct ServerState {
    pub dispatcher: Arc<LifecycleDispatcher>,
}

impl ServerState {
    pub fn new(dispatcher: Arc<LifecycleDispatcher>) -> Self {
        Self { dispatcher }
    }
}
