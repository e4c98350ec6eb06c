//! Execution environment capability.
//!
//! The HTTP handler only runs inside a server-side runtime; embedders that
//! host the crate elsewhere report `false` and the HTTP backend stays off.

use std::sync::Arc;

/// Query surface for the hosting process.
pub trait Environment: Send + Sync {
    fn is_server_runtime(&self) -> bool;
}

/// Environment backed by a fixed flag, normally read from config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessEnvironment {
    server_runtime: bool,
}

impl ProcessEnvironment {
    pub fn new(server_runtime: bool) -> Self {
        Self { server_runtime }
    }

    pub fn shared(self) -> Arc<dyn Environment> {
        Arc::new(self)
    }
}

impl Default for ProcessEnvironment {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Environment for ProcessEnvironment {
    fn is_server_runtime(&self) -> bool {
        self.server_runtime
    }
}
