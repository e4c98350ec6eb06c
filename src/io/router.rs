//! Ordered router registry: location string → storage handler.
//!
//! Save and load routers are kept in separate lists. Resolution tries each
//! router in registration order and returns the first handler produced.
//! Routers only inspect the string; they never touch the filesystem or
//! network.

use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use super::error::IoError;
use super::file_system::file_system_router;
use super::handler::IoHandler;
use super::http::{HttpContext, HttpRouter};
use crate::config::EnvConfig;

/// A matcher producing a handler for locations it recognizes.
pub type Router = Arc<dyn Fn(&str) -> Option<Box<dyn IoHandler>> + Send + Sync>;

/// Thread-safe router lists for save and load.
pub struct RouterRegistry {
    save_routers: RwLock<Vec<Router>>,
    load_routers: RwLock<Vec<Router>>,
}

impl RouterRegistry {
    pub fn new() -> Self {
        Self {
            save_routers: RwLock::new(Vec::new()),
            load_routers: RwLock::new(Vec::new()),
        }
    }

    /// Registry with the filesystem and HTTP routers installed, in that order.
    pub fn with_defaults(config: &EnvConfig) -> Result<Self, IoError> {
        let registry = Self::new();
        register_default_routers(&registry, config)?;
        Ok(registry)
    }

    /// Append a save router (lowest priority so far).
    pub fn register_save_router<F>(&self, router: F)
    where
        F: Fn(&str) -> Option<Box<dyn IoHandler>> + Send + Sync + 'static,
    {
        self.save_routers.write().push(Arc::new(router));
    }

    /// Append a load router (lowest priority so far).
    pub fn register_load_router<F>(&self, router: F)
    where
        F: Fn(&str) -> Option<Box<dyn IoHandler>> + Send + Sync + 'static,
    {
        self.load_routers.write().push(Arc::new(router));
    }

    /// Resolve the handler used to save to `location`.
    pub fn save_handler(&self, location: &str) -> Result<Box<dyn IoHandler>, IoError> {
        resolve(&self.save_routers.read(), location)
    }

    /// Resolve the handler used to load from `location`.
    pub fn load_handler(&self, location: &str) -> Result<Box<dyn IoHandler>, IoError> {
        resolve(&self.load_routers.read(), location)
    }

    pub fn save_router_count(&self) -> usize {
        self.save_routers.read().len()
    }

    pub fn load_router_count(&self) -> usize {
        self.load_routers.read().len()
    }
}

impl Default for RouterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve(routers: &[Router], location: &str) -> Result<Box<dyn IoHandler>, IoError> {
    routers
        .iter()
        .find_map(|router| router(location))
        .ok_or_else(|| IoError::UnresolvedLocation(location.to_string()))
}

/// Install the filesystem router, then the HTTP router, for both save and
/// load. HTTP handlers reject `save` with `NotImplemented`.
///
/// Fails with `InvalidConfig` if the HTTP client settings are unusable;
/// nothing is registered in that case.
pub fn register_default_routers(registry: &RouterRegistry, config: &EnvConfig) -> Result<(), IoError> {
    let http = HttpRouter::new(HttpContext {
        environment: config.environment.shared(),
        client: config.http.clone(),
    })?;

    registry.register_save_router(file_system_router);
    registry.register_load_router(file_system_router);

    let save_http = http.clone();
    registry.register_save_router(move |location| save_http.route(location));
    registry.register_load_router(move |location| http.route(location));

    tracing::debug!(
        save_routers = registry.save_router_count(),
        load_routers = registry.load_router_count(),
        "registered default routers"
    );
    Ok(())
}

static GLOBAL: OnceLock<RouterRegistry> = OnceLock::new();

/// Initialize the process-wide registry with the default routers.
///
/// Only the first successful call registers; later calls return the same
/// registry and ignore `config`.
pub fn init_global(config: &EnvConfig) -> Result<&'static RouterRegistry, IoError> {
    if let Some(registry) = GLOBAL.get() {
        return Ok(registry);
    }
    let registry = RouterRegistry::with_defaults(config)?;
    // A racing initializer may have won; its registry is kept.
    Ok(GLOBAL.get_or_init(|| registry))
}

/// The process-wide registry, initialized from the environment on first use.
pub fn global() -> Result<&'static RouterRegistry, IoError> {
    match GLOBAL.get() {
        Some(registry) => Ok(registry),
        None => init_global(&crate::config::load()),
    }
}
