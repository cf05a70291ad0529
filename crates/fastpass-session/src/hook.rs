//! Startup-time selection of the auth plugin adapter.
//!
//! The registry is an ordered list of `(plugin name, factory)` pairs. At
//! startup [`HookRegistry::select`] walks the list once; the first plugin
//! that is installed gets its factory called, and the scan stops there
//! whether or not the factory succeeds.

use std::fmt;
use std::sync::Arc;

use crate::{AuthPlugin, SessionError};

/// Builds an adapter from a reference to the host plugin.
pub type HookFactory<H> =
    Box<dyn Fn(&H) -> Result<Arc<dyn AuthPlugin>, SessionError> + Send + Sync>;

struct HookCandidate<H: ?Sized> {
    plugin_name: String,
    factory: HookFactory<H>,
}

/// Ordered list of known auth plugin adapters.
///
/// `H` is whatever the adapters need to be constructed from, typically
/// the host plugin handle.
pub struct HookRegistry<H: ?Sized> {
    candidates: Vec<HookCandidate<H>>,
}

impl<H: ?Sized> HookRegistry<H> {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    /// Appends a candidate. Candidates are probed in insertion order.
    pub fn with_candidate(
        mut self,
        plugin_name: impl Into<String>,
        factory: impl Fn(&H) -> Result<Arc<dyn AuthPlugin>, SessionError> + Send + Sync + 'static,
    ) -> Self {
        self.candidates.push(HookCandidate {
            plugin_name: plugin_name.into(),
            factory: Box::new(factory),
        });
        self
    }

    /// Plugin names in probe order.
    pub fn plugin_names(&self) -> impl Iterator<Item = &str> {
        self.candidates.iter().map(|c| c.plugin_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Finds the first installed plugin and builds its adapter.
    ///
    /// A factory error is logged and treated as "no hook": later
    /// candidates are not tried, and startup carries on without one.
    pub fn select(
        &self,
        host: &H,
        is_installed: impl Fn(&str) -> bool,
    ) -> Option<Arc<dyn AuthPlugin>> {
        let candidate = self
            .candidates
            .iter()
            .find(|c| is_installed(&c.plugin_name))?;

        tracing::info!(plugin = %candidate.plugin_name, "hooking into auth plugin");
        match (candidate.factory)(host) {
            Ok(hook) => Some(hook),
            Err(e) => {
                tracing::error!(
                    plugin = %candidate.plugin_name,
                    error = %e,
                    "couldn't load the auth hook"
                );
                None
            }
        }
    }
}

impl<H: ?Sized> Default for HookRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized> fmt::Debug for HookRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.plugin_names()).finish()
    }
}
