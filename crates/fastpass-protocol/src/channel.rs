//! Namespaced channel identifiers.
//!
//! Plugin messages share one flat channel namespace with the game itself
//! and with every other proxy plugin. Prefixing our message names with the
//! plugin's own name keeps them apart:
//!
//! ```text
//!   fastpass:switch-mode
//!   ────┬─── ─────┬─────
//!   namespace   name
//! ```

use std::fmt;

use crate::ProtocolError;

/// Separator between namespace and name in the combined form.
pub const SEPARATOR: char = ':';

/// An immutable `(namespace, name)` pair identifying one plugin channel.
///
/// The namespace is lower-cased on construction because hosts compare
/// channel names case-sensitively and backends register them lower-case.
/// A namespace must be non-empty and must not contain [`SEPARATOR`]; the
/// name may. Check untrusted namespaces with
/// [`NamespaceKey::validate_namespace`] first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceKey {
    namespace: String,
    name: String,
    combined: String,
}

impl NamespaceKey {
    /// Checks that `namespace` can head a combined channel name.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidNamespace`] if it is empty or contains
    /// [`SEPARATOR`], since [`parse`](Self::parse) could not split such a
    /// name back into the same parts.
    pub fn validate_namespace(namespace: &str) -> Result<(), ProtocolError> {
        if namespace.is_empty() || namespace.contains(SEPARATOR) {
            return Err(ProtocolError::InvalidNamespace(namespace.to_owned()));
        }
        Ok(())
    }

    /// Creates a key from its two parts.
    ///
    /// `namespace` is expected to pass
    /// [`validate_namespace`](Self::validate_namespace).
    pub fn new(namespace: &str, name: &str) -> Self {
        debug_assert!(
            Self::validate_namespace(namespace).is_ok(),
            "namespace must be non-empty and free of the separator"
        );
        let namespace = namespace.to_lowercase();
        let combined = format!("{namespace}{SEPARATOR}{name}");
        Self {
            namespace,
            name: name.to_owned(),
            combined,
        }
    }

    /// Returns the combined `<namespace>:<name>` form without building a key.
    pub fn combine(namespace: &str, name: &str) -> String {
        format!("{}{SEPARATOR}{name}", namespace.to_lowercase())
    }

    /// Splits a combined channel name at the first separator.
    ///
    /// Returns `None` when there is no separator or either half is empty.
    pub fn parse(combined: &str) -> Option<Self> {
        let (namespace, name) = combined.split_once(SEPARATOR)?;
        if namespace.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(namespace, name))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `<namespace>:<name>` string registered with the host.
    pub fn combined_name(&self) -> &str {
        &self.combined
    }
}

impl fmt::Display for NamespaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.combined)
    }
}
