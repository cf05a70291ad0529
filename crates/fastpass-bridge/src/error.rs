//! Error types for the bridge layer.

/// Errors that can occur while wiring up a Bedrock bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The bridge plugin is installed but the host could not hand us its API.
    #[error("{plugin} is installed but its API is unavailable")]
    Unavailable { plugin: String },
}
