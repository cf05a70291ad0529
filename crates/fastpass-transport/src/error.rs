/// Errors reported by the host when handing data to a connection.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection was closed before the data could be queued.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// The host refused to queue the payload.
    #[error("send failed on channel {channel}: {reason}")]
    SendFailed {
        /// Combined channel name the payload was destined for.
        channel: String,
        /// Host-provided description of the failure.
        reason: String,
    },
}
