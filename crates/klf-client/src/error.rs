//! Client error types.

use thiserror::Error;

use crate::session::NoSessionIdAvailable;

/// Errors surfaced by gateway operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The connection to the gateway is gone; every pending operation fails
    /// with this.
    #[error("gateway connection closed")]
    TransportClosed,

    /// All 65536 session ids are live.
    #[error(transparent)]
    NoSessionId(#[from] NoSessionIdAvailable),

    /// The gateway answered a request with a failure status.
    #[error("gateway rejected {operation}: status {status}")]
    Rejected {
        /// Operation that was refused.
        operation: &'static str,
        /// Raw status byte from the confirmation.
        status: u8,
    },

    /// Another collector is already consuming this notification stream. The
    /// gateway's non-session streams carry no discriminator, so their
    /// stream slots are single-consumer.
    #[error("another collector is already consuming this notification stream")]
    CollectorBusy,

    /// A waiter keyed on a confirmation command received a different message.
    /// Indicates a registry bug, not a gateway fault.
    #[error("unexpected response for command {expected:#06x}")]
    UnexpectedResponse {
        /// Command id the waiter was keyed on.
        expected: u16,
    },

    /// The gateway host string is not a valid TLS server name.
    #[error("invalid gateway address: {0}")]
    Address(String),

    /// Socket-level failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
