//! Async client for the Velux KLF-200 gateway.
//!
//! The gateway accepts one long-lived TLS connection and multiplexes every
//! operation over it: requests are answered by confirmations, multi-step
//! operations additionally stream notifications. This crate owns that
//! connection and the bookkeeping around it:
//!
//! - [`GatewayClient`]: serializes outbound frames, correlates confirmations
//!   with their requests, fans notifications out to subscribers, and keeps
//!   the link alive
//! - [`Collector`]: harvests a notification stream up to its terminator
//! - [`SessionPool`]: allocates the 16-bit session ids that tag actuator
//!   commands
//! - [`transport`]: TLS connection setup (trust-all; the gateway certificate
//!   is self-signed)
//!
//! The client is generic over its byte stream, so tests drive it over an
//! in-memory duplex pipe while production uses the TLS transport.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod collector;
mod error;
mod session;
pub mod transport;

pub use client::{CommandRun, GatewayClient, LinkState, ResponseWaiter, KEEP_ALIVE_INTERVAL};
pub use collector::Collector;
pub use error::ClientError;
pub use session::{NoSessionIdAvailable, SessionPool};
