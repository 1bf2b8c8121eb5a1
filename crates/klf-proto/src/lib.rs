//! Wire protocol for the Velux KLF-200 gateway.
//!
//! The gateway speaks a proprietary binary command protocol over TLS, framed
//! with SLIP (RFC 1055). This crate is the pure codec layer: no I/O, no
//! timers, no sockets. It provides:
//!
//! - [`slip`]: byte-stream framing and deframing with resynchronization
//! - [`wire`]: the payload codec (protocol id, length, command, checksum)
//! - [`Command`]: the 16-bit command table
//! - [`messages`]: typed request/confirmation/notification structs and the
//!   dispatch registry that turns a decoded payload into a [`Response`]
//! - [`fp`]: the symbolic 16-bit functional-parameter encodings
//!
//! Layering mirrors the wire format: a frame is SLIP-delimited, its inner
//! payload carries `protocol_id (1) · length (1) · command (2, BE) ·
//! arguments · checksum (1)`, and the command id selects the argument schema.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod command;
mod error;
pub mod fp;
pub mod messages;
pub mod slip;
pub mod wire;

pub use command::Command;
pub use error::{ArgumentError, FramerOverflow, WireError};
pub use fp::FunctionalParameter;
pub use messages::{GatewayRequest, GatewayResponse, Response, StatusConvention, UnknownFrame};
