//! REST bridge for the Velux KLF-200 gateway.
//!
//! Translates a small JSON/HTTP API into gateway exchanges over one shared
//! [`klf_client::GatewayClient`]: enumeration and activation of actuator
//! nodes, version and network queries, clock management, and controller
//! copy. The binary in `main.rs` wires CLI configuration, logging, the
//! gateway connection, and the HTTP listener together.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod rest;

pub use rest::router;
