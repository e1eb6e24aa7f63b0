//! RustyLink - A Rust library for the BLE controller upper link layer
//!
//! This library implements the Link Layer Control Protocol (LLCP) procedure
//! engine of a Bluetooth Low Energy controller. It multiplexes concurrent
//! control procedures (version exchange, feature exchange, ...) over the
//! serialized control channel of a connection, survives transmit and
//! notification buffer starvation, and resolves collisions when both peers
//! initiate the same procedure.

pub mod error;
pub mod llcp;

// Re-export common types for convenience
pub use error::{LlcpError, LlcpResult};
pub use llcp::{
    EngineConfig, LinkSettings, LlcpConn, LlcpEngine, Notification, ProcedureKind,
    ProcedureResult, RequestState,
};
