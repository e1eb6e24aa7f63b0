//! Error types for the rustylink library
//!
//! This module defines the error types used throughout the library.

use thiserror::Error;

/// Errors surfaced by the LLCP procedure engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlcpError {
    #[error("Command disallowed: no procedure context available")]
    CommandDisallowed,

    #[error("Invalid control PDU format")]
    InvalidPdu,

    #[error("Unknown control opcode: 0x{0:02X}")]
    UnknownOpcode(u8),

    #[error("Protocol violation: {0}")]
    ProtocolViolation(&'static str),
}

/// Result type for LLCP engine operations
pub type LlcpResult<T> = Result<T, LlcpError>;
