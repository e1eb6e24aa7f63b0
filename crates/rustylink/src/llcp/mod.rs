//! Link Layer Control Protocol (LLCP) procedure engine
//!
//! This module implements the control procedure engine of the upper link
//! layer, which is responsible for:
//! - Serializing locally- and peer-initiated control procedures per
//!   connection
//! - Encoding and decoding LL control PDUs
//! - Surviving TX and notification buffer starvation without losing
//!   progress
//! - Resolving collisions when both peers start the same procedure

pub mod constants;

mod conn;
mod core;
mod local;
mod pdu;
mod pool;
mod procedure;
mod remote;
mod types;


// Re-export public API
pub use self::conn::LlcpConn;
pub use self::core::LlcpEngine;
pub use self::pdu::{
    encode_feature_req, encode_feature_rsp, encode_reject_ext_ind, encode_reject_ind,
    encode_unknown_rsp, encode_version_ind, peek_opcode, ControlPdu, FeatureSet, RejectExtInd,
    RejectInd, UnknownRsp, VersionInd,
};
pub use self::pool::Pool;
pub use self::procedure::{ProcContext, ProcState, ProcedureKind};
pub use self::types::{
    EngineConfig, FeatureCache, LinkSettings, Notification, ProcedureResult, RequestState,
    TxBuffer, VersionCache,
};
