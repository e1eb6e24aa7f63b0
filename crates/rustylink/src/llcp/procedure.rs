//! Procedure contexts and per-side request queues

use super::constants::*;
use super::types::{ProcedureResult, RequestState};
use std::collections::VecDeque;

/// Identifies an LLCP control procedure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcedureKind {
    #[default]
    Unknown,
    VersionExchange,
    FeatureExchange,
}

impl ProcedureKind {
    /// Map an incoming request opcode to the procedure it starts
    pub(crate) fn from_request_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            LL_VERSION_IND => Some(ProcedureKind::VersionExchange),
            LL_FEATURE_REQ => Some(ProcedureKind::FeatureExchange),
            _ => None,
        }
    }
}

/// Common FSM state of an in-flight procedure; both roles use the same set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcState {
    #[default]
    Idle,
    /// Parked until a TX buffer becomes available or a pause is lifted
    WaitTx,
    /// Waiting for a PDU from the peer
    WaitRx,
    /// Parked until a notification buffer becomes available
    WaitNtf,
}

/// One in-flight or pending procedure
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcContext {
    pub kind: ProcedureKind,
    pub state: ProcState,
    /// Opcode this procedure expects to receive next; drives RX routing.
    /// `None` until the request PDU has been queued for transmission.
    pub expected_opcode: Option<u8>,
    /// Completion result pending delivery to the host
    pub result: ProcedureResult,
    /// The procedure was overtaken by the same procedure from the peer
    pub collision: bool,
    /// Transmission is held back (encryption pause)
    pub pause: bool,
}

impl ProcContext {
    /// Re-arm a pool slot for a new procedure
    pub(crate) fn reset(&mut self, kind: ProcedureKind) {
        *self = ProcContext {
            kind,
            ..ProcContext::default()
        };
    }
}

/// FIFO of pending procedures plus the request FSM state for one side
#[derive(Debug)]
pub(crate) struct RequestQueue {
    pub(crate) state: RequestState,
    pub(crate) pending: VecDeque<ProcContext>,
}

impl RequestQueue {
    pub(crate) fn new() -> Self {
        Self {
            state: RequestState::Disconnected,
            pending: VecDeque::new(),
        }
    }
}
