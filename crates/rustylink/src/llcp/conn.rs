//! Per-connection control block

use super::pdu::VersionInd;
use super::procedure::RequestQueue;
use super::types::{FeatureCache, RequestState, TxBuffer, VersionCache};
use std::collections::VecDeque;

/// Per-connection state owned by the LLCP engine
///
/// Holds the local and remote request FSMs with their pending procedure
/// queues, the per-procedure caches, and the control TX queue the engine
/// appends to. The embedding drains the TX queue toward the lower link layer
/// and returns the buffers to the engine's TX pool.
#[derive(Debug)]
pub struct LlcpConn {
    pub(crate) local: RequestQueue,
    pub(crate) remote: RequestQueue,
    pub(crate) vex: VersionCache,
    pub(crate) feat: FeatureCache,
    pub(crate) tx_queue: VecDeque<TxBuffer>,
}

impl LlcpConn {
    /// Create a connection control block in the disconnected state
    pub fn new() -> Self {
        Self {
            local: RequestQueue::new(),
            remote: RequestQueue::new(),
            vex: VersionCache::default(),
            feat: FeatureCache::default(),
            tx_queue: VecDeque::new(),
        }
    }

    /// State of the local request FSM
    pub fn local_state(&self) -> RequestState {
        self.local.state
    }

    /// State of the remote request FSM
    pub fn remote_state(&self) -> RequestState {
        self.remote.state
    }

    /// Number of locally-initiated procedures queued or active
    pub fn local_pending(&self) -> usize {
        self.local.pending.len()
    }

    /// Number of peer-initiated procedures queued or active
    pub fn remote_pending(&self) -> usize {
        self.remote.pending.len()
    }

    /// Number of control PDUs queued toward the lower link layer
    pub fn tx_pending(&self) -> usize {
        self.tx_queue.len()
    }

    /// Take the next control PDU queued toward the lower link layer.
    ///
    /// The buffer must be returned to the engine with
    /// [`LlcpEngine::release_tx`](super::LlcpEngine::release_tx) once the
    /// lower link layer is done with it.
    pub fn pop_tx(&mut self) -> Option<TxBuffer> {
        self.tx_queue.pop_front()
    }

    /// Version information received from the peer, once valid
    pub fn peer_version(&self) -> Option<VersionInd> {
        if !self.vex.valid {
            return None;
        }
        Some(VersionInd {
            version_number: self.vex.version_number,
            company_id: self.vex.company_id,
            sub_version_number: self.vex.sub_version_number,
        })
    }

    /// Feature set received from the peer, once valid
    pub fn peer_features(&self) -> Option<u64> {
        if !self.feat.valid {
            return None;
        }
        Some(self.feat.features)
    }

    pub(crate) fn push_tx(&mut self, tx: TxBuffer) {
        self.tx_queue.push_back(tx);
    }
}

impl Default for LlcpConn {
    fn default() -> Self {
        Self::new()
    }
}
