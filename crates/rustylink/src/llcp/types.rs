//! Type definitions for the LLCP engine

use super::constants::*;
use super::pdu::ControlPdu;
use super::procedure::ProcedureKind;

/// Lifecycle state of the request FSM on one side of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Link not connected; no procedures are admitted
    Disconnected,
    /// Connected with no procedure in flight on this side
    Idle,
    /// The head of the pending queue is the active procedure
    Active,
}

/// Cached outcome of the version exchange procedure on a connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VersionCache {
    /// The cached triple below was received from the peer
    pub valid: bool,
    /// An LL_VERSION_IND has been queued for transmission on this connection.
    /// The Link Layer sends at most one per connection.
    pub sent: bool,
    pub version_number: u8,
    pub company_id: u16,
    pub sub_version_number: u16,
}

/// Cached outcome of the feature exchange procedure on a connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureCache {
    pub valid: bool,
    pub features: u64,
}

/// Identity values encoded into locally-originated control PDUs
#[derive(Debug, Clone, Copy)]
pub struct LinkSettings {
    pub company_id: u16,
    pub subversion_number: u16,
    pub features: u64,
}

impl LinkSettings {
    /// Company identifier encoded into LL_VERSION_IND
    pub fn company_id(&self) -> u16 {
        self.company_id
    }

    /// Implementation sub-version encoded into LL_VERSION_IND
    pub fn subversion_number(&self) -> u16 {
        self.subversion_number
    }

    /// Local feature set encoded into LL_FEATURE_REQ / LL_FEATURE_RSP
    pub fn features(&self) -> u64 {
        self.features
    }
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            // Reserved test company identifier
            company_id: 0xFFFF,
            subversion_number: 0x0000,
            features: 0,
        }
    }
}

/// Pool capacities and link settings for engine construction
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub proc_ctx_count: usize,
    pub tx_buffer_count: usize,
    pub ntf_buffer_count: usize,
    pub settings: LinkSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            proc_ctx_count: DEFAULT_PROC_CTX_COUNT,
            tx_buffer_count: DEFAULT_TX_BUFFER_COUNT,
            ntf_buffer_count: DEFAULT_NTF_BUFFER_COUNT,
            settings: LinkSettings::default(),
        }
    }
}

/// Outcome of a completed procedure, carried by its host notification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcedureResult {
    /// The exchange completed and the connection cache holds the result
    #[default]
    Success,
    /// The peer answered with LL_REJECT_IND or LL_REJECT_EXT_IND
    RejectedByPeer(u8),
    /// The peer answered with LL_UNKNOWN_RSP
    UnsupportedByPeer,
}

/// Pool element: an outbound control PDU on its way to the lower link layer
#[derive(Debug, Clone, Default)]
pub struct TxBuffer {
    pub pdu: ControlPdu,
}

/// Pool element: a host-bound procedure completion notification
///
/// On success the PDU is encoded from the connection cache; error results
/// carry an empty PDU.
#[derive(Debug, Clone, Default)]
pub struct Notification {
    pub kind: ProcedureKind,
    pub result: ProcedureResult,
    pub pdu: ControlPdu,
}
