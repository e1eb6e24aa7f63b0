//! LLCP protocol constants
//!
//! This module contains opcodes and sizing constants for LL control PDUs,
//! plus the default pool capacities of the procedure engine.

// LLID value carried in the low bits of the data PDU header
pub const LLID_CTRL: u8 = 0x03;
pub const LLID_MASK: u8 = 0x03;

// LL Control PDU opcodes
pub const LL_CONNECTION_UPDATE_REQ: u8 = 0x00;
pub const LL_CHANNEL_MAP_REQ: u8 = 0x01;
pub const LL_TERMINATE_IND: u8 = 0x02;
pub const LL_ENC_REQ: u8 = 0x03;
pub const LL_ENC_RSP: u8 = 0x04;
pub const LL_START_ENC_REQ: u8 = 0x05;
pub const LL_START_ENC_RSP: u8 = 0x06;
pub const LL_UNKNOWN_RSP: u8 = 0x07;
pub const LL_FEATURE_REQ: u8 = 0x08;
pub const LL_FEATURE_RSP: u8 = 0x09;
pub const LL_PAUSE_ENC_REQ: u8 = 0x0A;
pub const LL_PAUSE_ENC_RSP: u8 = 0x0B;
pub const LL_VERSION_IND: u8 = 0x0C;
pub const LL_REJECT_IND: u8 = 0x0D;
pub const LL_CONNECTION_PARAM_REQ: u8 = 0x0F;
pub const LL_CONNECTION_PARAM_RSP: u8 = 0x10;
pub const LL_REJECT_EXT_IND: u8 = 0x11;

// PDU sizing
/// Data PDU header: LLID octet plus length octet.
pub const LL_DATA_HEADER_SIZE: usize = 2;
/// Offset of the first CtrData octet (header plus opcode).
pub const LL_CTRDATA_OFFSET: usize = LL_DATA_HEADER_SIZE + 1;
/// Octets in an LL feature set.
pub const FEATURE_SET_SIZE: usize = 8;
/// Largest control PDU the engine produces (LL_FEATURE_RSP).
pub const LL_CTRL_PDU_MAX: usize = LL_CTRDATA_OFFSET + FEATURE_SET_SIZE;

// CtrData lengths carried in the length octet
pub const VERSION_IND_CTRDATA_LEN: u8 = 5;
pub const FEATURE_CTRDATA_LEN: u8 = 8;
pub const UNKNOWN_RSP_CTRDATA_LEN: u8 = 1;
pub const REJECT_IND_CTRDATA_LEN: u8 = 1;
pub const REJECT_EXT_IND_CTRDATA_LEN: u8 = 2;

/// Link Layer version reported in LL_VERSION_IND (Bluetooth Core 5.0).
pub const LL_VERSION_NUMBER: u8 = 0x09;

// Default pool capacities
pub const DEFAULT_PROC_CTX_COUNT: usize = 1;
pub const DEFAULT_TX_BUFFER_COUNT: usize = 1;
pub const DEFAULT_NTF_BUFFER_COUNT: usize = 1;
