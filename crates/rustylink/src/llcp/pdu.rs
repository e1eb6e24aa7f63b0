//! LL Control PDU handling
//!
//! This module provides the fixed-size control PDU buffer and the
//! encode/decode pairs for each supported control PDU variant. All
//! multi-octet fields are little-endian on the wire.

use super::constants::*;
use crate::error::LlcpError;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::convert::TryFrom;
use std::io::Cursor;

/// Fixed-size buffer holding one encoded LL control PDU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlPdu {
    buf: [u8; LL_CTRL_PDU_MAX],
    len: usize,
}

impl Default for ControlPdu {
    fn default() -> Self {
        Self {
            buf: [0u8; LL_CTRL_PDU_MAX],
            len: 0,
        }
    }
}

impl ControlPdu {
    /// Start a zeroed PDU with the control header and opcode in place
    fn begin(opcode: u8, ctrdata_len: u8) -> Self {
        let mut pdu = Self::default();
        pdu.buf[0] = LLID_CTRL;
        pdu.buf[1] = ctrdata_len;
        pdu.buf[2] = opcode;
        pdu.len = LL_CTRDATA_OFFSET + ctrdata_len as usize;
        pdu
    }

    /// The encoded PDU bytes: header, opcode and CtrData
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Control opcode of the encoded PDU, if any
    pub fn opcode(&self) -> Option<u8> {
        if self.len > LL_DATA_HEADER_SIZE {
            Some(self.buf[LL_DATA_HEADER_SIZE])
        } else {
            None
        }
    }

    /// True for a buffer that carries no encoded PDU
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Validate control PDU framing and return the opcode
pub fn peek_opcode(data: &[u8]) -> Result<u8, LlcpError> {
    if data.len() < LL_CTRDATA_OFFSET {
        return Err(LlcpError::InvalidPdu);
    }
    if data[0] & LLID_MASK != LLID_CTRL {
        return Err(LlcpError::InvalidPdu);
    }
    if data.len() < LL_CTRDATA_OFFSET + data[1] as usize {
        return Err(LlcpError::InvalidPdu);
    }
    Ok(data[LL_DATA_HEADER_SIZE])
}

fn expect_ctrdata(data: &[u8], opcode: u8, ctrdata_len: u8) -> Result<(), LlcpError> {
    if peek_opcode(data)? != opcode || data[1] != ctrdata_len {
        return Err(LlcpError::InvalidPdu);
    }
    Ok(())
}

/// Encode an LL_VERSION_IND PDU
pub fn encode_version_ind(version: u8, company_id: u16, sub_version: u16) -> ControlPdu {
    let mut pdu = ControlPdu::begin(LL_VERSION_IND, VERSION_IND_CTRDATA_LEN);

    let mut cursor = Cursor::new(&mut pdu.buf[LL_CTRDATA_OFFSET..]);
    cursor.write_u8(version).unwrap();
    cursor.write_u16::<LittleEndian>(company_id).unwrap();
    cursor.write_u16::<LittleEndian>(sub_version).unwrap();

    pdu
}

fn encode_feature_set(opcode: u8, features: u64) -> ControlPdu {
    let mut pdu = ControlPdu::begin(opcode, FEATURE_CTRDATA_LEN);

    let mut cursor = Cursor::new(&mut pdu.buf[LL_CTRDATA_OFFSET..]);
    cursor.write_u64::<LittleEndian>(features).unwrap();

    pdu
}

/// Encode an LL_FEATURE_REQ PDU
pub fn encode_feature_req(features: u64) -> ControlPdu {
    encode_feature_set(LL_FEATURE_REQ, features)
}

/// Encode an LL_FEATURE_RSP PDU
pub fn encode_feature_rsp(features: u64) -> ControlPdu {
    encode_feature_set(LL_FEATURE_RSP, features)
}

/// Encode an LL_UNKNOWN_RSP PDU
pub fn encode_unknown_rsp(unknown_type: u8) -> ControlPdu {
    let mut pdu = ControlPdu::begin(LL_UNKNOWN_RSP, UNKNOWN_RSP_CTRDATA_LEN);
    pdu.buf[LL_CTRDATA_OFFSET] = unknown_type;
    pdu
}

/// Encode an LL_REJECT_IND PDU
pub fn encode_reject_ind(error_code: u8) -> ControlPdu {
    let mut pdu = ControlPdu::begin(LL_REJECT_IND, REJECT_IND_CTRDATA_LEN);
    pdu.buf[LL_CTRDATA_OFFSET] = error_code;
    pdu
}

/// Encode an LL_REJECT_EXT_IND PDU
pub fn encode_reject_ext_ind(reject_opcode: u8, error_code: u8) -> ControlPdu {
    let mut pdu = ControlPdu::begin(LL_REJECT_EXT_IND, REJECT_EXT_IND_CTRDATA_LEN);
    pdu.buf[LL_CTRDATA_OFFSET] = reject_opcode;
    pdu.buf[LL_CTRDATA_OFFSET + 1] = error_code;
    pdu
}

/// Decoded LL_VERSION_IND payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VersionInd {
    pub version_number: u8,
    pub company_id: u16,
    pub sub_version_number: u16,
}

impl TryFrom<&[u8]> for VersionInd {
    type Error = LlcpError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        expect_ctrdata(data, LL_VERSION_IND, VERSION_IND_CTRDATA_LEN)?;

        let mut cursor = Cursor::new(&data[LL_CTRDATA_OFFSET..]);
        let version_number = cursor.read_u8().map_err(|_| LlcpError::InvalidPdu)?;
        let company_id = cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| LlcpError::InvalidPdu)?;
        let sub_version_number = cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| LlcpError::InvalidPdu)?;

        Ok(Self {
            version_number,
            company_id,
            sub_version_number,
        })
    }
}

/// Decoded feature set payload of LL_FEATURE_REQ / LL_FEATURE_RSP
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureSet {
    pub features: u64,
}

impl TryFrom<&[u8]> for FeatureSet {
    type Error = LlcpError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        let opcode = peek_opcode(data)?;
        if (opcode != LL_FEATURE_REQ && opcode != LL_FEATURE_RSP) || data[1] != FEATURE_CTRDATA_LEN
        {
            return Err(LlcpError::InvalidPdu);
        }

        let mut cursor = Cursor::new(&data[LL_CTRDATA_OFFSET..]);
        let features = cursor
            .read_u64::<LittleEndian>()
            .map_err(|_| LlcpError::InvalidPdu)?;

        Ok(Self { features })
    }
}

/// Decoded LL_UNKNOWN_RSP payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownRsp {
    pub unknown_type: u8,
}

impl TryFrom<&[u8]> for UnknownRsp {
    type Error = LlcpError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        expect_ctrdata(data, LL_UNKNOWN_RSP, UNKNOWN_RSP_CTRDATA_LEN)?;

        Ok(Self {
            unknown_type: data[LL_CTRDATA_OFFSET],
        })
    }
}

/// Decoded LL_REJECT_IND payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectInd {
    pub error_code: u8,
}

impl TryFrom<&[u8]> for RejectInd {
    type Error = LlcpError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        expect_ctrdata(data, LL_REJECT_IND, REJECT_IND_CTRDATA_LEN)?;

        Ok(Self {
            error_code: data[LL_CTRDATA_OFFSET],
        })
    }
}

/// Decoded LL_REJECT_EXT_IND payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectExtInd {
    pub reject_opcode: u8,
    pub error_code: u8,
}

impl TryFrom<&[u8]> for RejectExtInd {
    type Error = LlcpError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        expect_ctrdata(data, LL_REJECT_EXT_IND, REJECT_EXT_IND_CTRDATA_LEN)?;

        Ok(Self {
            reject_opcode: data[LL_CTRDATA_OFFSET],
            error_code: data[LL_CTRDATA_OFFSET + 1],
        })
    }
}
