//! Peer-initiated procedures
//!
//! The Remote Request FSM (RR) serializes peer-initiated procedures. Its
//! queue is populated by the RX dispatcher: an incoming PDU that matches no
//! active context creates a fresh remote context, which is then armed and
//! handed the request. The remote procedure Common FSM decodes the request
//! and queues the response PDU, parking on TX starvation.

use super::conn::LlcpConn;
use super::constants::*;
use super::core::LlcpEngine;
use super::pdu::{self, FeatureSet, VersionInd};
use super::procedure::{ProcContext, ProcState, ProcedureKind};
use super::types::RequestState;
use crate::error::{LlcpError, LlcpResult};
use log::{trace, warn};
use std::convert::TryFrom;

/// Events consumed by the remote-procedure Common FSM
#[derive(Debug, Clone, Copy)]
pub(crate) enum RemoteEvent<'a> {
    /// Periodic run tick
    Run,
    /// The peer's request PDU (or its continuation) arrived
    Request(&'a [u8]),
}

impl LlcpEngine {
    //
    // Remote Request FSM
    //

    pub(crate) fn rr_connect(&mut self, conn: &mut LlcpConn) {
        if conn.remote.state == RequestState::Disconnected {
            conn.remote.state = RequestState::Idle;
        }
    }

    pub(crate) fn rr_disconnect(&mut self, conn: &mut LlcpConn) {
        while let Some(ctx) = conn.remote.pending.pop_front() {
            self.ctx_pool.release(ctx);
        }
        conn.remote.state = RequestState::Disconnected;
    }

    pub(crate) fn rr_run(&mut self, conn: &mut LlcpConn) -> LlcpResult<()> {
        match conn.remote.state {
            RequestState::Disconnected => Ok(()),
            RequestState::Idle => {
                if conn.remote.pending.is_empty() {
                    return Ok(());
                }
                conn.remote.state = RequestState::Active;
                self.rr_dispatch(conn, RemoteEvent::Run)
            }
            // Wakes a procedure parked in WaitTx or WaitNtf
            RequestState::Active => self.rr_dispatch(conn, RemoteEvent::Run),
        }
    }

    pub(crate) fn rr_rx(&mut self, conn: &mut LlcpConn, data: &[u8]) -> LlcpResult<()> {
        if conn.remote.state != RequestState::Active {
            return Ok(());
        }
        self.rr_dispatch(conn, RemoteEvent::Request(data))
    }

    /// Create a context for a new peer-initiated procedure and feed it the
    /// request PDU. Returns the procedure kind for collision detection.
    pub(crate) fn rr_new(
        &mut self,
        conn: &mut LlcpConn,
        data: &[u8],
        opcode: u8,
    ) -> LlcpResult<ProcedureKind> {
        let kind =
            ProcedureKind::from_request_opcode(opcode).ok_or(LlcpError::UnknownOpcode(opcode))?;

        let Some(mut ctx) = self.ctx_pool.acquire() else {
            // Out of contexts; the peer's supervision timeout recovers
            warn!("dropping peer {:?} request: no procedure context", kind);
            return Ok(kind);
        };
        ctx.reset(kind);
        conn.remote.pending.push_back(ctx);

        // Arm the context, then hand it the PDU that created it
        self.rr_run(conn)?;
        self.rr_rx(conn, data)?;
        Ok(kind)
    }

    /// Drive the head procedure and fold its completion back into the RR
    fn rr_dispatch(&mut self, conn: &mut LlcpConn, evt: RemoteEvent<'_>) -> LlcpResult<()> {
        let Some(mut ctx) = conn.remote.pending.pop_front() else {
            conn.remote.state = RequestState::Idle;
            return Ok(());
        };

        match self.rp_execute(conn, &mut ctx, evt) {
            Ok(true) => {
                self.ctx_pool.release(ctx);
                conn.remote.state = RequestState::Idle;
                Ok(())
            }
            Ok(false) => {
                conn.remote.pending.push_front(ctx);
                Ok(())
            }
            Err(e) => {
                self.ctx_pool.release(ctx);
                conn.remote.state = RequestState::Idle;
                Err(e)
            }
        }
    }

    //
    // Remote-procedure Common FSM
    //

    /// Returns `Ok(true)` once the procedure has completed
    fn rp_execute(
        &mut self,
        conn: &mut LlcpConn,
        ctx: &mut ProcContext,
        evt: RemoteEvent<'_>,
    ) -> LlcpResult<bool> {
        match ctx.state {
            ProcState::Idle => match evt {
                RemoteEvent::Run => {
                    ctx.state = ProcState::WaitRx;
                    Ok(false)
                }
                _ => Ok(false),
            },
            ProcState::WaitRx => match evt {
                RemoteEvent::Request(data) => {
                    self.rp_rx_decode(conn, data)?;
                    if ctx.pause {
                        ctx.state = ProcState::WaitTx;
                        Ok(false)
                    } else {
                        self.rp_send_response(conn, ctx)
                    }
                }
                _ => Ok(false),
            },
            ProcState::WaitTx => match evt {
                RemoteEvent::Run => self.rp_send_response(conn, ctx),
                _ => Ok(false),
            },
            // No supported remote procedure notifies the host today; the
            // wake hook mirrors the local side for procedures that will.
            ProcState::WaitNtf => Ok(false),
        }
    }

    /// Decode the peer's request into the connection cache
    fn rp_rx_decode(&mut self, conn: &mut LlcpConn, data: &[u8]) -> LlcpResult<()> {
        match pdu::peek_opcode(data)? {
            LL_VERSION_IND => {
                let ver = VersionInd::try_from(data)?;
                conn.vex.valid = true;
                conn.vex.version_number = ver.version_number;
                conn.vex.company_id = ver.company_id;
                conn.vex.sub_version_number = ver.sub_version_number;
                Ok(())
            }
            LL_FEATURE_REQ => {
                let set = FeatureSet::try_from(data)?;
                conn.feat.valid = true;
                conn.feat.features = set.features;
                Ok(())
            }
            opcode => Err(LlcpError::UnknownOpcode(opcode)),
        }
    }

    /// Attempt to queue the response PDU; the backpressure resolution point
    fn rp_send_response(&mut self, conn: &mut LlcpConn, ctx: &mut ProcContext) -> LlcpResult<bool> {
        match ctx.kind {
            ProcedureKind::VersionExchange => {
                if conn.vex.sent {
                    // An LL_VERSION_IND already went out on this connection
                    // and the peer asked again; the one-per-connection rule
                    // is broken.
                    return Err(LlcpError::ProtocolViolation(
                        "repeated LL_VERSION_IND from peer",
                    ));
                }
                if ctx.pause {
                    ctx.state = ProcState::WaitTx;
                    return Ok(false);
                }
                let Some(mut tx) = self.tx_pool.acquire() else {
                    ctx.state = ProcState::WaitTx;
                    return Ok(false);
                };
                tx.pdu = pdu::encode_version_ind(
                    LL_VERSION_NUMBER,
                    self.settings.company_id(),
                    self.settings.subversion_number(),
                );
                conn.push_tx(tx);
                conn.vex.sent = true;
                ctx.state = ProcState::Idle;
                trace!("remote version exchange: LL_VERSION_IND queued");
                Ok(true)
            }
            ProcedureKind::FeatureExchange => {
                if ctx.pause {
                    ctx.state = ProcState::WaitTx;
                    return Ok(false);
                }
                let Some(mut tx) = self.tx_pool.acquire() else {
                    ctx.state = ProcState::WaitTx;
                    return Ok(false);
                };
                tx.pdu = pdu::encode_feature_rsp(self.settings.features());
                conn.push_tx(tx);
                ctx.state = ProcState::Idle;
                trace!("remote feature exchange: LL_FEATURE_RSP queued");
                Ok(true)
            }
            ProcedureKind::Unknown => Err(LlcpError::ProtocolViolation(
                "unknown procedure on remote queue",
            )),
        }
    }
}
