//! Locally-initiated procedures
//!
//! The Local Request FSM (LR) serializes locally-initiated procedures in
//! strict FIFO order. The head of the pending queue drives the local
//! procedure Common FSM, which transmits the request PDU, waits for the
//! peer's answer and delivers a completion notification to the host,
//! parking whenever a buffer pool runs dry.

use super::conn::LlcpConn;
use super::constants::*;
use super::core::LlcpEngine;
use super::pdu::{self, FeatureSet, RejectExtInd, RejectInd, UnknownRsp, VersionInd};
use super::procedure::{ProcContext, ProcState, ProcedureKind};
use super::types::{ProcedureResult, RequestState};
use crate::error::{LlcpError, LlcpResult};
use log::{debug, trace};
use std::convert::TryFrom;

/// Events consumed by the local-procedure Common FSM
#[derive(Debug, Clone, Copy)]
pub(crate) enum LocalEvent<'a> {
    /// Periodic run tick
    Run,
    /// The expected response PDU arrived
    Response(&'a [u8]),
    /// LL_REJECT_IND / LL_REJECT_EXT_IND terminated the procedure
    Reject(&'a [u8]),
    /// LL_UNKNOWN_RSP terminated the procedure
    Unknown(&'a [u8]),
    /// The peer started the same procedure before ours reached the air
    Collision,
}

impl LlcpEngine {
    //
    // Local Request FSM
    //

    pub(crate) fn lr_connect(&mut self, conn: &mut LlcpConn) {
        if conn.local.state == RequestState::Disconnected {
            conn.local.state = RequestState::Idle;
        }
    }

    pub(crate) fn lr_disconnect(&mut self, conn: &mut LlcpConn) {
        while let Some(ctx) = conn.local.pending.pop_front() {
            self.ctx_pool.release(ctx);
        }
        conn.local.state = RequestState::Disconnected;
    }

    pub(crate) fn lr_run(&mut self, conn: &mut LlcpConn) -> LlcpResult<()> {
        match conn.local.state {
            RequestState::Disconnected => Ok(()),
            RequestState::Idle => {
                if conn.local.pending.is_empty() {
                    return Ok(());
                }
                conn.local.state = RequestState::Active;
                self.lr_dispatch(conn, LocalEvent::Run)
            }
            // Wakes a procedure parked in WaitTx or WaitNtf
            RequestState::Active => self.lr_dispatch(conn, LocalEvent::Run),
        }
    }

    pub(crate) fn lr_rx(&mut self, conn: &mut LlcpConn, data: &[u8]) -> LlcpResult<()> {
        self.lr_dispatch(conn, LocalEvent::Response(data))
    }

    pub(crate) fn lr_reject(&mut self, conn: &mut LlcpConn, data: &[u8]) -> LlcpResult<()> {
        self.lr_dispatch(conn, LocalEvent::Reject(data))
    }

    pub(crate) fn lr_unknown(&mut self, conn: &mut LlcpConn, data: &[u8]) -> LlcpResult<()> {
        self.lr_dispatch(conn, LocalEvent::Unknown(data))
    }

    pub(crate) fn lr_collision(&mut self, conn: &mut LlcpConn) -> LlcpResult<()> {
        self.lr_dispatch(conn, LocalEvent::Collision)
    }

    /// Drive the head procedure and fold its completion back into the LR
    fn lr_dispatch(&mut self, conn: &mut LlcpConn, evt: LocalEvent<'_>) -> LlcpResult<()> {
        let Some(mut ctx) = conn.local.pending.pop_front() else {
            conn.local.state = RequestState::Idle;
            return Ok(());
        };

        match self.lp_execute(conn, &mut ctx, evt) {
            Ok(true) => {
                self.ctx_pool.release(ctx);
                conn.local.state = RequestState::Idle;
                Ok(())
            }
            Ok(false) => {
                conn.local.pending.push_front(ctx);
                Ok(())
            }
            Err(e) => {
                self.ctx_pool.release(ctx);
                conn.local.state = RequestState::Idle;
                Err(e)
            }
        }
    }

    //
    // Local-procedure Common FSM
    //

    /// Returns `Ok(true)` once the procedure has completed
    fn lp_execute(
        &mut self,
        conn: &mut LlcpConn,
        ctx: &mut ProcContext,
        evt: LocalEvent<'_>,
    ) -> LlcpResult<bool> {
        // Peer errors terminate the procedure from any state
        match evt {
            LocalEvent::Reject(data) => return self.lp_peer_reject(conn, ctx, data),
            LocalEvent::Unknown(data) => return self.lp_peer_unknown(conn, ctx, data),
            _ => {}
        }

        match ctx.state {
            ProcState::Idle => self.lp_st_idle(conn, ctx, evt),
            ProcState::WaitTx => self.lp_st_wait_tx(conn, ctx, evt),
            ProcState::WaitRx => self.lp_st_wait_rx(conn, ctx, evt),
            ProcState::WaitNtf => self.lp_st_wait_ntf(conn, ctx, evt),
        }
    }

    fn lp_st_idle(
        &mut self,
        conn: &mut LlcpConn,
        ctx: &mut ProcContext,
        evt: LocalEvent<'_>,
    ) -> LlcpResult<bool> {
        match evt {
            LocalEvent::Run => {
                if ctx.pause {
                    ctx.state = ProcState::WaitTx;
                    Ok(false)
                } else {
                    self.lp_send_request(conn, ctx)
                }
            }
            _ => Ok(false),
        }
    }

    fn lp_st_wait_tx(
        &mut self,
        conn: &mut LlcpConn,
        ctx: &mut ProcContext,
        evt: LocalEvent<'_>,
    ) -> LlcpResult<bool> {
        match evt {
            LocalEvent::Run => self.lp_send_request(conn, ctx),
            LocalEvent::Collision => self.lp_collision(conn, ctx),
            _ => Ok(false),
        }
    }

    fn lp_st_wait_rx(
        &mut self,
        conn: &mut LlcpConn,
        ctx: &mut ProcContext,
        evt: LocalEvent<'_>,
    ) -> LlcpResult<bool> {
        match evt {
            LocalEvent::Response(data) => {
                self.lp_rx_decode(conn, data)?;
                self.lp_complete(conn, ctx)
            }
            LocalEvent::Collision => self.lp_collision(conn, ctx),
            _ => Ok(false),
        }
    }

    fn lp_st_wait_ntf(
        &mut self,
        conn: &mut LlcpConn,
        ctx: &mut ProcContext,
        evt: LocalEvent<'_>,
    ) -> LlcpResult<bool> {
        match evt {
            LocalEvent::Run => self.lp_complete(conn, ctx),
            _ => Ok(false),
        }
    }

    /// Attempt to queue the request PDU; the backpressure resolution point
    fn lp_send_request(&mut self, conn: &mut LlcpConn, ctx: &mut ProcContext) -> LlcpResult<bool> {
        match ctx.kind {
            ProcedureKind::VersionExchange => {
                // The Link Layer queues at most one LL_VERSION_IND for
                // transmission during a connection; afterwards the cached
                // result answers locally.
                if conn.vex.sent {
                    return self.lp_complete(conn, ctx);
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
                ctx.expected_opcode = Some(LL_VERSION_IND);
                ctx.state = ProcState::WaitRx;
                trace!("local version exchange: LL_VERSION_IND queued");
                Ok(false)
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
                tx.pdu = pdu::encode_feature_req(self.settings.features());
                conn.push_tx(tx);
                ctx.expected_opcode = Some(LL_FEATURE_RSP);
                ctx.state = ProcState::WaitRx;
                trace!("local feature exchange: LL_FEATURE_REQ queued");
                Ok(false)
            }
            ProcedureKind::Unknown => Err(LlcpError::ProtocolViolation(
                "unknown procedure on local queue",
            )),
        }
    }

    /// Decode the peer's response into the connection cache
    fn lp_rx_decode(&mut self, conn: &mut LlcpConn, data: &[u8]) -> LlcpResult<()> {
        match pdu::peek_opcode(data)? {
            LL_VERSION_IND => {
                let ver = VersionInd::try_from(data)?;
                conn.vex.valid = true;
                conn.vex.version_number = ver.version_number;
                conn.vex.company_id = ver.company_id;
                conn.vex.sub_version_number = ver.sub_version_number;
                Ok(())
            }
            LL_FEATURE_RSP => {
                let set = FeatureSet::try_from(data)?;
                conn.feat.valid = true;
                conn.feat.features = set.features;
                Ok(())
            }
            opcode => Err(LlcpError::UnknownOpcode(opcode)),
        }
    }

    /// Deliver the completion notification and finish the procedure
    fn lp_complete(&mut self, conn: &mut LlcpConn, ctx: &mut ProcContext) -> LlcpResult<bool> {
        let pdu = match ctx.result {
            ProcedureResult::Success => match ctx.kind {
                ProcedureKind::VersionExchange => pdu::encode_version_ind(
                    conn.vex.version_number,
                    conn.vex.company_id,
                    conn.vex.sub_version_number,
                ),
                ProcedureKind::FeatureExchange => pdu::encode_feature_rsp(conn.feat.features),
                ProcedureKind::Unknown => {
                    return Err(LlcpError::ProtocolViolation(
                        "unknown procedure completion",
                    ))
                }
            },
            _ => Default::default(),
        };

        let Some(mut ntf) = self.ntf_pool.acquire() else {
            ctx.state = ProcState::WaitNtf;
            return Ok(false);
        };
        ntf.kind = ctx.kind;
        ntf.result = ctx.result;
        ntf.pdu = pdu;
        self.host_queue.push_back(ntf);

        debug!("local {:?} completed: {:?}", ctx.kind, ctx.result);
        ctx.state = ProcState::Idle;
        Ok(true)
    }

    fn lp_peer_reject(
        &mut self,
        conn: &mut LlcpConn,
        ctx: &mut ProcContext,
        data: &[u8],
    ) -> LlcpResult<bool> {
        let error_code = match pdu::peek_opcode(data)? {
            LL_REJECT_IND => RejectInd::try_from(data)?.error_code,
            LL_REJECT_EXT_IND => RejectExtInd::try_from(data)?.error_code,
            opcode => return Err(LlcpError::UnknownOpcode(opcode)),
        };
        debug!("local {:?} rejected by peer: 0x{:02X}", ctx.kind, error_code);
        ctx.result = ProcedureResult::RejectedByPeer(error_code);
        self.lp_complete(conn, ctx)
    }

    fn lp_peer_unknown(
        &mut self,
        conn: &mut LlcpConn,
        ctx: &mut ProcContext,
        data: &[u8],
    ) -> LlcpResult<bool> {
        let rsp = UnknownRsp::try_from(data)?;
        debug!(
            "local {:?} not supported by peer (opcode 0x{:02X})",
            ctx.kind, rsp.unknown_type
        );
        ctx.result = ProcedureResult::UnsupportedByPeer;
        self.lp_complete(conn, ctx)
    }

    /// The remote path ran the same exchange; cancel our transmission and
    /// inherit its cached result.
    fn lp_collision(&mut self, conn: &mut LlcpConn, ctx: &mut ProcContext) -> LlcpResult<bool> {
        ctx.collision = true;
        self.lp_complete(conn, ctx)
    }
}
