//! LLCP engine core
//!
//! This module provides the procedure engine that owns the resource pools,
//! the host notification queue and the link settings, and exposes the
//! public API:
//! - Connection lifecycle (init, connect, disconnect)
//! - The periodic run tick
//! - RX dispatch of incoming control PDUs
//! - Per-procedure initiation entry points

use super::conn::LlcpConn;
use super::constants::*;
use super::pdu;
use super::pool::Pool;
use super::procedure::{ProcContext, ProcedureKind};
use super::types::{EngineConfig, LinkSettings, Notification, RequestState, TxBuffer};
use crate::error::{LlcpError, LlcpResult};
use log::{debug, trace};
use std::collections::VecDeque;

/// LLCP control procedure engine
///
/// One engine serves all connections of a controller; per-connection state
/// lives in [`LlcpConn`]. The engine never blocks: progress happens inside
/// [`run`](Self::run), [`rx`](Self::rx) and the initiation entry points,
/// all invoked from the connection's single service context.
pub struct LlcpEngine {
    pub(crate) settings: LinkSettings,
    pub(crate) ctx_pool: Pool<ProcContext>,
    pub(crate) tx_pool: Pool<TxBuffer>,
    pub(crate) ntf_pool: Pool<Notification>,
    pub(crate) host_queue: VecDeque<Notification>,
}

impl LlcpEngine {
    /// Create an engine with its three pools preallocated.
    ///
    /// Capacities below one are raised to one.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            settings: config.settings,
            ctx_pool: Pool::new(config.proc_ctx_count.max(1)),
            tx_pool: Pool::new(config.tx_buffer_count.max(1)),
            ntf_pool: Pool::new(config.ntf_buffer_count.max(1)),
            host_queue: VecDeque::new(),
        }
    }

    /// Reset a connection control block, reclaiming queued contexts and TX
    /// buffers and clearing the per-procedure caches
    pub fn conn_init(&mut self, conn: &mut LlcpConn) {
        self.lr_disconnect(conn);
        self.rr_disconnect(conn);
        while let Some(tx) = conn.tx_queue.pop_front() {
            self.tx_pool.release(tx);
        }
        conn.vex = Default::default();
        conn.feat = Default::default();
    }

    /// Drive both request FSMs through the connect event
    pub fn connect(&mut self, conn: &mut LlcpConn) {
        self.rr_connect(conn);
        self.lr_connect(conn);
    }

    /// Drive both request FSMs through the disconnect event, draining the
    /// pending queues. Disconnecting an already-disconnected connection is
    /// a no-op.
    pub fn disconnect(&mut self, conn: &mut LlcpConn) {
        self.rr_disconnect(conn);
        self.lr_disconnect(conn);
    }

    /// One tick of both request FSMs.
    ///
    /// The embedding calls this from the per-connection service routine;
    /// procedures parked on buffer starvation make progress here.
    pub fn run(&mut self, conn: &mut LlcpConn) -> LlcpResult<()> {
        self.rr_run(conn)?;
        self.lr_run(conn)
    }

    /// Feed one received control PDU into the dispatcher.
    ///
    /// An error return is fatal to the connection: the peer broke the
    /// protocol and the embedding is expected to terminate the link.
    pub fn rx(&mut self, conn: &mut LlcpConn, data: &[u8]) -> LlcpResult<()> {
        let opcode = pdu::peek_opcode(data)?;
        trace!("rx opcode 0x{:02X}", opcode);

        // Response to the active local procedure?
        if conn.local.state == RequestState::Active {
            if let Some(head) = conn.local.pending.front() {
                if head.expected_opcode == Some(opcode) {
                    return self.lr_rx(conn, data);
                }
                // Peer errors terminating the local procedure
                match opcode {
                    LL_UNKNOWN_RSP => return self.lr_unknown(conn, data),
                    LL_REJECT_IND | LL_REJECT_EXT_IND => return self.lr_reject(conn, data),
                    _ => {}
                }
            }
        }

        // Continuation of the active remote procedure?
        if conn.remote.state == RequestState::Active {
            if let Some(head) = conn.remote.pending.front() {
                if head.expected_opcode == Some(opcode) {
                    return self.rr_rx(conn, data);
                }
            }
        }

        // New peer-initiated procedure
        let kind = self.rr_new(conn, data, opcode)?;

        // A same-kind local procedure that has not yet transmitted inherits
        // the remote exchange's result instead of going to the air.
        let decoded = match kind {
            ProcedureKind::VersionExchange => conn.vex.valid,
            ProcedureKind::FeatureExchange => conn.feat.valid,
            ProcedureKind::Unknown => false,
        };
        if decoded && conn.local.state == RequestState::Active {
            if let Some(head) = conn.local.pending.front() {
                if head.kind == kind && head.expected_opcode.is_none() {
                    debug!("local {:?} collided with peer-initiated exchange", kind);
                    return self.lr_collision(conn);
                }
            }
        }

        Ok(())
    }

    /// Queue a version exchange procedure on the local side
    pub fn version_exchange(&mut self, conn: &mut LlcpConn) -> LlcpResult<()> {
        self.initiate(conn, ProcedureKind::VersionExchange)
    }

    /// Queue a feature exchange procedure on the local side
    pub fn feature_exchange(&mut self, conn: &mut LlcpConn) -> LlcpResult<()> {
        self.initiate(conn, ProcedureKind::FeatureExchange)
    }

    fn initiate(&mut self, conn: &mut LlcpConn, kind: ProcedureKind) -> LlcpResult<()> {
        let Some(mut ctx) = self.ctx_pool.acquire() else {
            return Err(LlcpError::CommandDisallowed);
        };
        ctx.reset(kind);
        conn.local.pending.push_back(ctx);
        debug!("queued local {:?}", kind);
        Ok(())
    }

    /// Take the next host-bound notification.
    ///
    /// The buffer must be returned with
    /// [`release_notification`](Self::release_notification) once the host
    /// path is done with it.
    pub fn pop_notification(&mut self) -> Option<Notification> {
        self.host_queue.pop_front()
    }

    /// Number of host-bound notifications not yet drained
    pub fn notifications_pending(&self) -> usize {
        self.host_queue.len()
    }

    /// Return a TX buffer drained from a connection's TX queue
    pub fn release_tx(&mut self, tx: TxBuffer) {
        self.tx_pool.release(tx);
    }

    /// Return a drained notification buffer
    pub fn release_notification(&mut self, ntf: Notification) {
        self.ntf_pool.release(ntf);
    }

    /// Free procedure contexts
    pub fn ctx_free(&self) -> usize {
        self.ctx_pool.free_count()
    }

    /// Free TX buffers
    pub fn tx_free(&self) -> usize {
        self.tx_pool.free_count()
    }

    /// Free notification buffers
    pub fn ntf_free(&self) -> usize {
        self.ntf_pool.free_count()
    }

    /// Procedure context pool capacity
    pub fn ctx_capacity(&self) -> usize {
        self.ctx_pool.capacity()
    }

    /// TX buffer pool capacity
    pub fn tx_capacity(&self) -> usize {
        self.tx_pool.capacity()
    }

    /// Notification buffer pool capacity
    pub fn ntf_capacity(&self) -> usize {
        self.ntf_pool.capacity()
    }
}
