//! Property tests for the LLCP procedure engine.
//!
//! These tests generate random interleavings of run ticks, procedure
//! initiations, peer PDUs and lifecycle events, and verify the engine's
//! resource and serialization invariants at every quiescent point:
//!
//! - Pool free counts plus in-use counts always equal pool capacity
//! - At most one procedure is active per side of a connection
//! - LL_VERSION_IND reaches the wire at most once per connection
//! - Disconnect is idempotent

use proptest::prelude::*;
use rustylink::llcp::constants::LL_VERSION_IND;
use rustylink::llcp::{
    encode_feature_req, encode_feature_rsp, encode_version_ind, FeatureSet, VersionInd,
};
use rustylink::{EngineConfig, LinkSettings, LlcpConn, LlcpEngine, RequestState};
use std::convert::TryFrom;

/// One step applied to the engine under test
#[derive(Debug, Clone, Copy)]
enum Op {
    Run,
    InitiateVersion,
    InitiateFeatures,
    PeerVersionInd,
    PeerFeatureReq,
    PeerFeatureRsp,
    DrainTx,
    DrainNotifications,
    Disconnect,
    Reconnect,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Run),
        2 => Just(Op::InitiateVersion),
        2 => Just(Op::InitiateFeatures),
        2 => Just(Op::PeerVersionInd),
        2 => Just(Op::PeerFeatureReq),
        1 => Just(Op::PeerFeatureRsp),
        3 => Just(Op::DrainTx),
        3 => Just(Op::DrainNotifications),
        1 => Just(Op::Disconnect),
        1 => Just(Op::Reconnect),
    ]
}

fn test_engine(ctx: usize, tx: usize, ntf: usize) -> LlcpEngine {
    LlcpEngine::new(EngineConfig {
        proc_ctx_count: ctx,
        tx_buffer_count: tx,
        ntf_buffer_count: ntf,
        settings: LinkSettings {
            company_id: 0x005D,
            subversion_number: 0x0001,
            features: 0x0000_0000_0000_0001,
        },
    })
}

proptest! {
    /// Resource conservation and single-active-procedure invariants hold
    /// under arbitrary operation interleavings. A protocol violation from
    /// the peer tears the connection down, after which the sequence
    /// continues on the same control block.
    #[test]
    fn prop_engine_invariants_hold(
        caps in (1..4usize, 1..4usize, 1..4usize),
        ops in prop::collection::vec(op_strategy(), 0..80),
    ) {
        let mut engine = test_engine(caps.0, caps.1, caps.2);
        let mut conn = LlcpConn::new();
        engine.connect(&mut conn);

        let mut wire_version_inds = 0usize;

        for op in ops {
            match op {
                Op::Run => {
                    let _ = engine.run(&mut conn);
                }
                Op::InitiateVersion => {
                    let _ = engine.version_exchange(&mut conn);
                }
                Op::InitiateFeatures => {
                    let _ = engine.feature_exchange(&mut conn);
                }
                Op::PeerVersionInd => {
                    let pdu = encode_version_ind(0x0A, 0x00F0, 0x0042);
                    if engine.rx(&mut conn, pdu.as_bytes()).is_err() {
                        engine.disconnect(&mut conn);
                    }
                }
                Op::PeerFeatureReq => {
                    let pdu = encode_feature_req(0x0000_0000_0000_0055);
                    if engine.rx(&mut conn, pdu.as_bytes()).is_err() {
                        engine.disconnect(&mut conn);
                    }
                }
                Op::PeerFeatureRsp => {
                    // Only a response if a local exchange expects it;
                    // otherwise the dispatcher flags an unknown request.
                    let pdu = encode_feature_rsp(0x0000_0000_0000_00AA);
                    if engine.rx(&mut conn, pdu.as_bytes()).is_err() {
                        engine.disconnect(&mut conn);
                    }
                }
                Op::DrainTx => {
                    while let Some(tx) = conn.pop_tx() {
                        if tx.pdu.opcode() == Some(LL_VERSION_IND) {
                            wire_version_inds += 1;
                        }
                        engine.release_tx(tx);
                    }
                }
                Op::DrainNotifications => {
                    while let Some(ntf) = engine.pop_notification() {
                        engine.release_notification(ntf);
                    }
                }
                Op::Disconnect => engine.disconnect(&mut conn),
                Op::Reconnect => engine.connect(&mut conn),
            }

            // Pool conservation: every element is on a free list, in a
            // queue, or in the host notification ring
            prop_assert_eq!(
                engine.ctx_free() + conn.local_pending() + conn.remote_pending(),
                engine.ctx_capacity()
            );
            prop_assert_eq!(engine.tx_free() + conn.tx_pending(), engine.tx_capacity());
            prop_assert_eq!(
                engine.ntf_free() + engine.notifications_pending(),
                engine.ntf_capacity()
            );

            // An active side always has its head procedure queued
            if conn.local_state() == RequestState::Active {
                prop_assert!(conn.local_pending() >= 1);
            }
            if conn.remote_state() == RequestState::Active {
                prop_assert!(conn.remote_pending() >= 1);
            }
        }

        // The cache answers repeats; the wire sees at most one
        prop_assert!(wire_version_inds <= 1);
    }

    /// Encoding then decoding a version PDU yields the original triple
    #[test]
    fn prop_version_ind_roundtrip(
        version in any::<u8>(),
        company in any::<u16>(),
        sub_version in any::<u16>(),
    ) {
        let pdu = encode_version_ind(version, company, sub_version);
        let ver = VersionInd::try_from(pdu.as_bytes()).unwrap();
        prop_assert_eq!(ver.version_number, version);
        prop_assert_eq!(ver.company_id, company);
        prop_assert_eq!(ver.sub_version_number, sub_version);
    }

    /// Encoding then decoding a feature set PDU yields the original set
    #[test]
    fn prop_feature_set_roundtrip(features in any::<u64>()) {
        let pdu = encode_feature_req(features);
        let set = FeatureSet::try_from(pdu.as_bytes()).unwrap();
        prop_assert_eq!(set.features, features);
    }

    /// Repeated disconnects leave the pools and states untouched
    #[test]
    fn prop_disconnect_idempotent(repeats in 1..5usize) {
        let mut engine = test_engine(2, 1, 1);
        let mut conn = LlcpConn::new();
        engine.connect(&mut conn);
        let _ = engine.version_exchange(&mut conn);

        engine.disconnect(&mut conn);
        let free_after_first = engine.ctx_free();

        for _ in 0..repeats {
            engine.disconnect(&mut conn);
            prop_assert_eq!(engine.ctx_free(), free_after_first);
            prop_assert_eq!(conn.local_state(), RequestState::Disconnected);
            prop_assert_eq!(conn.remote_state(), RequestState::Disconnected);
        }
    }
}
