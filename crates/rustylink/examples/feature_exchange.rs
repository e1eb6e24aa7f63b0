//! Example demonstrating a feature exchange, including the cached result
//! of a follow-up version exchange on the same connection
use rustylink::*;

fn pump(
    a: &mut LlcpEngine,
    a_conn: &mut LlcpConn,
    b: &mut LlcpEngine,
    b_conn: &mut LlcpConn,
) -> Result<(), LlcpError> {
    for _ in 0..4 {
        a.run(a_conn)?;
        b.run(b_conn)?;

        while let Some(tx) = a_conn.pop_tx() {
            b.rx(b_conn, tx.pdu.as_bytes())?;
            a.release_tx(tx);
        }
        while let Some(tx) = b_conn.pop_tx() {
            a.rx(a_conn, tx.pdu.as_bytes())?;
            b.release_tx(tx);
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("LLCP Feature Exchange Example");
    println!("-----------------------------");

    let mut central = LlcpEngine::new(EngineConfig {
        settings: LinkSettings {
            company_id: 0x005D,
            subversion_number: 0x0100,
            features: 0x0000_0000_0000_0003,
        },
        ..EngineConfig::default()
    });
    let mut peripheral = LlcpEngine::new(EngineConfig {
        settings: LinkSettings {
            company_id: 0x00F0,
            subversion_number: 0x0042,
            features: 0x0000_0000_0000_0001,
        },
        ..EngineConfig::default()
    });

    let mut central_conn = LlcpConn::new();
    let mut peripheral_conn = LlcpConn::new();
    central.connect(&mut central_conn);
    peripheral.connect(&mut peripheral_conn);

    // Exchange feature sets first
    central.feature_exchange(&mut central_conn)?;
    pump(
        &mut central,
        &mut central_conn,
        &mut peripheral,
        &mut peripheral_conn,
    )?;

    while let Some(ntf) = central.pop_notification() {
        println!("host notification: {:?} ({:?})", ntf.kind, ntf.result);
        central.release_notification(ntf);
    }
    if let Some(features) = central_conn.peer_features() {
        println!("peer feature set: 0x{:016X}", features);
    }

    // A version exchange on the same connection goes to the air once;
    // asking again is answered from the cache
    for round in 1..=2 {
        central.version_exchange(&mut central_conn)?;
        pump(
            &mut central,
            &mut central_conn,
            &mut peripheral,
            &mut peripheral_conn,
        )?;
        while let Some(ntf) = central.pop_notification() {
            println!("round {}: {:?} ({:?})", round, ntf.kind, ntf.result);
            central.release_notification(ntf);
        }
    }

    Ok(())
}
