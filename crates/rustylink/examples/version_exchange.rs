//! Example demonstrating a version exchange between two link layer engines
use rustylink::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("LLCP Version Exchange Example");
    println!("-----------------------------");

    // Two controllers, one per end of the connection
    let mut central = LlcpEngine::new(EngineConfig {
        settings: LinkSettings {
            company_id: 0x005D,
            subversion_number: 0x0100,
            features: 0x0000_0000_0000_0001,
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

    // The host asks the central for the peer's version information
    central.version_exchange(&mut central_conn)?;

    // Pump both ends until the exchange settles
    for _ in 0..4 {
        central.run(&mut central_conn)?;
        peripheral.run(&mut peripheral_conn)?;

        while let Some(tx) = central_conn.pop_tx() {
            println!("central  -> {:02X?}", tx.pdu.as_bytes());
            peripheral.rx(&mut peripheral_conn, tx.pdu.as_bytes())?;
            central.release_tx(tx);
        }
        while let Some(tx) = peripheral_conn.pop_tx() {
            println!("central <-  {:02X?}", tx.pdu.as_bytes());
            central.rx(&mut central_conn, tx.pdu.as_bytes())?;
            peripheral.release_tx(tx);
        }
    }

    // The completion notification carries the peer's triple
    while let Some(ntf) = central.pop_notification() {
        println!("host notification: {:?} ({:?})", ntf.kind, ntf.result);
        central.release_notification(ntf);
    }
    if let Some(ver) = central_conn.peer_version() {
        println!(
            "peer link layer version {}, company 0x{:04X}, sub-version 0x{:04X}",
            ver.version_number, ver.company_id, ver.sub_version_number
        );
    }

    Ok(())
}
