#![deny(unused)]

fn main() {
    env_logger::init();

    #[cfg(feature = "hid")]
    {
        use ledger_cosmos::{LedgerCosmos, TransportType};

        let ledger = LedgerCosmos::new(&TransportType::NativeHID).unwrap_or_else(|e| {
            eprintln!("failed to connect: {e}");
            std::process::exit(1);
        });
        let protocol = ledger
            .protocol()
            .map_or_else(|| "unsupported".to_string(), |p| p.to_string());
        println!("Cosmos app {} ({protocol})", ledger.version());
        if let Err(e) = ledger.close() {
            eprintln!("failed to close: {e}");
        }
    }
    #[cfg(not(feature = "hid"))]
    {
        eprintln!("enable the 'hid' feature to use USB transport");
    }
}
