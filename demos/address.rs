#![deny(unused)]

fn main() {
    env_logger::init();

    #[cfg(feature = "hid")]
    {
        use ledger_cosmos::{Bip32Path, LedgerCosmos, TransportType};

        let hrp = std::env::args().nth(1).unwrap_or_else(|| "cosmos".into());
        let ledger = LedgerCosmos::new(&TransportType::NativeHID).unwrap_or_else(|e| {
            eprintln!("failed to connect: {e}");
            std::process::exit(1);
        });
        let path = Bip32Path::cosmos(0, 0, 0);
        println!("confirm the address on your device...");
        let (pubkey, address) = ledger
            .show_address(&path, &hrp)
            .expect("failed to get address");
        println!("path:    {path}");
        println!("pubkey:  {pubkey}");
        println!("address: {address}");
    }
    #[cfg(not(feature = "hid"))]
    {
        eprintln!("enable the 'hid' feature to use USB transport");
    }
}
