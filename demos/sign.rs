#![deny(unused)]

/// Amino JSON sign doc, keys sorted as the app requires.
#[cfg(feature = "hid")]
const SIGN_DOC: &str = r#"{"account_number":"108","chain_id":"cosmoshub-4","fee":{"amount":[{"amount":"600","denom":"uatom"}],"gas":"200000"},"memo":"","msgs":[{"type":"cosmos-sdk/MsgSend","value":{"amount":[{"amount":"1000000","denom":"uatom"}],"from_address":"cosmos1w34k53py5v5xyluazqpq65agyajavep2rflq6h","to_address":"cosmos1kky4yzth6gdrm8ga5zlfwhav33yr7hl87jycah"}}],"sequence":"3"}"#;

fn main() {
    env_logger::init();

    #[cfg(feature = "hid")]
    {
        use ledger_cosmos::{Bip32Path, LedgerCosmos, TransportType};

        let ledger = LedgerCosmos::new(&TransportType::NativeHID).unwrap_or_else(|e| {
            eprintln!("failed to connect: {e}");
            std::process::exit(1);
        });
        let path = Bip32Path::cosmos(0, 0, 0);
        println!("approve the transaction on your device...");
        match ledger.sign(&path, SIGN_DOC.as_bytes()) {
            Ok(sig) => println!("signature: {sig}"),
            Err(e) => {
                eprintln!("signing failed: {e}");
                std::process::exit(1);
            }
        }
    }
    #[cfg(not(feature = "hid"))]
    {
        eprintln!("enable the 'hid' feature to use USB transport");
    }
}
