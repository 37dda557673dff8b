//! Integration tests — requires a running Speculos instance with the Cosmos app:
//!
//! ```sh
//! speculos --model nanosp /path/to/app-cosmos.elf
//! ```
//!
//! Then: `cargo test --features tcp -- --ignored`

#![cfg(feature = "tcp")]

use ledger_cosmos::{AppProtocol, Bip32Path, LedgerCosmos, LedgerError, TransportType};

fn connect() -> LedgerCosmos {
    let host = std::env::var("LEDGER_TCP_HOST").unwrap_or_else(|_| "127.0.0.1".into());
    let transport = TransportType::TCP(host, 9999);
    LedgerCosmos::new(&transport).expect("failed to connect to Speculos — is it running?")
}

const SIGN_DOC: &str = r#"{"account_number":"0","chain_id":"cosmoshub-4","fee":{"amount":[{"amount":"5000","denom":"uatom"}],"gas":"200000"},"memo":"","msgs":[{"type":"cosmos-sdk/MsgSend","value":{"amount":[{"amount":"1","denom":"uatom"}],"from_address":"cosmos1w34k53py5v5xyluazqpq65agyajavep2rflq6h","to_address":"cosmos1w34k53py5v5xyluazqpq65agyajavep2rflq6h"}}],"sequence":"0"}"#;

#[test]
#[ignore = "requires Speculos"]
fn get_version() {
    let mut ledger = connect();
    let version = ledger.get_version().unwrap();
    assert!(matches!(version.major, 1 | 2));
    assert!(ledger.protocol().is_some());
}

#[test]
#[ignore = "requires Speculos"]
fn get_pubkey_default_path() {
    let ledger = connect();
    let pubkey = ledger.get_pubkey(&Bip32Path::cosmos(0, 0, 0)).unwrap();
    // compressed secp256k1 key
    assert!(matches!(pubkey.0[0], 0x02 | 0x03));
}

#[test]
#[ignore = "requires Speculos"]
fn get_address_has_hrp() {
    let ledger = connect();
    let (_, address) = ledger
        .get_address_pubkey(&Bip32Path::cosmos(0, 0, 0), "cosmos", false)
        .unwrap();
    assert!(address.0.starts_with("cosmos1"));
}

#[test]
#[ignore = "requires Speculos"]
fn get_pubkey_different_paths_differ() {
    let ledger = connect();
    let pk1 = ledger.get_pubkey(&Bip32Path::cosmos(0, 0, 0)).unwrap();
    let pk2 = ledger.get_pubkey(&Bip32Path::cosmos(0, 0, 1)).unwrap();
    assert_ne!(pk1, pk2);
}

#[test]
#[ignore = "requires Speculos"]
fn get_pubkey_deterministic() {
    let ledger = connect();
    let path = Bip32Path::cosmos(0, 0, 0);
    assert_eq!(
        ledger.get_pubkey(&path).unwrap(),
        ledger.get_pubkey(&path).unwrap()
    );
}

#[test]
#[ignore = "requires Speculos"]
fn v2_rejects_short_path() {
    let ledger = connect();
    if ledger.protocol() != Some(AppProtocol::V2) {
        return;
    }
    let err = ledger
        .get_pubkey(&Bip32Path::new(vec![44, 118, 0]))
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidPath(_)));
}

#[test]
#[ignore = "requires Speculos with automation approving the transaction"]
fn sign_send() {
    let ledger = connect();
    let sig = ledger
        .sign(&Bip32Path::cosmos(0, 0, 0), SIGN_DOC.as_bytes())
        .unwrap();
    // DER sequence tag
    assert_eq!(sig.0[0], 0x30);
}

#[test]
#[ignore = "requires Speculos"]
fn sign_truncated_json() {
    let ledger = connect();
    let err = ledger
        .sign(&Bip32Path::cosmos(0, 0, 0), &SIGN_DOC.as_bytes()[..40])
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::IncompleteJson | LedgerError::Device(_)
    ));
}
