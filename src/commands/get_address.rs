use crate::apdu::ApduCommand;
use crate::config::ProtocolConfig;
use crate::error::LedgerError;
use crate::protocol::{self, AppProtocol};
use crate::transport::Transport;
use crate::types::{Address, Bip32Path, Hrp, PublicKey};

const PUBKEY_LEN: usize = 33;

/// Payload: `[hrp_len][hrp][path]`. P1 = 1 asks the user to confirm the
/// address on device, and the call then blocks until they answer.
///
/// Response: `[pubkey (33)][bech32 address]`
pub fn exec(
    transport: &dyn Transport,
    config: &ProtocolConfig,
    protocol: AppProtocol,
    path: &Bip32Path,
    hrp: &Hrp,
    require_confirmation: bool,
) -> Result<(PublicKey, Address), LedgerError> {
    let path_bytes = protocol.serialize_path(path, config.harden_count)?;

    let mut data = Vec::with_capacity(1 + hrp.len() + path_bytes.len());
    data.push(hrp.len() as u8);
    data.extend_from_slice(hrp.as_bytes());
    data.extend_from_slice(&path_bytes);

    let p1 = u8::from(require_confirmation);
    let cmd = ApduCommand::with_data(config.cla, config.ins_get_address, p1, 0, data);
    let result = protocol::exchange(transport, &cmd)?;
    parse_address_response(&result, hrp)
}

pub(crate) fn parse_address_response(
    data: &[u8],
    hrp: &Hrp,
) -> Result<(PublicKey, Address), LedgerError> {
    // key + at least the hrp, the separator and one data character
    if data.len() < PUBKEY_LEN + 2 + hrp.len() {
        return Err(LedgerError::MalformedResponse(format!(
            "address response is {} bytes, expected at least {}",
            data.len(),
            PUBKEY_LEN + 2 + hrp.len()
        )));
    }

    let mut pubkey = [0u8; PUBKEY_LEN];
    pubkey.copy_from_slice(&data[..PUBKEY_LEN]);

    let address = std::str::from_utf8(&data[PUBKEY_LEN..])
        .map_err(|e| LedgerError::MalformedResponse(format!("address is not UTF-8: {e}")))?;

    Ok((PublicKey(pubkey), Address(address.to_owned())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(addr: &str) -> Vec<u8> {
        let mut data = vec![0x02];
        data.extend_from_slice(&[0x11; 32]);
        data.extend_from_slice(addr.as_bytes());
        data
    }

    #[test]
    fn parse_valid_response() {
        let hrp = Hrp::new("cosmos").unwrap();
        let (pk, addr) =
            parse_address_response(&response("cosmos1qypqxpq9qcrsszg"), &hrp).unwrap();
        assert_eq!(pk.0[0], 0x02);
        assert_eq!(pk.0[1..], [0x11; 32]);
        assert_eq!(addr.0, "cosmos1qypqxpq9qcrsszg");
    }

    #[test]
    fn parse_minimum_length() {
        let hrp = Hrp::new("cosmos").unwrap();
        assert!(parse_address_response(&response("cosmos1q"), &hrp).is_ok());
    }

    #[test]
    fn parse_too_short() {
        let hrp = Hrp::new("cosmos").unwrap();
        let err = parse_address_response(&response("cosmos1"), &hrp).unwrap_err();
        assert!(matches!(err, LedgerError::MalformedResponse(_)));
    }

    #[test]
    fn parse_rejects_invalid_utf8() {
        let hrp = Hrp::new("a").unwrap();
        let mut data = response("");
        data.extend_from_slice(&[0xFF, 0xFE, 0xFD]);
        let err = parse_address_response(&data, &hrp).unwrap_err();
        assert!(matches!(err, LedgerError::MalformedResponse(_)));
    }
}
