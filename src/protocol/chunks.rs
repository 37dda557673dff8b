//! Sign-frame planning.
//!
//! Frame 1 carries the encoded derivation path, frames 2.. carry the
//! transaction in `chunk_size` slices. The frame count travels in a single
//! byte on v1, so at most 254 data frames fit.

use crate::apdu::ApduCommand;
use crate::config::ProtocolConfig;
use crate::error::LedgerError;

use super::AppProtocol;

/// `1 + ceil(tx_len / chunk_size)`: the path frame plus the data frames.
pub fn packet_count(tx_len: usize, chunk_size: usize) -> Result<u8, LedgerError> {
    let count = 1 + tx_len.div_ceil(chunk_size);
    u8::try_from(count).map_err(|_| LedgerError::PayloadTooLarge(tx_len))
}

/// Build every frame for a sign request, in send order.
pub fn plan(
    protocol: AppProtocol,
    config: &ProtocolConfig,
    path_bytes: Vec<u8>,
    tx: &[u8],
) -> Result<Vec<ApduCommand>, LedgerError> {
    let count = packet_count(tx.len(), config.chunk_size)?;

    let payloads = std::iter::once(path_bytes)
        .chain(tx.chunks(config.chunk_size).map(<[u8]>::to_vec));

    let frames = (1..=count)
        .zip(payloads)
        .map(|(index, data)| {
            let (p1, p2) = protocol.sign_params(index, count);
            ApduCommand::with_data(config.cla, config.ins_sign, p1, p2, data)
        })
        .collect();
    Ok(frames)
}
