use crate::config::ProtocolConfig;
use crate::error::{self, LedgerError, StatusWord};
use crate::protocol::{self, chunks, AppProtocol};
use crate::transport::Transport;
use crate::types::{Bip32Path, Signature};

/// Send the path frame and every transaction chunk, stopping at the first
/// failure. The last frame's response is the DER signature.
///
/// The device asks the user to approve the transaction, so the final
/// exchange blocks until they do.
pub fn exec(
    transport: &dyn Transport,
    config: &ProtocolConfig,
    protocol: AppProtocol,
    path: &Bip32Path,
    tx: &[u8],
) -> Result<Signature, LedgerError> {
    let path_bytes = protocol.serialize_path(path, config.harden_count)?;
    let frames = chunks::plan(protocol, config, path_bytes, tx)?;
    let count = frames.len();

    let mut last = Vec::new();
    for (i, frame) in frames.iter().enumerate() {
        log::debug!("sign frame {}/{count} ({protocol})", i + 1);
        let answer = protocol::send(transport, frame)?;
        let code = answer.retcode();
        if !StatusWord::is_success(code) {
            return Err(error::classify(protocol.sign_rules(), code, answer.data()));
        }
        last = answer.data().to_vec();
    }

    Ok(Signature(last))
}
