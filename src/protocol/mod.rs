//! Version-dependent protocol behaviour.
//!
//! The app changed its path layout, its sign-frame headers and its error
//! reporting between major versions 1 and 2. [`AppProtocol`] captures those
//! differences and is picked once from the negotiated version.

pub mod chunks;
pub mod path;

use crate::apdu::{ApduAnswer, ApduCommand};
use crate::error::{BodyRule, LedgerError, StatusWord};
use crate::transport::Transport;
use crate::types::{Bip32Path, VersionInfo};

/// P1 of a v2 sign frame that is followed by more data.
const P1_MORE: u8 = 1;
/// P1 of the last v2 sign frame.
const P1_LAST: u8 = 2;

const V1_SIGN_RULES: &[(u16, BodyRule)] =
    &[(StatusWord::BadKeyHandle as u16, BodyRule::ParserDiagnostic)];

const V2_SIGN_RULES: &[(u16, BodyRule)] = &[
    (StatusWord::BadKeyHandle as u16, BodyRule::ParserDiagnostic),
    (StatusWord::DataInvalid as u16, BodyRule::Message),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppProtocol {
    V1,
    V2,
}

impl AppProtocol {
    pub fn from_version(version: &VersionInfo) -> Result<Self, LedgerError> {
        match version.major {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            major => Err(LedgerError::UnsupportedAppVersion(major)),
        }
    }

    /// Oldest app release of this major version the client can talk to.
    pub fn min_version(self) -> VersionInfo {
        match self {
            Self::V1 => VersionInfo::new(0, 1, 5, 1),
            Self::V2 => VersionInfo::new(0, 2, 1, 0),
        }
    }

    pub fn serialize_path(
        self,
        path: &Bip32Path,
        harden_count: usize,
    ) -> Result<Vec<u8>, LedgerError> {
        match self {
            Self::V1 => path::serialize_v1(path, harden_count),
            Self::V2 => path::serialize_v2(path, harden_count),
        }
    }

    /// `(p1, p2)` for sign frame `index` (1-based) of `count`.
    pub(crate) fn sign_params(self, index: u8, count: u8) -> (u8, u8) {
        match self {
            Self::V1 => (index, count),
            Self::V2 if index == 1 => (0, 0),
            Self::V2 if index == count => (P1_LAST, 0),
            Self::V2 => (P1_MORE, 0),
        }
    }

    pub(crate) fn sign_rules(self) -> &'static [(u16, BodyRule)] {
        match self {
            Self::V1 => V1_SIGN_RULES,
            Self::V2 => V2_SIGN_RULES,
        }
    }
}

impl std::fmt::Display for AppProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V1 => write!(f, "v1"),
            Self::V2 => write!(f, "v2"),
        }
    }
}

/// Send one command; the status word is left for the caller to interpret.
pub(crate) fn send(
    transport: &dyn Transport,
    command: &ApduCommand,
) -> Result<ApduAnswer, LedgerError> {
    log::debug!(
        "-> ins=0x{:02X} p1={} p2={} lc={}",
        command.ins,
        command.p1,
        command.p2,
        command.data.len()
    );
    let answer = transport.exchange(command)?;
    log::debug!(
        "<- sw=0x{:04X} len={}",
        answer.retcode(),
        answer.data().len()
    );
    Ok(answer)
}

/// Send one command and fail on any non-success status word.
pub(crate) fn exchange(
    transport: &dyn Transport,
    command: &ApduCommand,
) -> Result<Vec<u8>, LedgerError> {
    let answer = send(transport, command)?;
    let code = answer.retcode();
    if !StatusWord::is_success(code) {
        return Err(LedgerError::from_status(code));
    }
    Ok(answer.data().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_version_selects_protocol() {
        assert_eq!(
            AppProtocol::from_version(&VersionInfo::new(0, 1, 5, 1)).unwrap(),
            AppProtocol::V1
        );
        assert_eq!(
            AppProtocol::from_version(&VersionInfo::new(0, 2, 0, 0)).unwrap(),
            AppProtocol::V2
        );
    }

    #[test]
    fn from_version_rejects_other_majors() {
        for major in [0, 3, 255] {
            assert!(matches!(
                AppProtocol::from_version(&VersionInfo::new(0, major, 9, 9)),
                Err(LedgerError::UnsupportedAppVersion(m)) if m == major
            ));
        }
    }

    #[test]
    fn v1_params_are_sequence_numbers() {
        assert_eq!(AppProtocol::V1.sign_params(1, 3), (1, 3));
        assert_eq!(AppProtocol::V1.sign_params(2, 3), (2, 3));
        assert_eq!(AppProtocol::V1.sign_params(3, 3), (3, 3));
    }

    #[test]
    fn v2_params_are_flags() {
        assert_eq!(AppProtocol::V2.sign_params(1, 3), (0, 0));
        assert_eq!(AppProtocol::V2.sign_params(2, 3), (1, 0));
        assert_eq!(AppProtocol::V2.sign_params(3, 3), (2, 0));
        // a lone path frame is still frame 1
        assert_eq!(AppProtocol::V2.sign_params(1, 1), (0, 0));
    }

    #[test]
    fn only_v2_maps_data_invalid() {
        let code = StatusWord::DataInvalid as u16;
        assert!(!AppProtocol::V1.sign_rules().iter().any(|(sw, _)| *sw == code));
        assert!(AppProtocol::V2.sign_rules().iter().any(|(sw, _)| *sw == code));
    }
}
