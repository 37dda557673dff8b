use crate::apdu::ApduCommand;
use crate::config::ProtocolConfig;
use crate::error::LedgerError;
use crate::protocol;
use crate::transport::Transport;
use crate::types::VersionInfo;

/// Response: `[app_mode][major][minor][patch]...`
pub fn exec(
    transport: &dyn Transport,
    config: &ProtocolConfig,
) -> Result<VersionInfo, LedgerError> {
    let cmd = ApduCommand::new(config.cla, config.ins_get_version);
    let result = protocol::exchange(transport, &cmd)?;
    parse_version_response(&result)
}

pub(crate) fn parse_version_response(data: &[u8]) -> Result<VersionInfo, LedgerError> {
    if data.len() < 4 {
        return Err(LedgerError::MalformedResponse(format!(
            "version response is {} bytes, expected at least 4",
            data.len()
        )));
    }

    Ok(VersionInfo {
        app_mode: data[0],
        major: data[1],
        minor: data[2],
        patch: data[3],
    })
}

/// `found` must be at least `required`, compared as `(app_mode, major, minor, patch)`.
pub fn check_min_version(found: VersionInfo, required: VersionInfo) -> Result<(), LedgerError> {
    if found < required {
        return Err(LedgerError::VersionTooOld { required, found });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_version() {
        let v = parse_version_response(&[0x00, 0x02, 0x01, 0x00]).unwrap();
        assert_eq!(v, VersionInfo::new(0, 2, 1, 0));
    }

    #[test]
    fn parse_ignores_trailing_bytes() {
        let v = parse_version_response(&[0x01, 0x01, 0x05, 0x02, 0xFF, 0xFF]).unwrap();
        assert_eq!((v.app_mode, v.major, v.minor, v.patch), (1, 1, 5, 2));
    }

    #[test]
    fn parse_too_short_response() {
        for len in 0..4 {
            let data = vec![0x01; len];
            let err = parse_version_response(&data).unwrap_err();
            assert!(matches!(err, LedgerError::MalformedResponse(_)));
        }
    }

    #[test]
    fn min_version_exact() {
        let v = VersionInfo::new(0, 1, 5, 1);
        assert!(check_min_version(v, v).is_ok());
    }

    #[test]
    fn min_version_above() {
        let required = VersionInfo::new(0, 1, 5, 1);
        assert!(check_min_version(VersionInfo::new(0, 1, 5, 2), required).is_ok());
        assert!(check_min_version(VersionInfo::new(0, 1, 6, 0), required).is_ok());
        assert!(check_min_version(VersionInfo::new(1, 0, 0, 0), required).is_ok());
    }

    #[test]
    fn min_version_below() {
        let required = VersionInfo::new(0, 1, 5, 1);
        for found in [
            VersionInfo::new(0, 1, 5, 0),
            VersionInfo::new(0, 1, 4, 9),
            VersionInfo::new(0, 1, 0, 0),
        ] {
            assert!(matches!(
                check_min_version(found, required),
                Err(LedgerError::VersionTooOld { .. })
            ));
        }
    }
}
