//! Core types: BIP32 derivation paths, app version, HRP, public key, address, signature.

use crate::error::LedgerError;

pub(crate) const HARDENED: u32 = 0x8000_0000;

const COSMOS_PURPOSE: u32 = 44;
const COSMOS_COIN_TYPE: u32 = 118;

/// Bech32 limit on the human-readable part.
pub const MAX_HRP_LEN: usize = 83;

/// BIP32 derivation path.
///
/// Components are taken as given; the encoder sets the hardened bit on the
/// leading components (see [`ProtocolConfig::harden_count`](crate::config::ProtocolConfig)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bip32Path(Vec<u32>);

impl Bip32Path {
    pub fn new(components: Vec<u32>) -> Self {
        Self(components)
    }

    /// `44/118/account/change/index`, hardened on the wire as `44'/118'/account'/change/index`.
    #[must_use]
    pub fn cosmos(account: u32, change: u32, index: u32) -> Self {
        Self(vec![COSMOS_PURPOSE, COSMOS_COIN_TYPE, account, change, index])
    }

    pub fn components(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u32>> for Bip32Path {
    fn from(components: Vec<u32>) -> Self {
        Self(components)
    }
}

impl std::fmt::Display for Bip32Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "m")?;
        for &c in &self.0 {
            let val = c & !HARDENED;
            let h = if c & HARDENED != 0 { "'" } else { "" };
            write!(f, "/{val}{h}")?;
        }
        Ok(())
    }
}

/// Version reported by the app. Field order gives the comparison priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct VersionInfo {
    pub app_mode: u8,
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl VersionInfo {
    pub const fn new(app_mode: u8, major: u8, minor: u8, patch: u8) -> Self {
        Self {
            app_mode,
            major,
            minor,
            patch,
        }
    }
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.app_mode != 0 {
            write!(f, " (mode {})", self.app_mode)?;
        }
        Ok(())
    }
}

/// Bech32 human-readable part, e.g. `cosmos`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hrp(String);

impl Hrp {
    pub fn new(hrp: &str) -> Result<Self, LedgerError> {
        if hrp.is_empty() {
            return Err(LedgerError::InvalidHrp("HRP must not be empty".into()));
        }
        if hrp.len() > MAX_HRP_LEN {
            return Err(LedgerError::InvalidHrp(format!(
                "HRP is {} bytes, max {MAX_HRP_LEN}",
                hrp.len()
            )));
        }
        // https://github.com/bitcoin/bips/blob/master/bip-0173.mediawiki
        if let Some(pos) = hrp.bytes().position(|b| !(33..=126).contains(&b)) {
            return Err(LedgerError::InvalidHrp(format!(
                "byte {pos} is outside the [33, 126] range"
            )));
        }
        Ok(Self(hrp.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Hrp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 33-byte compressed secp256k1 public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(pub [u8; 33]);

/// Bech32 account address, as rendered by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address(pub String);

/// DER-encoded secp256k1 signature, as returned by the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(pub Vec<u8>);

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}
