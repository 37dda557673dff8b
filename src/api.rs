//! High-level API - [`LedgerCosmos`] wraps a transport connection and
//! exposes all supported operations.

use crate::commands;
use crate::config::ProtocolConfig;
use crate::error::{LedgerError, StatusWord};
use crate::protocol::AppProtocol;
use crate::transport::{self, Connector, Transport, TransportType};
use crate::types::{Address, Bip32Path, Hrp, PublicKey, Signature, VersionInfo};

/// HRP used by [`LedgerCosmos::get_pubkey`].
pub const DEFAULT_HRP: &str = "cosmos";

/// High-level interface to the Cosmos Ledger app.
///
/// Owns the transport exclusively. The app version is negotiated when the
/// session opens and picks the [`AppProtocol`] every later call uses.
pub struct LedgerCosmos {
    transport: Box<dyn Transport>,
    config: ProtocolConfig,
    version: VersionInfo,
    protocol: Option<AppProtocol>,
}

impl LedgerCosmos {
    /// Connect to the first Ledger device and verify the Cosmos app is open.
    pub fn new(transport_type: &TransportType) -> Result<Self, LedgerError> {
        let connector = transport::connector(transport_type)?;
        Self::connect(connector.as_ref(), ProtocolConfig::default())
    }

    /// Open the first device `connector` reports and negotiate the app version.
    pub fn connect(
        connector: &dyn Connector,
        config: ProtocolConfig,
    ) -> Result<Self, LedgerError> {
        config.validate()?;
        if connector.count_devices()? == 0 {
            return Err(LedgerError::NoDeviceFound);
        }
        let transport = connector.connect(0).map_err(LedgerError::ConnectFailure)?;
        Self::with_transport(transport, config)
    }

    /// Negotiate over an already open transport. Useful for testing or
    /// injecting a custom transport.
    ///
    /// The transport is closed if negotiation fails.
    pub fn with_transport(
        transport: Box<dyn Transport>,
        config: ProtocolConfig,
    ) -> Result<Self, LedgerError> {
        let mut ledger = Self {
            transport,
            config,
            version: VersionInfo::default(),
            protocol: None,
        };

        match ledger.negotiate() {
            Ok(()) => Ok(ledger),
            Err(e) => {
                if let Err(close_err) = ledger.transport.close() {
                    log::warn!("failed to close transport: {close_err}");
                }
                Err(e)
            }
        }
    }

    fn negotiate(&mut self) -> Result<(), LedgerError> {
        self.config.validate()?;

        let version = self.get_version().map_err(|e| match e {
            LedgerError::DeviceStatus(code, _) if code == StatusWord::ClaNotSupported as u16 => {
                LedgerError::AppNotOpen
            }
            other => other,
        })?;
        self.check_version(version)?;

        log::info!("Cosmos app {} ({})", self.version, self.protocol_or_err()?);
        Ok(())
    }

    /// Release the transport.
    pub fn close(self) -> Result<(), LedgerError> {
        self.transport.close()?;
        Ok(())
    }

    /// Query the app version and cache it for the session.
    pub fn get_version(&mut self) -> Result<VersionInfo, LedgerError> {
        let version = commands::get_version::exec(self.transport.as_ref(), &self.config)?;
        self.version = version;
        self.protocol = AppProtocol::from_version(&version).ok();
        Ok(version)
    }

    /// Re-read the live app version and check it against the minimum for
    /// its major version.
    ///
    /// The live version is what gets checked; `candidate` is only compared
    /// against it for logging.
    pub fn check_version(&mut self, candidate: VersionInfo) -> Result<(), LedgerError> {
        let live = self.get_version()?;
        if live != candidate {
            log::debug!("checking live version {live} instead of {candidate}");
        }
        let protocol = AppProtocol::from_version(&live)?;
        commands::get_version::check_min_version(live, protocol.min_version())
    }

    /// Last version read from the device.
    pub fn version(&self) -> VersionInfo {
        self.version
    }

    pub fn protocol(&self) -> Option<AppProtocol> {
        self.protocol
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Path bytes exactly as the negotiated protocol sends them.
    pub fn serialize_path(&self, path: &Bip32Path) -> Result<Vec<u8>, LedgerError> {
        self.protocol_or_err()?
            .serialize_path(path, self.config.harden_count)
    }

    /// Compressed public key for `path`. Does not require confirmation.
    pub fn get_pubkey(&self, path: &Bip32Path) -> Result<PublicKey, LedgerError> {
        let (pubkey, _) = self.get_address_pubkey(path, DEFAULT_HRP, false)?;
        Ok(pubkey)
    }

    /// Shows the address on device and waits for user confirmation.
    pub fn show_address(
        &self,
        path: &Bip32Path,
        hrp: &str,
    ) -> Result<(PublicKey, Address), LedgerError> {
        self.get_address_pubkey(path, hrp, true)
    }

    /// Compressed public key and bech32 address for `path` under `hrp`.
    pub fn get_address_pubkey(
        &self,
        path: &Bip32Path,
        hrp: &str,
        require_confirmation: bool,
    ) -> Result<(PublicKey, Address), LedgerError> {
        let hrp = Hrp::new(hrp)?;
        commands::get_address::exec(
            self.transport.as_ref(),
            &self.config,
            self.protocol_or_err()?,
            path,
            &hrp,
            require_confirmation,
        )
    }

    /// Sign a transaction (amino JSON sign doc). Requires user confirmation.
    pub fn sign(&self, path: &Bip32Path, tx: &[u8]) -> Result<Signature, LedgerError> {
        commands::sign::exec(
            self.transport.as_ref(),
            &self.config,
            self.protocol_or_err()?,
            path,
            tx,
        )
    }

    fn protocol_or_err(&self) -> Result<AppProtocol, LedgerError> {
        self.protocol
            .ok_or(LedgerError::UnsupportedAppVersion(self.version.major))
    }
}
