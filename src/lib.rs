//! Rust client for the Cosmos Ledger app (`ledger-cosmos`, app versions 1.x and 2.x).
//!
//! Talks to the Ledger hardware wallet over USB HID or TCP (Speculos simulator).
//!
//! # Quick start
//!
//! ```no_run
//! use ledger_cosmos::{Bip32Path, LedgerCosmos, TransportType};
//!
//! let ledger = LedgerCosmos::new(&TransportType::NativeHID)?;
//! println!("{}", ledger.version());
//!
//! let path = Bip32Path::cosmos(0, 0, 0);
//! let (pubkey, address) = ledger.get_address_pubkey(&path, "cosmos", false)?;
//! println!("{pubkey} {address}");
//! # Ok::<(), ledger_cosmos::LedgerError>(())
//! ```
//!
//! # Modules
//!
//! - [`api`] -- high-level [`LedgerCosmos`] session
//! - [`transport`] -- device discovery and communication (USB HID, TCP)
//! - [`config`] -- [`ProtocolConfig`], the class byte, opcodes and chunk size
//! - [`types`] -- [`Bip32Path`], [`VersionInfo`], [`Hrp`], [`PublicKey`], [`Address`], [`Signature`]
//!
//! # Feature flags
//!
//! - `hid` (default) -- USB HID transport for real Ledger devices
//! - `tcp` -- TCP transport for the Speculos simulator

pub mod apdu;
pub mod api;
pub(crate) mod commands;
pub mod config;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod types;

pub use api::LedgerCosmos;
pub use commands::get_version::check_min_version;
pub use config::ProtocolConfig;
pub use error::{LedgerError, StatusWord, TransportError};
pub use protocol::AppProtocol;
#[cfg(feature = "hid")]
pub use transport::hid::DeviceType;
pub use transport::{Connector, Transport, TransportType};
pub use types::{Address, Bip32Path, Hrp, PublicKey, Signature, VersionInfo};
