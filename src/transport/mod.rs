//! Transport backends for talking to Ledger devices.
//!
//! - [`hid::HidConnector`] -- USB HID for real hardware (feature `hid`, default)
//! - [`tcp::TcpConnector`] -- TCP for the Speculos simulator (feature `tcp`)

#[cfg(feature = "hid")]
pub mod hid;
#[cfg(feature = "tcp")]
pub mod tcp;

use crate::apdu::{ApduAnswer, ApduCommand};
use crate::error::TransportError;

/// One open device handle.
pub trait Transport: Send + Sync {
    fn exchange(&self, command: &ApduCommand) -> Result<ApduAnswer, TransportError>;

    /// Release the device. Dropping the transport releases it too; this
    /// only exists so callers can observe a failing close.
    fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Device discovery: count what is attached, then open one by index.
pub trait Connector {
    fn count_devices(&self) -> Result<usize, TransportError>;

    fn connect(&self, index: usize) -> Result<Box<dyn Transport>, TransportError>;
}

#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum TransportType {
    #[cfg(feature = "hid")]
    NativeHID,
    /// `(host, port)` for the Speculos simulator.
    #[cfg(feature = "tcp")]
    TCP(String, u16),
}

pub fn connector(transport_type: &TransportType) -> Result<Box<dyn Connector>, TransportError> {
    match transport_type {
        #[cfg(feature = "hid")]
        TransportType::NativeHID => {
            let c = hid::HidConnector::new()?;
            Ok(Box::new(c))
        }
        #[cfg(feature = "tcp")]
        TransportType::TCP(host, port) => Ok(Box::new(tcp::TcpConnector::new(host, *port))),
        #[allow(unreachable_patterns)]
        _ => Err(TransportError::Comm(
            "no transport enabled — enable the 'hid' or 'tcp' feature".into(),
        )),
    }
}
