//! APDU command and response types.
//!
//! The Cosmos app uses CLA `0x55` for every command. P1/P2 carry the
//! confirmation flag and the chunk sequencing for signing.

use crate::error::LedgerError;

/// Largest payload a short APDU can carry (the LC byte).
pub const MAX_APDU_DATA: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduCommand {
    pub cla: u8,
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
    pub data: Vec<u8>,
}

impl ApduCommand {
    pub fn new(cla: u8, ins: u8) -> Self {
        Self {
            cla,
            ins,
            p1: 0x00,
            p2: 0x00,
            data: Vec::new(),
        }
    }

    pub fn with_data(cla: u8, ins: u8, p1: u8, p2: u8, data: Vec<u8>) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data,
        }
    }

    /// Wire format: `[CLA][INS][P1][P2][LC][DATA]`
    ///
    /// Fails with [`LedgerError::PayloadTooLarge`] if `data` does not fit
    /// in the one-byte LC field.
    pub fn serialize(&self) -> Result<Vec<u8>, LedgerError> {
        if self.data.len() > MAX_APDU_DATA {
            return Err(LedgerError::PayloadTooLarge(self.data.len()));
        }
        let mut buf = Vec::with_capacity(5 + self.data.len());
        buf.push(self.cla);
        buf.push(self.ins);
        buf.push(self.p1);
        buf.push(self.p2);
        buf.push(self.data.len() as u8);
        buf.extend_from_slice(&self.data);
        Ok(buf)
    }
}

/// APDU response - last 2 bytes are the status word, everything before
/// that is the payload. Use [`data()`](ApduAnswer::data) to strip the SW.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduAnswer {
    raw: Vec<u8>,
}

impl ApduAnswer {
    pub fn from_raw(raw: Vec<u8>) -> Self {
        Self { raw }
    }

    /// Build an answer from a payload and a status word.
    pub fn new(data: &[u8], retcode: u16) -> Self {
        let mut raw = Vec::with_capacity(data.len() + 2);
        raw.extend_from_slice(data);
        raw.extend_from_slice(&retcode.to_be_bytes());
        Self { raw }
    }

    pub fn retcode(&self) -> u16 {
        if self.raw.len() < 2 {
            return 0;
        }
        let len = self.raw.len();
        ((self.raw[len - 2] as u16) << 8) | (self.raw[len - 1] as u16)
    }

    /// Payload only - strips the trailing 2-byte status word.
    pub fn data(&self) -> &[u8] {
        if self.raw.len() < 2 {
            return &[];
        }
        &self.raw[..self.raw.len() - 2]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Instruction {
    GetVersion = 0x00,
    SignSecp256k1 = 0x02,
    GetAddrSecp256k1 = 0x04,
}
