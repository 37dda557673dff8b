//! Protocol constants, injected into the session so test doubles can use
//! different limits.

use crate::apdu::{Instruction, MAX_APDU_DATA};
use crate::error::LedgerError;

/// Class byte used by the Cosmos app.
pub const CLA: u8 = 0x55;

/// Largest transaction slice sent in one sign frame.
pub const CHUNK_SIZE: usize = 250;

/// Number of leading path components that get the hardened bit.
pub const HARDEN_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolConfig {
    pub cla: u8,
    pub ins_get_version: u8,
    pub ins_sign: u8,
    pub ins_get_address: u8,
    pub chunk_size: usize,
    pub harden_count: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            cla: CLA,
            ins_get_version: Instruction::GetVersion as u8,
            ins_sign: Instruction::SignSecp256k1 as u8,
            ins_get_address: Instruction::GetAddrSecp256k1 as u8,
            chunk_size: CHUNK_SIZE,
            harden_count: HARDEN_COUNT,
        }
    }
}

impl ProtocolConfig {
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn with_harden_count(mut self, harden_count: usize) -> Self {
        self.harden_count = harden_count;
        self
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.chunk_size == 0 || self.chunk_size > MAX_APDU_DATA {
            return Err(LedgerError::InvalidConfig(format!(
                "chunk size must be in 1..={MAX_APDU_DATA}, got {}",
                self.chunk_size
            )));
        }
        if self.harden_count > 5 {
            return Err(LedgerError::InvalidConfig(format!(
                "harden count must be at most 5, got {}",
                self.harden_count
            )));
        }
        Ok(())
    }
}
