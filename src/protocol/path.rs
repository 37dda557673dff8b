//! Derivation path layouts understood by the app.
//!
//! - v1: `[n: u8][path[0]: u32 LE]...[path[9]: u32 LE]`, always 41 bytes;
//!   up to 10 components, unused slots are zero
//! - v2: `[path[0]: u32 LE]...[path[4]: u32 LE]`, exactly 5 components

use byteorder::{ByteOrder, LittleEndian};

use crate::error::LedgerError;
use crate::types::{Bip32Path, HARDENED};

pub const MAX_V1_DEPTH: usize = 10;
pub const V2_DEPTH: usize = 5;

/// Encoded v1 path size, independent of depth.
pub const V1_LEN: usize = 1 + MAX_V1_DEPTH * 4;

pub fn serialize_v1(path: &Bip32Path, harden_count: usize) -> Result<Vec<u8>, LedgerError> {
    if path.len() > MAX_V1_DEPTH {
        return Err(LedgerError::InvalidPath(format!(
            "maximum depth is {MAX_V1_DEPTH}, got {}",
            path.len()
        )));
    }

    let mut buf = vec![0u8; V1_LEN];
    buf[0] = path.len() as u8;
    write_components(&mut buf[1..], path, harden_count);
    Ok(buf)
}

pub fn serialize_v2(path: &Bip32Path, harden_count: usize) -> Result<Vec<u8>, LedgerError> {
    if path.len() != V2_DEPTH {
        return Err(LedgerError::InvalidPath(format!(
            "path must contain {V2_DEPTH} components, got {}",
            path.len()
        )));
    }

    let mut buf = vec![0u8; V2_DEPTH * 4];
    write_components(&mut buf, path, harden_count);
    Ok(buf)
}

fn write_components(buf: &mut [u8], path: &Bip32Path, harden_count: usize) {
    for (i, (&component, out)) in path
        .components()
        .iter()
        .zip(buf.chunks_exact_mut(4))
        .enumerate()
    {
        let value = if i < harden_count {
            component | HARDENED
        } else {
            component
        };
        LittleEndian::write_u32(out, value);
    }
}
