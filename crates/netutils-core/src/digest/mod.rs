//! Streaming 160-bit rotating XOR digest (QuickXorHash layout).
//!
//! Byte `i` of the stream is XORed into the register starting at bit
//! `11 * i mod 160`; the final 20 bytes also carry the stream length in their
//! last eight. Not a cryptographic hash; it fingerprints content for remote
//! comparison.

mod parallel;
mod register;

pub use parallel::{digest_parallel, max_workers};

use crate::transfer::read_retrying;
use base64::Engine as _;
use register::Register;
use std::io::{self, Read};

pub const DIGEST_LEN: usize = 20;
pub const WIDTH_BITS: u32 = 160;
pub const SHIFT_BITS: u32 = 11;
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

const WIDTH: usize = WIDTH_BITS as usize;

/// Incremental hasher. Feed blocks of any size with [`update`](Self::update);
/// the result does not depend on how the stream is split.
#[derive(Debug, Clone, Default)]
pub struct QuickXorHasher {
    register: Register,
    /// Bit where the next block's first byte lands.
    shift: u32,
    length: u64,
}

impl QuickXorHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, block: &[u8]) {
        if block.is_empty() {
            return;
        }
        // Bytes WIDTH apart land on the same bit, so reduce each stripe first.
        for k in 0..block.len().min(WIDTH) {
            let reduced = block[k..].iter().step_by(WIDTH).fold(0u8, |acc, b| acc ^ b);
            if reduced != 0 {
                let bit = (self.shift as usize + k * SHIFT_BITS as usize) % WIDTH;
                self.register.fold(reduced, bit as u32);
            }
        }
        let advance = SHIFT_BITS as usize * (block.len() % WIDTH);
        self.shift = ((self.shift as usize + advance) % WIDTH) as u32;
        self.length = self.length.wrapping_add(block.len() as u64);
    }

    pub fn bytes_consumed(&self) -> u64 {
        self.length
    }

    pub fn finalize(self) -> [u8; DIGEST_LEN] {
        let mut out = self.register.to_le_bytes();
        let tail = DIGEST_LEN - 8;
        for (o, l) in out[tail..].iter_mut().zip(self.length.to_le_bytes()) {
            *o ^= l;
        }
        out
    }

    /// Hasher state for a stream whose bytes were XOR-reduced by absolute
    /// position modulo 160.
    pub(super) fn from_residues(residues: &[u8; WIDTH], length: u64) -> Self {
        let mut register = Register::default();
        for (r, &byte) in residues.iter().enumerate() {
            if byte != 0 {
                register.fold(byte, ((r * SHIFT_BITS as usize) % WIDTH) as u32);
            }
        }
        Self {
            register,
            shift: ((length % WIDTH as u64) as usize * SHIFT_BITS as usize % WIDTH) as u32,
            length,
        }
    }
}

/// Digest of everything `source` yields, read in default-sized blocks.
pub fn digest<R: Read + ?Sized>(source: &mut R) -> io::Result<[u8; DIGEST_LEN]> {
    digest_with_block_size(source, DEFAULT_BLOCK_SIZE)
}

pub fn digest_with_block_size<R: Read + ?Sized>(
    source: &mut R,
    block_size: usize,
) -> io::Result<[u8; DIGEST_LEN]> {
    let mut buf = vec![0u8; block_size.max(1)];
    let mut hasher = QuickXorHasher::new();
    loop {
        let n = read_retrying(source, &mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    tracing::debug!(bytes = hasher.bytes_consumed(), "digest complete");
    Ok(hasher.finalize())
}

/// Standard base64, the form remote drives report.
pub fn encode_base64(digest: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(digest)
}

pub fn encode_hex(digest: &[u8]) -> String {
    hex::encode(digest)
}
