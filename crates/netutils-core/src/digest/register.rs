//! The 160-bit accumulator: two 64-bit cells and one 32-bit cell.

use super::{DIGEST_LEN, WIDTH_BITS};

const CELLS: usize = 3;
const LAST_CELL_BITS: u32 = 32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct Register {
    cells: [u64; CELLS],
}

fn cell_bits(idx: usize) -> u32 {
    if idx == CELLS - 1 {
        LAST_CELL_BITS
    } else {
        64
    }
}

fn mask(bits: u32) -> u64 {
    if bits == 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

impl Register {
    /// XORs `byte` into bits `bit..bit+8` of the register, wrapping from bit
    /// 159 to bit 0.
    pub(super) fn fold(&mut self, byte: u8, bit: u32) {
        debug_assert!(bit < WIDTH_BITS);
        let idx = (bit / 64) as usize;
        let off = bit % 64;
        let width = cell_bits(idx);
        let value = u64::from(byte);
        if off <= width - 8 {
            self.cells[idx] ^= value << off;
        } else {
            self.cells[idx] ^= (value << off) & mask(width);
            self.cells[(idx + 1) % CELLS] ^= value >> (width - off);
        }
    }

    /// Little-endian cells; only the low 32 bits of the last one.
    pub(super) fn to_le_bytes(self) -> [u8; DIGEST_LEN] {
        let mut out = [0u8; DIGEST_LEN];
        out[..8].copy_from_slice(&self.cells[0].to_le_bytes());
        out[8..16].copy_from_slice(&self.cells[1].to_le_bytes());
        out[16..].copy_from_slice(&self.cells[2].to_le_bytes()[..4]);
        out
    }
}
