//! QmhHuk — a deliberate, non-standard SHA-2 variant.
//!
//! Same Merkle–Damgård skeleton as SHA-2, different everything else:
//! constants derived from the 64 primes 419..827, shortened round counts
//! (56 for the 32-bit widths, 64 for the 64-bit widths), its own rotation
//! sets, a four-temporary round step with XOR mixing, an XOR state merge,
//! and π/φ-fraction padding with a two-byte output-width marker ahead of
//! the length field. Not a standardized primitive; do not use it where an
//! audited hash is required.
//!
//! The canonical constant tables live below; their derivation is recorded
//! in DESIGN.md and reproduces the published SHA-256 tables when run over
//! the first 64 primes.

use crate::source::{fill_block, MessageSource};
use crate::{HashError, MessageDigest};

// ──────────────────────────────────────────────────────────────────────────────
// Initial hash values
// (First 32/64 bits of the fractional parts of the square roots of the
// primes 419..457; the 224/384 widths use the primes 461..503)
// ──────────────────────────────────────────────────────────────────────────────
const IV_224: [u32; 8] = [
    0xfbeb2197, 0xa93033fe, 0x0bfef64a, 0x4ca0d2cd,
    0x3e214144, 0x3a16f2fe, 0x52391dbe, 0xec6a09c2,
];

const IV_256: [u32; 8] = [
    0x78307697, 0x84ae4b7c, 0xc2b2b755, 0xcf03d20e,
    0xf3cbb117, 0x0c2d3b4b, 0x308af161, 0x60a7a998,
];

const IV_384: [u64; 8] = [
    0x788d9812fbeb2197, 0x84769b42a93033fe,
    0x9c34f0620bfef64a, 0xe2d564c44ca0d2cd,
    0x116d75fd3e214144, 0x2894c1073a16f2fe,
    0x569b58c652391dbe, 0x6d7b3939ec6a09c2,
];

const IV_512: [u64; 8] = [
    0x7830769755fe0b0a, 0x84ae4b7cb79286a4,
    0xc2b2b7559233f645, 0xcf03d20e5acfa987,
    0xf3cbb117dbf3c297, 0x0c2d3b4be1707aba,
    0x308af161f4a4e085, 0x60a7a9985b936a57,
];

// ──────────────────────────────────────────────────────────────────────────────
// Round constants
// (First 32/64 bits of the fractional parts of the cube roots of the 64
// primes 419..827; the 32-bit widths consume the first 56 entries)
// ──────────────────────────────────────────────────────────────────────────────
const K32: [u32; 64] = [
    0x7ba0ea2d, 0x7eabf2d0, 0x8dbe8d03, 0x90bb1721,
    0x99a2ad45, 0x9f86e289, 0xa84c4472, 0xb3df34fc,
    0xb99bb8d7, 0xbc76cbab, 0xc226a69a, 0xd304f19a,
    0xde1be20a, 0xe39bb437, 0xee84927c, 0xf3edd277,
    0xfbfdfe53, 0x0bee2c7a, 0x0e90181c, 0x25f57204,
    0x2da45582, 0x3a52c34c, 0x41dc0172, 0x495796fc,
    0x4bd31fc6, 0x533cde21, 0x5f7abfe3, 0x66c206b3,
    0x6dfcc6bc, 0x7062f20f, 0x778d5127, 0x7eaba3cc,
    0x8363eccc, 0x85be1c25, 0x93c04028, 0x9f4a205f,
    0xa1953565, 0xa627bb0f, 0xacfa8089, 0xb3c29b23,
    0xb602f6fa, 0xc36cee0a, 0xc7dc81ee, 0xce7b8471,
    0xd740288c, 0xe21dba7a, 0xeabbff66, 0xf56a9e60,
    0xfde41d72, 0x0434d097, 0x0a7cb752, 0x0ea7d22d,
    0x16f2987f, 0x1d20cdcd, 0x213af85a, 0x2964505c,
    0x2d738e11, 0x3b8cea0e, 0x4584e6ae, 0x515f4356,
    0x5356112d, 0x5d1bc3ed, 0x5f0da9f8, 0x62ef0be4,
];

const K64: [u64; 64] = [
    0x7ba0ea2d98160007, 0x7eabf2d0c21f964a, 0x8dbe8d038b409545, 0x90bb1721582e8285,
    0x99a2ad45936d4e61, 0x9f86e289fe03e739, 0xa84c4472faa9a82f, 0xb3df34fce89e0532,
    0xb99bb8d7b173534f, 0xbc76cbab1aea1f9c, 0xc226a69a780f3cc3, 0xd304f19aa233957d,
    0xde1be20a212129dd, 0xe39bb43755141950, 0xee84927cea48ddd2, 0xf3edd2773c523b67,
    0xfbfdfe53a8d32f2a, 0x0bee2c7ab77e9e25, 0x0e90181cf1b09e56, 0x25f57204c725bed8,
    0x2da45582cd598b32, 0x3a52c34c203bfcf3, 0x41dc0172cd1991c1, 0x495796fcb33cc1c0,
    0x4bd31fc693f9f16e, 0x533cde2115f5a9a0, 0x5f7abfe36e99c1d3, 0x66c206b310a57e6f,
    0x6dfcc6bc39603f61, 0x7062f20f86fd1052, 0x778d51277adec865, 0x7eaba3cc25da7048,
    0x8363eccc37a5be05, 0x85be1c253beba54e, 0x93c04028f348bbc5, 0x9f4a205fd05b2148,
    0xa19535651ca6d2de, 0xa627bb0fbf027bc7, 0xacfa80891da2f06b, 0xb3c29b23031a7f9d,
    0xb602f6fac7d3d74d, 0xc36cee0a10c7ba49, 0xc7dc81eea9ebad4f, 0xce7b8471b0f809df,
    0xd740288c84df269c, 0xe21dba7ac2290607, 0xeabbff66be175964, 0xf56a9e60f62cea92,
    0xfde41d729d126eab, 0x0434d0970e42e781, 0x0a7cb752a3f1cd86, 0x0ea7d22d6bcd7382,
    0x16f2987f9495a5ee, 0x1d20cdcd45b8de1e, 0x213af85a39b0c320, 0x2964505c52a2f35b,
    0x2d738e114181e082, 0x3b8cea0e71c58aaf, 0x4584e6ae9f54016e, 0x515f4356903dccc2,
    0x5356112ddfd5a8e9, 0x5d1bc3edbe2c897a, 0x5f0da9f8ed53548b, 0x62ef0be4d5492e78,
];

// ──────────────────────────────────────────────────────────────────────────────
// Padding tables: the first 128 bytes of the fractional parts of π and φ.
// The pad run after 0x80 draws from PI_PAD at the byte's in-block offset;
// a second padding block (when the 10-byte trailer does not fit) draws
// from PHI_PAD instead.
// ──────────────────────────────────────────────────────────────────────────────
const PI_PAD: [u8; 128] = [
    0x24, 0x3f, 0x6a, 0x88, 0x85, 0xa3, 0x08, 0xd3, 0x13, 0x19, 0x8a, 0x2e, 0x03, 0x70, 0x73, 0x44,
    0xa4, 0x09, 0x38, 0x22, 0x29, 0x9f, 0x31, 0xd0, 0x08, 0x2e, 0xfa, 0x98, 0xec, 0x4e, 0x6c, 0x89,
    0x45, 0x28, 0x21, 0xe6, 0x38, 0xd0, 0x13, 0x77, 0xbe, 0x54, 0x66, 0xcf, 0x34, 0xe9, 0x0c, 0x6c,
    0xc0, 0xac, 0x29, 0xb7, 0xc9, 0x7c, 0x50, 0xdd, 0x3f, 0x84, 0xd5, 0xb5, 0xb5, 0x47, 0x09, 0x17,
    0x92, 0x16, 0xd5, 0xd9, 0x89, 0x79, 0xfb, 0x1b, 0xd1, 0x31, 0x0b, 0xa6, 0x98, 0xdf, 0xb5, 0xac,
    0x2f, 0xfd, 0x72, 0xdb, 0xd0, 0x1a, 0xdf, 0xb7, 0xb8, 0xe1, 0xaf, 0xed, 0x6a, 0x26, 0x7e, 0x96,
    0xba, 0x7c, 0x90, 0x45, 0xf1, 0x2c, 0x7f, 0x99, 0x24, 0xa1, 0x99, 0x47, 0xb3, 0x91, 0x6c, 0xf7,
    0x08, 0x01, 0xf2, 0xe2, 0x85, 0x8e, 0xfc, 0x16, 0x63, 0x69, 0x20, 0xd8, 0x71, 0x57, 0x4e, 0x69,
];

const PHI_PAD: [u8; 128] = [
    0x9e, 0x37, 0x79, 0xb9, 0x7f, 0x4a, 0x7c, 0x15, 0xf3, 0x9c, 0xc0, 0x60, 0x5c, 0xed, 0xc8, 0x34,
    0x10, 0x82, 0x27, 0x6b, 0xf3, 0xa2, 0x72, 0x51, 0xf8, 0x6c, 0x6a, 0x11, 0xd0, 0xc1, 0x8e, 0x95,
    0x27, 0x67, 0xf0, 0xb1, 0x53, 0xd2, 0x7b, 0x7f, 0x03, 0x47, 0x04, 0x5b, 0x5b, 0xf1, 0x82, 0x7f,
    0x01, 0x88, 0x6f, 0x09, 0x28, 0x40, 0x30, 0x02, 0xc1, 0xd6, 0x4b, 0xa4, 0x0f, 0x33, 0x5e, 0x36,
    0xf0, 0x6a, 0xd7, 0xae, 0x97, 0x17, 0x87, 0x7e, 0x85, 0x83, 0x9d, 0x6e, 0xff, 0xbd, 0x7d, 0xc6,
    0x64, 0xd3, 0x25, 0xd1, 0xc5, 0x37, 0x16, 0x82, 0xca, 0xdd, 0x0c, 0xcc, 0xfd, 0xff, 0xbb, 0xe1,
    0x62, 0x6e, 0x33, 0xb8, 0xd0, 0x4b, 0x43, 0x31, 0xbb, 0xf7, 0x3c, 0x79, 0x0d, 0x94, 0xf7, 0x9d,
    0x47, 0x1c, 0x4a, 0xb3, 0xed, 0x3d, 0x82, 0xa5, 0xfe, 0xc5, 0x07, 0x70, 0x5e, 0x4a, 0xe6, 0xe5,
];

// ──────────────────────────────────────────────────────────────────────────────
// Logical functions. Same shapes as SHA-2, different rotation sets.
// ──────────────────────────────────────────────────────────────────────────────

#[inline(always)]
fn ch32(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ ((!x) & z)
}

#[inline(always)]
fn maj32(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (x & z) ^ (y & z)
}

#[inline(always)]
fn sigma0_upper32(x: u32) -> u32 {
    x.rotate_right(3) ^ x.rotate_right(14) ^ x.rotate_right(25)
}

#[inline(always)]
fn sigma1_upper32(x: u32) -> u32 {
    x.rotate_right(8) ^ x.rotate_right(17) ^ x.rotate_right(28)
}

#[inline(always)]
fn sigma0_lower32(x: u32) -> u32 {
    x.rotate_right(5) ^ x.rotate_right(12) ^ (x >> 4)
}

#[inline(always)]
fn sigma1_lower32(x: u32) -> u32 {
    x.rotate_right(15) ^ x.rotate_right(21) ^ (x >> 9)
}

#[inline(always)]
fn ch64(x: u64, y: u64, z: u64) -> u64 {
    (x & y) ^ ((!x) & z)
}

#[inline(always)]
fn maj64(x: u64, y: u64, z: u64) -> u64 {
    (x & y) ^ (x & z) ^ (y & z)
}

#[inline(always)]
fn sigma0_upper64(x: u64) -> u64 {
    x.rotate_right(9) ^ x.rotate_right(30) ^ x.rotate_right(46)
}

#[inline(always)]
fn sigma1_upper64(x: u64) -> u64 {
    x.rotate_right(15) ^ x.rotate_right(24) ^ x.rotate_right(47)
}

#[inline(always)]
fn sigma0_lower64(x: u64) -> u64 {
    x.rotate_right(2) ^ x.rotate_right(10) ^ (x >> 8)
}

#[inline(always)]
fn sigma1_lower64(x: u64) -> u64 {
    x.rotate_right(23) ^ x.rotate_right(42) ^ (x >> 12)
}

/// 56 rounds over a 512-bit block; XOR merge into the chaining state.
fn compress32(state: &mut [u32; 8], block: &[u8; 64]) {
    let mut w = [0u32; 56];
    for t in 0..16 {
        w[t] = u32::from_be_bytes([
            block[t * 4],
            block[t * 4 + 1],
            block[t * 4 + 2],
            block[t * 4 + 3],
        ]);
    }
    for t in 16..56 {
        w[t] = sigma1_lower32(w[t - 2])
            .wrapping_add(w[t - 7])
            .wrapping_add(sigma0_lower32(w[t - 15]))
            .wrapping_add(w[t - 16]);
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;

    for t in 0..56 {
        // Four temporaries computed in parallel from the entering state.
        let t1 = h
            .wrapping_add(sigma1_upper32(e))
            .wrapping_add(ch32(e, f, g))
            .wrapping_add(K32[t])
            .wrapping_add(w[t]);
        let t2 = sigma0_upper32(a).wrapping_add(maj32(a, b, c));
        let t3 = d
            .wrapping_add(sigma1_upper32(a))
            .wrapping_add(ch32(a, b, c))
            .wrapping_add(w[t]);
        let t4 = sigma0_upper32(e).wrapping_add(maj32(e, f, g));
        h = g;
        g = f ^ t1;
        f = e;
        e = t3.wrapping_add(t4);
        d = c;
        c = b ^ t3;
        b = a;
        a = t1.wrapping_add(t2);
    }

    // Block merge is XOR, not addition.
    state[0] ^= a;
    state[1] ^= b;
    state[2] ^= c;
    state[3] ^= d;
    state[4] ^= e;
    state[5] ^= f;
    state[6] ^= g;
    state[7] ^= h;
}

/// 64 rounds over a 1024-bit block; XOR merge into the chaining state.
fn compress64(state: &mut [u64; 8], block: &[u8; 128]) {
    let mut w = [0u64; 64];
    for t in 0..16 {
        let mut word = [0u8; 8];
        word.copy_from_slice(&block[t * 8..t * 8 + 8]);
        w[t] = u64::from_be_bytes(word);
    }
    for t in 16..64 {
        w[t] = sigma1_lower64(w[t - 2])
            .wrapping_add(w[t - 7])
            .wrapping_add(sigma0_lower64(w[t - 15]))
            .wrapping_add(w[t - 16]);
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;

    for t in 0..64 {
        let t1 = h
            .wrapping_add(sigma1_upper64(e))
            .wrapping_add(ch64(e, f, g))
            .wrapping_add(K64[t])
            .wrapping_add(w[t]);
        let t2 = sigma0_upper64(a).wrapping_add(maj64(a, b, c));
        let t3 = d
            .wrapping_add(sigma1_upper64(a))
            .wrapping_add(ch64(a, b, c))
            .wrapping_add(w[t]);
        let t4 = sigma0_upper64(e).wrapping_add(maj64(e, f, g));
        h = g;
        g = f ^ t1;
        f = e;
        e = t3.wrapping_add(t4);
        d = c;
        c = b ^ t3;
        b = a;
        a = t1.wrapping_add(t2);
    }

    state[0] ^= a;
    state[1] ^= b;
    state[2] ^= c;
    state[3] ^= d;
    state[4] ^= e;
    state[5] ^= f;
    state[6] ^= g;
    state[7] ^= h;
}

/// Fill `block[from..to]` from the padding table, indexed by in-block offset.
fn pad_from_table(block: &mut [u8], from: usize, to: usize, table: &[u8; 128]) {
    for i in from..to {
        block[i] = table[i];
    }
}

/// The QmhHuk digest at 224/256/384/512 bits.
pub struct QmhHuk {
    bits: u32,
}

impl Default for QmhHuk {
    fn default() -> Self {
        QmhHuk { bits: 256 }
    }
}

impl QmhHuk {
    /// Shared streaming skeleton. `blk` is 64 or 128; `compress` consumes
    /// full blocks. The trailer is 10 bytes: a 2-byte BE output-bit-length
    /// marker immediately ahead of the 8-byte BE message-bit length.
    fn run(
        &self,
        source: &mut dyn MessageSource,
        blk: usize,
        mut compress: impl FnMut(&[u8]),
    ) -> Result<(), HashError> {
        let mut block = vec![0u8; blk];
        let mut total: u64 = 0;
        let filled = loop {
            let n = fill_block(source, &mut block)?;
            total += n as u64;
            if n < blk {
                break n;
            }
            compress(&block);
        };

        let bit_len = total.wrapping_mul(8);
        block[filled] = 0x80;
        if filled + 1 > blk - 10 {
            // No room for the trailer: close this block with π bytes and
            // open a second padding block drawn from φ bytes.
            pad_from_table(&mut block, filled + 1, blk, &PI_PAD);
            compress(&block);
            pad_from_table(&mut block, 0, blk - 10, &PHI_PAD);
        } else {
            pad_from_table(&mut block, filled + 1, blk - 10, &PI_PAD);
        }
        block[blk - 10..blk - 8].copy_from_slice(&(self.bits as u16).to_be_bytes());
        block[blk - 8..].copy_from_slice(&bit_len.to_be_bytes());
        compress(&block);
        Ok(())
    }
}

impl MessageDigest for QmhHuk {
    fn configure(&mut self, output_bits: u32) -> Result<(), HashError> {
        match output_bits {
            224 | 256 | 384 | 512 => {
                self.bits = output_bits;
                Ok(())
            }
            other => Err(HashError::InvalidConfig(format!(
                "QmhHuk does not support a {other}-bit output"
            ))),
        }
    }

    fn output_bits(&self) -> u32 {
        self.bits
    }

    fn compute(&mut self, source: &mut dyn MessageSource) -> Result<Vec<u8>, HashError> {
        let out = if self.bits <= 256 {
            let mut state = if self.bits == 224 { IV_224 } else { IV_256 };
            self.run(source, 64, |block| {
                compress32(&mut state, block.try_into().expect("64-byte block"))
            })?;
            state.iter().flat_map(|w| w.to_be_bytes()).collect::<Vec<u8>>()
        } else {
            let mut state = if self.bits == 384 { IV_384 } else { IV_512 };
            self.run(source, 128, |block| {
                compress64(&mut state, block.try_into().expect("128-byte block"))
            })?;
            state.iter().flat_map(|w| w.to_be_bytes()).collect::<Vec<u8>>()
        };
        Ok(out[..self.bits as usize / 8].to_vec())
    }
}
