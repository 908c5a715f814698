//! JH-42 — the SHA-3 final-round submission.
//!
//! Byte-oriented reference form: the 1024-bit state is grouped into 256
//! 4-bit elements, put through 42 rounds of S-box / linear / permutation
//! layers, and degrouped. Round constants are 256-bit values generated
//! in-flight by running the same round (constant-free, S0 only) over a
//! 64-element constant state seeded from the published initial value.
//! The digest is the trailing `bits/8` bytes of the final state.

use crate::source::{fill_block, MessageSource};
use crate::{HashError, MessageDigest};

const S0: [u8; 16] = [9, 0, 4, 11, 13, 12, 3, 15, 1, 10, 2, 6, 7, 5, 8, 14];
const S1: [u8; 16] = [3, 12, 6, 13, 5, 7, 1, 9, 15, 2, 0, 4, 11, 10, 14, 8];

/// Published seed for the round-constant generator (64 4-bit elements).
const RC_SEED: [u8; 32] = [
    0x6a, 0x09, 0xe6, 0x67, 0xf3, 0xbc, 0xc9, 0x08,
    0xb2, 0xfb, 0x13, 0x66, 0xea, 0x95, 0x7d, 0x3e,
    0x3a, 0xde, 0xc1, 0x75, 0x12, 0x77, 0x50, 0x99,
    0xda, 0x2f, 0x59, 0x0b, 0x06, 0x67, 0x32, 0x2a,
];

/// The MDS code over GF(2^4), polynomial x^4 + x + 1: multiply by 2.
#[inline(always)]
fn mul2(x: u8) -> u8 {
    ((x << 1) ^ (x >> 3) ^ ((x >> 2) & 2)) & 0xf
}

/// Linear layer over an element pair.
#[inline(always)]
fn linear(a: u8, b: u8) -> (u8, u8) {
    let b = b ^ mul2(a);
    let a = a ^ mul2(b);
    (a, b)
}

/// The permutation layer P_d on a 4n-element slice: π (swap the back pair
/// of every quad), P' (even/odd split), φ (swap pairs in the second half).
fn permute_elements(elems: &mut [u8]) {
    let n = elems.len();
    for i in (0..n).step_by(4) {
        elems.swap(i + 2, i + 3);
    }
    let tmp = elems.to_vec();
    for i in 0..n / 2 {
        elems[i] = tmp[2 * i];
        elems[i + n / 2] = tmp[2 * i + 1];
    }
    for i in (n / 2..n).step_by(2) {
        elems.swap(i, i + 1);
    }
}

/// Advance the 64-element round-constant state by one round.
fn next_round_constant(rc: &mut [u8; 64]) {
    for e in rc.iter_mut() {
        *e = S0[*e as usize];
    }
    for i in (0..64).step_by(2) {
        let (a, b) = linear(rc[i], rc[i + 1]);
        rc[i] = a;
        rc[i + 1] = b;
    }
    permute_elements(rc);
}

/// The bijective function E8: group, 42 rounds, degroup.
fn e8(h: &mut [u8; 128]) {
    #[inline(always)]
    fn bit(h: &[u8; 128], i: usize) -> u8 {
        (h[i >> 3] >> (7 - (i & 7))) & 1
    }

    // Group the state bits into 256 4-bit elements, even/odd interleaved.
    let mut tem = [0u8; 256];
    for i in 0..256 {
        tem[i] = (bit(h, i) << 3)
            | (bit(h, i + 256) << 2)
            | (bit(h, i + 512) << 1)
            | bit(h, i + 768);
    }
    let mut a = [0u8; 256];
    for i in 0..128 {
        a[2 * i] = tem[i];
        a[2 * i + 1] = tem[i + 128];
    }

    // Expand the seed into element form: one 4-bit element per nibble.
    let mut rc = [0u8; 64];
    for i in 0..32 {
        rc[2 * i] = RC_SEED[i] >> 4;
        rc[2 * i + 1] = RC_SEED[i] & 0xf;
    }

    for _round in 0..42 {
        // S-box layer: bit i of the 256-bit round constant selects S0/S1
        // for element i.
        for i in 0..256 {
            let sel = (rc[i >> 2] >> (3 - (i & 3))) & 1;
            a[i] = if sel == 0 {
                S0[a[i] as usize]
            } else {
                S1[a[i] as usize]
            };
        }
        for i in (0..256).step_by(2) {
            let (x, y) = linear(a[i], a[i + 1]);
            a[i] = x;
            a[i + 1] = y;
        }
        permute_elements(&mut a);
        next_round_constant(&mut rc);
    }

    // Degroup.
    for i in 0..128 {
        tem[i] = a[2 * i];
        tem[i + 128] = a[2 * i + 1];
    }
    h.fill(0);
    for i in 0..256 {
        let e = tem[i];
        h[i >> 3] |= ((e >> 3) & 1) << (7 - (i & 7));
        h[(i + 256) >> 3] |= ((e >> 2) & 1) << (7 - (i & 7));
        h[(i + 512) >> 3] |= ((e >> 1) & 1) << (7 - (i & 7));
        h[(i + 768) >> 3] |= (e & 1) << (7 - (i & 7));
    }
}

/// Compression F8: XOR the 64-byte block into the front half, E8, XOR the
/// block into the back half.
fn f8(h: &mut [u8; 128], m: &[u8; 64]) {
    for i in 0..64 {
        h[i] ^= m[i];
    }
    e8(h);
    for i in 0..64 {
        h[64 + i] ^= m[i];
    }
}

/// The JH digest at 224/256/384/512 bits.
pub struct Jh {
    bits: u32,
}

impl Default for Jh {
    fn default() -> Self {
        Jh { bits: 256 }
    }
}

impl MessageDigest for Jh {
    fn configure(&mut self, output_bits: u32) -> Result<(), HashError> {
        match output_bits {
            224 | 256 | 384 | 512 => {
                self.bits = output_bits;
                Ok(())
            }
            other => Err(HashError::InvalidConfig(format!(
                "JH does not support a {other}-bit output"
            ))),
        }
    }

    fn output_bits(&self) -> u32 {
        self.bits
    }

    fn compute(&mut self, source: &mut dyn MessageSource) -> Result<Vec<u8>, HashError> {
        // H(0): digest width big-endian in the first two bytes, then one
        // compression of the zero block.
        let mut h = [0u8; 128];
        h[0] = (self.bits >> 8) as u8;
        h[1] = self.bits as u8;
        f8(&mut h, &[0u8; 64]);

        let mut block = [0u8; 64];
        let mut total: u64 = 0;
        let filled = loop {
            let n = fill_block(source, &mut block)?;
            total += n as u64;
            if n < 64 {
                break n;
            }
            f8(&mut h, &block);
        };

        // At least 512 bits of padding: 0x80, zeros, and a 128-bit
        // big-endian bit length closing the final block.
        let bit_len = (total as u128).wrapping_mul(8);
        if filled == 0 {
            let mut last = [0u8; 64];
            last[0] = 0x80;
            last[48..].copy_from_slice(&bit_len.to_be_bytes());
            f8(&mut h, &last);
        } else {
            block[filled] = 0x80;
            block[filled + 1..].fill(0);
            f8(&mut h, &block);
            let mut last = [0u8; 64];
            last[48..].copy_from_slice(&bit_len.to_be_bytes());
            f8(&mut h, &last);
        }

        Ok(h[128 - self.bits as usize / 8..].to_vec())
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Vectors from the JH submission package (42-round version).
// ──────────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn digest(bits: u32, data: &[u8]) -> String {
        let mut jh = Jh::default();
        jh.configure(bits).unwrap();
        hex::encode(jh.compute_bytes(data).unwrap())
    }

    #[test]
    fn submission_vector_empty_input() {
        assert_eq!(
            digest(224, b""),
            "2c99df889b019309051c60fecc2bd285a774940e43175b76b2626630"
        );
        assert_eq!(
            digest(256, b""),
            "46e64619c18bb0a92a5e87185a47eef83ca747b8fcc8e1412921357e326df434"
        );
        assert_eq!(
            digest(384, b""),
            "2fe5f71b1b3290d3c017fb3c1a4d02a5cbeb03a0476481e25082434a881994b0\
             ff99e078d2c16b105ad069b569315328"
        );
        assert_eq!(
            digest(512, b""),
            "90ecf2f76f9d2c8017d979ad5ab96b87d58fc8fc4b83060f3f900774faa2c8fa\
             be69c5f4ff1ec2b61d6b316941cedee117fb04b1f4c5bc1b919ae841c50eec4f"
        );
    }

    #[test]
    fn pinned_abc() {
        assert_eq!(
            digest(256, b"abc"),
            "924bc82f24a76d519d4f69493da7fa70dc88bdb6016b6d1cc1dcf7def15e9cdd"
        );
        assert_eq!(
            digest(512, b"abc"),
            "a05eab9c641cb901107d9880bcdf0eedb19b0073188896365921bd200225d917\
             6cf136e7af90d67bdb05dfa3037e48b757d23a905b2270db67255b9eca982973"
        );
    }

    #[test]
    fn pinned_block_aligned_message_gets_one_pad_block() {
        // 55 bytes ends mid-block: two compressions of padding.
        assert_eq!(
            digest(256, &[b'a'; 55]),
            "e1e11c5c466f5c1f6e606feb800c62c8daefa9b4f59cb22a7ebbc9d6fa531aa1"
        );
    }

    #[test]
    fn pinned_multi_block() {
        let data: Vec<u8> = (0..200).map(|i| i as u8).collect();
        assert_eq!(
            digest(224, &data),
            "6fe905e84fdaed0c15310477c13dfc4cdb598df18916ab9b488faee1"
        );
        assert_eq!(
            digest(384, &data),
            "f31d64aa6fb889c395624c23e37c306220a380b08c6fcfc30ce51749f65c6d37\
             c61d4a73e691284e2ef83daa1170dca3"
        );
    }
}
