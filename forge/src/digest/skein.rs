//! Skein — version 1.3, Skein-512 for every output width.
//!
//! UBI chaining over Threefish-512: a configuration block fixes the output
//! width, the message is absorbed under the MSG type, and one output block
//! under the OUT type squeezes the digest. Little-endian throughout.

use crate::source::{fill_block, MessageSource};
use crate::{HashError, MessageDigest};

/// Key-schedule parity constant (v1.3; replaced the flawed v1.1 value).
const C240: u64 = 0x1bd11bdaa9fc1a22;

/// Threefish-512 word permutation, applied every round.
const PERM: [usize; 8] = [2, 1, 4, 7, 6, 5, 0, 3];

/// Threefish-512 rotation constants, indexed by round mod 8.
const ROT: [[u32; 4]; 8] = [
    [46, 36, 19, 37],
    [33, 27, 14, 42],
    [17, 49, 36, 39],
    [44, 9, 54, 56],
    [39, 30, 34, 24],
    [13, 50, 10, 17],
    [25, 29, 39, 43],
    [8, 35, 56, 22],
];

// UBI type numbers (Skein v1.3 table 6).
const TYPE_CFG: u64 = 4;
const TYPE_MSG: u64 = 48;
const TYPE_OUT: u64 = 63;

const FLAG_FIRST: u64 = 1 << 62;
const FLAG_FINAL: u64 = 1 << 63;

/// Threefish-512 encryption of one 64-byte block.
fn threefish512(key: &[u64; 8], tweak: (u64, u64), block: &[u8; 64]) -> [u64; 8] {
    let mut k = [0u64; 9];
    k[..8].copy_from_slice(key);
    k[8] = key.iter().fold(C240, |acc, w| acc ^ w);
    let t = [tweak.0, tweak.1, tweak.0 ^ tweak.1];

    let mut v = [0u64; 8];
    for i in 0..8 {
        let mut word = [0u8; 8];
        word.copy_from_slice(&block[i * 8..i * 8 + 8]);
        v[i] = u64::from_le_bytes(word);
    }

    let inject = |v: &mut [u64; 8], s: u64| {
        for i in 0..8 {
            v[i] = v[i].wrapping_add(k[(s as usize + i) % 9]);
        }
        v[5] = v[5].wrapping_add(t[s as usize % 3]);
        v[6] = v[6].wrapping_add(t[(s as usize + 1) % 3]);
        v[7] = v[7].wrapping_add(s);
    };

    for d in 0..72 {
        if d % 4 == 0 {
            inject(&mut v, (d / 4) as u64);
        }
        let r = &ROT[d % 8];
        let mut mixed = [0u64; 8];
        for j in 0..4 {
            let x0 = v[2 * j].wrapping_add(v[2 * j + 1]);
            let x1 = v[2 * j + 1].rotate_left(r[j]) ^ x0;
            mixed[2 * j] = x0;
            mixed[2 * j + 1] = x1;
        }
        for i in 0..8 {
            v[i] = mixed[PERM[i]];
        }
    }
    inject(&mut v, 18);
    v
}

/// One UBI block step: chain' = E(chain, tweak, block) ⊕ block.
fn ubi_block(chain: &mut [u64; 8], block: &[u8; 64], position: u64, ttype: u64, first: bool, fin: bool) {
    let mut hi = ttype << 56;
    if first {
        hi |= FLAG_FIRST;
    }
    if fin {
        hi |= FLAG_FINAL;
    }
    let e = threefish512(chain, (position, hi), block);
    for i in 0..8 {
        let mut word = [0u8; 8];
        word.copy_from_slice(&block[i * 8..i * 8 + 8]);
        chain[i] = e[i] ^ u64::from_le_bytes(word);
    }
}

/// UBI over a complete in-memory message (config and output blocks).
fn ubi(chain: &mut [u64; 8], msg: &[u8], ttype: u64) {
    if msg.is_empty() {
        ubi_block(chain, &[0u8; 64], 0, ttype, true, true);
        return;
    }
    let mut first = true;
    let mut consumed = 0u64;
    let mut iter = msg.chunks(64).peekable();
    while let Some(chunk) = iter.next() {
        consumed += chunk.len() as u64;
        let mut block = [0u8; 64];
        block[..chunk.len()].copy_from_slice(chunk);
        ubi_block(chain, &block, consumed, ttype, first, iter.peek().is_none());
        first = false;
    }
}

/// The Skein-512 digest at 224/256/384/512 bits.
pub struct Skein {
    bits: u32,
}

impl Default for Skein {
    fn default() -> Self {
        Skein { bits: 512 }
    }
}

impl MessageDigest for Skein {
    fn configure(&mut self, output_bits: u32) -> Result<(), HashError> {
        match output_bits {
            224 | 256 | 384 | 512 => {
                self.bits = output_bits;
                Ok(())
            }
            other => Err(HashError::InvalidConfig(format!(
                "Skein-512 does not support a {other}-bit output"
            ))),
        }
    }

    fn output_bits(&self) -> u32 {
        self.bits
    }

    fn compute(&mut self, source: &mut dyn MessageSource) -> Result<Vec<u8>, HashError> {
        // Configuration block: schema "SHA3", version 1, output bits;
        // tree parameters zero (plain hashing only).
        let mut cfg = [0u8; 32];
        cfg[0..4].copy_from_slice(b"SHA3");
        cfg[4..6].copy_from_slice(&1u16.to_le_bytes());
        cfg[8..16].copy_from_slice(&(self.bits as u64).to_le_bytes());
        let mut chain = [0u64; 8];
        ubi(&mut chain, &cfg, TYPE_CFG);

        // Message UBI, streamed. The tweak position counts message bytes
        // up to and including the current block; an empty message is one
        // all-zero block at position 0.
        let mut block = [0u8; 64];
        let mut pending: Option<[u8; 64]> = None;
        let mut total: u64 = 0;
        let mut first = true;
        loop {
            let n = fill_block(source, &mut block)?;
            if let Some(prev) = pending.take() {
                // A buffered full block is final only if nothing follows.
                total += 64;
                ubi_block(&mut chain, &prev, total, TYPE_MSG, first, n == 0);
                first = false;
            }
            if n == 0 {
                if first {
                    // Empty message: one all-zero block at position 0.
                    ubi_block(&mut chain, &[0u8; 64], 0, TYPE_MSG, true, true);
                }
                break;
            }
            if n < 64 {
                // Short read is EOF: this partial block is final.
                let mut padded = [0u8; 64];
                padded[..n].copy_from_slice(&block[..n]);
                total += n as u64;
                ubi_block(&mut chain, &padded, total, TYPE_MSG, first, true);
                break;
            }
            pending = Some(block);
        }

        // Output UBI: one block holding a zero 64-bit counter.
        let mut out_block = [0u8; 64];
        out_block[..8].copy_from_slice(&0u64.to_le_bytes());
        let mut out_chain = chain;
        ubi_block(&mut out_chain, &out_block, 8, TYPE_OUT, true, true);

        let bytes: Vec<u8> = out_chain.iter().flat_map(|w| w.to_le_bytes()).collect();
        Ok(bytes[..self.bits as usize / 8].to_vec())
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Vectors from the Skein v1.3 paper appendix.
// ──────────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn digest(bits: u32, data: &[u8]) -> String {
        let mut skein = Skein::default();
        skein.configure(bits).unwrap();
        hex::encode(skein.compute_bytes(data).unwrap())
    }

    #[test]
    fn paper_vector_single_ff_byte() {
        assert_eq!(
            digest(512, &[0xff]),
            "71b7bce6fe6452227b9ced6014249e5bf9a9754c3ad618ccc4e0aae16b316cc8\
             ca698d864307ed3e80b6ef1570812ac5272dc409b5a012df2a579102f340617a"
        );
    }

    #[test]
    fn paper_vector_64_descending_bytes() {
        // FF FE FD ... C0 — exactly one full block, so the final flag
        // rides on the first message block.
        let data: Vec<u8> = (0..64).map(|i| 0xff - i as u8).collect();
        assert_eq!(
            digest(512, &data),
            "45863ba3be0c4dfc27e75d358496f4ac9a736a505d9313b42b2f5eada79fc17f\
             63861e947afb1d056aa199575ad3f8c9a3cc1780b5e5fa4cae050e989876625b"
        );
    }

    #[test]
    fn pinned_empty_input() {
        assert_eq!(
            digest(224, b""),
            "1541ae9fc3ebe24eb758ccb1fd60c2c31a9ebfe65b220086e7819e25"
        );
        assert_eq!(
            digest(256, b""),
            "39ccc4554a8b31853b9de7a1fe638a24cce6b35a55f2431009e18780335d2621"
        );
        assert_eq!(
            digest(384, b""),
            "dd5aaf4589dc227bd1eb7bc68771f5baeaa3586ef6c7680167a023ec8ce26980\
             f06c4082c488b4ac9ef313f8cbe70808"
        );
        assert_eq!(
            digest(512, b""),
            "bc5b4c50925519c290cc634277ae3d6257212395cba733bbad37a4af0fa06af4\
             1fca7903d06564fea7a2d3730dbdb80c1f85562dfcc070334ea4d1d9e72cba7a"
        );
    }

    #[test]
    fn pinned_multi_block() {
        let data: Vec<u8> = (0..200).map(|i| i as u8).collect();
        assert_eq!(
            digest(224, &data),
            "9cc86141aa6eb92e19845438cc79a8fb7a15d234864b4802bcf7974b"
        );
        assert_eq!(
            digest(512, &data),
            "59d7f27c018c72b4d2de9b0bdfb87956aa5ec81c0d5be095f8446c598fa31f3e\
             d74ab66a948cce35cf7831748eb48042b60d09a97d7124dc025b2de166ffb80d"
        );
    }

    #[test]
    fn pinned_a55() {
        assert_eq!(
            digest(256, &[b'a'; 55]),
            "db7b23b15adbc15f4d4c4256590f80ea8cdc3c819216a192586c27e1262eb859"
        );
    }
}
