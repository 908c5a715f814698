//! Byte-level utilities behind the search driver.
//!
//! Packed challenge targets (the compact 4-byte "bits" encoding), the
//! little-endian nonce increment, head/tail splice and extraction, and the
//! two challenge comparison predicates. All formats here are bit-exact
//! external contracts.

/// Default width of an unpacked challenge target, in bytes.
pub const TARGET_WIDTH: usize = 32;

/// Decode a packed 4-byte target into a `width`-byte big-endian value.
///
/// The top byte is the size; the low 24 bits are a three-byte mantissa
/// placed at `[width - size ..]`, the rest zero. Mantissa bytes that would
/// land outside the buffer are dropped.
pub fn unpack_target(packed: u32, width: usize) -> Vec<u8> {
    let size = (packed >> 24) as usize;
    let mantissa = [
        (packed >> 16) as u8,
        (packed >> 8) as u8,
        packed as u8,
    ];
    let mut out = vec![0u8; width];
    for (i, &m) in mantissa.iter().enumerate() {
        let idx = width as i64 - size as i64 + i as i64;
        if (0..width as i64).contains(&idx) {
            out[idx as usize] = m;
        }
    }
    out
}

/// Encode "at least `zero_bits` leading zero bits over a `width`-byte
/// target" as a packed value:
/// `((width - z/8) << 24) | ((0xFF >> (z%8)) << 16) | 0xFFFF`.
pub fn pack_from_zeros(zero_bits: u32, width: usize) -> u32 {
    ((width as u32 - zero_bits / 8) << 24) | ((0xFFu32 >> (zero_bits % 8)) << 16) | 0xFFFF
}

/// Increment the nonce region in place, treating it as a little-endian
/// integer with byte units. Returns `true` when the region wrapped back to
/// all-zero (the carry fell off the high byte).
pub fn increment_nonce(region: &mut [u8]) -> bool {
    for byte in region.iter_mut() {
        let (next, overflow) = byte.overflowing_add(1);
        *byte = next;
        if !overflow {
            return false;
        }
    }
    true
}

/// Overwrite the nonce region at `offset`.
pub fn splice_nonce(data: &mut [u8], nonce: &[u8], offset: usize) {
    data[offset..offset + nonce.len()].copy_from_slice(nonce);
}

/// Borrow the nonce region at `offset`.
pub fn extract_nonce(data: &[u8], offset: usize, len: usize) -> &[u8] {
    &data[offset..offset + len]
}

/// Big-endian magnitude comparison: true iff `digest <= target` as
/// equal-length unsigned integers. Callers guarantee equal lengths; the
/// search configuration enforces it up front.
pub fn less_or_equal(digest: &[u8], target: &[u8]) -> bool {
    debug_assert_eq!(digest.len(), target.len());
    for (d, t) in digest.iter().zip(target) {
        if d != t {
            return d < t;
        }
    }
    true
}

/// True iff `digest` begins with `target` and is at least as long.
pub fn starts_with(digest: &[u8], target: &[u8]) -> bool {
    digest.len() >= target.len() && &digest[..target.len()] == target
}
