//! Hashforge — composable digest toolkit.
//!
//! Four interlocking pieces, bit-exact by contract:
//! 1. Digest engines: SHA (FIPS 180-4), Blake, Grøstl, JH, Skein (the
//!    authors' SHA-3 final-round submissions) and QmhHuk (a deliberate,
//!    non-standard SHA-2 variant), each at 224/256/384/512-bit output
//!    (SHA also at 160).
//! 2. Recipes: ordered digest compositions — the output of stage i is the
//!    input of stage i+1.
//! 3. A hash tree that collapses a leaf list into a single root with a
//!    deterministic, level-parity balancing rule.
//! 4. A nonce-search driver that mutates a nonce region inside a message
//!    and rehashes until a challenge predicate holds.
//!
//! INVARIANTS:
//! 1. Every digest is deterministic and its output length is
//!    `output_bits / 8` bytes. Wrong rotation counts, wrong padding or a
//!    wrong endianness choice produce silently incorrect digests; the
//!    per-module tests pin the authors' published vectors byte-exact.
//! 2. No host-endianness dependence: all word loads/stores go through
//!    explicit `to_be_bytes`/`to_le_bytes` conversions.
//! 3. Single-threaded, synchronous, CPU-bound. No digest instance is
//!    shared; parallel callers build independent recipes.
//! 4. Errors are values (`HashError`); no panics in non-test code.

pub mod bytes;
pub mod digest;
pub mod recipe;
pub mod search;
pub mod source;
pub mod tree;

pub use digest::{create_digest, HashKind, MessageDigest};
pub use recipe::Recipe;
pub use search::{Challenge, NoncePosition, NonceSearch, SearchConfig, SearchReport};
pub use source::{MessageSource, SliceSource, StreamSource};
pub use tree::HashTree;

use thiserror::Error;

/// The canonical error type for every fallible operation in the crate.
#[derive(Debug, Error)]
pub enum HashError {
    /// Unsupported output width, empty recipe, zero-length or oversized
    /// nonce, or a challenge target inconsistent with the recipe output.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The nonce region would splice past the end of the data buffer.
    #[error("buffer too small: {actual}-byte buffer cannot hold a {needed}-byte nonce")]
    BufferTooSmall { needed: usize, actual: usize },

    /// The nonce region wrapped to all-zero without satisfying the
    /// challenge; the whole nonce space has been tried.
    #[error("nonce space exhausted after {0} hashes")]
    NonceSpaceExhausted(u64),

    /// The message source reported an unexpected read failure.
    #[error("message source read failed: {0}")]
    IoFailure(#[from] std::io::Error),
}
