//! Digest trait and registry.
//!
//! Six digest families, each behind the same two-step contract: configure
//! an output width, then compute over a message source as many times as
//! needed. [`HashKind`] is the stable external identifier; `create_digest`
//! returns a freshly configured instance for it.

pub mod blake;
pub mod groestl;
pub mod jh;
pub mod qmhhuk;
pub mod sha;
pub mod skein;

use std::fmt;
use std::str::FromStr;

use crate::source::{MessageSource, SliceSource};
use crate::HashError;

/// A byte-oriented message digest.
///
/// A configured instance may compute many independent digests sequentially;
/// the width cannot change without reconfiguration. A failed `configure`
/// leaves the previous configuration in place.
pub trait MessageDigest {
    /// Set the output width in bits. Fails with `InvalidConfig` if the
    /// algorithm does not support the width.
    fn configure(&mut self, output_bits: u32) -> Result<(), HashError>;

    /// The configured output width in bits.
    fn output_bits(&self) -> u32;

    /// Consume `source` to EOF and return the digest
    /// (`output_bits / 8` bytes).
    fn compute(&mut self, source: &mut dyn MessageSource) -> Result<Vec<u8>, HashError>;

    /// Convenience: compute over a byte slice.
    fn compute_bytes(&mut self, data: &[u8]) -> Result<Vec<u8>, HashError> {
        self.compute(&mut SliceSource::new(data))
    }
}

macro_rules! hash_kinds {
    ($( $variant:ident => ($label:literal, $bits:literal) ),+ $(,)?) => {
        /// Stable identifier for every digest the toolkit offers.
        ///
        /// The discriminant order is part of the external contract where the
        /// enum is serialized; do not reorder.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum HashKind {
            $( $variant, )+
        }

        impl HashKind {
            pub const ALL: &'static [HashKind] = &[ $( HashKind::$variant, )+ ];

            /// The digest output width in bits.
            pub fn output_bits(self) -> u32 {
                match self {
                    $( HashKind::$variant => $bits, )+
                }
            }

            /// Stable textual label.
            pub fn label(self) -> &'static str {
                match self {
                    $( HashKind::$variant => $label, )+
                }
            }
        }

        impl FromStr for HashKind {
            type Err = HashError;

            fn from_str(s: &str) -> Result<Self, HashError> {
                match s {
                    $( $label => Ok(HashKind::$variant), )+
                    other => Err(HashError::InvalidConfig(format!(
                        "unknown hash kind `{other}`"
                    ))),
                }
            }
        }
    };
}

hash_kinds! {
    Sha1 => ("sha1", 160),
    Sha256 => ("sha256", 256),
    Sha384 => ("sha384", 384),
    Sha512 => ("sha512", 512),
    Blake224 => ("blake224", 224),
    Blake256 => ("blake256", 256),
    Blake384 => ("blake384", 384),
    Blake512 => ("blake512", 512),
    Groestl224 => ("groestl224", 224),
    Groestl256 => ("groestl256", 256),
    Groestl384 => ("groestl384", 384),
    Groestl512 => ("groestl512", 512),
    Jh224 => ("jh224", 224),
    Jh256 => ("jh256", 256),
    Jh384 => ("jh384", 384),
    Jh512 => ("jh512", 512),
    Skein224 => ("skein224", 224),
    Skein256 => ("skein256", 256),
    Skein384 => ("skein384", 384),
    Skein512 => ("skein512", 512),
    QmhHuk224 => ("qmhhuk224", 224),
    QmhHuk256 => ("qmhhuk256", 256),
    QmhHuk384 => ("qmhhuk384", 384),
    QmhHuk512 => ("qmhhuk512", 512),
}

impl fmt::Display for HashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Build a digest instance configured for `kind`.
///
/// Every kind maps to a supported width of its family, so construction
/// cannot fail.
pub fn create_digest(kind: HashKind) -> Box<dyn MessageDigest> {
    let bits = kind.output_bits();
    let mut digest: Box<dyn MessageDigest> = match kind {
        HashKind::Sha1 | HashKind::Sha256 | HashKind::Sha384 | HashKind::Sha512 => {
            Box::new(sha::Sha::default())
        }
        HashKind::Blake224 | HashKind::Blake256 | HashKind::Blake384 | HashKind::Blake512 => {
            Box::new(blake::Blake::default())
        }
        HashKind::Groestl224
        | HashKind::Groestl256
        | HashKind::Groestl384
        | HashKind::Groestl512 => Box::new(groestl::Groestl::default()),
        HashKind::Jh224 | HashKind::Jh256 | HashKind::Jh384 | HashKind::Jh512 => {
            Box::new(jh::Jh::default())
        }
        HashKind::Skein224 | HashKind::Skein256 | HashKind::Skein384 | HashKind::Skein512 => {
            Box::new(skein::Skein::default())
        }
        HashKind::QmhHuk224
        | HashKind::QmhHuk256
        | HashKind::QmhHuk384
        | HashKind::QmhHuk512 => Box::new(qmhhuk::QmhHuk::default()),
    };
    digest
        .configure(bits)
        .expect("registry width is always supported by its family");
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_closed_and_stable() {
        assert_eq!(HashKind::ALL.len(), 24);
        // Discriminant order is contract.
        assert_eq!(HashKind::Sha1 as u8, 0);
        assert_eq!(HashKind::Blake224 as u8, 4);
        assert_eq!(HashKind::QmhHuk512 as u8, 23);
    }

    #[test]
    fn labels_round_trip() {
        for &kind in HashKind::ALL {
            assert_eq!(kind.label().parse::<HashKind>().unwrap(), kind);
        }
        assert!("keccak256".parse::<HashKind>().is_err());
    }

    #[test]
    fn every_kind_yields_its_width() {
        for &kind in HashKind::ALL {
            let mut d = create_digest(kind);
            assert_eq!(d.output_bits(), kind.output_bits());
            let out = d.compute_bytes(b"width check").unwrap();
            assert_eq!(out.len() * 8, kind.output_bits() as usize);
        }
    }

    #[test]
    fn instances_are_reusable() {
        for &kind in &[HashKind::Sha256, HashKind::Jh384, HashKind::Skein224] {
            let mut d = create_digest(kind);
            let a = d.compute_bytes(b"once").unwrap();
            let b = d.compute_bytes(b"twice").unwrap();
            let a2 = d.compute_bytes(b"once").unwrap();
            assert_ne!(a, b);
            assert_eq!(a, a2);
        }
    }

    #[test]
    fn failed_configure_keeps_previous_width() {
        let mut d = create_digest(HashKind::Blake256);
        assert!(d.configure(160).is_err());
        assert_eq!(d.output_bits(), 256);
        assert_eq!(
            d.compute_bytes(b"abc").unwrap().len(),
            32,
            "instance must remain usable after a rejected configure"
        );
    }
}
