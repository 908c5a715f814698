//! Nonce-search driver.
//!
//! Embeds a mutable nonce region in a message, then repeatedly increments
//! the region and rehashes the whole message through a recipe until a
//! challenge predicate accepts the digest.
//!
//! Loop order: the driver increments *before* hashing, so the seeded nonce
//! value itself is never tested — the first tested nonce after an all-zero
//! seed is `01 00 ..`. A wrap of the nonce region back to all-zero
//! surfaces `NonceSpaceExhausted` instead of looping forever.

use std::time::Instant;

use rand::RngCore;

use crate::bytes::{extract_nonce, increment_nonce, less_or_equal, splice_nonce, starts_with};
use crate::digest::HashKind;
use crate::recipe::Recipe;
use crate::HashError;

/// Where the nonce region sits inside the message bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoncePosition {
    Head,
    Tail,
}

/// Challenge predicate over (digest, target).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Challenge {
    /// Big-endian magnitude comparison; digest and target must be the
    /// same length.
    #[default]
    LessOrEqual,
    /// The digest must begin with the target bytes.
    StartsWith,
}

impl Challenge {
    fn holds(self, digest: &[u8], target: &[u8]) -> bool {
        match self {
            Challenge::LessOrEqual => less_or_equal(digest, target),
            Challenge::StartsWith => starts_with(digest, target),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub nonce_position: NoncePosition,
    /// Region length in bytes, 1..=255. Commonly 4 or 8.
    pub nonce_length: usize,
    /// `true`: the buffer already reserves the region — it is overwritten
    /// in place. `false`: the buffer grows by `nonce_length` at the
    /// configured end and the payload is preserved.
    pub nonce_in_data: bool,
    /// `true`: start from an all-zero nonce; `false`: seed from the RNG.
    pub nonce_from_zero: bool,
    pub challenge: Challenge,
    pub challenge_value: Vec<u8>,
    pub recipe: Vec<HashKind>,
}

/// Outcome of a search or a check. `hash` is absent only from a
/// `check_nonce` whose challenge failed.
#[derive(Debug)]
pub struct SearchReport {
    pub data: Vec<u8>,
    pub nonce: Vec<u8>,
    pub hash: Option<Vec<u8>>,
    pub hash_count: u64,
    pub elapsed_ms: u128,
    pub hash_per_second: f64,
}

pub struct NonceSearch;

impl NonceSearch {
    /// Run the search with the operating system RNG seeding the nonce.
    pub fn compute(data: Vec<u8>, config: &SearchConfig) -> Result<SearchReport, HashError> {
        Self::compute_with_rng(data, config, &mut rand::rngs::OsRng)
    }

    /// Run the search with a caller-supplied RNG (deterministic harnesses,
    /// seeded workers).
    pub fn compute_with_rng(
        mut data: Vec<u8>,
        config: &SearchConfig,
        rng: &mut dyn RngCore,
    ) -> Result<SearchReport, HashError> {
        let mut recipe = resolve(config)?;
        let len = config.nonce_length;

        let offset = match (config.nonce_in_data, config.nonce_position) {
            (true, _) if len > data.len() => {
                return Err(HashError::BufferTooSmall {
                    needed: len,
                    actual: data.len(),
                });
            }
            (true, NoncePosition::Head) => 0,
            (true, NoncePosition::Tail) => data.len() - len,
            (false, NoncePosition::Head) => {
                data.splice(0..0, std::iter::repeat(0u8).take(len));
                0
            }
            (false, NoncePosition::Tail) => {
                data.resize(data.len() + len, 0);
                data.len() - len
            }
        };

        let mut nonce = vec![0u8; len];
        if !config.nonce_from_zero {
            rng.fill_bytes(&mut nonce);
        }
        splice_nonce(&mut data, &nonce, offset);

        let started = Instant::now();
        let mut hash_count: u64 = 0;
        let hash = loop {
            if increment_nonce(&mut data[offset..offset + len]) {
                return Err(HashError::NonceSpaceExhausted(hash_count));
            }
            let hash = recipe.compute_hash(&data)?;
            hash_count += 1;
            if hash_count % (1 << 20) == 0 {
                log::debug!(
                    "nonce search: {hash_count} hashes, {:.0}/s",
                    hash_count as f64 / started.elapsed().as_secs_f64().max(f64::EPSILON)
                );
            }
            if config.challenge.holds(&hash, &config.challenge_value) {
                break hash;
            }
        };

        let elapsed = started.elapsed();
        let report = SearchReport {
            nonce: extract_nonce(&data, offset, len).to_vec(),
            hash: Some(hash),
            hash_count,
            elapsed_ms: elapsed.as_millis(),
            hash_per_second: hash_count as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
            data,
        };
        log::debug!(
            "nonce search done: {} hashes in {}ms",
            report.hash_count,
            report.elapsed_ms
        );
        Ok(report)
    }

    /// Verify a claimed solution. The digest is computed over `data`
    /// exactly as supplied — the caller is trusted to have embedded the
    /// nonce; `nonce` is only compared against the bytes extracted at the
    /// configured position. `hash_count` is 1 iff the extracted nonce
    /// matches and the challenge holds, else 0.
    pub fn check_nonce(
        data: &[u8],
        nonce: &[u8],
        config: &SearchConfig,
    ) -> Result<SearchReport, HashError> {
        let mut recipe = resolve(config)?;
        let len = config.nonce_length;
        if len > data.len() {
            return Err(HashError::BufferTooSmall {
                needed: len,
                actual: data.len(),
            });
        }
        let offset = match config.nonce_position {
            NoncePosition::Head => 0,
            NoncePosition::Tail => data.len() - len,
        };

        let started = Instant::now();
        let hash = recipe.compute_hash(data)?;
        let challenge_ok = config.challenge.holds(&hash, &config.challenge_value);
        let extracted = extract_nonce(data, offset, len);
        let accepted = challenge_ok && extracted == nonce;

        Ok(SearchReport {
            data: data.to_vec(),
            nonce: extracted.to_vec(),
            hash: challenge_ok.then_some(hash),
            hash_count: u64::from(accepted),
            elapsed_ms: started.elapsed().as_millis(),
            hash_per_second: 0.0,
        })
    }
}

/// Validate the configuration and build its recipe.
fn resolve(config: &SearchConfig) -> Result<Recipe, HashError> {
    if config.nonce_length == 0 || config.nonce_length > 255 {
        return Err(HashError::InvalidConfig(format!(
            "nonce length {} outside 1..=255",
            config.nonce_length
        )));
    }
    let recipe = Recipe::new(&config.recipe)?;
    let out_len = recipe.output_bits() as usize / 8;
    match config.challenge {
        Challenge::LessOrEqual if config.challenge_value.len() != out_len => {
            Err(HashError::InvalidConfig(format!(
                "less-or-equal target is {} bytes but the recipe digest is {out_len}",
                config.challenge_value.len()
            )))
        }
        Challenge::StartsWith if config.challenge_value.len() > out_len => {
            Err(HashError::InvalidConfig(format!(
                "starts-with target is {} bytes but the recipe digest is only {out_len}",
                config.challenge_value.len()
            )))
        }
        _ => Ok(recipe),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytes::{pack_from_zeros, unpack_target, TARGET_WIDTH};

    /// 195 bytes of plaintext for the packed-target scenario.
    fn plaintext_195() -> Vec<u8> {
        let text = "La ciudad y los perros ".repeat(9);
        text.as_bytes()[..195].to_vec()
    }

    #[test]
    fn tail_search_under_packed_target() {
        // Packed 0x1EFFFFFF demands two leading zero bytes of SHA-256.
        let config = SearchConfig {
            nonce_position: NoncePosition::Tail,
            nonce_length: 4,
            nonce_in_data: false,
            nonce_from_zero: true,
            challenge: Challenge::LessOrEqual,
            challenge_value: unpack_target(pack_from_zeros(16, TARGET_WIDTH), TARGET_WIDTH),
            recipe: vec![HashKind::Sha256],
        };
        let report = NonceSearch::compute(plaintext_195(), &config).unwrap();
        let hash = report.hash.as_ref().unwrap();
        assert_eq!(hash[0], 0);
        assert_eq!(hash[1], 0);
        // Deterministic from the all-zero seed: pinned outcome.
        assert_eq!(report.data.len(), 199);
        assert_eq!(hex::encode(&report.nonce), "92780000");
        assert_eq!(report.hash_count, 30866);
        assert_eq!(
            hex::encode(hash),
            "000004d942218cf8913091309a3fa251f91924d4da0af63dd375a9a082a86304"
        );

        let check = NonceSearch::check_nonce(&report.data, &report.nonce, &config).unwrap();
        assert_eq!(check.hash_count, 1);
        assert_eq!(check.hash.as_deref(), report.hash.as_deref());
    }

    #[test]
    fn head_search_with_prefix_challenge_over_chain() {
        let config = SearchConfig {
            nonce_position: NoncePosition::Head,
            nonce_length: 8,
            nonce_in_data: true,
            nonce_from_zero: true,
            challenge: Challenge::StartsWith,
            challenge_value: vec![0x12],
            recipe: vec![HashKind::Groestl384, HashKind::Skein224, HashKind::Blake256],
        };
        let data: Vec<u8> = (0u8..80).collect();
        let report = NonceSearch::compute(data, &config).unwrap();
        let hash = report.hash.as_ref().unwrap();
        assert_eq!(hash[0], 0x12);
        // In-place head splice keeps the buffer length.
        assert_eq!(report.data.len(), 80);
        assert_eq!(hex::encode(&report.nonce), "9900000000000000");
        assert_eq!(report.hash_count, 153);
        assert_eq!(
            hex::encode(hash),
            "125e1810bac2d34453029accc5bec67679d4965b194cbafac1c76b46db800001"
        );

        let check = NonceSearch::check_nonce(&report.data, &report.nonce, &config).unwrap();
        assert_eq!(check.hash_count, 1);
    }

    #[test]
    fn check_nonce_rejects_wrong_nonce_but_keeps_hash() {
        let config = SearchConfig {
            nonce_position: NoncePosition::Tail,
            nonce_length: 4,
            nonce_in_data: true,
            nonce_from_zero: true,
            challenge: Challenge::StartsWith,
            challenge_value: vec![],
            recipe: vec![HashKind::Sha256],
        };
        // Empty prefix target: the challenge always holds, so only the
        // nonce comparison decides.
        let data = vec![7u8; 16];
        let ok = NonceSearch::check_nonce(&data, &[7, 7, 7, 7], &config).unwrap();
        assert_eq!(ok.hash_count, 1);
        let bad = NonceSearch::check_nonce(&data, &[1, 2, 3, 4], &config).unwrap();
        assert_eq!(bad.hash_count, 0);
        assert!(bad.hash.is_some());
    }

    #[test]
    fn check_nonce_without_challenge_yields_no_hash() {
        let config = SearchConfig {
            nonce_position: NoncePosition::Head,
            nonce_length: 2,
            nonce_in_data: true,
            nonce_from_zero: true,
            challenge: Challenge::StartsWith,
            challenge_value: vec![0xAB, 0xCD, 0xEF],
            recipe: vec![HashKind::Sha256],
        };
        let report = NonceSearch::check_nonce(&[1, 2, 3, 4], &[1, 2], &config).unwrap();
        assert_eq!(report.hash_count, 0);
        assert!(report.hash.is_none());
    }

    #[test]
    fn one_byte_nonce_space_exhausts() {
        let config = SearchConfig {
            nonce_position: NoncePosition::Head,
            nonce_length: 1,
            nonce_in_data: true,
            nonce_from_zero: true,
            challenge: Challenge::LessOrEqual,
            challenge_value: vec![0u8; 32],
            recipe: vec![HashKind::Sha256],
        };
        // An all-zero target only accepts an all-zero digest; a one-byte
        // nonce runs out after 255 attempts.
        match NonceSearch::compute(vec![0u8; 32], &config) {
            Err(HashError::NonceSpaceExhausted(count)) => assert_eq!(count, 255),
            other => panic!("expected NonceSpaceExhausted, got {other:?}"),
        }
    }

    #[test]
    fn oversized_nonce_is_buffer_too_small() {
        let config = SearchConfig {
            nonce_position: NoncePosition::Tail,
            nonce_length: 8,
            nonce_in_data: true,
            nonce_from_zero: true,
            challenge: Challenge::StartsWith,
            challenge_value: vec![0],
            recipe: vec![HashKind::Sha256],
        };
        match NonceSearch::compute(vec![0u8; 4], &config) {
            Err(HashError::BufferTooSmall { needed: 8, actual: 4 }) => {}
            other => panic!("expected BufferTooSmall, got {other:?}"),
        }
    }

    #[test]
    fn invalid_configurations_are_rejected_up_front() {
        let base = SearchConfig {
            nonce_position: NoncePosition::Tail,
            nonce_length: 4,
            nonce_in_data: true,
            nonce_from_zero: true,
            challenge: Challenge::LessOrEqual,
            challenge_value: vec![0u8; 32],
            recipe: vec![HashKind::Sha256],
        };

        let zero_len = SearchConfig { nonce_length: 0, ..base.clone() };
        assert!(matches!(
            NonceSearch::compute(vec![0u8; 16], &zero_len),
            Err(HashError::InvalidConfig(_))
        ));

        let empty_recipe = SearchConfig { recipe: vec![], ..base.clone() };
        assert!(matches!(
            NonceSearch::compute(vec![0u8; 16], &empty_recipe),
            Err(HashError::InvalidConfig(_))
        ));

        let short_target = SearchConfig { challenge_value: vec![0u8; 8], ..base.clone() };
        assert!(matches!(
            NonceSearch::compute(vec![0u8; 16], &short_target),
            Err(HashError::InvalidConfig(_))
        ));

        let oversized = SearchConfig { nonce_length: 300, ..base };
        assert!(matches!(
            NonceSearch::compute(vec![0u8; 400], &oversized),
            Err(HashError::InvalidConfig(_))
        ));
    }

    #[test]
    fn random_seed_still_round_trips() {
        use rand::rngs::mock::StepRng;
        let config = SearchConfig {
            nonce_position: NoncePosition::Tail,
            nonce_length: 4,
            nonce_in_data: false,
            nonce_from_zero: false,
            challenge: Challenge::StartsWith,
            challenge_value: vec![0x00],
            recipe: vec![HashKind::QmhHuk256],
        };
        let mut rng = StepRng::new(0x1234_5678_9abc_def0, 0x1111);
        let report =
            NonceSearch::compute_with_rng(b"seeded search".to_vec(), &config, &mut rng).unwrap();
        assert_eq!(report.hash.as_ref().unwrap()[0], 0x00);
        let check = NonceSearch::check_nonce(&report.data, &report.nonce, &config).unwrap();
        assert_eq!(check.hash_count, 1);
    }
}
