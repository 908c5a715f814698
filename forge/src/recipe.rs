//! Recipes: ordered digest compositions.
//!
//! A recipe folds its input through every stage in order — the output of
//! stage i is the input of stage i+1. Stage instances are exclusively
//! owned by the recipe; the list is fixed in length and order while a
//! computation is in flight.

use crate::digest::{create_digest, HashKind, MessageDigest};
use crate::HashError;

pub struct Recipe {
    stages: Vec<Box<dyn MessageDigest>>,
    kinds: Vec<HashKind>,
}

impl Recipe {
    /// Build a recipe from an ordered, non-empty list of digest kinds.
    pub fn new(kinds: &[HashKind]) -> Result<Self, HashError> {
        if kinds.is_empty() {
            return Err(HashError::InvalidConfig("empty recipe".into()));
        }
        Ok(Recipe {
            stages: kinds.iter().map(|&k| create_digest(k)).collect(),
            kinds: kinds.to_vec(),
        })
    }

    /// Append a stage.
    pub fn add(&mut self, kind: HashKind) {
        self.stages.push(create_digest(kind));
        self.kinds.push(kind);
    }

    /// The stage list, in order.
    pub fn kinds(&self) -> &[HashKind] {
        &self.kinds
    }

    /// Output width of the final stage, in bits.
    pub fn output_bits(&self) -> u32 {
        self.stages
            .last()
            .expect("recipe is never empty")
            .output_bits()
    }

    /// Fold `bytes` through every stage.
    pub fn compute_hash(&mut self, bytes: &[u8]) -> Result<Vec<u8>, HashError> {
        // Arity 1 and 2 cover almost every caller; the fold below is the
        // general path. All three are behaviorally identical.
        match self.stages.len() {
            1 => self.stages[0].compute_bytes(bytes),
            2 => {
                let mid = self.stages[0].compute_bytes(bytes)?;
                self.stages[1].compute_bytes(&mid)
            }
            _ => {
                let mut out = self.stages[0].compute_bytes(bytes)?;
                for stage in &mut self.stages[1..] {
                    out = stage.compute_bytes(&out)?;
                }
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_recipe_is_rejected() {
        assert!(matches!(
            Recipe::new(&[]),
            Err(HashError::InvalidConfig(_))
        ));
    }

    #[test]
    fn single_stage_equals_plain_digest() {
        let mut recipe = Recipe::new(&[HashKind::Sha256]).unwrap();
        let mut plain = create_digest(HashKind::Sha256);
        assert_eq!(
            recipe.compute_hash(b"abc").unwrap(),
            plain.compute_bytes(b"abc").unwrap()
        );
    }

    #[test]
    fn double_sha256_abc() {
        let mut recipe = Recipe::new(&[HashKind::Sha256, HashKind::Sha256]).unwrap();
        assert_eq!(
            hex::encode(recipe.compute_hash(b"abc").unwrap()),
            "4f8b42c22dd3729b519ba6f68d2da7cc5b2d606d05daed5ad5128cc03e6c6358"
        );
    }

    #[test]
    fn mixed_family_chain() {
        // Grøstl-384 → Skein-224 → Blake-256 over "abc".
        let mut recipe = Recipe::new(&[
            HashKind::Groestl384,
            HashKind::Skein224,
            HashKind::Blake256,
        ])
        .unwrap();
        assert_eq!(recipe.output_bits(), 256);
        assert_eq!(
            hex::encode(recipe.compute_hash(b"abc").unwrap()),
            "612664efbb46cd02c7ae7f3cf88b04aa57f768d8a837c3edbd8f19bdb6456f9c"
        );
    }

    #[test]
    fn fold_matches_manual_chain() {
        let mut recipe = Recipe::new(&[HashKind::Sha256, HashKind::Blake256]).unwrap();
        let folded = recipe.compute_hash(b"abc").unwrap();
        let mut first = create_digest(HashKind::Sha256);
        let mut second = create_digest(HashKind::Blake256);
        let mid = first.compute_bytes(b"abc").unwrap();
        assert_eq!(folded, second.compute_bytes(&mid).unwrap());
        assert_eq!(
            hex::encode(&folded),
            "c0cf02cf71ccf99388a4736ed33787b8d7d4f02e10f227fa3c12abd746620a3b"
        );
    }

    #[test]
    fn add_appends_in_order() {
        let mut recipe = Recipe::new(&[HashKind::Sha256]).unwrap();
        recipe.add(HashKind::Sha256);
        assert_eq!(recipe.kinds(), &[HashKind::Sha256, HashKind::Sha256]);
        assert_eq!(
            hex::encode(recipe.compute_hash(b"abc").unwrap()),
            "4f8b42c22dd3729b519ba6f68d2da7cc5b2d606d05daed5ad5128cc03e6c6358"
        );
    }
}
