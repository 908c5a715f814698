//! Balanced hash tree.
//!
//! Collapses an ordered leaf list into a single root under a recipe. A
//! level with an odd node count is balanced by inserting a synthetic
//! sibling — the recipe hash of an endpoint node, never a zero or a raw
//! duplicate — on a side chosen by level parity:
//!
//! 1. `level = ceil(log2(n))`, decremented after each collapse.
//! 2. Every node is replaced by its recipe hash.
//! 3. Odd count: level even ⇒ prepend hash(last); level odd ⇒ append
//!    hash(first).
//! 4. Adjacent pairs concatenate; one surviving node takes a final recipe
//!    hash and becomes the root.
//!
//! The synthetic sibling is indistinguishable in-band from a real leaf;
//! the alternation makes the tree asymmetric but fully deterministic.

use std::time::Instant;

use crate::recipe::Recipe;
use crate::HashError;

pub struct HashTree {
    /// Leaf byte-slices, in order. Owned by the tree; left intact by
    /// `compute_root` so the root can be recomputed.
    pub nodes: Vec<Vec<u8>>,
    pub recipe: Recipe,
    root: Option<Vec<u8>>,
    last_elapsed_ms: Option<u128>,
}

impl HashTree {
    pub fn new(recipe: Recipe) -> Self {
        HashTree {
            nodes: Vec::new(),
            recipe,
            root: None,
            last_elapsed_ms: None,
        }
    }

    /// The root of the last computation, absent before the first one and
    /// whenever the leaf list was empty.
    pub fn root(&self) -> Option<&[u8]> {
        self.root.as_deref()
    }

    /// Wall-clock time of the last computation. Informational only.
    pub fn last_elapsed_ms(&self) -> Option<u128> {
        self.last_elapsed_ms
    }

    pub fn compute_root(&mut self) -> Result<(), HashError> {
        let started = Instant::now();
        self.root = None;

        if self.nodes.is_empty() {
            self.last_elapsed_ms = Some(started.elapsed().as_millis());
            return Ok(());
        }

        let mut level = levels_for(self.nodes.len());
        let mut working = self.nodes.clone();
        while working.len() > 1 {
            for node in working.iter_mut() {
                *node = self.recipe.compute_hash(node)?;
            }
            if working.len() % 2 == 1 {
                if level % 2 == 0 {
                    let sibling = self
                        .recipe
                        .compute_hash(working.last().expect("non-empty level"))?;
                    working.insert(0, sibling);
                } else {
                    let sibling = self.recipe.compute_hash(&working[0])?;
                    working.push(sibling);
                }
            }
            working = working
                .chunks_exact(2)
                .map(|pair| {
                    let mut joined = pair[0].clone();
                    joined.extend_from_slice(&pair[1]);
                    joined
                })
                .collect();
            level = level.saturating_sub(1);
        }

        self.root = Some(self.recipe.compute_hash(&working[0])?);
        self.last_elapsed_ms = Some(started.elapsed().as_millis());
        log::trace!(
            "hash tree root over {} leaves in {}ms",
            self.nodes.len(),
            self.last_elapsed_ms.unwrap_or(0)
        );
        Ok(())
    }
}

/// ceil(log2(n)); zero for a single leaf.
fn levels_for(n: usize) -> u32 {
    n.next_power_of_two().trailing_zeros()
}
