//! Order-preserving gene kernels.
//!
//! Crossover and mutation kernels for permutation-like encodings, where
//! every gene value occurs exactly once and only the order matters. They
//! work on plain gene slices and are used by the ordered variants of
//! [`Crossover`](super::Crossover) and [`Mutation`](super::Mutation).
//!
//! # Crossover kernels
//!
//! - [`order_crossover`] (OX1): Davis (1985) — preserves relative order
//! - [`pmx_crossover`] (PMX): Goldberg & Lingle (1985) — preserves absolute position
//! - [`cycle_crossover`] (CX): Oliver et al. (1987) — every gene keeps a parent's position
//!
//! # Mutation kernels
//!
//! - [`swap_mutation`]: Exchange two random positions — O(1)
//! - [`insert_mutation`]: Remove and reinsert at random position — O(n)
//! - [`invert_mutation`]: Reverse a random segment (2-opt) — O(n)
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Goldberg & Lingle (1985), "Alleles, Loci, and the Traveling Salesman Problem"
//! - Oliver, Smith & Holland (1987), "A Study of Permutation Crossover
//!   Operators on the Traveling Salesman Problem"

use rand::{Rng, RngCore};

// ============================================================================
// Crossover kernels
// ============================================================================

/// Order Crossover (OX1).
///
/// # Algorithm (Davis, 1985)
///
/// 1. Select a random segment `[start, end]`
/// 2. Copy the segment from parent1 to child1 at the same positions
/// 3. Fill remaining positions with genes from parent2, in their original
///    order starting after the segment, skipping genes already present
///
/// Child2 is built symmetrically.
///
/// # Complexity
/// O(n²) time with `PartialEq` genes, O(n) space
pub fn order_crossover<G: Clone + PartialEq>(
    parent1: &[G],
    parent2: &[G],
    rng: &mut dyn RngCore,
) -> (Vec<G>, Vec<G>) {
    let n = parent1.len();
    debug_assert_eq!(n, parent2.len(), "parents must have equal length");

    if n < 2 {
        return (parent1.to_vec(), parent2.to_vec());
    }

    let (start, end) = random_segment(n, rng);
    (
        ox_build_child(parent1, parent2, start, end),
        ox_build_child(parent2, parent1, start, end),
    )
}

/// Build one OX child: copy segment from `template`, fill from `donor`.
fn ox_build_child<G: Clone + PartialEq>(
    template: &[G],
    donor: &[G],
    start: usize,
    end: usize,
) -> Vec<G> {
    let n = template.len();
    let segment = &template[start..=end];
    let mut child: Vec<Option<G>> = vec![None; n];

    for i in start..=end {
        child[i] = Some(template[i].clone());
    }

    // Fill from donor, starting after segment end, wrapping around
    let mut pos = (end + 1) % n;
    for offset in 0..n {
        let val = &donor[(end + 1 + offset) % n];
        if !segment.contains(val) {
            child[pos] = Some(val.clone());
            pos = (pos + 1) % n;
        }
    }

    child.into_iter().flatten().collect()
}

/// Partially Mapped Crossover (PMX).
///
/// # Algorithm (Goldberg & Lingle, 1985)
///
/// 1. Select a random segment `[start, end]`
/// 2. Copy the segment from the template parent
/// 3. For each gene in the donor's segment that isn't in the child yet,
///    follow the mapping chain to a free position and place it there
/// 4. Fill remaining positions from the donor
///
/// # Complexity
/// O(n²) time with `PartialEq` genes, O(n) space
pub fn pmx_crossover<G: Clone + PartialEq>(
    parent1: &[G],
    parent2: &[G],
    rng: &mut dyn RngCore,
) -> (Vec<G>, Vec<G>) {
    let n = parent1.len();
    debug_assert_eq!(n, parent2.len(), "parents must have equal length");

    if n < 2 {
        return (parent1.to_vec(), parent2.to_vec());
    }

    let (start, end) = random_segment(n, rng);
    (
        pmx_build_child(parent1, parent2, start, end),
        pmx_build_child(parent2, parent1, start, end),
    )
}

/// Build one PMX child: copy segment from `template`, map from `donor`.
fn pmx_build_child<G: Clone + PartialEq>(
    template: &[G],
    donor: &[G],
    start: usize,
    end: usize,
) -> Vec<G> {
    let n = template.len();
    let mut child: Vec<Option<G>> = vec![None; n];

    for i in start..=end {
        child[i] = Some(template[i].clone());
    }

    for i in start..=end {
        let donor_val = &donor[i];
        if template[start..=end].contains(donor_val) {
            continue;
        }
        // Follow chain: template[pos] -> its position in donor, until outside the segment
        let mut pos = i;
        loop {
            let mapped = &template[pos];
            let Some(donor_pos) = donor.iter().position(|v| v == mapped) else {
                break;
            };
            if donor_pos < start || donor_pos > end {
                child[donor_pos] = Some(donor_val.clone());
                break;
            }
            pos = donor_pos;
        }
    }

    child
        .into_iter()
        .zip(donor.iter())
        .map(|(gene, fallback)| gene.unwrap_or_else(|| fallback.clone()))
        .collect()
}

/// Cycle Crossover (CX).
///
/// Positions are partitioned into cycles; child1 takes cycles 0, 2, 4, ...
/// from parent1 and the others from parent2 (child2 the opposite),
/// so every gene keeps the position it had in one of the parents.
/// Deterministic: `rng` is not consumed.
///
/// # Complexity
/// O(n²) time with `PartialEq` genes, O(n) space
pub fn cycle_crossover<G: Clone + PartialEq>(parent1: &[G], parent2: &[G]) -> (Vec<G>, Vec<G>) {
    let n = parent1.len();
    debug_assert_eq!(n, parent2.len(), "parents must have equal length");

    let mut cycle_of = vec![usize::MAX; n];
    let mut cycle = 0;
    for first in 0..n {
        if cycle_of[first] != usize::MAX {
            continue;
        }
        let mut pos = first;
        while cycle_of[pos] == usize::MAX {
            cycle_of[pos] = cycle;
            match parent1.iter().position(|g| *g == parent2[pos]) {
                Some(next) => pos = next,
                None => break,
            }
        }
        cycle += 1;
    }

    let mut child1 = Vec::with_capacity(n);
    let mut child2 = Vec::with_capacity(n);
    for i in 0..n {
        if cycle_of[i] % 2 == 0 {
            child1.push(parent1[i].clone());
            child2.push(parent2[i].clone());
        } else {
            child1.push(parent2[i].clone());
            child2.push(parent1[i].clone());
        }
    }
    (child1, child2)
}

// ============================================================================
// Mutation kernels
// ============================================================================

/// Swap mutation: exchange two distinct random positions.
///
/// # Complexity
/// O(1)
pub fn swap_mutation<G>(genes: &mut [G], rng: &mut dyn RngCore) {
    let n = genes.len();
    if n < 2 {
        return;
    }
    let i = rng.random_range(0..n);
    let j = (i + rng.random_range(1..n)) % n;
    genes.swap(i, j);
}

/// Insert mutation: remove a gene and reinsert it at a random position.
///
/// # Complexity
/// O(n) due to shifting
pub fn insert_mutation<G>(genes: &mut [G], rng: &mut dyn RngCore) {
    let n = genes.len();
    if n < 2 {
        return;
    }
    let from = rng.random_range(0..n);
    let to = rng.random_range(0..n);
    if from < to {
        genes[from..=to].rotate_left(1);
    } else {
        genes[to..=from].rotate_right(1);
    }
}

/// Invert mutation: reverse a random segment (2-opt move).
///
/// # Complexity
/// O(n) worst case for segment reversal
pub fn invert_mutation<G>(genes: &mut [G], rng: &mut dyn RngCore) {
    let n = genes.len();
    if n < 2 {
        return;
    }
    let (start, end) = random_segment(n, rng);
    genes[start..=end].reverse();
}

// ============================================================================
// Helpers
// ============================================================================

/// Pick a random segment `[start, end]` within `0..n` where `start <= end`.
pub(crate) fn random_segment(n: usize, rng: &mut dyn RngCore) -> (usize, usize) {
    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

// ============================================================================
// Tests
// ============================================================================
