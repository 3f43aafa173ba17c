//! Crossover operators.
//!
//! [`CrossoverOperator`] encodes the contract every recombination shares:
//! declared parent/child counts and a minimum chromosome length, checked by
//! [`cross`](CrossoverOperator::cross) before the concrete algorithm runs.
//! The built-in algorithms are the variants of [`Crossover`].

use super::chromosome::{has_repeated_genes, offspring, Chromosome};
use super::error::{GaError, Result};
use super::operators;
use rand::{Rng, RngCore};

/// Recombines parents into children.
pub trait CrossoverOperator<C: Chromosome>: Send + Sync {
    /// Name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Number of parents consumed by one [`cross`](Self::cross).
    fn parents_number(&self) -> usize;

    /// Number of children produced by one [`cross`](Self::cross).
    fn children_number(&self) -> usize;

    /// Shortest chromosome the algorithm supports.
    fn min_chromosome_length(&self) -> usize;

    /// Whether the algorithm preserves gene order (permutation encodings).
    fn is_ordered(&self) -> bool {
        false
    }

    /// Runs the algorithm on parents that already passed validation.
    ///
    /// Must return exactly [`children_number`](Self::children_number) new
    /// chromosomes with no fitness, leaving the parents untouched.
    fn perform_cross(&self, parents: &[C], rng: &mut dyn RngCore) -> Result<Vec<C>>;

    /// Validates `parents` and produces the children.
    ///
    /// # Errors
    ///
    /// - [`GaError::InvalidArgument`] if `parents.len()` differs from
    ///   [`parents_number`](Self::parents_number) or no parent is given
    /// - [`GaError::ChromosomeTooShort`] if the first parent is shorter than
    ///   [`min_chromosome_length`](Self::min_chromosome_length)
    fn cross(&self, parents: &[C], rng: &mut dyn RngCore) -> Result<Vec<C>> {
        if parents.len() != self.parents_number() {
            return Err(GaError::invalid_argument(
                "parents",
                format!(
                    "the number of parents should be {}, got {}",
                    self.parents_number(),
                    parents.len()
                ),
            ));
        }

        let first = parents.first().ok_or_else(|| {
            GaError::invalid_argument("parents", "at least one parent is required")
        })?;
        if first.length() < self.min_chromosome_length() {
            return Err(GaError::ChromosomeTooShort {
                crossover: self.name(),
                min_length: self.min_chromosome_length(),
                kind: first.kind(),
                length: first.length(),
            });
        }

        let children = self.perform_cross(parents, rng)?;
        if children.len() != self.children_number() {
            return Err(GaError::Crossover {
                crossover: self.name(),
                message: format!(
                    "produced {} children, declared {}",
                    children.len(),
                    self.children_number()
                ),
            });
        }
        Ok(children)
    }
}

impl<C: Chromosome, X: CrossoverOperator<C> + ?Sized> CrossoverOperator<C> for Box<X> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn parents_number(&self) -> usize {
        (**self).parents_number()
    }

    fn children_number(&self) -> usize {
        (**self).children_number()
    }

    fn min_chromosome_length(&self) -> usize {
        (**self).min_chromosome_length()
    }

    fn is_ordered(&self) -> bool {
        (**self).is_ordered()
    }

    fn perform_cross(&self, parents: &[C], rng: &mut dyn RngCore) -> Result<Vec<C>> {
        (**self).perform_cross(parents, rng)
    }

    fn cross(&self, parents: &[C], rng: &mut dyn RngCore) -> Result<Vec<C>> {
        (**self).cross(parents, rng)
    }
}

/// Built-in crossover algorithms. All take two parents and produce two
/// children.
///
/// # Examples
///
/// ```
/// use u_genetic::ga::Crossover;
///
/// // Random cut point
/// let one_point = Crossover::OnePoint { swap_point: None };
///
/// // Each gene drawn from the first parent with probability 0.5
/// let uniform = Crossover::Uniform { mix_probability: 0.5 };
///
/// // Permutation encodings
/// let ordered = Crossover::Ordered;
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Crossover {
    /// Genes `0..=swap_point` come from one parent, the rest from the other.
    /// `None` picks a random point each time.
    OnePoint { swap_point: Option<usize> },

    /// The middle section `(first, second]` is exchanged between parents.
    /// `None` picks random points each time.
    TwoPoint { points: Option<(usize, usize)> },

    /// Each locus is taken from the first parent with `mix_probability`.
    Uniform { mix_probability: f64 },

    /// Order crossover (OX1). Ordered.
    Ordered,

    /// Partially mapped crossover (PMX). Ordered.
    PartiallyMapped,

    /// Cycle crossover (CX). Ordered.
    Cycle,
}

impl Default for Crossover {
    fn default() -> Self {
        Crossover::Uniform {
            mix_probability: 0.5,
        }
    }
}

impl<C: Chromosome> CrossoverOperator<C> for Crossover {
    fn name(&self) -> &'static str {
        match self {
            Crossover::OnePoint { .. } => "OnePoint",
            Crossover::TwoPoint { .. } => "TwoPoint",
            Crossover::Uniform { .. } => "Uniform",
            Crossover::Ordered => "Ordered",
            Crossover::PartiallyMapped => "PartiallyMapped",
            Crossover::Cycle => "Cycle",
        }
    }

    fn parents_number(&self) -> usize {
        2
    }

    fn children_number(&self) -> usize {
        2
    }

    fn min_chromosome_length(&self) -> usize {
        match self {
            Crossover::TwoPoint { .. } | Crossover::PartiallyMapped => 3,
            _ => 2,
        }
    }

    fn is_ordered(&self) -> bool {
        matches!(
            self,
            Crossover::Ordered | Crossover::PartiallyMapped | Crossover::Cycle
        )
    }

    fn perform_cross(&self, parents: &[C], rng: &mut dyn RngCore) -> Result<Vec<C>> {
        let name = CrossoverOperator::<C>::name(self);
        let p1 = parents[0].genes();
        let p2 = parents[1].genes();
        let n = p1.len();
        if p2.len() != n {
            return Err(GaError::Crossover {
                crossover: name,
                message: format!("parents have different lengths ({n} and {})", p2.len()),
            });
        }
        if CrossoverOperator::<C>::is_ordered(self)
            && (has_repeated_genes(p1) || has_repeated_genes(p2))
        {
            return Err(GaError::Crossover {
                crossover: name,
                message: "can only be used with ordered chromosomes, \
                          the specified chromosome has repeated genes"
                    .into(),
            });
        }

        let (g1, g2) = match *self {
            Crossover::OnePoint { swap_point } => {
                let point = match swap_point {
                    Some(p) if p + 1 >= n => {
                        return Err(GaError::Crossover {
                            crossover: name,
                            message: format!(
                                "swap point {p} leaves no gene on the right side of a \
                                 {n}-gene chromosome"
                            ),
                        })
                    }
                    Some(p) => p,
                    None => rng.random_range(0..n - 1),
                };
                splice(p1, p2, &[point])
            }
            Crossover::TwoPoint { points } => {
                let (a, b) = match points {
                    Some((a, b)) if a >= b || b + 1 >= n => {
                        return Err(GaError::Crossover {
                            crossover: name,
                            message: format!(
                                "swap points ({a}, {b}) must be increasing and leave a \
                                 gene after the second point of a {n}-gene chromosome"
                            ),
                        })
                    }
                    Some(points) => points,
                    None => {
                        let a = rng.random_range(0..n - 2);
                        let b = rng.random_range(a + 1..n - 1);
                        (a, b)
                    }
                };
                splice(p1, p2, &[a, b])
            }
            Crossover::Uniform { mix_probability } => {
                if !(0.0..=1.0).contains(&mix_probability) {
                    return Err(GaError::invalid_argument(
                        "mix_probability",
                        format!("must be within [0, 1], got {mix_probability}"),
                    ));
                }
                let mut g1 = Vec::with_capacity(n);
                let mut g2 = Vec::with_capacity(n);
                for (a, b) in p1.iter().zip(p2) {
                    if rng.random::<f64>() < mix_probability {
                        g1.push(a.clone());
                        g2.push(b.clone());
                    } else {
                        g1.push(b.clone());
                        g2.push(a.clone());
                    }
                }
                (g1, g2)
            }
            Crossover::Ordered => operators::order_crossover(p1, p2, rng),
            Crossover::PartiallyMapped => operators::pmx_crossover(p1, p2, rng),
            Crossover::Cycle => operators::cycle_crossover(p1, p2),
        };

        Ok(vec![
            offspring(&parents[0], &g1)?,
            offspring(&parents[1], &g2)?,
        ])
    }
}

/// Alternates the source parent after each cut point.
///
/// A cut at `p` means genes `..=p` come from the current source.
fn splice<G: Clone>(p1: &[G], p2: &[G], cuts: &[usize]) -> (Vec<G>, Vec<G>) {
    let mut g1 = Vec::with_capacity(p1.len());
    let mut g2 = Vec::with_capacity(p1.len());
    let mut swapped = false;
    let mut cuts = cuts.iter().peekable();
    for i in 0..p1.len() {
        let (a, b) = if swapped { (&p2[i], &p1[i]) } else { (&p1[i], &p2[i]) };
        g1.push(a.clone());
        g2.push(b.clone());
        if cuts.peek() == Some(&&i) {
            cuts.next();
            swapped = !swapped;
        }
    }
    (g1, g2)
}
