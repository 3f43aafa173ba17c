//! The chromosome contract.
//!
//! [`Chromosome`] is the only thing the engine knows about a candidate
//! solution: an ordered, fixed-length sequence of genes plus a cached
//! fitness value. Concrete encodings (bit strings, permutations, real
//! vectors, ...) are supplied by the problem.

use super::error::{GaError, Result};
use rand::RngCore;
use std::cmp::Ordering;
use std::fmt::Debug;

/// A candidate solution in the GA population.
///
/// The fitness is an explicit cache: `None` until the engine evaluates the
/// chromosome, and cleared again by every gene replacement made through
/// [`replace_gene`](Chromosome::replace_gene) or
/// [`replace_genes`](Chromosome::replace_genes). Higher fitness is better.
///
/// # Implementing
///
/// ```ignore
/// #[derive(Clone, Debug)]
/// struct BitString {
///     bits: Vec<bool>,
///     fitness: Option<f64>,
/// }
///
/// impl Chromosome for BitString {
///     type Gene = bool;
///     fn genes(&self) -> &[bool] { &self.bits }
///     fn genes_mut(&mut self) -> &mut [bool] { &mut self.bits }
///     fn generate_gene(&self, _index: usize, rng: &mut dyn RngCore) -> bool {
///         rng.random_bool(0.5)
///     }
///     fn create_new(&self, rng: &mut dyn RngCore) -> Self {
///         let bits = (0..self.bits.len()).map(|_| rng.random_bool(0.5)).collect();
///         BitString { bits, fitness: None }
///     }
///     fn fitness(&self) -> Option<f64> { self.fitness }
///     fn set_fitness(&mut self, fitness: Option<f64>) { self.fitness = fitness; }
/// }
/// ```
pub trait Chromosome: Clone + Debug + Send + Sync + 'static {
    /// The smallest unit of the encoding.
    type Gene: Clone + PartialEq + Debug + Send + Sync;

    /// All genes, ordered by locus.
    fn genes(&self) -> &[Self::Gene];

    /// Raw mutable access to the genes.
    ///
    /// Writes made through this slice do **not** clear the cached fitness;
    /// engine code always goes through [`replace_gene`](Chromosome::replace_gene).
    fn genes_mut(&mut self) -> &mut [Self::Gene];

    /// Generates a random gene valid for the given locus.
    fn generate_gene(&self, index: usize, rng: &mut dyn RngCore) -> Self::Gene;

    /// Creates a fresh random chromosome of the same shape, with no fitness.
    fn create_new(&self, rng: &mut dyn RngCore) -> Self;

    /// The cached fitness, if evaluated.
    fn fitness(&self) -> Option<f64>;

    /// Stores (or clears) the cached fitness.
    fn set_fitness(&mut self, fitness: Option<f64>);

    /// Number of genes. Fixed for the lifetime of the chromosome.
    fn length(&self) -> usize {
        self.genes().len()
    }

    /// The gene at `index`, if in range.
    fn gene(&self, index: usize) -> Option<&Self::Gene> {
        self.genes().get(index)
    }

    /// Whether a fitness value is cached.
    fn is_evaluated(&self) -> bool {
        self.fitness().is_some()
    }

    /// Replaces the gene at `index` and clears the cached fitness.
    fn replace_gene(&mut self, index: usize, gene: Self::Gene) -> Result<()> {
        let length = self.length();
        if index >= length {
            return Err(GaError::invalid_argument(
                "index",
                format!("gene index {index} out of range for length {length}"),
            ));
        }
        self.genes_mut()[index] = gene;
        self.set_fitness(None);
        Ok(())
    }

    /// Replaces `genes.len()` genes starting at `start` and clears the
    /// cached fitness.
    fn replace_genes(&mut self, start: usize, genes: &[Self::Gene]) -> Result<()> {
        let length = self.length();
        if start + genes.len() > length {
            return Err(GaError::invalid_argument(
                "genes",
                format!(
                    "{} genes starting at {start} overflow length {length}",
                    genes.len()
                ),
            ));
        }
        self.genes_mut()[start..start + genes.len()].clone_from_slice(genes);
        self.set_fitness(None);
        Ok(())
    }

    /// Short name of the concrete type, used in error messages.
    fn kind(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Compares two chromosomes so that the fitter one sorts first.
///
/// Unevaluated chromosomes sort after evaluated ones.
pub fn by_fitness_desc<C: Chromosome>(a: &C, b: &C) -> Ordering {
    match (a.fitness(), b.fitness()) {
        (Some(fa), Some(fb)) => fb.total_cmp(&fa),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Builds a child from `template`'s shape with the given genes.
pub(crate) fn offspring<C: Chromosome>(template: &C, genes: &[C::Gene]) -> Result<C> {
    let mut child = template.clone();
    child.replace_genes(0, genes)?;
    Ok(child)
}

/// Whether any gene occurs more than once.
pub(crate) fn has_repeated_genes<G: PartialEq>(genes: &[G]) -> bool {
    genes
        .iter()
        .enumerate()
        .any(|(i, g)| genes[i + 1..].contains(g))
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::test_support::{rng, BitString, Permutation};

    #[test]
    fn test_replace_gene_clears_fitness() {
        let mut c = BitString::from_bits(&[true, false, true]);
        c.set_fitness(Some(2.0));
        c.replace_gene(1, true).unwrap();
        assert_eq!(c.fitness(), None);
        assert_eq!(c.genes(), &[true, true, true]);
    }

    #[test]
    fn test_replace_gene_out_of_range() {
        let mut c = BitString::from_bits(&[true, false]);
        c.set_fitness(Some(1.0));
        assert!(matches!(
            c.replace_gene(2, true),
            Err(GaError::InvalidArgument { name: "index", .. })
        ));
        assert_eq!(c.fitness(), Some(1.0), "failed replacement must not invalidate");
    }

    #[test]
    fn test_replace_genes_overflow() {
        let mut c = BitString::from_bits(&[true, false, true]);
        assert!(c.replace_genes(2, &[false, false]).is_err());
        c.replace_genes(1, &[true, false]).unwrap();
        assert_eq!(c.genes(), &[true, true, false]);
    }

    #[test]
    fn test_create_new_keeps_length() {
        let mut r = rng(7);
        let c = BitString::random(12, &mut r);
        let fresh = c.create_new(&mut r);
        assert_eq!(fresh.length(), 12);
        assert!(!fresh.is_evaluated());
    }

    #[test]
    fn test_kind_is_short_name() {
        let c = Permutation::identity(3);
        assert_eq!(c.kind(), "Permutation");
    }

    #[test]
    fn test_by_fitness_desc_puts_unevaluated_last() {
        let mut a = BitString::from_bits(&[true]);
        let mut b = BitString::from_bits(&[false]);
        let c = BitString::from_bits(&[false]);
        a.set_fitness(Some(1.0));
        b.set_fitness(Some(3.0));
        let mut all = vec![c, a, b];
        all.sort_by(by_fitness_desc);
        let fitness: Vec<_> = all.iter().map(|x| x.fitness()).collect();
        assert_eq!(fitness, vec![Some(3.0), Some(1.0), None]);
    }

    #[test]
    fn test_by_fitness_desc_is_total_with_nan() {
        let mut all: Vec<BitString> = (0..100)
            .map(|i| {
                let fitness = if i % 3 == 0 { f64::NAN } else { (i % 7) as f64 };
                BitString::with_fitness(2, fitness)
            })
            .collect();
        all.sort_by(by_fitness_desc);
        let finite: Vec<f64> = all
            .iter()
            .filter_map(|c| c.fitness())
            .filter(|f| !f.is_nan())
            .collect();
        assert!(finite.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_has_repeated_genes() {
        assert!(!has_repeated_genes(&[0, 1, 2, 3]));
        assert!(has_repeated_genes(&[0, 1, 2, 1]));
        assert!(!has_repeated_genes::<usize>(&[]));
    }
}
