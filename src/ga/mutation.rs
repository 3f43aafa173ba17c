//! Mutation operators.

use super::chromosome::Chromosome;
use super::error::{GaError, Result};
use super::operators;
use rand::{Rng, RngCore};

/// Perturbs a chromosome stochastically.
pub trait MutationOperator<C: Chromosome>: Send + Sync {
    /// Name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Whether the mutation preserves the set of genes (permutation-safe).
    fn is_ordered(&self) -> bool {
        false
    }

    /// Applies the mutation with an already validated probability.
    ///
    /// Returns whether any gene changed. Implementations must clear the
    /// fitness when they change genes; going through
    /// [`Chromosome::replace_gene`] does that.
    fn perform_mutate(
        &self,
        chromosome: &mut C,
        probability: f64,
        rng: &mut dyn RngCore,
    ) -> Result<bool>;

    /// Mutates `chromosome` with the given rate.
    ///
    /// Fails if `probability` is outside `[0, 1]`.
    fn mutate(&self, chromosome: &mut C, probability: f64, rng: &mut dyn RngCore) -> Result<bool> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(GaError::invalid_argument(
                "probability",
                format!("must be within [0, 1], got {probability}"),
            ));
        }
        self.perform_mutate(chromosome, probability, rng)
    }
}

impl<C: Chromosome, M: MutationOperator<C> + ?Sized> MutationOperator<C> for Box<M> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn is_ordered(&self) -> bool {
        (**self).is_ordered()
    }

    fn perform_mutate(
        &self,
        chromosome: &mut C,
        probability: f64,
        rng: &mut dyn RngCore,
    ) -> Result<bool> {
        (**self).perform_mutate(chromosome, probability, rng)
    }

    fn mutate(&self, chromosome: &mut C, probability: f64, rng: &mut dyn RngCore) -> Result<bool> {
        (**self).mutate(chromosome, probability, rng)
    }
}

/// Built-in mutation algorithms.
///
/// `Uniform` treats the probability as a per-locus rate; the ordered
/// variants treat it as a per-chromosome rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mutation {
    /// Each gene is replaced by a freshly generated one with the given
    /// probability.
    Uniform,

    /// Swaps two distinct genes. Ordered.
    Twors,

    /// Reverses a random gene segment. Ordered.
    ReverseSequence,

    /// Moves one gene to another position. Ordered.
    Insertion,
}

impl Default for Mutation {
    fn default() -> Self {
        Mutation::Uniform
    }
}

impl<C: Chromosome> MutationOperator<C> for Mutation {
    fn name(&self) -> &'static str {
        match self {
            Mutation::Uniform => "Uniform",
            Mutation::Twors => "Twors",
            Mutation::ReverseSequence => "ReverseSequence",
            Mutation::Insertion => "Insertion",
        }
    }

    fn is_ordered(&self) -> bool {
        !matches!(self, Mutation::Uniform)
    }

    fn perform_mutate(
        &self,
        chromosome: &mut C,
        probability: f64,
        rng: &mut dyn RngCore,
    ) -> Result<bool> {
        let kernel: fn(&mut [C::Gene], &mut dyn RngCore) = match self {
            Mutation::Uniform => return uniform(chromosome, probability, rng),
            Mutation::Twors => operators::swap_mutation,
            Mutation::ReverseSequence => operators::invert_mutation,
            Mutation::Insertion => operators::insert_mutation,
        };

        if chromosome.length() < 2 || rng.random::<f64>() >= probability {
            return Ok(false);
        }

        let mut genes = chromosome.genes().to_vec();
        kernel(&mut genes, rng);
        if genes.as_slice() == chromosome.genes() {
            return Ok(false);
        }
        chromosome.replace_genes(0, &genes)?;
        Ok(true)
    }
}

/// Per-locus replacement with freshly generated genes.
fn uniform<C: Chromosome>(
    chromosome: &mut C,
    probability: f64,
    rng: &mut dyn RngCore,
) -> Result<bool> {
    let mut changed = false;
    for index in 0..chromosome.length() {
        if rng.random::<f64>() < probability {
            let gene = chromosome.generate_gene(index, rng);
            if chromosome.gene(index) != Some(&gene) {
                chromosome.replace_gene(index, gene)?;
                changed = true;
            }
        }
    }
    Ok(changed)
}
