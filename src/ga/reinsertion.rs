//! Reinsertion strategies.
//!
//! Reinsertion decides which chromosomes form the next generation from the
//! offspring produced by crossover and mutation and the members of the
//! generation that produced them.

use super::chromosome::{by_fitness_desc, Chromosome};
use super::error::{GaError, Result};
use super::population::Population;
use rand::{Rng, RngCore};

/// Builds the next generation's members.
pub trait ReinsertionOperator<C: Chromosome>: Send + Sync {
    /// Name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Whether the strategy can grow fewer than `min_size` offspring.
    fn can_expand(&self) -> bool;

    /// Whether the strategy can shrink more than `max_size` offspring.
    fn can_collapse(&self) -> bool;

    /// Chooses the next members from already validated inputs.
    fn perform_select_chromosomes(
        &self,
        population: &Population<C>,
        offspring: Vec<C>,
        parents: Vec<C>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<C>>;

    /// Chooses the chromosomes of the next generation.
    ///
    /// Fails if the offspring count is below `min_size` and the strategy
    /// cannot expand, above `max_size` and it cannot collapse, or if the
    /// strategy itself returns a count outside `[min_size, max_size]`.
    fn select_chromosomes(
        &self,
        population: &Population<C>,
        offspring: Vec<C>,
        parents: Vec<C>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<C>> {
        let (min, max) = (population.min_size(), population.max_size());
        if offspring.len() < min && !self.can_expand() {
            return Err(GaError::Reinsertion {
                reinsertion: self.name(),
                message: format!(
                    "cannot expand {} offspring to the minimum size {min}",
                    offspring.len()
                ),
            });
        }
        if offspring.len() > max && !self.can_collapse() {
            return Err(GaError::Reinsertion {
                reinsertion: self.name(),
                message: format!(
                    "cannot collapse {} offspring to the maximum size {max}",
                    offspring.len()
                ),
            });
        }

        let selected = self.perform_select_chromosomes(population, offspring, parents, rng)?;
        if selected.len() < min || selected.len() > max {
            return Err(GaError::Reinsertion {
                reinsertion: self.name(),
                message: format!(
                    "selected {} chromosomes, expected between {min} and {max}",
                    selected.len()
                ),
            });
        }
        Ok(selected)
    }
}

impl<C: Chromosome, R: ReinsertionOperator<C> + ?Sized> ReinsertionOperator<C> for Box<R> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn can_expand(&self) -> bool {
        (**self).can_expand()
    }

    fn can_collapse(&self) -> bool {
        (**self).can_collapse()
    }

    fn perform_select_chromosomes(
        &self,
        population: &Population<C>,
        offspring: Vec<C>,
        parents: Vec<C>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<C>> {
        (**self).perform_select_chromosomes(population, offspring, parents, rng)
    }

    fn select_chromosomes(
        &self,
        population: &Population<C>,
        offspring: Vec<C>,
        parents: Vec<C>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<C>> {
        (**self).select_chromosomes(population, offspring, parents, rng)
    }
}

/// Built-in reinsertion strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reinsertion {
    /// Offspring replace the parents as they are.
    Pure,

    /// Missing members up to `min_size` are taken from the best parents.
    Elitist,

    /// Missing members up to `min_size` are random copies of offspring.
    Uniform,

    /// Only the `max_size` fittest offspring survive. Offspring must be
    /// evaluated.
    FitnessBased,
}

impl Default for Reinsertion {
    fn default() -> Self {
        Reinsertion::Elitist
    }
}

impl<C: Chromosome> ReinsertionOperator<C> for Reinsertion {
    fn name(&self) -> &'static str {
        match self {
            Reinsertion::Pure => "Pure",
            Reinsertion::Elitist => "Elitist",
            Reinsertion::Uniform => "Uniform",
            Reinsertion::FitnessBased => "FitnessBased",
        }
    }

    fn can_expand(&self) -> bool {
        matches!(self, Reinsertion::Elitist | Reinsertion::Uniform)
    }

    fn can_collapse(&self) -> bool {
        matches!(self, Reinsertion::FitnessBased)
    }

    fn perform_select_chromosomes(
        &self,
        population: &Population<C>,
        mut offspring: Vec<C>,
        mut parents: Vec<C>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<C>> {
        let min = population.min_size();
        match self {
            Reinsertion::Pure => {}
            Reinsertion::Elitist => {
                let missing = min.saturating_sub(offspring.len());
                if missing > parents.len() {
                    return Err(GaError::Reinsertion {
                        reinsertion: "Elitist",
                        message: format!(
                            "{missing} chromosomes missing but only {} parents available",
                            parents.len()
                        ),
                    });
                }
                parents.sort_by(by_fitness_desc);
                offspring.extend(parents.into_iter().take(missing));
            }
            Reinsertion::Uniform => {
                if offspring.is_empty() {
                    return Err(GaError::Reinsertion {
                        reinsertion: "Uniform",
                        message: "the number of offspring should be at least 1".into(),
                    });
                }
                while offspring.len() < min {
                    let pick = rng.random_range(0..offspring.len());
                    offspring.push(offspring[pick].clone());
                }
            }
            Reinsertion::FitnessBased => {
                let max = population.max_size();
                if offspring.len() > max {
                    offspring.sort_by(by_fitness_desc);
                    offspring.truncate(max);
                }
            }
        }
        Ok(offspring)
    }
}
