//! Fitness evaluation with per-chromosome memoisation.
//!
//! The problem supplies a [`Fitness`] implementation; the engine only ever
//! calls it through [`FitnessEvaluator`], which skips chromosomes that
//! already carry a cached value.

use super::chromosome::Chromosome;
use super::error::{GaError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A problem-supplied scoring function. Higher scores are better.
///
/// Implemented for any `Fn(&C) -> anyhow::Result<f64>` closure.
///
/// # Thread Safety
///
/// `Fitness` must be `Send + Sync` because evaluation of a generation may be
/// distributed across rayon workers.
pub trait Fitness<C: Chromosome>: Send + Sync {
    /// Scores a chromosome. Must depend only on its gene content.
    fn evaluate(&self, chromosome: &C) -> anyhow::Result<f64>;
}

impl<C, F> Fitness<C> for F
where
    C: Chromosome,
    F: Fn(&C) -> anyhow::Result<f64> + Send + Sync,
{
    fn evaluate(&self, chromosome: &C) -> anyhow::Result<f64> {
        self(chromosome)
    }
}

/// Adapts a lower-is-better score to the engine's higher-is-better
/// convention by negating it.
#[derive(Debug, Clone, Copy)]
pub struct Minimize<F>(pub F);

impl<C: Chromosome, F: Fitness<C>> Fitness<C> for Minimize<F> {
    fn evaluate(&self, chromosome: &C) -> anyhow::Result<f64> {
        self.0.evaluate(chromosome).map(|score| -score)
    }
}

/// Memoising wrapper around a [`Fitness`] function.
pub struct FitnessEvaluator<C: Chromosome> {
    fitness: Box<dyn Fitness<C>>,
    evaluations: AtomicUsize,
}

impl<C: Chromosome> FitnessEvaluator<C> {
    /// Wraps a problem fitness function.
    pub fn new(fitness: impl Fitness<C> + 'static) -> Self {
        Self {
            fitness: Box::new(fitness),
            evaluations: AtomicUsize::new(0),
        }
    }

    /// Number of times the underlying fitness function has been invoked.
    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }

    /// Returns the chromosome's fitness, evaluating it only on a cache miss.
    ///
    /// A NaN or infinite score is reported as [`GaError::Evaluation`] and
    /// is not cached.
    pub fn evaluate(&self, chromosome: &mut C) -> Result<f64> {
        if let Some(fitness) = chromosome.fitness() {
            return Ok(fitness);
        }
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        let fitness = self
            .fitness
            .evaluate(chromosome)
            .map_err(GaError::Evaluation)?;
        if !fitness.is_finite() {
            return Err(GaError::Evaluation(anyhow::anyhow!(
                "fitness function returned {fitness}"
            )));
        }
        chromosome.set_fitness(Some(fitness));
        Ok(fitness)
    }

    /// Ensures every chromosome in `chromosomes` carries a fitness value.
    ///
    /// With `parallel` set (and the `parallel` feature enabled) the missing
    /// values are computed on the rayon pool. Each worker writes only to
    /// the chromosome it evaluates.
    pub fn evaluate_all(&self, chromosomes: &mut [C], parallel: bool) -> Result<()> {
        #[cfg(feature = "parallel")]
        if parallel {
            use rayon::prelude::*;
            return chromosomes
                .par_iter_mut()
                .try_for_each(|c| self.evaluate(c).map(|_| ()));
        }

        #[cfg(not(feature = "parallel"))]
        let _ = parallel;

        for c in chromosomes.iter_mut() {
            self.evaluate(c)?;
        }
        Ok(())
    }
}

impl<C: Chromosome> std::fmt::Debug for FitnessEvaluator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FitnessEvaluator")
            .field("evaluations", &self.evaluations())
            .finish_non_exhaustive()
    }
}
