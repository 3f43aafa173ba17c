//! Selection strategies for the GA.
//!
//! Selection determines which chromosomes are chosen as parents for
//! crossover. Different strategies provide different selection pressure.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Baker (1987), "Reducing Bias and Inefficiency in the Selection
//!   Algorithm" (stochastic universal sampling)

use super::chromosome::{by_fitness_desc, Chromosome};
use super::error::{GaError, Result};
use super::population::Generation;
use rand::{Rng, RngCore};

/// Chooses parents from an evaluated generation.
///
/// Implement this trait to plug a custom strategy into
/// [`GeneticAlgorithm`](super::GeneticAlgorithm); the built-in strategies
/// are the variants of [`Selection`].
pub trait SelectionOperator<C: Chromosome>: Send + Sync {
    /// Name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Draws exactly `number` parents from an already validated generation.
    fn perform_select(
        &self,
        number: usize,
        generation: &Generation<C>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<C>>;

    /// Selects `number` parents (repetition allowed).
    ///
    /// Fails if `number < 2`, if the generation is empty, or if any member
    /// has not been evaluated.
    fn select_parents(
        &self,
        number: usize,
        generation: &Generation<C>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<C>> {
        if number < 2 {
            return Err(GaError::invalid_argument(
                "number",
                format!("the number of selected chromosomes should be at least 2, got {number}"),
            ));
        }
        if generation.is_empty() {
            return Err(GaError::Selection {
                selection: self.name(),
                message: "cannot select from an empty generation".into(),
            });
        }
        if let Some(index) = generation.first_unevaluated() {
            return Err(GaError::NotEvaluated { index });
        }

        let parents = self.perform_select(number, generation, rng)?;
        debug_assert_eq!(parents.len(), number);
        Ok(parents)
    }
}

impl<C: Chromosome, S: SelectionOperator<C> + ?Sized> SelectionOperator<C> for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn perform_select(
        &self,
        number: usize,
        generation: &Generation<C>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<C>> {
        (**self).perform_select(number, generation, rng)
    }

    fn select_parents(
        &self,
        number: usize,
        generation: &Generation<C>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<C>> {
        (**self).select_parents(number, generation, rng)
    }
}

/// Built-in selection strategies. All favour **higher** fitness.
///
/// # Examples
///
/// ```
/// use u_genetic::ga::Selection;
///
/// // Tournament with size 3 (moderate selection pressure)
/// let sel = Selection::Tournament(3);
///
/// // Roulette wheel (fitness-proportionate)
/// let sel = Selection::Roulette;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// The fittest chromosomes, best first. Cycles through the generation
    /// when more parents are requested than there are members.
    Elite,

    /// Fitness-proportionate (roulette wheel) selection.
    ///
    /// Negative fitness values are shifted so the worst member has weight
    /// zero. When every weight is zero the draw is uniform.
    ///
    /// # Complexity
    /// O(n) per selection (linear scan)
    Roulette,

    /// Stochastic universal sampling: `number` equally spaced pointers on the
    /// same wheel as [`Roulette`](Selection::Roulette), giving lower
    /// variance than repeated spins.
    StochasticUniversalSampling,

    /// Tournament selection: pick `k` chromosomes at random, keep the best.
    ///
    /// Higher `k` = stronger selection pressure.
    /// - k=2: light pressure (good for diversity)
    /// - k=3-5: moderate pressure (typical default)
    /// - k>5: strong pressure (risk of premature convergence)
    ///
    /// # Complexity
    /// O(k) per selection
    Tournament(usize),

    /// Rank-based selection.
    ///
    /// Selection probability is proportional to rank position, not raw
    /// fitness value, which avoids the scaling problems of roulette
    /// selection.
    ///
    /// Reference: Baker (1985), "Adaptive Selection Methods for Genetic
    /// Algorithms"
    Rank,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::Elite
    }
}

impl<C: Chromosome> SelectionOperator<C> for Selection {
    fn name(&self) -> &'static str {
        match self {
            Selection::Elite => "Elite",
            Selection::Roulette => "Roulette",
            Selection::StochasticUniversalSampling => "StochasticUniversalSampling",
            Selection::Tournament(_) => "Tournament",
            Selection::Rank => "Rank",
        }
    }

    fn perform_select(
        &self,
        number: usize,
        generation: &Generation<C>,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<C>> {
        let population = generation.chromosomes();
        let indices = match self {
            Selection::Elite => elite(population, number),
            Selection::Roulette => {
                let wheel = Wheel::new(population);
                (0..number).map(|_| wheel.spin(rng)).collect()
            }
            Selection::StochasticUniversalSampling => {
                Wheel::new(population).universal_sample(number, rng)
            }
            Selection::Tournament(k) => (0..number)
                .map(|_| tournament(population, *k, rng))
                .collect(),
            Selection::Rank => {
                let ranked = ranked_indices(population);
                let best = fitness_of(&population[ranked[0]]);
                let worst = fitness_of(&population[ranked[ranked.len() - 1]]);
                if best == worst {
                    // all ranks tie
                    (0..number)
                        .map(|_| rng.random_range(0..population.len()))
                        .collect()
                } else {
                    (0..number).map(|_| rank(&ranked, rng)).collect()
                }
            }
        };

        Ok(indices.into_iter().map(|i| population[i].clone()).collect())
    }
}

fn fitness_of<C: Chromosome>(c: &C) -> f64 {
    c.fitness().unwrap_or(f64::NEG_INFINITY)
}

/// Indices of the fittest members, best first, cycling if needed.
fn elite<C: Chromosome>(population: &[C], number: usize) -> Vec<usize> {
    ranked_indices(population)
        .into_iter()
        .cycle()
        .take(number)
        .collect()
}

/// Indices sorted best-first; ties keep their original order.
fn ranked_indices<C: Chromosome>(population: &[C]) -> Vec<usize> {
    let mut indexed: Vec<usize> = (0..population.len()).collect();
    indexed.sort_by(|&a, &b| by_fitness_desc(&population[a], &population[b]));
    indexed
}

/// Tournament selection: pick k random chromosomes, return best.
fn tournament<C: Chromosome>(population: &[C], k: usize, rng: &mut dyn RngCore) -> usize {
    let k = k.max(1);
    let n = population.len();

    let mut best_idx = rng.random_range(0..n);
    for _ in 1..k {
        let idx = rng.random_range(0..n);
        if fitness_of(&population[idx]) > fitness_of(&population[best_idx]) {
            best_idx = idx;
        }
    }
    best_idx
}

/// Rank-based selection using linear ranking over pre-sorted indices.
///
/// weight_i = n - rank_i, so the best member has weight n.
fn rank(ranked: &[usize], rng: &mut dyn RngCore) -> usize {
    let n = ranked.len();
    if n == 1 {
        return ranked[0];
    }

    let total: f64 = (n * (n + 1)) as f64 / 2.0;
    let threshold = rng.random_range(0.0..total);
    let mut cumulative = 0.0;

    for (rank, &original_idx) in ranked.iter().enumerate() {
        cumulative += (n - rank) as f64;
        if cumulative > threshold {
            return original_idx;
        }
    }

    ranked[n - 1] // floating-point fallback
}

/// Cumulative fitness wheel shared by roulette and SUS.
struct Wheel {
    cumulative: Vec<f64>,
    total: f64,
}

impl Wheel {
    fn new<C: Chromosome>(population: &[C]) -> Self {
        let fitnesses: Vec<f64> = population.iter().map(fitness_of).collect();
        let min = fitnesses.iter().cloned().fold(f64::INFINITY, f64::min);
        let shift = if min < 0.0 { -min } else { 0.0 };

        let mut cumulative = Vec::with_capacity(fitnesses.len());
        let mut total = 0.0;
        for f in fitnesses {
            let w = f + shift;
            if w.is_finite() && w > 0.0 {
                total += w;
            }
            cumulative.push(total);
        }

        Self { cumulative, total }
    }

    /// Whether the wheel degenerates to a uniform draw.
    fn is_uniform(&self) -> bool {
        !(self.total.is_finite() && self.total > 0.0)
    }

    fn index_at(&self, point: f64) -> usize {
        let idx = self.cumulative.partition_point(|&c| c <= point);
        idx.min(self.cumulative.len() - 1)
    }

    fn spin(&self, rng: &mut dyn RngCore) -> usize {
        let n = self.cumulative.len();
        if self.is_uniform() {
            return rng.random_range(0..n);
        }
        self.index_at(rng.random_range(0.0..self.total))
    }

    fn universal_sample(&self, number: usize, rng: &mut dyn RngCore) -> Vec<usize> {
        let n = self.cumulative.len();
        if self.is_uniform() {
            return (0..number).map(|_| rng.random_range(0..n)).collect();
        }
        let step = self.total / number as f64;
        let start = rng.random_range(0.0..step);
        (0..number)
            .map(|i| self.index_at(start + i as f64 * step))
            .collect()
    }
}
