//! Population and generation bookkeeping.
//!
//! A [`Population`] owns the active [`Generation`], the generation counter,
//! the best chromosome of the last ended generation, and a history of ended
//! generations pruned by its [`GenerationStrategy`].

use super::chromosome::{by_fitness_desc, Chromosome};
use super::error::{GaError, Result};
use super::fitness::FitnessEvaluator;
use super::generation_strategy::GenerationStrategy;
use rand::RngCore;
use std::collections::VecDeque;
use std::time::Instant;
use tracing::instrument;

/// One population snapshot.
#[derive(Debug, Clone)]
pub struct Generation<C: Chromosome> {
    number: usize,
    chromosomes: Vec<C>,
    best_chromosome: Option<C>,
    created_at: Instant,
}

impl<C: Chromosome> Generation<C> {
    /// Creates a generation with the given members. Not yet ended.
    pub fn new(number: usize, chromosomes: Vec<C>) -> Self {
        Self {
            number,
            chromosomes,
            best_chromosome: None,
            created_at: Instant::now(),
        }
    }

    /// 1-based generation number. Assigned when the generation ends.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Members, sorted best-first once the generation has ended.
    pub fn chromosomes(&self) -> &[C] {
        &self.chromosomes
    }

    /// Best member, set when the generation ends.
    pub fn best_chromosome(&self) -> Option<&C> {
        self.best_chromosome.as_ref()
    }

    /// When the generation was created.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    /// Index of the first chromosome without a fitness value.
    pub fn first_unevaluated(&self) -> Option<usize> {
        self.chromosomes.iter().position(|c| !c.is_evaluated())
    }
}

/// The evolving set of candidate solutions.
///
/// # Size bounds
///
/// After [`create_initial_generation`](Population::create_initial_generation)
/// and every [`create_new_generation`](Population::create_new_generation),
/// the active generation holds between `min_size` and `max_size`
/// chromosomes.
#[derive(Debug, Clone)]
pub struct Population<C: Chromosome> {
    min_size: usize,
    max_size: usize,
    prototype: C,
    current: Generation<C>,
    history: VecDeque<Generation<C>>,
    generations_number: usize,
    best_chromosome: Option<C>,
    generation_strategy: GenerationStrategy,
}

impl<C: Chromosome> Population<C> {
    /// Creates an empty population. Chromosomes are generated from
    /// `prototype` by [`create_initial_generation`](Self::create_initial_generation).
    pub fn new(min_size: usize, max_size: usize, prototype: C) -> Self {
        Self {
            min_size,
            max_size,
            prototype,
            current: Generation::new(0, Vec::new()),
            history: VecDeque::new(),
            generations_number: 0,
            best_chromosome: None,
            generation_strategy: GenerationStrategy::default(),
        }
    }

    /// Sets the history retention policy.
    pub fn with_generation_strategy(mut self, strategy: GenerationStrategy) -> Self {
        self.generation_strategy = strategy;
        self
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn prototype(&self) -> &C {
        &self.prototype
    }

    /// Number of generations ended since the last initial generation.
    pub fn generations_number(&self) -> usize {
        self.generations_number
    }

    /// The active generation.
    pub fn current_generation(&self) -> &Generation<C> {
        &self.current
    }

    /// Retained ended generations, oldest first.
    pub fn generations(&self) -> &VecDeque<Generation<C>> {
        &self.history
    }

    /// Best chromosome of the most recently ended generation.
    pub fn best_chromosome(&self) -> Option<&C> {
        self.best_chromosome.as_ref()
    }

    pub fn generation_strategy(&self) -> GenerationStrategy {
        self.generation_strategy
    }

    /// Changes the retention policy and applies it to the current history.
    pub fn set_generation_strategy(&mut self, strategy: GenerationStrategy) {
        self.generation_strategy = strategy;
        strategy.register_new_generation(&mut self.history);
    }

    /// Checks the size bounds.
    pub fn validate(&self) -> Result<()> {
        if self.min_size < 2 {
            return Err(GaError::Population(format!(
                "minimum size must be at least 2, got {}",
                self.min_size
            )));
        }
        if self.max_size < self.min_size {
            return Err(GaError::Population(format!(
                "maximum size {} is smaller than minimum size {}",
                self.max_size, self.min_size
            )));
        }
        Ok(())
    }

    /// Resets the population and fills it with `min_size` fresh chromosomes.
    #[instrument(level = "debug", skip_all, fields(min_size = self.min_size, max_size = self.max_size))]
    pub fn create_initial_generation(&mut self, rng: &mut dyn RngCore) -> Result<()> {
        self.validate()?;

        let length = self.prototype.length();
        let mut chromosomes = Vec::with_capacity(self.min_size);
        for _ in 0..self.min_size {
            let chromosome = self.prototype.create_new(rng);
            if chromosome.length() != length {
                return Err(GaError::Population(format!(
                    "{}::create_new produced {} genes, prototype has {}",
                    self.prototype.kind(),
                    chromosome.length(),
                    length
                )));
            }
            chromosomes.push(chromosome);
        }

        self.history.clear();
        self.generations_number = 0;
        self.best_chromosome = None;
        self.current = Generation::new(1, chromosomes);
        Ok(())
    }

    /// Replaces the active generation's members.
    ///
    /// Fails without modifying the population if the count is outside
    /// `[min_size, max_size]`.
    pub fn create_new_generation(&mut self, chromosomes: Vec<C>) -> Result<()> {
        let count = chromosomes.len();
        if count < self.min_size || count > self.max_size {
            return Err(GaError::Population(format!(
                "a generation must have between {} and {} chromosomes, got {count}",
                self.min_size, self.max_size
            )));
        }
        self.current = Generation::new(self.generations_number + 1, chromosomes);
        Ok(())
    }

    /// Ends the active generation.
    ///
    /// Evaluates every chromosome lacking a fitness, sorts best-first
    /// (stable, so ties keep their order), records the best chromosome,
    /// stores a snapshot in the history and increments the generation
    /// counter. Returns whether the best chromosome changed.
    ///
    /// If evaluation fails the counter and history are left untouched.
    #[instrument(level = "debug", skip_all, fields(generation = self.generations_number + 1))]
    pub fn end_current_generation(
        &mut self,
        evaluator: &FitnessEvaluator<C>,
        parallel: bool,
    ) -> Result<bool> {
        if self.current.is_empty() {
            return Err(GaError::InvalidState(
                "no active generation: create the initial generation first".into(),
            ));
        }

        evaluator.evaluate_all(&mut self.current.chromosomes, parallel)?;
        self.current.chromosomes.sort_by(by_fitness_desc);

        let best = self.current.chromosomes[0].clone();
        let changed = match &self.best_chromosome {
            Some(previous) => {
                previous.fitness() != best.fitness() || previous.genes() != best.genes()
            }
            None => true,
        };

        self.generations_number += 1;
        self.current.number = self.generations_number;
        self.current.best_chromosome = Some(best.clone());
        self.history.push_back(self.current.clone());
        self.generation_strategy
            .register_new_generation(&mut self.history);
        self.best_chromosome = Some(best);

        Ok(changed)
    }
}
