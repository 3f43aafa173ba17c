//! GA configuration.
//!
//! [`GaConfig`] holds the parameters of the evolutionary loop that are not
//! operators: population bounds, operator probabilities, termination,
//! history retention, parallelism and the random seed. Operators are
//! handed to [`GeneticAlgorithm::new`](super::GeneticAlgorithm::new)
//! directly.

use super::error::GaError;
use super::generation_strategy::GenerationStrategy;
use super::termination::Termination;
use std::time::Duration;

/// Configuration for the Genetic Algorithm.
///
/// # Defaults
///
/// ```
/// use u_genetic::ga::{GaConfig, Termination};
///
/// let config = GaConfig::default();
/// assert_eq!(config.min_size, 50);
/// assert_eq!(config.max_size, 100);
/// assert_eq!(config.termination, Termination::GenerationNumber(1));
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_genetic::ga::{GaConfig, GenerationStrategy, Termination};
///
/// let config = GaConfig::default()
///     .with_population_size(100, 150)
///     .with_crossover_probability(0.8)
///     .with_mutation_probability(0.05)
///     .with_termination(Termination::FitnessStagnation(30))
///     .with_generation_strategy(GenerationStrategy::Tracking)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of chromosomes in the initial generation and the smallest
    /// generation reinsertion may produce.
    pub min_size: usize,

    /// Largest generation reinsertion may produce.
    pub max_size: usize,

    /// Probability of crossing a group of parents (0.0–1.0).
    ///
    /// Groups that are not crossed produce no offspring.
    pub crossover_probability: f64,

    /// Probability handed to the mutation operator for every offspring
    /// (0.0–1.0).
    pub mutation_probability: f64,

    /// When the run ends.
    pub termination: Termination,

    /// How many ended generations the population keeps.
    pub generation_strategy: GenerationStrategy,

    /// Whether to evaluate chromosomes in parallel using rayon.
    ///
    /// Ignored without the `parallel` feature.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            min_size: 50,
            max_size: 100,
            crossover_probability: 0.75,
            mutation_probability: 0.1,
            termination: Termination::default(),
            generation_strategy: GenerationStrategy::default(),
            parallel: true,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population bounds.
    pub fn with_population_size(mut self, min_size: usize, max_size: usize) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    /// Sets the crossover probability.
    pub fn with_crossover_probability(mut self, probability: f64) -> Self {
        self.crossover_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation probability.
    pub fn with_mutation_probability(mut self, probability: f64) -> Self {
        self.mutation_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Sets the termination criterion.
    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    /// Convenience builder for a fixed number of generations.
    ///
    /// Equivalent to
    /// `.with_termination(Termination::GenerationNumber(n))`.
    pub fn with_generations(self, n: usize) -> Self {
        self.with_termination(Termination::GenerationNumber(n))
    }

    /// Sets the generation history policy.
    pub fn with_generation_strategy(mut self, strategy: GenerationStrategy) -> Self {
        self.generation_strategy = strategy;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Preset for fast optimization: small population, short run.
    ///
    /// - Population: 50–100
    /// - Stops after 100 generations, 20 stagnant generations or 10s
    pub fn fast() -> Self {
        Self {
            min_size: 50,
            max_size: 100,
            termination: Self::capped(100, 20, 10),
            ..Self::default()
        }
    }

    /// Preset for balanced optimization.
    ///
    /// - Population: 100–150
    /// - Stops after 300 generations, 50 stagnant generations or 30s
    pub fn balanced() -> Self {
        Self {
            min_size: 100,
            max_size: 150,
            termination: Self::capped(300, 50, 30),
            ..Self::default()
        }
    }

    /// Preset for quality: large population, long run.
    ///
    /// - Population: 150–250
    /// - Stops after 500 generations, 80 stagnant generations or 60s
    pub fn thorough() -> Self {
        Self {
            min_size: 150,
            max_size: 250,
            termination: Self::capped(500, 80, 60),
            ..Self::default()
        }
    }

    fn capped(generations: usize, stagnation: usize, seconds: u64) -> Termination {
        Termination::Any(vec![
            Termination::GenerationNumber(generations),
            Termination::FitnessStagnation(stagnation),
            Termination::TimeEvolving(Duration::from_secs(seconds)),
        ])
    }

    /// Automatically selects a preset based on chromosome length.
    ///
    /// - `gene_count < 50` → [`fast()`](Self::fast)
    /// - `50 ≤ gene_count < 200` → [`balanced()`](Self::balanced)
    /// - `gene_count ≥ 200` → [`thorough()`](Self::thorough)
    pub fn auto_select(gene_count: usize) -> Self {
        if gene_count < 50 {
            Self::fast()
        } else if gene_count < 200 {
            Self::balanced()
        } else {
            Self::thorough()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), GaError> {
        if self.min_size < 2 {
            return Err(GaError::InvalidConfig(format!(
                "min_size must be at least 2, got {}",
                self.min_size
            )));
        }
        if self.max_size < self.min_size {
            return Err(GaError::InvalidConfig(format!(
                "max_size {} is smaller than min_size {}",
                self.max_size, self.min_size
            )));
        }
        for (name, p) in [
            ("crossover_probability", self.crossover_probability),
            ("mutation_probability", self.mutation_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(GaError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }
        if has_zero_generation_limit(&self.termination) {
            return Err(GaError::InvalidConfig(
                "the generation limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn has_zero_generation_limit(termination: &Termination) -> bool {
    match termination {
        Termination::GenerationNumber(n) => *n == 0,
        Termination::Any(criteria) | Termination::All(criteria) => {
            criteria.iter().any(has_zero_generation_limit)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GaConfig::default();
        assert_eq!(config.min_size, 50);
        assert_eq!(config.max_size, 100);
        assert!((config.crossover_probability - 0.75).abs() < 1e-10);
        assert!((config.mutation_probability - 0.1).abs() < 1e-10);
        assert_eq!(config.termination, Termination::GenerationNumber(1));
        assert_eq!(config.generation_strategy, GenerationStrategy::Performance(10));
        assert!(config.parallel);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let config = GaConfig::default()
            .with_population_size(20, 40)
            .with_crossover_probability(0.8)
            .with_mutation_probability(0.05)
            .with_generations(1000)
            .with_generation_strategy(GenerationStrategy::Tracking)
            .with_parallel(false)
            .with_seed(42);

        assert_eq!(config.min_size, 20);
        assert_eq!(config.max_size, 40);
        assert!((config.crossover_probability - 0.8).abs() < 1e-10);
        assert!((config.mutation_probability - 0.05).abs() < 1e-10);
        assert_eq!(config.termination, Termination::GenerationNumber(1000));
        assert_eq!(config.generation_strategy, GenerationStrategy::Tracking);
        assert!(!config.parallel);
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_validate_ok() {
        assert!(GaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_population_too_small() {
        let config = GaConfig::default().with_population_size(1, 10);
        assert!(matches!(config.validate(), Err(GaError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_max_below_min() {
        let config = GaConfig::default().with_population_size(10, 5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_generations() {
        let config = GaConfig::default().with_generations(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_nested_zero_generations() {
        let config = GaConfig::default().with_termination(Termination::Any(vec![
            Termination::FitnessThreshold(10.0),
            Termination::All(vec![Termination::GenerationNumber(0)]),
        ]));
        assert!(matches!(config.validate(), Err(GaError::InvalidConfig(_))));
        assert!(GaConfig::fast().validate().is_ok());
    }

    #[test]
    fn test_validate_nan_probability() {
        let config = GaConfig {
            mutation_probability: f64::NAN,
            ..GaConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_clamp_rates() {
        let config = GaConfig::default()
            .with_crossover_probability(-0.5)
            .with_mutation_probability(2.0);

        assert!((config.crossover_probability - 0.0).abs() < 1e-10);
        assert!((config.mutation_probability - 1.0).abs() < 1e-10);
    }

    // ---- Presets ----

    #[test]
    fn test_preset_fast() {
        let config = GaConfig::fast();
        assert_eq!((config.min_size, config.max_size), (50, 100));
        assert_eq!(
            config.termination,
            Termination::Any(vec![
                Termination::GenerationNumber(100),
                Termination::FitnessStagnation(20),
                Termination::TimeEvolving(Duration::from_secs(10)),
            ])
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_preset_balanced() {
        let config = GaConfig::balanced();
        assert_eq!((config.min_size, config.max_size), (100, 150));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_preset_thorough() {
        let config = GaConfig::thorough();
        assert_eq!((config.min_size, config.max_size), (150, 250));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_preset_chainable() {
        let config = GaConfig::fast().with_population_size(75, 75).with_seed(42);
        assert_eq!(config.min_size, 75);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.termination, GaConfig::fast().termination);
    }

    // ---- auto_select ----

    #[test]
    fn test_auto_select_boundaries() {
        assert_eq!(GaConfig::auto_select(10), GaConfig::fast());
        assert_eq!(GaConfig::auto_select(49), GaConfig::fast());
        assert_eq!(GaConfig::auto_select(50), GaConfig::balanced());
        assert_eq!(GaConfig::auto_select(199), GaConfig::balanced());
        assert_eq!(GaConfig::auto_select(200), GaConfig::thorough());
    }
}
