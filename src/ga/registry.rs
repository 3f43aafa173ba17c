//! Name-based operator discovery and construction.
//!
//! An [`OperatorRegistry`] maps implementation names to constructor
//! functions, one table per [`OperatorKind`]. The default registry holds
//! every built-in; applications can register their own operators next to
//! them and build any of them from configuration.
//!
//! ```
//! use u_genetic::ga::{OperatorArgs, OperatorKind, OperatorRegistry};
//! # use u_genetic::ga::Chromosome;
//! # use rand::{Rng, RngCore};
//! # #[derive(Clone, Debug)]
//! # struct Bits { genes: Vec<bool>, fitness: Option<f64> }
//! # impl Chromosome for Bits {
//! #     type Gene = bool;
//! #     fn genes(&self) -> &[bool] { &self.genes }
//! #     fn genes_mut(&mut self) -> &mut [bool] { &mut self.genes }
//! #     fn generate_gene(&self, _: usize, rng: &mut dyn RngCore) -> bool { rng.random() }
//! #     fn create_new(&self, rng: &mut dyn RngCore) -> Self {
//! #         Bits { genes: (0..self.genes.len()).map(|_| rng.random()).collect(), fitness: None }
//! #     }
//! #     fn fitness(&self) -> Option<f64> { self.fitness }
//! #     fn set_fitness(&mut self, fitness: Option<f64>) { self.fitness = fitness }
//! # }
//!
//! let registry = OperatorRegistry::<Bits>::default();
//! assert!(registry.names(OperatorKind::Selection).contains(&"Tournament"));
//!
//! let selection = registry
//!     .create_selection("Tournament", &OperatorArgs::new().with("size", 3.0))
//!     .unwrap();
//! ```

use super::chromosome::Chromosome;
use super::crossover::{Crossover, CrossoverOperator};
use super::error::{GaError, Result};
use super::generation_strategy::GenerationStrategy;
use super::mutation::{Mutation, MutationOperator};
use super::reinsertion::{Reinsertion, ReinsertionOperator};
use super::selection::{Selection, SelectionOperator};
use super::termination::{Termination, TerminationCriterion};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// The operator families known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OperatorKind {
    Selection,
    Crossover,
    Mutation,
    Reinsertion,
    Termination,
    GenerationStrategy,
}

impl OperatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorKind::Selection => "selection",
            OperatorKind::Crossover => "crossover",
            OperatorKind::Mutation => "mutation",
            OperatorKind::Reinsertion => "reinsertion",
            OperatorKind::Termination => "termination",
            OperatorKind::GenerationStrategy => "generation strategy",
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named numeric arguments passed to operator constructors.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OperatorArgs {
    values: BTreeMap<String, f64>,
}

impl OperatorArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an argument.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// The value of `name`, or `default` when absent. Fails on NaN or
    /// infinite values.
    pub fn get_f64(&self, name: &'static str, default: f64) -> Result<f64> {
        match self.get(name) {
            None => Ok(default),
            Some(v) if v.is_finite() => Ok(v),
            Some(v) => Err(GaError::invalid_argument(
                name,
                format!("must be a finite number, got {v}"),
            )),
        }
    }

    /// The value of `name` as a count, or `default` when absent. Fails on
    /// negative or fractional values.
    pub fn get_usize(&self, name: &'static str, default: usize) -> Result<usize> {
        match self.get(name) {
            None => Ok(default),
            Some(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => Ok(v as usize),
            Some(v) => Err(GaError::invalid_argument(
                name,
                format!("must be a non-negative integer, got {v}"),
            )),
        }
    }
}

type Factory<T> = Box<dyn Fn(&OperatorArgs) -> Result<T> + Send + Sync>;

/// Constructs operators by name.
pub struct OperatorRegistry<C: Chromosome> {
    selections: BTreeMap<String, Factory<Box<dyn SelectionOperator<C>>>>,
    crossovers: BTreeMap<String, Factory<Box<dyn CrossoverOperator<C>>>>,
    mutations: BTreeMap<String, Factory<Box<dyn MutationOperator<C>>>>,
    reinsertions: BTreeMap<String, Factory<Box<dyn ReinsertionOperator<C>>>>,
    terminations: BTreeMap<String, Factory<Box<dyn TerminationCriterion>>>,
    generation_strategies: BTreeMap<String, Factory<GenerationStrategy>>,
}

impl<C: Chromosome> OperatorRegistry<C> {
    /// A registry with no operators at all.
    pub fn empty() -> Self {
        Self {
            selections: BTreeMap::new(),
            crossovers: BTreeMap::new(),
            mutations: BTreeMap::new(),
            reinsertions: BTreeMap::new(),
            terminations: BTreeMap::new(),
            generation_strategies: BTreeMap::new(),
        }
    }

    /// Registered names of the given kind, sorted.
    pub fn names(&self, kind: OperatorKind) -> Vec<&str> {
        fn keys<V>(map: &BTreeMap<String, V>) -> Vec<&str> {
            map.keys().map(String::as_str).collect()
        }
        match kind {
            OperatorKind::Selection => keys(&self.selections),
            OperatorKind::Crossover => keys(&self.crossovers),
            OperatorKind::Mutation => keys(&self.mutations),
            OperatorKind::Reinsertion => keys(&self.reinsertions),
            OperatorKind::Termination => keys(&self.terminations),
            OperatorKind::GenerationStrategy => keys(&self.generation_strategies),
        }
    }

    // ---- registration ----

    /// Registers a selection constructor, replacing any under the same name.
    pub fn register_selection<S, F>(&mut self, name: impl Into<String>, factory: F)
    where
        S: SelectionOperator<C> + 'static,
        F: Fn(&OperatorArgs) -> Result<S> + Send + Sync + 'static,
    {
        self.selections.insert(
            name.into(),
            Box::new(move |args: &OperatorArgs| Ok(Box::new(factory(args)?) as Box<dyn SelectionOperator<C>>)),
        );
    }

    pub fn register_crossover<X, F>(&mut self, name: impl Into<String>, factory: F)
    where
        X: CrossoverOperator<C> + 'static,
        F: Fn(&OperatorArgs) -> Result<X> + Send + Sync + 'static,
    {
        self.crossovers.insert(
            name.into(),
            Box::new(move |args: &OperatorArgs| Ok(Box::new(factory(args)?) as Box<dyn CrossoverOperator<C>>)),
        );
    }

    pub fn register_mutation<M, F>(&mut self, name: impl Into<String>, factory: F)
    where
        M: MutationOperator<C> + 'static,
        F: Fn(&OperatorArgs) -> Result<M> + Send + Sync + 'static,
    {
        self.mutations.insert(
            name.into(),
            Box::new(move |args: &OperatorArgs| Ok(Box::new(factory(args)?) as Box<dyn MutationOperator<C>>)),
        );
    }

    pub fn register_reinsertion<R, F>(&mut self, name: impl Into<String>, factory: F)
    where
        R: ReinsertionOperator<C> + 'static,
        F: Fn(&OperatorArgs) -> Result<R> + Send + Sync + 'static,
    {
        self.reinsertions.insert(
            name.into(),
            Box::new(move |args: &OperatorArgs| {
                Ok(Box::new(factory(args)?) as Box<dyn ReinsertionOperator<C>>)
            }),
        );
    }

    pub fn register_termination<T, F>(&mut self, name: impl Into<String>, factory: F)
    where
        T: TerminationCriterion + 'static,
        F: Fn(&OperatorArgs) -> Result<T> + Send + Sync + 'static,
    {
        self.terminations.insert(
            name.into(),
            Box::new(move |args: &OperatorArgs| Ok(Box::new(factory(args)?) as Box<dyn TerminationCriterion>)),
        );
    }

    pub fn register_generation_strategy<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&OperatorArgs) -> Result<GenerationStrategy> + Send + Sync + 'static,
    {
        self.generation_strategies
            .insert(name.into(), Box::new(factory));
    }

    // ---- construction ----

    pub fn create_selection(
        &self,
        name: &str,
        args: &OperatorArgs,
    ) -> Result<Box<dyn SelectionOperator<C>>> {
        build(&self.selections, OperatorKind::Selection, name, args)
    }

    pub fn create_crossover(
        &self,
        name: &str,
        args: &OperatorArgs,
    ) -> Result<Box<dyn CrossoverOperator<C>>> {
        build(&self.crossovers, OperatorKind::Crossover, name, args)
    }

    pub fn create_mutation(
        &self,
        name: &str,
        args: &OperatorArgs,
    ) -> Result<Box<dyn MutationOperator<C>>> {
        build(&self.mutations, OperatorKind::Mutation, name, args)
    }

    pub fn create_reinsertion(
        &self,
        name: &str,
        args: &OperatorArgs,
    ) -> Result<Box<dyn ReinsertionOperator<C>>> {
        build(&self.reinsertions, OperatorKind::Reinsertion, name, args)
    }

    pub fn create_termination(
        &self,
        name: &str,
        args: &OperatorArgs,
    ) -> Result<Box<dyn TerminationCriterion>> {
        build(&self.terminations, OperatorKind::Termination, name, args)
    }

    pub fn create_generation_strategy(
        &self,
        name: &str,
        args: &OperatorArgs,
    ) -> Result<GenerationStrategy> {
        build(
            &self.generation_strategies,
            OperatorKind::GenerationStrategy,
            name,
            args,
        )
    }
}

fn build<T>(
    table: &BTreeMap<String, Factory<T>>,
    kind: OperatorKind,
    name: &str,
    args: &OperatorArgs,
) -> Result<T> {
    let factory = table.get(name).ok_or_else(|| GaError::UnknownOperator {
        kind: kind.as_str(),
        name: name.to_string(),
    })?;
    factory(args)
}

impl<C: Chromosome> Default for OperatorRegistry<C> {
    /// Every built-in operator, under its variant name.
    ///
    /// | Name | Arguments (default) |
    /// |---|---|
    /// | `Tournament` | `size` (2) |
    /// | `OnePoint` | `swap_point` (random) |
    /// | `TwoPoint` | `first`, `second` (random) |
    /// | `Uniform` crossover | `mix_probability` (0.5) |
    /// | `GenerationNumber` | `generations` (100) |
    /// | `FitnessThreshold` | `threshold` (1.0) |
    /// | `FitnessStagnation` | `generations` (100) |
    /// | `TimeEvolving` | `seconds` (60) |
    /// | `Performance` | `generations` (10) |
    fn default() -> Self {
        let mut registry = Self::empty();

        registry.register_selection("Elite", |_| Ok(Selection::Elite));
        registry.register_selection("Roulette", |_| Ok(Selection::Roulette));
        registry.register_selection("StochasticUniversalSampling", |_| {
            Ok(Selection::StochasticUniversalSampling)
        });
        registry.register_selection("Tournament", |args| {
            let size = args.get_usize("size", 2)?;
            if size < 1 {
                return Err(GaError::invalid_argument("size", "must be at least 1"));
            }
            Ok(Selection::Tournament(size))
        });
        registry.register_selection("Rank", |_| Ok(Selection::Rank));

        registry.register_crossover("OnePoint", |args| {
            let swap_point = match args.get("swap_point") {
                Some(_) => Some(args.get_usize("swap_point", 0)?),
                None => None,
            };
            Ok(Crossover::OnePoint { swap_point })
        });
        registry.register_crossover("TwoPoint", |args| {
            let points = match (args.get("first"), args.get("second")) {
                (Some(_), Some(_)) => Some((args.get_usize("first", 0)?, args.get_usize("second", 0)?)),
                (None, None) => None,
                _ => {
                    return Err(GaError::invalid_argument(
                        "second",
                        "both swap points must be given together",
                    ))
                }
            };
            Ok(Crossover::TwoPoint { points })
        });
        registry.register_crossover("Uniform", |args| {
            Ok(Crossover::Uniform {
                mix_probability: args.get_f64("mix_probability", 0.5)?,
            })
        });
        registry.register_crossover("Ordered", |_| Ok(Crossover::Ordered));
        registry.register_crossover("PartiallyMapped", |_| Ok(Crossover::PartiallyMapped));
        registry.register_crossover("Cycle", |_| Ok(Crossover::Cycle));

        registry.register_mutation("Uniform", |_| Ok(Mutation::Uniform));
        registry.register_mutation("Twors", |_| Ok(Mutation::Twors));
        registry.register_mutation("ReverseSequence", |_| Ok(Mutation::ReverseSequence));
        registry.register_mutation("Insertion", |_| Ok(Mutation::Insertion));

        registry.register_reinsertion("Pure", |_| Ok(Reinsertion::Pure));
        registry.register_reinsertion("Elitist", |_| Ok(Reinsertion::Elitist));
        registry.register_reinsertion("Uniform", |_| Ok(Reinsertion::Uniform));
        registry.register_reinsertion("FitnessBased", |_| Ok(Reinsertion::FitnessBased));

        registry.register_termination("GenerationNumber", |args| {
            let generations = args.get_usize("generations", 100)?;
            if generations == 0 {
                return Err(GaError::invalid_argument("generations", "must be at least 1"));
            }
            Ok(Termination::GenerationNumber(generations))
        });
        registry.register_termination("FitnessThreshold", |args| {
            Ok(Termination::FitnessThreshold(args.get_f64("threshold", 1.0)?))
        });
        registry.register_termination("FitnessStagnation", |args| {
            Ok(Termination::FitnessStagnation(args.get_usize("generations", 100)?))
        });
        registry.register_termination("TimeEvolving", |args| {
            let seconds = args.get_f64("seconds", 60.0)?;
            let limit = Duration::try_from_secs_f64(seconds)
                .map_err(|e| GaError::invalid_argument("seconds", e.to_string()))?;
            Ok(Termination::TimeEvolving(limit))
        });

        registry.register_generation_strategy("Performance", |args| {
            Ok(GenerationStrategy::Performance(args.get_usize("generations", 10)?))
        });
        registry.register_generation_strategy("Tracking", |_| Ok(GenerationStrategy::Tracking));

        registry
    }
}

impl<C: Chromosome> fmt::Debug for OperatorRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorRegistry")
            .field("selections", &self.names(OperatorKind::Selection))
            .field("crossovers", &self.names(OperatorKind::Crossover))
            .field("mutations", &self.names(OperatorKind::Mutation))
            .field("reinsertions", &self.names(OperatorKind::Reinsertion))
            .field("terminations", &self.names(OperatorKind::Termination))
            .field(
                "generation_strategies",
                &self.names(OperatorKind::GenerationStrategy),
            )
            .finish()
    }
}
