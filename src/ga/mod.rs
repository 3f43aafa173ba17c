//! Genetic Algorithm engine.
//!
//! A generic, domain-agnostic GA built on trait-based abstractions. Users
//! describe their problem with a [`Chromosome`] encoding and a [`Fitness`]
//! function; everything else is a pluggable operator.
//!
//! # Core Traits
//!
//! - [`Chromosome`]: fixed-length gene sequence with a cached fitness
//! - [`Fitness`]: problem-supplied score, higher is better ([`Minimize`]
//!   adapts lower-is-better scores)
//! - [`SelectionOperator`], [`CrossoverOperator`], [`MutationOperator`],
//!   [`ReinsertionOperator`], [`TerminationCriterion`]: operator contracts,
//!   with the built-ins as the variants of [`Selection`], [`Crossover`],
//!   [`Mutation`], [`Reinsertion`] and [`Termination`]
//! - [`GaObserver`]: generation and termination notifications
//!
//! # Key Types
//!
//! - [`GaConfig`]: population bounds, probabilities, termination, presets
//! - [`GeneticAlgorithm`]: runs the evolutionary loop (start, stop, resume)
//! - [`Population`] / [`Generation`]: the evolving chromosomes and history
//! - [`OperatorRegistry`]: builds operators by name
//!
//! # Submodules
//!
//! - [`operators`]: gene-level permutation crossover (OX, PMX, CX) and
//!   mutation kernels shared by the ordered operators
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - De Jong (2006), *Evolutionary Computation: A Unified Approach*

mod chromosome;
mod config;
mod crossover;
mod error;
mod events;
mod fitness;
mod generation_strategy;
mod mutation;
pub mod operators;
mod population;
mod registry;
mod reinsertion;
mod runner;
mod selection;
mod termination;

#[cfg(test)]
mod test_support;

pub use chromosome::{by_fitness_desc, Chromosome};
pub use config::GaConfig;
pub use crossover::{Crossover, CrossoverOperator};
pub use error::{GaError, Result};
pub use events::{GaEvent, GaObserver, GenerationReport, ObserverId};
pub use fitness::{Fitness, FitnessEvaluator, Minimize};
pub use generation_strategy::GenerationStrategy;
pub use mutation::{Mutation, MutationOperator};
pub use population::{Generation, Population};
pub use registry::{OperatorArgs, OperatorKind, OperatorRegistry};
pub use reinsertion::{Reinsertion, ReinsertionOperator};
pub use runner::{GaState, GeneticAlgorithm, StopHandle};
pub use selection::{Selection, SelectionOperator};
pub use termination::{EvolutionStatus, Termination, TerminationCriterion};
