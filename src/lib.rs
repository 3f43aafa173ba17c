//! Domain-agnostic genetic algorithm engine.
//!
//! Evolves a population of candidate solutions through repeated
//! selection, crossover, mutation and reinsertion until a termination
//! criterion fires:
//!
//! - **Problem contract**: a [`Chromosome`](ga::Chromosome) encoding plus a
//!   [`Fitness`](ga::Fitness) function. Nothing else is domain-specific.
//! - **Operators**: built-in selection, crossover, mutation, reinsertion,
//!   termination and history strategies, replaceable by any type
//!   implementing the matching trait, and constructible by name through
//!   the [`OperatorRegistry`](ga::OperatorRegistry).
//! - **Control**: [`GeneticAlgorithm`](ga::GeneticAlgorithm) runs the loop
//!   with a start/stop/resume state machine, cooperative cancellation and
//!   observer notifications.
//!
//! # Features
//!
//! - `parallel` (default): evaluates fitness on the rayon thread pool.
//! - `serde`: `Serialize`/`Deserialize` for the configuration and operator
//!   enums.

pub mod ga;
