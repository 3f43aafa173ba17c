//! Termination criteria.
//!
//! A criterion inspects an [`EvolutionStatus`] after each ended generation
//! and decides whether the run is over.

use std::time::Duration;

/// Snapshot of a run handed to termination criteria.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EvolutionStatus {
    /// Generations ended since the run started.
    pub generations_number: usize,
    /// Fitness of the best chromosome of the last ended generation.
    pub best_fitness: Option<f64>,
    /// Time spent evolving, excluding stopped periods.
    pub time_evolving: Duration,
    /// Consecutive ended generations (including the last) whose best
    /// fitness equals the current one. `1` when the last generation
    /// improved.
    pub stagnant_generations: usize,
}

/// Decides when a run is over.
pub trait TerminationCriterion: Send + Sync {
    /// Whether the run should stop after the generation described by
    /// `status`.
    fn has_reached(&self, status: &EvolutionStatus) -> bool;

    /// Name used in logs.
    fn name(&self) -> &'static str {
        "Custom"
    }
}

impl<F> TerminationCriterion for F
where
    F: Fn(&EvolutionStatus) -> bool + Send + Sync,
{
    fn has_reached(&self, status: &EvolutionStatus) -> bool {
        self(status)
    }
}

/// Built-in termination criteria.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    /// Reached once `n` generations have ended.
    GenerationNumber(usize),

    /// Reached once the best fitness is at least the threshold.
    FitnessThreshold(f64),

    /// Reached once the best fitness has not changed for `n` generations.
    FitnessStagnation(usize),

    /// Reached once the run has been evolving for the given time.
    TimeEvolving(Duration),

    /// Reached when any inner criterion is reached.
    Any(Vec<Termination>),

    /// Reached when every inner criterion is reached.
    All(Vec<Termination>),
}

impl Default for Termination {
    fn default() -> Self {
        Termination::GenerationNumber(1)
    }
}

impl TerminationCriterion for Termination {
    fn has_reached(&self, status: &EvolutionStatus) -> bool {
        match self {
            Termination::GenerationNumber(n) => status.generations_number >= *n,
            Termination::FitnessThreshold(threshold) => {
                status.best_fitness.is_some_and(|f| f >= *threshold)
            }
            Termination::FitnessStagnation(n) => status.stagnant_generations >= *n,
            Termination::TimeEvolving(limit) => status.time_evolving >= *limit,
            Termination::Any(inner) => inner.iter().any(|t| t.has_reached(status)),
            Termination::All(inner) => inner.iter().all(|t| t.has_reached(status)),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Termination::GenerationNumber(_) => "GenerationNumber",
            Termination::FitnessThreshold(_) => "FitnessThreshold",
            Termination::FitnessStagnation(_) => "FitnessStagnation",
            Termination::TimeEvolving(_) => "TimeEvolving",
            Termination::Any(_) => "Any",
            Termination::All(_) => "All",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(generations: usize, best: f64, stagnant: usize, secs: u64) -> EvolutionStatus {
        EvolutionStatus {
            generations_number: generations,
            best_fitness: Some(best),
            time_evolving: Duration::from_secs(secs),
            stagnant_generations: stagnant,
        }
    }

    #[test]
    fn test_generation_number() {
        let t = Termination::GenerationNumber(50);
        assert!(!t.has_reached(&status(49, 0.0, 1, 0)));
        assert!(t.has_reached(&status(50, 0.0, 1, 0)));
        assert!(t.has_reached(&status(51, 0.0, 1, 0)));
    }

    #[test]
    fn test_default_stops_after_first_generation() {
        assert!(Termination::default().has_reached(&status(1, 0.0, 1, 0)));
    }

    #[test]
    fn test_fitness_threshold() {
        let t = Termination::FitnessThreshold(10.0);
        assert!(!t.has_reached(&status(3, 9.5, 1, 0)));
        assert!(t.has_reached(&status(3, 10.0, 1, 0)));
        assert!(!t.has_reached(&EvolutionStatus::default()));
    }

    #[test]
    fn test_fitness_stagnation() {
        let t = Termination::FitnessStagnation(5);
        assert!(!t.has_reached(&status(20, 1.0, 4, 0)));
        assert!(t.has_reached(&status(20, 1.0, 5, 0)));
    }

    #[test]
    fn test_time_evolving() {
        let t = Termination::TimeEvolving(Duration::from_secs(2));
        assert!(!t.has_reached(&status(1, 0.0, 1, 1)));
        assert!(t.has_reached(&status(1, 0.0, 1, 2)));
    }

    #[test]
    fn test_any_and_all() {
        let any = Termination::Any(vec![
            Termination::GenerationNumber(100),
            Termination::FitnessThreshold(5.0),
        ]);
        let all = Termination::All(vec![
            Termination::GenerationNumber(100),
            Termination::FitnessThreshold(5.0),
        ]);
        let s = status(10, 6.0, 1, 0);
        assert!(any.has_reached(&s));
        assert!(!all.has_reached(&s));
        assert!(all.has_reached(&status(100, 6.0, 1, 0)));
        assert!(!Termination::Any(Vec::new()).has_reached(&s));
    }

    #[test]
    fn test_closure_criterion() {
        let t = |s: &EvolutionStatus| s.generations_number % 7 == 0;
        assert!(t.has_reached(&status(14, 0.0, 1, 0)));
        assert!(!t.has_reached(&status(15, 0.0, 1, 0)));
        assert_eq!(TerminationCriterion::name(&t), "Custom");
    }
}
