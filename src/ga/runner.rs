//! GA evolutionary loop execution.
//!
//! [`GeneticAlgorithm`] orchestrates the complete evolutionary process:
//! initialization → evaluation → selection → crossover → mutation →
//! reinsertion → repeat, until the termination criterion is reached or a
//! stop is requested.
//!
//! # State machine
//!
//! ```text
//! NotStarted ──start──▶ Started ──┬──▶ TerminationReached
//!                          ▲      ├──▶ Stopped ──resume──▶ Resumed ──▶ Started
//!                          │      └──▶ Failed
//!                          └────────── start (from any state)
//! ```

use super::chromosome::Chromosome;
use super::config::GaConfig;
use super::crossover::CrossoverOperator;
use super::error::{GaError, Result};
use super::events::{GaObserver, GenerationReport, Notification, ObserverId, Observers};
use super::fitness::{Fitness, FitnessEvaluator};
use super::mutation::MutationOperator;
use super::population::Population;
use super::reinsertion::{Reinsertion, ReinsertionOperator};
use super::selection::SelectionOperator;
use super::termination::{EvolutionStatus, TerminationCriterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument};

/// Lifecycle state of a [`GeneticAlgorithm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GaState {
    /// Never started.
    #[default]
    NotStarted,
    /// Evolving.
    Started,
    /// Stopped on request; can be resumed.
    Stopped,
    /// Resuming a stopped run.
    Resumed,
    /// The termination criterion was reached.
    TerminationReached,
    /// A generation could not be produced, typically because the fitness
    /// function failed. Only [`start`](GeneticAlgorithm::start) is
    /// accepted afterwards.
    Failed,
}

/// Requests a cooperative stop from any thread.
///
/// The flag is sampled between generations, so the run ends with a fully
/// evaluated population.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    /// Asks the run to stop after the generation in progress.
    pub fn stop(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether a stop has been requested and not yet honoured.
    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Executes the GA evolutionary loop.
///
/// # Usage
///
/// ```
/// use u_genetic::ga::{
///     Chromosome, Crossover, GaConfig, GaState, GeneticAlgorithm, Mutation, Selection,
///     Termination,
/// };
/// use rand::{Rng, RngCore};
///
/// #[derive(Clone, Debug)]
/// struct Bits {
///     genes: Vec<bool>,
///     fitness: Option<f64>,
/// }
///
/// impl Chromosome for Bits {
///     type Gene = bool;
///     fn genes(&self) -> &[bool] { &self.genes }
///     fn genes_mut(&mut self) -> &mut [bool] { &mut self.genes }
///     fn generate_gene(&self, _: usize, rng: &mut dyn RngCore) -> bool { rng.random() }
///     fn create_new(&self, rng: &mut dyn RngCore) -> Self {
///         Bits { genes: (0..self.genes.len()).map(|_| rng.random()).collect(), fitness: None }
///     }
///     fn fitness(&self) -> Option<f64> { self.fitness }
///     fn set_fitness(&mut self, fitness: Option<f64>) { self.fitness = fitness }
/// }
///
/// let config = GaConfig::default()
///     .with_population_size(30, 40)
///     .with_termination(Termination::GenerationNumber(50))
///     .with_seed(42);
/// let prototype = Bits { genes: vec![false; 16], fitness: None };
/// let onemax = |c: &Bits| -> anyhow::Result<f64> {
///     Ok(c.genes.iter().filter(|&&b| b).count() as f64)
/// };
///
/// let mut ga = GeneticAlgorithm::new(
///     config,
///     prototype,
///     onemax,
///     Selection::Tournament(3),
///     Crossover::Uniform { mix_probability: 0.5 },
///     Mutation::Uniform,
/// )
/// .unwrap();
/// ga.start().unwrap();
///
/// assert_eq!(ga.state(), GaState::TerminationReached);
/// assert_eq!(ga.generations_number(), 50);
/// println!("best: {:?}", ga.best_chromosome().unwrap().fitness());
/// ```
pub struct GeneticAlgorithm<C: Chromosome> {
    population: Population<C>,
    evaluator: FitnessEvaluator<C>,
    selection: Box<dyn SelectionOperator<C>>,
    crossover: Box<dyn CrossoverOperator<C>>,
    mutation: Box<dyn MutationOperator<C>>,
    reinsertion: Box<dyn ReinsertionOperator<C>>,
    termination: Box<dyn TerminationCriterion>,
    crossover_probability: f64,
    mutation_probability: f64,
    parallel: bool,
    rng: StdRng,
    state: GaState,
    time_evolving: Duration,
    stagnant_generations: usize,
    stop: StopHandle,
    observers: Observers<C>,
}

impl<C: Chromosome> GeneticAlgorithm<C> {
    /// Creates a run from a configuration, a prototype chromosome, the
    /// fitness function and the three mandatory operators.
    ///
    /// Reinsertion defaults to [`Reinsertion::Elitist`]; termination and
    /// history retention come from `config`.
    ///
    /// # Errors
    ///
    /// [`GaError::InvalidConfig`] if `config` does not validate.
    pub fn new(
        config: GaConfig,
        prototype: C,
        fitness: impl Fitness<C> + 'static,
        selection: impl SelectionOperator<C> + 'static,
        crossover: impl CrossoverOperator<C> + 'static,
        mutation: impl MutationOperator<C> + 'static,
    ) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(Self {
            population: Population::new(config.min_size, config.max_size, prototype)
                .with_generation_strategy(config.generation_strategy),
            evaluator: FitnessEvaluator::new(fitness),
            selection: Box::new(selection),
            crossover: Box::new(crossover),
            mutation: Box::new(mutation),
            reinsertion: Box::new(Reinsertion::default()),
            termination: Box::new(config.termination),
            crossover_probability: config.crossover_probability,
            mutation_probability: config.mutation_probability,
            parallel: config.parallel,
            rng,
            state: GaState::NotStarted,
            time_evolving: Duration::ZERO,
            stagnant_generations: 0,
            stop: StopHandle::default(),
            observers: Observers::default(),
        })
    }

    // ---- lifecycle ----

    /// Starts a fresh run, discarding any previous population.
    ///
    /// Returns when the termination criterion is reached, a stop is
    /// requested, or a generation fails. A stop is not an error.
    #[instrument(skip_all, fields(min_size = self.population.min_size()))]
    pub fn start(&mut self) -> Result<()> {
        info!(
            selection = self.selection.name(),
            crossover = self.crossover.name(),
            mutation = self.mutation.name(),
            reinsertion = self.reinsertion.name(),
            termination = self.termination.name(),
            "starting genetic algorithm"
        );
        self.stop.reset();
        self.state = GaState::Started;
        self.time_evolving = Duration::ZERO;
        self.stagnant_generations = 0;
        self.run(true)
    }

    /// Continues a stopped run with its preserved population.
    ///
    /// # Errors
    ///
    /// [`GaError::InvalidState`] if the run is not [`GaState::Stopped`], or
    /// if the termination criterion is already reached (set a new one
    /// with [`set_termination`](Self::set_termination) first).
    #[instrument(skip_all, fields(generation = self.population.generations_number()))]
    pub fn resume(&mut self) -> Result<()> {
        match self.state {
            GaState::Stopped => {}
            GaState::NotStarted => {
                return Err(GaError::InvalidState(
                    "attempt to resume a genetic algorithm which was not yet started".into(),
                ))
            }
            state => {
                return Err(GaError::InvalidState(format!(
                    "only a stopped genetic algorithm can be resumed, current state is {state:?}"
                )))
            }
        }
        if self.termination.has_reached(&self.status()) {
            return Err(GaError::InvalidState(format!(
                "the {} termination has already been reached, change it before resuming",
                self.termination.name()
            )));
        }

        info!("resuming genetic algorithm");
        self.stop.reset();
        self.state = GaState::Resumed;
        self.run(false)
    }

    /// Requests a stop; same as `self.stop_handle().stop()`.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// A handle that can stop the run from another thread or an observer.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    fn run(&mut self, fresh: bool) -> Result<()> {
        let clock = Instant::now();
        let base = self.time_evolving;
        let outcome = self.evolve(fresh, clock, base);
        self.time_evolving = base + clock.elapsed();

        if let Err(err) = &outcome {
            self.state = GaState::Failed;
            error!(
                generation = self.population.generations_number(),
                error = %err,
                "genetic algorithm failed"
            );
        }
        outcome
    }

    fn evolve(&mut self, fresh: bool, clock: Instant, base: Duration) -> Result<()> {
        if fresh {
            self.population.create_initial_generation(&mut self.rng)?;
            if self.end_generation(clock, base)? {
                return Ok(());
            }
        }

        loop {
            if self.stop.is_stop_requested() {
                self.state = GaState::Stopped;
                info!(
                    generation = self.population.generations_number(),
                    "genetic algorithm stopped"
                );
                return Ok(());
            }
            self.state = GaState::Started;

            self.next_generation()?;
            if self.end_generation(clock, base)? {
                return Ok(());
            }
        }
    }

    /// Breeds the chromosomes of the next generation and installs them.
    fn next_generation(&mut self) -> Result<()> {
        let parents = self.selection.select_parents(
            self.population.min_size(),
            self.population.current_generation(),
            &mut self.rng,
        )?;

        let mut offspring = self.cross(&parents)?;
        for child in &mut offspring {
            self.mutation
                .mutate(child, self.mutation_probability, &mut self.rng)?;
        }
        self.evaluator.evaluate_all(&mut offspring, self.parallel)?;

        let current = self.population.current_generation().chromosomes().to_vec();
        let next = self.reinsertion.select_chromosomes(
            &self.population,
            offspring,
            current,
            &mut self.rng,
        )?;
        self.population.create_new_generation(next)
    }

    /// Crosses consecutive groups of `parents_number` parents; a trailing
    /// incomplete group is skipped.
    fn cross(&mut self, parents: &[C]) -> Result<Vec<C>> {
        let group = self.crossover.parents_number();
        if group == 0 {
            return Err(GaError::Crossover {
                crossover: self.crossover.name(),
                message: "declares zero parents".into(),
            });
        }

        let mut offspring = Vec::with_capacity(parents.len());
        for chunk in parents.chunks_exact(group) {
            if self.rng.random::<f64>() < self.crossover_probability {
                offspring.extend(self.crossover.cross(chunk, &mut self.rng)?);
            }
        }
        Ok(offspring)
    }

    /// Ends the active generation, notifies observers and checks the
    /// termination. Returns whether the run is over.
    fn end_generation(&mut self, clock: Instant, base: Duration) -> Result<bool> {
        let previous_best = self.population.best_chromosome().and_then(|c| c.fitness());
        let changed = self
            .population
            .end_current_generation(&self.evaluator, self.parallel)?;
        self.time_evolving = base + clock.elapsed();

        let generation = self.population.generations_number();
        let best = self
            .population
            .best_chromosome()
            .ok_or_else(|| GaError::InvalidState("ended generation has no best chromosome".into()))?;
        let best_fitness = best.fitness();

        self.stagnant_generations = match previous_best {
            Some(previous) if Some(previous) == best_fitness => self.stagnant_generations + 1,
            _ => 1,
        };

        debug!(generation, ?best_fitness, best_changed = changed, "generation ran");

        let report = GenerationReport {
            generation,
            best_chromosome: best,
            time_evolving: self.time_evolving,
        };
        self.observers.notify(Notification::GenerationRan, &report);

        let status = EvolutionStatus {
            generations_number: generation,
            best_fitness,
            time_evolving: self.time_evolving,
            stagnant_generations: self.stagnant_generations,
        };
        if !self.termination.has_reached(&status) {
            return Ok(false);
        }

        self.state = GaState::TerminationReached;
        info!(
            generation,
            ?best_fitness,
            elapsed_ms = self.time_evolving.as_millis() as u64,
            termination = self.termination.name(),
            "termination reached"
        );
        self.observers
            .notify(Notification::TerminationReached, &report);
        Ok(true)
    }

    // ---- observers ----

    /// Subscribes an observer to generation and termination notifications.
    pub fn add_observer(&mut self, observer: impl GaObserver<C> + 'static) -> ObserverId {
        self.observers.add(Box::new(observer))
    }

    /// Unsubscribes an observer. Returns whether it was registered.
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    // ---- operators and parameters ----

    pub fn set_selection(&mut self, selection: impl SelectionOperator<C> + 'static) {
        self.selection = Box::new(selection);
    }

    pub fn set_crossover(&mut self, crossover: impl CrossoverOperator<C> + 'static) {
        self.crossover = Box::new(crossover);
    }

    pub fn set_mutation(&mut self, mutation: impl MutationOperator<C> + 'static) {
        self.mutation = Box::new(mutation);
    }

    pub fn set_reinsertion(&mut self, reinsertion: impl ReinsertionOperator<C> + 'static) {
        self.reinsertion = Box::new(reinsertion);
    }

    /// Replaces the termination criterion, e.g. to extend a stopped run.
    pub fn set_termination(&mut self, termination: impl TerminationCriterion + 'static) {
        self.termination = Box::new(termination);
    }

    /// Replaces the termination criterion with an already boxed one, such
    /// as those built by an [`OperatorRegistry`](super::OperatorRegistry).
    pub fn set_boxed_termination(&mut self, termination: Box<dyn TerminationCriterion>) {
        self.termination = termination;
    }

    /// Sets the crossover probability. Fails outside `[0, 1]`.
    pub fn set_crossover_probability(&mut self, probability: f64) -> Result<()> {
        self.crossover_probability = checked_probability("crossover_probability", probability)?;
        Ok(())
    }

    /// Sets the mutation probability. Fails outside `[0, 1]`.
    pub fn set_mutation_probability(&mut self, probability: f64) -> Result<()> {
        self.mutation_probability = checked_probability("mutation_probability", probability)?;
        Ok(())
    }

    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    // ---- accessors ----

    pub fn state(&self) -> GaState {
        self.state
    }

    pub fn population(&self) -> &Population<C> {
        &self.population
    }

    /// Best chromosome of the last ended generation.
    pub fn best_chromosome(&self) -> Option<&C> {
        self.population.best_chromosome()
    }

    pub fn generations_number(&self) -> usize {
        self.population.generations_number()
    }

    /// Time spent evolving, excluding the time spent stopped.
    pub fn time_evolving(&self) -> Duration {
        self.time_evolving
    }

    /// Number of fitness function invocations so far.
    pub fn fitness_evaluations(&self) -> usize {
        self.evaluator.evaluations()
    }

    pub fn crossover_probability(&self) -> f64 {
        self.crossover_probability
    }

    pub fn mutation_probability(&self) -> f64 {
        self.mutation_probability
    }

    /// Status as seen by the termination criterion.
    pub fn status(&self) -> EvolutionStatus {
        EvolutionStatus {
            generations_number: self.population.generations_number(),
            best_fitness: self.population.best_chromosome().and_then(|c| c.fitness()),
            time_evolving: self.time_evolving,
            stagnant_generations: self.stagnant_generations,
        }
    }
}

fn checked_probability(name: &'static str, probability: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&probability) {
        Ok(probability)
    } else {
        Err(GaError::invalid_argument(
            name,
            format!("must be within [0, 1], got {probability}"),
        ))
    }
}

impl<C: Chromosome> std::fmt::Debug for GeneticAlgorithm<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneticAlgorithm")
            .field("state", &self.state)
            .field("generations_number", &self.population.generations_number())
            .field("selection", &self.selection.name())
            .field("crossover", &self.crossover.name())
            .field("mutation", &self.mutation.name())
            .field("reinsertion", &self.reinsertion.name())
            .field("termination", &self.termination.name())
            .field("crossover_probability", &self.crossover_probability)
            .field("mutation_probability", &self.mutation_probability)
            .field("time_evolving", &self.time_evolving)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::test_support::{onemax, BitString, Permutation};
    use crate::ga::{Crossover, GenerationStrategy, Mutation, Selection, Termination};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    fn config(generations: usize) -> GaConfig {
        GaConfig::default()
            .with_population_size(20, 30)
            .with_generations(generations)
            .with_parallel(false)
            .with_seed(42)
    }

    fn onemax_ga(config: GaConfig, bits: usize) -> GeneticAlgorithm<BitString> {
        GeneticAlgorithm::new(
            config,
            BitString::from_bits(&vec![false; bits]),
            onemax,
            Selection::Tournament(3),
            Crossover::Uniform { mix_probability: 0.5 },
            Mutation::Uniform,
        )
        .unwrap()
    }

    /// Records generation numbers and stops the run at `stop_at`.
    struct Recorder {
        generations: Arc<Mutex<Vec<usize>>>,
        terminations: Arc<AtomicUsize>,
        stop: Option<(StopHandle, usize)>,
    }

    impl Recorder {
        fn new() -> (Self, Arc<Mutex<Vec<usize>>>, Arc<AtomicUsize>) {
            let generations = Arc::new(Mutex::new(Vec::new()));
            let terminations = Arc::new(AtomicUsize::new(0));
            let recorder = Recorder {
                generations: generations.clone(),
                terminations: terminations.clone(),
                stop: None,
            };
            (recorder, generations, terminations)
        }
    }

    impl GaObserver<BitString> for Recorder {
        fn on_generation_ran(&mut self, report: &GenerationReport<'_, BitString>) -> anyhow::Result<()> {
            self.generations.lock().unwrap().push(report.generation);
            if let Some((handle, at)) = &self.stop {
                if report.generation == *at {
                    handle.stop();
                }
            }
            Ok(())
        }

        fn on_termination_reached(&mut self, _: &GenerationReport<'_, BitString>) -> anyhow::Result<()> {
            self.terminations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_runs_exact_generation_count() {
        let mut ga = onemax_ga(config(50), 16);
        let (recorder, generations, terminations) = Recorder::new();
        ga.add_observer(recorder);

        ga.start().unwrap();

        assert_eq!(ga.state(), GaState::TerminationReached);
        assert_eq!(ga.generations_number(), 50);
        assert_eq!(*generations.lock().unwrap(), (1..=50).collect::<Vec<_>>());
        assert_eq!(terminations.load(Ordering::SeqCst), 1);
        assert!(ga.best_chromosome().unwrap().fitness().is_some());
    }

    #[test]
    fn test_default_termination_runs_one_generation() {
        let config = GaConfig::default().with_parallel(false).with_seed(1);
        let mut ga = onemax_ga(config, 8);
        ga.start().unwrap();
        assert_eq!(ga.generations_number(), 1);
        assert_eq!(ga.state(), GaState::TerminationReached);
    }

    /// Forwards to an inner strategy and records offspring counts.
    struct CountingReinsertion {
        inner: Reinsertion,
        offspring: Arc<Mutex<Vec<usize>>>,
    }

    impl ReinsertionOperator<BitString> for CountingReinsertion {
        fn name(&self) -> &'static str {
            "Counting"
        }

        fn can_expand(&self) -> bool {
            ReinsertionOperator::<BitString>::can_expand(&self.inner)
        }

        fn can_collapse(&self) -> bool {
            ReinsertionOperator::<BitString>::can_collapse(&self.inner)
        }

        fn perform_select_chromosomes(
            &self,
            population: &Population<BitString>,
            offspring: Vec<BitString>,
            parents: Vec<BitString>,
            rng: &mut dyn rand::RngCore,
        ) -> Result<Vec<BitString>> {
            self.offspring.lock().unwrap().push(offspring.len());
            self.inner
                .perform_select_chromosomes(population, offspring, parents, rng)
        }
    }

    #[test]
    fn test_zero_crossover_probability_produces_no_offspring() {
        let config = config(10).with_crossover_probability(0.0);
        let mut ga = onemax_ga(config, 16);
        let offspring = Arc::new(Mutex::new(Vec::new()));
        ga.set_reinsertion(CountingReinsertion {
            inner: Reinsertion::Elitist,
            offspring: offspring.clone(),
        });

        ga.start().unwrap();

        let counts = offspring.lock().unwrap();
        assert_eq!(counts.len(), 9);
        assert!(counts.iter().all(|&n| n == 0));
        assert_eq!(ga.population().current_generation().len(), 20);
    }

    #[test]
    fn test_trailing_group_is_not_crossed() {
        // 21 parents in pairs: 10 crossings of 2 children each
        let config = GaConfig::default()
            .with_population_size(21, 30)
            .with_generations(3)
            .with_crossover_probability(1.0)
            .with_parallel(false)
            .with_seed(5);
        let mut ga = onemax_ga(config, 8);
        let offspring = Arc::new(Mutex::new(Vec::new()));
        ga.set_reinsertion(CountingReinsertion {
            inner: Reinsertion::Elitist,
            offspring: offspring.clone(),
        });

        ga.start().unwrap();

        assert_eq!(*offspring.lock().unwrap(), vec![20, 20]);
    }

    #[test]
    fn test_stop_and_resume_continue_numbering() {
        let mut ga = onemax_ga(config(20), 16);
        let (mut recorder, generations, terminations) = Recorder::new();
        recorder.stop = Some((ga.stop_handle(), 10));
        ga.add_observer(recorder);

        ga.start().unwrap();
        assert_eq!(ga.state(), GaState::Stopped);
        assert_eq!(ga.generations_number(), 10);
        assert_eq!(terminations.load(Ordering::SeqCst), 0);
        assert!(ga
            .population()
            .current_generation()
            .first_unevaluated()
            .is_none());
        let elapsed = ga.time_evolving();

        ga.resume().unwrap();
        assert_eq!(ga.state(), GaState::TerminationReached);
        assert_eq!(ga.generations_number(), 20);
        assert_eq!(*generations.lock().unwrap(), (1..=20).collect::<Vec<_>>());
        assert_eq!(terminations.load(Ordering::SeqCst), 1);
        assert!(ga.time_evolving() >= elapsed);
    }

    #[test]
    fn test_resume_requires_stopped_run() {
        let mut ga = onemax_ga(config(5), 8);
        assert!(matches!(ga.resume(), Err(GaError::InvalidState(_))));

        ga.start().unwrap();
        assert_eq!(ga.state(), GaState::TerminationReached);
        assert!(matches!(ga.resume(), Err(GaError::InvalidState(_))));
    }

    #[test]
    fn test_resume_with_reached_termination_needs_new_criterion() {
        let mut ga = onemax_ga(config(100), 8);
        let (mut recorder, _, _) = Recorder::new();
        recorder.stop = Some((ga.stop_handle(), 5));
        ga.add_observer(recorder);
        ga.start().unwrap();
        assert_eq!(ga.state(), GaState::Stopped);

        ga.set_termination(Termination::GenerationNumber(3));
        let err = ga.resume().unwrap_err();
        assert!(err.to_string().contains("termination"), "{err}");
        assert_eq!(ga.state(), GaState::Stopped);

        ga.set_termination(Termination::GenerationNumber(8));
        ga.resume().unwrap();
        assert_eq!(ga.generations_number(), 8);
    }

    #[test]
    fn test_stop_before_start_is_cleared() {
        let mut ga = onemax_ga(config(4), 8);
        ga.stop();
        ga.start().unwrap();
        assert_eq!(ga.state(), GaState::TerminationReached);
        assert_eq!(ga.generations_number(), 4);
    }

    #[test]
    fn test_evaluation_failure_marks_failed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let fitness = move |c: &BitString| -> anyhow::Result<f64> {
            if counter.fetch_add(1, Ordering::SeqCst) >= 50 {
                anyhow::bail!("simulator crashed");
            }
            Ok(c.ones() as f64)
        };
        let mut ga = GeneticAlgorithm::new(
            config(100),
            BitString::from_bits(&[false; 8]),
            fitness,
            Selection::Tournament(2),
            Crossover::OnePoint { swap_point: None },
            Mutation::Uniform,
        )
        .unwrap();

        let err = ga.start().unwrap_err();
        assert!(matches!(err, GaError::Evaluation(_)));
        assert_eq!(ga.state(), GaState::Failed);
        assert!(matches!(ga.resume(), Err(GaError::InvalidState(_))));
    }

    #[test]
    fn test_nan_fitness_fails_the_run() {
        for seed in 0..10 {
            let mut ga = GeneticAlgorithm::new(
                GaConfig::default()
                    .with_population_size(60, 80)
                    .with_generations(50)
                    .with_parallel(false)
                    .with_seed(seed),
                BitString::from_bits(&[false; 16]),
                |c: &BitString| -> anyhow::Result<f64> {
                    Ok(if c.ones() % 3 == 0 { f64::NAN } else { c.ones() as f64 })
                },
                Selection::Tournament(2),
                Crossover::Uniform { mix_probability: 0.5 },
                Mutation::Uniform,
            )
            .unwrap();

            let err = ga.start().unwrap_err();
            assert!(matches!(err, GaError::Evaluation(_)), "seed {seed}");
            assert_eq!(ga.state(), GaState::Failed);
        }
    }

    struct Panicking;

    impl GaObserver<BitString> for Panicking {
        fn on_generation_ran(&mut self, _: &GenerationReport<'_, BitString>) -> anyhow::Result<()> {
            panic!("observer bug")
        }

        fn on_termination_reached(&mut self, _: &GenerationReport<'_, BitString>) -> anyhow::Result<()> {
            anyhow::bail!("cannot save result")
        }
    }

    #[test]
    fn test_observer_failures_do_not_affect_run() {
        let mut ga = onemax_ga(config(5), 8);
        ga.add_observer(Panicking);
        let (recorder, generations, terminations) = Recorder::new();
        ga.add_observer(recorder);

        ga.start().unwrap();

        assert_eq!(ga.state(), GaState::TerminationReached);
        assert_eq!(generations.lock().unwrap().len(), 5);
        assert_eq!(terminations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_removed_observer_is_not_notified() {
        let mut ga = onemax_ga(config(3), 8);
        let (recorder, generations, _) = Recorder::new();
        let id = ga.add_observer(recorder);
        assert!(ga.remove_observer(id));
        ga.start().unwrap();
        assert!(generations.lock().unwrap().is_empty());
    }

    #[test]
    fn test_channel_observer_receives_events() {
        let (tx, rx) = std::sync::mpsc::channel::<crate::ga::GaEvent<BitString>>();
        let mut ga = onemax_ga(config(3), 8);
        ga.add_observer(tx);
        ga.start().unwrap();
        drop(ga);

        let events: Vec<_> = rx.iter().collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(
            events.last(),
            Some(crate::ga::GaEvent::TerminationReached { generation: 3, .. })
        ));
    }

    #[test]
    fn test_onemax_convergence() {
        let config = GaConfig::default()
            .with_population_size(50, 60)
            .with_generations(100)
            .with_mutation_probability(0.03)
            .with_parallel(false)
            .with_seed(42);
        let mut ga = onemax_ga(config, 30);
        ga.start().unwrap();

        let best = ga.best_chromosome().unwrap().fitness().unwrap();
        assert!(best >= 26.0, "expected fitness >= 26 for 30-bit OneMax, got {best}");
    }

    #[test]
    fn test_elitist_best_never_regresses() {
        let config = config(40)
            .with_crossover_probability(0.3)
            .with_generation_strategy(GenerationStrategy::Tracking);
        let mut ga = onemax_ga(config, 20);
        ga.start().unwrap();

        let history: Vec<f64> = ga
            .population()
            .generations()
            .iter()
            .filter_map(|g| g.best_chromosome().and_then(|c| c.fitness()))
            .collect();
        assert_eq!(history.len(), 40);
        for window in history.windows(2) {
            assert!(
                window[1] >= window[0],
                "best fitness regressed: {} -> {}",
                window[0],
                window[1]
            );
        }
    }

    #[test]
    fn test_stagnation_ends_frozen_population() {
        let config = config(1000)
            .with_termination(Termination::FitnessStagnation(5))
            .with_crossover_probability(0.0)
            .with_mutation_probability(0.0);
        let mut ga = onemax_ga(config, 8);
        ga.start().unwrap();
        assert_eq!(ga.generations_number(), 5);
        assert_eq!(ga.status().stagnant_generations, 5);
    }

    #[test]
    fn test_same_seed_same_result() {
        let run = || {
            let mut ga = onemax_ga(config(15), 24);
            ga.start().unwrap();
            ga.best_chromosome().unwrap().clone()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_permutation_pipeline_stays_valid() {
        let fixed_points = |p: &Permutation| -> anyhow::Result<f64> {
            Ok(p.order.iter().enumerate().filter(|(i, v)| *i == **v).count() as f64)
        };
        let mut ga = GeneticAlgorithm::new(
            config(30).with_mutation_probability(0.3),
            Permutation::identity(12),
            fixed_points,
            Selection::Tournament(2),
            Crossover::Ordered,
            Mutation::Twors,
        )
        .unwrap();
        ga.start().unwrap();

        for generation in ga.population().generations() {
            assert!(generation.chromosomes().iter().all(Permutation::is_valid));
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = GeneticAlgorithm::new(
            GaConfig::default().with_population_size(1, 1),
            BitString::from_bits(&[false; 4]),
            onemax,
            Selection::Elite,
            Crossover::default(),
            Mutation::default(),
        );
        assert!(matches!(result, Err(GaError::InvalidConfig(_))));
    }

    #[test]
    fn test_probability_setters_validate() {
        let mut ga = onemax_ga(config(1), 4);
        assert!(ga.set_mutation_probability(1.5).is_err());
        assert!(ga.set_crossover_probability(f64::NAN).is_err());
        ga.set_crossover_probability(0.2).unwrap();
        assert!((ga.crossover_probability() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_fitness_is_cached_across_generations() {
        let mut ga = onemax_ga(config(10).with_crossover_probability(0.0).with_mutation_probability(0.0), 8);
        ga.start().unwrap();
        // only the initial generation is ever evaluated
        assert_eq!(ga.fitness_evaluations(), 20);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_evaluation() {
        let mut ga = onemax_ga(config(20).with_parallel(true), 32);
        ga.start().unwrap();
        assert_eq!(ga.generations_number(), 20);
        assert!(ga
            .population()
            .current_generation()
            .first_unevaluated()
            .is_none());
    }

    #[test]
    fn test_runs_on_another_thread() {
        fn assert_send<T: Send>() {}
        assert_send::<GeneticAlgorithm<BitString>>();

        let mut ga = onemax_ga(config(1_000_000), 8);
        let stop = ga.stop_handle();
        let worker = std::thread::spawn(move || {
            ga.start().unwrap();
            ga
        });
        // `start` clears earlier requests, so keep asking until it returns
        while !worker.is_finished() {
            std::thread::sleep(Duration::from_millis(5));
            stop.stop();
        }
        let ga = worker.join().unwrap();
        assert_eq!(ga.state(), GaState::Stopped);
        assert!(ga.generations_number() < 1_000_000);
    }
}
