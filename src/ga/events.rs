//! Run notifications.
//!
//! Observers are told when a generation has run and when the termination
//! criterion is reached. They are called synchronously from the loop
//! thread; a failing or panicking observer is logged and skipped, and the
//! run continues.

use super::chromosome::Chromosome;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::time::Duration;
use tracing::warn;

/// Data handed to observers after a generation ends.
#[derive(Debug, Clone)]
pub struct GenerationReport<'a, C: Chromosome> {
    /// Number of the generation that just ended.
    pub generation: usize,
    /// Best chromosome of that generation.
    pub best_chromosome: &'a C,
    /// Time spent evolving so far.
    pub time_evolving: Duration,
}

/// Receives run notifications.
///
/// Both callbacks default to doing nothing. Returning an error only logs
/// it; use a [`StopHandle`](super::StopHandle) to end the run from an
/// observer.
pub trait GaObserver<C: Chromosome>: Send {
    /// Called after every ended generation, including the first.
    fn on_generation_ran(&mut self, report: &GenerationReport<'_, C>) -> anyhow::Result<()> {
        let _ = report;
        Ok(())
    }

    /// Called once when the termination criterion is reached.
    fn on_termination_reached(&mut self, report: &GenerationReport<'_, C>) -> anyhow::Result<()> {
        let _ = report;
        Ok(())
    }
}

/// Owned notification, for channel-based consumers.
#[derive(Debug, Clone)]
pub enum GaEvent<C> {
    GenerationRan {
        generation: usize,
        best_chromosome: C,
        time_evolving: Duration,
    },
    TerminationReached {
        generation: usize,
        best_chromosome: C,
        time_evolving: Duration,
    },
}

impl<C: Chromosome> GaObserver<C> for mpsc::Sender<GaEvent<C>> {
    fn on_generation_ran(&mut self, report: &GenerationReport<'_, C>) -> anyhow::Result<()> {
        self.send(GaEvent::GenerationRan {
            generation: report.generation,
            best_chromosome: report.best_chromosome.clone(),
            time_evolving: report.time_evolving,
        })
        .map_err(|_| anyhow::anyhow!("event receiver disconnected"))
    }

    fn on_termination_reached(&mut self, report: &GenerationReport<'_, C>) -> anyhow::Result<()> {
        self.send(GaEvent::TerminationReached {
            generation: report.generation,
            best_chromosome: report.best_chromosome.clone(),
            time_evolving: report.time_evolving,
        })
        .map_err(|_| anyhow::anyhow!("event receiver disconnected"))
    }
}

/// Handle returned by [`add_observer`](super::GeneticAlgorithm::add_observer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

#[derive(Clone, Copy)]
pub(crate) enum Notification {
    GenerationRan,
    TerminationReached,
}

/// Registered observers in subscription order.
pub(crate) struct Observers<C: Chromosome> {
    next_id: u64,
    entries: Vec<(ObserverId, Box<dyn GaObserver<C>>)>,
}

impl<C: Chromosome> Default for Observers<C> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<C: Chromosome> Observers<C> {
    pub(crate) fn add(&mut self, observer: Box<dyn GaObserver<C>>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Delivers `notification` to every observer, isolating failures.
    pub(crate) fn notify(&mut self, notification: Notification, report: &GenerationReport<'_, C>) {
        for (id, observer) in &mut self.entries {
            let outcome = catch_unwind(AssertUnwindSafe(|| match notification {
                Notification::GenerationRan => observer.on_generation_ran(report),
                Notification::TerminationReached => observer.on_termination_reached(report),
            }));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    warn!(observer = id.0, generation = report.generation, %error, "observer failed");
                }
                Err(_) => {
                    warn!(observer = id.0, generation = report.generation, "observer panicked");
                }
            }
        }
    }
}

impl<C: Chromosome> std::fmt::Debug for Observers<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.len())
            .finish()
    }
}
