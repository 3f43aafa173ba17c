//! Shared chromosome encodings for unit tests.

use super::chromosome::Chromosome;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

pub(crate) fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

// ---- Bit string (OneMax) ----

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BitString {
    pub bits: Vec<bool>,
    pub fitness: Option<f64>,
}

impl BitString {
    pub fn from_bits(bits: &[bool]) -> Self {
        BitString {
            bits: bits.to_vec(),
            fitness: None,
        }
    }

    pub fn random(n: usize, rng: &mut dyn RngCore) -> Self {
        BitString {
            bits: (0..n).map(|_| rng.random_bool(0.5)).collect(),
            fitness: None,
        }
    }

    pub fn with_fitness(n: usize, fitness: f64) -> Self {
        BitString {
            bits: vec![false; n],
            fitness: Some(fitness),
        }
    }

    pub fn ones(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

impl Chromosome for BitString {
    type Gene = bool;

    fn genes(&self) -> &[bool] {
        &self.bits
    }

    fn genes_mut(&mut self) -> &mut [bool] {
        &mut self.bits
    }

    fn generate_gene(&self, _index: usize, rng: &mut dyn RngCore) -> bool {
        rng.random_bool(0.5)
    }

    fn create_new(&self, rng: &mut dyn RngCore) -> Self {
        BitString::random(self.bits.len(), rng)
    }

    fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: Option<f64>) {
        self.fitness = fitness;
    }
}

pub(crate) fn onemax(c: &BitString) -> anyhow::Result<f64> {
    Ok(c.ones() as f64)
}

/// A population of bit strings carrying the given fitness values.
pub(crate) fn evaluated(fitnesses: &[f64]) -> Vec<BitString> {
    fitnesses
        .iter()
        .map(|&f| BitString::with_fitness(4, f))
        .collect()
}

// ---- Permutation (ordered encodings) ----

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Permutation {
    pub order: Vec<usize>,
    pub fitness: Option<f64>,
}

impl Permutation {
    pub fn identity(n: usize) -> Self {
        Permutation {
            order: (0..n).collect(),
            fitness: None,
        }
    }

    pub fn from_order(order: &[usize]) -> Self {
        Permutation {
            order: order.to_vec(),
            fitness: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        let n = self.order.len();
        let mut seen = vec![false; n];
        self.order.iter().all(|&v| {
            if v >= n || seen[v] {
                return false;
            }
            seen[v] = true;
            true
        })
    }
}

impl Chromosome for Permutation {
    type Gene = usize;

    fn genes(&self) -> &[usize] {
        &self.order
    }

    fn genes_mut(&mut self) -> &mut [usize] {
        &mut self.order
    }

    fn generate_gene(&self, _index: usize, rng: &mut dyn RngCore) -> usize {
        rng.random_range(0..self.order.len())
    }

    fn create_new(&self, rng: &mut dyn RngCore) -> Self {
        let mut order: Vec<usize> = (0..self.order.len()).collect();
        for i in (1..order.len()).rev() {
            let j = rng.random_range(0..=i);
            order.swap(i, j);
        }
        Permutation {
            order,
            fitness: None,
        }
    }

    fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: Option<f64>) {
        self.fitness = fitness;
    }
}
