//! Finite-state Markov chain used by the activity and sleep generators.

use rand::Rng;

/// A discrete chain over `N` states with a row-stochastic transition matrix.
///
/// `transitions[i][j]` is the probability of moving from state `i` to `j`
/// in one step. Rows are normalised on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkovChain<const N: usize> {
    transitions: [[f64; N]; N],
}

impl<const N: usize> MarkovChain<N> {
    pub fn new(mut transitions: [[f64; N]; N]) -> Self {
        for row in transitions.iter_mut() {
            let total: f64 = row.iter().sum();
            if total > 0.0 {
                row.iter_mut().for_each(|p| *p /= total);
            }
        }
        Self { transitions }
    }

    /// Probability of moving from `from` to `to` in one step.
    pub fn probability(&self, from: usize, to: usize) -> f64 {
        self.transitions[from][to]
    }

    /// Draw the next state from `current`.
    pub fn step<R: Rng + ?Sized>(&self, current: usize, rng: &mut R) -> usize {
        let u: f64 = rng.gen();
        let mut cumulative = 0.0;
        for (next, p) in self.transitions[current].iter().enumerate() {
            cumulative += p;
            if u < cumulative {
                return next;
            }
        }
        // Rounding left the row a hair short of 1.0
        current
    }
}
