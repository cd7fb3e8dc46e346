//! Monte Carlo rank estimator (Dell'Amico & Filippone, "Monte Carlo
//! Strength Evaluation", CCS'15): maps a probability threshold to an
//! estimated guess rank, and back, from a sample of drawn probabilities.

pub struct RankEstimator {
    probs: Vec<f64>,
    ranks: Vec<f64>,
}

impl RankEstimator {
    /// Build an estimator from sampled probabilities. Probabilities are
    /// sorted descending internally; `samples` need not be sorted.
    pub fn new(mut samples: Vec<f64>) -> Self {
        samples.sort_by(|a, b| b.partial_cmp(a).expect("probabilities are never NaN"));
        let n = samples.len();
        let mut ranks = Vec::with_capacity(n + 1);
        ranks.push(0.0);
        for &p in &samples {
            let prev = *ranks.last().unwrap();
            ranks.push(prev + 1.0 / (n as f64 * p));
        }
        RankEstimator {
            probs: samples,
            ranks,
        }
    }

    pub fn len(&self) -> usize {
        self.probs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// Estimated rank of everything strictly more probable than `prob`.
    pub fn position(&self, prob: f64) -> f64 {
        let pos = self
            .probs
            .partition_point(|&p| p > prob);
        self.ranks[pos]
    }

    /// Inverse of [`position`]: the probability threshold at which the
    /// estimated rank first reaches `val`.
    pub fn inv_position(&self, val: f64) -> f64 {
        let pos = self.ranks.partition_point(|&r| r < val);
        let n = self.probs.len();
        if pos == 0 {
            1.0
        } else if pos == n + 1 {
            0.0
        } else {
            self.probs[pos - 1]
        }
    }
}
