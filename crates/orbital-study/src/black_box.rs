//! Objective functions as seen by an optimizer.

use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// A real-valued objective over `dimension()` parameters.
///
/// `evaluate` is the exact value. `evaluate_with_cost` returns an estimate
/// whose accuracy improves with `cost`, such as a sampled expectation value
/// with `cost` shots; by default it is exact.
pub trait BlackBox: Send + Sync {
    /// Number of parameters.
    fn dimension(&self) -> usize;

    /// Exact value at `x`.
    fn evaluate(&self, x: &[f64]) -> f64;

    /// Estimated value at `x`, spending `cost`.
    fn evaluate_with_cost(&self, x: &[f64], _cost: f64) -> f64 {
        self.evaluate(x)
    }

    /// Optional box constraints, one `(low, high)` per parameter.
    fn bounds(&self) -> Option<Vec<(f64, f64)>> {
        None
    }

    /// Starting point used when a run gives no initial guess.
    fn default_initial_params(&self) -> Vec<f64> {
        vec![0.0; self.dimension()]
    }
}

/// What a [`StatefulBlackBox`] has recorded.
#[derive(Debug, Clone, Default)]
pub struct BlackBoxStats {
    /// Number of queries.
    pub num_evaluations: usize,
    /// Total cost passed to `evaluate_with_cost`.
    pub cost_spent: f64,
    /// Value returned by each query.
    pub function_values: Vec<f64>,
    /// Seconds between consecutive queries.
    pub wait_times: Vec<f64>,
    /// Point of each query, if recorded.
    pub x_vals: Vec<Vec<f64>>,
}

/// Wraps a black box for an optimizer and records every query.
///
/// Queries are routed to `evaluate_with_cost` when a cost of evaluation is
/// set, otherwise to `evaluate`.
pub struct StatefulBlackBox<'a> {
    inner: &'a dyn BlackBox,
    cost_of_evaluate: Option<f64>,
    save_x_vals: bool,
    state: Mutex<State>,
}

struct State {
    stats: BlackBoxStats,
    last_query: Option<Instant>,
}

impl<'a> StatefulBlackBox<'a> {
    /// Wrap `inner`.
    pub fn new(inner: &'a dyn BlackBox, cost_of_evaluate: Option<f64>, save_x_vals: bool) -> Self {
        Self {
            inner,
            cost_of_evaluate,
            save_x_vals,
            state: Mutex::new(State {
                stats: BlackBoxStats::default(),
                last_query: None,
            }),
        }
    }

    /// Snapshot of the recorded statistics.
    pub fn stats(&self) -> BlackBoxStats {
        self.lock().stats.clone()
    }

    /// Exact value at `x`, not recorded.
    pub fn evaluate_noiseless(&self, x: &[f64]) -> f64 {
        self.inner.evaluate(x)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, x: &[f64], value: f64, cost: f64) {
        let now = Instant::now();
        let mut state = self.lock();
        if let Some(last) = state.last_query {
            state.stats.wait_times.push(now.duration_since(last).as_secs_f64());
        }
        state.last_query = Some(now);
        state.stats.num_evaluations += 1;
        state.stats.cost_spent += cost;
        state.stats.function_values.push(value);
        if self.save_x_vals {
            state.stats.x_vals.push(x.to_vec());
        }
    }
}

impl BlackBox for StatefulBlackBox<'_> {
    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn evaluate(&self, x: &[f64]) -> f64 {
        match self.cost_of_evaluate {
            Some(cost) => self.evaluate_with_cost(x, cost),
            None => {
                let value = self.inner.evaluate(x);
                self.record(x, value, 0.0);
                value
            }
        }
    }

    fn evaluate_with_cost(&self, x: &[f64], cost: f64) -> f64 {
        let value = self.inner.evaluate_with_cost(x, cost);
        self.record(x, value, cost);
        value
    }

    fn bounds(&self) -> Option<Vec<(f64, f64)>> {
        self.inner.bounds()
    }

    fn default_initial_params(&self) -> Vec<f64> {
        self.inner.default_initial_params()
    }
}
