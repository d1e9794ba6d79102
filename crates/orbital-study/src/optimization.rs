//! Optimizer interface and result records.

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::black_box::BlackBox;

/// A black-box optimization algorithm.
pub trait Optimizer: Send + Sync {
    /// Name of the algorithm, for summaries.
    fn name(&self) -> &str;

    /// Minimize `black_box` starting from `initial_guess`.
    ///
    /// Population-based algorithms may use every row of
    /// `initial_guess_array` instead. All randomness must come from `rng`.
    fn optimize(
        &self,
        black_box: &dyn BlackBox,
        initial_guess: &[f64],
        initial_guess_array: &[Vec<f64>],
        rng: &mut StdRng,
    ) -> OptimizationResult;
}

/// The outcome of one optimization run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Best value found.
    pub optimal_value: f64,
    /// Parameters of the best value.
    pub optimal_parameters: Vec<f64>,
    /// Number of objective queries.
    pub num_evaluations: Option<usize>,
    /// Total cost spent on noisy queries.
    pub cost_spent: Option<f64>,
    /// Value of each query, in order.
    pub function_values: Option<Vec<f64>>,
    /// Seconds between consecutive queries.
    pub wait_times: Option<Vec<f64>>,
    /// Seed of the RNG handed to the optimizer.
    pub seed: Option<u64>,
    /// Wall-clock seconds spent in the optimizer.
    pub time: Option<f64>,
}

impl OptimizationResult {
    /// A result with only the optimum filled in.
    pub fn new(optimal_value: f64, optimal_parameters: Vec<f64>) -> Self {
        Self {
            optimal_value,
            optimal_parameters,
            ..Self::default()
        }
    }
}

/// How to run an optimization.
#[derive(Clone)]
pub struct OptimizationParams {
    /// The algorithm.
    pub algorithm: Arc<dyn Optimizer>,
    /// Starting point; the black box default when `None`.
    pub initial_guess: Option<Vec<f64>>,
    /// Starting population; a single row of the black box default when `None`.
    pub initial_guess_array: Option<Vec<Vec<f64>>>,
    /// When set, the optimizer only sees noisy evaluations at this cost.
    pub cost_of_evaluate: Option<f64>,
}

impl OptimizationParams {
    /// Run `algorithm` from the default starting point with exact evaluations.
    pub fn new(algorithm: Arc<dyn Optimizer>) -> Self {
        Self {
            algorithm,
            initial_guess: None,
            initial_guess_array: None,
            cost_of_evaluate: None,
        }
    }

    /// Set the starting point.
    #[must_use]
    pub fn with_initial_guess(mut self, guess: Vec<f64>) -> Self {
        self.initial_guess = Some(guess);
        self
    }

    /// Set the starting population.
    #[must_use]
    pub fn with_initial_guess_array(mut self, guesses: Vec<Vec<f64>>) -> Self {
        self.initial_guess_array = Some(guesses);
        self
    }

    /// Evaluate at the given cost.
    #[must_use]
    pub fn with_cost_of_evaluate(mut self, cost: f64) -> Self {
        self.cost_of_evaluate = Some(cost);
        self
    }
}

impl fmt::Debug for OptimizationParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimizationParams")
            .field("algorithm", &self.algorithm.name())
            .field("initial_guess", &self.initial_guess)
            .field("initial_guess_array", &self.initial_guess_array)
            .field("cost_of_evaluate", &self.cost_of_evaluate)
            .finish()
    }
}

/// All repetitions run with one set of [`OptimizationParams`].
#[derive(Debug, Clone)]
pub struct OptimizationTrialResult {
    /// One result per repetition.
    pub results: Vec<OptimizationResult>,
    /// The parameters shared by every repetition.
    pub params: OptimizationParams,
}

impl OptimizationTrialResult {
    /// Bundle results with their parameters.
    pub fn new(results: Vec<OptimizationResult>, params: OptimizationParams) -> Self {
        Self { results, params }
    }

    /// Append further repetitions.
    pub fn extend(&mut self, results: impl IntoIterator<Item = OptimizationResult>) {
        self.results.extend(results);
    }

    /// Number of repetitions.
    pub fn repetitions(&self) -> usize {
        self.results.len()
    }

    /// The best repetition.
    pub fn best(&self) -> Option<&OptimizationResult> {
        self.results
            .iter()
            .min_by(|a, b| a.optimal_value.total_cmp(&b.optimal_value))
    }

    /// Lowest value over all repetitions, `+∞` if there are none.
    pub fn optimal_value(&self) -> f64 {
        self.best().map_or(f64::INFINITY, |r| r.optimal_value)
    }

    /// Parameters of [`optimal_value`](Self::optimal_value).
    pub fn optimal_parameters(&self) -> Option<&[f64]> {
        self.best().map(|r| r.optimal_parameters.as_slice())
    }

    /// First, second and third quartiles of a per-repetition quantity.
    ///
    /// Repetitions where `field` is `None` are skipped.
    pub fn quartiles(&self, field: impl Fn(&OptimizationResult) -> Option<f64>) -> Option<[f64; 3]> {
        let mut values: Vec<f64> = self.results.iter().filter_map(field).collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        Some([0.25, 0.5, 0.75].map(|q| quantile(&values, q)))
    }
}

/// Linearly interpolated quantile of sorted, non-empty `values`.
fn quantile(values: &[f64], q: f64) -> f64 {
    let position = q * (values.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    values[lower] + (values[upper] - values[lower]) * fraction
}
