//! Variational studies: repeated optimization runs of one objective.
//!
//! A [`VariationalStudy`] owns a black box and a table of trial results keyed
//! by [`TrialId`]. Each call to [`optimize`](VariationalStudy::optimize)
//! runs an optimizer one or more times with fresh seeds and stores the
//! results under an identifier; [`extend_result`](VariationalStudy::extend_result)
//! adds repetitions to an existing trial.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::black_box::{BlackBox, StatefulBlackBox};
use crate::error::{StudyError, StudyResult};
use crate::optimization::{OptimizationParams, OptimizationResult, OptimizationTrialResult};

/// Key of a trial in a study.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrialId {
    /// Automatically assigned or integer identifier.
    Index(u64),
    /// Named identifier.
    Name(String),
}

impl fmt::Display for TrialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrialId::Index(i) => write!(f, "{i}"),
            TrialId::Name(name) => write!(f, "{name:?}"),
        }
    }
}

impl From<u64> for TrialId {
    fn from(i: u64) -> Self {
        TrialId::Index(i)
    }
}

impl From<&str> for TrialId {
    fn from(name: &str) -> Self {
        TrialId::Name(name.to_string())
    }
}

impl From<String> for TrialId {
    fn from(name: String) -> Self {
        TrialId::Name(name)
    }
}

/// How repetitions of a run are executed and what they record.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Replace each optimal value with an exact evaluation of its parameters.
    pub reevaluate_final_params: bool,
    /// Record evaluation counts, cost, values and wait times.
    pub stateful: bool,
    /// With `stateful`, also record every queried point.
    pub save_x_vals: bool,
    /// Number of repetitions.
    pub repetitions: usize,
    /// One seed per repetition; random when `None`.
    pub seeds: Option<Vec<u64>>,
    /// Run repetitions on the rayon thread pool.
    pub parallel: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            reevaluate_final_params: false,
            stateful: false,
            save_x_vals: false,
            repetitions: 1,
            seeds: None,
            parallel: false,
        }
    }
}

impl RunOptions {
    /// One sequential, stateless repetition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of repetitions.
    #[must_use]
    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.repetitions = repetitions;
        self
    }

    /// Set the seeds.
    #[must_use]
    pub fn with_seeds(mut self, seeds: Vec<u64>) -> Self {
        self.seeds = Some(seeds);
        self
    }

    /// Record statistics of each run.
    #[must_use]
    pub fn stateful(mut self, save_x_vals: bool) -> Self {
        self.stateful = true;
        self.save_x_vals = save_x_vals;
        self
    }

    /// Re-evaluate optimal parameters exactly.
    #[must_use]
    pub fn reevaluate_final_params(mut self) -> Self {
        self.reevaluate_final_params = true;
        self
    }

    /// Run repetitions in parallel.
    #[must_use]
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }
}

/// Optimization runs of one black box.
pub struct VariationalStudy {
    name: String,
    black_box: Arc<dyn BlackBox>,
    target: Option<f64>,
    trial_results: Vec<(TrialId, OptimizationTrialResult)>,
}

impl VariationalStudy {
    /// Create an empty study.
    pub fn new(name: impl Into<String>, black_box: Arc<dyn BlackBox>) -> Self {
        Self {
            name: name.into(),
            black_box,
            target: None,
            trial_results: Vec::new(),
        }
    }

    /// Set the value one hopes to reach.
    #[must_use]
    pub fn with_target(mut self, target: f64) -> Self {
        self.target = Some(target);
        self
    }

    /// Name of the study.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target value, if any.
    pub fn target(&self) -> Option<f64> {
        self.target
    }

    /// Number of parameters of the black box.
    pub fn num_params(&self) -> usize {
        self.black_box.dimension()
    }

    /// Exact value of the black box at `x`.
    pub fn value_of(&self, x: &[f64]) -> f64 {
        self.black_box.evaluate(x)
    }

    /// Stored trials, in insertion order.
    pub fn trial_results(&self) -> impl Iterator<Item = (&TrialId, &OptimizationTrialResult)> {
        self.trial_results.iter().map(|(id, r)| (id, r))
    }

    /// The trial stored under `identifier`.
    pub fn trial(&self, identifier: &TrialId) -> Option<&OptimizationTrialResult> {
        self.trial_results
            .iter()
            .find(|(id, _)| id == identifier)
            .map(|(_, r)| r)
    }

    /// Run one optimization and store it.
    ///
    /// Without an identifier, the next unused integer is chosen. An existing
    /// trial with the same identifier is replaced.
    pub fn optimize(
        &mut self,
        params: OptimizationParams,
        identifier: Option<TrialId>,
        options: &RunOptions,
    ) -> StudyResult<OptimizationTrialResult> {
        let mut results =
            self.optimize_sweep(vec![params], identifier.map(|id| vec![id]), options)?;
        // One params set in, one result out.
        Ok(results.remove(0))
    }

    /// Run one optimization per parameter set and store them.
    ///
    /// # Errors
    ///
    /// - [`StudyError::NotEnoughSeeds`] if fewer seeds than repetitions are
    ///   given.
    /// - [`StudyError::IdentifierCountMismatch`] if identifiers are given but
    ///   do not match the parameter sets one to one.
    /// - [`StudyError::DimensionMismatch`] for an initial guess of the wrong
    ///   length.
    pub fn optimize_sweep(
        &mut self,
        param_sweep: Vec<OptimizationParams>,
        identifiers: Option<Vec<TrialId>>,
        options: &RunOptions,
    ) -> StudyResult<Vec<OptimizationTrialResult>> {
        check_seeds(options)?;
        let identifiers = match identifiers {
            Some(ids) if ids.len() != param_sweep.len() => {
                return Err(StudyError::IdentifierCountMismatch {
                    identifiers: ids.len(),
                    params: param_sweep.len(),
                });
            }
            Some(ids) => ids,
            None => {
                let start = self.next_index();
                (start..start + param_sweep.len() as u64)
                    .map(TrialId::Index)
                    .collect()
            }
        };

        let mut trial_results = Vec::with_capacity(param_sweep.len());
        for (identifier, params) in identifiers.into_iter().zip(param_sweep) {
            let results = self.run_repetitions(&params, options)?;
            let trial = OptimizationTrialResult::new(results, params);
            info!(
                study = %self.name,
                %identifier,
                optimal_value = trial.optimal_value(),
                repetitions = trial.repetitions(),
                "Trial finished"
            );
            self.insert(identifier, trial.clone());
            trial_results.push(trial);
        }
        Ok(trial_results)
    }

    /// Add repetitions to an existing trial, reusing its parameters.
    ///
    /// # Errors
    ///
    /// [`StudyError::UnknownTrial`] if nothing is stored under `identifier`.
    pub fn extend_result(&mut self, identifier: &TrialId, options: &RunOptions) -> StudyResult<()> {
        check_seeds(options)?;
        let params = self
            .trial(identifier)
            .ok_or_else(|| StudyError::UnknownTrial(identifier.clone()))?
            .params
            .clone();
        let results = self.run_repetitions(&params, options)?;
        if let Some((_, trial)) = self
            .trial_results
            .iter_mut()
            .find(|(id, _)| id == identifier)
        {
            trial.extend(results);
        }
        Ok(())
    }

    fn next_index(&self) -> u64 {
        self.trial_results
            .iter()
            .filter_map(|(id, _)| match id {
                TrialId::Index(i) => Some(*i + 1),
                TrialId::Name(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    fn insert(&mut self, identifier: TrialId, trial: OptimizationTrialResult) {
        match self.trial_results.iter_mut().find(|(id, _)| *id == identifier) {
            Some((_, existing)) => *existing = trial,
            None => self.trial_results.push((identifier, trial)),
        }
    }

    fn run_repetitions(
        &self,
        params: &OptimizationParams,
        options: &RunOptions,
    ) -> StudyResult<Vec<OptimizationResult>> {
        let dimension = self.black_box.dimension();
        let initial_guess = params
            .initial_guess
            .clone()
            .unwrap_or_else(|| self.black_box.default_initial_params());
        if initial_guess.len() != dimension {
            return Err(StudyError::DimensionMismatch {
                expected: dimension,
                got: initial_guess.len(),
            });
        }
        let initial_guess_array = params
            .initial_guess_array
            .clone()
            .unwrap_or_else(|| vec![self.black_box.default_initial_params()]);
        if let Some(row) = initial_guess_array.iter().find(|row| row.len() != dimension) {
            return Err(StudyError::DimensionMismatch {
                expected: dimension,
                got: row.len(),
            });
        }

        let seeds: Vec<u64> = match &options.seeds {
            Some(seeds) => seeds[..options.repetitions].to_vec(),
            None => {
                let mut rng = rand::thread_rng();
                (0..options.repetitions)
                    .map(|_| u64::from(rng.r#gen::<u32>()))
                    .collect()
            }
        };

        debug!(
            algorithm = params.algorithm.name(),
            repetitions = options.repetitions,
            parallel = options.parallel,
            "Running repetitions"
        );

        let run = |seed: u64| {
            run_optimization(
                self.black_box.as_ref(),
                params,
                options,
                seed,
                &initial_guess,
                &initial_guess_array,
            )
        };
        let results = if options.parallel {
            seeds.into_par_iter().map(run).collect()
        } else {
            seeds.into_iter().map(run).collect()
        };
        Ok(results)
    }
}

fn check_seeds(options: &RunOptions) -> StudyResult<()> {
    match &options.seeds {
        Some(seeds) if seeds.len() < options.repetitions => Err(StudyError::NotEnoughSeeds {
            seeds: seeds.len(),
            repetitions: options.repetitions,
        }),
        _ => Ok(()),
    }
}

/// One repetition: wrap the black box, run the optimizer, fill in the record.
fn run_optimization(
    black_box: &dyn BlackBox,
    params: &OptimizationParams,
    options: &RunOptions,
    seed: u64,
    initial_guess: &[f64],
    initial_guess_array: &[Vec<f64>],
) -> OptimizationResult {
    let wrapped = StatefulBlackBox::new(
        black_box,
        params.cost_of_evaluate,
        options.stateful && options.save_x_vals,
    );
    let mut rng = StdRng::seed_from_u64(seed);

    let start = Instant::now();
    let mut result = params
        .algorithm
        .optimize(&wrapped, initial_guess, initial_guess_array, &mut rng);
    result.time = Some(start.elapsed().as_secs_f64());
    result.seed = Some(seed);

    if options.stateful {
        let stats = wrapped.stats();
        result.num_evaluations = Some(stats.num_evaluations);
        result.cost_spent = Some(stats.cost_spent);
        result.function_values = Some(stats.function_values);
        result.wait_times = Some(stats.wait_times);
    }
    if options.reevaluate_final_params {
        result.optimal_value = wrapped.evaluate_noiseless(&result.optimal_parameters);
    }
    result
}

impl fmt::Display for VariationalStudy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let best = self
            .trial_results
            .iter()
            .min_by(|a, b| a.1.optimal_value().total_cmp(&b.1.optimal_value()));

        writeln!(f, "This study contains {} trial results.", self.trial_results.len())?;
        match best {
            Some((id, trial)) => {
                writeln!(
                    f,
                    "The optimal value found among all trial results is {}.",
                    trial.optimal_value()
                )?;
                writeln!(f, "It was found by the run with identifier {id}.")?;
            }
            None => writeln!(f, "No optimal value has been found yet.")?,
        }
        if let Some(target) = self.target {
            writeln!(f, "Target value: {target}.")?;
        }
        write!(f, "Result details:")?;

        for (id, trial) in &self.trial_results {
            write!(f, "\n    Identifier: {id}")?;
            write!(f, "\n        Optimal value: {}", trial.optimal_value())?;
            write!(f, "\n        Number of repetitions: {}", trial.repetitions())?;
            let rows: [(&str, Option<[f64; 3]>); 4] = [
                ("Optimal value", trial.quartiles(|r| Some(r.optimal_value))),
                ("Num evaluations", trial.quartiles(|r| r.num_evaluations.map(|n| n as f64))),
                ("Cost spent", trial.quartiles(|r| r.cost_spent)),
                ("Time spent", trial.quartiles(|r| r.time)),
            ];
            for (label, quartiles) in rows {
                if let Some([q1, q2, q3]) = quartiles {
                    write!(f, "\n        {label} 1st, 2nd, 3rd quartiles:")?;
                    write!(f, "\n            [{q1}, {q2}, {q3}]")?;
                }
            }
        }
        Ok(())
    }
}
