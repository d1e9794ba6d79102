//! `orbital-study`: bookkeeping for variational optimization experiments.
//!
//! A [`VariationalStudy`] pairs one [`BlackBox`] objective with many runs of
//! [`Optimizer`]s. Runs are grouped into trials keyed by [`TrialId`]; each
//! trial keeps every repetition so that statistics over seeds can be
//! reported.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use orbital_study::{
//!     BlackBox, OptimizationParams, OptimizationResult, Optimizer, RunOptions, VariationalStudy,
//! };
//! use rand::rngs::StdRng;
//!
//! struct Parabola;
//!
//! impl BlackBox for Parabola {
//!     fn dimension(&self) -> usize {
//!         1
//!     }
//!     fn evaluate(&self, x: &[f64]) -> f64 {
//!         (x[0] - 1.0).powi(2)
//!     }
//! }
//!
//! struct Guess;
//!
//! impl Optimizer for Guess {
//!     fn name(&self) -> &str {
//!         "guess"
//!     }
//!     fn optimize(
//!         &self,
//!         black_box: &dyn BlackBox,
//!         initial_guess: &[f64],
//!         _initial_guess_array: &[Vec<f64>],
//!         _rng: &mut StdRng,
//!     ) -> OptimizationResult {
//!         OptimizationResult::new(black_box.evaluate(initial_guess), initial_guess.to_vec())
//!     }
//! }
//!
//! let mut study = VariationalStudy::new("parabola", Arc::new(Parabola));
//! let params = OptimizationParams::new(Arc::new(Guess)).with_initial_guess(vec![0.5]);
//! let trial = study.optimize(params, None, &RunOptions::new()).unwrap();
//! assert_eq!(trial.optimal_value(), 0.25);
//! ```

pub mod black_box;
pub mod error;
pub mod optimization;
pub mod study;

pub use black_box::{BlackBox, BlackBoxStats, StatefulBlackBox};
pub use error::{StudyError, StudyResult};
pub use optimization::{
    OptimizationParams, OptimizationResult, OptimizationTrialResult, Optimizer,
};
pub use study::{RunOptions, TrialId, VariationalStudy};
