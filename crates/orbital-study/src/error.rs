//! Error types for variational studies.

use thiserror::Error;

use crate::study::TrialId;

/// Errors produced while running a study.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudyError {
    /// No trial result is stored under the identifier.
    #[error("Could not find an existing result with the identifier {0}")]
    UnknownTrial(TrialId),

    /// Fewer seeds than repetitions were supplied.
    #[error("Provided {seeds} RNG seeds for {repetitions} repetitions")]
    NotEnoughSeeds {
        /// Number of seeds supplied.
        seeds: usize,
        /// Number of repetitions requested.
        repetitions: usize,
    },

    /// More identifiers than parameter sets, or the reverse.
    #[error("Got {identifiers} identifiers for {params} parameter sets")]
    IdentifierCountMismatch {
        /// Number of identifiers supplied.
        identifiers: usize,
        /// Number of parameter sets supplied.
        params: usize,
    },

    /// An initial guess has the wrong length.
    #[error("Initial guess has {got} parameters, black box expects {expected}")]
    DimensionMismatch {
        /// Dimension of the black box.
        expected: usize,
        /// Length of the guess.
        got: usize,
    },
}

/// Result type for study operations.
pub type StudyResult<T> = Result<T, StudyError>;
