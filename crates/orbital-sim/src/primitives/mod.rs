//! Circuit building blocks shared by Trotter algorithms.
//!
//! - [`swap_network`]: visits every pair of modes with nearest-neighbor swaps.
//! - [`bogoliubov_transform`]: a single-particle basis change from Givens
//!   rotations.

mod bogoliubov;
mod swap_network;

pub use bogoliubov::bogoliubov_transform;
pub(crate) use bogoliubov::slater_basis_change;
pub use swap_network::{swap_network, swap_network_permutation};
