//! Built-in compilation passes.

pub mod one_qubit;
pub mod two_qubit;

pub use one_qubit::{FusionOptions, OneQubitFusion};
pub use two_qubit::TwoQubitExpansion;
