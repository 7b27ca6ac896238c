//! Compilation passes targeting trapped-ion hardware.
//!
//! The native gate set of the target devices is the equatorial one-qubit
//! rotation `Rphi(φ, π/2)` plus the two-qubit Mølmer–Sørensen interaction
//! `XX(π/4)`. Compilation is organized as [`Pass`]es over a
//! [`Program`](tern_ir::Program):
//!
//! - [`TwoQubitExpansion`](passes::TwoQubitExpansion) rewrites CNOT, CH,
//!   CY, CZ and SWAP into `XX(π/4)` interactions bracketed by the
//!   device's calibrated phase corrections ([`MsPhaseMap`]).
//! - [`OneQubitFusion`](passes::OneQubitFusion) fuses the remaining runs
//!   of one-qubit gates and synthesizes each fused unitary as a short
//!   `Rphi` pulse sequence via the [`decomp`] search, exploiting rotations
//!   that are free at circuit start, before measurements, and across XX
//!   interactions.
//!
//! ```
//! use tern_compile::calibration::MsPhaseMap;
//! use tern_compile::passes::{FusionOptions, OneQubitFusion, TwoQubitExpansion};
//! use tern_compile::Pass;
//! use tern_ir::{Program, QubitId};
//!
//! let mut program = Program::new("bell");
//! program.h(QubitId(0))?;
//! program.cnot(QubitId(0), QubitId(1))?;
//! program.measure(QubitId(0))?;
//! program.measure(QubitId(1))?;
//!
//! TwoQubitExpansion::new(MsPhaseMap::zeros(2)).run(&mut program)?;
//! OneQubitFusion::new(FusionOptions::default()).run(&mut program)?;
//!
//! // Only native gates and measurements remain.
//! assert!(program
//!     .instructions()
//!     .iter()
//!     .all(|i| matches!(i.name(), "rphi" | "xx" | "measure")));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod calibration;
pub mod decomp;
pub mod error;
pub mod pass;
pub mod passes;
pub mod unitary;

pub use calibration::{MsPhaseEntry, MsPhaseMap};
pub use decomp::{decompose, Decomp, Decomposition, DEFAULT_THRESHOLD, MAX_ROTATIONS};
pub use error::{CompileError, CompileResult};
pub use pass::{Pass, RewriteCallback};
pub use passes::{FusionOptions, OneQubitFusion, TwoQubitExpansion};
pub use unitary::Unitary2x2;
