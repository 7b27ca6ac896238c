//! Tern Circuit Intermediate Representation
//!
//! This crate provides the core data structures for representing quantum
//! circuits headed for trapped-ion hardware. It forms the foundation of the
//! Tern compilation stack.
//!
//! # Overview
//!
//! A circuit is a [`Program`]: an ordered, possibly nested sequence of
//! [`Instruction`]s. Nesting comes from composite instructions (subroutines
//! emitted by front-ends); the compilation passes in `tern-compile` operate
//! on flat programs, so [`Program::flatten`] replaces the instruction list
//! with its depth-first leaf sequence.
//!
//! # Core Components
//!
//! - **Qubits**: [`QubitId`] for addressing wires
//! - **Gates**: [`StandardGate`], a closed enum over the gate vocabulary
//! - **Instructions**: [`Instruction`] combining gates with their operands
//! - **Program**: [`Program`] ordered instruction sequence with builder API
//!
//! # Example: Building a Bell pair
//!
//! ```rust
//! use tern_ir::{Program, QubitId};
//!
//! let mut program = Program::new("bell");
//! program.h(QubitId(0)).unwrap();
//! program.cnot(QubitId(0), QubitId(1)).unwrap();
//! program.measure(QubitId(0)).unwrap();
//! program.measure(QubitId(1)).unwrap();
//!
//! assert_eq!(program.len(), 4);
//! assert!(program.is_flat());
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `H` | 1 | Hadamard gate |
//! | `S`, `Sdg`, `T`, `Tdg` | 1 | Phase gates |
//! | `Rx`, `Ry`, `Rz` | 1 | Axis rotations |
//! | `Rphi` | 1 | Native equatorial rotation Rphi(φ, θ) |
//! | `Cnot`, `Cy`, `Cz`, `Ch` | 2 | Controlled gates |
//! | `Swap`, `ISwap` | 2 | Exchange gates |
//! | `Xx` | 2 | Native Mølmer–Sørensen interaction XX(θ) |

pub mod error;
pub mod gate;
pub mod instruction;
pub mod program;
pub mod qubit;

pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use program::{FlatIter, Program};
pub use qubit::QubitId;
