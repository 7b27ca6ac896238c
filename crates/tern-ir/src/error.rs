//! Error types for the IR crate.

use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Gate requires a different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate_name: String,
        /// Expected number of qubits.
        expected: u32,
        /// Actual number of qubits provided.
        got: u32,
    },

    /// Instruction index out of bounds.
    #[error("Instruction index {index} out of bounds (program has {len} instructions)")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// The program length at the time of the operation.
        len: usize,
    },
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
