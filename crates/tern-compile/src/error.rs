//! Error types for the compilation crate.

use thiserror::Error;

/// Errors that can occur during compilation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] tern_ir::IrError),

    /// No calibrated MS phase for an ion pair.
    #[error("No calibrated MS phase for ion pair ({0}, {1})")]
    MissingMsPhase(u32, u32),

    /// Gate has no native expansion.
    #[error("Gate '{0}' has no trapped-ion expansion")]
    UnsupportedGate(String),

    /// Measurements target more than one classical register.
    #[error("Program measures into multiple classical registers")]
    MultipleRegisters,

    /// Pass requires a flat program.
    #[error("Program '{0}' must be flattened before this pass")]
    NotFlattened(String),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
