//! Pass trait for compilation passes.

use tern_ir::{Instruction, Program};

use crate::error::CompileResult;

/// Observer invoked whenever a pass rewrites a group of instructions.
///
/// The first slice holds the instructions that were replaced, the second
/// the instructions emitted in their place. Callbacks are used for pulse
/// bookkeeping and debugging; passes run identically without one.
pub type RewriteCallback = dyn Fn(&[Instruction], &[Instruction]) + Send + Sync;

/// A compilation pass that operates on a program.
///
/// Passes are the fundamental unit of compilation. Each pass performs a
/// specific transformation on the instruction sequence.
pub trait Pass: Send + Sync {
    /// Get the name of this pass.
    fn name(&self) -> &str;

    /// Run the pass, rewriting the program in place.
    fn run(&self, program: &mut Program) -> CompileResult<()>;
}
