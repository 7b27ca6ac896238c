//! Expansion of two-qubit gates into the native gate set.
//!
//! The Mølmer–Sørensen XX(π/4) interaction is the only entangling operation
//! the hardware executes. CNOT is expanded around a single XX pulse, wrapped
//! in the calibrated per-ion Rz phase corrections; the remaining two-qubit
//! gates reduce to CNOT plus one-qubit Cliffords and are expanded
//! recursively, leaving the one-qubit debris for the fusion pass to absorb.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use tracing::debug;

use tern_ir::{Instruction, Program, QubitId, StandardGate};

use crate::calibration::MsPhaseMap;
use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, RewriteCallback};

/// Rewrites every two-qubit gate into `XX(π/4)` pulses and one-qubit gates.
///
/// The pass flattens its input and rebuilds the instruction sequence in one
/// forward sweep; running it on its own output is a no-op.
pub struct TwoQubitExpansion {
    ms_phases: MsPhaseMap,
    rewrite_log: Option<Box<RewriteCallback>>,
}

impl TwoQubitExpansion {
    /// Create the pass with the device's calibrated MS phases.
    pub fn new(ms_phases: MsPhaseMap) -> Self {
        Self {
            ms_phases,
            rewrite_log: None,
        }
    }

    /// Attach a rewrite observer.
    #[must_use]
    pub fn with_rewrite_log(mut self, callback: Box<RewriteCallback>) -> Self {
        self.rewrite_log = Some(callback);
        self
    }

    fn expand_cnot(
        &self,
        control: QubitId,
        target: QubitId,
        out: &mut Vec<Instruction>,
    ) -> CompileResult<()> {
        let (control_phase, target_phase) = self.ms_phases.lookup(control, target)?;

        out.push(Instruction::single_qubit_gate(
            StandardGate::Ry(-FRAC_PI_2),
            control,
        ));
        // The Rz conjugation realigns the calibrated MS interaction with the
        // ideal XX axis; a zero phase needs no correction at all.
        if control_phase != 0.0 {
            out.push(Instruction::single_qubit_gate(
                StandardGate::Rz(control_phase),
                control,
            ));
        }
        if target_phase != 0.0 {
            out.push(Instruction::single_qubit_gate(
                StandardGate::Rz(target_phase),
                target,
            ));
        }
        out.push(Instruction::two_qubit_gate(
            StandardGate::Xx(FRAC_PI_4),
            control,
            target,
        ));
        if control_phase != 0.0 {
            out.push(Instruction::single_qubit_gate(
                StandardGate::Rz(-control_phase),
                control,
            ));
        }
        if target_phase != 0.0 {
            out.push(Instruction::single_qubit_gate(
                StandardGate::Rz(-target_phase),
                target,
            ));
        }
        out.push(Instruction::single_qubit_gate(
            StandardGate::Ry(FRAC_PI_2),
            control,
        ));
        out.push(Instruction::single_qubit_gate(
            StandardGate::Rz(FRAC_PI_2),
            control,
        ));
        out.push(Instruction::single_qubit_gate(
            StandardGate::Rx(FRAC_PI_2),
            target,
        ));
        Ok(())
    }

    /// Expand one instruction into `out`. Returns `false` if the
    /// instruction was passed through verbatim.
    fn expand(&self, inst: &Instruction, out: &mut Vec<Instruction>) -> CompileResult<bool> {
        let Some(&gate) = inst.as_gate() else {
            out.push(inst.clone());
            return Ok(false);
        };
        if gate.num_qubits() != 2 || matches!(gate, StandardGate::Xx(_)) {
            out.push(inst.clone());
            return Ok(false);
        }

        let (a, b) = (inst.qubits[0], inst.qubits[1]);
        match gate {
            StandardGate::Cnot => self.expand_cnot(a, b, out)?,
            StandardGate::Ch => {
                out.push(Instruction::single_qubit_gate(StandardGate::S, b));
                out.push(Instruction::single_qubit_gate(StandardGate::H, b));
                out.push(Instruction::single_qubit_gate(StandardGate::T, b));
                self.expand_cnot(a, b, out)?;
                out.push(Instruction::single_qubit_gate(StandardGate::Tdg, b));
                out.push(Instruction::single_qubit_gate(StandardGate::H, b));
                out.push(Instruction::single_qubit_gate(StandardGate::Sdg, b));
            }
            StandardGate::Cy => {
                out.push(Instruction::single_qubit_gate(StandardGate::Sdg, b));
                self.expand_cnot(a, b, out)?;
                out.push(Instruction::single_qubit_gate(StandardGate::S, b));
            }
            StandardGate::Cz => {
                out.push(Instruction::single_qubit_gate(StandardGate::H, b));
                self.expand_cnot(a, b, out)?;
                out.push(Instruction::single_qubit_gate(StandardGate::H, b));
            }
            StandardGate::Swap => {
                self.expand_cnot(a, b, out)?;
                self.expand_cnot(b, a, out)?;
                self.expand_cnot(a, b, out)?;
            }
            other => return Err(CompileError::UnsupportedGate(other.name().to_string())),
        }
        Ok(true)
    }
}

impl Pass for TwoQubitExpansion {
    fn name(&self) -> &'static str {
        "two-qubit-expansion"
    }

    fn run(&self, program: &mut Program) -> CompileResult<()> {
        program.flatten();

        let mut rebuilt = Vec::with_capacity(program.len());
        for inst in program.instructions() {
            let before = rebuilt.len();
            let expanded = self.expand(inst, &mut rebuilt)?;
            if expanded {
                debug!(
                    gate = inst.name(),
                    emitted = rebuilt.len() - before,
                    "expanded two-qubit gate"
                );
                if let Some(callback) = &self.rewrite_log {
                    callback(std::slice::from_ref(inst), &rebuilt[before..]);
                }
            }
        }
        program.set_instructions(rebuilt);
        Ok(())
    }
}
