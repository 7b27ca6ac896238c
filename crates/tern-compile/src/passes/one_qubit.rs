//! Fusion of one-qubit gate runs into native pulse sequences.
//!
//! After two-qubit expansion a circuit is a mix of `XX(π/4)` interactions,
//! measurements, and stretches of one-qubit gates. This pass fuses each
//! maximal same-wire run into a single 2x2 unitary and decomposes it into
//! the fewest `Rphi(φ, π/2)` pulses the decomposition search can find,
//! choosing the [`Decomp`] family from what borders the run: a leading Rz
//! is free while the qubit is still in |0⟩, a trailing Rz is free before a
//! measurement, and a trailing Rx is free before an XX interaction. Free
//! trailing Rx rotations are carried forward as tracking matrices and
//! folded into the next run on the same wire.

use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_2;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tern_ir::{Instruction, Program, QubitId, StandardGate};

use crate::decomp::{decompose, Decomp, DEFAULT_THRESHOLD};
use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, RewriteCallback};
use crate::unitary::Unitary2x2;

/// Knobs controlling which rotations the fusion pass may treat as free.
///
/// The defaults assume qubits start in |0⟩ and end in a computational-basis
/// measurement; each `keep_*` flag disables one of the freedoms for
/// circuits where the assumption does not hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionOptions {
    /// Acceptance threshold for the decomposition objective.
    pub threshold: f64,
    /// Keep runs and tracked rotations at the end of the circuit instead of
    /// deleting them. Set this when the program is a subroutine rather than
    /// a complete circuit.
    pub keep_trailing_gates: bool,
    /// Do not discard Rz rotations in front of a measurement.
    pub keep_rz_before_meas: bool,
    /// Do not commute Rx rotations through a following XX interaction.
    pub keep_rx_before_xx: bool,
    /// Do not discard Rz rotations at the start of the circuit.
    pub keep_leading_rz: bool,
}

impl Default for FusionOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            keep_trailing_gates: false,
            keep_rz_before_meas: false,
            keep_rx_before_xx: false,
            keep_leading_rz: false,
        }
    }
}

/// What ends a one-qubit run.
enum Terminator {
    /// A measurement of the run's wire.
    Measure,
    /// A two-qubit gate involving the run's wire.
    TwoQubit,
    /// The end of the circuit.
    End,
}

/// Fuses one-qubit gate runs into `Rphi(φ, π/2)` pulse sequences.
///
/// Requires a flat program; run [`TwoQubitExpansion`] first (it flattens).
///
/// [`TwoQubitExpansion`]: crate::passes::TwoQubitExpansion
pub struct OneQubitFusion {
    options: FusionOptions,
    rewrite_log: Option<Box<RewriteCallback>>,
}

impl OneQubitFusion {
    /// Create the pass with the given options.
    pub fn new(options: FusionOptions) -> Self {
        Self {
            options,
            rewrite_log: None,
        }
    }

    /// Attach a rewrite observer.
    #[must_use]
    pub fn with_rewrite_log(mut self, callback: Box<RewriteCallback>) -> Self {
        self.rewrite_log = Some(callback);
        self
    }

    /// Pick the decomposition family for a run.
    fn family(&self, terminator: &Terminator, circuit_start: bool) -> Decomp {
        let leading_free = circuit_start && !self.options.keep_leading_rz;
        match terminator {
            Terminator::Measure | Terminator::End => {
                match (leading_free, self.options.keep_rz_before_meas) {
                    (true, true) => Decomp::RzExact,
                    (true, false) => Decomp::RzRz,
                    (false, true) => Decomp::Exact,
                    (false, false) => Decomp::Rz,
                }
            }
            Terminator::TwoQubit => match (leading_free, self.options.keep_rx_before_xx) {
                (true, true) => Decomp::RzExact,
                (true, false) => Decomp::RzRx,
                (false, true) => Decomp::Exact,
                (false, false) => Decomp::Rx,
            },
        }
    }

    /// Scan forward from `start` collecting the run of one-qubit gates on
    /// `wire`, skipping instructions on other wires.
    fn collect_run(
        instructions: &[Instruction],
        consumed: &[bool],
        start: usize,
        wire: QubitId,
    ) -> (Vec<usize>, Terminator) {
        let mut run = vec![start];
        for (j, inst) in instructions.iter().enumerate().skip(start + 1) {
            if consumed[j] || !inst.qubits.contains(&wire) {
                continue;
            }
            if inst.is_measure() {
                return (run, Terminator::Measure);
            }
            match inst.as_gate() {
                Some(g) if g.num_qubits() == 1 => run.push(j),
                _ => return (run, Terminator::TwoQubit),
            }
        }
        (run, Terminator::End)
    }

    /// Decompose a goal unitary and append the resulting pulses on `wire`.
    /// Returns the number of instructions appended.
    fn emit(
        &self,
        family: Decomp,
        goal: &Unitary2x2,
        wire: QubitId,
        tracking: &mut BTreeMap<u32, Unitary2x2>,
        out: &mut Vec<Instruction>,
    ) -> usize {
        let d = decompose(family, goal, self.options.threshold);
        for &phi in &d.angles {
            out.push(Instruction::single_qubit_gate(
                StandardGate::Rphi(phi, FRAC_PI_2),
                wire,
            ));
        }
        if d.residual.is_identity() {
            tracking.remove(&wire.0);
        } else {
            tracking.insert(wire.0, d.residual);
        }
        d.angles.len()
    }

    /// Flush the tracked rotation for `wire`, if it is worth emitting.
    fn flush(
        &self,
        wire: u32,
        tracked: Unitary2x2,
        tracking: &mut BTreeMap<u32, Unitary2x2>,
        out: &mut Vec<Instruction>,
    ) {
        if tracked.distance_from_identity() < self.options.threshold {
            debug!(qubit = wire, "dropping near-identity tracked rotation");
            return;
        }
        let family = if self.options.keep_rz_before_meas {
            Decomp::Exact
        } else {
            Decomp::Rz
        };
        let before = out.len();
        self.emit(family, &tracked, QubitId(wire), tracking, out);
        if let Some(callback) = &self.rewrite_log {
            callback(&[], &out[before..]);
        }
    }

    fn check_registers(program: &Program) -> CompileResult<()> {
        let mut register: Option<&str> = None;
        for inst in program.instructions() {
            let Some(name) = inst.register.as_deref() else {
                continue;
            };
            match register {
                Some(seen) if seen != name => return Err(CompileError::MultipleRegisters),
                Some(_) => {}
                None => register = Some(name),
            }
        }
        Ok(())
    }
}

impl Pass for OneQubitFusion {
    fn name(&self) -> &'static str {
        "one-qubit-fusion"
    }

    fn run(&self, program: &mut Program) -> CompileResult<()> {
        if !program.is_flat() {
            return Err(CompileError::NotFlattened(program.name().to_string()));
        }
        Self::check_registers(program)?;
        program.retain_enabled();

        let instructions = program.instructions().to_vec();
        let n = instructions.len();
        let mut consumed = vec![false; n];
        let mut seen: FxHashSet<u32> = FxHashSet::default();
        let mut tracking: BTreeMap<u32, Unitary2x2> = BTreeMap::new();
        let mut out: Vec<Instruction> = Vec::with_capacity(n);

        for i in 0..n {
            if consumed[i] {
                continue;
            }
            let inst = &instructions[i];

            let is_run_head = inst
                .as_gate()
                .is_some_and(|g| g.num_qubits() == 1);
            if !is_run_head {
                if inst.is_measure() {
                    let wire = inst.qubits[0];
                    if let Some(tracked) = tracking.remove(&wire.0) {
                        self.flush(wire.0, tracked, &mut tracking, &mut out);
                    }
                }
                // Tracked Rx residuals commute through XX interactions, so a
                // two-qubit boundary needs no flush.
                out.push(inst.clone());
                for &q in &inst.qubits {
                    seen.insert(q.0);
                }
                continue;
            }

            let wire = inst.qubits[0];
            let circuit_start = !seen.contains(&wire.0);
            seen.insert(wire.0);

            let (run, terminator) = Self::collect_run(&instructions, &consumed, i, wire);
            for &j in &run {
                consumed[j] = true;
            }

            if matches!(terminator, Terminator::End) && !self.options.keep_trailing_gates {
                debug!(
                    qubit = wire.0,
                    gates = run.len(),
                    "deleting unmeasured run at end of circuit"
                );
                if let Some(callback) = &self.rewrite_log {
                    let originals: Vec<_> =
                        run.iter().map(|&j| instructions[j].clone()).collect();
                    callback(&originals, &[]);
                }
                continue;
            }

            // The tracked residual acts first, so it sits rightmost in the
            // fused product.
            let mut goal = tracking
                .remove(&wire.0)
                .unwrap_or_else(Unitary2x2::identity);
            for &j in &run {
                let gate = instructions[j]
                    .as_gate()
                    .and_then(Unitary2x2::from_gate)
                    .ok_or_else(|| {
                        CompileError::UnsupportedGate(instructions[j].name().to_string())
                    })?;
                goal = gate.mul(&goal);
            }

            let family = self.family(&terminator, circuit_start);
            debug!(
                qubit = wire.0,
                gates = run.len(),
                family = family.name(),
                "fusing one-qubit run"
            );
            let before = out.len();
            self.emit(family, &goal, wire, &mut tracking, &mut out);
            if let Some(callback) = &self.rewrite_log {
                let originals: Vec<_> = run.iter().map(|&j| instructions[j].clone()).collect();
                callback(&originals, &out[before..]);
            }
        }

        if self.options.keep_trailing_gates {
            // Sorted by wire for a deterministic tail.
            while let Some((wire, tracked)) = tracking.pop_first() {
                self.flush(wire, tracked, &mut tracking, &mut out);
            }
        } else if !tracking.is_empty() {
            debug!(
                qubits = tracking.len(),
                "dropping tracked rotations at end of circuit"
            );
        }

        program.set_instructions(out);
        Ok(())
    }
}
