//! Ordered instruction sequence with a high-level builder API.

use serde::{Deserialize, Serialize};
use std::slice;

use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::{Instruction, InstructionKind};
use crate::qubit::QubitId;

/// A quantum program.
///
/// Instructions are kept in execution order. A program may contain
/// [`InstructionKind::Composite`] instructions; the compilation passes
/// require a flat program, so call [`Program::flatten`] first (or build
/// flat to begin with, in which case flattening is a no-op).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Name of the program.
    name: String,
    /// Instructions in execution order.
    instructions: Vec<Instruction>,
}

impl Program {
    /// Create a new empty program.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: vec![],
        }
    }

    /// Get the program name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of top-level instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Check if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Get the instructions.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Get mutable access to the instructions.
    pub fn instructions_mut(&mut self) -> &mut Vec<Instruction> {
        &mut self.instructions
    }

    /// Replace the instruction list wholesale.
    pub fn set_instructions(&mut self, instructions: Vec<Instruction>) {
        self.instructions = instructions;
    }

    /// Append an instruction, validating gate arity.
    pub fn add(&mut self, inst: Instruction) -> IrResult<&mut Self> {
        Self::validate(&inst)?;
        self.instructions.push(inst);
        Ok(self)
    }

    /// Insert an instruction at a position, validating gate arity.
    pub fn insert(&mut self, index: usize, inst: Instruction) -> IrResult<&mut Self> {
        if index > self.instructions.len() {
            return Err(IrError::IndexOutOfBounds {
                index,
                len: self.instructions.len(),
            });
        }
        Self::validate(&inst)?;
        self.instructions.insert(index, inst);
        Ok(self)
    }

    /// Remove and return the instruction at a position.
    pub fn remove(&mut self, index: usize) -> IrResult<Instruction> {
        if index >= self.instructions.len() {
            return Err(IrError::IndexOutOfBounds {
                index,
                len: self.instructions.len(),
            });
        }
        Ok(self.instructions.remove(index))
    }

    /// Drop every disabled instruction (recursing into composites).
    pub fn retain_enabled(&mut self) {
        fn retain(insts: &mut Vec<Instruction>) {
            insts.retain(|i| i.enabled);
            for inst in insts.iter_mut() {
                if let InstructionKind::Composite(children) = &mut inst.kind {
                    retain(children);
                }
            }
        }
        retain(&mut self.instructions);
    }

    fn validate(inst: &Instruction) -> IrResult<()> {
        if let InstructionKind::Gate(g) = &inst.kind {
            let got = u32::try_from(inst.qubits.len()).unwrap_or(u32::MAX);
            if got != g.num_qubits() {
                return Err(IrError::QubitCountMismatch {
                    gate_name: g.name().to_string(),
                    expected: g.num_qubits(),
                    got,
                });
            }
        }
        Ok(())
    }

    // =========================================================================
    // Builder API
    // =========================================================================

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::single_qubit_gate(StandardGate::X, qubit))
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::single_qubit_gate(StandardGate::Y, qubit))
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::single_qubit_gate(StandardGate::Z, qubit))
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::single_qubit_gate(StandardGate::H, qubit))
    }

    /// Apply S gate.
    pub fn s(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::single_qubit_gate(StandardGate::S, qubit))
    }

    /// Apply S-dagger gate.
    pub fn sdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::single_qubit_gate(StandardGate::Sdg, qubit))
    }

    /// Apply T gate.
    pub fn t(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::single_qubit_gate(StandardGate::T, qubit))
    }

    /// Apply T-dagger gate.
    pub fn tdg(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::single_qubit_gate(StandardGate::Tdg, qubit))
    }

    /// Apply Rx rotation gate.
    pub fn rx(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::single_qubit_gate(StandardGate::Rx(theta), qubit))
    }

    /// Apply Ry rotation gate.
    pub fn ry(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::single_qubit_gate(StandardGate::Ry(theta), qubit))
    }

    /// Apply Rz rotation gate.
    pub fn rz(&mut self, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::single_qubit_gate(StandardGate::Rz(theta), qubit))
    }

    /// Apply native Rphi(φ, θ) rotation.
    pub fn rphi(&mut self, phi: f64, theta: f64, qubit: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::single_qubit_gate(
            StandardGate::Rphi(phi, theta),
            qubit,
        ))
    }

    /// Apply CNOT gate.
    pub fn cnot(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::two_qubit_gate(StandardGate::Cnot, control, target))
    }

    /// Apply controlled-Hadamard gate.
    pub fn ch(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::two_qubit_gate(StandardGate::Ch, control, target))
    }

    /// Apply controlled-Y gate.
    pub fn cy(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::two_qubit_gate(StandardGate::Cy, control, target))
    }

    /// Apply controlled-Z gate.
    pub fn cz(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::two_qubit_gate(StandardGate::Cz, control, target))
    }

    /// Apply SWAP gate.
    pub fn swap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::two_qubit_gate(StandardGate::Swap, q1, q2))
    }

    /// Apply iSWAP gate.
    pub fn iswap(&mut self, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::two_qubit_gate(StandardGate::ISwap, q1, q2))
    }

    /// Apply native XX(θ) interaction.
    pub fn xx(&mut self, theta: f64, q1: QubitId, q2: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::two_qubit_gate(StandardGate::Xx(theta), q1, q2))
    }

    /// Measure a qubit into the default register.
    pub fn measure(&mut self, qubit: QubitId) -> IrResult<&mut Self> {
        self.add(Instruction::measure(qubit))
    }

    /// Measure a qubit into a named register.
    pub fn measure_into(
        &mut self,
        qubit: QubitId,
        register: impl Into<String>,
    ) -> IrResult<&mut Self> {
        self.add(Instruction::measure_into(qubit, register))
    }

    // =========================================================================
    // Flattening
    // =========================================================================

    /// Check that no top-level instruction is a composite.
    pub fn is_flat(&self) -> bool {
        self.instructions.iter().all(|i| !i.is_composite())
    }

    /// Iterate over the leaf instructions in execution order.
    ///
    /// Composites are traversed depth-first and never yielded themselves.
    /// Disabled instructions are skipped.
    pub fn flat_iter(&self) -> FlatIter<'_> {
        FlatIter {
            stack: vec![self.instructions.iter()],
        }
    }

    /// Replace the instruction list with its leaf sequence.
    ///
    /// After this, [`Program::is_flat`] holds and every remaining instruction
    /// is enabled.
    pub fn flatten(&mut self) {
        if self.is_flat() && self.instructions.iter().all(|i| i.enabled) {
            return;
        }
        self.instructions = self.flat_iter().cloned().collect();
    }

    /// Collect the distinct qubits used, in order of first use.
    pub fn qubits(&self) -> Vec<QubitId> {
        let mut out: Vec<QubitId> = Vec::new();
        for inst in self.flat_iter() {
            for &q in &inst.qubits {
                if !out.contains(&q) {
                    out.push(q);
                }
            }
        }
        out
    }
}

/// Depth-first iterator over a program's leaf instructions.
///
/// Produced by [`Program::flat_iter`].
pub struct FlatIter<'a> {
    stack: Vec<slice::Iter<'a, Instruction>>,
}

impl<'a> Iterator for FlatIter<'a> {
    type Item = &'a Instruction;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let iter = self.stack.last_mut()?;
            match iter.next() {
                Some(inst) if !inst.enabled => continue,
                Some(inst) => match &inst.kind {
                    InstructionKind::Composite(children) => {
                        self.stack.push(children.iter());
                    }
                    _ => return Some(inst),
                },
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_builder() {
        let mut program = Program::new("bell");
        program.h(QubitId(0)).unwrap();
        program.cnot(QubitId(0), QubitId(1)).unwrap();
        program.measure(QubitId(0)).unwrap();
        program.measure(QubitId(1)).unwrap();

        assert_eq!(program.len(), 4);
        assert!(program.is_flat());
        assert_eq!(program.qubits(), vec![QubitId(0), QubitId(1)]);
    }

    #[test]
    fn test_arity_validation() {
        let mut program = Program::new("bad");
        let err = program
            .add(Instruction::gate(StandardGate::Cnot, [QubitId(0)]))
            .unwrap_err();
        match err {
            IrError::QubitCountMismatch {
                gate_name,
                expected,
                got,
            } => {
                assert_eq!(gate_name, "cnot");
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_insert_remove_bounds() {
        let mut program = Program::new("p");
        program.h(QubitId(0)).unwrap();

        assert!(matches!(
            program.insert(5, Instruction::measure(QubitId(0))),
            Err(IrError::IndexOutOfBounds { index: 5, len: 1 })
        ));
        assert!(matches!(
            program.remove(1),
            Err(IrError::IndexOutOfBounds { index: 1, len: 1 })
        ));

        program
            .insert(0, Instruction::single_qubit_gate(StandardGate::X, QubitId(0)))
            .unwrap();
        let removed = program.remove(0).unwrap();
        assert_eq!(removed.name(), "x");
    }

    #[test]
    fn test_flatten_nested() {
        let mut program = Program::new("nested");
        let inner = Instruction::composite([
            Instruction::single_qubit_gate(StandardGate::H, QubitId(0)),
            Instruction::composite([Instruction::two_qubit_gate(
                StandardGate::Cnot,
                QubitId(0),
                QubitId(1),
            )]),
        ]);
        program.add(inner).unwrap();
        program.measure(QubitId(1)).unwrap();

        assert!(!program.is_flat());
        let names: Vec<_> = program.flat_iter().map(|i| i.name().to_string()).collect();
        assert_eq!(names, vec!["h", "cnot", "measure"]);

        program.flatten();
        assert!(program.is_flat());
        assert_eq!(program.len(), 3);
    }

    #[test]
    fn test_flatten_drops_disabled() {
        let mut program = Program::new("p");
        program.h(QubitId(0)).unwrap();
        program.x(QubitId(0)).unwrap();
        program.instructions_mut()[0].disable();

        let names: Vec<_> = program.flat_iter().map(|i| i.name().to_string()).collect();
        assert_eq!(names, vec!["x"]);

        program.flatten();
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn test_retain_enabled() {
        let mut program = Program::new("p");
        program.h(QubitId(0)).unwrap();
        program.x(QubitId(0)).unwrap();
        program.instructions_mut()[1].disable();
        program.retain_enabled();
        assert_eq!(program.len(), 1);
        assert_eq!(program.instructions()[0].name(), "h");
    }

    #[test]
    fn test_serde_round_trip() {
        let mut program = Program::new("rt");
        program.rphi(0.5, std::f64::consts::FRAC_PI_2, QubitId(0)).unwrap();
        program.xx(std::f64::consts::FRAC_PI_4, QubitId(0), QubitId(1)).unwrap();

        let json = serde_json::to_string(&program).unwrap();
        let back: Program = serde_json::from_str(&json).unwrap();
        assert_eq!(program, back);
    }

    proptest! {
        #[test]
        fn flatten_is_idempotent(depth in 0usize..4, width in 1usize..4) {
            fn build(depth: usize, width: usize) -> Vec<Instruction> {
                let mut out = vec![];
                for i in 0..width {
                    out.push(Instruction::single_qubit_gate(
                        StandardGate::H,
                        QubitId(i as u32),
                    ));
                    if depth > 0 {
                        out.push(Instruction::composite(build(depth - 1, width)));
                    }
                }
                out
            }

            let mut program = Program::new("prop");
            for inst in build(depth, width) {
                program.add(inst).unwrap();
            }

            program.flatten();
            let once = program.clone();
            program.flatten();
            prop_assert_eq!(once, program.clone());
            prop_assert!(program.is_flat());
        }
    }
}
