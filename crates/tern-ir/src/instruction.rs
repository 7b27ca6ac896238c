//! Circuit instructions combining gates with operands.

use serde::{Deserialize, Serialize};

use crate::gate::StandardGate;
use crate::qubit::QubitId;

/// The kind of instruction in a circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstructionKind {
    /// A quantum gate operation.
    Gate(StandardGate),
    /// Measurement operation.
    Measure,
    /// A nested sub-circuit (subroutine emitted by a front-end).
    ///
    /// Composites are transparent to [`Program::flat_iter`] and are removed
    /// by [`Program::flatten`] before the compilation passes run.
    ///
    /// [`Program::flat_iter`]: crate::program::Program::flat_iter
    /// [`Program::flatten`]: crate::program::Program::flatten
    Composite(Vec<Instruction>),
}

/// A complete instruction with operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The kind of instruction.
    pub kind: InstructionKind,
    /// Qubits this instruction operates on.
    pub qubits: Vec<QubitId>,
    /// Classical register receiving the result (for measure).
    pub register: Option<String>,
    /// Disabled instructions are skipped by iteration and dropped by
    /// [`Program::retain_enabled`].
    ///
    /// [`Program::retain_enabled`]: crate::program::Program::retain_enabled
    pub enabled: bool,
}

impl Instruction {
    /// Create a gate instruction.
    pub fn gate(gate: StandardGate, qubits: impl IntoIterator<Item = QubitId>) -> Self {
        Self {
            kind: InstructionKind::Gate(gate),
            qubits: qubits.into_iter().collect(),
            register: None,
            enabled: true,
        }
    }

    /// Create a single-qubit gate instruction.
    pub fn single_qubit_gate(gate: StandardGate, qubit: QubitId) -> Self {
        Self::gate(gate, [qubit])
    }

    /// Create a two-qubit gate instruction.
    pub fn two_qubit_gate(gate: StandardGate, q1: QubitId, q2: QubitId) -> Self {
        Self::gate(gate, [q1, q2])
    }

    /// Create a measurement instruction targeting the default register.
    pub fn measure(qubit: QubitId) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            register: None,
            enabled: true,
        }
    }

    /// Create a measurement instruction targeting a named register.
    pub fn measure_into(qubit: QubitId, register: impl Into<String>) -> Self {
        Self {
            kind: InstructionKind::Measure,
            qubits: vec![qubit],
            register: Some(register.into()),
            enabled: true,
        }
    }

    /// Create a composite instruction wrapping a sub-circuit.
    ///
    /// The operand list is the union of the children's operands, in order of
    /// first use.
    pub fn composite(children: impl IntoIterator<Item = Instruction>) -> Self {
        let children: Vec<_> = children.into_iter().collect();
        let mut qubits: Vec<QubitId> = Vec::new();
        for child in &children {
            for &q in &child.qubits {
                if !qubits.contains(&q) {
                    qubits.push(q);
                }
            }
        }
        Self {
            kind: InstructionKind::Composite(children),
            qubits,
            register: None,
            enabled: true,
        }
    }

    /// Mark this instruction as disabled.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Check if this is a gate instruction.
    pub fn is_gate(&self) -> bool {
        matches!(self.kind, InstructionKind::Gate(_))
    }

    /// Check if this is a measurement.
    pub fn is_measure(&self) -> bool {
        matches!(self.kind, InstructionKind::Measure)
    }

    /// Check if this is a composite instruction.
    pub fn is_composite(&self) -> bool {
        matches!(self.kind, InstructionKind::Composite(_))
    }

    /// Get the gate if this is a gate instruction.
    pub fn as_gate(&self) -> Option<&StandardGate> {
        match &self.kind {
            InstructionKind::Gate(g) => Some(g),
            _ => None,
        }
    }

    /// Get the name of the instruction.
    pub fn name(&self) -> &str {
        match &self.kind {
            InstructionKind::Gate(g) => g.name(),
            InstructionKind::Measure => "measure",
            InstructionKind::Composite(_) => "composite",
        }
    }
}
