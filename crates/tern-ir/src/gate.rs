//! Quantum gate types.

use serde::{Deserialize, Serialize};

/// Standard gates with known semantics.
///
/// This is a closed vocabulary: the trapped-ion backend matches on it
/// exhaustively, so every gate a front-end can produce is listed here.
/// `Rphi` and `Xx` are the hardware-native operations; everything else is
/// rewritten into them by the compilation passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Native equatorial rotation Rphi(φ, θ): rotation by θ about the axis
    /// at azimuthal angle φ in the XY plane. Hardware uses θ = π/2.
    Rphi(f64, f64),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    Cnot,
    /// Controlled-Hadamard gate.
    Ch,
    /// Controlled-Y gate.
    Cy,
    /// Controlled-Z gate.
    Cz,
    /// SWAP gate.
    Swap,
    /// iSWAP gate. No native expansion exists for it; the two-qubit pass
    /// rejects it as unsupported.
    ISwap,
    /// Native Mølmer–Sørensen interaction XX(θ).
    Xx(f64),
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::Rphi(_, _) => "rphi",
            StandardGate::Cnot => "cnot",
            StandardGate::Ch => "ch",
            StandardGate::Cy => "cy",
            StandardGate::Cz => "cz",
            StandardGate::Swap => "swap",
            StandardGate::ISwap => "iswap",
            StandardGate::Xx(_) => "xx",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::Rphi(_, _) => 1,

            StandardGate::Cnot
            | StandardGate::Ch
            | StandardGate::Cy
            | StandardGate::Cz
            | StandardGate::Swap
            | StandardGate::ISwap
            | StandardGate::Xx(_) => 2,
        }
    }

    /// Get the angle parameters of this gate.
    pub fn params(&self) -> Vec<f64> {
        match self {
            StandardGate::Rx(theta) | StandardGate::Ry(theta) | StandardGate::Rz(theta) => {
                vec![*theta]
            }
            StandardGate::Rphi(phi, theta) => vec![*phi, *theta],
            StandardGate::Xx(theta) => vec![*theta],
            _ => vec![],
        }
    }
}
