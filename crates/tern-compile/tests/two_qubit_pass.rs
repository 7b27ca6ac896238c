//! End-to-end checks for the two-qubit expansion pass.
//!
//! Every expansion is verified against the textbook 4x4 matrix of the
//! source gate, up to global phase, with an ideal (zero-phase) device.

use std::sync::Mutex;

use num_complex::Complex64;

use tern_compile::{MsPhaseMap, Pass, TwoQubitExpansion, Unitary2x2};
use tern_ir::{Program, QubitId, StandardGate};

type M4 = [[Complex64; 4]; 4];

fn zero4() -> M4 {
    [[Complex64::new(0.0, 0.0); 4]; 4]
}

fn mul4(a: &M4, b: &M4) -> M4 {
    let mut out = zero4();
    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                out[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    out
}

/// Embed a one-qubit unitary acting on `wire` (qubit 0 is the low bit).
fn embed(u: &Unitary2x2, wire: usize) -> M4 {
    let mut out = zero4();
    for row in 0..4 {
        for col in 0..4 {
            let (rw, cw) = ((row >> wire) & 1, (col >> wire) & 1);
            let (ro, co) = (row & !(1 << wire), col & !(1 << wire));
            if ro == co {
                out[row][col] = u.data[rw * 2 + cw];
            }
        }
    }
    out
}

/// XX(θ) = exp(−iθ X⊗X).
fn xx4(theta: f64) -> M4 {
    let mut out = zero4();
    for i in 0..4 {
        out[i][i] = Complex64::new(theta.cos(), 0.0);
        out[i][i ^ 0b11] = Complex64::new(0.0, -theta.sin());
    }
    out
}

/// Controlled-U with the given control and target wires.
fn controlled(u: &Unitary2x2, control: usize, target: usize) -> M4 {
    let mut out = zero4();
    for row in 0..4 {
        for col in 0..4 {
            if (row >> control) & 1 != (col >> control) & 1 {
                continue;
            }
            if (col >> control) & 1 == 0 {
                if row == col {
                    out[row][col] = Complex64::new(1.0, 0.0);
                }
            } else {
                let (rw, cw) = ((row >> target) & 1, (col >> target) & 1);
                if row & !(1 << target) == col & !(1 << target) {
                    out[row][col] = u.data[rw * 2 + cw];
                }
            }
        }
    }
    out
}

fn swap4() -> M4 {
    let mut out = zero4();
    for col in 0..4 {
        let row = ((col & 1) << 1) | (col >> 1);
        out[row][col] = Complex64::new(1.0, 0.0);
    }
    out
}

/// The full unitary of a measurement-free program on two qubits.
fn program_unitary(program: &Program) -> M4 {
    let mut total = zero4();
    for i in 0..4 {
        total[i][i] = Complex64::new(1.0, 0.0);
    }
    for inst in program.instructions() {
        let gate = inst.as_gate().expect("gate-only program");
        let m = match gate {
            StandardGate::Xx(theta) => xx4(*theta),
            g => {
                let u = Unitary2x2::from_gate(g).expect("one-qubit gate");
                embed(&u, inst.qubits[0].0 as usize)
            }
        };
        total = mul4(&m, &total);
    }
    total
}

fn assert_equiv_up_to_phase(got: &M4, want: &M4) {
    let mut pivot = (0, 0);
    for i in 0..4 {
        for j in 0..4 {
            if want[i][j].norm() > want[pivot.0][pivot.1].norm() {
                pivot = (i, j);
            }
        }
    }
    let phase = got[pivot.0][pivot.1] / want[pivot.0][pivot.1];
    assert!(
        (phase.norm() - 1.0).abs() < 1e-9,
        "matrices differ in magnitude, phase = {phase}"
    );
    for i in 0..4 {
        for j in 0..4 {
            let diff = (got[i][j] - phase * want[i][j]).norm();
            assert!(diff < 1e-9, "entry ({i}, {j}) off by {diff}");
        }
    }
}

fn expand(program: &mut Program) {
    TwoQubitExpansion::new(MsPhaseMap::zeros(2))
        .run(program)
        .unwrap();
}

#[test]
fn test_cnot_matches_reference() {
    let mut program = Program::new("cnot");
    program.cnot(QubitId(0), QubitId(1)).unwrap();
    expand(&mut program);
    assert_equiv_up_to_phase(&program_unitary(&program), &controlled(&Unitary2x2::x(), 0, 1));
}

#[test]
fn test_cnot_reversed_operands() {
    let mut program = Program::new("cnot-rev");
    program.cnot(QubitId(1), QubitId(0)).unwrap();
    expand(&mut program);
    assert_equiv_up_to_phase(&program_unitary(&program), &controlled(&Unitary2x2::x(), 1, 0));
}

#[test]
fn test_ch_matches_reference() {
    let mut program = Program::new("ch");
    program.ch(QubitId(0), QubitId(1)).unwrap();
    expand(&mut program);
    assert_equiv_up_to_phase(&program_unitary(&program), &controlled(&Unitary2x2::h(), 0, 1));
}

#[test]
fn test_cy_matches_reference() {
    let mut program = Program::new("cy");
    program.cy(QubitId(0), QubitId(1)).unwrap();
    expand(&mut program);
    assert_equiv_up_to_phase(&program_unitary(&program), &controlled(&Unitary2x2::y(), 0, 1));
}

#[test]
fn test_cz_matches_reference() {
    let mut program = Program::new("cz");
    program.cz(QubitId(1), QubitId(0)).unwrap();
    expand(&mut program);
    assert_equiv_up_to_phase(&program_unitary(&program), &controlled(&Unitary2x2::z(), 1, 0));
}

#[test]
fn test_swap_matches_reference() {
    let mut program = Program::new("swap");
    program.swap(QubitId(0), QubitId(1)).unwrap();
    expand(&mut program);
    assert_equiv_up_to_phase(&program_unitary(&program), &swap4());
}

#[test]
fn test_swap_uses_three_interactions() {
    let mut program = Program::new("swap");
    program.swap(QubitId(0), QubitId(1)).unwrap();
    expand(&mut program);
    let xx_count = program
        .instructions()
        .iter()
        .filter(|i| i.name() == "xx")
        .count();
    assert_eq!(xx_count, 3);
    assert_eq!(program.len(), 15);
}

#[test]
fn test_native_xx_untouched() {
    let mut program = Program::new("native");
    program
        .xx(std::f64::consts::FRAC_PI_4, QubitId(0), QubitId(1))
        .unwrap();
    let before = program.clone();
    expand(&mut program);
    assert_eq!(before, program);
}

#[test]
fn test_rewrite_log_reports_each_expansion() {
    let log: &'static Mutex<Vec<(usize, usize)>> = Box::leak(Box::new(Mutex::new(vec![])));
    let pass = TwoQubitExpansion::new(MsPhaseMap::zeros(2)).with_rewrite_log(Box::new(
        |old: &[_], new: &[_]| {
            log.lock().unwrap().push((old.len(), new.len()));
        },
    ));

    let mut program = Program::new("logged");
    program.h(QubitId(0)).unwrap();
    program.cnot(QubitId(0), QubitId(1)).unwrap();
    program.cz(QubitId(0), QubitId(1)).unwrap();
    pass.run(&mut program).unwrap();

    assert_eq!(*log.lock().unwrap(), vec![(1, 5), (1, 7)]);
}
