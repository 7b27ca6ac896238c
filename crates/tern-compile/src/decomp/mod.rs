//! Single-qubit decomposition into native equatorial rotations.
//!
//! Any 2x2 unitary can be written as a short product of `Rphi(φ, π/2)`
//! pulses, possibly sandwiched between "free" rotations the hardware never
//! has to execute: a leading Rz is free when the qubit is still in |0⟩, a
//! trailing Rz commutes with measurement, and a trailing Rx commutes with
//! an XX interaction. Each [`Decomp`] family names one combination of free
//! rotations; [`decompose`] searches for the shortest pulse product within
//! a family, escalating the pulse count and falling back to a stricter
//! family when the search misbehaves.

use rand::distributions::Standard;
use rand::Rng;
use tracing::{debug, warn};

use crate::unitary::Unitary2x2;

pub mod lbfgs;
pub mod objective;

pub use lbfgs::{Lbfgs, Minimum, Objective};
pub use objective::DecompObjective;

/// Most rotations ever needed: any 2x2 unitary is reachable with four.
pub const MAX_ROTATIONS: usize = 4;

/// Default acceptance threshold for the objective value.
pub const DEFAULT_THRESHOLD: f64 = 1e-4;

/// Random restarts per rotation count.
const RESTARTS: usize = 3;

/// A decomposition family: which free rotations surround the pulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decomp {
    /// Pulses only; the product must match the goal exactly (up to phase).
    Exact,
    /// Free trailing Rx (absorbed by a following XX interaction).
    Rx,
    /// Free trailing Rz (absorbed by a following measurement).
    Rz,
    /// Free leading Rz (qubit still in |0⟩).
    RzExact,
    /// Free leading Rz and trailing Rx.
    RzRx,
    /// Free leading Rz and trailing Rz.
    RzRz,
}

impl Decomp {
    /// Short name for logging.
    pub fn name(self) -> &'static str {
        match self {
            Decomp::Exact => "exact",
            Decomp::Rx => "rx",
            Decomp::Rz => "rz",
            Decomp::RzExact => "rz-exact",
            Decomp::RzRx => "rz-rx",
            Decomp::RzRz => "rz-rz",
        }
    }

    /// Number of free leading rotations (always Rz when present).
    pub fn free_leading(self) -> usize {
        match self {
            Decomp::RzExact | Decomp::RzRx | Decomp::RzRz => 1,
            Decomp::Exact | Decomp::Rx | Decomp::Rz => 0,
        }
    }

    /// Number of free trailing rotations.
    pub fn free_trailing(self) -> usize {
        match self {
            Decomp::Rx | Decomp::Rz | Decomp::RzRx | Decomp::RzRz => 1,
            Decomp::Exact | Decomp::RzExact => 0,
        }
    }

    /// Whether the trailing free rotation is an Rx.
    pub fn trailing_is_rx(self) -> bool {
        matches!(self, Decomp::Rx | Decomp::RzRx)
    }

    /// Matrix of the free leading rotation.
    pub fn leading_matrix(self, phi: f64) -> Unitary2x2 {
        Unitary2x2::rz(phi)
    }

    /// Matrix of the free trailing rotation.
    pub fn trailing_matrix(self, phi: f64) -> Unitary2x2 {
        if self.trailing_is_rx() {
            Unitary2x2::rx(phi)
        } else {
            Unitary2x2::rz(phi)
        }
    }

    /// Whether a trailing rotation must be carried forward as a tracking
    /// matrix. Only Rx residuals are tracked; a trailing Rz commutes with
    /// everything that can legally follow it and is discarded.
    pub fn tracks_trailing(self) -> bool {
        self.trailing_is_rx()
    }

    /// Degenerate (family, rotation count) combinations with no meaningful
    /// search space: RzRx with one angle has no pulse and no second free
    /// rotation slot, and RzRz with two angles is really one Rz.
    pub fn should_skip(self, rotations: usize) -> bool {
        matches!((self, rotations), (Decomp::RzRx, 1) | (Decomp::RzRz, 2))
    }

    /// The stricter family to try when this one fails to converge.
    pub fn fallback(self) -> Option<Decomp> {
        match self {
            Decomp::RzRx => Some(Decomp::Rx),
            Decomp::RzRz => Some(Decomp::Rz),
            Decomp::RzExact => Some(Decomp::Exact),
            Decomp::Rx | Decomp::Rz => Some(Decomp::Exact),
            Decomp::Exact => None,
        }
    }
}

/// Result of a decomposition search.
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// Azimuthal angles of the physical `Rphi(φ, π/2)` pulses, in order.
    pub angles: Vec<f64>,
    /// Unexecuted trailing rotation to carry forward (identity when none).
    pub residual: Unitary2x2,
}

/// Reduce each angle mod 2π, keeping the sign.
fn angles_mod_tau(angles: &mut [f64]) {
    for a in angles {
        *a %= 2.0 * std::f64::consts::PI;
    }
}

/// Optimize a fixed number of rotations within one family.
///
/// Returns the solved angles and the final objective value. Zero rotations
/// short-circuits the optimizer: the product is the identity, so the
/// objective is just the goal's distance from identity.
fn run_optimizer(
    decomp: Decomp,
    goal: &Unitary2x2,
    rotations: usize,
    threshold: f64,
) -> (Vec<f64>, f64) {
    if rotations == 0 {
        return (vec![], goal.distance_from_identity());
    }

    let objective = DecompObjective::new(decomp, *goal);
    let opt = Lbfgs::default();
    let mut rng = rand::thread_rng();
    let mut init = || {
        (0..rotations)
            .map(|_| rng.sample::<f64, _>(Standard))
            .collect::<Vec<f64>>()
    };

    let mut best = opt.minimize(&objective, init());
    for _ in 1..RESTARTS {
        if best.objective <= threshold {
            break;
        }
        let min = opt.minimize(&objective, init());
        if min.objective < best.objective {
            best = min;
        }
    }

    angles_mod_tau(&mut best.coordinates);
    (best.coordinates, best.objective)
}

/// Decompose a goal unitary into physical pulse angles plus a residual.
///
/// Escalates the rotation count from zero to [`MAX_ROTATIONS`] until the
/// objective drops under `threshold`. A family that still has not converged
/// at the cap falls back to its stricter relative; `Exact` (which has no
/// fallback) accepts the best rotation count seen and warns.
pub fn decompose(mut decomp: Decomp, goal: &Unitary2x2, threshold: f64) -> Decomposition {
    'family: loop {
        debug!(family = decomp.name(), "running decomposition optimizer");

        let mut saved_obj = [f64::INFINITY; MAX_ROTATIONS + 1];
        let mut saved_angles: [Vec<f64>; MAX_ROTATIONS + 1] = Default::default();
        let mut rotations = 0;

        let rotations = loop {
            if decomp.should_skip(rotations) {
                debug!(
                    family = decomp.name(),
                    rotations, "skipping degenerate rotation count"
                );
                rotations += 1;
                continue;
            }

            let (angles, obj) = run_optimizer(decomp, goal, rotations, threshold);
            saved_angles[rotations] = angles;
            saved_obj[rotations] = obj;
            debug!(
                family = decomp.name(),
                rotations, objective = obj, "optimizer finished"
            );

            if obj <= threshold {
                break rotations;
            }
            if rotations == MAX_ROTATIONS {
                if let Some(next) = decomp.fallback() {
                    warn!(
                        family = decomp.name(),
                        fallback = next.name(),
                        "no rotation count converged; falling back to stricter family"
                    );
                    decomp = next;
                    continue 'family;
                }
                let best = (0..=MAX_ROTATIONS)
                    .min_by(|&a, &b| saved_obj[a].total_cmp(&saved_obj[b]))
                    .unwrap_or(0);
                warn!(
                    rotations = best,
                    objective = saved_obj[best],
                    "exact decomposition did not converge; accepting best seen"
                );
                break best;
            }
            rotations += 1;
        };

        let solved = &saved_angles[rotations];
        let free = decomp.free_leading() + decomp.free_trailing();
        let pulses = rotations.saturating_sub(free);
        let angles: Vec<f64> = (0..pulses)
            .map(|i| solved[i + decomp.free_leading()])
            .collect();

        let residual = if rotations > decomp.free_leading() && decomp.free_trailing() == 1 {
            let last = solved[rotations - 1];
            if decomp.tracks_trailing() {
                Unitary2x2::rx(last)
            } else {
                debug!(angle = last, "discarding free trailing rz rotation");
                Unitary2x2::identity()
            }
        } else {
            Unitary2x2::identity()
        };

        return Decomposition { angles, residual };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn reconstruct(d: &Decomposition) -> Unitary2x2 {
        // residual · pulses (any leading Rz is free and not reconstructed)
        let mut u = Unitary2x2::identity();
        for &phi in &d.angles {
            u = Unitary2x2::rphi(phi, FRAC_PI_2).mul(&u);
        }
        d.residual.mul(&u)
    }

    fn infidelity(a: &Unitary2x2, b: &Unitary2x2) -> f64 {
        4.0 - a.hs_overlap(b).norm_sqr()
    }

    #[test]
    fn test_family_table() {
        assert_eq!(Decomp::Exact.free_leading(), 0);
        assert_eq!(Decomp::Exact.free_trailing(), 0);
        assert_eq!(Decomp::RzRx.free_leading(), 1);
        assert_eq!(Decomp::RzRx.free_trailing(), 1);
        assert!(Decomp::RzRx.tracks_trailing());
        assert!(!Decomp::RzRz.tracks_trailing());

        assert!(Decomp::RzRx.should_skip(1));
        assert!(Decomp::RzRz.should_skip(2));
        assert!(!Decomp::RzRx.should_skip(2));
        assert!(!Decomp::Exact.should_skip(1));

        assert_eq!(Decomp::RzRx.fallback(), Some(Decomp::Rx));
        assert_eq!(Decomp::RzRz.fallback(), Some(Decomp::Rz));
        assert_eq!(Decomp::RzExact.fallback(), Some(Decomp::Exact));
        assert_eq!(Decomp::Exact.fallback(), None);
    }

    #[test]
    fn test_identity_decomposes_to_nothing() {
        let d = decompose(Decomp::Exact, &Unitary2x2::identity(), DEFAULT_THRESHOLD);
        assert!(d.angles.is_empty());
        assert!(d.residual.is_identity());
    }

    #[test]
    fn test_exact_x() {
        let d = decompose(Decomp::Exact, &Unitary2x2::x(), 1e-3);
        assert_eq!(d.angles.len(), 2);
        assert!(d.residual.is_identity());
        let got = reconstruct(&d);
        assert!(infidelity(&got, &Unitary2x2::x()) < 1e-2);
    }

    #[test]
    fn test_rx_family_absorbs_x() {
        // X is a pure Rx rotation: zero pulses, tracked Rx(π) residual
        let d = decompose(Decomp::Rx, &Unitary2x2::x(), 1e-3);
        assert!(d.angles.is_empty());
        let got = reconstruct(&d);
        assert!(infidelity(&got, &Unitary2x2::x()) < 1e-2);
    }

    #[test]
    fn test_rz_family_hadamard_single_pulse() {
        let d = decompose(Decomp::Rz, &Unitary2x2::h(), 1e-3);
        assert_eq!(d.angles.len(), 1);
        // Trailing Rz is discarded, not tracked
        assert!(d.residual.is_identity());
        let mut phi = d.angles[0] % (2.0 * PI);
        if phi > PI {
            phi -= 2.0 * PI;
        }
        if phi < -PI {
            phi += 2.0 * PI;
        }
        assert!((phi + FRAC_PI_2).abs() < 1e-2, "phi = {phi}");
    }

    #[test]
    fn test_rzrx_y_no_pulses() {
        let d = decompose(Decomp::RzRx, &Unitary2x2::y(), 1e-3);
        assert!(d.angles.is_empty());
        assert!(!d.residual.is_identity());
    }

    #[test]
    fn test_arbitrary_unitary_reconstructs() {
        // Rz(0.7)·Ry(1.1)·Rz(−0.3) is a generic SU(2) element
        let goal = Unitary2x2::rz(0.7)
            .mul(&Unitary2x2::ry(1.1))
            .mul(&Unitary2x2::rz(-0.3));
        let d = decompose(Decomp::Exact, &goal, 1e-3);
        assert!(d.angles.len() <= MAX_ROTATIONS);
        let got = reconstruct(&d);
        assert!(infidelity(&got, &goal) < 1e-2);
    }
}
