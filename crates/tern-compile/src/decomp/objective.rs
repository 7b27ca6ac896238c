//! Objective function for the decomposition search.

use num_complex::Complex64;
use std::f64::consts::FRAC_PI_2;

use super::lbfgs::Objective;
use super::Decomp;
use crate::unitary::Unitary2x2;

/// Infidelity of a candidate rotation product against a goal unitary.
///
/// For angles `φ0..φn-1` the modeled unitary is the ordered product of one
/// factor per angle, applied leading-free-rotation first, then the hardware
/// pulse templates `Rphi(φ, π/2)`, then the trailing free rotation (which
/// factors exist depends on the family). The objective is
/// `4 − |Tr(goal† · actual)|²`: zero exactly when the product matches the
/// goal up to global phase.
pub struct DecompObjective {
    decomp: Decomp,
    goal: Unitary2x2,
}

impl DecompObjective {
    /// Create an objective for one family and goal.
    pub fn new(decomp: Decomp, goal: Unitary2x2) -> Self {
        Self { decomp, goal }
    }

    /// The hardware pulse template `Rphi(φ, π/2)`.
    fn pulse(phi: f64) -> Unitary2x2 {
        Unitary2x2::rphi(phi, FRAC_PI_2)
    }

    /// Derivative of the pulse template with respect to φ.
    fn pulse_deriv(phi: f64) -> Unitary2x2 {
        let s = 1.0 / 2.0_f64.sqrt();
        Unitary2x2::new(
            Complex64::new(0.0, 0.0),
            Complex64::new(-s * phi.cos(), s * phi.sin()),
            Complex64::new(s * phi.cos(), s * phi.sin()),
            Complex64::new(0.0, 0.0),
        )
    }

    /// Derivative of Rz(φ) with respect to φ.
    fn rz_deriv(phi: f64) -> Unitary2x2 {
        let half = Complex64::new(0.0, 0.5);
        Unitary2x2::new(
            -half * Complex64::from_polar(1.0, -phi / 2.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            half * Complex64::from_polar(1.0, phi / 2.0),
        )
    }

    /// Derivative of Rx(φ) with respect to φ.
    fn rx_deriv(phi: f64) -> Unitary2x2 {
        let c = (phi / 2.0).cos();
        let s = (phi / 2.0).sin();
        Unitary2x2::new(
            Complex64::new(-s / 2.0, 0.0),
            Complex64::new(0.0, -c / 2.0),
            Complex64::new(0.0, -c / 2.0),
            Complex64::new(-s / 2.0, 0.0),
        )
    }

    /// The factor for angle index `k` of an `n`-angle product.
    fn factor(&self, k: usize, n: usize, phi: f64) -> Unitary2x2 {
        if k < self.decomp.free_leading() {
            self.decomp.leading_matrix(phi)
        } else if k + self.decomp.free_trailing() < n {
            Self::pulse(phi)
        } else {
            self.decomp.trailing_matrix(phi)
        }
    }

    /// Derivative of the factor for angle index `k`.
    fn factor_deriv(&self, k: usize, n: usize, phi: f64) -> Unitary2x2 {
        if k < self.decomp.free_leading() {
            Self::rz_deriv(phi)
        } else if k + self.decomp.free_trailing() < n {
            Self::pulse_deriv(phi)
        } else if self.decomp.trailing_is_rx() {
            Self::rx_deriv(phi)
        } else {
            Self::rz_deriv(phi)
        }
    }

    /// The modeled unitary at the given angles.
    pub fn model(&self, angles: &[f64]) -> Unitary2x2 {
        let n = angles.len();
        let mut actual = Unitary2x2::identity();
        for (k, &phi) in angles.iter().enumerate() {
            actual = self.factor(k, n, phi).mul(&actual);
        }
        actual
    }
}

impl Objective for DecompObjective {
    fn evaluate_with_gradient(&self, x: &[f64], grad: &mut [f64]) -> f64 {
        let n = x.len();
        let factors: Vec<Unitary2x2> = x
            .iter()
            .enumerate()
            .map(|(k, &phi)| self.factor(k, n, phi))
            .collect();

        // prefix[k] = M_{k-1} ... M_0, suffix[k] = M_{n-1} ... M_k
        let mut prefix = vec![Unitary2x2::identity(); n + 1];
        for k in 0..n {
            prefix[k + 1] = factors[k].mul(&prefix[k]);
        }
        let mut suffix = vec![Unitary2x2::identity(); n + 1];
        for k in (0..n).rev() {
            suffix[k] = suffix[k + 1].mul(&factors[k]);
        }

        let actual = prefix[n];
        let h = actual.hs_overlap(&self.goal);

        for (k, &phi) in x.iter().enumerate() {
            let deriv = self.factor_deriv(k, n, phi);
            let d_actual = suffix[k + 1].mul(&deriv).mul(&prefix[k]);
            let gh = d_actual.hs_overlap(&self.goal);
            grad[k] = -2.0 * (h.conj() * gh).re;
        }

        4.0 - h.norm_sqr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn finite_diff_check(decomp: Decomp, goal: Unitary2x2, x: &[f64]) {
        let obj = DecompObjective::new(decomp, goal);
        let mut grad = vec![0.0; x.len()];
        obj.evaluate_with_gradient(x, &mut grad);

        let eps = 1e-6;
        for k in 0..x.len() {
            let mut xp = x.to_vec();
            let mut xm = x.to_vec();
            xp[k] += eps;
            xm[k] -= eps;
            let fd = (obj.evaluate(&xp) - obj.evaluate(&xm)) / (2.0 * eps);
            assert!(
                (fd - grad[k]).abs() < 1e-5,
                "{decomp:?} angle {k}: analytic {} vs finite diff {fd}",
                grad[k]
            );
        }
    }

    #[test]
    fn test_gradient_matches_finite_differences() {
        let goal = Unitary2x2::h();
        for decomp in [
            Decomp::Exact,
            Decomp::Rx,
            Decomp::Rz,
            Decomp::RzExact,
            Decomp::RzRx,
            Decomp::RzRz,
        ] {
            finite_diff_check(decomp, goal, &[0.3, 1.1, -0.4, 2.2]);
            finite_diff_check(decomp, goal, &[0.7, 0.2]);
        }
    }

    #[test]
    fn test_exact_x_objective_zero() {
        // Rphi(0)·Rphi(0) = Rx(π) = X up to phase
        let obj = DecompObjective::new(Decomp::Exact, Unitary2x2::x());
        assert!(obj.evaluate(&[0.0, 0.0]) < 1e-12);
    }

    #[test]
    fn test_rz_hadamard_objective_zero() {
        // H = Rz(π)·Rphi(−π/2) up to phase
        let obj = DecompObjective::new(Decomp::Rz, Unitary2x2::h());
        assert!(obj.evaluate(&[-PI / 2.0, PI]) < 1e-12);
    }

    #[test]
    fn test_rzrx_y_objective_zero() {
        // Y = Rx(π)·Rz(π) up to phase
        let obj = DecompObjective::new(Decomp::RzRx, Unitary2x2::y());
        assert!(obj.evaluate(&[PI, PI]) < 1e-12);
    }

    #[test]
    fn test_objective_range() {
        let obj = DecompObjective::new(Decomp::Exact, Unitary2x2::z());
        let v = obj.evaluate(&[0.4, 1.9]);
        assert!((0.0..=4.0 + 1e-9).contains(&v));
    }
}
