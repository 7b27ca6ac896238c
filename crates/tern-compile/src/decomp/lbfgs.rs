//! Limited-memory BFGS minimizer.
//!
//! Small dense problems only: the decomposition search optimizes at most
//! four angles at a time, so a hand-rolled two-loop recursion with Armijo
//! backtracking is all that is needed. The best coordinates seen across
//! every evaluation (line-search trials included) are what gets returned,
//! not the final iterate.

use std::collections::VecDeque;

/// A differentiable objective function.
pub trait Objective {
    /// Evaluate the objective at `x`, writing the gradient into `grad`.
    fn evaluate_with_gradient(&self, x: &[f64], grad: &mut [f64]) -> f64;

    /// Evaluate the objective only.
    fn evaluate(&self, x: &[f64]) -> f64 {
        let mut grad = vec![0.0; x.len()];
        self.evaluate_with_gradient(x, &mut grad)
    }
}

/// The best point found by a minimization run.
#[derive(Debug, Clone)]
pub struct Minimum {
    /// Coordinates of the best point.
    pub coordinates: Vec<f64>,
    /// Objective value at the best point.
    pub objective: f64,
}

/// L-BFGS minimizer configuration.
#[derive(Debug, Clone)]
pub struct Lbfgs {
    /// Number of curvature pairs kept for the two-loop recursion.
    pub memory: usize,
    /// Iteration cap. This is the only time bound on a run.
    pub max_iters: usize,
    /// Stop once the gradient norm falls below this.
    pub grad_tolerance: f64,
}

impl Default for Lbfgs {
    fn default() -> Self {
        Self {
            memory: 15,
            max_iters: 200,
            grad_tolerance: 1e-10,
        }
    }
}

const ARMIJO_C1: f64 = 1e-4;
const MIN_STEP: f64 = 1e-16;
const CURVATURE_EPS: f64 = 1e-12;

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

impl Lbfgs {
    /// Minimize `f` starting from `x0`.
    pub fn minimize<F: Objective + ?Sized>(&self, f: &F, x0: Vec<f64>) -> Minimum {
        let n = x0.len();
        let mut x = x0;
        let mut grad = vec![0.0; n];
        let mut fx = f.evaluate_with_gradient(&x, &mut grad);

        let mut best = Minimum {
            coordinates: x.clone(),
            objective: fx,
        };

        // (s, y, rho) curvature pairs, oldest first
        let mut pairs: VecDeque<(Vec<f64>, Vec<f64>, f64)> = VecDeque::new();

        for _ in 0..self.max_iters {
            if norm(&grad) < self.grad_tolerance {
                break;
            }

            // Two-loop recursion for the search direction
            let mut q = grad.clone();
            let mut alphas = Vec::with_capacity(pairs.len());
            for (s, y, rho) in pairs.iter().rev() {
                let alpha = rho * dot(s, &q);
                for (qi, yi) in q.iter_mut().zip(y) {
                    *qi -= alpha * yi;
                }
                alphas.push(alpha);
            }
            if let Some((s, y, _)) = pairs.back() {
                let gamma = dot(s, y) / dot(y, y);
                for qi in &mut q {
                    *qi *= gamma;
                }
            }
            for ((s, y, rho), alpha) in pairs.iter().zip(alphas.iter().rev()) {
                let beta = rho * dot(y, &q);
                for (qi, si) in q.iter_mut().zip(s) {
                    *qi += (alpha - beta) * si;
                }
            }
            let mut dir: Vec<f64> = q.iter().map(|qi| -qi).collect();

            // Fall back to steepest descent if the direction is not one
            let mut slope = dot(&grad, &dir);
            if slope >= 0.0 {
                dir = grad.iter().map(|g| -g).collect();
                slope = dot(&grad, &dir);
            }

            // Armijo backtracking
            let mut step = 1.0;
            let mut accepted = None;
            let mut grad_new = vec![0.0; n];
            while step >= MIN_STEP {
                let x_new: Vec<f64> = x.iter().zip(&dir).map(|(xi, di)| xi + step * di).collect();
                let fx_new = f.evaluate_with_gradient(&x_new, &mut grad_new);
                if fx_new < best.objective {
                    best.coordinates = x_new.clone();
                    best.objective = fx_new;
                }
                if fx_new <= fx + ARMIJO_C1 * step * slope {
                    accepted = Some((x_new, fx_new));
                    break;
                }
                step *= 0.5;
            }
            let Some((x_new, fx_new)) = accepted else {
                break;
            };

            let s: Vec<f64> = x_new.iter().zip(&x).map(|(a, b)| a - b).collect();
            let y: Vec<f64> = grad_new.iter().zip(&grad).map(|(a, b)| a - b).collect();
            let sy = dot(&s, &y);
            if sy > CURVATURE_EPS {
                if pairs.len() == self.memory {
                    pairs.pop_front();
                }
                pairs.push_back((s, y, 1.0 / sy));
            }

            let progress = fx - fx_new;
            x = x_new;
            fx = fx_new;
            grad.copy_from_slice(&grad_new);

            if progress.abs() < 1e-15 {
                break;
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Quadratic;

    impl Objective for Quadratic {
        fn evaluate_with_gradient(&self, x: &[f64], grad: &mut [f64]) -> f64 {
            // f(x) = sum (x_i - i)^2
            let mut f = 0.0;
            for (i, (xi, gi)) in x.iter().zip(grad.iter_mut()).enumerate() {
                let d = xi - i as f64;
                f += d * d;
                *gi = 2.0 * d;
            }
            f
        }
    }

    struct Rosenbrock;

    impl Objective for Rosenbrock {
        fn evaluate_with_gradient(&self, x: &[f64], grad: &mut [f64]) -> f64 {
            let (a, b) = (x[0], x[1]);
            grad[0] = -2.0 * (1.0 - a) - 400.0 * a * (b - a * a);
            grad[1] = 200.0 * (b - a * a);
            (1.0 - a).powi(2) + 100.0 * (b - a * a).powi(2)
        }
    }

    #[test]
    fn test_quadratic() {
        let min = Lbfgs::default().minimize(&Quadratic, vec![5.0, -3.0, 0.1]);
        assert!(min.objective < 1e-10);
        for (i, xi) in min.coordinates.iter().enumerate() {
            assert!((xi - i as f64).abs() < 1e-5);
        }
    }

    #[test]
    fn test_rosenbrock() {
        let opt = Lbfgs {
            max_iters: 1000,
            ..Lbfgs::default()
        };
        let min = opt.minimize(&Rosenbrock, vec![-1.2, 1.0]);
        assert!(min.objective < 1e-8, "objective {}", min.objective);
        assert!((min.coordinates[0] - 1.0).abs() < 1e-3);
        assert!((min.coordinates[1] - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_zero_dimensional() {
        let min = Lbfgs::default().minimize(&Quadratic, vec![]);
        assert_eq!(min.objective, 0.0);
        assert!(min.coordinates.is_empty());
    }
}
