//! Scalar Root Finding
//!
//! Derivative-free solution of `f(x) = 0` for smooth one-dimensional
//! objectives, behind a small capability trait so the numeric backend can be
//! swapped without touching callers. The default backend is a secant
//! iteration with a bisection safeguard: once two evaluations bracket a sign
//! change, any secant step that escapes the bracket is replaced by its
//! midpoint, which keeps the search stable on objectives that are flat far
//! from the root (the Gaussian tail is exactly that shape).
//!
//! Non-convergence is reported, never panicked on: the result carries the
//! best estimate together with a `converged` flag.
//!
//! ## Example
//!
//! ```rust
//! use pam_core::scalar_solver::{ScalarSolver, SecantSolver};
//!
//! let solver = SecantSolver::default();
//! let res = solver.solve(|x| x * x - 2.0, 1.0);
//! assert!(res.converged);
//! assert!((res.root - 2.0_f64.sqrt()).abs() < 1e-9);
//! ```

/// Outcome of a scalar root search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootResult {
    /// Best root estimate (last iterate).
    pub root: f64,
    /// Whether the iteration met the step tolerance.
    pub converged: bool,
    /// Number of iterations performed.
    pub iterations: usize,
    /// `|f(root)|` at the returned estimate.
    pub residual: f64,
}

/// Capability trait for scalar equation solvers.
pub trait ScalarSolver {
    /// Find `x` with `f(x) = 0`, starting from `guess`.
    fn solve<F: Fn(f64) -> f64>(&self, f: F, guess: f64) -> RootResult;
}

/// Secant iteration with a bisection safeguard.
#[derive(Debug, Clone, Copy)]
pub struct SecantSolver {
    /// Convergence threshold on the step size (default 1e-10).
    pub tolerance: f64,
    /// Maximum iterations before giving up (default 100).
    pub max_iterations: usize,
    /// Offset used to obtain the second starting point (default 1e-4).
    pub initial_step: f64,
}

impl Default for SecantSolver {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100,
            initial_step: 1e-4,
        }
    }
}

impl ScalarSolver for SecantSolver {
    fn solve<F: Fn(f64) -> f64>(&self, f: F, guess: f64) -> RootResult {
        let mut x0 = guess;
        let mut f0 = f(x0);
        if f0 == 0.0 {
            return RootResult {
                root: x0,
                converged: true,
                iterations: 0,
                residual: 0.0,
            };
        }

        let mut x1 = guess + self.initial_step;
        let mut f1 = f(x1);

        // Sign-change bracket, once observed: (lo, f(lo), hi, f(hi)).
        let mut bracket: Option<(f64, f64, f64, f64)> = None;

        for iter in 1..=self.max_iterations {
            if bracket.is_none() && f0.signum() != f1.signum() {
                bracket = Some(if x0 < x1 {
                    (x0, f0, x1, f1)
                } else {
                    (x1, f1, x0, f0)
                });
            }

            if f1 == 0.0 || (x1 - x0).abs() <= self.tolerance * (1.0 + x1.abs()) {
                return RootResult {
                    root: x1,
                    converged: true,
                    iterations: iter,
                    residual: f1.abs(),
                };
            }

            let denom = f1 - f0;
            let mut x2 = if denom.abs() > f64::MIN_POSITIVE {
                x1 - f1 * (x1 - x0) / denom
            } else {
                f64::NAN
            };

            // Fall back to bisection (or expansion, pre-bracket) when the
            // secant step is unusable or escapes the bracket.
            match bracket {
                Some((lo, _, hi, _)) => {
                    if !x2.is_finite() || x2 <= lo || x2 >= hi {
                        x2 = 0.5 * (lo + hi);
                    }
                }
                None => {
                    if !x2.is_finite() {
                        x2 = x1 + 2.0 * (x1 - x0);
                    }
                }
            }

            x0 = x1;
            f0 = f1;
            x1 = x2;
            f1 = f(x1);

            // Shrink the bracket around the new evaluation.
            if let Some((lo, flo, hi, fhi)) = bracket {
                if x1 > lo && x1 < hi {
                    bracket = Some(if flo.signum() != f1.signum() {
                        (lo, flo, x1, f1)
                    } else {
                        (x1, f1, hi, fhi)
                    });
                }
            }
        }

        RootResult {
            root: x1,
            converged: false,
            iterations: self.max_iterations,
            residual: f1.abs(),
        }
    }
}
