//! Level-Spacing Optimizer (Gauss Approximation)
//!
//! Finds PAM levels and decision thresholds that equalize the local
//! Gaussian-tail error probability across all M-1 decision boundaries for a
//! signal-dependent noise model. Because the noise standard deviation
//! depends on the level and threshold values being solved for, there is no
//! closed form: the optimizer runs a fixed-point iteration over the level
//! vector in which every boundary requires two scalar root solves —
//!
//! 1. threshold search: `Q(delta / sigma(a_i)) = Pe`, placing
//!    `b_i = a_i + |delta|`
//! 2. next-level search: `Q(delta / sigma(b_i + |delta|)) = Pe`, placing
//!    `a_{i+1} = b_i + |delta|` — the noise is evaluated at the unknown
//!    point itself, a nested fixed point inside the root solve
//!
//! Each outer pass re-pins the bottom level to `rex * a_top` so the
//! extinction ratio holds at convergence. The loop stops when the Euclidean
//! norm of the level change drops to the tolerance or the iteration cap is
//! reached; hitting the cap is not an error — the returned report carries a
//! `converged` flag and the full tolerance history.
//!
//! ## Example
//!
//! ```rust
//! use pam_core::level_optimizer::GaussApproxOptimizer;
//!
//! let optimizer = GaussApproxOptimizer::new();
//! // Constant noise: optimized spacing degenerates to equal gaps.
//! let (levels, thresholds, report) = optimizer
//!     .optimize(4, 1e-3, -10.0, |_| 0.01)
//!     .unwrap();
//! assert!(report.converged);
//! assert_eq!(levels.len(), 4);
//! assert_eq!(thresholds.len(), 3);
//! assert!((levels[3] - 1.0).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};

use crate::gaussian_tail::q;
use crate::pam::{LevelSpacing, Pam, PamError};
use crate::scalar_solver::{ScalarSolver, SecantSolver};

/// Convergence record of one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeReport {
    /// Whether the level change dropped to the tolerance inside the cap.
    pub converged: bool,
    /// Outer iterations performed.
    pub iterations: usize,
    /// `||levels - previous||_2` per outer iteration.
    pub tolerance_history: Vec<f64>,
}

/// Fixed-point level-spacing optimizer over the Gaussian-tail approximation.
///
/// Generic over the scalar root-finding backend; defaults to
/// [`SecantSolver`].
#[derive(Debug, Clone)]
pub struct GaussApproxOptimizer<S = SecantSolver> {
    /// Convergence threshold on the level-change norm (default 1e-6).
    pub tolerance: f64,
    /// Outer iteration cap (default 20).
    pub max_iterations: usize,
    solver: S,
}

impl GaussApproxOptimizer<SecantSolver> {
    /// Optimizer with the default secant backend.
    pub fn new() -> Self {
        Self::with_solver(SecantSolver::default())
    }
}

impl Default for GaussApproxOptimizer<SecantSolver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ScalarSolver> GaussApproxOptimizer<S> {
    /// Optimizer with a caller-supplied root-finding backend.
    pub fn with_solver(solver: S) -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 20,
            solver,
        }
    }

    /// Compute optimized levels and thresholds for an M-ary constellation.
    ///
    /// `ber_target` is converted to the per-boundary error budget
    /// `Pe = log2(M) * ber_target * M / (2(M-1))`, which must land in
    /// `(0, 0.5)`. `noise_std` maps a signal level to its noise standard
    /// deviation and must be strictly positive. The returned vectors are
    /// normalized to a unit top level.
    ///
    /// Root-finder non-convergence at a boundary is recoverable: a warning
    /// is emitted and the best estimate is used.
    pub fn optimize<F: Fn(f64) -> f64>(
        &self,
        order: usize,
        ber_target: f64,
        extinction_ratio_db: f64,
        noise_std: F,
    ) -> Result<(Vec<f64>, Vec<f64>, OptimizeReport), PamError> {
        if order < 2 || !order.is_power_of_two() {
            return Err(PamError::InvalidOrder { order });
        }
        let m = order;
        let bits = order.trailing_zeros() as f64;
        let pe = bits * ber_target * m as f64 / (2.0 * (m - 1) as f64);
        if !(pe > 0.0 && pe < 0.5) {
            return Err(PamError::InvalidBerTarget { target: ber_target });
        }
        let rex = 10f64.powf(-extinction_ratio_db.abs() / 10.0);

        let mut a = vec![0.0f64; m];
        let mut b = vec![0.0f64; m - 1];
        let mut history = Vec::new();
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.max_iterations {
            let prev = a.clone();
            a[0] = a[m - 1] * rex;

            for i in 0..m - 1 {
                // Threshold search at the current level's noise.
                let sigma = noise_std(a[i]);
                let res = self.solver.solve(|d| q(d.abs() / sigma) - pe, 0.0);
                if !res.converged {
                    tracing::warn!(
                        boundary = i,
                        residual = res.residual,
                        "threshold search did not converge, using best estimate"
                    );
                }
                b[i] = a[i] + res.root.abs();

                // Next-level search: noise evaluated at the unknown point.
                let b_i = b[i];
                let res = self
                    .solver
                    .solve(|d| q(d.abs() / noise_std(b_i + d.abs())) - pe, 0.0);
                if !res.converged {
                    tracing::warn!(
                        boundary = i,
                        residual = res.residual,
                        "level search did not converge, using best estimate"
                    );
                }
                a[i + 1] = b_i + res.root.abs();
            }

            let tol = a
                .iter()
                .zip(prev.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt();
            history.push(tol);
            iterations += 1;
            tracing::debug!(iteration = iterations, tol, "level spacing pass");

            if tol <= self.tolerance {
                converged = true;
                break;
            }
        }

        let top = a[m - 1];
        if top <= 0.0 {
            return Err(PamError::NonPositiveTopLevel { top });
        }
        for x in &mut a {
            *x /= top;
        }
        for x in &mut b {
            *x /= top;
        }

        Ok((
            a,
            b,
            OptimizeReport {
                converged,
                iterations,
                tolerance_history: history,
            },
        ))
    }
}

impl Pam {
    /// Optimize this model's level spacing for a target BER, extinction
    /// ratio and noise model, storing the normalized result in the model.
    ///
    /// Only valid in [`LevelSpacing::Optimized`] mode — the equally-spaced
    /// mode's geometry is closed form and is never optimizer-populated.
    pub fn optimize_level_spacing_gauss_approx<F: Fn(f64) -> f64>(
        &mut self,
        ber_target: f64,
        extinction_ratio_db: f64,
        noise_std: F,
    ) -> Result<OptimizeReport, PamError> {
        if self.spacing() != LevelSpacing::Optimized {
            return Err(PamError::SpacingMismatch {
                required: LevelSpacing::Optimized,
                actual: self.spacing(),
            });
        }
        let optimizer = GaussApproxOptimizer::new();
        let (levels, thresholds, report) =
            optimizer.optimize(self.order(), ber_target, extinction_ratio_db, noise_std)?;
        self.set_levels(levels, thresholds)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gaussian_tail::inv_q;

    #[test]
    fn test_constant_noise_equal_gaps() {
        let optimizer = GaussApproxOptimizer::new();
        let sigma = 0.01;
        let (levels, thresholds, report) =
            optimizer.optimize(4, 1e-3, -10.0, |_| sigma).unwrap();

        assert!(report.converged);
        assert!(report.iterations <= 20);
        assert!((levels[3] - 1.0).abs() < 1e-12);

        // Constant noise puts every boundary the same distance apart.
        let gaps: Vec<f64> = levels.windows(2).map(|w| w[1] - w[0]).collect();
        for g in &gaps {
            assert!((g - gaps[0]).abs() < 1e-4 * gaps[0]);
        }
        // Thresholds sit midway in each gap.
        for i in 0..3 {
            let mid = 0.5 * (levels[i] + levels[i + 1]);
            assert!((thresholds[i] - mid).abs() < 1e-4 * gaps[0]);
        }
    }

    #[test]
    fn test_extinction_ratio_enforced() {
        let optimizer = GaussApproxOptimizer::new();
        let er_db: f64 = -10.0;
        let rex = 10f64.powf(-er_db.abs() / 10.0);
        let (levels, _, report) = optimizer.optimize(4, 1e-3, er_db, |_| 0.01).unwrap();
        assert!(report.converged);
        assert!((levels[0] / levels[3] - rex).abs() < 1e-4);
    }

    #[test]
    fn test_tolerance_history_non_increasing() {
        let optimizer = GaussApproxOptimizer::new();
        let (_, _, report) = optimizer.optimize(4, 1e-3, -10.0, |_| 0.01).unwrap();
        assert!(!report.tolerance_history.is_empty());
        assert_eq!(report.iterations, report.tolerance_history.len());
        for w in report.tolerance_history.windows(2) {
            assert!(w[1] <= w[0] + 1e-12);
        }
        assert!(*report.tolerance_history.last().unwrap() <= optimizer.tolerance);
    }

    #[test]
    fn test_constant_noise_matches_closed_form() {
        // With sigma constant the per-gap distance is 2 * sigma * Q^{-1}(Pe)
        // and the fixed point for the bottom level is rex*6d/(1-rex) (4-PAM).
        let optimizer = GaussApproxOptimizer::new();
        let sigma = 0.01;
        let ber_target = 1e-3;
        let er_db: f64 = -10.0;
        let rex = 10f64.powf(-er_db.abs() / 10.0);
        let pe = 2.0 * ber_target * 4.0 / 6.0;
        let d = sigma * inv_q(pe);

        let (levels, _, _) = optimizer.optimize(4, ber_target, er_db, |_| sigma).unwrap();

        let a0 = rex * 6.0 * d / (1.0 - rex);
        let top = a0 + 6.0 * d;
        for (i, &lvl) in levels.iter().enumerate() {
            let expected = (a0 + 2.0 * d * i as f64) / top;
            assert!(
                (lvl - expected).abs() < 1e-3 * expected.max(1e-3),
                "level {}: {} vs {}",
                i,
                lvl,
                expected
            );
        }
    }

    #[test]
    fn test_signal_dependent_noise_widens_upper_gaps() {
        // Noise grows with signal level; upper boundaries need more room.
        let optimizer = GaussApproxOptimizer::new();
        let (levels, _, report) = optimizer
            .optimize(4, 1e-3, -10.0, |x| 0.005 + 0.03 * x)
            .unwrap();
        assert!(report.converged);
        let gaps: Vec<f64> = levels.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(gaps[0] < gaps[1]);
        assert!(gaps[1] < gaps[2]);
    }

    #[test]
    fn test_invalid_ber_target_rejected() {
        let optimizer = GaussApproxOptimizer::new();
        assert!(matches!(
            optimizer.optimize(4, 0.0, -10.0, |_| 0.01),
            Err(PamError::InvalidBerTarget { .. })
        ));
        // Budget lands at or above 0.5 per boundary.
        assert!(matches!(
            optimizer.optimize(4, 0.4, -10.0, |_| 0.01),
            Err(PamError::InvalidBerTarget { .. })
        ));
    }

    #[test]
    fn test_pam_method_populates_model() {
        let mut pam = Pam::new(4, 25e9, LevelSpacing::Optimized).unwrap();
        let report = pam
            .optimize_level_spacing_gauss_approx(1e-3, -10.0, |_| 0.01)
            .unwrap();
        assert!(report.converged);
        assert_eq!(pam.levels().len(), 4);
        assert_eq!(pam.thresholds().len(), 3);
        assert!((pam.levels()[3] - 1.0).abs() < 1e-12);

        // Round-trip through the populated model.
        let symbols = vec![0usize, 1, 2, 3];
        let (samples, _) = pam.modulate(&symbols, 1).unwrap();
        assert_eq!(pam.demodulate(&samples).unwrap(), symbols);
    }

    #[test]
    fn test_pam_method_requires_optimized_mode() {
        let mut pam = Pam::new(4, 25e9, LevelSpacing::EquallySpaced).unwrap();
        assert!(matches!(
            pam.optimize_level_spacing_gauss_approx(1e-3, -10.0, |_| 0.01),
            Err(PamError::SpacingMismatch { .. })
        ));
    }

    #[test]
    fn test_optimized_levels_hit_target_ber() {
        // The produced spacing, evaluated by the closed-form estimator at
        // transmit scale, should land near the requested BER.
        let ber_target = 1e-3;
        let mut pam = Pam::new(4, 25e9, LevelSpacing::Optimized).unwrap();
        // Noise model in transmit units, constant floor.
        let sigma = 0.01;
        pam.optimize_level_spacing_gauss_approx(ber_target, -10.0, |_| sigma)
            .unwrap();

        // Evaluate without rescaling: levels are in the same normalized
        // units the optimizer solved in, scaled by the final top level.
        // Rescale sigma identically so geometry and noise stay consistent.
        let top_before = {
            let pe = 2.0 * ber_target * 4.0 / 6.0;
            let d = sigma * inv_q(pe);
            let rex = 0.1;
            rex * 6.0 * d / (1.0 - rex) + 6.0 * d
        };
        let ber = pam.ber_awgn(|_| sigma / top_before).unwrap();
        assert!(
            (ber - ber_target).abs() < 0.2 * ber_target,
            "ber {} vs target {}",
            ber,
            ber_target
        );
    }
}
