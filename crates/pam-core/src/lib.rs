//! # PAM Level Design & BER Analysis
//!
//! Pulse-amplitude modulation for optical intensity-modulated /
//! direct-detection links: constellation level generation, Gray-mapped
//! modulation and threshold demodulation, closed-form Gaussian-tail BER
//! estimation, and decision-threshold spacing optimization against a
//! target BER under a signal-dependent noise model and extinction ratio.
//!
//! ## Signal Flow
//!
//! ```text
//! Optimizer ──(levels, thresholds)──► Power Adjustment ──► Modulator
//!                                            │                 │
//!                                            ▼                 ▼
//!                                      BER Estimator      Demodulator
//! ```
//!
//! ## Example
//!
//! ```rust
//! use pam_core::{LevelSpacing, Pam};
//!
//! // 4-PAM at 25 Gb/s with optimizer-driven level spacing.
//! let mut pam = Pam::new(4, 25e9, LevelSpacing::Optimized).unwrap();
//!
//! // Equalize per-boundary error probability for a 1e-3 BER target,
//! // -10 dB extinction ratio, constant detector noise.
//! let report = pam
//!     .optimize_level_spacing_gauss_approx(1e-3, -10.0, |_| 0.01)
//!     .unwrap();
//! assert!(report.converged);
//!
//! // Scale to 1 mW mean transmit power, then run symbols through.
//! pam.adjust_levels(1e-3, -10.0).unwrap();
//! let (samples, _) = pam.modulate(&[0, 1, 3, 2], 1).unwrap();
//! assert_eq!(pam.demodulate(&samples).unwrap(), vec![0, 1, 3, 2]);
//! ```

pub mod gaussian_tail;
pub mod gray_code;
pub mod level_optimizer;
pub mod pam;
pub mod scalar_solver;

pub use level_optimizer::{GaussApproxOptimizer, OptimizeReport};
pub use pam::{rectangular_pulse, LevelSpacing, Pam, PamError, PulseShape};
pub use scalar_solver::{RootResult, ScalarSolver, SecantSolver};
