//! Gaussian Tail Functions
//!
//! The Q-function `Q(x) = P(Z > x)` for a standard normal `Z`, its inverse,
//! and the complementary error function backing both. These drive the BER
//! estimate (each decision boundary contributes a one-sided tail) and the
//! level-spacing optimizer (which solves `Q(delta/sigma) = Pe` per boundary).
//!
//! Rational approximations only: erfc via Abramowitz & Stegun 7.1.26
//! (absolute error ~1.5e-7), inverse normal CDF via Peter Acklam's
//! approximation (~1.15e-9). Adequate for link-budget work at practical
//! BER targets.
//!
//! ## Example
//!
//! ```rust
//! use pam_core::gaussian_tail::{q, inv_q};
//!
//! assert!((q(0.0) - 0.5).abs() < 1e-7);
//! let z = inv_q(1e-3);
//! assert!((q(z) - 1e-3).abs() < 1e-6);
//! ```

/// Q-function: `Q(x) = 0.5 * erfc(x / sqrt(2))`.
pub fn q(x: f64) -> f64 {
    0.5 * erfc(x / std::f64::consts::SQRT_2)
}

/// Inverse Q-function: returns `z` such that `Q(z) = p`.
///
/// Out-of-range probabilities saturate: `p <= 0` gives `+inf`,
/// `p >= 1` gives `-inf`.
pub fn inv_q(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::INFINITY;
    }
    if p >= 1.0 {
        return f64::NEG_INFINITY;
    }
    // Q(z) = p  <=>  z = Phi^{-1}(1 - p)
    inv_normal_cdf(1.0 - p)
}

/// Complementary error function, Abramowitz & Stegun approximation 7.1.26.
pub fn erfc(x: f64) -> f64 {
    if x < 0.0 {
        return 2.0 - erfc(-x);
    }
    let t = 1.0 / (1.0 + 0.3275911 * x);
    let poly = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    poly * (-x * x).exp()
}

/// Inverse of the standard normal CDF using Peter Acklam's rational
/// approximation. Accurate to ~1.15e-9.
fn inv_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];

    const P_LOW: f64 = 0.02425;
    const P_HIGH: f64 = 1.0 - P_LOW;

    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    if p < P_LOW {
        // Lower region
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= P_HIGH {
        // Central region
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        // Upper region
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_q_at_zero() {
        assert!((q(0.0) - 0.5).abs() < 1e-7);
    }

    #[test]
    fn test_q_symmetry() {
        for &x in &[0.5, 1.0, 2.0, 3.0] {
            assert!((q(x) + q(-x) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_q_known_values() {
        // Q(1) ~ 0.158655, Q(2) ~ 0.0227501, Q(3) ~ 0.00134990
        assert!((q(1.0) - 0.158655).abs() < 1e-4);
        assert!((q(2.0) - 0.0227501).abs() < 1e-5);
        assert!((q(3.0) - 0.00134990).abs() < 1e-5);
    }

    #[test]
    fn test_inv_q_roundtrip() {
        for &p in &[0.4, 0.1, 1e-2, 1e-3, 1e-4] {
            let z = inv_q(p);
            assert!(
                (q(z) - p).abs() / p < 1e-2,
                "roundtrip failed for p={}: q(inv_q(p))={}",
                p,
                q(z)
            );
        }
    }

    #[test]
    fn test_inv_q_saturation() {
        assert!(inv_q(0.0).is_infinite() && inv_q(0.0) > 0.0);
        assert!(inv_q(1.0).is_infinite() && inv_q(1.0) < 0.0);
    }

    #[test]
    fn test_erfc_negative_argument() {
        for &x in &[0.3, 1.2, 2.5] {
            assert!((erfc(-x) + erfc(x) - 2.0).abs() < 1e-6);
        }
    }
}
