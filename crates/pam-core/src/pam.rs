//! PAM Model (Levels, Thresholds, Modulation, BER)
//!
//! An M-ary pulse-amplitude constellation for optical intensity-modulated
//! links: an ascending vector of amplitude levels, the M-1 decision
//! thresholds between them, and the operations that consume them:
//!
//! - **Power adjustment**: rescale a normalized constellation to a target
//!   transmit power under a given extinction ratio
//! - **Modulator**: Gray symbol index → level, replicated over the
//!   oversampled symbol period with a pulse-shape weight
//! - **Demodulator**: sample → threshold count → Gray symbol index
//! - **BER estimator**: closed-form Gaussian-tail approximation under a
//!   signal-dependent noise model
//!
//! Levels are kept normalized so the top level is 1 until
//! [`adjust_levels`](Pam::adjust_levels) maps them to transmitted power.
//! In [`LevelSpacing::Optimized`] mode the vectors start empty and must be
//! populated by the level-spacing optimizer before use.
//!
//! ## Example
//!
//! ```rust
//! use pam_core::pam::{Pam, LevelSpacing};
//!
//! let pam = Pam::new(4, 10e9, LevelSpacing::EquallySpaced).unwrap();
//! assert_eq!(pam.levels(), &[0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0]);
//!
//! let (samples, _) = pam.modulate(&[0, 1, 3, 2], 1).unwrap();
//! assert_eq!(pam.demodulate(&samples).unwrap(), vec![0, 1, 3, 2]);
//! ```

use serde::{Deserialize, Serialize};

use crate::gaussian_tail::q;
use crate::gray_code::GrayCode;

/// Pulse-shape weight per sample offset within a symbol period.
///
/// Assumed zero outside `[0, oversampling)` — overlapping shapes are out of
/// scope and produce undefined results.
pub type PulseShape = fn(usize) -> f64;

/// Rectangular (NRZ) pulse: constant unit weight.
pub fn rectangular_pulse(_offset: usize) -> f64 {
    1.0
}

/// How the constellation's levels and thresholds are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelSpacing {
    /// Uniform level spacing in amplitude, closed form.
    EquallySpaced,
    /// Spacing produced by the Gauss-approximation level optimizer.
    Optimized,
}

/// Error type for PAM model failures.
#[derive(Debug, Clone, PartialEq)]
pub enum PamError {
    /// Constellation size is not a power of two >= 2.
    InvalidOrder { order: usize },
    /// Levels/thresholds used before being populated (Optimized mode).
    LevelsNotReady,
    /// Level or threshold vector has the wrong length for the order.
    DimensionMismatch { levels: usize, thresholds: usize },
    /// Levels not strictly ascending, or a threshold outside its level gap.
    NonAscendingLevels,
    /// Top level must be positive to normalize by it.
    NonPositiveTopLevel { top: f64 },
    /// Target transmit power must be positive.
    InvalidTargetPower { power: f64 },
    /// BER target maps to a per-boundary error budget outside (0, 0.5).
    InvalidBerTarget { target: f64 },
    /// Symbol index outside `[0, M-1]`.
    SymbolOutOfRange { symbol: usize, order: usize },
    /// Operation requires the other level-spacing mode.
    SpacingMismatch {
        required: LevelSpacing,
        actual: LevelSpacing,
    },
}

impl std::fmt::Display for PamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PamError::InvalidOrder { order } => {
                write!(f, "constellation size {} is not a power of two >= 2", order)
            }
            PamError::LevelsNotReady => {
                write!(f, "levels/thresholds not populated; run the optimizer first")
            }
            PamError::DimensionMismatch { levels, thresholds } => write!(
                f,
                "expected M levels and M-1 thresholds, got {} and {}",
                levels, thresholds
            ),
            PamError::NonAscendingLevels => {
                write!(f, "levels must be strictly ascending with interleaved thresholds")
            }
            PamError::NonPositiveTopLevel { top } => {
                write!(f, "top level must be positive to normalize, got {}", top)
            }
            PamError::InvalidTargetPower { power } => {
                write!(f, "target power must be positive, got {}", power)
            }
            PamError::InvalidBerTarget { target } => {
                write!(f, "BER target {} leaves no solvable per-boundary budget", target)
            }
            PamError::SymbolOutOfRange { symbol, order } => {
                write!(f, "symbol {} out of range for {}-PAM", symbol, order)
            }
            PamError::SpacingMismatch { required, actual } => write!(
                f,
                "operation requires {:?} level spacing, model uses {:?}",
                required, actual
            ),
        }
    }
}

impl std::error::Error for PamError {}

/// M-ary PAM constellation model.
///
/// Single owner of its level/threshold vectors; all mutation goes through
/// its methods, so no caller can hold a stale copy across an adjustment.
#[derive(Debug, Clone)]
pub struct Pam {
    order: usize,
    bit_rate: f64,
    spacing: LevelSpacing,
    pulse_shape: PulseShape,
    /// Amplitude levels `a`, strictly ascending.
    levels: Vec<f64>,
    /// Decision thresholds `b`, `levels[i] < thresholds[i] < levels[i+1]`.
    thresholds: Vec<f64>,
    gray: GrayCode,
}

impl Pam {
    /// Create an M-ary PAM model with a rectangular pulse shape.
    ///
    /// `EquallySpaced` models get closed-form normalized levels and
    /// thresholds immediately; `Optimized` models start empty and must be
    /// populated by the level-spacing optimizer before modulation,
    /// demodulation or power adjustment.
    pub fn new(order: usize, bit_rate: f64, spacing: LevelSpacing) -> Result<Self, PamError> {
        if order < 2 || !order.is_power_of_two() {
            return Err(PamError::InvalidOrder { order });
        }
        let bits = order.trailing_zeros() as u8;
        let (levels, thresholds) = match spacing {
            LevelSpacing::EquallySpaced => equally_spaced(order),
            LevelSpacing::Optimized => (Vec::new(), Vec::new()),
        };
        Ok(Self {
            order,
            bit_rate,
            spacing,
            pulse_shape: rectangular_pulse,
            levels,
            thresholds,
            gray: GrayCode::new(bits),
        })
    }

    /// Replace the pulse shape (builder style).
    pub fn with_pulse_shape(mut self, pulse_shape: PulseShape) -> Self {
        self.pulse_shape = pulse_shape;
        self
    }

    // -- Accessors ------------------------------------------------------

    /// Constellation size M.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Bits carried per symbol, `log2(M)`.
    pub fn bits_per_symbol(&self) -> usize {
        self.order.trailing_zeros() as usize
    }

    /// Bit rate in bits/second.
    pub fn bit_rate(&self) -> f64 {
        self.bit_rate
    }

    /// Symbol rate in symbols/second, `bit_rate / log2(M)`.
    pub fn symbol_rate(&self) -> f64 {
        self.bit_rate / self.bits_per_symbol() as f64
    }

    /// Level-spacing mode.
    pub fn spacing(&self) -> LevelSpacing {
        self.spacing
    }

    /// Current amplitude levels (empty until optimized in Optimized mode).
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Current decision thresholds.
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// Mean of the current levels (equals the target power after
    /// [`adjust_levels`](Self::adjust_levels)).
    pub fn average_power(&self) -> Result<f64, PamError> {
        self.check_ready()?;
        Ok(self.levels.iter().sum::<f64>() / self.order as f64)
    }

    fn check_ready(&self) -> Result<(), PamError> {
        if self.levels.is_empty() {
            Err(PamError::LevelsNotReady)
        } else {
            Ok(())
        }
    }

    // -- Level/threshold model ------------------------------------------

    /// Replace levels and thresholds, normalizing both by the top level.
    ///
    /// Levels must be strictly ascending with each threshold strictly
    /// inside its level gap, and the top level positive.
    pub fn set_levels(&mut self, levels: Vec<f64>, thresholds: Vec<f64>) -> Result<(), PamError> {
        if levels.len() != self.order || thresholds.len() != self.order - 1 {
            return Err(PamError::DimensionMismatch {
                levels: levels.len(),
                thresholds: thresholds.len(),
            });
        }
        for i in 0..self.order - 1 {
            if !(levels[i] < thresholds[i] && thresholds[i] < levels[i + 1]) {
                return Err(PamError::NonAscendingLevels);
            }
        }
        let top = levels[self.order - 1];
        if top <= 0.0 {
            return Err(PamError::NonPositiveTopLevel { top });
        }
        self.levels = levels.iter().map(|a| a / top).collect();
        self.thresholds = thresholds.iter().map(|b| b / top).collect();
        Ok(())
    }

    /// Rescale levels and thresholds in place by the current top level.
    ///
    /// Idempotent once the top level is exactly 1.
    pub fn normalize_levels(&mut self) -> Result<(), PamError> {
        self.check_ready()?;
        let top = self.levels[self.order - 1];
        if top <= 0.0 {
            return Err(PamError::NonPositiveTopLevel { top });
        }
        for a in &mut self.levels {
            *a /= top;
        }
        for b in &mut self.thresholds {
            *b /= top;
        }
        Ok(())
    }

    // -- Power adjustment -----------------------------------------------

    /// Rescale levels/thresholds to a target mean transmit power under the
    /// given extinction ratio (dB, `Pmin/Pmax`, sign-insensitive).
    ///
    /// EquallySpaced models regenerate canonical spacing and apply an
    /// affine map that pins the bottom level at `Pmin`; Optimized models
    /// already carry the extinction ratio in their level geometry and are
    /// rescaled multiplicatively only. After this call the levels are
    /// transmitted-power values, no longer unit-normalized.
    pub fn adjust_levels(
        &mut self,
        target_power: f64,
        extinction_ratio_db: f64,
    ) -> Result<(), PamError> {
        if target_power <= 0.0 {
            return Err(PamError::InvalidTargetPower {
                power: target_power,
            });
        }
        let rex = 10f64.powf(-extinction_ratio_db.abs() / 10.0);

        match self.spacing {
            LevelSpacing::EquallySpaced => {
                let (a, b) = equally_spaced(self.order);
                let mean = a.iter().sum::<f64>() / self.order as f64;
                let p_min = 2.0 * target_power * rex / (1.0 + rex);
                let scale = (target_power / mean) * (1.0 - rex) / (1.0 + rex);
                self.levels = a.iter().map(|x| x * scale + p_min).collect();
                self.thresholds = b.iter().map(|x| x * scale + p_min).collect();
            }
            LevelSpacing::Optimized => {
                self.check_ready()?;
                let mean = self.levels.iter().sum::<f64>() / self.order as f64;
                if mean <= 0.0 {
                    return Err(PamError::NonPositiveTopLevel { top: mean });
                }
                let scale = target_power / mean;
                for a in &mut self.levels {
                    *a *= scale;
                }
                for b in &mut self.thresholds {
                    *b *= scale;
                }
            }
        }
        Ok(())
    }

    // -- Modulator / demodulator ----------------------------------------

    /// Map Gray-coded symbol indices to an oversampled amplitude stream.
    ///
    /// Each symbol is Gray-decoded to a natural binary level index; the
    /// level is replicated over `oversampling` samples, each weighted by
    /// the pulse shape at its offset. Returns the sample stream together
    /// with the per-symbol level sequence.
    pub fn modulate(
        &self,
        symbols: &[usize],
        oversampling: usize,
    ) -> Result<(Vec<f64>, Vec<f64>), PamError> {
        self.check_ready()?;
        let mut samples = Vec::with_capacity(symbols.len() * oversampling);
        let mut symbol_levels = Vec::with_capacity(symbols.len());
        for &s in symbols {
            if s >= self.order {
                return Err(PamError::SymbolOutOfRange {
                    symbol: s,
                    order: self.order,
                });
            }
            let level = self.levels[self.gray.decode(s)];
            symbol_levels.push(level);
            for k in 0..oversampling {
                samples.push(level * (self.pulse_shape)(k));
            }
        }
        Ok((samples, symbol_levels))
    }

    /// Recover Gray-coded symbol indices from sampled amplitudes.
    ///
    /// Each sample's natural-binary index is the count of thresholds it
    /// meets or exceeds; a tie at a threshold resolves to the upper symbol.
    pub fn demodulate(&self, samples: &[f64]) -> Result<Vec<usize>, PamError> {
        self.check_ready()?;
        Ok(samples
            .iter()
            .map(|&x| {
                let idx = self.thresholds.iter().filter(|&&b| x >= b).count();
                self.gray.encode(idx)
            })
            .collect())
    }

    // -- BER estimator --------------------------------------------------

    /// Approximate bit error rate under signal-dependent Gaussian noise.
    ///
    /// `noise_std` maps a signal level to its noise standard deviation.
    /// Each level contributes one Gaussian tail per adjacent decision
    /// boundary (outer levels one, inner levels two); the sum over M levels
    /// gives the symbol error rate, divided by `log2(M)` for the BER under
    /// the Gray-coding adjacent-error assumption.
    pub fn ber_awgn<F: Fn(f64) -> f64>(&self, noise_std: F) -> Result<f64, PamError> {
        self.check_ready()?;
        let m = self.order;
        let mut total = 0.0;
        for (i, &a) in self.levels.iter().enumerate() {
            let sigma = noise_std(a);
            if i > 0 {
                total += q((a - self.thresholds[i - 1]) / sigma);
            }
            if i < m - 1 {
                total += q((self.thresholds[i] - a) / sigma);
            }
        }
        let ser = total / m as f64;
        Ok(ser / self.bits_per_symbol() as f64)
    }
}

/// Canonical equally-spaced constellation, normalized to a unit top level:
/// `a_i = 2i / (2(M-1))`, `b_i = (2i+1) / (2(M-1))`.
fn equally_spaced(order: usize) -> (Vec<f64>, Vec<f64>) {
    let den = (2 * (order - 1)) as f64;
    let levels = (0..order).map(|i| (2 * i) as f64 / den).collect();
    let thresholds = (0..order - 1).map(|i| (2 * i + 1) as f64 / den).collect();
    (levels, thresholds)
}
