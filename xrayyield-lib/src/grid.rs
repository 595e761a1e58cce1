//! Regular energy axis shared by every curve of a synthesis pass.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HIGH_KEV, DEFAULT_LOW_KEV, DEFAULT_STEP_KEV, EV_PER_KEV, MAX_ENERGY_KEV, MAX_GRID_POINTS,
    MIN_ENERGY_KEV,
};
use crate::error::{Result, XrayYieldError};
use crate::synth::Diagnostics;

/// How the upper end of the grid is derived from `high`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridMode {
    /// `[low, high]` inclusive, `ceil((high - low) / step) + 1` points.
    #[default]
    Inclusive,
    /// `low + i*step` for every value below `high + low + step`.
    LegacyOffset,
}

/// Raw grid parameters in keV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub low_kev: f64,
    pub high_kev: f64,
    pub step_kev: f64,
    pub mode: GridMode,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            low_kev: DEFAULT_LOW_KEV,
            high_kev: DEFAULT_HIGH_KEV,
            step_kev: DEFAULT_STEP_KEV,
            mode: GridMode::Inclusive,
        }
    }
}

impl GridSettings {
    /// Clamp each parameter into its supported range, reporting every change.
    pub fn sanitized(&self, diagnostics: &mut Diagnostics) -> GridSettings {
        let mut out = *self;

        if !out.low_kev.is_finite() {
            diagnostics.push(XrayYieldError::validation("low_kev", out.low_kev, "not finite"));
            out.low_kev = DEFAULT_LOW_KEV;
        } else if !(MIN_ENERGY_KEV..=MAX_ENERGY_KEV).contains(&out.low_kev) {
            let clamped = out.low_kev.clamp(MIN_ENERGY_KEV, MAX_ENERGY_KEV);
            diagnostics.push(XrayYieldError::validation(
                "low_kev",
                out.low_kev,
                format!("outside [{MIN_ENERGY_KEV}, {MAX_ENERGY_KEV}], using {clamped}"),
            ));
            out.low_kev = clamped;
        }

        if !out.high_kev.is_finite() {
            diagnostics.push(XrayYieldError::validation("high_kev", out.high_kev, "not finite"));
            out.high_kev = DEFAULT_HIGH_KEV;
        } else if !(MIN_ENERGY_KEV..=MAX_ENERGY_KEV).contains(&out.high_kev) {
            let clamped = out.high_kev.clamp(MIN_ENERGY_KEV, MAX_ENERGY_KEV);
            diagnostics.push(XrayYieldError::validation(
                "high_kev",
                out.high_kev,
                format!("outside [{MIN_ENERGY_KEV}, {MAX_ENERGY_KEV}], using {clamped}"),
            ));
            out.high_kev = clamped;
        }

        if !(out.step_kev.is_finite() && out.step_kev > 0.0) {
            diagnostics.push(XrayYieldError::validation(
                "step_kev",
                out.step_kev,
                format!("must be positive, using {DEFAULT_STEP_KEV}"),
            ));
            out.step_kev = DEFAULT_STEP_KEV;
        }
        out
    }
}

/// Ordered, evenly spaced energies in keV.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyGrid {
    energies: Vec<f64>,
    step: f64,
}

impl EnergyGrid {
    /// Build the inclusive grid `[low, high]` with spacing `step`.
    ///
    /// `low == high` gives a single point. Fails on `step <= 0`,
    /// `high < low`, non-finite input, or more than
    /// [`MAX_GRID_POINTS`] points.
    pub fn build(low: f64, high: f64, step: f64) -> Result<Self> {
        Self::build_with_mode(low, high, step, GridMode::Inclusive)
    }

    pub fn build_with_mode(low: f64, high: f64, step: f64, mode: GridMode) -> Result<Self> {
        if !(low.is_finite() && high.is_finite() && step.is_finite()) {
            return Err(XrayYieldError::validation(
                "grid",
                format!("{low}..{high} step {step}"),
                "bounds and step must be finite",
            ));
        }
        if step <= 0.0 {
            return Err(XrayYieldError::validation("step_kev", step, "must be positive"));
        }
        if high < low {
            return Err(XrayYieldError::validation(
                "high_kev",
                high,
                format!("must not be below low ({low})"),
            ));
        }

        let count = match mode {
            // Relative tolerance keeps (high-low)/step from rounding up past an exact multiple.
            GridMode::Inclusive => {
                let q = (high - low) / step;
                (q - q.max(1.0) * 1e-9).ceil().max(0.0) + 1.0
            }
            GridMode::LegacyOffset => ((high + step) / step).ceil().max(1.0),
        };
        if count > MAX_GRID_POINTS as f64 {
            return Err(XrayYieldError::validation(
                "step_kev",
                step,
                format!("{low}..{high} would need {count:.3e} points, limit is {MAX_GRID_POINTS}"),
            ));
        }
        let n = count as usize;

        let energies = match mode {
            GridMode::Inclusive => {
                let mut energies: Vec<f64> = (0..n).map(|i| (low + i as f64 * step).min(high)).collect();
                // Clamping can still land two points on `high`.
                energies.dedup();
                energies
            }
            GridMode::LegacyOffset => (0..n).map(|i| low + i as f64 * step).collect(),
        };
        Ok(Self { energies, step })
    }

    /// Build from raw settings, substituting the default range when the
    /// settings are unusable. Never fails.
    pub fn from_settings(settings: &GridSettings, diagnostics: &mut Diagnostics) -> Self {
        let sane = settings.sanitized(diagnostics);
        match Self::build_with_mode(sane.low_kev, sane.high_kev, sane.step_kev, sane.mode) {
            Ok(grid) => grid,
            Err(err) => {
                diagnostics.push(err);
                Self::default()
            }
        }
    }

    pub fn energies_kev(&self) -> &[f64] {
        &self.energies
    }

    pub fn energies_ev(&self) -> Vec<f64> {
        self.energies.iter().map(|e| e * EV_PER_KEV).collect()
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    /// Index of the grid point closest to `energy_kev`.
    pub fn nearest_index(&self, energy_kev: f64) -> Option<usize> {
        let idx = self.energies.partition_point(|&e| e < energy_kev);
        match (idx.checked_sub(1), self.energies.get(idx)) {
            (Some(lo), Some(&hi)) => {
                if (energy_kev - self.energies[lo]) <= (hi - energy_kev) {
                    Some(lo)
                } else {
                    Some(idx)
                }
            }
            (Some(lo), None) => Some(lo),
            (None, Some(_)) => Some(idx),
            (None, None) => None,
        }
    }
}

impl Default for EnergyGrid {
    fn default() -> Self {
        Self::build(DEFAULT_LOW_KEV, DEFAULT_HIGH_KEV, DEFAULT_STEP_KEV)
            .unwrap_or_else(|_| Self {
                energies: vec![DEFAULT_LOW_KEV],
                step: DEFAULT_STEP_KEV,
            })
    }
}
