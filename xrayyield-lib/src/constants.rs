/// Ratio FWHM / sigma of a Gaussian, `2 * sqrt(2 ln 2)`.
pub const SIGMA_FROM_FWHM: f64 = 2.354_820_045_030_949_3;

/// eV per keV
pub const EV_PER_KEV: f64 = 1.0e3;

/// Seconds per day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Lower limit of the supported energy range (keV)
pub const MIN_ENERGY_KEV: f64 = 0.1;

/// Upper limit of the supported energy range (keV)
pub const MAX_ENERGY_KEV: f64 = 800.0;

/// Default grid bounds and step (keV)
pub const DEFAULT_LOW_KEV: f64 = 0.1;
pub const DEFAULT_HIGH_KEV: f64 = 20.0;
pub const DEFAULT_STEP_KEV: f64 = 0.001;

/// Natural width assigned when both contributing level widths are zero (eV)
pub const FALLBACK_LINE_WIDTH_EV: f64 = 1.0;

/// Natural width assigned to gamma lines (eV)
pub const GAMMA_LINE_WIDTH_EV: f64 = 1.0;

/// Largest number of points an energy grid may hold
pub const MAX_GRID_POINTS: usize = 20_000_000;
