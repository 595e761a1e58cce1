//! The synthesis pipeline.
//!
//! [`SpectrumSynthesizer::recompute`] is a pure function of its
//! [`SynthesisConfig`]: it validates the parameters, builds the grid, samples
//! filter transmission and detector absorption, collects the emission lines
//! and folds each enabled line through its Voigt profile. Recoverable
//! problems are substituted or skipped and reported in [`Diagnostics`]; the
//! result always covers the full grid.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::activity::{ActivityReport, BeamSource, RadionuclideSource, decay_yield, or_default, stock_half_life};
use crate::attenuation::{self, AbsorptionCombination, StackResponse};
use crate::constants::{EV_PER_KEV, SIGMA_FROM_FWHM};
use crate::error::XrayYieldError;
use crate::grid::{EnergyGrid, GridSettings};
use crate::lines::{LineIntensityCalculator, LineKey, SpectralLine};
use crate::material::{Layer, MaterialStack};
use crate::profile::{ProfileKind, VoigtProfile};
use crate::provider::DataProvider;

/// Recoverable conditions met during a synthesis pass, in the order seen.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<XrayYieldError>,
}

impl Diagnostics {
    /// Record and log a condition.
    pub fn push(&mut self, err: XrayYieldError) {
        tracing::warn!("{err}");
        self.entries.push(err);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, XrayYieldError> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<XrayYieldError> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a XrayYieldError;
    type IntoIter = std::slice::Iter<'a, XrayYieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    /// Energy resolution, FWHM in eV. Zero means an ideal detector.
    pub resolution_fwhm_ev: f64,
    pub solid_angle: f64,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            resolution_fwhm_ev: 8.0,
            solid_angle: 1.0,
        }
    }
}

impl DetectorSettings {
    pub fn validated(&self, diagnostics: &mut Diagnostics) -> DetectorSettings {
        let defaults = DetectorSettings::default();
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;
        DetectorSettings {
            resolution_fwhm_ev: or_default(
                diagnostics,
                "resolution_fwhm_ev",
                self.resolution_fwhm_ev,
                non_negative,
                defaults.resolution_fwhm_ev,
            ),
            solid_angle: or_default(
                diagnostics,
                "solid_angle",
                self.solid_angle,
                non_negative,
                defaults.solid_angle,
            ),
        }
    }

    /// Gaussian sigma of the detector response in eV.
    pub fn sigma_ev(&self) -> f64 {
        self.resolution_fwhm_ev / SIGMA_FROM_FWHM
    }
}

/// Everything a synthesis pass depends on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub grid: GridSettings,
    pub detector: DetectorSettings,
    /// Filters between the emitter and the detector, in traversal order.
    pub filters: MaterialStack,
    /// Sensitive layers of the detector.
    pub detectors: MaterialStack,
    /// Fluorescence target; excited by `beam`.
    pub target: Option<Layer>,
    pub beam: BeamSource,
    pub radionuclides: Vec<RadionuclideSource>,
    pub absorption: AbsorptionCombination,
    pub disabled_lines: BTreeSet<LineKey>,
}

/// A curve paired with the grid it was sampled on.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub energy_kev: Vec<f64>,
    pub values: Vec<f64>,
}

impl Spectrum {
    pub fn new(grid: &EnergyGrid, values: Vec<f64>) -> Self {
        debug_assert_eq!(grid.len(), values.len());
        Self {
            energy_kev: grid.energies_kev().to_vec(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(energy, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.energy_kev.iter().copied().zip(self.values.iter().copied())
    }
}

/// A line of the pass together with its exposure.
#[derive(Debug, Clone, PartialEq)]
pub struct LineEntry {
    pub line: SpectralLine,
    /// Photons (beam) or decays (radionuclide) seen by the detector.
    pub yield_multiplier: f64,
    pub enabled: bool,
}

/// Partial fluorescence spectrum of one element or source.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub group: String,
    pub values: Vec<f64>,
}

#[derive(Debug)]
pub struct SynthesisResult {
    pub grid: EnergyGrid,
    /// `transmission × photoabsorption`
    pub quantum_efficiency: Spectrum,
    pub fluorescence: Spectrum,
    pub transmission: StackResponse,
    pub absorption: StackResponse,
    /// One report per radionuclide that resolved.
    pub activities: Vec<(String, ActivityReport)>,
    pub lines: Vec<LineEntry>,
    /// Sums to `fluorescence`, ordered by first appearance.
    pub components: Vec<Component>,
    pub diagnostics: Diagnostics,
}

/// Owns the data provider; every pass reads it and nothing else.
pub struct SpectrumSynthesizer<P> {
    provider: P,
}

impl<P: DataProvider> SpectrumSynthesizer<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run a full pass. Never fails; see [`SynthesisResult::diagnostics`].
    pub fn recompute(&self, config: &SynthesisConfig) -> SynthesisResult {
        let _span = tracing::info_span!("recompute").entered();
        let mut diagnostics = Diagnostics::default();

        let (detector, beam) = {
            let _stage = tracing::debug_span!("validate").entered();
            (
                config.detector.validated(&mut diagnostics),
                config.beam.validated(&mut diagnostics),
            )
        };

        let grid = {
            let _stage = tracing::debug_span!("build_grid").entered();
            let grid = EnergyGrid::from_settings(&config.grid, &mut diagnostics);
            tracing::debug!(points = grid.len(), step = grid.step(), "grid");
            grid
        };

        let (transmission, absorption, qe) = {
            let _stage = tracing::debug_span!("attenuation").entered();
            let filters = config.filters.resolve(&self.provider, &mut diagnostics);
            let detectors = config.detectors.resolve(&self.provider, &mut diagnostics);
            let transmission = attenuation::transmission(&self.provider, &filters, &grid, &mut diagnostics);
            let absorption = attenuation::photoabsorption(
                &self.provider,
                &detectors,
                &grid,
                config.absorption,
                &mut diagnostics,
            );
            let qe = attenuation::quantum_efficiency(&transmission, &absorption);
            (transmission, absorption, qe)
        };

        let (lines, activities) = {
            let _stage = tracing::debug_span!("lines").entered();
            self.collect_lines(config, &beam, &detector, &mut diagnostics)
        };

        let (fluorescence, components) = {
            let _stage = tracing::debug_span!("accumulate").entered();
            accumulate(&grid, &lines, &qe, &detector, &mut diagnostics)
        };

        tracing::debug!(
            lines = lines.len(),
            diagnostics = diagnostics.len(),
            "recompute done"
        );

        SynthesisResult {
            quantum_efficiency: Spectrum::new(&grid, qe),
            fluorescence: Spectrum::new(&grid, fluorescence),
            grid,
            transmission,
            absorption,
            activities,
            lines,
            components,
            diagnostics,
        }
    }

    fn collect_lines(
        &self,
        config: &SynthesisConfig,
        beam: &BeamSource,
        detector: &DetectorSettings,
        diagnostics: &mut Diagnostics,
    ) -> (Vec<LineEntry>, Vec<(String, ActivityReport)>) {
        let calculator = LineIntensityCalculator::new(&self.provider);
        let mut raw: Vec<(SpectralLine, f64)> = Vec::new();
        let mut activities = Vec::new();

        match &config.target {
            Some(layer) => {
                if let Some(target) = layer.resolve(&self.provider, diagnostics) {
                    let exposure = beam.yield_multiplier() * detector.solid_angle;
                    raw.extend(
                        calculator
                            .target_lines(&target, beam, diagnostics)
                            .into_iter()
                            .map(|line| (line, exposure)),
                    );
                }
            }
            None if config.radionuclides.is_empty() => {
                diagnostics.push(XrayYieldError::ConfigurationIncomplete("no target set"));
            }
            None => {}
        }

        for (index, source) in config.radionuclides.iter().enumerate() {
            let Some(record) = self.provider.radionuclide(&source.name) else {
                diagnostics.push(XrayYieldError::LookupFailure {
                    what: "radionuclide",
                    detail: source.name.clone(),
                });
                continue;
            };
            let half_life = if record.half_life_days > 0.0 {
                record.half_life_days
            } else {
                stock_half_life(&source.name).unwrap_or(0.0)
            };
            let report = source.activity_report(half_life, diagnostics);
            let duration = or_default(
                diagnostics,
                "radionuclide duration_s",
                source.duration_s,
                |v| v.is_finite() && v >= 0.0,
                RadionuclideSource::default().duration_s,
            );
            let exposure =
                decay_yield(report.activity_at_measurement_bq, duration) * detector.solid_angle;
            raw.extend(
                calculator
                    .radionuclide_lines(index, &record, diagnostics)
                    .into_iter()
                    .map(|line| (line, exposure)),
            );
            activities.push((source.name.clone(), report));
        }

        let entries = raw
            .into_iter()
            .map(|(line, yield_multiplier)| LineEntry {
                enabled: !config.disabled_lines.contains(&line.key),
                line,
                yield_multiplier,
            })
            .collect();
        (entries, activities)
    }
}

/// Contribution of one line on the grid, already scaled by exposure and
/// quantum efficiency.
fn line_contribution(energies_ev: &[f64], qe: &[f64], entry: &LineEntry, sigma_ev: f64) -> Vec<f64> {
    let line = &entry.line;
    let profile = VoigtProfile::new(
        line.energy_kev * EV_PER_KEV,
        line.natural_width_ev / 2.0,
        sigma_ev,
    );
    let scale = entry.yield_multiplier * line.weight;
    profile
        .evaluate(energies_ev)
        .into_iter()
        .zip(qe)
        .map(|(density, q)| scale * q * density)
        .collect()
}

#[cfg_attr(feature = "parallel", allow(dead_code))]
fn serial_contributions(energies_ev: &[f64], qe: &[f64], active: &[&LineEntry], sigma_ev: f64) -> Vec<Vec<f64>> {
    active
        .iter()
        .map(|entry| line_contribution(energies_ev, qe, entry, sigma_ev))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn contributions(energies_ev: &[f64], qe: &[f64], active: &[&LineEntry], sigma_ev: f64) -> Vec<Vec<f64>> {
    serial_contributions(energies_ev, qe, active, sigma_ev)
}

#[cfg(feature = "parallel")]
fn contributions(energies_ev: &[f64], qe: &[f64], active: &[&LineEntry], sigma_ev: f64) -> Vec<Vec<f64>> {
    use rayon::prelude::*;

    active
        .par_iter()
        .map(|entry| line_contribution(energies_ev, qe, entry, sigma_ev))
        .collect()
}

/// Sum the enabled lines into the fluorescence spectrum and its components.
///
/// Contributions are summed in line order whether or not they were computed
/// in parallel, so the result does not depend on the thread count.
fn accumulate(
    grid: &EnergyGrid,
    lines: &[LineEntry],
    qe: &[f64],
    detector: &DetectorSettings,
    diagnostics: &mut Diagnostics,
) -> (Vec<f64>, Vec<Component>) {
    let sigma_ev = detector.sigma_ev();
    let energies_ev = grid.energies_ev();

    let mut components: Vec<Component> = Vec::new();
    for entry in lines {
        if !components.iter().any(|c| c.group == entry.line.group) {
            components.push(Component {
                group: entry.line.group.clone(),
                values: vec![0.0; grid.len()],
            });
        }
    }

    let mut active = Vec::with_capacity(lines.len());
    for entry in lines.iter().filter(|e| e.enabled) {
        let hwhm = entry.line.natural_width_ev / 2.0;
        if VoigtProfile::new(0.0, hwhm, sigma_ev).kind() == ProfileKind::Degenerate {
            diagnostics.push(XrayYieldError::DegenerateLine {
                element: entry.line.key.element.clone(),
                label: entry.line.key.label.clone(),
            });
            continue;
        }
        active.push(entry);
    }

    let mut fluorescence = vec![0.0; grid.len()];
    for (entry, contribution) in active.iter().zip(contributions(&energies_ev, qe, &active, sigma_ev)) {
        for (f, c) in fluorescence.iter_mut().zip(&contribution) {
            *f += c;
        }
        if let Some(component) = components.iter_mut().find(|c| c.group == entry.line.group) {
            for (v, c) in component.values.iter_mut().zip(&contribution) {
                *v += c;
            }
        }
    }
    (fluorescence, components)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_contributions_match_serial() {
        use crate::lines::LineOrigin;

        let energies_ev: Vec<f64> = (0..3000).map(|i| 5000.0 + f64::from(i)).collect();
        let qe: Vec<f64> = energies_ev.iter().map(|e| 1.0 - e / 1e5).collect();
        let entries: Vec<LineEntry> = (0..64)
            .map(|i| LineEntry {
                line: SpectralLine {
                    key: LineKey::new("Fe", format!("L{i}")),
                    atomic_number: 26,
                    energy_kev: 5.0 + 0.045 * f64::from(i),
                    natural_width_ev: 1.0 + 0.1 * f64::from(i),
                    weight: 1.0 / f64::from(i + 1),
                    origin: LineOrigin::Target,
                    group: "Fe".to_string(),
                },
                yield_multiplier: 7.2e9,
                enabled: true,
            })
            .collect();
        let active: Vec<&LineEntry> = entries.iter().collect();

        let parallel = contributions(&energies_ev, &qe, &active, 3.4);
        let serial = serial_contributions(&energies_ev, &qe, &active, 3.4);
        assert_eq!(parallel, serial);
    }

    #[test]
    fn test_detector_validation() {
        let mut diag = Diagnostics::default();
        let det = DetectorSettings {
            resolution_fwhm_ev: f64::NAN,
            solid_angle: -1.0,
        }
        .validated(&mut diag);
        assert_eq!(det, DetectorSettings::default());
        assert_eq!(diag.len(), 2);
        assert!(diag.iter().all(XrayYieldError::is_recoverable));
    }

    #[test]
    fn test_sigma_from_resolution() {
        let det = DetectorSettings {
            resolution_fwhm_ev: SIGMA_FROM_FWHM,
            solid_angle: 1.0,
        };
        assert!((det.sigma_ev() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_config_defaults() {
        let config = SynthesisConfig::default();
        assert_eq!(config.grid, GridSettings::default());
        assert_eq!(config.absorption, AbsorptionCombination::Mixed);
        assert!(config.target.is_none());
        assert!(config.disabled_lines.is_empty());
    }
}
