//! Emission lines: the transition table, natural widths and the per-line
//! yields of target fluorescence and radionuclide decay.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::activity::BeamSource;
use crate::constants::{EV_PER_KEV, FALLBACK_LINE_WIDTH_EV, GAMMA_LINE_WIDTH_EV};
use crate::elements;
use crate::error::XrayYieldError;
use crate::material::ResolvedLayer;
use crate::provider::{DataProvider, RadionuclideRecord};
use crate::self_absorption::{self, Geometry};
use crate::synth::Diagnostics;

/// Label given to every gamma line of a nuclide.
pub const GAMMA_LABEL: &str = "Gamma";

/// A fluorescence transition between two atomic levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub iupac: &'static str,
    pub siegbahn: &'static str,
    /// Level with the initial vacancy.
    pub initial: &'static str,
    /// Level the vacancy moves to.
    pub final_level: &'static str,
}

const fn transition(
    iupac: &'static str,
    siegbahn: &'static str,
    initial: &'static str,
    final_level: &'static str,
) -> Transition {
    Transition {
        iupac,
        siegbahn,
        initial,
        final_level,
    }
}

/// Lines computed for every element of a target, in output order.
pub const TARGET_TRANSITIONS: [Transition; 12] = [
    transition("KL3", "KA1", "K", "L3"),
    transition("KL2", "KA2", "K", "L2"),
    transition("KM3", "KB1", "K", "M3"),
    transition("KM2", "KB3", "K", "M2"),
    transition("L3M5", "LA1", "L3", "M5"),
    transition("L3M4", "LA2", "L3", "M4"),
    transition("L2M4", "LB1", "L2", "M4"),
    transition("L3N5", "LB2", "L3", "N5"),
    transition("L1M3", "LB3", "L1", "M3"),
    transition("L1M2", "LB4", "L1", "M2"),
    transition("L2N4", "LG1", "L2", "N4"),
    transition("L3M1", "LL", "L3", "M1"),
];

fn transition_table() -> &'static HashMap<&'static str, &'static Transition> {
    static TABLE: OnceLock<HashMap<&'static str, &'static Transition>> = OnceLock::new();
    TABLE.get_or_init(|| {
        TARGET_TRANSITIONS
            .iter()
            .flat_map(|t| [(t.iupac, t), (t.siegbahn, t)])
            .collect()
    })
}

/// Look up a target transition by IUPAC or Siegbahn label.
pub fn lookup_transition(label: &str) -> Option<&'static Transition> {
    transition_table().get(label).copied()
}

/// Split an IUPAC label into its two levels.
///
/// A leading `K` is the initial level, otherwise the first two characters
/// are. A three-character remainder names a level pair (`M45`) and is cut
/// to the first of them.
pub fn split_levels(iupac: &str) -> Option<(&str, &str)> {
    if !iupac.is_ascii() || iupac.len() < 2 {
        return None;
    }
    let split = if iupac.starts_with('K') { 1 } else { 2 };
    if iupac.len() <= split {
        return None;
    }
    let (initial, rest) = iupac.split_at(split);
    let final_level = if rest.len() == 3 { &rest[..2] } else { rest };
    Some((initial, final_level))
}

/// Natural line width in eV from the widths (keV) of its two levels.
///
/// Two zero widths give the 1 eV fallback; a negative sum gives 0.
pub fn natural_width_ev<P: DataProvider>(provider: &P, z: u16, initial: &str, final_level: &str) -> f64 {
    let width_kev = provider.level_width(z, initial) + provider.level_width(z, final_level);
    if width_kev > 0.0 {
        width_kev * EV_PER_KEV
    } else if width_kev == 0.0 {
        FALLBACK_LINE_WIDTH_EV
    } else {
        0.0
    }
}

/// Natural width of any IUPAC-labelled transition, 0 if unparseable.
pub fn transition_width_ev<P: DataProvider>(provider: &P, z: u16, iupac: &str) -> f64 {
    let levels = lookup_transition(iupac)
        .map(|t| (t.initial, t.final_level))
        .or_else(|| split_levels(iupac));
    match levels {
        Some((initial, final_level)) => natural_width_ev(provider, z, initial, final_level),
        None => 0.0,
    }
}

/// Identity of a line for masking and display: `(element, label)`.
///
/// Target lines use the Siegbahn label, radionuclide X-rays the IUPAC label,
/// and gamma lines use [`GAMMA_LABEL`] with the nuclide name as element.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub element: String,
    pub label: String,
}

impl LineKey {
    pub fn new(element: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            label: label.into(),
        }
    }
}

impl std::fmt::Display for LineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.element, self.label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOrigin {
    /// Fluorescence of the target under the beam.
    Target,
    RadionuclideXray { source: usize, name: String },
    RadionuclideGamma { source: usize, name: String },
}

/// One emission line before exposure scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralLine {
    pub key: LineKey,
    /// Atomic number of the emitter; for gamma lines, of the parent nuclide.
    pub atomic_number: u16,
    pub energy_kev: f64,
    pub natural_width_ev: f64,
    /// Relative weight, per incident photon for target lines and per decay
    /// for radionuclide lines.
    pub weight: f64,
    pub origin: LineOrigin,
    /// Component spectrum this line is accumulated into.
    pub group: String,
}

impl SpectralLine {
    /// Zero energy, width or weight mark a transition that does not exist.
    pub fn is_real(&self) -> bool {
        self.energy_kev > 0.0 && self.natural_width_ev > 0.0 && self.weight > 0.0
    }
}

/// Builds the line list of a synthesis pass from the data provider.
pub struct LineIntensityCalculator<'a, P> {
    provider: &'a P,
}

impl<'a, P: DataProvider> LineIntensityCalculator<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Fluorescence lines of every element in `target` excited by `beam`.
    ///
    /// `weight = Q · w · ρ · t · A_corr`. Lines are ordered by transition,
    /// then by element in composition order.
    pub fn target_lines(
        &self,
        target: &ResolvedLayer,
        beam: &BeamSource,
        diagnostics: &mut Diagnostics,
    ) -> Vec<SpectralLine> {
        let Some(composition) = target.composition() else {
            diagnostics.push(XrayYieldError::UnresolvedComposition(target.name.clone()));
            return Vec::new();
        };
        let geometry = Geometry {
            incidence_deg: beam.incidence_angle_deg,
            exit_deg: beam.exit_angle_deg,
        };

        let mut lines = Vec::new();
        for transition in &TARGET_TRANSITIONS {
            for (z, mass_fraction) in composition.iter() {
                let Some(symbol) = elements::symbol(z) else {
                    continue;
                };
                let energy = self.provider.line_energy(z, transition.iupac);
                if energy == 0.0 {
                    continue;
                }
                let q = self
                    .provider
                    .fluorescence_cross_section(z, transition.iupac, beam.energy_kev);
                if q == 0.0 {
                    continue;
                }
                let a_corr =
                    self_absorption::correction(self.provider, target, beam.energy_kev, energy, geometry, diagnostics);
                let weight = q * mass_fraction * target.areal_density() * a_corr;
                if weight == 0.0 {
                    continue;
                }

                let line = SpectralLine {
                    key: LineKey::new(symbol, transition.siegbahn),
                    atomic_number: z,
                    energy_kev: energy,
                    natural_width_ev: natural_width_ev(self.provider, z, transition.initial, transition.final_level),
                    weight,
                    origin: LineOrigin::Target,
                    group: symbol.to_string(),
                };
                if line.is_real() {
                    lines.push(line);
                }
            }
        }
        tracing::debug!(target_layer = %target.name, lines = lines.len(), "target lines");
        lines
    }

    /// X-ray and gamma lines of one radionuclide, X-rays first.
    pub fn radionuclide_lines(
        &self,
        source: usize,
        record: &RadionuclideRecord,
        diagnostics: &mut Diagnostics,
    ) -> Vec<SpectralLine> {
        let mut lines = Vec::with_capacity(record.xray_lines.len() + record.gamma_lines.len());
        let z_xray = record.xray_atomic_number;

        match elements::symbol(z_xray) {
            Some(symbol) => {
                for emission in &record.xray_lines {
                    let line = SpectralLine {
                        key: LineKey::new(symbol, emission.iupac_symbol.as_str()),
                        atomic_number: z_xray,
                        energy_kev: self.provider.line_energy(z_xray, &emission.iupac_symbol),
                        natural_width_ev: transition_width_ev(self.provider, z_xray, &emission.iupac_symbol),
                        weight: emission.intensity,
                        origin: LineOrigin::RadionuclideXray {
                            source,
                            name: record.name.clone(),
                        },
                        group: symbol.to_string(),
                    };
                    if line.is_real() {
                        lines.push(line);
                    }
                }
            }
            None if !record.xray_lines.is_empty() => {
                diagnostics.push(XrayYieldError::LookupFailure {
                    what: "element symbol",
                    detail: format!("{}: no element with Z = {z_xray}", record.name),
                });
            }
            None => {}
        }

        lines.extend(
            record
                .gamma_lines
                .iter()
                .map(|gamma| SpectralLine {
                    key: LineKey::new(record.name.as_str(), GAMMA_LABEL),
                    atomic_number: record.atomic_number,
                    energy_kev: gamma.energy,
                    natural_width_ev: GAMMA_LINE_WIDTH_EV,
                    weight: gamma.intensity,
                    origin: LineOrigin::RadionuclideGamma {
                        source,
                        name: record.name.clone(),
                    },
                    group: record.name.clone(),
                })
                .filter(SpectralLine::is_real),
        );
        lines
    }
}
