#![allow(dead_code)]

use xrayyield::chemparser::chemparse;
use xrayyield::elements;
use xrayyield::provider::{GammaEmissionRecord, RadionuclideRecord, XrayEmissionRecord};
use xrayyield::{Composition, CrossSectionKind, DataProvider};

/// Energy-independent reference data.
///
/// Every element has the same cross-sections and level widths; molar mass is
/// `2 Z`. Only the lines listed in `lines` exist.
pub struct ConstantProvider {
    pub total: f64,
    pub photo: f64,
    pub level_width_kev: f64,
    /// Fluorescence cross-section of every existing line.
    pub fluorescence: f64,
    pub lines: Vec<(u16, &'static str, f64)>,
    pub radionuclides: Vec<RadionuclideRecord>,
}

impl Default for ConstantProvider {
    fn default() -> Self {
        Self {
            total: 1.0,
            photo: 0.5,
            level_width_kev: 1e-3,
            fluorescence: 1.0,
            lines: vec![
                (25, "KL3", 5.899),
                (25, "KM3", 6.490),
                (26, "KL3", 6.404),
                (26, "KL2", 6.391),
                (26, "KM3", 7.058),
                (29, "KL3", 8.048),
            ],
            radionuclides: vec![fe55()],
        }
    }
}

pub fn fe55() -> RadionuclideRecord {
    RadionuclideRecord {
        name: "55Fe".into(),
        atomic_number: 26,
        xray_atomic_number: 25,
        half_life_days: 1006.70,
        xray_lines: vec![
            XrayEmissionRecord {
                iupac_symbol: "KL3".into(),
                intensity: 0.1628,
            },
            XrayEmissionRecord {
                iupac_symbol: "KM3".into(),
                intensity: 0.0285,
            },
        ],
        gamma_lines: Vec::new(),
    }
}

/// A pure gamma emitter with one line at `energy_kev`.
pub fn gamma_source(name: &str, energy_kev: f64, half_life_days: f64) -> RadionuclideRecord {
    RadionuclideRecord {
        name: name.into(),
        atomic_number: 27,
        xray_atomic_number: 26,
        half_life_days,
        xray_lines: Vec::new(),
        gamma_lines: vec![GammaEmissionRecord {
            energy: energy_kev,
            intensity: 1.0,
        }],
    }
}

impl DataProvider for ConstantProvider {
    fn resolve_composition(&self, name: &str) -> Option<Composition> {
        if let Some(z) = elements::atomic_number(name) {
            return Some(Composition::single(z));
        }
        let counts = chemparse(name).ok()?;
        Composition::from_counts(counts, |z| Some(2.0 * f64::from(z)))
    }

    fn element_cross_section(&self, _z: u16, _energy_kev: f64, kind: CrossSectionKind) -> f64 {
        match kind {
            CrossSectionKind::Total => self.total,
            CrossSectionKind::Photo => self.photo,
        }
    }

    fn fluorescence_cross_section(&self, z: u16, line: &str, _excitation_kev: f64) -> f64 {
        if self.line_energy(z, line) > 0.0 {
            self.fluorescence
        } else {
            0.0
        }
    }

    fn line_energy(&self, z: u16, line: &str) -> f64 {
        self.lines
            .iter()
            .find(|(lz, label, _)| *lz == z && *label == line)
            .map(|&(_, _, e)| e)
            .unwrap_or(0.0)
    }

    fn level_width(&self, _z: u16, _shell: &str) -> f64 {
        self.level_width_kev
    }

    fn radionuclide(&self, name: &str) -> Option<RadionuclideRecord> {
        self.radionuclides.iter().find(|r| r.name == name).cloned()
    }
}
