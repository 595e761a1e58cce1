#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// A complete tabulated data set consumed by the synthesis engine.
///
/// Energies are in keV, cross-sections in cm²/g, widths in keV.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XrayYieldDataSet {
    pub elements: Vec<ElementRecord>,
    pub cross_sections: Vec<CrossSectionRecord>,
    pub lines: Vec<LineRecord>,
    pub level_widths: Vec<LevelWidthRecord>,
    pub fluorescence: Vec<FluorescenceRecord>,
    pub compounds: Vec<CompoundRecord>,
    pub radionuclides: Vec<RadionuclideRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub atomic_number: u16,
    pub symbol: String,
    pub molar_mass: f64,
    pub density: f64,
}

/// Total and photoelectric mass attenuation coefficients on a shared energy axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSectionRecord {
    pub atomic_number: u16,
    pub energy: Vec<f64>,
    pub total: Vec<f64>,
    pub photo: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    pub atomic_number: u16,
    pub iupac_symbol: String,
    pub energy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelWidthRecord {
    pub atomic_number: u16,
    pub shell: String,
    pub width: f64,
}

/// Line fluorescence production cross-section as a function of excitation energy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluorescenceRecord {
    pub atomic_number: u16,
    pub iupac_symbol: String,
    pub excitation_energy: Vec<f64>,
    pub cross_section: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundRecord {
    pub name: String,
    pub formula: String,
    pub density: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadionuclideRecord {
    pub name: String,
    /// Atomic number of the decaying nuclide.
    pub atomic_number: u16,
    /// Atomic number of the element emitting the X-rays (the daughter).
    pub xray_atomic_number: u16,
    pub half_life_days: f64,
    pub xray_lines: Vec<XrayEmissionRecord>,
    pub gamma_lines: Vec<GammaEmissionRecord>,
}

/// X-ray emitted per decay; `intensity` is photons per disintegration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XrayEmissionRecord {
    pub iupac_symbol: String,
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GammaEmissionRecord {
    pub energy: f64,
    pub intensity: f64,
}
