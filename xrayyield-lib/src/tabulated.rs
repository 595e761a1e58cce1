use std::collections::HashMap;

use xrayyield_data::{
    CompoundRecord, CrossSectionRecord, FluorescenceRecord, RadionuclideRecord, XrayYieldDataSet,
};

use crate::chemparser::chemparse;
use crate::elements;
use crate::error::{Result, XrayYieldError};
use crate::interp::{Extrapolation, interp_loglog_one, interp_one, ln_table};
use crate::provider::{Composition, CrossSectionKind, DataProvider};

/// Cross-section row with its logs taken once. A column with a non-positive
/// entry is left empty and always yields 0.
struct LogCrossSection {
    log_energy: Vec<f64>,
    log_total: Vec<f64>,
    log_photo: Vec<f64>,
}

impl LogCrossSection {
    fn new(record: &CrossSectionRecord) -> Self {
        let log_energy = ln_table(&record.energy).unwrap_or_default();
        let column = |values: &[f64]| {
            if log_energy.is_empty() {
                Vec::new()
            } else {
                ln_table(values).unwrap_or_default()
            }
        };
        Self {
            log_total: column(&record.total),
            log_photo: column(&record.photo),
            log_energy,
        }
    }
}

/// [`DataProvider`] over an in-memory [`XrayYieldDataSet`].
///
/// Cheap lookups: every table is indexed by atomic number (and line or
/// shell label) once at construction.
pub struct TabulatedProvider {
    molar_mass: HashMap<u16, f64>,
    element_density: HashMap<u16, f64>,
    cross_sections: HashMap<u16, LogCrossSection>,
    line_energy: HashMap<(u16, String), f64>,
    level_width: HashMap<(u16, String), f64>,
    fluorescence: HashMap<(u16, String), FluorescenceRecord>,
    compounds: HashMap<String, CompoundRecord>,
    radionuclides: HashMap<String, RadionuclideRecord>,
}

impl TabulatedProvider {
    pub fn new(data: XrayYieldDataSet) -> Self {
        let molar_mass = data
            .elements
            .iter()
            .map(|e| (e.atomic_number, e.molar_mass))
            .collect();
        let element_density = data
            .elements
            .iter()
            .map(|e| (e.atomic_number, e.density))
            .collect();
        let cross_sections = data
            .cross_sections
            .iter()
            .map(|r| (r.atomic_number, LogCrossSection::new(r)))
            .collect();
        let line_energy = data
            .lines
            .into_iter()
            .map(|r| ((r.atomic_number, r.iupac_symbol), r.energy))
            .collect();
        let level_width = data
            .level_widths
            .into_iter()
            .map(|r| ((r.atomic_number, r.shell), r.width))
            .collect();
        let fluorescence = data
            .fluorescence
            .into_iter()
            .map(|r| ((r.atomic_number, r.iupac_symbol.clone()), r))
            .collect();
        let compounds = data
            .compounds
            .into_iter()
            .map(|r| (r.name.to_lowercase(), r))
            .collect();
        let radionuclides = data
            .radionuclides
            .into_iter()
            .map(|r| (r.name.clone(), r))
            .collect();

        TabulatedProvider {
            molar_mass,
            element_density,
            cross_sections,
            line_energy,
            level_width,
            fluorescence,
            compounds,
            radionuclides,
        }
    }

    /// Load a zstd-compressed postcard blob of an [`XrayYieldDataSet`].
    pub fn from_compressed(bytes: &[u8]) -> Result<Self> {
        let mut decoder = ruzstd::decoding::StreamingDecoder::new(bytes)
            .map_err(|e| XrayYieldError::DataError(format!("zstd frame: {e}")))?;
        let mut decompressed = Vec::new();
        std::io::Read::read_to_end(&mut decoder, &mut decompressed)?;

        let data: XrayYieldDataSet = postcard::from_bytes(&decompressed)
            .map_err(|e| XrayYieldError::DataError(format!("postcard: {e}")))?;
        tracing::debug!(
            elements = data.elements.len(),
            lines = data.lines.len(),
            radionuclides = data.radionuclides.len(),
            "loaded tabulated data set"
        );
        Ok(Self::new(data))
    }

    /// Named compound lookup (case-insensitive): `(composition, density)`.
    pub fn compound(&self, name: &str) -> Option<(Composition, f64)> {
        let record = self.compounds.get(&name.to_lowercase())?;
        let composition = self.formula_composition(&record.formula)?;
        Some((composition, record.density))
    }

    fn formula_composition(&self, formula: &str) -> Option<Composition> {
        let counts = chemparse(formula).ok()?;
        Composition::from_counts(counts, |z| self.molar_mass.get(&z).copied())
    }
}

impl DataProvider for TabulatedProvider {
    fn resolve_composition(&self, name: &str) -> Option<Composition> {
        let name = name.trim();
        if let Some(z) = elements::atomic_number(name) {
            return self.molar_mass.contains_key(&z).then(|| Composition::single(z));
        }
        if let Some((composition, _)) = self.compound(name) {
            return Some(composition);
        }
        self.formula_composition(name)
    }

    fn element_cross_section(&self, z: u16, energy_kev: f64, kind: CrossSectionKind) -> f64 {
        let Some(row) = self.cross_sections.get(&z) else {
            return 0.0;
        };
        let log_values = match kind {
            CrossSectionKind::Total => &row.log_total,
            CrossSectionKind::Photo => &row.log_photo,
        };
        interp_loglog_one(energy_kev, &row.log_energy, log_values)
    }

    fn fluorescence_cross_section(&self, z: u16, line: &str, excitation_kev: f64) -> f64 {
        self.fluorescence
            .get(&(z, line.to_string()))
            .map(|r| {
                interp_one(
                    excitation_kev,
                    &r.excitation_energy,
                    &r.cross_section,
                    Extrapolation::Zero,
                )
            })
            .unwrap_or(0.0)
    }

    fn line_energy(&self, z: u16, line: &str) -> f64 {
        self.line_energy
            .get(&(z, line.to_string()))
            .copied()
            .unwrap_or(0.0)
    }

    fn level_width(&self, z: u16, shell: &str) -> f64 {
        self.level_width
            .get(&(z, shell.to_string()))
            .copied()
            .unwrap_or(0.0)
    }

    fn radionuclide(&self, name: &str) -> Option<RadionuclideRecord> {
        self.radionuclides.get(name).cloned()
    }

    fn tabulated_density(&self, name: &str) -> f64 {
        let name = name.trim();
        let density = match elements::atomic_number(name) {
            Some(z) => self.element_density.get(&z).copied(),
            None => self.compounds.get(&name.to_lowercase()).map(|r| r.density),
        };
        density.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xrayyield_data::{ElementRecord, LineRecord};

    fn small_dataset() -> XrayYieldDataSet {
        XrayYieldDataSet {
            elements: vec![
                ElementRecord {
                    atomic_number: 1,
                    symbol: "H".into(),
                    molar_mass: 1.008,
                    density: 8.99e-5,
                },
                ElementRecord {
                    atomic_number: 8,
                    symbol: "O".into(),
                    molar_mass: 15.999,
                    density: 1.43e-3,
                },
            ],
            cross_sections: vec![CrossSectionRecord {
                atomic_number: 8,
                energy: vec![1.0, 10.0],
                total: vec![1000.0, 1.0],
                photo: vec![900.0, 0.9],
            }],
            lines: vec![LineRecord {
                atomic_number: 8,
                iupac_symbol: "KL3".into(),
                energy: 0.5249,
            }],
            compounds: vec![CompoundRecord {
                name: "Water, Liquid".into(),
                formula: "H2O".into(),
                density: 1.0,
            }],
            ..XrayYieldDataSet::default()
        }
    }

    #[test]
    fn test_resolve_element_and_formula() {
        let provider = TabulatedProvider::new(small_dataset());
        assert_eq!(provider.resolve_composition("O"), Some(Composition::single(8)));
        let water = provider.resolve_composition("H2O").unwrap();
        assert!((water.mass_fractions.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        // no molar mass for Fe in this data set
        assert!(provider.resolve_composition("Fe").is_none());
        assert!(provider.resolve_composition("Fe2O3").is_none());
    }

    #[test]
    fn test_named_compound_is_case_insensitive() {
        let provider = TabulatedProvider::new(small_dataset());
        let (comp, density) = provider.compound("water, liquid").unwrap();
        assert_eq!(density, 1.0);
        assert_eq!(comp.elements, vec![1, 8]);
    }

    #[test]
    fn test_cross_section_loglog() {
        let provider = TabulatedProvider::new(small_dataset());
        let mu = provider.element_cross_section(8, 10.0_f64.sqrt(), CrossSectionKind::Total);
        assert!((mu - 1000.0_f64.sqrt()).abs() < 1e-9);
        assert_eq!(provider.element_cross_section(26, 5.0, CrossSectionKind::Total), 0.0);
    }

    #[test]
    fn test_tabulated_density() {
        let provider = TabulatedProvider::new(small_dataset());
        assert_eq!(provider.tabulated_density("O"), 1.43e-3);
        assert_eq!(provider.tabulated_density("WATER, LIQUID"), 1.0);
        assert_eq!(provider.tabulated_density("Fe"), 0.0);
        assert_eq!(provider.tabulated_density("H2O"), 0.0);
    }

    #[test]
    fn test_non_positive_cross_section_row_yields_zero() {
        let mut data = small_dataset();
        data.cross_sections[0].photo[1] = 0.0;
        let provider = TabulatedProvider::new(data);
        assert_eq!(provider.element_cross_section(8, 2.0, CrossSectionKind::Photo), 0.0);
        assert!(provider.element_cross_section(8, 2.0, CrossSectionKind::Total) > 0.0);
    }

    #[test]
    fn test_missing_lookups_are_zero() {
        let provider = TabulatedProvider::new(small_dataset());
        assert_eq!(provider.line_energy(8, "KL3"), 0.5249);
        assert_eq!(provider.line_energy(8, "KM3"), 0.0);
        assert_eq!(provider.level_width(8, "K"), 0.0);
        assert_eq!(provider.fluorescence_cross_section(8, "KL3", 10.0), 0.0);
        assert!(provider.radionuclide("55Fe").is_none());
    }
}
