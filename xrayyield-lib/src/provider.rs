//! The reference-data boundary of the engine.
//!
//! Line energies, level widths, cross-sections and decay schemes are not part
//! of this crate; a [`DataProvider`] supplies them. Lookups report failure as
//! `0` (or `None`) and never panic, so the synthesis pass can degrade around
//! missing data.

pub use xrayyield_data::{GammaEmissionRecord, RadionuclideRecord, XrayEmissionRecord};

/// Kind of mass attenuation cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrossSectionKind {
    Photo,
    Total,
}

/// Elemental make-up of a material as mass fractions.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub elements: Vec<u16>,
    pub mass_fractions: Vec<f64>,
}

impl Composition {
    pub fn single(z: u16) -> Self {
        Self {
            elements: vec![z],
            mass_fractions: vec![1.0],
        }
    }

    /// Build from atom counts and molar masses. `None` if any molar mass is
    /// missing or the formula weight is not positive.
    pub fn from_counts(
        counts: impl IntoIterator<Item = (u16, f64)>,
        molar_mass: impl Fn(u16) -> Option<f64>,
    ) -> Option<Self> {
        let mut elements = Vec::new();
        let mut weights = Vec::new();
        for (z, count) in counts {
            elements.push(z);
            weights.push(count * molar_mass(z)?);
        }
        let total: f64 = weights.iter().sum();
        if total.is_nan() || total <= 0.0 {
            return None;
        }
        Some(Self {
            elements,
            mass_fractions: weights.into_iter().map(|w| w / total).collect(),
        })
    }

    pub fn mass_fraction(&self, z: u16) -> Option<f64> {
        self.elements
            .iter()
            .position(|&e| e == z)
            .map(|i| self.mass_fractions[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, f64)> + '_ {
        self.elements
            .iter()
            .copied()
            .zip(self.mass_fractions.iter().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Source of atomic and nuclear reference data, in keV and cm²/g.
///
/// Implementations must be side-effect free; the synthesizer may query them
/// from several threads when the `parallel` feature is enabled.
pub trait DataProvider: Sync {
    /// Resolve an element symbol, chemical formula or named compound.
    fn resolve_composition(&self, name: &str) -> Option<Composition>;

    /// Elemental mass attenuation coefficient, 0 on failure.
    fn element_cross_section(&self, z: u16, energy_kev: f64, kind: CrossSectionKind) -> f64;

    /// Line fluorescence production cross-section for an IUPAC line, 0 on failure.
    fn fluorescence_cross_section(&self, z: u16, line: &str, excitation_kev: f64) -> f64;

    /// Emission energy of an IUPAC line, 0 on failure.
    fn line_energy(&self, z: u16, line: &str) -> f64;

    /// Natural width of an atomic level (`K`, `L3`, `M5`, ...), 0 on failure.
    fn level_width(&self, z: u16, shell: &str) -> f64;

    fn radionuclide(&self, name: &str) -> Option<RadionuclideRecord>;

    /// Tabulated density of an element or named compound in g/cm³, 0 when unknown.
    fn tabulated_density(&self, _name: &str) -> f64 {
        0.0
    }

    /// Mass-fraction weighted cross-section of a composition.
    fn cross_section(&self, composition: &Composition, energy_kev: f64, kind: CrossSectionKind) -> f64 {
        composition
            .iter()
            .map(|(z, frac)| frac * self.element_cross_section(z, energy_kev, kind))
            .sum()
    }

    fn total_cross_section(&self, composition: &Composition, energy_kev: f64) -> f64 {
        self.cross_section(composition, energy_kev, CrossSectionKind::Total)
    }

    fn photoelectric_cross_section(&self, composition: &Composition, energy_kev: f64) -> f64 {
        self.cross_section(composition, energy_kev, CrossSectionKind::Photo)
    }
}

impl<P: DataProvider + ?Sized> DataProvider for &P {
    fn resolve_composition(&self, name: &str) -> Option<Composition> {
        (**self).resolve_composition(name)
    }

    fn element_cross_section(&self, z: u16, energy_kev: f64, kind: CrossSectionKind) -> f64 {
        (**self).element_cross_section(z, energy_kev, kind)
    }

    fn fluorescence_cross_section(&self, z: u16, line: &str, excitation_kev: f64) -> f64 {
        (**self).fluorescence_cross_section(z, line, excitation_kev)
    }

    fn line_energy(&self, z: u16, line: &str) -> f64 {
        (**self).line_energy(z, line)
    }

    fn level_width(&self, z: u16, shell: &str) -> f64 {
        (**self).level_width(z, shell)
    }

    fn radionuclide(&self, name: &str) -> Option<RadionuclideRecord> {
        (**self).radionuclide(name)
    }

    fn tabulated_density(&self, name: &str) -> f64 {
        (**self).tabulated_density(name)
    }

    fn cross_section(&self, composition: &Composition, energy_kev: f64, kind: CrossSectionKind) -> f64 {
        (**self).cross_section(composition, energy_kev, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mass_fractions_from_counts() {
        // H2O with H = 1.008, O = 15.999
        let masses = |z: u16| match z {
            1 => Some(1.008),
            8 => Some(15.999),
            _ => None,
        };
        let comp = Composition::from_counts([(1, 2.0), (8, 1.0)], masses).unwrap();
        let total = 2.0 * 1.008 + 15.999;
        assert!((comp.mass_fraction(1).unwrap() - 2.016 / total).abs() < 1e-12);
        assert!((comp.mass_fraction(8).unwrap() - 15.999 / total).abs() < 1e-12);
        assert_eq!(comp.mass_fraction(26), None);
    }

    #[test]
    fn test_missing_molar_mass_fails() {
        assert!(Composition::from_counts([(1, 2.0), (8, 1.0)], |_| None).is_none());
        assert!(Composition::from_counts(Vec::new(), |_| Some(1.0)).is_none());
    }
}
