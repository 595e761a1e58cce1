//! Layers of filters, targets and detectors.
//!
//! A [`Layer`] is what the user describes; a [`ResolvedLayer`] is the same
//! layer after its composition has been looked up once through the
//! [`DataProvider`].

use serde::{Deserialize, Serialize};

use crate::error::XrayYieldError;
use crate::grid::EnergyGrid;
use crate::interp::{Extrapolation, interp};
use crate::provider::{Composition, DataProvider};
use crate::synth::Diagnostics;

/// Tabulated transmission of a window, `(energy in eV, transmission in %)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransmissionCurve {
    pub energy_ev: Vec<f64>,
    pub percent: Vec<f64>,
}

impl TransmissionCurve {
    /// Transmission fraction on the grid, holding the end values outside the table.
    pub fn sample(&self, grid: &EnergyGrid) -> Vec<f64> {
        interp(&grid.energies_ev(), &self.energy_ev, &self.percent, Extrapolation::Clamp)
            .into_iter()
            .map(|p| p / 100.0)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerKind {
    Element { symbol: String },
    Compound { formula: String },
    NistCompound { name: String },
    /// A window characterised only by a measured transmission curve.
    SpecialWindow { name: String, curve: TransmissionCurve },
}

/// One slab of material; thickness in cm, density in g/cm³.
///
/// A non-positive density on an element or named compound layer means
/// "use the tabulated density".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub kind: LayerKind,
    pub density: f64,
    pub thickness: f64,
}

impl Layer {
    pub fn element(symbol: &str, density: f64, thickness: f64) -> Self {
        Self {
            kind: LayerKind::Element {
                symbol: symbol.to_string(),
            },
            density,
            thickness,
        }
    }

    pub fn compound(formula: &str, density: f64, thickness: f64) -> Self {
        Self {
            kind: LayerKind::Compound {
                formula: formula.to_string(),
            },
            density,
            thickness,
        }
    }

    pub fn nist_compound(name: &str, density: f64, thickness: f64) -> Self {
        Self {
            kind: LayerKind::NistCompound {
                name: name.to_string(),
            },
            density,
            thickness,
        }
    }

    /// Special windows carry no density; the curve already includes thickness.
    pub fn special_window(name: &str, curve: TransmissionCurve) -> Self {
        Self {
            kind: LayerKind::SpecialWindow {
                name: name.to_string(),
                curve,
            },
            density: 1.0,
            thickness: 1.0,
        }
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            LayerKind::Element { symbol } => symbol,
            LayerKind::Compound { formula } => formula,
            LayerKind::NistCompound { name } | LayerKind::SpecialWindow { name, .. } => name,
        }
    }

    /// The given density, or the tabulated one for elements and named
    /// compounds when none is given (zero or negative).
    fn effective_density<P: DataProvider>(&self, provider: &P) -> f64 {
        if self.density.is_finite() && self.density > 0.0 {
            return self.density;
        }
        let tabulated = match &self.kind {
            LayerKind::Element { symbol } => provider.tabulated_density(symbol),
            LayerKind::NistCompound { name } => provider.tabulated_density(name),
            LayerKind::Compound { .. } | LayerKind::SpecialWindow { .. } => 0.0,
        };
        if tabulated > 0.0 {
            tracing::debug!(layer = self.name(), density = tabulated, "using tabulated density");
        }
        tabulated
    }

    /// Look the composition up once. Layers that cannot contribute are
    /// reported and dropped.
    pub fn resolve<P: DataProvider>(&self, provider: &P, diagnostics: &mut Diagnostics) -> Option<ResolvedLayer> {
        if let LayerKind::SpecialWindow { curve, .. } = &self.kind {
            return Some(ResolvedLayer {
                name: self.name().to_string(),
                density: self.density,
                thickness: self.thickness,
                medium: Medium::Tabulated(curve.clone()),
            });
        }

        let density = self.effective_density(provider);
        if !(density.is_finite() && density > 0.0) {
            diagnostics.push(XrayYieldError::validation(
                "density",
                self.density,
                format!("layer {} must have a positive density", self.name()),
            ));
            return None;
        }
        if !(self.thickness.is_finite() && self.thickness > 0.0) {
            diagnostics.push(XrayYieldError::validation(
                "thickness",
                self.thickness,
                format!("layer {} must have a positive thickness", self.name()),
            ));
            return None;
        }

        match provider.resolve_composition(self.name()) {
            Some(composition) if !composition.is_empty() => Some(ResolvedLayer {
                name: self.name().to_string(),
                density,
                thickness: self.thickness,
                medium: Medium::Bulk(composition),
            }),
            _ => {
                diagnostics.push(XrayYieldError::UnresolvedComposition(self.name().to_string()));
                None
            }
        }
    }
}

/// What a resolved layer is made of.
#[derive(Debug, Clone, PartialEq)]
pub enum Medium {
    Bulk(Composition),
    Tabulated(TransmissionCurve),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLayer {
    pub name: String,
    pub density: f64,
    pub thickness: f64,
    pub medium: Medium,
}

impl ResolvedLayer {
    /// Areal density ρ·t in g/cm².
    pub fn areal_density(&self) -> f64 {
        self.density * self.thickness
    }

    pub fn composition(&self) -> Option<&Composition> {
        match &self.medium {
            Medium::Bulk(c) => Some(c),
            Medium::Tabulated(_) => None,
        }
    }
}

/// Layers in the order radiation traverses them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialStack {
    pub layers: Vec<Layer>,
}

impl MaterialStack {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn resolve<P: DataProvider>(&self, provider: &P, diagnostics: &mut Diagnostics) -> Vec<ResolvedLayer> {
        self.layers
            .iter()
            .filter_map(|layer| layer.resolve(provider, diagnostics))
            .collect()
    }
}

impl FromIterator<Layer> for MaterialStack {
    fn from_iter<I: IntoIterator<Item = Layer>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
