//! Transmission through filters and absorption in detectors.
//!
//! Every curve is sampled on the synthesis grid. Per-layer curves are kept
//! alongside the combined one so they can be shown individually.

use serde::{Deserialize, Serialize};

use crate::error::XrayYieldError;
use crate::grid::EnergyGrid;
use crate::material::{Medium, ResolvedLayer};
use crate::provider::{CrossSectionKind, DataProvider};
use crate::synth::Diagnostics;

/// How per-layer detector absorption is combined over a multi-layer detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbsorptionCombination {
    /// `1 - Π exp(-μ_total ρ t)`: photons removed by any interaction.
    #[default]
    Mixed,
    /// `1 - Π exp(-μ_photo ρ t)`: photons removed by photoabsorption only.
    Photoelectric,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerCurve {
    pub name: String,
    pub thickness: f64,
    pub values: Vec<f64>,
}

/// Combined and per-layer response of a stack on the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct StackResponse {
    pub combined: Vec<f64>,
    pub per_layer: Vec<LayerCurve>,
}

impl StackResponse {
    fn neutral(len: usize, value: f64) -> Self {
        Self {
            combined: vec![value; len],
            per_layer: Vec::new(),
        }
    }
}

/// `exp(-μ(E) ρ t)` on the grid for one layer.
fn layer_transmission<P: DataProvider>(
    provider: &P,
    layer: &ResolvedLayer,
    grid: &EnergyGrid,
    kind: CrossSectionKind,
) -> Vec<f64> {
    match &layer.medium {
        Medium::Bulk(composition) => {
            let rho_t = layer.areal_density();
            grid.energies_kev()
                .iter()
                .map(|&e| (-provider.cross_section(composition, e, kind) * rho_t).exp())
                .collect()
        }
        Medium::Tabulated(curve) => curve.sample(grid),
    }
}

/// Filter transmission: product of `exp(-μ_total ρ t)` over the stack.
///
/// An empty stack transmits everything.
pub fn transmission<P: DataProvider>(
    provider: &P,
    layers: &[ResolvedLayer],
    grid: &EnergyGrid,
    diagnostics: &mut Diagnostics,
) -> StackResponse {
    if layers.is_empty() {
        diagnostics.push(XrayYieldError::ConfigurationIncomplete("no filter materials"));
        return StackResponse::neutral(grid.len(), 1.0);
    }

    let mut combined = vec![1.0; grid.len()];
    let mut per_layer = Vec::with_capacity(layers.len());
    for layer in layers {
        let each = layer_transmission(provider, layer, grid, CrossSectionKind::Total);
        for (c, t) in combined.iter_mut().zip(&each) {
            *c *= t;
        }
        per_layer.push(LayerCurve {
            name: layer.name.clone(),
            thickness: layer.thickness,
            values: each,
        });
    }
    StackResponse { combined, per_layer }
}

/// Detector photoabsorption.
///
/// Per layer this is `1 - exp(-μ_photo ρ t)`. The combined curve follows
/// `mode`; see [`AbsorptionCombination`]. An empty stack absorbs nothing.
pub fn photoabsorption<P: DataProvider>(
    provider: &P,
    layers: &[ResolvedLayer],
    grid: &EnergyGrid,
    mode: AbsorptionCombination,
    diagnostics: &mut Diagnostics,
) -> StackResponse {
    if layers.is_empty() {
        diagnostics.push(XrayYieldError::ConfigurationIncomplete("no detector set"));
        return StackResponse::neutral(grid.len(), 0.0);
    }

    let mut surviving = vec![1.0; grid.len()];
    let mut per_layer = Vec::with_capacity(layers.len());
    for layer in layers {
        let photo = layer_transmission(provider, layer, grid, CrossSectionKind::Photo);
        let combining = match mode {
            AbsorptionCombination::Photoelectric => photo.clone(),
            AbsorptionCombination::Mixed => match layer.medium {
                Medium::Tabulated(_) => photo.clone(),
                Medium::Bulk(_) => layer_transmission(provider, layer, grid, CrossSectionKind::Total),
            },
        };
        for (s, t) in surviving.iter_mut().zip(&combining) {
            *s *= t;
        }
        per_layer.push(LayerCurve {
            name: layer.name.clone(),
            thickness: layer.thickness,
            values: photo.into_iter().map(|t| 1.0 - t).collect(),
        });
    }

    StackResponse {
        combined: surviving.into_iter().map(|s| 1.0 - s).collect(),
        per_layer,
    }
}

/// Detector absorption by all interactions, `1 - exp(-μ_total ρ t)`.
pub fn total_absorption<P: DataProvider>(
    provider: &P,
    layers: &[ResolvedLayer],
    grid: &EnergyGrid,
    diagnostics: &mut Diagnostics,
) -> StackResponse {
    if layers.is_empty() {
        diagnostics.push(XrayYieldError::ConfigurationIncomplete("no detector set"));
        return StackResponse::neutral(grid.len(), 0.0);
    }

    let mut surviving = vec![1.0; grid.len()];
    let mut per_layer = Vec::with_capacity(layers.len());
    for layer in layers {
        let each = layer_transmission(provider, layer, grid, CrossSectionKind::Total);
        for (s, t) in surviving.iter_mut().zip(&each) {
            *s *= t;
        }
        per_layer.push(LayerCurve {
            name: layer.name.clone(),
            thickness: layer.thickness,
            values: each.into_iter().map(|t| 1.0 - t).collect(),
        });
    }

    StackResponse {
        combined: surviving.into_iter().map(|s| 1.0 - s).collect(),
        per_layer,
    }
}

/// Quantum efficiency, `transmission × photoabsorption`, point by point.
pub fn quantum_efficiency(transmission: &StackResponse, absorption: &StackResponse) -> Vec<f64> {
    transmission
        .combined
        .iter()
        .zip(&absorption.combined)
        .map(|(t, a)| t * a)
        .collect()
}
