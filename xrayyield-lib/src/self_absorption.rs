//! Attenuation of the exciting beam and of the emitted line inside a
//! finite-thickness target.

use crate::error::XrayYieldError;
use crate::material::ResolvedLayer;
use crate::provider::DataProvider;
use crate::synth::Diagnostics;

/// Below this optical depth the thin-target series replaces the closed form.
const THIN_TARGET_DEPTH: f64 = 1e-6;

/// Excitation geometry, angles in degrees from the target surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub incidence_deg: f64,
    pub exit_deg: f64,
}

/// `(1 - exp(-x)) / x`, continuous through `x = 0`.
pub fn escape_fraction(x: f64) -> f64 {
    if x.abs() < THIN_TARGET_DEPTH {
        1.0 - x / 2.0 + x * x / 6.0
    } else {
        -(-x).exp_m1() / x
    }
}

/// Self-absorption correction `A = (1 - exp(-χρt)) / (χρt)` with
/// `χ = μ(E0)/sin(α) + μ(E1)/sin(β)`, total cross-sections of the target's
/// bulk composition.
///
/// Returns 0 when the target has no composition or the geometry is unusable.
pub fn correction<P: DataProvider>(
    provider: &P,
    target: &ResolvedLayer,
    excitation_kev: f64,
    emission_kev: f64,
    geometry: Geometry,
    diagnostics: &mut Diagnostics,
) -> f64 {
    let Some(composition) = target.composition() else {
        tracing::error!(layer = %target.name, "self-absorption: target has no composition");
        diagnostics.push(XrayYieldError::UnresolvedComposition(target.name.clone()));
        return 0.0;
    };

    let sin_in = geometry.incidence_deg.to_radians().sin();
    let sin_out = geometry.exit_deg.to_radians().sin();
    if !(sin_in > 0.0 && sin_out > 0.0) {
        diagnostics.push(XrayYieldError::validation(
            "angle",
            format!("{}/{}", geometry.incidence_deg, geometry.exit_deg),
            "incidence and exit angles must lie in (0, 180) degrees",
        ));
        return 0.0;
    }

    let mu_in = provider.total_cross_section(composition, excitation_kev);
    let mu_out = provider.total_cross_section(composition, emission_kev);
    let chi = mu_in / sin_in + mu_out / sin_out;
    escape_fraction(chi * target.areal_density())
}
