pub mod activity;
pub mod attenuation;
pub mod chemparser;
pub mod constants;
pub mod elements;
pub mod error;
pub mod grid;
pub mod interp;
pub mod lines;
pub mod material;
pub mod output;
pub mod profile;
pub mod provider;
pub mod self_absorption;
pub mod synth;
pub mod tabulated;

pub use activity::{ActivityReport, BeamSource, CalendarDate, RadionuclideSource, ReferenceTime};
pub use attenuation::{AbsorptionCombination, LayerCurve, StackResponse};
pub use error::{Result, XrayYieldError};
pub use grid::{EnergyGrid, GridMode, GridSettings};
pub use lines::{LineIntensityCalculator, LineKey, LineOrigin, SpectralLine};
pub use material::{Layer, LayerKind, MaterialStack, TransmissionCurve};
pub use profile::{VoigtProfile, voigt};
pub use provider::{Composition, CrossSectionKind, DataProvider};
pub use synth::{
    Component, DetectorSettings, Diagnostics, LineEntry, Spectrum, SpectrumSynthesizer, SynthesisConfig,
    SynthesisResult,
};
pub use tabulated::TabulatedProvider;
pub use xrayyield_data;
