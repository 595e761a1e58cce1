use criterion::{Criterion, black_box, criterion_group, criterion_main};
use xrayyield::chemparser::chemparse;
use xrayyield::provider::RadionuclideRecord;
use xrayyield::{
    Composition, CrossSectionKind, DataProvider, EnergyGrid, Layer, MaterialStack, SpectrumSynthesizer,
    SynthesisConfig, voigt,
};

/// Constant cross-sections and a handful of K lines.
struct Flat;

impl DataProvider for Flat {
    fn resolve_composition(&self, name: &str) -> Option<Composition> {
        let counts = chemparse(name).ok()?;
        Composition::from_counts(counts, |z| Some(2.0 * f64::from(z)))
    }

    fn element_cross_section(&self, _z: u16, _energy_kev: f64, kind: CrossSectionKind) -> f64 {
        match kind {
            CrossSectionKind::Total => 1.0,
            CrossSectionKind::Photo => 0.5,
        }
    }

    fn fluorescence_cross_section(&self, _z: u16, _line: &str, _excitation_kev: f64) -> f64 {
        1.0
    }

    fn line_energy(&self, z: u16, line: &str) -> f64 {
        let z = f64::from(z);
        match line {
            "KL3" => 0.0102 * z * z,
            "KL2" => 0.0101 * z * z,
            "KM3" => 0.0112 * z * z,
            _ => 0.0,
        }
    }

    fn level_width(&self, _z: u16, _shell: &str) -> f64 {
        1e-3
    }

    fn radionuclide(&self, _name: &str) -> Option<RadionuclideRecord> {
        None
    }
}

fn bench_voigt(c: &mut Criterion) {
    let grid = EnergyGrid::default();
    let x = grid.energies_ev();

    c.bench_function("voigt_20k_points", |b| {
        b.iter(|| black_box(voigt(black_box(&x), 6404.0, 1.0, 3.4)));
    });

    c.bench_function("lorentzian_20k_points", |b| {
        b.iter(|| black_box(voigt(black_box(&x), 6404.0, 1.0, 0.0)));
    });
}

fn bench_recompute(c: &mut Criterion) {
    let synth = SpectrumSynthesizer::new(Flat);
    let config = SynthesisConfig {
        filters: MaterialStack::new(vec![Layer::element("Be", 1.85, 0.0025)]),
        detectors: MaterialStack::new(vec![Layer::element("Si", 2.33, 0.05)]),
        target: Some(Layer::compound("FeNiCu", 8.0, 1e-4)),
        ..SynthesisConfig::default()
    };

    c.bench_function("recompute_default_grid", |b| {
        b.iter(|| black_box(synth.recompute(black_box(&config))));
    });
}

criterion_group!(benches, bench_voigt, bench_recompute);
criterion_main!(benches);
