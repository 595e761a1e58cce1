mod common;

use std::fs;

use common::ConstantProvider;
use xrayyield::output::{non_colliding_path, write_results, write_spectrum};
use xrayyield::{EnergyGrid, GridSettings, Layer, MaterialStack, Spectrum, SpectrumSynthesizer, SynthesisConfig};

fn small_spectrum() -> Spectrum {
    let grid = EnergyGrid::build(0.1, 0.3, 0.1).unwrap();
    Spectrum::new(&grid, vec![0.97335, 0.0, 12.5])
}

#[test]
fn test_write_spectrum_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_spectrum(&dir.path().join("qe.txt"), &small_spectrum()).unwrap();
    let text = fs::read_to_string(path).unwrap();
    let rows: Vec<_> = text.lines().collect();
    assert_eq!(
        rows,
        vec![
            "1.000000e-01,9.733500e-01",
            "2.000000e-01,0.000000e+00",
            "3.000000e-01,1.250000e+01",
        ]
    );
}

#[test]
fn test_writing_twice_never_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("fluor.txt");

    let first = write_spectrum(&target, &small_spectrum()).unwrap();
    let second = write_spectrum(&target, &small_spectrum()).unwrap();
    let third = write_spectrum(&target, &small_spectrum()).unwrap();

    assert_eq!(first, target);
    assert_eq!(second, dir.path().join("fluor_001.txt"));
    assert_eq!(third, dir.path().join("fluor_002.txt"));
    assert_ne!(first, second);
    assert_eq!(non_colliding_path(&target), dir.path().join("fluor_003.txt"));
}

#[test]
fn test_existing_file_is_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("qe.txt");
    fs::write(&target, "keep me\n").unwrap();

    let written = write_spectrum(&target, &small_spectrum()).unwrap();
    assert_ne!(written, target);
    assert_eq!(fs::read_to_string(&target).unwrap(), "keep me\n");
}

#[test]
fn test_write_results_creates_both_artifacts() {
    let synth = SpectrumSynthesizer::new(ConstantProvider::default());
    let result = synth.recompute(&SynthesisConfig {
        grid: GridSettings {
            low_kev: 1.0,
            high_kev: 2.0,
            step_kev: 0.25,
            ..GridSettings::default()
        },
        detectors: MaterialStack::new(vec![Layer::element("Si", 2.33, 0.05)]),
        ..SynthesisConfig::default()
    });

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("output");
    let first = write_results(&out, &result).unwrap();
    assert_eq!(first.quantum_efficiency, out.join("qe.txt"));
    assert_eq!(first.fluorescence, out.join("fluor.txt"));
    assert_eq!(fs::read_to_string(&first.quantum_efficiency).unwrap().lines().count(), 5);

    let second = write_results(&out, &result).unwrap();
    assert_eq!(second.quantum_efficiency, out.join("qe_001.txt"));
    assert_eq!(second.fluorescence, out.join("fluor_001.txt"));
}
