//! Two-column text artifacts of a synthesis pass.
//!
//! Rows are `energy,value` in the C `%1.6e` style. Existing files are never
//! overwritten: a taken name `qe.txt` becomes `qe_001.txt`, `qe_002.txt`, ...

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::synth::{Spectrum, SynthesisResult};

/// Give up after this many numbered siblings.
const MAX_SUFFIX: u32 = 999_999;

/// `name_NNN.ext` next to `path`.
fn numbered_sibling(path: &Path, n: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{n:03}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{n:03}"),
    };
    path.with_file_name(name)
}

/// First of `path`, `name_001.ext`, `name_002.ext`, ... that does not exist.
pub fn non_colliding_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    (1..=MAX_SUFFIX)
        .map(|n| numbered_sibling(path, n))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| numbered_sibling(path, MAX_SUFFIX))
}

/// Create a new file at `path` or at its first free numbered sibling.
fn create_unique(path: &Path) -> Result<(File, PathBuf)> {
    let candidates = std::iter::once(path.to_path_buf()).chain((1..=MAX_SUFFIX).map(|n| numbered_sibling(path, n)));
    for candidate in candidates {
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => return Ok((file, candidate)),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Err(io::Error::new(
        ErrorKind::AlreadyExists,
        format!("no free name for {}", path.display()),
    )
    .into())
}

/// Format like C's `%1.6e`: six decimals and a signed, two-digit exponent.
pub fn format_scientific(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let formatted = format!("{value:.6e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        }
        None => formatted,
    }
}

/// Write `spectrum` to `path` (or a free sibling) and return the path used.
pub fn write_spectrum(path: &Path, spectrum: &Spectrum) -> Result<PathBuf> {
    let (file, used) = create_unique(path)?;
    let mut out = BufWriter::new(file);
    for (energy, value) in spectrum.iter() {
        writeln!(out, "{},{}", format_scientific(energy), format_scientific(value))?;
    }
    out.flush()?;
    tracing::info!(path = %used.display(), rows = spectrum.len(), "spectrum written");
    Ok(used)
}

/// Paths actually written by [`write_results`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub quantum_efficiency: PathBuf,
    pub fluorescence: PathBuf,
}

/// Write `qe.txt` and `fluor.txt` into `dir`, creating it if needed.
pub fn write_results(dir: &Path, result: &SynthesisResult) -> Result<WrittenArtifacts> {
    fs::create_dir_all(dir)?;
    Ok(WrittenArtifacts {
        quantum_efficiency: write_spectrum(&dir.join("qe.txt"), &result.quantum_efficiency)?,
        fluorescence: write_spectrum(&dir.join("fluor.txt"), &result.fluorescence)?,
    })
}
