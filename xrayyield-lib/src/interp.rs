/// How a table lookup behaves outside its abscissa range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extrapolation {
    /// Hold the first/last tabulated value.
    Clamp,
    /// Return zero.
    Zero,
}

/// Linear interpolation of the table `(xp, fp)` at `x`.
///
/// `xp` must be increasing. An empty table yields 0.
pub fn interp_one(x: f64, xp: &[f64], fp: &[f64], outside: Extrapolation) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return 0.0;
    }
    if x < xp[0] || x > xp[n - 1] {
        return match outside {
            Extrapolation::Clamp if x < xp[0] => fp[0],
            Extrapolation::Clamp => fp[n - 1],
            Extrapolation::Zero => 0.0,
        };
    }
    if n == 1 {
        return fp[0];
    }

    let hi = xp[..n].partition_point(|&v| v < x).max(1);
    if xp[hi] == x {
        return fp[hi];
    }
    let lo = hi - 1;
    let span = xp[hi] - xp[lo];
    if span <= 0.0 {
        return fp[hi];
    }
    let t = (x - xp[lo]) / span;
    fp[lo] + t * (fp[hi] - fp[lo])
}

/// Linear interpolation at each point of `x` (like `numpy.interp` when clamped).
pub fn interp(x: &[f64], xp: &[f64], fp: &[f64], outside: Extrapolation) -> Vec<f64> {
    x.iter().map(|&xi| interp_one(xi, xp, fp, outside)).collect()
}

/// Natural log of every entry, or `None` if any entry is not positive.
pub fn ln_table(values: &[f64]) -> Option<Vec<f64>> {
    values
        .iter()
        .map(|&v| (v > 0.0).then(|| v.ln()))
        .collect()
}

/// Log-log interpolation over tables already passed through [`ln_table`],
/// clamped at the table ends.
///
/// Mass attenuation tables are close to power laws between edges, so this is
/// used for cross-section lookups. Non-positive queries and empty tables
/// yield 0.
pub fn interp_loglog_one(x: f64, log_xp: &[f64], log_fp: &[f64]) -> f64 {
    if x <= 0.0 || log_xp.is_empty() || log_fp.is_empty() {
        return 0.0;
    }
    interp_one(x.ln(), log_xp, log_fp, Extrapolation::Clamp).exp()
}
