//! Exposure of beam and radionuclide sources.
//!
//! A beam contributes `flux × duration` photons. A radionuclide contributes
//! `A(t) × duration` decays, where `A(t)` is the calibration activity decayed
//! to the measurement time. Decayed activity is always recomputed from the
//! calibration values, never stored.

use std::f64::consts::LN_2;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::constants::SECONDS_PER_DAY;
use crate::error::{Result, XrayYieldError};
use crate::synth::Diagnostics;

/// Half-lives (days) of the stock calibration sources.
pub const STOCK_HALF_LIVES: &[(&str, f64)] = &[
    ("55Fe", 1006.70),
    ("57Co", 272.11),
    ("109Cd", 463.26),
    ("125I", 59.49),
    ("137Cs", 11018.3),
    ("133Ba", 3854.7),
    ("153Gd", 239.472),
    ("238Pu", 32031.74),
    ("241Am", 157857.678),
    ("244Cm", 6610.52),
];

pub fn stock_half_life(name: &str) -> Option<f64> {
    STOCK_HALF_LIVES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, hl)| hl)
}

/// Days in each month; February always admits the 29th.
const DAYS_IN_MONTH: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// A civil date as entered on a calibration certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        let valid_day = (1..=12)
            .contains(&month)
            .then(|| DAYS_IN_MONTH[(month - 1) as usize])
            .is_some_and(|max| (1..=max).contains(&day));
        if !valid_day {
            return Err(XrayYieldError::validation(
                "date",
                format!("{year:04}{month:02}{day:02}"),
                "no such month/day",
            ));
        }
        Ok(Self { year, month, day })
    }

    /// Parse the 8-digit `YYYYMMDD` form.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(XrayYieldError::validation(
                "date",
                text,
                "expected 8 digits YYYYMMDD",
            ));
        }
        let field = |range: std::ops::Range<usize>| {
            text[range]
                .parse::<u32>()
                .map_err(|e| XrayYieldError::validation("date", text, e.to_string()))
        };
        let year = field(0..4)? as i32;
        Self::new(year, field(4..6)?, field(6..8)?)
    }

    /// Today's date in UTC.
    pub fn today() -> Self {
        Self::from_days_since_epoch(days_since_epoch_now().floor() as i64)
    }

    /// Days since 1970-01-01 in the proleptic Gregorian calendar.
    ///
    /// A 29th of February in a common year counts as 1 March.
    pub fn days_since_epoch(&self) -> i64 {
        let y = i64::from(self.year) - i64::from(self.month <= 2);
        let era = y.div_euclid(400);
        let yoe = y - era * 400;
        let m = i64::from(self.month);
        let doy = (153 * (m + if m > 2 { -3 } else { 9 }) + 2) / 5 + i64::from(self.day) - 1;
        let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
        era * 146_097 + doe - 719_468
    }

    pub fn from_days_since_epoch(days: i64) -> Self {
        let z = days + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z - era * 146_097;
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
        let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
        let year = (yoe + era * 400 + i64::from(month <= 2)) as i32;
        Self { year, month, day }
    }

    /// Whole days from `self` to `later` (negative if `later` is earlier).
    pub fn days_between(&self, later: &CalendarDate) -> f64 {
        (later.days_since_epoch() - self.days_since_epoch()) as f64
    }
}

impl std::fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

/// Fractional days since the epoch per the system clock.
fn days_since_epoch_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() / SECONDS_PER_DAY)
        .unwrap_or(0.0)
}

/// When the decayed activity is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceTime {
    Now,
    Date(CalendarDate),
}

/// Elapsed days from `calibration` to `reference`, including the elapsed
/// part of today when the reference is now.
pub fn elapsed_days(calibration: &CalendarDate, reference: ReferenceTime) -> f64 {
    match reference {
        ReferenceTime::Now => {
            days_since_epoch_now() - calibration.days_since_epoch() as f64
        }
        ReferenceTime::Date(date) => calibration.days_between(&date),
    }
}

/// `A0 · exp(-ln2 / T½ · Δdays)`. A non-positive half-life yields 0.
pub fn decayed_activity(calibration_activity: f64, half_life_days: f64, elapsed_days: f64) -> f64 {
    if half_life_days.is_nan() || half_life_days <= 0.0 {
        return 0.0;
    }
    calibration_activity * (-LN_2 / half_life_days * elapsed_days).exp()
}

/// Photons delivered by a beam over the exposure.
pub fn beam_yield(flux_per_s: f64, duration_s: f64) -> f64 {
    flux_per_s * duration_s
}

/// Decays of a source over the exposure.
pub fn decay_yield(activity_bq: f64, duration_s: f64) -> f64 {
    activity_bq * duration_s
}

/// `value` if it passes `ok`, otherwise `default` with a diagnostic.
pub(crate) fn or_default(
    diagnostics: &mut Diagnostics,
    field: &'static str,
    value: f64,
    ok: impl Fn(f64) -> bool,
    default: f64,
) -> f64 {
    if ok(value) {
        return value;
    }
    diagnostics.push(XrayYieldError::validation(
        field,
        value,
        format!("using default {default}"),
    ));
    default
}

/// Monochromatic excitation beam.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamSource {
    pub energy_kev: f64,
    pub incidence_angle_deg: f64,
    pub exit_angle_deg: f64,
    pub flux_per_s: f64,
    pub duration_s: f64,
}

impl Default for BeamSource {
    fn default() -> Self {
        Self {
            energy_kev: 15.0,
            incidence_angle_deg: 45.0,
            exit_angle_deg: 45.0,
            flux_per_s: 1e6,
            duration_s: 7200.0,
        }
    }
}

impl BeamSource {
    /// Replace each unusable field by its default, reporting it.
    pub fn validated(&self, diagnostics: &mut Diagnostics) -> BeamSource {
        let defaults = BeamSource::default();
        let positive = |v: f64| v.is_finite() && v > 0.0;
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;
        let angle = |v: f64| positive(v) && v <= 90.0;

        BeamSource {
            energy_kev: or_default(
                diagnostics,
                "beam energy_kev",
                self.energy_kev,
                positive,
                defaults.energy_kev,
            ),
            incidence_angle_deg: or_default(
                diagnostics,
                "incidence_angle_deg",
                self.incidence_angle_deg,
                angle,
                defaults.incidence_angle_deg,
            ),
            exit_angle_deg: or_default(
                diagnostics,
                "exit_angle_deg",
                self.exit_angle_deg,
                angle,
                defaults.exit_angle_deg,
            ),
            flux_per_s: or_default(
                diagnostics,
                "flux_per_s",
                self.flux_per_s,
                non_negative,
                defaults.flux_per_s,
            ),
            duration_s: or_default(
                diagnostics,
                "beam duration_s",
                self.duration_s,
                non_negative,
                defaults.duration_s,
            ),
        }
    }

    pub fn yield_multiplier(&self) -> f64 {
        beam_yield(self.flux_per_s, self.duration_s)
    }
}

/// A sealed calibration source viewed by the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadionuclideSource {
    pub name: String,
    pub calibration_activity_bq: f64,
    /// `YYYYMMDD`
    pub calibration_date: String,
    /// `YYYYMMDD`; `None` means now.
    pub measurement_date: Option<String>,
    pub duration_s: f64,
}

impl Default for RadionuclideSource {
    fn default() -> Self {
        Self {
            name: String::new(),
            calibration_activity_bq: 1e6,
            calibration_date: "20110311".to_string(),
            measurement_date: None,
            duration_s: 3600.0,
        }
    }
}

/// Decay bookkeeping for one source, as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityReport {
    pub calibration_activity_bq: f64,
    pub half_life_days: f64,
    pub elapsed_days: f64,
    pub activity_today_bq: f64,
    pub activity_at_measurement_bq: f64,
}

impl RadionuclideSource {
    /// Parse a date field; an invalid date is replaced by today.
    fn date_or_today(field: &str, diagnostics: &mut Diagnostics) -> CalendarDate {
        CalendarDate::parse(field).unwrap_or_else(|err| {
            diagnostics.push(err);
            CalendarDate::today()
        })
    }

    /// Decayed activity at the measurement date (or now).
    ///
    /// An invalid calibration date is taken as today, so `Δdays = 0`.
    pub fn activity_report(&self, half_life_days: f64, diagnostics: &mut Diagnostics) -> ActivityReport {
        let calibration_activity = or_default(
            diagnostics,
            "calibration_activity_bq",
            self.calibration_activity_bq,
            |v| v.is_finite() && v >= 0.0,
            0.0,
        );

        let (calibration, reference, today_elapsed) = match CalendarDate::parse(&self.calibration_date) {
            Ok(date) => {
                let reference = match &self.measurement_date {
                    Some(m) => ReferenceTime::Date(Self::date_or_today(m, diagnostics)),
                    None => ReferenceTime::Now,
                };
                (date, reference, elapsed_days(&date, ReferenceTime::Now))
            }
            Err(err) => {
                diagnostics.push(err);
                let today = CalendarDate::today();
                (today, ReferenceTime::Date(today), 0.0)
            }
        };
        let elapsed = match reference {
            ReferenceTime::Now => today_elapsed,
            ReferenceTime::Date(_) => elapsed_days(&calibration, reference),
        };

        if half_life_days.is_nan() || half_life_days <= 0.0 {
            diagnostics.push(XrayYieldError::LookupFailure {
                what: "half-life",
                detail: format!("{} has half-life {half_life_days}", self.name),
            });
        }

        ActivityReport {
            calibration_activity_bq: calibration_activity,
            half_life_days,
            elapsed_days: elapsed,
            activity_today_bq: decayed_activity(calibration_activity, half_life_days, today_elapsed),
            activity_at_measurement_bq: decayed_activity(calibration_activity, half_life_days, elapsed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_dates() {
        assert_eq!(
            CalendarDate::parse("20110311").unwrap(),
            CalendarDate { year: 2011, month: 3, day: 11 }
        );
        // February 29 is accepted in any year
        assert!(CalendarDate::parse("20230229").is_ok());
    }

    #[test]
    fn test_parse_rejects_bad_dates() {
        assert!(CalendarDate::parse("2011031").is_err());
        assert!(CalendarDate::parse("20110230").is_err());
        assert!(CalendarDate::parse("20110431").is_err());
        assert!(CalendarDate::parse("20111301").is_err());
        assert!(CalendarDate::parse("20110300").is_err());
        assert!(CalendarDate::parse("2011-3-1").is_err());
    }

    #[test]
    fn test_epoch_day_round_trip() {
        let epoch = CalendarDate::new(1970, 1, 1).unwrap();
        assert_eq!(epoch.days_since_epoch(), 0);
        let d = CalendarDate::new(2020, 3, 11).unwrap();
        assert_eq!(CalendarDate::from_days_since_epoch(d.days_since_epoch()), d);
        let from = CalendarDate::parse("20110311").unwrap();
        assert_eq!(from.days_between(&d), 3288.0);
    }

    #[test]
    fn test_decay_law() {
        assert_eq!(decayed_activity(1e6, 1006.70, 0.0), 1e6);
        assert!((decayed_activity(1e6, 1006.70, 1006.70) - 5e5).abs() < 1e-6 * 5e5);
        assert_eq!(decayed_activity(1e6, 0.0, 10.0), 0.0);
    }

    #[test]
    fn test_stock_half_life() {
        assert_eq!(stock_half_life("241Am"), Some(157857.678));
        assert_eq!(stock_half_life("60Co"), None);
    }

    #[test]
    fn test_beam_validation_substitutes_defaults() {
        let mut diag = Diagnostics::default();
        let beam = BeamSource {
            energy_kev: -1.0,
            incidence_angle_deg: 0.0,
            ..BeamSource::default()
        }
        .validated(&mut diag);
        assert_eq!(beam, BeamSource::default());
        assert_eq!(diag.len(), 2);
        assert_eq!(beam.yield_multiplier(), 1e6 * 7200.0);
    }
}
