use std::io;

/// Errors and recoverable conditions raised while synthesizing spectra.
///
/// The first five variants are the recoverable conditions a synthesis pass
/// degrades around; they are normally reported through
/// [`Diagnostics`](crate::synth::Diagnostics) rather than returned.
#[derive(Debug, thiserror::Error)]
pub enum XrayYieldError {
    #[error("invalid {field} = {value}: {reason}")]
    Validation {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("unresolved composition: {0}")]
    UnresolvedComposition(String),
    #[error("lookup failed for {what}: {detail}")]
    LookupFailure { what: &'static str, detail: String },
    #[error("degenerate line {element} {label}: zero natural width and zero resolution")]
    DegenerateLine { element: String, label: String },
    #[error("configuration incomplete: {0}")]
    ConfigurationIncomplete(&'static str),
    #[error("invalid chemical formula: {0}")]
    InvalidFormula(String),
    #[error("data error: {0}")]
    DataError(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, XrayYieldError>;

impl XrayYieldError {
    pub(crate) fn validation(field: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// True for the conditions a synthesis pass recovers from locally.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::UnresolvedComposition(_)
                | Self::LookupFailure { .. }
                | Self::DegenerateLine { .. }
                | Self::ConfigurationIncomplete(_)
        )
    }
}
