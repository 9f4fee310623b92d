//! Error taxonomy for the hedge signal pipeline
//!
//! The core never retries and never swallows: every failure surfaces as a
//! typed [`HedgeError`] and the caller decides what to tell the user.

use chrono::NaiveDate;
use thiserror::Error;

/// Reasons a price series is rejected before indicator computation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedInput {
    #[error("bar {index}: date {current} is not after previous date {previous}")]
    NonMonotonicDate {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("bar {index}: duplicate date {date}")]
    DuplicateDate { index: usize, date: NaiveDate },

    #[error("bar {index} ({date}): close must be positive, got {close}")]
    NonPositiveClose {
        index: usize,
        date: NaiveDate,
        close: f64,
    },

    #[error("bar {index} ({date}): close is not a finite number")]
    NonFiniteClose { index: usize, date: NaiveDate },

    #[error("row {row}: missing field '{field}'")]
    MissingField { row: usize, field: &'static str },

    #[error("row {row}: cannot parse {field} from '{value}'")]
    InvalidField {
        row: usize,
        field: &'static str,
        value: String,
    },
}

/// Errors surfaced by the hedge engine and its collaborators
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HedgeError {
    #[error("insufficient history: need at least {required} bars, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("malformed input: {0}")]
    MalformedInput(#[from] MalformedInput),

    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type HedgeResult<T> = Result<T, HedgeError>;

/// User-facing failure classes
///
/// Dashboards and notifications word their messages per class; the wording
/// itself lives in the presentation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NoData,
    StaleData,
    ComputationError,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NoData => "no data",
            FailureKind::StaleData => "stale data",
            FailureKind::ComputationError => "computation error",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl HedgeError {
    /// Classify the error for user-visible reporting
    pub fn category(&self) -> FailureKind {
        match self {
            HedgeError::DataUnavailable(_) | HedgeError::InsufficientHistory { .. } => {
                FailureKind::NoData
            }
            HedgeError::MalformedInput(_) | HedgeError::InvalidParameter(_) => {
                FailureKind::ComputationError
            }
        }
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        HedgeError::DataUnavailable(msg.into())
    }
}

impl From<reqwest::Error> for HedgeError {
    fn from(err: reqwest::Error) -> Self {
        Self::DataUnavailable(err.to_string())
    }
}
