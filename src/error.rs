//! Error types for configuration loading and simulation.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::{BusinessKind, OccupationKind, SimTimestamp};

/// Problems detected before the simulation starts. Generation never begins
/// with a config that fails validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A config or corpus file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or shape error.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{business} lists a {occupation} vacancy but {occupation} has no job level")]
    VacancyWithoutJobLevel {
        business: BusinessKind,
        occupation: OccupationKind,
    },

    #[error("business kind {0} has no initial vacancy table")]
    BusinessWithoutVacancies(BusinessKind),

    #[error("occupation {0} has no job level")]
    MissingJobLevel(OccupationKind),

    #[error("occupation {0} has no industry")]
    MissingIndustry(OccupationKind),

    #[error("{field} must lie in [0, 1], got {value}")]
    NotAProbability { field: String, value: f64 },

    #[error("{field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("corpus {0} is empty")]
    EmptyCorpus(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Top-level error type for world generation.
#[derive(Error, Debug)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An internal consistency check failed at the end of a step. Fatal.
    #[error("invariant violated after step {step}: {detail}")]
    InvariantViolated { step: SimTimestamp, detail: String },
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, SimError>;
