use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Startup failures. Anything that goes wrong while reading, validating or
/// fitting the corpus ends up here; query-time misses never do.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("corpus is empty")]
    EmptyCorpus,

    #[error("record {index}: missing or blank `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("record {index}: question {question:?} has no indexable terms")]
    NoIndexableTerms { index: usize, question: String },

    #[error("record {index}: question duplicates record {first}")]
    DuplicateQuestion { index: usize, first: usize },

    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    #[error("unsupported corpus format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
