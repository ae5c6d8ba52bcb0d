use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LooperError>;

/// Fatal errors raised while configuring or running looper.
///
/// Per-sample problems are not errors: they are reported as [`SkipReason`]s
/// and only stop the submission of that (sample, pipeline) pair.
#[derive(Debug, Error)]
pub enum LooperError {
    #[error("ERROR: pipeline '{pipeline}' declares no resources")]
    NoResourcesConfigured { pipeline: String },

    #[error("ERROR: pipeline '{pipeline}' has resources but no 'default' tier")]
    MissingDefaultTier { pipeline: String },

    #[error("ERROR: resource tier '{tier}' of pipeline '{pipeline}' has a negative file size ({size})")]
    InvalidResourceSpec {
        pipeline: String,
        tier: String,
        size: f64,
    },

    #[error("ERROR: invalid input -> {0}")]
    InvalidInput(String),

    #[error("ERROR: pipeline '{pipeline}' requires attribute '{attribute}' for argument '{flag}', but the sample lacks it")]
    MissingRequiredAttribute {
        pipeline: String,
        flag: String,
        attribute: String,
    },

    #[error("ERROR: pipeline '{pipeline}' argument '{flag}' maps to null attribute '{attribute}' and no default value exists")]
    NoDefaultForNullAttribute {
        pipeline: String,
        flag: String,
        attribute: String,
    },

    #[error("ERROR: sample '{sample}' lacks input attribute '{attribute}' required by pipeline '{pipeline}'")]
    MissingInputAttribute {
        sample: String,
        pipeline: String,
        attribute: String,
    },

    #[error("ERROR: invalid configuration -> {0}")]
    Config(String),

    #[error("ERROR: pooling invariant violated -> {0}")]
    Invariant(String),

    #[error("ERROR: could not access {path}: {source}")]
    Path {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl LooperError {
    /// Wrap an io error with the path that caused it.
    pub fn path(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LooperError::Path {
            path: path.into(),
            source,
        }
    }
}

/// Non-fatal reasons for not pooling a sample into a pipeline job.
///
/// The `Display` text doubles as the aggregation key for the end-of-run
/// failure summary, so it must not contain per-sample details.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SkipReason {
    MissingProtocol,
    NoPipelineForProtocol,
    FlagFound,
    PipelineAttributes,
    MissingInputFiles,
    InvalidReadType,
    ArgumentString,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SkipReason::MissingProtocol => "Missing protocol",
            SkipReason::NoPipelineForProtocol => "No pipeline for protocol",
            SkipReason::FlagFound => "Pipeline flag(s) found",
            SkipReason::PipelineAttributes => "Could not set pipeline attributes",
            SkipReason::MissingInputFiles => "Missing required input file(s)",
            SkipReason::InvalidReadType => "Invalid read type",
            SkipReason::ArgumentString => "Could not build argument string",
        };

        write!(f, "{}", text)
    }
}
