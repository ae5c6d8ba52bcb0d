use hashbrown::HashMap;
use regex::{Captures, Regex};
use serde::Deserialize;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::consts::*;
use crate::error::{LooperError, Result};

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("ERROR: invalid env var regex")
});

/// A struct representing a looper project file.
///
/// # Fields
///
/// * `metadata` - Locations of samples, outputs and pipeline interfaces.
/// * `compute` - Named compute packages (submission template + command).
/// * `defaults` - Substitute values for null sample attributes.
/// * `pipeline_args` - Project-level arguments appended to a pipeline command.
///
/// # Example
///
/// ``` toml
/// [metadata]
/// sample_annotation = "samples.csv"
/// output_dir = "/scratch/project"
/// pipeline_interfaces = ["pipelines/pipeline_interface.yaml"]
///
/// [compute.default]
/// submission_template = "templates/localhost_template.sub"
/// submission_command = "sh"
///
/// [compute.slurm]
/// submission_template = "templates/slurm_template.sub"
/// submission_command = "sbatch"
///
/// [defaults]
/// genome = "hg38"
///
/// [pipeline_args."rna.sh"]
/// "-k" = 8
/// ```
#[derive(Deserialize, Debug, Clone)]
pub struct Project {
    pub metadata: Metadata,
    #[serde(default)]
    pub compute: HashMap<String, ComputePackage>,
    #[serde(default)]
    pub defaults: HashMap<String, String>,
    #[serde(default)]
    pub pipeline_args: HashMap<String, PipelineArgs>,
    #[serde(skip)]
    pub config_file: PathBuf,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Metadata {
    pub sample_annotation: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default = "default_results_subdir")]
    pub results_subdir: String,
    #[serde(default = "default_submission_subdir")]
    pub submission_subdir: String,
    #[serde(default)]
    pub pipeline_interfaces: Vec<PathBuf>,
}

/// Template and command used to hand a job to the scheduler.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ComputePackage {
    pub submission_template: PathBuf,
    pub submission_command: String,
    #[serde(default)]
    pub partition: Option<String>,
}

fn default_results_subdir() -> String {
    DEFAULT_RESULTS_SUBDIR.into()
}

fn default_submission_subdir() -> String {
    DEFAULT_SUBMISSION_SUBDIR.into()
}

impl Project {
    /// Read a project file and return a Project struct.
    ///
    /// Relative paths in the file are resolved against the directory
    /// holding the file.
    ///
    /// # Arguments
    ///
    /// * `config` - A PathBuf containing the path to the project file.
    ///
    /// # Example
    ///
    /// ``` rust, no_run
    /// # use std::path::PathBuf;
    /// # use looper::config::Project;
    /// let project = Project::read(PathBuf::from("project.toml"));
    /// ```
    pub fn read(config: PathBuf) -> Result<Self> {
        let mut file = File::open(&config).map_err(|e| LooperError::path(&config, e))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let mut project: Project = toml::from_str(&contents)?;
        let root = config
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        project.resolve_paths(&root);
        project.config_file = config;

        Ok(project)
    }

    /// Make every configured path absolute with respect to `root`.
    pub fn resolve_paths(&mut self, root: &Path) {
        let meta = &mut self.metadata;
        meta.sample_annotation = relative_to(root, &meta.sample_annotation);
        meta.output_dir = relative_to(root, &meta.output_dir);
        meta.pipeline_interfaces = meta
            .pipeline_interfaces
            .iter()
            .map(|p| relative_to(root, p))
            .collect();

        for package in self.compute.values_mut() {
            package.submission_template = relative_to(root, &package.submission_template);
        }
    }

    /// Folder holding per-sample pipeline outputs (and run flags).
    pub fn results_folder(&self) -> PathBuf {
        self.metadata
            .output_dir
            .join(&self.metadata.results_subdir)
    }

    /// Folder receiving rendered scripts, logs and sample state files.
    pub fn submission_folder(&self) -> PathBuf {
        self.metadata
            .output_dir
            .join(&self.metadata.submission_subdir)
    }

    /// Output folder of a single sample.
    pub fn sample_folder(&self, sample_name: &str) -> PathBuf {
        self.results_folder().join(sample_name)
    }

    /// Get a compute package by name.
    ///
    /// # Example
    ///
    /// ``` rust, no_run
    /// # use std::path::PathBuf;
    /// # use looper::config::Project;
    /// let project = Project::read(PathBuf::from("project.toml")).unwrap();
    /// let package = project.compute_package("slurm").unwrap();
    ///
    /// assert_eq!(package.submission_command, "sbatch");
    /// ```
    pub fn compute_package(&self, name: &str) -> Result<&ComputePackage> {
        self.compute.get(name).ok_or_else(|| {
            LooperError::Config(format!("compute package '{}' not found in project", name))
        })
    }

    /// Project-level arguments for a pipeline key, rendered as flags.
    pub fn pipeline_argtext(&self, pipeline_key: &str) -> String {
        self.pipeline_args
            .get(pipeline_key)
            .map(PipelineArgs::flat)
            .unwrap_or_default()
    }
}

/// Extra flags a project attaches to every invocation of one pipeline.
///
/// Keys already carrying dashes are used verbatim; bare keys get one dash
/// when they are 1-2 characters long and two dashes otherwise.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(transparent)]
pub struct PipelineArgs {
    pub values: BTreeMap<String, ParamValue>,
}

impl PipelineArgs {
    /// Flatten the arguments into a `" {flag} {value}"` sequence.
    ///
    /// `true` renders a bare flag and `false` drops the flag.
    ///
    /// # Example
    ///
    /// ``` rust, no_run
    /// # use looper::config::{ParamValue, PipelineArgs};
    /// let mut args = PipelineArgs::default();
    /// args.values.insert("k".into(), ParamValue::Int(8));
    ///
    /// assert_eq!(args.flat(), " -k 8");
    /// ```
    pub fn flat(&self) -> String {
        self.values
            .iter()
            .filter(|(_, value)| !matches!(value, ParamValue::Bool(false)))
            .map(|(key, value)| {
                let flag = if key.starts_with('-') {
                    key.clone()
                } else if key.len() > 2 {
                    format!("--{}", key)
                } else {
                    format!("-{}", key)
                };

                match value {
                    ParamValue::Bool(_) => format!(" {}", flag),
                    _ => format!(" {} {}", flag, value),
                }
            })
            .collect()
    }
}

/// Represents a typed configuration value
///
/// # Example
///
/// ``` rust, no_run
/// # use looper::config::ParamValue;
/// let value = ParamValue::Int(1);
///
/// assert_eq!(value, ParamValue::Int(1));
/// ```
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl ParamValue {
    /// Convert a ParamValue to a float.
    ///
    /// Integers are widened and numeric strings are parsed; anything else
    /// yields `None`.
    ///
    /// # Example
    ///
    /// ``` rust, no_run
    /// # use looper::config::ParamValue;
    /// let value = ParamValue::Int(1);
    ///
    /// assert_eq!(value.to_float(), Some(1.0));
    /// ```
    pub fn to_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(f) => Some(*f),
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Str(s) => s.trim().parse::<f64>().ok(),
            ParamValue::Bool(_) => None,
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(flt) => write!(f, "{}", flt),
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Expand a leading `~` and any `$VAR`/`${VAR}` references in a path.
///
/// Unset variables are left verbatim.
///
/// # Example
///
/// ``` rust, no_run
/// # use std::path::PathBuf;
/// # use looper::config::expand_path;
/// std::env::set_var("GENOMES", "/data/genomes");
///
/// assert_eq!(expand_path("$GENOMES/hg38"), PathBuf::from("/data/genomes/hg38"));
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let expanded = ENV_VAR.replace_all(path, |caps: &Captures| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();

        std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
    });

    match expanded.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match std::env::var("HOME") {
            Ok(home) => PathBuf::from(format!("{}{}", home, rest)),
            Err(_) => PathBuf::from(expanded.as_ref()),
        },
        _ => PathBuf::from(expanded.as_ref()),
    }
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    let path = expand_path(&path.to_string_lossy());

    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}
