use serde::Serialize;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::expand_path;
use crate::consts::*;
use crate::error::{LooperError, Result};
use crate::interface::PipelineInterface;

/// Read access to named sample attributes.
///
/// Any sample representation can feed argument construction as long as it
/// tells apart an absent attribute (`None`) from a present-but-null one
/// (`Some("")`).
pub trait AttributeSource {
    fn has_attribute(&self, name: &str) -> bool;
    fn get_attribute(&self, name: &str) -> Option<&str>;
}

/// A sample as seen by the orchestrator: a name, a protocol and a bag of
/// string attributes, plus the input files resolved for one pipeline.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Sample {
    pub name: String,
    pub protocol: Option<String>,
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_inputs: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_inputs: Vec<PathBuf>,
    pub input_file_size: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_type: Option<String>,
}

impl AttributeSource for Sample {
    fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

impl Sample {
    /// Create a sample from its name and raw attributes.
    ///
    /// # Example
    ///
    /// ``` rust, no_run
    /// # use looper::sample::Sample;
    /// let sample = Sample::new("frog_1", vec![("protocol", "RNA-seq")]);
    ///
    /// assert_eq!(sample.protocol.as_deref(), Some("RNA-seq"));
    /// ```
    pub fn new<K, V>(name: &str, attributes: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut attributes: BTreeMap<String, String> = attributes
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        attributes
            .entry(SAMPLE_NAME_COLNAME.to_string())
            .or_insert_with(|| name.to_string());

        let protocol = PROTOCOL_COLNAMES
            .iter()
            .filter_map(|col| attributes.get(*col))
            .find(|value| !value.is_empty())
            .cloned();
        let read_type = attributes
            .get(READ_TYPE)
            .filter(|value| !value.is_empty())
            .cloned();

        Self {
            name: name.to_string(),
            protocol,
            attributes,
            read_type,
            ..Default::default()
        }
    }

    /// Resolve the input-file attributes a pipeline declares and compute the
    /// total input size.
    ///
    /// Size is summed over `all_input_files` (or the required files when the
    /// pipeline lists none), counting only files that exist, in GB.
    ///
    /// # Errors
    ///
    /// `MissingInputAttribute` when the sample lacks an attribute the
    /// pipeline names as an input.
    pub fn set_pipeline_attributes(&mut self, iface: &PipelineInterface) -> Result<()> {
        self.required_inputs = self.input_paths(iface, &iface.required_input_files)?;
        self.all_inputs = if iface.all_input_files.is_empty() {
            self.required_inputs.clone()
        } else {
            self.input_paths(iface, &iface.all_input_files)?
        };

        let bytes: u64 = self
            .all_inputs
            .iter()
            .filter_map(|path| std::fs::metadata(path).ok())
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len())
            .sum();

        self.input_file_size = bytes as f64 / BYTES_PER_GB;

        Ok(())
    }

    fn input_paths(&self, iface: &PipelineInterface, attrs: &[String]) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();

        for attr in attrs {
            let value =
                self.get_attribute(attr)
                    .ok_or_else(|| LooperError::MissingInputAttribute {
                        sample: self.name.clone(),
                        pipeline: iface.key.clone(),
                        attribute: attr.clone(),
                    })?;

            paths.extend(value.split_whitespace().map(expand_path));
        }

        Ok(paths)
    }

    /// Required input files that are not on disk.
    pub fn missing_required_inputs(&self) -> Vec<&PathBuf> {
        self.required_inputs
            .iter()
            .filter(|path| !path.exists())
            .collect()
    }

    /// Check the declared read type of a sample feeding NGS inputs.
    ///
    /// Only pipelines declaring `ngs_input_files` care, and only an explicit
    /// value can be wrong.
    pub fn has_valid_read_type(&self, iface: &PipelineInterface) -> bool {
        if iface.ngs_input_files.is_empty() {
            return true;
        }

        match &self.read_type {
            Some(read_type) => READ_TYPES
                .iter()
                .any(|valid| valid.eq_ignore_ascii_case(read_type)),
            None => true,
        }
    }

    /// Path of the YAML state file of this sample inside `folder`.
    pub fn state_file(&self, folder: &Path) -> PathBuf {
        folder.join(format!("{}.{}", self.name, STATE_EXT))
    }

    /// Serialize the sample next to its submission scripts.
    ///
    /// Returns `false` without touching the file when it already exists.
    pub fn write_state_file(&self, folder: &Path) -> Result<bool> {
        let path = self.state_file(folder);

        if path.exists() {
            log::warn!(
                "WARN: sample state file already exists, not overwriting -> {}",
                path.display()
            );
            return Ok(false);
        }

        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(&path, yaml).map_err(|e| LooperError::path(&path, e))?;

        Ok(true)
    }
}

/// Read a CSV sample annotation sheet.
///
/// The `sample_name` column is required; every column becomes an attribute
/// and empty cells are kept as null (empty) values.
///
/// # Example
///
/// ``` rust, no_run
/// # use std::path::Path;
/// # use looper::sample::load_samples;
/// let samples = load_samples(Path::new("samples.csv")).unwrap();
/// ```
pub fn load_samples(sheet: &Path) -> Result<Vec<Sample>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(sheet)?;

    let headers = reader.headers()?.clone();
    let name_idx = headers
        .iter()
        .position(|h| h == SAMPLE_NAME_COLNAME)
        .ok_or_else(|| {
            LooperError::Config(format!(
                "sample sheet {} has no '{}' column",
                sheet.display(),
                SAMPLE_NAME_COLNAME
            ))
        })?;

    let mut samples = Vec::new();
    for record in reader.records() {
        let record = record?;
        let name = record.get(name_idx).unwrap_or_default();

        if name.is_empty() {
            log::warn!("WARN: skipping sample sheet row without a sample name");
            continue;
        }

        samples.push(Sample::new(name, headers.iter().zip(record.iter())));
    }

    log::info!(
        "INFO: loaded {} samples from {}",
        samples.len(),
        sheet.display()
    );

    Ok(samples)
}
