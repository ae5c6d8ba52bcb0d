use hashbrown::HashMap;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::config::ParamValue;
use crate::consts::*;
use crate::error::{LooperError, Result};

/// A map that keeps entries in the order they were written in the
/// configuration file.
///
/// Argument order decides the command line a pipeline receives, and tier
/// order breaks ties between equal thresholds, so neither may be re-sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        OrderedMap(Vec::new())
    }
}

impl<V> OrderedMap<V> {
    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V, K: Into<String>> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        OrderedMap(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping or null")
            }

            fn visit_unit<E: serde::de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(OrderedMap::default())
            }

            fn visit_none<E: serde::de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(OrderedMap::default())
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }

                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_any(OrderedVisitor(PhantomData))
    }
}

/// One resource tier: a threshold plus the resources handed to the scheduler.
///
/// # Example
///
/// ``` yaml
/// resources:
///   default:
///     min_file_size: 0
///     cores: 1
///     mem: 4000
///     time: "0-02:00:00"
///   huge:
///     min_file_size: 10
///     cores: 8
///     mem: 32000
///     time: "2-00:00:00"
/// ```
///
/// Fields set to null are treated as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceTier {
    pub values: BTreeMap<String, ParamValue>,
}

impl<'de> Deserialize<'de> for ResourceTier {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = BTreeMap::<String, Option<ParamValue>>::deserialize(deserializer)?;

        Ok(Self {
            values: values
                .into_iter()
                .filter_map(|(key, value)| value.map(|value| (key, value)))
                .collect(),
        })
    }
}

impl ResourceTier {
    /// Declared threshold, honoring the deprecated `file_size` key.
    pub fn declared_min_size(&self) -> Option<&ParamValue> {
        self.values
            .get(MIN_FILE_SIZE)
            .or_else(|| self.values.get(FILE_SIZE))
    }

    /// The resources of this tier without its threshold fields.
    pub fn bundle(&self) -> ResourceBundle {
        ResourceBundle {
            values: self
                .values
                .iter()
                .filter(|(k, _)| k.as_str() != MIN_FILE_SIZE && k.as_str() != FILE_SIZE)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

/// Compute resources selected for one submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceBundle {
    pub values: BTreeMap<String, ParamValue>,
}

impl ResourceBundle {
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: &str, value: ParamValue) {
        self.values.insert(key.to_string(), value);
    }

    pub fn cores(&self) -> Option<&ParamValue> {
        self.get(CORES)
    }

    pub fn mem(&self) -> Option<&ParamValue> {
        self.get(MEM)
    }

    pub fn time(&self) -> Option<&ParamValue> {
        self.get(TIME)
    }

    pub fn partition(&self) -> Option<&ParamValue> {
        self.get(PARTITION)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Configuration of a single pipeline inside a pipeline interface.
///
/// # Example
///
/// ``` yaml
/// pipelines:
///   rna.sh:
///     name: rnaseq
///     looper_args: true
///     arguments:
///       "--sample-name": sample_name
///       "--genome": genome
///       "--single": null
///     optional_arguments:
///       "--adapter": adapter
///     required_input_files: [data_source]
///     all_input_files: [data_source, read2]
///     ngs_input_files: [data_source]
/// ```
#[derive(Deserialize, Debug, Clone, Default)]
pub struct PipelineInterface {
    #[serde(skip)]
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub config: Option<String>,
    #[serde(default)]
    pub looper_args: bool,
    #[serde(default)]
    pub arguments: OrderedMap<Option<String>>,
    #[serde(default)]
    pub optional_arguments: OrderedMap<Option<String>>,
    #[serde(default)]
    pub resources: Option<OrderedMap<ResourceTier>>,
    #[serde(default)]
    pub required_input_files: Vec<String>,
    #[serde(default)]
    pub all_input_files: Vec<String>,
    #[serde(default)]
    pub ngs_input_files: Vec<String>,
}

impl PipelineInterface {
    /// Display name used for flag files, defaulting to the script name
    /// without its extension.
    ///
    /// # Example
    ///
    /// ``` rust, no_run
    /// # use looper::interface::PipelineInterface;
    /// let iface = PipelineInterface { key: "rna.sh".into(), ..Default::default() };
    ///
    /// assert_eq!(iface.pipeline_name(), "rna");
    /// ```
    pub fn pipeline_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }

        let script = script_name(&self.key);
        Path::new(script)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| script.to_string())
    }

    pub fn uses_looper_args(&self) -> bool {
        self.looper_args
    }
}

/// First whitespace-delimited token of a pipeline key.
pub fn script_name(key: &str) -> &str {
    key.split_whitespace().next().unwrap_or(key)
}

/// Normalize a protocol name for lookup: alphanumerics only, uppercased.
///
/// # Example
///
/// ``` rust, no_run
/// # use looper::interface::normalize_protocol;
/// assert_eq!(normalize_protocol("rna-seq"), "RNASEQ");
/// ```
pub fn normalize_protocol(protocol: &str) -> String {
    protocol
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .collect()
}

#[derive(Deserialize, Debug)]
struct InterfaceFile {
    #[serde(default)]
    protocol_mapping: HashMap<String, String>,
    #[serde(default)]
    pipelines: HashMap<String, PipelineInterface>,
}

/// A protocol mapping and the pipelines it points to, both loaded from one
/// configuration location.
#[derive(Debug, Clone)]
pub struct PipelineSource {
    pub location: PathBuf,
    pub pipelines_dir: PathBuf,
    pub protocol_mapping: HashMap<String, String>,
    pub pipelines: HashMap<String, PipelineInterface>,
}

impl PipelineSource {
    /// Load a source from a pipeline interface file, or from a directory
    /// containing one.
    ///
    /// # Arguments
    ///
    /// * `location` - Path to the interface file or its repository folder.
    ///
    /// # Example
    ///
    /// ``` rust, no_run
    /// # use std::path::Path;
    /// # use looper::interface::PipelineSource;
    /// let source = PipelineSource::from_location(Path::new("pipelines/")).unwrap();
    /// ```
    pub fn from_location(location: &Path) -> Result<Self> {
        let (file, root) = if location.is_dir() {
            let file = INTERFACE_FILENAMES
                .iter()
                .map(|name| location.join(name))
                .find(|candidate| candidate.is_file())
                .ok_or_else(|| {
                    LooperError::Config(format!(
                        "no pipeline interface file found in {}",
                        location.display()
                    ))
                })?;

            (file, location.to_path_buf())
        } else {
            let root = location
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();

            (location.to_path_buf(), root)
        };

        let contents = std::fs::read_to_string(&file).map_err(|e| LooperError::path(&file, e))?;
        let parsed: InterfaceFile = match file.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&contents)?,
            _ => serde_yaml::from_str(&contents)?,
        };

        log::debug!(
            "DEBUG: loaded {} pipelines from {}",
            parsed.pipelines.len(),
            file.display()
        );

        Ok(Self::assemble(location.to_path_buf(), &root, parsed))
    }

    /// Build a source from YAML text, rooted at `root`.
    pub fn from_yaml_str(contents: &str, root: &Path) -> Result<Self> {
        let parsed: InterfaceFile = serde_yaml::from_str(contents)?;
        Ok(Self::assemble(root.to_path_buf(), root, parsed))
    }

    fn assemble(location: PathBuf, root: &Path, parsed: InterfaceFile) -> Self {
        let protocol_mapping = parsed
            .protocol_mapping
            .into_iter()
            .map(|(protocol, expr)| (normalize_protocol(&protocol), expr))
            .collect();

        let pipelines = parsed
            .pipelines
            .into_iter()
            .map(|(key, mut iface)| {
                iface.key = key.clone();
                (key, iface)
            })
            .collect();

        Self {
            location,
            pipelines_dir: root.join(PIPELINES_DIR),
            protocol_mapping,
            pipelines,
        }
    }

    /// Raw pipeline-key expression mapped to a protocol, if any.
    pub fn mapping_for(&self, protocol: &str) -> Option<&str> {
        self.protocol_mapping
            .get(&normalize_protocol(protocol))
            .map(String::as_str)
    }

    /// Interface entry for a pipeline key.
    pub fn interface(&self, key: &str) -> Option<&PipelineInterface> {
        self.pipelines
            .get(key)
            .or_else(|| self.pipelines.get(script_name(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERFACE: &str = r#"
protocol_mapping:
  RNA-seq: rna.sh
  ATAC: "atac.py --fast; (peaks.sh, footprint.sh)"

pipelines:
  rna.sh:
    name: rnaseq
    looper_args: true
    arguments:
      "--sample-name": sample_name
      "--genome": genome
      "--single": null
    optional_arguments:
      "--adapter": adapter
    resources:
      default:
        file_size: 3
        cores: 1
      big:
        min_file_size: 10
        cores: 8
        mem: 32000
        partition: ~
  atac.py:
    arguments: ~
"#;

    #[test]
    fn test_interface_keeps_declared_argument_order() {
        let source = PipelineSource::from_yaml_str(INTERFACE, Path::new("/repo")).unwrap();
        let rna = source.interface("rna.sh").unwrap();

        let flags = rna.arguments.iter().map(|(k, _)| k).collect::<Vec<_>>();
        assert_eq!(flags, vec!["--sample-name", "--genome", "--single"]);
        assert_eq!(rna.arguments.get("--single"), Some(&None));
        assert_eq!(rna.optional_arguments.len(), 1);
        assert!(rna.uses_looper_args());
        assert_eq!(rna.pipeline_name(), "rnaseq");
    }

    #[test]
    fn test_interface_resources_and_defaults() {
        let source = PipelineSource::from_yaml_str(INTERFACE, Path::new("/repo")).unwrap();
        let rna = source.interface("rna.sh").unwrap();
        let tiers = rna.resources.as_ref().unwrap();

        assert_eq!(tiers.0[0].0, "default");
        assert_eq!(
            tiers.get("default").unwrap().declared_min_size(),
            Some(&ParamValue::Int(3))
        );

        let big = tiers.get("big").unwrap().bundle();
        assert_eq!(big.cores(), Some(&ParamValue::Int(8)));
        assert!(big.get(MIN_FILE_SIZE).is_none());
        assert!(big.partition().is_none());

        let atac = source.interface("atac.py --fast").unwrap();
        assert!(atac.arguments.is_empty());
        assert!(atac.resources.is_none());
        assert_eq!(atac.pipeline_name(), "atac");
    }

    #[test]
    fn test_protocol_mapping_is_normalized() {
        let source = PipelineSource::from_yaml_str(INTERFACE, Path::new("/repo")).unwrap();

        assert_eq!(source.mapping_for("rna_seq"), Some("rna.sh"));
        assert_eq!(source.mapping_for("rnaseq"), Some("rna.sh"));
        assert!(source.mapping_for("chip").is_none());
        assert_eq!(source.pipelines_dir, PathBuf::from("/repo/pipelines"));
    }

    #[test]
    fn test_source_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pipeline_interface.yaml"), INTERFACE).unwrap();

        let source = PipelineSource::from_location(dir.path()).unwrap();
        assert_eq!(source.pipelines.len(), 2);
        assert_eq!(source.pipelines_dir, dir.path().join(PIPELINES_DIR));

        let empty = tempfile::tempdir().unwrap();
        assert!(PipelineSource::from_location(empty.path()).is_err());
    }
}
