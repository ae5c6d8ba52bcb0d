use hashbrown::HashSet;

use std::path::{Path, PathBuf};

use crate::config::expand_path;
use crate::interface::{normalize_protocol, script_name, PipelineInterface, PipelineSource};

/// A pipeline selected for a protocol.
#[derive(Debug, Clone)]
pub struct PipelineJob<'a> {
    pub interface: &'a PipelineInterface,
    pub key: String,
    pub path: PathBuf,
    /// Script path followed by any flags embedded in the pipeline key.
    pub command: String,
}

/// Maps protocols to pipelines across every registered pipeline source.
///
/// Sources are consulted in registration order; a script claimed by an
/// earlier source is never offered again by a later one.
///
/// # Example
///
/// ``` rust, no_run
/// let resolver = ProtocolResolver::new(vec![source_a, source_b]);
/// let jobs = resolver.resolve("RNA-seq");
/// ```
#[derive(Debug, Clone)]
pub struct ProtocolResolver {
    sources: Vec<PipelineSource>,
    priority: bool,
}

impl ProtocolResolver {
    pub fn new(sources: Vec<PipelineSource>) -> Self {
        Self {
            sources,
            priority: true,
        }
    }

    /// Return the union of every source's pipelines instead of only the
    /// first source that knows the protocol.
    pub fn without_priority(mut self) -> Self {
        self.priority = false;
        self
    }

    pub fn sources(&self) -> &[PipelineSource] {
        &self.sources
    }

    /// Resolve a protocol to the ordered pipelines to run for it.
    ///
    /// An unknown protocol yields an empty list; callers treat that as a
    /// skip, not a failure. Keys named by a mapping but absent from the
    /// source's pipelines are dropped with a warning.
    ///
    /// # Arguments
    ///
    /// * `protocol` - Protocol name as written in the sample sheet.
    ///
    /// # Example
    ///
    /// ``` rust, no_run
    /// // protocol_mapping: { RNA: "a.sh; b.sh, c.sh" }
    /// let keys = resolver.resolve("rna").iter().map(|j| j.key.clone()).collect::<Vec<_>>();
    ///
    /// assert_eq!(keys, vec!["a.sh", "b.sh", "c.sh"]);
    /// ```
    pub fn resolve(&self, protocol: &str) -> Vec<PipelineJob<'_>> {
        let protocol = normalize_protocol(protocol);

        let mut claimed: HashSet<String> = HashSet::new();
        let mut jobs = Vec::new();

        for source in &self.sources {
            let Some(expr) = source.mapping_for(&protocol) else {
                continue;
            };

            let (_, new_keys): (Vec<String>, Vec<String>) = split_pipeline_keys(expr)
                .into_iter()
                .partition(|key| claimed.contains(script_name(key)));

            claimed.extend(new_keys.iter().map(|key| script_name(key).to_string()));

            for key in new_keys {
                match source.interface(&key) {
                    Some(iface) => {
                        let (path, command) = resolve_pipeline_path(&key, iface, &source.pipelines_dir);
                        jobs.push(PipelineJob {
                            interface: iface,
                            key,
                            path,
                            command,
                        });
                    }
                    None => log::warn!(
                        "WARN: pipeline '{}' for protocol '{}' is not defined in {}",
                        key,
                        protocol,
                        source.location.display()
                    ),
                }
            }

            if self.priority {
                break;
            }
        }

        jobs
    }
}

/// Flatten a mapping expression: `;` separates stages, `,` separates
/// parallel pipelines within a stage, parentheses only group.
///
/// # Example
///
/// ``` rust, no_run
/// # use looper::protocol::split_pipeline_keys;
/// assert_eq!(
///     split_pipeline_keys("a.sh; (b.sh, c.sh)"),
///     vec!["a.sh", "b.sh", "c.sh"]
/// );
/// ```
pub fn split_pipeline_keys(expr: &str) -> Vec<String> {
    expr.split(';')
        .flat_map(|stage| {
            stage
                .replace(['(', ')'], "")
                .split(',')
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Turn a pipeline key into the script to execute.
///
/// An explicit `path` wins (joined with the script name when it is a
/// directory); a command found on `PATH` is kept as written; anything else
/// lives in the source's `pipelines/` folder.
fn resolve_pipeline_path(
    key: &str,
    iface: &PipelineInterface,
    pipelines_dir: &Path,
) -> (PathBuf, String) {
    let script = script_name(key);
    let flags = key.trim_start()[script.len()..].trim();

    let path = if let Some(declared) = &iface.path {
        let declared = expand_path(declared);
        if declared.is_dir() {
            declared.join(script)
        } else {
            declared
        }
    } else if is_command(script) {
        PathBuf::from(script)
    } else {
        pipelines_dir.join(expand_path(script))
    };

    let command = if flags.is_empty() {
        path.display().to_string()
    } else {
        format!("{} {}", path.display(), flags)
    };

    (path, command)
}

/// Whether `name` is an executable reachable through `PATH`.
fn is_command(name: &str) -> bool {
    if name.contains('/') {
        return false;
    }

    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };

    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .any(|candidate| is_executable(&candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(root: &str, mapping: &str, pipelines: &[&str]) -> PipelineSource {
        let mut yaml = format!("protocol_mapping:\n{}\npipelines:\n", mapping);
        for pipeline in pipelines {
            yaml.push_str(&format!("  {}:\n    name: {}\n", pipeline, root));
        }

        PipelineSource::from_yaml_str(&yaml, Path::new(root)).unwrap()
    }

    fn keys(jobs: &[PipelineJob]) -> Vec<String> {
        jobs.iter().map(|job| job.key.clone()).collect()
    }

    #[test]
    fn test_split_pipeline_keys() {
        assert_eq!(
            split_pipeline_keys("a.sh; b.sh, c.sh"),
            vec!["a.sh", "b.sh", "c.sh"]
        );
        assert_eq!(
            split_pipeline_keys("(x.py, y.py); z.py,"),
            vec!["x.py", "y.py", "z.py"]
        );
        assert!(split_pipeline_keys(" ; ").is_empty());
    }

    #[test]
    fn test_resolve_flattens_stages() {
        let resolver = ProtocolResolver::new(vec![source(
            "/repo",
            "  RNA: \"a.sh; b.sh, c.sh\"",
            &["a.sh", "b.sh", "c.sh"],
        )])
        .without_priority();

        let jobs = resolver.resolve("rna");
        assert_eq!(keys(&jobs), vec!["a.sh", "b.sh", "c.sh"]);
        assert_eq!(jobs[0].path, PathBuf::from("/repo/pipelines/a.sh"));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let resolver = ProtocolResolver::new(vec![
            source("/one", "  RNA: \"a.sh, b.sh\"", &["a.sh", "b.sh"]),
            source("/two", "  RNA: \"b.sh; d.sh\"", &["b.sh", "d.sh"]),
        ])
        .without_priority();

        assert_eq!(keys(&resolver.resolve("RNA")), keys(&resolver.resolve("RNA")));
        assert_eq!(keys(&resolver.resolve("RNA")), vec!["a.sh", "b.sh", "d.sh"]);
    }

    #[test]
    fn test_priority_mode_keeps_first_source_only() {
        let resolver = ProtocolResolver::new(vec![
            source("/one", "  RNA: rna.sh", &["rna.sh"]),
            source("/two", "  RNA: rna.sh", &["rna.sh"]),
        ]);

        let jobs = resolver.resolve("RNA");
        assert_eq!(keys(&jobs), vec!["rna.sh"]);
        assert_eq!(jobs[0].interface.pipeline_name(), "/one");

        let union = ProtocolResolver::new(resolver.sources().to_vec()).without_priority();
        assert_eq!(keys(&union.resolve("RNA")), vec!["rna.sh"]);
    }

    #[test]
    fn test_priority_falls_through_to_source_defining_protocol() {
        let resolver = ProtocolResolver::new(vec![
            source("/one", "  ATAC: atac.sh", &["atac.sh"]),
            source("/two", "  RNA: rna.sh", &["rna.sh"]),
        ]);

        let jobs = resolver.resolve("rna");
        assert_eq!(keys(&jobs), vec!["rna.sh"]);
        assert_eq!(jobs[0].path, PathBuf::from("/two/pipelines/rna.sh"));
    }

    #[test]
    fn test_unknown_protocol_and_undefined_pipeline() {
        let resolver = ProtocolResolver::new(vec![source(
            "/repo",
            "  RNA: \"rna.sh, ghost.sh\"",
            &["rna.sh"],
        )]);

        assert!(resolver.resolve("CHIP").is_empty());
        assert_eq!(keys(&resolver.resolve("RNA")), vec!["rna.sh"]);
    }

    #[test]
    fn test_pipeline_path_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let dir_path = dir.path().display().to_string();

        let in_dir = PipelineInterface {
            path: Some(dir_path.clone()),
            ..Default::default()
        };
        let (path, command) = resolve_pipeline_path("run.py --fast", &in_dir, Path::new("/p"));
        assert_eq!(path, dir.path().join("run.py"));
        assert_eq!(command, format!("{} --fast", dir.path().join("run.py").display()));

        let explicit = PipelineInterface {
            path: Some(format!("{}/bin/tool.sh", dir_path)),
            ..Default::default()
        };
        let (path, _) = resolve_pipeline_path("tool", &explicit, Path::new("/p"));
        assert_eq!(path, dir.path().join("bin/tool.sh"));

        let (path, command) =
            resolve_pipeline_path("local.sh", &PipelineInterface::default(), Path::new("/p"));
        assert_eq!(path, PathBuf::from("/p/local.sh"));
        assert_eq!(command, "/p/local.sh");
    }

    #[cfg(unix)]
    #[test]
    fn test_commands_on_path_are_left_alone() {
        let (path, command) =
            resolve_pipeline_path("sh -c true", &PipelineInterface::default(), Path::new("/p"));

        assert_eq!(path, PathBuf::from("sh"));
        assert_eq!(command, "sh -c true");
    }
}
