use glob::{glob, Pattern};

use std::path::{Path, PathBuf};

use crate::consts::*;

/// A run flag left by a pipeline in a sample's output folder.
#[derive(Debug, Clone, PartialEq)]
pub struct RunFlag {
    pub path: PathBuf,
    /// One of `completed`, `running`, `failed`, `waiting`, `partial`, or
    /// `None` when the file name carries no known state.
    pub state: Option<String>,
}

fn flag_pattern(output_folder: &Path, pipeline_name: &str) -> String {
    format!(
        "{}/{}*.{}",
        Pattern::escape(&output_folder.to_string_lossy()),
        Pattern::escape(pipeline_name),
        FLAG_EXT
    )
}

/// All flag files `{output_folder}/{pipeline_name}*.flag`.
///
/// # Example
///
/// ``` rust, no_run
/// # use std::path::Path;
/// # use looper::flags::fetch_flags;
/// let flags = fetch_flags(Path::new("results/frog_1"), "rnaseq");
///
/// for flag in flags {
///     println!("{} -> {:?}", flag.path.display(), flag.state);
/// }
/// ```
pub fn fetch_flags(output_folder: &Path, pipeline_name: &str) -> Vec<RunFlag> {
    let pattern = flag_pattern(output_folder, pipeline_name);

    let paths = match glob(&pattern) {
        Ok(paths) => paths,
        Err(e) => {
            log::warn!("WARN: invalid flag pattern {} -> {}", pattern, e);
            return Vec::new();
        }
    };

    let mut flags = paths
        .flatten()
        .map(|path| RunFlag {
            state: flag_state(&path),
            path,
        })
        .collect::<Vec<_>>();
    flags.sort_by(|a, b| a.path.cmp(&b.path));

    flags
}

/// Whether any run flag exists for this (sample folder, pipeline) pair.
pub fn has_flag(output_folder: &Path, pipeline_name: &str) -> bool {
    !fetch_flags(output_folder, pipeline_name).is_empty()
}

fn flag_state(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();

    FLAG_STATES
        .iter()
        .find(|state| stem.ends_with(&format!("_{}", state)))
        .map(|state| state.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_in_missing_or_empty_folder() {
        let dir = tempfile::tempdir().unwrap();

        assert!(!has_flag(dir.path(), "rnaseq"));
        assert!(!has_flag(&dir.path().join("missing"), "rnaseq"));
    }

    #[test]
    fn test_flags_are_found_per_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("rnaseq_completed.flag"), "").unwrap();
        std::fs::write(dir.path().join("rnaseq_running.flag"), "").unwrap();
        std::fs::write(dir.path().join("rnaseq.log"), "").unwrap();
        std::fs::write(dir.path().join("atac_weird.flag"), "").unwrap();

        assert!(has_flag(dir.path(), "rnaseq"));
        assert!(has_flag(dir.path(), "atac"));
        assert!(!has_flag(dir.path(), "chipseq"));

        let flags = fetch_flags(dir.path(), "rnaseq");
        let states = flags
            .iter()
            .map(|f| f.state.clone().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(states, vec!["completed", "running"]);

        assert_eq!(fetch_flags(dir.path(), "atac")[0].state, None);
    }

    #[test]
    fn test_glob_characters_in_names_are_literal() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("frog[1]");
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join("rna_failed.flag"), "").unwrap();

        assert!(has_flag(&folder, "rna"));
        assert!(!has_flag(&folder, "rn?x"));
    }
}
