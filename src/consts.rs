// project-wide pub const | names
pub const LOOPER: &str = "looper";
pub const DEFAULT_COMPUTE: &str = "default";
pub const DEFAULT_TIER: &str = "default";
pub const PIPELINES_DIR: &str = "pipelines";

// config pub const keys
pub const MIN_FILE_SIZE: &str = "min_file_size";
pub const FILE_SIZE: &str = "file_size";
pub const CORES: &str = "cores";
pub const MEM: &str = "mem";
pub const TIME: &str = "time";
pub const PARTITION: &str = "partition";
pub const READ_TYPE: &str = "read_type";

// sample sheet columns
pub const SAMPLE_NAME_COLNAME: &str = "sample_name";
pub const PROTOCOL_COLNAMES: &[&str] = &["protocol", "library"];

// template placeholders
pub const JOBNAME: &str = "JOBNAME";
pub const CODE: &str = "CODE";
pub const LOGFILE: &str = "LOGFILE";

// filenames
pub const INTERFACE_FILENAMES: &[&str] = &[
    "pipeline_interface.yaml",
    "pipeline_interface.yml",
    "pipeline_interface.toml",
    "config/pipeline_interface.yaml",
];
pub const SUBMISSION_EXT: &str = "sub";
pub const LOG_EXT: &str = "log";
pub const FLAG_EXT: &str = "flag";
pub const STATE_EXT: &str = "yaml";
pub const DEFAULT_RESULTS_SUBDIR: &str = "results_pipeline";
pub const DEFAULT_SUBMISSION_SUBDIR: &str = "submission";

// miscellaneous constants
pub const LUMP_PREFIX: &str = "lump";
pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

// collections
pub const FLAG_STATES: &[&str] = &["completed", "running", "failed", "waiting", "partial"];
pub const READ_TYPES: &[&str] = &["SINGLE", "PAIRED"];
