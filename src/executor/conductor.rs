use hashbrown::HashMap;

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::arguments::build_argstring;
use crate::config::{expand_path, ComputePackage, ParamValue, Project};
use crate::consts::*;
use crate::error::{LooperError, Result, SkipReason};
use crate::executor::{job::Job, template::render_template};
use crate::flags::{fetch_flags, has_flag};
use crate::interface::{script_name, PipelineInterface, ResourceBundle};
use crate::protocol::PipelineJob;
use crate::resources::choose_resources;
use crate::sample::Sample;

/// Knobs shared by every conductor of a run.
#[derive(Debug, Clone)]
pub struct SubmissionSettings {
    /// Render scripts but never call the submission command.
    pub dry_run: bool,
    /// Pause after each real submission.
    pub delay: Duration,
    /// Pool samples even if run flags exist for them.
    pub ignore_flags: bool,
    /// Partition forced onto every job, over the resource tier's one.
    pub partition: Option<String>,
    /// Submit as soon as a pool fills up.
    pub automatic: bool,
    /// Commands per job; 1 when neither capacity is given.
    pub max_commands: Option<usize>,
    /// Cumulative input GB per job.
    pub max_size: Option<f64>,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            dry_run: false,
            delay: Duration::ZERO,
            ignore_flags: false,
            partition: None,
            automatic: true,
            max_commands: None,
            max_size: None,
        }
    }
}

/// Pools the commands of one pipeline and submits them as cluster jobs.
///
/// A pool is filled by [`SubmissionConductor::add_sample`] until it holds
/// `max_commands` commands or `max_size` GB of input, then rendered into a
/// single script and handed to the compute package's submission command.
///
/// # Example
///
/// ``` rust, no_run
/// let mut conductor = SubmissionConductor::new(&job, &project, compute, settings)?;
///
/// for sample in samples {
///     let reasons = conductor.add_sample(sample)?;
/// }
///
/// conductor.submit(true)?;
/// ```
#[derive(Debug)]
pub struct SubmissionConductor<'a> {
    pipeline_key: String,
    pipeline_name: String,
    iface: &'a PipelineInterface,
    cmd_base: String,
    project: &'a Project,
    compute: &'a ComputePackage,
    template: String,
    settings: SubmissionSettings,
    max_commands: usize,
    max_size: f64,
    pool: Vec<(Sample, String)>,
    cumulative_size: f64,
    jobs_submitted: usize,
    commands_submitted: usize,
    failed_submissions: usize,
}

impl<'a> SubmissionConductor<'a> {
    /// Create a conductor for a resolved pipeline.
    ///
    /// # Arguments
    ///
    /// * `job` - The pipeline, as resolved from a sample's protocol.
    /// * `project` - Project context for paths, defaults and pipeline args.
    /// * `compute` - Compute package providing template and command.
    /// * `settings` - Pooling and submission behavior.
    ///
    /// # Errors
    ///
    /// Fails if the submission template cannot be read or a capacity is
    /// not positive.
    pub fn new(
        job: &PipelineJob<'a>,
        project: &'a Project,
        compute: &'a ComputePackage,
        settings: SubmissionSettings,
    ) -> Result<Self> {
        let template_path = &compute.submission_template;
        let template = std::fs::read_to_string(template_path)
            .map_err(|e| LooperError::path(template_path, e))?;

        let (max_commands, max_size) = match (settings.max_commands, settings.max_size) {
            (None, None) => (1, f64::INFINITY),
            (commands, size) => (
                commands.unwrap_or(usize::MAX),
                size.unwrap_or(f64::INFINITY),
            ),
        };

        if max_commands == 0 || max_size.is_nan() || max_size <= 0.0 {
            return Err(LooperError::InvalidInput(format!(
                "pool capacity must be positive, got {} commands / {} GB",
                max_commands, max_size
            )));
        }

        let cmd_base = Job::from(job.command.as_str())
            .arg(&project.pipeline_argtext(&job.key))
            .cmd()
            .to_string();

        Ok(Self {
            pipeline_key: job.key.clone(),
            pipeline_name: job.interface.pipeline_name(),
            iface: job.interface,
            cmd_base,
            project,
            compute,
            template,
            settings,
            max_commands,
            max_size,
            pool: Vec::new(),
            cumulative_size: 0.0,
            jobs_submitted: 0,
            commands_submitted: 0,
            failed_submissions: 0,
        })
    }

    pub fn pipeline_key(&self) -> &str {
        &self.pipeline_key
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub fn cumulative_size(&self) -> f64 {
        self.cumulative_size
    }

    pub fn jobs_submitted(&self) -> usize {
        self.jobs_submitted
    }

    pub fn commands_submitted(&self) -> usize {
        self.commands_submitted
    }

    pub fn failed_submissions(&self) -> usize {
        self.failed_submissions
    }

    pub fn is_full(&self) -> bool {
        self.pool.len() == self.max_commands || self.cumulative_size >= self.max_size
    }

    /// Try to pool a sample's command.
    ///
    /// Every check runs even after one fails, so all reasons for skipping
    /// the sample are reported together. When the pool fills up and the
    /// conductor is automatic, the job is submitted right away.
    ///
    /// # Returns
    ///
    /// The skip reasons; empty when the sample was pooled.
    ///
    /// # Errors
    ///
    /// Adding to a full pool of a manual conductor, or any fatal error of
    /// an automatic submission.
    pub fn add_sample(&mut self, mut sample: Sample) -> Result<Vec<SkipReason>> {
        if self.is_full() {
            return Err(LooperError::Invariant(format!(
                "pool of {} is full, submit before adding {}",
                self.pipeline_key, sample.name
            )));
        }

        let mut reasons = Vec::new();

        if !self.settings.ignore_flags {
            let folder = self.project.sample_folder(&sample.name);
            if has_flag(&folder, &self.pipeline_name) {
                let found = fetch_flags(&folder, &self.pipeline_name)
                    .into_iter()
                    .map(|flag| flag.state.unwrap_or_else(|| "unknown".into()))
                    .collect::<Vec<_>>();

                log::info!(
                    "INFO: > Found flag(s) {:?} for {} / {}, skipping",
                    found,
                    sample.name,
                    self.pipeline_name
                );
                reasons.push(SkipReason::FlagFound);
            }
        }

        match sample.set_pipeline_attributes(self.iface) {
            Ok(()) => {
                let missing = sample.missing_required_inputs();
                if !missing.is_empty() {
                    log::warn!(
                        "WARN: > {} is missing required input file(s) for {}: {:?}",
                        sample.name,
                        self.pipeline_key,
                        missing
                    );
                    reasons.push(SkipReason::MissingInputFiles);
                }
            }
            Err(e) => {
                log::warn!("WARN: > {}", e);
                reasons.push(SkipReason::PipelineAttributes);
            }
        }

        if !sample.has_valid_read_type(self.iface) {
            log::warn!(
                "WARN: > {} has an invalid read type: {:?}",
                sample.name,
                sample.read_type
            );
            reasons.push(SkipReason::InvalidReadType);
        }

        let argstring = match build_argstring(self.iface, &sample, &self.project.defaults) {
            Ok(argstring) => Some(argstring),
            Err(e) => {
                log::warn!("WARN: > {}", e);
                reasons.push(SkipReason::ArgumentString);
                None
            }
        };

        let argstring = match argstring {
            Some(argstring) if reasons.is_empty() => argstring,
            _ => return Ok(reasons),
        };

        log::debug!(
            "DEBUG: pooling {} ({:.3} GB) into {}",
            sample.name,
            sample.input_file_size,
            self.pipeline_key
        );

        self.cumulative_size += sample.input_file_size;
        self.pool.push((sample, argstring));

        if self.settings.automatic && self.is_full() {
            self.submit(false)?;
        }

        Ok(reasons)
    }

    /// Render and submit the pooled commands as one job.
    ///
    /// # Arguments
    ///
    /// * `force` - Submit even if the pool is not full yet.
    ///
    /// # Returns
    ///
    /// `true` if a job was submitted (or rendered, in dry-run mode).
    pub fn submit(&mut self, force: bool) -> Result<bool> {
        if self.pool.is_empty() {
            log::debug!("DEBUG: no pooled commands for {}", self.pipeline_key);
            return Ok(false);
        }

        if !force && !self.is_full() {
            return Ok(false);
        }

        let bundle = self.resources()?;
        let looper_argtext = self.looper_argtext(&bundle);

        let submission_folder = self.project.submission_folder();
        std::fs::create_dir_all(&submission_folder)
            .map_err(|e| LooperError::path(&submission_folder, e))?;

        for (sample, _) in &self.pool {
            sample.write_state_file(&submission_folder)?;
        }

        let jobname = self.jobname()?;
        let script = submission_folder.join(format!("{}.{}", jobname, SUBMISSION_EXT));
        let logfile = submission_folder.join(format!("{}.{}", jobname, LOG_EXT));

        let code = self
            .pool
            .iter()
            .map(|(_, argstring)| {
                Job::from(self.cmd_base.as_str())
                    .arg(argstring)
                    .arg(&looper_argtext)
                    .cmd()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut values = HashMap::new();
        for (key, value) in &bundle.values {
            values.insert(key.to_uppercase(), value.to_string());
        }
        values.insert(JOBNAME.to_string(), jobname.clone());
        values.insert(CODE.to_string(), code);
        values.insert(LOGFILE.to_string(), logfile.display().to_string());

        let rendered = render_template(&self.template, &values);
        std::fs::write(&script, rendered).map_err(|e| LooperError::path(&script, e))?;

        if self.settings.dry_run {
            log::info!(
                "INFO: DRY RUN: I would have submitted this: {}",
                script.display()
            );
        } else {
            if !self.invoke(&script) {
                self.failed_submissions += 1;
            }

            if !self.settings.delay.is_zero() {
                std::thread::sleep(self.settings.delay);
            }
        }

        log::info!(
            "INFO: > job {} -> {} command(s), {:.3} GB",
            jobname,
            self.pool.len(),
            self.cumulative_size
        );

        self.jobs_submitted += 1;
        self.commands_submitted += self.pool.len();
        self.pool.clear();
        self.cumulative_size = 0.0;

        Ok(true)
    }

    fn resources(&self) -> Result<ResourceBundle> {
        let mut bundle = match choose_resources(self.iface, self.cumulative_size) {
            Ok(bundle) => bundle,
            Err(LooperError::NoResourcesConfigured { .. }) => {
                log::debug!(
                    "DEBUG: {} declares no resources, using an empty bundle",
                    self.pipeline_key
                );
                ResourceBundle::default()
            }
            Err(e) => return Err(e),
        };

        if let Some(partition) = &self.settings.partition {
            bundle.set(PARTITION, ParamValue::Str(partition.clone()));
        } else if bundle.partition().is_none() {
            if let Some(partition) = &self.compute.partition {
                bundle.set(PARTITION, ParamValue::Str(partition.clone()));
            }
        }

        Ok(bundle)
    }

    /// Arguments looper itself passes to pipelines that opt in to them.
    fn looper_argtext(&self, bundle: &ResourceBundle) -> String {
        if !self.iface.uses_looper_args() {
            return String::new();
        }

        let mut job = Job::new();

        if let Some(config) = &self.iface.config {
            job = job.arg(&format!("-C {}", expand_path(config).display()));
        }

        job = job.arg(&format!("-O {}", self.project.results_folder().display()));

        if let Some(cores) = bundle.cores() {
            if cores.to_float().is_some_and(|n| n > 1.0) {
                job = job.arg(&format!("-P {}", cores));
            }
        }

        if let Some(mem) = bundle.mem() {
            if mem.to_float().map_or(true, |n| n > 1.0) {
                job = job.arg(&format!("-M {}", mem));
            }
        }

        job.cmd().to_string()
    }

    fn jobname(&self) -> Result<String> {
        let name = if self.max_commands == 1 {
            match self.pool.as_slice() {
                [(sample, _)] => sample.name.clone(),
                pool => {
                    return Err(LooperError::Invariant(format!(
                        "single-command conductor for {} pooled {} commands",
                        self.pipeline_key,
                        pool.len()
                    )))
                }
            }
        } else {
            format!("{}{}", LUMP_PREFIX, self.jobs_submitted + 1)
        };

        Ok(format!("{}_{}", name, script_name(&self.pipeline_key)))
    }

    /// Hand the script to the scheduler.
    ///
    /// The outcome is reported but never fatal: a rejected job looks the
    /// same as an accepted one to the rest of the run.
    fn invoke(&self, script: &Path) -> bool {
        let cmd = format!(
            "{} {}",
            self.compute.submission_command,
            shell_words::quote(&script.to_string_lossy())
        );

        match Command::new("sh").arg("-c").arg(&cmd).output() {
            Ok(output) if output.status.success() => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                log::info!("INFO: submitted {} {}", script.display(), stdout.trim());
                true
            }
            Ok(output) => {
                log::warn!(
                    "WARN: submission command exited with {} for {}\n{}",
                    output.status,
                    script.display(),
                    String::from_utf8_lossy(&output.stderr)
                );
                false
            }
            Err(e) => {
                log::error!("ERROR: failed to execute '{}': {}", cmd, e);
                false
            }
        }
    }

    /// Path a job script of this conductor would be written to.
    pub fn script_path(&self, jobname: &str) -> PathBuf {
        self.project
            .submission_folder()
            .join(format!("{}.{}", jobname, SUBMISSION_EXT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::PipelineSource;
    use crate::protocol::ProtocolResolver;

    const TEMPLATE: &str = "#!/bin/bash\n#SBATCH --job-name='{JOBNAME}'\n#SBATCH --output='{LOGFILE}'\n#SBATCH --cpus-per-task='{CORES}'\n#SBATCH --partition='{PARTITION}'\n{CODE}\n";

    const INTERFACE: &str = r#"
protocol_mapping:
  RNA: rna.sh
pipelines:
  rna.sh:
    name: rnaseq
    arguments:
      "--sample-name": sample_name
      "--genome": genome
    required_input_files: [data_source]
    ngs_input_files: [data_source]
    resources:
      default:
        cores: 1
        partition: short
      big:
        min_file_size: 0.000001
        cores: 8
        mem: 16000
        partition: long
"#;

    struct Fixture {
        dir: tempfile::TempDir,
        project: Project,
        resolver: ProtocolResolver,
    }

    fn fixture(command: &str, interface: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("template.sub"), TEMPLATE).unwrap();

        let toml = format!(
            "[metadata]\nsample_annotation = \"samples.csv\"\noutput_dir = \"out\"\n\n[compute.default]\nsubmission_template = \"template.sub\"\nsubmission_command = \"{}\"\n\n[defaults]\ngenome = \"hg38\"\n",
            command
        );
        let mut project: Project = toml::from_str(&toml).unwrap();
        project.resolve_paths(dir.path());

        let source = PipelineSource::from_yaml_str(interface, dir.path()).unwrap();

        Fixture {
            dir,
            project,
            resolver: ProtocolResolver::new(vec![source]),
        }
    }

    fn make_conductor<'a>(fx: &'a Fixture, settings: SubmissionSettings) -> SubmissionConductor<'a> {
        let jobs = fx.resolver.resolve("RNA");
        let compute = fx.project.compute_package(DEFAULT_COMPUTE).unwrap();

        SubmissionConductor::new(&jobs[0], &fx.project, compute, settings).unwrap()
    }

    fn sample(fx: &Fixture, name: &str, bytes: usize) -> Sample {
        let input = fx.dir.path().join(format!("{}.bam", name));
        std::fs::write(&input, vec![0u8; bytes]).unwrap();

        Sample::new(
            name,
            vec![
                ("protocol", "RNA".to_string()),
                ("data_source", input.display().to_string()),
                ("genome", String::new()),
            ],
        )
    }

    fn dry(max_commands: Option<usize>, max_size: Option<f64>) -> SubmissionSettings {
        SubmissionSettings {
            dry_run: true,
            max_commands,
            max_size,
            ..Default::default()
        }
    }

    #[test]
    fn test_single_sample_jobs_are_submitted_on_add() {
        let fx = fixture("true", INTERFACE);
        let mut conductor = make_conductor(&fx, dry(None, None));

        let reasons = conductor.add_sample(sample(&fx, "frog_1", 10)).unwrap();
        assert!(reasons.is_empty());
        assert_eq!(conductor.jobs_submitted(), 1);
        assert_eq!(conductor.commands_submitted(), 1);
        assert_eq!(conductor.pool_len(), 0);

        let script = std::fs::read_to_string(conductor.script_path("frog_1_rna.sh")).unwrap();
        let results = fx.project.results_folder();
        assert!(script.contains("--job-name='frog_1_rna.sh'"));
        assert!(script.contains("--cpus-per-task='1'"));
        assert!(script.contains("--partition='short'"));
        assert!(script.contains(&format!(
            "{} --sample-name frog_1 --genome hg38\n",
            fx.dir.path().join("pipelines/rna.sh").display()
        )));
        assert!(!script.contains(&results.display().to_string()));

        let state = fx.project.submission_folder().join("frog_1.yaml");
        assert!(state.exists());
    }

    #[test]
    fn test_pool_fills_after_max_commands() {
        let fx = fixture("true", INTERFACE);
        let mut conductor = make_conductor(
            &fx,
            SubmissionSettings {
                automatic: false,
                ..dry(Some(2), None)
            },
        );

        conductor.add_sample(sample(&fx, "a", 1)).unwrap();
        assert!(!conductor.is_full());
        conductor.add_sample(sample(&fx, "b", 1)).unwrap();
        assert!(conductor.is_full());

        assert!(conductor.add_sample(sample(&fx, "c", 1)).is_err());
        assert_eq!(conductor.pool_len(), 2);

        assert!(conductor.submit(false).unwrap());
        assert_eq!(conductor.pool_len(), 0);
        assert_eq!(conductor.cumulative_size(), 0.0);
        assert_eq!(conductor.jobs_submitted(), 1);
        assert_eq!(conductor.commands_submitted(), 2);
    }

    #[test]
    fn test_automatic_lumps_are_named_in_sequence() {
        let fx = fixture("true", INTERFACE);
        let mut conductor = make_conductor(&fx, dry(Some(2), None));

        for name in ["a", "b", "c"] {
            conductor.add_sample(sample(&fx, name, 1)).unwrap();
        }

        assert_eq!(conductor.jobs_submitted(), 1);
        assert_eq!(conductor.pool_len(), 1);
        assert!(conductor.script_path("lump1_rna.sh").exists());

        assert!(conductor.submit(true).unwrap());
        assert!(conductor.script_path("lump2_rna.sh").exists());
        assert_eq!(conductor.jobs_submitted(), 2);
        assert_eq!(conductor.commands_submitted(), 3);

        let lump = std::fs::read_to_string(conductor.script_path("lump1_rna.sh")).unwrap();
        assert_eq!(lump.matches("--sample-name").count(), 2);
    }

    #[test]
    fn test_submit_needs_force_or_full_pool() {
        let fx = fixture("true", INTERFACE);
        let mut conductor = make_conductor(&fx, dry(Some(5), None));

        assert!(!conductor.submit(true).unwrap());

        conductor.add_sample(sample(&fx, "a", 1)).unwrap();
        assert!(!conductor.submit(false).unwrap());
        assert_eq!(conductor.pool_len(), 1);
        assert!(conductor.submit(true).unwrap());
        assert_eq!(conductor.jobs_submitted(), 1);
    }

    #[test]
    fn test_size_capacity_and_resource_tier() {
        let fx = fixture("true", INTERFACE);
        let mut conductor = make_conductor(&fx, dry(None, Some(0.000002)));

        // INFO: 1 KiB stays under the cap, 3 KiB more crosses it
        conductor.add_sample(sample(&fx, "a", 1024)).unwrap();
        assert_eq!(conductor.pool_len(), 1);
        conductor.add_sample(sample(&fx, "b", 3072)).unwrap();
        assert_eq!(conductor.jobs_submitted(), 1);

        let script = std::fs::read_to_string(conductor.script_path("lump1_rna.sh")).unwrap();
        assert!(script.contains("--cpus-per-task='8'"));
        assert!(script.contains("--partition='long'"));
    }

    #[test]
    fn test_partition_override() {
        let fx = fixture("true", INTERFACE);
        let mut conductor = make_conductor(
            &fx,
            SubmissionSettings {
                partition: Some("gpu".into()),
                ..dry(None, None)
            },
        );

        conductor.add_sample(sample(&fx, "a", 1)).unwrap();

        let script = std::fs::read_to_string(conductor.script_path("a_rna.sh")).unwrap();
        assert!(script.contains("--partition='gpu'"));
    }

    #[test]
    fn test_flags_skip_unless_ignored() {
        let fx = fixture("true", INTERFACE);
        let folder = fx.project.sample_folder("a");
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join("rnaseq_completed.flag"), "").unwrap();

        let mut conductor = make_conductor(&fx, dry(None, None));
        let reasons = conductor.add_sample(sample(&fx, "a", 1)).unwrap();
        assert_eq!(reasons, vec![SkipReason::FlagFound]);
        assert_eq!(conductor.jobs_submitted(), 0);

        let mut conductor = make_conductor(
            &fx,
            SubmissionSettings {
                ignore_flags: true,
                ..dry(None, None)
            },
        );
        assert!(conductor.add_sample(sample(&fx, "a", 1)).unwrap().is_empty());
        assert_eq!(conductor.jobs_submitted(), 1);
    }

    #[test]
    fn test_all_skip_reasons_are_reported() {
        let fx = fixture("true", INTERFACE);
        let mut conductor = make_conductor(&fx, dry(None, None));

        let broken = Sample::new(
            "broken",
            vec![
                ("data_source", "/no/such/file.bam"),
                ("read_type", "TRIPLE"),
            ],
        );

        let reasons = conductor.add_sample(broken).unwrap();
        assert_eq!(
            reasons,
            vec![
                SkipReason::MissingInputFiles,
                SkipReason::InvalidReadType,
                SkipReason::ArgumentString
            ]
        );
        assert_eq!(conductor.pool_len(), 0);

        let no_inputs = Sample::new("bare", vec![("genome", "mm10")]);
        let reasons = conductor.add_sample(no_inputs).unwrap();
        assert_eq!(reasons, vec![SkipReason::PipelineAttributes]);
    }

    #[test]
    fn test_real_submission_and_looper_args() {
        let interface = INTERFACE.replace("    name: rnaseq\n", "    name: rnaseq\n    looper_args: true\n");
        let fx = fixture("true", &interface);
        let mut conductor = make_conductor(
            &fx,
            SubmissionSettings {
                max_size: Some(0.000001),
                ..Default::default()
            },
        );

        conductor.add_sample(sample(&fx, "a", 4096)).unwrap();
        assert_eq!(conductor.jobs_submitted(), 1);
        assert_eq!(conductor.failed_submissions(), 0);

        let script = std::fs::read_to_string(conductor.script_path("lump1_rna.sh")).unwrap();
        assert!(script.contains(&format!(
            "--genome hg38 -O {} -P 8 -M 16000",
            fx.project.results_folder().display()
        )));
    }

    #[test]
    fn test_failed_submission_is_not_fatal() {
        let fx = fixture("false", INTERFACE);
        let mut conductor = make_conductor(&fx, SubmissionSettings::default());

        assert!(conductor.add_sample(sample(&fx, "a", 1)).unwrap().is_empty());
        assert_eq!(conductor.jobs_submitted(), 1);
        assert_eq!(conductor.failed_submissions(), 1);
    }

    #[test]
    fn test_submission_of_key_with_flags_into_spaced_folder() {
        let interface = INTERFACE.replace("  RNA: rna.sh\n", "  RNA: \"rna.sh --fast\"\n");
        let mut fx = fixture("test -f", &interface);
        fx.project.metadata.output_dir = fx.dir.path().join("out dir");

        let mut conductor = make_conductor(&fx, SubmissionSettings::default());
        assert_eq!(conductor.pipeline_key(), "rna.sh --fast");

        assert!(conductor.add_sample(sample(&fx, "a", 1)).unwrap().is_empty());
        assert_eq!(conductor.jobs_submitted(), 1);
        assert_eq!(conductor.failed_submissions(), 0);

        let script = conductor.script_path("a_rna.sh");
        assert!(script.exists());

        let contents = std::fs::read_to_string(script).unwrap();
        assert!(contents.contains("--job-name='a_rna.sh'"));
        assert!(contents.contains("rna.sh --fast --sample-name a"));
    }

    #[test]
    fn test_capacity_must_be_positive() {
        let fx = fixture("true", INTERFACE);
        let jobs = fx.resolver.resolve("RNA");
        let compute = fx.project.compute_package(DEFAULT_COMPUTE).unwrap();

        assert!(SubmissionConductor::new(&jobs[0], &fx.project, compute, dry(Some(0), None)).is_err());
        assert!(SubmissionConductor::new(&jobs[0], &fx.project, compute, dry(None, Some(0.0))).is_err());
    }
}
