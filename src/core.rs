use hashbrown::hash_map::Entry;
use hashbrown::HashMap;

use std::collections::{BTreeMap, BTreeSet};

use crate::config::*;
use crate::consts::*;
use crate::error::{LooperError, Result, SkipReason};
use crate::executor::conductor::{SubmissionConductor, SubmissionSettings};
use crate::flags::fetch_flags;
use crate::interface::PipelineSource;
use crate::protocol::ProtocolResolver;
use crate::resources::validate_resources;
use crate::sample::{load_samples, Sample};

/// Options of a single `looper run`.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub compute: String,
    pub settings: SubmissionSettings,
    pub limit: Option<usize>,
    pub priority: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            compute: DEFAULT_COMPUTE.into(),
            settings: SubmissionSettings::default(),
            limit: None,
            priority: true,
        }
    }
}

/// Progress through the samples of one run.
///
/// # Example
///
/// ``` rust, no_run
/// # use looper::core::RunCounter;
/// let mut counter = RunCounter::new(2);
///
/// assert_eq!(counter.show("frog_1", Some("RNA")), "## [1 of 2] frog_1 (RNA)");
/// assert_eq!(counter.show("frog_2", None), "## [2 of 2] frog_2");
/// ```
#[derive(Debug, Clone)]
pub struct RunCounter {
    count: usize,
    total: usize,
}

impl RunCounter {
    pub fn new(total: usize) -> Self {
        Self { count: 0, total }
    }

    /// Advance the counter and describe the sample being processed.
    pub fn show(&mut self, name: &str, protocol: Option<&str>) -> String {
        self.count += 1;

        match protocol {
            Some(protocol) => format!(
                "## [{} of {}] {} ({})",
                self.count, self.total, name, protocol
            ),
            None => format!("## [{} of {}] {}", self.count, self.total, name),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// What a run did, for reporting and tests.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub samples: usize,
    pub jobs_submitted: usize,
    pub commands_submitted: usize,
    pub failed_submissions: usize,
    /// Sample names grouped by skip reason text.
    pub failures: BTreeMap<String, BTreeSet<String>>,
}

impl RunSummary {
    fn record(&mut self, reason: &SkipReason, sample: &str) {
        self.failures
            .entry(reason.to_string())
            .or_default()
            .insert(sample.to_string());
    }

    /// Log totals and the failure summary, grouped by reason.
    pub fn report(&self, dry_run: bool) {
        log::info!(
            "INFO: Looper finished: {} samples, {} jobs submitted ({} commands)",
            self.samples,
            self.jobs_submitted,
            self.commands_submitted
        );

        if dry_run {
            log::info!("INFO: Dry run. No jobs were actually submitted.");
        }

        if self.failed_submissions > 0 {
            log::warn!(
                "WARN: {} submission command(s) did not exit cleanly",
                self.failed_submissions
            );
        }

        for (reason, samples) in &self.failures {
            log::warn!(
                "WARN: {} samples failed for reason '{}': {}",
                samples.len(),
                reason,
                samples.iter().cloned().collect::<Vec<_>>().join(", ")
            );
        }
    }
}

/// Load every pipeline source the project registers, in order.
///
/// Resource tables of every pipeline are validated here, before any
/// sample is processed.
///
/// # Errors
///
/// A project without pipeline interfaces, any source failing to load, or
/// a pipeline with an invalid resource table.
pub fn build_resolver(project: &Project, priority: bool) -> Result<ProtocolResolver> {
    if project.metadata.pipeline_interfaces.is_empty() {
        return Err(LooperError::Config(
            "project declares no pipeline_interfaces".into(),
        ));
    }

    let sources = project
        .metadata
        .pipeline_interfaces
        .iter()
        .map(|location| PipelineSource::from_location(location))
        .collect::<Result<Vec<_>>>()?;

    for source in &sources {
        let mut keys = source.pipelines.keys().collect::<Vec<_>>();
        keys.sort();

        for key in keys {
            validate_resources(&source.pipelines[key])?;
        }
    }

    let resolver = ProtocolResolver::new(sources);

    Ok(if priority {
        resolver
    } else {
        resolver.without_priority()
    })
}

/// Submit every sample of a project to the pipelines of its protocol.
///
/// # Arguments
///
/// * `project` - The project context.
/// * `options` - Compute package, pooling and submission behavior.
///
/// # Returns
///
/// A summary of submitted jobs and skipped samples.
///
/// # Example
///
/// ``` rust, no_run
/// # use std::path::PathBuf;
/// # use looper::config::Project;
/// # use looper::core::{run, RunOptions};
/// let project = Project::read(PathBuf::from("project.toml")).unwrap();
/// let summary = run(&project, &RunOptions::default()).unwrap();
/// ```
pub fn run(project: &Project, options: &RunOptions) -> Result<RunSummary> {
    log::info!(
        "INFO: starting {} run at {}",
        LOOPER,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let resolver = build_resolver(project, options.priority)?;
    let compute = project.compute_package(&options.compute)?;
    let samples = load_samples(&project.metadata.sample_annotation)?;

    for folder in [project.results_folder(), project.submission_folder()] {
        std::fs::create_dir_all(&folder).map_err(|e| LooperError::path(&folder, e))?;
    }

    let total = options
        .limit
        .map_or(samples.len(), |limit| limit.min(samples.len()));

    let mut counter = RunCounter::new(total);
    let mut summary = RunSummary::default();
    let mut conductors: HashMap<String, SubmissionConductor> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for sample in samples.into_iter().take(total) {
        log::info!("{}", counter.show(&sample.name, sample.protocol.as_deref()));

        let Some(protocol) = sample.protocol.as_deref() else {
            log::warn!("WARN: > Not submitted: {}", SkipReason::MissingProtocol);
            summary.record(&SkipReason::MissingProtocol, &sample.name);
            continue;
        };

        let jobs = resolver.resolve(protocol);
        if jobs.is_empty() {
            log::warn!("WARN: > Not submitted: no pipeline for protocol '{}'", protocol);
            summary.record(&SkipReason::NoPipelineForProtocol, &sample.name);
            continue;
        }

        for job in jobs {
            let conductor = match conductors.entry(job.key.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    order.push(job.key.clone());
                    entry.insert(SubmissionConductor::new(
                        &job,
                        project,
                        compute,
                        options.settings.clone(),
                    )?)
                }
            };

            let reasons = conductor.add_sample(sample.clone())?;
            for reason in &reasons {
                summary.record(reason, &sample.name);
            }

            if !reasons.is_empty() {
                log::info!(
                    "INFO: > Not submitted to {}: {}",
                    job.key,
                    reasons
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("; ")
                );
            }
        }
    }

    for key in &order {
        if let Some(conductor) = conductors.get_mut(key) {
            conductor.submit(true)?;

            summary.jobs_submitted += conductor.jobs_submitted();
            summary.commands_submitted += conductor.commands_submitted();
            summary.failed_submissions += conductor.failed_submissions();
        }
    }

    summary.samples = counter.count();
    summary.report(options.settings.dry_run);

    Ok(summary)
}

/// Count the run flags of every (sample, pipeline) pair of a project.
///
/// # Returns
///
/// Number of flags per state; flags without a known state count as
/// `unknown`.
pub fn check(project: &Project, priority: bool) -> Result<BTreeMap<String, usize>> {
    let resolver = build_resolver(project, priority)?;
    let samples = load_samples(&project.metadata.sample_annotation)?;

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();

    for sample in &samples {
        for (pipeline, states) in sample_flags(project, &resolver, sample) {
            if states.is_empty() {
                log::debug!("DEBUG: {} / {}: no flags", sample.name, pipeline);
                continue;
            }

            log::info!("INFO: {} / {}: {}", sample.name, pipeline, states.join(", "));
            for state in states {
                *counts.entry(state).or_default() += 1;
            }
        }
    }

    for (state, count) in &counts {
        log::info!("INFO: {}: {}", state, count);
    }

    Ok(counts)
}

fn sample_flags(
    project: &Project,
    resolver: &ProtocolResolver,
    sample: &Sample,
) -> Vec<(String, Vec<String>)> {
    let Some(protocol) = sample.protocol.as_deref() else {
        return Vec::new();
    };

    let folder = project.sample_folder(&sample.name);

    resolver
        .resolve(protocol)
        .into_iter()
        .map(|job| {
            let name = job.interface.pipeline_name();
            let states = fetch_flags(&folder, &name)
                .into_iter()
                .map(|flag| flag.state.unwrap_or_else(|| "unknown".into()))
                .collect();

            (name, states)
        })
        .collect()
}
