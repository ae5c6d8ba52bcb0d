use std::cmp::Ordering;

use crate::consts::*;
use crate::error::{LooperError, Result};
use crate::interface::{OrderedMap, PipelineInterface, ResourceBundle, ResourceTier};

/// Choose the resource bundle for a pipeline run over `file_size_gb` of input.
///
/// Tiers are ranked by descending minimum file size and the first tier the
/// input still qualifies for wins, so the job gets the smallest bundle that
/// is sufficient for it. The `default` tier always has a threshold of 0.
///
/// # Arguments
///
/// * `entry` - The pipeline interface declaring the resource table.
/// * `file_size_gb` - Total input size in GB, must be non-negative.
///
/// # Errors
///
/// * `InvalidInput` for a negative (or non-finite) size.
/// * `NoResourcesConfigured` if the pipeline declares no resources; callers
///   treat this as an empty bundle.
/// * `MissingDefaultTier` if resources exist without a `default` tier.
/// * `InvalidResourceSpec` if any tier declares a negative threshold.
///
/// # Example
///
/// ``` rust, no_run
/// let bundle = choose_resources(&iface, 15.0).unwrap();
///
/// assert_eq!(bundle.cores(), Some(&ParamValue::Int(8)));
/// ```
pub fn choose_resources(entry: &PipelineInterface, file_size_gb: f64) -> Result<ResourceBundle> {
    if !file_size_gb.is_finite() || file_size_gb < 0.0 {
        return Err(LooperError::InvalidInput(format!(
            "file size must be a non-negative number of GB, got {}",
            file_size_gb
        )));
    }

    let tiers = entry
        .resources
        .as_ref()
        .ok_or_else(|| LooperError::NoResourcesConfigured {
            pipeline: entry.key.clone(),
        })?;

    let ranked = ranked_tiers(entry, tiers)?;

    let (name, _, tier) = ranked
        .into_iter()
        .find(|(_, min_size, _)| *min_size <= file_size_gb)
        .ok_or_else(|| LooperError::MissingDefaultTier {
            pipeline: entry.key.clone(),
        })?;

    log::debug!(
        "DEBUG: selected resource tier '{}' for {} ({:.3} GB)",
        name,
        entry.key,
        file_size_gb
    );

    Ok(tier.bundle())
}

/// Check a pipeline's resource table without choosing a tier.
///
/// Pipelines without resources are valid. Run over every loaded pipeline
/// before anything is submitted.
///
/// # Errors
///
/// * `MissingDefaultTier` if resources exist without a `default` tier.
/// * `InvalidResourceSpec` if any tier declares a negative threshold.
pub fn validate_resources(entry: &PipelineInterface) -> Result<()> {
    match &entry.resources {
        Some(tiers) => ranked_tiers(entry, tiers).map(|_| ()),
        None => Ok(()),
    }
}

fn ranked_tiers<'a>(
    entry: &PipelineInterface,
    tiers: &'a OrderedMap<ResourceTier>,
) -> Result<Vec<(&'a str, f64, &'a ResourceTier)>> {
    if !tiers.contains_key(DEFAULT_TIER) {
        return Err(LooperError::MissingDefaultTier {
            pipeline: entry.key.clone(),
        });
    }

    rank_tiers(&entry.key, tiers.iter())
}

/// Rank tiers by descending threshold, keeping declaration order on ties.
///
/// Every threshold is validated here, not only the one a job ends up hitting.
fn rank_tiers<'a>(
    pipeline: &str,
    tiers: impl Iterator<Item = (&'a str, &'a ResourceTier)>,
) -> Result<Vec<(&'a str, f64, &'a ResourceTier)>> {
    let mut ranked = tiers
        .map(|(name, tier)| Ok((name, tier_min_size(pipeline, name, tier)?, tier)))
        .collect::<Result<Vec<_>>>()?;

    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    Ok(ranked)
}

fn tier_min_size(pipeline: &str, name: &str, tier: &ResourceTier) -> Result<f64> {
    if name == DEFAULT_TIER {
        return Ok(0.0);
    }

    let size = match tier.declared_min_size() {
        None => 0.0,
        Some(value) => value.to_float().ok_or_else(|| {
            LooperError::Config(format!(
                "resource tier '{}' of pipeline '{}' has a non-numeric file size: {}",
                name, pipeline, value
            ))
        })?,
    };

    if size.is_nan() || size < 0.0 {
        return Err(LooperError::InvalidResourceSpec {
            pipeline: pipeline.to_string(),
            tier: name.to_string(),
            size,
        });
    }

    Ok(size)
}
