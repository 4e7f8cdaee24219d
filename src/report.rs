//! CSV report generation
//!
//! Four report kinds are written per run:
//!
//! | File | Content |
//! |------|---------|
//! | `<env>_tags.csv` | every fetched resource in one environment |
//! | `<env>_focused_tags.csv` | the focus-filtered subset |
//! | `summary_tags.csv` | per tag key, resource counts across environments |
//! | `focused_summary_tags.csv` | the same aggregation over focused resources |
//!
//! Per-resource files carry `Resource ARN`, `Resource Type`, then the
//! sorted union of every tag key seen in the set; a resource without a
//! given tag gets an empty cell. Row order is fetch order. Nothing
//! time-dependent is embedded, so rerunning against unchanged upstream
//! data reproduces the files byte for byte.

use crate::aws::tagging::Resource;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Report-writing failures; fatal for the run since a partial report set
/// is misleading.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to create or write a report file
    #[error("Failed to write report '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// Failed to flush a report file
    #[error("Failed to flush report '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// One environment's fetched resources, as accumulated by the run loop
#[derive(Debug, Clone)]
pub struct EnvironmentResources {
    pub name: String,
    /// Everything the Tag Fetcher returned, in fetch order
    pub resources: Vec<Resource>,
    /// The focus-filtered subset, same order
    pub focused: Vec<Resource>,
}

/// Writes all report kinds into one output directory
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// One CSV per environment with all resources and tags
    pub fn write_environment_report(
        &self,
        env: &str,
        resources: &[Resource],
    ) -> Result<PathBuf, WriteError> {
        self.write_resource_csv(&format!("{env}_tags.csv"), resources)
    }

    /// One CSV per environment with only the focus-passing resources
    pub fn write_focused_report(
        &self,
        env: &str,
        resources: &[Resource],
    ) -> Result<PathBuf, WriteError> {
        self.write_resource_csv(&format!("{env}_focused_tags.csv"), resources)
    }

    /// Aggregated CSV: per tag key, resource counts across all environments
    pub fn write_summary_report(
        &self,
        environments: &[EnvironmentResources],
    ) -> Result<PathBuf, WriteError> {
        self.write_summary_csv("summary_tags.csv", environments, |e| &e.resources)
    }

    /// The summary aggregation restricted to focused resources
    pub fn write_focused_summary_report(
        &self,
        environments: &[EnvironmentResources],
    ) -> Result<PathBuf, WriteError> {
        self.write_summary_csv("focused_summary_tags.csv", environments, |e| &e.focused)
    }

    fn write_resource_csv(
        &self,
        filename: &str,
        resources: &[Resource],
    ) -> Result<PathBuf, WriteError> {
        let path = self.output_dir.join(filename);
        let mut writer = open_writer(&path)?;

        // Sorted union of tag keys across the whole set
        let tag_keys: BTreeSet<&str> = resources
            .iter()
            .flat_map(|r| r.tags.keys().map(String::as_str))
            .collect();

        let mut header = vec!["Resource ARN", "Resource Type"];
        header.extend(tag_keys.iter().copied());
        writer
            .write_record(&header)
            .map_err(|e| csv_error(&path, e))?;

        for resource in resources {
            let mut row = vec![resource.arn.as_str(), resource.resource_type()];
            for key in &tag_keys {
                row.push(resource.tags.get(*key).map(String::as_str).unwrap_or(""));
            }
            writer.write_record(&row).map_err(|e| csv_error(&path, e))?;
        }

        finish_writer(writer, &path)?;
        info!(path = %path.display(), rows = resources.len(), "Report written");
        Ok(path)
    }

    fn write_summary_csv(
        &self,
        filename: &str,
        environments: &[EnvironmentResources],
        select: impl Fn(&EnvironmentResources) -> &[Resource],
    ) -> Result<PathBuf, WriteError> {
        let path = self.output_dir.join(filename);
        let mut writer = open_writer(&path)?;

        // Per tag key: how many resources in each environment carry it,
        // and which values it takes anywhere. Tag keys are unique within a
        // resource, so one tag entry means one carrying resource.
        let mut per_key: BTreeMap<&str, (BTreeMap<&str, usize>, BTreeSet<&str>)> = BTreeMap::new();
        for env in environments {
            for resource in select(env) {
                for (key, value) in &resource.tags {
                    let (counts, values) = per_key.entry(key.as_str()).or_default();
                    *counts.entry(env.name.as_str()).or_insert(0) += 1;
                    values.insert(value.as_str());
                }
            }
        }

        let mut header = vec!["Tag Key".to_string()];
        header.extend(environments.iter().map(|e| e.name.clone()));
        header.push("Total Resources".to_string());
        header.push("Distinct Values".to_string());
        writer
            .write_record(&header)
            .map_err(|e| csv_error(&path, e))?;

        for (key, (counts, values)) in &per_key {
            let mut row = vec![key.to_string()];
            let mut total = 0;
            for env in environments {
                let count = counts.get(env.name.as_str()).copied().unwrap_or(0);
                total += count;
                row.push(count.to_string());
            }
            row.push(total.to_string());
            row.push(values.iter().copied().collect::<Vec<_>>().join("; "));
            writer.write_record(&row).map_err(|e| csv_error(&path, e))?;
        }

        finish_writer(writer, &path)?;
        info!(path = %path.display(), tag_keys = per_key.len(), "Summary written");
        Ok(path)
    }
}

fn open_writer(path: &Path) -> Result<csv::Writer<std::fs::File>, WriteError> {
    csv::Writer::from_path(path).map_err(|e| csv_error(path, e))
}

fn finish_writer(mut writer: csv::Writer<std::fs::File>, path: &Path) -> Result<(), WriteError> {
    writer.flush().map_err(|e| WriteError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn csv_error(path: &Path, source: csv::Error) -> WriteError {
    WriteError::Csv {
        path: path.display().to_string(),
        source,
    }
}
