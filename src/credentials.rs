//! Per-environment credential files
//!
//! Each environment to query is described by one file in the input
//! directory, conventionally named `<env>_input.<ext>`, holding shell-style
//! exports:
//!
//! ```text
//! export AWS_ACCESS_KEY_ID="AKIA..."
//! export AWS_SECRET_ACCESS_KEY="..."
//! export AWS_SESSION_TOKEN="..."
//! export AWS_REGION="eu-central-1"
//! ```
//!
//! A file missing a required field only disqualifies its own environment;
//! the remaining environments still run.

use crate::config::ConfigError;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Region used when a credential file does not export AWS_REGION
pub const DEFAULT_REGION: &str = "eu-central-1";

const KEY_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
const KEY_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
const KEY_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
const KEY_REGION: &str = "AWS_REGION";

/// Static credentials for one environment
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialBundle {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub region: String,
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Secrets stay out of logs
        f.debug_struct("CredentialBundle")
            .field("access_key_id", &self.access_key_id)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

/// A named AWS account context to query independently
#[derive(Debug, Clone)]
pub struct Environment {
    pub name: String,
    pub credentials: CredentialBundle,
}

/// Derive the environment name from a credential filename.
///
/// The stem is the name; a trailing `_input` (the `<env>_input.<ext>`
/// convention) is stripped, so `dev_input.ini` and `dev.ini` both map to
/// `dev`.
fn environment_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let name = stem.strip_suffix("_input").unwrap_or(stem);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Parse one credential file into a bundle.
fn parse_credential_file(path: &Path) -> Result<CredentialBundle, ConfigError> {
    let content =
        fs::read_to_string(path).map_err(|e| ConfigError::io(path.display().to_string(), e))?;

    let mut fields: HashMap<&str, String> = HashMap::new();
    for line in content.lines() {
        let Some(assignment) = line.trim().strip_prefix("export ") else {
            continue;
        };
        let Some((key, value)) = assignment.split_once('=') else {
            continue;
        };
        fields.insert(
            key.trim(),
            value.trim().trim_matches('"').to_string(),
        );
    }

    let require = |field: &'static str| -> Result<String, ConfigError> {
        fields
            .get(field)
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or(ConfigError::MissingCredentialField {
                path: path.display().to_string(),
                field,
            })
    };

    Ok(CredentialBundle {
        access_key_id: require(KEY_ACCESS_KEY_ID)?,
        secret_access_key: require(KEY_SECRET_ACCESS_KEY)?,
        session_token: require(KEY_SESSION_TOKEN)?,
        region: fields
            .get(KEY_REGION)
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_REGION.to_string()),
    })
}

/// Load every environment from the input directory, sorted by name.
///
/// A malformed file is logged and skipped so one bad environment cannot
/// take down the rest. An unreadable directory, or a directory with no
/// usable credential file at all, is fatal.
pub fn load_environments(input_dir: &Path) -> Result<Vec<Environment>, ConfigError> {
    let entries = fs::read_dir(input_dir).map_err(|e| ConfigError::CredentialDir {
        path: input_dir.display().to_string(),
        source: e,
    })?;

    let mut environments = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::CredentialDir {
            path: input_dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(true, |n| n.starts_with('.'))
        {
            continue;
        }
        let Some(name) = environment_name(&path) else {
            continue;
        };

        match parse_credential_file(&path) {
            Ok(credentials) => environments.push(Environment { name, credentials }),
            Err(e) => {
                warn!(environment = %name, error = %e, "Skipping environment with unusable credential file");
            }
        }
    }

    if environments.is_empty() {
        return Err(ConfigError::NoEnvironments(input_dir.to_path_buf()));
    }

    environments.sort_by(|a, b| a.name.cmp(&b.name));
    info!(
        environments = ?environments.iter().map(|e| e.name.as_str()).collect::<Vec<_>>(),
        "Loaded credentials"
    );
    Ok(environments)
}
