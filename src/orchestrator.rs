//! Sequential run loop: credentials, fetch, focus, reports
//!
//! Environments are processed one at a time, each fully completing
//! fetch-filter before the next begins. A fetch failure only removes that
//! environment from the outputs; configuration and write failures abort
//! the run.

use crate::aws::{account, EnvContext, FetchError, Resource, TaggingClient};
use crate::config::Config;
use crate::credentials::{self, Environment};
use crate::focus::{self, FocusRule};
use crate::report::{EnvironmentResources, ReportWriter};
use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use tracing::{error, info};

/// Per-environment outcome for the end-of-run table
struct EnvOutcome {
    name: String,
    result: Result<(usize, usize), FetchError>,
}

/// Run the whole pipeline against a validated configuration.
pub async fn run(config: &Config) -> Result<()> {
    let rule = match &config.focus_file {
        Some(path) => {
            let rule = FocusRule::load(path)?;
            info!(path = %path.display(), "Loaded focus rule");
            rule
        }
        None => {
            info!("No focus file configured, every resource passes");
            FocusRule::default()
        }
    };

    let environments = credentials::load_environments(&config.input_dir)?;

    let mut collected: Vec<EnvironmentResources> = Vec::new();
    let mut outcomes: Vec<EnvOutcome> = Vec::new();

    for env in &environments {
        info!(
            environment = %env.name,
            region = %env.credentials.region,
            "Fetching resource tags"
        );

        match fetch_environment(env).await {
            Ok(resources) => {
                let focused = focus::apply(&resources, &rule);
                info!(
                    environment = %env.name,
                    resources = resources.len(),
                    focused = focused.len(),
                    "Fetch complete"
                );
                outcomes.push(EnvOutcome {
                    name: env.name.clone(),
                    result: Ok((resources.len(), focused.len())),
                });
                collected.push(EnvironmentResources {
                    name: env.name.clone(),
                    resources,
                    focused,
                });
            }
            Err(e) => {
                error!(
                    environment = %env.name,
                    error = %e,
                    "Fetch failed, environment excluded from reports"
                );
                outcomes.push(EnvOutcome {
                    name: env.name.clone(),
                    result: Err(e),
                });
            }
        }
    }

    let writer = ReportWriter::new(config.output_dir.clone());
    for env in &collected {
        writer.write_environment_report(&env.name, &env.resources)?;
        writer.write_focused_report(&env.name, &env.focused)?;
    }
    writer.write_summary_report(&collected)?;
    writer.write_focused_summary_report(&collected)?;

    print_run_summary(&outcomes);
    Ok(())
}

/// Fetch one environment's resources with its own credentials.
async fn fetch_environment(env: &Environment) -> Result<Vec<Resource>, FetchError> {
    let ctx = EnvContext::new(&env.credentials).await;

    let account_id = account::verify_identity(&ctx).await?;
    info!(
        environment = %env.name,
        account_id = %account_id,
        "Credentials validated"
    );

    TaggingClient::new(&ctx).fetch_all().await
}

/// Print a per-environment summary table to stdout
fn print_run_summary(outcomes: &[EnvOutcome]) {
    if outcomes.is_empty() {
        return;
    }

    println!("\n=== Tag Sweep Summary ===\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Environment"),
            Cell::new("Resources"),
            Cell::new("Focused"),
            Cell::new("Status"),
        ]);

    for outcome in outcomes {
        let row = match &outcome.result {
            Ok((resources, focused)) => vec![
                Cell::new(&outcome.name),
                Cell::new(resources),
                Cell::new(focused),
                Cell::new("ok"),
            ],
            Err(e) => vec![
                Cell::new(&outcome.name),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new(format!("failed: {e}")),
            ],
        };
        table.add_row(row);
    }

    println!("{table}");
}
