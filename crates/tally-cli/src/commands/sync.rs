use std::path::Path;

use tally_core::sync::{HttpSyncClient, RetryPolicy, SyncEngine, SyncOutcome, SyncReport};

use crate::commands::common::{format_timestamp, open_database, resolve_remote_context};
use crate::error::CliError;

pub async fn run_sync(
    retries: u32,
    api_base_url: Option<String>,
    as_json: bool,
    global_profile: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let context = resolve_remote_context(global_profile, api_base_url)?;
    let db = open_database(db_path).await?;
    let client = HttpSyncClient::new(context.config, context.session.clone())?;
    let engine = SyncEngine::new(db, client, context.session);
    tracing::debug!(
        profile = %context.profile_name,
        api_base_url = %engine.client().config().api_base_url,
        database = ?engine.store().db_path(),
        "Starting sync"
    );

    let policy = RetryPolicy::default().with_max_attempts(retries.saturating_add(1));
    let outcome = engine.run_with_retry(&policy).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        SyncOutcome::Skipped => println!(
            "Not signed in for profile '{}'; nothing synced. Run `tally auth login --email <email> --token <token>`.",
            context.profile_name
        ),
        SyncOutcome::AlreadyRunning => println!("A sync is already running."),
        SyncOutcome::Completed(report) => {
            for line in format_report_lines(&report) {
                println!("{line}");
            }
            let remaining = engine.store().pending_counts().await?;
            if remaining.total() > 0 {
                println!(
                    "Still pending: {} new, {} modified, {} deleted",
                    remaining.creates, remaining.updates, remaining.deletes
                );
            }
        }
    }
    Ok(())
}

pub fn format_report_lines(report: &SyncReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Pushed: {} created, {} updated, {} deleted",
        report.created,
        report.updated,
        report.deleted + report.purged
    )];

    if report.update_conflicts > 0 {
        lines.push(format!(
            "Conflicts: {} local edit(s) replaced by the remote version",
            report.update_conflicts
        ));
    }
    if report.delete_failures + report.update_failures > 0 {
        lines.push(format!(
            "Failed: {} delete(s), {} update(s); they will be retried next sync",
            report.delete_failures, report.update_failures
        ));
    }

    match &report.pull_error {
        Some(error) => lines.push(format!("Pull failed: {error}")),
        None => lines.push(format!(
            "Pulled: {} change(s) ({} new, {} overwritten, {} kept local)",
            report.pulled, report.inserted, report.overwritten, report.marked_local_ahead
        )),
    }
    if let Some(cursor) = report.cursor_after.filter(|_| report.cursor_advanced()) {
        lines.push(format!("Up to date through {}", format_timestamp(cursor)));
    }

    lines.push(if report.is_partial() {
        "Sync finished with errors".to_string()
    } else {
        "Sync completed".to_string()
    });
    lines
}
