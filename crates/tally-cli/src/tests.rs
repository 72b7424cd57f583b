use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use tally_core::models::TransactionChanges;
use tally_core::services::DatabaseService;
use tally_core::sync::SyncReport;
use tally_core::{LocalId, Transaction, TransactionDraft, TransactionKind};
use tempfile::TempDir;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::common::{
    format_relative_time, format_timestamp, format_transaction_lines, parse_transaction_id,
    sync_state_label, transaction_to_list_item, truncate,
};
use crate::commands::config::apply_profile_update;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::sync::format_report_lines;
use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;

fn test_db() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tally.db");
    (dir, path)
}

fn sample(remote_id: i64) -> Transaction {
    let mut transaction = Transaction::from_draft(
        TransactionDraft::new("Coffee", Decimal::new(-450, 2), TransactionKind::Debit),
        1_000,
    );
    transaction.local_id = LocalId::new(7);
    transaction.remote_id = remote_id;
    transaction
}

#[test]
fn parse_transaction_id_rejects_blank_and_non_numeric() {
    assert_eq!(parse_transaction_id(" 42 ").unwrap(), LocalId::new(42));
    assert!(matches!(
        parse_transaction_id("  "),
        Err(CliError::EmptyTransactionId)
    ));
    assert!(matches!(
        parse_transaction_id("abc"),
        Err(CliError::InvalidTransactionId(_))
    ));
    assert!(matches!(
        parse_transaction_id("0"),
        Err(CliError::InvalidTransactionId(_))
    ));
}

#[test]
fn truncate_adds_ellipsis() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(
        truncate("This is a very long   title that keeps going", 20),
        "This is a very lo..."
    );
}

#[test]
fn format_relative_time_units() {
    let now = 10_000_000_000;
    assert_eq!(format_relative_time(now - 30_000, now), "just now");
    assert_eq!(format_relative_time(now - 120_000, now), "2m ago");
    assert_eq!(format_relative_time(now - 2 * 60 * 60_000, now), "2h ago");
    assert_eq!(format_relative_time(now - 3 * 24 * 60 * 60_000, now), "3d ago");
}

#[test]
fn format_timestamp_renders_utc() {
    assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
    assert_eq!(format_timestamp(i64::MAX), i64::MAX.to_string());
}

#[test]
fn sync_state_label_reflects_dirty_flags() {
    assert_eq!(sync_state_label(&sample(0)), "new");
    assert_eq!(sync_state_label(&sample(3)), "synced");

    let mut modified = sample(3);
    modified.pending_update = true;
    assert_eq!(sync_state_label(&modified), "modified");

    let mut deleting = sample(3);
    deleting.pending_delete = true;
    assert_eq!(sync_state_label(&deleting), "deleting");
}

#[test]
fn list_item_exposes_remote_id_only_when_synced() {
    let item = transaction_to_list_item(&sample(0));
    assert_eq!(item.id, 7);
    assert_eq!(item.remote_id, None);
    assert_eq!(item.amount, "-4.50");
    assert_eq!(item.kind, "Debit");

    let item = transaction_to_list_item(&sample(11));
    assert_eq!(item.remote_id, Some(11));
    assert_eq!(item.sync_state, "synced");
}

#[test]
fn format_transaction_lines_includes_category() {
    let mut transaction = sample(0);
    transaction.category = "Food".to_string();
    let lines = format_transaction_lines(&[transaction]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("Coffee"));
    assert!(lines[0].contains("-4.50"));
    assert!(lines[0].contains("[Food]"));
}

#[test]
fn report_lines_mention_failures_and_pull_errors() {
    let report = SyncReport {
        created: 2,
        delete_failures: 1,
        pull_error: Some("Sync transport error: offline".to_string()),
        ..SyncReport::default()
    };
    let lines = format_report_lines(&report);

    assert_eq!(lines[0], "Pushed: 2 created, 0 updated, 0 deleted");
    assert!(lines.iter().any(|line| line.starts_with("Failed: 1 delete(s)")));
    assert!(lines.iter().any(|line| line.contains("offline")));
    assert_eq!(lines.last().unwrap(), "Sync finished with errors");
}

#[test]
fn report_lines_for_clean_run() {
    let report = SyncReport {
        pulled: 1,
        inserted: 1,
        cursor_before: Some(i64::MIN),
        cursor_after: Some(0),
        ..SyncReport::default()
    };
    let lines = format_report_lines(&report);

    assert!(lines.contains(&"Up to date through 1970-01-01 00:00:00 UTC".to_string()));
    assert_eq!(lines.last().unwrap(), "Sync completed");
}

#[test]
fn cli_parses_negative_amounts_and_kind_aliases() {
    let cli = Cli::try_parse_from([
        "tally", "add", "Salary", "--amount", "-12.5", "--kind", "income",
    ])
    .unwrap();

    match cli.command {
        Commands::Add {
            title,
            amount,
            kind,
            ..
        } => {
            assert_eq!(title, "Salary");
            assert_eq!(amount, Decimal::new(-125, 1));
            assert_eq!(kind, TransactionKind::Credit);
        }
        _ => panic!("expected add command"),
    }

    assert!(Cli::try_parse_from(["tally", "add", "x", "--amount", "1", "--kind", "bogus"]).is_err());
}

#[test]
fn apply_profile_update_validates_and_activates() {
    let mut config = CliProfilesConfig::default();

    apply_profile_update(
        &mut config,
        "work",
        Some("https://api.example.com/".to_string()),
        Some(30),
        false,
    )
    .unwrap();

    assert_eq!(config.active_profile.as_deref(), Some("work"));
    assert_eq!(
        config.profiles,
        BTreeMap::from([(
            "work".to_string(),
            CliProfile {
                api_base_url: Some("https://api.example.com".to_string()),
                request_timeout_secs: Some(30),
            }
        )])
    );

    let error =
        apply_profile_update(&mut config, "other", Some("ftp://x".to_string()), None, true)
            .unwrap_err();
    assert!(matches!(error, CliError::Config(_)));
    assert!(matches!(
        apply_profile_update(&mut config, "other", None, Some(0), true),
        Err(CliError::Config(_))
    ));
    assert_eq!(config.active_profile.as_deref(), Some("work"));
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "multi_thread")]
async fn add_edit_and_delete_round_trip_through_database() {
    let (_dir, db_path) = test_db();

    run_add(
        " Lunch ",
        Decimal::new(-1250, 2),
        TransactionKind::Debit,
        Some("Food".to_string()),
        None,
        &db_path,
    )
    .await
    .unwrap();

    let db = DatabaseService::open_path(&db_path).await.unwrap();
    let listed = db.list_transactions(10, 0).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Lunch");
    assert_eq!(listed[0].category, "Food");
    let id = listed[0].local_id;
    drop(db);

    run_edit(
        &id.to_string(),
        TransactionChanges {
            notes: Some("with team".to_string()),
            ..TransactionChanges::default()
        },
        &db_path,
    )
    .await
    .unwrap();

    let db = DatabaseService::open_path(&db_path).await.unwrap();
    let edited = db.get_transaction(id).await.unwrap().unwrap();
    assert_eq!(edited.notes, "with team");
    // Never synced, so still a pending create rather than a pending update
    assert!(edited.is_pending_create());
    assert!(!edited.pending_update);
    drop(db);

    run_delete(&id.to_string(), &db_path).await.unwrap();
    let db = DatabaseService::open_path(&db_path).await.unwrap();
    assert!(db.get_transaction(id).await.unwrap().is_none());
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "multi_thread")]
async fn edit_and_delete_report_missing_transaction() {
    let (_dir, db_path) = test_db();

    let error = run_edit(
        "99",
        TransactionChanges {
            title: Some("New".to_string()),
            ..TransactionChanges::default()
        },
        &db_path,
    )
    .await
    .unwrap_err();
    assert!(matches!(error, CliError::TransactionNotFound(id) if id == "99"));

    let error = run_delete("99", &db_path).await.unwrap_err();
    assert!(matches!(error, CliError::TransactionNotFound(_)));
}

#[cfg_attr(windows, ignore = "libsql integration is flaky on windows CI")]
#[tokio::test(flavor = "multi_thread")]
async fn add_rejects_blank_title() {
    let (_dir, db_path) = test_db();

    let error = run_add(
        "   ",
        Decimal::ONE,
        TransactionKind::Credit,
        None,
        None,
        &db_path,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        error,
        CliError::Core(tally_core::Error::InvalidInput(_))
    ));
}
