/// Black-box tests for the `choreo` binary: every command path, the error
/// rendering and the on-disk document the commands leave behind.
use chrono::{NaiveTime, Utc};
use predicates::prelude::*;

mod helpers;
use helpers::{assertions, CliTestHarness};

const WEEKLY_ANCHOR: &str = "2024-01-01T09:00:00Z";

fn harness_with_weekly_chore() -> (CliTestHarness, String) {
    let harness = CliTestHarness::new();
    harness
        .run_success(&["add", "Take out trash", "--at", WEEKLY_ANCHOR, "--repeat", "weekly"])
        .stdout(assertions::chore_created());
    let id = harness.task_id("Take out trash");
    (harness, id)
}

#[test]
fn test_cli_help_and_version() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["--help"])
        .stdout(predicate::str::contains("chores calendar"))
        .stdout(predicate::str::contains("today"));

    harness
        .run_success(&["--version"])
        .stdout(predicate::str::contains("choreo"));

    harness
        .run_failure(&["invalid-command"])
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_add_and_list() {
    let harness = CliTestHarness::new();

    harness.run_success(&["list"]).stdout(predicate::str::contains("No chores found."));

    harness
        .run_success(&["add", "Buy milk"])
        .stdout(assertions::chore_created())
        .stdout(predicate::str::contains("No date"));
    harness
        .run_success(&[
            "add",
            "Water plants",
            "--at",
            "2024-03-01 08:30",
            "--repeat",
            "weekdays",
            "--description",
            "Balcony first",
        ])
        .stdout(assertions::chore_created());

    harness
        .run_success(&["list"])
        .stdout(predicate::str::contains("Buy milk"))
        .stdout(predicate::str::contains("Water plants"))
        .stdout(predicate::str::contains("weekdays"))
        .stdout(predicate::str::contains("2024-03-01 08:30"));

    let task = harness.task("Water plants");
    assert_eq!(task.date_time.as_deref(), Some("2024-03-01T08:30:00.000Z"));
    assert_eq!(task.section, "Other");
    assert_eq!(task.description.as_deref(), Some("Balcony first"));
    assert!(harness.task("Buy milk").date_time.is_none());
}

#[test]
fn test_add_rejects_bad_input() {
    let harness = CliTestHarness::new();

    harness.run_failure(&["add", "   "]).stderr(assertions::has_error());
    harness.run_failure(&["add", "Chore", "--repeat", "fortnightly"]);
    harness
        .run_failure(&["add", "Chore", "--at", "not a date at all"])
        .stderr(predicate::str::contains("Failed to parse date"));
}

#[test]
fn test_calendar_shows_occurrences() {
    let (harness, _) = harness_with_weekly_chore();

    harness
        .run_success(&["calendar", "--date", "2024-01-08"])
        .stdout(assertions::has_calendar_headers())
        .stdout(predicate::str::contains("Take out trash"))
        .stdout(predicate::str::contains("2024-01-08T09:00:00.000Z"))
        .stdout(predicate::str::contains("overdue"))
        .stdout(predicate::str::contains("2024-01-15").not());

    harness
        .run_success(&["calendar", "--date", "2024-01-09"])
        .stdout(predicate::str::contains("No occurrences found."));

    harness
        .run_success(&["cal", "--section", "Kitchen"])
        .stdout(predicate::str::contains("No occurrences found."));
}

#[test]
fn test_calendar_rejects_unreachable_days() {
    let (harness, _) = harness_with_weekly_chore();

    harness
        .run_failure(&["calendar", "--days", "4294967295"])
        .stderr(assertions::has_error())
        .stderr(predicate::str::contains("--days 4294967295"))
        .stderr(predicate::str::contains("panicked").not());

    harness
        .run_success(&["calendar", "--days", "3650"])
        .stdout(predicate::str::contains("Take out trash"));
}

#[test]
fn test_done_toggles_one_occurrence() {
    let (harness, id) = harness_with_weekly_chore();

    harness
        .run_success(&["done", &id[..8], "2024-01-08"])
        .stdout(predicate::str::contains("Marked done"));
    assert!(harness
        .task("Take out trash")
        .done_dates
        .contains("2024-01-08T09:00:00.000Z"));

    harness
        .run_success(&["calendar", "--date", "2024-01-08"])
        .stdout(predicate::str::contains("1 done"))
        .stdout(predicate::str::contains("0 overdue"));
    harness
        .run_success(&["calendar", "--date", "2024-01-15"])
        .stdout(predicate::str::contains("overdue"));

    harness
        .run_success(&["done", &id, "2024-01-08T09:00:00.000Z"])
        .stdout(predicate::str::contains("Marked not done"));
    assert!(harness.task("Take out trash").done_dates.is_empty());
}

#[test]
fn test_done_rejects_non_occurrences() {
    let (harness, id) = harness_with_weekly_chore();

    harness
        .run_failure(&["done", &id, "2024-01-09"])
        .stderr(predicate::str::contains("has no occurrence on 2024-01-09"));
    harness
        .run_failure(&["done", &id, "2024-01-08T10:00:00Z"])
        .stderr(predicate::str::contains("is not an occurrence"));

    assert!(harness.task("Take out trash").done_dates.is_empty());
}

#[test]
fn test_skip_and_restore() {
    let (harness, id) = harness_with_weekly_chore();

    harness
        .run_success(&["skip", &id, "2024-01-15"])
        .stdout(predicate::str::contains("Skipped"))
        .stdout(predicate::str::contains("choreo restore"));
    harness
        .run_success(&["calendar", "--date", "2024-01-15"])
        .stdout(predicate::str::contains("No occurrences found."));
    harness
        .run_success(&["calendar", "--date", "2024-01-22"])
        .stdout(predicate::str::contains("2024-01-22T09:00:00.000Z"));

    harness
        .run_failure(&["done", &id, "2024-01-15"])
        .stderr(predicate::str::contains("restore it first"));
    assert!(harness.task("Take out trash").done_dates.is_empty());

    harness
        .run_success(&["restore", &id, "2024-01-15"])
        .stdout(predicate::str::contains("Restored"));
    harness
        .run_success(&["calendar", "--date", "2024-01-15"])
        .stdout(predicate::str::contains("2024-01-15T09:00:00.000Z"));
    assert!(harness.task("Take out trash").deleted_dates.is_empty());

    harness
        .run_success(&["restore", &id, "2024-01-15"])
        .stdout(predicate::str::contains("is not deleted"));
}

#[test]
fn test_delete_requires_confirmation() {
    let (harness, id) = harness_with_weekly_chore();

    // No terminal attached, so the prompt resolves to "no".
    harness
        .run_success(&["delete", &id])
        .stdout(predicate::str::contains("Deletion cancelled."));
    assert_eq!(harness.document().chores.len(), 1);

    harness
        .run_success(&["rm", &id, "--force"])
        .stdout(predicate::str::contains("Deleted chore"));
    assert!(harness.document().chores.is_empty());
    harness.run_success(&["list"]).stdout(predicate::str::contains("No chores found."));
}

#[test]
fn test_edit_command() {
    let (harness, id) = harness_with_weekly_chore();
    harness.run_success(&["done", &id, "2024-01-08"]);

    harness
        .run_success(&["edit", &id, "--name", "Trash and recycling", "--description", "Blue bin too"])
        .stdout(predicate::str::contains("Updated chore"))
        .stdout(predicate::str::contains("Kept 1 done"));
    let task = harness.task("Trash and recycling");
    assert_eq!(task.description.as_deref(), Some("Blue bin too"));
    assert!(task.done_dates.contains("2024-01-08T09:00:00.000Z"));

    harness.run_success(&["edit", &id, "--description-clear", "--at-clear"]);
    let task = harness.task("Trash and recycling");
    assert!(task.description.is_none());
    assert!(task.date_time.is_none());

    harness.run_failure(&["edit", &id, "--at", "2024-01-01", "--at-clear"]);
    harness
        .run_failure(&["edit", &id, "--name", " "])
        .stderr(predicate::str::contains("cannot be empty"));
}

#[test]
fn test_sections() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["section", "add", "Kitchen"])
        .stdout(predicate::str::contains("Added section"));
    harness
        .run_failure(&["section", "add", "Kitchen"])
        .stderr(predicate::str::contains("already exists"));
    harness
        .run_failure(&["section", "add", "Other"])
        .stderr(predicate::str::contains("reserved"));

    harness.run_success(&["add", "Wipe counters", "--section", "Kitchen"]);
    harness
        .run_success(&["add", "Mow lawn", "--section", "Garden"])
        .stdout(predicate::str::contains("does not exist"));
    assert_eq!(harness.task("Wipe counters").section, "Kitchen");
    assert_eq!(harness.task("Mow lawn").section, "Other");

    harness
        .run_success(&["section", "list"])
        .stdout(predicate::str::contains("Kitchen"))
        .stdout(predicate::str::contains("Other"));

    harness
        .run_success(&["section", "delete", "Kitchen"])
        .stdout(predicate::str::contains("Moved 1 chore(s)"));
    assert_eq!(harness.task("Wipe counters").section, "Other");
    assert!(harness.document().sections.is_empty());

    harness
        .run_failure(&["section", "delete", "Kitchen"])
        .stderr(predicate::str::contains("No section named"));
}

#[test]
fn test_today_checklist() {
    let harness = CliTestHarness::new();
    let noon = Utc::now()
        .date_naive()
        .and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap())
        .and_utc()
        .to_rfc3339();

    harness.run_success(&["today"]).stdout(predicate::str::contains("Nothing scheduled for today."));

    harness.run_success(&["add", "Feed the cat", "--at", &noon, "--repeat", "daily"]);
    harness
        .run_success(&["today"])
        .stdout(predicate::str::contains("[ ]"))
        .stdout(predicate::str::contains("Feed the cat"))
        .stdout(predicate::str::contains("1 total"));

    let id = harness.task_id("Feed the cat");
    let today = Utc::now().date_naive().to_string();
    harness.run_success(&["done", &id, &today]);
    harness
        .run_success(&["today"])
        .stdout(predicate::str::contains("[x]"));
}

#[test]
fn test_custom_repeat_warns_and_shows_anchor_only() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["add", "Odd chore", "--at", "2024-01-01T09:00:00Z", "--repeat", "custom"])
        .stdout(predicate::str::contains("only the first occurrence"));
    harness
        .run_success(&["calendar"])
        .stdout(predicate::str::contains("2024-01-01T09:00:00.000Z"))
        .stdout(predicate::str::contains("1 total"));
}

#[test]
fn test_compact() {
    let (harness, id) = harness_with_weekly_chore();
    harness.run_success(&["done", &id, "2024-01-08"]);
    harness.run_success(&["skip", &id, "2024-03-04"]);

    harness
        .run_success(&["compact", "--before", "2024-02-01"])
        .stdout(predicate::str::contains("Removed 1 mark(s)"));
    let task = harness.task("Take out trash");
    assert!(task.done_dates.is_empty());
    assert_eq!(task.deleted_dates.len(), 1);
}

#[test]
fn test_error_handling() {
    let (harness, _) = harness_with_weekly_chore();

    harness
        .run_failure(&["done", "x", "2024-01-08"])
        .stderr(predicate::str::contains("at least 2 characters"));
    harness
        .run_failure(&["done", "zz", "2024-01-08"])
        .stderr(predicate::str::contains("No task found"));

    harness
        .command()
        .env("CHOREO_CALENDAR__TIMEZONE", "Mars/Olympus")
        .args(["calendar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timezone"));
}

#[test]
fn test_malformed_document_is_left_untouched() {
    let harness = CliTestHarness::new();
    harness.write_raw_document("{ not json");

    harness
        .run_failure(&["calendar"])
        .stderr(predicate::str::contains("malformed"));
    harness.run_failure(&["add", "Anything"]);

    let raw = std::fs::read_to_string(harness.document_path("local")).unwrap();
    assert_eq!(raw, "{ not json");
}

#[test]
fn test_legacy_document_without_ids() {
    let harness = CliTestHarness::new();
    harness.write_raw_document(
        r#"{"chores":[{"title":"Legacy chore","dateTime":"2024-01-01T09:00:00.000Z","repeat":"daily","doneDates":["2024-01-02T09:00:00.000Z"]}]}"#,
    );

    harness
        .run_success(&["calendar", "--date", "2024-01-02"])
        .stdout(predicate::str::contains("Legacy chore"))
        .stdout(predicate::str::contains("done"));
}

#[test]
fn test_users_are_isolated() {
    let (harness, _) = harness_with_weekly_chore();

    harness
        .command()
        .env("CHOREO_USER_ID", "bob")
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No chores found."));

    harness
        .command()
        .env("CHOREO_USER_ID", "../escape")
        .args(["list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid user id"));
}

#[test]
fn test_config_file_is_read() {
    let harness = CliTestHarness::new();
    std::fs::write(
        harness.document_path("local").parent().unwrap().parent().unwrap().join("choreo.toml"),
        "user_id = \"carol\"\n",
    )
    .unwrap();

    harness.run_success(&["add", "From config"]);
    assert!(harness.document_path("carol").exists());
    assert!(!harness.document_path("local").exists());
}
