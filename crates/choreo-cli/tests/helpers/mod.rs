use assert_cmd::Command;
use choreo_core::models::{Task, UserDocument};
use std::path::PathBuf;
use tempfile::TempDir;

/// Runs the `choreo` binary against a throwaway data directory.
pub struct CliTestHarness {
    temp_dir: TempDir,
    data_dir: PathBuf,
}

impl CliTestHarness {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let data_dir = temp_dir.path().join("data");

        Self { temp_dir, data_dir }
    }

    /// A Command pinned to UTC and the default user, isolated from any
    /// `choreo.toml` or `RUST_LOG` in the developer's environment.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("choreo").expect("Failed to find choreo binary");
        cmd.current_dir(self.temp_dir.path())
            .env("CHOREO_DATA_DIR", &self.data_dir)
            .env("CHOREO_CALENDAR__TIMEZONE", "UTC")
            .env_remove("CHOREO_USER_ID")
            .env_remove("CHOREO_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn document_path(&self, user_id: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", user_id))
    }

    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    pub fn document(&self) -> UserDocument {
        let raw = std::fs::read_to_string(self.document_path("local"))
            .expect("Failed to read chores document");
        serde_json::from_str(&raw).expect("Chores document is not valid JSON")
    }

    pub fn write_raw_document(&self, contents: &str) {
        std::fs::create_dir_all(&self.data_dir).expect("Failed to create data directory");
        std::fs::write(self.document_path("local"), contents).expect("Failed to write document");
    }

    pub fn task(&self, name: &str) -> Task {
        self.document()
            .chores
            .into_iter()
            .find(|t| t.name == name)
            .unwrap_or_else(|| panic!("No chore named '{}'", name))
    }

    /// Full id of the chore with this name.
    pub fn task_id(&self, name: &str) -> String {
        self.task(name).id.to_string()
    }
}

pub mod assertions {
    use predicates::prelude::*;

    pub fn has_calendar_headers() -> impl Predicate<str> {
        predicate::str::contains("When")
            .and(predicate::str::contains("Chore"))
            .and(predicate::str::contains("Status"))
    }

    pub fn chore_created() -> impl Predicate<str> {
        predicate::str::contains("✓").and(predicate::str::contains("Created chore"))
    }

    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error")
    }
}
