//! End-to-end tests driving the `att` binary.
//!
//! Tests the full pipeline: org/system/staff setup → scan → action → history

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn att_binary() -> String {
    env!("CARGO_BIN_EXE_att").to_string()
}

struct Env {
    temp: TempDir,
    config: PathBuf,
}

impl Env {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("config.toml");
        let db_path = temp.path().join("data/att.db");
        std::fs::write(
            &config,
            format!("database_path = \"{}\"\n", db_path.display()),
        )
        .unwrap();
        Self { temp, config }
    }

    fn home(&self) -> &Path {
        self.temp.path()
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(att_binary())
            .env("HOME", self.home())
            .env("XDG_CONFIG_HOME", self.home().join(".config"))
            .env_remove("ATT_DATABASE_PATH")
            .env_remove("ATT_REFERENCE_OFFSET")
            .env_remove("ATT_EVENT_SOURCE")
            .arg("--config")
            .arg(&self.config)
            .args(args)
            .output()
            .expect("failed to run att")
    }

    /// Runs a command expected to succeed and parses its JSON output.
    fn json(&self, args: &[&str]) -> Value {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "att {args:?} should succeed: {}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is JSON")
    }

    /// Creates org `acme`, one system identity and one staff member `E-1`.
    fn seed(&self) -> String {
        self.json(&["org", "create", "--id", "acme", "--name", "Acme"]);
        let system = self.json(&["system", "register", "--org", "acme", "--label", "lobby"]);
        self.json(&[
            "staff", "add", "--org", "acme", "--name", "Ana", "--code", "E-1", "--email",
            "ana@acme.test",
        ]);
        system["id"].as_str().unwrap().to_string()
    }
}

#[test]
fn test_full_day_flow() {
    let env = Env::new();
    let system = env.seed();
    let caller = ["--org", "acme", "--system", system.as_str(), "--code", "E-1"];

    let scan = |at: &str| {
        let mut args = vec!["scan"];
        args.extend(caller);
        args.extend(["--at", at]);
        env.json(&args)
    };
    let action = |name: &str, params: Option<&str>, now: &str| {
        let mut args = vec!["action", name];
        args.extend(caller);
        args.extend(["--now", now]);
        if let Some(params) = params {
            args.extend(["--params", params]);
        }
        env.json(&args)
    };

    let state = scan("2025-01-15T08:59:00Z");
    assert_eq!(state["state"], "NO_SESSION_TODAY");
    assert_eq!(state["allowedActions"], serde_json::json!(["PUNCH_IN"]));

    let punched_in = action("PUNCH_IN", None, "2025-01-15T09:00:00Z");
    let session = punched_in["sessionId"].as_str().unwrap().to_string();
    let params = format!(r#"{{"sessionId":"{session}"}}"#);

    let state = scan("2025-01-15T10:00:00Z");
    assert_eq!(state["state"], "WORKING");
    assert_eq!(state["sessionId"], session.as_str());

    action("BREAK_START", Some(&params), "2025-01-15T12:00:00Z");
    assert_eq!(scan("2025-01-15T12:10:00Z")["state"], "ON_BREAK");
    action("BREAK_END", Some(&params), "2025-01-15T12:30:00Z");
    let punched_out = action("PUNCH_OUT", Some(&params), "2025-01-15T18:00:00Z");
    assert_eq!(punched_out["totalWorkSeconds"], 30_600);
    assert_eq!(punched_out["totalBreakSeconds"], 1_800);

    assert_eq!(scan("2025-01-15T18:01:00Z")["state"], "NO_SESSION_TODAY");

    let events = env.run(&["events", &session]);
    assert!(events.status.success());
    assert_eq!(String::from_utf8_lossy(&events.stdout).lines().count(), 4);
}

#[test]
fn test_rejection_is_structured_and_exits_2() {
    let env = Env::new();
    let system = env.seed();

    let output = env.run(&[
        "action",
        "BREAK_END",
        "--org",
        "acme",
        "--system",
        &system,
        "--email",
        "ANA@acme.test",
        "--params",
        r#"{"sessionId":"missing"}"#,
    ]);
    assert_eq!(output.status.code(), Some(2));
    let failure: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(failure["status"], "error");
    assert_eq!(failure["kind"], "NotFound");
    assert_eq!(failure["message"], "session not found: missing");
}

#[test]
fn test_deactivated_badge_is_unauthorized() {
    let env = Env::new();
    let system = env.seed();
    let staff = env.run(&["staff", "add", "--org", "acme", "--name", "Ben", "--code", "E-2"]);
    let staff: Value = serde_json::from_slice(&staff.stdout).unwrap();
    let staff_id = staff["id"].as_str().unwrap();
    env.json(&["staff", "deactivate", staff_id]);

    let output = env.run(&["scan", "--org", "acme", "--system", &system, "--code", "E-2"]);
    assert_eq!(output.status.code(), Some(2));
    let failure: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(failure["kind"], "Unauthorized");
}

#[test]
fn test_status_reports_counts() {
    let env = Env::new();
    env.seed();

    let output = env.run(&["status"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Organizations: 1"));
    assert!(stdout.contains("Staff: 1"));
    assert!(stdout.contains("Open sessions: 0 (0 from earlier days)"));
}
