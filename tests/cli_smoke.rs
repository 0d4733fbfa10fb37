mod support;

use assert_cmd::Command;
use predicates::str::contains;

use support::{role_row, taskdeck_cmd, TestEnv};

#[test]
fn taskdeck_help_works() {
    Command::cargo_bin("taskdeck")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("task dashboard"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = ["init", "user", "task", "view", "access", "roles", "sync"];

    for cmd in subcommands {
        Command::cargo_bin("taskdeck")
            .expect("binary")
            .arg(cmd)
            .arg("--help")
            .assert()
            .success();
    }
}

#[test]
fn init_creates_project_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    Command::cargo_bin("taskdeck")
        .expect("binary")
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("initialized"));

    assert!(dir.path().join(".taskdeck.toml").exists());
    assert!(dir.path().join(".taskdeck/tasks.csv").exists());
    assert!(dir.path().join(".taskdeck/roles.csv").exists());

    // second run is a no-op
    Command::cargo_bin("taskdeck")
        .expect("binary")
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("nothing to do"));
}

#[test]
fn commands_require_init() {
    let dir = tempfile::tempdir().expect("tempdir");
    Command::cargo_bin("taskdeck")
        .expect("binary")
        .current_dir(dir.path())
        .env_remove("TASKDECK_USER")
        .env_remove("TASKDECK_ROOT")
        .args(["task", "list"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Not a taskdeck directory"));
}

#[test]
fn user_set_and_show_round_trip() {
    let env = TestEnv::init();
    env.seed_roles(&[role_row("alice@example.com", &[("Name", "Alice Doe")])]);

    taskdeck_cmd(&env)
        .args(["user", "set", "Alice@Example.com"])
        .assert()
        .success()
        .stdout(contains("acting as alice@example.com"));

    taskdeck_cmd(&env)
        .args(["user", "show"])
        .assert()
        .success()
        .stdout(contains("alice@example.com"))
        .stdout(contains("Alice Doe"));
}

#[test]
fn unknown_user_is_blocked_at_the_gate() {
    let env = TestEnv::init();

    // access check reports the denial and still exits 0
    taskdeck_cmd(&env)
        .args(["--user", "ghost@example.com", "access", "check", "editor"])
        .assert()
        .success()
        .stdout(contains("blocked"))
        .stdout(contains("no role entry for ghost@example.com"));

    // opening the tab is a policy error (exit 3)
    taskdeck_cmd(&env)
        .args(["--user", "ghost@example.com", "task", "list"])
        .assert()
        .failure()
        .code(3)
        .stderr(contains("no role entry for ghost@example.com"));
}

#[test]
fn access_check_rejects_unknown_tab() {
    let env = TestEnv::init();
    taskdeck_cmd(&env)
        .args(["--user", "alice@example.com", "access", "check", "settings"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Unknown tab"));
}

#[test]
fn json_envelope_carries_schema_version() {
    let env = TestEnv::init();
    env.seed_roles(&[role_row("alice@example.com", &[])]);

    let output = taskdeck_cmd(&env)
        .args(["--user", "alice@example.com", "--json", "task", "list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).expect("json");
    assert_eq!(value["schema_version"], "taskdeck.v1");
    assert_eq!(value["command"], "task list");
    assert_eq!(value["status"], "success");
    assert!(value["data"].is_array());
}

#[test]
fn sync_push_without_remote_is_a_config_error() {
    let env = TestEnv::init();
    env.seed_roles(&[role_row("alice@example.com", &[])]);

    taskdeck_cmd(&env)
        .args(["--user", "alice@example.com", "sync", "push"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("remote.url is not configured"));
}
