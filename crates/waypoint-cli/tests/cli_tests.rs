use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper function to create a temporary directory for CLI tests
fn create_cli_test_environment() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Helper function to create a Command with --no-color and an isolated
/// database for testing
fn waypoint_cmd(temp_dir: &TempDir) -> Command {
    let db_path = temp_dir.path().join("cli_test.db");
    let mut cmd = Command::cargo_bin("waypoint").expect("Failed to find waypoint binary");
    cmd.env_remove("BOT_TOKEN")
        .env_remove("WAYPOINT_DATABASE")
        .env_remove("WAYPOINT_TIMEZONE")
        .arg("--no-color")
        .arg("--database-file")
        .arg(db_path);
    cmd
}

#[test]
fn test_cli_list_empty_users() {
    let temp_dir = create_cli_test_environment();

    waypoint_cmd(&temp_dir)
        .args(["user", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No users found."));
}

#[test]
fn test_cli_no_command_lists_users() {
    let temp_dir = create_cli_test_environment();

    waypoint_cmd(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No users found."));
}

#[test]
fn test_cli_grant_registers_user() {
    let temp_dir = create_cli_test_environment();

    waypoint_cmd(&temp_dir)
        .args(["user", "grant", "42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Success: Granted access to user 42"));

    waypoint_cmd(&temp_dir)
        .args(["user", "ls"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| 42 | yes | no | no | idle |"));
}

#[test]
fn test_cli_show_user() {
    let temp_dir = create_cli_test_environment();

    waypoint_cmd(&temp_dir)
        .args(["user", "promote", "7"])
        .assert()
        .success();

    waypoint_cmd(&temp_dir)
        .args(["user", "show", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## User 7 (admin)"))
        .stdout(predicate::str::contains("- Reminder hour: 12:00"));
}

#[test]
fn test_cli_show_unknown_user_fails() {
    let temp_dir = create_cli_test_environment();

    waypoint_cmd(&temp_dir)
        .args(["user", "show", "999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load user 999"));
}

#[test]
fn test_cli_revoke_unknown_user_fails() {
    let temp_dir = create_cli_test_environment();

    waypoint_cmd(&temp_dir)
        .args(["user", "revoke", "999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to change access of user 999"));
}

#[test]
fn test_cli_remind_sets_hour() {
    let temp_dir = create_cli_test_environment();

    waypoint_cmd(&temp_dir)
        .args(["user", "grant", "5"])
        .assert()
        .success();

    waypoint_cmd(&temp_dir)
        .args(["user", "remind", "5", "9"])
        .assert()
        .success()
        .stdout(predicate::str::contains("now go out at 09:00"));

    waypoint_cmd(&temp_dir)
        .args(["user", "show", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- Reminder hour: 09:00"));
}

#[test]
fn test_cli_remind_rejects_invalid_hour() {
    let temp_dir = create_cli_test_environment();

    waypoint_cmd(&temp_dir)
        .args(["user", "remind", "5", "24"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value '24'"));
}

#[test]
fn test_cli_delete_user() {
    let temp_dir = create_cli_test_environment();

    waypoint_cmd(&temp_dir)
        .args(["user", "grant", "11"])
        .assert()
        .success();

    waypoint_cmd(&temp_dir)
        .args(["user", "delete", "11"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Success: Deleted user 11"));

    waypoint_cmd(&temp_dir)
        .args(["user", "delete", "11"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Note: User 11 does not exist"));
}

#[test]
fn test_cli_reset_user() {
    let temp_dir = create_cli_test_environment();

    waypoint_cmd(&temp_dir)
        .args(["user", "grant", "3"])
        .assert()
        .success();

    waypoint_cmd(&temp_dir)
        .args(["user", "reset", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared plan and progress of user 3"));
}

#[test]
fn test_cli_purge_keeps_recent_users() {
    let temp_dir = create_cli_test_environment();

    waypoint_cmd(&temp_dir)
        .args(["user", "grant", "1"])
        .assert()
        .success();
    waypoint_cmd(&temp_dir)
        .args(["user", "revoke", "1"])
        .assert()
        .success();

    waypoint_cmd(&temp_dir)
        .args(["purge", "--days", "30"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Note: No users without access were idle for more than 30 days",
        ));

    waypoint_cmd(&temp_dir)
        .args(["user", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| 1 | no |"));
}

#[test]
fn test_cli_sweep_without_token() {
    let temp_dir = create_cli_test_environment();

    waypoint_cmd(&temp_dir)
        .args(["user", "grant", "8"])
        .assert()
        .success();

    waypoint_cmd(&temp_dir)
        .arg("sweep")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sweep finished: examined"));
}

#[test]
fn test_cli_unknown_timezone_fails() {
    let temp_dir = create_cli_test_environment();

    waypoint_cmd(&temp_dir)
        .args(["--timezone", "Mars/Olympus", "user", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown timezone 'Mars/Olympus'"));
}

#[test]
fn test_cli_serve_requires_token() {
    let temp_dir = create_cli_test_environment();

    waypoint_cmd(&temp_dir)
        .env_remove("OPENAI_API_KEY")
        .arg("serve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--bot-token"));
}
