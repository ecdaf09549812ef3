//! End-to-end runs of the whatsapp-dispatch binary
//!
//! Each test works in its own temp directory, so relative defaults
//! (config.yaml, message.txt, contacts.txt, logs/send.log) land there.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use whatsapp_dispatch::config::{Config, ENV_API_TOKEN, ENV_API_URL, ENV_SENDER_ID};
use whatsapp_dispatch::dispatch::{send_all, DispatchReport};
use whatsapp_dispatch::{alert::LogNotifier, channel};

fn dispatcher(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("whatsapp-dispatch").unwrap();
    cmd.current_dir(dir)
        .env_remove(ENV_API_URL)
        .env_remove(ENV_API_TOKEN)
        .env_remove(ENV_SENDER_ID)
        .env_remove("RUST_LOG");
    cmd
}

fn write_inputs(dir: &Path, message: &str, contacts: &str) {
    fs::write(dir.join("message.txt"), message).unwrap();
    fs::write(dir.join("contacts.txt"), contacts).unwrap();
}

/// Dry run with defaults only: every contact is "sent", exit 0
#[test]
fn test_dry_run_with_defaults() {
    let temp = TempDir::new().unwrap();
    write_inputs(temp.path(), "Hello!\n", "+8801711000000\n\n+8801711000001\n");

    dispatcher(temp.path())
        .arg("--dry_run")
        .assert()
        .success()
        .stdout(predicate::str::contains("using defaults"))
        .stdout(predicate::str::contains("Would send to number: +8801711000000"))
        .stdout(predicate::str::contains("Would send to number: +8801711000001"))
        .stdout(predicate::str::ends_with("Program finished.\n"));

    let log = fs::read_to_string(temp.path().join("logs/send.log")).unwrap();
    assert!(log.contains("Would send to number: +8801711000001"));
    assert!(log.contains("2 attempted, 2 sent, 0 failed"));
}

/// Fallback channel selected from the config file, dry run
#[test]
fn test_dry_run_browser_channel_from_config() {
    let temp = TempDir::new().unwrap();
    write_inputs(temp.path(), "Hi", "+447911123456\n");
    fs::write(
        temp.path().join("settings.yaml"),
        "use_api: false\nsend_hour: 21\nsend_minute: 5\nlog_file: out/run.log\n",
    )
    .unwrap();

    dispatcher(temp.path())
        .args(["--config", "settings.yaml", "--dry_run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[DRY-RUN][BROWSER] Would send to +447911123456 at 21:05"));

    assert!(temp.path().join("out/run.log").exists());
}

/// Missing secrets fail every recipient, but each one is still attempted
#[test]
fn test_missing_secrets_fail_per_recipient_only() {
    let temp = TempDir::new().unwrap();
    write_inputs(temp.path(), "Hello", "+1555000001\n+1555000002\n+1555000003\n");

    dispatcher(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed to send to +1555000001"))
        .stdout(predicate::str::contains("Failed to send to +1555000002"))
        .stdout(predicate::str::contains("Failed to send to +1555000003"))
        .stdout(predicate::str::contains("[ALERT] Send failure"))
        .stdout(predicate::str::contains("3 attempted, 0 sent, 3 failed"));
}

/// CLI overrides win over the default file names
#[test]
fn test_cli_paths_override_defaults() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("promo.txt"), "Sale!").unwrap();
    fs::write(temp.path().join("vip.txt"), "+8801711999999\n").unwrap();

    dispatcher(temp.path())
        .args(["--message", "promo.txt", "--contacts", "vip.txt", "--dry_run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+8801711999999"));
}

/// Missing message file: exit 1, contacts never looked at
#[test]
fn test_missing_message_file_exit_code() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("contacts.txt"), "+1555000001\n").unwrap();

    dispatcher(temp.path())
        .arg("--dry_run")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[File Error]"))
        .stdout(predicate::str::contains("message.txt"))
        .stdout(predicate::str::contains("Would send").not())
        .stdout(predicate::str::ends_with("Program finished.\n"));
}

/// Empty contacts file: alert, exit 1, no attempts
#[test]
fn test_empty_contacts_exit_code() {
    let temp = TempDir::new().unwrap();
    write_inputs(temp.path(), "Hello", "\n   \n\n");

    dispatcher(temp.path())
        .arg("--dry_run")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("[ALERT] Empty contact file - No recipients found."))
        .stdout(predicate::str::contains("[File Error]"))
        .stdout(predicate::str::contains("Would send").not());
}

/// Broken config: generic failure, exit 2, closing line still printed
#[test]
fn test_invalid_config_exit_code() {
    let temp = TempDir::new().unwrap();
    write_inputs(temp.path(), "Hello", "+1555000001\n");
    fs::write(temp.path().join("config.yaml"), "send_hour: 99\n").unwrap();

    dispatcher(temp.path())
        .assert()
        .code(2)
        .stdout(predicate::str::contains("[Unhandled Error]"))
        .stdout(predicate::str::contains("send_hour"))
        .stdout(predicate::str::ends_with("Program finished.\n"));
}

/// Library-level run over both real channels in dry-run mode
#[test]
fn test_library_dry_run_both_channels() {
    let temp = TempDir::new().unwrap();
    let contacts = vec!["+15550000001".to_string(), "+15550000002".to_string()];

    for use_api in [true, false] {
        let config = Config {
            use_api,
            ..Config::for_test(temp.path())
        };
        let channel = channel::from_config(&config).unwrap();
        let notifier = LogNotifier::new(config.alert_email.clone());

        let report = send_all(channel.as_ref(), &notifier, &contacts, "Hello", true);
        assert_eq!(
            report,
            DispatchReport {
                attempted: 2,
                delivered: 2,
                failures: vec![],
            }
        );
    }
}
