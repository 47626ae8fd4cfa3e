use assert_cmd::Command;
use predicates::prelude::*;

const CRED_VARS: [&str; 10] = [
    "WEBSIFT_GOOGLE_API_KEY",
    "GOOGLE_API_KEY",
    "WEBSIFT_GOOGLE_CSE_ID",
    "GOOGLE_CSE_ID",
    "WEBSIFT_BING_API_KEY",
    "BING_API_KEY",
    "WEBSIFT_OPENAI_API_KEY",
    "OPENAI_API_KEY",
    "WEBSIFT_ANTHROPIC_API_KEY",
    "ANTHROPIC_API_KEY",
];

fn websift() -> Command {
    let mut cmd = Command::cargo_bin("websift").unwrap();
    for v in CRED_VARS {
        cmd.env_remove(v);
    }
    cmd
}

#[test]
fn doctor_reports_capabilities_as_json_without_secrets() {
    let out = websift().arg("doctor").assert().success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    let v: serde_json::Value = serde_json::from_str(&stdout).expect("doctor output is json");
    assert_eq!(v["search"]["google_configured"], false);
    assert_eq!(v["search"]["bing_configured"], false);
    assert_eq!(v["generation"]["openai_configured"], false);
    assert_eq!(v["budgets"]["chunk_max_chars"], 12_000);
}

#[test]
fn doctor_sees_configured_credentials_but_never_prints_them() {
    let out = websift()
        .env("BING_API_KEY", "super-secret-key")
        .arg("doctor")
        .assert()
        .success();
    let stdout = String::from_utf8(out.get_output().stdout.clone()).unwrap();
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(v["search"]["bing_configured"], true);
    assert!(!stdout.contains("super-secret-key"));
}

#[test]
fn ask_without_search_credentials_fails_before_any_network_call() {
    websift()
        .args(["ask", "what is rust?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no search provider configured"));
}

#[test]
fn ask_with_unknown_provider_is_rejected() {
    websift()
        .args(["ask", "what is rust?", "--provider", "duckduckgo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown search provider"));
}
