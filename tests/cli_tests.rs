//! CLI integration tests using the REAL stevedore binary

mod common;

use predicates::prelude::*;

use common::TestHome;

#[test]
fn test_help_output() {
    TestHome::new()
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("CNAB bundles"))
        .stdout(predicate::str::contains("bundle"))
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("instances"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_version_output() {
    TestHome::new()
        .cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stevedore"))
        .stdout(predicate::str::contains("Driver:      debug"))
        .stdout(predicate::str::contains("Claims:"));
}

#[test]
fn test_canonical_help_uses_canonical_examples() {
    TestHome::new()
        .cmd()
        .args(["bundle", "install", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stevedore bundle install example --tag example:v1"));
}

#[test]
fn test_alias_help_uses_alias_examples() {
    TestHome::new()
        .cmd()
        .args(["install", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stevedore install example --tag example:v1"))
        .stdout(predicate::str::contains("stevedore bundle install").not());
}

#[test]
fn test_alias_and_canonical_share_flags() {
    let env = TestHome::new();
    let flags = |args: &[&str]| {
        let output = env.cmd().args(args).output().unwrap();
        let help = String::from_utf8_lossy(&output.stdout).to_string();
        ["--file", "--tag", "--insecure", "--param", "--cred", "--timeout", "--build"]
            .into_iter()
            .filter(|flag| help.contains(flag))
            .count()
    };
    assert_eq!(flags(&["install", "--help"]), 7);
    assert_eq!(flags(&["bundle", "install", "--help"]), 7);
}

#[test]
fn test_completions_bash() {
    TestHome::new()
        .cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stevedore"));
}

#[test]
fn test_completions_unknown_shell() {
    TestHome::new()
        .cmd()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'tcsh'"));
}

#[test]
fn test_invoke_requires_action_flag() {
    TestHome::new()
        .cmd()
        .args(["invoke", "example"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--action"));
}

#[test]
fn test_create_starter_bundle() {
    let env = TestHome::new();
    env.cmd()
        .args(["create", "starter", "--dir", "starter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created bundle 'starter'"));

    let bundle = common::read_json(&env.work.join("starter").join("bundle.json"));
    assert_eq!(bundle["name"], "starter");
    assert!(env.work.join("starter").join("Dockerfile").is_file());
    assert!(env.work.join("starter").join("run").is_file());
}

#[test]
fn test_build_with_debug_driver_skips_docker() {
    let env = TestHome::new();
    env.write_example_bundle();
    env.cmd()
        .args(["bundle", "build"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Built invocation image for 'example'"));
}

#[test]
fn test_cache_on_empty_home() {
    TestHome::new()
        .cmd()
        .arg("cache")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache is empty."));
}
