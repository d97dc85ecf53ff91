// tests/cli_test.rs
use clap::Parser;
use relcraft::cli::{Cli, Command, VersionQuery, Workspace};
use relcraft::config::Config;
use relcraft::domain::{BumpDecision, Version};
use relcraft::pipeline::{require_token, resolve_token};
use relcraft::RelcraftError;
use serial_test::serial;
use std::env;

#[test]
fn test_meta_flags() {
    let cli = Cli::try_parse_from(["relcraft", "meta", "--next", "--field", "version"]).unwrap();
    assert_eq!(
        cli.command,
        Command::Meta {
            next: true,
            field: Some("version".to_string())
        }
    );
}

#[test]
fn test_version_mode_values() {
    let cli = Cli::try_parse_from(["relcraft", "version", "--mode", "latest-tag"]).unwrap();
    assert_eq!(
        cli.command,
        Command::Version {
            mode: VersionQuery::LatestTag
        }
    );

    let cli = Cli::try_parse_from(["relcraft", "version"]).unwrap();
    assert_eq!(
        cli.command,
        Command::Version {
            mode: VersionQuery::Current
        }
    );
}

#[test]
fn test_publish_takes_optional_version() {
    let cli =
        Cli::try_parse_from(["relcraft", "publish-testpypi", "0.4.0.dev3", "--yes"]).unwrap();
    assert_eq!(
        cli.command,
        Command::PublishTestpypi {
            version: Some(Version::parse("0.4.0.dev3").unwrap()),
            yes: true
        }
    );

    assert!(Cli::try_parse_from(["relcraft", "publish-testpypi-dry", "not-a-version"]).is_err());
}

#[test]
fn test_global_bump_and_cov_threshold() {
    let cli = Cli::try_parse_from(["relcraft", "cov", "95", "--bump", "minor", "-v"]).unwrap();
    assert_eq!(cli.command, Command::Cov { threshold: Some(95) });
    assert_eq!(cli.bump, Some(BumpDecision::Minor));
    assert!(cli.verbose);
}

#[test]
fn test_every_recipe_is_a_subcommand() {
    for name in [
        "sync",
        "build",
        "version-info",
        "test",
        "typecheck",
        "fmt",
        "lint",
        "ci",
        "all",
        "changelog",
        "changelog-unreleased",
        "bump-dry-run",
        "changelog-dry-run",
        "release-dry-run",
        "package-testpypi",
        "install-from-testpypi",
        "clean",
        "doctor",
    ] {
        assert!(Cli::try_parse_from(["relcraft", name]).is_ok(), "{}", name);
    }
}

#[test]
#[serial]
fn test_first_set_token_variable_wins() {
    let vars = vec![
        "RELCRAFT_TEST_TOKEN_A".to_string(),
        "RELCRAFT_TEST_TOKEN_B".to_string(),
    ];
    env::remove_var("RELCRAFT_TEST_TOKEN_A");
    env::remove_var("RELCRAFT_TEST_TOKEN_B");
    assert_eq!(resolve_token(&vars), None);

    env::set_var("RELCRAFT_TEST_TOKEN_B", "second");
    assert_eq!(resolve_token(&vars).as_deref(), Some("second"));

    env::set_var("RELCRAFT_TEST_TOKEN_A", "first");
    assert_eq!(resolve_token(&vars).as_deref(), Some("first"));

    env::set_var("RELCRAFT_TEST_TOKEN_A", "  ");
    assert_eq!(resolve_token(&vars).as_deref(), Some("second"));

    env::remove_var("RELCRAFT_TEST_TOKEN_A");
    env::remove_var("RELCRAFT_TEST_TOKEN_B");
}

#[test]
#[serial]
fn test_publish_requires_token_up_front() {
    let vars = vec!["RELCRAFT_TEST_TOKEN_C".to_string()];
    env::set_var("RELCRAFT_TEST_TOKEN_C", "");
    match require_token(&vars) {
        Err(RelcraftError::AuthMissing { variables }) => assert_eq!(variables, vars),
        other => panic!("expected AuthMissing, got {:?}", other),
    }

    env::set_var("RELCRAFT_TEST_TOKEN_C", "pypi-abc");
    assert_eq!(require_token(&vars).unwrap(), "pypi-abc");
    env::remove_var("RELCRAFT_TEST_TOKEN_C");
}

#[test]
#[serial]
fn test_version_override_variable() {
    let mut config = Config::default();
    config.publish.version_override_var = "RELCRAFT_TEST_VERSION".to_string();
    let ws = Workspace::new(config, env::temp_dir());

    env::remove_var("RELCRAFT_TEST_VERSION");
    assert_eq!(ws.env_override().unwrap(), None);

    env::set_var("RELCRAFT_TEST_VERSION", "1.4.0");
    assert_eq!(ws.env_override().unwrap(), Some(Version::new(1, 4, 0)));

    env::set_var("RELCRAFT_TEST_VERSION", "banana");
    assert!(ws.env_override().is_err());

    env::remove_var("RELCRAFT_TEST_VERSION");
}
