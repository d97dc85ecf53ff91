// tests/config_test.rs
use relcraft::config::{load_config, Config};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_default_config() {
    let config = Config::default();
    assert_eq!(config.project.changelog, "CHANGELOG.md");
    assert_eq!(config.publish.version_override_var, "RELCRAFT_VERSION");
    assert_eq!(config.tasks.cache_dir_var, "UV_CACHE_DIR");
    assert_eq!(config.tasks.coverage_threshold, 80);
}

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
[versioning]
tag_pattern = "^release-[0-9]+\\.[0-9]+\\.[0-9]+$"

[conventional_commits]
types = ["perf", "docs"]

[smoke_test]
entry_point = "mytool"

[tasks.commands]
test = ["uv", "run", "pytest", "-q"]
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(
        config.versioning.tag_pattern,
        "^release-[0-9]+\\.[0-9]+\\.[0-9]+$"
    );
    assert_eq!(config.conventional_commits.types, vec!["perf", "docs"]);
    // untouched keys in a section keep their defaults
    assert!(!config.conventional_commits.breaking_change_indicators.is_empty());
    assert_eq!(config.smoke_test.entry_point, "mytool");
    assert_eq!(config.smoke_test.steps.len(), 3);
    assert_eq!(
        config.tasks.commands.get("test"),
        Some(&vec![
            "uv".to_string(),
            "run".to_string(),
            "pytest".to_string(),
            "-q".to_string()
        ])
    );
}

#[test]
fn test_missing_explicit_file_is_error() {
    let err = load_config(Some("/nonexistent/relcraft.toml")).unwrap_err();
    assert!(err.to_string().contains("Cannot read"));
}

#[test]
fn test_wrong_type_is_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(b"[tasks]\ncoverage_threshold = \"high\"\n")
        .unwrap();
    temp_file.flush().unwrap();

    assert!(load_config(Some(temp_file.path().to_str().unwrap())).is_err());
}
