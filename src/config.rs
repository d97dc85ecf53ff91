use crate::domain::DEFAULT_TAG_PATTERN;
use crate::error::{RelcraftError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Name of the project-local configuration file
pub const CONFIG_FILE_NAME: &str = "relcraft.toml";

/// Represents the complete configuration for relcraft.
///
/// Every section falls back to defaults that mirror a uv-managed Python
/// project publishing to TestPyPI.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub versioning: VersioningConfig,

    #[serde(default)]
    pub conventional_commits: ConventionalCommitsConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub validate: ValidateConfig,

    #[serde(default)]
    pub smoke_test: SmokeTestConfig,

    #[serde(default)]
    pub publish: PublishConfig,

    #[serde(default)]
    pub tasks: TasksConfig,

    #[serde(default)]
    pub doctor: DoctorConfig,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Locations of the project files relcraft reads and writes.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProjectConfig {
    #[serde(default = "default_pyproject")]
    pub pyproject: String,

    #[serde(default = "default_changelog")]
    pub changelog: String,

    #[serde(default = "default_version_info")]
    pub version_info: String,

    #[serde(default = "default_dist_dir")]
    pub dist_dir: String,
}

fn default_pyproject() -> String {
    "pyproject.toml".to_string()
}

fn default_changelog() -> String {
    "CHANGELOG.md".to_string()
}

fn default_version_info() -> String {
    "build/version_info.json".to_string()
}

fn default_dist_dir() -> String {
    "dist".to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            pyproject: default_pyproject(),
            changelog: default_changelog(),
            version_info: default_version_info(),
            dist_dir: default_dist_dir(),
        }
    }
}

/// Release tag recognition.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VersioningConfig {
    #[serde(default = "default_tag_pattern")]
    pub tag_pattern: String,
}

fn default_tag_pattern() -> String {
    DEFAULT_TAG_PATTERN.to_string()
}

impl Default for VersioningConfig {
    fn default() -> Self {
        VersioningConfig {
            tag_pattern: default_tag_pattern(),
        }
    }
}

/// Returns the default ordering of non-feature, non-fix commit types in release notes.
fn default_commit_types() -> Vec<String> {
    strings(&[
        "perf", "refactor", "docs", "style", "test", "build", "ci", "chore", "revert",
    ])
}

/// Returns the default list of breaking change indicators.
fn default_breaking_change_indicators() -> Vec<String> {
    strings(&["BREAKING CHANGE:", "BREAKING-CHANGE:"])
}

fn default_section_titles() -> BTreeMap<String, String> {
    [
        ("feat", "Features"),
        ("fix", "Bug Fixes"),
        ("perf", "Performance"),
        ("refactor", "Refactoring"),
        ("docs", "Documentation"),
        ("style", "Styling"),
        ("test", "Testing"),
        ("build", "Build System"),
        ("ci", "Continuous Integration"),
        ("chore", "Miscellaneous Tasks"),
        ("revert", "Reverts"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Configuration for conventional commit analysis and release note grouping.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConventionalCommitsConfig {
    /// Order of the "other" sections, after breaking changes, features and fixes
    #[serde(default = "default_commit_types")]
    pub types: Vec<String>,

    #[serde(default = "default_breaking_change_indicators")]
    pub breaking_change_indicators: Vec<String>,

    #[serde(default = "default_section_titles")]
    pub section_titles: BTreeMap<String, String>,
}

impl Default for ConventionalCommitsConfig {
    fn default() -> Self {
        ConventionalCommitsConfig {
            types: default_commit_types(),
            breaking_change_indicators: default_breaking_change_indicators(),
            section_titles: default_section_titles(),
        }
    }
}

/// Artifact build commands.
///
/// Commands accept the placeholders `{dist}`, `{version}`, `{name}` and `{version_info}`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BuildConfig {
    #[serde(default = "default_build_command")]
    pub command: Vec<String>,

    /// Optional single-file executable build, run after the distributions
    #[serde(default)]
    pub native_command: Option<Vec<String>>,

    /// Extra environment variables that receive the resolved version
    #[serde(default = "default_version_env")]
    pub version_env: Vec<String>,
}

fn default_build_command() -> Vec<String> {
    strings(&["uv", "build", "--out-dir", "{dist}"])
}

fn default_version_env() -> Vec<String> {
    strings(&["PDM_BUILD_SCM_VERSION"])
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            command: default_build_command(),
            native_command: None,
            version_env: default_version_env(),
        }
    }
}

/// Strict metadata validation run against each artifact (`{artifact}` placeholder).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ValidateConfig {
    #[serde(default = "default_validate_command")]
    pub command: Vec<String>,
}

fn default_validate_command() -> Vec<String> {
    strings(&["uvx", "twine", "check", "--strict", "{artifact}"])
}

impl Default for ValidateConfig {
    fn default() -> Self {
        ValidateConfig {
            command: default_validate_command(),
        }
    }
}

/// Install-and-invoke check run in a disposable environment per artifact.
///
/// Steps accept `{env}`, `{env_bin}`, `{artifact}` and `{entry}`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SmokeTestConfig {
    #[serde(default = "default_entry_point")]
    pub entry_point: String,

    #[serde(default = "default_smoke_steps")]
    pub steps: Vec<Vec<String>>,
}

fn default_entry_point() -> String {
    "ftbatch-bulk-edit".to_string()
}

fn default_smoke_steps() -> Vec<Vec<String>> {
    vec![
        strings(&["uv", "venv", "{env}"]),
        strings(&["uv", "pip", "install", "--python", "{env}", "{artifact}"]),
        strings(&["{env_bin}/{entry}", "--help"]),
    ]
}

impl Default for SmokeTestConfig {
    fn default() -> Self {
        SmokeTestConfig {
            entry_point: default_entry_point(),
            steps: default_smoke_steps(),
        }
    }
}

/// Package index endpoints and credentials.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PublishConfig {
    #[serde(default = "default_publish_url")]
    pub publish_url: String,

    #[serde(default = "default_verification_url")]
    pub verification_url: String,

    #[serde(default = "default_index_url")]
    pub index_url: String,

    /// Checked in order; the first variable that is set wins
    #[serde(default = "default_token_vars")]
    pub token_vars: Vec<String>,

    #[serde(default = "default_version_override_var")]
    pub version_override_var: String,
}

fn default_publish_url() -> String {
    "https://test.pypi.org/legacy/".to_string()
}

fn default_verification_url() -> String {
    "https://test.pypi.org/pypi".to_string()
}

fn default_index_url() -> String {
    "https://test.pypi.org/simple/".to_string()
}

fn default_token_vars() -> Vec<String> {
    strings(&["TESTPYPI_TOKEN", "UV_PUBLISH_TOKEN"])
}

fn default_version_override_var() -> String {
    "RELCRAFT_VERSION".to_string()
}

impl Default for PublishConfig {
    fn default() -> Self {
        PublishConfig {
            publish_url: default_publish_url(),
            verification_url: default_verification_url(),
            index_url: default_index_url(),
            token_vars: default_token_vars(),
            version_override_var: default_version_override_var(),
        }
    }
}

/// Opaque external recipes (sync, test, lint, ...).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TasksConfig {
    #[serde(default = "default_task_commands")]
    pub commands: BTreeMap<String, Vec<String>>,

    /// Named sequences of commands, run fail-fast
    #[serde(default = "default_task_sequences")]
    pub sequences: BTreeMap<String, Vec<String>>,

    #[serde(default = "default_cache_dir_var")]
    pub cache_dir_var: String,

    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,

    #[serde(default = "default_coverage_threshold")]
    pub coverage_threshold: u32,

    #[serde(default = "default_clean_paths")]
    pub clean_paths: Vec<String>,
}

fn default_task_commands() -> BTreeMap<String, Vec<String>> {
    [
        ("sync", strings(&["uv", "sync", "--all-extras"])),
        ("test", strings(&["uv", "run", "pytest"])),
        (
            "cov",
            strings(&[
                "uv",
                "run",
                "pytest",
                "--cov=app",
                "--cov-report=term-missing",
                "--cov-fail-under={threshold}",
            ]),
        ),
        ("typecheck", strings(&["uv", "run", "mypy", "app"])),
        ("fmt", strings(&["uv", "run", "ruff", "format", "."])),
        ("lint", strings(&["uv", "run", "ruff", "check", "."])),
        (
            "install-from-testpypi",
            strings(&[
                "uv",
                "pip",
                "install",
                "--index-url",
                "{index_url}",
                "--extra-index-url",
                "https://pypi.org/simple/",
                "{name}",
            ]),
        ),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn default_task_sequences() -> BTreeMap<String, Vec<String>> {
    [
        ("ci", strings(&["lint", "typecheck", "test"])),
        ("all", strings(&["sync", "fmt", "lint", "typecheck", "cov"])),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn default_cache_dir_var() -> String {
    "UV_CACHE_DIR".to_string()
}

fn default_cache_dir() -> String {
    ".uv-cache".to_string()
}

fn default_coverage_threshold() -> u32 {
    80
}

fn default_clean_paths() -> Vec<String> {
    strings(&[
        "dist",
        "build",
        ".pytest_cache",
        ".mypy_cache",
        ".ruff_cache",
        ".coverage",
        "htmlcov",
        "logs",
    ])
}

impl Default for TasksConfig {
    fn default() -> Self {
        TasksConfig {
            commands: default_task_commands(),
            sequences: default_task_sequences(),
            cache_dir_var: default_cache_dir_var(),
            cache_dir: default_cache_dir(),
            coverage_threshold: default_coverage_threshold(),
            clean_paths: default_clean_paths(),
        }
    }
}

/// Tools that must be on PATH.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DoctorConfig {
    #[serde(default = "default_required_tools")]
    pub tools: Vec<String>,
}

fn default_required_tools() -> Vec<String> {
    strings(&["git", "uv", "uvx"])
}

impl Default for DoctorConfig {
    fn default() -> Self {
        DoctorConfig {
            tools: default_required_tools(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `relcraft.toml` in current directory
/// 3. `~/.config/.relcraft.toml` in user config directory
/// 4. Default configuration if no file found
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)
            .map_err(|e| RelcraftError::config(format!("Cannot read {}: {}", path, e)))?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        fs::read_to_string(CONFIG_FILE_NAME)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}

/// Parse configuration text, filling every omitted field with its default
pub fn parse_config(text: &str) -> Result<Config> {
    let config: Config = toml::from_str(text)?;
    Ok(config)
}
