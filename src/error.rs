use thiserror::Error;

/// Unified error type for relcraft operations
#[derive(Error, Debug)]
pub enum RelcraftError {
    #[error("Required tool not found: {0}")]
    ToolMissing(String),

    #[error("No publish token configured (set one of: {})", .variables.join(", "))]
    AuthMissing { variables: Vec<String> },

    #[error("Ambiguous release tags at equal distance from HEAD: {}", .tags.join(", "))]
    AmbiguousTag { tags: Vec<String> },

    #[error("Build failed: {0}")]
    Build(String),

    #[error("Metadata validation failed: {0}")]
    Validation(String),

    #[error("Smoke test failed: {0}")]
    SmokeTest(String),

    #[error("Version {version} of {name} already exists on the package index")]
    DuplicateVersion { name: String, version: String },

    #[error("Unknown metadata field: '{0}' (expected one of: name, version, description)")]
    UnknownField(String),

    #[error("Task failed: {0}")]
    Task(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Publish endpoint error: {0}")]
    Http(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience type alias for Results in relcraft
pub type Result<T> = std::result::Result<T, RelcraftError>;

impl RelcraftError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        RelcraftError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        RelcraftError::Version(msg.into())
    }

    pub fn build(msg: impl Into<String>) -> Self {
        RelcraftError::Build(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        RelcraftError::Validation(msg.into())
    }

    pub fn smoke_test(msg: impl Into<String>) -> Self {
        RelcraftError::SmokeTest(msg.into())
    }

    pub fn task(msg: impl Into<String>) -> Self {
        RelcraftError::Task(msg.into())
    }

    /// Create an HTTP/publish endpoint error with context
    pub fn http(msg: impl Into<String>) -> Self {
        RelcraftError::Http(msg.into())
    }

    /// Short machine-friendly name of the error class, used in pipeline reports
    pub fn kind(&self) -> &'static str {
        match self {
            RelcraftError::ToolMissing(_) => "ToolMissingError",
            RelcraftError::AuthMissing { .. } => "AuthMissingError",
            RelcraftError::AmbiguousTag { .. } => "AmbiguousTagError",
            RelcraftError::Build(_) => "BuildError",
            RelcraftError::Validation(_) => "ValidationError",
            RelcraftError::SmokeTest(_) => "SmokeTestError",
            RelcraftError::DuplicateVersion { .. } => "DuplicateVersionError",
            RelcraftError::UnknownField(_) => "UnknownFieldError",
            RelcraftError::Task(_) => "TaskError",
            RelcraftError::Git(_) => "GitError",
            RelcraftError::Config(_) => "ConfigError",
            RelcraftError::Version(_) => "VersionError",
            RelcraftError::Http(_) => "HttpError",
            RelcraftError::Io(_) => "IoError",
            RelcraftError::Json(_) => "JsonError",
            RelcraftError::Toml(_) => "TomlError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RelcraftError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RelcraftError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_auth_missing_lists_variables() {
        let err = RelcraftError::AuthMissing {
            variables: vec!["TESTPYPI_TOKEN".to_string(), "UV_PUBLISH_TOKEN".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("TESTPYPI_TOKEN, UV_PUBLISH_TOKEN"));
    }

    #[test]
    fn test_ambiguous_tag_lists_competing_tags() {
        let err = RelcraftError::AmbiguousTag {
            tags: vec!["v1.0.0".to_string(), "v1.1.0".to_string()],
        };
        assert!(err.to_string().contains("v1.0.0, v1.1.0"));
    }

    #[test]
    fn test_error_kinds_are_distinct() {
        let errors = vec![
            RelcraftError::ToolMissing("uv".to_string()),
            RelcraftError::build("x"),
            RelcraftError::validation("x"),
            RelcraftError::smoke_test("x"),
            RelcraftError::DuplicateVersion {
                name: "pkg".to_string(),
                version: "1.0.0".to_string(),
            },
            RelcraftError::UnknownField("license".to_string()),
        ];

        let mut kinds: Vec<&str> = errors.iter().map(|e| e.kind()).collect();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (RelcraftError::config("x"), "Configuration error"),
            (RelcraftError::version("x"), "Version parsing error"),
            (RelcraftError::build("x"), "Build failed"),
            (RelcraftError::validation("x"), "Metadata validation failed"),
            (RelcraftError::smoke_test("x"), "Smoke test failed"),
            (RelcraftError::http("x"), "Publish endpoint error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
