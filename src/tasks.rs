//! Developer recipes (sync, test, lint, ...) delegated to external tools

use crate::config::Config;
use crate::error::{RelcraftError, Result};
use crate::process::{find_in_path, CommandRunner, CommandSpec, Placeholders};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Runs configured commands and sequences from the project root
pub struct TaskRunner<'a, C: CommandRunner> {
    runner: &'a C,
    config: &'a Config,
    root: PathBuf,
    project_name: String,
    coverage_threshold: u32,
}

impl<'a, C: CommandRunner> TaskRunner<'a, C> {
    pub fn new(runner: &'a C, config: &'a Config, root: &Path) -> Self {
        TaskRunner {
            runner,
            config,
            root: root.to_path_buf(),
            project_name: String::new(),
            coverage_threshold: config.tasks.coverage_threshold,
        }
    }

    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = name.into();
        self
    }

    pub fn with_coverage_threshold(mut self, threshold: u32) -> Self {
        self.coverage_threshold = threshold;
        self
    }

    /// Names of every runnable task, commands then sequences
    pub fn task_names(&self) -> Vec<&str> {
        self.config
            .tasks
            .commands
            .keys()
            .chain(self.config.tasks.sequences.keys())
            .map(String::as_str)
            .collect()
    }

    /// Run a sequence or a single command by name
    pub fn run(&self, name: &str) -> Result<()> {
        if let Some(steps) = self.config.tasks.sequences.get(name) {
            info!(sequence = name, steps = steps.len(), "running task sequence");
            for step in steps {
                self.run_command(step)?;
            }
            return Ok(());
        }
        self.run_command(name)
    }

    fn run_command(&self, name: &str) -> Result<()> {
        let template = self
            .config
            .tasks
            .commands
            .get(name)
            .ok_or_else(|| {
                RelcraftError::task(format!(
                    "Unknown task '{}' (available: {})",
                    name,
                    self.task_names().join(", ")
                ))
            })?;

        let mut spec = CommandSpec::from_template(template, &self.placeholders())?
            .current_dir(&self.root)
            .inherit_output();
        if let Some((var, dir)) = self.cache_dir_env() {
            spec = spec.env(var, dir);
        }

        info!(task = name, command = %spec, "running task");
        let output = self.runner.run(&spec)?;
        if !output.is_success() {
            return Err(RelcraftError::task(format!(
                "'{}' failed: {}",
                name,
                output.diagnostics()
            )));
        }
        Ok(())
    }

    fn placeholders(&self) -> Placeholders {
        [
            ("threshold", self.coverage_threshold.to_string()),
            ("index_url", self.config.publish.index_url.clone()),
            ("name", self.project_name.clone()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    /// Dependency cache location, only when the variable is not already set
    fn cache_dir_env(&self) -> Option<(String, String)> {
        let var = &self.config.tasks.cache_dir_var;
        if var.is_empty() || env::var_os(var).is_some() {
            return None;
        }
        let dir = self.root.join(&self.config.tasks.cache_dir);
        Some((var.clone(), dir.display().to_string()))
    }

    /// Remove build outputs and tool caches; returns what was removed
    pub fn clean(&self) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for entry in &self.config.tasks.clean_paths {
            let path = self.root.join(entry);
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else if path.exists() {
                fs::remove_file(&path)?;
            } else {
                continue;
            }
            debug!(path = %path.display(), "removed");
            removed.push(path);
        }
        Ok(removed)
    }
}

/// Locate every required tool; fails with all missing tool names
pub fn doctor(config: &Config) -> Result<Vec<(String, PathBuf)>> {
    let mut found = Vec::new();
    let mut missing = Vec::new();
    for tool in &config.doctor.tools {
        match find_in_path(tool) {
            Some(path) => found.push((tool.clone(), path)),
            None => missing.push(tool.clone()),
        }
    }
    if !missing.is_empty() {
        return Err(RelcraftError::ToolMissing(missing.join(", ")));
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{CommandOutput, MockRunner};
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    #[serial]
    fn test_sequence_runs_in_order_and_sets_cache_dir() {
        env::remove_var("UV_CACHE_DIR");
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let runner = MockRunner::new();
        let tasks = TaskRunner::new(&runner, &config, dir.path());

        tasks.run("ci").unwrap();

        let lines = runner.command_lines();
        assert_eq!(
            lines,
            vec![
                "uv run ruff check .",
                "uv run mypy app",
                "uv run pytest",
            ]
        );
        let expected = dir.path().join(".uv-cache").display().to_string();
        assert_eq!(runner.calls()[0].env.get("UV_CACHE_DIR"), Some(&expected));
    }

    #[test]
    #[serial]
    fn test_existing_cache_dir_is_respected() {
        env::set_var("UV_CACHE_DIR", "/tmp/shared-cache");
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let runner = MockRunner::new();

        TaskRunner::new(&runner, &config, dir.path()).run("sync").unwrap();
        env::remove_var("UV_CACHE_DIR");

        assert!(runner.calls()[0].env.get("UV_CACHE_DIR").is_none());
    }

    #[test]
    fn test_sequence_stops_at_first_failure() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let runner = MockRunner::with_responder(|spec| {
            if spec.args.iter().any(|a| a == "mypy") {
                CommandOutput::failure(1, "type error")
            } else {
                CommandOutput::success()
            }
        });

        let err = TaskRunner::new(&runner, &config, dir.path()).run("ci").unwrap_err();
        assert!(matches!(err, RelcraftError::Task(ref msg) if msg.contains("typecheck")));
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn test_placeholders_expand() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let runner = MockRunner::new();
        let tasks = TaskRunner::new(&runner, &config, dir.path())
            .with_project_name("ftbatch-bulk-edit")
            .with_coverage_threshold(90);

        tasks.run("cov").unwrap();
        tasks.run("install-from-testpypi").unwrap();

        let lines = runner.command_lines();
        assert!(lines[0].ends_with("--cov-fail-under=90"));
        assert!(lines[1].contains("--index-url https://test.pypi.org/simple/"));
        assert!(lines[1].ends_with("ftbatch-bulk-edit"));
    }

    #[test]
    fn test_unknown_task() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let runner = MockRunner::new();
        let err = TaskRunner::new(&runner, &config, dir.path()).run("deploy").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Unknown task 'deploy'"));
        assert!(message.contains("test"));
        assert!(message.contains("ci"));
    }

    #[test]
    fn test_clean_removes_configured_paths() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("dist")).unwrap();
        fs::write(dir.path().join("dist/pkg-1.0.0.tar.gz"), "x").unwrap();
        fs::write(dir.path().join(".coverage"), "x").unwrap();
        fs::write(dir.path().join("keep.txt"), "x").unwrap();

        let config = Config::default();
        let runner = MockRunner::new();
        let removed = TaskRunner::new(&runner, &config, dir.path()).clean().unwrap();

        assert_eq!(removed.len(), 2);
        assert!(!dir.path().join("dist").exists());
        assert!(dir.path().join("keep.txt").exists());
    }

    #[test]
    fn test_doctor_reports_missing_tools() {
        let mut config = Config::default();
        config.doctor.tools = vec![
            "relcraft-missing-a".to_string(),
            "relcraft-missing-b".to_string(),
        ];
        let err = doctor(&config).unwrap_err();
        assert!(matches!(
            err,
            RelcraftError::ToolMissing(ref t) if t == "relcraft-missing-a, relcraft-missing-b"
        ));
    }
}
