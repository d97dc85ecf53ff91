use crate::error::{RelcraftError, Result};
use crate::process::{CommandOutput, CommandSpec, OutputMode};
use std::cell::RefCell;
use std::env;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Executes external commands
///
/// Implementations only report what happened; callers decide which error
/// class a non-zero exit maps to.
pub trait CommandRunner {
    /// Run the command to completion
    ///
    /// # Returns
    /// * `Ok(output)` whenever the process started, whatever its exit code
    /// * `Err(ToolMissing)` if the program could not be found
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}

/// Runs commands with `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!(command = %spec, "running");

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }

        let spawn_error = |e: std::io::Error| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RelcraftError::ToolMissing(spec.program.clone())
            } else {
                RelcraftError::Io(e)
            }
        };

        match spec.output {
            OutputMode::Capture => {
                let output = cmd.output().map_err(spawn_error)?;
                Ok(CommandOutput {
                    code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                })
            }
            OutputMode::Inherit => {
                let status = cmd.status().map_err(spawn_error)?;
                Ok(CommandOutput {
                    code: status.code(),
                    ..Default::default()
                })
            }
        }
    }
}

/// Locate an executable on `PATH`
pub fn find_in_path(tool: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .flat_map(|dir| {
            let plain = dir.join(tool);
            let exe = dir.join(format!("{}{}", tool, env::consts::EXE_SUFFIX));
            [plain, exe]
        })
        .find(|candidate| candidate.is_file())
}

type Responder = Box<dyn Fn(&CommandSpec) -> CommandOutput>;

/// Records commands instead of running them; replies via a responder closure
pub struct MockRunner {
    calls: RefCell<Vec<CommandSpec>>,
    responder: Responder,
}

impl MockRunner {
    /// A runner on which every command succeeds
    pub fn new() -> Self {
        Self::with_responder(|_| CommandOutput::success())
    }

    pub fn with_responder(responder: impl Fn(&CommandSpec) -> CommandOutput + 'static) -> Self {
        MockRunner {
            calls: RefCell::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Commands run so far, rendered as command lines
    pub fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(ToString::to_string).collect()
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(spec.clone());
        Ok((self.responder)(spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_tool_missing() {
        let spec = CommandSpec::new("relcraft-definitely-not-installed");
        let err = SystemRunner.run(&spec).unwrap_err();
        assert!(matches!(
            err,
            RelcraftError::ToolMissing(ref t) if t == "relcraft-definitely-not-installed"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_exit_code_and_streams() {
        let spec = CommandSpec::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]);
        let output = SystemRunner.run(&spec).unwrap();
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[cfg(unix)]
    #[test]
    fn test_env_and_cwd_are_applied() {
        let dir = tempfile::TempDir::new().unwrap();
        let spec = CommandSpec::new("sh")
            .args(["-c", "echo $RELCRAFT_TEST_VALUE; pwd"])
            .env("RELCRAFT_TEST_VALUE", "stamped")
            .current_dir(dir.path());
        let output = SystemRunner.run(&spec).unwrap();
        let mut lines = output.stdout.lines();
        assert_eq!(lines.next(), Some("stamped"));
        let cwd = PathBuf::from(lines.next().unwrap());
        assert_eq!(cwd.canonicalize().unwrap(), dir.path().canonicalize().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_find_in_path_locates_shell() {
        assert!(find_in_path("sh").is_some());
        assert!(find_in_path("relcraft-definitely-not-installed").is_none());
    }

    #[test]
    fn test_mock_runner_records_calls() {
        let runner = MockRunner::with_responder(|spec| {
            if spec.program == "fail" {
                CommandOutput::failure(1, "boom")
            } else {
                CommandOutput::success()
            }
        });
        assert!(runner.run(&CommandSpec::new("ok").arg("x")).unwrap().is_success());
        assert!(!runner.run(&CommandSpec::new("fail")).unwrap().is_success());
        assert_eq!(runner.command_lines(), vec!["ok x", "fail"]);
    }
}
