use crate::error::{ReportError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Runs an external tool and hands back its trimmed standard output.
///
/// Every failure (missing binary, non-zero exit) comes back as an `Err`;
/// callers decide whether that means "data unavailable" or a fatal error.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String>;
}

/// Executes commands as child processes inside a working directory.
pub struct ProcessRunner {
    workdir: PathBuf,
}

impl ProcessRunner {
    pub fn new<P: AsRef<Path>>(workdir: P) -> Self {
        Self {
            workdir: workdir.as_ref().to_path_buf(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let command = command_line(program, args);
        debug!(%command, "running");

        let output = Command::new(program)
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ReportError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ReportError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Human readable form of a command, used in logs and error messages.
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Scripted runner: answers known command lines, fails everything else.
    #[derive(Default)]
    pub struct FakeRunner {
        responses: HashMap<String, String>,
        pub calls: RefCell<Vec<String>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn on(mut self, command: &str, stdout: &str) -> Self {
            self.responses
                .insert(command.to_string(), stdout.trim().to_string());
            self
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, program: &str, args: &[&str]) -> Result<String> {
            let command = command_line(program, args);
            self.calls.borrow_mut().push(command.clone());
            self.responses
                .get(&command)
                .cloned()
                .ok_or_else(|| ReportError::CommandFailed {
                    command,
                    status: "exit status: 128".to_string(),
                    stderr: "unscripted command".to_string(),
                })
        }
    }
}
