//! Subprocess execution utilities.

use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use thiserror::Error;

/// A child process did not exit successfully.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("`{command}` failed with exit code {code}")]
    Failed { command: String, code: i32 },

    #[error("`{command}` was terminated by a signal")]
    Terminated { command: String },
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    shell: bool,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
            shell: false,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Set the working directory if one is given.
    pub fn cwd_opt(self, cwd: Option<&Path>) -> Self {
        match cwd {
            Some(dir) => self.cwd(dir),
            None => self,
        }
    }

    /// Run through the command interpreter (`cmd /C`) on Windows.
    ///
    /// Has no effect on other hosts.
    pub fn shell(mut self, shell: bool) -> Self {
        self.shell = shell;
        self
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the working directory, if set.
    pub fn get_cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Whether shell mode is requested.
    pub fn is_shell(&self) -> bool {
        self.shell
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = if self.shell && cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(&self.program);
            cmd
        } else {
            Command::new(&self.program)
        };
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Echo the command line, run it with its output passed through, and
    /// require a zero exit status.
    ///
    /// The child's stderr is merged into our stdout.
    pub fn run(&self) -> Result<()> {
        let line = self.display_command();
        {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", line)?;
            stdout.flush()?;
        }
        tracing::debug!(cwd = ?self.cwd, "spawning `{}`", line);

        let mut cmd = self.build_command();
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::from(io::stdout()));

        let status = cmd
            .status()
            .with_context(|| format!("failed to execute `{}`", self.program.display()))?;

        match status.code() {
            Some(0) => Ok(()),
            Some(code) => Err(ProcessError::Failed {
                command: line,
                code,
            }
            .into()),
            None => Err(ProcessError::Terminated { command: line }.into()),
        }
    }

    /// Display the command as it is echoed before running.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Run an argument vector, echoing it first and failing on a non-zero exit.
pub fn run_command<S: AsRef<OsStr>>(cmd: &[S], shell: bool) -> Result<()> {
    let (program, args) = cmd
        .split_first()
        .context("cannot run an empty command")?;
    ProcessBuilder::new(program.as_ref())
        .args(args)
        .shell(shell)
        .run()
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find the Python interpreter that CMake should build against.
pub fn find_python() -> Option<PathBuf> {
    find_executable("python")
}
