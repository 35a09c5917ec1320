//! Running the Go toolchain.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use anyhow::{bail, Context, Result};
use tracing::debug;

/// Overrides the `go` binary found on `PATH`.
pub const GO_EXECUTABLE_ENV: &str = "BERTH_GO_EXECUTABLE";

/// Builder for a subprocess whose output is captured.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessBuilder {
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_string_lossy().into_owned()));
        self
    }

    /// Run to completion, capturing stdout and stderr.
    pub fn exec(&self) -> Result<Output> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdin(Stdio::null());

        debug!("running `{}`", self.display_command());
        cmd.output()
            .with_context(|| format!("failed to run `{}`", self.display_command()))
    }

    /// Run and require a zero exit status.
    pub fn exec_and_check(&self) -> Result<Output> {
        let output = self.exec()?;
        if !output.status.success() {
            bail!(
                "`{}` failed with exit code {:?}\n{}",
                self.display_command(),
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(output)
    }

    /// The command line, for messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// The `go` binary: `BERTH_GO_EXECUTABLE` if set, else `go` on `PATH`.
pub fn find_go() -> Option<PathBuf> {
    match std::env::var_os(GO_EXECUTABLE_ENV) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => find_executable("go"),
    }
}

/// Ask a `go` binary for one of its environment values.
pub fn go_env(go: &Path, var: &str) -> Result<String> {
    let output = ProcessBuilder::new(go).args(["env", var]).exec_and_check()?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
