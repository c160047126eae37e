//! Subprocess execution utilities.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};

use anyhow::{Context, Result};

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    env: HashMap<String, String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            env: HashMap::new(),
            cwd: None,
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

    /// Set an environment variable.
    pub fn env(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.env
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    /// Execute the command with captured output and wait for completion.
    pub fn exec(&self) -> Result<Output> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))?;

        let output = child
            .wait_with_output()
            .with_context(|| format!("failed to wait for `{}`", self.program.display()))?;

        Ok(output)
    }

    /// Execute with inherited stdio and return the status only.
    pub fn status(&self) -> Result<ExitStatus> {
        let mut cmd = self.build_command();
        let status = cmd
            .status()
            .with_context(|| format!("failed to execute `{}`", self.program.display()))?;
        Ok(status)
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Find the webpack CLI for an installation.
///
/// Search order: the installation's own `node_modules/.bin`, then
/// `search_path` (a PATH-style list). Every probed location is pushed
/// onto `searched`.
pub fn find_webpack(
    vanilla_directory: &Path,
    search_path: Option<&OsStr>,
    searched: &mut Vec<PathBuf>,
) -> Option<PathBuf> {
    let bin_dir = vanilla_directory.join("node_modules").join(".bin");
    let local = if cfg!(windows) {
        bin_dir.join("webpack.cmd")
    } else {
        bin_dir.join("webpack")
    };
    searched.push(local.clone());
    if local.is_file() {
        return Some(local);
    }

    searched.push(PathBuf::from("webpack"));
    which::which_in("webpack", search_path, vanilla_directory).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("webpack").args(["--config", "app.config.js", "--watch"]);

        assert_eq!(pb.display_command(), "webpack --config app.config.js --watch");
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_captures_output() {
        let output = ProcessBuilder::new("echo").arg("hello").exec().unwrap();

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn test_find_webpack_prefers_installation_bin() {
        let tmp = TempDir::new().unwrap();
        let bin_dir = tmp.path().join("node_modules").join(".bin");
        std::fs::create_dir_all(&bin_dir).unwrap();
        std::fs::write(bin_dir.join("webpack"), "#!/bin/sh\n").unwrap();

        let mut searched = Vec::new();
        let found = find_webpack(tmp.path(), None, &mut searched);
        assert_eq!(found, Some(bin_dir.join("webpack")));
        assert_eq!(searched.len(), 1);
    }

    #[test]
    fn test_find_webpack_searches_given_path_only() {
        let tmp = TempDir::new().unwrap();
        let empty = TempDir::new().unwrap();

        let mut searched = Vec::new();
        let found = find_webpack(tmp.path(), Some(empty.path().as_os_str()), &mut searched);
        assert_eq!(found, None);
        assert_eq!(
            searched,
            vec![
                tmp.path().join("node_modules").join(".bin").join(if cfg!(windows) {
                    "webpack.cmd"
                } else {
                    "webpack"
                }),
                PathBuf::from("webpack"),
            ]
        );
    }
}
