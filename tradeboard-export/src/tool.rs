//! External tool invocation.
//!
//! The compiler and merge stages never spawn processes directly; they go
//! through [`ToolRunner`] so tests can script the tools' behaviour.

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Captured result of one tool run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub status: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    pub fn exited(code: i32) -> Self {
        Self {
            status: Some(code),
            ..Self::default()
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Capability to run an external program to completion.
///
/// `Err` means the program could not be launched (missing binary,
/// permission denied); a program that ran and failed is `Ok` with a
/// non-zero status.
pub trait ToolRunner {
    fn run(&self, program: &Path, args: &[OsString], cwd: Option<&Path>)
        -> io::Result<ToolOutput>;
}

/// [`ToolRunner`] backed by `std::process::Command`. Blocks until exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        cwd: Option<&Path>,
    ) -> io::Result<ToolOutput> {
        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::null());
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        tracing::debug!("running {} with {} args", program.display(), args.len());
        let output = command.output()?;
        Ok(ToolOutput {
            status: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

impl<T: ToolRunner + ?Sized> ToolRunner for &T {
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        cwd: Option<&Path>,
    ) -> io::Result<ToolOutput> {
        (**self).run(program, args, cwd)
    }
}

impl<T: ToolRunner + ?Sized> ToolRunner for std::sync::Arc<T> {
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
        cwd: Option<&Path>,
    ) -> io::Result<ToolOutput> {
        (**self).run(program, args, cwd)
    }
}
