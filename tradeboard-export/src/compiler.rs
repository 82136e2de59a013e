//! One LaTeX compilation job.
//!
//! The compiler is invoked as
//!
//! ```text
//! <pdflatex> -interaction=nonstopmode -output-directory=<scratch> <scratch>/<job>.tex
//! ```
//!
//! with the scratch directory as working directory. A job succeeds only when
//! the tool exits 0 *and* `<job>.pdf` exists afterwards.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::tool::ToolRunner;

/// How many trailing characters of the compiler log a diagnostic keeps.
pub const DIAGNOSTIC_TAIL: usize = 500;

const GENERIC_FAILURE: &str = "LaTeX compilation failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The compiler ran and failed, or produced no document.
    Compilation,
    /// The compiler could not be launched, or its source could not be written.
    ToolInvocation,
    /// The document was produced but could not be stored or recorded.
    Storage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    Succeeded { output: PathBuf },
    Failed { kind: FailureKind, diagnostic: String },
}

/// Scratch paths belonging to one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileJob {
    pub name: String,
    pub scratch: PathBuf,
}

impl CompileJob {
    pub fn new(scratch: &Path, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scratch: scratch.to_path_buf(),
        }
    }

    fn with_ext(&self, ext: &str) -> PathBuf {
        self.scratch.join(format!("{}.{}", self.name, ext))
    }

    pub fn source_path(&self) -> PathBuf {
        self.with_ext("tex")
    }

    pub fn output_path(&self) -> PathBuf {
        self.with_ext("pdf")
    }

    pub fn log_path(&self) -> PathBuf {
        self.with_ext("log")
    }

    /// Arguments passed to the compiler for this job.
    pub fn args(&self) -> Vec<OsString> {
        let mut out_dir = OsString::from("-output-directory=");
        out_dir.push(self.scratch.as_os_str());
        vec![
            OsString::from("-interaction=nonstopmode"),
            out_dir,
            self.source_path().into_os_string(),
        ]
    }

    /// Write `source` and run the compiler once. Every fault, including a
    /// source file that cannot be written, comes back as an outcome.
    pub fn run<R: ToolRunner + ?Sized>(
        &self,
        runner: &R,
        compiler: &Path,
        source: &str,
    ) -> CompileOutcome {
        let source_path = self.source_path();
        if let Err(e) = std::fs::write(&source_path, source) {
            return CompileOutcome::Failed {
                kind: FailureKind::ToolInvocation,
                diagnostic: format!("could not write {}: {e}", source_path.display()),
            };
        }

        let output = match runner.run(compiler, &self.args(), Some(&self.scratch)) {
            Ok(output) => output,
            Err(e) => {
                return CompileOutcome::Failed {
                    kind: FailureKind::ToolInvocation,
                    diagnostic: format!("could not run {}: {e}", compiler.display()),
                }
            }
        };

        let pdf = self.output_path();
        if output.success() && pdf.is_file() {
            return CompileOutcome::Succeeded { output: pdf };
        }

        CompileOutcome::Failed {
            kind: FailureKind::Compilation,
            diagnostic: self.log_tail(),
        }
    }

    /// Tail of `<job>.log`, decoded lossily; pdflatex logs are not always UTF-8.
    fn log_tail(&self) -> String {
        std::fs::read(self.log_path())
            .ok()
            .map(|bytes| {
                let log = String::from_utf8_lossy(&bytes);
                tail(&log, DIAGNOSTIC_TAIL).to_string()
            })
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string())
    }
}

/// The last `max` characters of `text`.
pub fn tail(text: &str, max: usize) -> &str {
    if max == 0 {
        return "";
    }
    match text.char_indices().rev().nth(max - 1) {
        Some((at, _)) => &text[at..],
        None => text,
    }
}
