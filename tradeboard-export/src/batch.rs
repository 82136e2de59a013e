//! Batch label generation.
//!
//! For each game, in the order given: render, compile, move the PDF into the
//! holding area, then mark the record printed. A failing job is recorded and
//! the batch moves on; nothing is retried.

use std::path::PathBuf;

use tradeboard_core::types::{Game, GameId};
use tradeboard_core::GameStore;
use tradeboard_renderer::LabelTemplate;

use crate::compiler::{CompileJob, CompileOutcome, FailureKind};
use crate::error::ExportError;
use crate::holding::{job_name, HoldingArea, PDF_EXTENSION};
use crate::scratch::ScratchDir;
use crate::status::Notice;
use crate::tool::ToolRunner;

// ---------------------------------------------------------------------------
// Options and results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Compiler program (`pdflatex` unless configured otherwise).
    pub compiler: PathBuf,
    /// Parent for the scratch directory; system temp dir when `None`.
    pub scratch_root: Option<PathBuf>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            compiler: PathBuf::from("pdflatex"),
            scratch_root: None,
        }
    }
}

/// A job that did not end with a stored, recorded label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub game_id: GameId,
    pub name: String,
    pub kind: FailureKind,
    /// Raw diagnostic. Logged, never shown to users.
    pub diagnostic: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Holding-area file names, in processing order.
    pub succeeded: Vec<String>,
    pub failed: Vec<JobFailure>,
}

impl BatchSummary {
    pub fn is_empty(&self) -> bool {
        self.succeeded.is_empty() && self.failed.is_empty()
    }

    /// Sanitized messages for the operator: counts and game names only.
    pub fn messages(&self) -> Vec<Notice> {
        let mut out = Vec::new();
        if self.is_empty() {
            out.push(Notice::info("No games matched the current filters."));
            return out;
        }
        if !self.succeeded.is_empty() {
            let n = self.succeeded.len();
            let files = if n == 1 { "file" } else { "files" };
            out.push(Notice::success(format!(
                "Successfully generated {n} PDF {files} in the exports folder. \
                 The \"printed\" field has been set for these games."
            )));
        }
        if !self.failed.is_empty() {
            let names: Vec<String> = self
                .failed
                .iter()
                .map(|f| format!("{} ({})", f.name, failure_reason(f.kind)))
                .collect();
            out.push(Notice::error(format!(
                "Failed to generate PDFs for: {}",
                names.join(", ")
            )));
        }
        out
    }
}

fn failure_reason(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Compilation => "LaTeX compilation failed",
        FailureKind::ToolInvocation => "compiler could not be run",
        FailureKind::Storage => "label could not be stored",
    }
}

// ---------------------------------------------------------------------------
// run_batch
// ---------------------------------------------------------------------------

/// Generate a label for every game in `games`.
///
/// Returns `Err` only when the batch cannot start (holding area or scratch
/// directory unavailable). Per-game problems end up in
/// [`BatchSummary::failed`].
pub fn run_batch<S, R>(
    store: &S,
    runner: &R,
    template: &LabelTemplate,
    games: &[Game],
    holding: &HoldingArea,
    options: &BatchOptions,
) -> Result<BatchSummary, ExportError>
where
    S: GameStore + ?Sized,
    R: ToolRunner + ?Sized,
{
    holding.ensure()?;
    let mut summary = BatchSummary::default();
    if games.is_empty() {
        return Ok(summary);
    }

    let scratch = ScratchDir::create(options.scratch_root.as_deref())?;
    tracing::info!("generating {} labels", games.len());

    for game in games {
        let name = job_name(game.id, &game.name);
        let job = CompileJob::new(scratch.path(), &name);
        let source = template.render(game);

        let failure = match job.run(runner, &options.compiler, &source) {
            CompileOutcome::Succeeded { output } => {
                let file = format!("{name}.{PDF_EXTENSION}");
                match store_label(store, holding, game.id, &output, &file) {
                    Ok(()) => {
                        tracing::info!("generated {file}");
                        summary.succeeded.push(file);
                        continue;
                    }
                    Err(e) => (FailureKind::Storage, e.to_string()),
                }
            }
            CompileOutcome::Failed { kind, diagnostic } => (kind, diagnostic),
        };

        let (kind, diagnostic) = failure;
        tracing::warn!("label for game {} ({}) failed: {diagnostic}", game.id, game.name);
        summary.failed.push(JobFailure {
            game_id: game.id,
            name: game.name.clone(),
            kind,
            diagnostic,
        });
    }

    tracing::info!(
        "batch done: {} generated, {} failed",
        summary.succeeded.len(),
        summary.failed.len()
    );
    Ok(summary)
    // `scratch` drops here: intermediates purged, directory removed.
}

/// Admit the compiled PDF, then flag the record. A label whose record could
/// not be flagged is withdrawn again.
fn store_label<S: GameStore + ?Sized>(
    store: &S,
    holding: &HoldingArea,
    id: GameId,
    output: &std::path::Path,
    file: &str,
) -> Result<(), ExportError> {
    holding.admit(output, file)?;
    if let Err(e) = store.mark_printed(id) {
        if let Err(remove_err) = holding.remove(file) {
            tracing::warn!("could not withdraw {file}: {remove_err}");
        }
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(name: &str, kind: FailureKind) -> JobFailure {
        JobFailure {
            game_id: GameId(1),
            name: name.to_string(),
            kind,
            diagnostic: "! LaTeX Error: File `secret.sty' not found.".to_string(),
        }
    }

    #[test]
    fn empty_summary_reports_no_matches() {
        let messages = BatchSummary::default().messages();
        assert_eq!(messages, vec![Notice::info("No games matched the current filters.")]);
    }

    #[test]
    fn messages_never_carry_raw_diagnostics() {
        let summary = BatchSummary {
            succeeded: vec!["game_2_Azul.pdf".to_string()],
            failed: vec![
                failure("Root", FailureKind::Compilation),
                failure("Wingspan", FailureKind::ToolInvocation),
            ],
        };
        let messages = summary.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].text.starts_with("Successfully generated 1 PDF file "));
        assert_eq!(
            messages[1].text,
            "Failed to generate PDFs for: Root (LaTeX compilation failed), \
             Wingspan (compiler could not be run)"
        );
        assert!(messages.iter().all(|m| !m.text.contains("secret.sty")));
    }
}
