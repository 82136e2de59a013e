//! # tradeboard-export
//!
//! Label generation, label merging and the CSV exports.
//!
//! [`run_batch`] renders and compiles one label per game into the
//! [`HoldingArea`]; [`merge_holding_area`] concatenates everything held into
//! a single PDF and empties the area. [`Exporter`] bundles both with the
//! store and settings for the CLI and the server.

pub mod batch;
pub mod compiler;
pub mod csv_export;
pub mod error;
pub mod holding;
pub mod merge;
pub mod pipeline;
pub mod scratch;
pub mod status;
pub mod tool;

pub use batch::{run_batch, BatchOptions, BatchSummary, JobFailure};
pub use compiler::{CompileJob, CompileOutcome, FailureKind};
pub use csv_export::{CSV_FILENAME, MEMBERS_CSV_FILENAME};
pub use error::ExportError;
pub use holding::HoldingArea;
pub use merge::{merge_holding_area, MergeResult};
pub use pipeline::{ExportKind, Exporter};
pub use status::{Notice, NoticeLevel};
pub use tool::{ProcessRunner, ToolOutput, ToolRunner};
