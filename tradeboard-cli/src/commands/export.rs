//! `tradeboard export csv|members|labels|merge`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};

use tradeboard_export::{ExportError, Exporter, Notice, CSV_FILENAME, MEMBERS_CSV_FILENAME};

use super::{home, print_notice, settings, FilterArgs};

#[derive(Subcommand, Debug)]
pub enum ExportCommand {
    /// Write the filtered listing as a spreadsheet.
    Csv(CsvArgs),

    /// Write the member roster as a spreadsheet, newest joined first.
    Members(MembersArgs),

    /// Generate a shelf label PDF for every matching game.
    Labels(LabelsArgs),

    /// Merge every generated label into one PDF and clear the exports folder.
    Merge(MergeArgs),
}

#[derive(Args, Debug)]
pub struct CsvArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output file. Defaults to ./games_export.csv
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct MembersArgs {
    /// Output file. Defaults to ./users_export.csv
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct LabelsArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Output file. Defaults to ./merged_games_<timestamp>.pdf
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

pub fn run(cmd: ExportCommand) -> Result<()> {
    let home = home()?;
    let exporter = Exporter::new(&home, settings(&home)?);
    match cmd {
        ExportCommand::Csv(args) => csv(&exporter, args),
        ExportCommand::Members(args) => members(&exporter, args),
        ExportCommand::Labels(args) => labels(&exporter, args),
        ExportCommand::Merge(args) => merge(&exporter, args),
    }
}

fn csv(exporter: &Exporter, args: CsvArgs) -> Result<()> {
    let filter = args.filter.to_filter()?;
    let bytes = exporter.export_csv(&filter).context("CSV export failed")?;
    let out = args.out.unwrap_or_else(|| PathBuf::from(CSV_FILENAME));
    std::fs::write(&out, bytes).with_context(|| format!("cannot write {}", out.display()))?;
    println!("✓ Wrote {}", out.display());
    Ok(())
}

fn members(exporter: &Exporter, args: MembersArgs) -> Result<()> {
    let bytes = exporter
        .export_members_csv()
        .context("member export failed")?;
    let out = args.out.unwrap_or_else(|| PathBuf::from(MEMBERS_CSV_FILENAME));
    std::fs::write(&out, bytes).with_context(|| format!("cannot write {}", out.display()))?;
    println!("✓ Wrote {}", out.display());
    Ok(())
}

fn labels(exporter: &Exporter, args: LabelsArgs) -> Result<()> {
    let filter = args.filter.to_filter()?;
    let summary = exporter
        .generate_labels(&filter)
        .context("label generation could not start")?;
    for notice in summary.messages() {
        print_notice(&notice);
    }
    if !summary.failed.is_empty() {
        let total = summary.failed.len() + summary.succeeded.len();
        bail!("{} of {total} labels failed", summary.failed.len());
    }
    println!("  Exports folder: {}", exporter.holding_area().dir().display());
    Ok(())
}

fn merge(exporter: &Exporter, args: MergeArgs) -> Result<()> {
    let merged = match exporter.merge_labels() {
        Ok(merged) => merged,
        Err(e @ (ExportError::NoInputs | ExportError::MergeFailed { .. })) => {
            print_notice(&Notice::error(e.user_message()));
            return Err(e.into());
        }
        Err(e) => return Err(e).context("merge failed"),
    };

    let out = args.out.unwrap_or_else(|| PathBuf::from(&merged.filename));
    std::fs::write(&out, &merged.bytes)
        .with_context(|| format!("cannot write {}", out.display()))?;
    println!(
        "✓ Merged {} labels into {}",
        merged.consumed.len(),
        out.display()
    );
    Ok(())
}
