//! Tradeboard: board-game consignment records, labels and exports.
//!
//! # Usage
//!
//! ```text
//! tradeboard member set <username> [--first-name ..] [--last-name ..] [--email ..]
//!                       [--staff] [--phone ..] [--dropoff ..] [--payment ..]
//! tradeboard member list
//! tradeboard member remove <username> --as <staff>
//! tradeboard game add --owner <user> --name <n> --price <p> [--condition ..]
//!                     [--missing <desc>] [--smoking] [--musty] [--pet ..]
//! tradeboard game list [filter flags] [--json]
//! tradeboard game show <id>
//! tradeboard game edit <id> --as <user> [fields...] [--printed B] [--received B]
//! tradeboard game remove <id> --as <user>
//! tradeboard game stats [--as <user>] [--json]
//! tradeboard export csv [filter flags] [--out <path>]
//! tradeboard export members [--out <path>]
//! tradeboard export labels [filter flags]
//! tradeboard export merge [--out <path>]
//! tradeboard honeypot list [--json]
//! tradeboard serve [--bind <addr>]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    export::ExportCommand, game::GameCommand, honeypot::HoneypotCommand, member::MemberCommand,
    serve::ServeArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "tradeboard",
    version,
    about = "Board-game consignment records, shelf labels and exports",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage member accounts and profiles.
    Member {
        #[command(subcommand)]
        command: MemberCommand,
    },

    /// List, add, edit and remove games.
    Game {
        #[command(subcommand)]
        command: GameCommand,
    },

    /// CSV export, label generation and label merging.
    Export {
        #[command(subcommand)]
        command: ExportCommand,
    },

    /// Inspect recorded honeypot attempts.
    Honeypot {
        #[command(subcommand)]
        command: HoneypotCommand,
    },

    /// Run the HTTP server in the foreground.
    Serve(ServeArgs),
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    // `serve` installs the server's own subscriber.
    if !matches!(cli.command, Commands::Serve(_)) {
        init_tracing();
    }
    match cli.command {
        Commands::Member { command } => commands::member::run(command),
        Commands::Game { command } => commands::game::run(command),
        Commands::Export { command } => commands::export::run(command),
        Commands::Honeypot { command } => commands::honeypot::run(command),
        Commands::Serve(args) => args.run(),
    }
}
