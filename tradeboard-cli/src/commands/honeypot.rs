//! `tradeboard honeypot list`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use tradeboard_server::honeypot;

use super::home;

#[derive(Subcommand, Debug)]
pub enum HoneypotCommand {
    /// Show recorded attempts, newest first.
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct AttemptRow {
    #[tabled(rename = "time")]
    time: String,
    #[tabled(rename = "ip")]
    ip: String,
    #[tabled(rename = "kind")]
    kind: String,
    #[tabled(rename = "username")]
    username: String,
    #[tabled(rename = "user agent")]
    user_agent: String,
}

pub fn run(cmd: HoneypotCommand) -> Result<()> {
    match cmd {
        HoneypotCommand::List(args) => list(args),
    }
}

fn list(args: ListArgs) -> Result<()> {
    let home = home()?;
    let attempts = honeypot::load_at(&home).context("failed to read honeypot log")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&attempts).context("failed to render attempts JSON")?
        );
        return Ok(());
    }
    if attempts.is_empty() {
        println!("No honeypot attempts recorded.");
        return Ok(());
    }

    let rows: Vec<AttemptRow> = attempts
        .iter()
        .map(|a| AttemptRow {
            time: a.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            ip: a.ip_address.clone(),
            kind: if a.is_login_attempt { "login" } else { "page" }.to_string(),
            username: a.username.clone().unwrap_or_default(),
            user_agent: a.short_user_agent(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
