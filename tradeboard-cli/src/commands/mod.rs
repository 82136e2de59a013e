pub mod export;
pub mod game;
pub mod honeypot;
pub mod member;
pub mod serve;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use tradeboard_core::{store, FilterParams, GameFilter, Settings};
use tradeboard_export::{Notice, NoticeLevel};

pub(crate) fn home() -> Result<PathBuf> {
    Ok(store::home()?)
}

pub(crate) fn settings(home: &std::path::Path) -> Result<Settings> {
    Settings::load_at(home).context("failed to load ~/.tradeboard/config.yaml")
}

pub(crate) fn print_notice(notice: &Notice) {
    let mark = match notice.level {
        NoticeLevel::Success => "✓".green().bold(),
        NoticeLevel::Info => "•".blue().bold(),
        NoticeLevel::Error => "✗".red().bold(),
    };
    println!("{mark} {}", notice.text);
}

/// Listing filter flags shared by `game list` and `export`.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Only the game with this id.
    #[arg(long)]
    pub game_id: Option<String>,

    /// new-in-shrink | like-new | very-good | good | fair | poor
    #[arg(long)]
    pub condition: Option<String>,

    /// true | false
    #[arg(long)]
    pub printed: Option<String>,

    /// true | false
    #[arg(long)]
    pub received: Option<String>,

    /// Owner first name contains (case-insensitive).
    #[arg(long)]
    pub first_name: Option<String>,

    /// Owner last name contains (case-insensitive).
    #[arg(long)]
    pub last_name: Option<String>,

    /// Abington | Norton | Saugus | Framingham
    #[arg(long = "dropoff")]
    pub drop_off_location: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> Result<GameFilter> {
        let params = FilterParams {
            game_id: self.game_id.clone(),
            condition: self.condition.clone(),
            printed: self.printed.clone(),
            received: self.received.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            drop_off_location: self.drop_off_location.clone(),
        };
        GameFilter::try_from(&params).context("invalid filter")
    }
}
