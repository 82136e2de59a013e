//! `tradeboard serve`: run the HTTP server in the foreground.

use anyhow::{Context, Result};
use clap::Args;

use super::{home, settings};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on. Overrides `server.bind` and TRADEBOARD_BIND.
    #[arg(long)]
    pub bind: Option<String>,
}

impl ServeArgs {
    pub fn run(self) -> Result<()> {
        let home = home()?;
        let mut settings = settings(&home)?;
        if let Some(bind) = self.bind {
            settings.server.bind = bind;
        }
        tradeboard_server::start_blocking(&home, settings).context("server exited with error")
    }
}
