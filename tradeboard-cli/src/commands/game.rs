//! `tradeboard game add|list|show|edit|remove`

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use tabled::{settings::Style, Table, Tabled};

use tradeboard_core::{
    edit::{self, AdminGameEdit, GameEdit},
    game_stats, store, Condition, GameId, GameStats, NewGame, PetExposure, Username,
};

use super::{home, FilterArgs};

#[derive(Subcommand, Debug)]
pub enum GameCommand {
    /// List a new game for a member.
    Add(AddArgs),

    /// List games, newest first.
    List(ListArgs),

    /// Show every field of one game.
    Show { id: GameId },

    /// Edit a game on behalf of a member.
    Edit(EditArgs),

    /// Remove a game on behalf of its owner.
    Remove(RemoveArgs),

    /// Catalogue figures: counts, value and today's listings.
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Show the figures this member would see. Omit for the whole catalogue.
    #[arg(long = "as", value_name = "USER")]
    pub viewer: Option<String>,

    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Member listing the game.
    #[arg(long)]
    pub owner: String,

    #[arg(long)]
    pub name: String,

    /// Asking price, e.g. 24.99
    #[arg(long)]
    pub price: Decimal,

    /// new-in-shrink | like-new | very-good | good | fair | poor
    #[arg(long, default_value = "good")]
    pub condition: Condition,

    /// Mark pieces missing, optionally describing what is missing.
    #[arg(long, num_args = 0..=1, default_missing_value = "", value_name = "DESC")]
    pub missing: Option<String>,

    /// Comes from a smoking household.
    #[arg(long)]
    pub smoking: bool,

    /// Has a musty smell.
    #[arg(long)]
    pub musty: bool,

    /// none | cat | dog
    #[arg(long, default_value = "none")]
    pub pet: PetExposure,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: GameId,

    /// Member performing the edit.
    #[arg(long = "as", value_name = "USER")]
    pub actor: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub price: Option<Decimal>,

    #[arg(long)]
    pub condition: Option<Condition>,

    /// true | false
    #[arg(long)]
    pub missing_pieces: Option<bool>,

    /// Replace the missing-pieces description.
    #[arg(long, value_name = "DESC", conflicts_with = "clear_missing")]
    pub missing: Option<String>,

    /// Remove the missing-pieces description.
    #[arg(long)]
    pub clear_missing: bool,

    /// true | false
    #[arg(long)]
    pub smoking: Option<bool>,

    /// true | false
    #[arg(long)]
    pub musty: Option<bool>,

    #[arg(long)]
    pub pet: Option<PetExposure>,

    /// Staff only. true | false
    #[arg(long)]
    pub printed: Option<bool>,

    /// Staff only. true | false
    #[arg(long)]
    pub received: Option<bool>,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    pub id: GameId,

    /// Member performing the removal.
    #[arg(long = "as", value_name = "USER")]
    pub actor: String,
}

pub fn run(cmd: GameCommand) -> Result<()> {
    match cmd {
        GameCommand::Add(args) => add(args),
        GameCommand::List(args) => list(args),
        GameCommand::Show { id } => show(id),
        GameCommand::Edit(args) => edit(args),
        GameCommand::Remove(args) => remove(args),
        GameCommand::Stats(args) => stats(args),
    }
}

fn add(args: AddArgs) -> Result<()> {
    let home = home()?;
    let owner = Username::from(args.owner.as_str());
    store::load_member_at(&home, &owner)
        .with_context(|| format!("unknown member '{owner}'; run `tradeboard member set` first"))?;

    let game = store::insert_game_at(
        &home,
        NewGame {
            name: args.name,
            owner,
            price: args.price,
            condition: args.condition,
            missing_pieces: args.missing.is_some(),
            missing_description: args.missing,
            smoking_house: args.smoking,
            musty_smell: args.musty,
            pet: args.pet,
        },
    )
    .context("failed to add game")?;

    println!("✓ Game \"{}\" added with id {}", game.name, game.id);
    Ok(())
}

#[derive(Tabled)]
struct GameRow {
    #[tabled(rename = "id")]
    id: u64,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "owner")]
    owner: String,
    #[tabled(rename = "condition")]
    condition: String,
    #[tabled(rename = "price")]
    price: String,
    #[tabled(rename = "printed")]
    printed: String,
    #[tabled(rename = "received")]
    received: String,
}

fn yes(flag: bool) -> String {
    if flag { "yes" } else { "" }.to_string()
}

fn list(args: ListArgs) -> Result<()> {
    let home = home()?;
    let filter = args.filter.to_filter()?;
    let listings = store::list_listings_at(&home, &filter).context("failed to load games")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&listings).context("failed to render games JSON")?
        );
        return Ok(());
    }
    if listings.is_empty() {
        println!("No games match.");
        return Ok(());
    }

    let rows: Vec<GameRow> = listings
        .iter()
        .map(|l| GameRow {
            id: l.game.id.0,
            name: l.game.name.clone(),
            owner: l
                .owner
                .as_ref()
                .map(|m| m.public_name().to_string())
                .unwrap_or_else(|| l.game.owner.to_string()),
            condition: l.game.condition.code().to_string(),
            price: l.game.formatted_price(),
            printed: yes(l.game.printed),
            received: yes(l.game.received),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn show(id: GameId) -> Result<()> {
    let home = home()?;
    let game = store::load_game_at(&home, id).with_context(|| format!("failed to load game {id}"))?;

    println!("{game}");
    println!("  id:             {}", game.id);
    println!("  owner:          {}", game.owner);
    println!("  missing pieces: {}", if game.missing_pieces { "yes" } else { "no" });
    if let Some(desc) = &game.missing_description {
        println!("    {desc}");
    }
    println!("  smoking house:  {}", if game.smoking_house { "yes" } else { "no" });
    println!("  musty smell:    {}", if game.musty_smell { "yes" } else { "no" });
    println!("  pet exposure:   {}", game.pet.label());
    println!("  printed:        {}", if game.printed { "yes" } else { "no" });
    match game.received_date {
        Some(at) if game.received => {
            println!("  received:       yes ({})", at.format("%Y-%m-%d %H:%M"))
        }
        _ => println!("  received:       {}", if game.received { "yes" } else { "no" }),
    }
    println!("  listed:         {}", game.created_at.format("%Y-%m-%d %H:%M"));
    Ok(())
}

fn edit(args: EditArgs) -> Result<()> {
    let home = home()?;
    let mut game = store::load_game_at(&home, args.id)
        .with_context(|| format!("failed to load game {}", args.id))?;
    let actor = store::load_member_at(&home, &Username::from(args.actor.as_str()))
        .with_context(|| format!("unknown member '{}'", args.actor))?;

    edit::can_edit(&game, &actor.user)?;
    if (args.printed.is_some() || args.received.is_some()) && !actor.user.is_staff {
        bail!("only staff can change the printed or received flags");
    }

    let missing_description = if args.clear_missing {
        Some(None)
    } else {
        args.missing.map(Some)
    };
    let change = AdminGameEdit {
        fields: GameEdit {
            name: args.name,
            price: args.price,
            condition: args.condition,
            missing_pieces: args.missing_pieces,
            missing_description,
            smoking_house: args.smoking,
            musty_smell: args.musty,
            pet: args.pet,
        },
        printed: args.printed,
        received: args.received,
    };
    let previous_received = game.received;
    edit::apply_admin_edit(&mut game, &change, previous_received);
    store::save_game_at(&home, &mut game).context("failed to save game")?;

    println!("✓ Game \"{}\" updated", game.name);
    Ok(())
}

fn remove(args: RemoveArgs) -> Result<()> {
    let home = home()?;
    let game = store::load_game_at(&home, args.id)
        .with_context(|| format!("failed to load game {}", args.id))?;
    let actor = store::load_member_at(&home, &Username::from(args.actor.as_str()))
        .with_context(|| format!("unknown member '{}'", args.actor))?;

    edit::can_delete(&game, &actor.user)?;
    store::delete_game_at(&home, game.id).context("failed to remove game")?;

    println!("✓ Game \"{}\" has been removed from the marketplace", game.name);
    Ok(())
}

#[derive(Tabled)]
struct FigureRow {
    #[tabled(rename = "figure")]
    figure: &'static str,
    #[tabled(rename = "value")]
    value: String,
}

fn stats(args: StatsArgs) -> Result<()> {
    let home = home()?;
    let games = store::list_games_at(&home).context("failed to load games")?;
    let today = chrono::Utc::now().date_naive();
    let figures = match args.viewer {
        Some(name) => {
            let viewer = store::load_member_at(&home, &Username::from(name.as_str()))
                .with_context(|| format!("unknown member '{name}'"))?;
            game_stats(&games, Some(&viewer.user), today)
        }
        None => GameStats::catalogue(&games, today),
    };

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&figures).context("failed to render stats JSON")?
        );
        return Ok(());
    }

    let rows = vec![
        FigureRow {
            figure: "total games",
            value: figures.total_games_count.to_string(),
        },
        FigureRow {
            figure: "your games",
            value: figures.user_games_count.to_string(),
        },
        FigureRow {
            figure: "active sellers",
            value: figures
                .active_sellers_count
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
        },
        FigureRow {
            figure: "total value",
            value: format!("${:.2}", figures.total_games_sum),
        },
        FigureRow {
            figure: "listed today",
            value: figures.today_deals_count.to_string(),
        },
    ];
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
