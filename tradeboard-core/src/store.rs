//! Per-record YAML store for games and members.
//!
//! # Storage layout
//!
//! ```text
//! ~/.tradeboard/
//!   games/
//!     <id>.yaml         (one game per file, mode 0600)
//!   members/
//!     <username>.yaml   (user + profile, mode 0600)
//! ```
//!
//! # API pattern
//!
//! Every function takes the home directory explicitly (`fn_at(home: &Path, …)`).
//! [`FileStore`] wraps a home and implements [`GameStore`]; [`home`] derives
//! it from `dirs::home_dir()`. Tests always pass a `TempDir`.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{io_err, StoreError};
use crate::filter::GameFilter;
use crate::paths::{games_dir, members_dir};
use crate::types::{min_price, Game, GameId, Listing, Member, NewGame, Username, DISPLAY_NAME_MAX};

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.tradeboard/games/<id>.yaml`. Pure, no I/O.
pub fn game_path_at(home: &Path, id: GameId) -> PathBuf {
    games_dir(home).join(format!("{}.yaml", id.0))
}

/// `<home>/.tradeboard/members/<username>.yaml`. Pure, no I/O.
pub fn member_path_at(home: &Path, username: &Username) -> PathBuf {
    members_dir(home).join(format!("{}.yaml", username.0))
}

fn ensure_dir(dir: &Path) -> Result<(), StoreError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        set_dir_permissions(dir)?;
    }
    Ok(())
}

fn yaml_files(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("yaml"))
        .collect();
    files.sort();
    Ok(files)
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Atomic write: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
fn write_yaml<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(dir) = path.parent() {
        ensure_dir(dir)?;
    }
    let tmp_path = path.with_extension("yaml.tmp");
    let yaml = serde_yaml::to_string(value)?;
    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    set_file_permissions(&tmp_path)?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 2. Games
// ---------------------------------------------------------------------------

fn validate_game_fields(name: &str, price: rust_decimal::Decimal) -> Result<(), StoreError> {
    if name.trim().is_empty() {
        return Err(StoreError::Invalid("game name must not be empty".to_string()));
    }
    if name.chars().count() > 200 {
        return Err(StoreError::Invalid(
            "game name must be at most 200 characters".to_string(),
        ));
    }
    if price < min_price() {
        return Err(StoreError::Invalid(format!(
            "price must be at least $0.01 (got {price})"
        )));
    }
    Ok(())
}

/// Next free identifier: one past the highest stored id.
pub fn next_game_id_at(home: &Path) -> Result<GameId, StoreError> {
    let highest = yaml_files(&games_dir(home))?
        .iter()
        .filter_map(|p| p.file_stem()?.to_str()?.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    Ok(GameId(highest + 1))
}

/// Create a game record from member input. Assigns id and timestamps.
pub fn insert_game_at(home: &Path, new: NewGame) -> Result<Game, StoreError> {
    validate_game_fields(&new.name, new.price)?;
    let now = Utc::now();
    let game = Game {
        id: next_game_id_at(home)?,
        name: new.name.trim().to_string(),
        owner: new.owner,
        price: new.price,
        condition: new.condition,
        missing_pieces: new.missing_pieces,
        missing_description: new.missing_description.filter(|d| !d.trim().is_empty()),
        smoking_house: new.smoking_house,
        musty_smell: new.musty_smell,
        pet: new.pet,
        printed: false,
        received: false,
        received_date: None,
        created_at: now,
        updated_at: now,
    };
    write_yaml(&game_path_at(home, game.id), &game)?;
    tracing::debug!("inserted game {} ({})", game.id, game.name);
    Ok(game)
}

/// Load a single game. Returns `StoreError::GameNotFound` if absent.
pub fn load_game_at(home: &Path, id: GameId) -> Result<Game, StoreError> {
    let path = game_path_at(home, id);
    if !path.exists() {
        return Err(StoreError::GameNotFound(id));
    }
    read_yaml(&path)
}

/// All games, newest first (id descending on equal timestamps).
pub fn list_games_at(home: &Path) -> Result<Vec<Game>, StoreError> {
    let mut games = yaml_files(&games_dir(home))?
        .iter()
        .map(|p| read_yaml::<Game>(p))
        .collect::<Result<Vec<_>, _>>()?;
    games.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Ok(games)
}

/// Persist an existing game, bumping `updated_at`.
pub fn save_game_at(home: &Path, game: &mut Game) -> Result<(), StoreError> {
    validate_game_fields(&game.name, game.price)?;
    if !game_path_at(home, game.id).exists() {
        return Err(StoreError::GameNotFound(game.id));
    }
    game.updated_at = Utc::now();
    write_yaml(&game_path_at(home, game.id), game)
}

pub fn delete_game_at(home: &Path, id: GameId) -> Result<(), StoreError> {
    let path = game_path_at(home, id);
    if !path.exists() {
        return Err(StoreError::GameNotFound(id));
    }
    std::fs::remove_file(&path).map_err(|e| io_err(&path, e))
}

/// Set `printed` to true and persist only that change.
///
/// Never clears the flag. Returns the stored record.
pub fn mark_printed_at(home: &Path, id: GameId) -> Result<Game, StoreError> {
    let mut game = load_game_at(home, id)?;
    if !game.printed {
        game.printed = true;
        game.updated_at = Utc::now();
        write_yaml(&game_path_at(home, id), &game)?;
    }
    Ok(game)
}

// ---------------------------------------------------------------------------
// 3. Members
// ---------------------------------------------------------------------------

fn validate_username(username: &Username) -> Result<(), StoreError> {
    let name = &username.0;
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '@' | '+'));
    if !valid || name.starts_with('.') {
        return Err(StoreError::Invalid(format!("invalid username '{name}'")));
    }
    Ok(())
}

/// Create or replace a member record.
pub fn save_member_at(home: &Path, member: &Member) -> Result<(), StoreError> {
    validate_username(&member.user.username)?;
    if let Some(name) = member.profile.as_ref().and_then(|p| p.display_name.as_ref()) {
        if name.chars().count() > DISPLAY_NAME_MAX {
            return Err(StoreError::Invalid(format!(
                "display name must be at most {DISPLAY_NAME_MAX} characters"
            )));
        }
    }
    let path = member_path_at(home, &member.user.username);
    if member.user.date_joined.is_none() {
        let mut stamped = member.clone();
        stamped.user.date_joined = Some(Utc::now());
        return write_yaml(&path, &stamped);
    }
    write_yaml(&path, member)
}

pub fn load_member_at(home: &Path, username: &Username) -> Result<Member, StoreError> {
    validate_username(username)?;
    let path = member_path_at(home, username);
    if !path.exists() {
        return Err(StoreError::MemberNotFound(username.0.clone()));
    }
    read_yaml(&path)
}

/// Remove a member together with every game they own. Returns how many
/// games went with them.
pub fn delete_member_at(home: &Path, username: &Username) -> Result<usize, StoreError> {
    validate_username(username)?;
    let path = member_path_at(home, username);
    if !path.exists() {
        return Err(StoreError::MemberNotFound(username.0.clone()));
    }
    let owned: Vec<GameId> = list_games_at(home)?
        .into_iter()
        .filter(|g| &g.owner == username)
        .map(|g| g.id)
        .collect();
    for id in &owned {
        delete_game_at(home, *id)?;
    }
    std::fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
    tracing::debug!("deleted member {username} and {} games", owned.len());
    Ok(owned.len())
}

/// All members sorted by username.
pub fn list_members_at(home: &Path) -> Result<Vec<Member>, StoreError> {
    let mut members = yaml_files(&members_dir(home))?
        .iter()
        .map(|p| read_yaml::<Member>(p))
        .collect::<Result<Vec<_>, _>>()?;
    members.sort_by(|a, b| a.user.username.cmp(&b.user.username));
    Ok(members)
}

/// Games joined with their owners, filtered, newest first.
pub fn list_listings_at(home: &Path, filter: &GameFilter) -> Result<Vec<Listing>, StoreError> {
    let members = list_members_at(home)?;
    let listings = list_games_at(home)?
        .into_iter()
        .map(|game| {
            let owner = members
                .iter()
                .find(|m| m.user.username == game.owner)
                .cloned();
            Listing { game, owner }
        })
        .filter(|listing| filter.matches(listing))
        .collect();
    Ok(listings)
}

// ---------------------------------------------------------------------------
// 4. GameStore seam
// ---------------------------------------------------------------------------

/// The slice of the store the export pipeline depends on.
pub trait GameStore {
    fn listings(&self, filter: &GameFilter) -> Result<Vec<Listing>, StoreError>;

    /// Persist `printed = true` for one record. Must never clear the flag.
    fn mark_printed(&self, id: GameId) -> Result<(), StoreError>;
}

/// [`GameStore`] over the YAML files under one home directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    home: PathBuf,
}

impl FileStore {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }
}

impl GameStore for FileStore {
    fn listings(&self, filter: &GameFilter) -> Result<Vec<Listing>, StoreError> {
        list_listings_at(&self.home, filter)
    }

    fn mark_printed(&self, id: GameId) -> Result<(), StoreError> {
        mark_printed_at(&self.home, id).map(|_| ())
    }
}

/// `dirs::home_dir()` or `StoreError::HomeNotFound`.
pub fn home() -> Result<PathBuf, StoreError> {
    dirs::home_dir().ok_or(StoreError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::*;
    use crate::types::Condition;

    fn make_home() -> TempDir {
        TempDir::new().expect("tempdir")
    }

    fn new_game(name: &str) -> NewGame {
        NewGame {
            name: name.to_string(),
            owner: Username::from("ada"),
            price: Decimal::new(1999, 2),
            condition: Condition::Fair,
            ..NewGame::default()
        }
    }

    #[test]
    fn game_path_is_correct() {
        let home = make_home();
        let path = game_path_at(home.path(), GameId(12));
        assert!(path.ends_with(".tradeboard/games/12.yaml"));
    }

    #[test]
    fn ids_are_assigned_sequentially() {
        let home = make_home();
        let a = insert_game_at(home.path(), new_game("Root")).expect("insert");
        let b = insert_game_at(home.path(), new_game("Azul")).expect("insert");
        assert_eq!(a.id, GameId(1));
        assert_eq!(b.id, GameId(2));
        assert_eq!(next_game_id_at(home.path()).unwrap(), GameId(3));
    }

    #[test]
    fn insert_rejects_price_below_one_cent() {
        let home = make_home();
        let mut game = new_game("Root");
        game.price = Decimal::ZERO;
        let err = insert_game_at(home.path(), game).unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)), "got: {err}");
    }

    #[test]
    fn blank_missing_description_is_dropped() {
        let home = make_home();
        let mut game = new_game("Root");
        game.missing_pieces = true;
        game.missing_description = Some("   ".to_string());
        let stored = insert_game_at(home.path(), game).unwrap();
        assert!(stored.missing_description.is_none());
    }

    #[test]
    fn mark_printed_sets_flag_once() {
        let home = make_home();
        let game = insert_game_at(home.path(), new_game("Root")).unwrap();
        assert!(!game.printed);
        let marked = mark_printed_at(home.path(), game.id).expect("mark");
        assert!(marked.printed);
        let again = mark_printed_at(home.path(), game.id).expect("mark twice");
        assert_eq!(again.updated_at, marked.updated_at, "no rewrite when already printed");
    }

    #[test]
    fn atomic_write_cleans_up_tmp() {
        let home = make_home();
        let game = insert_game_at(home.path(), new_game("Root")).unwrap();
        let tmp = game_path_at(home.path(), game.id).with_extension("yaml.tmp");
        assert!(!tmp.exists(), ".tmp must be gone after successful save");
    }

    #[test]
    fn load_missing_game_returns_not_found() {
        let home = make_home();
        let err = load_game_at(home.path(), GameId(99)).unwrap_err();
        assert!(matches!(err, StoreError::GameNotFound(GameId(99))));
    }

    #[test]
    fn list_games_empty_when_no_store() {
        let home = make_home();
        assert!(list_games_at(home.path()).unwrap().is_empty());
    }

    #[test]
    fn usernames_cannot_escape_members_dir() {
        let home = make_home();
        let member = Member::new("../evil");
        assert!(matches!(
            save_member_at(home.path(), &member),
            Err(StoreError::Invalid(_))
        ));
    }

    #[test]
    fn home_not_found_error_message() {
        assert!(StoreError::HomeNotFound.to_string().contains("home directory"));
    }
}
