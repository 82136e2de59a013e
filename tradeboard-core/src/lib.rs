//! Tradeboard core library: domain types, record store, settings, errors.
//!
//! - [`types`]: newtypes, choice enums and records
//! - [`store`]: per-record YAML persistence and the [`GameStore`] seam
//! - [`filter`]: admin listing filter
//! - [`edit`]: edit permissions and admin edits
//! - [`settings`]: `config.yaml` + environment overrides
//! - [`stats`]: catalogue figures for staff and members

pub mod edit;
pub mod error;
pub mod filter;
pub mod paths;
pub mod settings;
pub mod stats;
pub mod store;
pub mod types;

pub use error::{EditError, StoreError};
pub use filter::{FilterParams, GameFilter};
pub use settings::Settings;
pub use stats::{game_stats, GameStats};
pub use store::{FileStore, GameStore};
pub use types::{
    Condition, DropoffLocation, Game, GameId, Listing, Member, NewGame, PaymentChoice,
    PetExposure, Profile, User, Username,
};
