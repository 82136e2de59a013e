//! Admin listing filter.
//!
//! [`FilterParams`] is the raw, query-string shaped input (empty strings mean
//! "unset"); [`GameFilter`] is the parsed form applied to [`Listing`]s.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::types::{Condition, DropoffLocation, GameId, Listing};

/// Raw filter parameters as they arrive from a query string or CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    pub game_id: Option<String>,
    pub condition: Option<String>,
    pub printed: Option<String>,
    pub received: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub drop_off_location: Option<String>,
}

/// Parsed admin filter. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFilter {
    pub game_id: Option<GameId>,
    pub condition: Option<Condition>,
    pub printed: Option<bool>,
    pub received: Option<bool>,
    /// Case-insensitive substring of the owner's first name.
    pub first_name: Option<String>,
    /// Case-insensitive substring of the owner's last name.
    pub last_name: Option<String>,
    pub dropoff_location: Option<DropoffLocation>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `"true"` is true; any other non-empty value is false.
fn flag(value: &Option<String>) -> Option<bool> {
    non_empty(value).map(|v| v.eq_ignore_ascii_case("true"))
}

impl TryFrom<&FilterParams> for GameFilter {
    type Error = StoreError;

    fn try_from(params: &FilterParams) -> Result<Self, Self::Error> {
        let game_id = non_empty(&params.game_id)
            .map(|v| {
                v.parse::<GameId>()
                    .map_err(|_| StoreError::Invalid(format!("game id '{v}' is not a number")))
            })
            .transpose()?;
        let condition = non_empty(&params.condition)
            .map(|v| v.parse::<Condition>())
            .transpose()
            .map_err(|e| StoreError::Invalid(e.to_string()))?;
        let dropoff_location = non_empty(&params.drop_off_location)
            .map(|v| v.parse::<DropoffLocation>())
            .transpose()
            .map_err(|e| StoreError::Invalid(e.to_string()))?;

        Ok(GameFilter {
            game_id,
            condition,
            printed: flag(&params.printed),
            received: flag(&params.received),
            first_name: non_empty(&params.first_name).map(str::to_lowercase),
            last_name: non_empty(&params.last_name).map(str::to_lowercase),
            dropoff_location,
        })
    }
}

impl GameFilter {
    pub fn is_empty(&self) -> bool {
        *self == GameFilter::default()
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        let game = &listing.game;
        if self.game_id.is_some_and(|id| id != game.id) {
            return false;
        }
        if self.condition.is_some_and(|c| c != game.condition) {
            return false;
        }
        if self.printed.is_some_and(|p| p != game.printed) {
            return false;
        }
        if self.received.is_some_and(|r| r != game.received) {
            return false;
        }

        let user = listing.owner.as_ref().map(|m| &m.user);
        if let Some(needle) = &self.first_name {
            if !user.is_some_and(|u| u.first_name.to_lowercase().contains(needle)) {
                return false;
            }
        }
        if let Some(needle) = &self.last_name {
            if !user.is_some_and(|u| u.last_name.to_lowercase().contains(needle)) {
                return false;
            }
        }
        if let Some(location) = self.dropoff_location {
            let profile = listing.owner.as_ref().and_then(|m| m.profile.as_ref());
            if !profile.is_some_and(|p| p.dropoff_location == location) {
                return false;
            }
        }
        true
    }
}
