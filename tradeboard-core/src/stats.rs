//! Sidebar figures: catalogue size, sellers, value and today's listings.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::{Game, User};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GameStats {
    /// Every listed game. Zero unless the viewer is staff.
    pub total_games_count: usize,
    /// Games owned by the viewer.
    pub user_games_count: usize,
    /// Distinct owners with at least one game. Hidden from members.
    pub active_sellers_count: Option<usize>,
    /// Sum of prices: the whole catalogue for staff, own games otherwise.
    pub total_games_sum: Decimal,
    /// Games listed on `today` (UTC), whoever owns them.
    pub today_deals_count: usize,
}

impl GameStats {
    /// The staff view without a personal slice, as the admin endpoint sees it.
    pub fn catalogue(games: &[Game], today: NaiveDate) -> Self {
        let mut sellers: Vec<&str> = games.iter().map(|g| g.owner.0.as_str()).collect();
        sellers.sort_unstable();
        sellers.dedup();
        Self {
            total_games_count: games.len(),
            user_games_count: 0,
            active_sellers_count: Some(sellers.len()),
            total_games_sum: games.iter().map(|g| g.price).sum(),
            today_deals_count: listed_on(games, today),
        }
    }
}

fn listed_on(games: &[Game], day: NaiveDate) -> usize {
    games
        .iter()
        .filter(|g| g.created_at.date_naive() == day)
        .count()
}

/// Figures for `viewer`; `None` means nobody is signed in and every count is zero.
pub fn game_stats(games: &[Game], viewer: Option<&User>, today: NaiveDate) -> GameStats {
    let Some(user) = viewer else {
        return GameStats {
            active_sellers_count: Some(0),
            ..GameStats::default()
        };
    };
    let own: Vec<&Game> = games.iter().filter(|g| g.owner == user.username).collect();

    if user.is_staff {
        return GameStats {
            user_games_count: own.len(),
            ..GameStats::catalogue(games, today)
        };
    }
    GameStats {
        total_games_count: 0,
        user_games_count: own.len(),
        active_sellers_count: None,
        total_games_sum: own.iter().map(|g| g.price).sum(),
        today_deals_count: listed_on(games, today),
    }
}
