//! Label context: the per-game values substituted into a label template.

use serde::Serialize;

use tradeboard_core::types::{Game, PetExposure};

/// Unescaped placeholder values for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelContext {
    pub id: String,
    pub name: String,
    /// Condition label, not the stored code.
    pub condition: String,
    /// Plain decimal form, e.g. `24.99`.
    pub price: String,
    pub missing_components: String,
    pub smoking_household: String,
    pub animal_condition: String,
    pub musty_smell: String,
}

impl LabelContext {
    /// Build a [`LabelContext`] from a [`Game`].
    pub fn from_game(game: &Game) -> Self {
        LabelContext {
            id: game.id.to_string(),
            name: game.name.clone(),
            condition: game.condition.label().to_string(),
            price: game.price.to_string(),
            missing_components: missing_components_clause(game),
            smoking_household: smoking_household_clause(game),
            animal_condition: animal_condition_clause(game),
            musty_smell: musty_smell_clause(game),
        }
    }
}

pub fn missing_components_clause(game: &Game) -> String {
    if !game.missing_pieces {
        return "All Components Present".to_string();
    }
    let detail = game
        .missing_description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("Yes");
    format!("Missing Components: {detail}")
}

pub fn smoking_household_clause(game: &Game) -> String {
    format!("Smoking Household: {}", yes_no(game.smoking_house))
}

pub fn animal_condition_clause(game: &Game) -> String {
    match game.pet {
        PetExposure::None => "Animal Exposure: None".to_string(),
        pet => format!("Animal Exposure: {}", pet.label()),
    }
}

pub fn musty_smell_clause(game: &Game) -> String {
    format!("Musty Smell: {}", yes_no(game.musty_smell))
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use tradeboard_core::types::{Condition, GameId, Username};

    use super::*;

    fn make_game() -> Game {
        let now = Utc::now();
        Game {
            id: GameId(3),
            name: "Spirit Island".to_string(),
            owner: Username::from("ada"),
            price: Decimal::new(5500, 2),
            condition: Condition::Good,
            missing_pieces: true,
            missing_description: Some("Missing 2 cards".to_string()),
            smoking_house: true,
            musty_smell: false,
            pet: PetExposure::Dog,
            printed: false,
            received: false,
            received_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn context_fields_populated() {
        let ctx = LabelContext::from_game(&make_game());
        assert_eq!(ctx.id, "3");
        assert_eq!(ctx.price, "55.00");
        assert!(ctx.condition.starts_with("Good - Played"));
        assert_eq!(ctx.missing_components, "Missing Components: Missing 2 cards");
        assert_eq!(ctx.smoking_household, "Smoking Household: Yes");
        assert_eq!(ctx.animal_condition, "Animal Exposure: Dog");
        assert_eq!(ctx.musty_smell, "Musty Smell: No");
    }

    #[test]
    fn missing_without_description_says_yes() {
        let mut game = make_game();
        game.missing_description = None;
        assert_eq!(missing_components_clause(&game), "Missing Components: Yes");
        game.missing_description = Some("  ".to_string());
        assert_eq!(missing_components_clause(&game), "Missing Components: Yes");
    }

    #[test]
    fn no_pet_reads_none() {
        let mut game = make_game();
        game.pet = PetExposure::None;
        assert_eq!(animal_condition_clause(&game), "Animal Exposure: None");
    }
}
