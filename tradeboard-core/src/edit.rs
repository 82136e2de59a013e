//! Record edits and the permission rules around them.
//!
//! Members edit their own games until the store has received them; staff edit
//! anything and additionally control `printed` and `received`.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::error::EditError;
use crate::types::{Condition, Game, PetExposure, User};

/// Member-editable fields. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameEdit {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub condition: Option<Condition>,
    pub missing_pieces: Option<bool>,
    /// `Some(None)` clears the description.
    pub missing_description: Option<Option<String>>,
    pub smoking_house: Option<bool>,
    pub musty_smell: Option<bool>,
    pub pet: Option<PetExposure>,
}

/// Staff edit: member fields plus the admin-only flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminGameEdit {
    pub fields: GameEdit,
    pub printed: Option<bool>,
    pub received: Option<bool>,
}

pub fn can_edit(game: &Game, user: &User) -> Result<(), EditError> {
    if game.owner != user.username && !user.is_staff {
        return Err(EditError::Forbidden("You can only edit your own games."));
    }
    if game.received && !user.is_staff {
        return Err(EditError::Forbidden(
            "This game has been received by the store and can no longer be edited by users.",
        ));
    }
    Ok(())
}

/// Deletion is owner-only; staff owners may delete received games.
pub fn can_delete(game: &Game, user: &User) -> Result<(), EditError> {
    if game.owner != user.username {
        return Err(EditError::Forbidden("You can only delete your own games."));
    }
    if game.received && !user.is_staff {
        return Err(EditError::Forbidden(
            "This game has been received by the store and can no longer be deleted by users.",
        ));
    }
    Ok(())
}

/// Member removal is staff-only, and nobody removes their own account.
pub fn can_delete_member(target: &User, actor: &User) -> Result<(), EditError> {
    if !actor.is_staff {
        return Err(EditError::Forbidden("Only staff can delete members."));
    }
    if target.username == actor.username {
        return Err(EditError::Forbidden("You cannot delete your own account."));
    }
    Ok(())
}

pub fn apply_edit(game: &mut Game, edit: &GameEdit) {
    if let Some(name) = &edit.name {
        game.name = name.trim().to_string();
    }
    if let Some(price) = edit.price {
        game.price = price;
    }
    if let Some(condition) = edit.condition {
        game.condition = condition;
    }
    if let Some(missing) = edit.missing_pieces {
        game.missing_pieces = missing;
    }
    if let Some(description) = &edit.missing_description {
        game.missing_description = description
            .as_ref()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
    }
    if let Some(smoking) = edit.smoking_house {
        game.smoking_house = smoking;
    }
    if let Some(musty) = edit.musty_smell {
        game.musty_smell = musty;
    }
    if let Some(pet) = edit.pet {
        game.pet = pet;
    }
}

/// Apply a staff edit.
///
/// `previous_received` is the value of `received` the editor saw. A
/// false→true transition stamps `received_date`; true→false clears it.
pub fn apply_admin_edit(game: &mut Game, edit: &AdminGameEdit, previous_received: bool) {
    apply_edit(game, &edit.fields);
    if let Some(printed) = edit.printed {
        game.printed = printed;
    }
    if let Some(received) = edit.received {
        match (previous_received, received) {
            (false, true) => game.received_date = Some(Utc::now()),
            (true, false) => game.received_date = None,
            _ => {}
        }
        game.received = received;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GameId, Username};

    fn make_game(owner: &str, received: bool) -> Game {
        let now = Utc::now();
        Game {
            id: GameId(1),
            name: "Wingspan".to_string(),
            owner: Username::from(owner),
            price: Decimal::new(4500, 2),
            condition: Condition::LikeNew,
            missing_pieces: false,
            missing_description: None,
            smoking_house: false,
            musty_smell: false,
            pet: PetExposure::None,
            printed: false,
            received,
            received_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn user(name: &str, staff: bool) -> User {
        User {
            username: Username::from(name),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            is_staff: staff,
            is_active: true,
            date_joined: None,
        }
    }

    #[test]
    fn owner_may_edit_until_received() {
        assert!(can_edit(&make_game("ada", false), &user("ada", false)).is_ok());
        let err = can_edit(&make_game("ada", true), &user("ada", false)).unwrap_err();
        assert!(err.to_string().contains("received by the store"));
    }

    #[test]
    fn strangers_may_not_edit_but_staff_may() {
        let game = make_game("ada", true);
        assert_eq!(
            can_edit(&game, &user("bob", false)),
            Err(EditError::Forbidden("You can only edit your own games."))
        );
        assert!(can_edit(&game, &user("root", true)).is_ok());
    }

    #[test]
    fn delete_is_owner_only_even_for_staff() {
        let game = make_game("ada", false);
        assert!(can_delete(&game, &user("root", true)).is_err());
        assert!(can_delete(&make_game("root", true), &user("root", true)).is_ok());
    }

    #[test]
    fn staff_delete_other_members_but_not_themselves() {
        assert!(can_delete_member(&user("ada", false), &user("root", true)).is_ok());
        assert_eq!(
            can_delete_member(&user("root", true), &user("root", true)),
            Err(EditError::Forbidden("You cannot delete your own account."))
        );
        assert!(can_delete_member(&user("ada", false), &user("bob", false)).is_err());
    }

    #[test]
    fn receiving_stamps_date_and_unreceiving_clears_it() {
        let mut game = make_game("ada", false);
        let edit = AdminGameEdit {
            received: Some(true),
            ..AdminGameEdit::default()
        };
        apply_admin_edit(&mut game, &edit, false);
        assert!(game.received);
        assert!(game.received_date.is_some());

        let stamped = game.received_date;
        apply_admin_edit(&mut game, &edit, true);
        assert_eq!(game.received_date, stamped, "no restamp without a transition");

        let undo = AdminGameEdit {
            received: Some(false),
            ..AdminGameEdit::default()
        };
        apply_admin_edit(&mut game, &undo, true);
        assert!(!game.received);
        assert!(game.received_date.is_none());
    }

    #[test]
    fn clearing_description_uses_nested_option() {
        let mut game = make_game("ada", false);
        game.missing_description = Some("2 dice".to_string());
        apply_edit(
            &mut game,
            &GameEdit {
                missing_description: Some(None),
                ..GameEdit::default()
            },
        );
        assert!(game.missing_description.is_none());
    }
}
