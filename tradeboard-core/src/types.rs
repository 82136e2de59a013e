//! Domain types for the tradeboard record store.
//!
//! All types are serializable/deserializable via serde + serde_yaml.
//! Enum codes are the stored form; labels are what documents and exports show.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed game record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u64> for GameId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for GameId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A strongly-typed account name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Username(pub String);

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Username {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Username {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Error returned when a choice code does not match any known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownChoice {
    pub field: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl fmt::Display for UnknownChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown {} '{}'; expected: {}",
            self.field, self.value, self.expected
        )
    }
}

impl std::error::Error for UnknownChoice {}

/// Physical condition of a listed game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Condition {
    #[serde(rename = "new in shrink")]
    NewInShrink,
    #[serde(rename = "like new")]
    LikeNew,
    #[serde(rename = "very good")]
    VeryGood,
    #[default]
    #[serde(rename = "good")]
    Good,
    #[serde(rename = "fair")]
    Fair,
    #[serde(rename = "poor")]
    Poor,
}

impl Condition {
    pub fn all() -> &'static [Condition] {
        &[
            Condition::NewInShrink,
            Condition::LikeNew,
            Condition::VeryGood,
            Condition::Good,
            Condition::Fair,
            Condition::Poor,
        ]
    }

    /// Stored code, e.g. `"very good"`.
    pub fn code(&self) -> &'static str {
        match self {
            Condition::NewInShrink => "new in shrink",
            Condition::LikeNew => "like new",
            Condition::VeryGood => "very good",
            Condition::Good => "good",
            Condition::Fair => "fair",
            Condition::Poor => "poor",
        }
    }

    /// Human-readable grading text shown on labels and exports.
    pub fn label(&self) -> &'static str {
        match self {
            Condition::NewInShrink => {
                "New in Shrink - Original shrinkwrap/seal is intact. Never Opened"
            }
            Condition::LikeNew => "Like New - Pieces unpunched, cards wrapped, never played",
            Condition::VeryGood => {
                "Very Good - Pieces punched, Sorted. Rarely or never played. No discernible wear"
            }
            Condition::Good => {
                "Good - Played but well maintained. Pieces unsorted. Box/book(s) shows signs of use"
            }
            Condition::Fair => {
                "Fair - Discernible wear. Box/book(s) shows minor damage and/or have been slightly marked"
            }
            Condition::Poor => {
                "Poor - Worn but playable. Box/book(s) shows damage and/or have been significantly marked"
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Condition {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        Condition::all()
            .iter()
            .copied()
            .find(|c| c.code() == wanted)
            .ok_or_else(|| UnknownChoice {
                field: "condition",
                value: s.to_string(),
                expected: "new in shrink, like new, very good, good, fair, poor",
            })
    }
}

/// Pet exposure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PetExposure {
    #[default]
    None,
    Cat,
    Dog,
}

impl PetExposure {
    pub fn code(&self) -> &'static str {
        match self {
            PetExposure::None => "none",
            PetExposure::Cat => "cat",
            PetExposure::Dog => "dog",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PetExposure::None => "None",
            PetExposure::Cat => "Cat",
            PetExposure::Dog => "Dog",
        }
    }
}

impl fmt::Display for PetExposure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PetExposure {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(PetExposure::None),
            "cat" => Ok(PetExposure::Cat),
            "dog" => Ok(PetExposure::Dog),
            _ => Err(UnknownChoice {
                field: "pet",
                value: s.to_string(),
                expected: "none, cat, dog",
            }),
        }
    }
}

/// Store location where a member hands in their games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DropoffLocation {
    #[default]
    Abington,
    Norton,
    Saugus,
    Framingham,
}

impl DropoffLocation {
    pub fn all() -> &'static [DropoffLocation] {
        &[
            DropoffLocation::Abington,
            DropoffLocation::Norton,
            DropoffLocation::Saugus,
            DropoffLocation::Framingham,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            DropoffLocation::Abington => "Abington",
            DropoffLocation::Norton => "Norton",
            DropoffLocation::Saugus => "Saugus",
            DropoffLocation::Framingham => "Framingham",
        }
    }
}

impl fmt::Display for DropoffLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DropoffLocation {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DropoffLocation::all()
            .iter()
            .copied()
            .find(|l| l.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownChoice {
                field: "drop-off location",
                value: s.to_string(),
                expected: "Abington, Norton, Saugus, Framingham",
            })
    }
}

/// How a member wants to be paid once a game sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentChoice {
    #[serde(rename = "cash_40")]
    Cash40,
    #[default]
    #[serde(rename = "credit_70")]
    Credit70,
}

impl PaymentChoice {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentChoice::Cash40 => "cash_40",
            PaymentChoice::Credit70 => "credit_70",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentChoice::Cash40 => "40% of sale value in cash",
            PaymentChoice::Credit70 => "70% of sale value in store credit",
        }
    }
}

impl fmt::Display for PaymentChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PaymentChoice {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash_40" | "cash" => Ok(PaymentChoice::Cash40),
            "credit_70" | "credit" => Ok(PaymentChoice::Credit70),
            _ => Err(UnknownChoice {
                field: "payment choice",
                value: s.to_string(),
                expected: "cash_40, credit_70",
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// Smallest price a listing may carry.
pub fn min_price() -> Decimal {
    Decimal::new(1, 2)
}

/// A game listed for sale by a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub name: String,
    pub owner: Username,
    pub price: Decimal,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub missing_pieces: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_description: Option<String>,
    #[serde(default)]
    pub smoking_house: bool,
    #[serde(default)]
    pub musty_smell: bool,
    #[serde(default)]
    pub pet: PetExposure,
    /// Set once a label PDF has been generated for this game.
    #[serde(default)]
    pub printed: bool,
    /// Set by staff once the store has the physical game.
    #[serde(default)]
    pub received: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Game {
    /// `$24.99`
    pub fn formatted_price(&self) -> String {
        format!("${}", self.price)
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {}",
            self.name,
            self.condition.label(),
            self.formatted_price()
        )
    }
}

/// Fields a member supplies when listing a new game.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewGame {
    pub name: String,
    pub owner: Username,
    pub price: Decimal,
    pub condition: Condition,
    pub missing_pieces: bool,
    pub missing_description: Option<String>,
    pub smoking_house: bool,
    pub musty_smell: bool,
    pub pet: PetExposure,
}

/// Account data of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: Username,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    /// Stamped by the store on the first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_joined: Option<DateTime<Utc>>,
}

fn active_by_default() -> bool {
    true
}

/// Marketplace profile attached to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub dropoff_location: DropoffLocation,
    #[serde(default)]
    pub payment_choice: PaymentChoice,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

/// Longest display name a profile accepts.
pub const DISPLAY_NAME_MAX: usize = 20;

/// A user together with their profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

impl Member {
    pub fn new(username: impl Into<Username>) -> Self {
        Self {
            user: User {
                username: username.into(),
                first_name: String::new(),
                last_name: String::new(),
                email: String::new(),
                is_staff: false,
                is_active: true,
                date_joined: None,
            },
            profile: None,
        }
    }

    /// Display name when set, username otherwise.
    pub fn public_name(&self) -> &str {
        self.profile
            .as_ref()
            .and_then(|p| p.display_name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.user.username.0)
    }
}

/// A game joined with its owner's member record, as the admin views see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub game: Game,
    pub owner: Option<Member>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
