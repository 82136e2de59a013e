//! Spreadsheet exports: the admin game listing and the member roster.

use std::io::Write;

use chrono::{DateTime, Utc};

use tradeboard_core::types::{Listing, Member, PaymentChoice, Profile};

use crate::error::ExportError;

pub const CSV_FILENAME: &str = "games_export.csv";
pub const MEMBERS_CSV_FILENAME: &str = "users_export.csv";

const NOT_SET: &str = "Not Set";

pub const CSV_HEADER: [&str; 19] = [
    "Game ID",
    "Game Name",
    "First Name",
    "Last Name",
    "Email",
    "Phone Number",
    "Payment Choice",
    "Price",
    "Condition",
    "Missing Pieces",
    "Missing Pieces Description",
    "Smoking House",
    "Musty Smell",
    "Pet Exposure",
    "Printed",
    "Received",
    "Received Date",
    "Drop Off Location",
    "Created Date",
];

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn payment_label(choice: PaymentChoice) -> &'static str {
    match choice {
        PaymentChoice::Cash40 => "Cash (40%)",
        PaymentChoice::Credit70 => "Store Credit (70%)",
    }
}

/// One CSV row; owner and profile columns are empty when absent.
pub fn row(listing: &Listing) -> [String; 19] {
    let game = &listing.game;
    let user = listing.owner.as_ref().map(|m| &m.user);
    let profile: Option<&Profile> = listing.owner.as_ref().and_then(|m| m.profile.as_ref());

    [
        game.id.to_string(),
        game.name.clone(),
        user.map(|u| u.first_name.clone()).unwrap_or_default(),
        user.map(|u| u.last_name.clone()).unwrap_or_default(),
        user.map(|u| u.email.clone()).unwrap_or_default(),
        profile
            .and_then(|p| p.phone_number.clone())
            .unwrap_or_default(),
        profile
            .map(|p| payment_label(p.payment_choice).to_string())
            .unwrap_or_default(),
        game.price.to_string(),
        game.condition.label().to_string(),
        yes_no(game.missing_pieces).to_string(),
        game.missing_description.clone().unwrap_or_default(),
        yes_no(game.smoking_house).to_string(),
        yes_no(game.musty_smell).to_string(),
        game.pet.label().to_string(),
        yes_no(game.printed).to_string(),
        yes_no(game.received).to_string(),
        game.received_date.as_ref().map(timestamp).unwrap_or_default(),
        profile
            .map(|p| p.dropoff_location.name().to_string())
            .unwrap_or_default(),
        timestamp(&game.created_at),
    ]
}

/// Write the header and one row per listing to `out`.
pub fn write_csv<W: Write>(listings: &[Listing], out: W) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(CSV_HEADER)?;
    for listing in listings {
        writer.write_record(row(listing))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn to_csv_bytes(listings: &[Listing]) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_csv(listings, &mut buf)?;
    Ok(buf)
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

pub const MEMBERS_CSV_HEADER: [&str; 11] = [
    "User ID",
    "Username",
    "Email",
    "First Name",
    "Last Name",
    "Phone Number",
    "Drop Off Location",
    "Payment Choice",
    "Status",
    "Is Staff",
    "Date Joined",
];

/// One roster row. Members are keyed by username, so it fills the id column too.
pub fn member_row(member: &Member) -> [String; 11] {
    let user = &member.user;
    let profile = member.profile.as_ref();
    [
        user.username.to_string(),
        user.username.to_string(),
        user.email.clone(),
        user.first_name.clone(),
        user.last_name.clone(),
        profile
            .and_then(|p| p.phone_number.clone())
            .unwrap_or_default(),
        profile
            .map(|p| p.dropoff_location.name())
            .unwrap_or(NOT_SET)
            .to_string(),
        profile
            .map(|p| p.payment_choice.label())
            .unwrap_or(NOT_SET)
            .to_string(),
        if user.is_active { "Active" } else { "Inactive" }.to_string(),
        yes_no(user.is_staff).to_string(),
        user.date_joined.as_ref().map(timestamp).unwrap_or_default(),
    ]
}

/// Most recently joined first; members without a join date go last.
pub fn sort_roster(members: &mut [Member]) {
    members.sort_by(|a, b| {
        b.user
            .date_joined
            .cmp(&a.user.date_joined)
            .then_with(|| a.user.username.cmp(&b.user.username))
    });
}

pub fn write_members_csv<W: Write>(members: &[Member], out: W) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(MEMBERS_CSV_HEADER)?;
    for member in members {
        writer.write_record(member_row(member))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn members_to_csv_bytes(members: &[Member]) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    write_members_csv(members, &mut buf)?;
    Ok(buf)
}
