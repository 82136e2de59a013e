//! `tradeboard member set|list|remove`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use tradeboard_core::{
    edit, store, DropoffLocation, Member, PaymentChoice, Profile, StoreError, Username,
};

use super::home;

#[derive(Subcommand, Debug)]
pub enum MemberCommand {
    /// Create a member or update the given fields of an existing one.
    Set(SetArgs),

    /// List every member.
    List,

    /// Delete a member and every game they listed. Staff only.
    Remove(RemoveArgs),
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    pub username: String,

    /// Staff member performing the removal.
    #[arg(long = "as", value_name = "USER")]
    pub actor: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    pub username: String,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    /// Grant staff rights (admin edits).
    #[arg(long)]
    pub staff: bool,

    /// Revoke staff rights.
    #[arg(long, conflicts_with = "staff")]
    pub no_staff: bool,

    /// Mark the account inactive.
    #[arg(long)]
    pub deactivate: bool,

    /// Mark the account active again.
    #[arg(long, conflicts_with = "deactivate")]
    pub activate: bool,

    /// Public name shown instead of the username (max 20 characters).
    #[arg(long)]
    pub display_name: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// Abington | Norton | Saugus | Framingham
    #[arg(long)]
    pub dropoff: Option<DropoffLocation>,

    /// cash_40 | credit_70
    #[arg(long)]
    pub payment: Option<PaymentChoice>,

    /// Free-form note on the profile.
    #[arg(long)]
    pub info: Option<String>,
}

pub fn run(cmd: MemberCommand) -> Result<()> {
    match cmd {
        MemberCommand::Set(args) => set(args),
        MemberCommand::List => list(),
        MemberCommand::Remove(args) => remove(args),
    }
}

fn set(args: SetArgs) -> Result<()> {
    let home = home()?;
    let username = Username::from(args.username.as_str());
    let (mut member, created) = match store::load_member_at(&home, &username) {
        Ok(member) => (member, false),
        Err(StoreError::MemberNotFound(_)) => (Member::new(username.clone()), true),
        Err(e) => return Err(e).context("failed to load member"),
    };

    if let Some(v) = args.first_name {
        member.user.first_name = v;
    }
    if let Some(v) = args.last_name {
        member.user.last_name = v;
    }
    if let Some(v) = args.email {
        member.user.email = v;
    }
    if args.staff {
        member.user.is_staff = true;
    }
    if args.no_staff {
        member.user.is_staff = false;
    }
    if args.deactivate {
        member.user.is_active = false;
    }
    if args.activate {
        member.user.is_active = true;
    }

    let touches_profile = args.display_name.is_some()
        || args.phone.is_some()
        || args.dropoff.is_some()
        || args.payment.is_some()
        || args.info.is_some();
    if touches_profile {
        let profile = member.profile.get_or_insert_with(Profile::default);
        if let Some(v) = args.display_name {
            profile.display_name = Some(v).filter(|s| !s.is_empty());
        }
        if let Some(v) = args.phone {
            profile.phone_number = Some(v).filter(|s| !s.is_empty());
        }
        if let Some(v) = args.dropoff {
            profile.dropoff_location = v;
        }
        if let Some(v) = args.payment {
            profile.payment_choice = v;
        }
        if let Some(v) = args.info {
            profile.info = Some(v).filter(|s| !s.is_empty());
        }
    }

    store::save_member_at(&home, &member)
        .with_context(|| format!("failed to save member '{username}'"))?;
    let verb = if created { "Created" } else { "Updated" };
    println!("✓ {verb} member '{username}'");
    Ok(())
}

fn remove(args: RemoveArgs) -> Result<()> {
    let home = home()?;
    let username = Username::from(args.username.as_str());
    let target = store::load_member_at(&home, &username)
        .with_context(|| format!("unknown member '{username}'"))?;
    let actor = store::load_member_at(&home, &Username::from(args.actor.as_str()))
        .with_context(|| format!("unknown member '{}'", args.actor))?;

    edit::can_delete_member(&target.user, &actor.user)?;
    let games = store::delete_member_at(&home, &username)
        .with_context(|| format!("failed to delete member '{username}'"))?;

    println!("✓ Member '{username}' has been deleted ({games} games removed)");
    Ok(())
}

#[derive(Tabled)]
struct MemberRow {
    #[tabled(rename = "username")]
    username: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "email")]
    email: String,
    #[tabled(rename = "staff")]
    staff: String,
    #[tabled(rename = "drop-off")]
    dropoff: String,
    #[tabled(rename = "payment")]
    payment: String,
}

fn list() -> Result<()> {
    let home = home()?;
    let members = store::list_members_at(&home).context("failed to load members")?;
    if members.is_empty() {
        println!("No members yet.");
        println!("Run: tradeboard member set <username>");
        return Ok(());
    }

    let rows: Vec<MemberRow> = members
        .iter()
        .map(|m| MemberRow {
            username: m.user.username.to_string(),
            name: format!("{} {}", m.user.first_name, m.user.last_name)
                .trim()
                .to_string(),
            email: m.user.email.clone(),
            staff: if m.user.is_staff { "yes" } else { "" }.to_string(),
            dropoff: m
                .profile
                .as_ref()
                .map(|p| p.dropoff_location.name().to_string())
                .unwrap_or_default(),
            payment: m
                .profile
                .as_ref()
                .map(|p| p.payment_choice.code().to_string())
                .unwrap_or_default(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}
