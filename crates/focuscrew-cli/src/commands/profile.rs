use clap::Subcommand;
use focuscrew_core::{Config, Profile, UserId};

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Create a profile and make it the default account if none is set
    Create {
        /// Display name (1-32 characters)
        nickname: String,
        /// Use this id instead of a generated one
        #[arg(long)]
        id: Option<String>,
        /// Profile image URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Show a profile (your own if no id is given)
    Show {
        id: Option<String>,
    },
    /// Change your nickname
    Rename {
        nickname: String,
    },
    /// Set your profile image URL, or clear it when omitted
    SetImage {
        url: Option<String>,
    },
    /// Delete your account with its sessions, streaks and friendships
    Delete,
}

pub fn run(action: ProfileAction, ctx: &Context) -> CmdResult {
    let db = ctx.open_db()?;

    match action {
        ProfileAction::Create { nickname, id, image } => {
            let id = id.map(UserId::from).unwrap_or_else(UserId::generate);
            let mut profile = Profile::new(id, &nickname)?;
            profile.image_url = image;
            db.create_profile(&profile)?;

            if ctx.config.account.user_id.is_none() {
                let mut config = Config::load()?;
                config.set("account.user_id", profile.id.as_str())?;
                eprintln!("default account set to {}", profile.id);
            }
            print_json(&profile)?;
        }
        ProfileAction::Show { id } => {
            let profile = match (id, ctx.user()) {
                (Some(id), Ok(viewer)) => db.profile_for_viewer(&viewer, &UserId::from(id))?,
                (Some(id), Err(_)) => db.profile(&UserId::from(id))?,
                (None, viewer) => db.profile(&viewer?)?,
            };
            print_json(&profile)?;
        }
        ProfileAction::Rename { nickname } => {
            let me = ctx.user()?;
            db.rename(&me, &nickname)?;
            print_json(&db.profile(&me)?)?;
        }
        ProfileAction::SetImage { url } => {
            let me = ctx.user()?;
            db.set_image_url(&me, url.as_deref())?;
            print_json(&db.profile(&me)?)?;
        }
        ProfileAction::Delete => {
            let me = ctx.user()?;
            db.delete_account(&me)?;
            if ctx.config.current_user().as_ref() == Some(&me) {
                let mut config = Config::load()?;
                config.set("account.user_id", "none")?;
            }
            println!("account {me} deleted");
        }
    }
    Ok(())
}
