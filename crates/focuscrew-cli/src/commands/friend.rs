use chrono::Utc;
use clap::Subcommand;
use focuscrew_core::{Event, UserId};
use serde_json::json;

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum FriendAction {
    /// Send a friend request
    Request { to: String },
    /// Accept a request someone sent you
    Accept { from: String },
    /// Reject a request someone sent you
    Reject { from: String },
    /// Withdraw a request you sent
    Cancel { to: String },
    /// Unfriend someone
    Remove { friend: String },
    /// List your friends
    List,
    /// Show pending requests, both directions
    Pending,
}

pub fn run(action: FriendAction, ctx: &Context) -> CmdResult {
    let db = ctx.open_db()?;
    let me = ctx.user()?;
    let at = Utc::now();

    match action {
        FriendAction::Request { to } => {
            let to = UserId::from(to);
            db.send_friend_request(&me, &to)?;
            print_json(&Event::FriendRequestSent { from: me, to, at })?;
        }
        FriendAction::Accept { from } => {
            let from = UserId::from(from);
            db.accept_friend_request(&me, &from)?;
            print_json(&Event::FriendRequestAccepted { from, to: me, at })?;
        }
        FriendAction::Reject { from } => {
            let from = UserId::from(from);
            db.reject_friend_request(&me, &from)?;
            print_json(&Event::FriendRequestRejected { from, to: me, at })?;
        }
        FriendAction::Cancel { to } => {
            let to = UserId::from(to);
            db.cancel_friend_request(&me, &to)?;
            print_json(&Event::FriendRequestCancelled { from: me, to, at })?;
        }
        FriendAction::Remove { friend } => {
            let friend = UserId::from(friend);
            db.remove_friend(&me, &friend)?;
            print_json(&Event::FriendRemoved { by: me, friend, at })?;
        }
        FriendAction::List => {
            print_json(&db.friends(&me)?)?;
        }
        FriendAction::Pending => {
            print_json(&json!({
                "incoming": db.incoming_requests(&me)?,
                "outgoing": db.outgoing_requests(&me)?,
            }))?;
        }
    }
    Ok(())
}
