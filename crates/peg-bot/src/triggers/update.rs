//! Update command - refreshes the user directory from the room's members.

use crate::error::AppResult;
use crate::matcher::CommandMatcher;
use crate::message::InboundMessage;
use crate::reply::ReplyPayload;
use crate::triggers::{RoleGate, Trigger};
use async_trait::async_trait;
use peg_store::{PegStore, User};
use std::sync::Arc;
use tracing::{error, info};
use webex_client::WebexClient;

/// Source of the people in a room.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipSource: Send + Sync {
    async fn room_members(&self, room_id: &str) -> AppResult<Vec<User>>;
}

#[async_trait]
impl MembershipSource for WebexClient {
    async fn room_members(&self, room_id: &str) -> AppResult<Vec<User>> {
        let memberships = self.list_memberships(room_id).await?;

        Ok(memberships
            .into_iter()
            .map(|m| {
                let name = m
                    .person_display_name
                    .clone()
                    .or_else(|| m.person_email.clone())
                    .unwrap_or_else(|| m.person_id.clone());
                let user = User::new(m.person_id, name);
                match m.person_email {
                    Some(email) => user.with_email(email),
                    None => user,
                }
            })
            .collect())
    }
}

pub struct UpdateTrigger {
    matcher: CommandMatcher,
    gate: RoleGate,
    store: Arc<PegStore>,
    members: Arc<dyn MembershipSource>,
}

impl UpdateTrigger {
    pub fn new(
        matcher: CommandMatcher,
        gate: RoleGate,
        store: Arc<PegStore>,
        members: Arc<dyn MembershipSource>,
    ) -> Self {
        Self {
            matcher,
            gate,
            store,
            members,
        }
    }
}

#[async_trait]
impl Trigger for UpdateTrigger {
    fn name(&self) -> &str {
        "update"
    }

    fn has_permission(&self, sender_id: &str) -> bool {
        self.gate.allows(sender_id)
    }

    fn matches(&self, message: &InboundMessage) -> bool {
        self.matcher.matches(message)
    }

    async fn respond(&self, _message: &InboundMessage, room_id: &str) -> AppResult<ReplyPayload> {
        let users = match self.members.room_members(room_id).await {
            Ok(users) => users,
            Err(e) => {
                error!("Failed to list members of {}: {}", room_id, e);
                return Ok(ReplyPayload::markdown(
                    "I couldn't fetch the members of this room. Please try again later.",
                ));
            }
        };

        let count = self.store.upsert_users(users).await?;
        info!("Updated {} users from room {}", count, room_id);

        Ok(ReplyPayload::markdown(format!(
            "Updated {} people from this room.",
            count
        )))
    }
}
