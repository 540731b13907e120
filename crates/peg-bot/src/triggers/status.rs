//! Status command - privately tells the sender how many pegs they have left.

use crate::error::AppResult;
use crate::format::pegs;
use crate::matcher::CommandMatcher;
use crate::message::InboundMessage;
use crate::reply::ReplyPayload;
use crate::triggers::{pegs_left, Trigger};
use async_trait::async_trait;
use peg_store::{PegStore, Settings};
use std::sync::Arc;
use tracing::info;

pub struct StatusTrigger {
    matcher: CommandMatcher,
    store: Arc<PegStore>,
    settings: Arc<Settings>,
}

impl StatusTrigger {
    pub fn new(matcher: CommandMatcher, store: Arc<PegStore>, settings: Arc<Settings>) -> Self {
        Self {
            matcher,
            store,
            settings,
        }
    }
}

#[async_trait]
impl Trigger for StatusTrigger {
    fn name(&self) -> &str {
        "status"
    }

    fn matches(&self, message: &InboundMessage) -> bool {
        self.matcher.matches(message)
    }

    async fn respond(&self, message: &InboundMessage, _room_id: &str) -> AppResult<ReplyPayload> {
        let sender = &message.sender_id;
        let given = self.store.given_by(sender).await;
        let left = pegs_left(&self.settings, given.len());

        info!("Status for {}: {} given, {} left", sender, given.len(), left);

        let mut lines = vec![format!("You have {} left to give.", pegs(left))];

        if !given.is_empty() {
            lines.push(String::new());
            lines.push("Pegs you have given this round:".into());
            for peg in &given {
                let name = self.store.display_name(&peg.recipient).await;
                if peg.comment.is_empty() {
                    lines.push(format!("- **{}**", name));
                } else {
                    lines.push(format!("- **{}**: {}", name, peg.comment));
                }
            }
        }

        Ok(ReplyPayload::direct(sender.clone(), lines.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::ArgumentPolicy;
    use crate::reply::RoomTarget;
    use crate::triggers::test_support::*;
    use peg_store::User;

    #[tokio::test]
    async fn test_status_without_pegs() {
        let trigger = StatusTrigger::new(
            room_matcher("status", ArgumentPolicy::Exact),
            PegStore::in_memory(),
            settings(),
        );
        let message = room_message("alice", " status", &[]);

        assert!(trigger.matches(&message));
        let reply = trigger.respond(&message, "room-1").await.unwrap();

        assert_eq!(reply.markdown, "You have 3 pegs left to give.");
        assert_eq!(reply.to_person_id.as_deref(), Some("alice"));
        assert_eq!(reply.room, RoomTarget::Suppressed);
    }

    #[tokio::test]
    async fn test_status_lists_given_pegs() {
        let store = PegStore::in_memory();
        store.upsert_user(User::new("bob", "Bob")).await.unwrap();
        store.give_peg("alice", "bob", "for the demo", vec![]).await.unwrap();
        let trigger = StatusTrigger::new(CommandMatcher::direct("status"), store, settings());

        let reply = trigger
            .respond(&InboundMessage::direct("alice", "dm", "status"), "dm")
            .await
            .unwrap();

        assert!(reply.markdown.starts_with("You have 2 pegs left to give."));
        assert!(reply.markdown.contains("- **Bob**: for the demo"));
    }
}
