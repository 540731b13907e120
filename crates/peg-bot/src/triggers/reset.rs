//! Reset command - clears the peg ledger. Admin only.

use crate::error::AppResult;
use crate::matcher::CommandMatcher;
use crate::message::InboundMessage;
use crate::reply::ReplyPayload;
use crate::triggers::{RoleGate, Trigger};
use async_trait::async_trait;
use peg_store::PegStore;
use std::sync::Arc;
use tracing::warn;

pub struct ResetTrigger {
    matcher: CommandMatcher,
    gate: RoleGate,
    store: Arc<PegStore>,
}

impl ResetTrigger {
    pub fn new(matcher: CommandMatcher, gate: RoleGate, store: Arc<PegStore>) -> Self {
        Self {
            matcher,
            gate,
            store,
        }
    }
}

#[async_trait]
impl Trigger for ResetTrigger {
    fn name(&self) -> &str {
        "reset"
    }

    fn has_permission(&self, sender_id: &str) -> bool {
        self.gate.allows(sender_id)
    }

    fn matches(&self, message: &InboundMessage) -> bool {
        self.matcher.matches(message)
    }

    async fn respond(&self, message: &InboundMessage, _room_id: &str) -> AppResult<ReplyPayload> {
        let removed = self.store.reset().await?;
        warn!("Peg ledger reset by {} ({} pegs removed)", message.sender_id, removed);

        Ok(ReplyPayload::markdown(format!(
            "All pegs have been reset ({} removed). Everyone can give pegs again.",
            removed
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::ArgumentPolicy;
    use crate::triggers::test_support::*;

    #[tokio::test]
    async fn test_reset_requires_admin() {
        let store = PegStore::in_memory();
        store.give_peg("alice", "bob", "x", vec![]).await.unwrap();
        let trigger = ResetTrigger::new(
            room_matcher("reset", ArgumentPolicy::Exact),
            RoleGate::admin(settings()),
            store.clone(),
        );

        assert!(!trigger.is_triggered(&room_message("alice", " reset", &[])));

        let message = room_message("admin-user", " reset", &[]);
        assert!(trigger.is_triggered(&message));

        let reply = trigger.respond(&message, "room-1").await.unwrap();
        assert!(reply.markdown.starts_with("All pegs have been reset (1 removed)"));
        assert_eq!(store.peg_count().await, 0);
    }
}
