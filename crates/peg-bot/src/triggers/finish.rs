//! Finish command - announces the final leaderboard and starts a new round.

use crate::error::AppResult;
use crate::matcher::CommandMatcher;
use crate::message::InboundMessage;
use crate::reply::ReplyPayload;
use crate::triggers::winners::leaderboard_table;
use crate::triggers::{RoleGate, Trigger, FINISH_FILES};
use async_trait::async_trait;
use peg_store::{PegStore, Settings};
use std::sync::Arc;
use tracing::info;

pub struct FinishTrigger {
    matcher: CommandMatcher,
    gate: RoleGate,
    store: Arc<PegStore>,
    settings: Arc<Settings>,
}

impl FinishTrigger {
    pub fn new(
        matcher: CommandMatcher,
        gate: RoleGate,
        store: Arc<PegStore>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            matcher,
            gate,
            store,
            settings,
        }
    }
}

#[async_trait]
impl Trigger for FinishTrigger {
    fn name(&self) -> &str {
        "finish"
    }

    fn has_permission(&self, sender_id: &str) -> bool {
        self.gate.allows(sender_id)
    }

    fn matches(&self, message: &InboundMessage) -> bool {
        self.matcher.matches(message)
    }

    async fn respond(&self, message: &InboundMessage, _room_id: &str) -> AppResult<ReplyPayload> {
        // Ranked and cleared under one lock.
        let round = self.store.finish_round().await?;

        let Some(table) = leaderboard_table(&round.leaderboard, &self.store, &self.settings).await
        else {
            return Ok(ReplyPayload::markdown(
                "No pegs were given this round, so there is nothing to finish.",
            ));
        };

        let total = round.total;
        info!("Round finished by {} with {} pegs", message.sender_id, total);

        let text = format!(
            "**This round is over!** Pegs given: {}. Congratulations to the winners:\n\n{}\n\nA new round starts now.",
            total, table
        );

        Ok(ReplyPayload::markdown(text).with_files(self.settings.get_string_config(FINISH_FILES)))
    }
}
