//! Winners command - privately sends the current leaderboard.

use crate::error::AppResult;
use crate::format::markdown_table;
use crate::matcher::CommandMatcher;
use crate::message::InboundMessage;
use crate::reply::ReplyPayload;
use crate::triggers::{RoleGate, Trigger, WINNERS_COUNT};
use async_trait::async_trait;
use peg_store::{LeaderboardEntry, PegStore, Settings};
use std::sync::Arc;

const DEFAULT_WINNERS_COUNT: usize = 3;

pub struct WinnersTrigger {
    matcher: CommandMatcher,
    gate: RoleGate,
    store: Arc<PegStore>,
    settings: Arc<Settings>,
}

impl WinnersTrigger {
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

/// Table of the top `winners_count` entries of `board`, or `None` when
/// nobody has received a peg.
pub(crate) async fn leaderboard_table(
    board: &[LeaderboardEntry],
    store: &PegStore,
    settings: &Settings,
) -> Option<String> {
    if board.is_empty() {
        return None;
    }

    let limit = match settings.get_config(WINNERS_COUNT) {
        n if n > 0 => n as usize,
        _ => DEFAULT_WINNERS_COUNT,
    };

    let mut rows = Vec::new();
    for (rank, entry) in board.iter().take(limit).enumerate() {
        rows.push(vec![
            (rank + 1).to_string(),
            store.display_name(&entry.person_id).await,
            entry.pegs.to_string(),
            entry.keyword_pegs.to_string(),
        ]);
    }

    Some(markdown_table(&["#", "Name", "Pegs", "Tagged"], &rows))
}

#[async_trait]
impl Trigger for WinnersTrigger {
    fn name(&self) -> &str {
        "winners"
    }

    fn has_permission(&self, sender_id: &str) -> bool {
        self.gate.allows(sender_id)
    }

    fn matches(&self, message: &InboundMessage) -> bool {
        self.matcher.matches(message)
    }

    async fn respond(&self, message: &InboundMessage, _room_id: &str) -> AppResult<ReplyPayload> {
        let board = self.store.leaderboard().await;
        let text = match leaderboard_table(&board, &self.store, &self.settings).await {
            Some(table) => format!("**Current leaders**\n\n{}", table),
            None => "No pegs have been given yet.".to_string(),
        };

        Ok(ReplyPayload::direct(message.sender_id.clone(), text))
    }
}
