//! Unpeg command - takes back the sender's latest peg to the mentioned person.

use crate::error::AppResult;
use crate::format::pegs;
use crate::matcher::CommandMatcher;
use crate::message::InboundMessage;
use crate::reply::ReplyPayload;
use crate::triggers::{pegs_left, Trigger};
use async_trait::async_trait;
use peg_store::{PegStore, Settings, StoreError};
use std::sync::Arc;
use tracing::info;

pub struct UnpegTrigger {
    matcher: CommandMatcher,
    bot_id: String,
    store: Arc<PegStore>,
    settings: Arc<Settings>,
}

impl UnpegTrigger {
    pub fn new(
        matcher: CommandMatcher,
        bot_id: impl Into<String>,
        store: Arc<PegStore>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            matcher,
            bot_id: bot_id.into(),
            store,
            settings,
        }
    }
}

#[async_trait]
impl Trigger for UnpegTrigger {
    fn name(&self) -> &str {
        "unpeg"
    }

    fn matches(&self, message: &InboundMessage) -> bool {
        self.matcher.matches(message)
    }

    async fn respond(&self, message: &InboundMessage, _room_id: &str) -> AppResult<ReplyPayload> {
        let sender = &message.sender_id;

        let Some(recipient) = message.first_mention_except(&self.bot_id) else {
            return Ok(ReplyPayload::markdown(
                "Whose peg should I take back? Mention them like this: `unpeg @person`.",
            ));
        };

        let recipient_name = self.store.display_name(recipient).await;

        match self.store.take_back_peg(sender, recipient).await {
            Ok(peg) => {
                info!("{} took back peg #{}", sender, peg.id);
                let left = pegs_left(&self.settings, self.store.given_count(sender).await);
                Ok(ReplyPayload::markdown(format!(
                    "Took back your peg for **{}**. You have {} left to give.",
                    recipient_name,
                    pegs(left)
                )))
            }
            Err(StoreError::NoPegToTakeBack { .. }) => Ok(ReplyPayload::markdown(format!(
                "You haven't given **{}** a peg this round.",
                recipient_name
            ))),
            Err(e) => Err(e.into()),
        }
    }
}
