//! Welcome command - introduces the bot to a room.

use crate::error::AppResult;
use crate::format::pegs;
use crate::matcher::CommandMatcher;
use crate::message::InboundMessage;
use crate::reply::ReplyPayload;
use crate::triggers::{Trigger, PEGS_PER_PERSON};
use async_trait::async_trait;
use peg_store::Settings;
use std::sync::Arc;

pub struct WelcomeTrigger {
    matcher: CommandMatcher,
    bot_name: String,
    settings: Arc<Settings>,
}

impl WelcomeTrigger {
    pub fn new(matcher: CommandMatcher, bot_name: impl Into<String>, settings: Arc<Settings>) -> Self {
        Self {
            matcher,
            bot_name: bot_name.into(),
            settings,
        }
    }
}

#[async_trait]
impl Trigger for WelcomeTrigger {
    fn name(&self) -> &str {
        "welcome"
    }

    fn matches(&self, message: &InboundMessage) -> bool {
        self.matcher.matches(message)
    }

    async fn respond(&self, _message: &InboundMessage, _room_id: &str) -> AppResult<ReplyPayload> {
        let allowance = self.settings.get_config(PEGS_PER_PERSON);

        Ok(ReplyPayload::markdown(format!(
            "Hi everyone! I'm {}. Each of you has **{}** to give this round. \
             Mention me with `peg @person for <reason>` to thank someone, \
             or `help` to see everything I can do.",
            self.bot_name,
            pegs(allowance)
        )))
    }
}
