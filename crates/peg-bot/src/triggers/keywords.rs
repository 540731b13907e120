//! Keywords command - lists the words that tag a peg.

use crate::error::AppResult;
use crate::matcher::CommandMatcher;
use crate::message::InboundMessage;
use crate::reply::ReplyPayload;
use crate::triggers::{Trigger, KEYWORDS};
use async_trait::async_trait;
use peg_store::Settings;
use std::sync::Arc;

pub struct KeywordsTrigger {
    matcher: CommandMatcher,
    settings: Arc<Settings>,
}

impl KeywordsTrigger {
    pub fn new(matcher: CommandMatcher, settings: Arc<Settings>) -> Self {
        Self { matcher, settings }
    }
}

#[async_trait]
impl Trigger for KeywordsTrigger {
    fn name(&self) -> &str {
        "keywords"
    }

    fn matches(&self, message: &InboundMessage) -> bool {
        self.matcher.matches(message)
    }

    async fn respond(&self, _message: &InboundMessage, _room_id: &str) -> AppResult<ReplyPayload> {
        let keywords = self.settings.get_string_config(KEYWORDS);

        if keywords.is_empty() {
            return Ok(ReplyPayload::markdown("No keywords are configured."));
        }

        let list = keywords
            .iter()
            .map(|k| format!("- #{}", k))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(ReplyPayload::markdown(format!(
            "**Keywords**\n\nMention one of these in a peg to tag it:\n{}",
            list
        )))
    }
}
