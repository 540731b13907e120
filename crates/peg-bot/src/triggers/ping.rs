//! Ping command - liveness check.

use crate::error::AppResult;
use crate::matcher::CommandMatcher;
use crate::message::InboundMessage;
use crate::reply::ReplyPayload;
use crate::triggers::Trigger;
use async_trait::async_trait;

pub struct PingTrigger {
    matcher: CommandMatcher,
}

impl PingTrigger {
    pub fn new(matcher: CommandMatcher) -> Self {
        Self { matcher }
    }
}

#[async_trait]
impl Trigger for PingTrigger {
    fn name(&self) -> &str {
        "ping"
    }

    fn matches(&self, message: &InboundMessage) -> bool {
        self.matcher.matches(message)
    }

    async fn respond(&self, _message: &InboundMessage, _room_id: &str) -> AppResult<ReplyPayload> {
        Ok(ReplyPayload::markdown("pong. I'm alive!"))
    }
}
