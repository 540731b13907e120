//! Catch-all trigger that ends every registry.

use crate::error::AppResult;
use crate::message::InboundMessage;
use crate::reply::ReplyPayload;
use crate::triggers::Trigger;
use async_trait::async_trait;

pub(crate) const DEFAULT_TEXT: &str =
    "Sorry, I didn't understand that. Say `help` to see what I can do.";

pub struct DefaultTrigger;

impl DefaultTrigger {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DefaultTrigger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Trigger for DefaultTrigger {
    fn name(&self) -> &str {
        "default"
    }

    fn is_default(&self) -> bool {
        true
    }

    fn matches(&self, _message: &InboundMessage) -> bool {
        true
    }

    async fn respond(&self, _message: &InboundMessage, _room_id: &str) -> AppResult<ReplyPayload> {
        Ok(ReplyPayload::markdown(DEFAULT_TEXT))
    }
}
