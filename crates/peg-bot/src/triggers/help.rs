//! Help command - lists available commands.

use crate::error::AppResult;
use crate::matcher::CommandMatcher;
use crate::message::InboundMessage;
use crate::reply::ReplyPayload;
use crate::triggers::Trigger;
use async_trait::async_trait;

const HELP_BODY: &str = r#"

**In a room** (mention me first):
- `peg @person for <reason>` - give someone a peg
- `unpeg @person` - take back the last peg you gave them
- `status` - how many pegs you have left (sent privately)
- `keywords` - words that tag a peg
- `help` - show this message
- `ping` - check that I'm alive

**In a direct message:** `status`, `keywords`, `help`, `ping`

**Admins:** `winners`, `finish`, `reset`, `update`"#;

pub struct HelpTrigger {
    matcher: CommandMatcher,
    text: String,
}

impl HelpTrigger {
    pub fn new(matcher: CommandMatcher, bot_name: &str) -> Self {
        Self {
            matcher,
            text: format!(
                "**{}** hands out pegs: small thank-yous to the people who helped you.{}",
                bot_name, HELP_BODY
            ),
        }
    }
}

#[async_trait]
impl Trigger for HelpTrigger {
    fn name(&self) -> &str {
        "help"
    }

    fn matches(&self, message: &InboundMessage) -> bool {
        self.matcher.matches(message)
    }

    async fn respond(&self, _message: &InboundMessage, _room_id: &str) -> AppResult<ReplyPayload> {
        Ok(ReplyPayload::markdown(self.text.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_help_names_the_bot() {
        let trigger = HelpTrigger::new(CommandMatcher::direct("help"), "Pegasus");

        let reply = trigger
            .respond(&InboundMessage::direct("alice", "dm", "help"), "dm")
            .await
            .unwrap();

        assert!(reply.markdown.starts_with("**Pegasus** hands out pegs"));
        assert!(reply.markdown.contains("`peg @person for <reason>`"));
    }
}
