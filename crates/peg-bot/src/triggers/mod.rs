//! Bot command triggers.

mod default;
mod finish;
mod help;
mod keywords;
mod peg;
mod ping;
mod reset;
mod status;
mod unpeg;
mod update;
mod welcome;
mod winners;

pub use default::DefaultTrigger;
pub use finish::FinishTrigger;
pub use help::HelpTrigger;
pub use keywords::KeywordsTrigger;
pub use peg::PegTrigger;
pub use ping::PingTrigger;
pub use reset::ResetTrigger;
pub use status::StatusTrigger;
pub use unpeg::UnpegTrigger;
pub use update::{MembershipSource, UpdateTrigger};
pub use welcome::WelcomeTrigger;
pub use winners::WinnersTrigger;

#[cfg(test)]
pub use update::MockMembershipSource;

use crate::error::AppResult;
use crate::message::InboundMessage;
use crate::reply::ReplyPayload;
use async_trait::async_trait;
use peg_store::Settings;
use std::sync::Arc;

/// Pegs each person may give per round.
pub const PEGS_PER_PERSON: &str = "pegs_per_person";
/// Leaderboard length for `winners` and `finish`.
pub const WINNERS_COUNT: &str = "winners_count";
/// Words that tag a peg.
pub const KEYWORDS: &str = "keywords";
/// Files attached to the `finish` announcement.
pub const FINISH_FILES: &str = "finish_files";

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_WINNERS: &str = "winners";

/// A command handler: permission check, matcher and response producer.
#[async_trait]
pub trait Trigger: Send + Sync {
    /// Command name (e.g., "status", "peg").
    fn name(&self) -> &str;

    /// Whether this is the catch-all trigger that ends a registry.
    fn is_default(&self) -> bool {
        false
    }

    /// Whether the sender may use this trigger at all.
    fn has_permission(&self, _sender_id: &str) -> bool {
        true
    }

    /// Check if the message text activates this trigger.
    fn matches(&self, message: &InboundMessage) -> bool;

    /// Permission first, then the text match.
    fn is_triggered(&self, message: &InboundMessage) -> bool {
        self.has_permission(&message.sender_id) && self.matches(message)
    }

    /// Produce the reply. Only called after `is_triggered` returned true.
    async fn respond(&self, message: &InboundMessage, room_id: &str) -> AppResult<ReplyPayload>;
}

/// Grants access to holders of any of a fixed set of roles.
#[derive(Clone)]
pub struct RoleGate {
    settings: Arc<Settings>,
    roles: &'static [&'static str],
}

impl RoleGate {
    pub fn new(settings: Arc<Settings>, roles: &'static [&'static str]) -> Self {
        Self { settings, roles }
    }

    pub fn admin(settings: Arc<Settings>) -> Self {
        Self::new(settings, &[ROLE_ADMIN])
    }

    pub fn allows(&self, person_id: &str) -> bool {
        self.roles
            .iter()
            .any(|role| self.settings.check_role(person_id, role))
    }
}

/// Pegs `sender` may still give, never negative.
pub(crate) fn pegs_left(settings: &Settings, given: usize) -> i64 {
    (settings.get_config(PEGS_PER_PERSON) - given as i64).max(0)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::matcher::{ArgumentPolicy, CommandMatcher};
    use crate::mention::{mention_markup, BotIdentity, MentionNormalizer};
    use crate::message::InboundMessage;
    use peg_store::Settings;
    use std::sync::Arc;

    pub const BOT_ID: &str = "bot-id";

    pub fn bot() -> BotIdentity {
        BotIdentity::new(BOT_ID, "Peggy")
    }

    pub fn room_matcher(command: &str, policy: ArgumentPolicy) -> CommandMatcher {
        let normalizer = Arc::new(MentionNormalizer::new(&bot()).unwrap());
        CommandMatcher::room(normalizer, command, policy).unwrap()
    }

    /// Room message from `sender`: bot mention followed by `command_html`.
    pub fn room_message(sender: &str, command_html: &str, mentioned: &[&str]) -> InboundMessage {
        let mut mentioned_ids = vec![BOT_ID.to_string()];
        mentioned_ids.extend(mentioned.iter().map(|id| id.to_string()));
        InboundMessage::room(
            sender,
            "room-1",
            format!("<p>{}{}</p>", bot().mention_markup(), command_html),
            mentioned_ids,
        )
    }

    pub fn mention(id: &str, name: &str) -> String {
        mention_markup(id, name)
    }

    pub fn settings() -> Arc<Settings> {
        let settings = Settings::new();
        settings.set_config(super::PEGS_PER_PERSON, 3);
        settings.set_config(super::WINNERS_COUNT, 2);
        settings.set_string_config(super::KEYWORDS, vec!["teamwork".into(), "care".into()]);
        settings.grant_role("admin-user", super::ROLE_ADMIN);
        Arc::new(settings)
    }
}
