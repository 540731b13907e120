//! Command matchers for room mentions and direct messages.

use crate::message::InboundMessage;
use crate::mention::MentionNormalizer;
use regex::Regex;
use std::sync::Arc;

/// Whether a room command accepts free-form text after the command word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentPolicy {
    /// Only whitespace may surround the command word.
    Exact,
    /// The command word must lead; anything may follow it.
    Trailing,
}

/// Decides whether an inbound message activates a command.
#[derive(Debug, Clone)]
pub enum CommandMatcher {
    /// Room message: leading bot mention, then the command.
    Mention {
        normalizer: Arc<MentionNormalizer>,
        command: Regex,
    },
    /// Direct message: the whole trimmed text is the command.
    Direct { command: String },
}

impl CommandMatcher {
    pub fn room(
        normalizer: Arc<MentionNormalizer>,
        command: &str,
        policy: ArgumentPolicy,
    ) -> Result<Self, regex::Error> {
        let word = regex::escape(command);
        let pattern = match policy {
            ArgumentPolicy::Exact => format!(r"(?i)^\s*{}\s*$", word),
            ArgumentPolicy::Trailing => format!(r"(?i)^\s*{}(?:\s|$)", word),
        };

        Ok(Self::Mention {
            normalizer,
            command: Regex::new(&pattern)?,
        })
    }

    pub fn direct(command: &str) -> Self {
        Self::Direct {
            command: command.to_lowercase(),
        }
    }

    pub fn matches(&self, message: &InboundMessage) -> bool {
        match self {
            Self::Mention {
                normalizer,
                command,
            } => message
                .html
                .as_deref()
                .and_then(|html| normalizer.command_text(html))
                .is_some_and(|text| command.is_match(text)),
            Self::Direct { command } => message.text.trim().to_lowercase() == *command,
        }
    }

    /// Markup following the command word, for commands that take arguments.
    pub fn arguments<'a>(&self, message: &'a InboundMessage) -> Option<&'a str> {
        match self {
            Self::Mention {
                normalizer,
                command,
            } => {
                let text = normalizer.command_text(message.html.as_deref()?)?;
                let found = command.find(text)?;
                Some(&text[found.end()..])
            }
            Self::Direct { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mention::{mention_markup, BotIdentity};

    fn bot() -> BotIdentity {
        BotIdentity::new("bot-id", "Peggy")
    }

    fn room_matcher(command: &str, policy: ArgumentPolicy) -> CommandMatcher {
        let normalizer = Arc::new(MentionNormalizer::new(&bot()).unwrap());
        CommandMatcher::room(normalizer, command, policy).unwrap()
    }

    fn room_message(command_text: &str) -> InboundMessage {
        InboundMessage::room(
            "alice",
            "room-1",
            format!("<p>{}{}</p>", bot().mention_markup(), command_text),
            vec!["bot-id".into()],
        )
    }

    #[test]
    fn test_exact_command_with_whitespace() {
        let matcher = room_matcher("winners", ArgumentPolicy::Exact);

        assert!(matcher.matches(&room_message("winners")));
        assert!(matcher.matches(&room_message(" winners")));
        assert!(matcher.matches(&room_message("  winners  ")));
        assert!(matcher.matches(&room_message(" WINNERS")));
    }

    #[test]
    fn test_exact_command_rejects_suffix_and_prefix() {
        let matcher = room_matcher("winners", ArgumentPolicy::Exact);

        assert!(!matcher.matches(&room_message(" asdfwinners")));
        assert!(!matcher.matches(&room_message(" winnersasdf")));
        assert!(!matcher.matches(&room_message(" winners me")));
    }

    #[test]
    fn test_exact_command_without_paragraph() {
        let matcher = room_matcher("status", ArgumentPolicy::Exact);
        let message = InboundMessage::room(
            "alice",
            "room-1",
            format!("{} status", bot().mention_markup()),
            vec![],
        );

        assert!(matcher.matches(&message));
    }

    #[test]
    fn test_trailing_command_accepts_arguments() {
        let matcher = room_matcher("unpeg", ArgumentPolicy::Trailing);

        assert!(matcher.matches(&room_message(" unpeg")));
        assert!(matcher.matches(&room_message(" unpeg someone for reasons")));
        assert!(!matcher.matches(&room_message(" asdfunpeg someone")));
    }

    #[test]
    fn test_trailing_command_rejects_longer_word() {
        let matcher = room_matcher("peg", ArgumentPolicy::Trailing);

        assert!(matcher.matches(&room_message(" PEG")));
        assert!(!matcher.matches(&room_message(" pegs")));
        assert!(!matcher.matches(&room_message(" pegasus")));
        assert!(!matcher.matches(&room_message(" peggy rocks")));
    }

    #[test]
    fn test_other_mention_does_not_match() {
        let matcher = room_matcher("winners", ArgumentPolicy::Exact);
        let message = InboundMessage::room(
            "alice",
            "room-1",
            format!("<p>{} winners</p>", mention_markup("other-id", "Peggy")),
            vec!["other-id".into()],
        );

        assert!(!matcher.matches(&message));
    }

    #[test]
    fn test_room_matcher_ignores_plain_text_message() {
        let matcher = room_matcher("status", ArgumentPolicy::Exact);
        assert!(!matcher.matches(&InboundMessage::direct("alice", "dm", "status")));
    }

    #[test]
    fn test_direct_matcher() {
        let matcher = CommandMatcher::direct("status");

        assert!(matcher.matches(&InboundMessage::direct("alice", "dm", "status")));
        assert!(matcher.matches(&InboundMessage::direct("alice", "dm", "Status")));
        assert!(matcher.matches(&InboundMessage::direct("alice", "dm", " status ")));
        assert!(!matcher.matches(&InboundMessage::direct("alice", "dm", "sstatus")));
        assert!(!matcher.matches(&InboundMessage::direct("alice", "dm", "status please")));
    }

    #[test]
    fn test_arguments_after_command() {
        let matcher = room_matcher("peg", ArgumentPolicy::Trailing);
        let message = room_message(" peg bob for the demo");

        assert_eq!(matcher.arguments(&message), Some("bob for the demo"));
    }
}
