//! Peg command - gives a peg to the mentioned person.

use crate::error::AppResult;
use crate::format::pegs;
use crate::matcher::CommandMatcher;
use crate::mention::{after_mention, strip_markup};
use crate::message::InboundMessage;
use crate::reply::ReplyPayload;
use crate::triggers::{pegs_left, Trigger, KEYWORDS, PEGS_PER_PERSON};
use async_trait::async_trait;
use peg_store::{PegStore, Settings, StoreError};
use std::sync::Arc;
use tracing::info;

pub struct PegTrigger {
    matcher: CommandMatcher,
    bot_id: String,
    store: Arc<PegStore>,
    settings: Arc<Settings>,
}

impl PegTrigger {
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

    /// Plain-text reason following the recipient mention.
    fn comment(&self, message: &InboundMessage, recipient: &str) -> String {
        let arguments = self.matcher.arguments(message).unwrap_or_default();
        strip_markup(after_mention(arguments, recipient).unwrap_or(arguments))
    }
}

/// Configured keywords that appear as words in `comment`, in configured order.
pub(crate) fn find_keywords(comment: &str, keywords: &[String]) -> Vec<String> {
    let words: Vec<String> = comment
        .split(|c: char| !(c.is_alphanumeric() || c == '#' || c == '-'))
        .map(|w| w.trim_start_matches('#').to_lowercase())
        .filter(|w| !w.is_empty())
        .collect();

    keywords
        .iter()
        .filter(|k| words.contains(&k.to_lowercase()))
        .cloned()
        .collect()
}

#[async_trait]
impl Trigger for PegTrigger {
    fn name(&self) -> &str {
        "peg"
    }

    fn matches(&self, message: &InboundMessage) -> bool {
        self.matcher.matches(message)
    }

    async fn respond(&self, message: &InboundMessage, _room_id: &str) -> AppResult<ReplyPayload> {
        let sender = &message.sender_id;

        let Some(recipient) = message.first_mention_except(&self.bot_id) else {
            return Ok(ReplyPayload::markdown(
                "Who should get the peg? Mention them like this: `peg @person for helping out`.",
            ));
        };

        let allowance = self.settings.get_config(PEGS_PER_PERSON).max(0) as usize;
        let comment = self.comment(message, recipient);
        let keywords = find_keywords(&comment, &self.settings.get_string_config(KEYWORDS));

        let peg = match self
            .store
            .give_peg_within(sender, recipient, &comment, keywords, allowance)
            .await
        {
            Ok(peg) => peg,
            Err(StoreError::SelfPeg) => {
                return Ok(ReplyPayload::markdown(
                    "Nice try, but you can't give a peg to yourself.",
                ));
            }
            Err(StoreError::NoPegsLeft { .. }) => {
                return Ok(ReplyPayload::markdown(
                    "You have no pegs left to give this round.",
                ));
            }
            Err(e) => return Err(e.into()),
        };

        info!("{} pegged {} (peg #{})", sender, recipient, peg.id);

        let sender_name = self.store.display_name(sender).await;
        let recipient_name = self.store.display_name(recipient).await;

        let mut text = format!("**{}** gave a peg to **{}**", sender_name, recipient_name);
        if !peg.comment.is_empty() {
            text.push_str(&format!(": {}", peg.comment));
        }
        if !peg.keywords.is_empty() {
            let tags: Vec<String> = peg.keywords.iter().map(|k| format!("#{}", k)).collect();
            text.push_str(&format!(" ({})", tags.join(", ")));
        }
        let left = pegs_left(&self.settings, self.store.given_count(sender).await);
        text.push_str(&format!("\n\n{} left to give.", pegs(left)));

        Ok(ReplyPayload::markdown(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::ArgumentPolicy;
    use crate::reply::RoomTarget;
    use crate::triggers::test_support::*;
    use peg_store::User;

    fn trigger(store: Arc<PegStore>) -> PegTrigger {
        PegTrigger::new(
            room_matcher("peg", ArgumentPolicy::Trailing),
            BOT_ID,
            store,
            settings(),
        )
    }

    fn peg_message(sender: &str, recipient: &str, reason: &str) -> InboundMessage {
        room_message(
            sender,
            &format!(" peg {} {}", mention(recipient, "Someone"), reason),
            &[recipient],
        )
    }

    #[tokio::test]
    async fn test_peg_recorded() {
        let store = PegStore::in_memory();
        store.upsert_user(User::new("alice", "Alice")).await.unwrap();
        store.upsert_user(User::new("bob", "Bob")).await.unwrap();
        let trigger = trigger(store.clone());
        let message = peg_message("alice", "bob", "for the #teamwork on the release");

        assert!(trigger.matches(&message));
        let reply = trigger.respond(&message, "room-1").await.unwrap();

        assert_eq!(reply.room, RoomTarget::Default);
        assert!(reply.markdown.starts_with("**Alice** gave a peg to **Bob**: for the #teamwork on the release (#teamwork)"));
        assert!(reply.markdown.ends_with("2 pegs left to give."));

        let received = store.received_by("bob").await;
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].comment, "for the #teamwork on the release");
        assert_eq!(received[0].keywords, vec!["teamwork".to_string()]);
    }

    #[tokio::test]
    async fn test_peg_without_recipient() {
        let store = PegStore::in_memory();
        let trigger = trigger(store.clone());

        let reply = trigger
            .respond(&room_message("alice", " peg", &[]), "room-1")
            .await
            .unwrap();

        assert!(reply.markdown.starts_with("Who should get the peg?"));
        assert_eq!(store.peg_count().await, 0);
    }

    #[tokio::test]
    async fn test_self_peg() {
        let store = PegStore::in_memory();
        let trigger = trigger(store.clone());

        let reply = trigger
            .respond(&peg_message("alice", "alice", "for me"), "room-1")
            .await
            .unwrap();

        assert!(reply.markdown.contains("can't give a peg to yourself"));
        assert_eq!(store.peg_count().await, 0);
    }

    #[tokio::test]
    async fn test_no_pegs_left() {
        let store = PegStore::in_memory();
        for recipient in ["b", "c", "d"] {
            store.give_peg("alice", recipient, "", vec![]).await.unwrap();
        }
        let trigger = trigger(store.clone());

        let reply = trigger
            .respond(&peg_message("alice", "bob", "again"), "room-1")
            .await
            .unwrap();

        assert_eq!(reply.markdown, "You have no pegs left to give this round.");
        assert_eq!(store.peg_count().await, 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_pegs_respect_allowance() {
        let store = PegStore::in_memory();
        let trigger = Arc::new(trigger(store.clone()));

        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let trigger = trigger.clone();
                tokio::spawn(async move {
                    let message = peg_message("alice", &format!("r{}", i), "thanks");
                    trigger.respond(&message, "room-1").await.unwrap()
                })
            })
            .collect();

        let mut refused = 0;
        for task in tasks {
            if task.await.unwrap().markdown == "You have no pegs left to give this round." {
                refused += 1;
            }
        }

        assert_eq!(store.given_count("alice").await, 3);
        assert_eq!(refused, 17);
    }

    #[test]
    fn test_find_keywords() {
        let keywords = vec!["Teamwork".to_string(), "care".to_string(), "grit".to_string()];

        assert_eq!(
            find_keywords("so much #care and teamwork!", &keywords),
            vec!["Teamwork".to_string(), "care".to_string()]
        );
        assert!(find_keywords("careful work", &keywords).is_empty());
    }
}
