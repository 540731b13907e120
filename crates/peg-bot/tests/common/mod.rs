//! Common test utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use peg_bot::mention::mention_markup;
use peg_bot::triggers::{MembershipSource, KEYWORDS, PEGS_PER_PERSON, ROLE_ADMIN, WINNERS_COUNT};
use peg_bot::{AppResult, BotIdentity, Collaborators, Dispatcher, InboundMessage};
use peg_store::{PegStore, Settings, User};
use std::sync::Arc;
use std::time::Duration;
use webex_client::WebexClient;
use wiremock::MockServer;

pub const BOT_ID: &str = "bot-id";
pub const BOT_NAME: &str = "Peggy";
pub const ROOM_ID: &str = "room-1";
pub const ADMIN_ID: &str = "admin-user";

/// Room members served from a fixed list.
pub struct StaticMembers(pub Vec<User>);

#[async_trait]
impl MembershipSource for StaticMembers {
    async fn room_members(&self, _room_id: &str) -> AppResult<Vec<User>> {
        Ok(self.0.clone())
    }
}

pub fn bot() -> BotIdentity {
    BotIdentity::new(BOT_ID, BOT_NAME)
}

pub fn test_settings() -> Arc<Settings> {
    let settings = Settings::new();
    settings.set_config(PEGS_PER_PERSON, 5);
    settings.set_config(WINNERS_COUNT, 3);
    settings.set_string_config(KEYWORDS, vec!["teamwork".into()]);
    settings.grant_role(ADMIN_ID, ROLE_ADMIN);
    Arc::new(settings)
}

pub fn collaborators(members: Arc<dyn MembershipSource>) -> Collaborators {
    Collaborators {
        bot: bot(),
        store: PegStore::in_memory(),
        settings: test_settings(),
        members,
    }
}

/// Dispatcher over an in-memory store with no known room members.
pub fn test_dispatcher() -> (Dispatcher, Collaborators) {
    let collaborators = collaborators(Arc::new(StaticMembers(Vec::new())));
    let dispatcher = Dispatcher::from_collaborators(&collaborators).unwrap();
    (dispatcher, collaborators)
}

pub fn mention(id: &str, name: &str) -> String {
    mention_markup(id, name)
}

/// Room message addressed to the bot, followed by `rest`.
pub fn room_message(sender: &str, rest: &str, also_mentioned: &[&str]) -> InboundMessage {
    let mut mentioned = vec![BOT_ID.to_string()];
    mentioned.extend(also_mentioned.iter().map(|id| id.to_string()));
    InboundMessage::room(
        sender,
        ROOM_ID,
        format!("<p>{}{}</p>", mention(BOT_ID, BOT_NAME), rest),
        mentioned,
    )
}

pub fn direct_message(sender: &str, text: &str) -> InboundMessage {
    InboundMessage::direct(sender, "dm-room", text)
}

/// Create a Webex client configured for a mock server.
pub fn test_webex_client(mock_server: &MockServer) -> WebexClient {
    WebexClient::new(mock_server.uri(), "test-token", Duration::from_secs(5)).unwrap()
}
