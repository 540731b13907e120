//! Inbound messages as seen by the dispatcher.

use webex_client::{Message, RoomType};

/// Where a message was posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Shared room; the bot must be mentioned explicitly.
    Room,
    /// One-to-one conversation with the bot.
    Direct,
}

/// A fully resolved inbound message.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: String,
    pub sender_id: String,
    pub sender_email: Option<String>,
    pub room_id: String,
    pub channel: Channel,
    /// Rich markup body. Room matchers read this.
    pub html: Option<String>,
    /// Plain text body. Direct matchers read this.
    pub text: String,
    pub mentioned_ids: Vec<String>,
}

impl InboundMessage {
    /// A room message carrying mention markup.
    pub fn room(
        sender_id: impl Into<String>,
        room_id: impl Into<String>,
        html: impl Into<String>,
        mentioned_ids: Vec<String>,
    ) -> Self {
        let html = html.into();
        Self {
            id: String::new(),
            sender_id: sender_id.into(),
            sender_email: None,
            room_id: room_id.into(),
            channel: Channel::Room,
            text: html.clone(),
            html: Some(html),
            mentioned_ids,
        }
    }

    /// A direct message with a plain text body.
    pub fn direct(
        sender_id: impl Into<String>,
        room_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            sender_id: sender_id.into(),
            sender_email: None,
            room_id: room_id.into(),
            channel: Channel::Direct,
            html: None,
            text: text.into(),
            mentioned_ids: Vec::new(),
        }
    }

    /// Convert a platform message. Messages without any text body are skipped.
    pub fn from_webex(message: &Message) -> Option<Self> {
        let text = message
            .text
            .clone()
            .or_else(|| message.markdown.clone())?;

        let channel = match message.room_type {
            RoomType::Group => Channel::Room,
            RoomType::Direct => Channel::Direct,
        };

        Some(Self {
            id: message.id.clone(),
            sender_id: message.person_id.clone(),
            sender_email: message.person_email.clone(),
            room_id: message.room_id.clone(),
            channel,
            html: message.html.clone(),
            text,
            mentioned_ids: message.mentioned_people.clone(),
        })
    }

    /// First mentioned person other than `exclude_id`.
    pub fn first_mention_except(&self, exclude_id: &str) -> Option<&str> {
        self.mentioned_ids
            .iter()
            .map(String::as_str)
            .find(|id| *id != exclude_id)
    }
}
