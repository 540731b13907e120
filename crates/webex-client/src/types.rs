//! Webex API types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of room a message was posted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Group,
    Direct,
}

/// A message resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub room_id: String,
    pub room_type: RoomType,
    pub person_id: String,
    #[serde(default)]
    pub person_email: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub mentioned_people: Vec<String>,
    #[serde(default)]
    pub files: Vec<String>,
    pub created: DateTime<Utc>,
}

/// Outgoing message request.
///
/// Exactly one of `room_id` or `to_person_id` should be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_person_id: Option<String>,
    pub markdown: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

impl CreateMessage {
    /// A plain markdown message to a room.
    pub fn to_room(room_id: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            room_id: Some(room_id.into()),
            markdown: markdown.into(),
            ..Default::default()
        }
    }
}

/// A person resource (only the fields the bot reads).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub emails: Vec<String>,
}

/// A room membership.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: String,
    pub room_id: String,
    pub person_id: String,
    #[serde(default)]
    pub person_email: Option<String>,
    #[serde(default)]
    pub person_display_name: Option<String>,
    #[serde(default)]
    pub is_moderator: bool,
}

/// Envelope for list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
}

/// A room resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub room_type: RoomType,
}
