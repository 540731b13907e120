//! Reply payloads produced by triggers.

use webex_client::CreateMessage;

/// Text of the reply returned when dispatch fails for any reason.
pub const FALLBACK_REPLY: &str = "Sorry, something went wrong. Please try again later.";

/// Room routing for a reply.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RoomTarget {
    /// Post to the room the message came from.
    #[default]
    Default,
    /// Do not post to any room; used with `to_person_id`.
    Suppressed,
    /// Post to a specific room.
    Room(String),
}

/// The structured reply a trigger produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPayload {
    pub markdown: String,
    pub to_person_id: Option<String>,
    pub room: RoomTarget,
    pub files: Vec<String>,
}

impl ReplyPayload {
    /// Reply in the originating room.
    pub fn markdown(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            to_person_id: None,
            room: RoomTarget::Default,
            files: Vec::new(),
        }
    }

    /// Reply privately to a person instead of the room.
    pub fn direct(person_id: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            to_person_id: Some(person_id.into()),
            room: RoomTarget::Suppressed,
            files: Vec::new(),
        }
    }

    /// The generic dispatch failure reply.
    pub fn fallback() -> Self {
        Self::markdown(FALLBACK_REPLY)
    }

    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.markdown.trim().is_empty()
    }

    /// Merge with the originating room into a send request.
    pub fn into_request(self, default_room_id: &str) -> CreateMessage {
        let room_id = match self.room {
            RoomTarget::Default => Some(default_room_id.to_string()),
            RoomTarget::Suppressed => None,
            RoomTarget::Room(room_id) => Some(room_id),
        };

        CreateMessage {
            room_id,
            to_person_id: self.to_person_id,
            markdown: self.markdown,
            files: self.files,
        }
    }
}
