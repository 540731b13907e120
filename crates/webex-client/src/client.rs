//! Webex HTTP client.

use crate::error::WebexError;
use crate::types::*;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use urlencoding::encode;

/// Webex REST API client.
///
/// The access token is stored using `SecretString` so it never ends up in
/// debug output.
#[derive(Clone)]
pub struct WebexClient {
    client: Client,
    base_url: String,
    access_token: SecretString,
}

impl WebexClient {
    /// Create a new Webex client.
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WebexError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: SecretString::new(access_token.into()),
        })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(self.access_token.expose_secret())
    }

    /// Check that the API is reachable and the token is accepted.
    pub async fn health_check(&self) -> bool {
        self.get("/people/me")
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// The bot's own person record.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<Person, WebexError> {
        let response = self.get("/people/me").send().await?;
        Self::handle_response(response).await
    }

    /// Fetch a room by id.
    #[instrument(skip(self))]
    pub async fn get_room(&self, room_id: &str) -> Result<Room, WebexError> {
        let response = self
            .get(&format!("/rooms/{}", encode(room_id)))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// List the most recent messages in a room, newest first.
    ///
    /// Bots may only list group-room messages that mention them, so
    /// `mentioned_only` must be set for group rooms.
    #[instrument(skip(self))]
    pub async fn list_messages(
        &self,
        room_id: &str,
        max: usize,
        mentioned_only: bool,
    ) -> Result<Vec<Message>, WebexError> {
        let mut query = vec![("roomId", room_id.to_string()), ("max", max.to_string())];
        if mentioned_only {
            query.push(("mentionedPeople", "me".to_string()));
        }

        let response = self.get("/messages").query(&query).send().await?;
        let list: ListResponse<Message> = Self::handle_response(response).await?;

        debug!("Listed {} messages", list.items.len());
        Ok(list.items)
    }

    /// List the memberships of a room.
    #[instrument(skip(self))]
    pub async fn list_memberships(&self, room_id: &str) -> Result<Vec<Membership>, WebexError> {
        let response = self
            .get("/memberships")
            .query(&[("roomId", room_id)])
            .send()
            .await?;
        let list: ListResponse<Membership> = Self::handle_response(response).await?;
        Ok(list.items)
    }

    /// Post a message.
    #[instrument(skip(self, message), fields(room_id = ?message.room_id, to_person_id = ?message.to_person_id))]
    pub async fn send(&self, message: &CreateMessage) -> Result<Message, WebexError> {
        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .bearer_auth(self.access_token.expose_secret())
            .json(message)
            .send()
            .await?;

        if !response.status().is_success() {
            let msg = response.text().await.unwrap_or_default();
            warn!("Send failed: {}", msg);
            return Err(WebexError::SendFailed(msg));
        }

        debug!("Message sent");
        Ok(response.json().await?)
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, WebexError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(WebexError::Unauthorized);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WebexError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
