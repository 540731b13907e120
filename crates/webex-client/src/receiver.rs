//! Message receiver with polling.

use crate::client::WebexClient;
use crate::types::*;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::time::sleep;
use tokio_stream::Stream;
use tracing::{debug, error, info};

/// Messages fetched per room per poll.
const POLL_PAGE_SIZE: usize = 50;

/// Seen ids kept per room before the set is pruned.
const MAX_SEEN_PER_ROOM: usize = 500;

/// Polling state for one watched room.
struct WatchedRoom {
    room_type: Option<RoomType>,
    seen: HashSet<String>,
    primed: bool,
}

impl WatchedRoom {
    fn new() -> Self {
        Self {
            room_type: None,
            seen: HashSet::new(),
            primed: false,
        }
    }

    /// Record a batch (newest first) and return the unseen messages, oldest first.
    ///
    /// The first batch only primes the seen-set so history is not replayed.
    fn accept(&mut self, batch: Vec<Message>) -> Vec<Message> {
        let batch_ids: HashSet<String> = batch.iter().map(|m| m.id.clone()).collect();
        let mut fresh: Vec<Message> = batch
            .into_iter()
            .filter(|m| self.seen.insert(m.id.clone()))
            .collect();

        if !self.primed {
            self.primed = true;
            return Vec::new();
        }

        if self.seen.len() > MAX_SEEN_PER_ROOM {
            self.seen.retain(|id| batch_ids.contains(id));
        }

        fresh.reverse();
        fresh
    }
}

/// Receiver that polls a fixed set of rooms for new messages.
pub struct MessageReceiver {
    client: WebexClient,
    rooms: Vec<String>,
    bot_id: String,
    poll_interval: Duration,
}

impl MessageReceiver {
    /// Create a new message receiver.
    pub fn new(
        client: WebexClient,
        rooms: Vec<String>,
        bot_id: impl Into<String>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            client,
            rooms,
            bot_id: bot_id.into(),
            poll_interval,
        }
    }

    /// Start receiving messages as an async stream.
    ///
    /// Messages posted by the bot itself are never yielded.
    pub fn stream(self) -> impl Stream<Item = Message> {
        async_stream::stream! {
            let mut state: HashMap<String, WatchedRoom> = self
                .rooms
                .iter()
                .map(|id| (id.clone(), WatchedRoom::new()))
                .collect();

            info!("Polling {} rooms", state.len());

            loop {
                for room_id in &self.rooms {
                    let Some(watched) = state.get_mut(room_id) else {
                        continue;
                    };

                    let room_type = match watched.room_type {
                        Some(room_type) => room_type,
                        None => match self.client.get_room(room_id).await {
                            Ok(room) => {
                                watched.room_type = Some(room.room_type);
                                room.room_type
                            }
                            Err(e) => {
                                error!("Failed to resolve room {}: {}", room_id, e);
                                sleep(Duration::from_secs(5)).await;
                                continue;
                            }
                        },
                    };

                    let mentioned_only = room_type == RoomType::Group;
                    match self.client.list_messages(room_id, POLL_PAGE_SIZE, mentioned_only).await {
                        Ok(batch) => {
                            for message in watched.accept(batch) {
                                if message.person_id == self.bot_id {
                                    continue;
                                }
                                debug!("Received {} from {}", message.id, message.person_id);
                                yield message;
                            }
                        }
                        Err(e) => {
                            error!("Receive error: {}", e);
                            // Back off on error
                            sleep(Duration::from_secs(5)).await;
                        }
                    }
                }

                sleep(self.poll_interval).await;
            }
        }
    }
}
