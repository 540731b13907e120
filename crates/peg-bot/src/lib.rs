//! Peg bot: trigger dispatch for a Webex peg-giving bot.
//!
//! Inbound messages are routed to an ordered [`TriggerRegistry`] (one for
//! rooms, one for direct messages). The first trigger whose permission
//! check and matcher both accept the message produces the reply; failures
//! anywhere in that path become a fixed fallback reply.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod format;
pub mod inflight;
pub mod matcher;
pub mod mention;
pub mod message;
pub mod registry;
pub mod reply;
pub mod triggers;

pub use dispatcher::Dispatcher;
pub use inflight::InFlight;
pub use error::{AppError, AppResult, DispatchError, RegistryError};
pub use mention::BotIdentity;
pub use message::{Channel, InboundMessage};
pub use registry::{build_direct_registry, build_room_registry, Collaborators, TriggerRegistry};
pub use reply::{ReplyPayload, RoomTarget, FALLBACK_REPLY};
