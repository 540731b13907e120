//! Selects and runs exactly one trigger per inbound message.

use crate::error::{AppResult, DispatchError};
use crate::message::{Channel, InboundMessage};
use crate::registry::{build_direct_registry, build_room_registry, Collaborators, TriggerRegistry};
use crate::reply::ReplyPayload;
use futures::FutureExt;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, instrument};

/// Routes messages to the room or direct registry and recovers every failure
/// into a fallback reply.
#[derive(Debug)]
pub struct Dispatcher {
    room: TriggerRegistry,
    direct: TriggerRegistry,
}

impl Dispatcher {
    pub fn new(room: TriggerRegistry, direct: TriggerRegistry) -> Self {
        Self { room, direct }
    }

    /// Build both registries from the startup collaborators.
    pub fn from_collaborators(collaborators: &Collaborators) -> AppResult<Self> {
        Ok(Self::new(
            build_room_registry(collaborators)?,
            build_direct_registry(collaborators)?,
        ))
    }

    pub fn registry(&self, channel: Channel) -> &TriggerRegistry {
        match channel {
            Channel::Room => &self.room,
            Channel::Direct => &self.direct,
        }
    }

    /// Dispatch a message. Never fails: errors become the fallback reply.
    #[instrument(skip(self, message), fields(message_id = %message.id, sender = %message.sender_id))]
    pub async fn dispatch(&self, message: &InboundMessage, room_id: &str) -> ReplyPayload {
        match self.try_dispatch(message, room_id).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Dispatch failed: {}", e);
                ReplyPayload::fallback()
            }
        }
    }

    /// Dispatch a message, reporting what went wrong instead of recovering.
    pub async fn try_dispatch(
        &self,
        message: &InboundMessage,
        room_id: &str,
    ) -> Result<ReplyPayload, DispatchError> {
        let registry = self.registry(message.channel);

        let trigger = panic::catch_unwind(AssertUnwindSafe(|| registry.select(message)))
            .map_err(|payload| DispatchError::MatchEvaluation(panic_message(payload.as_ref())))?;

        debug!("Selected trigger {} from {} registry", trigger.name(), registry.name());

        let reply = AssertUnwindSafe(trigger.respond(message, room_id))
            .catch_unwind()
            .await
            .map_err(|payload| DispatchError::ResponsePanicked {
                trigger: trigger.name().to_string(),
                message: panic_message(payload.as_ref()),
            })?
            .map_err(|source| DispatchError::ResponseProduction {
                trigger: trigger.name().to_string(),
                source,
            })?;

        if reply.is_empty() {
            return Err(DispatchError::EmptyReply(trigger.name().to_string()));
        }

        Ok(reply)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
