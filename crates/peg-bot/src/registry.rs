//! Ordered trigger registries and their construction.
//!
//! Order encodes precedence: the first trigger whose permission check and
//! matcher both accept a message wins. Every registry ends with exactly one
//! default trigger, so a scan always finds a responder.

use crate::error::{AppError, AppResult, RegistryError};
use crate::matcher::{ArgumentPolicy, CommandMatcher};
use crate::mention::{BotIdentity, MentionNormalizer};
use crate::message::InboundMessage;
use crate::triggers::*;
use peg_store::{PegStore, Settings};
use std::sync::Arc;
use tracing::info;

/// An ordered list of triggers ending in a default trigger.
pub struct TriggerRegistry {
    name: &'static str,
    triggers: Vec<Box<dyn Trigger>>,
    default: Box<dyn Trigger>,
}

impl std::fmt::Debug for TriggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerRegistry")
            .field("name", &self.name)
            .field("triggers", &self.names())
            .finish()
    }
}

impl TriggerRegistry {
    /// Validate and build a registry. The last trigger must be the only default.
    pub fn new(
        name: &'static str,
        mut triggers: Vec<Box<dyn Trigger>>,
    ) -> Result<Self, RegistryError> {
        let default = triggers.pop().ok_or(RegistryError::Empty(name))?;

        if !default.is_default() {
            return Err(match triggers.iter().position(|t| t.is_default()) {
                Some(position) => RegistryError::DefaultNotLast {
                    registry: name,
                    position,
                },
                None => RegistryError::MissingDefault(name),
            });
        }

        if triggers.iter().any(|t| t.is_default()) {
            return Err(RegistryError::MultipleDefaults(name));
        }

        Ok(Self {
            name,
            triggers,
            default,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Trigger names in precedence order.
    pub fn names(&self) -> Vec<&str> {
        self.triggers
            .iter()
            .map(|t| t.name())
            .chain(std::iter::once(self.default.name()))
            .collect()
    }

    /// The catch-all trigger.
    pub fn default_trigger(&self) -> &dyn Trigger {
        self.default.as_ref()
    }

    /// First trigger that accepts the message, else the default.
    pub fn select(&self, message: &InboundMessage) -> &dyn Trigger {
        self.triggers
            .iter()
            .find(|t| t.is_triggered(message))
            .map(|t| t.as_ref())
            .unwrap_or(self.default.as_ref())
    }
}

/// Everything the triggers need, built once at startup.
#[derive(Clone)]
pub struct Collaborators {
    pub bot: BotIdentity,
    pub store: Arc<PegStore>,
    pub settings: Arc<Settings>,
    pub members: Arc<dyn MembershipSource>,
}

fn pattern_error(e: regex::Error) -> AppError {
    AppError::Trigger(format!("invalid command pattern: {}", e))
}

/// Registry for messages posted in shared rooms.
pub fn build_room_registry(c: &Collaborators) -> AppResult<TriggerRegistry> {
    let normalizer = Arc::new(MentionNormalizer::new(&c.bot).map_err(pattern_error)?);
    let exact = |command: &str| {
        CommandMatcher::room(normalizer.clone(), command, ArgumentPolicy::Exact)
            .map_err(pattern_error)
    };
    let trailing = |command: &str| {
        CommandMatcher::room(normalizer.clone(), command, ArgumentPolicy::Trailing)
            .map_err(pattern_error)
    };
    let admin = RoleGate::admin(c.settings.clone());

    let triggers: Vec<Box<dyn Trigger>> = vec![
        Box::new(ResetTrigger::new(exact("reset")?, admin.clone(), c.store.clone())),
        Box::new(WinnersTrigger::new(
            exact("winners")?,
            RoleGate::new(c.settings.clone(), &[ROLE_ADMIN, ROLE_WINNERS]),
            c.store.clone(),
            c.settings.clone(),
        )),
        Box::new(UpdateTrigger::new(
            exact("update")?,
            admin.clone(),
            c.store.clone(),
            c.members.clone(),
        )),
        Box::new(FinishTrigger::new(
            exact("finish")?,
            admin,
            c.store.clone(),
            c.settings.clone(),
        )),
        Box::new(StatusTrigger::new(
            exact("status")?,
            c.store.clone(),
            c.settings.clone(),
        )),
        Box::new(UnpegTrigger::new(
            trailing("unpeg")?,
            c.bot.id.clone(),
            c.store.clone(),
            c.settings.clone(),
        )),
        Box::new(PegTrigger::new(
            trailing("peg")?,
            c.bot.id.clone(),
            c.store.clone(),
            c.settings.clone(),
        )),
        Box::new(HelpTrigger::new(exact("help")?, &c.bot.display_name)),
        Box::new(KeywordsTrigger::new(exact("keywords")?, c.settings.clone())),
        Box::new(PingTrigger::new(exact("ping")?)),
        Box::new(WelcomeTrigger::new(
            exact("welcome")?,
            c.bot.display_name.clone(),
            c.settings.clone(),
        )),
        Box::new(DefaultTrigger::new()),
    ];

    let registry = TriggerRegistry::new("room", triggers)?;
    info!("Room registry: {:?}", registry.names());
    Ok(registry)
}

/// Registry for direct messages.
pub fn build_direct_registry(c: &Collaborators) -> AppResult<TriggerRegistry> {
    let triggers: Vec<Box<dyn Trigger>> = vec![
        Box::new(StatusTrigger::new(
            CommandMatcher::direct("status"),
            c.store.clone(),
            c.settings.clone(),
        )),
        Box::new(HelpTrigger::new(
            CommandMatcher::direct("help"),
            &c.bot.display_name,
        )),
        Box::new(KeywordsTrigger::new(
            CommandMatcher::direct("keywords"),
            c.settings.clone(),
        )),
        Box::new(PingTrigger::new(CommandMatcher::direct("ping"))),
        Box::new(DefaultTrigger::new()),
    ];

    let registry = TriggerRegistry::new("direct", triggers)?;
    info!("Direct registry: {:?}", registry.names());
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triggers::test_support::*;

    fn collaborators() -> Collaborators {
        Collaborators {
            bot: bot(),
            store: PegStore::in_memory(),
            settings: settings(),
            members: Arc::new(MockMembershipSource::new()),
        }
    }

    fn ping() -> Box<dyn Trigger> {
        Box::new(PingTrigger::new(CommandMatcher::direct("ping")))
    }

    #[test]
    fn test_empty_registry_rejected() {
        let result = TriggerRegistry::new("test", vec![]);
        assert_eq!(result.unwrap_err(), RegistryError::Empty("test"));
    }

    #[test]
    fn test_missing_default_rejected() {
        let result = TriggerRegistry::new("test", vec![ping()]);
        assert_eq!(result.unwrap_err(), RegistryError::MissingDefault("test"));
    }

    #[test]
    fn test_default_not_last_rejected() {
        let result = TriggerRegistry::new("test", vec![Box::new(DefaultTrigger::new()), ping()]);
        assert_eq!(
            result.unwrap_err(),
            RegistryError::DefaultNotLast {
                registry: "test",
                position: 0
            }
        );
    }

    #[test]
    fn test_multiple_defaults_rejected() {
        let result = TriggerRegistry::new(
            "test",
            vec![Box::new(DefaultTrigger::new()), Box::new(DefaultTrigger::new())],
        );
        assert_eq!(result.unwrap_err(), RegistryError::MultipleDefaults("test"));
    }

    #[test]
    fn test_room_registry_order() {
        let registry = build_room_registry(&collaborators()).unwrap();

        assert_eq!(
            registry.names(),
            vec![
                "reset", "winners", "update", "finish", "status", "unpeg", "peg", "help",
                "keywords", "ping", "welcome", "default"
            ]
        );
        assert!(registry.default_trigger().is_default());
    }

    #[test]
    fn test_direct_registry_order() {
        let registry = build_direct_registry(&collaborators()).unwrap();

        assert_eq!(
            registry.names(),
            vec!["status", "help", "keywords", "ping", "default"]
        );
        assert!(registry.default_trigger().is_default());
    }

    #[test]
    fn test_default_always_matches() {
        let c = collaborators();
        for registry in [build_room_registry(&c).unwrap(), build_direct_registry(&c).unwrap()] {
            let default = registry.default_trigger();
            assert!(default.is_triggered(&InboundMessage::direct("x", "dm", "")));
            assert!(default.is_triggered(&room_message("x", " whatever", &[])));
        }
    }

    #[test]
    fn test_select_first_match() {
        let registry = build_room_registry(&collaborators()).unwrap();

        assert_eq!(registry.select(&room_message("alice", " unpeg", &[])).name(), "unpeg");
        assert_eq!(registry.select(&room_message("alice", " peg", &[])).name(), "peg");
        assert_eq!(registry.select(&room_message("alice", " dance", &[])).name(), "default");
        assert_eq!(registry.select(&room_message("alice", "", &[])).name(), "default");
    }
}
