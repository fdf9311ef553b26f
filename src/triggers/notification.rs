//! Change notifications delivered by the document layer.
//!
//! Every peer receives every notification, in the same order. A
//! notification names what changed and carries the world as it was
//! immediately before and immediately after the change, plus the user
//! who caused it.

use serde::{Deserialize, Serialize};

use crate::core::{ActorId, CombatId, CombatantId, EffectId, ItemId, UserId, World};

/// Which of `round` and `turn` appeared in a combat update.
///
/// The document layer reports the keys an update touched, even when a value
/// was rewritten unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatDelta {
    pub round: Option<u32>,
    pub turn: Option<u32>,
}

impl CombatDelta {
    /// An update that set both round and turn.
    #[must_use]
    pub const fn moved_to(round: u32, turn: u32) -> Self {
        Self {
            round: Some(round),
            turn: Some(turn),
        }
    }

    /// Did the update touch round or turn at all?
    #[must_use]
    pub const fn touches_timeline(&self) -> bool {
        self.round.is_some() || self.turn.is_some()
    }
}

/// Document an external system event is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subject {
    Actor(ActorId),
    Item(ItemId),
}

/// A named event raised by a rules system (a roll, a rest).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemEvent {
    pub subject: Subject,

    /// Event name as the rules system raised it.
    pub name: String,

    /// Event data, bound as `context` for the scripts it runs.
    pub payload: serde_json::Value,
}

/// Rest events are raised under one name and dispatched by rest length.
pub const REST_COMPLETED: &str = "dnd5e.restCompleted";

impl SystemEvent {
    pub fn new(subject: Subject, name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            subject,
            name: name.into(),
            payload,
        }
    }

    /// A completed rest for an actor.
    pub fn rest_completed(actor: ActorId, long_rest: bool) -> Self {
        Self::new(
            Subject::Actor(actor),
            REST_COMPLETED,
            serde_json::json!({ "longRest": long_rest }),
        )
    }

    /// The script trigger name this event runs.
    #[must_use]
    pub fn trigger_name(&self) -> &str {
        if self.name != REST_COMPLETED {
            return &self.name;
        }
        let long_rest = self
            .payload
            .get("longRest")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        if long_rest {
            "dnd5e.longRest"
        } else {
            "dnd5e.shortRest"
        }
    }
}

/// What changed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Change {
    EffectCreated { effect: EffectId },
    EffectUpdated { effect: EffectId },
    EffectDeleted { effect: EffectId },

    ItemCreated { item: ItemId },
    ItemUpdated { item: ItemId },
    ItemDeleted { item: ItemId },

    CombatUpdated { combat: CombatId, delta: CombatDelta },
    CombatDeleted { combat: CombatId },
    CombatantUpdated { combat: CombatId, combatant: CombatantId },

    System(SystemEvent),
}

/// One change, with the state on either side of it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub change: Change,

    /// State immediately before the change was applied.
    pub before: World,

    /// State immediately after.
    pub after: World,

    /// The user whose action caused the change. Classification does not
    /// depend on it; it is logged and carried for the host.
    pub user: Option<UserId>,
}

impl Notification {
    pub fn new(change: Change, before: World, after: World) -> Self {
        Self {
            change,
            before,
            after,
            user: None,
        }
    }

    /// Record the causing user (builder pattern).
    #[must_use]
    pub fn by(mut self, user: UserId) -> Self {
        self.user = Some(user);
        self
    }
}
