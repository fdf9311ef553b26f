//! Classified triggers.

use serde::{Deserialize, Serialize};

use crate::core::{ActorId, EffectId};
use crate::scripts::TriggerType;

/// Which side of a notification a fired trigger reads its documents from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    /// The effect no longer exists afterwards (deletions).
    Before,
    #[default]
    After,
}

/// One script to run: an effect, the trigger that fired and its payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FiredTrigger {
    pub effect: EffectId,

    /// The actor whose users decide who runs the script.
    pub actor: ActorId,

    pub trigger: TriggerType,
    pub phase: Phase,

    /// Extra payload bound as `context`.
    pub context: Option<serde_json::Value>,
}

impl FiredTrigger {
    pub fn new(effect: EffectId, actor: ActorId, trigger: TriggerType) -> Self {
        Self {
            effect,
            actor,
            trigger,
            phase: Phase::After,
            context: None,
        }
    }

    /// Read documents from the given phase (builder pattern).
    #[must_use]
    pub fn in_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Attach a payload (builder pattern).
    #[must_use]
    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }
}

impl std::fmt::Display for FiredTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} on {} ({})", self.trigger, self.effect, self.actor)
    }
}
