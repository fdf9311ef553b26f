//! Encounters and their participants.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::ids::{ActorId, CombatId, CombatantId, SceneId, TokenId};

/// One actor's participation in an encounter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub actor: Option<ActorId>,
    pub token: Option<TokenId>,
    pub defeated: bool,
}

impl Combatant {
    pub fn new(id: CombatantId, actor: ActorId) -> Self {
        Self {
            id,
            actor: Some(actor),
            token: None,
            defeated: false,
        }
    }

    /// Set the defeated flag (builder pattern).
    #[must_use]
    pub fn defeated(mut self, defeated: bool) -> Self {
        self.defeated = defeated;
        self
    }
}

/// An encounter: combatants in turn order plus the round/turn cursor.
///
/// `turn` indexes into `combatants`. Round 0 means the encounter has not
/// begun its first round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combat {
    pub id: CombatId,
    pub scene: Option<SceneId>,
    pub round: u32,
    pub turn: u32,
    pub started: bool,

    /// Combatants in turn order. Persistent for cheap snapshots.
    pub combatants: Vector<Combatant>,
}

impl Combat {
    /// Create an unstarted encounter with no combatants.
    pub fn new(id: CombatId) -> Self {
        Self {
            id,
            scene: None,
            round: 0,
            turn: 0,
            started: false,
            combatants: Vector::new(),
        }
    }

    /// Add a combatant at the end of the turn order (builder pattern).
    #[must_use]
    pub fn with_combatant(mut self, combatant: Combatant) -> Self {
        self.combatants.push_back(combatant);
        self
    }

    /// Start the encounter at round 1, turn 0.
    pub fn start(&mut self) {
        self.started = true;
        self.round = 1;
        self.turn = 0;
    }

    /// The combatant whose turn it currently is.
    #[must_use]
    pub fn current_combatant(&self) -> Option<&Combatant> {
        self.combatants.get(self.turn as usize)
    }

    #[must_use]
    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    pub fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| c.id == id)
    }

    /// Combatants still in the fight, in turn order.
    pub fn undefeated(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter().filter(|c| !c.defeated)
    }
}
