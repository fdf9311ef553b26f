//! Combat timeline tracking.
//!
//! ## Timeline steps
//!
//! A combat update moves the encounter's (round, turn) cursor. Comparing the
//! cursor before and after the update gives a [`TimelineStep`]:
//!
//! - `turn_forward`: the update touched round or turn, the encounter is
//!   started and active, and the cursor did not move backwards.
//! - `round_forward`: a forward turn that also increased the round.
//! - `combat_started`: the encounter flipped from unstarted to started.
//!
//! Backward moves (undo, rewinds) never fire anything, so replaying an
//! update after a rollback is harmless.
//!
//! ## Ordering
//!
//! Triggers from one update are produced in this order:
//!
//! 1. `onTurnEnd` for the previous combatant (not when the encounter starts)
//! 2. `onTurnStart` for the current combatant
//! 3. `onEachTurn` for every undefeated combatant
//! 4. per undefeated combatant, `onRoundEnd` (not when the encounter starts)
//!    then `onRoundStart`
//! 5. `onCombatStart` for every undefeated combatant

use serde::{Deserialize, Serialize};

use crate::core::{ActorId, CombatId, CombatantId, TransferPolicy, World};
use crate::scripts::{ScriptableEntity, TriggerType};

use super::fired::{FiredTrigger, Phase};
use super::notification::CombatDelta;

/// An encounter's cursor as seen in one world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatSnapshot {
    /// The combatant whose turn it is.
    pub combatant: Option<CombatantId>,
    pub round: u32,
    pub turn: u32,
    pub started: bool,

    /// Is this the tracked encounter?
    pub active: bool,
}

impl CombatSnapshot {
    /// Capture an encounter's cursor, if the encounter exists.
    #[must_use]
    pub fn capture(world: &World, id: CombatId) -> Option<Self> {
        let combat = world.combat(id)?;
        Some(Self {
            combatant: combat.current_combatant().map(|c| c.id),
            round: combat.round,
            turn: combat.turn,
            started: combat.started,
            active: world.is_active_combat(id),
        })
    }

    /// Is `self` strictly behind `earlier` on the timeline?
    #[must_use]
    pub fn is_behind(&self, earlier: &Self) -> bool {
        self.round < earlier.round || (self.round == earlier.round && self.turn < earlier.turn)
    }
}

/// What a single combat update did to the timeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineStep {
    pub turn_forward: bool,
    pub round_forward: bool,
    pub combat_started: bool,
}

impl TimelineStep {
    /// Compare the cursor before and after an update.
    #[must_use]
    pub fn determine(previous: &CombatSnapshot, current: &CombatSnapshot, delta: &CombatDelta) -> Self {
        let turn_forward = delta.touches_timeline()
            && current.started
            && current.active
            && !current.is_behind(previous);

        Self {
            turn_forward,
            round_forward: turn_forward && current.round > previous.round,
            combat_started: current.started && !previous.started,
        }
    }

    /// Does this step fire anything?
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.turn_forward && !self.round_forward && !self.combat_started
    }
}

/// Derives combat triggers from combat and combatant updates.
#[derive(Clone, Copy, Debug, Default)]
pub struct CombatTracker {
    transfer: TransferPolicy,
}

impl CombatTracker {
    pub fn new(transfer: TransferPolicy) -> Self {
        Self { transfer }
    }

    /// Triggers fired by an update to an encounter's cursor or started flag.
    #[must_use]
    pub fn combat_updated(
        &self,
        before: &World,
        after: &World,
        id: CombatId,
        delta: &CombatDelta,
    ) -> Vec<FiredTrigger> {
        let mut fired = Vec::new();
        let (Some(previous), Some(current), Some(combat)) = (
            CombatSnapshot::capture(before, id),
            CombatSnapshot::capture(after, id),
            after.combat(id),
        ) else {
            return fired;
        };

        let step = TimelineStep::determine(&previous, &current, delta);
        if step.is_idle() {
            if current.is_behind(&previous) {
                tracing::debug!(combat = %id, "combat moved backwards, no triggers");
            }
            return fired;
        }

        let undefeated: Vec<Option<ActorId>> = combat.undefeated().map(|c| c.actor).collect();

        if step.turn_forward {
            if !step.combat_started {
                let previous_actor = previous
                    .combatant
                    .and_then(|c| combat.combatant(c))
                    .and_then(|c| c.actor);
                self.applied(after, previous_actor, TriggerType::OnTurnEnd, Phase::After, &mut fired);
            }

            let current_actor = combat.current_combatant().and_then(|c| c.actor);
            self.applied(after, current_actor, TriggerType::OnTurnStart, Phase::After, &mut fired);

            for &actor in &undefeated {
                self.applied(after, actor, TriggerType::OnEachTurn, Phase::After, &mut fired);
            }
        }

        if step.round_forward {
            for &actor in &undefeated {
                if !step.combat_started {
                    self.applied(after, actor, TriggerType::OnRoundEnd, Phase::After, &mut fired);
                }
                self.applied(after, actor, TriggerType::OnRoundStart, Phase::After, &mut fired);
            }
        }

        if step.combat_started {
            for &actor in &undefeated {
                self.applied(after, actor, TriggerType::OnCombatStart, Phase::After, &mut fired);
            }
        }

        fired
    }

    /// Triggers fired by deleting an encounter: `onCombatEnd` when it was
    /// started and active.
    #[must_use]
    pub fn combat_deleted(&self, before: &World, id: CombatId) -> Vec<FiredTrigger> {
        let mut fired = Vec::new();
        let Some(combat) = before.combat(id) else {
            return fired;
        };
        if !combat.started || !before.is_active_combat(id) {
            return fired;
        }
        for combatant in combat.undefeated() {
            self.applied(before, combatant.actor, TriggerType::OnCombatEnd, Phase::Before, &mut fired);
        }
        fired
    }

    /// Triggers fired by a combatant update: `onCombatantDefeated` when the
    /// defeated flag flipped on.
    #[must_use]
    pub fn combatant_updated(
        &self,
        before: &World,
        after: &World,
        combat: CombatId,
        combatant: CombatantId,
    ) -> Vec<FiredTrigger> {
        let mut fired = Vec::new();
        let was_defeated = before
            .combat(combat)
            .and_then(|c| c.combatant(combatant))
            .map(|c| c.defeated);
        let Some(now) = after.combat(combat).and_then(|c| c.combatant(combatant)) else {
            return fired;
        };

        if was_defeated == Some(false) && now.defeated {
            self.applied(after, now.actor, TriggerType::OnCombatantDefeated, Phase::After, &mut fired);
        }
        fired
    }

    /// Queue `trigger` for every effect applied to `actor` with that script.
    fn applied(
        &self,
        world: &World,
        actor: Option<ActorId>,
        trigger: TriggerType,
        phase: Phase,
        fired: &mut Vec<FiredTrigger>,
    ) {
        let Some(actor) = actor else {
            return;
        };
        fired.extend(
            world
                .applied_effects(actor, self.transfer)
                .filter(|e| e.has_script(&trigger))
                .map(|e| FiredTrigger::new(e.id, actor, trigger.clone()).in_phase(phase)),
        );
    }
}
