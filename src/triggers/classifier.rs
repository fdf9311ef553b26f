//! Trigger classification.
//!
//! The classifier is a pure function of a [`Notification`]: it inspects the
//! worlds on either side of the change and returns the triggers that fired,
//! in the order their scripts must run. It does not decide who runs them.
//!
//! ## Toggles
//!
//! An effect is *on* when it modifies its actor (see
//! [`World::modifies_actor`]). Toggle triggers compare on-ness captured from
//! the pre-update world in a [`ToggleSnapshot`] with on-ness in the
//! post-update world. An effect with no pre-update state never toggles.

use smallvec::SmallVec;

use crate::core::{
    EffectId, EffectRecord, Item, ItemId, Owner, SessionConfig, TogglePolicy, TransferPolicy,
    World,
};
use crate::scripts::{ScriptableEntity, TriggerType};

use super::combat::CombatTracker;
use super::fired::{FiredTrigger, Phase};
use super::notification::{Change, Notification, Subject, SystemEvent};

/// Toggle triggers produced by one effect (at most three).
pub type ToggleTriggers = SmallVec<[TriggerType; 3]>;

/// On-ness of effects captured before an update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToggleSnapshot {
    entries: Vec<(EffectId, bool)>,
}

impl ToggleSnapshot {
    /// Capture a single effect. Empty if the effect did not exist.
    #[must_use]
    pub fn capture_effect(world: &World, id: EffectId, policy: TransferPolicy) -> Self {
        let entries = world
            .effect(id)
            .map(|e| vec![(id, world.modifies_actor(e, policy))])
            .unwrap_or_default();
        Self { entries }
    }

    /// Capture every effect whose applicability an item governs. Empty
    /// unless the item is embedded in an actor.
    #[must_use]
    pub fn capture_item(world: &World, item: ItemId, policy: TransferPolicy) -> Self {
        if !world.item(item).is_some_and(|i| i.is_embedded()) {
            return Self::default();
        }
        let entries = world
            .item_effects(item, policy)
            .map(|e| (e.id, world.modifies_actor(e, policy)))
            .collect();
        Self { entries }
    }

    /// Was the effect on before the update? `None` if it was not captured.
    #[must_use]
    pub fn was_on(&self, id: EffectId) -> Option<bool> {
        self.entries.iter().find(|(e, _)| *e == id).map(|&(_, on)| on)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EffectId, bool)> + '_ {
        self.entries.iter().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Turns notifications into fired triggers.
#[derive(Clone, Copy, Debug, Default)]
pub struct TriggerClassifier {
    transfer: TransferPolicy,
    toggle: TogglePolicy,
    tracker: CombatTracker,
}

impl TriggerClassifier {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            transfer: config.transfer_policy,
            toggle: config.toggle_policy,
            tracker: CombatTracker::new(config.transfer_policy),
        }
    }

    /// Every trigger a notification fires, in execution order.
    #[must_use]
    pub fn classify(&self, notification: &Notification) -> Vec<FiredTrigger> {
        let before = &notification.before;
        let after = &notification.after;

        let fired = match &notification.change {
            Change::EffectCreated { effect } => self.lifecycle(after, *effect, TriggerType::OnCreate),
            Change::EffectDeleted { effect } => self.lifecycle(before, *effect, TriggerType::OnDelete),
            Change::EffectUpdated { effect } => self.effect_updated(before, after, *effect),
            Change::ItemCreated { item } => self.item_lifecycle(after, *item, TriggerType::OnCreate),
            Change::ItemDeleted { item } => self.item_lifecycle(before, *item, TriggerType::OnDelete),
            Change::ItemUpdated { item } => self.item_updated(before, after, *item),
            Change::CombatUpdated { combat, delta } => {
                self.tracker.combat_updated(before, after, *combat, delta)
            }
            Change::CombatDeleted { combat } => self.tracker.combat_deleted(before, *combat),
            Change::CombatantUpdated { combat, combatant } => {
                self.tracker.combatant_updated(before, after, *combat, *combatant)
            }
            Change::System(event) => self.system_event(after, event),
        };

        tracing::debug!(
            change = ?notification.change,
            user = ?notification.user,
            fired = fired.len(),
            "classified notification"
        );
        fired
    }

    /// Toggle triggers for an effect whose on-ness went from `was_on` to
    /// `is_on`, filtered to the scripts it has.
    #[must_use]
    pub fn toggle_triggers(&self, effect: &EffectRecord, was_on: bool, is_on: bool) -> ToggleTriggers {
        let mut triggers = ToggleTriggers::new();
        if was_on == is_on {
            return triggers;
        }
        let specific = if is_on {
            TriggerType::OnEnable
        } else {
            TriggerType::OnDisable
        };

        match self.toggle {
            TogglePolicy::Combined => {
                if effect.has_script(&specific) {
                    triggers.push(specific);
                }
                if effect.has_script(&TriggerType::OnToggle) {
                    triggers.push(TriggerType::OnToggle);
                }
            }
            TogglePolicy::Exclusive => {
                if effect.has_script(&specific) {
                    triggers.push(specific);
                } else if effect.has_script(&TriggerType::OnToggle) {
                    triggers.push(TriggerType::OnToggle);
                }
            }
        }
        triggers
    }

    // === Effects ===

    /// `onCreate`/`onDelete` for one effect, read from the world where it
    /// exists.
    fn lifecycle(&self, world: &World, id: EffectId, trigger: TriggerType) -> Vec<FiredTrigger> {
        let phase = phase_of(&trigger);
        world
            .effect(id)
            .and_then(|effect| self.lifecycle_of(world, effect, &trigger, phase))
            .into_iter()
            .collect()
    }

    fn lifecycle_of(
        &self,
        world: &World,
        effect: &EffectRecord,
        trigger: &TriggerType,
        phase: Phase,
    ) -> Option<FiredTrigger> {
        if !world.modifies_actor(effect, self.transfer) || !effect.has_script(trigger) {
            return None;
        }
        let actor = world.effect_actor(effect)?;
        Some(FiredTrigger::new(effect.id, actor, trigger.clone()).in_phase(phase))
    }

    fn effect_updated(&self, before: &World, after: &World, id: EffectId) -> Vec<FiredTrigger> {
        let Some(effect) = after.effect(id) else {
            return Vec::new();
        };
        if self.transfer == TransferPolicy::Legacy && matches!(effect.owner, Owner::Item(_)) {
            return Vec::new();
        }

        let snapshot = ToggleSnapshot::capture_effect(before, id, self.transfer);
        let Some(was_on) = snapshot.was_on(id) else {
            tracing::debug!(effect = %id, "no pre-update state, skipping toggle check");
            return Vec::new();
        };
        self.toggled(after, effect, was_on)
    }

    fn toggled(&self, after: &World, effect: &EffectRecord, was_on: bool) -> Vec<FiredTrigger> {
        let is_on = after.modifies_actor(effect, self.transfer);
        let triggers = self.toggle_triggers(effect, was_on, is_on);
        if triggers.is_empty() {
            return Vec::new();
        }
        let Some(actor) = after.effect_actor(effect) else {
            return Vec::new();
        };
        triggers
            .into_iter()
            .map(|trigger| FiredTrigger::new(effect.id, actor, trigger))
            .collect()
    }

    // === Items ===

    /// `onCreate`/`onDelete` for every applicable effect an item carries.
    /// Only the modern transfer policy keeps effects on items.
    fn item_lifecycle(&self, world: &World, id: ItemId, trigger: TriggerType) -> Vec<FiredTrigger> {
        if self.transfer == TransferPolicy::Legacy {
            return Vec::new();
        }
        if !world.item(id).is_some_and(|i| i.is_embedded()) {
            return Vec::new();
        }
        let phase = phase_of(&trigger);
        world
            .item_effects(id, self.transfer)
            .filter_map(|effect| self.lifecycle_of(world, effect, &trigger, phase))
            .collect()
    }

    fn item_updated(&self, before: &World, after: &World, id: ItemId) -> Vec<FiredTrigger> {
        if !after.item(id).is_some_and(|i| i.is_embedded()) {
            return Vec::new();
        }
        let snapshot = ToggleSnapshot::capture_item(before, id, self.transfer);
        snapshot
            .iter()
            .filter_map(|(effect, was_on)| after.effect(effect).map(|e| (e, was_on)))
            .flat_map(|(effect, was_on)| self.toggled(after, effect, was_on))
            .collect()
    }

    // === System events ===

    /// Every applied effect of the subject's actor with a script named after
    /// the event. Item subjects resolve to their holder, and the item joins
    /// the payload.
    fn system_event(&self, after: &World, event: &SystemEvent) -> Vec<FiredTrigger> {
        let mut context = event.payload.clone();
        let actor = match event.subject {
            Subject::Actor(actor) => after.actor(actor).map(|a| a.id),
            Subject::Item(item) => {
                let item = after.item(item);
                if let Some(item) = item {
                    context = with_item(context, item);
                }
                item.and_then(|i| i.actor)
            }
        };
        let Some(actor) = actor else {
            tracing::debug!(event = %event.name, "system event has no actor");
            return Vec::new();
        };

        let trigger = TriggerType::from(event.trigger_name());
        after
            .applied_effects(actor, self.transfer)
            .filter(|e| e.has_script(&trigger))
            .map(|e| FiredTrigger::new(e.id, actor, trigger.clone()).with_context(context.clone()))
            .collect()
    }
}

/// Add `item` to an event payload. Payloads that are not maps are kept
/// under `data`.
fn with_item(payload: serde_json::Value, item: &Item) -> serde_json::Value {
    let mut map = match payload {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => serde_json::Map::new(),
        other => {
            let mut map = serde_json::Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    match serde_json::to_value(item) {
        Ok(value) => {
            map.insert("item".to_string(), value);
        }
        Err(error) => tracing::warn!(item = %item.id, error = %error, "item left out of event payload"),
    }
    serde_json::Value::Object(map)
}

fn phase_of(trigger: &TriggerType) -> Phase {
    if *trigger == TriggerType::OnDelete {
        Phase::Before
    } else {
        Phase::After
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ActorId, Actor, Item};

    fn effect() -> EffectRecord {
        EffectRecord::on_actor(EffectId(1), "Haste", ActorId(1))
            .with_script(TriggerType::OnEnable, "a();")
            .with_script(TriggerType::OnDisable, "b();")
            .with_script(TriggerType::OnToggle, "c();")
    }

    #[test]
    fn test_combined_toggle() {
        let classifier = TriggerClassifier::default();
        let effect = effect();

        assert_eq!(
            classifier.toggle_triggers(&effect, false, true).into_vec(),
            vec![TriggerType::OnEnable, TriggerType::OnToggle]
        );
        assert_eq!(
            classifier.toggle_triggers(&effect, true, false).into_vec(),
            vec![TriggerType::OnDisable, TriggerType::OnToggle]
        );
        assert!(classifier.toggle_triggers(&effect, true, true).is_empty());
    }

    #[test]
    fn test_exclusive_toggle() {
        let config = SessionConfig::default().with_toggle_policy(TogglePolicy::Exclusive);
        let classifier = TriggerClassifier::new(&config);

        assert_eq!(
            classifier.toggle_triggers(&effect(), false, true).into_vec(),
            vec![TriggerType::OnEnable]
        );

        let toggle_only = EffectRecord::on_actor(EffectId(2), "Rage", ActorId(1))
            .with_script(TriggerType::OnToggle, "c();");
        assert_eq!(
            classifier.toggle_triggers(&toggle_only, true, false).into_vec(),
            vec![TriggerType::OnToggle]
        );
    }

    #[test]
    fn test_snapshot_of_missing_effect() {
        let world = World::new();
        let snapshot = ToggleSnapshot::capture_effect(&world, EffectId(1), TransferPolicy::Modern);
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.was_on(EffectId(1)), None);
    }

    #[test]
    fn test_item_snapshot_requires_embedded_item() {
        let mut world = World::new();
        world.add_actor(Actor::new(ActorId(1), "Hero"));
        world.add_item(Item::new(ItemId(1), "Loose Ring"));
        world.add_effect(EffectRecord::on_item(EffectId(1), "Ring Aura", ItemId(1)));
        assert!(ToggleSnapshot::capture_item(&world, ItemId(1), TransferPolicy::Modern).is_empty());

        world.item_mut(ItemId(1)).unwrap().actor = Some(ActorId(1));
        let snapshot = ToggleSnapshot::capture_item(&world, ItemId(1), TransferPolicy::Modern);
        assert_eq!(snapshot.was_on(EffectId(1)), Some(true));
    }
}
