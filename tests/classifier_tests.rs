//! Trigger classification integration tests.
//!
//! These tests drive the classifier with before/after worlds the way the
//! document layer would deliver them, covering effect lifecycle, toggles
//! through items under both transfer policies, and rules-system events.

use effect_scripts::core::{
    Actor, ActorId, Attunement, DocumentRef, EffectId, EffectRecord, Item, ItemId, SessionConfig,
    TogglePolicy, TransferPolicy, World,
};
use effect_scripts::scripts::TriggerType;
use effect_scripts::triggers::{
    Change, FiredTrigger, Notification, Phase, Subject, SystemEvent, TriggerClassifier,
};
use proptest::prelude::*;

const HERO: ActorId = ActorId(1);
const CLOAK: ItemId = ItemId(10);
const AURA: EffectId = EffectId(100);

fn scripted(effect: EffectRecord) -> EffectRecord {
    effect
        .with_script(TriggerType::OnCreate, "notify(\"create\");")
        .with_script(TriggerType::OnDelete, "notify(\"delete\");")
        .with_script(TriggerType::OnEnable, "notify(\"enable\");")
        .with_script(TriggerType::OnDisable, "notify(\"disable\");")
        .with_script(TriggerType::OnToggle, "notify(\"toggle\");")
}

fn base_world() -> World {
    let mut world = World::new();
    world.add_actor(Actor::new(HERO, "Hero"));
    world
}

/// A world where the hero holds an equipped cloak carrying an aura.
fn cloak_world() -> World {
    let mut world = base_world();
    world.add_item(Item::new(CLOAK, "Cloak").held_by(HERO).equipped(true));
    world.add_effect(scripted(EffectRecord::on_item(AURA, "Cloak Aura", CLOAK)));
    world
}

fn classify(config: &SessionConfig, change: Change, before: World, after: World) -> Vec<FiredTrigger> {
    TriggerClassifier::new(config).classify(&Notification::new(change, before, after))
}

fn triggers(fired: &[FiredTrigger]) -> Vec<TriggerType> {
    fired.iter().map(|f| f.trigger.clone()).collect()
}

fn is_toggle(trigger: &TriggerType) -> bool {
    matches!(
        trigger,
        TriggerType::OnToggle | TriggerType::OnEnable | TriggerType::OnDisable
    )
}

// === Effect lifecycle ===

/// Creating an applied effect with an onCreate script fires it.
#[test]
fn test_effect_created() {
    let before = base_world();
    let mut after = before.clone();
    after.add_effect(scripted(EffectRecord::on_actor(AURA, "Bless", HERO)));

    let fired = classify(&SessionConfig::default(), Change::EffectCreated { effect: AURA }, before, after);
    assert_eq!(triggers(&fired), vec![TriggerType::OnCreate]);
    assert_eq!(fired[0].actor, HERO);
    assert_eq!(fired[0].phase, Phase::After);
}

/// A disabled effect does not modify its actor, so creation is silent.
#[test]
fn test_disabled_effect_created_is_silent() {
    let before = base_world();
    let mut after = before.clone();
    after.add_effect(scripted(EffectRecord::on_actor(AURA, "Bless", HERO)).disabled(true));

    let fired = classify(&SessionConfig::default(), Change::EffectCreated { effect: AURA }, before, after);
    assert!(fired.is_empty());
}

/// Deletion is judged against the effect as it was before removal.
#[test]
fn test_effect_deleted_reads_before_state() {
    let mut before = base_world();
    before.add_effect(scripted(EffectRecord::on_actor(AURA, "Bless", HERO)));
    let after = base_world();

    let fired = classify(&SessionConfig::default(), Change::EffectDeleted { effect: AURA }, before, after);
    assert_eq!(triggers(&fired), vec![TriggerType::OnDelete]);
    assert_eq!(fired[0].phase, Phase::Before);
}

/// Without an onCreate script nothing fires.
#[test]
fn test_effect_created_without_script() {
    let before = base_world();
    let mut after = before.clone();
    after.add_effect(EffectRecord::on_actor(AURA, "Bless", HERO));

    let fired = classify(&SessionConfig::default(), Change::EffectCreated { effect: AURA }, before, after);
    assert!(fired.is_empty());
}

// === Direct toggles ===

/// disabled -> enabled fires onEnable and onToggle, not onDisable.
#[test]
fn test_enable_fires_enable_and_toggle() {
    let mut before = base_world();
    before.add_effect(scripted(EffectRecord::on_actor(AURA, "Rage", HERO)).disabled(true));
    let mut after = before.clone();
    after.effect_mut(AURA).unwrap().disabled = false;

    let fired = classify(&SessionConfig::default(), Change::EffectUpdated { effect: AURA }, before, after);
    assert_eq!(triggers(&fired), vec![TriggerType::OnEnable, TriggerType::OnToggle]);
}

#[test]
fn test_disable_fires_disable_and_toggle() {
    let mut before = base_world();
    before.add_effect(scripted(EffectRecord::on_actor(AURA, "Rage", HERO)));
    let mut after = before.clone();
    after.effect_mut(AURA).unwrap().disabled = true;

    let fired = classify(&SessionConfig::default(), Change::EffectUpdated { effect: AURA }, before, after);
    assert_eq!(triggers(&fired), vec![TriggerType::OnDisable, TriggerType::OnToggle]);
}

/// Suppression by the rules system toggles the effect just like disabling.
#[test]
fn test_suppression_toggles() {
    let mut before = base_world();
    before.add_effect(scripted(EffectRecord::on_actor(AURA, "Rage", HERO)));
    let mut after = before.clone();
    after.effect_mut(AURA).unwrap().suppressed = true;

    let fired = classify(&SessionConfig::default(), Change::EffectUpdated { effect: AURA }, before, after);
    assert_eq!(triggers(&fired), vec![TriggerType::OnDisable, TriggerType::OnToggle]);
}

/// Under the exclusive policy the specific trigger wins over onToggle.
#[test]
fn test_exclusive_toggle_policy() {
    let config = SessionConfig::default().with_toggle_policy(TogglePolicy::Exclusive);
    let mut before = base_world();
    before.add_effect(scripted(EffectRecord::on_actor(AURA, "Rage", HERO)).disabled(true));
    let mut after = before.clone();
    after.effect_mut(AURA).unwrap().disabled = false;

    let fired = classify(&config, Change::EffectUpdated { effect: AURA }, before, after);
    assert_eq!(triggers(&fired), vec![TriggerType::OnEnable]);
}

/// An update without pre-update state never toggles.
#[test]
fn test_missing_before_state_is_no_toggle() {
    let before = base_world();
    let mut after = before.clone();
    after.add_effect(scripted(EffectRecord::on_actor(AURA, "Rage", HERO)));

    let fired = classify(&SessionConfig::default(), Change::EffectUpdated { effect: AURA }, before, after);
    assert!(fired.is_empty());
}

// === Item-driven toggles ===

/// Unequipping an item suppresses its effects and fires their toggles.
#[test]
fn test_unequip_toggles_item_effects() {
    let before = cloak_world();
    let mut after = before.clone();
    after.item_mut(CLOAK).unwrap().equipped = Some(false);

    let fired = classify(&SessionConfig::default(), Change::ItemUpdated { item: CLOAK }, before, after);
    assert_eq!(triggers(&fired), vec![TriggerType::OnDisable, TriggerType::OnToggle]);
    assert!(fired.iter().all(|f| f.effect == AURA && f.actor == HERO));
}

/// An item update that leaves activity unchanged fires nothing.
#[test]
fn test_item_update_without_activity_change() {
    let before = cloak_world();
    let mut after = before.clone();
    after.item_mut(CLOAK).unwrap().name = "Fine Cloak".to_string();

    let fired = classify(&SessionConfig::default(), Change::ItemUpdated { item: CLOAK }, before, after);
    assert!(fired.is_empty());
}

/// Legacy transfer: the copy on the actor is governed by its origin item.
#[test]
fn test_legacy_item_toggle_via_origin() {
    let config = SessionConfig::default().with_transfer_policy(TransferPolicy::Legacy);
    let mut before = base_world();
    before.add_item(
        Item::new(CLOAK, "Staff")
            .held_by(HERO)
            .with_attunement(Attunement::Attuned),
    );
    before.add_effect(
        scripted(EffectRecord::on_actor(AURA, "Staff Aura", HERO)).with_origin(DocumentRef::Item(CLOAK)),
    );
    let mut after = before.clone();
    after.item_mut(CLOAK).unwrap().attunement = Attunement::Required;

    let fired = classify(&config, Change::ItemUpdated { item: CLOAK }, before, after);
    assert_eq!(triggers(&fired), vec![TriggerType::OnDisable, TriggerType::OnToggle]);
}

/// Legacy transfer: effects still held by an item never trigger.
#[test]
fn test_legacy_ignores_item_held_effects() {
    let config = SessionConfig::default().with_transfer_policy(TransferPolicy::Legacy);
    let before = cloak_world();
    let mut after = before.clone();
    after.effect_mut(AURA).unwrap().disabled = true;

    let fired = classify(&config, Change::EffectUpdated { effect: AURA }, before.clone(), after);
    assert!(fired.is_empty());

    let mut after = before.clone();
    after.remove_item(CLOAK);
    let fired = classify(&config, Change::ItemDeleted { item: CLOAK }, before, after);
    assert!(fired.is_empty());
}

// === Item lifecycle ===

/// Deleting an item holding an active effect fires the effect's onDelete.
#[test]
fn test_item_deleted_fires_on_delete() {
    let before = cloak_world();
    let mut after = before.clone();
    after.remove_item(CLOAK);

    let fired = classify(&SessionConfig::default(), Change::ItemDeleted { item: CLOAK }, before, after);
    assert_eq!(triggers(&fired), vec![TriggerType::OnDelete]);
    assert_eq!(fired[0].effect, AURA);
    assert_eq!(fired[0].phase, Phase::Before);
}

/// Inactive item effects stay silent when the item goes away.
#[test]
fn test_item_deleted_skips_inactive_effects() {
    let mut before = cloak_world();
    before.item_mut(CLOAK).unwrap().equipped = Some(false);
    let mut after = before.clone();
    after.remove_item(CLOAK);

    let fired = classify(&SessionConfig::default(), Change::ItemDeleted { item: CLOAK }, before, after);
    assert!(fired.is_empty());
}

#[test]
fn test_item_created_fires_on_create() {
    let before = base_world();
    let after = cloak_world();

    let fired = classify(&SessionConfig::default(), Change::ItemCreated { item: CLOAK }, before, after);
    assert_eq!(triggers(&fired), vec![TriggerType::OnCreate]);
}

/// An item created outside any actor carries no applicable effects.
#[test]
fn test_unembedded_item_created_is_silent() {
    let before = base_world();
    let mut after = before.clone();
    after.add_item(Item::new(CLOAK, "Cloak"));
    after.add_effect(scripted(EffectRecord::on_item(AURA, "Cloak Aura", CLOAK)));

    let fired = classify(&SessionConfig::default(), Change::ItemCreated { item: CLOAK }, before, after);
    assert!(fired.is_empty());
}

// === System events ===

/// A roll runs every applied effect of the actor with a matching script.
#[test]
fn test_system_event_on_actor() {
    let mut world = base_world();
    world.add_effect(
        EffectRecord::on_actor(EffectId(1), "Guidance", HERO)
            .with_script(TriggerType::from("dnd5e.rollSkill"), "notify(context.skillId);"),
    );
    world.add_effect(
        EffectRecord::on_actor(EffectId(2), "Bane", HERO)
            .disabled(true)
            .with_script(TriggerType::from("dnd5e.rollSkill"), "notify(\"bane\");"),
    );
    world.add_effect(EffectRecord::on_actor(EffectId(3), "Haste", HERO));

    let payload = serde_json::json!({ "skillId": "ath", "total": 15 });
    let event = SystemEvent::new(Subject::Actor(HERO), "dnd5e.rollSkill", payload.clone());
    let fired = classify(&SessionConfig::default(), Change::System(event), world.clone(), world);

    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].effect, EffectId(1));
    assert_eq!(fired[0].context, Some(payload));
}

/// Item subjects resolve to the holder, and the item joins the payload.
#[test]
fn test_system_event_on_item() {
    let mut world = cloak_world();
    world.add_effect(
        EffectRecord::on_actor(EffectId(1), "Hunter's Mark", HERO)
            .with_script(TriggerType::from("dnd5e.rollDamage"), "notify(context.item.name);"),
    );

    let event = SystemEvent::new(Subject::Item(CLOAK), "dnd5e.rollDamage", serde_json::json!({ "total": 9 }));
    let fired = classify(&SessionConfig::default(), Change::System(event), world.clone(), world);

    assert_eq!(fired.len(), 1);
    let context = fired[0].context.as_ref().unwrap();
    assert_eq!(context["total"], 9);
    assert_eq!(context["item"]["name"], "Cloak");
}

/// The item joins the context even when the payload is not a map.
#[test]
fn test_system_event_on_item_without_map_payload() {
    let mut world = cloak_world();
    world.add_effect(
        EffectRecord::on_actor(EffectId(1), "Hunter's Mark", HERO)
            .with_script(TriggerType::from("dnd5e.rollDamage"), "notify(context.item.name);"),
    );

    let event = SystemEvent::new(Subject::Item(CLOAK), "dnd5e.rollDamage", serde_json::Value::Null);
    let fired = classify(&SessionConfig::default(), Change::System(event), world.clone(), world.clone());
    assert_eq!(fired.len(), 1);
    let context = fired[0].context.as_ref().unwrap();
    assert_eq!(context["item"]["name"], "Cloak");

    let event = SystemEvent::new(Subject::Item(CLOAK), "dnd5e.rollDamage", serde_json::json!(12));
    let fired = classify(&SessionConfig::default(), Change::System(event), world.clone(), world);
    let context = fired[0].context.as_ref().unwrap();
    assert_eq!(context["data"], 12);
    assert_eq!(context["item"]["name"], "Cloak");
}

/// Rests run the script for their length only.
#[test]
fn test_rest_events() {
    let mut world = base_world();
    world.add_effect(
        EffectRecord::on_actor(EffectId(1), "Exhaustion", HERO)
            .with_script(TriggerType::from("dnd5e.longRest"), "notify(\"rested\");"),
    );

    let long = Change::System(SystemEvent::rest_completed(HERO, true));
    let short = Change::System(SystemEvent::rest_completed(HERO, false));
    let config = SessionConfig::default();

    assert_eq!(classify(&config, long, world.clone(), world.clone()).len(), 1);
    assert!(classify(&config, short, world.clone(), world).is_empty());
}

// === Properties ===

proptest! {
    /// No toggle-family trigger fires when activity does not change.
    #[test]
    fn prop_no_toggle_without_activity_change(
        disabled in any::<bool>(),
        suppressed in any::<bool>(),
        rename in any::<bool>(),
        exclusive in any::<bool>(),
    ) {
        let config = if exclusive {
            SessionConfig::default().with_toggle_policy(TogglePolicy::Exclusive)
        } else {
            SessionConfig::default()
        };
        let mut before = base_world();
        before.add_effect(
            scripted(EffectRecord::on_actor(AURA, "Rage", HERO))
                .disabled(disabled)
                .suppressed(suppressed),
        );
        let mut after = before.clone();
        if rename {
            after.effect_mut(AURA).unwrap().name = "Fury".to_string();
        }
        // A disabled effect that becomes suppressed is off either way
        if disabled {
            after.effect_mut(AURA).unwrap().suppressed = !suppressed;
        }

        let fired = classify(&config, Change::EffectUpdated { effect: AURA }, before, after);
        prop_assert!(fired.iter().all(|f| !is_toggle(&f.trigger)));
    }

    /// Any real activity change fires exactly one direction.
    #[test]
    fn prop_toggle_direction(
        start_disabled in any::<bool>(),
    ) {
        let mut before = base_world();
        before.add_effect(scripted(EffectRecord::on_actor(AURA, "Rage", HERO)).disabled(start_disabled));
        let mut after = before.clone();
        after.effect_mut(AURA).unwrap().disabled = !start_disabled;

        let fired = classify(&SessionConfig::default(), Change::EffectUpdated { effect: AURA }, before, after);
        let fired = triggers(&fired);
        prop_assert_eq!(fired.contains(&TriggerType::OnEnable), start_disabled);
        prop_assert_eq!(fired.contains(&TriggerType::OnDisable), !start_disabled);
        prop_assert!(fired.contains(&TriggerType::OnToggle));
    }
}
