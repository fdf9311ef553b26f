//! Combat timeline integration tests.
//!
//! These tests verify turn, round and encounter triggers fire in the right
//! order, exactly once, and never on backward moves.

use effect_scripts::core::{
    Actor, ActorId, Combat, CombatId, Combatant, CombatantId, EffectId, EffectRecord,
    SessionConfig, World,
};
use effect_scripts::scripts::TriggerType;
use effect_scripts::triggers::{
    Change, CombatDelta, FiredTrigger, Notification, TriggerClassifier,
};
use proptest::prelude::*;

const COMBAT: CombatId = CombatId(1);
const ACTORS: [ActorId; 3] = [ActorId(1), ActorId(2), ActorId(3)];

const COMBAT_TRIGGERS: [TriggerType; 8] = [
    TriggerType::OnTurnStart,
    TriggerType::OnTurnEnd,
    TriggerType::OnEachTurn,
    TriggerType::OnRoundStart,
    TriggerType::OnRoundEnd,
    TriggerType::OnCombatStart,
    TriggerType::OnCombatEnd,
    TriggerType::OnCombatantDefeated,
];

/// Three actors, each with one effect scripted for every combat trigger,
/// fighting in an active encounter at (round, turn).
fn world(round: u32, turn: u32, started: bool) -> World {
    let mut world = World::new();
    let mut combat = Combat::new(COMBAT);
    for (i, actor) in ACTORS.iter().enumerate() {
        world.add_actor(Actor::new(*actor, format!("Fighter {}", i)));
        let mut effect = EffectRecord::on_actor(EffectId(actor.raw()), "Mark", *actor);
        for trigger in COMBAT_TRIGGERS.iter() {
            effect = effect.with_script(trigger.clone(), "notify(\"tick\");");
        }
        world.add_effect(effect);
        combat = combat.with_combatant(Combatant::new(CombatantId(i as u32), *actor));
    }
    combat.round = round;
    combat.turn = turn;
    combat.started = started;
    world.add_combat(combat);
    world.active_combat = Some(COMBAT);
    world
}

fn move_to(before: &World, round: u32, turn: u32) -> Notification {
    let mut after = before.clone();
    let combat = after.combat_mut(COMBAT).unwrap();
    combat.round = round;
    combat.turn = turn;
    Notification::new(
        Change::CombatUpdated { combat: COMBAT, delta: CombatDelta::moved_to(round, turn) },
        before.clone(),
        after,
    )
}

fn classify(notification: &Notification) -> Vec<FiredTrigger> {
    TriggerClassifier::new(&SessionConfig::default()).classify(notification)
}

fn pairs(fired: &[FiredTrigger]) -> Vec<(TriggerType, ActorId)> {
    fired.iter().map(|f| (f.trigger.clone(), f.actor)).collect()
}

/// Round 1 turn 2 -> round 2 turn 0: turn end, turn start, each turn,
/// then round end and round start per combatant.
#[test]
fn test_round_rollover_order() {
    let before = world(1, 2, true);
    let fired = classify(&move_to(&before, 2, 0));

    let [a, b, c] = ACTORS;
    assert_eq!(
        pairs(&fired),
        vec![
            (TriggerType::OnTurnEnd, c),
            (TriggerType::OnTurnStart, a),
            (TriggerType::OnEachTurn, a),
            (TriggerType::OnEachTurn, b),
            (TriggerType::OnEachTurn, c),
            (TriggerType::OnRoundEnd, a),
            (TriggerType::OnRoundStart, a),
            (TriggerType::OnRoundEnd, b),
            (TriggerType::OnRoundStart, b),
            (TriggerType::OnRoundEnd, c),
            (TriggerType::OnRoundStart, c),
        ]
    );
}

#[test]
fn test_next_turn() {
    let before = world(1, 0, true);
    let fired = classify(&move_to(&before, 1, 1));

    let [a, b, c] = ACTORS;
    assert_eq!(
        pairs(&fired),
        vec![
            (TriggerType::OnTurnEnd, a),
            (TriggerType::OnTurnStart, b),
            (TriggerType::OnEachTurn, a),
            (TriggerType::OnEachTurn, b),
            (TriggerType::OnEachTurn, c),
        ]
    );
}

/// Defeated combatants are skipped for each-turn and round triggers.
#[test]
fn test_defeated_combatants_are_skipped() {
    let mut before = world(1, 0, true);
    before.combat_mut(COMBAT).unwrap().combatant_mut(CombatantId(2)).unwrap().defeated = true;
    let fired = classify(&move_to(&before, 1, 1));

    assert!(fired.iter().all(|f| f.actor != ActorId(3)));
}

/// Starting the encounter fires onCombatStart once and no turn end or
/// round end.
#[test]
fn test_combat_start() {
    let before = world(0, 0, false);
    let mut after = before.clone();
    after.combat_mut(COMBAT).unwrap().start();
    let notification = Notification::new(
        Change::CombatUpdated { combat: COMBAT, delta: CombatDelta::moved_to(1, 0) },
        before,
        after.clone(),
    );

    let fired = classify(&notification);
    let triggers: Vec<_> = fired.iter().map(|f| f.trigger.clone()).collect();
    assert!(!triggers.contains(&TriggerType::OnTurnEnd));
    assert!(!triggers.contains(&TriggerType::OnRoundEnd));
    assert_eq!(triggers.iter().filter(|t| **t == TriggerType::OnCombatStart).count(), 3);
    assert_eq!(triggers.last(), Some(&TriggerType::OnCombatStart));

    // Later updates never start it again
    let next = classify(&move_to(&after, 1, 1));
    assert!(next.iter().all(|f| f.trigger != TriggerType::OnCombatStart));
}

/// Updates that do not touch the cursor fire nothing.
#[test]
fn test_unrelated_combat_update() {
    let before = world(2, 1, true);
    let mut after = before.clone();
    after.combat_mut(COMBAT).unwrap().scene = None;
    let notification = Notification::new(
        Change::CombatUpdated { combat: COMBAT, delta: CombatDelta::default() },
        before,
        after,
    );
    assert!(classify(&notification).is_empty());
}

/// An encounter that is not the tracked one never advances.
#[test]
fn test_inactive_combat() {
    let mut before = world(1, 0, true);
    before.active_combat = None;
    assert!(classify(&move_to(&before, 1, 1)).is_empty());
}

#[test]
fn test_combat_end() {
    let mut before = world(3, 1, true);
    before.combat_mut(COMBAT).unwrap().combatant_mut(CombatantId(0)).unwrap().defeated = true;
    let mut after = before.clone();
    after.combats.remove(&COMBAT);
    after.active_combat = None;

    let fired = classify(&Notification::new(Change::CombatDeleted { combat: COMBAT }, before, after));
    assert_eq!(
        pairs(&fired),
        vec![(TriggerType::OnCombatEnd, ActorId(2)), (TriggerType::OnCombatEnd, ActorId(3))]
    );
}

/// Defeat fires onCombatantDefeated for that actor only.
#[test]
fn test_combatant_defeated() {
    let before = world(1, 0, true);
    let mut after = before.clone();
    after.combat_mut(COMBAT).unwrap().combatant_mut(CombatantId(1)).unwrap().defeated = true;

    let change = Change::CombatantUpdated { combat: COMBAT, combatant: CombatantId(1) };
    let fired = classify(&Notification::new(change.clone(), before, after.clone()));
    assert_eq!(pairs(&fired), vec![(TriggerType::OnCombatantDefeated, ActorId(2))]);

    // Already defeated: nothing
    let fired = classify(&Notification::new(change, after.clone(), after));
    assert!(fired.is_empty());
}

proptest! {
    /// Backward moves never fire turn or round triggers.
    #[test]
    fn prop_backward_moves_are_silent(
        round in 1u32..20,
        turn in 0u32..3,
        back_rounds in 0u32..5,
        back_turns in 1u32..3,
    ) {
        let before = world(round, turn, true);
        let (to_round, to_turn) = if back_rounds == 0 {
            (round, turn.saturating_sub(back_turns))
        } else {
            (round.saturating_sub(back_rounds), (turn + back_turns) % 3)
        };
        prop_assume!((to_round, to_turn) < (round, turn));

        let fired = classify(&move_to(&before, to_round, to_turn));
        prop_assert!(fired.is_empty());
    }

    /// Replaying a forward move after rolling it back fires the same
    /// triggers as the first time, and the rollback itself fires nothing.
    #[test]
    fn prop_replay_after_rollback(round in 1u32..20, turn in 0u32..2) {
        let start = world(round, turn, true);
        let forward = move_to(&start, round, turn + 1);
        let first = classify(&forward);

        let rollback = move_to(&forward.after, round, turn);
        prop_assert!(classify(&rollback).is_empty());

        let replay = move_to(&rollback.after, round, turn + 1);
        prop_assert_eq!(pairs(&classify(&replay)), pairs(&first));
    }
}
