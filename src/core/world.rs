//! Shared session state as seen by one peer.
//!
//! ## World
//!
//! A `World` is an immutable-by-convention snapshot of every document the
//! engine cares about. Notifications carry two of them: the state just
//! before a change was applied and the state just after. Backing maps are
//! `im` persistent structures, so capturing a snapshot is an O(1) clone.
//!
//! Ordered maps are used throughout: iteration order is part of the
//! contract, since every peer must derive triggers (and pick executors) in
//! the same order.

use im::OrdMap;
use serde::{Deserialize, Serialize};

use super::combat::Combat;
use super::config::TransferPolicy;
use super::document::{Actor, EffectRecord, Item, Owner, Scene, Token};
use super::ids::{ActorId, CombatId, DocumentRef, EffectId, ItemId, SceneId, TokenId, UserId};
use super::user::User;

/// Complete session state relevant to effect scripts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    pub users: OrdMap<UserId, User>,
    pub actors: OrdMap<ActorId, Actor>,
    pub items: OrdMap<ItemId, Item>,
    pub effects: OrdMap<EffectId, EffectRecord>,
    pub scenes: OrdMap<SceneId, Scene>,
    pub tokens: OrdMap<TokenId, Token>,
    pub combats: OrdMap<CombatId, Combat>,

    /// The scene currently shown to players.
    pub active_scene: Option<SceneId>,

    /// The encounter currently being tracked.
    pub active_combat: Option<CombatId>,
}

impl World {
    /// Create an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Insertion ===

    pub fn add_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn add_actor(&mut self, actor: Actor) {
        self.actors.insert(actor.id, actor);
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.insert(item.id, item);
    }

    pub fn add_effect(&mut self, effect: EffectRecord) {
        self.effects.insert(effect.id, effect);
    }

    pub fn add_scene(&mut self, scene: Scene) {
        self.scenes.insert(scene.id, scene);
    }

    pub fn add_token(&mut self, token: Token) {
        self.tokens.insert(token.id, token);
    }

    pub fn add_combat(&mut self, combat: Combat) {
        self.combats.insert(combat.id, combat);
    }

    /// Remove an item together with every effect it holds.
    pub fn remove_item(&mut self, id: ItemId) -> Option<Item> {
        let held: Vec<EffectId> = self
            .effects
            .values()
            .filter(|e| e.owner == Owner::Item(id))
            .map(|e| e.id)
            .collect();
        for effect in held {
            self.effects.remove(&effect);
        }
        self.items.remove(&id)
    }

    // === Lookup ===

    #[must_use]
    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    #[must_use]
    pub fn effect(&self, id: EffectId) -> Option<&EffectRecord> {
        self.effects.get(&id)
    }

    pub fn effect_mut(&mut self, id: EffectId) -> Option<&mut EffectRecord> {
        self.effects.get_mut(&id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(&id)
    }

    pub fn user_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users.get_mut(&id)
    }

    #[must_use]
    pub fn combat(&self, id: CombatId) -> Option<&Combat> {
        self.combats.get(&id)
    }

    pub fn combat_mut(&mut self, id: CombatId) -> Option<&mut Combat> {
        self.combats.get_mut(&id)
    }

    /// Is this the encounter currently being tracked?
    #[must_use]
    pub fn is_active_combat(&self, id: CombatId) -> bool {
        self.active_combat == Some(id)
    }

    // === Effect applicability ===

    /// The actor an effect ultimately belongs to: its owner, or the owner of
    /// its item.
    #[must_use]
    pub fn effect_actor(&self, effect: &EffectRecord) -> Option<ActorId> {
        match effect.owner {
            Owner::Actor(actor) => Some(actor),
            Owner::Item(item) => self.item(item).and_then(|i| i.actor),
        }
    }

    /// The item an effect is sourced from: the item holding it, or (for an
    /// effect copied onto an actor) an item of that actor named as origin.
    #[must_use]
    pub fn source_item(&self, effect: &EffectRecord) -> Option<&Item> {
        match effect.owner {
            Owner::Item(item) => self.item(item),
            Owner::Actor(actor) => match effect.origin {
                Some(DocumentRef::Item(item)) => {
                    self.item(item).filter(|i| i.actor == Some(actor))
                }
                _ => None,
            },
        }
    }

    /// Is the effect present but held inactive by an external condition?
    #[must_use]
    pub fn is_suppressed(&self, effect: &EffectRecord) -> bool {
        effect.suppressed
            || self
                .source_item(effect)
                .is_some_and(Item::suppresses_effects)
    }

    /// Does the effect currently modify its actor?
    ///
    /// It must be enabled and unsuppressed. Effects held by items only apply
    /// under the modern transfer policy, when marked for transfer, and when
    /// the item is embedded in an existing actor.
    #[must_use]
    pub fn modifies_actor(&self, effect: &EffectRecord, policy: TransferPolicy) -> bool {
        if effect.disabled || self.is_suppressed(effect) {
            return false;
        }
        match effect.owner {
            Owner::Actor(actor) => self.actors.contains_key(&actor),
            Owner::Item(item) => {
                policy == TransferPolicy::Modern
                    && effect.transfer
                    && self
                        .item(item)
                        .and_then(|i| i.actor)
                        .is_some_and(|actor| self.actors.contains_key(&actor))
            }
        }
    }

    /// Effects currently modifying an actor, in id order.
    pub fn applied_effects(
        &self,
        actor: ActorId,
        policy: TransferPolicy,
    ) -> impl Iterator<Item = &EffectRecord> {
        self.effects.values().filter(move |e| {
            self.effect_actor(e) == Some(actor) && self.modifies_actor(e, policy)
        })
    }

    /// Effects whose applicability is governed by an item.
    ///
    /// Under the modern policy these are the effects the item holds. Under
    /// the legacy policy they are the copies on the item's actor whose origin
    /// is the item.
    pub fn item_effects(
        &self,
        item: ItemId,
        policy: TransferPolicy,
    ) -> impl Iterator<Item = &EffectRecord> {
        let holder = self.item(item).and_then(|i| i.actor);
        self.effects.values().filter(move |e| match policy {
            TransferPolicy::Modern => e.owner == Owner::Item(item),
            TransferPolicy::Legacy => {
                holder.is_some_and(|actor| e.owner == Owner::Actor(actor))
                    && e.origin == Some(DocumentRef::Item(item))
            }
        })
    }

    // === Presentation ===

    /// Best token for an actor: its synthetic token, else the first token on
    /// the active scene that represents it.
    #[must_use]
    pub fn actor_token(&self, actor: ActorId) -> Option<&Token> {
        if let Some(token) = self
            .actor(actor)
            .and_then(|a| a.token)
            .and_then(|t| self.tokens.get(&t))
        {
            return Some(token);
        }
        let scene = self.active_scene?;
        self.tokens
            .values()
            .find(|t| t.scene == scene && t.actor == Some(actor))
    }
}
