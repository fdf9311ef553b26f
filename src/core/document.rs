//! Host documents: actors, items, effect records, scenes and tokens.
//!
//! These mirror the external document layer closely enough for trigger
//! classification and for building a script's environment. The engine never
//! owns their lifecycle; it reads them from a [`World`](super::World)
//! snapshot and only ever writes script text back onto effect records.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::ids::{ActorId, DocumentRef, EffectId, ItemId, SceneId, TokenId, UserId};
use super::user::{Permission, User};
use crate::scripts::TriggerType;

/// An actor: a creature or character that effects modify.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,

    /// Permission for users without an explicit entry.
    pub default_permission: Permission,

    /// Explicit per-user permission levels.
    pub ownership: FxHashMap<UserId, Permission>,

    /// Synthetic token this actor belongs to (unlinked token actors).
    pub token: Option<TokenId>,
}

impl Actor {
    pub fn new(id: ActorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            default_permission: Permission::None,
            ownership: FxHashMap::default(),
            token: None,
        }
    }

    /// Grant a user a permission level (builder pattern).
    #[must_use]
    pub fn with_permission(mut self, user: UserId, level: Permission) -> Self {
        self.ownership.insert(user, level);
        self
    }

    /// Grant a user ownership (builder pattern).
    #[must_use]
    pub fn owned_by(self, user: UserId) -> Self {
        self.with_permission(user, Permission::Owner)
    }

    /// Set the default permission (builder pattern).
    #[must_use]
    pub fn with_default_permission(mut self, level: Permission) -> Self {
        self.default_permission = level;
        self
    }

    /// Bind to a synthetic token (builder pattern).
    #[must_use]
    pub fn with_token(mut self, token: TokenId) -> Self {
        self.token = Some(token);
        self
    }

    /// Effective permission of a user. Privileged users always own.
    #[must_use]
    pub fn permission_of(&self, user: &User) -> Permission {
        if user.is_privileged() {
            return Permission::Owner;
        }
        self.ownership
            .get(&user.id)
            .copied()
            .unwrap_or(self.default_permission)
    }

    #[must_use]
    pub fn is_owner(&self, user: &User) -> bool {
        self.permission_of(user) >= Permission::Owner
    }
}

/// Attunement requirement of an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Attunement {
    #[default]
    NotRequired,
    /// Attunement required but not yet given; suppresses the item's effects.
    Required,
    Attuned,
}

/// An item, optionally embedded in an actor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,

    /// Owning actor. `None` for world-level items.
    pub actor: Option<ActorId>,

    /// Equipped state. `None` for items that cannot be equipped.
    pub equipped: Option<bool>,

    pub attunement: Attunement,
}

impl Item {
    /// Create a world-level (not embedded) item.
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            actor: None,
            equipped: None,
            attunement: Attunement::NotRequired,
        }
    }

    /// Embed in an actor (builder pattern).
    #[must_use]
    pub fn held_by(mut self, actor: ActorId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Make equippable with the given state (builder pattern).
    #[must_use]
    pub fn equipped(mut self, equipped: bool) -> Self {
        self.equipped = Some(equipped);
        self
    }

    /// Set attunement (builder pattern).
    #[must_use]
    pub fn with_attunement(mut self, attunement: Attunement) -> Self {
        self.attunement = attunement;
        self
    }

    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.actor.is_some()
    }

    /// Does this item currently suppress the effects it grants?
    ///
    /// Unequipped gear and un-attuned magic items do.
    #[must_use]
    pub fn suppresses_effects(&self) -> bool {
        self.equipped == Some(false) || self.attunement == Attunement::Required
    }
}

/// The document an effect record is embedded in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    Actor(ActorId),
    Item(ItemId),
}

/// A status-effect record carrying triggerable scripts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectRecord {
    pub id: EffectId,
    pub name: String,

    /// Embedding document.
    pub owner: Owner,

    /// Explicitly disabled by a user.
    pub disabled: bool,

    /// Suppressed by the host rules system for reasons outside the item model.
    pub suppressed: bool,

    /// Does an item-held effect apply to the item's actor?
    pub transfer: bool,

    /// What created this effect.
    pub origin: Option<DocumentRef>,

    /// Script text per trigger. See [`ScriptableEntity`](crate::scripts::ScriptableEntity).
    pub(crate) scripts: FxHashMap<TriggerType, String>,
}

impl EffectRecord {
    /// Create an enabled effect owned by `owner`.
    pub fn new(id: EffectId, name: impl Into<String>, owner: Owner) -> Self {
        Self {
            id,
            name: name.into(),
            owner,
            disabled: false,
            suppressed: false,
            transfer: true,
            origin: None,
            scripts: FxHashMap::default(),
        }
    }

    /// Create an enabled effect directly on an actor.
    pub fn on_actor(id: EffectId, name: impl Into<String>, actor: ActorId) -> Self {
        Self::new(id, name, Owner::Actor(actor))
    }

    /// Create an enabled effect held by an item.
    pub fn on_item(id: EffectId, name: impl Into<String>, item: ItemId) -> Self {
        Self::new(id, name, Owner::Item(item))
    }

    /// Set the disabled flag (builder pattern).
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set the host suppression flag (builder pattern).
    #[must_use]
    pub fn suppressed(mut self, suppressed: bool) -> Self {
        self.suppressed = suppressed;
        self
    }

    /// Set the transfer flag (builder pattern).
    #[must_use]
    pub fn with_transfer(mut self, transfer: bool) -> Self {
        self.transfer = transfer;
        self
    }

    /// Set the origin (builder pattern).
    #[must_use]
    pub fn with_origin(mut self, origin: DocumentRef) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Attach script text (builder pattern). Empty text is ignored.
    #[must_use]
    pub fn with_script(mut self, trigger: TriggerType, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.trim().is_empty() {
            self.scripts.insert(trigger, text);
        }
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    pub name: String,
}

impl Scene {
    pub fn new(id: SceneId, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// A token placed on a scene.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub name: String,
    pub scene: SceneId,

    /// Represented actor.
    pub actor: Option<ActorId>,
}

impl Token {
    pub fn new(id: TokenId, name: impl Into<String>, scene: SceneId) -> Self {
        Self {
            id,
            name: name.into(),
            scene,
            actor: None,
        }
    }

    /// Represent an actor (builder pattern).
    #[must_use]
    pub fn representing(mut self, actor: ActorId) -> Self {
        self.actor = Some(actor);
        self
    }
}
