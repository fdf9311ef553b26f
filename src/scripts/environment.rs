//! The fixed set of values a script can see.
//!
//! Every script runs with exactly these bindings: `effect`, `actor`, `item`,
//! `character`, `token`, `scene`, `origin`, `speaker`, plus `context` for
//! whatever payload the caller passes along (roll results, rest data).
//! Missing documents are bound as `()`.

use rhai::{Dynamic, Scope};
use serde::{Deserialize, Serialize};

use crate::core::{
    Actor, ActorId, DocumentRef, EffectRecord, Item, Owner, Scene, SceneId, Token, TokenId,
    UserId, World,
};
use crate::error::ScriptError;

/// Who a chat message appears to come from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    pub scene: Option<SceneId>,
    pub actor: Option<ActorId>,
    pub token: Option<TokenId>,
    pub alias: Option<String>,
}

impl Speaker {
    /// Speaker for an actor, preferring its token's name as alias.
    #[must_use]
    pub fn for_actor(actor: &Actor, token: Option<&Token>, scene: Option<SceneId>) -> Self {
        Self {
            scene,
            actor: Some(actor.id),
            token: token.map(|t| t.id),
            alias: Some(token.map_or_else(|| actor.name.clone(), |t| t.name.clone())),
        }
    }
}

/// A resolved origin document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OriginDocument {
    Actor(Actor),
    Item(Item),
    Effect(EffectRecord),
}

/// Values bound into a script's scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScriptEnvironment {
    /// The effect whose script is running.
    pub effect: EffectRecord,

    /// The actor the effect belongs to.
    pub actor: Option<Actor>,

    /// The item holding the effect, if it is item-held.
    pub item: Option<Item>,

    /// The executing user's assigned character.
    pub character: Option<Actor>,

    pub token: Option<Token>,
    pub scene: Option<Scene>,
    pub origin: Option<OriginDocument>,
    pub speaker: Speaker,
}

impl ScriptEnvironment {
    /// Resolve every binding for `effect` from `world`, as seen by `user`.
    #[must_use]
    pub fn resolve(world: &World, effect: &EffectRecord, user: Option<UserId>) -> Self {
        let actor = world.effect_actor(effect).and_then(|id| world.actor(id));
        let item = match effect.owner {
            Owner::Item(id) => world.item(id).cloned(),
            Owner::Actor(_) => None,
        };
        let character = user
            .and_then(|id| world.user(id))
            .and_then(|u| u.character)
            .and_then(|id| world.actor(id))
            .cloned();

        let token = actor.and_then(|a| world.actor_token(a.id));
        let scene_id = token.map(|t| t.scene).or(world.active_scene);
        let scene = scene_id.and_then(|id| world.scenes.get(&id)).cloned();

        let origin = effect.origin.and_then(|origin| match origin {
            DocumentRef::Actor(id) => world.actor(id).cloned().map(OriginDocument::Actor),
            DocumentRef::Item(id) => world.item(id).cloned().map(OriginDocument::Item),
            DocumentRef::Effect(id) => world.effect(id).cloned().map(OriginDocument::Effect),
        });

        let speaker = actor
            .map(|a| Speaker::for_actor(a, token, scene_id))
            .unwrap_or_default();

        Self {
            effect: effect.clone(),
            actor: actor.cloned(),
            item,
            character,
            token: token.cloned(),
            scene,
            origin,
            speaker,
        }
    }

    /// Build a fresh scope holding the bindings plus `context`.
    pub fn into_scope(
        self,
        context: Option<&serde_json::Value>,
    ) -> Result<Scope<'static>, ScriptError> {
        let bindings = serde_json::to_value(&self).map_err(|e| ScriptError::Binding {
            name: "environment".to_string(),
            message: e.to_string(),
        })?;

        let mut scope = Scope::new();
        if let serde_json::Value::Object(values) = bindings {
            for (name, value) in values {
                let value = to_dynamic(&name, &value)?;
                scope.push_dynamic(name, value);
            }
        }

        let context = match context {
            Some(value) => to_dynamic("context", value)?,
            None => Dynamic::from(rhai::Map::new()),
        };
        scope.push_dynamic("context", context);
        Ok(scope)
    }
}

fn to_dynamic(name: &str, value: &serde_json::Value) -> Result<Dynamic, ScriptError> {
    rhai::serde::to_dynamic(value).map_err(|e| ScriptError::Binding {
        name: name.to_string(),
        message: e.to_string(),
    })
}
