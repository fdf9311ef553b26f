//! Core session types: ids, users, documents, encounters, world state, configuration.
//!
//! This module models the parts of the external document layer the engine
//! reads. Hosts translate their own documents into these types.

pub mod ids;
pub mod user;
pub mod document;
pub mod combat;
pub mod world;
pub mod config;

pub use ids::{ActorId, CombatId, CombatantId, DocumentRef, EffectId, ItemId, SceneId, TokenId, UserId};
pub use user::{Permission, User, UserRole};
pub use document::{Actor, Attunement, EffectRecord, Item, Owner, Scene, Token};
pub use combat::{Combat, Combatant};
pub use world::World;
pub use config::{SandboxLimits, SessionConfig, TogglePolicy, TransferPolicy};
