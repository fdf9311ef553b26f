//! Edge-trigger detection.
//!
//! Every peer receives the same stream of change notifications. This module
//! turns each raw before/after pair into the semantic triggers it
//! represents: effect creation and deletion, enable/disable toggles (direct
//! or through an owning item), combat turn, round and encounter boundaries,
//! defeat, and named rules-system events.
//!
//! ## Key Components
//!
//! - [`Notification`]: a change plus the worlds on either side of it
//! - [`TriggerClassifier`]: pure notification-to-triggers function
//! - [`CombatTracker`]: combat timeline rules, including backward-move
//!   suppression
//! - [`FiredTrigger`]: one `(effect, trigger, context)` tuple to dispatch
//!
//! ## Example
//!
//! ```
//! use effect_scripts::core::{Actor, ActorId, EffectId, EffectRecord, SessionConfig, World};
//! use effect_scripts::scripts::TriggerType;
//! use effect_scripts::triggers::{Change, Notification, TriggerClassifier};
//!
//! let mut before = World::new();
//! before.add_actor(Actor::new(ActorId(1), "Hero"));
//! before.add_effect(
//!     EffectRecord::on_actor(EffectId(1), "Rage", ActorId(1))
//!         .disabled(true)
//!         .with_script(TriggerType::OnEnable, "notify(\"raging\");"),
//! );
//!
//! let mut after = before.clone();
//! after.effect_mut(EffectId(1)).unwrap().disabled = false;
//!
//! let classifier = TriggerClassifier::new(&SessionConfig::default());
//! let notification = Notification::new(Change::EffectUpdated { effect: EffectId(1) }, before, after);
//! let fired = classifier.classify(&notification);
//!
//! assert_eq!(fired.len(), 1);
//! assert_eq!(fired[0].trigger, TriggerType::OnEnable);
//! ```

mod classifier;
mod combat;
mod fired;
mod notification;

pub use classifier::{ToggleSnapshot, ToggleTriggers, TriggerClassifier};
pub use combat::{CombatSnapshot, CombatTracker, TimelineStep};
pub use fired::{FiredTrigger, Phase};
pub use notification::{Change, CombatDelta, Notification, Subject, SystemEvent, REST_COMPLETED};
