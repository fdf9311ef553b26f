//! Document identification.
//!
//! Every host document (user, actor, item, effect, scene, token, combat,
//! combatant) has a typed id. Ids are stable across peers and totally
//! ordered, which is what makes executor election deterministic: every peer
//! sorts the same users the same way.
//!
//! ## Usage
//!
//! ```
//! use effect_scripts::core::{ActorId, DocumentRef, ItemId};
//!
//! let actor = ActorId::new(3);
//! assert_eq!(actor.raw(), 3);
//! assert_eq!(format!("{}", actor), "Actor(3)");
//!
//! let origin = DocumentRef::Item(ItemId::new(7));
//! assert_eq!(format!("{}", origin), "Item(7)");
//! ```

use serde::{Deserialize, Serialize};

macro_rules! document_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Create a new id.
            #[must_use]
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            /// Get the raw id value.
            #[must_use]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

document_id!(
    /// A connected (or known) user identity. Lower ids win executor election.
    UserId,
    "User"
);
document_id!(
    /// An actor: the thing effects ultimately modify.
    ActorId,
    "Actor"
);
document_id!(
    /// An item, optionally embedded in an actor.
    ItemId,
    "Item"
);
document_id!(
    /// A status-effect record.
    EffectId,
    "Effect"
);
document_id!(SceneId, "Scene");
document_id!(TokenId, "Token");
document_id!(
    /// An encounter.
    CombatId,
    "Combat"
);
document_id!(CombatantId, "Combatant");

/// Reference to a document by kind and id.
///
/// Used for effect origins: the document that caused an effect to exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentRef {
    Actor(ActorId),
    Item(ItemId),
    Effect(EffectId),
}

impl std::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentRef::Actor(id) => write!(f, "{}", id),
            DocumentRef::Item(id) => write!(f, "{}", id),
            DocumentRef::Effect(id) => write!(f, "{}", id),
        }
    }
}
