//! Users, roles and document permissions.
//!
//! ## User
//!
//! A user is one peer's identity in the session. Whether it is connected
//! (`active`) and whether it is privileged (assistant or game master) are the
//! only facts executor election needs.
//!
//! ## Permission
//!
//! Ownership levels on an actor, ordered from `None` to `Owner`.

use serde::{Deserialize, Serialize};

use super::ids::{ActorId, UserId};

/// User role. Assistants and game masters are privileged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum UserRole {
    #[default]
    Player,
    Trusted,
    Assistant,
    GameMaster,
}

impl UserRole {
    /// Privileged roles may act for any actor and edit any script.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        matches!(self, UserRole::Assistant | UserRole::GameMaster)
    }
}

/// Permission level a user holds on an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Permission {
    #[default]
    None,
    Limited,
    Observer,
    Owner,
}

/// A user of the shared session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier.
    pub id: UserId,

    /// Display name.
    pub name: String,

    /// Role; decides privilege.
    pub role: UserRole,

    /// Is this user currently connected?
    pub active: bool,

    /// The player-character actor assigned to this user, if any.
    pub character: Option<ActorId>,
}

impl User {
    /// Create a connected, non-privileged user.
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            role: UserRole::Player,
            active: true,
            character: None,
        }
    }

    /// Create a connected game master.
    pub fn game_master(id: UserId, name: impl Into<String>) -> Self {
        Self::new(id, name).with_role(UserRole::GameMaster)
    }

    /// Set the role (builder pattern).
    #[must_use]
    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    /// Assign a player character (builder pattern).
    #[must_use]
    pub fn with_character(mut self, actor: ActorId) -> Self {
        self.character = Some(actor);
        self
    }

    /// Mark the user as disconnected (builder pattern).
    #[must_use]
    pub fn disconnected(mut self) -> Self {
        self.active = false;
        self
    }

    #[must_use]
    pub fn is_privileged(&self) -> bool {
        self.role.is_privileged()
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
