//! Executor election.
//!
//! Every peer evaluates the same rule against the same world and so agrees,
//! without messaging, on which single user runs an actor's scripts:
//!
//! 1. the connected non-privileged owner of the actor with the lowest id;
//! 2. otherwise the connected privileged user with the lowest id;
//! 3. otherwise nobody, and the event is dropped.
//!
//! The decision is recomputed for every event from current connection
//! state. Users iterate in id order, which makes "first match" and "lowest
//! id" the same thing.

use crate::core::{ActorId, UserId, World};

/// The user responsible for running `actor`'s scripts, if anyone is.
#[must_use]
pub fn designated_executor(world: &World, actor: ActorId) -> Option<UserId> {
    let actor = world.actor(actor)?;

    world
        .users
        .values()
        .find(|u| u.active && !u.is_privileged() && actor.is_owner(u))
        .or_else(|| world.users.values().find(|u| u.active && u.is_privileged()))
        .map(|u| u.id)
}

/// Is `user` the one responsible for `actor`'s scripts?
#[must_use]
pub fn is_executor(world: &World, actor: ActorId, user: UserId) -> bool {
    designated_executor(world, actor) == Some(user)
}
