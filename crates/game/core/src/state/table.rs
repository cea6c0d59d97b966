//! Id-keyed owner of every live actor.

use std::collections::BTreeMap;

use super::types::{Actor, ActorId, RoomId};

/// All actors known to the rules core, iterated in id order.
#[derive(Clone, Debug, Default)]
pub struct ActorTable {
    actors: BTreeMap<ActorId, Actor>,
    roll_streams: u32,
}

impl ActorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an actor, replacing any previous actor with the same id.
    pub fn insert(&mut self, actor: Actor) -> Option<Actor> {
        self.actors.insert(actor.id, actor)
    }

    pub fn remove(&mut self, id: ActorId) -> Option<Actor> {
        self.actors.remove(&id)
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Hands out a fresh roll stream number.
    ///
    /// Every casting step draws its dice from its own stream, so two steps
    /// by one actor within one tick never repeat each other's rolls.
    pub fn next_roll_stream(&mut self) -> u32 {
        self.roll_streams = self.roll_streams.wrapping_add(1);
        self.roll_streams
    }

    pub fn ids(&self) -> Vec<ActorId> {
        self.actors.keys().copied().collect()
    }

    /// Ids of actors in `room`, in id order.
    pub fn in_room(&self, room: RoomId) -> Vec<ActorId> {
        self.actors
            .values()
            .filter(|actor| actor.room == room)
            .map(|actor| actor.id)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}
