//! Server roster (tab list), keyed by account UUID.
//!
//! An entry may exist without a spawned entity (out of render distance) and a
//! player entity may exist before its entry (late roster packet). Whichever
//! arrives second links the two; see [`link`].

use std::collections::HashMap;

use tracing::debug;

use mc_bot_proto::types::{GameMode, GameProfile, Uuid};

use crate::entity_registry::EntityRegistry;

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerListEntry {
    pub profile: GameProfile,
    pub display_name: Option<String>,
    pub game_mode: Option<GameMode>,
    /// Latency in milliseconds.
    pub ping: i32,
    /// Back half of the entity ↔ roster link.
    pub entity_id: Option<i32>,
}

impl PlayerListEntry {
    pub fn new(profile: GameProfile) -> Self {
        Self {
            profile,
            display_name: None,
            game_mode: None,
            ping: 0,
            entity_id: None,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.profile.id
    }
}

#[derive(Debug, Default)]
pub struct PlayerList {
    entries: HashMap<Uuid, PlayerListEntry>,
}

impl PlayerList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, uuid: Uuid) -> bool {
        self.entries.contains_key(&uuid)
    }

    pub fn get(&self, uuid: Uuid) -> Option<&PlayerListEntry> {
        self.entries.get(&uuid)
    }

    pub fn get_mut(&mut self, uuid: Uuid) -> Option<&mut PlayerListEntry> {
        self.entries.get_mut(&uuid)
    }

    /// Fetch the entry for `profile`, creating it if absent. The flag is `true` when created.
    pub fn get_or_insert(&mut self, profile: &GameProfile) -> (&mut PlayerListEntry, bool) {
        let mut inserted = false;
        let entry = self.entries.entry(profile.id).or_insert_with(|| {
            inserted = true;
            PlayerListEntry::new(profile.clone())
        });
        (entry, inserted)
    }

    pub fn remove(&mut self, uuid: Uuid) -> Option<PlayerListEntry> {
        self.entries.remove(&uuid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerListEntry> {
        self.entries.values()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop every entity back-reference (the entity registry was replaced).
    pub fn clear_entity_links(&mut self) {
        for entry in self.entries.values_mut() {
            entry.entity_id = None;
        }
    }
}

/// Link entity `entity_id` and roster entry `uuid` in both directions, first
/// breaking any link either side held to something else. Returns `false`
/// when there is no entry for `uuid`.
pub fn link(
    entities: &mut EntityRegistry,
    players: &mut PlayerList,
    entity_id: i32,
    uuid: Uuid,
) -> bool {
    if !players.contains(uuid) {
        return false;
    }
    if let Some(old_uuid) = entities.roster_link(entity_id) {
        if old_uuid != uuid {
            if let Some(old_entry) = players.get_mut(old_uuid) {
                old_entry.entity_id = None;
            }
        }
    }
    if let Some(entry) = players.get_mut(uuid) {
        if let Some(old_entity) = entry.entity_id {
            if old_entity != entity_id {
                entities.set_roster_link(old_entity, None);
            }
        }
        entry.entity_id = Some(entity_id);
    }
    entities.set_roster_link(entity_id, Some(uuid));
    debug!("Linked entity {entity_id} to player {uuid}");
    true
}

/// Break the link of a removed roster entry.
pub fn unlink_entry(entities: &mut EntityRegistry, entry: &PlayerListEntry) {
    if let Some(entity_id) = entry.entity_id {
        if entities.roster_link(entity_id) == Some(entry.uuid()) {
            entities.set_roster_link(entity_id, None);
        }
    }
}

/// Break the link of a removed entity.
pub fn unlink_entity(players: &mut PlayerList, entity_id: i32, roster: Option<Uuid>) {
    let Some(uuid) = roster else {
        return;
    };
    if let Some(entry) = players.get_mut(uuid) {
        if entry.entity_id == Some(entity_id) {
            entry.entity_id = None;
        }
    }
}

/// Break whatever link entity `entity_id` holds, on both sides.
pub fn unlink(entities: &mut EntityRegistry, players: &mut PlayerList, entity_id: i32) {
    let roster = entities.roster_link(entity_id);
    if roster.is_some() {
        entities.set_roster_link(entity_id, None);
    }
    unlink_entity(players, entity_id, roster);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::EntityKind;

    fn profile(n: u64, name: &str) -> GameProfile {
        GameProfile::new(Uuid::new(0, n), name)
    }

    /// Every non-null back-reference must be mirrored by the entity's forward reference.
    fn assert_consistent(entities: &EntityRegistry, players: &PlayerList) {
        for entry in players.iter() {
            if let Some(id) = entry.entity_id {
                assert_eq!(entities.roster_link(id), Some(entry.uuid()));
            }
        }
        for id in entities.ids() {
            if let Some(uuid) = entities.roster_link(id) {
                assert_eq!(players.get(uuid).and_then(|e| e.entity_id), Some(id));
            }
        }
    }

    #[test]
    fn get_or_insert_reports_creation() {
        let mut players = PlayerList::new();
        let alice = profile(1, "alice");
        let (_, created) = players.get_or_insert(&alice);
        assert!(created);
        let (entry, created) = players.get_or_insert(&alice);
        assert!(!created);
        entry.ping = 42;
        assert_eq!(players.get(alice.id).unwrap().ping, 42);
    }

    #[test]
    fn link_requires_entry() {
        let mut entities = EntityRegistry::new();
        let mut players = PlayerList::new();
        entities.set_kind(1, EntityKind::Player);
        assert!(!link(&mut entities, &mut players, 1, Uuid::new(0, 1)));
        assert_eq!(entities.roster_link(1), None);
    }

    #[test]
    fn link_both_directions() {
        let mut entities = EntityRegistry::new();
        let mut players = PlayerList::new();
        let alice = profile(1, "alice");
        players.get_or_insert(&alice);
        assert!(link(&mut entities, &mut players, 7, alice.id));
        assert_eq!(players.get(alice.id).unwrap().entity_id, Some(7));
        assert_eq!(entities.roster_link(7), Some(alice.id));
        assert_consistent(&entities, &players);
    }

    #[test]
    fn relink_breaks_stale_links() {
        let mut entities = EntityRegistry::new();
        let mut players = PlayerList::new();
        let alice = profile(1, "alice");
        let bob = profile(2, "bob");
        players.get_or_insert(&alice);
        players.get_or_insert(&bob);

        link(&mut entities, &mut players, 7, alice.id);
        // alice respawned under a new id
        link(&mut entities, &mut players, 8, alice.id);
        assert_eq!(entities.roster_link(7), None);
        assert_consistent(&entities, &players);

        // entity 8 re-assigned to bob
        link(&mut entities, &mut players, 8, bob.id);
        assert_eq!(players.get(alice.id).unwrap().entity_id, None);
        assert_consistent(&entities, &players);
    }

    #[test]
    fn unlink_on_either_side() {
        let mut entities = EntityRegistry::new();
        let mut players = PlayerList::new();
        let alice = profile(1, "alice");
        players.get_or_insert(&alice);
        link(&mut entities, &mut players, 7, alice.id);

        let entry = players.remove(alice.id).unwrap();
        unlink_entry(&mut entities, &entry);
        assert_eq!(entities.roster_link(7), None);

        players.get_or_insert(&alice);
        link(&mut entities, &mut players, 7, alice.id);
        let removed = entities.remove(7).unwrap();
        unlink_entity(&mut players, removed.id, removed.roster);
        assert_eq!(players.get(alice.id).unwrap().entity_id, None);
        assert_consistent(&entities, &players);
    }

    #[test]
    fn unlink_clears_both_sides() {
        let mut entities = EntityRegistry::new();
        let mut players = PlayerList::new();
        let alice = profile(1, "alice");
        players.get_or_insert(&alice);
        link(&mut entities, &mut players, 7, alice.id);

        unlink(&mut entities, &mut players, 7);
        assert_eq!(entities.roster_link(7), None);
        assert_eq!(players.get(alice.id).unwrap().entity_id, None);
        // unlinked entities are left alone
        unlink(&mut entities, &mut players, 8);
        assert_consistent(&entities, &players);
    }

    #[test]
    fn clear_entity_links() {
        let mut entities = EntityRegistry::new();
        let mut players = PlayerList::new();
        let alice = profile(1, "alice");
        players.get_or_insert(&alice);
        link(&mut entities, &mut players, 7, alice.id);
        players.clear_entity_links();
        assert_eq!(players.get(alice.id).unwrap().entity_id, None);
    }
}
