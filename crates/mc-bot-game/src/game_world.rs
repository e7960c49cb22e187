//! One dimension's worth of state: terrain plus the entities in it.
//!
//! Replaced wholesale on join and respawn, so nothing here outlives a
//! dimension change.

use mc_bot_world::World;

use crate::entity_registry::EntityRegistry;

pub struct GameWorld {
    pub terrain: World,
    pub entities: EntityRegistry,
}

impl GameWorld {
    pub fn new(dimension: i32) -> Self {
        Self {
            terrain: World::new(dimension),
            entities: EntityRegistry::new(),
        }
    }

    pub fn dimension(&self) -> i32 {
        self.terrain.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_world_is_empty() {
        let world = GameWorld::new(-1);
        assert_eq!(world.dimension(), -1);
        assert!(world.entities.is_empty());
        assert_eq!(world.terrain.column_count(), 0);
    }
}
