//! ECS components for every tracked entity (players, mobs, objects, ...).
//!
//! A component that is absent means "not yet known": an entity created by a
//! move packet before its spawn has a [`NetworkId`] and [`EntityKind::Unknown`]
//! but no [`Position`].

use std::f64::consts::PI;

use bevy_ecs::prelude::*;

use mc_bot_proto::types::{Metadata, Uuid, Vec3d};

/// Server-assigned entity id, unique for one connection.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkId(pub i32);

/// What the entity is, with its kind-specific spawn payload.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    /// Referenced by some event before its spawn arrived.
    Unknown,
    Player,
    Object { object_type: i32, data: i32 },
    Mob { mob_type: i32 },
    Painting { painting_type: String, direction: u8 },
    ExpOrb { count: i32 },
    Global { global_type: i32 },
}

/// Entity UUID as sent by the spawn packet.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityUuid(pub Uuid);

/// Position in the world.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec3d);

/// Body orientation in radians.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Look {
    pub yaw: f64,
    pub pitch: f64,
}

impl Look {
    pub fn new(yaw: f64, pitch: f64) -> Self {
        Self { yaw, pitch }
    }

    pub fn from_degrees(yaw: f32, pitch: f32) -> Self {
        Self {
            yaw: rad_from_deg(yaw as f64),
            pitch: rad_from_deg(pitch as f64),
        }
    }

    pub fn yaw_degrees(&self) -> f64 {
        deg_from_rad(self.yaw)
    }

    pub fn pitch_degrees(&self) -> f64 {
        deg_from_rad(self.pitch)
    }
}

pub fn rad_from_deg(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

pub fn deg_from_rad(radians: f64) -> f64 {
    radians * 180.0 / PI
}

/// Head yaw in radians (mobs and players turn their head independently).
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct HeadYaw(pub f64);

/// Velocity vector in blocks/tick.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Velocity(pub Vec3d);

/// Whether the entity is standing on the ground.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnGround(pub bool);

/// Kind-specific metadata table.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct EntityMetadata(pub Metadata);

/// The entity this one rides.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vehicle(pub i32);

/// Entities riding this one, as last published by the server.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct Passengers(pub Vec<i32>);

/// Forward half of the entity ↔ player-list link: the roster entry this entity belongs to.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterLink(pub Uuid);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_degree_roundtrip() {
        let look = Look::from_degrees(90.0, -45.0);
        assert!((look.yaw - PI / 2.0).abs() < 1e-9);
        assert!((look.pitch + PI / 4.0).abs() < 1e-9);
        assert!((look.yaw_degrees() - 90.0).abs() < 1e-9);
        assert!((look.pitch_degrees() + 45.0).abs() < 1e-9);
    }
}
