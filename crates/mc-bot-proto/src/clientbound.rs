//! Server → Client events, already decoded by the transport.
//!
//! Positions and velocities arrive in blocks, angles in degrees. Relative
//! entity movement keeps the raw fixed-point deltas; see [`DELTA_SCALE`].

use serde::{Deserialize, Serialize};

use crate::types::{
    BlockPos, GameMode, GameProfile, ItemStack, MetadataEntry, Uuid, Vec3d,
};

/// Raw relative-move units per block (128 × 32).
pub const DELTA_SCALE: f64 = 128.0 * 32.0;

/// Convert a raw relative-move triple to a block offset.
pub fn decode_delta(dx: i16, dy: i16, dz: i16) -> Vec3d {
    Vec3d::new(
        dx as f64 / DELTA_SCALE,
        dy as f64 / DELTA_SCALE,
        dz as f64 / DELTA_SCALE,
    )
}

/// Coordinates a player position correction may mark as relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionElement {
    X,
    Y,
    Z,
    Yaw,
    Pitch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerListAction {
    AddPlayer,
    UpdateGameMode,
    UpdateLatency,
    UpdateDisplayName,
    RemovePlayer,
}

/// One row of a roster delta. Fields not carried by the action are left at their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerListItem {
    pub profile: GameProfile,
    #[serde(default)]
    pub game_mode: Option<GameMode>,
    #[serde(default)]
    pub ping: i32,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A 16×16×16 section of block states, palette-indexed in XZY order: `(x*16 + z)*16 + y`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionData {
    pub palette: Vec<u32>,
    pub blocks: Vec<u16>,
}

/// Decoded terrain for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnData {
    pub x: i32,
    pub z: i32,
    /// Full columns replace; partial ones patch the sections they carry.
    #[serde(default = "default_full")]
    pub full: bool,
    /// Indexed by section y (`0..16`); `None` = all air / not sent.
    pub sections: Vec<Option<SectionData>>,
}

fn default_full() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockChangeRecord {
    pub position: BlockPos,
    pub block: u32,
}

/// Typed payload of a game-state notification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameStateChange {
    BeginRain,
    EndRain,
    ChangeGameMode { mode: GameMode },
    RainStrength { strength: f32 },
    ThunderStrength { strength: f32 },
    /// Reasons the model does not track (credits, demo messages, arrow hits, ...).
    Other { reason: u8, value: f32 },
}

/// Server → Client event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientboundEvent {
    // --- session / avatar ---
    JoinGame {
        entity_id: i32,
        game_mode: GameMode,
        dimension: i32,
    },
    Respawn {
        dimension: i32,
        game_mode: GameMode,
    },
    Chat {
        message: String,
    },
    PlayerHealth {
        health: f32,
        food: i32,
        saturation: f32,
    },
    SetExperience {
        /// Progress through the current level, 0.0 - 1.0.
        progress: f32,
        level: i32,
        total: i32,
    },
    PlayerPositionRotation {
        position: Vec3d,
        yaw: f32,
        pitch: f32,
        #[serde(default)]
        relative: Vec<PositionElement>,
        teleport_id: i32,
    },
    VehicleMove {
        position: Vec3d,
        yaw: f32,
        pitch: f32,
    },

    // --- roster ---
    PlayerListEntry {
        action: PlayerListAction,
        entries: Vec<PlayerListItem>,
    },

    // --- spawns ---
    SpawnPlayer {
        entity_id: i32,
        uuid: Uuid,
        position: Vec3d,
        yaw: f32,
        pitch: f32,
        #[serde(default)]
        metadata: Vec<MetadataEntry>,
    },
    SpawnObject {
        entity_id: i32,
        uuid: Uuid,
        object_type: i32,
        #[serde(default)]
        data: i32,
        position: Vec3d,
        yaw: f32,
        pitch: f32,
        #[serde(default)]
        velocity: Vec3d,
    },
    SpawnMob {
        entity_id: i32,
        uuid: Uuid,
        mob_type: i32,
        position: Vec3d,
        yaw: f32,
        pitch: f32,
        head_yaw: f32,
        #[serde(default)]
        velocity: Vec3d,
        #[serde(default)]
        metadata: Vec<MetadataEntry>,
    },
    SpawnPainting {
        entity_id: i32,
        uuid: Uuid,
        painting_type: String,
        direction: u8,
        position: BlockPos,
    },
    SpawnExpOrb {
        entity_id: i32,
        position: Vec3d,
        count: i32,
    },
    SpawnGlobalEntity {
        entity_id: i32,
        global_type: i32,
        position: Vec3d,
    },
    DestroyEntities {
        entity_ids: Vec<i32>,
    },

    // --- entity transform ---
    EntityTeleport {
        entity_id: i32,
        position: Vec3d,
        yaw: f32,
        pitch: f32,
        on_ground: bool,
    },
    EntityVelocity {
        entity_id: i32,
        velocity: Vec3d,
    },
    EntityPosition {
        entity_id: i32,
        dx: i16,
        dy: i16,
        dz: i16,
        on_ground: bool,
    },
    EntityPositionRotation {
        entity_id: i32,
        dx: i16,
        dy: i16,
        dz: i16,
        yaw: f32,
        pitch: f32,
        on_ground: bool,
    },
    EntityRotation {
        entity_id: i32,
        yaw: f32,
        pitch: f32,
        on_ground: bool,
    },
    EntityHeadLook {
        entity_id: i32,
        head_yaw: f32,
    },

    // --- entity relations / attributes ---
    EntityAttach {
        entity_id: i32,
        /// Negative detaches.
        attached_to_id: i32,
    },
    EntitySetPassengers {
        entity_id: i32,
        passenger_ids: Vec<i32>,
    },
    EntityMetadata {
        entity_id: i32,
        metadata: Vec<MetadataEntry>,
    },
    EntityStatus {
        entity_id: i32,
        status: i8,
    },
    EntityAnimation {
        entity_id: i32,
        animation: u8,
    },
    EntityEquipment {
        entity_id: i32,
        slot: u8,
        item: Option<ItemStack>,
    },
    EntityEffect {
        entity_id: i32,
        effect_id: u8,
        amplifier: u8,
        duration: i32,
    },
    EntityRemoveEffect {
        entity_id: i32,
        effect_id: u8,
    },
    CollectItem {
        collected_entity_id: i32,
        collector_entity_id: i32,
        count: i32,
    },

    // --- terrain ---
    ChunkData {
        column: ColumnData,
    },
    UnloadChunk {
        x: i32,
        z: i32,
    },
    BlockChange {
        record: BlockChangeRecord,
    },
    MultiBlockChange {
        records: Vec<BlockChangeRecord>,
    },
    BlockValue {
        position: BlockPos,
        block_id: i32,
        action_type: u8,
        action_param: u8,
    },
    NotifyClient {
        change: GameStateChange,
    },

    // --- windows ---
    WindowItems {
        window_id: u8,
        items: Vec<Option<ItemStack>>,
    },
    SetSlot {
        window_id: i8,
        slot: i16,
        item: Option<ItemStack>,
    },
    HeldItemChange {
        slot: u8,
    },
    OpenWindow {
        window_id: u8,
        window_type: String,
        slot_count: u8,
    },
    CloseWindow {
        window_id: u8,
    },

    // --- handled by the transport ---
    KeepAlive {
        id: i64,
    },

    /// Any packet the decoder recognised but the model does not track.
    Unknown {
        packet_id: i32,
    },
}

impl ClientboundEvent {
    /// Short kind name for logs and error messages.
    pub fn name(&self) -> &'static str {
        use ClientboundEvent::*;
        match self {
            JoinGame { .. } => "JoinGame",
            Respawn { .. } => "Respawn",
            Chat { .. } => "Chat",
            PlayerHealth { .. } => "PlayerHealth",
            SetExperience { .. } => "SetExperience",
            PlayerPositionRotation { .. } => "PlayerPositionRotation",
            VehicleMove { .. } => "VehicleMove",
            PlayerListEntry { .. } => "PlayerListEntry",
            SpawnPlayer { .. } => "SpawnPlayer",
            SpawnObject { .. } => "SpawnObject",
            SpawnMob { .. } => "SpawnMob",
            SpawnPainting { .. } => "SpawnPainting",
            SpawnExpOrb { .. } => "SpawnExpOrb",
            SpawnGlobalEntity { .. } => "SpawnGlobalEntity",
            DestroyEntities { .. } => "DestroyEntities",
            EntityTeleport { .. } => "EntityTeleport",
            EntityVelocity { .. } => "EntityVelocity",
            EntityPosition { .. } => "EntityPosition",
            EntityPositionRotation { .. } => "EntityPositionRotation",
            EntityRotation { .. } => "EntityRotation",
            EntityHeadLook { .. } => "EntityHeadLook",
            EntityAttach { .. } => "EntityAttach",
            EntitySetPassengers { .. } => "EntitySetPassengers",
            EntityMetadata { .. } => "EntityMetadata",
            EntityStatus { .. } => "EntityStatus",
            EntityAnimation { .. } => "EntityAnimation",
            EntityEquipment { .. } => "EntityEquipment",
            EntityEffect { .. } => "EntityEffect",
            EntityRemoveEffect { .. } => "EntityRemoveEffect",
            CollectItem { .. } => "CollectItem",
            ChunkData { .. } => "ChunkData",
            UnloadChunk { .. } => "UnloadChunk",
            BlockChange { .. } => "BlockChange",
            MultiBlockChange { .. } => "MultiBlockChange",
            BlockValue { .. } => "BlockValue",
            NotifyClient { .. } => "NotifyClient",
            WindowItems { .. } => "WindowItems",
            SetSlot { .. } => "SetSlot",
            HeldItemChange { .. } => "HeldItemChange",
            OpenWindow { .. } => "OpenWindow",
            CloseWindow { .. } => "CloseWindow",
            KeepAlive { .. } => "KeepAlive",
            Unknown { .. } => "Unknown",
        }
    }
}
