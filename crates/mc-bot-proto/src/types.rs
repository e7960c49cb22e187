//! Base data types shared by the event vocabulary and the state model.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Range, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProtoError;

// ---------------------------------------------------------------------------
// Vec3d (f64 x, y, z)
// ---------------------------------------------------------------------------

/// World-space position or velocity, in blocks.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3d {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(&self, other: &Vec3d) -> f64 {
        (*self - *other).length()
    }
}

impl Add for Vec3d {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3d {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3d {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3d {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3d {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vec3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// Uuid
// ---------------------------------------------------------------------------

/// 128-bit account/entity UUID, serialized in the hyphenated text form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uuid {
    pub most_significant: u64,
    pub least_significant: u64,
}

impl Uuid {
    pub const ZERO: Self = Self {
        most_significant: 0,
        least_significant: 0,
    };

    pub fn new(most: u64, least: u64) -> Self {
        Self {
            most_significant: most,
            least_significant: least,
        }
    }

    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let value = u128::from_be_bytes(bytes);
        Self::new((value >> 64) as u64, value as u64)
    }

    pub fn to_bytes(self) -> [u8; 16] {
        let value = ((self.most_significant as u128) << 64) | self.least_significant as u128;
        value.to_be_bytes()
    }

    /// Name-based (version 3) UUID the vanilla server assigns to offline-mode accounts.
    pub fn offline_player(name: &str) -> Self {
        let mut bytes = md5::compute(format!("OfflinePlayer:{name}")).0;
        bytes[6] = (bytes[6] & 0x0F) | 0x30;
        bytes[8] = (bytes[8] & 0x3F) | 0x80;
        Self::from_bytes(bytes)
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: String = self.to_bytes().iter().map(|b| format!("{b:02x}")).collect();
        write!(
            f,
            "{}-{}-{}-{}-{}",
            &hex[0..8],
            &hex[8..12],
            &hex[12..16],
            &hex[16..20],
            &hex[20..32]
        )
    }
}

impl FromStr for Uuid {
    type Err = ProtoError;

    /// Accepts both the hyphenated and the bare 32-digit form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().filter(|c| *c != '-').collect();
        if digits.len() != 32 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ProtoError::InvalidUuid(s.to_string()));
        }
        let value =
            u128::from_str_radix(&digits, 16).map_err(|_| ProtoError::InvalidUuid(s.to_string()))?;
        Ok(Self::new((value >> 64) as u64, value as u64))
    }
}

impl TryFrom<String> for Uuid {
    type Error = ProtoError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Uuid> for String {
    fn from(value: Uuid) -> Self {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// GameProfile
// ---------------------------------------------------------------------------

/// Account identity: id plus name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameProfile {
    pub id: Uuid,
    pub name: String,
}

impl GameProfile {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Profile with the offline-mode UUID for `name`.
    pub fn offline(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: Uuid::offline_player(&name),
            name,
        }
    }
}

impl fmt::Display for GameProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

// ---------------------------------------------------------------------------
// GameMode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Survival,
    Creative,
    Adventure,
    Spectator,
}

impl TryFrom<u8> for GameMode {
    type Error = ProtoError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(GameMode::Survival),
            1 => Ok(GameMode::Creative),
            2 => Ok(GameMode::Adventure),
            3 => Ok(GameMode::Spectator),
            other => Err(ProtoError::InvalidGameMode(other)),
        }
    }
}

impl From<GameMode> for u8 {
    fn from(mode: GameMode) -> Self {
        match mode {
            GameMode::Survival => 0,
            GameMode::Creative => 1,
            GameMode::Adventure => 2,
            GameMode::Spectator => 3,
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameMode::Survival => "survival",
            GameMode::Creative => "creative",
            GameMode::Adventure => "adventure",
            GameMode::Spectator => "spectator",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// BlockPos (i32 x, y, z)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Convert to the chunk position that contains this block.
    pub fn chunk_pos(&self) -> ChunkPos {
        ChunkPos::new(self.x >> 4, self.z >> 4)
    }

    /// Coordinates relative to the containing column: x and z in `[0, 15]`, y unchanged.
    pub fn column_local(&self) -> (usize, i32, usize) {
        ((self.x & 15) as usize, self.y, (self.z & 15) as usize)
    }

    /// Convert a floating-point position to a block position (floor).
    pub fn from_vec3d(v: &Vec3d) -> Self {
        Self {
            x: v.x.floor() as i32,
            y: v.y.floor() as i32,
            z: v.z.floor() as i32,
        }
    }

    /// Corner of the block as a floating-point position.
    pub fn as_vec3d(&self) -> Vec3d {
        Vec3d::new(self.x as f64, self.y as f64, self.z as f64)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// ChunkPos (i32 x, z)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Range of block X coordinates within this chunk.
    pub fn block_x_range(&self) -> Range<i32> {
        let start = self.x << 4;
        start..start + 16
    }

    /// Range of block Z coordinates within this chunk.
    pub fn block_z_range(&self) -> Range<i32> {
        let start = self.z << 4;
        start..start + 16
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// A non-empty stack of items in a window slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id: i32,
    pub count: u8,
    #[serde(default)]
    pub damage: i16,
}

impl ItemStack {
    pub fn new(item_id: i32, count: u8) -> Self {
        Self {
            item_id,
            count,
            damage: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Entity metadata
// ---------------------------------------------------------------------------

/// One typed metadata value, keyed by its index in the entity's metadata table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MetadataValue {
    Byte(i8),
    VarInt(i32),
    Float(f32),
    String(String),
    Chat(String),
    Item(Option<ItemStack>),
    Boolean(bool),
    Rotation(f32, f32, f32),
    Position(BlockPos),
    OptPosition(Option<BlockPos>),
    Direction(u8),
    OptUuid(Option<Uuid>),
    BlockState(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub index: u8,
    pub value: MetadataValue,
}

impl MetadataEntry {
    pub fn new(index: u8, value: MetadataValue) -> Self {
        Self { index, value }
    }
}

/// Entity metadata table keyed by index.
pub type Metadata = BTreeMap<u8, MetadataValue>;

/// Build a metadata table from wire entries; later duplicates win.
pub fn metadata_from_entries(entries: &[MetadataEntry]) -> Metadata {
    entries
        .iter()
        .map(|entry| (entry.index, entry.value.clone()))
        .collect()
}

// ===========================================================================
// Tests
// ===========================================================================
