//! Client-side game state: entity registry, player list, and the avatar.

pub mod avatar;
pub mod components;
pub mod entity_registry;
pub mod game_world;
pub mod inventory;
pub mod player_list;

pub use avatar::{Avatar, Experience};
pub use entity_registry::{EntityRegistry, EntitySnapshot};
pub use game_world::GameWorld;
pub use inventory::Window;
pub use player_list::{PlayerList, PlayerListEntry};
