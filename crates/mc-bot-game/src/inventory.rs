//! The avatar's own inventory window.
//!
//! Player window slot layout: 0 = crafting output, 1-4 = crafting grid,
//! 5-8 = armor, 9-35 = main inventory, 36-44 = hotbar, 45 = offhand.

use mc_bot_proto::types::ItemStack;

/// Window id of the player's own inventory.
pub const PLAYER_WINDOW_ID: u8 = 0;
/// Slot count of the player window.
pub const PLAYER_WINDOW_SIZE: usize = 46;
/// First hotbar slot in the player window.
pub const HOTBAR_START: usize = 36;
/// Number of hotbar slots.
pub const HOTBAR_SIZE: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub window_id: u8,
    pub slots: Vec<Option<ItemStack>>,
    /// Currently selected hotbar slot (0-8).
    pub held_slot: u8,
}

impl Window {
    /// An empty player window.
    pub fn player() -> Self {
        Self {
            window_id: PLAYER_WINDOW_ID,
            slots: vec![None; PLAYER_WINDOW_SIZE],
            held_slot: 0,
        }
    }

    /// Replace all slots, keeping the held slot. Short lists are padded with empty slots.
    pub fn set_items(&mut self, items: Vec<Option<ItemStack>>) {
        self.slots = items;
        if self.slots.len() < PLAYER_WINDOW_SIZE {
            self.slots.resize(PLAYER_WINDOW_SIZE, None);
        }
    }

    pub fn get_slot(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot)?.as_ref()
    }

    /// Set one slot; returns `false` if out of range.
    pub fn set_slot(&mut self, slot: usize, item: Option<ItemStack>) -> bool {
        match self.slots.get_mut(slot) {
            Some(s) => {
                *s = item;
                true
            }
            None => false,
        }
    }

    /// Select a hotbar slot; values above 8 are rejected.
    pub fn select_hotbar(&mut self, slot: u8) -> bool {
        if (slot as usize) < HOTBAR_SIZE {
            self.held_slot = slot;
            true
        } else {
            false
        }
    }

    /// The item in the selected hotbar slot.
    pub fn held_item(&self) -> Option<&ItemStack> {
        self.get_slot(HOTBAR_START + self.held_slot as usize)
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::player()
    }
}
