use super::*;

use mc_bot_game::inventory::PLAYER_WINDOW_ID;
use mc_bot_proto::types::ItemStack;

impl Connection {
    pub(super) fn handle_health(&mut self, health: f32, food: i32, saturation: f32) {
        self.avatar.health = Some(health);
        self.avatar.food = Some(food);
        self.avatar.saturation = Some(saturation);
        if health <= 0.0 {
            info!("Died");
        }
        self.events.push(BotEvent::VitalsChanged {
            health,
            food,
            saturation,
        });
    }

    // -----------------------------------------------------------------------
    // Inventory (player window only)
    // -----------------------------------------------------------------------

    pub(super) fn handle_window_items(&mut self, window_id: u8, items: Vec<Option<ItemStack>>) {
        if window_id != PLAYER_WINDOW_ID {
            trace!("Ignoring items for window {window_id}");
            return;
        }
        self.avatar.inventory_mut().set_items(items);
    }

    pub(super) fn handle_set_slot(&mut self, window_id: i8, slot: i16, item: Option<ItemStack>) {
        // -1 addresses the cursor, other ids are open containers
        if window_id != PLAYER_WINDOW_ID as i8 {
            trace!("Ignoring slot {slot} of window {window_id}");
            return;
        }
        let Ok(index) = usize::try_from(slot) else {
            debug!("Negative slot {slot} for player window");
            return;
        };
        if !self.avatar.inventory_mut().set_slot(index, item) {
            debug!("Slot {slot} out of range for player window");
        }
    }

    pub(super) fn handle_held_item(&mut self, slot: u8) {
        if !self.avatar.inventory_mut().select_hotbar(slot) {
            warn!("Held item change to invalid hotbar slot {slot}");
        }
    }
}
