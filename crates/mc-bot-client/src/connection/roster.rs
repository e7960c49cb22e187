use super::*;

use mc_bot_game::player_list::{link, unlink_entry};
use mc_bot_proto::clientbound::{PlayerListAction, PlayerListItem};

impl Connection {
    pub(super) fn handle_player_list(&mut self, action: PlayerListAction, items: Vec<PlayerListItem>) {
        for item in items {
            match action {
                PlayerListAction::AddPlayer => self.add_player(item),
                PlayerListAction::RemovePlayer => self.remove_player(item.profile),
                _ => self.update_player(action, item),
            }
        }
    }

    fn add_player(&mut self, item: PlayerListItem) {
        let uuid = item.profile.id;
        let (entry, inserted) = self.player_list.get_or_insert(&item.profile);
        entry.profile = item.profile;
        entry.game_mode = item.game_mode;
        entry.ping = item.ping;
        entry.display_name = item.display_name;
        if !inserted {
            return;
        }

        let profile = entry.profile.clone();
        info!("{} joined the server", profile.name);
        // the player entity may have spawned before its roster entry
        if let Some(world) = self.world.as_mut() {
            if let Some(entity_id) = world.entities.find_player(uuid) {
                link(&mut world.entities, &mut self.player_list, entity_id, uuid);
            }
        }
        self.events.push(BotEvent::PlayerJoined { profile });
    }

    fn remove_player(&mut self, profile: GameProfile) {
        let Some(entry) = self.player_list.remove(profile.id) else {
            debug!("Removal of unlisted player {}", profile.id);
            return;
        };
        if let Some(world) = self.world.as_mut() {
            unlink_entry(&mut world.entities, &entry);
        }
        info!("{} left the server", entry.profile.name);
        self.events.push(BotEvent::PlayerLeft {
            profile: entry.profile,
        });
    }

    fn update_player(&mut self, action: PlayerListAction, item: PlayerListItem) {
        let Some(entry) = self.player_list.get_mut(item.profile.id) else {
            debug!("{action:?} for unlisted player {}", item.profile.id);
            return;
        };
        match action {
            PlayerListAction::UpdateGameMode => entry.game_mode = item.game_mode,
            PlayerListAction::UpdateLatency => entry.ping = item.ping,
            PlayerListAction::UpdateDisplayName => entry.display_name = item.display_name,
            PlayerListAction::AddPlayer | PlayerListAction::RemovePlayer => {}
        }
    }
}
