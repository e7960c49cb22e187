//! The client's own vitals, experience, and inventory.

use crate::inventory::Window;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Experience {
    /// Progress through the current level, 0.0 - 1.0.
    pub progress: f32,
    pub level: i32,
    pub total: i32,
}

/// Avatar state not stored on its entity. Every field is `None` until the
/// server sends it. Position and look live on the own entity.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Avatar {
    /// Own entity id in the current registry.
    pub entity_id: Option<i32>,
    pub health: Option<f32>,
    pub food: Option<i32>,
    pub saturation: Option<f32>,
    pub experience: Option<Experience>,
    pub inventory: Option<Window>,
}

impl Avatar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget vitals and inventory (join/respawn). Experience survives.
    pub fn reset_vitals(&mut self) {
        self.health = None;
        self.food = None;
        self.saturation = None;
        self.inventory = None;
    }

    /// The player window, created empty on first use.
    pub fn inventory_mut(&mut self) -> &mut Window {
        self.inventory.get_or_insert_with(Window::player)
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.health, Some(h) if h <= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_vitals_keeps_experience() {
        let mut avatar = Avatar {
            entity_id: Some(1),
            health: Some(20.0),
            food: Some(20),
            saturation: Some(5.0),
            experience: Some(Experience {
                progress: 0.5,
                level: 3,
                total: 30,
            }),
            inventory: Some(Window::player()),
        };
        avatar.reset_vitals();
        assert_eq!(avatar.health, None);
        assert_eq!(avatar.food, None);
        assert_eq!(avatar.saturation, None);
        assert_eq!(avatar.inventory, None);
        assert_eq!(avatar.experience.map(|e| e.level), Some(3));
        assert_eq!(avatar.entity_id, Some(1));
    }

    #[test]
    fn dead_only_when_health_known() {
        let mut avatar = Avatar::new();
        assert!(!avatar.is_dead());
        avatar.health = Some(0.0);
        assert!(avatar.is_dead());
    }
}
