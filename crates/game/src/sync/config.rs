use crate::net::{BULLET_SPEED, PLAYER_RADIUS, PLAYER_SPEED, TransportConfig};

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub transport: TransportConfig,
    pub player_speed: f32,
    /// Distance from the player's centre at which new bullets appear.
    pub player_radius: f32,
    pub bullet_speed: f32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            player_speed: PLAYER_SPEED,
            player_radius: PLAYER_RADIUS,
            bullet_speed: BULLET_SPEED,
        }
    }
}
