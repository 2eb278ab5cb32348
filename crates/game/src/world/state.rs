use crate::net::{Bullet, Player, PlayerId, Snapshot};

use super::entity::Kinematic;
use super::scoreboard::{self, ScoreRow};

/// The client's mirror of the game: its own player, everyone else, and
/// every bullet in flight.
///
/// The local player lives for the whole session. Enemies and bullets are
/// rebuilt from scratch by every snapshot; anything a snapshot leaves out is
/// gone until the next one brings it back.
#[derive(Debug, Clone, Default)]
pub struct WorldState {
    player: Player,
    enemies: Vec<Player>,
    bullets: Vec<Bullet>,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn enemies(&self) -> &[Player] {
        &self.enemies
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    /// Dead-reckons every entity forward by `dt` seconds.
    pub fn integrate(&mut self, dt: f32) {
        self.player.integrate(dt);
        for enemy in &mut self.enemies {
            enemy.integrate(dt);
        }
        for bullet in &mut self.bullets {
            bullet.integrate(dt);
        }
    }

    /// Replaces the world with `snapshot`.
    ///
    /// The entry for `local_id` overwrites the local player's position,
    /// velocity and stats. Every other entry becomes an enemy.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot, local_id: PlayerId) {
        self.enemies.clear();
        for entry in snapshot.players() {
            if entry.id == local_id {
                self.player.pos = entry.pos;
                self.player.velocity = entry.velocity;
                self.player.stats = entry.stats;
            } else {
                self.enemies.push(*entry);
            }
        }

        self.bullets.clear();
        self.bullets.extend_from_slice(snapshot.bullets());
    }

    /// Adds a locally predicted bullet. The next snapshot replaces it.
    pub fn spawn_bullet(&mut self, bullet: Bullet) {
        self.bullets.push(bullet);
    }

    pub fn scoreboard(&self) -> Vec<ScoreRow> {
        scoreboard::rank(&self.player, &self.enemies)
    }
}
