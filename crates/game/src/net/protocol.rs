//! Wire constants and the fixed-layout payloads exchanged with the server.
//!
//! Every payload is a `#[repr(C)]` plain-old-data struct with no padding, so
//! a frame is the raw memory image of its header followed by its payload.
//! Multi-byte fields are therefore in host byte order.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

pub const DEFAULT_PORT: u16 = 6969;

pub const MAX_PLAYERS: usize = 16;
pub const MAX_BULLETS: usize = 128;

pub const PLAYER_SPEED: f32 = 10.0;
pub const PLAYER_RADIUS: f32 = 1.0;
pub const ENEMY_RADIUS: f32 = 1.0;
pub const BULLET_RADIUS: f32 = 0.25;
pub const BULLET_SPEED: f32 = 30.0;

/// Largest datagram the transport will ever read in one piece.
pub const MAX_DATAGRAM_SIZE: usize = 65_536;

pub type PlayerId = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Header {
    pub player_id: PlayerId,
    pub payload_size: u32,
}

impl Header {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn new(player_id: PlayerId, payload_size: u32) -> Self {
        Self {
            player_id,
            payload_size,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Stats {
    pub kills: i32,
    pub deaths: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Player {
    pub id: PlayerId,
    pub pos: Vec2,
    pub velocity: Vec2,
    pub stats: Stats,
}

impl Player {
    pub fn new(id: PlayerId, pos: Vec2, velocity: Vec2) -> Self {
        Self {
            id,
            pos,
            velocity,
            stats: Stats::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Bullet {
    pub pos: Vec2,
    pub velocity: Vec2,
    pub shooter_id: PlayerId,
}

impl Bullet {
    pub fn new(pos: Vec2, velocity: Vec2, shooter_id: PlayerId) -> Self {
        Self {
            pos,
            velocity,
            shooter_id,
        }
    }
}

/// Full world state broadcast by the server every tick.
///
/// Only the first `player_count` players and `bullet_count` bullets are
/// meaningful; use [`Snapshot::players`] and [`Snapshot::bullets`] rather than
/// the raw arrays.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Snapshot {
    pub player_count: i32,
    pub players: [Player; MAX_PLAYERS],
    pub bullet_count: i32,
    pub bullets: [Bullet; MAX_BULLETS],
}

impl Snapshot {
    pub fn new() -> Self {
        Self::zeroed()
    }

    /// Builds a snapshot from slices, truncating anything beyond capacity.
    pub fn from_entities(players: &[Player], bullets: &[Bullet]) -> Self {
        let mut snapshot = Self::zeroed();

        let player_count = players.len().min(MAX_PLAYERS);
        snapshot.players[..player_count].copy_from_slice(&players[..player_count]);
        snapshot.player_count = player_count as i32;

        let bullet_count = bullets.len().min(MAX_BULLETS);
        snapshot.bullets[..bullet_count].copy_from_slice(&bullets[..bullet_count]);
        snapshot.bullet_count = bullet_count as i32;

        snapshot
    }

    pub fn players(&self) -> &[Player] {
        &self.players[..clamp_count(self.player_count, MAX_PLAYERS)]
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets[..clamp_count(self.bullet_count, MAX_BULLETS)]
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_count(count: i32, capacity: usize) -> usize {
    usize::try_from(count).map_or(0, |count| count.min(capacity))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Move {
    pub velocity: Vec2,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Shoot {
    pub bullet: Bullet,
}
