use std::net::SocketAddr;
use std::time::Duration;

use glam::Vec2;

use crate::net::{
    Bullet, Channel, ChannelTransport, Move, NetworkStats, PlayerId, Shoot, Snapshot,
    TransportError, WriteOutcome, codec,
};
use crate::world::WorldState;

use super::config::SyncConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Identity {
    /// No snapshot has told us who we are yet.
    #[default]
    Unidentified,
    Identified(PlayerId),
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("can't shoot yourself: aim target is the player's own position")]
    CannotShootSelf,
    #[error("aim target {0} does not give a direction")]
    InvalidTarget(Vec2),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    pub snapshots_applied: u64,
    pub snapshots_rejected: u64,
    pub identity_changes: u64,
    pub moves_sent: u64,
    pub shots_sent: u64,
    pub shots_rejected: u64,
}

/// Everything the update channel handler is allowed to touch.
#[derive(Debug, Default)]
pub struct SyncState {
    world: WorldState,
    identity: Identity,
    stats: SyncStats,
}

impl SyncState {
    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    fn on_update(&mut self, frame: &[u8]) {
        let (header, snapshot) = match codec::decode::<Snapshot>(frame) {
            Ok(decoded) => decoded,
            Err(e) => {
                self.stats.snapshots_rejected += 1;
                log::warn!("Dropping update frame: {}", e);
                return;
            }
        };

        self.adopt_identity(header.player_id);
        self.world.apply_snapshot(&snapshot, header.player_id);
        self.stats.snapshots_applied += 1;
    }

    fn adopt_identity(&mut self, id: PlayerId) {
        match self.identity {
            Identity::Identified(current) if current == id => return,
            Identity::Identified(current) => {
                log::info!("Server reassigned player id {} -> {}", current, id);
            }
            Identity::Unidentified => {
                log::info!("Identified as player {}", id);
            }
        }

        self.identity = Identity::Identified(id);
        self.world.player_mut().id = id;
        self.stats.identity_changes += 1;
    }
}

/// Keeps the local world in step with the server.
///
/// Drive it once per frame with [`SyncController::update`] and feed it input
/// edges through [`SyncController::set_velocity`] and
/// [`SyncController::shoot_at`]. Everything happens on the calling thread.
pub struct SyncController {
    transport: ChannelTransport<SyncState>,
    state: SyncState,
    config: SyncConfig,
    last_sent_velocity: Option<Vec2>,
}

impl SyncController {
    pub fn connect(server_addr: SocketAddr, config: SyncConfig) -> Result<Self, SyncError> {
        let mut transport = ChannelTransport::bind(server_addr, config.transport.clone())
            .map_err(TransportError::Socket)?;
        transport.listen(Channel::Update, SyncState::on_update)?;

        log::info!(
            "Syncing with {} from {}",
            server_addr,
            transport.local_addr()
        );

        Ok(Self {
            transport,
            state: SyncState::default(),
            config,
            last_sent_velocity: None,
        })
    }

    /// One frame: dead-reckon by `dt` seconds, then apply whatever arrived.
    pub fn update(&mut self, dt: f32) {
        self.integrate(dt);
        self.poll();
    }

    pub fn integrate(&mut self, dt: f32) {
        self.state.world.integrate(dt);
    }

    pub fn poll(&mut self) {
        self.transport.poll(&mut self.state);
    }

    /// Sets the local player's velocity and tells the server if it changed
    /// since the last `Move` we sent. Returns whether a message went out.
    pub fn set_velocity(&mut self, velocity: Vec2) -> Result<bool, SyncError> {
        self.state.world.player_mut().velocity = velocity;

        if self.last_sent_velocity == Some(velocity) {
            return Ok(false);
        }

        let player_id = self.player_id();
        let frame = codec::make_message(player_id, &Move { velocity });
        self.transport.write(Channel::Move, frame, release_frame)?;

        self.last_sent_velocity = Some(velocity);
        self.state.stats.moves_sent += 1;
        log::debug!("Sent move {} as player {}", velocity, player_id);
        Ok(true)
    }

    /// Fires toward `target`, showing the bullet locally right away.
    pub fn shoot_at(&mut self, target: Vec2) -> Result<Bullet, SyncError> {
        let player = *self.state.world.player();
        let offset = target - player.pos;

        let direction = match aim_direction(offset) {
            Ok(direction) => direction,
            Err(e) => {
                self.state.stats.shots_rejected += 1;
                log::warn!("Shot toward {} rejected: {}", target, e);
                return Err(match e {
                    SyncError::InvalidTarget(_) => SyncError::InvalidTarget(target),
                    e => e,
                });
            }
        };

        let bullet = Bullet::new(
            player.pos + self.config.player_radius * direction,
            self.config.bullet_speed * direction,
            player.id,
        );
        self.state.world.spawn_bullet(bullet);

        let frame = codec::make_message(player.id, &Shoot { bullet });
        self.transport.write(Channel::Shoot, frame, release_frame)?;

        self.state.stats.shots_sent += 1;
        log::debug!("Sent shot toward {} as player {}", target, player.id);
        Ok(bullet)
    }

    pub fn on_socket_error(&mut self, handler: impl FnMut(&TransportError) + 'static) {
        self.transport.on_error(handler);
    }

    pub fn world(&self) -> &WorldState {
        &self.state.world
    }

    pub fn identity(&self) -> Identity {
        self.state.identity
    }

    /// The id we send with intents; zero until the server names us.
    pub fn player_id(&self) -> PlayerId {
        self.state.world.player().id
    }

    pub fn last_sent_velocity(&self) -> Option<Vec2> {
        self.last_sent_velocity
    }

    pub fn ping(&self) -> Duration {
        self.transport.ping()
    }

    pub fn network_stats(&self) -> &NetworkStats {
        self.transport.stats()
    }

    pub fn sync_stats(&self) -> &SyncStats {
        &self.state.stats
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    pub fn pending_writes(&self) -> usize {
        self.transport.pending_writes()
    }
}

/// Unit vector along `offset`. Scales by the largest component first so
/// offsets whose squared length leaves f32 range still normalize.
fn aim_direction(offset: Vec2) -> Result<Vec2, SyncError> {
    if !offset.is_finite() {
        return Err(SyncError::InvalidTarget(offset));
    }
    if offset == Vec2::ZERO {
        return Err(SyncError::CannotShootSelf);
    }
    Ok((offset / offset.abs().max_element()).normalize())
}

fn release_frame(outcome: WriteOutcome) {
    match outcome.result {
        Ok(sent) => log::trace!("{} frame sent ({} bytes)", outcome.channel, sent),
        Err(kind) => log::debug!("{} frame not sent: {}", outcome.channel, kind),
    }
}
