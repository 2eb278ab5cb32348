pub mod net;
pub mod sync;
pub mod world;

pub use net::{
    Bullet, Channel, ChannelTransport, CodecError, DEFAULT_PORT, Header, MAX_BULLETS,
    MAX_PLAYERS, Move, NetworkStats, Player, PlayerId, Shoot, Snapshot, Stats, TransportConfig,
    TransportError, WriteOutcome,
};
pub use sync::{
    DirectionalInput, Identity, MoveKeys, SyncConfig, SyncController, SyncError, SyncStats,
};
pub use world::{Kinematic, ScoreRow, WorldState};
