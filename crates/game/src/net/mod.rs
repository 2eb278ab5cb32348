mod channel;
pub mod codec;
mod ping;
mod protocol;
mod stats;
mod transport;

pub use channel::Channel;
pub use codec::{CodecError, Payload};
pub use ping::PingTracker;
pub use protocol::{
    BULLET_RADIUS, BULLET_SPEED, Bullet, DEFAULT_PORT, ENEMY_RADIUS, Header, MAX_BULLETS,
    MAX_DATAGRAM_SIZE, MAX_PLAYERS, Move, PLAYER_RADIUS, PLAYER_SPEED, Player, PlayerId, Shoot,
    Snapshot, Stats,
};
pub use stats::NetworkStats;
pub use transport::{
    ChannelHandler, ChannelTransport, ErrorHandler, TransportConfig, TransportError,
    WriteCallback, WriteOutcome,
};
