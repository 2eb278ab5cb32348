mod entity;
mod scoreboard;
mod state;

pub use entity::Kinematic;
pub use scoreboard::ScoreRow;
pub use state::WorldState;
