mod config;
mod controller;
mod input;

pub use config::SyncConfig;
pub use controller::{Identity, SyncController, SyncError, SyncState, SyncStats};
pub use input::{DirectionalInput, MoveKeys};
