use crate::net::{Bullet, Player};

/// Anything that moves by its own velocity between snapshots.
pub trait Kinematic {
    fn integrate(&mut self, dt: f32);
}

impl Kinematic for Player {
    #[inline]
    fn integrate(&mut self, dt: f32) {
        self.pos += self.velocity * dt;
    }
}

impl Kinematic for Bullet {
    #[inline]
    fn integrate(&mut self, dt: f32) {
        self.pos += self.velocity * dt;
    }
}
