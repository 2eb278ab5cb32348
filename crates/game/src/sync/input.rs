use bitflags::bitflags;
use glam::Vec2;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MoveKeys: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const UP = 1 << 2;
        const DOWN = 1 << 3;
    }
}

/// Turns directional key edges into an intended velocity.
///
/// Per axis, the most recent press wins. Releasing a key hands the axis back
/// to the opposite key if it is still held, otherwise the axis stops.
/// Screen axes: `UP` is negative y.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectionalInput {
    held: MoveKeys,
    x: f32,
    y: f32,
}

impl DirectionalInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held(&self) -> MoveKeys {
        self.held
    }

    pub fn press(&mut self, keys: MoveKeys) {
        self.held |= keys;
        if keys.contains(MoveKeys::LEFT) {
            self.x = -1.0;
        }
        if keys.contains(MoveKeys::RIGHT) {
            self.x = 1.0;
        }
        if keys.contains(MoveKeys::UP) {
            self.y = -1.0;
        }
        if keys.contains(MoveKeys::DOWN) {
            self.y = 1.0;
        }
    }

    pub fn release(&mut self, keys: MoveKeys) {
        self.held -= keys;
        if keys.intersects(MoveKeys::LEFT | MoveKeys::RIGHT) {
            self.x = self.fallback(MoveKeys::LEFT, MoveKeys::RIGHT);
        }
        if keys.intersects(MoveKeys::UP | MoveKeys::DOWN) {
            self.y = self.fallback(MoveKeys::UP, MoveKeys::DOWN);
        }
    }

    /// Replaces the held set, pressing and releasing whatever changed.
    pub fn set_held(&mut self, keys: MoveKeys) {
        let released = self.held - keys;
        let pressed = keys - self.held;
        self.release(released);
        self.press(pressed);
    }

    pub fn velocity(&self, speed: f32) -> Vec2 {
        Vec2::new(self.x, self.y) * speed
    }

    fn fallback(&self, negative: MoveKeys, positive: MoveKeys) -> f32 {
        if self.held.contains(negative) {
            -1.0
        } else if self.held.contains(positive) {
            1.0
        } else {
            0.0
        }
    }
}
