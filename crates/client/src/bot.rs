use glam::Vec2;
use verilandia::{DirectionalInput, MoveKeys, Player, SyncController, SyncError};

const STEP_SECS: f32 = 0.75;
const SHOT_SECS: f32 = 0.5;

/// Keys the bot holds, one entry per step, looping.
const PATTERN: [MoveKeys; 6] = [
    MoveKeys::RIGHT,
    MoveKeys::RIGHT.union(MoveKeys::DOWN),
    MoveKeys::DOWN,
    MoveKeys::LEFT,
    MoveKeys::UP.union(MoveKeys::LEFT),
    MoveKeys::empty(),
];

/// Scripted input source: walks a fixed key pattern and fires at the
/// nearest enemy on a timer.
pub struct Bot {
    input: DirectionalInput,
    step: usize,
    step_timer: f32,
    shot_timer: f32,
}

impl Default for Bot {
    fn default() -> Self {
        Self::new()
    }
}

impl Bot {
    pub fn new() -> Self {
        let mut input = DirectionalInput::new();
        input.set_held(PATTERN[0]);
        Self {
            input,
            step: 0,
            step_timer: 0.0,
            shot_timer: 0.0,
        }
    }

    pub fn keys(&self) -> MoveKeys {
        self.input.held()
    }

    /// Advances the script by `dt` seconds and feeds the resulting edges to
    /// the controller.
    pub fn drive(&mut self, controller: &mut SyncController, dt: f32) -> Result<(), SyncError> {
        self.advance(dt);

        let velocity = self.input.velocity(controller.config().player_speed);
        controller.set_velocity(velocity)?;

        if self.take_shot(dt) {
            let world = controller.world();
            if let Some(target) = nearest(world.player().pos, world.enemies()) {
                if let Err(e) = controller.shoot_at(target) {
                    log::debug!("Bot skipped a shot: {}", e);
                }
            }
        }

        Ok(())
    }

    fn advance(&mut self, dt: f32) {
        self.step_timer += dt;
        while self.step_timer >= STEP_SECS {
            self.step_timer -= STEP_SECS;
            self.step = (self.step + 1) % PATTERN.len();
            self.input.set_held(PATTERN[self.step]);
        }
    }

    fn take_shot(&mut self, dt: f32) -> bool {
        self.shot_timer += dt;
        if self.shot_timer < SHOT_SECS {
            return false;
        }
        self.shot_timer -= SHOT_SECS;
        true
    }
}

fn nearest(from: Vec2, enemies: &[Player]) -> Option<Vec2> {
    enemies
        .iter()
        .map(|enemy| enemy.pos)
        .filter(|pos| pos.is_finite())
        .min_by(|a, b| from.distance_squared(*a).total_cmp(&from.distance_squared(*b)))
}
