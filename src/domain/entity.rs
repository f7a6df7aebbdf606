/// The player entity and per-frame input snapshot.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// Horizontal unit offset: -1 for left, +1 for right.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Two-state machine, re-evaluated every step by the ground test.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActorState {
    Airborne,
    Grounded,
}

/// Level-triggered input for one frame, merged from keyboard,
/// on-screen buttons and gamepad.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl FrameInput {
    /// Active if active in either source.
    pub fn or(self, other: FrameInput) -> FrameInput {
        FrameInput {
            left: self.left || other.left,
            right: self.right || other.right,
            jump: self.jump || other.jump,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    /// Position of the top-left corner, in tiles.
    pub x: f64,
    pub y: f64,
    /// Velocity, in tiles per frame.
    pub dx: f64,
    pub dy: f64,
    pub size: f64,
    pub on_ground: bool,
    pub facing: Facing,
}

impl Player {
    pub fn new(x: f64, y: f64) -> Self {
        Player {
            x, y,
            dx: 0.0,
            dy: 0.0,
            size: 1.0,
            on_ground: false,
            facing: Facing::Right,
        }
    }

    /// Spawn point for a world of the given size: horizontal center,
    /// two tiles above the vertical midpoint.
    pub fn spawn(tiles_x: usize, tiles_y: usize) -> Self {
        let x = (tiles_x as f64 / 2.0).floor();
        let y = (tiles_y as f64 / 2.0 - 2.0).floor();
        Player::new(x, y)
    }

    pub fn state(&self) -> ActorState {
        if self.on_ground { ActorState::Grounded } else { ActorState::Airborne }
    }
}
