/// The step function: advances the world by one frame.
///
/// Processing order:
///   1. Input resolution (walk velocity, facing, jump impulse)
///   2. Physics integration (gravity, move, ground test, clamp)
///   3. Ground-state transition events
///
/// Jump is level-triggered: while the jump input is held and the player
/// is grounded, every step resets `dy` to the jump impulse.
///
/// Block placement and block cycling are one-shot actions driven by key
/// presses and button clicks; they are applied between steps through
/// `place_block` and `cycle_block`, not through `FrameInput`.

use crate::domain::entity::{Facing, FrameInput, Player};
use crate::domain::physics;
use crate::domain::rules;
use crate::domain::tile::BlockKind;
use crate::config::PhysicsConfig;
use super::event::GameEvent;
use super::world::GameState;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(state: &mut GameState, input: FrameInput) -> Vec<GameEvent> {
    let mut events = Vec::new();
    state.tick += 1;

    let was_grounded = state.player.on_ground;
    if resolve_input(&mut state.player, input, &state.physics) {
        events.push(GameEvent::Jumped);
    }

    physics::integrate(&mut state.player, &state.grid.view(), &state.physics);

    match (was_grounded, state.player.on_ground) {
        (false, true) => events.push(GameEvent::Landed),
        (true, false) => events.push(GameEvent::LeftGround),
        _ => {}
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Input resolution
// ══════════════════════════════════════════════════════════════

/// Derive walk velocity and facing from the held inputs, and apply the
/// jump impulse when grounded. Left is checked first, so it wins when
/// both directions are held. Returns true if a jump impulse was applied.
pub fn resolve_input(player: &mut Player, input: FrameInput, params: &PhysicsConfig) -> bool {
    if input.left {
        player.dx = -params.speed;
        player.facing = Facing::Left;
    } else if input.right {
        player.dx = params.speed;
        player.facing = Facing::Right;
    } else {
        player.dx = 0.0;
    }

    if input.jump && player.on_ground {
        player.dy = params.jump_strength;
        true
    } else {
        false
    }
}

// ══════════════════════════════════════════════════════════════
// One-shot actions
// ══════════════════════════════════════════════════════════════

/// Place `block` in the cell beside the player, in the facing direction.
/// Silent no-op (returns None) if that cell is outside the grid or not empty.
pub fn place_block(state: &mut GameState, block: BlockKind) -> Option<GameEvent> {
    let (row, col) = rules::placement_target(&state.player);
    if !rules::can_place(&state.grid.view(), row, col) {
        return None;
    }
    let tile = block.tile();
    state.grid.set(row, col, tile);
    Some(GameEvent::BlockPlaced { row, col, code: tile.0 })
}

pub fn cycle_block(state: &mut GameState) -> GameEvent {
    let kind = state.cycle_block();
    GameEvent::BlockCycled { code: kind.tile().0 }
}

/// Rebuild the world for a new viewport size.
pub fn resize_world(state: &mut GameState, tiles_x: usize, tiles_y: usize) -> GameEvent {
    state.regenerate(tiles_x, tiles_y);
    GameEvent::WorldRegenerated { tiles_x, tiles_y }
}
