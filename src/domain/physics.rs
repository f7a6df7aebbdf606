/// Player physics: gravity, integration, ground contact and bounds.
///
/// ## Step order
///
///   1. `dy += gravity`
///   2. `x += dx`   (no horizontal collision)
///   3. `y += dy`
///   4. Ground test at the two bottom corners
///   5. Clamp `x` into `[0, width - size]`, `y` to at most `height - size`
///
/// ## Ground Test
///
/// Samples one row only: the row containing the player's bottom edge
/// (`floor(y + size)`), at columns `floor(x)` and `floor(x + size)`.
/// If either cell is solid the player snaps to `floor(y)` with `dy = 0`.
///
/// This is not swept collision. A fall faster than one tile per frame can
/// pass through a single-row floor. `y` has no lower clamp, so a jump may
/// carry the player above the top of the grid.

use super::entity::Player;
use super::rules::MapView;
use crate::config::PhysicsConfig;

/// Would a player whose top-left corner is at (x, y) be standing on
/// something solid?
#[inline]
pub fn ground_contact(map: &MapView, x: f64, y: f64, size: f64) -> bool {
    let left = x.floor() as i64;
    let right = (x + size).floor() as i64;
    let bottom = (y + size).floor() as i64;
    map.is_solid(bottom, left) || map.is_solid(bottom, right)
}

/// Advance the player by one frame against the grid.
pub fn integrate(player: &mut Player, map: &MapView, params: &PhysicsConfig) {
    player.dy += params.gravity;
    player.x += player.dx;
    player.y += player.dy;

    if ground_contact(map, player.x, player.y, player.size) {
        player.y = player.y.floor();
        player.dy = 0.0;
        player.on_ground = true;
    } else {
        player.on_ground = false;
    }

    clamp_to_world(player, map.width, map.height);
}

/// Keep the player inside the grid horizontally and above its bottom edge.
pub fn clamp_to_world(player: &mut Player, width: usize, height: usize) {
    let max_x = width as f64 - player.size;
    player.x = player.x.min(max_x).max(0.0);
    player.y = player.y.min(height as f64 - player.size);
}
