/// Level generation and session setup.
///
/// A level is a random room: blocked border, interior walls scattered at
/// `wall_fill` density. The player, golems and chests are then dropped on
/// distinct free tiles. Every random choice goes through the caller's RNG,
/// so a fixed seed reproduces the whole level.

use rand::rngs::StdRng;
use rand::{Rng, RngExt};
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::domain::entity::{Pos, SpriteSet};
use crate::domain::inventory::SlotInventory;
use crate::domain::tile::{Tile, TileGrid};
use crate::error::SpawnError;
use crate::sim::world::World;

/// Random interior tries before falling back to a scan.
const FREE_TILE_TRIES: usize = 300;

/// Where the player starts when that tile is free.
pub const PLAYER_START: Pos = Pos::new(2, 2);

// ══════════════════════════════════════════════════════════════
// Map
// ══════════════════════════════════════════════════════════════

/// Border cells are always blocked; each interior cell is blocked with
/// probability `fill`.
pub fn generate_map(width: usize, height: usize, fill: f64, rng: &mut impl Rng) -> TileGrid {
    let fill = if fill.is_nan() { 0.0 } else { fill.clamp(0.0, 1.0) };
    let mut grid = TileGrid::filled(width, height, Tile::Walkable);
    for y in 0..height {
        for x in 0..width {
            let border = x == 0 || y == 0 || x + 1 == width || y + 1 == height;
            if border || rng.random_bool(fill) {
                grid.set(x, y, Tile::Blocked);
            }
        }
    }
    grid
}

/// The configured map when it parses, otherwise a generated one.
pub fn level_grid(config: &GameConfig, rng: &mut impl Rng) -> TileGrid {
    let level = &config.level;
    if let Some(rows) = &level.map {
        let lines: Vec<&str> = rows.iter().map(String::as_str).collect();
        match TileGrid::parse(&lines) {
            Ok(grid) => return grid,
            Err(e) => warn!(error = %e, "custom map rejected, generating one"),
        }
    }
    generate_map(level.width, level.height, level.wall_fill, rng)
}

/// A walkable tile not in `avoid`: `preferred` if it qualifies, else a
/// random interior try, else the first match in row-major order.
pub fn find_free_tile(
    grid: &TileGrid,
    preferred: Option<Pos>,
    avoid: &[Pos],
    rng: &mut impl Rng,
) -> Option<Pos> {
    let free = |p: Pos| grid.is_walkable(p.x, p.y) && !avoid.contains(&p);

    if let Some(p) = preferred.filter(|&p| free(p)) {
        return Some(p);
    }

    let (w, h) = (grid.width() as i32, grid.height() as i32);
    if w > 2 && h > 2 {
        for _ in 0..FREE_TILE_TRIES {
            let p = Pos::new(rng.random_range(1..w - 1), rng.random_range(1..h - 1));
            if free(p) {
                return Some(p);
            }
        }
    }

    (0..h).flat_map(|y| (0..w).map(move |x| Pos::new(x, y))).find(|&p| free(p))
}

// ══════════════════════════════════════════════════════════════
// Session
// ══════════════════════════════════════════════════════════════

/// Seed from config, or a fresh one from the thread RNG.
pub fn session_rng(config: &GameConfig) -> (StdRng, u64) {
    use rand::SeedableRng;
    let seed = config.level.seed.unwrap_or_else(|| rand::rng().random::<u64>());
    (StdRng::seed_from_u64(seed), seed)
}

/// Generate a map and populate it: player, patrolling golems, chests and
/// the starting inventory.
pub fn build_world(config: &GameConfig, sprites: SpriteSet, mut rng: StdRng) -> Result<World, SpawnError> {
    let level = &config.level;
    let grid = level_grid(config, &mut rng);

    let start = find_free_tile(&grid, Some(PLAYER_START), &[], &mut rng)
        .ok_or(SpawnError::NoFreeTile { what: "the player" })?;
    let mut world = World::new(grid, start, config, sprites, rng)?;
    world.set_inventory(SlotInventory::starter());

    let right_limit = world.grid.width() as i32 - 2;
    for _ in 0..level.enemies {
        let taken = world.occupied();
        let pos = find_free_tile(&world.grid, None, &taken, &mut world.rng)
            .ok_or(SpawnError::NoFreeTile { what: "a golem" })?;
        let turn = Pos::new((pos.x + level.patrol_span).min(right_limit), pos.y);
        let id = world.spawn_enemy(&config.enemy.tag, pos, config.enemy.stats(), vec![pos, turn])?;
        if let Some(e) = world.enemy(id) {
            debug!(
                enemy = id.0,
                tag = %e.tag,
                mode = ?e.mode(),
                route = ?e.patrol().map(|p| p.waypoints()),
                x = pos.x,
                y = pos.y,
                "golem spawned"
            );
        }
    }

    for _ in 0..level.chests {
        let taken = world.occupied();
        let pos = find_free_tile(&world.grid, None, &taken, &mut world.rng)
            .ok_or(SpawnError::NoFreeTile { what: "a chest" })?;
        world.add_chest(pos)?;
    }

    info!(
        width = world.grid.width(),
        height = world.grid.height(),
        floor = world.grid.walkable_count(),
        enemies = world.enemies.len(),
        chests = world.chests.len(),
        "level built"
    );
    Ok(world)
}
