/// World: the complete state of a running session.
///
/// Owns the grid, every actor, floor items and chests, plus the optional
/// collaborators (inventory, sprite handles) and the session RNG. All
/// mutation during play goes through `sim::step::step`; the methods here
/// are for setup and for read-only queries from the host.

use rand::rngs::StdRng;

use crate::config::{GameConfig, ProjectileConfig, TimingConfig};
use crate::domain::cooldown::Cooldown;
use crate::domain::enemy::{Enemy, EnemyId, EnemyStats};
use crate::domain::entity::{ActorView, Chest, Item, ItemKind, Pos, SpriteSet};
use crate::domain::inventory::Inventory;
use crate::domain::patrol::Patrol;
use crate::domain::player::Player;
use crate::domain::projectile::Projectile;
use crate::domain::tile::TileGrid;
use crate::error::SpawnError;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    Paused,
    Defeated,
}

pub struct World {
    // ── Terrain ──
    pub grid: TileGrid,

    // ── Actors ──
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,

    // ── Objects ──
    pub items: Vec<Item>,
    pub chests: Vec<Chest>,

    // ── Collaborators ──
    /// Absent means items can be neither used nor picked up.
    pub inventory: Option<Box<dyn Inventory>>,
    pub sprites: SpriteSet,
    pub rng: StdRng,

    // ── Tuning ──
    pub timing: TimingConfig,
    pub projectile: ProjectileConfig,
    /// Shared across all chests: one opening per window.
    pub chest_cd: Cooldown,

    // ── Meta ──
    pub phase: Phase,
    pub tick: u64,
    next_enemy_id: u32,
}

// ── Construction ──

impl World {
    pub fn new(
        grid: TileGrid,
        player_pos: Pos,
        config: &GameConfig,
        sprites: SpriteSet,
        rng: StdRng,
    ) -> Result<Self, SpawnError> {
        check_spawn(&grid, player_pos)?;
        let player = Player::new(
            player_pos,
            config.player.stats(),
            config.timing.player_cooldowns(),
            sprites.player,
        );
        Ok(World {
            grid,
            player,
            enemies: vec![],
            projectiles: vec![],
            items: vec![],
            chests: vec![],
            inventory: None,
            sprites,
            rng,
            timing: config.timing.clone(),
            projectile: config.projectile.clone(),
            chest_cd: Cooldown::new(config.timing.chest_ms),
            phase: Phase::Playing,
            tick: 0,
            next_enemy_id: 1,
        })
    }

    pub fn set_inventory(&mut self, inventory: impl Inventory + 'static) {
        self.inventory = Some(Box::new(inventory));
    }

    /// Place an enemy. An empty `route` makes it idle.
    pub fn spawn_enemy(
        &mut self,
        tag: &str,
        pos: Pos,
        stats: EnemyStats,
        route: Vec<Pos>,
    ) -> Result<EnemyId, SpawnError> {
        check_spawn(&self.grid, pos)?;
        let id = EnemyId(self.next_enemy_id);
        self.next_enemy_id += 1;
        let enemy = Enemy::new(id, tag, pos, stats, Patrol::new(route), self.sprites.enemy);
        self.enemies.push(enemy);
        Ok(id)
    }

    pub fn add_chest(&mut self, pos: Pos) -> Result<(), SpawnError> {
        check_spawn(&self.grid, pos)?;
        self.chests.push(Chest::new(pos));
        Ok(())
    }

    #[cfg(test)]
    pub fn place_item(&mut self, pos: Pos, kind: ItemKind) -> Result<(), SpawnError> {
        check_spawn(&self.grid, pos)?;
        self.items.push(Item { pos, kind, sprite: self.sprites.item(kind) });
        Ok(())
    }
}

fn check_spawn(grid: &TileGrid, pos: Pos) -> Result<(), SpawnError> {
    if !grid.in_bounds(pos.x, pos.y) {
        return Err(SpawnError::OutOfBounds { x: pos.x, y: pos.y });
    }
    if !grid.is_walkable(pos.x, pos.y) {
        return Err(SpawnError::Blocked { x: pos.x, y: pos.y });
    }
    Ok(())
}

// ── Queries ──

impl World {
    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn living_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.is_alive())
    }

    /// The player, then every live enemy and projectile.
    pub fn actors(&self) -> impl Iterator<Item = ActorView<'_>> {
        let others = self.enemies.iter().map(ActorView::Enemy)
            .chain(self.projectiles.iter().map(ActorView::Projectile))
            .filter(|a| a.is_alive());
        std::iter::once(ActorView::Player(&self.player)).chain(others)
    }

    /// Zero when there is no inventory.
    pub fn inventory_count(&self, kind: ItemKind) -> u32 {
        self.inventory.as_ref().map_or(0, |inv| inv.count(kind))
    }

    /// Tiles already claimed by the player, enemies or chests.
    pub fn occupied(&self) -> Vec<Pos> {
        std::iter::once(self.player.body.pos)
            .chain(self.enemies.iter().map(|e| e.body.pos))
            .chain(self.chests.iter().map(|c| c.pos))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::ActorKind;
    use crate::domain::inventory::SlotInventory;
    use rand::SeedableRng;

    fn world() -> World {
        let grid = TileGrid::parse(&["#####", "#...#", "#.#.#", "#####"]).unwrap();
        let cfg = GameConfig::default();
        World::new(grid, Pos::new(1, 1), &cfg, SpriteSet::default(), StdRng::seed_from_u64(3)).unwrap()
    }

    #[test]
    fn player_cannot_start_in_a_wall() {
        let grid = TileGrid::parse(&["###", "#.#", "###"]).unwrap();
        let cfg = GameConfig::default();
        let err = World::new(grid, Pos::new(0, 0), &cfg, SpriteSet::default(), StdRng::seed_from_u64(1))
            .err();
        assert_eq!(err, Some(SpawnError::Blocked { x: 0, y: 0 }));
    }

    #[test]
    fn spawn_rejects_walls_and_outside() {
        let mut w = world();
        let stats = GameConfig::default().enemy.stats();
        assert_eq!(
            w.spawn_enemy("golem.basic", Pos::new(2, 2), stats, vec![]),
            Err(SpawnError::Blocked { x: 2, y: 2 })
        );
        assert_eq!(
            w.spawn_enemy("golem.basic", Pos::new(9, 1), stats, vec![]),
            Err(SpawnError::OutOfBounds { x: 9, y: 1 })
        );
        assert!(w.enemies.is_empty());
    }

    #[test]
    fn enemy_ids_are_stable_and_distinct() {
        let mut w = world();
        let stats = GameConfig::default().enemy.stats();
        let a = w.spawn_enemy("golem.basic", Pos::new(2, 1), stats, vec![]).unwrap();
        let b = w.spawn_enemy("golem.basic", Pos::new(3, 1), stats, vec![Pos::new(3, 2)]).unwrap();
        assert_ne!(a, b);
        assert_eq!(w.enemy(b).unwrap().body.pos, Pos::new(3, 1));
    }

    #[test]
    fn actors_skip_the_dead() {
        let mut w = world();
        let stats = GameConfig::default().enemy.stats();
        w.spawn_enemy("golem.basic", Pos::new(2, 1), stats, vec![]).unwrap();
        w.spawn_enemy("golem.basic", Pos::new(3, 1), stats, vec![]).unwrap();
        w.enemies[0].take_damage(500);
        let kinds: Vec<ActorKind> = w.actors().map(|a| a.kind()).collect();
        assert_eq!(kinds, vec![ActorKind::Player, ActorKind::Enemy]);
    }

    #[test]
    fn inventory_counts_default_to_zero() {
        let mut w = world();
        assert_eq!(w.inventory_count(ItemKind::HealthPotion), 0);
        w.set_inventory(SlotInventory::starter());
        assert_eq!(w.inventory_count(ItemKind::HealthPotion), 2);
    }
}
