/// The player: grid movement, melee, potions and firing, each behind its
/// own cooldown.

use super::cooldown::{Cooldown, Millis};
use super::enemy::{Enemy, EnemyId};
use super::entity::{Body, Facing, ItemKind, Pos, SpriteHandle};
use super::input::{Action, InputSource};
use super::inventory::Inventory;
use super::projectile::Projectile;
use super::tile::TileGrid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerStats {
    pub health: i32,
    pub max_health: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub melee_damage: i32,
    pub heal_amount: i32,
    pub mana_amount: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerCooldowns {
    pub move_ms: Millis,
    pub attack_ms: Millis,
    pub item_ms: Millis,
    pub fire_ms: Millis,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeleeHit {
    pub enemy: EnemyId,
    pub damage: i32,
    pub killed: bool,
}

/// What one `update` did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerTick {
    pub moved_to: Option<Pos>,
    pub melee: Option<MeleeHit>,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    pub health: i32,
    pub max_health: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub melee_damage: i32,
    pub heal_amount: i32,
    pub mana_amount: i32,
    move_cd: Cooldown,
    attack_cd: Cooldown,
    item_cd: Cooldown,
    fire_cd: Cooldown,
}

impl Player {
    pub fn new(pos: Pos, stats: PlayerStats, cds: PlayerCooldowns, sprite: Option<SpriteHandle>) -> Self {
        let max_health = stats.max_health.max(1);
        let max_mana = stats.max_mana.max(0);
        Player {
            body: Body::new(pos, sprite),
            health: stats.health.clamp(0, max_health),
            max_health,
            mana: stats.mana.clamp(0, max_mana),
            max_mana,
            melee_damage: stats.melee_damage,
            heal_amount: stats.heal_amount,
            mana_amount: stats.mana_amount,
            move_cd: Cooldown::new(cds.move_ms),
            attack_cd: Cooldown::new(cds.attack_ms),
            item_cd: Cooldown::new(cds.item_ms),
            fire_cd: Cooldown::new(cds.fire_ms),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Movement then melee for this tick.
    pub fn update(
        &mut self,
        now: Millis,
        input: &impl InputSource,
        grid: &TileGrid,
        enemies: &mut [Enemy],
    ) -> PlayerTick {
        if !self.is_alive() {
            return PlayerTick::default();
        }
        let mut tick = PlayerTick::default();
        if let Some((dx, dy)) = input.direction() {
            if self.try_move(now, dx, dy, grid) {
                tick.moved_to = Some(self.body.pos);
            }
        }
        if input.is_active(Action::Attack) {
            tick.melee = self.melee(now, enemies);
        }
        tick
    }

    /// One step if the move gate is open. The gate is consumed by any
    /// attempt, blocked or not. Returns whether the position changed.
    pub fn try_move(&mut self, now: Millis, dx: i32, dy: i32, grid: &TileGrid) -> bool {
        if !self.move_cd.try_trigger(now) { return false; }
        if let Some(facing) = Facing::from_dx(dx) {
            self.body.facing = facing;
        }
        let dest = self.body.pos.offset(dx, dy);
        if !grid.is_walkable(dest.x, dest.y) { return false; }
        self.body.pos = dest;
        true
    }

    /// Hit the first living enemy orthogonally adjacent. The attack gate is
    /// only consumed when something was hit.
    pub fn melee(&mut self, now: Millis, enemies: &mut [Enemy]) -> Option<MeleeHit> {
        if !self.attack_cd.is_ready(now) { return None; }
        let pos = self.body.pos;
        let target = enemies.iter_mut().find(|e| e.is_alive() && e.body.pos.is_adjacent(pos))?;
        let killed = target.take_damage(self.melee_damage);
        self.attack_cd.trigger(now);
        Some(MeleeHit { enemy: target.id, damage: self.melee_damage, killed })
    }

    /// Drink a potion if a potion key is held and one is in the inventory.
    /// Health takes precedence over mana. Returns the potion used and the
    /// resulting stat value.
    pub fn use_item(
        &mut self,
        now: Millis,
        input: &impl InputSource,
        inventory: &mut dyn Inventory,
    ) -> Option<(ItemKind, i32)> {
        if !self.is_alive() || !self.item_cd.is_ready(now) {
            return None;
        }
        if input.is_active(Action::UseHealth) && inventory.try_consume(ItemKind::HealthPotion) {
            self.item_cd.trigger(now);
            return Some((ItemKind::HealthPotion, self.heal(self.heal_amount)));
        }
        if input.is_active(Action::UseMana) && inventory.try_consume(ItemKind::ManaPotion) {
            self.item_cd.trigger(now);
            return Some((ItemKind::ManaPotion, self.restore_mana(self.mana_amount)));
        }
        None
    }

    /// Spawn a projectile one tile ahead. The fire gate is consumed even
    /// when the tile ahead is blocked.
    pub fn fire(
        &mut self,
        now: Millis,
        grid: &TileGrid,
        step_ms: Millis,
        damage: i32,
        sprite: Option<SpriteHandle>,
    ) -> Option<Projectile> {
        if !self.is_alive() || !self.fire_cd.try_trigger(now) {
            return None;
        }
        let facing = self.body.facing;
        let at = self.body.pos.offset(facing.dx(), 0);
        if !grid.is_walkable(at.x, at.y) {
            return None;
        }
        Some(Projectile::new(at, facing, step_ms, damage, sprite, now))
    }

    pub fn heal(&mut self, amount: i32) -> i32 {
        self.health = (self.health + amount).clamp(0, self.max_health);
        self.health
    }

    pub fn restore_mana(&mut self, amount: i32) -> i32 {
        self.mana = (self.mana + amount).clamp(0, self.max_mana);
        self.mana
    }

    /// Stays within `0..=max_health`. Returns remaining health.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        self.health = (self.health - amount).clamp(0, self.max_health);
        self.health
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enemy::EnemyStats;
    use crate::domain::input::FrameInput;
    use crate::domain::inventory::SlotInventory;

    const STATS: PlayerStats = PlayerStats {
        health: 150,
        max_health: 150,
        mana: 25,
        max_mana: 75,
        melee_damage: 50,
        heal_amount: 50,
        mana_amount: 25,
    };
    const CDS: PlayerCooldowns = PlayerCooldowns { move_ms: 120, attack_ms: 220, item_ms: 180, fire_ms: 180 };

    fn grid() -> TileGrid {
        TileGrid::parse(&[
            "########",
            "#......#",
            "##.....#",
            "#......#",
            "########",
        ])
        .unwrap()
    }

    fn player_at(x: i32, y: i32) -> Player {
        Player::new(Pos::new(x, y), STATS, CDS, None)
    }

    fn enemy_at(id: u32, x: i32, y: i32) -> Enemy {
        let stats = EnemyStats { health: 50, damage: 50, contact_ms: 500, move_ms: 420 };
        Enemy::new(EnemyId(id), "golem.basic", Pos::new(x, y), stats, None, None)
    }

    #[test]
    fn move_into_wall_stays_put() {
        let g = grid();
        let mut p = player_at(2, 2);
        let input = FrameInput::holding(Action::MoveLeft);
        let tick = p.update(0, &input, &g, &mut []);
        assert_eq!(tick.moved_to, None);
        assert_eq!(p.body.pos, Pos::new(2, 2));
        assert_eq!(p.body.facing, Facing::Left);
    }

    #[test]
    fn blocked_attempt_still_consumes_move_gate() {
        let g = grid();
        let mut p = player_at(2, 2);
        assert!(!p.try_move(0, -1, 0, &g));
        assert!(!p.try_move(60, 1, 0, &g));
        assert_eq!(p.body.pos, Pos::new(2, 2));
        assert!(p.try_move(120, 1, 0, &g));
        assert_eq!(p.body.pos, Pos::new(3, 2));
    }

    #[test]
    fn position_never_leaves_walkable_cells() {
        let g = grid();
        let mut p = player_at(1, 1);
        let dirs = [(-1, 0), (0, -1), (1, 0), (0, 1), (1, 0), (0, 1), (0, 1), (-1, 0), (-1, 0)];
        let mut now = 0;
        for _ in 0..20 {
            for &(dx, dy) in &dirs {
                p.try_move(now, dx, dy, &g);
                now += 120;
                assert!(g.is_walkable(p.body.pos.x, p.body.pos.y));
            }
        }
    }

    #[test]
    fn vertical_move_keeps_facing() {
        let g = grid();
        let mut p = player_at(3, 2);
        p.try_move(0, -1, 0, &g);
        p.try_move(200, 0, 1, &g);
        assert_eq!(p.body.facing, Facing::Left);
        assert_eq!(p.body.pos, Pos::new(2, 3));
    }

    #[test]
    fn melee_hits_first_adjacent_enemy_only() {
        let mut p = player_at(3, 2);
        let mut enemies = vec![enemy_at(1, 5, 2), enemy_at(2, 4, 2), enemy_at(3, 3, 3)];
        let hit = p.melee(0, &mut enemies).unwrap();
        assert_eq!(hit.enemy, EnemyId(2));
        assert!(hit.killed);
        assert_eq!(enemies[0].health, 50);
        assert_eq!(enemies[2].health, 50);
    }

    #[test]
    fn melee_miss_keeps_attack_gate_open() {
        let mut p = player_at(3, 2);
        let mut enemies = vec![enemy_at(1, 6, 2)];
        assert_eq!(p.melee(0, &mut enemies), None);
        enemies[0].body.pos = Pos::new(4, 2);
        assert!(p.melee(10, &mut enemies).is_some());
        enemies.push(enemy_at(2, 2, 2));
        assert_eq!(p.melee(100, &mut enemies), None);
        assert!(p.melee(230, &mut enemies).is_some());
    }

    #[test]
    fn health_potion_clamps_and_gates() {
        let mut p = player_at(3, 2);
        let mut inv = SlotInventory::starter();
        p.take_damage(20);
        let input = FrameInput::holding(Action::UseHealth);
        assert_eq!(p.use_item(0, &input, &mut inv), Some((ItemKind::HealthPotion, 150)));
        assert_eq!(inv.count(ItemKind::HealthPotion), 1);
        assert_eq!(p.use_item(100, &input, &mut inv), None);
        assert_eq!(inv.count(ItemKind::HealthPotion), 1);
    }

    #[test]
    fn missing_potion_does_not_consume_gate() {
        let mut p = player_at(3, 2);
        let mut inv = SlotInventory::new();
        let both = FrameInput::holding(Action::UseHealth).with(Action::UseMana);
        assert_eq!(p.use_item(0, &both, &mut inv), None);
        inv.add(ItemKind::ManaPotion, 1);
        assert_eq!(p.use_item(1, &both, &mut inv), Some((ItemKind::ManaPotion, 50)));
    }

    #[test]
    fn fire_spawns_ahead_when_open() {
        let g = grid();
        let mut p = player_at(3, 2);
        let shot = p.fire(0, &g, 140, 50, None).unwrap();
        assert_eq!(shot.body.pos, Pos::new(4, 2));
        assert_eq!(shot.body.facing, Facing::Right);
    }

    #[test]
    fn fire_into_wall_spawns_nothing_but_consumes_gate() {
        let g = grid();
        let mut p = player_at(2, 2);
        p.body.facing = Facing::Left;
        assert!(p.fire(0, &g, 140, 50, None).is_none());
        p.body.facing = Facing::Right;
        assert!(p.fire(100, &g, 140, 50, None).is_none());
        assert!(p.fire(180, &g, 140, 50, None).is_some());
    }

    #[test]
    fn damage_floors_at_zero() {
        let mut p = player_at(3, 2);
        assert_eq!(p.take_damage(400), 0);
        assert!(!p.is_alive());
        let tick = p.update(0, &FrameInput::holding(Action::MoveRight), &grid(), &mut []);
        assert_eq!(tick, PlayerTick::default());
    }

    #[test]
    fn negative_damage_never_overheals() {
        let mut p = player_at(3, 2);
        assert_eq!(p.take_damage(-50), 150);
        p.take_damage(30);
        assert_eq!(p.take_damage(-500), p.max_health);
    }
}
