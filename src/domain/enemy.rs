/// Enemies: patrol movement, contact damage and the one-way death lifecycle.

use super::cooldown::{Cooldown, Millis};
use super::entity::{Body, Facing, Pos, SpriteHandle};
use super::patrol::{Patrol, PatrolMode};
use super::tile::TileGrid;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct EnemyId(pub u32);

/// `Alive -> Dying` on lethal damage, `Dying -> Dead` once the death has
/// been handled. Never goes backwards.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LifeState {
    Alive,
    Dying,
    Dead,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyStats {
    pub health: i32,
    pub damage: i32,
    pub contact_ms: Millis,
    pub move_ms: Millis,
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: EnemyId,
    pub tag: String,
    pub body: Body,
    pub health: i32,
    pub damage: i32,
    life: LifeState,
    patrol: Option<Patrol>,
    move_cd: Cooldown,
    contact_cd: Cooldown,
}

impl Enemy {
    pub fn new(
        id: EnemyId,
        tag: &str,
        pos: Pos,
        stats: EnemyStats,
        patrol: Option<Patrol>,
        sprite: Option<SpriteHandle>,
    ) -> Self {
        Enemy {
            id,
            tag: tag.to_string(),
            body: Body::new(pos, sprite),
            health: stats.health,
            damage: stats.damage,
            life: LifeState::Alive,
            patrol,
            move_cd: Cooldown::new(stats.move_ms),
            contact_cd: Cooldown::new(stats.contact_ms),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life == LifeState::Alive
    }

    pub fn life(&self) -> LifeState {
        self.life
    }

    pub fn mode(&self) -> PatrolMode {
        match self.patrol {
            Some(_) => PatrolMode::Patrolling,
            None => PatrolMode::Idle,
        }
    }

    pub fn patrol(&self) -> Option<&Patrol> {
        self.patrol.as_ref()
    }

    /// Patrol one tile if the move gate is open. The gate is consumed even
    /// when the way is blocked. Returns whether the enemy moved.
    pub fn update(&mut self, now: Millis, grid: &TileGrid) -> bool {
        if !self.is_alive() { return false; }
        let Some(patrol) = self.patrol.as_mut() else { return false };
        if !self.move_cd.try_trigger(now) { return false; }

        let (pos, taken) = patrol.step(self.body.pos, grid);
        self.body.pos = pos;
        match taken {
            Some((dx, _)) => {
                if let Some(facing) = Facing::from_dx(dx) {
                    self.body.facing = facing;
                }
                true
            }
            None => false,
        }
    }

    /// Subtract health. No effect once dead. Returns true only on the hit
    /// that kills.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if !self.is_alive() { return false; }
        self.health -= amount;
        if self.health <= 0 {
            self.life = LifeState::Dying;
            return true;
        }
        false
    }

    /// Damage dealt to a player standing at `player`: `Some(damage)` when
    /// orthogonally adjacent and the contact gate is open.
    pub fn try_touch(&mut self, player: Pos, now: Millis) -> Option<i32> {
        if !self.is_alive() { return None; }
        if !self.body.pos.is_adjacent(player) { return None; }
        if !self.contact_cd.try_trigger(now) { return None; }
        Some(self.damage)
    }

    /// Acknowledge a pending death. True exactly once per enemy.
    pub fn settle_death(&mut self) -> bool {
        if self.life != LifeState::Dying { return false; }
        self.life = LifeState::Dead;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATS: EnemyStats = EnemyStats { health: 50, damage: 50, contact_ms: 500, move_ms: 420 };

    fn grid() -> TileGrid {
        TileGrid::parse(&[
            "##########",
            "#........#",
            "#........#",
            "#........#",
            "##########",
        ])
        .unwrap()
    }

    fn golem(pos: Pos, route: Vec<Pos>) -> Enemy {
        Enemy::new(EnemyId(1), "golem.basic", pos, STATS, Patrol::new(route), None)
    }

    #[test]
    fn idle_enemy_never_moves() {
        let g = grid();
        let mut e = golem(Pos::new(3, 2), Vec::new());
        assert_eq!(e.mode(), PatrolMode::Idle);
        for t in 0..10 {
            assert!(!e.update(t * 1_000, &g));
        }
        assert_eq!(e.body.pos, Pos::new(3, 2));
    }

    #[test]
    fn moves_at_most_once_per_interval() {
        let g = grid();
        let mut e = golem(Pos::new(2, 2), vec![Pos::new(7, 2)]);
        assert!(e.update(0, &g));
        assert_eq!(e.body.pos, Pos::new(3, 2));
        assert!(!e.update(419, &g));
        assert_eq!(e.body.pos, Pos::new(3, 2));
        assert!(e.update(420, &g));
        assert_eq!(e.body.pos, Pos::new(4, 2));
        assert_eq!(e.body.facing, Facing::Right);
    }

    #[test]
    fn walking_left_faces_left() {
        let g = grid();
        let mut e = golem(Pos::new(5, 2), vec![Pos::new(1, 2)]);
        e.update(0, &g);
        assert_eq!(e.body.facing, Facing::Left);
    }

    #[test]
    fn patrol_reaches_and_wraps() {
        let g = grid();
        let mut e = golem(Pos::new(2, 2), vec![Pos::new(2, 2), Pos::new(6, 2)]);
        let mut now = 0;
        for _ in 0..5 {
            e.update(now, &g);
            now += STATS.move_ms;
        }
        assert_eq!(e.body.pos, Pos::new(6, 2));
        assert_eq!(e.patrol().unwrap().target(), Pos::new(2, 2));
    }

    #[test]
    fn damage_after_death_is_ignored() {
        let mut e = golem(Pos::new(2, 2), Vec::new());
        assert!(!e.take_damage(30));
        assert_eq!(e.health, 20);
        assert!(e.take_damage(30));
        assert_eq!(e.health, -10);
        assert_eq!(e.life(), LifeState::Dying);
        assert!(!e.take_damage(30));
        assert_eq!(e.health, -10);
        assert!(!e.is_alive());
    }

    #[test]
    fn death_settles_exactly_once() {
        let mut e = golem(Pos::new(2, 2), Vec::new());
        assert!(!e.settle_death());
        e.take_damage(50);
        assert!(e.settle_death());
        assert!(!e.settle_death());
        assert_eq!(e.life(), LifeState::Dead);
    }

    #[test]
    fn contact_requires_adjacency_and_cooldown() {
        let mut e = golem(Pos::new(3, 2), Vec::new());
        assert_eq!(e.try_touch(Pos::new(5, 2), 0), None);
        assert_eq!(e.try_touch(Pos::new(3, 2), 0), None);
        assert_eq!(e.try_touch(Pos::new(4, 2), 0), Some(50));
        assert_eq!(e.try_touch(Pos::new(4, 2), 499), None);
        assert_eq!(e.try_touch(Pos::new(3, 3), 500), Some(50));
    }

    #[test]
    fn dead_enemy_is_inert() {
        let g = grid();
        let mut e = golem(Pos::new(2, 2), vec![Pos::new(7, 2)]);
        e.take_damage(100);
        assert!(!e.update(0, &g));
        assert_eq!(e.try_touch(Pos::new(2, 3), 0), None);
    }
}
