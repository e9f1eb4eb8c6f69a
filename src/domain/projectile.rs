/// Projectiles: straight-line travel one tile per step interval until a
/// wall, the map edge or a hit ends them.

use super::cooldown::{Cooldown, Millis};
use super::entity::{Body, Facing, Pos, SpriteHandle};
use super::tile::TileGrid;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Flight {
    Waiting,
    Moved,
    Expired,
}

#[derive(Clone, Debug)]
pub struct Projectile {
    pub body: Body,
    pub damage: i32,
    alive: bool,
    step_cd: Cooldown,
}

impl Projectile {
    /// The first step happens `step_ms` after `now`; until then the
    /// projectile sits on its spawn tile and can already hit.
    pub fn new(
        pos: Pos,
        facing: Facing,
        step_ms: Millis,
        damage: i32,
        sprite: Option<SpriteHandle>,
        now: Millis,
    ) -> Self {
        Projectile {
            body: Body { pos, facing, sprite },
            damage,
            alive: true,
            step_cd: Cooldown::started_at(step_ms, now),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn update(&mut self, now: Millis, grid: &TileGrid) -> Flight {
        if !self.alive { return Flight::Expired; }
        if !self.step_cd.try_trigger(now) { return Flight::Waiting; }

        let next = self.body.pos.offset(self.body.facing.dx(), 0);
        if !grid.is_walkable(next.x, next.y) {
            self.alive = false;
            return Flight::Expired;
        }
        self.body.pos = next;
        Flight::Moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travels_until_wall() {
        let grid = TileGrid::parse(&["#.....#"]).unwrap();
        let mut p = Projectile::new(Pos::new(1, 0), Facing::Right, 140, 50, None, 0);
        assert_eq!(p.update(0, &grid), Flight::Waiting);
        assert_eq!(p.update(139, &grid), Flight::Waiting);
        let mut now = 140;
        let mut moves = 0;
        while p.is_alive() {
            if p.update(now, &grid) == Flight::Moved {
                moves += 1;
            }
            now += 140;
            assert!(now < 10_000);
        }
        assert_eq!(moves, 4);
        assert_eq!(p.body.pos, Pos::new(5, 0));
    }

    #[test]
    fn leaves_map_edge_and_dies() {
        let grid = TileGrid::parse(&["..."]).unwrap();
        let mut p = Projectile::new(Pos::new(1, 0), Facing::Left, 100, 50, None, 0);
        assert_eq!(p.update(100, &grid), Flight::Moved);
        assert_eq!(p.body.pos, Pos::new(0, 0));
        assert_eq!(p.update(200, &grid), Flight::Expired);
        assert!(!p.is_alive());
        assert_eq!(p.update(300, &grid), Flight::Expired);
    }

    #[test]
    fn killed_projectile_stays_dead() {
        let grid = TileGrid::parse(&["....."]).unwrap();
        let mut p = Projectile::new(Pos::new(0, 0), Facing::Right, 10, 50, None, 0);
        p.kill();
        assert_eq!(p.update(1_000, &grid), Flight::Expired);
        assert_eq!(p.body.pos, Pos::new(0, 0));
    }
}
