/// Waypoint patrol: greedy one-tile steps toward the current waypoint,
/// horizontal axis first, wrapping back to the first waypoint.
/// No pathfinding; a wall in the way stalls the patroller.

use super::entity::Pos;
use super::tile::TileGrid;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PatrolMode {
    Idle,
    Patrolling,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patrol {
    waypoints: Vec<Pos>,
    index: usize,
}

impl Patrol {
    /// `None` for an empty route; an enemy without one stays idle.
    pub fn new(waypoints: Vec<Pos>) -> Option<Patrol> {
        if waypoints.is_empty() {
            return None;
        }
        Some(Patrol { waypoints, index: 0 })
    }

    pub fn waypoints(&self) -> &[Pos] {
        &self.waypoints
    }

    #[cfg(test)]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn target(&self) -> Pos {
        self.waypoints[self.index]
    }

    pub fn advance(&mut self) {
        self.index = (self.index + 1) % self.waypoints.len();
    }

    /// Unit step toward the target: x first, then y. `None` when on target.
    pub fn heading(&self, from: Pos) -> Option<(i32, i32)> {
        let target = self.target();
        let dx = (target.x - from.x).signum();
        if dx != 0 {
            return Some((dx, 0));
        }
        let dy = (target.y - from.y).signum();
        if dy != 0 {
            return Some((0, dy));
        }
        None
    }

    /// One patrol move from `from`. Returns the new position and the step
    /// taken, if any. Arriving on the target advances to the next waypoint.
    pub fn step(&mut self, from: Pos, grid: &TileGrid) -> (Pos, Option<(i32, i32)>) {
        let mut pos = from;
        let mut taken = None;
        if let Some((dx, dy)) = self.heading(from) {
            let dest = from.offset(dx, dy);
            if grid.is_walkable(dest.x, dest.y) {
                pos = dest;
                taken = Some((dx, dy));
            }
        }
        if pos == self.target() {
            self.advance();
        }
        (pos, taken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid() -> TileGrid {
        TileGrid::parse(&[
            "##########",
            "#........#",
            "#........#",
            "#........#",
            "#........#",
            "##########",
        ])
        .unwrap()
    }

    #[test]
    fn empty_route_is_rejected() {
        assert!(Patrol::new(Vec::new()).is_none());
    }

    #[test]
    fn horizontal_before_vertical() {
        let patrol = Patrol::new(vec![Pos::new(5, 3)]).unwrap();
        assert_eq!(patrol.heading(Pos::new(2, 1)), Some((1, 0)));
        assert_eq!(patrol.heading(Pos::new(5, 1)), Some((0, 1)));
        assert_eq!(patrol.heading(Pos::new(5, 3)), None);
    }

    #[test]
    fn starting_on_first_waypoint_advances_immediately() {
        let grid = open_grid();
        let mut patrol = Patrol::new(vec![Pos::new(2, 2), Pos::new(6, 2)]).unwrap();
        let (pos, taken) = patrol.step(Pos::new(2, 2), &grid);
        assert_eq!(pos, Pos::new(2, 2));
        assert_eq!(taken, None);
        assert_eq!(patrol.target(), Pos::new(6, 2));
    }

    #[test]
    fn walks_to_far_waypoint_then_wraps() {
        let grid = open_grid();
        let mut patrol = Patrol::new(vec![Pos::new(2, 2), Pos::new(6, 2)]).unwrap();
        let mut pos = Pos::new(2, 2);
        pos = patrol.step(pos, &grid).0;
        for _ in 0..4 {
            pos = patrol.step(pos, &grid).0;
        }
        assert_eq!(pos, Pos::new(6, 2));
        assert_eq!(patrol.index(), 0);
        assert_eq!(patrol.target(), Pos::new(2, 2));
    }

    #[test]
    fn wall_stalls_without_moving() {
        let grid = TileGrid::parse(&["#####", "#.#.#", "#####"]).unwrap();
        let mut patrol = Patrol::new(vec![Pos::new(3, 1)]).unwrap();
        let (pos, taken) = patrol.step(Pos::new(1, 1), &grid);
        assert_eq!(pos, Pos::new(1, 1));
        assert_eq!(taken, None);
        assert_eq!(patrol.index(), 0);
    }

    #[test]
    fn square_route_visits_every_waypoint_in_order() {
        let grid = open_grid();
        let route = vec![Pos::new(1, 1), Pos::new(4, 1), Pos::new(4, 4), Pos::new(1, 4)];
        let mut patrol = Patrol::new(route.clone()).unwrap();
        let mut pos = Pos::new(1, 1);
        let mut visited = Vec::new();
        for _ in 0..40 {
            let before = patrol.index();
            pos = patrol.step(pos, &grid).0;
            if patrol.index() != before {
                visited.push(pos);
            }
        }
        assert!(visited.len() >= 8);
        for (i, p) in visited.iter().enumerate() {
            assert_eq!(*p, route[i % route.len()]);
        }
    }
}
