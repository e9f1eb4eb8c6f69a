/// Shared entity vocabulary: positions, facing, sprite handles, floor items
/// and chests. Actor types live in their own modules and are unified for
/// rendering through `ActorView`.

use std::collections::HashMap;

use super::cooldown::Millis;
use super::enemy::Enemy;
use super::player::Player;
use super::projectile::Projectile;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn dx(self) -> i32 {
        match self {
            Facing::Left => -1,
            Facing::Right => 1,
        }
    }

    /// Facing implied by a horizontal step; `None` for vertical moves.
    pub fn from_dx(dx: i32) -> Option<Facing> {
        match dx.signum() {
            -1 => Some(Facing::Left),
            1 => Some(Facing::Right),
            _ => None,
        }
    }
}

/// Integer tile coordinate. Signed so neighbour arithmetic can step off
/// the map and be rejected by the grid.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Pos { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Pos {
        Pos { x: self.x + dx, y: self.y + dy }
    }

    pub fn manhattan(self, other: Pos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Orthogonally adjacent (distance exactly 1).
    pub fn is_adjacent(self, other: Pos) -> bool {
        self.manhattan(other) == 1
    }
}

/// Opaque reference into the host's sprite registry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SpriteHandle(pub u32);

/// Placement shared by every actor.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub pos: Pos,
    pub facing: Facing,
    pub sprite: Option<SpriteHandle>,
}

impl Body {
    pub fn new(pos: Pos, sprite: Option<SpriteHandle>) -> Self {
        Body { pos, facing: Facing::Right, sprite }
    }
}

// ── Items ──

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ItemKind {
    HealthPotion,
    ManaPotion,
    Mushroom,
    LunarFruit,
    Hat,
    Corset,
    Dress,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ItemCategory {
    Potion,
    Food,
    Equipment,
}

impl ItemKind {
    pub const ALL: [ItemKind; 7] = [
        ItemKind::HealthPotion,
        ItemKind::ManaPotion,
        ItemKind::Mushroom,
        ItemKind::LunarFruit,
        ItemKind::Hat,
        ItemKind::Corset,
        ItemKind::Dress,
    ];

    pub fn category(self) -> ItemCategory {
        match self {
            ItemKind::HealthPotion | ItemKind::ManaPotion => ItemCategory::Potion,
            ItemKind::Mushroom | ItemKind::LunarFruit => ItemCategory::Food,
            ItemKind::Hat | ItemKind::Corset | ItemKind::Dress => ItemCategory::Equipment,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ItemKind::HealthPotion => "Health Potion",
            ItemKind::ManaPotion => "Mana Potion",
            ItemKind::Mushroom => "Mushroom",
            ItemKind::LunarFruit => "Lunar Fruit",
            ItemKind::Hat => "Witch Hat",
            ItemKind::Corset => "Corset",
            ItemKind::Dress => "Dress",
        }
    }

    /// Key the sprite registry knows this item's art by.
    pub fn sprite_key(self) -> &'static str {
        match self {
            ItemKind::HealthPotion => "health_potion",
            ItemKind::ManaPotion => "mana_potion",
            ItemKind::Mushroom => "heart",
            ItemKind::LunarFruit => "star",
            ItemKind::Hat => "hat",
            ItemKind::Corset => "corset",
            ItemKind::Dress => "dress",
        }
    }
}

/// An item lying on the floor.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub pos: Pos,
    pub kind: ItemKind,
    pub sprite: Option<SpriteHandle>,
}

// ── Chests ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ChestState {
    Closed,
    Open { since: Millis },
}

/// Chests open at most once; there is no way back to `Closed`.
#[derive(Clone, Debug, PartialEq)]
pub struct Chest {
    pub pos: Pos,
    state: ChestState,
}

impl Chest {
    pub fn new(pos: Pos) -> Self {
        Chest { pos, state: ChestState::Closed }
    }

    pub fn state(&self) -> ChestState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state(), ChestState::Open { .. })
    }

    /// Returns false if the chest was already open.
    pub fn open(&mut self, now: Millis) -> bool {
        if self.is_open() {
            return false;
        }
        self.state = ChestState::Open { since: now };
        true
    }

    /// Animation frame: 0 while closed, then advancing every `frame_ms`
    /// and holding on the last frame.
    pub fn open_frame(&self, now: Millis, frame_ms: Millis, frames: usize) -> usize {
        let ChestState::Open { since } = self.state() else { return 0 };
        let last = frames.saturating_sub(1);
        if frame_ms == 0 {
            return last;
        }
        let step = (now.saturating_sub(since) / frame_ms) as usize;
        step.min(last)
    }
}

// ── Sprites ──

/// Handles resolved once at level build and stamped onto new entities.
#[derive(Clone, Debug, Default)]
pub struct SpriteSet {
    pub player: Option<SpriteHandle>,
    pub enemy: Option<SpriteHandle>,
    pub projectile: Option<SpriteHandle>,
    pub items: HashMap<ItemKind, SpriteHandle>,
}

impl SpriteSet {
    pub fn item(&self, kind: ItemKind) -> Option<SpriteHandle> {
        self.items.get(&kind).copied()
    }
}

// ── Actors ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActorKind {
    Player,
    Enemy,
    Projectile,
}

/// Borrowed view over any actor, for code that only needs placement.
#[derive(Clone, Copy, Debug)]
pub enum ActorView<'a> {
    Player(&'a Player),
    Enemy(&'a Enemy),
    Projectile(&'a Projectile),
}

impl<'a> ActorView<'a> {
    pub fn kind(&self) -> ActorKind {
        match self {
            ActorView::Player(_) => ActorKind::Player,
            ActorView::Enemy(_) => ActorKind::Enemy,
            ActorView::Projectile(_) => ActorKind::Projectile,
        }
    }

    pub fn body(&self) -> &'a Body {
        match *self {
            ActorView::Player(p) => &p.body,
            ActorView::Enemy(e) => &e.body,
            ActorView::Projectile(p) => &p.body,
        }
    }

    pub fn is_alive(&self) -> bool {
        match self {
            ActorView::Player(p) => p.health > 0,
            ActorView::Enemy(e) => e.is_alive(),
            ActorView::Projectile(p) => p.is_alive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_and_adjacency() {
        let a = Pos::new(2, 2);
        assert_eq!(a.manhattan(Pos::new(5, 6)), 7);
        assert!(a.is_adjacent(Pos::new(2, 3)));
        assert!(a.is_adjacent(Pos::new(1, 2)));
        assert!(!a.is_adjacent(Pos::new(3, 3)));
        assert!(!a.is_adjacent(a));
    }

    #[test]
    fn facing_from_horizontal_steps_only() {
        assert_eq!(Facing::from_dx(-1), Some(Facing::Left));
        assert_eq!(Facing::from_dx(3), Some(Facing::Right));
        assert_eq!(Facing::from_dx(0), None);
        assert_eq!(Facing::Left.dx(), -1);
    }

    #[test]
    fn chest_opens_once() {
        let mut chest = Chest::new(Pos::new(3, 3));
        assert!(chest.open(100));
        assert!(!chest.open(900));
        assert_eq!(chest.state(), ChestState::Open { since: 100 });
    }

    #[test]
    fn chest_frames_advance_then_hold() {
        let mut chest = Chest::new(Pos::new(0, 0));
        assert_eq!(chest.open_frame(50, 120, 3), 0);
        chest.open(1_000);
        assert_eq!(chest.open_frame(1_000, 120, 3), 0);
        assert_eq!(chest.open_frame(1_119, 120, 3), 0);
        assert_eq!(chest.open_frame(1_120, 120, 3), 1);
        assert_eq!(chest.open_frame(1_240, 120, 3), 2);
        assert_eq!(chest.open_frame(9_000, 120, 3), 2);
    }

    #[test]
    fn item_categories() {
        assert_eq!(ItemKind::HealthPotion.category(), ItemCategory::Potion);
        assert_eq!(ItemKind::LunarFruit.category(), ItemCategory::Food);
        assert_eq!(ItemKind::Dress.category(), ItemCategory::Equipment);
        let equipment = ItemKind::ALL.iter().filter(|k| k.category() == ItemCategory::Equipment).count();
        assert_eq!(equipment, 3);
    }
}
