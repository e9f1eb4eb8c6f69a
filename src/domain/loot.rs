/// Loot policy: what an enemy death or an opened chest leaves on the floor.
/// Pure function of the source and one RNG draw; the inventory is never
/// touched here.

use rand::{Rng, RngExt};

use super::entity::{Item, ItemKind, Pos, SpriteSet};

pub const ENEMY_DROPS: [ItemKind; 2] = [ItemKind::Mushroom, ItemKind::LunarFruit];
pub const CHEST_LOOT: [ItemKind; 3] = [ItemKind::Hat, ItemKind::Corset, ItemKind::Dress];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LootSource {
    Enemy(Pos),
    Chest(Pos),
}

/// Exactly one item, placed on the source's tile.
pub fn roll(source: LootSource, sprites: &SpriteSet, rng: &mut impl Rng) -> Item {
    let (pos, kind) = match source {
        LootSource::Enemy(pos) => {
            let kind = if rng.random_bool(0.5) { ENEMY_DROPS[0] } else { ENEMY_DROPS[1] };
            (pos, kind)
        }
        LootSource::Chest(pos) => (pos, CHEST_LOOT[rng.random_range(0..CHEST_LOOT.len())]),
    };
    Item { pos, kind, sprite: sprites.item(kind) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn enemy_drops_food_on_its_tile() {
        let mut rng = StdRng::seed_from_u64(7);
        let sprites = SpriteSet::default();
        let mut seen = Vec::new();
        for _ in 0..200 {
            let item = roll(LootSource::Enemy(Pos::new(5, 5)), &sprites, &mut rng);
            assert_eq!(item.pos, Pos::new(5, 5));
            assert!(ENEMY_DROPS.contains(&item.kind));
            if !seen.contains(&item.kind) {
                seen.push(item.kind);
            }
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn chest_drops_equipment_only() {
        let mut rng = StdRng::seed_from_u64(11);
        let sprites = SpriteSet::default();
        let mut seen = Vec::new();
        for _ in 0..300 {
            let item = roll(LootSource::Chest(Pos::new(3, 3)), &sprites, &mut rng);
            assert_eq!(item.pos, Pos::new(3, 3));
            assert!(CHEST_LOOT.contains(&item.kind));
            if !seen.contains(&item.kind) {
                seen.push(item.kind);
            }
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn sprite_comes_from_set() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sprites = SpriteSet::default();
        for kind in CHEST_LOOT {
            sprites.items.insert(kind, crate::domain::entity::SpriteHandle(9));
        }
        let item = roll(LootSource::Chest(Pos::new(0, 0)), &sprites, &mut rng);
        assert_eq!(item.sprite, Some(crate::domain::entity::SpriteHandle(9)));
    }
}
