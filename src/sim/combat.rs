/// Combat resolution, run once per tick after every actor has moved.
///
///   1. Projectile vs enemy (collocation)
///   2. Enemy vs player (adjacency, contact cooldown)
///   3. Death edge: each newly dead enemy is settled once and drops loot

use tracing::debug;

use crate::domain::cooldown::Millis;
use crate::domain::enemy::Enemy;
use crate::domain::loot::{self, LootSource};
use super::event::GameEvent;
use super::world::World;

pub fn resolve(world: &mut World, now: Millis, events: &mut Vec<GameEvent>) {
    resolve_projectile_hits(world, events);
    resolve_contact(world, now, events);
    resolve_loot(world, events);
}

/// Each live projectile hits at most one enemy: the first living one on
/// its tile. A hit consumes the projectile.
pub fn resolve_projectile_hits(world: &mut World, events: &mut Vec<GameEvent>) {
    for shot in world.projectiles.iter_mut().filter(|p| p.is_alive()) {
        let pos = shot.body.pos;
        let Some(target) = world.enemies.iter_mut().find(|e| e.is_alive() && e.body.pos == pos) else {
            continue;
        };
        target.take_damage(shot.damage);
        shot.kill();
        debug!(enemy = target.id.0, damage = shot.damage, health = target.health, "projectile hit");
        events.push(GameEvent::ProjectileHit { enemy: target.id, damage: shot.damage });
    }
}

pub fn resolve_contact(world: &mut World, now: Millis, events: &mut Vec<GameEvent>) {
    let player = &mut world.player;
    for enemy in world.enemies.iter_mut() {
        if !player.is_alive() { return; }
        let Some(damage) = enemy.try_touch(player.body.pos, now) else { continue };
        let health = player.take_damage(damage);
        debug!(enemy = enemy.id.0, damage, health, "player hurt");
        events.push(GameEvent::PlayerHurt { by: enemy.id, damage, health });
    }
}

/// Settle every pending death exactly once, calling `on_death` for each.
/// Returns how many deaths were settled.
pub fn resolve_deaths(enemies: &mut [Enemy], mut on_death: impl FnMut(&Enemy)) -> usize {
    let mut settled = 0;
    for enemy in enemies.iter_mut() {
        if enemy.settle_death() {
            on_death(enemy);
            settled += 1;
        }
    }
    settled
}

fn resolve_loot(world: &mut World, events: &mut Vec<GameEvent>) {
    let mut fallen = Vec::new();
    resolve_deaths(&mut world.enemies, |e| fallen.push((e.id, e.tag.clone(), e.body.pos)));

    for (id, tag, at) in fallen {
        let item = loot::roll(LootSource::Enemy(at), &world.sprites, &mut world.rng);
        debug!(enemy = id.0, tag = %tag, x = at.x, y = at.y, drop = item.kind.name(), "enemy killed");
        events.push(GameEvent::EnemyKilled { enemy: id, at });
        events.push(GameEvent::LootDropped { kind: item.kind, at });
        world.items.push(item);
    }
}
