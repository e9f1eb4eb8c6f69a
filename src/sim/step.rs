/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Player (move → melee → item use → fire)
///   2. Enemy patrol movement
///   3. Projectile flight
///   4. Combat (projectile hits → contact damage → deaths and loot)
///   5. Item pickup
///   6. Chest interaction
///   7. Pruning of spent projectiles and settled enemies
///   8. Defeat check
///
/// "Cooldown not ready" always means "do nothing this tick"; nothing here
/// can fail.

use tracing::{debug, info};

use crate::domain::cooldown::Millis;
use crate::domain::enemy::LifeState;
use crate::domain::input::{Action, InputSource};
use crate::domain::loot::{self, LootSource};
use crate::domain::projectile::Flight;
use super::combat;
use super::event::GameEvent;
use super::world::{Phase, World};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut World, now: Millis, input: &impl InputSource) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    resolve_player(world, now, input, &mut events);
    resolve_fire(world, now, input, &mut events);
    resolve_enemy_movement(world, now);
    resolve_projectiles(world, now, &mut events);
    combat::resolve(world, now, &mut events);
    resolve_item_pickup(world, input, &mut events);
    resolve_chests(world, now, input, &mut events);
    prune(world);
    resolve_defeat(world, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player(world: &mut World, now: Millis, input: &impl InputSource, events: &mut Vec<GameEvent>) {
    let tick = world.player.update(now, input, &world.grid, &mut world.enemies);
    if let Some(to) = tick.moved_to {
        events.push(GameEvent::PlayerMoved { to });
    }
    if let Some(hit) = tick.melee {
        debug!(enemy = hit.enemy.0, damage = hit.damage, killed = hit.killed, "melee hit");
        events.push(GameEvent::MeleeHit { enemy: hit.enemy, damage: hit.damage });
    }

    let Some(inventory) = world.inventory.as_mut() else { return };
    if let Some((kind, value)) = world.player.use_item(now, input, &mut **inventory) {
        debug!(potion = kind.name(), value, "potion used");
        events.push(GameEvent::PotionUsed { kind, value });
    }
}

fn resolve_fire(world: &mut World, now: Millis, input: &impl InputSource, events: &mut Vec<GameEvent>) {
    if !input.fire_triggered() { return; }
    let spawned = world.player.fire(
        now,
        &world.grid,
        world.projectile.step_ms,
        world.projectile.damage,
        world.sprites.projectile,
    );
    if let Some(shot) = spawned {
        events.push(GameEvent::ProjectileFired { at: shot.body.pos, facing: shot.body.facing });
        world.projectiles.push(shot);
    }
}

// ══════════════════════════════════════════════════════════════
// Enemies and projectiles
// ══════════════════════════════════════════════════════════════

fn resolve_enemy_movement(world: &mut World, now: Millis) {
    for enemy in world.enemies.iter_mut() {
        enemy.update(now, &world.grid);
    }
}

fn resolve_projectiles(world: &mut World, now: Millis, events: &mut Vec<GameEvent>) {
    for shot in world.projectiles.iter_mut().filter(|p| p.is_alive()) {
        if shot.update(now, &world.grid) == Flight::Expired {
            events.push(GameEvent::ProjectileExpired { at: shot.body.pos });
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Pickup and chests
// ══════════════════════════════════════════════════════════════

/// Items on the player's tile move into the inventory. An item the
/// inventory refuses stays on the floor.
fn resolve_item_pickup(world: &mut World, input: &impl InputSource, events: &mut Vec<GameEvent>) {
    if !input.is_active(Action::Pickup) || !world.player.is_alive() { return; }
    let Some(inventory) = world.inventory.as_mut() else { return };

    let here = world.player.body.pos;
    let mut picked = Vec::new();
    world.items.retain(|item| {
        if item.pos != here { return true; }
        if !inventory.add(item.kind, 1) { return true; }
        picked.push(item.kind);
        false
    });
    for kind in picked {
        debug!(item = kind.name(), "item picked up");
        events.push(GameEvent::ItemPickedUp { kind });
    }
}

/// One chest per cooldown window: the first closed chest within reach.
fn resolve_chests(world: &mut World, now: Millis, input: &impl InputSource, events: &mut Vec<GameEvent>) {
    if !input.is_active(Action::Interact) || !world.player.is_alive() { return; }
    if !world.chest_cd.is_ready(now) { return; }

    let here = world.player.body.pos;
    let Some(chest) = world.chests.iter_mut().find(|c| !c.is_open() && c.pos.manhattan(here) <= 1) else {
        return;
    };
    chest.open(now);
    world.chest_cd.trigger(now);

    let at = chest.pos;
    let item = loot::roll(LootSource::Chest(at), &world.sprites, &mut world.rng);
    debug!(x = at.x, y = at.y, loot = item.kind.name(), "chest opened");
    events.push(GameEvent::ChestOpened { at });
    events.push(GameEvent::LootDropped { kind: item.kind, at });
    world.items.push(item);
}

// ══════════════════════════════════════════════════════════════
// Cleanup and outcome
// ══════════════════════════════════════════════════════════════

fn prune(world: &mut World) {
    world.projectiles.retain(|p| p.is_alive());
    world.enemies.retain(|e| e.life() != LifeState::Dead);
}

fn resolve_defeat(world: &mut World, events: &mut Vec<GameEvent>) {
    if world.player.is_alive() { return; }
    world.phase = Phase::Defeated;
    info!(tick = world.tick, "player defeated");
    events.push(GameEvent::PlayerDefeated);
}
