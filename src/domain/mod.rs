pub mod cooldown;
pub mod enemy;
pub mod entity;
pub mod input;
pub mod inventory;
pub mod loot;
pub mod patrol;
pub mod player;
pub mod projectile;
pub mod tile;
