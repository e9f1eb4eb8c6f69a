/// Events emitted during a simulation step.
/// The host consumes these for its log and the HUD message line.

use crate::domain::enemy::EnemyId;
use crate::domain::entity::{Facing, ItemKind, Pos};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    PlayerMoved { to: Pos },
    MeleeHit { enemy: EnemyId, damage: i32 },
    PotionUsed { kind: ItemKind, value: i32 },
    ProjectileFired { at: Pos, facing: Facing },
    ProjectileExpired { at: Pos },
    ProjectileHit { enemy: EnemyId, damage: i32 },
    PlayerHurt { by: EnemyId, damage: i32, health: i32 },
    PlayerDefeated,
    EnemyKilled { enemy: EnemyId, at: Pos },
    LootDropped { kind: ItemKind, at: Pos },
    ItemPickedUp { kind: ItemKind },
    ChestOpened { at: Pos },
}

impl GameEvent {
    /// Short line for the HUD, for events the player should notice.
    pub fn headline(&self) -> Option<String> {
        match self {
            GameEvent::PotionUsed { kind, .. } => Some(format!("Used {}", kind.name())),
            GameEvent::EnemyKilled { .. } => Some("Golem destroyed".into()),
            GameEvent::ItemPickedUp { kind } => Some(format!("Picked up {}", kind.name())),
            GameEvent::ChestOpened { .. } => Some("Chest opened".into()),
            GameEvent::PlayerDefeated => Some("You were defeated".into()),
            _ => None,
        }
    }
}
