// Logical input. The simulation never sees keys or buttons, only which
// actions are active this tick and whether fire was triggered.

bitflags::bitflags! {
    /// Held actions are level-sensitive; cooldowns turn them into repeats.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Actions: u16 {
        const MOVE_LEFT  = 1 << 0;
        const MOVE_RIGHT = 1 << 1;
        const MOVE_UP    = 1 << 2;
        const MOVE_DOWN  = 1 << 3;
        const ATTACK     = 1 << 4;
        const USE_HEALTH = 1 << 5;
        const USE_MANA   = 1 << 6;
        const PICKUP     = 1 << 7;
        const INTERACT   = 1 << 8;
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Action {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Attack,
    UseHealth,
    UseMana,
    Pickup,
    Interact,
}

impl Action {
    pub fn flag(self) -> Actions {
        match self {
            Action::MoveLeft => Actions::MOVE_LEFT,
            Action::MoveRight => Actions::MOVE_RIGHT,
            Action::MoveUp => Actions::MOVE_UP,
            Action::MoveDown => Actions::MOVE_DOWN,
            Action::Attack => Actions::ATTACK,
            Action::UseHealth => Actions::USE_HEALTH,
            Action::UseMana => Actions::USE_MANA,
            Action::Pickup => Actions::PICKUP,
            Action::Interact => Actions::INTERACT,
        }
    }
}

/// What the player's controls look like from inside a tick.
pub trait InputSource {
    fn is_active(&self, action: Action) -> bool;

    /// Edge-triggered fire (a press, not a hold).
    fn fire_triggered(&self) -> bool;

    /// Movement direction; first active of left, right, up, down wins.
    fn direction(&self) -> Option<(i32, i32)> {
        const ORDER: [(Action, (i32, i32)); 4] = [
            (Action::MoveLeft, (-1, 0)),
            (Action::MoveRight, (1, 0)),
            (Action::MoveUp, (0, -1)),
            (Action::MoveDown, (0, 1)),
        ];
        ORDER.iter().find(|(a, _)| self.is_active(*a)).map(|&(_, d)| d)
    }
}

/// One tick's snapshot of the controls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub held: Actions,
    pub fire: bool,
}

#[cfg(test)]
impl FrameInput {
    pub fn none() -> Self {
        FrameInput::default()
    }

    pub fn holding(action: Action) -> Self {
        FrameInput { held: action.flag(), fire: false }
    }

    pub fn firing() -> Self {
        FrameInput { held: Actions::empty(), fire: true }
    }

    pub fn with(mut self, action: Action) -> Self {
        self.held |= action.flag();
        self
    }
}

impl InputSource for FrameInput {
    fn is_active(&self, action: Action) -> bool {
        self.held.contains(action.flag())
    }

    fn fire_triggered(&self) -> bool {
        self.fire
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_prefers_left_then_right_then_up() {
        let both = FrameInput::holding(Action::MoveRight).with(Action::MoveLeft);
        assert_eq!(both.direction(), Some((-1, 0)));
        let vert = FrameInput::holding(Action::MoveDown).with(Action::MoveUp);
        assert_eq!(vert.direction(), Some((0, -1)));
        let diag = FrameInput::holding(Action::MoveDown).with(Action::MoveRight);
        assert_eq!(diag.direction(), Some((1, 0)));
        assert_eq!(FrameInput::none().direction(), None);
    }

    #[test]
    fn fire_is_separate_from_held_actions() {
        let input = FrameInput::firing();
        assert!(input.fire_triggered());
        assert!(!input.is_active(Action::Attack));
    }
}
