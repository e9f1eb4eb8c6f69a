/// Gamepad input tracker using gilrs.
///
/// Button mapping comes from the `[gamepad]` section of config.toml.
/// Default mapping:
///   D-pad / Left Stick    →  Movement
///   X                     →  Attack
///   A                     →  Pick up
///   B                     →  Open chest
///   L1 / R1               →  Health / mana potion
///   Y / R2                →  Fire
///   Start                 →  Pause
///   Select                →  Restart after defeat
///
/// Without the `gamepad` feature this compiles to an always-idle pad.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::input::Actions;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Face, shoulder and menu buttons. The d-pad is tracked as a direction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

const BTN_COUNT: usize = 10;

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" => Some(Btn::L1),
            "R1" | "RB" => Some(Btn::R1),
            "L2" | "LT" => Some(Btn::L2),
            "R2" | "RT" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2 => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

/// Which buttons drive which action.
#[derive(Clone, Debug, PartialEq)]
struct ActionMap {
    attack: Vec<Btn>,
    pickup: Vec<Btn>,
    interact: Vec<Btn>,
    use_health: Vec<Btn>,
    use_mana: Vec<Btn>,
    fire: Vec<Btn>,
    pause: Vec<Btn>,
    restart: Vec<Btn>,
}

impl ActionMap {
    /// Unknown names are skipped; an action left with no buttons keeps the
    /// previous binding.
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse(names: &[String], fallback: Vec<Btn>) -> Vec<Btn> {
            let btns: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if btns.is_empty() { fallback } else { btns }
        }
        let d = ActionMap::default();
        ActionMap {
            attack: parse(&cfg.attack, d.attack),
            pickup: parse(&cfg.pickup, d.pickup),
            interact: parse(&cfg.interact, d.interact),
            use_health: parse(&cfg.use_health, d.use_health),
            use_mana: parse(&cfg.use_mana, d.use_mana),
            fire: parse(&cfg.fire, d.fire),
            pause: parse(&cfg.pause, d.pause),
            restart: parse(&cfg.restart, d.restart),
        }
    }
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            attack: vec![Btn::X],
            pickup: vec![Btn::A],
            interact: vec![Btn::B],
            use_health: vec![Btn::L1],
            use_mana: vec![Btn::R1],
            fire: vec![Btn::Y, Btn::R2],
            pause: vec![Btn::Start],
            restart: vec![Btn::Select],
        }
    }
}

/// Indices into the direction arrays.
const UP: usize = 0;
const DOWN: usize = 1;
const LEFT: usize = 2;
const RIGHT: usize = 3;

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],
    dpad: [BtnState; 4],
    stick: [BtnState; 4],
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_x: f32,
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    stick_y: f32,

    action_map: ActionMap,
    pub connected: bool,
}

impl GamepadState {
    pub fn new(cfg: &GamepadConfig) -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                tracing::warn!(error = %e, "gamepad support unavailable");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: [BtnState::default(); 4],
            stick: [BtnState::default(); 4],
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::from_config(cfg),
            connected,
        }
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let Some(gilrs) = self.gilrs.as_mut() else { return };
        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    tracing::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    tracing::info!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        let now_held = [
            self.stick_y > STICK_DEADZONE,
            self.stick_y < -STICK_DEADZONE,
            self.stick_x < -STICK_DEADZONE,
            self.stick_x > STICK_DEADZONE,
        ];
        for (state, held) in self.stick.iter_mut().zip(now_held) {
            if held && !state.held { state.just_pressed = true; }
            state.held = held;
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        let slot = match gilrs_btn {
            Button::DPadUp => &mut self.dpad[UP],
            Button::DPadDown => &mut self.dpad[DOWN],
            Button::DPadLeft => &mut self.dpad[LEFT],
            Button::DPadRight => &mut self.dpad[RIGHT],
            other => match Btn::from_gilrs(other) {
                Some(btn) => &mut self.buttons[btn as usize],
                None => return,
            },
        };
        slot.held = held;
        if held { slot.just_pressed = true; }
    }

    // ── Action queries ──

    fn any_held(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].held)
    }

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    fn dir_held(&self, dir: usize) -> bool {
        self.dpad[dir].held || self.stick[dir].held
    }

    /// Level-sensitive actions currently held on the pad.
    pub fn held_actions(&self) -> Actions {
        let map = &self.action_map;
        let mut actions = Actions::empty();
        actions.set(Actions::MOVE_LEFT, self.dir_held(LEFT));
        actions.set(Actions::MOVE_RIGHT, self.dir_held(RIGHT));
        actions.set(Actions::MOVE_UP, self.dir_held(UP));
        actions.set(Actions::MOVE_DOWN, self.dir_held(DOWN));
        actions.set(Actions::ATTACK, self.any_held(&map.attack));
        actions.set(Actions::PICKUP, self.any_held(&map.pickup));
        actions.set(Actions::INTERACT, self.any_held(&map.interact));
        actions.set(Actions::USE_HEALTH, self.any_held(&map.use_health));
        actions.set(Actions::USE_MANA, self.any_held(&map.use_mana));
        actions
    }

    pub fn fire_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.fire)
    }

    pub fn pause_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.pause)
    }

    pub fn restart_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.restart)
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            b.just_pressed = false;
        }
    }

    #[cfg(feature = "gamepad")]
    fn release_all(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            *b = BtnState::default();
        }
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_names_are_case_insensitive() {
        assert_eq!(Btn::from_name("start"), Some(Btn::Start));
        assert_eq!(Btn::from_name("rb"), Some(Btn::R1));
        assert_eq!(Btn::from_name("North"), Some(Btn::Y));
        assert_eq!(Btn::from_name("Guide"), None);
    }

    #[test]
    fn unknown_names_keep_default_binding() {
        let mut cfg = GamepadConfig::default();
        cfg.attack = vec!["Guide".into()];
        cfg.fire = vec!["b".into(), "nope".into()];
        let map = ActionMap::from_config(&cfg);
        assert_eq!(map.attack, vec![Btn::X]);
        assert_eq!(map.fire, vec![Btn::B]);
    }

    #[test]
    fn default_config_matches_default_map() {
        assert_eq!(ActionMap::from_config(&GamepadConfig::default()), ActionMap::default());
    }
}
