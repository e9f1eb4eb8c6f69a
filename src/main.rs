/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyboardEnhancementFlags, PushKeyboardEnhancementFlags, PopKeyboardEnhancementFlags};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::GameConfig;
use domain::cooldown::Millis;
use domain::input::{Actions, FrameInput};
use sim::level::{build_world, session_rng};
use sim::step;
use sim::world::{Phase, World};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sprites::SpriteRegistry;

/// How long a HUD message stays up.
const MESSAGE_MS: Millis = 2_000;

fn main() {
    let (config, config_err) = GameConfig::load();

    let _log_guard = match setup_logging(&config.log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled ({}): {e}", config.log_dir.display());
            None
        }
    };
    if let Some(e) = config_err {
        warn!(error = %e, "config.toml ignored, using defaults");
    }

    let mut sprites = SpriteRegistry::with_defaults();
    let world = match new_world(&config, &mut sprites) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Could not build a level: {e}");
            return;
        }
    };

    let mut renderer = Renderer::new(&mut sprites);
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let mut session = Session { world, message: String::new(), message_until: 0 };
    let result = game_loop(&mut session, &mut renderer, &mut sprites, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Witchcrawl!");
    println!("Turns survived: {}", session.world.tick);
}

/// File-only logging: stdout and stderr belong to the terminal UI.
fn setup_logging(dir: &Path) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;
    let file_appender = tracing_appender::rolling::never(dir, "witchcrawl.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    info!("log file: {}/witchcrawl.log", dir.display());
    Ok(guard)
}

fn new_world(config: &GameConfig, sprites: &mut SpriteRegistry) -> Result<World, error::SpawnError> {
    let (rng, seed) = session_rng(config);
    info!(seed, "new session");
    build_world(config, sprites.sprite_set(), rng)
}

/// The running world plus host-side HUD state.
struct Session {
    world: World,
    message: String,
    message_until: Millis,
}

impl Session {
    fn say(&mut self, text: String, now: Millis) {
        self.message = text;
        self.message_until = now + MESSAGE_MS;
    }
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    sprites: &mut SpriteRegistry,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new(&config.gamepad);
    let frame = Duration::from_millis(config.timing.frame_ms);
    let start = Instant::now();

    // Release events make held keys precise; older terminals reject the flags.
    let enhanced = crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false)
        && crossterm::execute!(
            std::io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .is_ok();
    kb.honor_release = enhanced;
    if gp.connected { info!("gamepad detected"); }

    loop {
        let now = start.elapsed().as_millis() as Millis;
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) {
            break;
        }
        handle_meta(session, sprites, config, &kb, &gp, now);

        if session.world.phase == Phase::Playing {
            let input = FrameInput {
                held: keyboard_actions(&kb) | gp.held_actions(),
                fire: kb.any_pressed(KEYS_FIRE) || kb.mouse_pressed() || gp.fire_pressed(),
            };
            for event in step::step(&mut session.world, now, &input) {
                debug!(tick = session.world.tick, ?event, "event");
                if let Some(text) = event.headline() {
                    session.say(text, now);
                }
            }
        }

        if !session.message.is_empty() && now >= session.message_until {
            session.message.clear();
        }

        renderer.render(&session.world, sprites, &session.message, now)?;
        std::thread::sleep(frame);
    }

    if enhanced {
        let _ = crossterm::execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
    }
    Ok(())
}

/// Pause and restart. Quitting is handled by the loop.
fn handle_meta(
    session: &mut Session,
    sprites: &mut SpriteRegistry,
    config: &GameConfig,
    kb: &InputState,
    gp: &GamepadState,
    now: Millis,
) {
    let world = &mut session.world;
    if kb.any_pressed(KEYS_PAUSE) || gp.pause_pressed() {
        match world.phase {
            Phase::Playing => world.phase = Phase::Paused,
            Phase::Paused => world.phase = Phase::Playing,
            Phase::Defeated => {}
        }
        debug!(phase = ?world.phase, "pause toggled");
        return;
    }

    if world.phase == Phase::Defeated && (kb.any_pressed(KEYS_RESTART) || gp.restart_pressed()) {
        match new_world(config, sprites) {
            Ok(fresh) => {
                session.world = fresh;
                session.say("A new crawl begins".to_string(), now);
            }
            Err(e) => {
                warn!(error = %e, "restart failed");
                session.say(format!("Restart failed: {e}"), now);
            }
        }
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_ATTACK: &[KeyCode] = &[KeyCode::Char('f'), KeyCode::Char('F')];
const KEYS_INTERACT: &[KeyCode] = &[KeyCode::Char('g'), KeyCode::Char('G')];
const KEYS_HEALTH: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_MANA: &[KeyCode] = &[KeyCode::Char('e'), KeyCode::Char('E')];
const KEYS_FIRE: &[KeyCode] = &[KeyCode::Char(' ')];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::F(1)];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc];

/// Held keys → actions. A key counts on the frame it is first pressed too.
fn keyboard_actions(kb: &InputState) -> Actions {
    let down = |keys: &[KeyCode]| kb.any_held(keys) || kb.any_pressed(keys);
    let mut actions = Actions::empty();
    actions.set(Actions::MOVE_LEFT, down(KEYS_LEFT));
    actions.set(Actions::MOVE_RIGHT, down(KEYS_RIGHT));
    actions.set(Actions::MOVE_UP, down(KEYS_UP));
    actions.set(Actions::MOVE_DOWN, down(KEYS_DOWN));
    actions.set(Actions::ATTACK, down(KEYS_ATTACK));
    // Pickup shares the attack key.
    actions.set(Actions::PICKUP, down(KEYS_ATTACK));
    actions.set(Actions::INTERACT, down(KEYS_INTERACT));
    actions.set(Actions::USE_HEALTH, down(KEYS_HEALTH));
    actions.set(Actions::USE_MANA, down(KEYS_MANA));
    actions
}
