/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing, incomplete or
/// malformed; the caller logs the returned problem once logging is up.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::enemy::EnemyStats;
use crate::domain::player::{PlayerCooldowns, PlayerStats};
use crate::error::ConfigError;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub projectile: ProjectileConfig,
    pub level: LevelConfig,
    pub gamepad: GamepadConfig,
    pub log_dir: PathBuf,
}

/// All intervals in milliseconds.
#[derive(Clone, Debug, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
    #[serde(default = "default_move_ms")]
    pub move_ms: u64,
    #[serde(default = "default_attack_ms")]
    pub attack_ms: u64,
    #[serde(default = "default_item_ms")]
    pub item_ms: u64,
    #[serde(default = "default_fire_ms")]
    pub fire_ms: u64,
    #[serde(default = "default_chest_ms")]
    pub chest_ms: u64,
    #[serde(default = "default_chest_frame_ms")]
    pub chest_frame_ms: u64,
    #[serde(default = "default_chest_frames")]
    pub chest_frames: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_health")]
    pub health: i32,
    #[serde(default = "default_player_health")]
    pub max_health: i32,
    #[serde(default = "default_player_mana")]
    pub mana: i32,
    #[serde(default = "default_player_max_mana")]
    pub max_mana: i32,
    #[serde(default = "default_melee_damage")]
    pub melee_damage: i32,
    #[serde(default = "default_heal_amount")]
    pub heal_amount: i32,
    #[serde(default = "default_mana_amount")]
    pub mana_amount: i32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EnemyConfig {
    #[serde(default = "default_enemy_tag")]
    pub tag: String,
    #[serde(default = "default_enemy_health")]
    pub health: i32,
    #[serde(default = "default_enemy_damage")]
    pub damage: i32,
    #[serde(default = "default_contact_ms")]
    pub contact_ms: u64,
    #[serde(default = "default_enemy_move_ms")]
    pub move_ms: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProjectileConfig {
    #[serde(default = "default_projectile_step_ms")]
    pub step_ms: u64,
    #[serde(default = "default_projectile_damage")]
    pub damage: i32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LevelConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_wall_fill")]
    pub wall_fill: f64,
    #[serde(default = "default_enemies")]
    pub enemies: usize,
    #[serde(default = "default_chests")]
    pub chests: usize,
    #[serde(default = "default_patrol_span")]
    pub patrol_span: i32,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Hand-drawn map rows (`#` wall, `.` floor). Replaces generation;
    /// `width`, `height` and `wall_fill` are then ignored.
    #[serde(default)]
    pub map: Option<Vec<String>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GamepadConfig {
    #[serde(default = "default_pad_attack")]
    pub attack: Vec<String>,
    #[serde(default = "default_pad_pickup")]
    pub pickup: Vec<String>,
    #[serde(default = "default_pad_interact")]
    pub interact: Vec<String>,
    #[serde(default = "default_pad_use_health")]
    pub use_health: Vec<String>,
    #[serde(default = "default_pad_use_mana")]
    pub use_mana: Vec<String>,
    #[serde(default = "default_pad_fire")]
    pub fire: Vec<String>,
    #[serde(default = "default_pad_pause")]
    pub pause: Vec<String>,
    #[serde(default = "default_pad_restart")]
    pub restart: Vec<String>,
}

// ── TOML Schema ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TimingConfig,
    #[serde(default)]
    player: PlayerConfig,
    #[serde(default)]
    enemy: EnemyConfig,
    #[serde(default)]
    projectile: ProjectileConfig,
    #[serde(default)]
    level: LevelConfig,
    #[serde(default)]
    gamepad: GamepadConfig,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    log_dir: Option<String>,
}

// ── Defaults ──

fn default_frame_ms() -> u64 { 16 }
fn default_move_ms() -> u64 { 120 }
fn default_attack_ms() -> u64 { 220 }
fn default_item_ms() -> u64 { 180 }
fn default_fire_ms() -> u64 { 180 }
fn default_chest_ms() -> u64 { 300 }
fn default_chest_frame_ms() -> u64 { 120 }
fn default_chest_frames() -> usize { 3 }

fn default_player_health() -> i32 { 150 }
fn default_player_mana() -> i32 { 25 }
fn default_player_max_mana() -> i32 { 75 }
fn default_melee_damage() -> i32 { 50 }
fn default_heal_amount() -> i32 { 50 }
fn default_mana_amount() -> i32 { 25 }

fn default_enemy_tag() -> String { "golem.basic".into() }
fn default_enemy_health() -> i32 { 50 }
fn default_enemy_damage() -> i32 { 50 }
fn default_contact_ms() -> u64 { 500 }
fn default_enemy_move_ms() -> u64 { 420 }

fn default_projectile_step_ms() -> u64 { 140 }
fn default_projectile_damage() -> i32 { 50 }

fn default_width() -> usize { 20 }
fn default_height() -> usize { 15 }
fn default_wall_fill() -> f64 { 0.18 }
fn default_enemies() -> usize { 6 }
fn default_chests() -> usize { 2 }
fn default_patrol_span() -> i32 { 4 }

fn default_pad_attack() -> Vec<String> { vec!["X".into()] }
fn default_pad_pickup() -> Vec<String> { vec!["A".into()] }
fn default_pad_interact() -> Vec<String> { vec!["B".into()] }
fn default_pad_use_health() -> Vec<String> { vec!["L1".into()] }
fn default_pad_use_mana() -> Vec<String> { vec!["R1".into()] }
fn default_pad_fire() -> Vec<String> { vec!["Y".into(), "R2".into()] }
fn default_pad_pause() -> Vec<String> { vec!["Start".into()] }
fn default_pad_restart() -> Vec<String> { vec!["Select".into()] }

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            frame_ms: default_frame_ms(),
            move_ms: default_move_ms(),
            attack_ms: default_attack_ms(),
            item_ms: default_item_ms(),
            fire_ms: default_fire_ms(),
            chest_ms: default_chest_ms(),
            chest_frame_ms: default_chest_frame_ms(),
            chest_frames: default_chest_frames(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            health: default_player_health(),
            max_health: default_player_health(),
            mana: default_player_mana(),
            max_mana: default_player_max_mana(),
            melee_damage: default_melee_damage(),
            heal_amount: default_heal_amount(),
            mana_amount: default_mana_amount(),
        }
    }
}

impl Default for EnemyConfig {
    fn default() -> Self {
        EnemyConfig {
            tag: default_enemy_tag(),
            health: default_enemy_health(),
            damage: default_enemy_damage(),
            contact_ms: default_contact_ms(),
            move_ms: default_enemy_move_ms(),
        }
    }
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        ProjectileConfig {
            step_ms: default_projectile_step_ms(),
            damage: default_projectile_damage(),
        }
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        LevelConfig {
            width: default_width(),
            height: default_height(),
            wall_fill: default_wall_fill(),
            enemies: default_enemies(),
            chests: default_chests(),
            patrol_span: default_patrol_span(),
            seed: None,
            map: None,
        }
    }
}

impl Default for GamepadConfig {
    fn default() -> Self {
        GamepadConfig {
            attack: default_pad_attack(),
            pickup: default_pad_pickup(),
            interact: default_pad_interact(),
            use_health: default_pad_use_health(),
            use_mana: default_pad_use_mana(),
            fire: default_pad_fire(),
            pause: default_pad_pause(),
            restart: default_pad_restart(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── Domain views ──

impl PlayerConfig {
    pub fn stats(&self) -> PlayerStats {
        PlayerStats {
            health: self.health,
            max_health: self.max_health,
            mana: self.mana,
            max_mana: self.max_mana,
            melee_damage: self.melee_damage,
            heal_amount: self.heal_amount,
            mana_amount: self.mana_amount,
        }
    }
}

impl TimingConfig {
    pub fn player_cooldowns(&self) -> PlayerCooldowns {
        PlayerCooldowns {
            move_ms: self.move_ms,
            attack_ms: self.attack_ms,
            item_ms: self.item_ms,
            fire_ms: self.fire_ms,
        }
    }
}

impl EnemyConfig {
    pub fn stats(&self) -> EnemyStats {
        EnemyStats {
            health: self.health,
            damage: self.damage,
            contact_ms: self.contact_ms,
            move_ms: self.move_ms,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing keys fall back to defaults; an unreadable or malformed file
    /// falls back entirely and the error is handed back for logging.
    pub fn load() -> (Self, Option<ConfigError>) {
        let search_dirs = candidate_dirs();
        match load_toml(&search_dirs) {
            Ok(cfg) => (GameConfig::from_toml(cfg.unwrap_or_default()), None),
            Err(e) => (GameConfig::from_toml(TomlConfig::default()), Some(e)),
        }
    }

    /// Parse a config document directly.
    #[cfg(test)]
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(GameConfig::from_toml)
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        let log_dir = cfg.general.log_dir
            .map(PathBuf::from)
            .unwrap_or_else(default_log_dir);

        let mut config = GameConfig {
            timing: cfg.timing,
            player: cfg.player,
            enemy: cfg.enemy,
            projectile: cfg.projectile,
            level: cfg.level,
            gamepad: cfg.gamepad,
            log_dir,
        };
        config.sanitize();
        config
    }

    /// Clamp values that would make a level impossible to build.
    fn sanitize(&mut self) {
        let level = &mut self.level;
        level.width = level.width.max(3);
        level.height = level.height.max(3);
        if !level.wall_fill.is_finite() {
            level.wall_fill = default_wall_fill();
        }
        level.wall_fill = level.wall_fill.clamp(0.0, 1.0);
        level.patrol_span = level.patrol_span.max(0);

        let player = &mut self.player;
        player.max_health = player.max_health.max(1);
        player.health = player.health.clamp(1, player.max_health);
        player.max_mana = player.max_mana.max(0);
        player.mana = player.mana.clamp(0, player.max_mana);
        player.melee_damage = player.melee_damage.max(0);
        player.heal_amount = player.heal_amount.max(0);
        player.mana_amount = player.mana_amount.max(0);
        self.enemy.damage = self.enemy.damage.max(0);
        self.enemy.health = self.enemy.health.max(1);
        self.projectile.damage = self.projectile.damage.max(0);

        self.timing.chest_frames = self.timing.chest_frames.max(1);
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// First `config.toml` found wins. `Ok(None)` when there is none.
fn load_toml(search_dirs: &[PathBuf]) -> Result<Option<TomlConfig>, ConfigError> {
    let Some(path) = search_dirs.iter().map(|d| d.join("config.toml")).find(|p| p.exists()) else {
        return Ok(None);
    };
    parse_file(&path).map(Some)
}

fn parse_file(path: &Path) -> Result<TomlConfig, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    toml::from_str::<TomlConfig>(&text)
        .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

/// Platform log directory (`$XDG_CACHE_HOME/witchcrawl/logs` or
/// `~/.cache/witchcrawl/logs`), else `./logs`.
fn default_log_dir() -> PathBuf {
    if let Some(xdg_cache) = std::env::var_os("XDG_CACHE_HOME") {
        return PathBuf::from(xdg_cache).join("witchcrawl").join("logs");
    }
    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home).join(".cache").join("witchcrawl").join("logs");
    }
    PathBuf::from("logs")
}
