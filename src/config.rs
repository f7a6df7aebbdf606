/// Game settings from `config.toml`.
///
/// The file is optional and so is every key in it. Zero-sized tiles are
/// replaced by the defaults with a warning; a zero tick interval is raised
/// to 1 ms.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ── Settings ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub display: DisplayConfig,
    pub gamepad: GamepadConfig,
    pub log_file: Option<PathBuf>,
    pub log_level: String,
}

/// Per-frame physics constants, in tiles and frames.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    pub gravity: f64,       // added to dy every frame (downward)
    pub jump_strength: f64, // dy set on jump; negative = up
    pub speed: f64,         // |dx| while walking
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayConfig {
    pub tick_rate_ms: u64,
    pub tile_cols: usize, // terminal columns per tile
    pub tile_rows: usize, // terminal rows per tile
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub build: Vec<String>,
    pub cycle: Vec<String>,
    pub quit: Vec<String>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            gravity: default_gravity(),
            jump_strength: default_jump_strength(),
            speed: default_speed(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            tick_rate_ms: default_tick_rate(),
            tile_cols: default_tile_cols(),
            tile_rows: default_tile_rows(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── File layout ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f64,
    #[serde(default = "default_jump_strength")]
    jump_strength: f64,
    #[serde(default = "default_speed")]
    speed: f64,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_tile_cols")]
    tile_cols: usize,
    #[serde(default = "default_tile_rows")]
    tile_rows: usize,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_jump")]
    jump: Vec<String>,
    #[serde(default = "default_pad_build")]
    build: Vec<String>,
    #[serde(default = "default_pad_cycle")]
    cycle: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    log_file: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

// ── Defaults ──

fn default_gravity() -> f64 { 0.2 }
fn default_jump_strength() -> f64 { -1.0 } // apex 2 tiles
fn default_speed() -> f64 { 0.1 }

fn default_tick_rate() -> u64 { 33 } // ~30 frames/s
fn default_tile_cols() -> usize { 2 }
fn default_tile_rows() -> usize { 1 }

fn default_pad_jump() -> Vec<String> { vec!["A".into()] }
fn default_pad_build() -> Vec<String> { vec!["X".into(), "B".into()] }
fn default_pad_cycle() -> Vec<String> { vec!["Y".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }
fn default_log_level() -> String { "warn".into() }

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            jump_strength: default_jump_strength(),
            speed: default_speed(),
        }
    }
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            tick_rate_ms: default_tick_rate(),
            tile_cols: default_tile_cols(),
            tile_rows: default_tile_rows(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_pad_jump(),
            build: default_pad_build(),
            cycle: default_pad_cycle(),
            quit: default_pad_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            log_file: String::new(),
            log_level: default_log_level(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Find and read `config.toml`, looking next to the executable first
    /// and then in the working directory. An unreadable or malformed file
    /// is reported and replaced by the defaults.
    ///
    /// Called before the logger exists, so problems are returned as
    /// warnings for the caller to log once logging is up.
    pub fn load() -> (Self, Vec<String>) {
        let Some(path) = find_config(&candidate_dirs()) else {
            return GameConfig::from_toml(TomlConfig::default());
        };
        match read_config(&path) {
            Ok(loaded) => loaded,
            Err(e) => {
                let (cfg, mut warnings) = GameConfig::from_toml(TomlConfig::default());
                warnings.insert(0, format!("{e}; using default settings"));
                (cfg, warnings)
            }
        }
    }

    /// Parse the text of a config document.
    pub fn parse(text: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let toml_cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_toml(toml_cfg))
    }

    fn from_toml(t: TomlConfig) -> (Self, Vec<String>) {
        let mut warnings = vec![];

        // A zero-sized tile would make the grid infinite.
        let tile_cols = if t.display.tile_cols == 0 {
            warnings.push("display.tile_cols must be ≥ 1; using default".to_string());
            default_tile_cols()
        } else {
            t.display.tile_cols
        };
        let tile_rows = if t.display.tile_rows == 0 {
            warnings.push("display.tile_rows must be ≥ 1; using default".to_string());
            default_tile_rows()
        } else {
            t.display.tile_rows
        };

        let log_file = if t.general.log_file.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(t.general.log_file.trim()))
        };

        let cfg = GameConfig {
            physics: PhysicsConfig {
                gravity: t.physics.gravity,
                jump_strength: t.physics.jump_strength,
                speed: t.physics.speed,
            },
            display: DisplayConfig {
                tick_rate_ms: t.display.tick_rate_ms.max(1),
                tile_cols,
                tile_rows,
            },
            gamepad: GamepadConfig {
                jump: t.gamepad.jump,
                build: t.gamepad.build,
                cycle: t.gamepad.cycle,
                quit: t.gamepad.quit,
            },
            log_file,
            log_level: t.general.log_level,
        };
        (cfg, warnings)
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

fn find_config(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs.iter()
        .map(|d| d.join("config.toml"))
        .find(|p| p.exists())
}

fn read_config(path: &Path) -> Result<(GameConfig, Vec<String>), ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    GameConfig::parse(&text)
}
