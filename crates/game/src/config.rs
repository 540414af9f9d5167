//! Game configuration (motion tuning, session, track). Loaded from config.ron at startup.

use convoy::ConvoyConfig;
use input::BindingScheme;
use procgen::TrackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for a run. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Motion engine tuning.
    #[serde(default)]
    pub convoy: ConvoyConfig,
    /// Session length, pacing and players.
    #[serde(default)]
    pub session: SessionConfig,
    /// Where the friction grid comes from.
    #[serde(default)]
    pub track: TrackSource,
}

/// How long to run and who is driving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seed for free-vehicle spawn placement.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Simulated seconds before the run ends.
    #[serde(default = "default_duration")]
    pub duration_secs: f32,
    /// Fixed simulation rate in Hz.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f32,
    /// One entry per player, in processing order.
    #[serde(default = "default_players")]
    pub players: Vec<PlayerConfig>,
}

/// One player's controls and colours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub scheme: BindingScheme,
    pub livery: u32,
}

/// Track to drive on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackSource {
    /// Procedurally generated from a seed.
    Generated(TrackConfig),
    /// Authored ASCII map on disk.
    Ascii { path: PathBuf, cell_size: f32 },
}

impl Default for TrackSource {
    fn default() -> Self {
        TrackSource::Generated(TrackConfig::default())
    }
}

fn default_seed() -> u64 {
    1
}
fn default_duration() -> f32 {
    60.0
}
fn default_frame_rate() -> f32 {
    60.0
}
fn default_players() -> Vec<PlayerConfig> {
    (0..2)
        .map(|i| PlayerConfig {
            scheme: BindingScheme::for_player(i),
            livery: i as u32 + 1,
        })
        .collect()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            duration_secs: default_duration(),
            frame_rate: default_frame_rate(),
            players: default_players(),
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Load from an explicit path with the same fallbacks as [`GameConfig::load`].
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            },
            Err(_) => log::info!("No config at {:?}, using defaults", path),
        }
        Self::default()
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        self.save_to(&config_path());
    }

    pub fn save_to(&self, path: &Path) {
        if let Ok(s) = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            if let Err(e) = std::fs::write(path, s) {
                log::warn!("Could not write config to {:?}: {}", path, e);
            }
        }
    }
}

pub fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_in_defaults() {
        let text = r#"(
            session: (duration_secs: 5.0),
            convoy: (follower_gap: 20.0),
        )"#;
        let config: GameConfig = ron::from_str(text).unwrap();
        assert_eq!(config.session.duration_secs, 5.0);
        assert_eq!(config.session.players.len(), 2);
        assert_eq!(config.convoy.follower_gap, 20.0);
        assert_eq!(config.convoy.history_capacity, 2000);
        assert_eq!(config.track, TrackSource::default());
    }

    #[test]
    fn ascii_track_source_parses() {
        let text = r#"(track: Ascii(path: "maps/oval.txt", cell_size: 8.0))"#;
        let config: GameConfig = ron::from_str(text).unwrap();
        assert_eq!(
            config.track,
            TrackSource::Ascii {
                path: PathBuf::from("maps/oval.txt"),
                cell_size: 8.0
            }
        );
    }

    #[test]
    fn missing_or_broken_file_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join(format!("convoy-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let missing = GameConfig::load_from(&dir.join("absent.ron"));
        assert_eq!(missing, GameConfig::default());

        let broken = dir.join("broken.ron");
        std::fs::write(&broken, "(session: [oops").unwrap();
        assert_eq!(GameConfig::load_from(&broken), GameConfig::default());

        let saved = dir.join("saved.ron");
        let mut config = GameConfig::default();
        config.session.seed = 99;
        config.save_to(&saved);
        assert_eq!(GameConfig::load_from(&saved).session.seed, 99);

        std::fs::remove_dir_all(&dir).ok();
    }
}
