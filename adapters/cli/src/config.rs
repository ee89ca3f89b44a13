//! Optional `keyplay.toml` settings that command-line flags override.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use keyplay_core::GameKind;
use keyplay_system_playback::DEFAULT_DELAY;
use keyplay_system_rand::DEFAULT_SEED;
use serde::Deserialize;

/// File consulted in the working directory when no `--config` is given.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "keyplay.toml";

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub(crate) playback: PlaybackConfig,
    pub(crate) game: GameConfig,
    pub(crate) render: RenderConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PlaybackConfig {
    /// Milliseconds between replayed keys.
    pub(crate) delay_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY.as_millis() as u64,
        }
    }
}

impl PlaybackConfig {
    pub(crate) const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) kind: GameKind,
    pub(crate) seed: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            kind: GameKind::Snake,
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RenderConfig {
    /// Emit ANSI truecolor escapes around glyphs.
    pub(crate) color: bool,
    /// Print a frame after every replayed key instead of only the last one.
    pub(crate) frames: bool,
}

impl Config {
    /// Loads `explicit` if given, otherwise `keyplay.toml` when present,
    /// otherwise the defaults.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    bail!("config file {} does not exist", path.display());
                }
                path.to_path_buf()
            }
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to load config file {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse keyplay toml contents")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::parse("").expect("empty config parses");
        assert_eq!(config, Config::default());
        assert_eq!(config.playback.delay(), Duration::from_millis(100));
        assert_eq!(config.game.kind, GameKind::Snake);
        assert_eq!(config.game.seed, 1);
        assert!(!config.render.color);
    }

    #[test]
    fn sections_override_defaults_independently() {
        let config = Config::parse(
            r#"
            [playback]
            delay_ms = 25

            [game]
            kind = "creatures"

            [render]
            frames = true
            "#,
        )
        .expect("config parses");

        assert_eq!(config.playback.delay_ms, 25);
        assert_eq!(config.game.kind, GameKind::Creatures);
        assert_eq!(config.game.seed, 1);
        assert!(config.render.frames);
        assert!(!config.render.color);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = Config::parse("[game]\nspeed = 3\n").expect_err("unknown key");
        assert!(format!("{error:#}").contains("speed"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let error = Config::load(Some(Path::new("/nonexistent/keyplay.toml")))
            .expect_err("missing file");
        assert!(error.to_string().contains("does not exist"));
    }
}
