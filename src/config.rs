//! Runtime configuration from environment variables.

use std::env;

use crate::bridge::App;
use crate::core::{KickSet, Rules};
use crate::types::{BASE_GRAVITY_MS, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH};

/// Binary configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub width: i32,
    pub height: i32,
    /// Fixed seed; `None` seeds from the clock
    pub seed: Option<u32>,
    /// Log file; logging is off when unset
    pub log_path: Option<String>,
    pub base_gravity_ms: u32,
    pub kicks: KickSet,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            seed: None,
            log_path: None,
            base_gravity_ms: BASE_GRAVITY_MS,
            kicks: KickSet::Srs,
        }
    }
}

impl AppConfig {
    /// Read `TETRIS_*` variables. Missing or unparsable values keep defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parsed = |name: &str| lookup(name).and_then(|s| s.trim().parse::<i64>().ok());

        let width = parsed("TETRIS_WIDTH")
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(defaults.width);
        let height = parsed("TETRIS_HEIGHT")
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(defaults.height);
        let seed = parsed("TETRIS_SEED").and_then(|v| u32::try_from(v).ok());
        let base_gravity_ms = parsed("TETRIS_BASE_GRAVITY_MS")
            .and_then(|v| u32::try_from(v).ok())
            .filter(|&ms| ms > 0)
            .unwrap_or(defaults.base_gravity_ms);
        let kicks = lookup("TETRIS_KICKS")
            .and_then(|s| KickSet::from_str(&s))
            .unwrap_or(defaults.kicks);

        let log_path = lookup("TETRIS_LOG")
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(s) });

        Self {
            width,
            height,
            seed,
            log_path,
            base_gravity_ms,
            kicks,
        }
    }

    pub fn rules(&self) -> Rules {
        Rules {
            base_gravity_ms: self.base_gravity_ms,
            kicks: self.kicks,
            ..Rules::default()
        }
    }

    /// Component props for this configuration
    pub fn app(&self, fallback_seed: u32) -> App {
        App::new(self.width, self.height)
            .with_seed(self.seed.unwrap_or(fallback_seed))
            .with_rules(self.rules())
    }
}
