use std::path::Path;
use std::time::Duration;

use crate::engine::{ObstacleSize, MAX_PLAYERS};
use crate::error::ConfigError;

/// Game rules and setup, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Grid height.
    pub rows: usize,
    /// Grid width.
    pub cols: usize,
    /// Obstacle block height. 0 disables the obstacle.
    pub obstacle_rows: usize,
    /// Obstacle block width. 0 disables the obstacle.
    pub obstacle_cols: usize,
    /// Discs in a line needed to score a point.
    pub connect_size: usize,
    /// Number of players taking turns.
    pub players: usize,
    /// Seconds a player has to enter a move before losing the turn.
    pub move_time_limit_secs: u64,
    /// Seed for obstacle placement. Random when unset.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            rows: 6,
            cols: 7,
            obstacle_rows: 2,
            obstacle_cols: 3,
            connect_size: 4,
            players: 2,
            move_time_limit_secs: 5,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: GameConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn obstacle_size(&self) -> ObstacleSize {
        ObstacleSize {
            rows: self.obstacle_rows,
            cols: self.obstacle_cols,
        }
    }

    pub fn move_time_limit(&self) -> Duration {
        Duration::from_secs(self.move_time_limit_secs)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::Validation(
                "rows and cols must be > 0".into(),
            ));
        }
        if self.obstacle_rows > self.rows || self.obstacle_cols > self.cols {
            return Err(ConfigError::Validation(format!(
                "obstacle {}x{} does not fit on a {}x{} grid",
                self.obstacle_rows, self.obstacle_cols, self.rows, self.cols
            )));
        }
        if self.connect_size == 0 {
            return Err(ConfigError::Validation(
                "connect_size must be > 0".into(),
            ));
        }
        if self.connect_size > self.rows.max(self.cols) {
            return Err(ConfigError::Validation(format!(
                "connect_size must be <= {} for a {}x{} grid",
                self.rows.max(self.cols),
                self.rows,
                self.cols
            )));
        }
        if self.players == 0 || self.players > MAX_PLAYERS {
            return Err(ConfigError::Validation(format!(
                "players must be in 1..={}",
                MAX_PLAYERS
            )));
        }
        if self.move_time_limit_secs == 0 {
            return Err(ConfigError::Validation(
                "move_time_limit_secs must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&GameConfig::default()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        config.validate().expect("default config should be valid");
        assert_eq!(config.obstacle_size(), ObstacleSize { rows: 2, cols: 3 });
        assert_eq!(config.move_time_limit(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: GameConfig = toml::from_str("connect_size = 3\nseed = 99\n").unwrap();
        assert_eq!(config.connect_size, 3);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.rows, 6);
        assert_eq!(config.players, 2);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: GameConfig = toml::from_str("").unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_validation_rejects_zero_dimensions() {
        let mut config = GameConfig::default();
        config.rows = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_oversized_obstacle() {
        let mut config = GameConfig::default();
        config.obstacle_cols = 8;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_allows_no_obstacle() {
        let mut config = GameConfig::default();
        config.obstacle_rows = 0;
        config.obstacle_cols = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_connect_size() {
        let mut config = GameConfig::default();
        config.connect_size = 0;
        assert!(config.validate().is_err());
        config.connect_size = 8;
        assert!(config.validate().is_err());
        config.connect_size = 7;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_player_count() {
        let mut config = GameConfig::default();
        config.players = 0;
        assert!(config.validate().is_err());
        config.players = MAX_PLAYERS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_time_limit() {
        let mut config = GameConfig::default();
        config.move_time_limit_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = GameConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "rows = 8\ncols = 9\nplayers = 3").unwrap();

        let config = GameConfig::load(&path).unwrap();
        assert_eq!((config.rows, config.cols, config.players), (8, 9, 3));
        assert_eq!(config.connect_size, 4);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.toml");
        std::fs::write(&path, "rows = 2\nobstacle_rows = 3\n").unwrap();
        assert!(matches!(
            GameConfig::load(&path),
            Err(ConfigError::Validation(_))
        ));

        std::fs::write(&path, "rows = \"six\"\n").unwrap();
        assert!(matches!(
            GameConfig::load(&path),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = GameConfig::default_toml();
        let config: GameConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, GameConfig::default());
    }
}
