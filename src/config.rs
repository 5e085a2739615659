use crate::grid::{Grid, Terrain};
use anyhow::{anyhow, ensure, Result};
use serde::{Deserialize, Serialize};

/// Startup settings, read from `config.json` next to the page.
/// Every field is optional in the json.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// one letter per row, top to bottom : W water, S stone path, G grass
    pub pattern: String,
    pub columns: usize,
    pub hazards: usize,
    /// grid cells per second
    pub player_speed: f32,
    /// stroke every hitbox
    pub debug_bounds: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            pattern: "WSSSGG".to_string(),
            columns: 5,
            hazards: 3,
            player_speed: 3.0,
            debug_bounds: false,
        }
    }
}

impl GameConfig {
    pub const PATH: &'static str = "config.json";

    /// Parse and validate the terrain pattern. A grid without water, path or
    /// grass rows cannot be played, so it is rejected here instead of
    /// panicking mid game.
    pub fn grid(&self) -> Result<Grid> {
        ensure!(self.columns > 0, "grid needs at least one column");
        ensure!(self.player_speed > 0.0, "player speed must be positive");
        let terrain = self
            .pattern
            .chars()
            .filter(|letter| !letter.is_whitespace())
            .map(|letter| {
                Terrain::from_letter(letter)
                    .ok_or_else(|| anyhow!("unknown terrain letter '{}' in '{}'", letter, self.pattern))
            })
            .collect::<Result<Vec<_>>>()?;
        for required in [Terrain::Water, Terrain::Path, Terrain::Ground] {
            ensure!(
                terrain.contains(&required),
                "pattern '{}' has no {:?} row",
                self.pattern,
                required
            );
        }
        Ok(Grid::new(terrain, self.columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pattern_builds_the_classic_board() {
        let grid = GameConfig::default().grid().unwrap();
        assert_eq!(grid.rows(), 6);
        assert_eq!(grid.columns(), 5);
        assert_eq!(grid.pattern(), "WSSSGG");
    }

    #[test]
    fn lowercase_and_spaces_are_accepted() {
        let config = GameConfig {
            pattern: "w s s g".to_string(),
            ..GameConfig::default()
        };
        assert_eq!(config.grid().unwrap().pattern(), "WSSG");
    }

    #[test]
    fn unknown_letter_is_rejected() {
        let config = GameConfig {
            pattern: "WSXG".to_string(),
            ..GameConfig::default()
        };
        let err = config.grid().unwrap_err();
        assert!(err.to_string().contains("unknown terrain letter 'X'"));
    }

    #[test]
    fn missing_terrain_kind_is_rejected() {
        let config = GameConfig {
            pattern: "SSSGG".to_string(),
            ..GameConfig::default()
        };
        assert!(config.grid().unwrap_err().to_string().contains("Water"));
    }

    #[test]
    fn zero_columns_is_rejected() {
        let config = GameConfig {
            columns: 0,
            ..GameConfig::default()
        };
        assert!(config.grid().is_err());
    }
}
