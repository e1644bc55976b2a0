use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::grid::Dimensions;

/// Board size and mine count for a new game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub height: usize,
    pub width: usize,
    pub mines: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            height: 8,
            width: 8,
            mines: 8,
        }
    }
}

impl GameConfig {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.height, self.width)
    }

    /// Checks that the board exists and leaves at least one safe cell.
    pub fn validate(&self) -> Result<Dimensions> {
        let GameConfig {
            height,
            width,
            mines,
        } = *self;

        if height == 0 || width == 0 {
            return Err(Error::EmptyBoard { height, width });
        }
        if mines >= height * width {
            return Err(Error::TooManyMines {
                height,
                width,
                mines,
            });
        }
        Ok(self.dimensions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let dimensions = GameConfig::default().validate().unwrap();
        assert_eq!(dimensions, Dimensions::new(8, 8));
    }

    #[test]
    fn test_too_many_mines() {
        let config = GameConfig {
            height: 3,
            width: 3,
            mines: 9,
        };
        assert!(matches!(
            config.validate(),
            Err(Error::TooManyMines { mines: 9, .. })
        ));
    }

    #[test]
    fn test_empty_board() {
        let config = GameConfig {
            height: 0,
            width: 4,
            mines: 0,
        };
        assert!(matches!(config.validate(), Err(Error::EmptyBoard { .. })));
    }
}
