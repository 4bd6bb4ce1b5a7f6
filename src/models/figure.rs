//! Serialized figure shape.
//!
//! Older files name the tile grid `backtab`; short or long tile and sprite
//! lists are padded with defaults or truncated when converted.

use serde::{Deserialize, Serialize};

use crate::figure::{Border, DisplayFigure, DisplayMode, Sprite, Tile, DEFAULT_COLOR_STACK};

fn default_stack() -> Vec<u8> {
    DEFAULT_COLOR_STACK.to_vec()
}

/// A figure as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureRecord {
    pub name: String,
    #[serde(default)]
    pub mode: DisplayMode,
    #[serde(default)]
    pub border: Border,
    #[serde(default = "default_stack")]
    pub color_stack: Vec<u8>,
    #[serde(default, alias = "backtab")]
    pub tiles: Vec<Tile>,
    #[serde(default)]
    pub sprites: Vec<Sprite>,
}

impl From<FigureRecord> for DisplayFigure {
    fn from(record: FigureRecord) -> Self {
        DisplayFigure::from_parts(
            record.name,
            record.mode,
            record.border,
            &record.color_stack,
            record.tiles,
            record.sprites,
        )
    }
}

impl From<DisplayFigure> for FigureRecord {
    fn from(figure: DisplayFigure) -> Self {
        FigureRecord {
            mode: figure.mode,
            border: figure.border(),
            color_stack: figure.color_stack().to_vec(),
            tiles: figure.tiles().to_vec(),
            sprites: figure.sprites().to_vec(),
            name: figure.name,
        }
    }
}
