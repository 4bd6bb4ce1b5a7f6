//! Full-screen STIC figures
//!
//! A figure is one screen: a 20×12 grid of background tiles, a 4-entry color
//! stack, the border settings and the eight moving objects (sprites). Tiles
//! and sprites only reference cards by index; bitmaps are pulled through a
//! [`CardLookup`](crate::lookup::CardLookup) when the figure is rendered.

pub mod render;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::FigureRecord;
use crate::palette::{is_color, CARD_INDEX_END, DEFAULT_CARD_COLOR, GRAM_BASE};

pub use render::{render, Raster};

/// Tiles per row.
pub const COLUMNS: usize = 20;
/// Tile rows.
pub const ROWS: usize = 12;
/// Total tiles in the background grid.
pub const TILE_COUNT: usize = COLUMNS * ROWS;
/// Number of sprite objects.
pub const SPRITE_COUNT: usize = 8;
/// Entries in the color stack.
pub const STACK_SIZE: usize = 4;
/// Black, blue, red, tan.
pub const DEFAULT_COLOR_STACK: [u8; STACK_SIZE] = [0, 1, 2, 3];

/// Error type for tile and sprite access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FigureError {
    #[error("tile position out of range: ({row}, {col})")]
    TileOutOfRange { row: usize, col: usize },
    #[error("sprite index must be 0-7, got {0}")]
    SpriteOutOfRange(usize),
    #[error("color must be 0-15, got {0}")]
    InvalidColor(u8),
    #[error("card index {0} not allowed here")]
    InvalidCard(u16),
}

/// How tile background colors are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Backgrounds come from the color stack, advanced per tile on demand.
    #[default]
    #[serde(rename = "color_stack")]
    ColorStack,
    /// Every tile carries its own background color.
    #[serde(rename = "fg_bg")]
    ForegroundBackground,
}

fn default_fg() -> u8 {
    DEFAULT_CARD_COLOR
}

fn default_true() -> bool {
    true
}

/// One background tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    #[serde(default, alias = "card")]
    pub card_index: u16,
    #[serde(default = "default_fg")]
    pub fg_color: u8,
    /// Only used in [`DisplayMode::ForegroundBackground`].
    #[serde(default)]
    pub bg_color: u8,
    /// Only used in [`DisplayMode::ColorStack`].
    #[serde(default)]
    pub advance_stack: bool,
}

impl Default for Tile {
    fn default() -> Self {
        Self { card_index: 0, fg_color: DEFAULT_CARD_COLOR, bg_color: 0, advance_stack: false }
    }
}

impl Tile {
    pub fn new(card_index: u16, fg_color: u8) -> Self {
        Self { card_index, fg_color, ..Self::default() }
    }

    pub fn with_bg(mut self, bg_color: u8) -> Self {
        self.bg_color = bg_color;
        self
    }

    pub fn with_advance(mut self, advance_stack: bool) -> Self {
        self.advance_stack = advance_stack;
        self
    }

    fn validate(&self) -> Result<(), FigureError> {
        if self.card_index >= CARD_INDEX_END {
            return Err(FigureError::InvalidCard(self.card_index));
        }
        check_color(self.fg_color)?;
        check_color(self.bg_color)
    }

    fn masked(mut self) -> Self {
        self.fg_color &= 0x0F;
        self.bg_color &= 0x0F;
        self
    }
}

/// Border settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Border {
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub color: u8,
    /// Include the 8-pixel left margin strip when the border is visible.
    #[serde(default = "default_true")]
    pub show_left: bool,
    /// Include the 8-pixel top margin strip when the border is visible.
    #[serde(default = "default_true")]
    pub show_top: bool,
}

impl Default for Border {
    fn default() -> Self {
        Self { visible: true, color: 0, show_left: true, show_top: true }
    }
}

/// Whether a sprite draws behind or in front of tile foregrounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Behind,
    #[default]
    InFront,
}

/// Sprite magnification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpriteSize {
    #[default]
    #[serde(rename = "8x8")]
    Size8x8,
    #[serde(rename = "8x16")]
    Size8x16,
    #[serde(rename = "16x8")]
    Size16x8,
    #[serde(rename = "16x16")]
    Size16x16,
}

impl SpriteSize {
    /// Horizontal and vertical scale factors applied to the 8×8 source card.
    pub fn scale(self) -> (usize, usize) {
        match self {
            SpriteSize::Size8x8 => (1, 1),
            SpriteSize::Size8x16 => (1, 2),
            SpriteSize::Size16x8 => (2, 1),
            SpriteSize::Size16x16 => (2, 2),
        }
    }

    /// Drawn width and height in pixels.
    pub fn dimensions(self) -> (usize, usize) {
        let (sx, sy) = self.scale();
        (8 * sx, 8 * sy)
    }
}

fn default_sprite_card() -> u16 {
    GRAM_BASE
}

/// A moving object drawn from a GRAM card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprite {
    #[serde(default)]
    pub visible: bool,
    #[serde(default = "default_sprite_card")]
    pub card_index: u16,
    /// Position of the top-left pixel in playfield coordinates; may be off-screen.
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default = "default_fg")]
    pub color: u8,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub size: SpriteSize,
    #[serde(default)]
    pub flip_h: bool,
    #[serde(default)]
    pub flip_v: bool,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            visible: false,
            card_index: GRAM_BASE,
            x: 0,
            y: 0,
            color: DEFAULT_CARD_COLOR,
            priority: Priority::InFront,
            size: SpriteSize::Size8x8,
            flip_h: false,
            flip_v: false,
        }
    }
}

impl Sprite {
    /// A visible 8×8 sprite at `(x, y)`.
    pub fn new(card_index: u16, x: i32, y: i32) -> Self {
        Self { visible: true, card_index, x, y, ..Self::default() }
    }

    pub fn with_color(mut self, color: u8) -> Self {
        self.color = color;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_size(mut self, size: SpriteSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_flip(mut self, flip_h: bool, flip_v: bool) -> Self {
        self.flip_h = flip_h;
        self.flip_v = flip_v;
        self
    }

    /// Sprites can only show GRAM cards.
    pub fn has_valid_card(&self) -> bool {
        (GRAM_BASE..CARD_INDEX_END).contains(&self.card_index)
    }

    fn validate(&self) -> Result<(), FigureError> {
        if !self.has_valid_card() {
            return Err(FigureError::InvalidCard(self.card_index));
        }
        check_color(self.color)
    }
}

fn check_color(color: u8) -> Result<(), FigureError> {
    if !is_color(color) {
        return Err(FigureError::InvalidColor(color));
    }
    Ok(())
}

/// A complete screen layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FigureRecord", into = "FigureRecord")]
pub struct DisplayFigure {
    pub name: String,
    pub mode: DisplayMode,
    border: Border,
    color_stack: [u8; STACK_SIZE],
    tiles: Vec<Tile>,
    sprites: [Sprite; SPRITE_COUNT],
}

impl DisplayFigure {
    /// A blank color-stack figure: every tile shows card 0 in white.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: DisplayMode::ColorStack,
            border: Border::default(),
            color_stack: DEFAULT_COLOR_STACK,
            tiles: vec![Tile::default(); TILE_COUNT],
            sprites: [Sprite::default(); SPRITE_COUNT],
        }
    }

    pub fn with_mode(mut self, mode: DisplayMode) -> Self {
        self.mode = mode;
        self
    }

    fn tile_index(row: usize, col: usize) -> Result<usize, FigureError> {
        if row >= ROWS || col >= COLUMNS {
            return Err(FigureError::TileOutOfRange { row, col });
        }
        Ok(row * COLUMNS + col)
    }

    pub fn get_tile(&self, row: usize, col: usize) -> Result<&Tile, FigureError> {
        Ok(&self.tiles[Self::tile_index(row, col)?])
    }

    /// Replace a tile. The card must be 0-319 and both colors 0-15.
    pub fn set_tile(&mut self, row: usize, col: usize, tile: Tile) -> Result<(), FigureError> {
        let index = Self::tile_index(row, col)?;
        tile.validate()?;
        self.tiles[index] = tile;
        Ok(())
    }

    /// All 240 tiles in row-major order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Set every tile to `tile`.
    pub fn fill(&mut self, tile: Tile) -> Result<(), FigureError> {
        tile.validate()?;
        self.tiles.fill(tile);
        Ok(())
    }

    pub fn color_stack(&self) -> [u8; STACK_SIZE] {
        self.color_stack
    }

    pub fn set_color_stack(&mut self, stack: [u8; STACK_SIZE]) -> Result<(), FigureError> {
        for &color in &stack {
            check_color(color)?;
        }
        self.color_stack = stack;
        Ok(())
    }

    pub fn border(&self) -> Border {
        self.border
    }

    pub fn set_border(&mut self, border: Border) -> Result<(), FigureError> {
        check_color(border.color)?;
        self.border = border;
        Ok(())
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn sprite(&self, index: usize) -> Result<&Sprite, FigureError> {
        self.sprites.get(index).ok_or(FigureError::SpriteOutOfRange(index))
    }

    /// Mutable access for per-frame moves. Fields are not validated; the
    /// renderer skips sprites whose card is outside 256-319.
    pub fn sprite_mut(&mut self, index: usize) -> Result<&mut Sprite, FigureError> {
        self.sprites.get_mut(index).ok_or(FigureError::SpriteOutOfRange(index))
    }

    /// Replace a sprite. The card must be a GRAM card (256-319).
    pub fn set_sprite(&mut self, index: usize, sprite: Sprite) -> Result<(), FigureError> {
        let slot = self.sprites.get_mut(index).ok_or(FigureError::SpriteOutOfRange(index))?;
        sprite.validate()?;
        *slot = sprite;
        Ok(())
    }

    /// Background color of every tile, in row-major order.
    ///
    /// In color-stack mode the stack position starts at 0 and moves on after
    /// each tile whose `advance_stack` flag is set, so the flag affects the
    /// tiles that follow it.
    pub fn tile_backgrounds(&self) -> Vec<u8> {
        match self.mode {
            DisplayMode::ForegroundBackground => self.tiles.iter().map(|t| t.bg_color).collect(),
            DisplayMode::ColorStack => {
                let mut position = 0usize;
                self.tiles
                    .iter()
                    .map(|tile| {
                        let color = self.color_stack[position % STACK_SIZE];
                        if tile.advance_stack {
                            position += 1;
                        }
                        color
                    })
                    .collect()
            }
        }
    }

    pub(crate) fn from_parts(
        name: String,
        mode: DisplayMode,
        border: Border,
        color_stack: &[u8],
        tiles: Vec<Tile>,
        sprites: Vec<Sprite>,
    ) -> Self {
        let mut figure = Self::new(name).with_mode(mode);
        figure.border = Border { color: border.color & 0x0F, ..border };
        for (slot, &color) in figure.color_stack.iter_mut().zip(color_stack) {
            *slot = color & 0x0F;
        }
        for (slot, tile) in figure.tiles.iter_mut().zip(tiles) {
            *slot = tile.masked();
        }
        for (slot, sprite) in figure.sprites.iter_mut().zip(sprites) {
            *slot = Sprite { color: sprite.color & 0x0F, ..sprite };
        }
        figure
    }
}
