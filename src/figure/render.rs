//! Figure rasterization to palette indices
//!
//! Rendering is four passes over the playfield: tile backgrounds, behind
//! sprites, tile foregrounds, front sprites. Only set card bits paint, so a
//! behind sprite shows through tile background pixels but not through the
//! tile's card.

use crate::card::{BitCard, CARD_SIZE};
use crate::figure::{DisplayFigure, Priority, Sprite, COLUMNS, ROWS};
use crate::lookup::CardLookup;

/// Playfield width in pixels.
pub const PLAYFIELD_WIDTH: usize = COLUMNS * CARD_SIZE;
/// Playfield height in pixels.
pub const PLAYFIELD_HEIGHT: usize = ROWS * CARD_SIZE;
/// Width of each border strip.
pub const BORDER_SIZE: usize = 8;

/// A grid of palette indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: usize,
    height: usize,
    origin: (usize, usize),
    pixels: Vec<u8>,
}

impl Raster {
    fn new(width: usize, height: usize, origin: (usize, usize), fill: u8) -> Self {
        Self { width, height, origin, pixels: vec![fill; width * height] }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raster position of playfield pixel (0, 0).
    pub fn origin(&self) -> (usize, usize) {
        self.origin
    }

    /// Row-major palette indices.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Color at a raster position.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Color at a playfield position.
    pub fn playfield(&self, x: usize, y: usize) -> Option<u8> {
        if x >= PLAYFIELD_WIDTH || y >= PLAYFIELD_HEIGHT {
            return None;
        }
        self.get(self.origin.0 + x, self.origin.1 + y)
    }

    fn paint(&mut self, x: usize, y: usize, color: u8) {
        let index = (self.origin.1 + y) * self.width + self.origin.0 + x;
        self.pixels[index] = color;
    }

    fn draw_card(&mut self, card: &BitCard, x: usize, y: usize, color: u8) {
        for cy in 0..CARD_SIZE {
            for cx in 0..CARD_SIZE {
                if card.bit(cx, cy) {
                    self.paint(x + cx, y + cy, color);
                }
            }
        }
    }

    fn draw_sprite(&mut self, sprite: &Sprite, card: &BitCard) {
        let (sx, sy) = sprite.size.scale();
        let (width, height) = sprite.size.dimensions();
        for dy in 0..height {
            let py = sprite.y as i64 + dy as i64;
            if py < 0 || py >= PLAYFIELD_HEIGHT as i64 {
                continue;
            }
            let mut src_y = dy / sy;
            if sprite.flip_v {
                src_y = CARD_SIZE - 1 - src_y;
            }
            for dx in 0..width {
                let px = sprite.x as i64 + dx as i64;
                if px < 0 || px >= PLAYFIELD_WIDTH as i64 {
                    continue;
                }
                let mut src_x = dx / sx;
                if sprite.flip_h {
                    src_x = CARD_SIZE - 1 - src_x;
                }
                if card.bit(src_x, src_y) {
                    self.paint(px as usize, py as usize, sprite.color);
                }
            }
        }
    }
}

fn sprite_pass<L>(raster: &mut Raster, figure: &DisplayFigure, cards: &L, priority: Priority)
where
    L: CardLookup + ?Sized,
{
    // Sprite 0 has the highest priority, so it is drawn last.
    for sprite in figure.sprites().iter().rev() {
        if !sprite.visible || sprite.priority != priority || !sprite.has_valid_card() {
            continue;
        }
        raster.draw_sprite(sprite, &cards.get_card(sprite.card_index));
    }
}

/// Render a figure to palette indices.
///
/// With a visible border the playfield is framed by 8-pixel strips of the
/// border color; the left and top strips are left out when `show_left` /
/// `show_top` are off.
///
/// # Examples
///
/// ```
/// use sticsmith::catalog::CardCatalog;
/// use sticsmith::figure::{render, DisplayFigure};
///
/// let figure = DisplayFigure::new("blank");
/// let raster = render(&figure, &CardCatalog::new());
/// assert_eq!((raster.width(), raster.height()), (176, 112));
/// assert_eq!(raster.origin(), (8, 8));
/// ```
pub fn render<L>(figure: &DisplayFigure, cards: &L) -> Raster
where
    L: CardLookup + ?Sized,
{
    let border = figure.border();
    let (left, top, right, bottom) = if border.visible {
        (
            if border.show_left { BORDER_SIZE } else { 0 },
            if border.show_top { BORDER_SIZE } else { 0 },
            BORDER_SIZE,
            BORDER_SIZE,
        )
    } else {
        (0, 0, 0, 0)
    };
    let mut raster = Raster::new(
        PLAYFIELD_WIDTH + left + right,
        PLAYFIELD_HEIGHT + top + bottom,
        (left, top),
        border.color,
    );

    let backgrounds = figure.tile_backgrounds();
    for (index, &bg) in backgrounds.iter().enumerate() {
        let x = (index % COLUMNS) * CARD_SIZE;
        let y = (index / COLUMNS) * CARD_SIZE;
        for py in y..y + CARD_SIZE {
            for px in x..x + CARD_SIZE {
                raster.paint(px, py, bg);
            }
        }
    }

    sprite_pass(&mut raster, figure, cards, Priority::Behind);

    for (index, tile) in figure.tiles().iter().enumerate() {
        let card = cards.get_card(tile.card_index);
        raster.draw_card(&card, (index % COLUMNS) * CARD_SIZE, (index / COLUMNS) * CARD_SIZE, tile.fg_color);
    }

    sprite_pass(&mut raster, figure, cards, Priority::InFront);

    log::trace!("rendered figure '{}' at {}x{}", figure.name, raster.width, raster.height);
    raster
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CardCatalog;
    use crate::figure::{Border, SpriteSize, Tile};
    use crate::lookup::{CardStore, GramCard, GramSlots};

    const SOLID: BitCard = BitCard::from_rows([0xFF; 8]);
    const LEFT_COLUMN: BitCard = BitCard::from_rows([0x80; 8]);

    fn store_parts() -> (CardCatalog, GramSlots) {
        let mut gram = GramSlots::new();
        gram.set(0, GramCard::new(SOLID)).unwrap();
        gram.set(1, GramCard::new(LEFT_COLUMN)).unwrap();
        gram.set(2, GramCard::new(BitCard::from_rows([0x80, 0, 0, 0, 0, 0, 0, 0]))).unwrap();
        (CardCatalog::new(), gram)
    }

    fn borderless(name: &str) -> DisplayFigure {
        let mut figure = DisplayFigure::new(name);
        figure.set_border(Border { visible: false, ..Border::default() }).unwrap();
        figure
    }

    #[test]
    fn test_border_geometry() {
        let (catalog, gram) = store_parts();
        let store = CardStore::new(&catalog, &gram);

        let mut figure = DisplayFigure::new("f");
        figure.set_border(Border { color: 9, ..Border::default() }).unwrap();
        let raster = render(&figure, &store);
        assert_eq!((raster.width(), raster.height()), (176, 112));
        assert_eq!(raster.get(0, 0), Some(9));
        assert_eq!(raster.get(175, 111), Some(9));
        assert_eq!(raster.playfield(0, 0), Some(0));

        figure.set_border(Border { color: 9, show_left: false, ..Border::default() }).unwrap();
        let raster = render(&figure, &store);
        assert_eq!(raster.width(), 168);
        assert_eq!(raster.origin(), (0, 8));

        let raster = render(&borderless("g"), &store);
        assert_eq!((raster.width(), raster.height()), (PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT));
        assert_eq!(raster.pixels().len(), PLAYFIELD_WIDTH * PLAYFIELD_HEIGHT);
    }

    #[test]
    fn test_tile_foreground_over_background() {
        let (catalog, gram) = store_parts();
        let store = CardStore::new(&catalog, &gram);
        let mut figure = borderless("f");
        figure.set_color_stack([3, 1, 2, 4]).unwrap();
        figure.set_tile(0, 1, Tile::new(257, 6)).unwrap();

        let raster = render(&figure, &store);
        assert_eq!(raster.playfield(8, 0), Some(6));
        assert_eq!(raster.playfield(9, 0), Some(3));
        assert_eq!(raster.playfield(0, 0), Some(3));
    }

    #[test]
    fn test_sprite_priority() {
        let (catalog, gram) = store_parts();
        let store = CardStore::new(&catalog, &gram);
        let mut figure = borderless("f");
        figure.fill(Tile::new(257, 6)).unwrap();

        figure.set_sprite(0, Sprite::new(256, 0, 0).with_color(12).with_priority(Priority::Behind)).unwrap();
        let raster = render(&figure, &store);
        // column 0 is tile foreground, the rest shows the sprite behind it
        assert_eq!(raster.playfield(0, 0), Some(6));
        assert_eq!(raster.playfield(1, 0), Some(12));

        figure.set_sprite(0, Sprite::new(256, 0, 0).with_color(12)).unwrap();
        let raster = render(&figure, &store);
        assert_eq!(raster.playfield(0, 0), Some(12));
    }

    #[test]
    fn test_lower_sprite_index_on_top() {
        let (catalog, gram) = store_parts();
        let store = CardStore::new(&catalog, &gram);
        let mut figure = borderless("f");
        figure.set_sprite(0, Sprite::new(256, 4, 4).with_color(1)).unwrap();
        figure.set_sprite(1, Sprite::new(256, 0, 0).with_color(2)).unwrap();
        let raster = render(&figure, &store);
        assert_eq!(raster.playfield(5, 5), Some(1));
        assert_eq!(raster.playfield(1, 1), Some(2));
    }

    #[test]
    fn test_sprite_scale_flip_and_clip() {
        let (catalog, gram) = store_parts();
        let store = CardStore::new(&catalog, &gram);
        let mut figure = borderless("f");
        let sprite = Sprite::new(258, 10, 10).with_color(5).with_size(SpriteSize::Size16x16);
        figure.set_sprite(0, sprite).unwrap();
        let raster = render(&figure, &store);
        assert_eq!(raster.playfield(10, 10), Some(5));
        assert_eq!(raster.playfield(11, 11), Some(5));
        assert_eq!(raster.playfield(12, 10), Some(0));

        figure.set_sprite(0, sprite.with_flip(true, true)).unwrap();
        let raster = render(&figure, &store);
        assert_eq!(raster.playfield(10, 10), Some(0));
        assert_eq!(raster.playfield(25, 25), Some(5));
        assert_eq!(raster.playfield(24, 24), Some(5));

        figure.set_sprite(0, Sprite::new(256, -4, 92).with_color(5)).unwrap();
        let raster = render(&figure, &store);
        assert_eq!(raster.playfield(0, 95), Some(5));
        assert_eq!(raster.playfield(4, 95), Some(0));
    }

    #[test]
    fn test_hidden_and_invalid_sprites_skipped() {
        let (catalog, gram) = store_parts();
        let store = CardStore::new(&catalog, &gram);
        let mut figure = borderless("f");
        let baseline = render(&figure, &store);

        figure.set_sprite(0, Sprite { visible: false, ..Sprite::new(256, 0, 0) }).unwrap();
        figure.sprite_mut(1).unwrap().visible = true;
        figure.sprite_mut(1).unwrap().card_index = 100;
        assert_eq!(render(&figure, &store), baseline);
    }
}
