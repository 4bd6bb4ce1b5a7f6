//! Intellivision STIC color palette and card index-space constants.
//!
//! The palette is an immutable table; components that need color names or
//! RGB values take a `&Palette` rather than reaching for global state.

use image::Rgba;

/// Number of entries in the STIC palette.
pub const PALETTE_SIZE: usize = 16;

/// Native color for cards that have none assigned (white).
pub const DEFAULT_CARD_COLOR: u8 = 7;

/// Number of cards in the fixed catalog (GROM).
pub const GROM_CARDS: usize = 256;

/// Number of mutable card slots (GRAM).
pub const GRAM_CARDS: usize = 64;

/// First combined card index that routes to a GRAM slot.
pub const GRAM_BASE: u16 = GROM_CARDS as u16;

/// One past the last valid combined card index (320).
pub const CARD_INDEX_END: u16 = GRAM_BASE + GRAM_CARDS as u16;

/// A single named palette color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteColor {
    pub name: &'static str,
    pub hex: &'static str,
    pub rgb: [u8; 3],
}

/// A 16-entry indexed color table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [PaletteColor; PALETTE_SIZE],
}

const fn color(name: &'static str, hex: &'static str, r: u8, g: u8, b: u8) -> PaletteColor {
    PaletteColor { name, hex, rgb: [r, g, b] }
}

/// jzIntv-accurate colors. 0-7 form the primary set, 8-15 the pastel set.
static INTELLIVISION: Palette = Palette {
    colors: [
        color("Black", "#0C0005", 12, 0, 5),
        color("Blue", "#002DFF", 0, 45, 255),
        color("Red", "#FF3E00", 255, 62, 0),
        color("Tan", "#C9CFAB", 201, 207, 171),
        color("Dark Green", "#386B3F", 56, 107, 63),
        color("Green", "#00A756", 0, 167, 86),
        color("Yellow", "#FAEB27", 250, 235, 39),
        color("White", "#FCFFFF", 252, 255, 255),
        color("Gray", "#A7A8A8", 167, 168, 168),
        color("Cyan", "#5ACBFF", 90, 203, 255),
        color("Orange", "#FFA048", 255, 160, 72),
        color("Brown", "#BD8438", 189, 132, 56),
        color("Pink", "#FF3276", 255, 50, 118),
        color("Light Blue", "#5EB5FF", 94, 181, 255),
        color("Yellow-Green", "#C3D959", 195, 217, 89),
        color("Purple", "#C45CEC", 196, 92, 236),
    ],
};

impl Palette {
    /// The standard Intellivision palette.
    pub fn intellivision() -> &'static Palette {
        &INTELLIVISION
    }

    /// Entry for `index`, if it is in 0..16.
    pub fn get(&self, index: u8) -> Option<&PaletteColor> {
        self.colors.get(index as usize)
    }

    fn get_or_default(&self, index: u8) -> &PaletteColor {
        self.get(index).unwrap_or(&self.colors[DEFAULT_CARD_COLOR as usize])
    }

    /// Hex string for `index`, falling back to the default card color.
    pub fn hex(&self, index: u8) -> &'static str {
        self.get_or_default(index).hex
    }

    /// RGB triple for `index`, falling back to the default card color.
    pub fn rgb(&self, index: u8) -> [u8; 3] {
        self.get_or_default(index).rgb
    }

    /// Opaque RGBA pixel for `index`.
    pub fn rgba(&self, index: u8) -> Rgba<u8> {
        let [r, g, b] = self.rgb(index);
        Rgba([r, g, b, 255])
    }

    /// Human-readable name, or `"Unknown"` outside 0..16.
    pub fn name(&self, index: u8) -> &'static str {
        self.get(index).map(|c| c.name).unwrap_or("Unknown")
    }

    /// Iterate `(index, color)` pairs in palette order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &PaletteColor)> {
        self.colors.iter().enumerate().map(|(i, c)| (i as u8, c))
    }
}

/// True when `index` is a valid palette index.
pub fn is_color(index: u8) -> bool {
    (index as usize) < PALETTE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_lookup() {
        let palette = Palette::intellivision();
        assert_eq!(palette.name(0), "Black");
        assert_eq!(palette.hex(1), "#002DFF");
        assert_eq!(palette.rgb(15), [196, 92, 236]);
        assert_eq!(palette.rgba(2), Rgba([255, 62, 0, 255]));
    }

    #[test]
    fn test_palette_fallbacks() {
        let palette = Palette::intellivision();
        assert_eq!(palette.name(16), "Unknown");
        assert_eq!(palette.hex(200), palette.hex(DEFAULT_CARD_COLOR));
        assert_eq!(palette.rgb(16), [252, 255, 255]);
    }

    #[test]
    fn test_index_space() {
        assert_eq!(GRAM_BASE, 256);
        assert_eq!(CARD_INDEX_END, 320);
        assert!(is_color(15));
        assert!(!is_color(16));
        assert_eq!(Palette::intellivision().iter().count(), PALETTE_SIZE);
    }
}
