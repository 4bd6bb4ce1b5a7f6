//! 8×8 one-bit-per-pixel card bitmaps
//!
//! A card is stored as eight row bytes, top row first. Within a row the most
//! significant bit is the leftmost pixel.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Width and height of a card in pixels.
pub const CARD_SIZE: usize = 8;

/// Error type for card construction and pixel access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    /// Pixel coordinates outside 0..8
    #[error("pixel ({x}, {y}) out of range (0-7, 0-7)")]
    OutOfRange { x: usize, y: usize },
    /// Source data did not contain exactly eight rows
    #[error("card data must be 8 bytes, got {0}")]
    InvalidLength(usize),
    /// A row value outside 0..=255
    #[error("byte {index} must be 0-255, got {value}")]
    InvalidByte { index: usize, value: i64 },
}

/// A single 8×8 card bitmap. Serializes as its eight row bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[u8; 8]", into = "[u8; 8]")]
pub struct BitCard {
    rows: [u8; CARD_SIZE],
}

impl BitCard {
    /// Create a blank card.
    pub const fn new() -> Self {
        Self { rows: [0; CARD_SIZE] }
    }

    /// Create a card directly from eight row bytes.
    pub const fn from_rows(rows: [u8; CARD_SIZE]) -> Self {
        Self { rows }
    }

    /// Create a card from a slice of row values.
    ///
    /// Values are taken as wide integers so that out-of-range rows coming from
    /// loosely typed sources are reported instead of silently truncated.
    ///
    /// # Examples
    ///
    /// ```
    /// use sticsmith::card::{BitCard, CardError};
    ///
    /// let card = BitCard::from_bytes(&[0x18, 0x24, 0x42, 0x42, 0x7E, 0x42, 0x42, 0x00]).unwrap();
    /// assert_eq!(card.get_pixel(3, 0), Ok(1));
    ///
    /// assert_eq!(BitCard::from_bytes(&[0; 7]), Err(CardError::InvalidLength(7)));
    /// ```
    pub fn from_bytes<T>(data: &[T]) -> Result<Self, CardError>
    where
        T: Copy + Into<i64>,
    {
        if data.len() != CARD_SIZE {
            return Err(CardError::InvalidLength(data.len()));
        }

        let mut rows = [0u8; CARD_SIZE];
        for (index, value) in data.iter().map(|v| (*v).into()).enumerate() {
            rows[index] =
                u8::try_from(value).map_err(|_| CardError::InvalidByte { index, value })?;
        }
        Ok(Self { rows })
    }

    fn check(x: usize, y: usize) -> Result<(), CardError> {
        if x >= CARD_SIZE || y >= CARD_SIZE {
            return Err(CardError::OutOfRange { x, y });
        }
        Ok(())
    }

    /// Read the pixel at column `x`, row `y` (0 or 1).
    pub fn get_pixel(&self, x: usize, y: usize) -> Result<u8, CardError> {
        Self::check(x, y)?;
        Ok(self.bit(x, y) as u8)
    }

    /// Write the pixel at column `x`, row `y`. Any non-zero value sets the bit.
    pub fn set_pixel(&mut self, x: usize, y: usize, value: u8) -> Result<(), CardError> {
        Self::check(x, y)?;
        let mask = 0x80u8 >> x;
        if value != 0 {
            self.rows[y] |= mask;
        } else {
            self.rows[y] &= !mask;
        }
        Ok(())
    }

    /// Unchecked bit read used by the raster passes; callers stay inside 0..8.
    pub(crate) fn bit(&self, x: usize, y: usize) -> bool {
        self.rows[y] & (0x80 >> x) != 0
    }

    /// Mirror left-right.
    pub fn flip_horizontal(&mut self) {
        for row in &mut self.rows {
            *row = row.reverse_bits();
        }
    }

    /// Mirror top-bottom.
    pub fn flip_vertical(&mut self) {
        self.rows.reverse();
    }

    /// Toggle every pixel.
    pub fn invert(&mut self) {
        for row in &mut self.rows {
            *row ^= 0xFF;
        }
    }

    /// Turn every pixel off.
    pub fn clear(&mut self) {
        self.rows = [0; CARD_SIZE];
    }

    /// True when no pixel is set.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|&row| row == 0)
    }

    /// The eight row bytes, top row first.
    pub fn to_bytes(&self) -> [u8; CARD_SIZE] {
        self.rows
    }

    /// Rows as two-digit uppercase hex strings (e.g. `"7E"`).
    pub fn to_hex_rows(&self) -> Vec<String> {
        self.rows.iter().map(|row| format!("{:02X}", row)).collect()
    }

    /// Rows as eight-character binary strings (e.g. `"01111110"`).
    pub fn to_binary_rows(&self) -> Vec<String> {
        self.rows.iter().map(|row| format!("{:08b}", row)).collect()
    }
}

impl fmt::Debug for BitCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitCard({})", self.to_hex_rows().join(" "))
    }
}

impl fmt::Display for BitCard {
    /// Renders the card as eight lines of `#` and `.`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..CARD_SIZE {
            for x in 0..CARD_SIZE {
                f.write_str(if self.bit(x, y) { "#" } else { "." })?;
            }
            if y + 1 < CARD_SIZE {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl From<[u8; CARD_SIZE]> for BitCard {
    fn from(rows: [u8; CARD_SIZE]) -> Self {
        Self::from_rows(rows)
    }
}

impl From<BitCard> for [u8; CARD_SIZE] {
    fn from(card: BitCard) -> Self {
        card.rows
    }
}
