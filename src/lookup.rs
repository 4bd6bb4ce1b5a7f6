//! Card lookup across the combined 0-319 index space
//!
//! Indices 0-255 address the fixed catalog (GROM); 256-319 address the 64
//! caller-owned mutable slots (GRAM). Rendering code only ever sees the
//! [`CardLookup`] trait, so neither storage needs to know about the other.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::card::BitCard;
use crate::catalog::CardCatalog;
use crate::palette::{is_color, DEFAULT_CARD_COLOR, GRAM_BASE, GRAM_CARDS, GROM_CARDS};

/// Read-only access to card bitmaps and their native colors.
pub trait CardLookup {
    /// Bitmap for a combined card index. Unknown indices yield a blank card.
    fn get_card(&self, index: u16) -> BitCard;

    /// Native display color for a combined card index (0-15).
    fn get_color(&self, _index: u16) -> u8 {
        DEFAULT_CARD_COLOR
    }
}

/// Error for GRAM slot access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("card slot must be 0-63, got {0}")]
    OutOfRange(usize),
    #[error("card color must be 0-15, got {0}")]
    InvalidColor(u8),
}

fn default_color() -> u8 {
    DEFAULT_CARD_COLOR
}

/// A user-defined card stored in a GRAM slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GramCard {
    #[serde(default)]
    pub label: String,
    pub data: BitCard,
    #[serde(default = "default_color")]
    pub color: u8,
}

impl GramCard {
    pub fn new(data: BitCard) -> Self {
        Self { label: String::new(), data, color: DEFAULT_CARD_COLOR }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_color(mut self, color: u8) -> Self {
        self.color = color;
        self
    }
}

/// The 64 mutable card slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Option<GramCard>>", into = "Vec<Option<GramCard>>")]
pub struct GramSlots {
    slots: Vec<Option<GramCard>>,
}

impl Default for GramSlots {
    fn default() -> Self {
        Self { slots: vec![None; GRAM_CARDS] }
    }
}

impl From<Vec<Option<GramCard>>> for GramSlots {
    /// Pads or truncates to 64 slots; colors outside the palette fall back to the default.
    fn from(mut slots: Vec<Option<GramCard>>) -> Self {
        slots.resize(GRAM_CARDS, None);
        for card in slots.iter_mut().flatten() {
            if !is_color(card.color) {
                card.color = DEFAULT_CARD_COLOR;
            }
        }
        Self { slots }
    }
}

impl From<GramSlots> for Vec<Option<GramCard>> {
    fn from(gram: GramSlots) -> Self {
        gram.slots
    }
}

impl GramSlots {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(slot: usize) -> Result<(), SlotError> {
        if slot >= GRAM_CARDS {
            return Err(SlotError::OutOfRange(slot));
        }
        Ok(())
    }

    /// Card in `slot` (0-63), or `None` when the slot is empty.
    pub fn get(&self, slot: usize) -> Result<Option<&GramCard>, SlotError> {
        Self::check(slot)?;
        Ok(self.slots[slot].as_ref())
    }

    pub fn get_mut(&mut self, slot: usize) -> Result<Option<&mut GramCard>, SlotError> {
        Self::check(slot)?;
        Ok(self.slots[slot].as_mut())
    }

    pub fn set(&mut self, slot: usize, card: GramCard) -> Result<(), SlotError> {
        Self::check(slot)?;
        if !is_color(card.color) {
            return Err(SlotError::InvalidColor(card.color));
        }
        self.slots[slot] = Some(card);
        Ok(())
    }

    pub fn clear(&mut self, slot: usize) -> Result<(), SlotError> {
        Self::check(slot)?;
        self.slots[slot] = None;
        Ok(())
    }

    /// Slot numbers that hold a card.
    pub fn used_slots(&self) -> Vec<usize> {
        self.slots.iter().enumerate().filter(|(_, c)| c.is_some()).map(|(i, _)| i).collect()
    }

    /// Number of occupied slots.
    pub fn card_count(&self) -> usize {
        self.slots.iter().filter(|c| c.is_some()).count()
    }

    fn by_index(&self, index: u16) -> Option<&GramCard> {
        let slot = index.checked_sub(GRAM_BASE)? as usize;
        self.slots.get(slot)?.as_ref()
    }
}

impl CardLookup for GramSlots {
    fn get_card(&self, index: u16) -> BitCard {
        self.by_index(index).map(|c| c.data).unwrap_or_default()
    }

    fn get_color(&self, index: u16) -> u8 {
        self.by_index(index).map(|c| c.color).unwrap_or(DEFAULT_CARD_COLOR)
    }
}

impl CardLookup for CardCatalog {
    fn get_card(&self, index: u16) -> BitCard {
        u8::try_from(index).map(|i| *self.get(i)).unwrap_or_default()
    }
}

/// Routes the combined index space to a catalog and a slot store.
#[derive(Debug, Clone, Copy)]
pub struct CardStore<'a> {
    pub catalog: &'a CardCatalog,
    pub gram: &'a GramSlots,
    default_color: u8,
}

impl<'a> CardStore<'a> {
    pub fn new(catalog: &'a CardCatalog, gram: &'a GramSlots) -> Self {
        Self { catalog, gram, default_color: DEFAULT_CARD_COLOR }
    }

    /// Color reported for catalog cards and empty slots. Values above 15 are ignored.
    pub fn with_default_color(mut self, color: u8) -> Self {
        if is_color(color) {
            self.default_color = color;
        }
        self
    }
}

impl CardLookup for CardStore<'_> {
    fn get_card(&self, index: u16) -> BitCard {
        if (index as usize) < GROM_CARDS {
            self.catalog.get_card(index)
        } else {
            self.gram.get_card(index)
        }
    }

    fn get_color(&self, index: u16) -> u8 {
        self.gram.by_index(index).map(|c| c.color).unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog_with_33() -> CardCatalog {
        CardCatalog::from_value(&json!({ "33": [1, 2, 3, 4, 5, 6, 7, 8] })).catalog
    }

    #[test]
    fn test_slot_bounds() {
        let mut gram = GramSlots::new();
        assert_eq!(gram.get(64), Err(SlotError::OutOfRange(64)));
        assert_eq!(gram.set(64, GramCard::new(BitCard::new())), Err(SlotError::OutOfRange(64)));
        assert_eq!(
            gram.set(0, GramCard::new(BitCard::new()).with_color(16)),
            Err(SlotError::InvalidColor(16))
        );
        assert_eq!(gram.get(63), Ok(None));
    }

    #[test]
    fn test_used_slots() {
        let mut gram = GramSlots::new();
        gram.set(3, GramCard::new(BitCard::from_rows([0xFF; 8]))).unwrap();
        gram.set(10, GramCard::new(BitCard::new()).with_label("blank")).unwrap();
        assert_eq!(gram.used_slots(), vec![3, 10]);
        assert_eq!(gram.card_count(), 2);
        gram.clear(3).unwrap();
        assert_eq!(gram.card_count(), 1);
    }

    #[test]
    fn test_store_routes_index_space() {
        let catalog = catalog_with_33();
        let mut gram = GramSlots::new();
        gram.set(0, GramCard::new(BitCard::from_rows([0xAA; 8])).with_color(2)).unwrap();
        let store = CardStore::new(&catalog, &gram);

        assert_eq!(store.get_card(33).to_bytes(), [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(store.get_card(256).to_bytes(), [0xAA; 8]);
        assert!(store.get_card(257).is_empty());
        assert!(store.get_card(320).is_empty());
        assert!(store.get_card(u16::MAX).is_empty());

        assert_eq!(store.get_color(256), 2);
        assert_eq!(store.get_color(257), DEFAULT_CARD_COLOR);
        assert_eq!(store.get_color(33), DEFAULT_CARD_COLOR);

        let tinted = store.with_default_color(3);
        assert_eq!(tinted.get_color(33), 3);
        assert_eq!(tinted.get_color(257), 3);
        assert_eq!(tinted.get_color(256), 2);
        assert_eq!(store.with_default_color(16).get_color(33), DEFAULT_CARD_COLOR);
    }

    #[test]
    fn test_slots_deserialize_padded() {
        let json = r#"[null, {"label": "hero", "data": [1,1,1,1,1,1,1,1], "color": 99}]"#;
        let gram: GramSlots = serde_json::from_str(json).unwrap();
        assert_eq!(gram.card_count(), 1);
        let card = gram.get(1).unwrap().unwrap();
        assert_eq!(card.label, "hero");
        assert_eq!(card.color, DEFAULT_CARD_COLOR);
        assert_eq!(gram.get(63), Ok(None));
    }
}
