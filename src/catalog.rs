//! Fixed 256-card catalog (GROM) decoding
//!
//! The catalog source is a sparse object keyed by card index. Keys are decimal
//! (`"33"`) or `$`-prefixed hex (`"$21"`). Each value is either a bare array of
//! eight row values or an object `{"data": [...], "label": "..."}`.
//!
//! Row values may be written several ways:
//! - Integer: `24`, or an integral number such as `24.0`
//! - Bitmap row: `"...XX..."` (8 chars; `0`, `_`, `.` and space are off)
//! - Hex: `"0x18"` or `"$18"`
//! - Binary: `"0b00011000"`
//! - Decimal string: `"24"`
//!
//! Decoding never fails as a whole. A bad entry leaves its card blank and is
//! reported as a [`Warning`].

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::card::{BitCard, CARD_SIZE};
use crate::models::Warning;
use crate::palette::GROM_CARDS;

/// Error type for reading a catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// File could not be read
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    /// File is not valid JSON5
    #[error("invalid catalog syntax: {0}")]
    Syntax(String),
}

/// A decoded catalog plus the warnings collected while decoding it.
#[derive(Debug, Clone)]
pub struct DecodeResult {
    pub catalog: CardCatalog,
    pub warnings: Vec<Warning>,
}

/// The 256 read-only cards with optional labels.
#[derive(Debug, Clone, PartialEq)]
pub struct CardCatalog {
    cards: Vec<BitCard>,
    labels: BTreeMap<u8, String>,
}

impl Default for CardCatalog {
    fn default() -> Self {
        Self { cards: vec![BitCard::new(); GROM_CARDS], labels: BTreeMap::new() }
    }
}

/// A parsed card-index key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexToken {
    Decimal(u8),
    Hex(u8),
}

impl IndexToken {
    pub fn index(self) -> u8 {
        match self {
            IndexToken::Decimal(i) | IndexToken::Hex(i) => i,
        }
    }
}

/// Per-card payload in either of the two accepted shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CardSource {
    Rows(Vec<Value>),
    Entry {
        #[serde(default)]
        data: Option<Value>,
        #[serde(default)]
        label: Option<String>,
    },
}

/// Parse a catalog key.
///
/// Returns a warning message for non-numeric or out-of-range keys.
///
/// # Examples
///
/// ```
/// use sticsmith::catalog::{parse_index_token, IndexToken};
///
/// assert_eq!(parse_index_token("33"), Ok(IndexToken::Decimal(33)));
/// assert_eq!(parse_index_token("$1A"), Ok(IndexToken::Hex(26)));
/// assert!(parse_index_token("256").is_err());
/// ```
pub fn parse_index_token(key: &str) -> Result<IndexToken, String> {
    let (value, hex) = match key.strip_prefix('$') {
        Some(digits) => {
            let value = if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit()) {
                i64::from_str_radix(digits, 16).ok()
            } else {
                None
            };
            (value, true)
        }
        None => (key.trim().parse::<i64>().ok(), false),
    };

    let value = value.ok_or_else(|| format!("Ignoring non-numeric card key '{}'", key))?;
    let index = u8::try_from(value)
        .map_err(|_| format!("Ignoring out-of-range card number {} (must be 0-255)", value))?;

    Ok(if hex { IndexToken::Hex(index) } else { IndexToken::Decimal(index) })
}

/// Parse one row value. Returns `None` for anything outside 0..=255.
pub fn parse_byte(value: &Value) -> Option<u8> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|v| u8::try_from(v).ok()),
        Value::String(s) => parse_byte_str(s),
        _ => None,
    }
}

fn is_zero_marker(c: char) -> bool {
    matches!(c, '0' | '_' | '.' | ' ')
}

fn parse_radix(digits: &str, radix: u32) -> Option<u8> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u8::from_str_radix(digits, radix).ok()
}

/// Parse one textual row value.
///
/// # Examples
///
/// ```
/// use sticsmith::catalog::parse_byte_str;
///
/// assert_eq!(parse_byte_str("...XX..."), Some(0x18));
/// assert_eq!(parse_byte_str("0x18"), Some(0x18));
/// assert_eq!(parse_byte_str("$18"), Some(0x18));
/// assert_eq!(parse_byte_str("0b00011000"), Some(0x18));
/// assert_eq!(parse_byte_str("24"), Some(24));
/// assert_eq!(parse_byte_str("300"), None);
/// ```
pub fn parse_byte_str(s: &str) -> Option<u8> {
    let len = s.chars().count();

    if len == CARD_SIZE {
        return Some(s.chars().fold(0u8, |acc, c| (acc << 1) | u8::from(!is_zero_marker(c))));
    }

    if len == 4 && (s.starts_with("0x") || s.starts_with("0X")) {
        return parse_radix(&s[2..], 16);
    }

    if let Some(digits) = s.strip_prefix('$') {
        if (2..=3).contains(&len) {
            return parse_radix(digits, 16);
        }
    }

    if len == 10 && (s.starts_with("0b") || s.starts_with("0B")) {
        return parse_radix(&s[2..], 2);
    }

    s.trim().parse::<i64>().ok().and_then(|v| u8::try_from(v).ok())
}

fn decode_rows(index: u8, data: &Value) -> Result<BitCard, String> {
    let items = data
        .as_array()
        .ok_or_else(|| format!("Ignoring card {}: data must be an array", index))?;

    if items.len() != CARD_SIZE {
        return Err(format!(
            "Ignoring card {}: expected 8 bytes, got {}",
            index,
            items.len()
        ));
    }

    let mut rows = [0u8; CARD_SIZE];
    for (i, item) in items.iter().enumerate() {
        rows[i] = parse_byte(item).ok_or_else(|| {
            format!("Ignoring card {}: invalid byte at index {}: {}", index, i, item)
        })?;
    }
    Ok(BitCard::from_rows(rows))
}

impl CardCatalog {
    /// Create an all-blank catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a catalog from an already-parsed source value.
    ///
    /// Decimal-keyed entries are applied first and hex-keyed entries second,
    /// so a `$`-keyed card wins over a decimal key naming the same index.
    pub fn from_value(source: &Value) -> DecodeResult {
        let mut catalog = CardCatalog::new();
        let mut warnings = Vec::new();

        let Some(entries) = source.as_object() else {
            warnings.push(Warning::new("Catalog source must be an object keyed by card number"));
            return DecodeResult { catalog, warnings };
        };

        let mut decimal = Vec::new();
        let mut hex = Vec::new();
        for (key, value) in entries {
            match parse_index_token(key) {
                Ok(IndexToken::Decimal(i)) => decimal.push((i, value)),
                Ok(IndexToken::Hex(i)) => hex.push((i, value)),
                Err(message) => warnings.push(Warning::new(message)),
            }
        }

        let mut loaded = 0usize;
        for (index, value) in decimal.into_iter().chain(hex) {
            match catalog.apply_entry(index, value) {
                Ok(()) => loaded += 1,
                Err(message) => warnings.push(Warning::new(message)),
            }
        }

        for warning in &warnings {
            log::debug!("catalog: {}", warning.message);
        }
        log::debug!("Decoded {} catalog cards ({} warnings)", loaded, warnings.len());

        DecodeResult { catalog, warnings }
    }

    fn apply_entry(&mut self, index: u8, value: &Value) -> Result<(), String> {
        let source = CardSource::deserialize(value)
            .map_err(|_| format!("Ignoring card {}: value must be array or object", index))?;

        let data = match source {
            CardSource::Rows(items) => Value::Array(items),
            CardSource::Entry { data, label } => {
                match label {
                    Some(label) if !label.is_empty() => {
                        self.labels.insert(index, label);
                    }
                    _ => {}
                }
                data.ok_or_else(|| format!("Ignoring card {}: missing 'data' field", index))?
            }
        };

        self.cards[index as usize] = decode_rows(index, &data)?;
        Ok(())
    }

    /// Parse catalog text (JSON or JSON5) and decode it.
    pub fn parse_str(text: &str) -> Result<DecodeResult, CatalogError> {
        let source: Value = json5::from_str(text).map_err(|e| CatalogError::Syntax(e.to_string()))?;
        Ok(Self::from_value(&source))
    }

    /// Read and decode a catalog file.
    pub fn load(path: &Path) -> Result<DecodeResult, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse_str(&text)
    }

    /// Card at `index`. Every index has a card; undefined ones are blank.
    pub fn get(&self, index: u8) -> &BitCard {
        &self.cards[index as usize]
    }

    /// Label for `index`, or an empty string.
    pub fn label(&self, index: u8) -> &str {
        self.labels.get(&index).map(String::as_str).unwrap_or("")
    }

    /// All labelled indices with their labels.
    pub fn labels(&self) -> &BTreeMap<u8, String> {
        &self.labels
    }

    /// Number of cards (always 256).
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Number of cards with at least one pixel set.
    pub fn defined_count(&self) -> usize {
        self.cards.iter().filter(|c| !c.is_empty()).count()
    }

    /// Card for an ASCII character (cards 0-94 map to ASCII 32-126).
    pub fn get_by_ascii(&self, c: char) -> Option<&BitCard> {
        ascii_to_card(c).map(|i| self.get(i))
    }
}

/// Card number for a printable ASCII character (`c - 32`).
pub fn ascii_to_card(c: char) -> Option<u8> {
    if (' '..='~').contains(&c) {
        Some(c as u8 - 32)
    } else {
        None
    }
}

/// ASCII character for a card number in the text range (`n + 32`).
pub fn card_to_ascii(card: u8) -> Option<char> {
    if is_ascii_card(card) {
        Some((card + 32) as char)
    } else {
        None
    }
}

/// True for cards 0-94, which mirror printable ASCII.
pub fn is_ascii_card(card: u8) -> bool {
    card <= 94
}

/// Convert text into card numbers, skipping characters outside printable ASCII.
pub fn text_to_cards(text: &str) -> Vec<u8> {
    text.chars().filter_map(ascii_to_card).collect()
}
