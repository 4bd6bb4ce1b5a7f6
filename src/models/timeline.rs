//! Serialized timeline shapes.
//!
//! Frames are read in any of these shapes:
//! - **Layered** (current): `{"duration": 5, "layers": [{"card_index": 259, "visible": true}]}`
//! - **Single slot** (legacy): `{"duration": 5, "card_slot": 3}`
//! - **Slot layers** (legacy): `{"duration": 5, "layers": [{"card_slot": 3}]}`
//!
//! A timeline may also carry per-track `layers` instead of `frames`, each
//! track holding its own `{card_slot, duration}` sequence. Tracks are
//! flattened into layered frames that change wherever any track changes.
//!
//! `card_slot` always names a GRAM slot (0-63) and maps to card index
//! `256 + card_slot`. A frame with neither `layers` nor `card_slot` is an
//! empty frame. Output is always the layered frame shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::palette::GRAM_BASE;
use crate::timeline::{Frame, LayerRef, Timeline, DEFAULT_FPS, DEFAULT_FRAME_DURATION, MAX_LAYERS};

fn default_fps() -> u32 {
    DEFAULT_FPS
}

fn default_duration() -> u32 {
    DEFAULT_FRAME_DURATION
}

fn default_visible() -> bool {
    true
}

/// Combined card index of a GRAM slot.
fn gram_card(slot: u16) -> u16 {
    GRAM_BASE.saturating_add(slot)
}

/// A frame layer as stored on disk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayerRecord {
    #[serde(default)]
    pub card_index: Option<u16>,
    #[serde(default)]
    pub card_slot: Option<u16>,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl TryFrom<LayerRecord> for LayerRef {
    type Error = String;

    fn try_from(record: LayerRecord) -> Result<Self, Self::Error> {
        let card_index = match (record.card_index, record.card_slot) {
            (Some(index), _) => index,
            (None, Some(slot)) => gram_card(slot),
            (None, None) => return Err("layer needs a card_index or card_slot".to_string()),
        };
        Ok(LayerRef { card_index, visible: record.visible })
    }
}

/// A frame as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<LayerRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_slot: Option<u16>,
}

impl From<FrameRecord> for Frame {
    fn from(record: FrameRecord) -> Self {
        match (record.layers, record.card_slot) {
            (Some(layers), _) => Frame::with_layers(record.duration, layers),
            (None, Some(slot)) => Frame::with_card(gram_card(slot), record.duration),
            (None, None) => Frame::new(record.duration),
        }
    }
}

impl From<&Frame> for FrameRecord {
    fn from(frame: &Frame) -> Self {
        FrameRecord { duration: frame.duration(), layers: Some(frame.layers().to_vec()), card_slot: None }
    }
}

/// One step of a per-track sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackFrameRecord {
    #[serde(default)]
    pub card_slot: u16,
    #[serde(default = "default_duration")]
    pub duration: u32,
}

impl TrackFrameRecord {
    fn ticks(&self) -> u32 {
        self.duration.max(1)
    }
}

/// A per-track card sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub frames: Vec<TrackFrameRecord>,
}

impl TrackRecord {
    /// Tick offsets at which each step of the track ends.
    fn step_ends(&self) -> impl Iterator<Item = u32> + '_ {
        self.frames.iter().scan(0u32, |end, frame| {
            *end = end.saturating_add(frame.ticks());
            Some(*end)
        })
    }

    fn slot_at(&self, tick: u32) -> Option<u16> {
        self.step_ends().zip(&self.frames).find(|(end, _)| tick < *end).map(|(_, frame)| frame.card_slot)
    }
}

/// Merge tracks into frames, one per span where no track changes card.
fn flatten_tracks(tracks: &[TrackRecord]) -> Vec<Frame> {
    let tracks = &tracks[..tracks.len().min(MAX_LAYERS)];
    let cuts: BTreeSet<u32> = tracks.iter().flat_map(TrackRecord::step_ends).collect();

    let mut frames = Vec::with_capacity(cuts.len());
    let mut start = 0u32;
    for end in cuts {
        let layers = tracks.iter().filter_map(|track| {
            track.slot_at(start).map(|slot| LayerRef { card_index: gram_card(slot), visible: track.visible })
        });
        frames.push(Frame::with_layers(end - start, layers));
        start = end;
    }
    frames
}

/// A timeline as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineRecord {
    pub name: String,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default, rename = "loop")]
    pub looping: bool,
    #[serde(default)]
    pub frames: Vec<FrameRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<TrackRecord>,
}

impl From<TimelineRecord> for Timeline {
    fn from(record: TimelineRecord) -> Self {
        let frames = if record.layers.is_empty() {
            record.frames.into_iter().map(Frame::from).collect()
        } else {
            flatten_tracks(&record.layers)
        };
        Timeline::from_parts(record.name, record.fps, record.looping, frames)
    }
}

impl From<Timeline> for TimelineRecord {
    fn from(timeline: Timeline) -> Self {
        TimelineRecord {
            fps: timeline.fps(),
            looping: timeline.looping,
            frames: timeline.frames().iter().map(FrameRecord::from).collect(),
            layers: Vec::new(),
            name: timeline.name,
        }
    }
}
