//! Frame-sequenced card animation
//!
//! A timeline is an ordered list of frames. Each frame shows up to eight
//! layered card references for a number of ticks; layer 0 has the highest
//! priority. Editing operations are forgiving: an index that does not exist
//! or a full layer stack turns the call into a no-op instead of an error.

use serde::{Deserialize, Serialize};

use crate::models::{LayerRecord, TimelineRecord};

/// Maximum layers per frame (one per hardware sprite).
pub const MAX_LAYERS: usize = 8;

/// Default playback rate, matching the STIC's 60 Hz refresh.
pub const DEFAULT_FPS: u32 = 60;

/// Tick count given to frames created without an explicit duration.
pub const DEFAULT_FRAME_DURATION: u32 = 5;

/// One card reference inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "LayerRecord")]
pub struct LayerRef {
    pub card_index: u16,
    pub visible: bool,
}

impl LayerRef {
    /// A visible reference to `card_index`.
    pub fn new(card_index: u16) -> Self {
        Self { card_index, visible: true }
    }

    pub fn hidden(card_index: u16) -> Self {
        Self { card_index, visible: false }
    }
}

/// A single timeline frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    duration: u32,
    layers: Vec<LayerRef>,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_DURATION)
    }
}

impl Frame {
    /// An empty frame lasting `duration` ticks (at least one).
    pub fn new(duration: u32) -> Self {
        Self { duration: duration.max(1), layers: Vec::new() }
    }

    /// A frame showing a single visible card.
    pub fn with_card(card_index: u16, duration: u32) -> Self {
        let mut frame = Self::new(duration);
        frame.add_layer(LayerRef::new(card_index));
        frame
    }

    /// A frame with the given layers; anything past the eighth is dropped.
    pub fn with_layers(duration: u32, layers: impl IntoIterator<Item = LayerRef>) -> Self {
        let mut frame = Self::new(duration);
        frame.layers = layers.into_iter().take(MAX_LAYERS).collect();
        frame
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Set the duration; zero is raised to one tick.
    pub fn set_duration(&mut self, duration: u32) {
        self.duration = duration.max(1);
    }

    pub fn layers(&self) -> &[LayerRef] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&LayerRef> {
        self.layers.get(index)
    }

    /// Highest-priority visible layer, if any.
    pub fn top_visible(&self) -> Option<&LayerRef> {
        self.layers.iter().find(|l| l.visible)
    }

    pub fn is_full(&self) -> bool {
        self.layers.len() >= MAX_LAYERS
    }

    /// Append a layer at the lowest priority.
    pub fn add_layer(&mut self, layer: LayerRef) {
        if !self.is_full() {
            self.layers.push(layer);
        }
    }

    /// Insert a layer at `index` (0 = top). `index == len` appends.
    pub fn insert_layer(&mut self, index: usize, layer: LayerRef) {
        if !self.is_full() && index <= self.layers.len() {
            self.layers.insert(index, layer);
        }
    }

    pub fn remove_layer(&mut self, index: usize) {
        if index < self.layers.len() {
            self.layers.remove(index);
        }
    }

    /// Copy layer `index` directly beneath itself.
    pub fn duplicate_layer(&mut self, index: usize) {
        if let Some(layer) = self.layers.get(index).copied() {
            self.insert_layer(index + 1, layer);
        }
    }

    /// Move layer `from` so that it ends up at position `to`.
    pub fn reorder_layer(&mut self, from: usize, to: usize) {
        if from < self.layers.len() && to < self.layers.len() {
            let layer = self.layers.remove(from);
            self.layers.insert(to, layer);
        }
    }

    pub fn toggle_layer_visibility(&mut self, index: usize) {
        if let Some(layer) = self.layers.get_mut(index) {
            layer.visible = !layer.visible;
        }
    }

    pub fn set_layer_visible(&mut self, index: usize, visible: bool) {
        if let Some(layer) = self.layers.get_mut(index) {
            layer.visible = visible;
        }
    }

    pub fn set_layer_card(&mut self, index: usize, card_index: u16) {
        if let Some(layer) = self.layers.get_mut(index) {
            layer.card_index = card_index;
        }
    }
}

/// A named card animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TimelineRecord", into = "TimelineRecord")]
pub struct Timeline {
    pub name: String,
    /// Loop when resolving past the end unless the caller overrides it
    pub looping: bool,
    fps: u32,
    frames: Vec<Frame>,
}

impl Timeline {
    /// An empty, non-looping timeline at 60 ticks per second.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), looping: false, fps: DEFAULT_FPS, frames: Vec::new() }
    }

    /// Builder-style frame append.
    pub fn with_frames(mut self, frames: impl IntoIterator<Item = Frame>) -> Self {
        self.frames.extend(frames);
        self
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Set the playback rate. Zero is ignored.
    pub fn set_fps(&mut self, fps: u32) {
        if fps > 0 {
            self.fps = fps;
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn frame_mut(&mut self, index: usize) -> Option<&mut Frame> {
        self.frames.get_mut(index)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Sum of all frame durations in ticks, saturating at `u32::MAX`.
    pub fn total_duration(&self) -> u32 {
        self.frames.iter().fold(0u32, |total, frame| total.saturating_add(frame.duration))
    }

    /// Total duration in seconds at the timeline's playback rate.
    pub fn duration_seconds(&self) -> f64 {
        self.total_duration() as f64 / self.fps as f64
    }

    /// Index of the frame showing at `tick`.
    ///
    /// `loop_override` replaces the timeline's own loop flag when given. With
    /// looping the tick wraps modulo the total duration; without it, ticks at
    /// or past the end select nothing.
    pub fn frame_index_at(&self, tick: u32, loop_override: Option<bool>) -> Option<usize> {
        let total = self.total_duration();
        if total == 0 {
            return None;
        }

        let looping = loop_override.unwrap_or(self.looping);
        let tick = if looping { tick % total } else { tick };
        if tick >= total {
            return None;
        }

        let mut end = 0u32;
        for (index, frame) in self.frames.iter().enumerate() {
            end = end.saturating_add(frame.duration);
            if tick < end {
                return Some(index);
            }
        }
        None
    }

    /// Layers of the frame showing at `tick`; empty when nothing is showing.
    ///
    /// # Examples
    ///
    /// ```
    /// use sticsmith::timeline::{Frame, Timeline};
    ///
    /// let walk = Timeline::new("walk")
    ///     .with_frames([Frame::with_card(0, 2), Frame::with_card(1, 3), Frame::with_card(2, 1)]);
    ///
    /// assert_eq!(walk.total_duration(), 6);
    /// assert_eq!(walk.resolve(5, None)[0].card_index, 2);
    /// assert!(walk.resolve(6, None).is_empty());
    /// assert_eq!(walk.resolve(6, Some(true))[0].card_index, 0);
    /// ```
    pub fn resolve(&self, tick: u32, loop_override: Option<bool>) -> &[LayerRef] {
        self.frame_index_at(tick, loop_override)
            .map(|i| self.frames[i].layers())
            .unwrap_or(&[])
    }

    /// Append a frame.
    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Insert a frame before `index`; `index == frame_count()` appends.
    pub fn insert_frame(&mut self, index: usize, frame: Frame) {
        if index <= self.frames.len() {
            self.frames.insert(index, frame);
        }
    }

    pub fn remove_frame(&mut self, index: usize) {
        if index < self.frames.len() {
            self.frames.remove(index);
        }
    }

    /// Insert a copy of frame `index` right after it.
    pub fn duplicate_frame(&mut self, index: usize) {
        if let Some(frame) = self.frames.get(index).cloned() {
            self.frames.insert(index + 1, frame);
        }
    }

    /// Move frame `from` so that it ends up at position `to`.
    pub fn reorder_frame(&mut self, from: usize, to: usize) {
        if from < self.frames.len() && to < self.frames.len() {
            let frame = self.frames.remove(from);
            self.frames.insert(to, frame);
        }
    }

    pub fn set_frame_duration(&mut self, index: usize, duration: u32) {
        if let Some(frame) = self.frames.get_mut(index) {
            frame.set_duration(duration);
        }
    }

    pub fn add_layer(&mut self, frame: usize, layer: LayerRef) {
        if let Some(frame) = self.frames.get_mut(frame) {
            frame.add_layer(layer);
        }
    }

    pub fn remove_layer(&mut self, frame: usize, layer: usize) {
        if let Some(frame) = self.frames.get_mut(frame) {
            frame.remove_layer(layer);
        }
    }

    pub fn duplicate_layer(&mut self, frame: usize, layer: usize) {
        if let Some(frame) = self.frames.get_mut(frame) {
            frame.duplicate_layer(layer);
        }
    }

    pub fn reorder_layer(&mut self, frame: usize, from: usize, to: usize) {
        if let Some(frame) = self.frames.get_mut(frame) {
            frame.reorder_layer(from, to);
        }
    }

    pub fn toggle_layer_visibility(&mut self, frame: usize, layer: usize) {
        if let Some(frame) = self.frames.get_mut(frame) {
            frame.toggle_layer_visibility(layer);
        }
    }

    pub fn set_layer_card(&mut self, frame: usize, layer: usize, card_index: u16) {
        if let Some(frame) = self.frames.get_mut(frame) {
            frame.set_layer_card(layer, card_index);
        }
    }

    pub(crate) fn from_parts(name: String, fps: u32, looping: bool, frames: Vec<Frame>) -> Self {
        let mut timeline = Self::new(name).with_frames(frames).with_looping(looping);
        timeline.set_fps(fps);
        timeline
    }
}
