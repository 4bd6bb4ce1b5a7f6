//! Layered composites of named timelines
//!
//! A composite stacks up to eight timelines. Each binding decides what its
//! layer shows once the bound timeline runs out (loop, hold the last tick, or
//! hide) and may override the card's native color. Layer 0 is drawn on top.

use serde::{Deserialize, Serialize};

use crate::lookup::CardLookup;
use crate::models::CompositeRecord;
use crate::palette::is_color;
use crate::registry::Registry;
use crate::timeline::{Timeline, DEFAULT_FPS, MAX_LAYERS};

/// What a layer shows after its timeline has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndBehavior {
    /// Wrap back to the start
    #[default]
    Loop,
    /// Keep showing the final tick
    Hold,
    /// Show nothing
    Hide,
}

/// One layer of a composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerBinding {
    pub timeline: String,
    pub visible: bool,
    pub end_behavior: EndBehavior,
    color_override: Option<u8>,
}

impl LayerBinding {
    /// A visible, looping binding with no color override.
    pub fn new(timeline: impl Into<String>) -> Self {
        Self {
            timeline: timeline.into(),
            visible: true,
            end_behavior: EndBehavior::Loop,
            color_override: None,
        }
    }

    pub fn with_end_behavior(mut self, end_behavior: EndBehavior) -> Self {
        self.end_behavior = end_behavior;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set the override color. Values outside 0-15 are ignored.
    pub fn with_color_override(mut self, color: Option<u8>) -> Self {
        self.set_color_override(color);
        self
    }

    pub fn color_override(&self) -> Option<u8> {
        self.color_override
    }

    /// Set or clear the override color. Values outside 0-15 are ignored.
    pub fn set_color_override(&mut self, color: Option<u8>) {
        match color {
            Some(c) if !is_color(c) => {}
            other => self.color_override = other,
        }
    }
}

/// A card chosen for one composite layer, with the color to draw it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResolvedLayer {
    pub card_index: u16,
    pub color: u8,
}

/// A named stack of timeline bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CompositeRecord", into = "CompositeRecord")]
pub struct Compositor {
    pub name: String,
    pub fps: u32,
    pub looping: bool,
    layers: Vec<LayerBinding>,
}

impl Compositor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fps: DEFAULT_FPS, looping: false, layers: Vec::new() }
    }

    pub fn layers(&self) -> &[LayerBinding] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&LayerBinding> {
        self.layers.get(index)
    }

    /// Append a binding at the lowest priority. Ignored once eight layers exist.
    pub fn add_layer(&mut self, binding: LayerBinding) {
        if self.layers.len() < MAX_LAYERS {
            self.layers.push(binding);
        }
    }

    pub fn remove_layer(&mut self, index: usize) {
        if index < self.layers.len() {
            self.layers.remove(index);
        }
    }

    /// Move binding `from` so that it ends up at position `to`.
    pub fn reorder_layer(&mut self, from: usize, to: usize) {
        if from < self.layers.len() && to < self.layers.len() {
            let binding = self.layers.remove(from);
            self.layers.insert(to, binding);
        }
    }

    pub fn set_timeline(&mut self, index: usize, timeline: impl Into<String>) {
        if let Some(binding) = self.layers.get_mut(index) {
            binding.timeline = timeline.into();
        }
    }

    pub fn set_visible(&mut self, index: usize, visible: bool) {
        if let Some(binding) = self.layers.get_mut(index) {
            binding.visible = visible;
        }
    }

    pub fn set_end_behavior(&mut self, index: usize, end_behavior: EndBehavior) {
        if let Some(binding) = self.layers.get_mut(index) {
            binding.end_behavior = end_behavior;
        }
    }

    pub fn set_color_override(&mut self, index: usize, color: Option<u8>) {
        if let Some(binding) = self.layers.get_mut(index) {
            binding.set_color_override(color);
        }
    }

    /// The timeline a binding shows, if the binding is visible and resolvable.
    fn active_timeline<'r, R>(binding: &LayerBinding, registry: &'r R) -> Option<&'r Timeline>
    where
        R: Registry<Timeline> + ?Sized,
    {
        if !binding.visible {
            return None;
        }
        registry.get(&binding.timeline)
    }

    fn resolve_binding<R>(binding: &LayerBinding, frame: u32, registry: &R) -> Option<u16>
    where
        R: Registry<Timeline> + ?Sized,
    {
        let timeline = Self::active_timeline(binding, registry)?;
        let total = timeline.total_duration();
        if total == 0 {
            return None;
        }

        let layers = if frame < total {
            timeline.resolve(frame, Some(false))
        } else {
            match binding.end_behavior {
                EndBehavior::Loop => timeline.resolve(frame, Some(true)),
                EndBehavior::Hold => timeline.resolve(total - 1, Some(false)),
                EndBehavior::Hide => return None,
            }
        };

        layers.iter().find(|l| l.visible).map(|l| l.card_index)
    }

    /// Card shown by each of the eight layer slots at `frame`.
    ///
    /// A slot is `None` when it has no binding, is hidden, names an unknown
    /// timeline, binds an empty timeline, has ended with [`EndBehavior::Hide`],
    /// or its frame has no visible layer. Otherwise it carries the frame's
    /// highest-priority visible card.
    pub fn resolve_cards<R>(&self, frame: u32, registry: &R) -> [Option<u16>; MAX_LAYERS]
    where
        R: Registry<Timeline> + ?Sized,
    {
        let mut slots = [None; MAX_LAYERS];
        for (slot, binding) in slots.iter_mut().zip(&self.layers) {
            *slot = Self::resolve_binding(binding, frame, registry);
        }
        slots
    }

    /// Like [`resolve_cards`](Self::resolve_cards), with each card's effective
    /// color: the binding's override when set, otherwise the card's native color.
    pub fn resolve<R, L>(&self, frame: u32, registry: &R, cards: &L) -> [Option<ResolvedLayer>; MAX_LAYERS]
    where
        R: Registry<Timeline> + ?Sized,
        L: CardLookup + ?Sized,
    {
        let mut resolved = [None; MAX_LAYERS];
        for ((out, card), binding) in resolved.iter_mut().zip(self.resolve_cards(frame, registry)).zip(&self.layers) {
            *out = card.map(|card_index| ResolvedLayer {
                card_index,
                color: binding.color_override.unwrap_or_else(|| cards.get_color(card_index)),
            });
        }
        resolved
    }

    /// Longest total duration among visible, resolvable layers; 0 if none.
    pub fn max_duration<R>(&self, registry: &R) -> u32
    where
        R: Registry<Timeline> + ?Sized,
    {
        self.layers
            .iter()
            .filter_map(|b| Self::active_timeline(b, registry))
            .map(Timeline::total_duration)
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn from_parts(name: String, fps: u32, looping: bool, layers: Vec<LayerBinding>) -> Self {
        let mut composite = Self::new(name);
        if fps > 0 {
            composite.fps = fps;
        }
        composite.looping = looping;
        composite.layers = layers.into_iter().take(MAX_LAYERS).collect();
        composite
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::BitCard;
    use crate::registry::TimelineRegistry;
    use crate::timeline::Frame;

    struct Colors;

    impl CardLookup for Colors {
        fn get_card(&self, _index: u16) -> BitCard {
            BitCard::new()
        }

        fn get_color(&self, index: u16) -> u8 {
            (index % 16) as u8
        }
    }

    /// Four one-tick frames showing cards 100..=103.
    fn registry() -> TimelineRegistry {
        [
            Timeline::new("four").with_frames((100..104).map(|c| Frame::with_card(c, 1))),
            Timeline::new("empty"),
        ]
        .into_iter()
        .collect()
    }

    fn single(end_behavior: EndBehavior) -> Compositor {
        let mut composite = Compositor::new("test");
        composite.add_layer(LayerBinding::new("four").with_end_behavior(end_behavior));
        composite
    }

    #[test]
    fn test_end_behaviors() {
        let registry = registry();
        let hold = single(EndBehavior::Hold);
        assert_eq!(hold.resolve_cards(10, &registry)[0], hold.resolve_cards(3, &registry)[0]);
        assert_eq!(hold.resolve_cards(10, &registry)[0], Some(103));

        let hide = single(EndBehavior::Hide);
        assert_eq!(hide.resolve_cards(10, &registry)[0], None);
        assert_eq!(hide.resolve_cards(3, &registry)[0], Some(103));

        let looped = single(EndBehavior::Loop);
        assert_eq!(looped.resolve_cards(10, &registry)[0], looped.resolve_cards(2, &registry)[0]);
        assert_eq!(looped.resolve_cards(10, &registry)[0], Some(102));
    }

    #[test]
    fn test_unresolvable_and_hidden_layers() {
        let registry = registry();
        let mut composite = Compositor::new("mixed");
        composite.add_layer(LayerBinding::new("missing"));
        composite.add_layer(LayerBinding::new("empty"));
        composite.add_layer(LayerBinding::new("four").with_visible(false));
        composite.add_layer(LayerBinding::new("four"));

        let slots = composite.resolve_cards(0, &registry);
        assert_eq!(slots[..4], [None, None, None, Some(100)]);
        assert!(slots[4..].iter().all(Option::is_none));
        assert_eq!(composite.max_duration(&registry), 4);
    }

    #[test]
    fn test_color_override_and_native_color() {
        let registry = registry();
        let mut composite = Compositor::new("colors");
        composite.add_layer(LayerBinding::new("four").with_color_override(Some(9)));
        composite.add_layer(LayerBinding::new("four"));

        let resolved = composite.resolve(1, &registry, &Colors);
        assert_eq!(resolved[0], Some(ResolvedLayer { card_index: 101, color: 9 }));
        assert_eq!(resolved[1], Some(ResolvedLayer { card_index: 101, color: 101 % 16 }));
        assert_eq!(resolved[2], None);
    }

    #[test]
    fn test_invalid_color_override_ignored() {
        let mut binding = LayerBinding::new("x").with_color_override(Some(3));
        binding.set_color_override(Some(16));
        assert_eq!(binding.color_override(), Some(3));
        binding.set_color_override(None);
        assert_eq!(binding.color_override(), None);
    }

    #[test]
    fn test_layer_cap_and_edits() {
        let mut composite = Compositor::new("cap");
        for i in 0..10 {
            composite.add_layer(LayerBinding::new(format!("t{}", i)));
        }
        assert_eq!(composite.layers().len(), MAX_LAYERS);

        composite.reorder_layer(7, 0);
        assert_eq!(composite.layer(0).unwrap().timeline, "t7");
        composite.remove_layer(0);
        composite.remove_layer(99);
        assert_eq!(composite.layers().len(), 7);

        composite.set_end_behavior(0, EndBehavior::Hide);
        composite.set_visible(1, false);
        composite.set_timeline(2, "renamed");
        composite.set_color_override(3, Some(9));
        composite.set_color_override(42, Some(9));
        assert_eq!(composite.layer(0).unwrap().end_behavior, EndBehavior::Hide);
        assert!(!composite.layer(1).unwrap().visible);
        assert_eq!(composite.layer(2).unwrap().timeline, "renamed");
        assert_eq!(composite.layer(3).unwrap().color_override(), Some(9));
    }

    #[test]
    fn test_max_duration_empty() {
        assert_eq!(Compositor::new("none").max_duration(&registry()), 0);
    }

    #[test]
    fn test_resolves_against_timeline_slice() {
        let timelines = vec![Timeline::new("four").with_frames([Frame::with_card(7, 2)])];
        let composite = single(EndBehavior::Hold);
        assert_eq!(composite.resolve_cards(9, timelines.as_slice())[0], Some(7));
    }
}
