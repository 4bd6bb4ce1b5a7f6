//! Serialized composite shapes.

use serde::{Deserialize, Serialize};

use crate::composite::{Compositor, EndBehavior, LayerBinding};
use crate::timeline::DEFAULT_FPS;

fn default_fps() -> u32 {
    DEFAULT_FPS
}

fn default_visible() -> bool {
    true
}

/// One composite layer as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingRecord {
    #[serde(alias = "animation_name")]
    pub timeline_name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub end_behavior: EndBehavior,
    /// Kept wide so that out-of-range values load (and are dropped) instead of failing
    #[serde(default)]
    pub color_override: Option<i64>,
}

/// A composite as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeRecord {
    pub name: String,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default, rename = "loop")]
    pub looping: bool,
    #[serde(default)]
    pub layers: Vec<BindingRecord>,
}

impl From<BindingRecord> for LayerBinding {
    fn from(record: BindingRecord) -> Self {
        LayerBinding::new(record.timeline_name)
            .with_visible(record.visible)
            .with_end_behavior(record.end_behavior)
            .with_color_override(record.color_override.and_then(|c| u8::try_from(c).ok()))
    }
}

impl From<CompositeRecord> for Compositor {
    fn from(record: CompositeRecord) -> Self {
        let layers = record.layers.into_iter().map(LayerBinding::from).collect();
        Compositor::from_parts(record.name, record.fps, record.looping, layers)
    }
}

impl From<Compositor> for CompositeRecord {
    fn from(composite: Compositor) -> Self {
        CompositeRecord {
            fps: composite.fps,
            looping: composite.looping,
            layers: composite
                .layers()
                .iter()
                .map(|b| BindingRecord {
                    timeline_name: b.timeline.clone(),
                    visible: b.visible,
                    end_behavior: b.end_behavior,
                    color_override: b.color_override().map(i64::from),
                })
                .collect(),
            name: composite.name,
        }
    }
}
