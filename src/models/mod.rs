//! On-disk shapes for timelines, composites and figures
//!
//! Runtime types serialize through these records so that older field names
//! and legacy layouts keep loading while output always uses the current shape.

mod composite;
mod figure;
mod timeline;

pub use composite::{BindingRecord, CompositeRecord};
pub use figure::FigureRecord;
pub use timeline::{FrameRecord, LayerRecord, TimelineRecord, TrackFrameRecord, TrackRecord};

/// A non-fatal problem found while decoding input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
