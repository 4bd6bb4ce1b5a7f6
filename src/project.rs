//! Project files
//!
//! A project bundles the 64 GRAM cards with the timelines, composites and
//! figures that use them. Projects are stored as pretty-printed JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::catalog::CardCatalog;
use crate::composite::Compositor;
use crate::figure::DisplayFigure;
use crate::lookup::{CardStore, GramSlots};
use crate::registry::Registry;
use crate::timeline::Timeline;

/// Error type for project I/O.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Failed to access project file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid project JSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_version() -> String {
    "1.0".to_string()
}

/// A saved project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, rename = "cards", alias = "gram")]
    pub gram: GramSlots,
    #[serde(default, alias = "animations")]
    pub timelines: Vec<Timeline>,
    #[serde(default)]
    pub composites: Vec<Compositor>,
    #[serde(default, alias = "stic_figures")]
    pub figures: Vec<DisplayFigure>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            author: String::new(),
            description: String::new(),
            version: default_version(),
            gram: GramSlots::new(),
            timelines: Vec::new(),
            composites: Vec::new(),
            figures: Vec::new(),
        }
    }

    /// Parse a project from JSON text.
    pub fn from_json(text: &str) -> Result<Self, ProjectError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        let project = Self::from_json(&fs::read_to_string(path)?)?;
        log::debug!(
            "loaded project '{}': {} cards, {} timelines, {} composites, {} figures",
            project.name,
            project.gram.card_count(),
            project.timelines.len(),
            project.composites.len(),
            project.figures.len()
        );
        Ok(project)
    }

    /// Write the project, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ProjectError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn timeline(&self, name: &str) -> Option<&Timeline> {
        Registry::get(self.timelines.as_slice(), name)
    }

    pub fn timeline_mut(&mut self, name: &str) -> Option<&mut Timeline> {
        self.timelines.iter_mut().find(|t| t.name == name)
    }

    pub fn composite(&self, name: &str) -> Option<&Compositor> {
        self.composites.iter().find(|c| c.name == name)
    }

    pub fn figure(&self, name: &str) -> Option<&DisplayFigure> {
        self.figures.iter().find(|f| f.name == name)
    }

    pub fn figure_mut(&mut self, name: &str) -> Option<&mut DisplayFigure> {
        self.figures.iter_mut().find(|f| f.name == name)
    }

    /// Card lookup over `catalog` and this project's GRAM.
    pub fn card_store<'a>(&'a self, catalog: &'a CardCatalog) -> CardStore<'a> {
        CardStore::new(catalog, &self.gram)
    }
}

impl Registry<Timeline> for Project {
    fn get(&self, name: &str) -> Option<&Timeline> {
        self.timeline(name)
    }

    fn len(&self) -> usize {
        self.timelines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::BitCard;
    use crate::composite::LayerBinding;
    use crate::lookup::{CardLookup, GramCard};
    use crate::timeline::Frame;
    use tempfile::TempDir;

    fn sample() -> Project {
        let mut project = Project::new("demo");
        project.author = "someone".to_string();
        project.gram.set(2, GramCard::new(BitCard::from_rows([0x3C; 8])).with_color(4)).unwrap();
        project.timelines.push(Timeline::new("walk").with_frames([Frame::with_card(258, 3)]));
        let mut composite = Compositor::new("scene");
        composite.add_layer(LayerBinding::new("walk"));
        project.composites.push(composite);
        project.figures.push(DisplayFigure::new("title"));
        project
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("demo.json");
        let project = sample();
        project.save(&path).unwrap();
        let loaded = Project::load(&path).unwrap();
        assert_eq!(loaded, project);
        assert_eq!(loaded.gram.get(2).unwrap().unwrap().color, 4);
    }

    #[test]
    fn test_lookups() {
        let mut project = sample();
        assert!(project.timeline("walk").is_some());
        assert!(project.composite("scene").is_some());
        assert!(project.figure("title").is_some());
        assert!(project.figure("missing").is_none());
        assert!(Registry::<Timeline>::contains(&project, "walk"));

        project.timeline_mut("walk").unwrap().looping = true;
        assert!(project.timeline("walk").unwrap().looping);
    }

    #[test]
    fn test_card_store_uses_project_gram() {
        let project = sample();
        let catalog = CardCatalog::new();
        let store = project.card_store(&catalog);
        assert_eq!(store.get_card(258).to_bytes(), [0x3C; 8]);
        assert_eq!(store.get_color(258), 4);
    }

    #[test]
    fn test_legacy_project_shape() {
        let json = r#"{
            "name": "old",
            "cards": [null, {"label": "ball", "data": [60, 126, 255, 255, 255, 255, 126, 60], "color": 2}],
            "animations": [{"name": "bounce", "frames": [{"card_slot": 1, "duration": 4}]}]
        }"#;
        let project = Project::from_json(json).unwrap();
        assert_eq!(project.version, "1.0");
        assert_eq!(project.gram.card_count(), 1);
        let bounce = project.timeline("bounce").unwrap();
        assert_eq!(bounce.total_duration(), 4);
        let card = bounce.resolve(0, None)[0].card_index;
        assert_eq!(card, 257);
        let catalog = CardCatalog::new();
        let store = project.card_store(&catalog);
        assert_eq!(store.get_card(card).to_bytes(), [60, 126, 255, 255, 255, 255, 126, 60]);
        assert_eq!(store.get_color(card), 2);
    }

    #[test]
    fn test_load_errors() {
        let temp = TempDir::new().unwrap();
        let missing = Project::load(&temp.path().join("none.json"));
        assert!(matches!(missing, Err(ProjectError::Io(_))));
        assert!(matches!(Project::from_json("{"), Err(ProjectError::Json(_))));
    }
}
