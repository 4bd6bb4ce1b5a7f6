//! sticsmith - Intellivision graphics engine
//!
//! This library provides:
//! - 8×8 card bitmaps and a lenient decoder for card catalog files
//! - Multi-layer frame timelines and composites of several timelines
//! - Full-screen STIC figures rendered with color-stack or fg/bg rules
//! - Project files, `stic.toml` configuration and PNG export

pub mod card;
pub mod catalog;
pub mod cli;
pub mod composite;
pub mod config;
pub mod figure;
pub mod lookup;
pub mod models;
pub mod output;
pub mod palette;
pub mod project;
pub mod registry;
pub mod timeline;
