//! Scenes attached to routes
//!
//! The level content itself lives outside this crate; a scene only says
//! which screen to mount.

use crate::consts::MAX_LEVEL;

/// Screen mounted for a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    /// Title screen
    Menu,
    /// A playable level (0 is the tutorial)
    Level(u32),
    /// Level-select overview
    LevelSelect,
    /// Unknown path
    NotFound,
}

impl Scene {
    pub fn title(&self) -> String {
        match self {
            Scene::Menu => "Hyperspace".to_string(),
            Scene::Level(0) => "Tutorial".to_string(),
            Scene::Level(n) => format!("Level {}", n),
            Scene::LevelSelect => "Levels".to_string(),
            Scene::NotFound => "Lost in space".to_string(),
        }
    }

    /// Path of the level played after this one, if any
    pub fn next_level_path(&self) -> Option<String> {
        match self {
            Scene::Level(n) if *n < MAX_LEVEL => Some(format!("/level{}", n + 1)),
            _ => None,
        }
    }
}
