//! Static route table
//!
//! Literal paths are matched in declaration order; a catch-all entry
//! matches anything that got past the literals.

use crate::consts::{LEVELS_ROUTE, MENU_ROUTE, NOT_FOUND_ROUTE};
use crate::scenes::Scene;

/// How a route matches a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutePattern {
    Literal(&'static str),
    CatchAll,
}

impl RoutePattern {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            RoutePattern::Literal(literal) => *literal == path,
            RoutePattern::CatchAll => true,
        }
    }
}

/// A route entry
#[derive(Debug, Clone)]
pub struct Route<H> {
    pub pattern: RoutePattern,
    pub name: &'static str,
    pub handler: H,
}

/// Ordered route entries
#[derive(Debug, Clone)]
pub struct RouteTable<H> {
    routes: Vec<Route<H>>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Add a literal route
    pub fn route(mut self, path: &'static str, name: &'static str, handler: H) -> Self {
        self.routes.push(Route {
            pattern: RoutePattern::Literal(path),
            name,
            handler,
        });
        self
    }

    /// Add a catch-all route
    pub fn fallback(mut self, name: &'static str, handler: H) -> Self {
        self.routes.push(Route {
            pattern: RoutePattern::CatchAll,
            name,
            handler,
        });
        self
    }

    /// First route matching `path` (query and fragment ignored)
    pub fn resolve(&self, path: &str) -> Option<&Route<H>> {
        let path = route_path(path);
        self.routes.iter().find(|r| r.pattern.matches(path))
    }

    /// Literal path of a named route
    pub fn path_of(&self, name: &str) -> Option<&'static str> {
        self.routes
            .iter()
            .filter(|r| r.name == name)
            .find_map(|r| match r.pattern {
                RoutePattern::Literal(path) => Some(path),
                RoutePattern::CatchAll => None,
            })
    }
}

impl RouteTable<Scene> {
    /// The game's routes
    pub fn game() -> Self {
        RouteTable::new()
            .route("/", MENU_ROUTE, Scene::Menu)
            .route("/level0", "Level0", Scene::Level(0))
            .route("/level1", "FirstLevel", Scene::Level(1))
            .route("/level2", "SecondLevel", Scene::Level(2))
            .route("/level3", "ThirdLevel", Scene::Level(3))
            .route("/level4", "FourthLevel", Scene::Level(4))
            .route("/level5", "FifthLevel", Scene::Level(5))
            .route("/level6", "SixthLevel", Scene::Level(6))
            .route("/level7", "SeventhLevel", Scene::Level(7))
            .route("/level8", "EighthLevel", Scene::Level(8))
            .route("/levels", LEVELS_ROUTE, Scene::LevelSelect)
            .fallback(NOT_FOUND_ROUTE, Scene::NotFound)
    }
}

/// Path part of a location: no query, no fragment, no trailing slash
pub fn route_path(full_path: &str) -> &str {
    let end = full_path.find(['?', '#']).unwrap_or(full_path.len());
    let path = &full_path[..end];
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}
