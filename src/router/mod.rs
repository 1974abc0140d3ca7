//! Client-side router
//!
//! One navigation runs at a time. A request that arrives while another is
//! in flight (typically during the transition pause) is parked and run
//! right after; only the latest parked request is kept.

pub mod guard;
pub mod routes;

pub use guard::{GuardDecision, NavigationGuard, RejectReason};
pub use routes::{Route, RoutePattern, RouteTable, route_path};

use std::cell::{Cell, RefCell};

use crate::consts::MAX_REDIRECTS;

/// A committed (or candidate) location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Path used for matching
    pub path: String,
    /// Path as requested, query and fragment included
    pub full_path: String,
    /// Route name
    pub name: &'static str,
}

impl Location {
    pub fn new(full_path: &str, name: &'static str) -> Self {
        Self {
            path: route_path(full_path).to_string(),
            full_path: full_path.to_string(),
            name,
        }
    }
}

/// Result of a navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Navigation committed
    Arrived {
        location: Location,
        /// Originally requested path when the guard redirected
        redirected_from: Option<String>,
    },
    /// Already at that location (possibly after a redirect); nothing ran
    Duplicate,
    /// Another navigation is in flight; this one runs after it
    Queued,
    /// Redirect chain did not settle
    RedirectLoop,
    /// No route matched and the table has no fallback
    Unmatched,
}

/// Mounts the handler of a committed route
pub type MountFn<H> = Box<dyn Fn(&Location, &H)>;

/// Router over a route table with handlers of type `H`
pub struct Router<H> {
    routes: RouteTable<H>,
    guard: NavigationGuard,
    mount: Option<MountFn<H>>,
    current: RefCell<Option<Location>>,
    busy: Cell<bool>,
    pending: RefCell<Option<String>>,
}

impl<H> Router<H> {
    pub fn new(routes: RouteTable<H>, guard: NavigationGuard) -> Self {
        Self {
            routes,
            guard,
            mount: None,
            current: RefCell::new(None),
            busy: Cell::new(false),
            pending: RefCell::new(None),
        }
    }

    /// Called with each committed route before the transition ends
    pub fn with_mount(mut self, mount: impl Fn(&Location, &H) + 'static) -> Self {
        self.mount = Some(Box::new(mount));
        self
    }

    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    /// Committed location, `None` before the first navigation
    pub fn current(&self) -> Option<Location> {
        self.current.borrow().clone()
    }

    /// Handler of the committed route
    pub fn current_handler(&self) -> Option<&H> {
        let path = self.current.borrow().as_ref()?.path.clone();
        self.routes.resolve(&path).map(|r| &r.handler)
    }

    /// Navigate to `path`.
    ///
    /// When called during another navigation the request is queued and
    /// `Queued` returned; the active call then reports the final outcome.
    pub async fn navigate(&self, path: &str) -> NavigationOutcome {
        if self.busy.get() {
            log::debug!("Navigation in flight, queueing {}", path);
            *self.pending.borrow_mut() = Some(path.to_string());
            return NavigationOutcome::Queued;
        }

        self.busy.set(true);
        let mut outcome = self.run(path).await;
        loop {
            let next = self.pending.borrow_mut().take();
            let Some(next) = next else {
                break;
            };
            outcome = self.run(&next).await;
        }
        self.busy.set(false);
        outcome
    }

    async fn run(&self, path: &str) -> NavigationOutcome {
        let origin = self.current();
        let mut target = path.to_string();
        let mut redirected_from = None;

        for _ in 0..=MAX_REDIRECTS {
            if origin.as_ref().is_some_and(|o| o.full_path == target) {
                return NavigationOutcome::Duplicate;
            }
            let Some(route) = self.routes.resolve(&target) else {
                log::error!("No route for {}", target);
                return NavigationOutcome::Unmatched;
            };
            let candidate = Location::new(&target, route.name);

            match self.guard.before_each(&candidate, origin.as_ref()).await {
                GuardDecision::Allow => {
                    log::info!("Navigated to {} ({})", candidate.full_path, candidate.name);
                    *self.current.borrow_mut() = Some(candidate.clone());
                    if let Some(mount) = &self.mount {
                        mount(&candidate, &route.handler);
                    }
                    self.guard.after_each();
                    return NavigationOutcome::Arrived {
                        location: candidate,
                        redirected_from,
                    };
                }
                GuardDecision::Redirect { to, .. } => {
                    let Some(redirect) = self.routes.path_of(to) else {
                        log::error!("Redirect target {} has no path", to);
                        return NavigationOutcome::Unmatched;
                    };
                    redirected_from.get_or_insert_with(|| path.to_string());
                    target = redirect.to_string();
                }
            }
        }

        log::error!("Too many redirects navigating to {}", path);
        NavigationOutcome::RedirectLoop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{LEVELS_ROUTE, MENU_ROUTE, NOT_FOUND_ROUTE};
    use crate::scenes::Scene;
    use crate::test_support::Harness;
    use futures::executor::block_on;
    use futures::future::join;

    const NOW: f64 = 5_000_000.0;

    fn game_router(h: &Harness) -> Router<Scene> {
        Router::new(RouteTable::game(), h.build_guard())
    }

    fn arrived_at(outcome: &NavigationOutcome) -> Option<&str> {
        match outcome {
            NavigationOutcome::Arrived { location, .. } => Some(location.full_path.as_str()),
            _ => None,
        }
    }

    #[test]
    fn test_initial_load_has_no_start_signal() {
        let h = Harness::new(NOW);
        let router = game_router(&h);

        let outcome = block_on(router.navigate("/"));
        assert_eq!(arrived_at(&outcome), Some("/"));
        assert_eq!(h.trace(), vec!["signal hyperspace-end".to_string()]);
        assert_eq!(router.current_handler(), Some(&Scene::Menu));
    }

    #[test]
    fn test_transition_order() {
        let h = Harness::new(NOW);
        let router = game_router(&h);
        block_on(router.navigate("/"));

        h.issue_token(NOW);
        let outcome = block_on(router.navigate("/level1"));
        assert_eq!(arrived_at(&outcome), Some("/level1"));
        assert_eq!(
            h.trace(),
            vec![
                "signal hyperspace-end",
                "signal hyperspace-start 900",
                "delay 900",
                "signal hyperspace-end",
            ]
        );
        assert_eq!(router.current().unwrap().name, "FirstLevel");
    }

    #[test]
    fn test_same_path_is_duplicate() {
        let h = Harness::new(NOW);
        let router = game_router(&h);
        block_on(router.navigate("/levels"));
        let before = h.trace();

        assert_eq!(block_on(router.navigate("/levels")), NavigationOutcome::Duplicate);
        assert_eq!(h.trace(), before);
    }

    #[test]
    fn test_deep_link_redirects_to_menu() {
        let h = Harness::new(NOW);
        let router = game_router(&h);

        let outcome = block_on(router.navigate("/level3"));
        assert_eq!(
            outcome,
            NavigationOutcome::Arrived {
                location: Location::new("/", MENU_ROUTE),
                redirected_from: Some("/level3".to_string()),
            }
        );
        assert_eq!(h.trace(), vec!["signal hyperspace-end".to_string()]);
    }

    #[test]
    fn test_locked_level_redirects_to_overview() {
        let h = Harness::new(NOW);
        let router = game_router(&h);
        block_on(router.navigate("/"));

        h.issue_token(NOW);
        let outcome = block_on(router.navigate("/level5"));
        assert_eq!(arrived_at(&outcome), Some("/levels"));
        assert_eq!(router.current().unwrap().name, LEVELS_ROUTE);
    }

    #[test]
    fn test_redirect_to_current_location_stays_put() {
        let h = Harness::new(NOW);
        let router = game_router(&h);
        block_on(router.navigate("/"));
        let before = h.trace();

        assert_eq!(block_on(router.navigate("/level2")), NavigationOutcome::Duplicate);
        assert_eq!(router.current().unwrap().full_path, "/");
        assert_eq!(h.trace(), before);
    }

    #[test]
    fn test_unknown_path_lands_on_not_found() {
        let h = Harness::new(NOW);
        let router = game_router(&h);
        let outcome = block_on(router.navigate("/bogus"));
        assert_eq!(arrived_at(&outcome), Some("/bogus"));
        assert_eq!(router.current().unwrap().name, NOT_FOUND_ROUTE);
        assert_eq!(router.current_handler(), Some(&Scene::NotFound));
    }

    #[test]
    fn test_level_chain_without_tokens() {
        let h = Harness::new(NOW);
        h.complete(&[1, 2]);
        let router = game_router(&h);
        block_on(router.navigate("/"));

        h.issue_token(NOW);
        assert_eq!(arrived_at(&block_on(router.navigate("/level1"))), Some("/level1"));
        // Level to level rides on the frontier alone
        assert_eq!(arrived_at(&block_on(router.navigate("/level2"))), Some("/level2"));
        assert_eq!(arrived_at(&block_on(router.navigate("/level4"))), Some("/level4"));
        assert_eq!(arrived_at(&block_on(router.navigate("/level6"))), Some("/levels"));
    }

    #[test]
    fn test_request_during_navigation_is_queued() {
        let h = Harness::new(NOW);
        let router = game_router(&h);
        block_on(router.navigate("/"));

        let (first, second) = block_on(join(router.navigate("/levels"), router.navigate("/level0")));
        assert_eq!(second, NavigationOutcome::Queued);
        assert_eq!(arrived_at(&first), Some("/level0"));
        assert_eq!(router.current().unwrap().name, "Level0");
        // Nothing left in flight
        assert_eq!(arrived_at(&block_on(router.navigate("/levels"))), Some("/levels"));
    }

    #[test]
    fn test_redirect_loop_is_abandoned() {
        let h = Harness::new(NOW);
        // Menu itself points at a gated level, so every redirect loops
        let routes = RouteTable::new()
            .route("/level1", "Menu", ())
            .route("/start", "Start", ());
        let router = Router::new(routes, h.build_guard());
        block_on(router.navigate("/start"));

        assert_eq!(block_on(router.navigate("/level1")), NavigationOutcome::RedirectLoop);
        assert_eq!(router.current().unwrap().full_path, "/start");
    }

    #[test]
    fn test_redirect_target_without_path_is_unmatched() {
        let h = Harness::new(NOW);
        // No route named Menu to fall back to
        let routes = RouteTable::new()
            .route("/start", "Start", ())
            .route("/level1", "FirstLevel", ());
        let router = Router::new(routes, h.build_guard());
        block_on(router.navigate("/start"));

        assert_eq!(block_on(router.navigate("/level1")), NavigationOutcome::Unmatched);
        assert_eq!(router.current().unwrap().full_path, "/start");
    }

    #[test]
    fn test_mount_runs_before_transition_ends() {
        let h = Harness::new(NOW);
        let trace = h.trace_handle();
        let router = game_router(&h).with_mount(move |location, scene| {
            trace
                .borrow_mut()
                .push(format!("mount {} {}", location.full_path, scene.title()));
        });
        block_on(router.navigate("/"));
        block_on(router.navigate("/levels"));

        assert_eq!(
            h.trace(),
            vec![
                "mount / Hyperspace",
                "signal hyperspace-end",
                "signal hyperspace-start 900",
                "delay 900",
                "mount /levels Levels",
                "signal hyperspace-end",
            ]
        );
    }
}
