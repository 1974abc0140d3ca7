//! Hyperspace Levels entry point
//!
//! Wires the router to the browser (history, storage, window events) and
//! mounts a placeholder screen for each scene.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{Element, MouseEvent};

    use hyperspace_levels::consts::MAX_LEVEL;
    use hyperspace_levels::platform::{
        KeyValueStore, MemoryStore, TimerDelay, WebClock, WebStorage, WindowSignals,
    };
    use hyperspace_levels::{
        NavTokenStore, NavigationGuard, NavigationOutcome, ProgressStore, RouteTable, Router,
        Scene, Settings, StorageError,
    };

    /// How a committed navigation is written to the history stack
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum HistoryMode {
        Push,
        Replace,
    }

    /// Application state shared by the event handlers
    struct App {
        router: Router<Scene>,
        progress: ProgressStore,
        tokens: NavTokenStore,
        local: Rc<dyn KeyValueStore>,
    }

    /// Browser storage, or a store that refuses everything so the guard
    /// keeps levels closed
    fn open_store(
        area: &str,
        open: fn() -> Result<WebStorage, StorageError>,
    ) -> Rc<dyn KeyValueStore> {
        match open() {
            Ok(storage) => Rc::new(storage),
            Err(e) => {
                log::warn!("{} unavailable: {}", area, e);
                let store = MemoryStore::new();
                store.set_failing(true);
                Rc::new(store)
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Hyperspace starting...");

        let local = open_store("localStorage", WebStorage::local);
        let session = open_store("sessionStorage", WebStorage::session);
        let settings = Settings::load(local.as_ref());

        let progress = ProgressStore::new(local.clone());
        let tokens = NavTokenStore::new(session);
        let guard = NavigationGuard::new(
            progress.clone(),
            tokens.clone(),
            Rc::new(WebClock),
            Rc::new(TimerDelay),
            Rc::new(WindowSignals),
        )
        .with_settings(settings);

        let router = Router::new(RouteTable::game(), guard).with_mount({
            let progress = progress.clone();
            move |_location, scene| mount_scene(&progress, *scene)
        });
        let app = Rc::new(App {
            router,
            progress,
            tokens,
            local,
        });

        setup_click_handler(app.clone());
        setup_popstate(app.clone());

        let start = browser_path();
        navigate(app, start, HistoryMode::Replace).await;

        log::info!("Hyperspace running!");
    }

    /// Path, query and fragment of the address bar
    fn browser_path() -> String {
        let Some(window) = web_sys::window() else {
            return "/".to_string();
        };
        let location = window.location();
        format!(
            "{}{}{}",
            location.pathname().unwrap_or_else(|_| "/".to_string()),
            location.search().unwrap_or_default(),
            location.hash().unwrap_or_default()
        )
    }

    fn write_history(full_path: &str, mode: HistoryMode) {
        let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
            return;
        };
        let result = match mode {
            HistoryMode::Push => history.push_state_with_url(&JsValue::NULL, "", Some(full_path)),
            HistoryMode::Replace => {
                history.replace_state_with_url(&JsValue::NULL, "", Some(full_path))
            }
        };
        if let Err(e) = result {
            log::warn!("History update failed: {:?}", e);
        }
    }

    async fn navigate(app: Rc<App>, path: String, mode: HistoryMode) {
        match app.router.navigate(&path).await {
            NavigationOutcome::Arrived {
                location,
                redirected_from,
            } => {
                if let Some(from) = redirected_from {
                    log::info!("{} redirected to {}", from, location.full_path);
                }
                // The committed path goes in the address bar, never a blocked one
                write_history(&location.full_path, mode);
            }
            NavigationOutcome::Duplicate => {
                // Back/forward onto a blocked level: put the address bar back
                if let Some(current) = app.router.current() {
                    if browser_path() != current.full_path {
                        write_history(&current.full_path, HistoryMode::Replace);
                    }
                }
            }
            NavigationOutcome::Queued => {}
            NavigationOutcome::RedirectLoop | NavigationOutcome::Unmatched => {
                log::error!("Navigation to {} failed", path);
            }
        }
    }

    fn button(attr: &str, value: &str, label: &str) -> String {
        format!(r#"<button {}="{}">{}</button>"#, attr, value, label)
    }

    fn scene_html(progress: &ProgressStore, scene: Scene) -> String {
        let mut html = format!("<h1>{}</h1>", scene.title());
        match scene {
            Scene::Menu => {
                html.push_str(&button("data-advance", "/level1", "Play"));
                html.push_str(&button("data-href", "/level0", "Tutorial"));
                html.push_str(&button("data-href", "/levels", "Levels"));
                html.push_str(&button("data-toggle-motion", "", "Toggle reduced motion"));
            }
            Scene::Level(n) => {
                if n > 0 {
                    html.push_str(&button("data-complete", &n.to_string(), "Complete"));
                }
                if let Some(next) = scene.next_level_path() {
                    html.push_str(&button("data-advance", &next, "Next level"));
                }
                html.push_str(&button("data-href", "/levels", "Levels"));
            }
            Scene::LevelSelect => {
                let frontier = match progress.completed() {
                    Ok(completed) => completed.unlock_frontier(),
                    Err(e) => {
                        log::warn!("Progress unavailable: {}", e);
                        0
                    }
                };
                html.push_str("<ul>");
                for n in 0..=MAX_LEVEL {
                    let label = Scene::Level(n).title();
                    if n <= frontier {
                        let path = format!("/level{}", n);
                        html.push_str(&format!("<li>{}</li>", button("data-advance", &path, &label)));
                    } else {
                        html.push_str(&format!("<li class=\"locked\">{}</li>", label));
                    }
                }
                html.push_str("</ul>");
                html.push_str(&button("data-href", "/", "Menu"));
            }
            Scene::NotFound => {
                html.push_str(&button("data-href", "/", "Back to menu"));
            }
        }
        html
    }

    /// Mount a scene into `#app`; runs before the transition ends
    fn mount_scene(progress: &ProgressStore, scene: Scene) {
        let Some(root) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("app"))
        else {
            log::error!("No #app element to mount into");
            return;
        };
        root.set_inner_html(&scene_html(progress, scene));
    }

    fn setup_click_handler(app: Rc<App>) {
        let document = web_sys::window().unwrap().document().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let Some(target) = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| {
                    el.closest("[data-href],[data-advance],[data-complete],[data-toggle-motion]")
                        .ok()
                        .flatten()
                })
            else {
                return;
            };
            event.prevent_default();

            if target.has_attribute("data-toggle-motion") {
                let guard = app.router.guard();
                let mut settings = guard.settings();
                let reduced = settings.toggle_reduced_motion();
                if let Err(e) = settings.save(app.local.as_ref()) {
                    log::warn!("Could not save settings: {}", e);
                }
                guard.set_settings(settings);
                let _ = target.set_attribute("aria-pressed", if reduced { "true" } else { "false" });
                log::info!("Reduced motion: {}", reduced);
                return;
            }

            if let Some(level) = target.get_attribute("data-complete") {
                match level.parse::<u32>() {
                    Ok(level) => {
                        if let Err(e) = app.progress.mark_completed(level) {
                            log::warn!("Could not record level {}: {}", level, e);
                        }
                    }
                    Err(_) => log::warn!("Bad data-complete value {:?}", level),
                }
                return;
            }

            let path = if let Some(path) = target.get_attribute("data-advance") {
                if let Err(e) = app.tokens.issue(js_sys::Date::now()) {
                    log::warn!("Could not issue navigation token: {}", e);
                }
                path
            } else if let Some(path) = target.get_attribute("data-href") {
                path
            } else {
                return;
            };

            wasm_bindgen_futures::spawn_local(navigate(app.clone(), path, HistoryMode::Push));
        });
        let _ = document.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_popstate(app: Rc<App>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            wasm_bindgen_futures::spawn_local(navigate(
                app.clone(),
                browser_path(),
                HistoryMode::Replace,
            ));
        });
        let _ = window.add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Hyperspace (native) starting...");
    log::info!("Native mode has no screens - run with `trunk serve` for the web version");

    println!("\nTouring the level gate...");
    futures::executor::block_on(tour());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Walk through the gate with in-memory storage and print what happens
#[cfg(not(target_arch = "wasm32"))]
async fn tour() {
    use std::rc::Rc;

    use hyperspace_levels::platform::{Clock, LogSignals, MemoryStore, SystemClock, ThreadDelay};
    use hyperspace_levels::{
        NavTokenStore, NavigationGuard, NavigationOutcome, ProgressStore, RouteTable, Router,
        Settings,
    };

    let local = Rc::new(MemoryStore::new());
    let progress = ProgressStore::new(local.clone());
    let tokens = NavTokenStore::new(Rc::new(MemoryStore::new()));
    let guard = NavigationGuard::new(
        progress.clone(),
        tokens.clone(),
        Rc::new(SystemClock),
        Rc::new(ThreadDelay),
        Rc::new(LogSignals),
    )
    .with_settings(Settings::load(local.as_ref()));
    let router = Router::new(RouteTable::game(), guard)
        .with_mount(|location, scene| println!("  mounted {} ({})", scene.title(), location.name));

    // (path, issue a token first, level to complete on arrival)
    let steps: [(&str, bool, Option<u32>); 7] = [
        ("/", false, None),
        ("/level3", false, None),
        ("/level1", true, Some(1)),
        ("/level2", false, Some(2)),
        ("/level5", true, None),
        ("/level3", true, None),
        ("/bogus", false, None),
    ];

    for (path, advance, complete) in steps {
        if advance {
            if let Err(e) = tokens.issue(SystemClock.now_ms()) {
                log::warn!("Could not issue navigation token: {}", e);
            }
        }
        let outcome = router.navigate(path).await;
        match &outcome {
            NavigationOutcome::Arrived {
                location,
                redirected_from: Some(from),
            } => println!("  {:<8} -> redirected to {}", from, location.full_path),
            NavigationOutcome::Arrived { location, .. } => {
                println!("  {:<8} -> {} ({})", path, location.full_path, location.name)
            }
            other => println!("  {:<8} -> {:?}", path, other),
        }
        if let Some(level) = complete {
            if let Err(e) = progress.mark_completed(level) {
                log::warn!("Could not record level {}: {}", level, e);
            }
        }
    }
    println!("✓ Tour finished");
}
