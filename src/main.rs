//! Portfolio Gate entry point
//!
//! Wires the gate, host and particle fields to the page and runs the frame
//! loop. Natively it runs a short headless session instead.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_site {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, HtmlInputElement};

    use portfolio_gate::consts::VICTORY_CANVAS_SIZE;
    use portfolio_gate::pages::{self, Page};
    use portfolio_gate::platform::{self, FrameLoop};
    use portfolio_gate::renderer::{self, CanvasSurface};
    use portfolio_gate::sim::{
        AuthMode, EnemyState, FrameClock, GateEvent, GateHost, GateSession, ParticleField,
        Phase, ProjectileState, Theme, ThemeCycle,
    };
    use portfolio_gate::{PlatformError, Settings};

    thread_local! {
        static FRAME_LOOP: RefCell<Option<FrameLoop>> = const { RefCell::new(None) };
        static SITE: RefCell<Option<Rc<RefCell<Site>>>> = const { RefCell::new(None) };
    }

    /// Everything the page drives
    struct Site {
        document: Document,
        settings: Settings,
        host: GateHost<Page>,
        clock: FrameClock,
        rng: Pcg32,
        viewport: (f32, f32),

        background: ParticleField,
        background_surface: CanvasSurface,
        page_field: ParticleField,
        page_surface: CanvasSurface,
        victory_surface: CanvasSurface,
        theme: Option<ThemeCycle>,

        input: HtmlInputElement,
        content: HtmlElement,
    }

    impl Site {
        fn new(document: Document, settings: Settings, now: f64, seed: u64) -> Result<Self, PlatformError> {
            let canvas = |id: &str| -> Result<CanvasSurface, PlatformError> {
                CanvasSurface::new(platform::element_by_id::<HtmlCanvasElement>(&document, id)?)
            };
            let mut background_surface = canvas("bg-canvas")?;
            let mut page_surface = canvas("page-canvas")?;
            let mut victory_surface = canvas("victory-canvas")?;
            let input = platform::element_by_id::<HtmlInputElement>(&document, "auth-input")?;
            let content = platform::element_by_id::<HtmlElement>(&document, "content")?;

            let viewport = platform::viewport_size();
            background_surface.resize(viewport.0, viewport.1);
            page_surface.resize(viewport.0, viewport.1);
            victory_surface.resize(VICTORY_CANVAS_SIZE, VICTORY_CANVAS_SIZE);

            let page = document
                .location()
                .and_then(|l| l.pathname().ok())
                .and_then(|path| Page::from_path(&path))
                .unwrap_or_default();

            let mut rng = Pcg32::seed_from_u64(seed);
            let mut background_config = pages::background_config();
            settings.apply(&mut background_config);
            let background = ParticleField::new(background_config, viewport.0, viewport.1, rng.random());
            let host = GateHost::new(page, now, rng.random());

            let mut site = Self {
                document,
                settings,
                host,
                clock: FrameClock::new(),
                rng,
                viewport,
                background,
                background_surface,
                page_field: ParticleField::new(Default::default(), 0.0, 0.0, 0),
                page_surface,
                victory_surface,
                theme: None,
                input,
                content,
            };
            site.show_page(page, now, false);
            Ok(site)
        }

        fn field_for(&mut self, page: Page) -> ParticleField {
            let config = self.settings.page_config(page, self.viewport.0);
            ParticleField::new(config, self.viewport.0, self.viewport.1, self.rng.random())
        }

        fn show_page(&mut self, page: Page, now: f64, push_history: bool) {
            self.page_field = self.field_for(page);
            self.theme = (page == Page::Home).then(|| ThemeCycle::new(now, self.settings.reduced_motion));
            for p in Page::ALL {
                platform::set_class(&self.document, p.section_id(), "hidden", p != page);
            }
            if push_history {
                if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
                    let _ = history.push_state_with_url(&JsValue::NULL, "", Some(page.path()));
                }
            }
            log::info!("Showing {:?}", page);
        }

        fn apply_theme(&mut self, theme: Theme) {
            theme.apply(&mut self.page_field);
            if !self.settings.trails {
                let config = self.page_field.config();
                let (tint, link_color) = (config.tint, config.link_color);
                self.page_field.set_style(tint, link_color, None);
            }
        }

        /// A hidden tab gets no frames; restart the step clock on return
        fn visibility_changed(&mut self) {
            if !self.document.hidden() {
                self.clock.reset();
                log::debug!("Frame clock reset after resume");
            }
        }

        fn resize(&mut self) {
            let (w, h) = platform::viewport_size();
            if (w, h) == self.viewport {
                return;
            }
            self.viewport = (w, h);
            self.background.resize(w, h);
            self.page_field.resize(w, h);
            self.background_surface.resize(w, h);
            self.page_surface.resize(w, h);
            log::debug!("Viewport {}x{}", w, h);
        }

        fn frame(&mut self, now: f64) {
            if let Some(page) = self.host.advance(now) {
                self.show_page(page, now, true);
            }

            for _ in 0..self.clock.steps(now) {
                self.background.step();
                self.page_field.step();
                if let Some(gate) = self.host.gate_mut() {
                    gate.animate();
                }
            }
            if let Some(theme) = self.theme.as_mut().and_then(|t| t.advance(now)) {
                self.apply_theme(theme);
            }

            renderer::draw_field(&self.background, &mut self.background_surface);
            renderer::draw_field(&self.page_field, &mut self.page_surface);
            if let Some(scene) = self.host.gate().and_then(|g| g.victory()) {
                renderer::draw_victory(scene, &mut self.victory_surface);
            }
            self.sync_dom();
        }

        /// Reflect gate and theme state in the page
        fn sync_dom(&self) {
            let doc = &self.document;
            let treatment = self.host.treatment();
            let style = self.content.style();
            let _ = style.set_property("filter", &treatment.filter_css());
            let _ = style.set_property("transform", &treatment.transform_css());
            let _ = style.set_property("opacity", &treatment.opacity.to_string());
            platform::set_class(doc, "gate", "hidden", !self.host.is_locked());

            if let Some(gate) = self.host.gate() {
                let phase = gate.phase();
                platform::set_class(doc, "gate-auth", "hidden", phase != Phase::Auth);
                platform::set_class(doc, "gate-battle", "hidden", phase != Phase::Battle);
                platform::set_class(doc, "gate-victory", "hidden", phase != Phase::Victory);

                let mode = gate.auth_mode();
                platform::set_class(doc, "mode-math", "active", mode == AuthMode::MathChallenge);
                platform::set_class(doc, "mode-knowledge", "active", mode == AuthMode::KnowledgeChallenge);
                platform::set_text(doc, "auth-mode-label", mode.label());
                platform::set_text(doc, "challenge-prompt", &gate.challenge().prompt());
                platform::set_text(doc, "challenge-hint", gate.challenge().hint().unwrap_or(""));
                self.input.set_placeholder(mode.placeholder());
                if self.input.value() != gate.input() {
                    self.input.set_value(gate.input());
                }
                platform::set_class(doc, "auth-panel", "error", gate.error_flag());
                platform::set_class(doc, "auth-bypass", "loading", gate.bypass_pending());

                let battle = gate.battle();
                platform::set_class(doc, "projectile", "flying", battle.projectile == ProjectileState::Flying);
                platform::set_class(doc, "projectile", "impact", battle.projectile == ProjectileState::Impact);
                platform::set_class(doc, "enemy", "shattering", battle.enemy == EnemyState::Shattering);
                platform::set_class(doc, "enemy", "dead", battle.enemy == EnemyState::Dead);
            }

            if let Some(theme) = &self.theme {
                platform::set_text(doc, "theme-name", theme.current().name);
                platform::set_class(doc, "page-home", "glitch", theme.glitch());
                if let Some(bar) = doc.get_element_by_id("theme-progress") {
                    let _ = bar.set_attribute("style", &format!("width: {:.1}%", theme.progress() * 100.0));
                }
            }
        }

        fn log_events(events: &[GateEvent]) {
            for event in events {
                log::debug!("Gate event: {:?}", event);
            }
        }
    }

    /// Attach `handler` to `event` on `target`
    fn listen<E: wasm_bindgen::convert::FromWasmAbi + 'static>(
        target: &web_sys::EventTarget,
        event: &str,
        site: &Rc<RefCell<Site>>,
        handler: impl Fn(&mut Site, E) + 'static,
    ) {
        let site = site.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |e: E| {
            handler(&mut site.borrow_mut(), e);
        });
        let _ = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn listen_click(document: &Document, id: &str, site: &Rc<RefCell<Site>>, handler: impl Fn(&mut Site) + 'static) {
        if let Some(el) = document.get_element_by_id(id) {
            listen(&el, "click", site, move |s, _e: web_sys::MouseEvent| handler(s));
        } else {
            log::warn!("#{} not found, control disabled", id);
        }
    }

    /// Click handler running one gate operation
    fn gate_op(op: fn(&mut GateSession) -> Vec<GateEvent>) -> impl Fn(&mut Site) + 'static {
        move |s: &mut Site| {
            if let Some(gate) = s.host.gate_mut() {
                Site::log_events(&op(gate));
            }
        }
    }

    fn setup_gate_controls(document: &Document, site: &Rc<RefCell<Site>>) {
        listen_click(document, "auth-submit", site, gate_op(|g| g.submit()));
        listen_click(document, "auth-bypass", site, gate_op(|g| g.bypass()));
        listen_click(document, "fire-btn", site, gate_op(|g| g.fire()));
        listen_click(document, "mode-math", site, gate_op(|g| g.set_auth_mode(AuthMode::MathChallenge)));
        listen_click(
            document,
            "mode-knowledge",
            site,
            gate_op(|g| g.set_auth_mode(AuthMode::KnowledgeChallenge)),
        );

        let input: Element = site.borrow().input.clone().into();
        listen(&input, "input", site, |s, _e: web_sys::Event| {
            let value = s.input.value();
            if let Some(gate) = s.host.gate_mut() {
                gate.set_input(&value);
            }
        });
        listen(&input, "keydown", site, |s, e: web_sys::KeyboardEvent| {
            if e.key() == "Enter" {
                e.prevent_default();
                if let Some(gate) = s.host.gate_mut() {
                    Site::log_events(&gate.submit());
                }
            }
        });
    }

    fn setup_navigation(document: &Document, site: &Rc<RefCell<Site>>) {
        let Ok(links) = document.query_selector_all("[data-page]") else {
            return;
        };
        for i in 0..links.length() {
            let Some(link) = links.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let Some(page) = link.get_attribute("data-page").and_then(|p| Page::from_path(&p)) else {
                continue;
            };
            listen(&link, "click", site, move |s, e: web_sys::MouseEvent| {
                e.prevent_default();
                s.host.request_navigation(page, platform::now_ms());
            });
        }
    }

    pub fn run() -> Result<(), PlatformError> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Portfolio gate starting...");

        let window = platform::window()?;
        let document = platform::document()?;
        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let site = Rc::new(RefCell::new(Site::new(document.clone(), settings, platform::now_ms(), seed)?));
        log::info!("Site initialized with seed: {}", seed);

        setup_gate_controls(&document, &site);
        setup_navigation(&document, &site);
        listen(&window, "resize", &site, |s, _e: web_sys::Event| s.resize());
        listen(&document, "visibilitychange", &site, |s, _e: web_sys::Event| {
            s.visibility_changed()
        });

        let frame_site = site.clone();
        let frame_loop = FrameLoop::start(move |time| frame_site.borrow_mut().frame(time))?;
        FRAME_LOOP.with(|f| *f.borrow_mut() = Some(frame_loop));
        SITE.with(|s| *s.borrow_mut() = Some(site));

        log::info!("Portfolio gate running!");
        Ok(())
    }

    /// Stop the frame loop and cancel every pending gate transition
    pub fn shutdown() {
        FRAME_LOOP.with(|f| f.borrow_mut().take());
        if let Some(site) = SITE.with(|s| s.borrow_mut().take()) {
            site.borrow_mut().host.teardown();
        }
        log::info!("Portfolio gate stopped");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_site::run() {
        log::error!("Startup failed: {}", e);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn shutdown() {
    wasm_site::shutdown();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Portfolio gate (native) starting...");
    log::info!("Native mode runs headless - build for wasm32 to serve the site");

    println!("\nRunning headless gate session...");
    headless_session();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Solve the gate, win the battle and follow one navigation, drawing every
/// page field into a recording surface along the way
#[cfg(not(target_arch = "wasm32"))]
fn headless_session() {
    use portfolio_gate::consts::STEP_MS;
    use portfolio_gate::platform::HEADLESS_VIEWPORT;
    use portfolio_gate::renderer::{DrawCmd, DrawList, draw_field, draw_victory};
    use portfolio_gate::sim::{FrameClock, GateHost, ParticleField, Phase, ThemeCycle};
    use portfolio_gate::{Page, Settings};

    let settings = Settings::load();
    let (w, h) = HEADLESS_VIEWPORT;
    let mut host = GateHost::new(Page::Home, 0.0, 42);
    let mut clock = FrameClock::new();
    let mut theme = ThemeCycle::new(0.0, settings.reduced_motion);
    let mut surface = DrawList::new(w, h);

    let mut field = ParticleField::new(settings.page_config(Page::Home, w), w, h, 7);

    host.request_navigation(Page::Projects, 0.0);
    if let Some(gate) = host.gate_mut() {
        let answer = gate.challenge().answer();
        println!("  challenge: {} = {}", gate.challenge().prompt(), answer);
        gate.set_input(&answer);
        gate.submit();
        gate.fire();
    }

    let mut now = 0.0;
    let mut destination = None;
    let mut last_phase = None;
    while destination.is_none() && now < 10_000.0 {
        now += STEP_MS;
        destination = host.advance(now);
        for _ in 0..clock.steps(now) {
            field.step();
            if let Some(gate) = host.gate_mut() {
                gate.animate();
            }
        }
        if let Some(t) = theme.advance(now) {
            t.apply(&mut field);
        }
        draw_field(&field, &mut surface);
        if let Some(gate) = host.gate() {
            if last_phase != Some(gate.phase()) {
                last_phase = Some(gate.phase());
                println!("  {:>6.0} ms  phase {:?}", now, gate.phase());
            }
            if let Some(scene) = gate.victory() {
                draw_victory(scene, &mut surface);
            }
        }
        let frame = surface.take();
        if last_phase == Some(Phase::Victory) && destination.is_some() {
            let glyphs = frame.iter().filter(|c| matches!(c, DrawCmd::Glyph { .. })).count();
            println!("  last frame: {} draw calls ({} glyphs)", frame.len(), glyphs);
        }
    }

    match destination {
        Some(page) => println!("✓ Unlocked at {:.0} ms, navigated to {}", now, page.path()),
        None => println!("✗ Gate did not unlock"),
    }
}
