//! Pig Jump entry point
//!
//! Browser: canvas/WebGPU bootstrap, input, frame loop and DOM glue.
//! Native: command-line tools for headless runs and the high-score handlers.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::mpsc::{self, Receiver};

    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, HtmlInputElement, HtmlSelectElement};

    use pig_jump::audio::{AudioManager, SoundEffect};
    use pig_jump::client::{
        LeaderboardClient, MSG_INVALID_ID, MSG_NEED_ID, PresentationUpdate, drain_updates,
        format_board_line,
    };
    use pig_jump::consts::*;
    use pig_jump::renderer::{RenderState, build_scene};
    use pig_jump::settings::{KeyValueStore, LocalStorage, MemoryKv};
    use pig_jump::sim::{GameEvent, StepInput, World, step};
    use pig_jump::theme::pick_random_theme;
    use pig_jump::{Settings, ThemeId, Tuning, api::is_valid_player_id};

    /// Game instance holding all state
    struct Game {
        world: World,
        render_state: Option<RenderState>,
        accumulator: f32,
        last_time: f64,
        pending_jump: bool,
        autopilot: bool,
        muted: bool,
        settings: Settings,
        kv: Box<dyn KeyValueStore>,
        audio: AudioManager,
        leaderboard: LeaderboardClient,
        updates: Receiver<PresentationUpdate>,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let kv: Box<dyn KeyValueStore> = match LocalStorage::open() {
                Some(storage) => Box::new(storage),
                None => {
                    log::warn!("LocalStorage unavailable - settings won't persist");
                    Box::new(MemoryKv::new())
                }
            };
            let settings = Settings::load(kv.as_ref());
            let mut world = World::new(seed, Tuning::default());
            world.theme = settings.theme;
            let (tx, updates) = mpsc::channel();
            Self {
                world,
                render_state: None,
                accumulator: 0.0,
                last_time: 0.0,
                pending_jump: false,
                autopilot: false,
                muted: false,
                settings,
                kv,
                audio: AudioManager::new(),
                leaderboard: LeaderboardClient::new(tx),
                updates,
            }
        }

        /// Begin a run, rolling a new theme first when the toggle is on
        fn start_run(&mut self) {
            let seed = js_sys::Date::now() as u64;
            if self.settings.random_theme {
                let mut rng = Pcg32::seed_from_u64(seed);
                self.world.theme = pick_random_theme(&mut rng, self.world.theme);
                sync_theme_select(self.world.theme);
            }
            self.world.reset(seed);
            self.accumulator = 0.0;
            self.pending_jump = false;
            self.audio.resume();
            self.audio.stop_all();
            set_hidden("startScreen", true);
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            self.accumulator += dt.min(MAX_FRAME_DT);

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = StepInput {
                    jump: std::mem::take(&mut self.pending_jump),
                    autopilot: self.autopilot,
                };
                step(&mut self.world, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;
            }

            for event in self.world.drain_events() {
                self.handle_event(&event);
            }
        }

        fn handle_event(&mut self, event: &GameEvent) {
            match event {
                GameEvent::InvincibilityStarted { duration } => {
                    self.audio.start_invincible_music(*duration);
                }
                GameEvent::InvincibilityEnded => self.audio.stop_music(),
                GameEvent::GameOver { score } => self.finish_run(*score),
                _ => {}
            }
            if let Some(effect) = SoundEffect::for_event(event) {
                self.audio.play(effect);
            }
        }

        /// Record, submit and show the result of a finished run
        fn finish_run(&mut self, score: u64) {
            self.audio.stop_all();
            if self.settings.record_best(self.kv.as_mut(), score) {
                self.audio.play(SoundEffect::HighScore);
            }
            log::info!("Run finished: {} (best {})", score, self.settings.best_score);

            // A valid id typed but never confirmed still counts
            let typed = input_value("playerId");
            if is_valid_player_id(typed.trim()) {
                let _ = self.settings.set_player_id(self.kv.as_mut(), &typed);
            }
            match self.settings.submittable_player_id() {
                Some(id) => self.leaderboard.submit(id, score),
                None => set_text("boardMsg", MSG_NEED_ID),
            }

            set_text("startTitle", "Game Over");
            set_text("startSubtitle", &format!("Score {}", score));
            set_text("startBtn", "Play again");
            set_hidden("startScreen", false);
        }

        /// Render the current frame
        fn render(&mut self) {
            let scene = build_scene(&self.world);
            if let Some(render_state) = &mut self.render_state {
                match render_state.render(&scene.vertices, scene.clear) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let world = &self.world;
            set_text("score", &world.display_score().to_string());
            set_text("best", &self.settings.best_score.max(world.final_score).to_string());
            set_text("speed", &format!("{:.0}", world.speed));
            set_text("mud", &format!("{}/3", world.mud));
            set_text("piglets", &world.piglets.to_string());
            let remaining = world.mode.invincible_remaining();
            if remaining > 0.0 {
                set_text("invincible", &format!("{:.1}s", remaining));
            } else {
                set_text("invincible", "");
            }
        }

        fn apply_updates(&self) {
            for update in drain_updates(&self.updates) {
                match update {
                    PresentationUpdate::BoardMessage(message) => set_text("boardMsg", &message),
                    PresentationUpdate::Leaderboard(items) => render_board(&items),
                    PresentationUpdate::ScoreSaved {
                        player_id,
                        best_score,
                    } => log::info!("Server best for {}: {}", player_id, best_score),
                }
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn element(id: &str) -> Option<Element> {
        document()?.get_element_by_id(id)
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = element(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(id: &str, hidden: bool) {
        if let Some(el) = element(id).and_then(|el| el.dyn_into::<HtmlElement>().ok()) {
            el.set_hidden(hidden);
        }
    }

    fn input_value(id: &str) -> String {
        element(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    fn sync_theme_select(theme: ThemeId) {
        if let Some(select) = element("theme").and_then(|el| el.dyn_into::<HtmlSelectElement>().ok()) {
            select.set_value(theme.as_str());
        }
    }

    fn render_board(items: &[pig_jump::api::LeaderboardEntry]) {
        let (Some(doc), Some(list)) = (document(), element("leaderboard")) else {
            return;
        };
        list.set_inner_html("");
        for (idx, item) in items.iter().enumerate() {
            if let Ok(li) = doc.create_element("li") {
                li.set_text_content(Some(&format_board_line(idx + 1, item)));
                let _ = list.append_child(&li);
            }
        }
    }

    fn alert(message: &str) {
        log::error!("{}", message);
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }

    /// Size the backing store to the CSS box times the pixel ratio
    fn fit_canvas(canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
        let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Pig Jump starting...");

        if let Err(e) = pig_jump::theme::validate_registry() {
            alert(&format!("Theme registry is invalid: {}", e));
            return;
        }

        let Some(canvas) = element("game").and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            alert("Canvas #game not found.");
            return;
        };
        let (width, height) = fit_canvas(&canvas);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });
        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                alert(&format!("WebGPU surface unavailable: {}", e));
                return;
            }
        };
        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                alert(&format!("This browser has no WebGPU adapter: {}", e));
                return;
            }
        };
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => {
                alert(&format!("WebGPU device request failed: {}", e));
                return;
            }
        }

        init_controls(&game);
        setup_input_handlers(game.clone());
        setup_resize(canvas, game.clone());
        game.borrow().leaderboard.refresh();

        request_animation_frame(game);
        log::info!("Pig Jump running!");
    }

    /// Fill the start screen controls from settings and wire them up
    fn init_controls(game: &Rc<RefCell<Game>>) {
        let (theme, random, player_id) = {
            let g = game.borrow();
            (g.settings.theme, g.settings.random_theme, g.settings.player_id.clone())
        };
        sync_theme_select(theme);

        if let Some(input) = element("playerId").and_then(|el| el.dyn_into::<HtmlInputElement>().ok()) {
            input.set_value(&player_id);

            let game_change = game.clone();
            let change = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let typed = input_value("playerId");
                let mut g = game_change.borrow_mut();
                let Game { settings, kv, .. } = &mut *g;
                if let Ok(id) = settings.set_player_id(kv.as_mut(), &typed) {
                    set_text("boardMsg", &format!("Player id saved: {}", id));
                }
            });
            let _ = input.add_event_listener_with_callback("change", change.as_ref().unchecked_ref());
            change.forget();

            let game_key = game.clone();
            let enter = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if event.key() == "Enter" {
                    event.prevent_default();
                    start_game_flow(&game_key);
                }
            });
            let _ = input.add_event_listener_with_callback("keydown", enter.as_ref().unchecked_ref());
            enter.forget();
        }

        if let Some(select) = element("theme").and_then(|el| el.dyn_into::<HtmlSelectElement>().ok()) {
            let game = game.clone();
            let select_clone = select.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let theme = ThemeId::from_str_or_default(&select_clone.value());
                let mut g = game.borrow_mut();
                let Game { settings, kv, world, .. } = &mut *g;
                settings.set_theme(kv.as_mut(), theme);
                world.theme = theme;
                log::info!("Theme: {}", theme.as_str());
            });
            let _ = select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(toggle) = element("randomTheme").and_then(|el| el.dyn_into::<HtmlInputElement>().ok()) {
            toggle.set_checked(random);
            let game = game.clone();
            let toggle_clone = toggle.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let enabled = toggle_clone.checked();
                let mut g = game.borrow_mut();
                let Game { settings, kv, world, .. } = &mut *g;
                settings.set_random_theme(kv.as_mut(), enabled);
                if enabled {
                    let mut rng = Pcg32::seed_from_u64(js_sys::Date::now() as u64);
                    world.theme = pick_random_theme(&mut rng, world.theme);
                    sync_theme_select(world.theme);
                }
            });
            let _ = toggle.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = element("startBtn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                start_game_flow(&game);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Start requires a valid player id in the input
    fn start_game_flow(game: &Rc<RefCell<Game>>) {
        let typed = input_value("playerId");
        let mut g = game.borrow_mut();
        let saved = {
            let Game { settings, kv, .. } = &mut *g;
            settings.set_player_id(kv.as_mut(), &typed).is_ok()
        };
        if !saved {
            set_text("boardMsg", MSG_INVALID_ID);
            return;
        }
        g.start_run();
        set_text("boardMsg", "");
    }

    /// Taps on form controls never count as jumps
    fn is_control_target(target: Option<web_sys::EventTarget>) -> bool {
        target
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|el| el.closest("button, input, select, label").ok().flatten())
            .is_some()
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if event.repeat() || is_control_target(event.target()) {
                    return;
                }
                let mut g = game.borrow_mut();
                match event.code().as_str() {
                    "Space" | "ArrowUp" => {
                        event.prevent_default();
                        if g.world.is_running() {
                            g.pending_jump = true;
                        }
                    }
                    // Quick restart only during or after a run
                    "KeyR" => {
                        if g.world.run != pig_jump::sim::RunState::Idle {
                            g.start_run();
                        }
                    }
                    "KeyI" => {
                        g.autopilot = !g.autopilot;
                        log::info!("Autopilot: {}", g.autopilot);
                    }
                    "KeyM" => {
                        let muted = !g.muted;
                        g.muted = muted;
                        g.audio.set_muted(muted);
                    }
                    _ => {}
                }
            });
            if let Some(window) = web_sys::window() {
                let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            }
            closure.forget();
        }

        // Pointer: anywhere outside the controls, canvas included
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                if is_control_target(event.target()) {
                    return;
                }
                let mut g = game.borrow_mut();
                if g.world.is_running() {
                    g.pending_jump = true;
                }
            });
            if let Some(doc) = document() {
                let _ = doc.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            }
            closure.forget();
        }
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (width, height) = fit_canvas(&canvas);
            if let Some(render_state) = &mut game.borrow_mut().render_state {
                render_state.resize(width, height);
            }
        });
        if let Some(window) = web_sys::window() {
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        }
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.apply_updates();
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::fs;
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};
    use clap::{Parser, Subcommand};

    use pig_jump::api::{ApiRequest, ApiResponse, JsonFileStore, handle_leaderboard, handle_score};
    use pig_jump::client::submit_body;
    use pig_jump::consts::SIM_DT;
    use pig_jump::sim::{StepInput, World, step};
    use pig_jump::{ThemeId, Tuning};

    #[derive(Parser)]
    #[command(name = "pig-jump")]
    #[command(about = "Headless runs and high-score handlers for Pig Jump")]
    struct Cli {
        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Play a headless run on autopilot
        Simulate {
            #[arg(long, default_value_t = 1)]
            seed: u64,
            /// Stop after this much game time even if the pig survives
            #[arg(long, default_value_t = 120.0)]
            seconds: f32,
            /// JSON file with tuning overrides
            #[arg(long, value_name = "FILE")]
            tuning: Option<PathBuf>,
            #[arg(long)]
            theme: Option<String>,
            /// Submit the final score under this player id
            #[arg(long, value_name = "PLAYER_ID")]
            submit_as: Option<String>,
            #[arg(long, default_value = "scores.json")]
            store: PathBuf,
        },
        /// Invoke the score handler with a raw request body
        Score {
            #[arg(long)]
            body: String,
            #[arg(long, default_value = "POST")]
            method: String,
            #[arg(long, default_value = "scores.json")]
            store: PathBuf,
        },
        /// Invoke the leaderboard handler
        Leaderboard {
            /// Raw `top` query value
            #[arg(long)]
            top: Option<String>,
            #[arg(long, default_value = "GET")]
            method: String,
            #[arg(long, default_value = "scores.json")]
            store: PathBuf,
        },
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();
        pig_jump::theme::validate_registry().context("Theme registry is invalid")?;
        match cli.command {
            Commands::Simulate {
                seed,
                seconds,
                tuning,
                theme,
                submit_as,
                store,
            } => simulate(seed, seconds, tuning, theme, submit_as, store),
            Commands::Score { body, method, store } => {
                let mut table = open_store(&store)?;
                let request = ApiRequest::new(&method, "", Some(body));
                print_response(&handle_score(&mut table, &request, chrono::Utc::now()));
                Ok(())
            }
            Commands::Leaderboard { top, method, store } => {
                let table = open_store(&store)?;
                let query = top.map(|t| format!("top={}", t)).unwrap_or_default();
                let request = ApiRequest::new(&method, &query, None);
                print_response(&handle_leaderboard(&table, &request));
                Ok(())
            }
        }
    }

    fn open_store(path: &Path) -> Result<JsonFileStore> {
        JsonFileStore::open(path).with_context(|| format!("Failed to open score table {}", path.display()))
    }

    fn print_response(response: &ApiResponse) {
        println!("{}", response.status);
        println!("{}", response.body);
    }

    fn simulate(
        seed: u64,
        seconds: f32,
        tuning: Option<PathBuf>,
        theme: Option<String>,
        submit_as: Option<String>,
        store: PathBuf,
    ) -> Result<()> {
        let tuning = match tuning {
            Some(path) => {
                let json = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Tuning::from_json(&json).with_context(|| format!("Invalid tuning in {}", path.display()))?
            }
            None => Tuning::default(),
        };
        let theme = match theme {
            Some(name) => name.parse::<ThemeId>()?,
            None => ThemeId::default(),
        };

        let mut world = World::new(seed, tuning);
        world.theme = theme;
        world.reset(seed);

        let input = StepInput {
            jump: false,
            autopilot: true,
        };
        let max_steps = (seconds.max(0.0) / SIM_DT).ceil() as u64;
        let mut jumps = 0u32;
        for _ in 0..max_steps {
            step(&mut world, &input, SIM_DT);
            jumps += world
                .drain_events()
                .iter()
                .filter(|e| matches!(e, pig_jump::sim::GameEvent::Jumped | pig_jump::sim::GameEvent::DoubleJumped))
                .count() as u32;
            if !world.is_running() {
                break;
            }
        }

        let score = if world.is_running() {
            world.display_score()
        } else {
            world.final_score
        };
        println!(
            "seed {} theme {}: score {} after {:.1}s ({}), speed {:.0}, mud {}, piglets {}, jumps {}",
            seed,
            world.theme.as_str(),
            score,
            world.t,
            if world.is_running() { "survived" } else { "game over" },
            world.speed,
            world.mud,
            world.piglets,
            jumps
        );

        if let Some(player_id) = submit_as {
            let mut table = open_store(&store)?;
            let request = ApiRequest::post(submit_body(&player_id, score));
            print_response(&handle_score(&mut table, &request, chrono::Utc::now()));
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    cli::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
