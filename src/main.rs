//! LiDAR VSOC entry point
//!
//! On the web: canvas + control panel driven by requestAnimationFrame.
//! Natively: headless run that logs the metrics and prints a final snapshot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlInputElement};

    use lidar_vsoc::SimConfig;
    use lidar_vsoc::renderer::{RenderState, build_scene, gauge_class, hud_lines};
    use lidar_vsoc::sim::{AttackMode, FrameDriver};
    use lidar_vsoc::ticks_to_secs;

    /// Application instance holding all state
    struct App {
        driver: FrameDriver,
        /// Absent until WebGPU is up (or if it never comes up)
        render_state: Option<RenderState>,
        /// Pending animation frame, cancelled on pause/reset
        frame_handle: Option<i32>,
    }

    impl App {
        fn new(driver: FrameDriver) -> Self {
            Self {
                driver,
                render_state: None,
                frame_handle: None,
            }
        }

        /// Draw the current state; silently skipped without a surface
        fn render(&mut self) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            let vertices = build_scene(self.driver.sim());
            match render_state.render(&vertices) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let sim = self.driver.sim();
            let m = &sim.metrics;

            let gauges = [
                ("metric-detection", m.detection_rate, true),
                ("metric-risk", m.collision_risk, false),
                ("metric-integrity", m.integrity_score, true),
            ];
            for (id, value, higher_is_better) in gauges {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(&format!("{value:.0}%")));
                    let classes = el.class_list();
                    let _ = classes.remove_3("good", "warn", "bad");
                    let _ = classes.add_1(gauge_class(value, higher_is_better));
                }
            }

            if let Some(el) = document.get_element_by_id("hud-status") {
                el.set_text_content(Some(&hud_lines(sim).join("\n")));
            }

            if let Some(el) = document.get_element_by_id("event-log") {
                let html: String = sim
                    .log
                    .entries()
                    .map(|e| {
                        format!(
                            "<li class=\"{}\"><span>{:.1}s</span> {}</li>",
                            e.severity.as_str(),
                            ticks_to_secs(e.tick),
                            e.message
                        )
                    })
                    .collect();
                el.set_inner_html(&html);
            }

            for mode in AttackMode::ALL {
                if let Some(el) = document.get_element_by_id(&format!("attack-{}", mode.as_str())) {
                    let _ = el.class_list().toggle_with_force("active", mode == sim.attack_mode);
                }
            }
            if let Some(el) = document.get_element_by_id("btn-defense") {
                let _ = el.class_list().toggle_with_force("active", sim.defense_enabled);
            }
        }

        fn cancel_frame(&mut self) {
            if let Some(handle) = self.frame_handle.take() {
                if let Some(window) = web_sys::window() {
                    let _ = window.cancel_animation_frame(handle);
                }
            }
        }
    }

    fn read_config(canvas: &HtmlCanvasElement) -> SimConfig {
        let Some(json) = canvas.get_attribute("data-config") else {
            return SimConfig::default();
        };
        match SimConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring data-config: {}", e);
                SimConfig::default()
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("LiDAR VSOC starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let config = read_config(&canvas);
        log::info!("Config: {:?}", config);
        let driver = match FrameDriver::new(&config) {
            Ok(driver) => driver,
            Err(e) => {
                log::error!("Invalid config: {}", e);
                return;
            }
        };
        let app = Rc::new(RefCell::new(App::new(driver)));

        setup_controls(&document, app.clone());

        // Initialize WebGPU; the simulation runs (undrawn) if this fails
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        match init_renderer(&instance, canvas, width, height).await {
            Some(render_state) => app.borrow_mut().render_state = Some(render_state),
            None => log::error!("WebGPU unavailable, drawing disabled"),
        }

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.class_list().add_1("hidden");
        }

        {
            let mut a = app.borrow_mut();
            a.render();
            a.update_hud();
        }
        log::info!("LiDAR VSOC ready");
    }

    async fn init_renderer(
        instance: &wgpu::Instance,
        canvas: HtmlCanvasElement,
        width: u32,
        height: u32,
    ) -> Option<RenderState> {
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas))
            .map_err(|e| log::error!("Failed to create surface: {}", e))
            .ok()?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| log::error!("Failed to get adapter: {}", e))
            .ok()?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);
        RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| log::error!("Failed to create device: {}", e))
            .ok()
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        let Some(el) = document.get_element_by_id(id) else {
            log::warn!("Missing control #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| handler());
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn on_input(document: &Document, id: &str, mut handler: impl FnMut(f64) + 'static) {
        let Some(input) = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            log::warn!("Missing input #{}", id);
            return;
        };
        let source = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            handler(source.value_as_number())
        });
        let _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Repaint while stopped so control changes show immediately
    fn refresh(app: &Rc<RefCell<App>>) {
        let mut a = app.borrow_mut();
        if !a.driver.is_running() {
            a.render();
        }
        a.update_hud();
    }

    fn setup_controls(document: &Document, app: Rc<RefCell<App>>) {
        {
            let app = app.clone();
            on_click(document, "btn-start", move || {
                let started = app.borrow_mut().driver.start();
                if started {
                    request_animation_frame(app.clone());
                }
            });
        }
        {
            let app = app.clone();
            on_click(document, "btn-pause", move || {
                let mut a = app.borrow_mut();
                a.cancel_frame();
                a.driver.pause();
                a.update_hud();
            });
        }
        {
            let app = app.clone();
            on_click(document, "btn-reset", move || {
                {
                    let mut a = app.borrow_mut();
                    a.cancel_frame();
                    a.driver.reset();
                }
                refresh(&app);
            });
        }
        {
            let app = app.clone();
            on_click(document, "btn-defense", move || {
                {
                    let mut a = app.borrow_mut();
                    let enabled = !a.driver.sim().defense_enabled;
                    a.driver.sim_mut().set_defense(enabled);
                }
                refresh(&app);
            });
        }
        for mode in AttackMode::ALL {
            let app = app.clone();
            on_click(document, &format!("attack-{}", mode.as_str()), move || {
                app.borrow_mut().driver.sim_mut().set_attack_mode(mode);
                refresh(&app);
            });
        }
        {
            let app = app.clone();
            on_input(document, "speed-input", move |value| {
                let mut config = SimConfig::default();
                match config.set_speed(value as f32) {
                    Ok(()) => app.borrow_mut().driver.sim_mut().ego.set_speed(config.speed),
                    Err(e) => log::warn!("{}", e),
                }
            });
        }
        on_input(document, "range-input", move |value| {
            let mut config = SimConfig::default();
            match config.set_max_range(value as f32) {
                Ok(()) => {
                    app.borrow_mut().driver.sim_mut().set_max_range(config.max_range);
                    refresh(&app);
                }
                Err(e) => log::warn!("{}", e),
            }
        });
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let callback_app = app.clone();
        let closure = Closure::once(move |_time: f64| {
            frame_loop(callback_app);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => app.borrow_mut().frame_handle = Some(handle),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>) {
        let keep_going = {
            let mut a = app.borrow_mut();
            a.frame_handle = None;
            if a.driver.frame() {
                a.render();
                a.update_hud();
                true
            } else {
                false
            }
        };

        if keep_going {
            request_animation_frame(app);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use lidar_vsoc::SimConfig;
    use lidar_vsoc::consts::METRICS_INTERVAL;
    use lidar_vsoc::sim::{FrameDriver, SimSnapshot};
    use std::process::ExitCode;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("LiDAR VSOC (native) starting...");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => match SimConfig::from_json(&json) {
                Ok(config) => config,
                Err(e) => {
                    log::error!("{}: {}", path, e);
                    return ExitCode::FAILURE;
                }
            },
            Err(e) => {
                log::error!("Cannot read {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => SimConfig::default(),
    };
    let ticks: u64 = match args.next().map(|s| s.parse()) {
        Some(Ok(n)) => n,
        Some(Err(e)) => {
            log::error!("Invalid tick count: {}", e);
            return ExitCode::FAILURE;
        }
        None => 600,
    };

    log::info!("Running {} ticks with {:?}", ticks, config);
    let mut driver = match FrameDriver::new(&config) {
        Ok(driver) => driver,
        Err(e) => {
            log::error!("Invalid config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    driver.start();
    for _ in 0..ticks {
        driver.frame();
        let sim = driver.sim();
        if sim.clock.ticks.is_multiple_of(METRICS_INTERVAL * 10) {
            log::info!(
                "t={:>5} detection={:5.1} risk={:5.1} integrity={:5.1} hits={}",
                sim.clock.ticks,
                sim.metrics.detection_rate,
                sim.metrics.collision_risk,
                sim.metrics.integrity_score,
                sim.scan.hit_count()
            );
        }
    }
    driver.pause();

    match SimSnapshot::capture(driver.sim()).to_json() {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to serialize snapshot: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
