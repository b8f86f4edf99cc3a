//! Application main loop

use anyhow::Result;
use app_core::{
    AppConfig, Catalog, Command, CommandId, Crossfade, DecodeCache, ImageLoader, Lightbox,
    LightboxEvent,
};
use app_ui::{
    components::{GridAction, LightboxView, ThumbnailGrid},
    InputHandler, Renderer, TextureStore, Theme,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

/// When the next frame is due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repaint {
    Now,
    At(Instant),
    Idle,
}

impl Repaint {
    /// Map egui's requested repaint delay onto the event loop
    fn after(delay: Duration, now: Instant) -> Self {
        if delay.is_zero() {
            Repaint::Now
        } else {
            now.checked_add(delay).map_or(Repaint::Idle, Repaint::At)
        }
    }
}

/// Main application state for the event loop
struct App {
    config: AppConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    egui_ctx: egui::Context,
    egui_state: Option<egui_winit::State>,

    input_handler: InputHandler,
    theme: Theme,

    // Gallery
    cache: DecodeCache,
    textures: TextureStore,
    grid: ThumbnailGrid,
    lightbox: Lightbox,
    /// Present while the lightbox is open
    crossfade: Option<Crossfade>,

    repaint_pending: bool,
    /// Delayed repaint requested by egui, e.g. while textures are pending
    repaint_at: Option<Instant>,
    exit_requested: bool,
}

impl App {
    /// Must be called with the tokio runtime entered
    fn new(config: AppConfig, catalog: Catalog) -> Self {
        let loader = ImageLoader::new(
            config.gallery.assets_dir.clone(),
            Some(config.viewer.max_texture_size),
        );
        let cache = DecodeCache::new(Arc::new(loader));

        // Thumbnails decode in the background from the start
        for src in catalog.sources() {
            cache.prefetch(src);
        }
        tracing::info!("Gallery has {} images", catalog.len());

        Self {
            window: None,
            renderer: None,
            egui_ctx: egui::Context::default(),
            egui_state: None,

            input_handler: InputHandler::new(config.keybindings.clone()),
            theme: Theme::by_name(&config.general.theme),

            textures: TextureStore::new(cache.clone()),
            grid: ThumbnailGrid::new(
                config.gallery.thumbnail_min_width,
                config.gallery.grid_spacing,
            ),
            lightbox: Lightbox::new(catalog, config.viewer.swipe_threshold),
            crossfade: None,
            cache,
            config,

            repaint_pending: true,
            repaint_at: None,
            exit_requested: false,
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attrs = Window::default_attributes()
            .with_title("Folio")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.general.window_width,
                self.config.general.window_height,
            ));

        let window = Arc::new(event_loop.create_window(window_attrs)?);

        // Initialize renderer
        let renderer = pollster::block_on(Renderer::new(window.clone()))?;

        // Initialize egui
        let egui_state = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(renderer.device.limits().max_texture_dimension_2d as usize),
        );

        self.theme.apply(&self.egui_ctx);

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.egui_state = Some(egui_state);

        Ok(())
    }

    /// Execute a command through the lightbox
    fn execute_command(&mut self, cmd: &Command) -> bool {
        if cmd.is(CommandId::APP_EXIT) {
            self.exit_requested = true;
            return true;
        }

        match self.lightbox.execute(cmd) {
            Some(event) => {
                self.on_lightbox_event(event);
                true
            }
            None => false,
        }
    }

    /// Keep the presentation in step with the controller
    fn on_lightbox_event(&mut self, event: LightboxEvent) {
        match event {
            LightboxEvent::Opened { index } => {
                let mut crossfade = Crossfade::new(self.cache.clone(), self.config.viewer.crossfade_duration());
                if let Some(record) = self.lightbox.current() {
                    tracing::info!("Opening {} ({})", record.alt, record.src);
                    crossfade.reset_to(record.src.clone());
                }
                self.crossfade = Some(crossfade);
                self.prefetch_neighbours();
                tracing::debug!("Lightbox at {}", index);
            }
            LightboxEvent::Moved { from, to } => {
                tracing::debug!("Lightbox {} -> {}", from, to);
                if let (Some(crossfade), Some(record)) = (&mut self.crossfade, self.lightbox.current()) {
                    crossfade.set_target(record.src.clone());
                }
                self.prefetch_neighbours();
            }
            LightboxEvent::Closed => {
                if let Some(mut crossfade) = self.crossfade.take() {
                    crossfade.shutdown();
                }
            }
        }
        self.repaint_pending = true;
    }

    fn prefetch_neighbours(&self) {
        let catalog = self.lightbox.catalog();
        for index in self.lightbox.neighbours(self.config.viewer.preload_count) {
            if let Some(record) = catalog.get(index) {
                self.cache.prefetch(&record.src);
            }
        }
    }

    fn render(&mut self) {
        let window = match &self.window {
            Some(w) => w.clone(),
            None => return,
        };

        let now = Instant::now();
        let mut animating = false;

        if let Some(crossfade) = &mut self.crossfade {
            crossfade.set_drag_feedback(self.lightbox.drag_feedback());
            let report = crossfade.tick(now);
            animating = report.repaint;
            if let Some(src) = report.promoted {
                tracing::trace!("Now showing {}", src);
            }
        }

        let raw_input = match &mut self.egui_state {
            Some(state) => state.take_egui_input(&window),
            None => return,
        };

        let mut grid_action = None;
        let mut events = Vec::new();

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            if self.lightbox.is_open() {
                if let Some(crossfade) = &self.crossfade {
                    egui::CentralPanel::default()
                        .frame(egui::Frame::none().fill(self.theme.backdrop))
                        .show(ctx, |ui| {
                            events = LightboxView::ui(
                                ui,
                                &mut self.lightbox,
                                crossfade,
                                &mut self.textures,
                                &self.theme,
                                now,
                            );
                        });
                }
            } else {
                egui::TopBottomPanel::top("header").show(ctx, |ui| {
                    ui.add_space(8.0);
                    ui.heading("Gallery");
                    ui.label(
                        egui::RichText::new(format!("{} images", self.lightbox.catalog().len()))
                            .color(self.theme.text_secondary),
                    );
                    ui.add_space(8.0);
                });

                egui::CentralPanel::default().show(ctx, |ui| {
                    grid_action = self.grid.ui(
                        ui,
                        self.lightbox.catalog(),
                        &mut self.textures,
                        &self.theme,
                    );
                });
            }
        });

        for event in events {
            self.on_lightbox_event(event);
        }
        if let Some(GridAction::Open(index)) = grid_action {
            self.execute_command(&Command::open(index));
        }

        if let Some(egui_state) = &mut self.egui_state {
            egui_state.handle_platform_output(&window, full_output.platform_output);
        }

        let egui_repaint = full_output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .map_or(Repaint::Idle, |v| Repaint::after(v.repaint_delay, now));
        self.repaint_at = None;
        match egui_repaint {
            Repaint::Now => self.repaint_pending = true,
            Repaint::At(at) => self.repaint_at = Some(at),
            Repaint::Idle => {}
        }
        self.repaint_pending |= animating;

        let primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let Some(renderer) = &mut self.renderer else {
            return;
        };

        match renderer.render_egui(
            &primitives,
            &full_output.textures_delta,
            full_output.pixels_per_point,
            self.theme.background,
        ) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.handle_device_lost();
                self.repaint_pending = true;
            }
            Err(e) => {
                tracing::error!("Surface error: {:?}", e);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_window(event_loop) {
                tracing::error!("Failed to initialize window: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // Let egui handle the event first
        if let (Some(egui_state), Some(window)) = (&mut self.egui_state, &self.window) {
            let response = egui_state.on_window_event(window, &event);
            if response.repaint {
                self.repaint_pending = true;
            }
            if response.consumed {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize((size.width, size.height));
                }
                self.repaint_pending = true;
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(cmd) = self.input_handler.handle_key(&event) {
                    self.execute_command(&cmd);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(cmd) = self.input_handler.handle_mouse_button(button, state) {
                    self.execute_command(&cmd);
                }
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                self.input_handler.update_modifiers(modifiers.state());
            }

            WindowEvent::RedrawRequested => {
                self.repaint_pending = false;
                self.render();
            }

            _ => {}
        }

        if self.exit_requested {
            tracing::info!("Exit requested");
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let due = self.repaint_at.is_some_and(|at| Instant::now() >= at);
        if self.repaint_pending || due {
            self.repaint_at = None;
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }

        match self.repaint_at {
            Some(at) => event_loop.set_control_flow(ControlFlow::WaitUntil(at)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut crossfade) = self.crossfade.take() {
            crossfade.shutdown();
        }
        tracing::info!("Folio exiting ({} decoded images cached)", self.cache.len());
    }
}

/// Run the application
pub fn run(config: AppConfig, catalog: Catalog) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("folio-worker")
        .build()?;
    // Decode tasks are spawned from the UI thread
    let _runtime_guard = runtime.enter();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, catalog);
    event_loop.run_app(&mut app)?;

    Ok(())
}
