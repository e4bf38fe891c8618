use crate::session::{self, Session};
use anyhow::{anyhow, Result};
use pixels::{Pixels, SurfaceTexture};
use std::path::Path;
use std::sync::Arc;
use tiny_skia::Pixmap;
use touchcomm_core::Language;
use touchcomm_experiment::{ExperimentConfig, Step};
use touchcomm_render::{SurfaceRenderer, SurfaceView};
use touchcomm_surface::{ButtonPanel, Click, Key, PointerEvent};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

/// One window with its pixel buffer and renderer. The participant window
/// is fullscreen on its monitor; the experimenter window is a plain
/// resizable window.
struct Surface {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    canvas: Pixmap,
    renderer: SurfaceRenderer,
    size: PhysicalSize<u32>,
}

impl Surface {
    fn create(
        event_loop: &ActiveEventLoop,
        title: &str,
        screen: usize,
        resolution: (u32, u32),
        fullscreen: bool,
        font: &Path,
    ) -> Result<Self> {
        let monitor = event_loop
            .available_monitors()
            .nth(screen)
            .or_else(|| event_loop.primary_monitor());

        let mut attributes = Window::default_attributes()
            .with_title(title)
            .with_inner_size(LogicalSize::new(resolution.0, resolution.1));
        if fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(monitor)));
        } else if let Some(monitor) = monitor {
            attributes = attributes.with_position(monitor.position());
        }

        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = window.inner_size();
        log::info!("{}: {}x{}", title, size.width, size.height);

        let surface_texture = SurfaceTexture::new(size.width, size.height, window.clone());
        let pixels = Pixels::new(size.width, size.height, surface_texture)?;
        let canvas =
            Pixmap::new(size.width, size.height).ok_or_else(|| anyhow!("zero-sized window"))?;
        let renderer = SurfaceRenderer::new(size.width, size.height, font)?;

        window.request_redraw();
        Ok(Self {
            window,
            pixels,
            canvas,
            renderer,
            size,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) -> Result<()> {
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        self.size = size;
        self.pixels.resize_surface(size.width, size.height)?;
        self.pixels.resize_buffer(size.width, size.height)?;
        self.canvas =
            Pixmap::new(size.width, size.height).ok_or_else(|| anyhow!("zero-sized window"))?;
        self.renderer.resize(size.width, size.height);
        Ok(())
    }

    /// Renders one frame and schedules the next redraw.
    fn draw(&mut self, view: &SurfaceView) -> Result<()> {
        self.renderer.render(&mut self.canvas, view)?;
        self.pixels.frame_mut().copy_from_slice(self.canvas.data());
        self.pixels.render()?;
        self.window.request_redraw();
        Ok(())
    }

    /// Window coordinates normalized to 0..1.
    fn normalize(&self, x: f64, y: f64) -> (f32, f32) {
        (
            (x / self.size.width.max(1) as f64) as f32,
            (y / self.size.height.max(1) as f64) as f32,
        )
    }
}

/// The session starts on the language prompt and switches to a running
/// sequencer once the participant has picked; output files are only
/// created at that point.
enum Mode {
    ChoosingLanguage { panel: ButtonPanel },
    Running(Box<Session>),
}

pub struct App {
    config: ExperimentConfig,
    mode: Mode,
    participant: Option<Surface>,
    experimenter: Option<Surface>,
    /// Last pointer position in the participant window, normalized.
    cursor: (f32, f32),
    should_exit: bool,
}

impl App {
    pub fn new(config: ExperimentConfig) -> Result<Self> {
        let languages = Language::all();
        let mut panel = ButtonPanel::new(languages.len(), languages.len(), 1)
            .ok_or_else(|| anyhow!("no layout for the language prompt"))?;
        panel.show(
            languages
                .iter()
                .map(|l| l.prompt_label().to_string())
                .collect(),
        );
        Ok(Self {
            config,
            mode: Mode::ChoosingLanguage { panel },
            participant: None,
            experimenter: None,
            cursor: (0.0, 0.0),
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        log::info!("space starts the session, escape aborts");
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn create_windows(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        self.participant = Some(Surface::create(
            event_loop,
            "Touch communication",
            self.config.participant_screen,
            self.config.participant_resolution,
            true,
            &self.config.font_path,
        )?);
        self.experimenter = Some(Surface::create(
            event_loop,
            "Touch communication (experimenter)",
            self.config.experimenter_screen,
            self.config.experimenter_resolution,
            false,
            &self.config.font_path,
        )?);
        Ok(())
    }

    fn apply_step(&mut self, step: Result<Step>, event_loop: &ActiveEventLoop) {
        match step {
            Ok(Step::Continue) => {}
            Ok(Step::Exit) => {
                log::info!("session ended");
                self.should_exit = true;
                event_loop.exit();
            }
            Err(e) => {
                log::error!("session failed: {e:#}");
                self.should_exit = true;
                event_loop.exit();
            }
        }
    }

    /// Per-frame state machine tick, driven off the participant redraw.
    fn step(&mut self, event_loop: &ActiveEventLoop) {
        let step = match &mut self.mode {
            Mode::ChoosingLanguage { .. } => Ok(Step::Continue),
            Mode::Running(seq) => seq.update(),
        };
        self.apply_step(step, event_loop);
    }

    fn dispatch_key(&mut self, key: Key, event_loop: &ActiveEventLoop) {
        let step = match &mut self.mode {
            Mode::ChoosingLanguage { .. } => {
                if key == Key::Abort {
                    log::info!("cancelled before language selection, nothing saved");
                    Ok(Step::Exit)
                } else {
                    Ok(Step::Continue)
                }
            }
            Mode::Running(seq) => seq.handle_key(key),
        };
        self.apply_step(step, event_loop);
    }

    fn dispatch_pointer(&mut self, event: PointerEvent, event_loop: &ActiveEventLoop) {
        let mut chosen = None;
        let step = match &mut self.mode {
            Mode::ChoosingLanguage { panel } => {
                match event {
                    PointerEvent::Moved { x, y } => panel.pointer_moved(x, y),
                    PointerEvent::Pressed { x, y } => {
                        if let Some(Click { index, .. }) = panel.click(x, y, 0.0) {
                            chosen = Some(Language::all()[index]);
                        }
                    }
                }
                Ok(Step::Continue)
            }
            Mode::Running(seq) => seq.handle_pointer(event),
        };
        self.apply_step(step, event_loop);

        if let Some(language) = chosen {
            match session::build(&self.config, language) {
                Ok(sequencer) => self.mode = Mode::Running(Box::new(sequencer)),
                Err(e) => {
                    log::error!("failed to set up the session: {e:#}");
                    self.should_exit = true;
                    event_loop.exit();
                }
            }
        }
    }

    fn redraw(&mut self, id: WindowId) -> Result<()> {
        if let Some(surface) = self.participant.as_mut() {
            if surface.window.id() == id {
                let view = match &self.mode {
                    Mode::ChoosingLanguage { panel } => SurfaceView {
                        panel: Some(panel),
                        ..Default::default()
                    },
                    Mode::Running(seq) => SurfaceView {
                        message: seq.receiver_message(),
                        timer_text: None,
                        panel: seq.panel(),
                        vas: seq.vas(),
                    },
                };
                return surface.draw(&view);
            }
        }
        if let Some(surface) = self.experimenter.as_mut() {
            if surface.window.id() == id {
                let timer = match &self.mode {
                    Mode::Running(seq) => seq.timer_text(),
                    Mode::ChoosingLanguage { .. } => None,
                };
                let view = match &self.mode {
                    Mode::ChoosingLanguage { .. } => SurfaceView::default(),
                    Mode::Running(seq) => SurfaceView {
                        message: seq.toucher_message(),
                        timer_text: timer.as_deref(),
                        panel: None,
                        vas: None,
                    },
                };
                return surface.draw(&view);
            }
        }
        Ok(())
    }
}

fn map_key(key: PhysicalKey) -> Option<Key> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    match code {
        KeyCode::Space => Some(Key::Start),
        KeyCode::Escape => Some(Key::Abort),
        KeyCode::ArrowDown | KeyCode::KeyA => Some(Key::Forward),
        KeyCode::ArrowUp | KeyCode::KeyB => Some(Key::Backward),
        KeyCode::Enter | KeyCode::KeyC => Some(Key::Confirm),
        _ => None,
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.participant.is_some() {
            return;
        }
        if let Err(e) = self.create_windows(event_loop) {
            log::error!("failed to create windows: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let is_participant = self
            .participant
            .as_ref()
            .map(|s| s.window.id() == id)
            .unwrap_or(false);

        match event {
            WindowEvent::CloseRequested => self.dispatch_key(Key::Abort, event_loop),
            WindowEvent::RedrawRequested => {
                if is_participant {
                    self.step(event_loop);
                }
                if self.should_exit {
                    return;
                }
                if let Err(e) = self.redraw(id) {
                    log::error!("render failed: {e:#}");
                    event_loop.exit();
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                if let Some(key) = map_key(event.physical_key) {
                    self.dispatch_key(key, event_loop);
                }
            }
            WindowEvent::CursorMoved { position, .. } if is_participant => {
                if let Some(surface) = self.participant.as_ref() {
                    let (x, y) = surface.normalize(position.x, position.y);
                    self.cursor = (x, y);
                    self.dispatch_pointer(PointerEvent::Moved { x, y }, event_loop);
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } if is_participant => {
                let (x, y) = self.cursor;
                self.dispatch_pointer(PointerEvent::Pressed { x, y }, event_loop);
            }
            WindowEvent::Resized(size) => {
                let surface = if is_participant {
                    self.participant.as_mut()
                } else {
                    self.experimenter.as_mut()
                };
                if let Some(surface) = surface {
                    if let Err(e) = surface.resize(size) {
                        log::error!("resize failed: {e:#}");
                        event_loop.exit();
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}
