//! Arcfield - audio-reactive lightning over a drifting territory map
//!
//! Every seed site owns a cell of a weighted Voronoi map. When the room
//! gets loud enough, the site's lightning strikes, clipped to its cell.

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use arcfield::audio::AudioSystem;
use arcfield::camera::OrthoCamera;
use arcfield::cli::Args;
use arcfield::error::ArcfieldError;
use arcfield::installation::Installation;
use arcfield::params::{FFTConfig, RecordingConfig, RenderConfig};
use arcfield::rendering::RenderSystem;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    camera: OrthoCamera,

    // Simulation
    installation: Installation,
    audio: AudioSystem,

    // Configuration
    render_config: RenderConfig,
    recording_config: Option<RecordingConfig>,

    // Time tracking
    start_time: Instant,
    last_frame: Instant,
    frame_num: usize,
}

impl App {
    fn new(args: &Args) -> Result<Self, ArcfieldError> {
        let render_config = RenderConfig::default();
        let recording_config = args.create_recording_config()?;

        let installation = Installation::new(&args.installation_config(&render_config), args.seed)?;

        // A missing device degrades to silence instead of stopping the show
        let source = args.parse_source();
        let audio = AudioSystem::new(source, FFTConfig::default(), recording_config.as_ref())
            .unwrap_or_else(|e| {
                log::warn!("Audio source {:?} unavailable ({}), running silent", source, e);
                AudioSystem::silent()
            });

        if let Some(config) = &recording_config {
            log::info!(
                "Recording {:.1}s ({} frames) to {}",
                config.duration_secs,
                config.total_frames(),
                config.output_dir
            );
        }

        let now = Instant::now();
        Ok(Self {
            window: None,
            render_system: None,
            camera: OrthoCamera::new(&render_config),
            installation,
            audio,
            render_config,
            recording_config,
            start_time: now,
            last_frame: now,
            frame_num: 0,
        })
    }

    /// Time and step for this frame: simulated when recording, wall clock otherwise
    fn frame_clock(&mut self) -> (f32, f32) {
        match &self.recording_config {
            Some(config) => (self.frame_num as f32 * config.frame_dt(), config.frame_dt()),
            None => {
                let now = Instant::now();
                let dt = now.duration_since(self.last_frame).as_secs_f32();
                self.last_frame = now;
                (self.start_time.elapsed().as_secs_f32(), dt)
            }
        }
    }

    /// Update and render a single frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        if self.render_system.is_none() {
            return;
        }

        let (time_s, dt) = self.frame_clock();
        self.installation.update(time_s, dt, self.audio.get_bands());

        let Some(render_system) = self.render_system.as_mut() else {
            return;
        };
        render_system.update_units(self.installation.units_mut(), self.camera.view_proj());

        match render_system.render(self.frame_num) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) => {
                let (width, height) = render_system.size();
                render_system.resize(width, height);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
        self.frame_num += 1;

        if let Some(config) = &self.recording_config {
            if self.frame_num >= config.total_frames() {
                log::info!("Recording complete: {} frames", self.frame_num);
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let window_attributes = Window::default_attributes()
            .with_title("Arcfield")
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let render_system = match pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            self.installation.units(),
            self.recording_config.clone(),
        )) {
            Ok(render_system) => render_system,
            Err(e) => {
                log::error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        let (width, height) = render_system.size();
        self.camera.resize(width, height);

        log::info!(
            "Arcfield running: {} units, audio {:?}, seed {} (ESC quits, V toggles voice)",
            self.installation.units().len(),
            self.audio.source(),
            self.installation.seed()
        );

        self.window = Some(window);
        self.render_system = Some(render_system);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(key),
                        repeat: false,
                        ..
                    },
                ..
            } => match key {
                KeyCode::Escape => event_loop.exit(),
                KeyCode::KeyV => {
                    let active = !self.installation.voice_active();
                    self.installation.set_voice_active(active);
                }
                _ => {}
            },
            WindowEvent::Resized(size) => {
                if let Some(render_system) = self.render_system.as_mut() {
                    render_system.resize(size.width, size.height);
                }
                self.camera.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    let mut app = match App::new(&args) {
        Ok(app) => app,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
    }
}
