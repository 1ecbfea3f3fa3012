//! Photon Sphere
//!
//! Photons random-walk inside a translucent sphere, escape in straight lines
//! and leave fading trails behind.

mod gui;

use gui::{ControlCommand, Gui, UiState};
use photon_export::{export_file_path, SceneExporter};
use photon_renderer::{
    build_line_vertices, build_photon_instances, Camera, GpuError, SceneFrame, SceneRenderer,
};
use photon_simulation::PhotonSimulation;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

/// Longest frame the simulation will integrate in one go, in seconds
const MAX_FRAME_DT: f32 = 0.1;

/// Frame used for single-stepping while paused
const STEP_DT: f32 = 1.0 / 60.0;

/// Directory for exported scenes (`PHOTONS_EXPORT_DIR`, default: working directory)
fn export_dir() -> PathBuf {
    std::env::var_os("PHOTONS_EXPORT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    simulation: PhotonSimulation,
    renderer: SceneRenderer,
    camera: Camera,

    gui: Gui,
    ui_state: UiState,
    commands: Receiver<ControlCommand>,

    scene_rotation: f32,
    frame_times: VecDeque<f32>,
    last_frame_time: Instant,
}

impl GpuState {
    async fn new(
        window: Arc<Window>,
        commands: (Sender<ControlCommand>, Receiver<ControlCommand>),
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("✓ Using GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::UnsupportedSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoNoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let simulation = PhotonSimulation::new();
        log::info!("✓ Simulation initialized");

        let renderer = SceneRenderer::new(&device, &config);
        log::info!("✓ Renderer initialized");

        let camera = Camera::new(config.width, config.height);

        let (sender, receiver) = commands;
        let gui = Gui::new(&device, config.format, &window, sender);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            simulation,
            renderer,
            camera,
            gui,
            ui_state: UiState::default(),
            commands: receiver,
            scene_rotation: 0.0,
            frame_times: VecDeque::with_capacity(100),
            last_frame_time: Instant::now(),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.renderer.resize(&self.device, &self.config);
            self.camera.resize(new_size.width, new_size.height);
        }
    }

    /// Apply queued control requests before the frame's simulation step
    fn process_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                ControlCommand::AddPhoton => {
                    if self.simulation.add_photon().is_none() {
                        log::info!("Photon limit reached");
                    }
                }
                ControlCommand::Reset => self.simulation.reset(),
                ControlCommand::TogglePause => {
                    self.simulation.toggle_pause();
                    log::info!(
                        "Simulation {}",
                        if self.simulation.is_paused() { "paused" } else { "resumed" }
                    );
                }
                ControlCommand::StepFrame => {
                    if self.simulation.is_paused() {
                        self.simulation.step_frame(&self.ui_state.settings, STEP_DT);
                    }
                }
                ControlCommand::Export => self.export(),
            }
        }
    }

    fn export(&mut self) {
        let path = export_file_path(&export_dir(), SystemTime::now());
        let exporter = SceneExporter::with_sphere_opacity(self.ui_state.settings.sphere_transparency);

        self.ui_state.export_status = Some(
            match exporter.write_glb(&path, self.simulation.photons(), self.simulation.trails()) {
                Ok(()) => format!("Saved {}", path.display()),
                Err(e) => {
                    log::error!("Scene export failed: {}", e);
                    format!("Export failed: {}", e)
                }
            },
        );
    }

    fn render(&mut self, window: &Window) -> Result<(f32, f32), wgpu::SurfaceError> {
        // Track frame time
        let now = Instant::now();
        let frame_time = (now - self.last_frame_time).as_secs_f32() * 1000.0;
        self.last_frame_time = now;

        self.frame_times.push_back(frame_time);
        if self.frame_times.len() > 100 {
            self.frame_times.pop_front();
        }

        let avg_frame_time = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        let fps = 1000.0 / avg_frame_time;

        self.process_commands();

        // Step simulation; paused frames accumulate no time
        let dt = (frame_time * 0.001).min(MAX_FRAME_DT);
        let settings = self.ui_state.settings;
        if !self.simulation.is_paused() {
            let report = self.simulation.update(&settings, dt);
            if report.retired > 0 {
                log::debug!(
                    "{} photon(s) retired, {} trails total",
                    report.retired,
                    self.simulation.trail_count()
                );
            }
            self.scene_rotation =
                (self.scene_rotation + settings.rotation_speed * dt) % std::f32::consts::TAU;
        }

        // Update UI state
        self.ui_state.fps = fps;
        self.ui_state.frame_time = avg_frame_time;
        self.ui_state.photon_count = self.simulation.photon_count();
        self.ui_state.trail_count = self.simulation.trail_count();
        self.ui_state.is_paused = self.simulation.is_paused();

        // Render
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let lines = build_line_vertices(self.simulation.photons(), self.simulation.trails());
        let photons = build_photon_instances(self.simulation.photons());

        self.renderer.render(
            &self.device,
            &self.queue,
            &view,
            &self.camera,
            &SceneFrame {
                lines: &lines,
                photons: &photons,
                scene_rotation: self.scene_rotation,
                photon_size: settings.photon_size,
                sphere_opacity: settings.sphere_transparency,
            },
        );

        // Render GUI
        {
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("GUI Encoder"),
                });

            self.gui.render(
                &self.device,
                &self.queue,
                &mut encoder,
                window,
                &view,
                &mut self.ui_state,
            );

            self.queue.submit(std::iter::once(encoder.finish()));
        }

        output.present();
        Ok((fps, avg_frame_time))
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    commands: Sender<ControlCommand>,
    pending_receiver: Option<Receiver<ControlCommand>>,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
}

impl App {
    fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            window: None,
            gpu_state: None,
            commands: sender,
            pending_receiver: Some(receiver),
            mouse_pressed: false,
            last_mouse_pos: None,
        }
    }

    fn send(&self, command: ControlCommand) {
        if self.commands.send(command).is_err() {
            log::warn!("Control channel closed, dropping {:?}", command);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let Some(receiver) = self.pending_receiver.take() else {
            return;
        };

        let window_attributes = Window::default_attributes()
            .with_title("Photon Sphere")
            .with_inner_size(winit::dpi::LogicalSize::new(1600, 1000));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let channel = (self.commands.clone(), receiver);
        match pollster::block_on(GpuState::new(window.clone(), channel)) {
            Ok(gpu_state) => {
                self.window = Some(window);
                self.gpu_state = Some(gpu_state);
            }
            Err(e) => {
                log::error!("GPU initialization failed: {}", e);
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
        if let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) {
            if gpu_state.gui.handle_event(window, &event) {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),

            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left || button == MouseButton::Right {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some(last_pos) = self.last_mouse_pos {
                        let delta_x = (position.x - last_pos.0) as f32;
                        let delta_y = (position.y - last_pos.1) as f32;

                        if let Some(gpu_state) = &mut self.gpu_state {
                            gpu_state.camera.rotate(-delta_x * 0.005, delta_y * 0.005);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_x, y) => y * 10.0,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };

                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state
                        .camera
                        .zoom(-scroll * gpu_state.camera.distance / 100.0);
                }
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match key_code {
                KeyCode::Space => self.send(ControlCommand::TogglePause),
                KeyCode::Period => self.send(ControlCommand::StepFrame),
                KeyCode::KeyN => self.send(ControlCommand::AddPhoton),
                KeyCode::KeyR => self.send(ControlCommand::Reset),
                KeyCode::KeyE => self.send(ControlCommand::Export),
                KeyCode::KeyC => {
                    if let Some(gpu_state) = &mut self.gpu_state {
                        gpu_state.camera.reset();
                    }
                }
                _ => {}
            },

            WindowEvent::RedrawRequested => {
                if let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) {
                    match gpu_state.render(window) {
                        Ok((fps, frame_time)) => {
                            window.set_title(&format!(
                                "Photon Sphere - {:.0} FPS ({:.2}ms) - {} photons, {} trails",
                                fps,
                                frame_time,
                                gpu_state.simulation.photon_count(),
                                gpu_state.simulation.trail_count()
                            ));
                        }
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            gpu_state.resize(window.inner_size())
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("Surface out of memory, exiting");
                            event_loop.exit();
                        }
                        Err(e) => log::warn!("Render error: {:?}", e),
                    }
                }
            }

            _ => {}
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting photon sphere...");

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            return;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();

    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop terminated with error: {}", e);
    }
}
