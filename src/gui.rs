use egui::Context;
use egui_wgpu::Renderer;
use egui_winit::State;
use photon_physics::MAX_PHOTONS;
use photon_simulation::Settings;
use std::sync::mpsc::Sender;
use wgpu::{Device, TextureFormat};
use winit::{event::WindowEvent, window::Window};

/// Requests from the control surface (and keyboard) to the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    AddPhoton,
    Reset,
    TogglePause,
    StepFrame,
    Export,
}

pub struct UiState {
    pub fps: f32,
    pub frame_time: f32,
    pub photon_count: usize,
    pub trail_count: usize,
    pub is_paused: bool,
    pub settings: Settings,
    /// Result line of the last export, shown under the export button
    pub export_status: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            fps: 0.0,
            frame_time: 0.0,
            photon_count: 0,
            trail_count: 0,
            is_paused: false,
            settings: Settings::default(),
            export_status: None,
        }
    }
}

pub struct Gui {
    context: Context,
    state: State,
    renderer: Renderer,
    commands: Sender<ControlCommand>,
}

impl Gui {
    pub fn new(
        device: &Device,
        output_color_format: TextureFormat,
        window: &Window,
        commands: Sender<ControlCommand>,
    ) -> Self {
        let context = Context::default();
        let id = context.viewport_id();

        let state = State::new(
            context.clone(),
            id,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(device.limits().max_texture_dimension_2d as usize),
        );

        let renderer = Renderer::new(
            device,
            output_color_format,
            egui_wgpu::RendererOptions {
                msaa_samples: 1,
                depth_stencil_format: None,
                dithering: false,
                ..Default::default()
            },
        );

        Self {
            context,
            state,
            renderer,
            commands,
        }
    }

    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.state.on_window_event(window, event);
        response.consumed
    }

    pub fn render(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &Window,
        view: &wgpu::TextureView,
        ui_state: &mut UiState,
    ) {
        let raw_input = self.state.take_egui_input(window);

        let full_output = self.context.run(raw_input, |ctx| {
            Self::ui(ctx, ui_state, &self.commands);
        });

        self.state
            .handle_platform_output(window, full_output.platform_output);

        let clipped_primitives = self
            .context
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let size = window.inner_size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &clipped_primitives,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Egui Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();

            self.renderer
                .render(&mut render_pass, &clipped_primitives, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }

    fn ui(ctx: &Context, state: &mut UiState, commands: &Sender<ControlCommand>) {
        let send = |command: ControlCommand| {
            if commands.send(command).is_err() {
                log::warn!("Control channel closed, dropping {:?}", command);
            }
        };

        // Diagnostics Panel (Top Left)
        egui::Window::new("Diagnostics")
            .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.label(format!("FPS: {:.1}", state.fps));
                ui.label(format!("Frame Time: {:.2} ms", state.frame_time));
            });

        // Statistics Panel (Top Right)
        egui::Window::new("Statistics")
            .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.heading("Photons");
                ui.label(format!("Live: {} / {}", state.photon_count, MAX_PHOTONS));
                ui.label(format!("Trails: {}", state.trail_count));
                ui.separator();
                ui.label(if state.is_paused { "Paused" } else { "Running" });
            });

        // Controls (Bottom Left)
        egui::Window::new("Controls")
            .anchor(egui::Align2::LEFT_BOTTOM, [10.0, -10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                let settings = &mut state.settings;

                ui.heading("Scene");
                ui.add(
                    egui::Slider::new(&mut settings.rotation_speed, Settings::ROTATION_SPEED_RANGE)
                        .text("Rotation Speed"),
                );
                ui.add(
                    egui::Slider::new(
                        &mut settings.sphere_transparency,
                        Settings::SPHERE_TRANSPARENCY_RANGE,
                    )
                    .text("Sphere Opacity"),
                );

                ui.separator();
                ui.heading("Photons");
                ui.add(
                    egui::Slider::new(&mut settings.photon_speed, Settings::PHOTON_SPEED_RANGE)
                        .text("Speed"),
                );
                ui.add(
                    egui::Slider::new(&mut settings.step_distance, Settings::STEP_DISTANCE_RANGE)
                        .text("Step Distance"),
                );
                ui.add(
                    egui::Slider::new(&mut settings.photon_size, Settings::PHOTON_SIZE_RANGE)
                        .text("Size"),
                );

                ui.separator();
                ui.horizontal(|ui| {
                    let can_add = state.photon_count < MAX_PHOTONS;
                    if ui
                        .add_enabled(can_add, egui::Button::new("Add Photon"))
                        .clicked()
                    {
                        send(ControlCommand::AddPhoton);
                    }
                    if ui.button("Reset").clicked() {
                        send(ControlCommand::Reset);
                    }
                });
                ui.horizontal(|ui| {
                    let label = if state.is_paused { "Resume" } else { "Pause" };
                    if ui.button(label).clicked() {
                        send(ControlCommand::TogglePause);
                    }
                    if ui
                        .add_enabled(state.is_paused, egui::Button::new("Step"))
                        .clicked()
                    {
                        send(ControlCommand::StepFrame);
                    }
                });

                ui.separator();
                if ui.button("Export Scene (.glb)").clicked() {
                    send(ControlCommand::Export);
                }
                if let Some(status) = &state.export_status {
                    ui.label(status.as_str());
                }
            });
    }
}
