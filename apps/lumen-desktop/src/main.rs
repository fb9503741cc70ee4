mod ui;

use anyhow::Context as _;
use clap::Parser;
use lumen_assets::TextureHandle;
use lumen_input::{Action, InputState, Key, KeyBindings, MouseButton};
use lumen_render::FramePacket;
use lumen_render_wgpu::WgpuRenderer;
use lumen_scene::Scene;
use lumen_tools::FrameStats;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use ui::{EditorUi, FrameInfo};
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "lumen-desktop", about = "Lumen scene viewer")]
struct Cli {
    /// Scene description (YAML). The built-in demo scene is used when omitted.
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initial window width
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height
    #[arg(long, default_value = "720")]
    height: u32,

    /// Present without waiting for vertical sync
    #[arg(long)]
    no_vsync: bool,
}

fn map_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyE => Key::E,
        KeyCode::Space => Key::Space,
        KeyCode::ShiftLeft => Key::LeftShift,
        KeyCode::ShiftRight => Key::RightShift,
        KeyCode::Tab => Key::Tab,
        KeyCode::Escape => Key::Escape,
        KeyCode::F1 => Key::F1,
        _ => return None,
    })
}

fn map_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(MouseButton::Left),
        winit::event::MouseButton::Right => Some(MouseButton::Right),
        winit::event::MouseButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

/// Everything that outlives the window: the scene, input and editor state.
struct AppState {
    scene: Scene,
    input: InputState,
    bindings: KeyBindings,
    stats: FrameStats,
    ui: EditorUi,
    last_frame: Instant,
}

impl AppState {
    fn new(scene: Scene) -> Self {
        Self {
            scene,
            input: InputState::new(),
            bindings: KeyBindings::default(),
            stats: FrameStats::new(),
            ui: EditorUi::default(),
            last_frame: Instant::now(),
        }
    }

    /// Drop this frame's input when nothing gets drawn, so mouse motion
    /// does not pile up into the next frame.
    fn skip_frame(&mut self) {
        self.input.end_frame();
    }

    /// Apply bound actions. Returns false when the app should quit.
    fn apply_actions(&mut self) -> bool {
        for action in self.input.actions(&self.bindings) {
            match action {
                Action::Quit => return false,
                Action::ToggleUi => self.ui.visible = !self.ui.visible,
                Action::CycleCamera => {
                    self.scene.cycle_camera();
                }
            }
        }
        true
    }
}

/// Window, device and the renderers drawing into it.
struct GpuState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    previews: HashMap<TextureHandle, egui::TextureId>,
}

impl GpuState {
    fn init(
        event_loop: &ActiveEventLoop,
        cli: &Cli,
        scene: &Scene,
        egui_ctx: &egui::Context,
    ) -> anyhow::Result<Self> {
        let window_attrs = Window::default_attributes()
            .with_title("Lumen")
            .with_inner_size(winit::dpi::PhysicalSize::new(cli.width, cli.height));
        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .context("failed to create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;
        tracing::info!("GPU adapter: {:?}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("lumen_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
            },
            None,
        ))
        .context("failed to create device")?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("surface reports no formats")?;
        let present_mode = if cli.no_vsync {
            wgpu::PresentMode::AutoNoVsync
        } else {
            wgpu::PresentMode::AutoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer =
            WgpuRenderer::new(&device, &queue, format, config.width, config.height, scene);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let mut egui_renderer = egui_wgpu::Renderer::new(&device, format, None, 1, false);

        let mut previews = HashMap::new();
        for (handle, _) in scene.assets().textures() {
            if let Some(view) = renderer.texture_view(handle) {
                let id =
                    egui_renderer.register_native_texture(&device, view, wgpu::FilterMode::Linear);
                previews.insert(handle, id);
            }
        }

        tracing::info!(
            "GPU initialized: {}x{} format={:?} present={:?}",
            config.width,
            config.height,
            format,
            present_mode
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
            previews,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(&self.device, width, height);
    }
}

struct App {
    cli: Cli,
    state: AppState,
    gpu: Option<GpuState>,
    egui_ctx: egui::Context,
}

impl App {
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = &mut self.gpu else { return };
        let state = &mut self.state;

        let now = Instant::now();
        let dt = (now - state.last_frame).as_secs_f32().min(0.1);
        state.last_frame = now;
        state.stats.record(dt);

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                state.skip_frame();
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("surface out of memory");
                event_loop.exit();
                return;
            }
            Err(e) => {
                tracing::warn!("surface error: {e:?}");
                state.skip_frame();
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Editor first, so its capture flags apply to this frame's input.
        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let info = FrameInfo {
            window_size: (gpu.config.width, gpu.config.height),
            stats: &state.stats,
            previews: &gpu.previews,
        };
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            state.ui.show(ctx, &mut state.scene, &info);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        state
            .input
            .set_keyboard_capture(self.egui_ctx.wants_keyboard_input());
        state.input.set_mouse_capture(
            self.egui_ctx.wants_pointer_input() || self.egui_ctx.is_pointer_over_area(),
        );

        if !state.apply_actions() {
            event_loop.exit();
            return;
        }
        state.scene.update(dt, &state.input.camera_controls());
        state.input.end_frame();

        gpu.renderer.sync_materials(&gpu.device, &state.scene);
        let packet = FramePacket::extract(&state.scene);
        gpu.renderer
            .render(&gpu.device, &gpu.queue, &view, &packet);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };
        for (id, delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, delta);
        }

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        let user_buffers =
            gpu.egui_renderer
                .update_buffers(&gpu.device, &gpu.queue, &mut encoder, &tris, &screen);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();
            gpu.egui_renderer.render(&mut pass, &tris, &screen);
        }
        gpu.queue
            .submit(user_buffers.into_iter().chain(std::iter::once(encoder.finish())));

        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        frame.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match GpuState::init(event_loop, &self.cli, &self.state.scene, &self.egui_ctx) {
            Ok(gpu) => {
                let size = gpu.window.inner_size();
                self.state
                    .scene
                    .set_aspect(size.width.max(1) as f32 / size.height.max(1) as f32);
                self.state.last_frame = Instant::now();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("GPU initialization failed: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(gpu) = &mut self.gpu else { return };
        // Capture is decided per frame from egui, so input still sees
        // every event here.
        let _ = gpu.egui_winit.on_window_event(&gpu.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Window close requested");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if new_size.width == 0 || new_size.height == 0 {
                    return;
                }
                gpu.resize(new_size.width, new_size.height);
                self.state
                    .scene
                    .set_aspect(new_size.width as f32 / new_size.height as f32);
            }
            WindowEvent::Focused(false) => self.state.input.release_all(),
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    if let Some(key) = map_key(code) {
                        self.state
                            .input
                            .key_event(key, event.state == ElementState::Pressed);
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = map_button(button) {
                    self.state
                        .input
                        .mouse_button_event(button, state == ElementState::Pressed);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state
                .input
                .mouse_motion(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let scene = match &cli.scene {
        Some(path) => Scene::load(path)
            .with_context(|| format!("failed to load scene {}", path.display()))?,
        None => Scene::demo().context("failed to build demo scene")?,
    };
    tracing::info!("lumen-desktop v{} starting", env!("CARGO_PKG_VERSION"));

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        cli,
        state: AppState::new(scene),
        gpu: None,
        egui_ctx: egui::Context::default(),
    };
    event_loop.run_app(&mut app)?;
    Ok(())
}
