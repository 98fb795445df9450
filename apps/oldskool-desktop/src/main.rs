use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use oldskool_audio::AudioOutput;
use oldskool_common::consts::{HOST_PLAYBACK_VOLUME, SCREEN_HEIGHT, SCREEN_WIDTH, TICK_RATE_HZ};
use oldskool_kernel::{Demo, DemoEvent, DemoOptions, FrameTimer};
use oldskool_render_wgpu::FramePresenter;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

const WINDOW_TITLE: &str = "TEAMG1 Demo - A Tribute to the Golden Age";

#[derive(Parser)]
#[command(name = "oldskool-desktop", about = "Oldskool demo player")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Asset directory (font.png, logos, texture.png, music.ym)
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// Run without sound
    #[arg(long)]
    no_audio: bool,

    /// Initial music volume in [0, 1]
    #[arg(long, default_value = "1.0")]
    volume: f64,

    /// Start in fullscreen
    #[arg(long)]
    fullscreen: bool,

    /// Go straight to the main scene
    #[arg(long)]
    skip_intro: bool,
}

/// Application state.
struct AppState {
    demo: Demo,
    audio_out: Option<AudioOutput>,
    timer: FrameTimer,
    show_overlay: bool,
    volume: f64,
    last_frame: Instant,
    // Fixed timestep
    tick_accumulator: f64,
    tick_rate: f64,
}

impl AppState {
    fn new(demo: Demo, volume: f64) -> Self {
        if let Some(decoder) = demo.audio() {
            decoder.set_volume(volume);
        }
        Self {
            demo,
            audio_out: None,
            timer: FrameTimer::new(120),
            show_overlay: false,
            volume: volume.clamp(0.0, 1.0),
            last_frame: Instant::now(),
            tick_accumulator: 0.0,
            tick_rate: 1.0 / TICK_RATE_HZ,
        }
    }

    fn update(&mut self, dt: f64) {
        self.tick_accumulator += dt;
        while self.tick_accumulator >= self.tick_rate {
            self.tick_accumulator -= self.tick_rate;
            self.demo.update(self.tick_rate);
        }
        for event in self.demo.drain_events() {
            match event {
                DemoEvent::IntroComplete => tracing::info!("intro complete"),
                DemoEvent::StartAudio => self.start_audio(),
            }
        }
    }

    fn start_audio(&mut self) {
        let Some(decoder) = self.demo.audio() else {
            return;
        };
        match AudioOutput::open(Arc::clone(decoder), HOST_PLAYBACK_VOLUME) {
            Ok(out) => {
                if let Err(e) = out.play() {
                    tracing::warn!("audio playback failed: {e}");
                }
                self.audio_out = Some(out);
            }
            Err(e) => tracing::warn!("audio output unavailable: {e}"),
        }
    }

    fn teardown(&mut self) {
        if let Some(out) = self.audio_out.take() {
            if let Err(e) = out.pause() {
                tracing::debug!("pausing audio on exit: {e}");
            }
        }
        self.demo.teardown();
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_overlay {
            return;
        }
        egui::Window::new("oldskool")
            .default_pos([8.0, 8.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!(
                    "FPS: {:.1}  (avg {:.2} ms, max {:.2} ms)",
                    self.timer.fps(),
                    self.timer.average().as_secs_f64() * 1000.0,
                    self.timer.max().as_secs_f64() * 1000.0
                ));
                let status = self.demo.status();
                ui.label(format!(
                    "{:?}  tick {}  fade {:.2}",
                    status.phase, status.tick, status.fade
                ));
                ui.separator();
                match (&status.track, self.demo.audio()) {
                    (Some(track), Some(decoder)) => {
                        ui.label(format!("\"{}\" by {}", track.title, track.author));
                        let secs = status.audio_position.unwrap_or(0) as f64
                            / decoder.sample_rate() as f64;
                        ui.label(format!(
                            "position {:.1}s / {:.1}s{}",
                            secs,
                            track.duration_ms as f64 / 1000.0,
                            if self.audio_out.as_ref().is_some_and(|o| o.is_playing()) {
                                ""
                            } else {
                                " (stopped)"
                            }
                        ));
                        if ui
                            .add(egui::Slider::new(&mut self.volume, 0.0..=1.0).text("volume"))
                            .changed()
                        {
                            decoder.set_volume(self.volume);
                        }
                    }
                    _ => {
                        ui.label("no audio");
                    }
                }
                ui.separator();
                ui.label("F: fullscreen | F1: overlay | Esc: quit");
            });
    }
}

struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    presenter: FramePresenter,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    state: AppState,
    start_fullscreen: bool,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(state: AppState, start_fullscreen: bool) -> Self {
        Self {
            state,
            start_fullscreen,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn init_gpu(&self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let mut attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(PhysicalSize::new(SCREEN_WIDTH, SCREEN_HEIGHT));
        if self.start_fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("find adapter")?;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("oldskool_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
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
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let presenter = FramePresenter::new(&device, surface_format, SCREEN_WIDTH, SCREEN_HEIGHT);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );
        Ok(Gpu {
            window,
            surface,
            device,
            queue,
            config,
            presenter,
            egui_winit,
            egui_renderer,
        })
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.state.teardown();
        if let Some(gpu) = &mut self.gpu {
            gpu.presenter.dispose();
        }
        event_loop.exit();
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode) {
        match key {
            KeyCode::Escape => self.shutdown(event_loop),
            KeyCode::F1 => self.state.show_overlay = !self.state.show_overlay,
            KeyCode::KeyF => {
                if let Some(gpu) = &self.gpu {
                    let next = if gpu.window.fullscreen().is_some() {
                        None
                    } else {
                        Some(Fullscreen::Borderless(None))
                    };
                    gpu.window.set_fullscreen(next);
                }
            }
            _ => {}
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let elapsed = now - self.state.last_frame;
        self.state.last_frame = now;
        self.state.timer.record(elapsed);
        self.state.update(elapsed.as_secs_f64().min(0.1));

        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let frame = self.state.demo.draw();
        gpu.presenter.upload(&gpu.queue, &frame.canvas);
        gpu.presenter.render(
            &gpu.device,
            &gpu.queue,
            &view,
            (gpu.config.width, gpu.config.height),
            frame.crt_band,
        );

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };
        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
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
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => {
                self.state.last_frame = Instant::now();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize graphics: {e:#}");
                self.shutdown(event_loop);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(&gpu.device, &gpu.config);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, key),
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("oldskool-desktop starting");

    let demo = Demo::from_dir(
        &cli.assets,
        DemoOptions {
            skip_intro: cli.skip_intro,
            audio: !cli.no_audio,
        },
    )?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(AppState::new(demo, cli.volume), cli.fullscreen);
    event_loop.run_app(&mut app)?;
    app.state.teardown();

    Ok(())
}
