mod cli;
mod framepace;
mod gpu;
mod graphics;
mod particle;
mod render;
mod view;

use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::Parser;
use framepace::Framepacer;
use glam::Vec2;
use gpu::GpuContext;
use graphics::RenderTarget;
use log::{debug, error, info, trace, warn};
use particle::ParticleSystem;
use rand::{rngs::StdRng, SeedableRng};
use render::RenderModule;
use view::View;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // Collect Arguments
    let args = cli::Args::parse();

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let particles = ParticleSystem::new(args.particles as usize, args.variant.particle_config(), rng);
    info!(
        "Spawning {} particles ({:?}, seed: {:?})",
        args.particles, args.variant, args.seed
    );
    if particles.is_empty() {
        warn!("The particle pool is empty, nothing will be drawn");
    }

    // Setup Winit
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    // State
    let mut app_state = AppState {
        tokio_rt: tokio::runtime::Runtime::new()?,
        gpu: None,
        gfx: None,
        particles,
        view: View::new(args.width, args.height),
        framepace: Framepacer::new(),

        mouse_position: Vec2::ZERO,

        window_size: PhysicalSize::new(args.width, args.height),
        frame_limit: args.frame_limit(),
        escape_closes: args.variant.escape_closes(),
        error: None,
    };

    event_loop.run_app(&mut app_state)?;

    match app_state.error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

struct GfxState {
    window: Arc<Window>,
    render_module: RenderModule,
}

struct AppState {
    tokio_rt: tokio::runtime::Runtime,
    gpu: Option<GpuContext<'static>>,
    gfx: Option<GfxState>,
    particles: ParticleSystem,
    view: View,
    framepace: Framepacer,

    mouse_position: Vec2,

    window_size: PhysicalSize<u32>,
    frame_limit: Option<std::time::Duration>,
    escape_closes: bool,
    error: Option<anyhow::Error>,
}

impl AppState {
    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = Arc::new(
            event_loop
                .create_window(
                    Window::default_attributes()
                        .with_title("Particles")
                        .with_inner_size(self.window_size)
                        .with_resizable(false),
                )
                .context("Failed to create the window")?,
        );

        let gpu = self.tokio_rt.block_on(GpuContext::new(window.clone()))?;
        info!("Surface format: {:?}", gpu.surface_format());

        let render_module =
            RenderModule::new(&gpu.device, gpu.surface_format(), self.particles.len());

        self.gfx = Some(GfxState {
            window,
            render_module,
        });
        self.gpu = Some(gpu);

        // Window and device creation must not count as the first frame
        self.framepace.reset();
        Ok(())
    }

    fn render_frame(&mut self) -> anyhow::Result<()> {
        let (Some(gpu), Some(gfx)) = (&mut self.gpu, &mut self.gfx) else {
            return Ok(());
        };

        let elapsed = self.framepace.begin_frame();
        trace!("{:.1} FPS", self.framepace.framerate());

        let window_size = gfx.window.inner_size();
        let window_size = Vec2::new(window_size.width as f32, window_size.height as f32);
        self.particles
            .set_emitter(self.view.map_pixel_to_coords(self.mouse_position, window_size));
        self.particles.update(elapsed);

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost, reconfiguring");
                gpu.reconfigure_surface();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(()),
            Err(err) => return Err(anyhow!(err).context("Failed to acquire the next frame")),
        };

        gfx.render_module
            .batch(&gpu.device, &gpu.queue, &self.view)
            .draw(&self.particles);

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

        // Render
        {
            let view = frame
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default());

            let _rpass = gfx.render_module.begin_pass(&mut encoder, &view);
        }

        gpu.queue.submit(Some(encoder.finish()));
        frame.present();

        self.framepace.end_frame(self.frame_limit);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gfx.is_some() {
            return;
        }

        if let Err(error) = self.init_graphics(event_loop) {
            self.fail(event_loop, error);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                debug!("Resized to {}x{}", new_size.width, new_size.height);
                gpu.resize(new_size.width, new_size.height);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let (ElementState::Pressed, PhysicalKey::Code(KeyCode::Escape)) =
                    (event.state, event.physical_key)
                {
                    if self.escape_closes {
                        event_loop.exit();
                    }
                }
            }
            // Outside the window the emitter stays at the last reported position
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_position = Vec2::new(position.x as f32, position.y as f32);
            }

            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(error) = self.render_frame() {
            self.fail(event_loop, error);
        }
    }
}
