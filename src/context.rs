//! GPU and window context shared by every flow.

use std::sync::Arc;

use anyhow::Context as _;
use winit::window::Window;

use crate::{
    camera::{Camera, CameraResources, Projection},
    config::Palette,
    data_structures::{model, texture::DepthTexture},
    pipelines::{
        light::{LightResources, LightUniform},
        lit::{mk_lit_pipeline, mk_scene_layout},
        particle::mk_particle_pipeline,
    },
};

/// Id of the element the canvas is appended to in the browser.
pub const CONTAINER_ID: &str = "lily-garden";

#[derive(Debug)]
pub struct Pipelines {
    pub lit: wgpu::RenderPipeline,
    pub particle: wgpu::RenderPipeline,
}

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: DepthTexture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub light: LightResources,
    pub clear_colour: wgpu::Color,
    pub pipelines: Pipelines,
    pub material_layout: wgpu::BindGroupLayout,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Unable to create a render surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No graphics adapter is compatible with the surface")?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Unable to open the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Palette colours are linear, an sRGB surface encodes them on write.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("The surface reports no texture formats")?;
        let present_mode = surface_caps
            .present_modes
            .first()
            .copied()
            .unwrap_or(wgpu::PresentMode::Fifo);
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
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let projection = Projection::new(config.width, config.height, cgmath::Deg(75.0), 0.1, 1000.0);
        let camera = CameraResources::new(&device, Camera::new((0.0, 8.0, 25.0), (0.0, 6.0, 0.0)), &projection);

        let palette = Palette::default();
        let light = LightResources::new(LightUniform::garden(palette.background), &device);

        let depth_texture = DepthTexture::new(&device, (config.width, config.height));

        let material_layout = model::material_layout(&device);
        let scene_layout = mk_scene_layout(
            &device,
            &material_layout,
            &camera.bind_group_layout,
            &light.bind_group_layout,
        );
        let pipelines = Pipelines {
            lit: mk_lit_pipeline(&device, &config, &scene_layout),
            particle: mk_particle_pipeline(&device, &config, &scene_layout),
        };

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            light,
            clear_colour: clear_colour(palette.background),
            pipelines,
            material_layout,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Clears to `background` and fades distant geometry into it.
    pub fn set_background(&mut self, background: [f32; 3]) {
        self.clear_colour = clear_colour(background);
        self.light.uniform.fog_color = background;
        self.light.write(&self.queue);
    }

    /// Removes the canvas from the page, leaving the container as it was
    /// before [`attach_canvas`].
    pub fn detach(&self) {
        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowExtWebSys;
            if let Some(canvas) = self.window.canvas() {
                canvas.remove();
            }
        }
    }
}

pub fn clear_colour([r, g, b]: [f32; 3]) -> wgpu::Color {
    wgpu::Color {
        r: r as f64,
        g: g as f64,
        b: b as f64,
        a: 1.0,
    }
}

/// Appends the window's canvas to the element with id `container`, or to
/// the document body when there is no such element.
#[cfg(target_arch = "wasm32")]
pub fn attach_canvas(window: &Window, container: &str) -> anyhow::Result<()> {
    use winit::platform::web::WindowExtWebSys;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .context("No document to attach the canvas to")?;
    let canvas = window.canvas().context("The window has no canvas")?;
    let parent: web_sys::Element = match document.get_element_by_id(container) {
        Some(element) => element,
        None => {
            log::warn!("No element with id '{}', attaching to the body", container);
            document.body().context("The document has no body")?.into()
        }
    };
    parent
        .append_child(&canvas)
        .map_err(|e| anyhow::anyhow!("Unable to attach the canvas: {:?}", e))?;
    Ok(())
}

/// The subset of [`Context`] handed to flow constructors.
#[derive(Debug, Clone)]
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub format: wgpu::TextureFormat,
    pub material_layout: wgpu::BindGroupLayout,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
            format: ctx.config.format,
            material_layout: ctx.material_layout.clone(),
        }
    }
}
