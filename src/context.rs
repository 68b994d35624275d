//! GPU and window context.
//!
//! [`Gpu`] owns everything needed to draw a [`Frame`]: device, queue, the
//! shader and texture libraries that [`ShaderId`]s and [`TextureId`]s index
//! into, and the [`Renderer`]. It does not need a window, which is what the
//! offscreen tests rely on. [`Context`] adds the window, its surface, the depth
//! buffer and the application settings.

use std::{rc::Rc, sync::Arc};

use anyhow::{Context as _, anyhow};
use log::{debug, info};
use winit::window::Window;

use crate::{
    config::Config,
    data_structures::{
        material::TextureId,
        shape::{Geometry, Shape},
        state::ShaderId,
        texture::Texture,
    },
    pipelines::{
        Layouts,
        shape::{SHAPE_SHADER, mk_shape_pipeline},
    },
    render::{Frame, Library, Renderer},
    resources::{self, texture::texture_bind_group},
};

pub struct Gpu {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub layouts: Layouts,
    color_format: wgpu::TextureFormat,
    pipelines: Vec<wgpu::RenderPipeline>,
    textures: Vec<wgpu::BindGroup>,
    white: wgpu::BindGroup,
    renderer: Renderer,
}

impl Gpu {
    /// Set up layouts, the built-in shape shader (`ShaderId(0)`), the white
    /// fallback texture and the renderer for targets of `color_format`.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, color_format: wgpu::TextureFormat) -> Self {
        let layouts = Layouts::new(&device);
        let white = Texture::create_solid(&device, &queue, [255; 4], "white");
        let white = texture_bind_group(&device, &layouts.texture, &white, "white_bind_group");
        let renderer = Renderer::new(&device, &layouts.draw);
        let mut gpu = Self {
            device,
            queue,
            layouts,
            color_format,
            pipelines: Vec::new(),
            textures: Vec::new(),
            white,
            renderer,
        };
        gpu.create_shader("Shape Shader", SHAPE_SHADER);
        gpu
    }

    /// A device without a surface, drawing into textures of `color_format`.
    pub async fn headless(color_format: wgpu::TextureFormat) -> anyhow::Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::new_without_display_handle());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter available")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("headless device"),
                ..Default::default()
            })
            .await?;
        Ok(Self::new(device, queue, color_format))
    }

    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.color_format
    }

    /// Compile WGSL with the shape layouts and register it.
    pub fn create_shader(&mut self, label: &str, wgsl: &str) -> ShaderId {
        let pipeline =
            mk_shape_pipeline(&self.device, &self.layouts, self.color_format, label, wgsl);
        self.pipelines.push(pipeline);
        debug!("registered shader {label} as {}", self.pipelines.len() - 1);
        ShaderId(self.pipelines.len() - 1)
    }

    pub fn add_texture(&mut self, texture: &Texture, label: &str) -> TextureId {
        let bind_group = texture_bind_group(&self.device, &self.layouts.texture, texture, label);
        self.textures.push(bind_group);
        TextureId(self.textures.len() - 1)
    }

    pub fn shader_count(&self) -> usize {
        self.pipelines.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Upload a shape once; share the result between nodes.
    pub fn geometry(&self, shape: Shape) -> Rc<Geometry> {
        Rc::new(Geometry::upload(shape, &self.device))
    }

    /// Record one render pass drawing `frame` into `color`, depth-tested against `depth`.
    pub fn encode(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        frame: &Frame,
        color: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        clear_colour: wgpu::Color,
    ) {
        self.renderer
            .prepare(&self.device, &self.queue, &self.layouts.draw, frame);
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });
        let library = Library {
            pipelines: &self.pipelines,
            textures: &self.textures,
            white: &self.white,
        };
        self.renderer.draw(&mut render_pass, frame, &library);
    }
}

pub struct Context {
    pub window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
    pub(crate) depth_texture: Texture,
    pub gpu: Gpu,
    pub settings: Config,
    runtime: tokio::runtime::Handle,
}

impl Context {
    pub async fn new(
        window: Arc<Window>,
        settings: Config,
        runtime: tokio::runtime::Handle,
    ) -> anyhow::Result<Self> {
        let size = window.inner_size();

        info!("WGPU setup");
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..wgpu::InstanceDescriptor::new_without_display_handle()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can present to this window")?;
        info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                ..Default::default()
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader writes linear colours, so prefer an sRGB surface.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow!("surface supports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let depth_texture =
            Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");
        let gpu = Gpu::new(device, queue, surface_format);

        Ok(Self {
            window,
            surface,
            config,
            depth_texture,
            gpu,
            settings,
            runtime,
        })
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.gpu.device, &self.config);
        self.depth_texture = Texture::create_depth_texture(
            &self.gpu.device,
            [self.config.width, self.config.height],
            "depth_texture",
        );
    }

    pub fn geometry(&self, shape: Shape) -> Rc<Geometry> {
        self.gpu.geometry(shape)
    }

    /// Load images from the asset directory concurrently and register them as textures.
    ///
    /// Fails on the first image that cannot be read or decoded.
    pub fn load_textures(&mut self, names: &[&str]) -> anyhow::Result<Vec<TextureId>> {
        let gpu = &self.gpu;
        let asset_dir = &self.settings.asset_dir;
        let loads = names
            .iter()
            .map(|name| resources::load_texture(asset_dir, name, &gpu.device, &gpu.queue));
        let textures = self
            .runtime
            .block_on(futures::future::try_join_all(loads))?;
        Ok(names
            .iter()
            .zip(&textures)
            .map(|(name, texture)| self.gpu.add_texture(texture, name))
            .collect())
    }

    pub fn load_texture(&mut self, name: &str) -> anyhow::Result<TextureId> {
        let mut ids = self.load_textures(&[name])?;
        ids.pop().ok_or_else(|| anyhow!("texture {name} was not registered"))
    }

    /// Read a WGSL file from the asset directory and register it as a shader.
    pub fn load_shader(&mut self, file_name: &str) -> anyhow::Result<ShaderId> {
        let source = self
            .runtime
            .block_on(resources::load_string(&self.settings.asset_dir, file_name))?;
        Ok(self.gpu.create_shader(file_name, &source))
    }
}
