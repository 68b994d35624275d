#![allow(dead_code)]

use std::rc::Rc;

use orbit_ngin::{
    Geometry, Material, MovePointer, Node, Rgba, Scene, ShaderId, Shape, Transform,
    TransformHandle, Transforms, render::DrawCall,
};

/// Handles of the animated transforms in [`solar_system`].
pub(crate) struct SolarSystem {
    pub scene: Scene,
    pub earth_orbit: TransformHandle,
    pub moon_orbit: TransformHandle,
    pub earth_moon_orbit: TransformHandle,
    pub mercury_orbit: TransformHandle,
}

pub(crate) fn transform(build: impl FnOnce(&mut Transform)) -> Transform {
    let mut transform = Transform::new();
    build(&mut transform);
    transform
}

/// The sun/earth/moon/mercury hierarchy of the solar demo with headless
/// geometry and colours only. Draw order: space, sun, mercury, moon, earth.
pub(crate) fn solar_system() -> SolarSystem {
    let shader = ShaderId::default();
    let disk = Rc::new(Geometry::headless(Shape::default_disk()));
    let square = Rc::new(Geometry::headless(Shape::Square));
    let mut transforms = Transforms::new();

    let space_trans = transforms.insert(transform(|t| {
        t.translate(0.0, 0.0, 0.0).scale(30.0, 20.0, 1.0);
    }));
    let sun_scale = transforms.insert(transform(|t| {
        t.scale(3.0, 3.0, 1.0).translate(0.0, 0.0, 1.0);
    }));
    let earth_orbit = transforms.insert(Transform::new());
    let moon_trans_scale = transforms.insert(transform(|t| {
        t.translate(2.0, 0.0, 0.0).scale(0.25, 0.25, 1.0);
    }));
    let moon_orbit = transforms.insert(Transform::new());
    let earth_moon_trans = transforms.insert(transform(|t| {
        t.translate(15.0, 0.0, 1.0);
    }));
    let earth_moon_orbit = transforms.insert(Transform::new());
    let mercury_trans = transforms.insert(transform(|t| {
        t.translate(8.0, 0.0, 1.0).scale(0.5, 0.5, 1.0);
    }));
    let mercury_orbit = transforms.insert(Transform::new());

    let body = |handle, color: Rgba| {
        Node::new(shader)
            .with_transform(handle)
            .with_material(color)
            .with(disk.clone())
    };
    let space = Node::new(shader)
        .with_transform(space_trans)
        .with_material(Material::color(0.8, 0.8, 0.8))
        .with(square);
    let moon = body(moon_trans_scale, Rgba::rgb(0.6, 0.6, 0.6));
    let earth = body(earth_orbit, Rgba::rgb(0.0, 0.0, 1.0));
    let earth_moon = Node::new(shader)
        .with_transform(earth_moon_trans)
        .with(Node::new(shader).with_transform(moon_orbit).with(moon))
        .with(earth);
    let root = Node::new(shader)
        .with(space)
        .with(body(sun_scale, Rgba::rgb(1.0, 1.0, 0.0)))
        .with(
            Node::new(shader)
                .with_transform(mercury_orbit)
                .with(body(mercury_trans, Rgba::rgb(1.0, 0.5, 0.0))),
        )
        .with(
            Node::new(shader)
                .with_transform(earth_moon_orbit)
                .with(earth_moon),
        );

    let mut scene = Scene::new(root, transforms).expect("all handles belong to the arena");
    scene
        .add_engine(MovePointer::new(moon_orbit, 28.0).unwrap())
        .unwrap();
    scene
        .add_engine(MovePointer::yearly(earth_moon_orbit))
        .unwrap();
    scene
        .add_engine(MovePointer::new(earth_orbit, 100.0).unwrap())
        .unwrap();
    scene
        .add_engine(MovePointer::new(mercury_orbit, 88.0).unwrap())
        .unwrap();

    SolarSystem {
        scene,
        earth_orbit,
        moon_orbit,
        earth_moon_orbit,
        mercury_orbit,
    }
}

/// Where the origin of the drawn shape ends up in world space.
pub(crate) fn world_origin(call: &DrawCall) -> [f32; 3] {
    let p = call.world * cgmath::Vector4::new(0.0, 0.0, 0.0, 1.0);
    [p.x, p.y, p.z]
}

pub(crate) fn assert_close(actual: [f32; 3], expected: [f32; 3]) {
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-3, "expected {expected:?}, got {actual:?}");
    }
}

#[cfg(feature = "integration-tests")]
pub(crate) mod offscreen {
    use std::time::Duration;

    use orbit_ngin::{
        context::Gpu, data_structures::texture::Texture, render::Frame,
    };

    /// Side of the square test target. A multiple of 64 keeps rows 256-byte aligned.
    pub(crate) const SIZE: u32 = 256;

    pub(crate) fn gpu() -> Gpu {
        futures::executor::block_on(Gpu::headless(Texture::COLOR_FORMAT))
            .expect("integration tests need a GPU adapter")
    }

    pub(crate) fn pixel(colour: wgpu::Color) -> image::Rgba<u8> {
        let f_to_u8 = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        image::Rgba([
            f_to_u8(colour.r),
            f_to_u8(colour.g),
            f_to_u8(colour.b),
            f_to_u8(colour.a),
        ])
    }

    /// Draw `frame` into an offscreen texture and read it back.
    pub(crate) fn render(gpu: &mut Gpu, frame: &Frame, clear: wgpu::Color) -> image::RgbaImage {
        let extent = wgpu::Extent3d {
            width: SIZE,
            height: SIZE,
            depth_or_array_layers: 1,
        };
        let target = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Test Output Texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: gpu.color_format(),
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let depth = Texture::create_depth_texture(&gpu.device, [SIZE, SIZE], "test depth");

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Test Encoder"),
            });
        gpu.encode(&mut encoder, frame, &view, &depth.view, clear);

        let bytes_per_row = 4 * SIZE;
        let output_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            size: (bytes_per_row * SIZE) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            label: None,
            mapped_at_creation: false,
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(SIZE),
                },
            },
            extent,
        );
        gpu.queue.submit(std::iter::once(encoder.finish()));

        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        let buffer_slice = output_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).unwrap();
        });
        gpu.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(Duration::from_secs(3)),
            })
            .unwrap();
        futures::executor::block_on(rx.receive())
            .unwrap()
            .unwrap();
        let data = buffer_slice.get_mapped_range().to_vec();
        image::RgbaImage::from_raw(SIZE, SIZE, data).unwrap()
    }
}
