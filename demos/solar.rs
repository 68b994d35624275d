//! Sun, earth, moon and mercury on a textured backdrop.
//!
//! Textures are read from `<asset dir>/textures/`. Without them the bodies are
//! drawn in flat colours. Press `Q` to quit.

use orbit_ngin::{
    Material, MovePointer, Node, Rgba, Scene, ShaderId, Shape, TextureId, Transform, Transforms,
    camera::Camera2D,
    config::Config,
    context::Context,
    flow::{self, Stage},
};

const TEXTURES: [&str; 5] = [
    "textures/sun_tex.png",
    "textures/earth_tex.png",
    "textures/moon_tex.png",
    "textures/mercury_tex.png",
    "textures/space_tex.png",
];

/// Colour plus an optional texture for one body.
fn look(color: Rgba, texture: Option<TextureId>) -> Vec<Material> {
    std::iter::once(Material::Color(color))
        .chain(texture.map(Material::Texture))
        .collect()
}

fn build(ctx: &mut Context) -> anyhow::Result<Stage> {
    let textures: Vec<Option<TextureId>> = match ctx.load_textures(&TEXTURES) {
        Ok(ids) => ids.into_iter().map(Some).collect(),
        Err(e) => {
            log::warn!("drawing without textures: {e:#}");
            vec![None; TEXTURES.len()]
        }
    };
    let [sun_tex, earth_tex, moon_tex, mercury_tex, space_tex] = textures[..] else {
        anyhow::bail!("expected {} textures", TEXTURES.len());
    };
    let shader = ShaderId::default();
    let disk = ctx.geometry(Shape::default_disk());
    let square = ctx.geometry(Shape::Square);
    let mut transforms = Transforms::new();
    let mut place = |build: &dyn Fn(&mut Transform)| {
        let mut transform = Transform::new();
        build(&mut transform);
        transforms.insert(transform)
    };

    let space_trans = place(&|t| {
        t.translate(0.0, 0.0, 0.0).scale(30.0, 20.0, 1.0);
    });
    let sun_scale = place(&|t| {
        t.scale(3.0, 3.0, 1.0).translate(0.0, 0.0, 1.0);
    });
    let earth_orbit = place(&|_| {});
    let moon_trans_scale = place(&|t| {
        t.translate(2.0, 0.0, 0.0).scale(0.25, 0.25, 1.0);
    });
    let moon_orbit_trans = place(&|_| {});
    let earth_moon_trans = place(&|t| {
        t.translate(15.0, 0.0, 1.0);
    });
    let earth_moon_orbit_trans = place(&|_| {});
    let mercury_trans = place(&|t| {
        t.translate(8.0, 0.0, 1.0).scale(0.5, 0.5, 1.0);
    });
    let mercury_orbit_trans = place(&|_| {});

    let white = Rgba::WHITE;
    let space = Node::new(shader)
        .with_transform(space_trans)
        .with_materials(look(Rgba::rgb(0.8, 0.8, 0.8), space_tex))
        .with(square);
    let sun = Node::new(shader)
        .with_transform(sun_scale)
        .with_materials(look(white, sun_tex))
        .with(disk.clone());
    let earth = Node::new(shader)
        .with_transform(earth_orbit)
        .with_materials(look(white, earth_tex))
        .with(disk.clone());
    let moon = Node::new(shader)
        .with_transform(moon_trans_scale)
        .with_materials(look(white, moon_tex))
        .with(disk.clone());
    let moon_orbit = Node::new(shader).with_transform(moon_orbit_trans).with(moon);
    let earth_moon = Node::new(shader)
        .with_transform(earth_moon_trans)
        .with(moon_orbit)
        .with(earth);
    let earth_moon_orbit = Node::new(shader)
        .with_transform(earth_moon_orbit_trans)
        .with(earth_moon);
    let mercury = Node::new(shader)
        .with_transform(mercury_trans)
        .with_materials(look(white, mercury_tex))
        .with(disk);
    let mercury_orbit = Node::new(shader)
        .with_transform(mercury_orbit_trans)
        .with(mercury);
    let root = Node::new(shader)
        .with(space)
        .with(sun)
        .with(mercury_orbit)
        .with(earth_moon_orbit);

    let mut scene = Scene::new(root, transforms)?;
    scene.add_engine(MovePointer::new(moon_orbit_trans, 28.0)?)?;
    scene.add_engine(MovePointer::yearly(earth_moon_orbit_trans))?;
    scene.add_engine(MovePointer::new(earth_orbit, 100.0)?)?;
    scene.add_engine(MovePointer::new(mercury_orbit_trans, 88.0)?)?;

    Ok(Stage::new(scene, Camera2D::new(-20.0, 20.0, -20.0, 20.0)))
}

fn main() -> anyhow::Result<()> {
    let config = Config::from_env().with_title("solar system");
    flow::run(config, build)
}
