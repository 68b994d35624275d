//! Colours, textures and the material state they build up during traversal.

/// Handle of a texture registered with the GPU context.
///
/// Handles are plain indices, so the same texture can be referenced by any
/// number of nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// Linear RGBA colour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba(pub [f32; 4]);

impl Rgba {
    pub const WHITE: Rgba = Rgba([1.0, 1.0, 1.0, 1.0]);

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Rgba([r, g, b, 1.0])
    }

    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Rgba([r, g, b, a])
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<[f32; 3]> for Rgba {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Rgba::rgb(r, g, b)
    }
}

/// A visual attribute a node binds for everything below it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Material {
    Color(Rgba),
    Texture(TextureId),
}

impl Material {
    pub fn color(r: f32, g: f32, b: f32) -> Self {
        Material::Color(Rgba::rgb(r, g, b))
    }
}

impl From<Rgba> for Material {
    fn from(color: Rgba) -> Self {
        Material::Color(color)
    }
}

impl From<TextureId> for Material {
    fn from(texture: TextureId) -> Self {
        Material::Texture(texture)
    }
}

/// The material in effect at some point of the traversal.
///
/// Each kind of material has one slot: a colour replaces the active colour and
/// a texture replaces the active texture. The shader multiplies the two.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MaterialState {
    pub color: Rgba,
    pub texture: Option<TextureId>,
}

impl MaterialState {
    pub fn apply(&mut self, material: &Material) {
        match *material {
            Material::Color(color) => self.color = color,
            Material::Texture(texture) => self.texture = Some(texture),
        }
    }

    pub fn applied<'a>(mut self, materials: impl IntoIterator<Item = &'a Material>) -> Self {
        materials.into_iter().for_each(|m| self.apply(m));
        self
    }
}
