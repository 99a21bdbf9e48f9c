use crate::color::Color;

/// Color given to meshes that arrive without any material.
pub const DEFAULT_MATERIAL_COLOR: u32 = 0xcccccc;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MaterialError {
    #[error("material '{name}' has no settable color channel")]
    NoColorChannel { name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterialKind {
    /// Lit material with a diffuse color.
    Standard { color: Color },
    /// Flat color, ignores lighting.
    Unlit { color: Color },
    /// Sampled entirely from a texture.
    Textured { texture: String },
}

/// One material slot of a mesh node.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub kind: MaterialKind,
}

impl Material {
    pub fn standard(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            kind: MaterialKind::Standard { color },
        }
    }

    pub fn unlit(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            kind: MaterialKind::Unlit { color },
        }
    }

    pub fn textured(name: impl Into<String>, texture: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: MaterialKind::Textured {
                texture: texture.into(),
            },
        }
    }

    /// Neutral gray standard material.
    pub fn default_gray() -> Self {
        Self::standard("default", Color::from_u32(DEFAULT_MATERIAL_COLOR))
    }

    pub fn diffuse(&self) -> Option<Color> {
        match &self.kind {
            MaterialKind::Standard { color } | MaterialKind::Unlit { color } => Some(*color),
            MaterialKind::Textured { .. } => None,
        }
    }

    pub fn set_diffuse(&mut self, new_color: Color) -> Result<(), MaterialError> {
        match &mut self.kind {
            MaterialKind::Standard { color } | MaterialKind::Unlit { color } => {
                *color = new_color;
                Ok(())
            }
            MaterialKind::Textured { .. } => Err(MaterialError::NoColorChannel {
                name: self.name.clone(),
            }),
        }
    }
}
