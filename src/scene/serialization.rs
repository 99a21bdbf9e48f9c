//! JSON scene description: which models to attach, where, and the initial
//! camera and selection color.

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SerializationError>;

pub const DEFAULT_SELECTED_COLOR: &str = "#ff0000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraData {
    pub position: [f32; 3],
    pub target: [f32; 3],
    #[serde(default = "default_fov_deg")]
    pub fov_deg: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
}

impl Default for CameraData {
    fn default() -> Self {
        Self {
            position: [0.0, 10.0, 25.0],
            target: [0.0, 0.0, 0.0],
            fov_deg: default_fov_deg(),
            near: default_near(),
            far: default_far(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShapeData {
    Sphere {
        radius: f32,
        #[serde(default = "default_segments")]
        segments: u32,
        #[serde(default = "default_rings")]
        rings: u32,
    },
    Cuboid {
        half_extents: [f32; 3],
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MaterialData {
    Standard { name: String, color: String },
    Unlit { name: String, color: String },
    Textured { name: String, texture: String },
}

/// One mesh-bearing child of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartData {
    pub name: String,
    pub shape: ShapeData,
    #[serde(default)]
    pub offset: [f32; 3],
    /// Empty means the part arrives without a material.
    #[serde(default)]
    pub materials: Vec<MaterialData>,
}

/// A logical model, positioned and scaled as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelData {
    pub name: String,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default)]
    pub rotation_deg: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
    pub parts: Vec<PartData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    /// When absent the camera frames the loaded models.
    #[serde(default)]
    pub camera: Option<CameraData>,
    #[serde(default = "default_selected_color")]
    pub selected_color: String,
    #[serde(default)]
    pub models: Vec<ModelData>,
}

impl SceneDescription {
    /// Upper and lower jaw stand-ins, one above the other, scaled down to a
    /// tenth like the loaded dental scans they replace.
    pub fn demo() -> Self {
        let jaw = |name: &str, y: f32, crown_color: &str| ModelData {
            name: name.to_string(),
            position: [0.0, y, 0.0],
            rotation_deg: [0.0, 0.0, 0.0],
            scale: [0.1, 0.1, 0.1],
            parts: vec![
                PartData {
                    name: format!("{}_arch", name),
                    shape: ShapeData::Cuboid {
                        half_extents: [30.0, 6.0, 15.0],
                    },
                    offset: [0.0, 0.0, 0.0],
                    materials: Vec::new(),
                },
                PartData {
                    name: format!("{}_crown_left", name),
                    shape: ShapeData::Sphere {
                        radius: 8.0,
                        segments: default_segments(),
                        rings: default_rings(),
                    },
                    offset: [-15.0, 0.0, 18.0],
                    materials: vec![
                        MaterialData::Standard {
                            name: "enamel".to_string(),
                            color: crown_color.to_string(),
                        },
                        MaterialData::Standard {
                            name: "enamel_inner".to_string(),
                            color: crown_color.to_string(),
                        },
                    ],
                },
                PartData {
                    name: format!("{}_crown_right", name),
                    shape: ShapeData::Sphere {
                        radius: 8.0,
                        segments: default_segments(),
                        rings: default_rings(),
                    },
                    offset: [15.0, 0.0, 18.0],
                    materials: vec![MaterialData::Textured {
                        name: "scan".to_string(),
                        texture: format!("{}_scan.png", name),
                    }],
                },
            ],
        };
        Self {
            camera: Some(CameraData::default()),
            selected_color: default_selected_color(),
            models: vec![jaw("maxilla", 5.0, "#f5f0e1"), jaw("mandible", -5.0, "#efe8d6")],
        }
    }
}

pub fn parse_scene(json: &str) -> Result<SceneDescription> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_scene_from_file(path: &Path) -> Result<SceneDescription> {
    let json = std::fs::read_to_string(path)?;
    parse_scene(&json)
}

fn default_fov_deg() -> f32 {
    75.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    1000.0
}

fn default_segments() -> u32 {
    32
}

fn default_rings() -> u32 {
    16
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_selected_color() -> String {
    DEFAULT_SELECTED_COLOR.to_string()
}
