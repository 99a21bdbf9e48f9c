use crate::color::{Color, ColorError};
use crate::scene::serialization::{MaterialData, ModelData, ShapeData};
use crate::scene::{
    compose_transform_matrix, Material, Mesh, NodeId, SceneGraph, MAX_SPHERE_DIVISIONS,
};
use glam::{Mat4, Vec3};

#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub name: String,
    pub root: NodeId,
    pub center: [f32; 3],
    pub extent: [f32; 3],
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("model '{name}' has no parts")]
    EmptyModel { name: String },
    #[error("model '{name}' has a zero or non-finite scale {scale:?}")]
    DegenerateScale { name: String, scale: [f32; 3] },
    #[error("part '{part}' has invalid shape: {reason}")]
    InvalidShape { part: String, reason: String },
    #[error("part '{part}' material '{material}': {source}")]
    MaterialColor {
        part: String,
        material: String,
        #[source]
        source: ColorError,
    },
    #[error("failed to attach '{name}' to the scene")]
    Attach { name: String },
}

/// Turns model descriptions into positioned, scaled subtrees of a
/// [`SceneGraph`] and remembers which roots it attached.
#[derive(Default)]
pub struct AssetManager {
    loaded_assets: Vec<LoadedAsset>,
}

impl AssetManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loaded_assets(&self) -> &[LoadedAsset] {
        &self.loaded_assets
    }

    pub fn roots(&self) -> Vec<NodeId> {
        self.loaded_assets.iter().map(|asset| asset.root).collect()
    }

    /// Builds every part before touching the graph, so a bad part leaves the
    /// scene unchanged.
    pub fn instantiate(
        &mut self,
        scene: &mut SceneGraph,
        model: &ModelData,
    ) -> Result<LoadedAsset, AssetError> {
        if model.parts.is_empty() {
            return Err(AssetError::EmptyModel {
                name: model.name.clone(),
            });
        }
        if model.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err(AssetError::DegenerateScale {
                name: model.name.clone(),
                scale: model.scale,
            });
        }

        let mut built = Vec::with_capacity(model.parts.len());
        for part in &model.parts {
            let mesh = build_mesh(&part.name, &part.shape)?;
            let materials = part
                .materials
                .iter()
                .map(|data| build_material(&part.name, data))
                .collect::<Result<Vec<_>, _>>()?;
            built.push((part, mesh, materials));
        }

        let attach_error = || AssetError::Attach {
            name: model.name.clone(),
        };
        let root = scene.add_group(None, model.name.clone()).ok_or_else(attach_error)?;
        scene.set_transform(
            root,
            compose_transform_matrix(model.position, model.rotation_deg, model.scale),
        );
        for (part, mesh, materials) in built {
            let node = scene
                .add_mesh(Some(root), part.name.clone(), mesh, materials)
                .ok_or_else(attach_error)?;
            scene.set_transform(node, Mat4::from_translation(Vec3::from(part.offset)));
        }

        let bounds = scene.subtree_bounds(root);
        let loaded = LoadedAsset {
            name: model.name.clone(),
            root,
            center: bounds.center().to_array(),
            extent: bounds.extent().to_array(),
        };
        log::info!(
            "Attached model '{}' ({} parts) center={:?} extent={:?}",
            loaded.name,
            model.parts.len(),
            loaded.center,
            loaded.extent
        );
        self.loaded_assets.push(loaded.clone());
        Ok(loaded)
    }

    /// Removes a model's subtree. Returns `false` if it was not loaded here.
    pub fn detach(&mut self, scene: &mut SceneGraph, root: NodeId) -> bool {
        let Some(index) = self.loaded_assets.iter().position(|asset| asset.root == root) else {
            return false;
        };
        let asset = self.loaded_assets.remove(index);
        let removed = scene.detach(root);
        log::info!("Detached model '{}' ({} nodes)", asset.name, removed);
        true
    }

    /// Detaches everything this manager attached.
    pub fn clear(&mut self, scene: &mut SceneGraph) {
        for asset in std::mem::take(&mut self.loaded_assets) {
            scene.detach(asset.root);
        }
    }

    /// Combined center and extent of all loaded models.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = self.loaded_assets.first()?;
        let (mut min, mut max) = corners(first);
        for asset in &self.loaded_assets[1..] {
            let (lo, hi) = corners(asset);
            min = min.min(lo);
            max = max.max(hi);
        }
        Some((((min + max) * 0.5).to_array(), ((max - min) * 0.5).to_array()))
    }
}

fn corners(asset: &LoadedAsset) -> (Vec3, Vec3) {
    let center = Vec3::from(asset.center);
    let extent = Vec3::from(asset.extent);
    (center - extent, center + extent)
}

fn build_mesh(part: &str, shape: &ShapeData) -> Result<Mesh, AssetError> {
    let invalid = |reason: &str| AssetError::InvalidShape {
        part: part.to_string(),
        reason: reason.to_string(),
    };
    match *shape {
        ShapeData::Sphere {
            radius,
            segments,
            rings,
        } => {
            if !(radius.is_finite() && radius > 0.0) {
                return Err(invalid("sphere radius must be positive"));
            }
            if segments < 3 || rings < 2 {
                return Err(invalid("sphere needs at least 3 segments and 2 rings"));
            }
            if segments > MAX_SPHERE_DIVISIONS || rings > MAX_SPHERE_DIVISIONS {
                return Err(invalid("sphere has too many segments or rings"));
            }
            Ok(Mesh::uv_sphere(radius, segments, rings))
        }
        ShapeData::Cuboid { half_extents } => {
            if half_extents.iter().any(|h| !(h.is_finite() && *h > 0.0)) {
                return Err(invalid("cuboid half extents must be positive"));
            }
            Ok(Mesh::cuboid(Vec3::from(half_extents)))
        }
    }
}

fn build_material(part: &str, data: &MaterialData) -> Result<Material, AssetError> {
    let parse = |name: &str, hex: &str| {
        Color::from_hex(hex).map_err(|source| AssetError::MaterialColor {
            part: part.to_string(),
            material: name.to_string(),
            source,
        })
    };
    Ok(match data {
        MaterialData::Standard { name, color } => Material::standard(name.clone(), parse(name, color)?),
        MaterialData::Unlit { name, color } => Material::unlit(name.clone(), parse(name, color)?),
        MaterialData::Textured { name, texture } => Material::textured(name.clone(), texture.clone()),
    })
}
