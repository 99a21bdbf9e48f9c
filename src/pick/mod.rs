//! Click-to-paint picking.
//!
//! A click flows through four stages, all on the caller's thread:
//! project a ray from the pixel ([`ray`]), find the nearest pickable
//! primitive ([`intersect`]) in the registry ([`registry`]), then paint it
//! with the current [`SelectionState`] ([`paint`]). Any stage can come up
//! empty, which ends the click without changing anything.

pub mod intersect;
pub mod paint;
pub mod ray;
pub mod registry;
pub mod selection;

pub use intersect::{resolve, PickHit, TIE_TOLERANCE};
pub use paint::{paint_node, PaintReport};
pub use ray::{project_ray, Ray};
pub use registry::{PickRegistry, RegistryScan};
pub use selection::SelectionState;

use crate::assets::{AssetError, AssetManager, LoadedAsset};
use crate::color::Color;
use crate::render::{CameraSnapshot, Viewport};
use crate::scene::serialization::ModelData;
use crate::scene::{compose_transform_matrix, NodeId, SceneGraph};
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickOutcome {
    pub hit: PickHit,
    pub color: Color,
    pub report: PaintReport,
}

/// Owns the scene and everything a click needs. The registry is rebuilt in
/// full after every attach, detach or reposition, and again lazily if the
/// scene was edited behind the session's back.
pub struct PickSession {
    scene: SceneGraph,
    assets: AssetManager,
    registry: PickRegistry,
    selection: SelectionState,
    viewport: Viewport,
    camera: Option<CameraSnapshot>,
}

impl PickSession {
    pub fn new(selected: Color) -> Self {
        Self {
            scene: SceneGraph::new(),
            assets: AssetManager::new(),
            registry: PickRegistry::default(),
            selection: SelectionState::new(selected),
            viewport: Viewport::default(),
            camera: None,
        }
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Direct scene access for external collaborators. Edits inside attached
    /// model subtrees are picked up by a rebuild on the next click; new roots
    /// added here are not pickable until attached through the asset manager.
    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn registry(&self) -> &PickRegistry {
        &self.registry
    }

    pub fn assets(&self) -> &AssetManager {
        &self.assets
    }

    /// Shared handle to the selection, for a color input to write through.
    pub fn selection(&self) -> SelectionState {
        self.selection.clone()
    }

    pub fn selected_color(&self) -> Color {
        self.selection.get()
    }

    pub fn set_selected_color(&self, color: Color) {
        log::debug!("Selected color {}", color);
        self.selection.set(color);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_camera(&mut self, camera: CameraSnapshot) {
        self.camera = Some(camera);
    }

    pub fn attach_model(&mut self, model: &ModelData) -> Result<LoadedAsset, AssetError> {
        let loaded = self.assets.instantiate(&mut self.scene, model)?;
        self.rebuild_registry();
        Ok(loaded)
    }

    pub fn detach_model(&mut self, root: NodeId) -> bool {
        let detached = self.assets.detach(&mut self.scene, root);
        if detached {
            self.rebuild_registry();
        }
        detached
    }

    /// Removes every attached model.
    pub fn clear(&mut self) {
        self.assets.clear(&mut self.scene);
        self.rebuild_registry();
    }

    pub fn place_model(
        &mut self,
        root: NodeId,
        position: [f32; 3],
        rotation_deg: [f32; 3],
        scale: [f32; 3],
    ) -> bool {
        let placed = self
            .scene
            .set_transform(root, compose_transform_matrix(position, rotation_deg, scale));
        if placed {
            self.rebuild_registry();
        }
        placed
    }

    pub fn rebuild_registry(&mut self) {
        let roots = self.assets.roots();
        self.registry = PickRegistry::rebuild_from(&mut self.scene, &roots);
    }

    /// Projects, resolves and paints. `None` means nothing was hit and
    /// nothing changed.
    pub fn handle_click(&mut self, pixel_x: f32, pixel_y: f32) -> Option<ClickOutcome> {
        let Some(camera) = self.camera else {
            log::debug!("Click ignored: no camera yet");
            return None;
        };
        let Some(ray) = project_ray(Vec2::new(pixel_x, pixel_y), self.viewport, &camera) else {
            log::debug!(
                "Click ({}, {}) produced no ray for viewport {}x{}",
                pixel_x,
                pixel_y,
                self.viewport.width,
                self.viewport.height
            );
            return None;
        };
        if self.registry.is_stale(&self.scene) {
            self.rebuild_registry();
        }

        let Some(hit) = resolve(&ray, &self.registry, &self.scene) else {
            log::debug!("Click ({}, {}) hit nothing", pixel_x, pixel_y);
            return None;
        };
        let color = self.selection.get();
        let report = paint_node(&mut self.scene, hit.node, color);
        log::info!(
            "Painted '{}' {} at distance {:.3} ({} slot(s), {} skipped)",
            self.node_name(hit.node).unwrap_or("?"),
            color,
            hit.distance,
            report.painted,
            report.skipped
        );
        Some(ClickOutcome { hit, color, report })
    }

    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.scene.node(id).map(|node| node.name.as_str())
    }
}
