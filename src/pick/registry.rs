//! Flat list of pickable mesh nodes, rebuilt from the scene as a whole.
//!
//! Building is split in two phases: [`scan`] only reads the scene and
//! reports which nodes are pickable and which of those still lack a
//! material; [`assign_default_materials`] is the only step that writes.

use crate::scene::{Material, NodeId, SceneGraph};
use glam::Mat4;

/// Result of the read-only traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryScan {
    /// Mesh nodes in depth-first, document order.
    pub pickables: Vec<NodeId>,
    /// Subset of `pickables` with zero material slots.
    pub needs_default: Vec<NodeId>,
}

/// Visits every root in order and collects mesh-bearing nodes.
pub fn scan(scene: &SceneGraph, roots: &[NodeId]) -> RegistryScan {
    let mut result = RegistryScan::default();
    for &root in roots {
        for id in scene.depth_first(root) {
            let Some(mesh) = scene.node(id).and_then(|node| node.mesh()) else {
                continue;
            };
            if mesh.materials.is_empty() {
                result.needs_default.push(id);
            }
            result.pickables.push(id);
        }
    }
    result
}

/// Gives each listed mesh that still has no material the default gray one.
/// Nodes that already carry a material are left alone. Returns how many
/// nodes were changed.
pub fn assign_default_materials(scene: &mut SceneGraph, nodes: &[NodeId]) -> usize {
    let mut assigned = 0;
    for &id in nodes {
        let Some(mesh) = scene.node_mut(id).and_then(|node| node.mesh_mut()) else {
            continue;
        };
        if mesh.materials.is_empty() {
            mesh.materials.push(Material::default_gray());
            assigned += 1;
        }
    }
    assigned
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickableEntry {
    pub node: NodeId,
    pub local_to_world: Mat4,
    pub world_to_local: Mat4,
}

#[derive(Debug, Clone, Default)]
pub struct PickRegistry {
    entries: Vec<PickableEntry>,
    revision: u64,
}

impl PickRegistry {
    /// Registry over every root of the scene.
    pub fn rebuild(scene: &mut SceneGraph) -> Self {
        let roots = scene.roots().to_vec();
        Self::rebuild_from(scene, &roots)
    }

    /// Registry over the given subtrees, in the order given.
    pub fn rebuild_from(scene: &mut SceneGraph, roots: &[NodeId]) -> Self {
        let scanned = scan(scene, roots);
        let assigned = assign_default_materials(scene, &scanned.needs_default);

        let mut entries = Vec::with_capacity(scanned.pickables.len());
        for node in scanned.pickables {
            let Some(local_to_world) = scene.world_transform(node) else {
                continue;
            };
            // Only exact singularity counts: tiny uniform scales are valid.
            let world_to_local = local_to_world.inverse();
            if local_to_world.determinant() == 0.0 || !world_to_local.is_finite() {
                log::warn!("Skipping {:?}: transform is not invertible", node);
                continue;
            }
            entries.push(PickableEntry {
                node,
                local_to_world,
                world_to_local,
            });
        }
        log::debug!(
            "Pick registry rebuilt: {} primitives, {} given default material",
            entries.len(),
            assigned
        );
        Self {
            entries,
            revision: scene.revision(),
        }
    }

    pub fn entries(&self) -> &[PickableEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().map(|entry| entry.node)
    }

    /// True when the scene has changed shape or placement since the rebuild.
    pub fn is_stale(&self, scene: &SceneGraph) -> bool {
        self.revision != scene.revision()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::scene::{Mesh, DEFAULT_MATERIAL_COLOR};
    use glam::Vec3;

    fn cube() -> Mesh {
        Mesh::cuboid(Vec3::ONE)
    }

    /// root
    /// ├── painted (mesh, red)
    /// └── group
    ///     ├── bare (mesh, no material)
    ///     └── pair (mesh, two slots)
    fn sample() -> (SceneGraph, NodeId, [NodeId; 3]) {
        let mut scene = SceneGraph::new();
        let root = scene.add_group(None, "root").unwrap();
        let painted = scene
            .add_mesh(Some(root), "painted", cube(), vec![Material::standard("red", Color::RED)])
            .unwrap();
        let group = scene.add_group(Some(root), "group").unwrap();
        let bare = scene.add_mesh(Some(group), "bare", cube(), Vec::new()).unwrap();
        let pair = scene
            .add_mesh(
                Some(group),
                "pair",
                cube(),
                vec![
                    Material::standard("a", Color::WHITE),
                    Material::textured("b", "b.png"),
                ],
            )
            .unwrap();
        (scene, root, [painted, bare, pair])
    }

    #[test]
    fn scan_is_pure_and_ordered() {
        let (scene, root, [painted, bare, pair]) = sample();
        let revision = scene.revision();
        let scanned = scan(&scene, &[root]);
        assert_eq!(scanned.pickables, vec![painted, bare, pair]);
        assert_eq!(scanned.needs_default, vec![bare]);
        assert_eq!(scene.revision(), revision);
        assert!(scene.node(bare).unwrap().mesh().unwrap().materials.is_empty());
    }

    #[test]
    fn rebuild_assigns_gray_only_where_missing() {
        let (mut scene, _, [painted, bare, pair]) = sample();
        let registry = PickRegistry::rebuild(&mut scene);
        assert_eq!(registry.nodes().collect::<Vec<_>>(), vec![painted, bare, pair]);

        let bare_materials = &scene.node(bare).unwrap().mesh().unwrap().materials;
        assert_eq!(bare_materials.len(), 1);
        assert_eq!(
            bare_materials[0].diffuse(),
            Some(Color::from_u32(DEFAULT_MATERIAL_COLOR))
        );
        assert_eq!(
            scene.node(painted).unwrap().mesh().unwrap().materials,
            vec![Material::standard("red", Color::RED)]
        );
        assert_eq!(scene.node(pair).unwrap().mesh().unwrap().materials.len(), 2);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let (mut scene, _, [_, bare, _]) = sample();
        PickRegistry::rebuild(&mut scene);
        scene
            .node_mut(bare)
            .unwrap()
            .mesh_mut()
            .unwrap()
            .materials[0]
            .set_diffuse(Color::RED)
            .unwrap();
        let before: Vec<_> = scan(&scene, scene.roots())
            .pickables
            .iter()
            .map(|&id| scene.node(id).unwrap().mesh().unwrap().materials.clone())
            .collect();

        let again = PickRegistry::rebuild(&mut scene);
        assert!(scan(&scene, scene.roots()).needs_default.is_empty());
        let after: Vec<_> = again
            .nodes()
            .map(|id| scene.node(id).unwrap().mesh().unwrap().materials.clone())
            .collect();
        assert_eq!(before, after);
        assert_eq!(assign_default_materials(&mut scene, &[bare]), 0);
    }

    #[test]
    fn roots_are_visited_in_given_order() {
        let mut scene = SceneGraph::new();
        let a = scene.add_mesh(None, "a", cube(), Vec::new()).unwrap();
        let b = scene.add_mesh(None, "b", cube(), Vec::new()).unwrap();
        let registry = PickRegistry::rebuild_from(&mut scene, &[b, a]);
        assert_eq!(registry.nodes().collect::<Vec<_>>(), vec![b, a]);
    }

    #[test]
    fn staleness_tracks_scene_revision() {
        let (mut scene, root, _) = sample();
        let registry = PickRegistry::rebuild(&mut scene);
        assert!(!registry.is_stale(&scene));
        scene.set_transform(root, Mat4::from_translation(Vec3::X));
        assert!(registry.is_stale(&scene));
        let registry = PickRegistry::rebuild(&mut scene);
        assert!(!registry.is_stale(&scene));
        assert_eq!(
            registry.entries()[0].local_to_world.transform_point3(Vec3::ZERO),
            Vec3::X
        );
    }

    #[test]
    fn singular_transforms_are_not_pickable() {
        let mut scene = SceneGraph::new();
        let flat = scene.add_mesh(None, "flat", cube(), Vec::new()).unwrap();
        scene.set_transform(flat, Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)));
        let registry = PickRegistry::rebuild(&mut scene);
        assert!(registry.is_empty());
    }

    #[test]
    fn tiny_uniform_scale_stays_pickable() {
        let mut scene = SceneGraph::new();
        let small = scene.add_mesh(None, "small", cube(), Vec::new()).unwrap();
        scene.set_transform(small, Mat4::from_scale(Vec3::splat(1e-5)));
        let registry = PickRegistry::rebuild(&mut scene);
        assert_eq!(registry.nodes().collect::<Vec<_>>(), vec![small]);
        let entry = &registry.entries()[0];
        let back = entry.world_to_local.transform_point3(Vec3::splat(1e-5));
        assert!((back - Vec3::ONE).length() < 1e-3);
    }
}
