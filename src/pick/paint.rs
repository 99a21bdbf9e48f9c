use crate::color::Color;
use crate::scene::{NodeId, SceneGraph};

/// Outcome of painting one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaintReport {
    pub painted: usize,
    /// Slots without a settable color, left as they were.
    pub skipped: usize,
}

/// Sets the diffuse color of every material slot on `node`.
///
/// Slots that cannot take a color are skipped and logged; the rest are still
/// painted. A node that is gone or carries no mesh paints nothing.
pub fn paint_node(scene: &mut SceneGraph, node: NodeId, color: Color) -> PaintReport {
    let mut report = PaintReport::default();
    let Some(scene_node) = scene.node_mut(node) else {
        log::debug!("Paint target {:?} is no longer in the scene", node);
        return report;
    };
    let name = scene_node.name.clone();
    let Some(mesh) = scene_node.mesh_mut() else {
        return report;
    };
    for material in &mut mesh.materials {
        match material.set_diffuse(color) {
            Ok(()) => report.painted += 1,
            Err(err) => {
                log::warn!("Leaving a slot of '{}' unchanged: {}", name, err);
                report.skipped += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Material, Mesh};
    use glam::Vec3;

    #[test]
    fn paints_every_slot_identically() {
        let mut scene = SceneGraph::new();
        let node = scene
            .add_mesh(
                None,
                "crown",
                Mesh::cuboid(Vec3::ONE),
                vec![
                    Material::standard("outer", Color::WHITE),
                    Material::unlit("inner", Color::BLACK),
                ],
            )
            .unwrap();
        let report = paint_node(&mut scene, node, Color::RED);
        assert_eq!(report, PaintReport { painted: 2, skipped: 0 });
        let materials = &scene.node(node).unwrap().mesh().unwrap().materials;
        assert!(materials.iter().all(|m| m.diffuse() == Some(Color::RED)));
    }

    #[test]
    fn colorless_slot_is_left_alone() {
        let mut scene = SceneGraph::new();
        let node = scene
            .add_mesh(
                None,
                "scan",
                Mesh::cuboid(Vec3::ONE),
                vec![
                    Material::textured("albedo", "scan.png"),
                    Material::standard("tint", Color::WHITE),
                ],
            )
            .unwrap();
        let report = paint_node(&mut scene, node, Color::RED);
        assert_eq!(report, PaintReport { painted: 1, skipped: 1 });
        let materials = &scene.node(node).unwrap().mesh().unwrap().materials;
        assert_eq!(materials[0], Material::textured("albedo", "scan.png"));
        assert_eq!(materials[1].diffuse(), Some(Color::RED));
    }

    #[test]
    fn missing_or_group_node_paints_nothing() {
        let mut scene = SceneGraph::new();
        let group = scene.add_group(None, "group").unwrap();
        assert_eq!(paint_node(&mut scene, group, Color::RED), PaintReport::default());
        scene.detach(group);
        assert_eq!(paint_node(&mut scene, group, Color::RED), PaintReport::default());
    }
}
