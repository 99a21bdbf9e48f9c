//! Nearest-hit resolution of a ray against the pickable registry.
//!
//! Rays are tested in each primitive's local space. The local direction is
//! the world direction pushed through the inverse transform *without*
//! renormalizing, so the ray parameter `t` is the same in both spaces and
//! equals the world-space distance.
//!
//! Triangles are single-sided: only faces wound counter-clockwise towards
//! the ray count. A ray starting inside a closed mesh therefore sees only
//! back faces and reports no hit.

use super::ray::Ray;
use super::registry::{PickRegistry, PickableEntry};
use crate::scene::{NodeId, SceneGraph};
use glam::Vec3;

/// Relative threshold below which a ray is treated as parallel to a triangle.
const PARALLEL_EPSILON: f32 = 1e-7;
/// Slack on barycentric bounds so rays through shared edges and vertices are
/// not lost to rounding.
const BARYCENTRIC_EPSILON: f32 = 1e-6;
/// Hits closer than this to the ray origin are ignored.
const MIN_DISTANCE: f32 = 1e-5;
/// Relative distance within which two hits count as tied.
pub const TIE_TOLERANCE: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub node: NodeId,
    /// Position of the primitive in registry order.
    pub registry_index: usize,
    pub distance: f32,
    pub point: Vec3,
    pub triangle: usize,
}

/// Ray/triangle hit distance (Möller–Trumbore), front faces only.
pub fn intersect_triangle(origin: Vec3, dir: Vec3, [v0, v1, v2]: [Vec3; 3]) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = dir.cross(edge2);
    let det = edge1.dot(h);

    // Also rejects back faces (negative determinant).
    let scale = edge1.length() * edge2.length() * dir.length();
    if !(det > PARALLEL_EPSILON * scale) {
        return None;
    }

    let inv_det = 1.0 / det;
    let s = origin - v0;
    let u = inv_det * s.dot(h);
    if !(-BARYCENTRIC_EPSILON..=1.0 + BARYCENTRIC_EPSILON).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = inv_det * dir.dot(q);
    if v < -BARYCENTRIC_EPSILON || u + v > 1.0 + BARYCENTRIC_EPSILON {
        return None;
    }
    let t = inv_det * edge2.dot(q);
    (t > MIN_DISTANCE).then_some(t)
}

/// Nearest front-facing triangle of one primitive, closer than `limit`.
fn intersect_entry(
    ray: &Ray,
    entry: &PickableEntry,
    scene: &SceneGraph,
    limit: f32,
) -> Option<(f32, usize)> {
    let Some(mesh) = scene.node(entry.node).and_then(|node| node.mesh()) else {
        log::debug!("Registry entry {:?} is no longer in the scene", entry.node);
        return None;
    };
    let origin = entry.world_to_local.transform_point3(ray.origin());
    let dir = entry.world_to_local.transform_vector3(ray.direction());

    let (enter, _) = mesh.mesh.bounds().ray_interval(origin, dir)?;
    if enter > limit {
        return None;
    }

    let mut best: Option<(f32, usize)> = None;
    for index in 0..mesh.mesh.triangles().len() {
        let Some(t) = intersect_triangle(origin, dir, mesh.mesh.triangle(index)) else {
            continue;
        };
        if t < best.map_or(limit, |(d, _)| d) {
            best = Some((t, index));
        }
    }
    best
}

/// Nearest hit across the registry.
///
/// Primitives are visited in registry order and a later hit only replaces
/// the current best when it is closer by more than [`TIE_TOLERANCE`]
/// (relative), so equal or near-equal distances resolve to the first
/// primitive in traversal order.
pub fn resolve(ray: &Ray, registry: &PickRegistry, scene: &SceneGraph) -> Option<PickHit> {
    let mut best: Option<PickHit> = None;
    for (registry_index, entry) in registry.entries().iter().enumerate() {
        let limit = match &best {
            Some(hit) => hit.distance - TIE_TOLERANCE * hit.distance.max(1.0),
            None => f32::INFINITY,
        };
        let Some((distance, triangle)) = intersect_entry(ray, entry, scene, limit) else {
            continue;
        };
        best = Some(PickHit {
            node: entry.node,
            registry_index,
            distance,
            point: ray.point_at(distance),
            triangle,
        });
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Material, Mesh};
    use glam::Mat4;

    const TRI: [Vec3; 3] = [
        Vec3::new(-1.0, -1.0, 0.0),
        Vec3::new(1.0, -1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ];

    fn add_mesh(scene: &mut SceneGraph, name: &str, mesh: Mesh, at: Vec3) -> NodeId {
        let id = scene
            .add_mesh(None, name, mesh, vec![Material::default_gray()])
            .unwrap();
        scene.set_transform(id, Mat4::from_translation(at));
        id
    }

    fn down_z(from: Vec3) -> Ray {
        Ray::new(from, Vec3::NEG_Z).unwrap()
    }

    #[test]
    fn triangle_front_face_hit() {
        let t = intersect_triangle(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, TRI).unwrap();
        assert!((t - 5.0).abs() < 1e-6);
    }

    #[test]
    fn triangle_back_face_is_culled() {
        assert!(intersect_triangle(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, TRI).is_none());
        let flipped = [TRI[0], TRI[2], TRI[1]];
        let t = intersect_triangle(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, flipped).unwrap();
        assert!((t - 5.0).abs() < 1e-6);
    }

    #[test]
    fn triangle_parallel_and_glancing_rays() {
        // In the triangle's plane.
        assert!(intersect_triangle(Vec3::new(-5.0, 0.0, 0.0), Vec3::X, TRI).is_none());
        // Nearly parallel, passes well outside the triangle.
        let dir = Vec3::new(1.0, 0.0, -1e-4).normalize();
        assert!(intersect_triangle(Vec3::new(-5.0, 0.0, 0.01), dir, TRI).is_none());
        // Steep but valid glancing approach still lands inside.
        let dir = Vec3::new(1.0, 0.0, -0.05).normalize();
        let origin = Vec3::new(-2.0, 0.0, 0.1);
        let t = intersect_triangle(origin, dir, TRI).unwrap();
        assert!((origin + dir * t).z.abs() < 1e-4);
    }

    #[test]
    fn triangle_edge_hit_is_kept() {
        let t = intersect_triangle(Vec3::new(0.0, -1.0, 3.0), Vec3::NEG_Z, TRI);
        assert!(t.is_some());
        assert!(intersect_triangle(Vec3::new(0.0, -1.01, 3.0), Vec3::NEG_Z, TRI).is_none());
    }

    #[test]
    fn triangle_behind_origin_misses() {
        assert!(intersect_triangle(Vec3::new(0.0, 0.0, -5.0), Vec3::NEG_Z, TRI).is_none());
    }

    #[test]
    fn nearest_wins_regardless_of_order() {
        for far_first in [true, false] {
            let mut scene = SceneGraph::new();
            let (near, far) = if far_first {
                let far = add_mesh(&mut scene, "far", Mesh::cuboid(Vec3::ONE), Vec3::new(0.0, 0.0, -10.0));
                let near = add_mesh(&mut scene, "near", Mesh::cuboid(Vec3::ONE), Vec3::ZERO);
                (near, far)
            } else {
                let near = add_mesh(&mut scene, "near", Mesh::cuboid(Vec3::ONE), Vec3::ZERO);
                let far = add_mesh(&mut scene, "far", Mesh::cuboid(Vec3::ONE), Vec3::new(0.0, 0.0, -10.0));
                (near, far)
            };
            let registry = PickRegistry::rebuild(&mut scene);
            let hit = resolve(&down_z(Vec3::new(0.0, 0.0, 10.0)), &registry, &scene).unwrap();
            assert_eq!(hit.node, near);
            assert_ne!(hit.node, far);
            assert!((hit.distance - 9.0).abs() < 1e-5);
            assert!((hit.point - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
        }
    }

    #[test]
    fn equal_distance_resolves_to_first_in_registry() {
        let mut scene = SceneGraph::new();
        let first = add_mesh(&mut scene, "first", Mesh::cuboid(Vec3::ONE), Vec3::ZERO);
        let second = add_mesh(&mut scene, "second", Mesh::cuboid(Vec3::ONE), Vec3::ZERO);
        let registry = PickRegistry::rebuild(&mut scene);
        for _ in 0..3 {
            let hit = resolve(&down_z(Vec3::new(0.2, 0.3, 10.0)), &registry, &scene).unwrap();
            assert_eq!(hit.node, first);
            assert_eq!(hit.registry_index, 0);
        }

        // Within tolerance still counts as a tie.
        scene.set_transform(second, Mat4::from_translation(Vec3::new(0.0, 0.0, 1e-6)));
        let registry = PickRegistry::rebuild(&mut scene);
        let hit = resolve(&down_z(Vec3::new(0.2, 0.3, 10.0)), &registry, &scene).unwrap();
        assert_eq!(hit.node, first);
    }

    #[test]
    fn origin_inside_volume_yields_no_hit() {
        let mut scene = SceneGraph::new();
        add_mesh(&mut scene, "sphere", Mesh::uv_sphere(1.0, 24, 12), Vec3::ZERO);
        let registry = PickRegistry::rebuild(&mut scene);
        for dir in [Vec3::X, Vec3::NEG_Z, Vec3::new(1.0, 1.0, 0.3)] {
            let ray = Ray::new(Vec3::ZERO, dir).unwrap();
            assert!(resolve(&ray, &registry, &scene).is_none());
        }
    }

    #[test]
    fn scaled_and_mirrored_transforms_report_world_distance() {
        let mut scene = SceneGraph::new();
        let id = add_mesh(&mut scene, "box", Mesh::cuboid(Vec3::ONE), Vec3::ZERO);
        scene.set_transform(id, Mat4::from_scale(Vec3::new(-2.0, 2.0, 2.0)));
        let registry = PickRegistry::rebuild(&mut scene);
        let hit = resolve(&down_z(Vec3::new(0.5, 0.5, 10.0)), &registry, &scene).unwrap();
        assert_eq!(hit.node, id);
        assert!((hit.distance - 8.0).abs() < 1e-4);
    }

    #[test]
    fn empty_registry_and_misses() {
        let mut scene = SceneGraph::new();
        let registry = PickRegistry::rebuild(&mut scene);
        assert!(resolve(&down_z(Vec3::new(0.0, 0.0, 10.0)), &registry, &scene).is_none());

        add_mesh(&mut scene, "box", Mesh::cuboid(Vec3::ONE), Vec3::ZERO);
        let registry = PickRegistry::rebuild(&mut scene);
        assert!(resolve(&down_z(Vec3::new(3.0, 0.0, 10.0)), &registry, &scene).is_none());
        let away = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z).unwrap();
        assert!(resolve(&away, &registry, &scene).is_none());
    }

    #[test]
    fn stale_entries_are_skipped() {
        let mut scene = SceneGraph::new();
        let gone = add_mesh(&mut scene, "gone", Mesh::cuboid(Vec3::ONE), Vec3::ZERO);
        let kept = add_mesh(&mut scene, "kept", Mesh::cuboid(Vec3::ONE), Vec3::new(0.0, 0.0, -5.0));
        let registry = PickRegistry::rebuild(&mut scene);
        scene.detach(gone);
        assert!(registry.is_stale(&scene));
        let hit = resolve(&down_z(Vec3::new(0.0, 0.0, 10.0)), &registry, &scene).unwrap();
        assert_eq!(hit.node, kept);
    }
}
