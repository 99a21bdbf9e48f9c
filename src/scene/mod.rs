pub mod material;
pub mod mesh;
pub mod serialization;

pub use material::{Material, MaterialError, MaterialKind, DEFAULT_MATERIAL_COLOR};
pub use mesh::{Aabb, Mesh, MAX_SPHERE_DIVISIONS};

use glam::{Mat4, Vec3};

/// Handle to a node in a [`SceneGraph`]. Slots are never reused, so a handle
/// to a detached node stays invalid instead of aliasing a newer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub struct MeshNode {
    pub mesh: Mesh,
    /// Zero, one or many material slots.
    pub materials: Vec<Material>,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    Mesh(MeshNode),
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    transform: Mat4,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn mesh(&self) -> Option<&MeshNode> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Group => None,
        }
    }

    pub fn mesh_mut(&mut self) -> Option<&mut MeshNode> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Group => None,
        }
    }
}

/// Arena-backed scene tree. Structural and transform edits bump
/// [`SceneGraph::revision`]; material edits do not.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Option<SceneNode>>,
    roots: Vec<NodeId>,
    revision: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn add_group(&mut self, parent: Option<NodeId>, name: impl Into<String>) -> Option<NodeId> {
        self.insert(parent, name.into(), NodeKind::Group)
    }

    pub fn add_mesh(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
        mesh: Mesh,
        materials: Vec<Material>,
    ) -> Option<NodeId> {
        self.insert(parent, name.into(), NodeKind::Mesh(MeshNode { mesh, materials }))
    }

    /// Returns `None` when `parent` is not a live node.
    fn insert(&mut self, parent: Option<NodeId>, name: String, kind: NodeKind) -> Option<NodeId> {
        if let Some(parent) = parent {
            if !self.contains(parent) {
                log::warn!("Cannot attach '{}' under detached node {:?}", name, parent);
                return None;
            }
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(SceneNode {
            name,
            kind,
            transform: Mat4::IDENTITY,
            parent,
            children: Vec::new(),
        }));
        match parent {
            Some(parent) => {
                if let Some(parent_node) = self.node_mut(parent) {
                    parent_node.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        self.revision += 1;
        Some(id)
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Mat4) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        node.transform = transform;
        self.revision += 1;
        true
    }

    /// Removes `id` and its whole subtree. Returns the number of nodes removed.
    pub fn detach(&mut self, id: NodeId) -> usize {
        let Some(parent) = self.node(id).map(SceneNode::parent) else {
            return 0;
        };
        match parent {
            Some(parent) => {
                if let Some(parent_node) = self.node_mut(parent) {
                    parent_node.children.retain(|&child| child != id);
                }
            }
            None => self.roots.retain(|&root| root != id),
        }

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.index()).and_then(Option::take) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        self.revision += 1;
        removed
    }

    /// Local-to-world transform, composed through every ancestor.
    pub fn world_transform(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.node(id)?;
        let mut world = node.transform;
        while let Some(parent) = node.parent {
            node = self.node(parent)?;
            world = node.transform * world;
        }
        Some(world)
    }

    /// Depth-first, children in insertion order, starting at `root`.
    pub fn depth_first(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            order.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    /// World-space bounds of every mesh under `root`.
    pub fn subtree_bounds(&self, root: NodeId) -> Aabb {
        self.depth_first(root)
            .into_iter()
            .filter_map(|id| {
                let mesh = self.node(id)?.mesh()?;
                let world = self.world_transform(id)?;
                Some(mesh.mesh.bounds().transformed(&world))
            })
            .fold(Aabb::EMPTY, |acc, bounds| acc.union(&bounds))
    }
}

pub fn compose_transform_matrix(position: [f32; 3], rotation_deg: [f32; 3], scale: [f32; 3]) -> Mat4 {
    let (rx, ry, rz) = (
        rotation_deg[0].to_radians(),
        rotation_deg[1].to_radians(),
        rotation_deg[2].to_radians(),
    );
    // Rotation order: Z (roll) * Y (yaw) * X (pitch)
    let rotation = Mat4::from_rotation_z(rz) * Mat4::from_rotation_y(ry) * Mat4::from_rotation_x(rx);
    Mat4::from_translation(Vec3::from(position)) * rotation * Mat4::from_scale(Vec3::from(scale))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri() -> Mesh {
        Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![[0, 1, 2]])
    }

    #[test]
    fn depth_first_follows_insertion_order() {
        let mut graph = SceneGraph::new();
        let root = graph.add_group(None, "root").unwrap();
        let a = graph.add_group(Some(root), "a").unwrap();
        let a1 = graph.add_mesh(Some(a), "a1", tri(), Vec::new()).unwrap();
        let b = graph.add_mesh(Some(root), "b", tri(), Vec::new()).unwrap();
        let a2 = graph.add_mesh(Some(a), "a2", tri(), Vec::new()).unwrap();
        assert_eq!(graph.depth_first(root), vec![root, a, a1, a2, b]);
    }

    #[test]
    fn world_transform_composes_parents() {
        let mut graph = SceneGraph::new();
        let root = graph.add_group(None, "root").unwrap();
        let child = graph.add_mesh(Some(root), "child", tri(), Vec::new()).unwrap();
        graph.set_transform(
            root,
            Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)) * Mat4::from_scale(Vec3::splat(0.1)),
        );
        graph.set_transform(child, Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)));
        let world = graph.world_transform(child).unwrap();
        let p = world.transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(1.0, 5.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn detach_invalidates_whole_subtree() {
        let mut graph = SceneGraph::new();
        let keep = graph.add_group(None, "keep").unwrap();
        let root = graph.add_group(None, "root").unwrap();
        let child = graph.add_mesh(Some(root), "child", tri(), Vec::new()).unwrap();
        let before = graph.revision();
        assert_eq!(graph.detach(root), 2);
        assert!(graph.revision() > before);
        assert!(!graph.contains(root));
        assert!(!graph.contains(child));
        assert_eq!(graph.roots(), &[keep]);
        assert_eq!(graph.detach(root), 0);
        assert!(graph.add_group(Some(root), "orphan").is_none());
    }

    #[test]
    fn compose_transform_applies_scale_then_rotation_then_translation() {
        let m = compose_transform_matrix([1.0, 2.0, 3.0], [0.0, 90.0, 0.0], [2.0, 2.0, 2.0]);
        let p = m.transform_point3(Vec3::X);
        assert!((p - Vec3::new(1.0, 2.0, 1.0)).length() < 1e-5);
    }
}
