use glam::{Mat4, Vec3};

/// Upper bound on sphere segments and rings.
pub const MAX_SPHERE_DIVISIONS: u32 = 1024;

/// Axis-aligned bounding box in the mesh's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn from_points(points: &[Vec3]) -> Self {
        points.iter().fold(Self::EMPTY, |acc, &p| Self {
            min: acc.min.min(p),
            max: acc.max.max(p),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half-size along each axis.
    pub fn extent(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Bounds of the eight corners after `transform`.
    pub fn transformed(&self, transform: &Mat4) -> Self {
        if self.is_empty() {
            return *self;
        }
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];
        let moved = corners.map(|c| transform.transform_point3(c));
        Self::from_points(&moved)
    }

    /// Slab test. Returns the parametric entry/exit interval of
    /// `origin + t * dir`, clamped to `t >= 0`.
    pub fn ray_interval(&self, origin: Vec3, dir: Vec3) -> Option<(f32, f32)> {
        if self.is_empty() {
            return None;
        }
        let mut t_min = 0.0f32;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < f32::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        Some((t_min, t_max))
    }
}

/// Triangle soup with shared vertex positions. Winding is counter-clockwise
/// when viewed from outside.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    bounds: Aabb,
}

impl Mesh {
    /// Builds a mesh, dropping triangles that reference missing vertices.
    pub fn new(positions: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        let count = positions.len() as u32;
        let before = triangles.len();
        let triangles: Vec<[u32; 3]> = triangles
            .into_iter()
            .filter(|tri| tri.iter().all(|&i| i < count))
            .collect();
        if triangles.len() != before {
            log::warn!(
                "Dropped {} triangle(s) with out-of-range indices",
                before - triangles.len()
            );
        }
        let bounds = Aabb::from_points(&positions);
        Self {
            positions,
            triangles,
            bounds,
        }
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn triangle(&self, index: usize) -> [Vec3; 3] {
        let [a, b, c] = self.triangles[index];
        [
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ]
    }

    /// UV sphere centered at the origin, poles on the Y axis. Divisions are
    /// clamped to `3..=MAX_SPHERE_DIVISIONS` segments and
    /// `2..=MAX_SPHERE_DIVISIONS` rings.
    pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.clamp(3, MAX_SPHERE_DIVISIONS);
        let rings = rings.clamp(2, MAX_SPHERE_DIVISIONS);
        let mut positions = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
        for ring in 0..=rings {
            let phi = std::f32::consts::PI * ring as f32 / rings as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            for seg in 0..=segments {
                let theta = std::f32::consts::TAU * seg as f32 / segments as f32;
                let (sin_theta, cos_theta) = theta.sin_cos();
                positions.push(Vec3::new(
                    radius * sin_phi * cos_theta,
                    radius * cos_phi,
                    radius * sin_phi * sin_theta,
                ));
            }
        }

        let stride = segments + 1;
        let mut triangles = Vec::with_capacity((rings * segments * 2) as usize);
        for ring in 0..rings {
            for seg in 0..segments {
                let a = ring * stride + seg;
                let b = (ring + 1) * stride + seg;
                let c = (ring + 1) * stride + seg + 1;
                let d = ring * stride + seg + 1;
                // Pole rows collapse one triangle of each quad.
                if ring != 0 {
                    triangles.push([a, d, b]);
                }
                if ring != rings - 1 {
                    triangles.push([d, c, b]);
                }
            }
        }
        Self::new(positions, triangles)
    }

    /// Box centered at the origin.
    pub fn cuboid(half_extents: Vec3) -> Self {
        // (normal, u, v) with u x v == normal so each face winds outward.
        let faces = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];
        let mut positions = Vec::with_capacity(24);
        let mut triangles = Vec::with_capacity(12);
        for (normal, u, v) in faces {
            let base = positions.len() as u32;
            for corner in [normal - u - v, normal + u - v, normal + u + v, normal - u + v] {
                positions.push(corner * half_extents);
            }
            triangles.push([base, base + 1, base + 2]);
            triangles.push([base, base + 2, base + 3]);
        }
        Self::new(positions, triangles)
    }
}
