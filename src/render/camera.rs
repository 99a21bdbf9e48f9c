use glam::{Mat4, Vec3};

/// Perspective projection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y_deg: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Projection {
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        // Depth range [0, 1].
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), aspect, self.near, self.far)
    }
}

/// Read-only camera state captured at click time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSnapshot {
    pub eye: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
}

impl CameraSnapshot {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CameraController {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl CameraController {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
        }
    }

    pub fn look_at(position: Vec3, target: Vec3) -> Self {
        let (yaw, pitch) = forward_to_yaw_pitch(target - position);
        Self::new(position, yaw, pitch)
    }

    pub fn from_bounds(center: Vec3, extent: Vec3) -> Self {
        let radius = extent.max_element();
        let distance = if radius > 0.0 { radius * 3.0 } else { 3.0 };
        let position = center + Vec3::new(distance, distance * 0.4, distance);
        Self::look_at(position, center)
    }

    pub fn frame_bounds_preserve_orientation(&mut self, center: Vec3, extent: Vec3) {
        let radius = extent.max_element();
        let distance = if radius > 0.0 { radius * 3.0 } else { 3.0 };
        let (forward, _, _) = self.basis();
        self.position = center - forward * distance;
    }

    /// Forward, right and up unit vectors.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        camera_basis(self.yaw, self.pitch)
    }

    pub fn view_matrix(&self) -> Mat4 {
        let (forward, _, up) = self.basis();
        Mat4::look_to_rh(self.position, forward, up)
    }

    pub fn snapshot(&self, projection: &Projection, aspect: f32) -> CameraSnapshot {
        CameraSnapshot {
            eye: self.position,
            view: self.view_matrix(),
            projection: projection.matrix(aspect),
        }
    }
}

fn forward_to_yaw_pitch(forward: Vec3) -> (f32, f32) {
    let n = forward / forward.length().max(1e-6);
    let yaw = n.z.atan2(n.x);
    let pitch = n.y.clamp(-1.0, 1.0).asin();
    (yaw, pitch)
}

fn camera_basis(yaw: f32, pitch: f32) -> (Vec3, Vec3, Vec3) {
    let cos_pitch = pitch.cos();
    let forward = Vec3::new(yaw.cos() * cos_pitch, pitch.sin(), yaw.sin() * cos_pitch);
    let right = Vec3::new(-yaw.sin(), 0.0, yaw.cos());
    let up = right.cross(forward).normalize_or_zero();
    (forward, right, up)
}
