use crate::render::{CameraSnapshot, Viewport};
use glam::{Vec2, Vec3, Vec4};

/// Half-line in world space. `direction` is always unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
}

impl Ray {
    /// Returns `None` for a zero-length or non-finite direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        if !origin.is_finite() || !direction.is_finite() {
            return None;
        }
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// Pixel coordinates (origin top-left, y down) to normalized device
/// coordinates (y up). `None` when the point is outside the viewport.
pub fn pixel_to_ndc(point: Vec2, viewport: Viewport) -> Option<Vec2> {
    if viewport.is_empty() || !viewport.contains(point.x, point.y) {
        return None;
    }
    Some(Vec2::new(
        point.x / viewport.width as f32 * 2.0 - 1.0,
        1.0 - point.y / viewport.height as f32 * 2.0,
    ))
}

/// Casts a ray from the camera eye through a pixel.
///
/// Produces nothing for an empty viewport, a pointer outside it, or a camera
/// whose matrices cannot be inverted.
pub fn project_ray(point: Vec2, viewport: Viewport, camera: &CameraSnapshot) -> Option<Ray> {
    let ndc = pixel_to_ndc(point, viewport)?;
    let view_projection = camera.view_projection();
    if view_projection.determinant().abs() <= f32::EPSILON * f32::EPSILON {
        log::debug!("Camera matrices are singular; no ray");
        return None;
    }
    let far = view_projection.inverse() * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
    if far.w.abs() <= f32::EPSILON {
        return None;
    }
    let far = far.truncate() / far.w;
    Ray::new(camera.eye, far - camera.eye)
}
