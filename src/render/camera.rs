use crate::render::pick::Ray;
use glam::{Mat4, Vec2, Vec3};

/// Default lens settings, matching the viewer the scenes were authored in.
pub const DEFAULT_FOV_DEG: f32 = 60.0;
pub const NEAR_PLANE: f32 = 0.01;
pub const FAR_PLANE: f32 = 1000.0;

/// Yaw/pitch/position camera used to turn pointer positions into world rays.
#[derive(Debug, Clone, Copy)]
pub struct CameraController {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_deg: f32,
}

impl CameraController {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
            fov_deg: DEFAULT_FOV_DEG,
        }
    }

    /// The default viewpoint: above and behind the floor grid, looking in.
    pub fn room_overview() -> Self {
        // Looking down -Z, slightly downward toward the origin.
        let position = Vec3::new(0.0, 10.0, 28.0);
        let forward = -position;
        let (yaw, pitch) = forward_to_yaw_pitch(forward);
        Self::new(position, yaw, pitch)
    }

    pub fn forward(&self) -> Vec3 {
        let cos_pitch = self.pitch.cos();
        Vec3::new(
            self.yaw.cos() * cos_pitch,
            self.pitch.sin(),
            self.yaw.sin() * cos_pitch,
        )
    }

    pub fn view_matrix(&self) -> Mat4 {
        let forward = self.forward();
        let right = Vec3::new(-self.yaw.sin(), 0.0, self.yaw.cos());
        let up = right.cross(forward).normalize_or_zero();
        Mat4::look_at_rh(self.position, self.position + forward, up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_deg.to_radians(),
            aspect.max(1e-3),
            NEAR_PLANE,
            FAR_PLANE,
        )
    }

    pub fn nudge(&mut self, yaw_delta: f32, pitch_delta: f32, zoom_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch += pitch_delta;
        wrap_angles(&mut self.yaw, &mut self.pitch);
        if zoom_delta != 0.0 {
            self.position += self.forward() * zoom_delta;
        }
    }

    /// World-space ray through a pointer position given in normalized device
    /// coordinates (-1..1 on both axes, +Y up).
    pub fn screen_ray(&self, ndc: Vec2, aspect: f32) -> Ray {
        let view_proj = self.projection_matrix(aspect) * self.view_matrix();
        let inverse = view_proj.inverse();
        let near = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 0.0));
        let far = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray {
            origin: near,
            direction: (far - near).normalize_or_zero(),
        }
    }
}

fn forward_to_yaw_pitch(forward: Vec3) -> (f32, f32) {
    let n = forward.normalize_or_zero();
    (n.z.atan2(n.x), n.y.asin())
}

fn wrap_angles(yaw: &mut f32, pitch: &mut f32) {
    const TWO_PI: f32 = std::f32::consts::PI * 2.0;
    if yaw.is_finite() {
        *yaw = (*yaw + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI;
    }
    if pitch.is_finite() {
        *pitch = (*pitch + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_camera_is_finite() {
        let camera = CameraController::room_overview();
        assert!(camera.position.is_finite());
        assert!(camera.yaw.is_finite());
        assert!(camera.pitch.is_finite());
    }

    #[test]
    fn center_ray_points_along_view_forward() {
        let camera = CameraController::room_overview();
        let ray = camera.screen_ray(Vec2::ZERO, 16.0 / 9.0);
        let forward = camera.forward().normalize();
        assert!(ray.direction.dot(forward) > 0.99);
    }

    #[test]
    fn offset_rays_diverge_from_center() {
        let camera = CameraController::room_overview();
        let center = camera.screen_ray(Vec2::ZERO, 1.0);
        let left = camera.screen_ray(Vec2::new(-0.8, 0.0), 1.0);
        assert!(center.direction.dot(left.direction) < 0.999);
    }

    #[test]
    fn nudge_wraps_angles() {
        let mut camera = CameraController::room_overview();
        camera.nudge(10.0 * std::f32::consts::PI, 0.0, 0.0);
        assert!(camera.yaw.abs() <= std::f32::consts::PI + 1e-4);
    }
}
