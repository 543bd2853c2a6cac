use crate::num::{Number, Point3, Vector2};
use crate::pose::SE3Quat;

/// Display projection supplied by the host. Screen points are
/// `(x pixels, y pixels, depth)`; depth is positive in front of the viewer.
pub trait ScreenProjection {
    fn world_to_screen(&self, world: &Point3) -> Point3;

    fn screen_to_world(&self, screen: &Point3) -> Point3;
}

/// Ideal pinhole camera at `world_from_camera`, looking down its +Z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinholeProjection {
    pub world_from_camera: SE3Quat,
    pub fx: Number,
    pub fy: Number,
    pub cx: Number,
    pub cy: Number,
}

impl ScreenProjection for PinholeProjection {
    fn world_to_screen(&self, world: &Point3) -> Point3 {
        let p = self.world_from_camera.inverse_transform_point(world);
        Point3::new(
            self.fx * p.x / p.z + self.cx,
            self.fy * p.y / p.z + self.cy,
            p.z,
        )
    }

    fn screen_to_world(&self, screen: &Point3) -> Point3 {
        let z = screen.z;
        let p = Point3::new(
            (screen.x - self.cx) * z / self.fx,
            (screen.y - self.cy) * z / self.fy,
            z,
        );
        self.world_from_camera.transform_point(&p)
    }
}

/// Limits the on-screen jump from `previous` to `current` to `max_pixels`,
/// keeping the current depth. Points behind the viewer are left alone.
pub fn clamp_screen_delta(
    projection: &dyn ScreenProjection,
    previous: &Point3,
    current: &Point3,
    max_pixels: Number,
) -> Point3 {
    let prev_screen = projection.world_to_screen(previous);
    let curr_screen = projection.world_to_screen(current);
    if prev_screen.z <= 0.0 || curr_screen.z <= 0.0 {
        return *current;
    }

    let delta = Vector2::new(curr_screen.x - prev_screen.x, curr_screen.y - prev_screen.y);
    let magnitude = delta.norm();
    if magnitude <= max_pixels || magnitude <= Number::EPSILON {
        return *current;
    }

    let clamped = delta * (max_pixels / magnitude);
    projection.screen_to_world(&Point3::new(
        prev_screen.x + clamped.x,
        prev_screen.y + clamped.y,
        curr_screen.z,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> PinholeProjection {
        PinholeProjection {
            world_from_camera: SE3Quat::identity(),
            fx: 500.0,
            fy: 500.0,
            cx: 320.0,
            cy: 240.0,
        }
    }

    #[test]
    fn test_pinhole_round_trip() {
        let camera = camera();
        let world = Point3::new(0.1, -0.2, 1.5);
        let screen = camera.world_to_screen(&world);
        assert_relative_eq!(screen.z, 1.5);
        assert_relative_eq!(camera.screen_to_world(&screen), world, epsilon = 1e-12);
    }

    #[test]
    fn test_small_motion_passes() {
        let camera = camera();
        let previous = Point3::new(0.0, 0.0, 1.0);
        let current = Point3::new(0.001, 0.0, 1.0);
        // 0.5 px
        assert_eq!(clamp_screen_delta(&camera, &previous, &current, 10.0), current);
    }

    #[test]
    fn test_large_motion_is_clamped() {
        let camera = camera();
        let previous = Point3::new(0.0, 0.0, 2.0);
        let current = Point3::new(0.2, 0.0, 1.0);

        let clamped = clamp_screen_delta(&camera, &previous, &current, 20.0);
        let prev_screen = camera.world_to_screen(&previous);
        let clamped_screen = camera.world_to_screen(&clamped);

        assert_relative_eq!(clamped_screen.z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(clamped_screen.x - prev_screen.x, 20.0, epsilon = 1e-9);
        assert_relative_eq!(clamped_screen.y - prev_screen.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_behind_viewer_is_untouched() {
        let camera = camera();
        let previous = Point3::new(0.0, 0.0, -1.0);
        let current = Point3::new(1.0, 0.0, 1.0);
        assert_eq!(clamp_screen_delta(&camera, &previous, &current, 1.0), current);
    }
}
