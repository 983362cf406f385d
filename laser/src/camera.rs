//! Pan and zoom of the view over the canvas.
//!
//! Scene objects live in world coordinates, pointer input arrives in screen
//! coordinates: `screen = world * scale + translation`.

use super::*;

pub const MIN_SCALE: Float = 1.0;
pub const MAX_SCALE: Float = 5.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    scale: Float,
    translation: Vector,
    locked: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translation: Vector::zeros(),
            locked: false,
        }
    }
}

impl Camera {
    #[inline]
    #[must_use]
    pub const fn scale(&self) -> Float {
        self.scale
    }

    #[inline]
    #[must_use]
    pub const fn translation(&self) -> &Vector {
        &self.translation
    }

    #[inline]
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    /// Returns the new lock state.
    pub fn toggle_lock(&mut self) -> bool {
        self.locked = !self.locked;
        self.locked
    }

    /// Whether the view differs from the identity transform.
    #[inline]
    #[must_use]
    pub fn is_transformed(&self) -> bool {
        self.scale > MIN_SCALE || self.translation != Vector::zeros()
    }

    /// Back to no zoom and no pan. The lock is kept.
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.translation = Vector::zeros();
    }

    #[inline]
    #[must_use]
    pub fn screen_to_world(&self, screen: &Point) -> Point {
        Point::from((screen.coords - self.translation) / self.scale)
    }

    #[inline]
    #[must_use]
    pub fn world_to_screen(&self, world: &Point) -> Point {
        Point::from(world.coords * self.scale + self.translation)
    }

    #[inline]
    #[must_use]
    pub fn screen_delta_to_world(&self, delta: &Vector) -> Vector {
        delta / self.scale
    }

    /// Shifts the view by `delta`, in world units. Returns whether the camera moved.
    pub fn pan(&mut self, delta: &Vector) -> bool {
        if self.locked {
            return false;
        }
        self.translation += delta * self.scale;
        true
    }

    /// Zooms by `ratio` around `focal` (screen coordinates), keeping the scale in
    /// `[MIN_SCALE, MAX_SCALE]`. Returns whether the camera changed.
    ///
    /// `focal` stays at the same place on screen, even when the scale hits its limits.
    pub fn pinch(&mut self, ratio: Float, focal: &Point) -> bool {
        if self.locked || !ratio.is_finite() || ratio <= 0.0 {
            return false;
        }

        let scale = (self.scale * ratio).clamp(MIN_SCALE, MAX_SCALE);
        let effective = scale / self.scale;

        self.scale = scale;
        self.translation = focal.coords - (focal.coords - self.translation) * effective;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn world_and_screen_are_inverse() {
        let mut camera = Camera::default();
        camera.pinch(2.5, &Point::new(40.0, 70.0));
        camera.pan(&Vector::new(13.0, -8.0));

        let p = Point::new(123.0, -45.0);
        assert_relative_eq!(camera.screen_to_world(&camera.world_to_screen(&p)), p, epsilon = 1e-9);
    }

    #[test]
    fn pinch_keeps_the_focal_point_fixed() {
        let mut camera = Camera::default();
        let focal = Point::new(200.0, 150.0);
        let world = camera.screen_to_world(&focal);

        camera.pinch(2.0, &focal);
        assert_relative_eq!(camera.scale(), 2.0);
        assert_relative_eq!(camera.world_to_screen(&world), focal, epsilon = 1e-9);

        camera.pinch(10.0, &focal);
        assert_relative_eq!(camera.scale(), MAX_SCALE);
        assert_relative_eq!(camera.world_to_screen(&world), focal, epsilon = 1e-9);
    }

    #[test]
    fn pinch_past_max_scale_leaves_the_view_in_place() {
        let mut camera = Camera::default();
        camera.pinch(MAX_SCALE, &Point::origin());
        assert_relative_eq!(*camera.translation(), Vector::zeros());

        // shifting by the raw ratio would move the translation to (-100, -100)
        assert!(camera.pinch(2.0, &Point::new(100.0, 100.0)));
        assert_relative_eq!(camera.scale(), MAX_SCALE);
        assert_relative_eq!(*camera.translation(), Vector::zeros());
    }

    #[test]
    fn scale_is_clamped() {
        let mut camera = Camera::default();
        camera.pinch(0.25, &Point::origin());
        assert_relative_eq!(camera.scale(), MIN_SCALE);
        assert!(!camera.is_transformed());
    }

    #[test]
    fn pan_moves_by_screen_pixels() {
        let mut camera = Camera::default();
        camera.pinch(3.0, &Point::origin());
        let screen_delta = Vector::new(30.0, 12.0);
        camera.pan(&camera.screen_delta_to_world(&screen_delta));
        assert_relative_eq!(*camera.translation(), screen_delta);
    }

    #[test]
    fn lock_disables_pan_and_zoom() {
        let mut camera = Camera::default();
        assert!(camera.toggle_lock());
        assert!(!camera.pan(&Vector::new(1.0, 1.0)));
        assert!(!camera.pinch(2.0, &Point::origin()));
        assert_eq!(camera, Camera { locked: true, ..Camera::default() });
    }

    #[test]
    fn reset_restores_identity() {
        let mut camera = Camera::default();
        camera.pinch(4.0, &Point::new(10.0, 10.0));
        camera.reset();
        assert!(!camera.is_transformed());
        assert_relative_eq!(camera.scale(), 1.0);
    }
}
