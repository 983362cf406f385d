//! Interactive 2D light simulation: lights, mirrors and flags on a bounded
//! canvas, the light paths between them, and the gesture handling, camera
//! and undo history of the editor that manipulates them.

use core::fmt;

pub use either;
pub use nalgebra;
pub use rand;

use nalgebra::{Point2, Unit, Vector2};

pub mod camera;
pub mod canvas;
pub mod controller;
pub mod geometry;
pub mod history;
pub mod scene;
pub mod tracer;

pub use camera::Camera;
pub use canvas::{Canvas, Notification};
pub use controller::{Controller, Gesture};
pub use history::{CanvasState, History, Trigger};
pub use scene::*;
pub use tracer::*;

pub type Float = f64;
pub type Point = Point2<Float>;
pub type Vector = Vector2<Float>;

/// A light ray, represented as a half-line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// The starting point of the half-line
    pub pos: Point,
    /// The direction of the half-line
    pub dir: Unit<Vector>,
}

impl Ray {
    #[inline]
    #[must_use]
    pub fn new(pos: impl Into<Point>, dir: Unit<Vector>) -> Self {
        Self {
            pos: pos.into(),
            dir,
        }
    }

    /// Returns `None` if `dir` is zero
    #[inline]
    #[must_use]
    pub fn try_new_normalize(pos: impl Into<Point>, dir: impl Into<Vector>) -> Option<Self> {
        Unit::try_new(dir.into(), 0.0).map(|dir| Self::new(pos, dir))
    }

    /// A ray starting at `pos`, pointing at `angle` degrees (clockwise in screen space).
    #[inline]
    #[must_use]
    pub fn from_angle(pos: impl Into<Point>, angle: Float) -> Self {
        Self::new(pos, geometry::direction(angle))
    }

    /// Get the point at distance `t` (can be negative) from the ray's origin
    #[inline]
    #[must_use]
    pub fn at(&self, t: Float) -> Point {
        self.pos + self.dir.as_ref() * t
    }

    /// Move the ray's position forward (or backward if t < 0.0) by `t`
    #[inline]
    pub fn advance(&mut self, t: Float) {
        self.pos = self.at(t);
    }

    /// Reflect the ray's direction with respect to the surface with the given normal
    #[inline]
    pub fn reflect_dir(&mut self, normal: &Unit<Vector>) {
        self.dir = Unit::new_normalize(geometry::reflect(self.dir.as_ref(), normal));
    }
}

/// An RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const RED: Self = Self::from_rgb([255, 0, 0]);
    pub const GREEN: Self = Self::from_rgb([0, 255, 0]);
    pub const BLUE: Self = Self::from_rgb([0, 0, 255]);
    pub const YELLOW: Self = Self::from_rgb([255, 255, 0]);
    pub const CYAN: Self = Self::from_rgb([0, 255, 255]);
    pub const MAGENTA: Self = Self::from_rgb([255, 0, 255]);
    pub const WHITE: Self = Self::from_rgb([255, 255, 255]);
    pub const BLACK: Self = Self::from_rgb([0, 0, 0]);

    #[inline]
    #[must_use]
    pub const fn from_rgb(rgb: [u8; 3]) -> Self {
        Self(rgb)
    }

    #[inline]
    #[must_use]
    pub const fn rgb(self) -> [u8; 3] {
        self.0
    }

    #[inline]
    #[must_use]
    pub const fn to_rgba(self, alpha: u8) -> [u8; 4] {
        let [r, g, b] = self.0;
        [r, g, b, alpha]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::RED
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ray_advances_along_its_direction() {
        let mut ray = Ray::from_angle([1.0, 2.0], 90.0);
        ray.advance(3.0);
        assert_relative_eq!(ray.pos, Point::new(1.0, 5.0), epsilon = 1e-12);
    }

    #[test]
    fn zero_direction_is_rejected() {
        assert!(Ray::try_new_normalize([0.0, 0.0], [0.0, 0.0]).is_none());
    }

    #[test]
    fn color_displays_as_hex() {
        assert_eq!(Color::from_rgb([255, 128, 0]).to_string(), "#ff8000");
    }
}
