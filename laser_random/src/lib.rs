use laser::*;

use core::iter;
pub use ::rand;

/// Shortest random panel.
pub const MIN_PANEL_LENGTH: Float = 60.0;
/// Longest random panel.
pub const MAX_PANEL_LENGTH: Float = 240.0;

const PALETTE: [Color; 6] = [
    Color::RED,
    Color::GREEN,
    Color::BLUE,
    Color::YELLOW,
    Color::CYAN,
    Color::MAGENTA,
];

pub trait Random: Sized {
    /// A value drawn from `rng`. Never fails.
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self;
}

impl Random for Color {
    /// One of the colors a light can be given from the palette.
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        PALETTE[rng.gen_range(0..PALETTE.len())]
    }
}

/// An angle in degrees, in `0.0..360.0`.
pub fn rand_angle(rng: &mut (impl rand::Rng + ?Sized)) -> Float {
    rng.gen_range(0.0..360.0)
}

/// A point inside `bounds`.
pub fn rand_point(rng: &mut (impl rand::Rng + ?Sized), bounds: Bounds) -> Point {
    // the rng generates floats in 0.0..1.0, scale the range accordingly
    Point::new(
        rng.gen::<Float>() * bounds.width,
        rng.gen::<Float>() * bounds.height,
    )
}

impl Random for Light {
    /// A light at the origin, turned and colored at random. Use
    /// [`random_scene`] to spread objects over a canvas.
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Self::new(Point::origin())
            .with_angle(rand_angle(rng))
            .with_color(Color::random(rng))
    }
}

impl<K> Random for Panel<K> {
    fn random(rng: &mut (impl rand::Rng + ?Sized)) -> Self {
        Self::new(Point::origin())
            .with_angle(rand_angle(rng))
            .with_length(rng.gen_range(MIN_PANEL_LENGTH..=MAX_PANEL_LENGTH))
    }
}

/// `n` random `T`s, each moved to a random point of `bounds`.
fn scattered<T: Random>(
    n: usize,
    rng: &mut (impl rand::Rng + ?Sized),
    bounds: Bounds,
    position: impl Fn(&mut T) -> &mut Point,
) -> Vec<T> {
    iter::repeat_with(|| {
        let mut item = T::random(rng);
        *position(&mut item) = rand_point(rng, bounds);
        item
    })
    .take(n)
    .collect()
}

/// A scene of the given size with `lights`, `mirrors` and `flags` objects of
/// each kind, at random positions inside `bounds`.
///
/// Unlike the objects the editor adds, these may overlap.
pub fn random_scene(
    rng: &mut (impl rand::Rng + ?Sized),
    bounds: Bounds,
    lights: usize,
    mirrors: usize,
    flags: usize,
) -> Scene {
    let lights = scattered(lights, rng, bounds, |l: &mut Light| &mut l.position);
    let mirrors = scattered(mirrors, rng, bounds, |m: &mut Mirror| &mut m.position);
    let flags = scattered(flags, rng, bounds, |f: &mut Flag| &mut f.position);

    Scene::from_parts(bounds, lights, mirrors, flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn inside(p: &Point, bounds: Bounds) -> bool {
        (0.0..=bounds.width).contains(&p.x) && (0.0..=bounds.height).contains(&p.y)
    }

    #[test]
    fn scene_has_the_requested_objects() {
        let mut rng = StdRng::seed_from_u64(7);
        let bounds = Bounds::new(320.0, 240.0);
        let scene = random_scene(&mut rng, bounds, 3, 5, 2);

        assert_eq!(scene.lights().len(), 3);
        assert_eq!(scene.mirrors().len(), 5);
        assert_eq!(scene.flags().len(), 2);
        assert_eq!(scene.bounds(), bounds);
        assert_eq!(scene.selected(), None);

        assert!(scene.lights().iter().all(|l| inside(&l.position, bounds)));
        assert!(scene.mirrors().iter().all(|m| inside(&m.position, bounds)));
        assert!(scene.flags().iter().all(|f| inside(&f.position, bounds)));
    }

    #[test]
    fn panels_and_angles_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let mirror = Mirror::random(&mut rng);
            assert!((MIN_PANEL_LENGTH..=MAX_PANEL_LENGTH).contains(&mirror.length));
            assert!((0.0..360.0).contains(&mirror.angle));

            let light = Light::random(&mut rng);
            assert!(PALETTE.contains(&light.color));
        }
    }

    #[test]
    fn same_seed_same_scene_layout() {
        let bounds = Bounds::new(100.0, 100.0);
        let a = random_scene(&mut StdRng::seed_from_u64(1), bounds, 2, 2, 2);
        let b = random_scene(&mut StdRng::seed_from_u64(1), bounds, 2, 2, 2);

        let positions = |s: &Scene| -> Vec<Point> {
            s.lights()
                .iter()
                .map(|l| l.position)
                .chain(s.mirrors().iter().map(|m| m.position))
                .chain(s.flags().iter().map(|f| f.position))
                .collect()
        };
        assert_eq!(positions(&a), positions(&b));
    }
}
