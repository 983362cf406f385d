use super::*;

use core::{cmp::Ordering, iter::FusedIterator};
use either::Either;

/// The nearest point, along a ray, at which it meets a surface, and the
/// surface's tangent data at that point.
#[derive(Clone, Debug, PartialEq)]
pub struct Intersection<T> {
    /// Distance travelled by the ray, its direction being unit length
    pub dist: Float,
    pub tangent: T,
}

impl<T> Intersection<T> {
    #[inline]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Intersection<U> {
        let Intersection { dist, tangent } = self;
        Intersection {
            dist,
            tangent: f(tangent),
        }
    }

    #[inline]
    fn cmp_dist(&self, other: &Self) -> Ordering {
        self.dist.total_cmp(&other.dist)
    }
}

/// Something a light ray can run into.
///
/// Implementors only report intersections in front of the ray (strictly
/// positive distance) and, for one-sided surfaces, only those on their
/// front face.
pub trait Surface {
    type Tangent;

    fn closest_intersection(&self, ray: &Ray) -> Option<Intersection<Self::Tangent>>;
}

impl<K> Surface for Panel<K> {
    type Tangent = Unit<Vector>;

    #[inline]
    fn closest_intersection(&self, ray: &Ray) -> Option<Intersection<Self::Tangent>> {
        let normal = self.normal();

        if !geometry::is_front_face(ray.dir.as_ref(), normal.as_ref()) {
            return None;
        }

        geometry::ray_segment_params(&ray.pos, ray.dir.as_ref(), &self.endpoints()).map(
            |(dist, _)| Intersection {
                dist,
                tangent: normal,
            },
        )
    }
}

// The earliest of several equally close surfaces wins, `min_by` keeps the first minimum.

impl<T: Surface> Surface for [T] {
    type Tangent = T::Tangent;

    #[inline]
    fn closest_intersection(&self, ray: &Ray) -> Option<Intersection<Self::Tangent>> {
        self.iter()
            .filter_map(|s| s.closest_intersection(ray))
            .min_by(Intersection::cmp_dist)
    }
}

impl<T: Surface + ?Sized> Surface for &T {
    type Tangent = T::Tangent;

    #[inline]
    fn closest_intersection(&self, ray: &Ray) -> Option<Intersection<Self::Tangent>> {
        (**self).closest_intersection(ray)
    }
}

/// The closest of both. `A` wins ties.
impl<A: Surface, B: Surface> Surface for (A, B) {
    type Tangent = Either<A::Tangent, B::Tangent>;

    fn closest_intersection(&self, ray: &Ray) -> Option<Intersection<Self::Tangent>> {
        let (a, b) = self;

        a.closest_intersection(ray)
            .map(|i| i.map(Either::Left))
            .into_iter()
            .chain(b.closest_intersection(ray).map(|i| i.map(Either::Right)))
            .min_by(Intersection::cmp_dist)
    }
}

/// A drawable piece of a light path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaySegment {
    pub start: Point,
    pub end: Point,
    pub color: Color,
}

/// Where a light path leaves the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeHit {
    pub point: Point,
    pub color: Color,
}

/// What happened to the ray at the end of a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Bounced off a mirror, the path goes on
    Reflected,
    /// Stopped by a flag
    Absorbed,
    /// Reached the canvas boundary
    Exited,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathStep {
    pub segment: RaySegment,
    pub outcome: Outcome,
}

/// The path of a light's ray through mirrors and flags, one segment at a time.
///
/// Mirrors take precedence over flags at equal distances. The iterator ends
/// after the ray is absorbed or exits; it never ends while the ray keeps
/// bouncing, so callers bound it (see [`trace`]).
#[derive(Clone, Debug)]
pub struct LightPath<'a> {
    mirrors: &'a [Mirror],
    flags: &'a [Flag],
    bounds: Bounds,
    color: Color,
    ray: Option<Ray>,
}

impl<'a> LightPath<'a> {
    #[inline]
    #[must_use]
    pub fn new(light: &Light, mirrors: &'a [Mirror], flags: &'a [Flag], bounds: Bounds) -> Self {
        Self {
            mirrors,
            flags,
            bounds,
            color: light.color,
            ray: Some(light.ray()),
        }
    }

    /// The ray that the next step starts from, `None` once the path is over.
    #[inline]
    #[must_use]
    pub fn current_ray(&self) -> Option<&Ray> {
        self.ray.as_ref()
    }
}

impl Iterator for LightPath<'_> {
    type Item = PathStep;

    fn next(&mut self) -> Option<Self::Item> {
        let ray = self.ray.as_mut()?;
        let start = ray.pos;

        let surfaces = (self.mirrors, self.flags);

        let outcome = match surfaces.closest_intersection(ray) {
            None => {
                let Bounds { width, height } = self.bounds;
                ray.pos = geometry::ray_to_rect_boundary(&ray.pos, ray.dir.as_ref(), width, height);
                Outcome::Exited
            }
            Some(Intersection { dist, tangent }) => {
                ray.advance(dist);
                match tangent {
                    Either::Left(normal) => {
                        ray.reflect_dir(&normal);
                        Outcome::Reflected
                    }
                    Either::Right(_) => Outcome::Absorbed,
                }
            }
        };

        let segment = RaySegment {
            start,
            end: ray.pos,
            color: self.color,
        };

        if outcome != Outcome::Reflected {
            self.ray = None;
        }

        Some(PathStep { segment, outcome })
    }
}

impl FusedIterator for LightPath<'_> {}

/// A set of global parameters for tracing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TraceParams {
    /// Maximum number of segments per light. Paths trapped between mirrors
    /// are silently cut there.
    pub max_bounces: usize,
}

impl Default for TraceParams {
    fn default() -> Self {
        Self { max_bounces: 20 }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TraceResult {
    pub segments: Vec<RaySegment>,
    pub edge_hits: Vec<EdgeHit>,
}

/// Follows `light` through `mirrors` and `flags` until it is absorbed, leaves
/// `bounds`, or `params.max_bounces` segments have been produced.
#[must_use]
pub fn trace(
    light: &Light,
    mirrors: &[Mirror],
    flags: &[Flag],
    bounds: Bounds,
    params: TraceParams,
) -> TraceResult {
    let mut result = TraceResult::default();

    for PathStep { segment, outcome } in
        LightPath::new(light, mirrors, flags, bounds).take(params.max_bounces)
    {
        result.segments.push(segment);

        if outcome == Outcome::Exited {
            result.edge_hits.push(EdgeHit {
                point: segment.end,
                color: segment.color,
            });
        }
    }

    result
}

/// [`trace`]s every light of `scene`, in order.
#[must_use]
pub fn trace_scene(scene: &Scene, params: TraceParams) -> Vec<TraceResult> {
    scene
        .lights()
        .iter()
        .map(|light| trace(light, scene.mirrors(), scene.flags(), scene.bounds(), params))
        .collect()
}
