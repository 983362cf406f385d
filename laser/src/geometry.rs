//! Stateless plane geometry used by the tracer and the hit tests.
//!
//! Every function here is total: degenerate inputs (zero-length segments,
//! zero directions, parallel lines) produce `None` or a fallback value.

use super::*;

/// Unit vector pointing at `angle` degrees. `0` is `+x`, angles grow clockwise in screen space.
#[inline]
#[must_use]
pub fn direction(angle: Float) -> Unit<Vector> {
    let (sin, cos) = angle.to_radians().sin_cos();
    Unit::new_unchecked(Vector::new(cos, sin))
}

#[inline]
#[must_use]
pub fn distance(a: &Point, b: &Point) -> Float {
    nalgebra::distance(a, b)
}

/// Distance from `p` to the closest point of the segment `[start, end]`.
#[must_use]
pub fn distance_to_segment(p: &Point, [start, end]: &[Point; 2]) -> Float {
    let d = end - start;
    let length_sq = d.norm_squared();

    if length_sq == 0.0 {
        return distance(p, start);
    }

    let t = ((p - start).dot(&d) / length_sq).clamp(0.0, 1.0);
    distance(p, &(start + d * t))
}

/// Returns `(t, u)` such that `origin + t * dir == start + u * (end - start)`,
/// if the ray and the segment intersect (`t > 0`, `u` in `[0, 1]`).
#[must_use]
pub fn ray_segment_params(
    origin: &Point,
    dir: &Vector,
    [start, end]: &[Point; 2],
) -> Option<(Float, Float)> {
    let s = end - start;

    if dir.norm_squared() == 0.0 || s.norm_squared() == 0.0 {
        return None;
    }

    let det = dir.perp(&s);
    if det == 0.0 {
        return None;
    }

    let w = start - origin;
    let t = w.perp(&s) / det;
    let u = w.perp(dir) / det;

    (t > 0.0 && (0.0..=1.0).contains(&u)).then_some((t, u))
}

/// The point where the ray `origin + t * dir` (`t > 0`) crosses the segment, if any.
#[inline]
#[must_use]
pub fn intersect_ray_segment(origin: &Point, dir: &Vector, segment: &[Point; 2]) -> Option<Point> {
    ray_segment_params(origin, dir, segment).map(|(t, _)| origin + dir * t)
}

/// Whether a ray travelling along `dir` hits the side of a surface its `normal` points out of.
#[inline]
#[must_use]
pub fn is_front_face(dir: &Vector, normal: &Vector) -> bool {
    dir.dot(normal) < 0.0
}

/// Mirror `incident` about the line orthogonal to `normal`, which must be unit length.
#[inline]
#[must_use]
pub fn reflect(incident: &Vector, normal: &Unit<Vector>) -> Vector {
    let n = normal.as_ref();
    incident - n * (2.0 * incident.dot(n))
}

/// Where the ray leaves the rectangle `[0, width] x [0, height]`.
///
/// This is the smallest non-negative `t` over the (up to four) edges the ray is
/// heading towards. Falls back to `origin` when there is no such edge, which
/// only happens for a zero direction or an origin outside the rectangle
/// heading away from it.
#[must_use]
pub fn ray_to_rect_boundary(origin: &Point, dir: &Vector, width: Float, height: Float) -> Point {
    let candidates = [
        (dir.x > 0.0).then(|| (width - origin.x) / dir.x),
        (dir.x < 0.0).then(|| -origin.x / dir.x),
        (dir.y > 0.0).then(|| (height - origin.y) / dir.y),
        (dir.y < 0.0).then(|| -origin.y / dir.y),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter(|t| *t >= 0.0)
        .min_by(Float::total_cmp)
        .map_or(*origin, |t| origin + dir * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn seg(a: [Float; 2], b: [Float; 2]) -> [Point; 2] {
        [a.into(), b.into()]
    }

    #[test]
    fn segment_distance_is_clamped_to_the_endpoints() {
        let s = seg([0.0, 0.0], [10.0, 0.0]);
        assert_relative_eq!(distance_to_segment(&Point::new(5.0, 3.0), &s), 3.0);
        assert_relative_eq!(distance_to_segment(&Point::new(-3.0, 4.0), &s), 5.0);
        assert_relative_eq!(distance_to_segment(&Point::new(13.0, -4.0), &s), 5.0);
    }

    #[test]
    fn degenerate_segment_distance_is_point_distance() {
        let s = seg([1.0, 1.0], [1.0, 1.0]);
        assert_relative_eq!(distance_to_segment(&Point::new(4.0, 5.0), &s), 5.0);
    }

    #[test]
    fn ray_hits_segment_in_front() {
        let s = seg([5.0, -1.0], [5.0, 1.0]);
        let p = intersect_ray_segment(&Point::origin(), &Vector::x(), &s);
        assert_relative_eq!(p.unwrap(), Point::new(5.0, 0.0));
    }

    #[test]
    fn vertical_ray_is_handled() {
        let s = seg([-1.0, 4.0], [1.0, 4.0]);
        let p = intersect_ray_segment(&Point::origin(), &Vector::y(), &s);
        assert_relative_eq!(p.unwrap(), Point::new(0.0, 4.0));
    }

    #[test]
    fn no_hit_behind_outside_or_parallel() {
        let behind = seg([-5.0, -1.0], [-5.0, 1.0]);
        let beside = seg([5.0, 2.0], [5.0, 3.0]);
        let parallel = seg([1.0, 0.0], [4.0, 0.0]);
        let o = Point::origin();
        let d = Vector::x();
        assert!(intersect_ray_segment(&o, &d, &behind).is_none());
        assert!(intersect_ray_segment(&o, &d, &beside).is_none());
        assert!(intersect_ray_segment(&o, &d, &parallel).is_none());
    }

    #[test]
    fn degenerate_inputs_never_intersect() {
        let s = seg([5.0, -1.0], [5.0, 1.0]);
        let point = seg([5.0, 0.0], [5.0, 0.0]);
        let o = Point::origin();
        assert!(intersect_ray_segment(&o, &Vector::zeros(), &s).is_none());
        assert!(intersect_ray_segment(&o, &Vector::x(), &point).is_none());
    }

    #[test]
    fn front_face_depends_on_approach_side() {
        let normal = Vector::new(-1.0, 0.0);
        assert!(is_front_face(&Vector::x(), &normal));
        assert!(!is_front_face(&-Vector::x(), &normal));
        assert!(!is_front_face(&Vector::y(), &normal));
    }

    #[test]
    fn reflection_is_an_involution() {
        for i in 0..24 {
            let d = direction(i as Float * 15.0 + 3.0);
            let n = direction(i as Float * 37.0 - 11.0);
            let twice = reflect(&reflect(d.as_ref(), &n), &n);
            assert_abs_diff_eq!(twice, d.into_inner(), epsilon = 1e-12);
        }
    }

    #[test]
    fn head_on_reflection_reverses_direction() {
        let n = Unit::new_normalize(Vector::new(-1.0, 0.0));
        assert_relative_eq!(reflect(&Vector::x(), &n), -Vector::x());
    }

    #[test]
    fn boundary_exit_points() {
        let o = Point::new(200.0, 100.0);
        let right = ray_to_rect_boundary(&o, &Vector::x(), 400.0, 300.0);
        assert_relative_eq!(right, Point::new(400.0, 100.0));

        let diag = ray_to_rect_boundary(&o, &direction(-45.0), 400.0, 300.0);
        assert_abs_diff_eq!(diag, Point::new(300.0, 0.0), epsilon = 1e-9);

        let left = ray_to_rect_boundary(&o, &direction(180.0), 400.0, 300.0);
        assert_abs_diff_eq!(left.x, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn boundary_without_direction_is_the_origin() {
        let o = Point::new(10.0, 10.0);
        assert_eq!(ray_to_rect_boundary(&o, &Vector::zeros(), 100.0, 100.0), o);
    }
}
