//! Software rendering of a [`Canvas`] into an RGBA image, for exporting the
//! current frame.

pub use image::{Rgba, RgbaImage};
use laser::{nalgebra::Unit, *};
use num_traits::AsPrimitive;

pub const BACKGROUND: Rgba<u8> = Rgba([18, 18, 24, 255]);
pub const MIRROR_FRONT: Rgba<u8> = Rgba([210, 225, 240, 255]);
pub const MIRROR_BACK: Rgba<u8> = Rgba([90, 90, 110, 255]);
pub const FLAG: Rgba<u8> = Rgba([130, 80, 45, 255]);
pub const GIZMO: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BORDER: Rgba<u8> = Rgba([160, 160, 170, 255]);

/// Radius of the disk drawn for a light, in world units.
pub const LIGHT_RADIUS: Float = 12.0;
/// Radius of the marker drawn where light leaves the canvas, in world units.
pub const EDGE_HIT_RADIUS: Float = 6.0;
/// How far behind a mirror's reflective face its back line is drawn, in world units.
pub const MIRROR_BACK_OFFSET: Float = 3.0;
const HANDLE_RADIUS: Float = 10.0;
/// Largest frame side, in pixels. Larger canvases are cropped.
pub const MAX_FRAME_SIZE: u32 = 8192;

/// Far-off pixel coordinates are clamped to this magnitude, keeping line drawing bounded.
const COORD_LIMIT: i64 = 1 << 16;

#[inline]
fn to_pixel(p: &Point) -> (i64, i64) {
    let clamp = |c: Float| -> i64 {
        let c: i64 = c.round().as_();
        c.clamp(-COORD_LIMIT, COORD_LIMIT)
    };
    (clamp(p.x), clamp(p.y))
}

/// Line and circle primitives on an [`RgbaImage`], in screen pixels.
///
/// Pixels falling outside the image are skipped.
pub trait Draw {
    fn put_pixel_clipped(&mut self, x: i64, y: i64, rgba: Rgba<u8>);

    /// Bresenham's line from `from` to `to`, both ends included.
    fn draw_line(&mut self, from: &Point, to: &Point, rgba: Rgba<u8>) {
        let (mut x0, mut y0) = to_pixel(from);
        let (x1, y1) = to_pixel(to);

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.put_pixel_clipped(x0, y0, rgba);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Midpoint circle outline.
    fn draw_circle(&mut self, center: &Point, radius: Float, rgba: Rgba<u8>) {
        let (cx, cy) = to_pixel(center);
        let r: i64 = radius.round().as_();
        let r = r.clamp(0, COORD_LIMIT);

        let (mut x, mut y) = (r, 0);
        let mut err = 1 - r;

        while x >= y {
            for (px, py) in [
                (x, y),
                (y, x),
                (-y, x),
                (-x, y),
                (-x, -y),
                (-y, -x),
                (y, -x),
                (x, -y),
            ] {
                self.put_pixel_clipped(cx + px, cy + py, rgba);
            }

            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    fn fill_circle(&mut self, center: &Point, radius: Float, rgba: Rgba<u8>) {
        let (cx, cy) = to_pixel(center);
        let r: i64 = radius.round().as_();
        let r = r.clamp(0, COORD_LIMIT);

        for dy in -r..=r {
            let span_sq: Float = (r * r - dy * dy).as_();
            let span: i64 = span_sq.sqrt().as_();
            for dx in -span..=span {
                self.put_pixel_clipped(cx + dx, cy + dy, rgba);
            }
        }
    }
}

impl Draw for RgbaImage {
    fn put_pixel_clipped(&mut self, x: i64, y: i64, rgba: Rgba<u8>) {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        if let Some(pixel) = self.get_pixel_mut_checked(x, y) {
            *pixel = rgba;
        }
    }
}

/// Something that can be drawn into a [`RgbaImage`], through a [`Camera`].
#[impl_trait_for_tuples::impl_for_tuples(16)]
pub trait Rasterize {
    fn rasterize(&self, target: &mut RgbaImage, camera: &Camera);
}

impl<T: Rasterize> Rasterize for [T] {
    fn rasterize(&self, target: &mut RgbaImage, camera: &Camera) {
        for item in self {
            item.rasterize(target, camera);
        }
    }
}

impl<T: Rasterize> Rasterize for Vec<T> {
    fn rasterize(&self, target: &mut RgbaImage, camera: &Camera) {
        self.as_slice().rasterize(target, camera);
    }
}

impl<T: Rasterize + ?Sized> Rasterize for &T {
    fn rasterize(&self, target: &mut RgbaImage, camera: &Camera) {
        (*self).rasterize(target, camera);
    }
}

fn world_line(target: &mut RgbaImage, camera: &Camera, [a, b]: [Point; 2], rgba: Rgba<u8>) {
    target.draw_line(&camera.world_to_screen(&a), &camera.world_to_screen(&b), rgba);
}

impl Rasterize for RaySegment {
    fn rasterize(&self, target: &mut RgbaImage, camera: &Camera) {
        world_line(target, camera, [self.start, self.end], Rgba(self.color.to_rgba(255)));
    }
}

impl Rasterize for EdgeHit {
    fn rasterize(&self, target: &mut RgbaImage, camera: &Camera) {
        target.fill_circle(
            &camera.world_to_screen(&self.point),
            EDGE_HIT_RADIUS * camera.scale(),
            Rgba(self.color.to_rgba(255)),
        );
    }
}

impl Rasterize for TraceResult {
    fn rasterize(&self, target: &mut RgbaImage, camera: &Camera) {
        (&self.segments, &self.edge_hits).rasterize(target, camera);
    }
}

impl Rasterize for Mirror {
    fn rasterize(&self, target: &mut RgbaImage, camera: &Camera) {
        let back = -self.normal().into_inner() * MIRROR_BACK_OFFSET;
        world_line(target, camera, self.endpoints().map(|p| p + back), MIRROR_BACK);
        world_line(target, camera, self.endpoints(), MIRROR_FRONT);
    }
}

impl Rasterize for Flag {
    fn rasterize(&self, target: &mut RgbaImage, camera: &Camera) {
        world_line(target, camera, self.endpoints(), FLAG);
    }
}

impl Rasterize for Light {
    fn rasterize(&self, target: &mut RgbaImage, camera: &Camera) {
        let center = camera.world_to_screen(&self.position);
        let radius = LIGHT_RADIUS * camera.scale();
        target.fill_circle(&center, radius, Rgba(self.color.to_rgba(255)));
        target.draw_circle(&center, radius, GIZMO);
    }
}

/// The selection circle around an object, and the rotation handle at `angle`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gizmo {
    pub center: Point,
    pub angle: Float,
}

impl Rasterize for Gizmo {
    fn rasterize(&self, target: &mut RgbaImage, camera: &Camera) {
        let center = camera.world_to_screen(&self.center);
        let handle = controller::rotation_handle_position(&self.center, self.angle);
        let dir: Unit<Vector> = laser::geometry::direction(self.angle);

        target.draw_circle(&center, controller::GIZMO_RADIUS * camera.scale(), GIZMO);
        world_line(
            target,
            camera,
            [self.center + dir.into_inner() * controller::GIZMO_RADIUS, handle],
            GIZMO,
        );
        target.fill_circle(
            &camera.world_to_screen(&handle),
            HANDLE_RADIUS * camera.scale(),
            GIZMO,
        );
    }
}

/// The outline of the canvas rectangle.
impl Rasterize for Bounds {
    fn rasterize(&self, target: &mut RgbaImage, camera: &Camera) {
        let corners = [
            Point::origin(),
            Point::new(self.width, 0.0),
            Point::new(self.width, self.height),
            Point::new(0.0, self.height),
        ];
        for (i, corner) in corners.iter().enumerate() {
            world_line(target, camera, [*corner, corners[(i + 1) % 4]], BORDER);
        }
    }
}

/// The pixel size of a frame covering `bounds`, each side capped at [`MAX_FRAME_SIZE`].
#[must_use]
pub fn frame_size(bounds: &Bounds) -> (u32, u32) {
    let side = |len: Float| -> u32 {
        let max: Float = MAX_FRAME_SIZE.as_();
        len.ceil().clamp(0.0, max).as_()
    };
    (side(bounds.width), side(bounds.height))
}

/// Renders what the canvas currently shows into an image of the viewport size:
/// light paths, then mirrors, flags and lights, then the selection gizmo, and
/// the canvas outline when the view is zoomed or panned.
#[must_use]
pub fn render_frame(canvas: &Canvas) -> RgbaImage {
    let scene = canvas.scene();
    let camera = canvas.camera();

    let (width, height) = frame_size(&scene.bounds());
    let mut frame = RgbaImage::from_pixel(width, height, BACKGROUND);

    (
        canvas.trace_all(),
        scene.mirrors(),
        scene.flags(),
        scene.lights(),
    )
        .rasterize(&mut frame, camera);

    let gizmo = scene
        .selected()
        .and_then(|handle| scene.get(&handle))
        .map(|object| Gizmo {
            center: object.position(),
            angle: object.angle(),
        });
    if let Some(gizmo) = gizmo {
        gizmo.rasterize(&mut frame, camera);
    }

    if camera.is_transformed() {
        scene.bounds().rasterize(&mut frame, camera);
    }

    frame
}
