use super::*;

use core::{fmt, marker::PhantomData, str::FromStr};
use geometry::{distance, distance_to_segment};
use uuid::Uuid;

/// Objects whose centers are closer than this are considered to overlap when placing new ones.
pub const OCCUPANCY_RADIUS: Float = 80.0;
/// How many random steps [`Scene::find_next_available_position`] takes before giving up.
pub const PLACEMENT_ATTEMPTS: usize = 100;
/// A light is hit by points closer than this to its center.
pub const LIGHT_HIT_RADIUS: Float = 30.0;
/// A mirror or flag is hit by points closer than this to its segment.
pub const PANEL_HIT_DISTANCE: Float = 40.0;
pub const DEFAULT_PANEL_LENGTH: Float = 150.0;

/// Identity of a placed object, stable across edits and history restoration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(Uuid);

impl ObjectId {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ObjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub id: ObjectId,
    pub position: Point,
    /// In degrees, `0` points towards `+x`
    pub angle: Float,
    pub color: Color,
    pub selected: bool,
}

impl Light {
    #[inline]
    #[must_use]
    pub fn new(position: impl Into<Point>) -> Self {
        Self {
            id: ObjectId::new(),
            position: position.into(),
            angle: 0.0,
            color: Color::default(),
            selected: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_angle(mut self, angle: Float) -> Self {
        self.angle = angle;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    #[inline]
    #[must_use]
    pub fn direction(&self) -> Unit<Vector> {
        geometry::direction(self.angle)
    }

    #[inline]
    #[must_use]
    pub fn ray(&self) -> Ray {
        Ray::new(self.position, self.direction())
    }
}

/// Marker for panels that reflect light off their front face.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Reflective;

/// Marker for panels that absorb light hitting their front face.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Opaque;

pub trait PanelKind {
    const KIND: ObjectKind;
}

impl PanelKind for Reflective {
    const KIND: ObjectKind = ObjectKind::Mirror;
}

impl PanelKind for Opaque {
    const KIND: ObjectKind = ObjectKind::Flag;
}

/// A straight, one-sided surface centered on `position`.
///
/// The front face is the side [`Self::normal`] points out of.
#[derive(Clone, Debug, PartialEq)]
pub struct Panel<K> {
    pub id: ObjectId,
    pub position: Point,
    /// In degrees, direction of the segment from its first endpoint to its second
    pub angle: Float,
    pub length: Float,
    pub selected: bool,
    kind: PhantomData<K>,
}

pub type Mirror = Panel<Reflective>;
pub type Flag = Panel<Opaque>;

impl<K> Panel<K> {
    #[inline]
    #[must_use]
    pub fn new(position: impl Into<Point>) -> Self {
        Self::with_id(ObjectId::new(), position)
    }

    #[inline]
    #[must_use]
    pub fn with_id(id: ObjectId, position: impl Into<Point>) -> Self {
        Self {
            id,
            position: position.into(),
            angle: 0.0,
            length: DEFAULT_PANEL_LENGTH,
            selected: false,
            kind: PhantomData,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_angle(mut self, angle: Float) -> Self {
        self.angle = angle;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_length(mut self, length: Float) -> Self {
        self.length = length;
        self
    }

    /// The two ends of the panel, `position ∓ length / 2` along its angle.
    #[inline]
    #[must_use]
    pub fn endpoints(&self) -> [Point; 2] {
        let half = geometry::direction(self.angle).into_inner() * (self.length / 2.0);
        [self.position - half, self.position + half]
    }

    /// The panel's direction, rotated by 90 degrees.
    #[inline]
    #[must_use]
    pub fn normal(&self) -> Unit<Vector> {
        geometry::direction(self.angle + 90.0)
    }
}

impl<K: PanelKind> Panel<K> {
    #[inline]
    #[must_use]
    pub fn handle(&self) -> Handle {
        Handle {
            kind: K::KIND,
            id: self.id,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Light,
    Mirror,
    Flag,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Mirror => "mirror",
            Self::Flag => "flag",
        })
    }
}

/// A non-owning reference to an object of the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    pub kind: ObjectKind,
    pub id: ObjectId,
}

#[derive(Clone, Copy, Debug)]
pub enum ObjectRef<'a> {
    Light(&'a Light),
    Mirror(&'a Mirror),
    Flag(&'a Flag),
}

impl ObjectRef<'_> {
    #[must_use]
    pub fn handle(&self) -> Handle {
        match self {
            Self::Light(l) => Handle {
                kind: ObjectKind::Light,
                id: l.id,
            },
            Self::Mirror(m) => m.handle(),
            Self::Flag(f) => f.handle(),
        }
    }

    #[must_use]
    pub fn position(&self) -> Point {
        match self {
            Self::Light(l) => l.position,
            Self::Mirror(m) => m.position,
            Self::Flag(f) => f.position,
        }
    }

    #[must_use]
    pub fn angle(&self) -> Float {
        match self {
            Self::Light(l) => l.angle,
            Self::Mirror(m) => m.angle,
            Self::Flag(f) => f.angle,
        }
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        match self {
            Self::Light(l) => l.selected,
            Self::Mirror(m) => m.selected,
            Self::Flag(f) => f.selected,
        }
    }

    /// Whether a pointer at `p` lands on this object.
    #[must_use]
    pub fn contains(&self, p: &Point) -> bool {
        match self {
            Self::Light(l) => distance(p, &l.position) < LIGHT_HIT_RADIUS,
            Self::Mirror(m) => distance_to_segment(p, &m.endpoints()) < PANEL_HIT_DISTANCE,
            Self::Flag(f) => distance_to_segment(p, &f.endpoints()) < PANEL_HIT_DISTANCE,
        }
    }
}

#[derive(Debug)]
pub enum ObjectMut<'a> {
    Light(&'a mut Light),
    Mirror(&'a mut Mirror),
    Flag(&'a mut Flag),
}

impl ObjectMut<'_> {
    fn position_mut(&mut self) -> &mut Point {
        match self {
            Self::Light(l) => &mut l.position,
            Self::Mirror(m) => &mut m.position,
            Self::Flag(f) => &mut f.position,
        }
    }

    #[must_use]
    pub fn position(&mut self) -> Point {
        *self.position_mut()
    }

    pub fn translate(&mut self, delta: &Vector) {
        *self.position_mut() += delta;
    }

    pub fn set_angle(&mut self, angle: Float) {
        match self {
            Self::Light(l) => l.angle = angle,
            Self::Mirror(m) => m.angle = angle,
            Self::Flag(f) => f.angle = angle,
        }
    }
}

/// The rectangle `[0, width] x [0, height]` lights are clipped to and objects are placed in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: Float,
    pub height: Float,
}

impl Bounds {
    #[inline]
    #[must_use]
    pub const fn new(width: Float, height: Float) -> Self {
        Self { width, height }
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    #[inline]
    #[must_use]
    pub fn clamp(&self, p: &Point) -> Point {
        Point::new(
            p.x.clamp(0.0, self.width.max(0.0)),
            p.y.clamp(0.0, self.height.max(0.0)),
        )
    }
}

/// The placed objects, in insertion order, which is also drawing order.
///
/// At most one object is selected at any time.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    lights: Vec<Light>,
    mirrors: Vec<Mirror>,
    flags: Vec<Flag>,
    bounds: Bounds,
}

impl Scene {
    #[inline]
    #[must_use]
    pub const fn new(bounds: Bounds) -> Self {
        Self {
            lights: Vec::new(),
            mirrors: Vec::new(),
            flags: Vec::new(),
            bounds,
        }
    }

    /// Builds a scene from already placed objects. Selection flags are dropped,
    /// and objects whose id is already taken get a fresh one.
    #[must_use]
    pub fn from_parts(
        bounds: Bounds,
        lights: Vec<Light>,
        mirrors: Vec<Mirror>,
        flags: Vec<Flag>,
    ) -> Self {
        let mut scene = Self::new(bounds);
        lights.into_iter().for_each(|l| {
            scene.push_light(l);
        });
        mirrors.into_iter().for_each(|m| {
            scene.push_mirror(m);
        });
        flags.into_iter().for_each(|f| {
            scene.push_flag(f);
        });
        scene
    }

    #[inline]
    #[must_use]
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    #[inline]
    #[must_use]
    pub fn mirrors(&self) -> &[Mirror] {
        &self.mirrors
    }

    #[inline]
    #[must_use]
    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.lights.len() + self.mirrors.len() + self.flags.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains_id(&self, id: &ObjectId) -> bool {
        self.lights.iter().any(|l| l.id == *id)
            || self.mirrors.iter().any(|m| m.id == *id)
            || self.flags.iter().any(|f| f.id == *id)
    }

    /// `id`, or a fresh one if another object already uses it.
    fn unique_id(&self, id: ObjectId) -> ObjectId {
        if self.contains_id(&id) {
            let fresh = ObjectId::new();
            tracing::debug!("id {id} is taken, using {fresh}");
            fresh
        } else {
            id
        }
    }

    /// Appends `light` unselected, on top of every other light, and returns its id.
    ///
    /// The id is replaced if it is already in use.
    pub fn push_light(&mut self, mut light: Light) -> ObjectId {
        light.selected = false;
        light.id = self.unique_id(light.id);
        let id = light.id;
        self.lights.push(light);
        id
    }

    pub fn push_mirror(&mut self, mut mirror: Mirror) -> ObjectId {
        mirror.selected = false;
        mirror.id = self.unique_id(mirror.id);
        let id = mirror.id;
        self.mirrors.push(mirror);
        id
    }

    pub fn push_flag(&mut self, mut flag: Flag) -> ObjectId {
        flag.selected = false;
        flag.id = self.unique_id(flag.id);
        let id = flag.id;
        self.flags.push(flag);
        id
    }

    pub fn add_light(&mut self, near: &Point, rng: &mut (impl rand::Rng + ?Sized)) -> ObjectId {
        let position = self.find_next_available_position(near, rng);
        tracing::debug!("adding light at ({}, {})", position.x, position.y);
        self.push_light(Light::new(position))
    }

    pub fn add_mirror(&mut self, near: &Point, rng: &mut (impl rand::Rng + ?Sized)) -> ObjectId {
        let position = self.find_next_available_position(near, rng);
        tracing::debug!("adding mirror at ({}, {})", position.x, position.y);
        self.push_mirror(Mirror::new(position))
    }

    pub fn add_flag(&mut self, near: &Point, rng: &mut (impl rand::Rng + ?Sized)) -> ObjectId {
        let position = self.find_next_available_position(near, rng);
        tracing::debug!("adding flag at ({}, {})", position.x, position.y);
        self.push_flag(Flag::new(position))
    }

    fn positions(&self) -> impl Iterator<Item = &Point> {
        let lights = self.lights.iter().map(|l| &l.position);
        let mirrors = self.mirrors.iter().map(|m| &m.position);
        let flags = self.flags.iter().map(|f| &f.position);
        lights.chain(mirrors).chain(flags)
    }

    #[must_use]
    pub fn is_position_occupied(&self, p: &Point, radius: Float) -> bool {
        self.positions().any(|q| distance(p, q) < radius)
    }

    /// Returns a point inside the bounds, close to `initial`, that no other object is
    /// too close to, walking randomly away from occupied spots.
    ///
    /// The walk is capped at [`PLACEMENT_ATTEMPTS`] steps, after which the last
    /// candidate is returned, even if it is occupied.
    #[must_use]
    pub fn find_next_available_position(
        &self,
        initial: &Point,
        rng: &mut (impl rand::Rng + ?Sized),
    ) -> Point {
        let mut candidate = self.bounds.clamp(initial);

        for _ in 0..PLACEMENT_ATTEMPTS {
            if !self.is_position_occupied(&candidate, OCCUPANCY_RADIUS) {
                return candidate;
            }
            let angle = rng.gen::<Float>() * 360.0;
            let step = geometry::direction(angle).into_inner() * OCCUPANCY_RADIUS;
            candidate = self.bounds.clamp(&(candidate + step));
        }

        candidate
    }

    /// The topmost object under `p`, lights first, then mirrors, then flags.
    #[must_use]
    pub fn hit_test(&self, p: &Point) -> Option<Handle> {
        let lights = self.lights.iter().rev().map(ObjectRef::Light);
        let mirrors = self.mirrors.iter().rev().map(ObjectRef::Mirror);
        let flags = self.flags.iter().rev().map(ObjectRef::Flag);

        lights
            .chain(mirrors)
            .chain(flags)
            .find(|object| object.contains(p))
            .map(|object| object.handle())
    }

    #[must_use]
    pub fn get(&self, handle: &Handle) -> Option<ObjectRef<'_>> {
        let id = handle.id;
        match handle.kind {
            ObjectKind::Light => self.lights.iter().find(|l| l.id == id).map(ObjectRef::Light),
            ObjectKind::Mirror => self.mirrors.iter().find(|m| m.id == id).map(ObjectRef::Mirror),
            ObjectKind::Flag => self.flags.iter().find(|f| f.id == id).map(ObjectRef::Flag),
        }
    }

    #[must_use]
    pub fn get_mut(&mut self, handle: &Handle) -> Option<ObjectMut<'_>> {
        let id = handle.id;
        match handle.kind {
            ObjectKind::Light => self
                .lights
                .iter_mut()
                .find(|l| l.id == id)
                .map(ObjectMut::Light),
            ObjectKind::Mirror => self
                .mirrors
                .iter_mut()
                .find(|m| m.id == id)
                .map(ObjectMut::Mirror),
            ObjectKind::Flag => self
                .flags
                .iter_mut()
                .find(|f| f.id == id)
                .map(ObjectMut::Flag),
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<Handle> {
        let lights = self.lights.iter().map(ObjectRef::Light);
        let mirrors = self.mirrors.iter().map(ObjectRef::Mirror);
        let flags = self.flags.iter().map(ObjectRef::Flag);

        lights
            .chain(mirrors)
            .chain(flags)
            .find(ObjectRef::is_selected)
            .map(|object| object.handle())
    }

    /// Unselects everything. Returns whether something was selected.
    pub fn clear_selection(&mut self) -> bool {
        let mut cleared = false;

        let lights = self.lights.iter_mut().map(|l| &mut l.selected);
        let mirrors = self.mirrors.iter_mut().map(|m| &mut m.selected);
        let flags = self.flags.iter_mut().map(|f| &mut f.selected);

        for selected in lights.chain(mirrors).chain(flags) {
            cleared |= *selected;
            *selected = false;
        }

        cleared
    }

    /// Makes `handle` the only selected object. Returns `false`, leaving the
    /// selection untouched, if it isn't in the scene.
    pub fn select(&mut self, handle: &Handle) -> bool {
        if self.get(handle).is_none() {
            return false;
        }

        self.clear_selection();

        match self.get_mut(handle) {
            Some(ObjectMut::Light(l)) => l.selected = true,
            Some(ObjectMut::Mirror(m)) => m.selected = true,
            Some(ObjectMut::Flag(f)) => f.selected = true,
            None => return false,
        }

        true
    }

    /// Removes the selected object, if any, and returns a handle to it.
    pub fn delete_selected(&mut self) -> Option<Handle> {
        let handle = self.selected()?;

        match handle.kind {
            ObjectKind::Light => self.lights.retain(|l| l.id != handle.id),
            ObjectKind::Mirror => self.mirrors.retain(|m| m.id != handle.id),
            ObjectKind::Flag => self.flags.retain(|f| f.id != handle.id),
        }

        tracing::debug!("deleted {} {}", handle.kind, handle.id);
        Some(handle)
    }

    /// Recolors the selected object, only if it is a light. Returns whether it was applied.
    pub fn change_color(&mut self, color: Color) -> bool {
        match self.lights.iter_mut().find(|l| l.selected) {
            Some(light) => {
                light.color = color;
                true
            }
            None => false,
        }
    }

    /// An independent copy of every object, selection excluded.
    #[must_use]
    pub fn state(&self) -> CanvasState {
        CanvasState::new(
            self.lights.clone(),
            self.mirrors.clone(),
            self.flags.clone(),
        )
    }

    /// Replaces every object with a copy of the ones in `state`, and clears the selection.
    pub fn restore(&mut self, state: &CanvasState) {
        let (lights, mirrors, flags) = state.clone().into_parts();
        self.lights = lights;
        self.mirrors = mirrors;
        self.flags = flags;
        self.clear_selection();
    }
}
