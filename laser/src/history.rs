use super::*;

use core::fmt;
use std::collections::VecDeque;

/// Maximum number of snapshots kept on the undo stack.
pub const MAX_UNDO_DEPTH: usize = 20;

/// An independent copy of every object of a scene at some point in time.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasState {
    lights: Vec<Light>,
    mirrors: Vec<Mirror>,
    flags: Vec<Flag>,
}

impl CanvasState {
    /// Selection is not part of a snapshot, all objects are stored unselected.
    #[must_use]
    pub fn new(mut lights: Vec<Light>, mut mirrors: Vec<Mirror>, mut flags: Vec<Flag>) -> Self {
        lights.iter_mut().for_each(|l| l.selected = false);
        mirrors.iter_mut().for_each(|m| m.selected = false);
        flags.iter_mut().for_each(|f| f.selected = false);

        Self {
            lights,
            mirrors,
            flags,
        }
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
    pub fn into_parts(self) -> (Vec<Light>, Vec<Mirror>, Vec<Flag>) {
        (self.lights, self.mirrors, self.flags)
    }
}

/// Why a snapshot was taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    Initial,
    Add,
    Delete,
    Move,
    Rotate,
    ColorChange,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initial => "INITIAL",
            Self::Add => "ADD",
            Self::Delete => "DELETE",
            Self::Move => "MOVE",
            Self::Rotate => "ROTATE",
            Self::ColorChange => "COLOR_CHANGE",
        })
    }
}

/// Undo/redo stacks of whole-scene snapshots.
///
/// The top of the undo stack is always the state currently displayed, and its
/// bottom entry is never popped, so there is always a state to go back to.
#[derive(Clone, Debug)]
pub struct History {
    undo: VecDeque<CanvasState>,
    redo: Vec<CanvasState>,
}

impl History {
    /// Starts a history whose base state is `scene`.
    #[must_use]
    pub fn new(scene: &Scene) -> Self {
        let mut history = Self {
            undo: VecDeque::with_capacity(MAX_UNDO_DEPTH + 1),
            redo: Vec::new(),
        };
        history.snapshot(scene, Trigger::Initial);
        history
    }

    /// Forgets everything and starts over from `scene`.
    pub fn clear(&mut self, scene: &Scene) {
        self.undo.clear();
        self.redo.clear();
        self.snapshot(scene, Trigger::Initial);
    }

    #[inline]
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    #[inline]
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// The snapshot currently on top of the undo stack.
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<&CanvasState> {
        self.undo.back()
    }

    /// Records the current state of `scene`.
    ///
    /// Evicts the oldest snapshot past [`MAX_UNDO_DEPTH`], and, unless this is
    /// the [`Trigger::Initial`] snapshot, invalidates everything that could be redone.
    pub fn snapshot(&mut self, scene: &Scene, trigger: Trigger) {
        self.push_undo(scene.state());

        if trigger != Trigger::Initial {
            self.redo.clear();
        }

        tracing::debug!(
            "state saved: [{trigger}] undo = {}, redo = {}",
            self.undo.len(),
            self.redo.len(),
        );
    }

    /// Same as [`Self::snapshot`], for a move of an object from `start` to `end`.
    pub fn snapshot_move(&mut self, scene: &Scene, start: &Point, end: &Point) {
        self.snapshot(scene, Trigger::Move);
        tracing::debug!(
            "moved from ({}, {}) to ({}, {})",
            start.x,
            start.y,
            end.x,
            end.y
        );
    }

    fn push_undo(&mut self, state: CanvasState) {
        self.undo.push_back(state);
        while self.undo.len() > MAX_UNDO_DEPTH {
            self.undo.pop_front();
        }
    }

    /// Moves the current state to the redo stack and restores the previous one
    /// into `scene`. Returns `false`, doing nothing, if there is no previous state.
    pub fn undo(&mut self, scene: &mut Scene) -> bool {
        if !self.can_undo() {
            return false;
        }

        let Some(popped) = self.undo.pop_back() else {
            return false;
        };
        self.redo.push(popped);

        if let Some(state) = self.undo.back() {
            scene.restore(state);
        }

        tracing::debug!(
            "undo: undo = {}, redo = {}",
            self.undo.len(),
            self.redo.len()
        );
        true
    }

    /// Restores the last undone state into `scene`. Returns `false`, doing
    /// nothing, if nothing was undone.
    pub fn redo(&mut self, scene: &mut Scene) -> bool {
        let Some(state) = self.redo.pop() else {
            return false;
        };

        scene.restore(&state);
        self.push_undo(state);

        tracing::debug!(
            "redo: undo = {}, redo = {}",
            self.undo.len(),
            self.redo.len()
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scene() -> Scene {
        Scene::new(Bounds::new(400.0, 300.0))
    }

    #[test]
    fn starts_with_a_base_state() {
        let s = scene();
        let h = History::new(&s);
        assert_eq!(h.undo_len(), 1);
        assert!(!h.can_undo());
        assert!(!h.can_redo());
    }

    #[test]
    fn undo_then_redo_is_identity() {
        let mut s = scene();
        let mut h = History::new(&s);

        let id = s.push_light(Light::new([10.0, 20.0]).with_angle(33.0));
        h.snapshot(&s, Trigger::Add);
        s.push_mirror(Mirror::new([200.0, 100.0]).with_angle(45.0));
        h.snapshot(&s, Trigger::Add);

        let before = s.clone();

        assert!(h.undo(&mut s));
        assert_eq!(s.mirrors().len(), 0);
        assert_eq!(s.lights()[0].id, id);

        assert!(h.redo(&mut s));
        assert_eq!(s, before);
        assert!(!h.can_redo());
    }

    #[test]
    fn base_state_is_never_popped() {
        let mut s = scene();
        let mut h = History::new(&s);
        s.push_flag(Flag::new([1.0, 1.0]));
        h.snapshot(&s, Trigger::Add);

        assert!(h.undo(&mut s));
        assert!(!h.undo(&mut s));
        assert_eq!(h.undo_len(), 1);
        assert!(s.is_empty());
    }

    #[test]
    fn redo_on_empty_stack_is_a_no_op() {
        let mut s = scene();
        let mut h = History::new(&s);
        s.push_flag(Flag::new([1.0, 1.0]));
        assert!(!h.redo(&mut s));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn new_edit_invalidates_redo() {
        let mut s = scene();
        let mut h = History::new(&s);
        s.push_light(Light::new([1.0, 1.0]));
        h.snapshot(&s, Trigger::Add);
        h.undo(&mut s);
        assert!(h.can_redo());

        s.push_light(Light::new([2.0, 2.0]));
        h.snapshot(&s, Trigger::Add);
        assert!(!h.can_redo());
    }

    #[test]
    fn depth_is_bounded_and_oldest_goes_first() {
        let mut s = scene();
        let mut h = History::new(&s);

        for i in 0..30 {
            s.push_light(Light::new([i as Float, 0.0]));
            h.snapshot(&s, Trigger::Add);
        }

        assert_eq!(h.undo_len(), MAX_UNDO_DEPTH);
        // 30 lights on top, the oldest kept snapshot has 30 - 19 of them
        while h.undo(&mut s) {}
        assert_eq!(s.lights().len(), 30 - (MAX_UNDO_DEPTH - 1));
    }

    #[test]
    fn snapshots_are_independent_of_the_scene() {
        let mut s = scene();
        let light = Light::new([10.0, 10.0]);
        let handle = Handle {
            kind: ObjectKind::Light,
            id: light.id,
        };
        s.push_light(light);
        let mut h = History::new(&s);

        s.select(&handle);
        if let Some(mut object) = s.get_mut(&handle) {
            object.translate(&Vector::new(50.0, 0.0));
        }
        h.snapshot(&s, Trigger::Move);

        assert_relative_eq!(
            h.current().unwrap().lights()[0].position,
            Point::new(60.0, 10.0)
        );
        assert!(!h.current().unwrap().lights()[0].selected);

        h.undo(&mut s);
        assert_relative_eq!(s.lights()[0].position, Point::new(10.0, 10.0));
        s.get_mut(&handle).unwrap().translate(&Vector::new(1.0, 1.0));
        h.redo(&mut s);
        assert_relative_eq!(s.lights()[0].position, Point::new(60.0, 10.0));
        assert_eq!(s.selected(), None);
    }
}
