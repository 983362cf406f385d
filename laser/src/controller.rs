//! Turns a stream of pointer events into selection, moves, rotations and pans.

use super::*;

use core::mem;

/// Radius of the circle drawn around the selected object.
pub const GIZMO_RADIUS: Float = 60.0;
/// How far past the gizmo circle the rotation handle sits.
pub const HANDLE_OFFSET: Float = 35.0;
/// Pointers closer than this to the rotation handle grab it.
pub const HANDLE_GRAB_RADIUS: Float = 45.0;

/// Where the rotation handle of an object centered on `center`, turned by `angle` degrees, is.
#[inline]
#[must_use]
pub fn rotation_handle_position(center: &Point, angle: Float) -> Point {
    center + geometry::direction(angle).into_inner() * (GIZMO_RADIUS + HANDLE_OFFSET)
}

#[inline]
#[must_use]
pub fn is_on_rotation_handle(p: &Point, center: &Point, angle: Float) -> bool {
    geometry::distance(p, &rotation_handle_position(center, angle)) < HANDLE_GRAB_RADIUS
}

/// The gesture in progress.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    /// The pointer went down on an object, which is now selected. Moving it
    /// starts a drag.
    Selecting(Handle),
    Dragging { target: Handle, start: Point },
    Rotating(Handle),
    Panning,
}

/// What a pointer event changed, for the caller to forward to observers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Response {
    pub selection_changed: bool,
    pub scene_changed: bool,
    pub camera_changed: bool,
    /// Set when the event ended a gesture that was recorded in the history
    pub committed: Option<Trigger>,
}

#[derive(Clone, Debug, Default)]
pub struct Controller {
    gesture: Gesture,
    last_screen: Point,
}

impl Controller {
    #[inline]
    #[must_use]
    pub const fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Abandons the current gesture without recording anything.
    pub fn reset(&mut self) {
        self.gesture = Gesture::Idle;
    }

    fn set_gesture(&mut self, gesture: Gesture) {
        if self.gesture != gesture {
            tracing::trace!("gesture: {:?} -> {gesture:?}", self.gesture);
            self.gesture = gesture;
        }
    }

    pub fn pointer_down(&mut self, screen: &Point, scene: &mut Scene, camera: &Camera) -> Response {
        let mut response = Response::default();
        self.last_screen = *screen;
        let world = camera.screen_to_world(screen);

        if let Some(selected) = scene.selected() {
            let on_handle = scene
                .get(&selected)
                .is_some_and(|object| is_on_rotation_handle(&world, &object.position(), object.angle()));

            if on_handle {
                self.set_gesture(Gesture::Rotating(selected));
                return response;
            }
        }

        match scene.hit_test(&world) {
            Some(hit) => {
                if scene.selected() != Some(hit) {
                    response.selection_changed = scene.select(&hit);
                }
                self.set_gesture(Gesture::Selecting(hit));
            }
            None => {
                response.selection_changed = scene.clear_selection();
                self.set_gesture(if camera.is_locked() {
                    Gesture::Idle
                } else {
                    Gesture::Panning
                });
            }
        }

        response
    }

    pub fn pointer_move(
        &mut self,
        screen: &Point,
        scene: &mut Scene,
        camera: &mut Camera,
    ) -> Response {
        let mut response = Response::default();
        let delta = camera.screen_delta_to_world(&(screen - self.last_screen));
        self.last_screen = *screen;

        match self.gesture {
            Gesture::Idle => {}
            Gesture::Selecting(target) => match scene.get_mut(&target) {
                Some(mut object) => {
                    let start = object.position();
                    object.translate(&delta);
                    response.scene_changed = true;
                    self.set_gesture(Gesture::Dragging { target, start });
                }
                None => self.set_gesture(Gesture::Idle),
            },
            Gesture::Dragging { target, .. } => {
                if let Some(mut object) = scene.get_mut(&target) {
                    object.translate(&delta);
                    response.scene_changed = true;
                }
            }
            Gesture::Rotating(target) => {
                let world = camera.screen_to_world(screen);
                if let Some(mut object) = scene.get_mut(&target) {
                    let center = object.position();
                    let angle = (world.y - center.y).atan2(world.x - center.x).to_degrees();
                    object.set_angle(angle);
                    response.scene_changed = true;
                }
            }
            Gesture::Panning => response.camera_changed = camera.pan(&delta),
        }

        response
    }

    /// Ends the current gesture, recording finished moves and rotations in `history`.
    pub fn pointer_up(&mut self, scene: &Scene, history: &mut History) -> Response {
        let mut response = Response::default();
        let gesture = mem::take(&mut self.gesture);
        tracing::trace!("gesture: {gesture:?} -> Idle");

        match gesture {
            Gesture::Dragging { target, start } => {
                let end = scene.get(&target).map_or(start, |object| object.position());
                history.snapshot_move(scene, &start, &end);
                response.committed = Some(Trigger::Move);
            }
            Gesture::Rotating(_) => {
                history.snapshot(scene, Trigger::Rotate);
                response.committed = Some(Trigger::Rotate);
            }
            Gesture::Idle | Gesture::Selecting(_) | Gesture::Panning => {}
        }

        response
    }
}
