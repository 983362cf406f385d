use super::*;

use controller::Response;
use rand::{rngs::StdRng, SeedableRng};

/// Changes that user interface elements around the canvas may want to reflect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Notification {
    /// Something got selected or unselected
    SelectionChanged { has_selection: bool, is_light: bool },
    /// Either stack of the history changed
    HistoryChanged { can_undo: bool, can_redo: bool },
    /// The camera moved or zoomed, carries the new scale
    ZoomChanged(Float),
}

/// An editable scene, along with its view, history, and pointer handling.
///
/// This is the entry point for frontends: they forward pointer and pinch
/// events and commands here, draw [`Self::trace_all`] and the scene through
/// [`Self::camera`], and poll [`Self::drain_notifications`] after each event.
#[derive(Debug)]
pub struct Canvas {
    scene: Scene,
    history: History,
    camera: Camera,
    controller: Controller,
    trace_params: TraceParams,
    rng: StdRng,
    notifications: Vec<Notification>,
}

impl Canvas {
    /// An empty canvas of the given viewport size.
    #[must_use]
    pub fn new(width: Float, height: Float) -> Self {
        Self::from_scene(Scene::new(Bounds::new(width, height)))
    }

    /// A canvas editing `scene`, whose bounds become the viewport size.
    #[must_use]
    pub fn from_scene(scene: Scene) -> Self {
        Self::with_rng(scene, StdRng::from_entropy())
    }

    /// Like [`Self::from_scene`], placing new objects with `rng`.
    #[must_use]
    pub fn with_rng(mut scene: Scene, rng: StdRng) -> Self {
        scene.clear_selection();
        let history = History::new(&scene);

        Self {
            scene,
            history,
            camera: Camera::default(),
            controller: Controller::default(),
            trace_params: TraceParams::default(),
            rng,
            notifications: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    #[must_use]
    pub const fn camera(&self) -> &Camera {
        &self.camera
    }

    #[inline]
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    #[inline]
    #[must_use]
    pub const fn gesture(&self) -> &Gesture {
        self.controller.gesture()
    }

    #[inline]
    #[must_use]
    pub const fn trace_params(&self) -> TraceParams {
        self.trace_params
    }

    pub fn set_trace_params(&mut self, params: TraceParams) {
        self.trace_params = params;
    }

    /// Hands out every notification emitted since the last call, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    fn notify_selection(&mut self) {
        let selected = self.scene.selected();
        self.notifications.push(Notification::SelectionChanged {
            has_selection: selected.is_some(),
            is_light: selected.is_some_and(|h| h.kind == ObjectKind::Light),
        });
    }

    fn notify_history(&mut self) {
        self.notifications.push(Notification::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }

    fn notify_zoom(&mut self) {
        self.notifications
            .push(Notification::ZoomChanged(self.camera.scale()));
    }

    fn respond(&mut self, response: Response) {
        if response.selection_changed {
            self.notify_selection();
        }
        if response.committed.is_some() {
            self.notify_history();
        }
        if response.camera_changed {
            self.notify_zoom();
        }
    }

    /// The new viewport size, which is also the area light is clipped to.
    pub fn resize(&mut self, width: Float, height: Float) {
        self.scene.resize(Bounds::new(width, height));
    }

    /// Replaces the whole scene, keeping the current viewport size. History starts over.
    pub fn load_scene(&mut self, mut scene: Scene) {
        let had_selection = self.scene.selected().is_some();

        scene.resize(self.scene.bounds());
        scene.clear_selection();
        self.scene = scene;
        self.controller.reset();
        self.history.clear(&self.scene);

        if had_selection {
            self.notify_selection();
        }
        self.notify_history();
    }

    fn placement_hint(&self) -> Point {
        self.camera.screen_to_world(&self.scene.bounds().center())
    }

    fn commit(&mut self, trigger: Trigger) {
        self.history.snapshot(&self.scene, trigger);
        self.notify_history();
    }

    /// Adds a light near the middle of the view.
    pub fn add_light(&mut self) -> ObjectId {
        let near = self.placement_hint();
        let id = self.scene.add_light(&near, &mut self.rng);
        self.commit(Trigger::Add);
        id
    }

    pub fn add_mirror(&mut self) -> ObjectId {
        let near = self.placement_hint();
        let id = self.scene.add_mirror(&near, &mut self.rng);
        self.commit(Trigger::Add);
        id
    }

    pub fn add_flag(&mut self) -> ObjectId {
        let near = self.placement_hint();
        let id = self.scene.add_flag(&near, &mut self.rng);
        self.commit(Trigger::Add);
        id
    }

    /// Returns whether something was deleted.
    pub fn delete_selected(&mut self) -> bool {
        if self.scene.delete_selected().is_none() {
            return false;
        }
        self.controller.reset();
        self.notify_selection();
        self.commit(Trigger::Delete);
        true
    }

    /// Recolors the selected light. Returns `false` if no light is selected.
    pub fn change_color(&mut self, color: Color) -> bool {
        if !self.scene.change_color(color) {
            return false;
        }
        self.commit(Trigger::ColorChange);
        true
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn after_restore(&mut self, had_selection: bool) {
        self.controller.reset();
        if had_selection {
            self.notify_selection();
        }
        self.notify_history();
    }

    /// Returns `false`, doing nothing, if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let had_selection = self.scene.selected().is_some();
        let undone = self.history.undo(&mut self.scene);
        if undone {
            self.after_restore(had_selection);
        }
        undone
    }

    /// Returns `false`, doing nothing, if there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let had_selection = self.scene.selected().is_some();
        let redone = self.history.redo(&mut self.scene);
        if redone {
            self.after_restore(had_selection);
        }
        redone
    }

    pub fn reset_view(&mut self) {
        self.camera.reset();
        self.notify_zoom();
    }

    /// Returns whether the view is now locked.
    pub fn toggle_view_lock(&mut self) -> bool {
        self.camera.toggle_lock()
    }

    pub fn pointer_down(&mut self, screen: &Point) {
        let response = self
            .controller
            .pointer_down(screen, &mut self.scene, &self.camera);
        self.respond(response);
    }

    pub fn pointer_move(&mut self, screen: &Point) {
        let response = self
            .controller
            .pointer_move(screen, &mut self.scene, &mut self.camera);
        self.respond(response);
    }

    pub fn pointer_up(&mut self) {
        let response = self.controller.pointer_up(&self.scene, &mut self.history);
        self.respond(response);
    }

    /// Zooms by `ratio` around `focal`, in screen coordinates.
    pub fn pinch(&mut self, ratio: Float, focal: &Point) {
        if self.camera.pinch(ratio, focal) {
            self.notify_zoom();
        }
    }

    /// The light paths of every light, in the scene's order.
    #[must_use]
    pub fn trace_all(&self) -> Vec<TraceResult> {
        trace_scene(&self.scene, self.trace_params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Canvas {
        Canvas::with_rng(Scene::new(Bounds::new(800.0, 600.0)), StdRng::seed_from_u64(3))
    }

    #[test]
    fn commands_snapshot_and_notify() {
        let mut c = canvas();
        c.add_light();
        assert!(c.can_undo());
        assert_eq!(
            c.drain_notifications(),
            [Notification::HistoryChanged {
                can_undo: true,
                can_redo: false
            }]
        );
        assert!(c.drain_notifications().is_empty());
    }

    #[test]
    fn no_op_commands_are_silent() {
        let mut c = canvas();
        c.add_mirror();
        c.drain_notifications();

        assert!(!c.delete_selected());
        assert!(!c.change_color(Color::GREEN));
        assert!(!c.redo());
        assert!(c.drain_notifications().is_empty());
        assert_eq!(c.history().undo_len(), 2);
    }

    #[test]
    fn color_applies_to_selected_light_only() {
        let mut c = canvas();
        c.add_light();
        let center = c.scene().lights()[0].position;
        c.pointer_down(&center);
        c.pointer_up();

        assert!(c.change_color(Color::BLUE));
        assert_eq!(c.scene().lights()[0].color, Color::BLUE);
        assert_eq!(c.history().undo_len(), 3);
    }

    #[test]
    fn delete_clears_selection_and_can_be_undone() {
        let mut c = canvas();
        let id = c.add_flag();
        let position = c.scene().flags()[0].position;
        c.pointer_down(&position);
        c.pointer_up();
        c.drain_notifications();

        assert!(c.delete_selected());
        assert!(c.scene().is_empty());
        assert_eq!(
            c.drain_notifications()[0],
            Notification::SelectionChanged {
                has_selection: false,
                is_light: false
            }
        );

        assert!(c.undo());
        assert_eq!(c.scene().flags()[0].id, id);
        assert!(c.can_redo());
    }

    #[test]
    fn pinch_and_reset_report_zoom() {
        let mut c = canvas();
        c.pinch(2.0, &Point::new(100.0, 100.0));
        c.reset_view();
        assert_eq!(
            c.drain_notifications(),
            [Notification::ZoomChanged(2.0), Notification::ZoomChanged(1.0)]
        );
    }

    #[test]
    fn objects_are_added_in_the_middle_of_the_view() {
        let mut c = canvas();
        c.pinch(2.0, &Point::origin());
        c.add_light();
        let p = c.scene().lights()[0].position;
        assert!((p.x - 200.0).abs() < 1e-9 && (p.y - 150.0).abs() < 1e-9);
    }

    #[test]
    fn loading_a_scene_restarts_history() {
        let mut c = canvas();
        c.add_light();
        let mut other = Scene::new(Bounds::new(10.0, 10.0));
        other.push_mirror(Mirror::new([5.0, 5.0]));
        c.load_scene(other);

        assert!(!c.can_undo());
        assert_eq!(c.scene().mirrors().len(), 1);
        assert_eq!(c.scene().bounds(), Bounds::new(800.0, 600.0));
    }
}
