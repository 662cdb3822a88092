//! Screen registry: widget arena, z-order, focus, two-pass refresh.
//!
//! A [`Screen`] owns its widgets in a slotmap arena keyed by
//! generation-checked [`WidgetId`]s, so a stale handle can never reach
//! another widget's slot: every operation on a dead id is a no-op
//! reported as `false`/`None`, never an error. Z-order is a separate
//! ordered list of ids — removing a widget never rewrites anybody's
//! stored index.

use log::{debug, trace};
use slotmap::{new_key_type, SlotMap};

use crate::event::binding::Resolution;
use crate::event::KeyEvent;
use crate::render::Surface;
use crate::traverse::LoopState;
use crate::widget::{InjectOutcome, Widget};

new_key_type! {
    /// Stable, generation-checked handle to a registered widget.
    pub struct WidgetId;
}

/// Per-widget registry state. Visibility and the has-focus flag belong to
/// the registry, not the widget.
struct Slot {
    widget: Box<dyn Widget>,
    visible: bool,
    focused: bool,
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

/// An ordered collection of widgets over one shared surface.
///
/// Invariants: `z_order` is a permutation of the live arena keys; at most
/// one slot has its focused flag set, and it is the slot `focus` points
/// at.
pub struct Screen {
    widgets: SlotMap<WidgetId, Slot>,
    /// Ascending draw order; the last entry draws on top.
    z_order: Vec<WidgetId>,
    focus: Option<WidgetId>,
    surface: Surface,
    state: LoopState,
}

impl Screen {
    /// Create an empty screen with a blank surface.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            widgets: SlotMap::with_key(),
            z_order: Vec::new(),
            focus: None,
            surface: Surface::new(width, height),
            state: LoopState::Running,
        }
    }

    // ── Registration ─────────────────────────────────────────────────

    /// Register a widget, appending it at the top of the z-order.
    pub fn register(&mut self, widget: Box<dyn Widget>) -> WidgetId {
        let kind = widget.kind().to_owned();
        let id = self.widgets.insert(Slot {
            widget,
            visible: true,
            focused: false,
        });
        self.z_order.push(id);
        debug!("register {kind} as {id:?} at z={}", self.z_order.len() - 1);
        id
    }

    /// Unregister a widget.
    ///
    /// Widgets above it shift down one z slot, keeping their relative
    /// order. If the widget held focus, focus advances to the next
    /// focusable widget, or clears when none is left. A stale handle is
    /// a no-op returning false.
    pub fn unregister(&mut self, id: WidgetId) -> bool {
        if !self.widgets.contains_key(id) {
            return false;
        }
        let pos = self
            .z_order
            .iter()
            .position(|&w| w == id)
            .expect("registered widget has a z slot");
        self.z_order.remove(pos);
        let had_focus = self.focus == Some(id);
        self.widgets.remove(id);
        debug!("unregister {id:?} from z={pos}");

        if had_focus {
            self.focus = None;
            if !self.z_order.is_empty() {
                let next = self.scan_focusable(pos % self.z_order.len(), true);
                self.set_focus(next);
            }
        }
        true
    }

    /// Whether the handle refers to a registered widget.
    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(id)
    }

    /// Number of registered widgets.
    pub fn len(&self) -> usize {
        self.z_order.len()
    }

    /// Whether no widgets are registered.
    pub fn is_empty(&self) -> bool {
        self.z_order.is_empty()
    }

    /// Borrow a widget.
    pub fn widget(&self, id: WidgetId) -> Option<&dyn Widget> {
        self.widgets.get(id).map(|slot| slot.widget.as_ref())
    }

    /// Mutably borrow a widget.
    pub fn widget_mut(&mut self, id: WidgetId) -> Option<&mut (dyn Widget + 'static)> {
        self.widgets.get_mut(id).map(|slot| slot.widget.as_mut())
    }

    // ── Z-order ──────────────────────────────────────────────────────

    /// The ascending draw order.
    pub fn z_order(&self) -> &[WidgetId] {
        &self.z_order
    }

    /// A widget's current z position.
    pub fn z_index(&self, id: WidgetId) -> Option<usize> {
        self.z_order.iter().position(|&w| w == id)
    }

    /// The widget occupying a z position.
    pub fn widget_at_z(&self, z: usize) -> Option<WidgetId> {
        self.z_order.get(z).copied()
    }

    /// Swap the widget's z position with the topmost slot.
    pub fn raise(&mut self, id: WidgetId) -> bool {
        self.swap_z(id, |len| len - 1)
    }

    /// Swap the widget's z position with the bottom slot.
    pub fn lower(&mut self, id: WidgetId) -> bool {
        self.swap_z(id, |_| 0)
    }

    fn swap_z(&mut self, id: WidgetId, target: impl Fn(usize) -> usize) -> bool {
        let pos = match self.z_index(id) {
            Some(pos) => pos,
            None => return false,
        };
        let other = target(self.z_order.len());
        self.z_order.swap(pos, other);
        trace!("z swap {id:?}: {pos} <-> {other}");
        true
    }

    // ── Visibility ───────────────────────────────────────────────────

    /// Show or hide a widget. Hidden widgets are erased on the next
    /// refresh and skipped by focus traversal.
    pub fn set_visible(&mut self, id: WidgetId, visible: bool) -> bool {
        match self.widgets.get_mut(id) {
            Some(slot) => {
                slot.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Whether a widget is visible. Stale handles are not.
    pub fn is_visible(&self, id: WidgetId) -> bool {
        self.widgets.get(id).is_some_and(|slot| slot.visible)
    }

    // ── Focus ────────────────────────────────────────────────────────

    /// The widget holding focus, if any.
    pub fn focus(&self) -> Option<WidgetId> {
        self.focus
    }

    /// Whether the traversal engine may focus this widget: registered,
    /// accepts focus, and visible.
    pub fn is_focusable(&self, id: WidgetId) -> bool {
        self.widgets
            .get(id)
            .is_some_and(|slot| slot.visible && slot.widget.accepts_focus())
    }

    /// Move focus, unfocusing the previous holder.
    ///
    /// Focusing a stale or non-focusable widget is refused. Passing the
    /// current holder is an idempotent no-op; `None` always clears.
    pub fn set_focus(&mut self, target: Option<WidgetId>) -> bool {
        if let Some(id) = target {
            if !self.is_focusable(id) {
                return false;
            }
        }
        if self.focus == target {
            return true;
        }

        if let Some(old) = self.focus.take() {
            if let Some(slot) = self.widgets.get_mut(old) {
                slot.focused = false;
                slot.widget.on_unfocus();
            }
        }
        if let Some(new) = target {
            if let Some(slot) = self.widgets.get_mut(new) {
                slot.focused = true;
                slot.widget.on_focus();
                debug!("focus -> {new:?} ({})", slot.widget.kind());
            }
        }
        self.focus = target;
        true
    }

    /// Scan the z-order for a focusable widget.
    ///
    /// Starts at z position `start` inclusive, wrapping in the given
    /// direction, probing each widget at most once.
    pub(crate) fn scan_focusable(&self, start: usize, forward: bool) -> Option<WidgetId> {
        let n = self.z_order.len();
        if n == 0 {
            return None;
        }
        for step in 0..n {
            let z = if forward {
                (start + step) % n
            } else {
                (start + n - step) % n
            };
            let id = self.z_order[z];
            if self.is_focusable(id) {
                return Some(id);
            }
        }
        None
    }

    // ── Key routing ──────────────────────────────────────────────────

    /// Resolve a raw key against a widget's binding table.
    ///
    /// Composite widgets exposing an embedded input widget delegate
    /// resolution to the inner widget's table. `None` for stale handles.
    pub fn resolve_key(&mut self, id: WidgetId, raw: KeyEvent) -> Option<Resolution> {
        let slot = self.widgets.get_mut(id)?;
        let widget = slot.widget.as_mut();
        if let Some(inner) = widget.embedded_input() {
            return Some(inner.bindings().resolve(raw));
        }
        Some(widget.bindings().resolve(raw))
    }

    /// Inject a key into a widget. `None` for stale handles.
    pub fn inject(&mut self, id: WidgetId, key: KeyEvent) -> Option<InjectOutcome> {
        self.widgets
            .get_mut(id)
            .map(|slot| slot.widget.inject(key))
    }

    // ── Fan-outs ─────────────────────────────────────────────────────

    /// Ask every registered widget to persist its state.
    pub fn save_all(&mut self) {
        for &id in &self.z_order {
            if let Some(slot) = self.widgets.get_mut(id) {
                slot.widget.save();
            }
        }
    }

    /// Ask every registered widget to reload/discard edited state.
    pub fn reload_all(&mut self) {
        for &id in &self.z_order {
            if let Some(slot) = self.widgets.get_mut(id) {
                slot.widget.reload();
            }
        }
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Two-pass redraw into the surface.
    ///
    /// Pass 1 erases every hidden widget. Pass 2 draws visible widgets in
    /// ascending z-order, so a higher widget's cells win any overlap.
    /// Exactly the first focused-flagged widget in ascending z draws as
    /// focused; everything else draws unfocused.
    pub fn refresh(&mut self) {
        trace!("refresh: {} widgets", self.z_order.len());
        for i in 0..self.z_order.len() {
            let id = self.z_order[i];
            if let Some(slot) = self.widgets.get_mut(id) {
                if !slot.visible {
                    slot.widget.erase(&mut self.surface);
                }
            }
        }

        let holder = self
            .z_order
            .iter()
            .copied()
            .find(|&id| self.widgets.get(id).is_some_and(|slot| slot.focused));

        for i in 0..self.z_order.len() {
            let id = self.z_order[i];
            if let Some(slot) = self.widgets.get_mut(id) {
                if slot.visible {
                    slot.widget.draw(&mut self.surface, Some(id) == holder);
                }
            }
        }
    }

    // ── Surface / session state ──────────────────────────────────────

    /// The shared surface.
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Resize the surface, blanking it.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.surface.resize(width, height);
    }

    /// The traversal session state.
    pub fn loop_state(&self) -> LoopState {
        self.state
    }

    /// Transition the session to a terminal state. Ignored once the
    /// session has already left [`LoopState::Running`].
    pub fn set_exit(&mut self, state: LoopState) {
        if self.state == LoopState::Running && state != LoopState::Running {
            debug!("loop state -> {state:?}");
            self.state = state;
        }
    }

    /// Start a fresh traversal session.
    pub fn reset_session(&mut self) {
        self.state = LoopState::Running;
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubWidget;

    fn screen() -> Screen {
        Screen::new(20, 5)
    }

    fn row_text(s: &Screen, y: i32) -> String {
        (0..s.surface().width() as i32)
            .map(|x| s.surface().get(x, y).unwrap().ch)
            .collect()
    }

    // ── Registration and z-order ─────────────────────────────────────

    #[test]
    fn register_assigns_dense_z_indexes() {
        let mut s = screen();
        let a = s.register(Box::new(StubWidget::new(0, 0, 2, 1, 'a')));
        let b = s.register(Box::new(StubWidget::new(0, 0, 2, 1, 'b')));
        let c = s.register(Box::new(StubWidget::new(0, 0, 2, 1, 'c')));
        assert_eq!(s.len(), 3);
        assert_eq!(s.z_index(a), Some(0));
        assert_eq!(s.z_index(b), Some(1));
        assert_eq!(s.z_index(c), Some(2));
    }

    #[test]
    fn unregister_preserves_relative_order() {
        let mut s = screen();
        let a = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'a')));
        let b = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'b')));
        let c = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'c')));
        assert!(s.unregister(b));
        assert_eq!(s.z_order(), &[a, c]);
        assert_eq!(s.z_index(c), Some(1));
    }

    #[test]
    fn unregister_stale_handle_is_a_noop() {
        let mut s = screen();
        let a = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'a')));
        assert!(s.unregister(a));
        assert!(!s.unregister(a));
        assert!(!s.contains(a));
        assert_eq!(s.len(), 0);
    }

    #[test]
    fn stale_handle_operations_are_noops() {
        let mut s = screen();
        let a = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'a')));
        s.unregister(a);
        assert!(!s.raise(a));
        assert!(!s.lower(a));
        assert!(!s.set_visible(a, false));
        assert!(!s.is_visible(a));
        assert!(!s.set_focus(Some(a)));
        assert!(s.resolve_key(a, KeyEvent::plain(crate::event::Key::Tab)).is_none());
        assert!(s.inject(a, KeyEvent::plain(crate::event::Key::Tab)).is_none());
    }

    #[test]
    fn widget_mut_mutates_in_place() {
        let mut s = screen();
        let a = s.register(Box::new(StubWidget::new(0, 0, 2, 1, 'a')));
        s.widget_mut(a).unwrap().move_to(3, 1);
        assert_eq!(s.widget(a).unwrap().region().x, 3);
        assert_eq!(s.widget(a).unwrap().region().y, 1);
    }

    #[test]
    fn raise_and_lower_swap_with_extremes() {
        let mut s = screen();
        let a = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'a')));
        let b = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'b')));
        let c = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'c')));

        assert!(s.raise(a));
        assert_eq!(s.z_order(), &[c, b, a]);

        assert!(s.lower(a));
        assert_eq!(s.z_order(), &[a, b, c]);
    }

    // ── Refresh ──────────────────────────────────────────────────────

    #[test]
    fn later_z_wins_overlap() {
        let mut s = screen();
        let a = s.register(Box::new(StubWidget::new(0, 0, 4, 1, 'a')));
        let _b = s.register(Box::new(StubWidget::new(2, 0, 4, 1, 'b')));
        s.refresh();
        assert_eq!(row_text(&s, 0), "aabbbb              ");

        // Raising A puts its cells on top on the overlap.
        s.raise(a);
        s.refresh();
        assert_eq!(row_text(&s, 0), "aaaabb              ");
    }

    #[test]
    fn hidden_widgets_are_erased_not_drawn() {
        let mut s = screen();
        let a = s.register(Box::new(StubWidget::new(0, 0, 3, 1, 'a')));
        s.refresh();
        assert_eq!(row_text(&s, 0), "aaa                 ");

        s.set_visible(a, false);
        s.refresh();
        assert_eq!(row_text(&s, 0), "                    ");
    }

    #[test]
    fn only_focus_holder_draws_focused() {
        let mut s = screen();
        let a = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'a').focusable(true)));
        let b = s.register(Box::new(StubWidget::new(2, 0, 1, 1, 'b').focusable(true)));
        s.set_focus(Some(b));
        s.refresh();

        // StubWidget draws its fill char uppercased when focused.
        assert_eq!(s.surface().get(0, 0).unwrap().ch, 'a');
        assert_eq!(s.surface().get(2, 0).unwrap().ch, 'B');
        let _ = a;
    }

    // ── Focus ────────────────────────────────────────────────────────

    #[test]
    fn focus_refuses_unfocusable_targets() {
        let mut s = screen();
        let plain = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'a')));
        assert!(!s.set_focus(Some(plain)));
        assert_eq!(s.focus(), None);

        let hidden = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'b').focusable(true)));
        s.set_visible(hidden, false);
        assert!(!s.set_focus(Some(hidden)));
    }

    #[test]
    fn at_most_one_widget_has_the_focus_flag() {
        let mut s = screen();
        let a = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'a').focusable(true)));
        let b = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'b').focusable(true)));

        assert!(s.set_focus(Some(a)));
        assert!(s.set_focus(Some(b)));
        assert_eq!(s.focus(), Some(b));

        let flagged: Vec<_> = s
            .z_order()
            .iter()
            .filter(|&&id| s.widgets.get(id).unwrap().focused)
            .collect();
        assert_eq!(flagged.len(), 1);
    }

    #[test]
    fn focus_switch_fires_widget_hooks() {
        let mut s = screen();
        let a = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'a').focusable(true)));
        let b = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'b').focusable(true)));

        s.set_focus(Some(a));
        s.set_focus(Some(b));

        let a_ref = s.widget(a).unwrap().as_any().downcast_ref::<StubWidget>().unwrap();
        assert_eq!((a_ref.focus_gained, a_ref.focus_lost), (1, 1));
        let b_ref = s.widget(b).unwrap().as_any().downcast_ref::<StubWidget>().unwrap();
        assert_eq!((b_ref.focus_gained, b_ref.focus_lost), (1, 0));
    }

    #[test]
    fn unregister_focused_widget_advances_focus() {
        let mut s = screen();
        let a = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'a').focusable(true)));
        let b = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'b').focusable(true)));
        s.set_focus(Some(a));

        s.unregister(a);
        assert_eq!(s.focus(), Some(b));
    }

    #[test]
    fn unregister_last_focusable_clears_focus() {
        let mut s = screen();
        let a = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'a').focusable(true)));
        let _plain = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'p')));
        s.set_focus(Some(a));

        s.unregister(a);
        assert_eq!(s.focus(), None);
    }

    #[test]
    fn unregister_empties_registry_clears_focus() {
        let mut s = screen();
        let a = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'a').focusable(true)));
        s.set_focus(Some(a));
        s.unregister(a);
        assert_eq!(s.focus(), None);
        assert!(s.is_empty());
    }

    // ── Fan-outs ─────────────────────────────────────────────────────

    #[test]
    fn save_and_reload_reach_every_widget() {
        let mut s = screen();
        let a = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'a')));
        let b = s.register(Box::new(StubWidget::new(0, 0, 1, 1, 'b')));

        s.save_all();
        s.reload_all();
        s.reload_all();

        for id in [a, b] {
            let w = s.widget(id).unwrap().as_any().downcast_ref::<StubWidget>().unwrap();
            assert_eq!((w.saved, w.reloaded), (1, 2));
        }
    }

    // ── Session state ────────────────────────────────────────────────

    #[test]
    fn loop_state_is_terminal_once_set() {
        let mut s = screen();
        assert_eq!(s.loop_state(), LoopState::Running);
        s.set_exit(LoopState::ExitOk);
        s.set_exit(LoopState::ExitCancel);
        assert_eq!(s.loop_state(), LoopState::ExitOk);

        s.reset_session();
        assert_eq!(s.loop_state(), LoopState::Running);
    }
}
