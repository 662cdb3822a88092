//! Focus traversal: Tab cycling, session keys, and the menu sub-loop.
//!
//! [`Traversal`] drives one interactive session over a [`Screen`]. It
//! holds no borrow of the screen — every method takes `&mut Screen` — so
//! headless tests can hand it keys one at a time and inspect the screen
//! between them. The session ends when the screen's [`LoopState`] leaves
//! `Running`: F10 commits (save fan-out, exit OK), Ctrl-X cancels.

use std::time::Duration;

use log::debug;

use crate::event::binding::Resolution;
use crate::event::{Key, KeyEvent, Modifiers};
use crate::render::{Driver, DriverError, Surface};
use crate::screen::{Screen, WidgetId};

// ---------------------------------------------------------------------------
// LoopState
// ---------------------------------------------------------------------------

/// State of a traversal session. Terminal once it leaves `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// The session is accepting keys.
    #[default]
    Running,
    /// The user committed (F10). The save fan-out has run.
    ExitOk,
    /// The user cancelled (Ctrl-X).
    ExitCancel,
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// The traversal engine for one screen.
///
/// Carries only the modal-menu sub-state; focus itself lives on the
/// screen.
#[derive(Debug, Default)]
pub struct Traversal {
    /// The menu widget currently owning all keys, if a modal sub-loop is
    /// active.
    modal: Option<WidgetId>,
    /// Who held focus before the menu took over.
    modal_return: Option<WidgetId>,
}

impl Traversal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a menu currently owns all keys.
    pub fn in_modal(&self) -> bool {
        self.modal.is_some()
    }

    // ── Focus movement ───────────────────────────────────────────────

    /// Focus the first focusable widget in z-order.
    pub fn focus_first(&mut self, screen: &mut Screen) -> Option<WidgetId> {
        let found = screen.scan_focusable(0, true);
        if found.is_some() {
            screen.set_focus(found);
        }
        found
    }

    /// Advance focus to the next focusable widget, wrapping past the top
    /// of the z-order.
    ///
    /// Skips widgets that refuse focus or are hidden, probing each widget
    /// at most once. When nothing else is focusable, focus is unchanged.
    pub fn next(&mut self, screen: &mut Screen) -> Option<WidgetId> {
        self.advance(screen, true)
    }

    /// Move focus to the previous focusable widget, wrapping past the
    /// bottom of the z-order.
    pub fn previous(&mut self, screen: &mut Screen) -> Option<WidgetId> {
        self.advance(screen, false)
    }

    fn advance(&mut self, screen: &mut Screen, forward: bool) -> Option<WidgetId> {
        let n = screen.len();
        if n == 0 {
            return None;
        }
        let current = screen.focus();
        let start = match current.and_then(|id| screen.z_index(id)) {
            Some(pos) if forward => (pos + 1) % n,
            Some(pos) => (pos + n - 1) % n,
            None if forward => 0,
            None => n - 1,
        };
        match screen.scan_focusable(start, forward) {
            Some(found) => {
                screen.set_focus(Some(found));
                Some(found)
            }
            None => current,
        }
    }

    // ── Key dispatch ─────────────────────────────────────────────────

    /// Feed one raw key through the session: binding resolution, then
    /// traversal dispatch or widget injection.
    ///
    /// Returns the loop state after the key. Keys arriving after the
    /// session has exited are ignored.
    pub fn handle_key(&mut self, screen: &mut Screen, raw: KeyEvent) -> LoopState {
        if screen.loop_state() != LoopState::Running {
            return screen.loop_state();
        }

        if let Some(menu) = self.modal {
            self.handle_modal_key(screen, menu, raw);
            screen.refresh();
            return screen.loop_state();
        }

        let key = match self.resolve(screen, raw) {
            Some(key) => key,
            None => {
                // A callback binding consumed the key.
                screen.refresh();
                return screen.loop_state();
            }
        };

        match (key.code, key.modifiers) {
            (Key::Tab, m) if m.is_empty() => {
                self.next(screen);
            }
            (Key::BackTab, _) | (Key::Tab, Modifiers::SHIFT) => {
                self.previous(screen);
            }
            (Key::F(10), m) if m.is_empty() => {
                debug!("commit: save fan-out, exit ok");
                screen.save_all();
                screen.set_exit(LoopState::ExitOk);
            }
            (Key::Char('x'), Modifiers::CTRL) => {
                debug!("cancel: exit");
                screen.set_exit(LoopState::ExitCancel);
            }
            (Key::Char('r'), Modifiers::CTRL) => {
                debug!("reset: reload fan-out");
                screen.reload_all();
                self.refocus(screen);
            }
            (Key::Char('l'), Modifiers::CTRL) => {
                screen.refresh();
                self.refocus(screen);
            }
            (Key::Escape, m)
                if m.is_empty()
                    && screen
                        .focus()
                        .is_some_and(|id| screen.widget(id).is_some_and(|w| w.is_menu())) =>
            {
                // The focused menu takes exclusive key ownership.
                let menu = screen.focus().expect("guard checked focus");
                debug!("menu {menu:?} enters modal sub-loop");
                self.modal = Some(menu);
                self.modal_return = Some(menu);
            }
            _ => {
                if let Some(focused) = screen.focus() {
                    screen.inject(focused, key);
                }
            }
        }

        screen.refresh();
        screen.loop_state()
    }

    /// All keys go to the menu until it signals Tab or escape.
    fn handle_modal_key(&mut self, screen: &mut Screen, menu: WidgetId, raw: KeyEvent) {
        if !screen.contains(menu) {
            self.modal = None;
            self.modal_return = None;
            return;
        }
        let key = match self.resolve_for(screen, menu, raw) {
            Some(key) => key,
            None => return,
        };
        match key.code {
            Key::Tab | Key::Escape if key.modifiers.is_empty() => {
                debug!("menu {menu:?} leaves modal sub-loop");
                self.modal = None;
                let prior = self.modal_return.take();
                self.next(screen);
                if screen.focus() == Some(menu) || screen.focus().is_none() {
                    screen.set_focus(prior);
                }
            }
            _ => {
                screen.inject(menu, key);
            }
        }
    }

    /// Resolve a raw key against the focused widget's binding table.
    /// `None` means a callback binding handled it.
    fn resolve(&mut self, screen: &mut Screen, raw: KeyEvent) -> Option<KeyEvent> {
        match screen.focus() {
            Some(focused) => self.resolve_for(screen, focused, raw),
            None => Some(raw),
        }
    }

    fn resolve_for(&mut self, screen: &mut Screen, id: WidgetId, raw: KeyEvent) -> Option<KeyEvent> {
        match screen.resolve_key(id, raw) {
            Some(Resolution::Key(key)) => Some(key),
            Some(Resolution::Handled(_)) => None,
            None => Some(raw),
        }
    }

    /// Re-deliver focus to the current holder after a whole-screen reset.
    fn refocus(&mut self, screen: &mut Screen) {
        if let Some(focused) = screen.focus() {
            if let Some(widget) = screen.widget_mut(focused) {
                widget.on_focus();
            }
        }
    }

    // ── Interactive loop ─────────────────────────────────────────────

    /// Run the session against a live terminal until it exits.
    ///
    /// Presents frames by diffing the screen surface against the last
    /// presented frame. With `tick` set, the read times out and the
    /// screen re-renders, letting widgets animate; without it the read
    /// blocks.
    pub fn run(
        &mut self,
        screen: &mut Screen,
        driver: &mut Driver,
        tick: Option<Duration>,
    ) -> Result<LoopState, DriverError> {
        screen.reset_session();
        if screen.focus().is_none() {
            self.focus_first(screen);
        }

        // The terminal was cleared on enter, so the first diff is against
        // a blank frame.
        let mut presented = Surface::new(screen.surface().width(), screen.surface().height());
        screen.refresh();
        self.present(screen, driver, &mut presented)?;

        while screen.loop_state() == LoopState::Running {
            match driver.read_key(tick)? {
                Some(raw) => {
                    self.handle_key(screen, raw);
                }
                None => {
                    screen.refresh();
                }
            }
            self.present(screen, driver, &mut presented)?;
        }
        Ok(screen.loop_state())
    }

    fn present(
        &mut self,
        screen: &Screen,
        driver: &mut Driver,
        presented: &mut Surface,
    ) -> Result<(), DriverError> {
        let updates = screen.surface().diff(presented);
        driver.apply_updates(&updates)?;

        // Park the cursor on the focused widget's origin.
        match screen.focus().and_then(|id| screen.widget(id)) {
            Some(widget) => {
                let region = widget.region();
                driver.move_to(region.x.max(0) as u16, region.y.max(0) as u16)?;
                driver.show_cursor()?;
            }
            None => driver.hide_cursor()?,
        }
        driver.flush()?;
        *presented = screen.surface().clone();
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
