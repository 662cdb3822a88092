//! Drive a screen interactively without a terminal.

use crate::event::{Key, KeyEvent};
use crate::screen::{Screen, WidgetId};
use crate::traverse::{LoopState, Traversal};
use crate::widget::Widget;

use super::surface_text;

/// Headless session: a screen plus a traversal engine, fed keys directly.
///
/// `start` mirrors what the interactive loop does on entry (reset the
/// session, focus the first focusable widget, render a frame); each
/// `press_*` call then behaves like one key arriving from the terminal.
pub struct Pilot {
    screen: Screen,
    traversal: Traversal,
}

impl Pilot {
    /// Create a pilot over a blank screen of the given size.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            screen: Screen::new(width, height),
            traversal: Traversal::new(),
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    pub fn traversal(&self) -> &Traversal {
        &self.traversal
    }

    /// Register a widget on the screen.
    pub fn register(&mut self, widget: Box<dyn Widget>) -> WidgetId {
        self.screen.register(widget)
    }

    /// Begin a session: fresh loop state, focus the first focusable
    /// widget, render the first frame.
    pub fn start(&mut self) {
        self.screen.reset_session();
        self.traversal.focus_first(&mut self.screen);
        self.screen.refresh();
    }

    /// Feed one key event through the session.
    pub fn press(&mut self, key: KeyEvent) -> LoopState {
        self.traversal.handle_key(&mut self.screen, key)
    }

    /// Feed an unmodified key.
    pub fn press_key(&mut self, code: Key) -> LoopState {
        self.press(KeyEvent::plain(code))
    }

    /// Feed a Ctrl chord.
    pub fn press_ctrl(&mut self, ch: char) -> LoopState {
        self.press(KeyEvent::ctrl(ch))
    }

    /// Feed each character of `text` as a plain key press.
    pub fn type_text(&mut self, text: &str) -> LoopState {
        let mut state = self.screen.loop_state();
        for ch in text.chars() {
            state = self.press_key(Key::Char(ch));
        }
        state
    }

    /// The current frame as text.
    pub fn render(&mut self) -> String {
        self.screen.refresh();
        surface_text(self.screen.surface())
    }
}
