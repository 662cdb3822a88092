//! The Widget contract.
//!
//! [`Widget`] is the capability set every widget implements and the only
//! interface the screen registry and traversal engine consume. It is
//! object-safe: widgets are stored as `Box<dyn Widget>` in the registry
//! arena. Concrete widgets draw themselves into the shared [`Surface`];
//! they never touch the terminal directly.

use std::any::Any;

use crate::event::binding::BindingTable;
use crate::event::KeyEvent;
use crate::geometry::Region;
use crate::render::Surface;

// ---------------------------------------------------------------------------
// ExitType / InjectOutcome
// ---------------------------------------------------------------------------

/// How a widget's last activation ended.
///
/// Starts as `Error` and stays there until an activation completes, so an
/// exit type read before any activation reports failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitType {
    /// Completed normally (commit).
    Normal,
    /// The user hit escape.
    EscapeHit,
    /// A binding or callback ended the activation early.
    EarlyExit,
    /// Never activated, or the activation failed.
    #[default]
    Error,
}

/// A widget's verdict on one injected key.
///
/// The meaning of `Value` is defined per widget; the traversal loop never
/// interprets it and no outcome changes the loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectOutcome {
    /// The widget consumed the key.
    Consumed,
    /// The widget consumed the key and produced a value.
    Value(i32),
    /// The key meant nothing to the widget.
    Unused,
}

// ---------------------------------------------------------------------------
// Widget trait
// ---------------------------------------------------------------------------

/// The abstract capability set consumed by the compositor and the
/// traversal engine.
///
/// Defaults make the minimal widget cheap: a static, unfocusable drawing
/// only needs `kind`, `region`, `move_to`, `draw`, `bindings` and the
/// `as_any` pair.
pub trait Widget {
    /// Widget type name, for diagnostics and logging.
    fn kind(&self) -> &str;

    /// The cells this widget occupies on the surface.
    fn region(&self) -> Region;

    /// Move the widget's top-left corner. The registry erases and redraws
    /// on the next refresh; the widget only updates its own notion of
    /// where it lives.
    fn move_to(&mut self, x: i32, y: i32);

    /// Draw into the surface. `focused` is true only for the single
    /// widget holding focus during this refresh pass.
    fn draw(&mut self, surface: &mut Surface, focused: bool);

    /// Blank this widget's footprint on the surface.
    fn erase(&self, surface: &mut Surface) {
        surface.clear_region(self.region());
    }

    /// Whether the traversal engine may give this widget focus.
    fn accepts_focus(&self) -> bool {
        false
    }

    /// Focus was handed to this widget.
    fn on_focus(&mut self) {}

    /// Focus was taken from this widget.
    fn on_unfocus(&mut self) {}

    /// Handle one key routed to this widget.
    fn inject(&mut self, key: KeyEvent) -> InjectOutcome;

    /// How the last activation ended.
    fn exit_type(&self) -> ExitType {
        ExitType::Error
    }

    /// Commit fan-out: persist edited state. Called on every registered
    /// widget when a traversal session exits OK.
    fn save(&mut self) {}

    /// Reset fan-out: reload/discard edited state.
    fn reload(&mut self) {}

    /// This widget's key binding table.
    fn bindings(&mut self) -> &mut BindingTable;

    /// The inner input widget key bindings should be delegated to, for
    /// composite widgets embedding an entry field. Leaf widgets return
    /// `None`.
    fn embedded_input(&mut self) -> Option<&mut dyn Widget> {
        None
    }

    /// Whether this widget takes exclusive key ownership in a modal
    /// sub-loop when escape is pressed on it (menus).
    fn is_menu(&self) -> bool {
        false
    }

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// ===========================================================================
// Tests
// ===========================================================================
