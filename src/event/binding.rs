//! Per-widget key binding table and raw-key normalization.
//!
//! Every widget owns a [`BindingTable`] mapping keys to a
//! [`BindingAction`]: either a fixed substitute key (passthrough) or a
//! callback. An explicit binding always wins; only when none exists does
//! a fixed default table normalize raw control bytes to logical keys.
//! Keys covered by neither path resolve to themselves unchanged.

use std::collections::HashMap;

use super::input::{Key, KeyEvent, Modifiers};
use crate::widget::InjectOutcome;

// ---------------------------------------------------------------------------
// BindingAction
// ---------------------------------------------------------------------------

/// Callback invoked when its bound key arrives. Client data from the
/// legacy (callback, data) pair lives in the closure's captures.
pub type BindingCallback = Box<dyn FnMut(KeyEvent) -> InjectOutcome>;

/// What a bound key does.
pub enum BindingAction {
    /// Resolve to a fixed substitute key without invoking anything.
    Passthrough(KeyEvent),
    /// Invoke a callback; its outcome becomes the resolution result.
    Callback(BindingCallback),
}

impl std::fmt::Debug for BindingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passthrough(key) => write!(f, "Passthrough({key:?})"),
            Self::Callback(_) => write!(f, "Callback(<fn>)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Result of resolving one raw key against a widget's bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Deliver this (possibly normalized or substituted) key.
    Key(KeyEvent),
    /// A bound callback consumed the key; this is its outcome.
    Handled(InjectOutcome),
}

// ---------------------------------------------------------------------------
// BindingTable
// ---------------------------------------------------------------------------

/// Key bindings owned by a single widget.
#[derive(Debug, Default)]
pub struct BindingTable {
    bindings: HashMap<KeyEvent, BindingAction>,
}

impl BindingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key. An existing binding for the key is replaced.
    pub fn bind(&mut self, key: KeyEvent, action: BindingAction) {
        self.bindings.insert(key, action);
    }

    /// Bind a key to a callback.
    pub fn bind_callback<F>(&mut self, key: KeyEvent, callback: F)
    where
        F: FnMut(KeyEvent) -> InjectOutcome + 'static,
    {
        self.bind(key, BindingAction::Callback(Box::new(callback)));
    }

    /// Bind a key to resolve as a fixed substitute key.
    pub fn bind_passthrough(&mut self, key: KeyEvent, substitute: KeyEvent) {
        self.bind(key, BindingAction::Passthrough(substitute));
    }

    /// Remove a binding, returning it if present.
    pub fn unbind(&mut self, key: KeyEvent) -> Option<BindingAction> {
        self.bindings.remove(&key)
    }

    /// Whether the key has an explicit binding.
    pub fn is_bound(&self, key: KeyEvent) -> bool {
        self.bindings.contains_key(&key)
    }

    /// Number of explicit bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the table has no explicit bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Resolve a raw key.
    ///
    /// Order: explicit binding (passthrough substitutes, callback runs),
    /// then the fixed default normalization, then the key itself.
    pub fn resolve(&mut self, raw: KeyEvent) -> Resolution {
        match self.bindings.get_mut(&raw) {
            Some(BindingAction::Passthrough(substitute)) => Resolution::Key(*substitute),
            Some(BindingAction::Callback(callback)) => Resolution::Handled(callback(raw)),
            None => Resolution::Key(normalize_default(raw).unwrap_or(raw)),
        }
    }
}

// ---------------------------------------------------------------------------
// Default normalization
// ---------------------------------------------------------------------------

/// The fixed default table: raw terminal byte codes to logical keys.
///
/// Covers carriage return/newline, tab, DEL, backspace and the four
/// `^B`/`^F`/`^P`/`^N` cursor-movement chords. Everything else is `None`.
fn normalize_default(raw: KeyEvent) -> Option<KeyEvent> {
    if raw.modifiers == Modifiers::NONE {
        let code = match raw.code {
            Key::Char('\r') | Key::Char('\n') => Key::Enter,
            Key::Char('\t') => Key::Tab,
            Key::Char('\u{7f}') => Key::Delete,
            Key::Char('\u{8}') => Key::Backspace,
            _ => return None,
        };
        return Some(KeyEvent::plain(code));
    }

    if raw.modifiers == Modifiers::CTRL {
        let code = match raw.code {
            Key::Char('b') => Key::Left,
            Key::Char('f') => Key::Right,
            Key::Char('p') => Key::Up,
            Key::Char('n') => Key::Down,
            _ => return None,
        };
        return Some(KeyEvent::plain(code));
    }

    None
}

// ===========================================================================
// Tests
// ===========================================================================
