//! Input events and per-widget key bindings.

pub mod binding;
pub mod input;

pub use binding::{BindingAction, BindingTable, Resolution};
pub use input::{Key, KeyEvent, Modifiers};
