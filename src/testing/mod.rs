//! Headless test harness.
//!
//! [`Pilot`] drives a screen and traversal engine without a terminal;
//! [`StubWidget`] is an instrumented widget recording every hook call.
//! Both are part of the public API so downstream crates can test their
//! own widgets the same way.

pub mod pilot;
pub mod stub;

pub use pilot::Pilot;
pub use stub::StubWidget;

use crate::render::Surface;

/// Render a surface as text, one row per line with trailing blanks
/// trimmed. Attributes are not shown.
pub fn surface_text(surface: &Surface) -> String {
    let mut out = String::new();
    for y in 0..surface.height() as i32 {
        let row: String = (0..surface.width() as i32)
            .map(|x| surface.get(x, y).map_or(' ', |cell| cell.ch))
            .collect();
        out.push_str(row.trim_end());
        out.push('\n');
    }
    out
}
