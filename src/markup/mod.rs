//! Inline markup pipeline: attributes, glyphs, compiler, decompiler.
//!
//! The markup language is the stable contract between application text and
//! the renderer. `</X>` sets a style or color pair, `<!X>` clears it,
//! `<C>`/`<R>`/`<L>` pick alignment, `<#XY>` references a glyph, `<I=n>`
//! indents and `<B=...>` emits a bold bullet item. Anything malformed
//! degrades to literal text; compilation never fails.

pub mod attr;
pub mod compile;
pub mod decompile;
pub mod glyph;

pub use attr::{Attr, StyleFlags};
pub use compile::{compile, compile_from, Align, Cell, CompiledLine};
pub use decompile::{decompile, line_to_markup};
pub use glyph::glyph;
