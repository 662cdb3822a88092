//! Markup decompiler: minimal marker text between two attributes.
//!
//! The inverse of the compiler's attribute machine. Only attribute
//! transitions and literal text are reconstructible; alignment markers,
//! tabs and glyph references are not, and are out of scope here.

use super::attr::{Attr, StyleFlags};
use super::compile::Cell;

/// Style bits in their fixed scan order with their marker letters.
const SCAN_ORDER: [(StyleFlags, char); 6] = [
    (StyleFlags::BOLD, 'B'),
    (StyleFlags::DIM, 'D'),
    (StyleFlags::BLINK, 'K'),
    (StyleFlags::REVERSE, 'R'),
    (StyleFlags::STANDOUT, 'S'),
    (StyleFlags::UNDERLINE, 'U'),
];

/// Emit the minimal marker sequence transitioning `prev` to `next`.
///
/// One `</X>`/`<!X>` per differing style bit, scanned in the fixed order
/// Bold, Dim, Blink, Reverse, Standout, Underline, then one color-pair
/// marker if the pair differs. Pair markers use the zero-padded two-digit
/// form so they take the color path on any terminal.
///
/// Law: replaying the returned text through the compiler's attribute
/// machine starting at `prev` ends at exactly `next`.
pub fn decompile(prev: Attr, next: Attr) -> String {
    let mut out = String::new();

    for (flag, letter) in SCAN_ORDER {
        let had = prev.flags.contains(flag);
        let has = next.flags.contains(flag);
        if had != has {
            out.push('<');
            out.push(if has { '/' } else { '!' });
            out.push(letter);
            out.push('>');
        }
    }

    if prev.pair != next.pair {
        match next.pair {
            Some(pair) => out.push_str(&format!("</{pair:02}>")),
            None => {
                let pair = prev.pair.unwrap_or(0);
                out.push_str(&format!("<!{pair:02}>"));
            }
        }
    }

    out
}

/// Serialize attributed cells back to markup text.
///
/// Attribute changes between neighboring cells become marker sequences via
/// [`decompile`]; a literal `<` is re-escaped. The first cell's markers
/// are emitted relative to NORMAL.
pub fn line_to_markup(cells: &[Cell]) -> String {
    let mut out = String::new();
    let mut prev = Attr::NORMAL;
    for cell in cells {
        out.push_str(&decompile(prev, cell.attr));
        if cell.ch == '<' {
            out.push('\\');
        }
        out.push(cell.ch);
        prev = cell.attr;
    }
    out
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::compile::{compile, compile_from};
    use pretty_assertions::assert_eq;

    fn bold() -> Attr {
        Attr::styled(StyleFlags::BOLD)
    }

    // ── decompile output ─────────────────────────────────────────────

    #[test]
    fn equal_attrs_emit_nothing() {
        assert_eq!(decompile(Attr::NORMAL, Attr::NORMAL), "");
        assert_eq!(decompile(bold(), bold()), "");
    }

    #[test]
    fn set_and_clear_single_bit() {
        assert_eq!(decompile(Attr::NORMAL, bold()), "</B>");
        assert_eq!(decompile(bold(), Attr::NORMAL), "<!B>");
    }

    #[test]
    fn multiple_bits_in_scan_order() {
        let next = Attr::styled(StyleFlags::UNDERLINE | StyleFlags::BOLD | StyleFlags::DIM);
        assert_eq!(decompile(Attr::NORMAL, next), "</B></D></U>");
    }

    #[test]
    fn mixed_set_and_clear() {
        let prev = Attr::styled(StyleFlags::DIM);
        let next = Attr::styled(StyleFlags::REVERSE);
        assert_eq!(decompile(prev, next), "<!D></R>");
    }

    #[test]
    fn color_pair_after_styles() {
        let next = bold().with_pair(3);
        assert_eq!(decompile(Attr::NORMAL, next), "</B></03>");

        let prev = Attr::NORMAL.with_pair(3);
        assert_eq!(decompile(prev, Attr::NORMAL), "<!03>");
    }

    // ── Round-trip law ───────────────────────────────────────────────

    /// Apply markers to `start` through the compiler and return the
    /// attribute a trailing probe cell ends up with.
    fn replay(markers: &str, start: Attr) -> Attr {
        let line = compile_from(&format!("{markers}x"), start, true);
        line.cells.last().expect("probe cell").attr
    }

    #[test]
    fn round_trip_all_flag_pairs() {
        // Every subset of two style bits against every other, with and
        // without a color pair on each side.
        let samples = [
            Attr::NORMAL,
            bold(),
            Attr::styled(StyleFlags::DIM | StyleFlags::UNDERLINE),
            Attr::styled(StyleFlags::BLINK | StyleFlags::STANDOUT),
            Attr::styled(StyleFlags::REVERSE).with_pair(7),
            Attr::NORMAL.with_pair(12),
            bold().with_pair(60),
        ];
        for a in samples {
            for b in samples {
                assert_eq!(replay(&decompile(a, b), a), b, "a={a:?} b={b:?}");
            }
        }
    }

    #[test]
    fn round_trip_at_the_pair_bound() {
        let top = Attr::NORMAL.with_pair(99);
        assert_eq!(decompile(Attr::NORMAL, top), "</99>");
        assert_eq!(replay(&decompile(Attr::NORMAL, top), Attr::NORMAL), top);

        // Requests above the two-digit range clamp at construction, so the
        // emitted marker stays writable and the round trip still holds.
        let clamped = bold().with_pair(150);
        assert_eq!(clamped.pair, Some(99));
        assert_eq!(replay(&decompile(Attr::NORMAL, clamped), Attr::NORMAL), clamped);
    }

    #[test]
    fn round_trip_exhaustive_flags() {
        for bits_a in 0..64u8 {
            for bits_b in 0..64u8 {
                let a = Attr::styled(StyleFlags::from_bits_truncate(bits_a));
                let b = Attr::styled(StyleFlags::from_bits_truncate(bits_b));
                assert_eq!(replay(&decompile(a, b), a), b);
            }
        }
    }

    // ── line_to_markup ───────────────────────────────────────────────

    #[test]
    fn serialize_plain_line() {
        let line = compile("hello", true);
        assert_eq!(line_to_markup(&line.cells), "hello");
    }

    #[test]
    fn serialize_attributed_line_recompiles_identically() {
        let source = "</B>bold<!B> plain </U></05>under";
        let line = compile(source, true);
        let markup = line_to_markup(&line.cells);
        assert_eq!(compile(&markup, true).cells, line.cells);
    }

    #[test]
    fn serialize_escapes_literal_open() {
        let line = compile(r"a\<b", true);
        assert_eq!(line.text(), "a<b");
        let markup = line_to_markup(&line.cells);
        assert_eq!(markup, r"a\<b");
        assert_eq!(compile(&markup, true).cells, line.cells);
    }
}
