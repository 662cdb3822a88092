//! Markup compiler: inline-formatted text to attributed cells.
//!
//! `compile` turns a markup string into a [`CompiledLine`]: the cells to
//! blit, an alignment hint, and the used width in columns. The lexer is
//! logos-based; marker bodies are classified by hand. Anything the
//! grammar does not recognize (an unterminated `<`, an unknown marker
//! body, a stray backslash) is emitted as literal text — compilation
//! never fails.

use logos::{Lexer, Logos};

use super::attr::{Attr, StyleFlags};
use super::glyph::glyph;

// ---------------------------------------------------------------------------
// Cell / Align / CompiledLine
// ---------------------------------------------------------------------------

/// One attributed terminal cell, immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub attr: Attr,
}

impl Cell {
    /// A blank cell at NORMAL.
    pub const BLANK: Cell = Cell { ch: ' ', attr: Attr::NORMAL };

    /// Create a new cell.
    pub const fn new(ch: char, attr: Attr) -> Self {
        Self { ch, attr }
    }

    /// A blank (space) cell carrying the given attribute.
    pub const fn blank(attr: Attr) -> Self {
        Self { ch: ' ', attr }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

/// Horizontal placement of a compiled line within its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
    Center,
}

/// The output of the markup compiler.
///
/// `used_width` counts emitted cells only; marker bytes contribute zero
/// width. Compiled lines are consumed by drawing code and discarded after
/// render.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompiledLine {
    pub cells: Vec<Cell>,
    pub align: Align,
    pub used_width: usize,
}

impl CompiledLine {
    /// The line's characters without attributes, mainly for tests.
    pub fn text(&self) -> String {
        self.cells.iter().map(|c| c.ch).collect()
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

/// Markup tokens.
///
/// Longest match wins, so `\<` beats the lone backslash and a complete
/// `<...>` marker beats the lone `<`. A `<` with no closing `>` before the
/// next `<` can only lex as `OpenBracket` and falls through to literal
/// text, which is exactly the degrade-to-literal rule.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    /// `\<` — escaped marker-open, a literal `<`.
    #[token(r"\<")]
    EscapedOpen,

    /// A complete `<...>` marker. Body is classified by the parser.
    #[regex(r"<[^<>]*>")]
    Marker,

    /// Tab, expanded to blanks up to the next multiple-of-8 column.
    #[token("\t")]
    Tab,

    /// A run of plain characters.
    #[regex(r"[^<\\\t]+")]
    Literal,

    /// An unterminated marker-open; literal text.
    #[token("<")]
    OpenBracket,

    /// A backslash not escaping a marker-open; literal text.
    #[token("\\")]
    Backslash,
}

// ---------------------------------------------------------------------------
// compile
// ---------------------------------------------------------------------------

/// Compile markup text starting from the NORMAL attribute.
///
/// `colors` reports whether the terminal can render color pairs (see
/// `Driver::has_colors`); without it a single-digit color marker degrades
/// to bold.
pub fn compile(text: &str, colors: bool) -> CompiledLine {
    compile_from(text, Attr::NORMAL, colors)
}

/// Compile markup text with an explicit starting attribute.
///
/// This is the attribute-transition machine the decompiler's round-trip
/// law is stated over: replaying `decompile(a, b)` from attribute `a`
/// leaves the machine at `b`.
pub fn compile_from(text: &str, start: Attr, colors: bool) -> CompiledLine {
    let mut cells: Vec<Cell> = Vec::new();
    let mut align = Align::Left;
    let mut attr = start;

    let mut lex = Token::lexer(text);
    while let Some(tok) = lex.next() {
        let slice = lex.slice();
        match tok {
            Ok(Token::EscapedOpen) => cells.push(Cell::new('<', attr)),
            Ok(Token::Tab) => {
                let stop = (cells.len() / 8 + 1) * 8;
                while cells.len() < stop {
                    cells.push(Cell::blank(attr));
                }
            }
            Ok(Token::Literal) | Ok(Token::OpenBracket) | Ok(Token::Backslash) | Err(()) => {
                emit_literal(&mut cells, slice, attr);
            }
            Ok(Token::Marker) => {
                let body = &slice[1..slice.len() - 1];
                marker(body, slice, &mut lex, &mut cells, &mut align, &mut attr, colors);
            }
        }
    }

    let used_width = cells.len();
    CompiledLine { cells, align, used_width }
}

/// Handle one `<...>` marker body; falls back to literal text when the
/// body matches no marker form.
fn marker(
    body: &str,
    slice: &str,
    lex: &mut Lexer<'_, Token>,
    cells: &mut Vec<Cell>,
    align: &mut Align,
    attr: &mut Attr,
    colors: bool,
) {
    // Alignment markers are only consumed before any cell is emitted.
    if cells.is_empty() {
        match body {
            "L" => {
                *align = Align::Left;
                return;
            }
            "R" => {
                *align = Align::Right;
                return;
            }
            "C" => {
                *align = Align::Center;
                return;
            }
            _ => {}
        }
    }

    if let Some(text) = body.strip_prefix("B=") {
        // Bullet item: three blank cells, then the body as bold literals.
        for _ in 0..3 {
            cells.push(Cell::blank(*attr));
        }
        let bold = attr.with(StyleFlags::BOLD);
        emit_literal(cells, text, bold);
    } else if let Some(count) = body.strip_prefix("I=") {
        match parse_decimal(count) {
            Some(n) => {
                for _ in 0..n {
                    cells.push(Cell::blank(*attr));
                }
            }
            None => emit_literal(cells, slice, *attr),
        }
    } else if let Some(code) = body.strip_prefix('#') {
        match glyph(code) {
            Some(ch) => {
                let repeat = take_repeat(lex);
                for _ in 0..repeat {
                    cells.push(Cell::new(ch, *attr));
                }
            }
            None => emit_literal(cells, slice, *attr),
        }
    } else if let Some(name) = body.strip_prefix('/') {
        match toggle(*attr, name, true, colors) {
            Some(next) => *attr = next,
            None => emit_literal(cells, slice, *attr),
        }
    } else if let Some(name) = body.strip_prefix('!') {
        match toggle(*attr, name, false, colors) {
            Some(next) => *attr = next,
            None => emit_literal(cells, slice, *attr),
        }
    } else {
        emit_literal(cells, slice, *attr);
    }
}

/// Apply a `</X>` / `<!X>` toggle body to an attribute.
///
/// `X` is one of the six style letters, or one or two decimal digits
/// naming a color pair. A single digit on a monochrome terminal degrades
/// to bold. Returns `None` for bodies that are no toggle at all.
fn toggle(attr: Attr, name: &str, set: bool, colors: bool) -> Option<Attr> {
    let mut chars = name.chars();
    if let (Some(letter), None) = (chars.next(), chars.next()) {
        if let Some(flag) = StyleFlags::from_letter(letter) {
            return Some(if set { attr.with(flag) } else { attr.without(flag) });
        }
    }

    if name.len() <= 2 {
        if let Some(pair) = parse_decimal(name) {
            if !colors && name.len() == 1 {
                let fallback = StyleFlags::BOLD;
                return Some(if set { attr.with(fallback) } else { attr.without(fallback) });
            }
            return Some(if set {
                attr.with_pair(pair as u8)
            } else {
                Attr { flags: attr.flags, pair: None }
            });
        }
    }

    None
}

/// Consume an optional `(n)` repeat count directly after a glyph marker.
fn take_repeat(lex: &mut Lexer<'_, Token>) -> usize {
    let rest = match lex.remainder().strip_prefix('(') {
        Some(rest) => rest,
        None => return 1,
    };
    let end = match rest.find(')') {
        Some(end) => end,
        None => return 1,
    };
    match parse_decimal(&rest[..end]) {
        Some(n) => {
            lex.bump(end + 2);
            n
        }
        None => 1,
    }
}

/// Parse a non-empty all-digit string.
fn parse_decimal(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn emit_literal(cells: &mut Vec<Cell>, text: &str, attr: Attr) {
    for ch in text.chars() {
        cells.push(Cell::new(ch, attr));
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn attrs(line: &CompiledLine) -> Vec<Attr> {
        line.cells.iter().map(|c| c.attr).collect()
    }

    // ── Plain text ───────────────────────────────────────────────────

    #[test]
    fn plain_text_is_normal_cells() {
        let line = compile("hello", true);
        assert_eq!(line.text(), "hello");
        assert_eq!(line.used_width, 5);
        assert_eq!(line.align, Align::Left);
        assert!(line.cells.iter().all(|c| c.attr.is_normal()));
    }

    #[test]
    fn empty_input() {
        let line = compile("", true);
        assert!(line.cells.is_empty());
        assert_eq!(line.align, Align::Left);
        assert_eq!(line.used_width, 0);
    }

    // ── Alignment ────────────────────────────────────────────────────

    #[test]
    fn leading_alignment_markers() {
        assert_eq!(compile("<C>abc", true).align, Align::Center);
        assert_eq!(compile("<R>abc", true).align, Align::Right);
        assert_eq!(compile("<L>abc", true).align, Align::Left);
    }

    #[test]
    fn center_marker_contributes_zero_width() {
        let line = compile("<C>abc", true);
        assert_eq!(line.text(), "abc");
        assert_eq!(line.used_width, 3);
        assert!(line.cells.iter().all(|c| c.attr.is_normal()));
    }

    #[test]
    fn alignment_after_cells_is_literal() {
        let line = compile("a<C>b", true);
        assert_eq!(line.text(), "a<C>b");
        assert_eq!(line.align, Align::Left);
    }

    // ── Attribute toggles ────────────────────────────────────────────

    #[test]
    fn bold_set_and_clear() {
        let line = compile("</B>bold<!B>plain", true);
        assert_eq!(line.text(), "boldplain");
        let bold = Attr::styled(StyleFlags::BOLD);
        let expected: Vec<Attr> = std::iter::repeat_n(bold, 4)
            .chain(std::iter::repeat_n(Attr::NORMAL, 5))
            .collect();
        assert_eq!(attrs(&line), expected);
    }

    #[test]
    fn every_style_letter_toggles() {
        for (letter, flag) in [
            ('B', StyleFlags::BOLD),
            ('D', StyleFlags::DIM),
            ('K', StyleFlags::BLINK),
            ('R', StyleFlags::REVERSE),
            ('S', StyleFlags::STANDOUT),
            ('U', StyleFlags::UNDERLINE),
        ] {
            let line = compile(&format!("</{letter}>x<!{letter}>y"), true);
            assert_eq!(line.cells[0].attr.flags, flag);
            assert!(line.cells[1].attr.flags.is_empty());
        }
    }

    #[test]
    fn toggles_stack() {
        let line = compile("</B></U>x", true);
        assert_eq!(
            line.cells[0].attr.flags,
            StyleFlags::BOLD | StyleFlags::UNDERLINE
        );
    }

    #[test]
    fn color_pair_markers() {
        let line = compile("</5>x<!5>y", true);
        assert_eq!(line.cells[0].attr.pair, Some(5));
        assert_eq!(line.cells[1].attr.pair, None);

        let line = compile("</17>x", true);
        assert_eq!(line.cells[0].attr.pair, Some(17));
    }

    #[test]
    fn single_digit_color_degrades_to_bold_without_color_support() {
        let line = compile("</5>x", false);
        assert_eq!(line.cells[0].attr.pair, None);
        assert_eq!(line.cells[0].attr.flags, StyleFlags::BOLD);

        let line = compile("</5>x<!5>y", false);
        assert!(line.cells[1].attr.flags.is_empty());
    }

    #[test]
    fn double_digit_color_keeps_pair_without_color_support() {
        // Degrading double-digit pairs is the driver's job at render time.
        let line = compile("</21>x", false);
        assert_eq!(line.cells[0].attr.pair, Some(21));
    }

    // ── Bullet and indent ────────────────────────────────────────────

    #[test]
    fn bullet_marker() {
        let line = compile("<B=item>", true);
        assert_eq!(line.text(), "   item");
        assert_eq!(line.used_width, 7);
        assert!(line.cells[..3].iter().all(|c| c.attr.is_normal()));
        let bold = Attr::styled(StyleFlags::BOLD);
        assert!(line.cells[3..].iter().all(|c| c.attr == bold));
    }

    #[test]
    fn bullet_does_not_leak_bold() {
        let line = compile("<B=a>b", true);
        assert_eq!(line.text(), "   ab");
        assert!(line.cells[4].attr.is_normal());
    }

    #[test]
    fn indent_marker() {
        let line = compile("<I=4>x", true);
        assert_eq!(line.text(), "    x");
        assert_eq!(line.used_width, 5);
    }

    #[test]
    fn indent_with_bad_count_is_literal() {
        assert_eq!(compile("<I=x>", true).text(), "<I=x>");
        assert_eq!(compile("<I=>", true).text(), "<I=>");
    }

    // ── Glyphs ───────────────────────────────────────────────────────

    #[test]
    fn glyph_reference() {
        let line = compile("<#UL>", true);
        assert_eq!(line.text(), "┌");
        assert_eq!(line.used_width, 1);
    }

    #[test]
    fn glyph_repeat_count() {
        let line = compile("<#HL>(5)", true);
        assert_eq!(line.text(), "─────");
        assert_eq!(line.used_width, 5);
    }

    #[test]
    fn glyph_carries_current_attribute() {
        let line = compile("</R><#DI>(2)", true);
        let rev = Attr::styled(StyleFlags::REVERSE);
        assert_eq!(attrs(&line), vec![rev, rev]);
    }

    #[test]
    fn glyph_malformed_repeat_is_text() {
        // Bad count: glyph emitted once, parenthetical kept as literals.
        let line = compile("<#UL>(x)", true);
        assert_eq!(line.text(), "┌(x)");

        // Unclosed count: same.
        let line = compile("<#UL>(3", true);
        assert_eq!(line.text(), "┌(3");
    }

    #[test]
    fn unknown_glyph_is_literal() {
        assert_eq!(compile("<#ZZ>", true).text(), "<#ZZ>");
    }

    // ── Escapes and tabs ─────────────────────────────────────────────

    #[test]
    fn escaped_marker_open() {
        let line = compile(r"\<B>", true);
        assert_eq!(line.text(), "<B>");
        assert!(line.cells.iter().all(|c| c.attr.is_normal()));
    }

    #[test]
    fn lone_backslash_is_literal() {
        assert_eq!(compile(r"a\b", true).text(), r"a\b");
    }

    #[test]
    fn tab_expands_to_next_tab_stop() {
        let line = compile("ab\tc", true);
        assert_eq!(line.text(), "ab      c");
        assert_eq!(line.used_width, 9);
    }

    #[test]
    fn tab_at_stop_advances_a_full_stop() {
        let line = compile("12345678\tx", true);
        assert_eq!(line.used_width, 17);
        assert_eq!(line.cells[16].ch, 'x');
    }

    #[test]
    fn tab_stops_count_used_width_not_bytes() {
        // The markers are zero-width, so the tab pads from column 1.
        let line = compile("</B>x\ty", true);
        assert_eq!(line.text(), "x       y");
    }

    // ── Malformed markers ────────────────────────────────────────────

    #[test]
    fn unterminated_marker_is_literal() {
        assert_eq!(compile("<B", true).text(), "<B");
        assert_eq!(compile("a<", true).text(), "a<");
    }

    #[test]
    fn unrecognized_marker_is_literal() {
        assert_eq!(compile("<X>", true).text(), "<X>");
        assert_eq!(compile("</Q>", true).text(), "</Q>");
        assert_eq!(compile("<!->", true).text(), "<!->");
        assert_eq!(compile("</123>", true).text(), "</123>");
        assert_eq!(compile("<>", true).text(), "<>");
    }

    #[test]
    fn literal_markers_carry_current_attribute() {
        let line = compile("</B><X>", true);
        let bold = Attr::styled(StyleFlags::BOLD);
        assert!(line.cells.iter().all(|c| c.attr == bold));
    }

    #[test]
    fn width_excludes_marker_bytes() {
        let line = compile("</B></U>ab<!B><!U>", true);
        assert_eq!(line.used_width, 2);
    }

    // ── compile_from ─────────────────────────────────────────────────

    #[test]
    fn compile_from_starts_at_given_attribute() {
        let start = Attr::styled(StyleFlags::DIM);
        let line = compile_from("x<!D>y", start, true);
        assert_eq!(line.cells[0].attr, start);
        assert!(line.cells[1].attr.is_normal());
    }
}
