//! Glyph table: two-letter codes for line-drawing and special characters.
//!
//! Markup references glyphs as `<#XY>`, family letter then variant letter.
//! The table is a fixed pure lookup; unknown codes return `None` and the
//! compiler falls back to literal text.

/// Look up a glyph by its two-letter code.
///
/// Codes:
///
/// | code | glyph | code | glyph |
/// |------|-------|------|-------|
/// | `UL` | ┌     | `TT` | ┬     |
/// | `UR` | ┐     | `BT` | ┴     |
/// | `LL` | └     | `LT` | ├     |
/// | `LR` | ┘     | `RT` | ┤     |
/// | `HL` | ─     | `PL` | ┼     |
/// | `VL` | │     | `DI` | ◆     |
/// | `UA` | ↑     | `CB` | ▒     |
/// | `DA` | ↓     | `DG` | °     |
/// | `LA` | ←     | `PM` | ±     |
/// | `RA` | →     | `BU` | •     |
pub fn glyph(code: &str) -> Option<char> {
    let ch = match code {
        "UL" => '┌',
        "UR" => '┐',
        "LL" => '└',
        "LR" => '┘',
        "HL" => '─',
        "VL" => '│',
        "TT" => '┬',
        "BT" => '┴',
        "LT" => '├',
        "RT" => '┤',
        "PL" => '┼',
        "UA" => '↑',
        "DA" => '↓',
        "LA" => '←',
        "RA" => '→',
        "DI" => '◆',
        "CB" => '▒',
        "DG" => '°',
        "PM" => '±',
        "BU" => '•',
        _ => return None,
    };
    Some(ch)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_and_lines() {
        assert_eq!(glyph("UL"), Some('┌'));
        assert_eq!(glyph("UR"), Some('┐'));
        assert_eq!(glyph("LL"), Some('└'));
        assert_eq!(glyph("LR"), Some('┘'));
        assert_eq!(glyph("HL"), Some('─'));
        assert_eq!(glyph("VL"), Some('│'));
    }

    #[test]
    fn tees_and_crossing() {
        assert_eq!(glyph("TT"), Some('┬'));
        assert_eq!(glyph("BT"), Some('┴'));
        assert_eq!(glyph("LT"), Some('├'));
        assert_eq!(glyph("RT"), Some('┤'));
        assert_eq!(glyph("PL"), Some('┼'));
    }

    #[test]
    fn arrows_and_specials() {
        assert_eq!(glyph("UA"), Some('↑'));
        assert_eq!(glyph("DA"), Some('↓'));
        assert_eq!(glyph("LA"), Some('←'));
        assert_eq!(glyph("RA"), Some('→'));
        assert_eq!(glyph("DI"), Some('◆'));
        assert_eq!(glyph("CB"), Some('▒'));
        assert_eq!(glyph("DG"), Some('°'));
        assert_eq!(glyph("PM"), Some('±'));
        assert_eq!(glyph("BU"), Some('•'));
    }

    #[test]
    fn unknown_codes() {
        assert_eq!(glyph("XX"), None);
        assert_eq!(glyph(""), None);
        assert_eq!(glyph("ULX"), None);
        assert_eq!(glyph("ul"), None); // case-sensitive
    }
}
