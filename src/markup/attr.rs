//! Display attributes: style flags plus an optional color pair.
//!
//! [`Attr`] keeps the six style bits and the color-pair index as separate
//! fields rather than packing them into one integer, so a style bit can
//! never be corrupted into a pair number or vice versa.

use bitflags::bitflags;

bitflags! {
    /// The six text style bits the markup language can toggle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StyleFlags: u8 {
        const BOLD      = 1 << 0;
        const DIM       = 1 << 1;
        const BLINK     = 1 << 2;
        const REVERSE   = 1 << 3;
        const STANDOUT  = 1 << 4;
        const UNDERLINE = 1 << 5;
    }
}

impl StyleFlags {
    /// The marker letter for a single style bit, e.g. `B` for bold.
    ///
    /// Returns `None` for empty or multi-bit values. `K` is blink, keeping
    /// the legacy markup letters.
    pub fn letter(self) -> Option<char> {
        let pairs = [
            (StyleFlags::BOLD, 'B'),
            (StyleFlags::DIM, 'D'),
            (StyleFlags::BLINK, 'K'),
            (StyleFlags::REVERSE, 'R'),
            (StyleFlags::STANDOUT, 'S'),
            (StyleFlags::UNDERLINE, 'U'),
        ];
        pairs
            .into_iter()
            .find(|&(flag, _)| self == flag)
            .map(|(_, letter)| letter)
    }

    /// The style bit named by a marker letter, if any.
    pub fn from_letter(letter: char) -> Option<StyleFlags> {
        match letter {
            'B' => Some(StyleFlags::BOLD),
            'D' => Some(StyleFlags::DIM),
            'K' => Some(StyleFlags::BLINK),
            'R' => Some(StyleFlags::REVERSE),
            'S' => Some(StyleFlags::STANDOUT),
            'U' => Some(StyleFlags::UNDERLINE),
            _ => None,
        }
    }
}

/// The attribute carried by one rendered cell: style bits and an optional
/// color-pair index.
///
/// Pair 0 is the terminal default and is represented as `None`. Pair
/// indexes run 0 to 99, the widest value a two-digit marker can name;
/// the decompiler's round-trip law is stated over that domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Attr {
    pub flags: StyleFlags,
    /// Color-pair index, 1 to 99.
    pub pair: Option<u8>,
}

impl Attr {
    /// No style bits, default colors.
    pub const NORMAL: Attr = Attr { flags: StyleFlags::empty(), pair: None };

    /// An attribute with the given style bits and no color pair.
    pub const fn styled(flags: StyleFlags) -> Self {
        Attr { flags, pair: None }
    }

    /// This attribute with an extra style bit set.
    pub fn with(self, flags: StyleFlags) -> Self {
        Attr { flags: self.flags | flags, pair: self.pair }
    }

    /// This attribute with a style bit cleared.
    pub fn without(self, flags: StyleFlags) -> Self {
        Attr { flags: self.flags - flags, pair: self.pair }
    }

    /// This attribute with the given color pair.
    ///
    /// Indexes above 99 are clamped to 99, the largest pair markup can
    /// write back.
    pub fn with_pair(self, pair: u8) -> Self {
        Attr { flags: self.flags, pair: Some(pair.min(99)) }
    }

    /// Whether this is the plain NORMAL attribute.
    pub fn is_normal(self) -> bool {
        self == Attr::NORMAL
    }
}

// ===========================================================================
// Tests
// ===========================================================================
