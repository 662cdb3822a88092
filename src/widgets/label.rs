//! Static multi-line label.

use std::any::Any;

use crate::event::binding::BindingTable;
use crate::event::KeyEvent;
use crate::geometry::Region;
use crate::markup::{compile, CompiledLine};
use crate::render::Surface;
use crate::widget::{InjectOutcome, Widget};

/// A block of attributed text compiled from markup.
///
/// The region is sized to the widest compiled line by the line count;
/// per-line alignment applies inside that field. Labels never take
/// focus and consume no keys.
pub struct Label {
    lines: Vec<CompiledLine>,
    region: Region,
    bindings: BindingTable,
}

impl Label {
    /// Compile `lines` of markup and place the label at (x, y).
    pub fn new(x: i32, y: i32, lines: &[&str]) -> Self {
        let compiled: Vec<CompiledLine> = lines.iter().map(|line| compile(line, true)).collect();
        let region = Self::fit(x, y, &compiled);
        Self {
            lines: compiled,
            region,
            bindings: BindingTable::new(),
        }
    }

    /// Replace the text. The region keeps its origin and refits to the
    /// new content; the caller refreshes the screen to erase leftovers.
    pub fn set_lines(&mut self, lines: &[&str]) {
        self.lines = lines.iter().map(|line| compile(line, true)).collect();
        self.region = Self::fit(self.region.x, self.region.y, &self.lines);
    }

    /// The compiled content.
    pub fn lines(&self) -> &[CompiledLine] {
        &self.lines
    }

    fn fit(x: i32, y: i32, compiled: &[CompiledLine]) -> Region {
        let width = compiled
            .iter()
            .map(|line| line.used_width as i32)
            .max()
            .unwrap_or(0);
        Region::new(x, y, width, compiled.len() as i32)
    }
}

impl Widget for Label {
    fn kind(&self) -> &str {
        "Label"
    }

    fn region(&self) -> Region {
        self.region
    }

    fn move_to(&mut self, x: i32, y: i32) {
        self.region.x = x;
        self.region.y = y;
    }

    fn draw(&mut self, surface: &mut Surface, _focused: bool) {
        for (i, line) in self.lines.iter().enumerate() {
            surface.blit(line, self.region.x, self.region.y + i as i32, self.region.width);
        }
    }

    fn inject(&mut self, _key: KeyEvent) -> InjectOutcome {
        InjectOutcome::Unused
    }

    fn bindings(&mut self) -> &mut BindingTable {
        &mut self.bindings
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{Attr, StyleFlags};

    fn row_text(surface: &Surface, y: i32) -> String {
        (0..surface.width() as i32)
            .map(|x| surface.get(x, y).unwrap().ch)
            .collect()
    }

    #[test]
    fn region_fits_widest_line() {
        let label = Label::new(2, 1, &["short", "a longer line", "mid"]);
        assert_eq!(label.region(), Region::new(2, 1, 13, 3));
    }

    #[test]
    fn draws_lines_with_alignment_inside_the_field() {
        let mut label = Label::new(0, 0, &["abcdef", "<C>mid", "<R>end"]);
        let mut surface = Surface::new(10, 3);
        label.draw(&mut surface, false);
        assert_eq!(row_text(&surface, 0), "abcdef    ");
        assert_eq!(row_text(&surface, 1), " mid      ");
        assert_eq!(row_text(&surface, 2), "   end    ");
    }

    #[test]
    fn markup_attributes_reach_the_surface() {
        let mut label = Label::new(0, 0, &["</B>hi<!B>"]);
        let mut surface = Surface::new(5, 1);
        label.draw(&mut surface, false);
        assert_eq!(surface.get(0, 0).unwrap().attr, Attr::styled(StyleFlags::BOLD));
    }

    #[test]
    fn set_lines_refits_the_region() {
        let mut label = Label::new(3, 2, &["ab"]);
        label.set_lines(&["longer", "pair"]);
        assert_eq!(label.region(), Region::new(3, 2, 6, 2));
    }

    #[test]
    fn label_is_not_focusable() {
        let mut label = Label::new(0, 0, &["x"]);
        assert!(!label.accepts_focus());
        assert_eq!(
            label.inject(KeyEvent::plain(crate::event::Key::Enter)),
            InjectOutcome::Unused
        );
    }

    #[test]
    fn empty_label_has_empty_region() {
        let label = Label::new(0, 0, &[]);
        assert_eq!(label.region(), Region::new(0, 0, 0, 0));
    }
}
