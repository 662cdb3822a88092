//! The shared terminal surface: a cell grid with frame diffing.
//!
//! One [`Surface`] backs each screen. Widgets blit compiled markup lines
//! into it during the refresh pass; the traversal loop then diffs the
//! surface against the previously presented frame and sends only the
//! changed cells to the driver. All writes are clipped to the surface
//! bounds, so out-of-range coordinates are silently ignored.

use crate::geometry::{Region, Size};
use crate::markup::{Align, Cell, CompiledLine};

// ---------------------------------------------------------------------------
// CellUpdate
// ---------------------------------------------------------------------------

/// A single cell that changed between frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellUpdate {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// A width x height grid of attributed cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    /// `cells[y][x]` is the cell at column x, row y.
    cells: Vec<Vec<Cell>>,
    width: u16,
    height: u16,
}

impl Surface {
    /// Create a blank surface of the given dimensions.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            cells: blank_grid(width, height),
            width,
            height,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// The surface dimensions as a [`Size`].
    pub fn size(&self) -> Size {
        Size::new(self.width as i32, self.height as i32)
    }

    /// Resize, blanking every cell.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells = blank_grid(width, height);
    }

    /// Write one cell. Out-of-bounds coordinates are ignored.
    pub fn put(&mut self, x: i32, y: i32, cell: Cell) {
        if self.size().contains(x, y) {
            self.cells[y as usize][x as usize] = cell;
        }
    }

    /// Read the cell at (x, y), `None` out of bounds.
    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        if self.size().contains(x, y) {
            Some(&self.cells[y as usize][x as usize])
        } else {
            None
        }
    }

    /// Blank the whole surface.
    pub fn clear(&mut self) {
        self.cells = blank_grid(self.width, self.height);
    }

    /// Blank every cell inside `region` (clipped to the surface).
    pub fn clear_region(&mut self, region: Region) {
        let clip = region.intersection(self.size().to_region());
        for y in clip.y..clip.bottom() {
            for x in clip.x..clip.right() {
                self.cells[y as usize][x as usize] = Cell::BLANK;
            }
        }
    }

    /// Blit a compiled line into the row at `y`.
    ///
    /// The line is placed inside the field `[x, x + field_width)` according
    /// to its alignment; a line wider than the field is left-anchored at
    /// `x`. Cells falling outside the surface are clipped.
    pub fn blit(&mut self, line: &CompiledLine, x: i32, y: i32, field_width: i32) {
        let slack = field_width - line.used_width as i32;
        let start = match line.align {
            Align::Left => x,
            Align::Center => x + slack.max(0) / 2,
            Align::Right => x + slack.max(0),
        };
        for (i, cell) in line.cells.iter().enumerate() {
            self.put(start + i as i32, y, *cell);
        }
    }

    /// Compare against a previously presented frame and return only the
    /// cells that differ, in row-major order.
    ///
    /// Both surfaces must have equal dimensions; after a resize the caller
    /// resizes (and thus blanks) both sides, which marks everything
    /// changed against a cleared terminal.
    pub fn diff(&self, previous: &Surface) -> Vec<CellUpdate> {
        let mut updates = Vec::new();
        let h = self.height.min(previous.height) as usize;
        let w = self.width.min(previous.width) as usize;
        for y in 0..h {
            for x in 0..w {
                if self.cells[y][x] != previous.cells[y][x] {
                    updates.push(CellUpdate {
                        x: x as u16,
                        y: y as u16,
                        cell: self.cells[y][x],
                    });
                }
            }
        }
        updates
    }

    /// Every non-blank cell as an update, for presenting a first frame.
    pub fn full_frame(&self) -> Vec<CellUpdate> {
        let mut updates = Vec::new();
        for (y, row) in self.cells.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if *cell != Cell::BLANK {
                    updates.push(CellUpdate {
                        x: x as u16,
                        y: y as u16,
                        cell: *cell,
                    });
                }
            }
        }
        updates
    }
}

fn blank_grid(width: u16, height: u16) -> Vec<Vec<Cell>> {
    vec![vec![Cell::BLANK; width as usize]; height as usize]
}

// ===========================================================================
// Tests
// ===========================================================================
