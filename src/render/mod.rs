//! Rendering: the shared cell surface and the crossterm terminal driver.

pub mod driver;
pub mod surface;

pub use driver::{Driver, DriverError, Palette};
pub use surface::{CellUpdate, Surface};
