//! Application context: driver plus screens.
//!
//! All toolkit state threads through an explicit [`App`]; nothing lives
//! in globals. The app owns the terminal driver and a set of screens,
//! one of which is active at a time. [`App::run`] wraps a traversal
//! session in terminal setup and teardown, restoring the terminal even
//! when the session fails.

use std::time::Duration;

use log::info;

use crate::render::{Driver, DriverError};
use crate::screen::Screen;
use crate::traverse::{LoopState, Traversal};

/// Restores the terminal when dropped while still armed, so a panicking
/// widget does not strand the user in raw mode on the alternate screen.
/// The normal and error paths disarm it and restore through the driver,
/// where failures stay reportable.
struct RestoreGuard {
    armed: bool,
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        if self.armed {
            Driver::force_restore();
        }
    }
}

/// Top-level toolkit context for a terminal application.
pub struct App {
    driver: Driver,
    screens: Vec<Screen>,
    active: usize,
}

impl App {
    /// Open the terminal driver and create one screen sized to the
    /// terminal.
    pub fn new() -> Result<Self, DriverError> {
        let driver = Driver::new()?;
        let (width, height) = Driver::terminal_size()?;
        info!("app start: {width}x{height}, colors={}", driver.has_colors());
        Ok(Self {
            driver,
            screens: vec![Screen::new(width, height)],
            active: 0,
        })
    }

    /// The terminal driver, for palette setup and capability queries.
    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut Driver {
        &mut self.driver
    }

    /// Add another screen sized to the terminal, returning its index.
    pub fn add_screen(&mut self) -> Result<usize, DriverError> {
        let (width, height) = Driver::terminal_size()?;
        self.screens.push(Screen::new(width, height));
        Ok(self.screens.len() - 1)
    }

    /// Number of screens.
    pub fn screen_count(&self) -> usize {
        self.screens.len()
    }

    /// The active screen.
    pub fn screen(&self) -> &Screen {
        &self.screens[self.active]
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screens[self.active]
    }

    /// Switch the active screen. Out-of-range indexes are refused.
    pub fn set_active(&mut self, index: usize) -> bool {
        if index < self.screens.len() {
            self.active = index;
            true
        } else {
            false
        }
    }

    /// Run a traversal session on the active screen.
    ///
    /// Enters the alternate screen and raw mode, runs until the session
    /// exits, then restores the terminal. The terminal is restored even
    /// when the session errors out or panics. With `tick` set, key reads
    /// time out at that interval and the screen re-renders.
    pub fn run(&mut self, tick: Option<Duration>) -> Result<LoopState, DriverError> {
        self.driver.enter()?;
        let mut guard = RestoreGuard { armed: true };
        let mut traversal = Traversal::new();
        let result = traversal.run(&mut self.screens[self.active], &mut self.driver, tick);
        guard.armed = false;
        let restore = self.driver.leave();
        let state = result?;
        restore?;
        info!("session ended: {state:?}");
        Ok(state)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
