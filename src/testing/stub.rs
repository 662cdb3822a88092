//! Instrumented widget for exercising the registry and traversal engine.

use std::any::Any;

use crate::event::binding::BindingTable;
use crate::event::KeyEvent;
use crate::geometry::Region;
use crate::markup::{Attr, Cell};
use crate::render::Surface;
use crate::widget::{ExitType, InjectOutcome, Widget};

/// A widget that fills its region with one character and records every
/// hook the toolkit calls on it.
///
/// Draws its fill character uppercased while focused, so a rendered
/// surface shows who holds focus. Counters and the injected-key log are
/// public for assertions.
pub struct StubWidget {
    region: Region,
    fill: char,
    focusable: bool,
    menu: bool,
    embedded: Option<Box<StubWidget>>,
    bindings: BindingTable,
    pub focus_gained: u32,
    pub focus_lost: u32,
    pub saved: u32,
    pub reloaded: u32,
    pub injected: Vec<KeyEvent>,
    pub exit: ExitType,
}

impl StubWidget {
    pub fn new(x: i32, y: i32, width: i32, height: i32, fill: char) -> Self {
        Self {
            region: Region::new(x, y, width, height),
            fill,
            focusable: false,
            menu: false,
            embedded: None,
            bindings: BindingTable::new(),
            focus_gained: 0,
            focus_lost: 0,
            saved: 0,
            reloaded: 0,
            injected: Vec::new(),
            exit: ExitType::Error,
        }
    }

    /// Whether the stub accepts focus.
    pub fn focusable(mut self, yes: bool) -> Self {
        self.focusable = yes;
        self
    }

    /// Mark the stub as a menu (modal on escape).
    pub fn menu(mut self, yes: bool) -> Self {
        self.menu = yes;
        self
    }

    /// Attach an inner stub that key resolution delegates to, modelling
    /// a composite widget with an embedded entry field.
    pub fn embed(mut self, inner: StubWidget) -> Self {
        self.embedded = Some(Box::new(inner));
        self
    }

    /// The embedded inner stub, if any.
    pub fn inner(&self) -> Option<&StubWidget> {
        self.embedded.as_deref()
    }
}

impl Widget for StubWidget {
    fn kind(&self) -> &str {
        "Stub"
    }

    fn region(&self) -> Region {
        self.region
    }

    fn move_to(&mut self, x: i32, y: i32) {
        self.region.x = x;
        self.region.y = y;
    }

    fn draw(&mut self, surface: &mut Surface, focused: bool) {
        let ch = if focused {
            self.fill.to_ascii_uppercase()
        } else {
            self.fill
        };
        for y in self.region.y..self.region.bottom() {
            for x in self.region.x..self.region.right() {
                surface.put(x, y, Cell::new(ch, Attr::NORMAL));
            }
        }
    }

    fn accepts_focus(&self) -> bool {
        self.focusable
    }

    fn on_focus(&mut self) {
        self.focus_gained += 1;
    }

    fn on_unfocus(&mut self) {
        self.focus_lost += 1;
    }

    fn inject(&mut self, key: KeyEvent) -> InjectOutcome {
        self.injected.push(key);
        InjectOutcome::Consumed
    }

    fn exit_type(&self) -> ExitType {
        self.exit
    }

    fn save(&mut self) {
        self.saved += 1;
    }

    fn reload(&mut self) {
        self.reloaded += 1;
    }

    fn bindings(&mut self) -> &mut BindingTable {
        &mut self.bindings
    }

    fn embedded_input(&mut self) -> Option<&mut dyn Widget> {
        self.embedded
            .as_deref_mut()
            .map(|inner| inner as &mut dyn Widget)
    }

    fn is_menu(&self) -> bool {
        self.menu
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
