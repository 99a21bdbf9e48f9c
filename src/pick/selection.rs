use crate::color::Color;
use std::cell::Cell;
use std::rc::Rc;

/// The color the next successful click applies.
///
/// Clones share one value: every holder reads whatever was written last, at
/// the moment it reads. Single-threaded by construction (`!Send`).
#[derive(Debug, Clone)]
pub struct SelectionState {
    current: Rc<Cell<Color>>,
}

impl SelectionState {
    pub fn new(initial: Color) -> Self {
        Self {
            current: Rc::new(Cell::new(initial)),
        }
    }

    pub fn get(&self) -> Color {
        self.current.get()
    }

    pub fn set(&self, color: Color) {
        self.current.set(color);
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new(Color::RED)
    }
}
