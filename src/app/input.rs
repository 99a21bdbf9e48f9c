use crate::color::Color;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Colors on the number row, `1` through `9`.
pub const PALETTE: [u32; 9] = [
    0xff0000, 0x00ff00, 0x0000ff, 0xffff00, 0x00ffff, 0xff00ff, 0xffffff, 0xcccccc, 0x202020,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    None,
    SelectColor(Color),
    OpenScene,
    ReloadScene,
    Quit,
}

/// Keyboard stand-in for a color picker widget.
#[derive(Default, Debug, Clone, Copy)]
pub struct InputState {
    palette_index: Option<usize>,
}

impl InputState {
    pub fn palette_index(&self) -> Option<usize> {
        self.palette_index
    }

    pub fn handle_key(&mut self, key: PhysicalKey, pressed: bool) -> InputAction {
        if !pressed {
            return InputAction::None;
        }
        let PhysicalKey::Code(code) = key else {
            return InputAction::None;
        };
        match code {
            KeyCode::Escape => InputAction::Quit,
            KeyCode::KeyO => InputAction::OpenScene,
            KeyCode::KeyR => InputAction::ReloadScene,
            _ => match palette_slot(code) {
                Some(index) => {
                    self.palette_index = Some(index);
                    InputAction::SelectColor(Color::from_u32(PALETTE[index]))
                }
                None => InputAction::None,
            },
        }
    }
}

fn palette_slot(code: KeyCode) -> Option<usize> {
    let index = match code {
        KeyCode::Digit1 | KeyCode::Numpad1 => 0,
        KeyCode::Digit2 | KeyCode::Numpad2 => 1,
        KeyCode::Digit3 | KeyCode::Numpad3 => 2,
        KeyCode::Digit4 | KeyCode::Numpad4 => 3,
        KeyCode::Digit5 | KeyCode::Numpad5 => 4,
        KeyCode::Digit6 | KeyCode::Numpad6 => 5,
        KeyCode::Digit7 | KeyCode::Numpad7 => 6,
        KeyCode::Digit8 | KeyCode::Numpad8 => 7,
        KeyCode::Digit9 | KeyCode::Numpad9 => 8,
        _ => return None,
    };
    Some(index)
}
