use std::collections::HashSet;
use winit::event::{ ElementState, KeyEvent };
use winit::keyboard::{ KeyCode, PhysicalKey };

/// Tracks which physical keys are currently held down.
#[derive(Debug, Default)]
pub struct KeyboardInputSystem {
    pressed_keys: HashSet<KeyCode>,
}

impl KeyboardInputSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn receive_key_event(&mut self, key_event: &KeyEvent) {
        if let PhysicalKey::Code(key_code) = key_event.physical_key {
            self.receive_key(key_code, key_event.state);
        }
    }

    pub fn receive_key(&mut self, key_code: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.pressed_keys.insert(key_code) {
                    log::trace!("key pressed: {:?}", key_code);
                }
            }
            ElementState::Released => {
                if self.pressed_keys.remove(&key_code) {
                    log::trace!("key released: {:?}", key_code);
                }
            }
        }
    }

    pub fn is_down(&self, key_code: KeyCode) -> bool {
        self.pressed_keys.contains(&key_code)
    }

    /// Forgets every held key, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.pressed_keys.clear();
    }
}
