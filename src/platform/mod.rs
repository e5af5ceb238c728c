#[cfg(windows)]
pub mod win32;

use glam::Vec2;

use crate::motion::PointerSource;

/// Global cursor position from the OS, y-up.
pub struct SystemPointer;

impl PointerSource for SystemPointer {
    #[cfg(windows)]
    fn read_position(&mut self) -> Option<Vec2> {
        win32::get_mouse_pos()
    }

    #[cfg(not(windows))]
    fn read_position(&mut self) -> Option<Vec2> {
        // No global cursor query here; the sprite just rests.
        None
    }
}
