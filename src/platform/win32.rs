use glam::Vec2;
use windows::Win32::Foundation::POINT;
use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

/// Current global cursor position, flipped so that y grows upward.
///
/// `None` if the call fails (secure desktop, session switch).
pub fn get_mouse_pos() -> Option<Vec2> {
    let mut point = POINT::default();
    unsafe { GetCursorPos(&mut point) }.ok()?;
    // Screen y grows downward; moving toward the top should read as "up".
    Some(Vec2::new(point.x as f32, -(point.y as f32)))
}
