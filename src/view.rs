use glam::UVec2;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::error::OsError;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use crate::sink::{DisplaySink, FrameChanged};
use crate::sprite::{FrameRect, SpriteSheet};

const WINDOW_TITLE: &str = "Sprite Follower";

/// Optional large window mirroring the tray sprite.
///
/// Opening and closing are idempotent. While closed it still tracks the
/// latest frame so a freshly opened window starts on the right pose.
/// The pose is reported in the title; the sheet rect and scaled sprite
/// size for each frame are only traced, nothing is blitted.
pub struct EnlargedView {
    window: Option<Window>,
    frames: Vec<FrameRect>,
    sprite: UVec2,
    window_edge: u32,
    current: Option<FrameChanged>,
}

impl EnlargedView {
    pub fn new(sheet: SpriteSheet, sprite_edge: u32, window_edge: u32) -> Self {
        Self {
            window: None,
            frames: sheet.frames(),
            sprite: sheet.scale_to(sprite_edge),
            window_edge,
            current: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.window.is_some()
    }

    pub fn window_id(&self) -> Option<WindowId> {
        self.window.as_ref().map(Window::id)
    }

    pub fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<(), OsError> {
        if self.window.is_some() {
            return Ok(());
        }

        let mut attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_resizable(true)
            .with_inner_size(PhysicalSize::new(self.window_edge, self.window_edge));

        // Center on the primary monitor when we know where it is.
        if let Some(monitor) = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
        {
            let screen = monitor.size();
            let origin = monitor.position();
            let x = origin.x + (screen.width as i32 - self.window_edge as i32) / 2;
            let y = origin.y + (screen.height as i32 - self.window_edge as i32) / 2;
            attrs = attrs.with_position(PhysicalPosition::new(x, y));
        }

        let window = event_loop.create_window(attrs)?;
        window.focus_window();
        self.window = Some(window);
        log::info!("Enlarged view opened");

        if let Some(frame) = self.current {
            self.show(&frame);
        }
        Ok(())
    }

    pub fn close(&mut self) {
        if self.window.take().is_some() {
            log::info!("Enlarged view closed");
        }
    }

    pub fn toggle(&mut self, event_loop: &ActiveEventLoop) -> Result<(), OsError> {
        if self.is_open() {
            self.close();
            Ok(())
        } else {
            self.open(event_loop)
        }
    }

    fn show(&self, frame: &FrameChanged) {
        let Some(window) = &self.window else {
            return;
        };
        window.set_title(&format!("{WINDOW_TITLE} - {}", frame.pose_label()));
        if let Some(src) = self.frames.get(frame.index) {
            log::trace!("enlarged view <- sheet {:?} at {:?}", src, self.sprite);
        }
    }
}

impl DisplaySink for EnlargedView {
    fn frame_changed(&mut self, event: &FrameChanged) {
        self.current = Some(*event);
        self.show(event);
    }
}
