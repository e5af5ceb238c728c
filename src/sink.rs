use std::cell::RefCell;
use std::rc::Rc;

use crate::anim::frames::FRAMES_PER_DIRECTION;
use crate::motion::Direction;

/// Emitted whenever the displayed frame changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameChanged {
    /// Index into the 16-frame sheet.
    pub index: usize,
    /// Direction whose block `index` belongs to.
    pub direction: Direction,
    pub animating: bool,
}

impl FrameChanged {
    /// Short human-readable pose, e.g. `"Right 2/4"` or `"Down (resting)"`.
    pub fn pose_label(&self) -> String {
        if self.animating {
            format!(
                "{} {}/{}",
                self.direction.label(),
                self.index % FRAMES_PER_DIRECTION + 1,
                FRAMES_PER_DIRECTION
            )
        } else {
            format!("{} (resting)", self.direction.label())
        }
    }
}

/// Anything that shows the current frame: tray icon, enlarged view, logs.
pub trait DisplaySink {
    fn frame_changed(&mut self, event: &FrameChanged);
}

/// Lets the app keep a handle to a sink it also drives directly.
impl<T: DisplaySink> DisplaySink for Rc<RefCell<T>> {
    fn frame_changed(&mut self, event: &FrameChanged) {
        self.borrow_mut().frame_changed(event);
    }
}

/// Traces every frame change.
pub struct LogSink;

impl DisplaySink for LogSink {
    fn frame_changed(&mut self, event: &FrameChanged) {
        log::trace!("frame {:>2} ({})", event.index, event.pose_label());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_labels() {
        let walking = FrameChanged {
            index: 9,
            direction: Direction::Right,
            animating: true,
        };
        assert_eq!(walking.pose_label(), "Right 2/4");

        let resting = FrameChanged {
            index: 12,
            direction: Direction::Up,
            animating: false,
        };
        assert_eq!(resting.pose_label(), "Up (resting)");
    }

    struct Last(Option<usize>);

    impl DisplaySink for Last {
        fn frame_changed(&mut self, event: &FrameChanged) {
            self.0 = Some(event.index);
        }
    }

    #[test]
    fn shared_sink_forwards() {
        let shared = Rc::new(RefCell::new(Last(None)));
        let mut boxed: Box<dyn DisplaySink> = Box::new(shared.clone());
        boxed.frame_changed(&FrameChanged {
            index: 4,
            direction: Direction::Left,
            animating: true,
        });
        assert_eq!(shared.borrow().0, Some(4));
    }
}
