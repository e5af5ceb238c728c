use crate::motion::Direction;

/// Frames per walk cycle (one sprite-sheet row).
pub const FRAMES_PER_DIRECTION: usize = 4;
/// Total frames in the sheet: 4 directions x 4 frames.
pub const FRAME_COUNT: usize = FRAMES_PER_DIRECTION * 4;

/// First frame of `direction`'s block.
///
/// Layout: Down 0-3, Left 4-7, Right 8-11, Up 12-15.
pub fn block_start(direction: Direction) -> usize {
    match direction {
        Direction::Down => 0,
        Direction::Left => 4,
        Direction::Right => 8,
        Direction::Up => 12,
        Direction::Idle => {
            debug_assert!(false, "idle has no frame block");
            0
        }
    }
}

/// Direction whose block contains `index`.
pub fn block_of(index: usize) -> Direction {
    match checked(index) / FRAMES_PER_DIRECTION {
        0 => Direction::Down,
        1 => Direction::Left,
        2 => Direction::Right,
        _ => Direction::Up,
    }
}

/// Next frame within the block starting at `start`, wrapping back to
/// `start` after the fourth frame.
pub fn next_in_block(current: usize, start: usize) -> usize {
    debug_assert!(
        (start..start + FRAMES_PER_DIRECTION).contains(&current),
        "frame {current} outside block at {start}"
    );
    let offset = current.wrapping_sub(start) % FRAMES_PER_DIRECTION;
    checked(start + (offset + 1) % FRAMES_PER_DIRECTION)
}

/// Trip in debug builds, clamp into the sheet in release builds.
pub fn checked(index: usize) -> usize {
    debug_assert!(index < FRAME_COUNT, "frame index {index} out of range");
    index.min(FRAME_COUNT - 1)
}
