use glam::Vec2;

/// Discrete heading of recent cursor movement.
///
/// `Idle` means "no classification" and is never animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Idle,
}

impl Direction {
    pub fn is_idle(self) -> bool {
        self == Direction::Idle
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
            Direction::Idle => "Idle",
        }
    }
}

/// Classify a movement delta along its dominant axis.
///
/// Vertical wins when `|dy|` beats both the threshold and `|dx|`; the
/// horizontal branch is only consulted otherwise. `dy > 0` is up.
pub fn classify(delta: Vec2, threshold: f32) -> Direction {
    let (ax, ay) = (delta.x.abs(), delta.y.abs());

    if ay > threshold && ay > ax {
        if delta.y > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    } else if ax > threshold {
        if delta.x > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else {
        Direction::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: f32 = 10.0;

    #[test]
    fn small_moves_are_idle() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..2000 {
            let dx = (rng.f32() * 2.0 - 1.0) * THRESHOLD;
            let dy = (rng.f32() * 2.0 - 1.0) * THRESHOLD;
            assert_eq!(classify(Vec2::new(dx, dy), THRESHOLD), Direction::Idle);
        }
        assert_eq!(classify(Vec2::new(10.0, -10.0), THRESHOLD), Direction::Idle);
        assert_eq!(classify(Vec2::ZERO, THRESHOLD), Direction::Idle);
    }

    #[test]
    fn dominant_vertical_is_up_or_down() {
        let mut rng = fastrand::Rng::with_seed(11);
        for _ in 0..2000 {
            let dy = THRESHOLD + 0.01 + rng.f32() * 500.0;
            // strictly below |dy| so vertical dominates
            let dx = (rng.f32() * 2.0 - 1.0) * dy * 0.999;
            assert_eq!(classify(Vec2::new(dx, dy), THRESHOLD), Direction::Up);
            assert_eq!(classify(Vec2::new(dx, -dy), THRESHOLD), Direction::Down);
        }
    }

    #[test]
    fn dominant_horizontal_is_left_or_right() {
        let mut rng = fastrand::Rng::with_seed(23);
        for _ in 0..2000 {
            let dx = THRESHOLD + 0.01 + rng.f32() * 500.0;
            let dy = (rng.f32() * 2.0 - 1.0) * dx;
            assert_eq!(classify(Vec2::new(dx, dy), THRESHOLD), Direction::Right);
            assert_eq!(classify(Vec2::new(-dx, dy), THRESHOLD), Direction::Left);
        }
    }

    #[test]
    fn exact_diagonal_goes_horizontal() {
        // |dy| == |dx|: vertical branch needs a strict win
        assert_eq!(classify(Vec2::new(20.0, 20.0), THRESHOLD), Direction::Right);
        assert_eq!(classify(Vec2::new(-20.0, -20.0), THRESHOLD), Direction::Left);
    }

    #[test]
    fn vertical_wins_even_when_both_exceed_threshold() {
        assert_eq!(classify(Vec2::new(30.0, 31.0), THRESHOLD), Direction::Up);
        assert_eq!(classify(Vec2::new(-30.0, -31.0), THRESHOLD), Direction::Down);
    }

    #[test]
    fn vertical_below_threshold_falls_through_to_horizontal() {
        // dy dominates but is under threshold, dx alone is also under
        assert_eq!(classify(Vec2::new(3.0, 9.0), THRESHOLD), Direction::Idle);
        // dx over threshold wins when dy cannot
        assert_eq!(classify(Vec2::new(12.0, 5.0), THRESHOLD), Direction::Right);
    }

    #[test]
    fn only_idle_is_idle() {
        assert!(Direction::Idle.is_idle());
        for d in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            assert!(!d.is_idle());
        }
    }
}
