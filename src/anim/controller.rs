use std::time::Duration;

use super::frames::{block_of, block_start, checked, next_in_block};
use crate::motion::Direction;
use crate::sink::FrameChanged;
use crate::timer::{Fired, Scheduler, TimerEvent, TimerId};

/// Where the controller is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Showing the static facing pose for this direction.
    Resting(Direction),
    /// Walking in this direction until the episode times out.
    Animating(Direction),
}

/// Mutable animation state. Only the controller writes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationState {
    pub current_direction: Direction,
    /// Most recent animated direction; the resting pose faces this way.
    pub last_direction: Direction,
    pub is_animating: bool,
    pub current_frame: usize,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            current_direction: Direction::Down,
            last_direction: Direction::Down,
            is_animating: false,
            current_frame: 0,
        }
    }
}

/// Direction-driven walk cycle with a fixed-length episode.
///
/// A new direction starts an episode: frame resets to that direction's
/// block, a frame ticker starts, and a one-shot stop is armed. The same
/// direction arriving mid-episode is ignored, so an episode always lasts
/// exactly `episode` from its start no matter how long the cursor keeps
/// moving.
pub struct AnimationController {
    state: AnimationState,
    frame_period: Duration,
    episode: Duration,
    ticker: Option<TimerId>,
    stop_timeout: Option<TimerId>,
}

impl AnimationController {
    pub fn new(frame_period: Duration, episode: Duration) -> Self {
        debug_assert!(!frame_period.is_zero() && !episode.is_zero());
        Self {
            state: AnimationState::default(),
            frame_period,
            episode,
            ticker: None,
            stop_timeout: None,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        if self.state.is_animating {
            Phase::Animating(self.state.current_direction)
        } else {
            Phase::Resting(self.state.last_direction)
        }
    }

    /// Snap to the resting pose for `last_direction` and report it.
    pub fn resting_frame(&mut self) -> FrameChanged {
        debug_assert!(!self.state.is_animating);
        self.state.current_frame = block_start(self.state.last_direction);
        self.emit()
    }

    /// React to a movement direction from the sampler.
    ///
    /// Returns the reset frame when an episode starts, `None` when the
    /// signal is ignored.
    pub fn on_direction_signal(
        &mut self,
        direction: Direction,
        timers: &mut impl Scheduler,
    ) -> Option<FrameChanged> {
        if direction.is_idle() {
            debug_assert!(false, "idle direction signalled to controller");
            return None;
        }
        if self.phase() == Phase::Animating(direction) {
            return None;
        }

        self.cancel_timers(timers);

        self.state.current_direction = direction;
        self.state.is_animating = true;
        self.state.current_frame = block_start(direction);

        // Stop first: it must win a tie with the first frame tick.
        self.stop_timeout = Some(timers.schedule_once(self.episode, TimerEvent::StopEpisode));
        self.ticker = Some(timers.schedule_repeating(self.frame_period, TimerEvent::AdvanceFrame));

        log::debug!(
            "episode start: {} at {:?}",
            direction.label(),
            timers.now()
        );
        Some(self.emit())
    }

    /// Handle a fired frame tick or stop timeout. Events for timers this
    /// controller no longer owns are dropped.
    pub fn on_timer(&mut self, fired: Fired, timers: &mut impl Scheduler) -> Option<FrameChanged> {
        match fired.event {
            TimerEvent::AdvanceFrame if self.ticker == Some(fired.id) => Some(self.advance_frame()),
            TimerEvent::StopEpisode if self.stop_timeout == Some(fired.id) => {
                self.stop_timeout = None;
                Some(self.stop_episode(timers))
            }
            _ => None,
        }
    }

    fn advance_frame(&mut self) -> FrameChanged {
        debug_assert!(self.state.is_animating);
        let start = block_start(self.state.current_direction);
        self.state.current_frame = next_in_block(self.state.current_frame, start);
        self.emit()
    }

    fn stop_episode(&mut self, timers: &mut impl Scheduler) -> FrameChanged {
        if let Some(id) = self.ticker.take() {
            timers.cancel(id);
        }
        self.state.last_direction = self.state.current_direction;
        self.state.is_animating = false;
        self.state.current_frame = block_start(self.state.last_direction);

        log::debug!(
            "episode end: resting {} at {:?}",
            self.state.last_direction.label(),
            timers.now()
        );
        self.emit()
    }

    fn cancel_timers(&mut self, timers: &mut impl Scheduler) {
        if let Some(id) = self.ticker.take() {
            timers.cancel(id);
        }
        if let Some(id) = self.stop_timeout.take() {
            timers.cancel(id);
        }
    }

    /// Cancel the ticker and any pending stop. An interrupted episode
    /// settles on its resting pose without emitting.
    pub fn shutdown(&mut self, timers: &mut impl Scheduler) {
        self.cancel_timers(timers);
        if self.state.is_animating {
            self.state.last_direction = self.state.current_direction;
            self.state.is_animating = false;
            self.state.current_frame = block_start(self.state.last_direction);
        }
    }

    fn emit(&self) -> FrameChanged {
        let direction = if self.state.is_animating {
            self.state.current_direction
        } else {
            self.state.last_direction
        };
        debug_assert_eq!(block_of(self.state.current_frame), direction);
        FrameChanged {
            index: checked(self.state.current_frame),
            direction,
            animating: self.state.is_animating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerQueue;

    const FRAME: Duration = Duration::from_millis(150);
    const EPISODE: Duration = Duration::from_millis(600);

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    struct Rig {
        ctl: AnimationController,
        timers: TimerQueue,
        frames: Vec<(u64, usize)>,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                ctl: AnimationController::new(FRAME, EPISODE),
                timers: TimerQueue::new(),
                frames: Vec::new(),
            }
        }

        /// Fire everything due up to `t`.
        fn run_until(&mut self, t: u64) {
            while let Some(fired) = self.timers.pop_due(ms(t)) {
                if let Some(f) = self.ctl.on_timer(fired, &mut self.timers) {
                    self.frames.push((fired.at.as_millis() as u64, f.index));
                }
            }
        }

        /// Advance to `t`, then deliver a direction signal.
        fn signal_at(&mut self, t: u64, dir: Direction) -> Option<FrameChanged> {
            self.run_until(t);
            let out = self.ctl.on_direction_signal(dir, &mut self.timers);
            if let Some(f) = out {
                self.frames.push((t, f.index));
            }
            out
        }

        fn frame(&self) -> usize {
            self.ctl.state().current_frame
        }
    }

    #[test]
    fn initial_state_rests_facing_down() {
        let mut ctl = AnimationController::new(FRAME, EPISODE);
        assert_eq!(ctl.phase(), Phase::Resting(Direction::Down));
        assert_eq!(*ctl.state(), AnimationState::default());
        let f = ctl.resting_frame();
        assert_eq!(f.index, 0);
        assert!(!f.animating);
    }

    #[test]
    fn right_episode_walks_then_rests() {
        let mut rig = Rig::new();
        let f = rig.signal_at(0, Direction::Right).expect("episode starts");
        assert_eq!(f.index, 8);
        assert_eq!(rig.ctl.phase(), Phase::Animating(Direction::Right));

        rig.run_until(599);
        assert_eq!(rig.frames, vec![(0, 8), (150, 9), (300, 10), (450, 11)]);

        rig.run_until(600);
        assert_eq!(rig.frames.last(), Some(&(600, 8)));
        assert_eq!(rig.frames.len(), 5);
        assert_eq!(rig.ctl.phase(), Phase::Resting(Direction::Right));
        assert_eq!(rig.ctl.state().last_direction, Direction::Right);
        assert_eq!(rig.frame(), 8);

        // Nothing left armed, nothing more emitted.
        assert!(rig.timers.is_empty());
        rig.run_until(5000);
        assert_eq!(rig.frames.len(), 5);
    }

    #[test]
    fn same_direction_mid_episode_is_ignored() {
        let mut rig = Rig::new();
        rig.signal_at(0, Direction::Right);
        for t in [50, 100, 170, 220, 290, 350, 400, 480, 520, 590] {
            assert!(rig.signal_at(t, Direction::Right).is_none());
        }
        // Ticker kept its cadence, stop was not pushed back.
        rig.run_until(600);
        assert_eq!(
            rig.frames,
            vec![(0, 8), (150, 9), (300, 10), (450, 11), (600, 8)]
        );
        assert_eq!(rig.ctl.phase(), Phase::Resting(Direction::Right));
    }

    #[test]
    fn new_direction_restarts_episode() {
        let mut rig = Rig::new();
        rig.signal_at(0, Direction::Right);
        rig.run_until(300);
        assert_eq!(rig.frame(), 10);

        let f = rig.signal_at(350, Direction::Up).expect("restart");
        assert_eq!(f.index, 12);
        assert_eq!(rig.ctl.phase(), Phase::Animating(Direction::Up));
        // last_direction only moves when an episode ends
        assert_eq!(rig.ctl.state().last_direction, Direction::Down);

        // Old stop at 600 must not fire; new one lands at 950.
        rig.run_until(949);
        assert_eq!(rig.ctl.phase(), Phase::Animating(Direction::Up));
        let after_restart: Vec<_> = rig.frames.iter().filter(|(t, _)| *t >= 350).copied().collect();
        assert_eq!(
            after_restart,
            vec![(350, 12), (500, 13), (650, 14), (800, 15)]
        );

        rig.run_until(950);
        assert_eq!(rig.ctl.phase(), Phase::Resting(Direction::Up));
        assert_eq!(rig.ctl.state().last_direction, Direction::Up);
        assert_eq!(rig.frame(), 12);
    }

    #[test]
    fn restart_from_resting_uses_new_block() {
        let mut rig = Rig::new();
        rig.signal_at(0, Direction::Left);
        rig.run_until(600);
        assert_eq!(rig.frame(), 4);

        let f = rig.signal_at(700, Direction::Left).expect("fresh episode");
        assert_eq!(f.index, 4);
        assert!(f.animating);
        rig.run_until(1300);
        assert_eq!(rig.ctl.phase(), Phase::Resting(Direction::Left));
    }

    #[test]
    fn frames_never_leave_the_active_block() {
        let mut rig = Rig::new();
        let script = [
            (0, Direction::Down),
            (120, Direction::Left),
            (500, Direction::Up),
            (540, Direction::Up),
            (900, Direction::Right),
            (2000, Direction::Down),
        ];
        for (t, dir) in script {
            rig.run_until(t);
            rig.ctl.on_direction_signal(dir, &mut rig.timers);
            let start = block_start(dir);
            assert!((start..start + 4).contains(&rig.frame()));
            // step through the rest of this slot one tick at a time
            for step in (t..t + 100).step_by(10) {
                rig.run_until(step);
                let s = rig.ctl.state();
                let owner = if s.is_animating {
                    s.current_direction
                } else {
                    s.last_direction
                };
                let start = block_start(owner);
                assert!((start..start + 4).contains(&s.current_frame));
            }
        }
    }

    #[test]
    fn at_most_two_timers_armed() {
        let mut rig = Rig::new();
        for (i, dir) in [Direction::Up, Direction::Left, Direction::Right, Direction::Down]
            .into_iter()
            .enumerate()
        {
            rig.signal_at(i as u64 * 40, dir);
            assert_eq!(rig.timers.len(), 2);
        }
    }

    #[test]
    fn shutdown_cancels_and_silences() {
        let mut rig = Rig::new();
        rig.signal_at(0, Direction::Up);
        rig.run_until(200);
        let emitted = rig.frames.len();

        rig.ctl.shutdown(&mut rig.timers);
        assert!(rig.timers.is_empty());
        rig.run_until(2000);
        assert_eq!(rig.frames.len(), emitted);

        // idempotent
        rig.ctl.shutdown(&mut rig.timers);
        assert!(!rig.ctl.state().is_animating);
    }

    #[test]
    fn shutdown_mid_episode_rests_in_own_block() {
        let mut rig = Rig::new();
        rig.signal_at(0, Direction::Up);
        rig.run_until(200);
        assert_eq!(rig.frame(), 13);

        rig.ctl.shutdown(&mut rig.timers);
        assert_eq!(rig.ctl.phase(), Phase::Resting(Direction::Up));
        assert_eq!(rig.ctl.state().last_direction, Direction::Up);
        assert_eq!(rig.frame(), block_start(Direction::Up));
        assert_eq!(block_of(rig.frame()), Direction::Up);
        // settling is silent
        assert_eq!(rig.frames.last(), Some(&(150, 13)));
    }

    #[test]
    fn stop_wins_tie_with_first_tick() {
        let mut rig = Rig {
            ctl: AnimationController::new(EPISODE, EPISODE),
            timers: TimerQueue::new(),
            frames: Vec::new(),
        };
        rig.signal_at(0, Direction::Right);
        rig.run_until(600);
        assert_eq!(rig.frames, vec![(0, 8), (600, 8)]);
        assert_eq!(rig.ctl.phase(), Phase::Resting(Direction::Right));
        assert!(rig.timers.is_empty());
    }

    #[test]
    fn stale_timer_events_are_dropped() {
        let mut rig = Rig::new();
        let stray = rig.timers.schedule_once(ms(10), TimerEvent::StopEpisode);
        rig.signal_at(0, Direction::Right);
        let fired = rig.timers.pop_due(ms(10)).expect("stray fires");
        assert_eq!(fired.id, stray);
        assert!(rig.ctl.on_timer(fired, &mut rig.timers).is_none());
        assert_eq!(rig.ctl.phase(), Phase::Animating(Direction::Right));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "idle direction")]
    fn idle_signal_trips_in_debug() {
        let mut rig = Rig::new();
        rig.ctl.on_direction_signal(Direction::Idle, &mut rig.timers);
    }
}
