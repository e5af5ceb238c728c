use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

use crate::anim::AnimationController;
use crate::config::FollowerConfig;
use crate::motion::{Direction, MotionSampler, PointerSource};
use crate::sink::{DisplaySink, FrameChanged};
use crate::timer::{Scheduler, TimerEvent, TimerId, TimerQueue};

/// Owns the sampler, the controller and every timer between them.
///
/// Single-threaded: the host calls [`Follower::pump`] from its event loop
/// and all state changes happen inside that call.
pub struct Follower {
    timers: TimerQueue,
    sampler: MotionSampler,
    signals: Receiver<Direction>,
    controller: AnimationController,
    sinks: Vec<Box<dyn DisplaySink>>,
    sample_period: Duration,
    poll: Option<TimerId>,
}

impl Follower {
    pub fn new(config: &FollowerConfig) -> Self {
        let (tx, rx) = channel();
        Self {
            timers: TimerQueue::new(),
            sampler: MotionSampler::new(config.move_threshold, tx),
            signals: rx,
            controller: AnimationController::new(config.frame_period(), config.episode_duration()),
            sinks: Vec::new(),
            sample_period: config.sample_period(),
            poll: None,
        }
    }

    pub fn attach_sink(&mut self, sink: Box<dyn DisplaySink>) {
        self.sinks.push(sink);
    }

    pub fn is_running(&self) -> bool {
        self.poll.is_some()
    }

    #[cfg(test)]
    pub fn controller(&self) -> &AnimationController {
        &self.controller
    }

    /// Arm the cursor poll and show the resting pose. Calling it again
    /// while running does nothing.
    pub fn start(&mut self, pointer: &mut dyn PointerSource) {
        if self.is_running() {
            return;
        }
        self.sampler.prime(pointer, self.timers.now());
        self.poll = Some(
            self.timers
                .schedule_repeating(self.sample_period, TimerEvent::SamplePointer),
        );
        let frame = self.controller.resting_frame();
        self.publish(frame);
        log::info!("Follower started (poll every {:?})", self.sample_period);
    }

    /// Fire every timer due up to `now`.
    pub fn pump(&mut self, now: Duration, pointer: &mut dyn PointerSource) {
        while let Some(fired) = self.timers.pop_due(now) {
            match fired.event {
                TimerEvent::SamplePointer if self.poll == Some(fired.id) => {
                    self.sampler.sample(pointer, fired.at);
                    self.drain_signals();
                }
                TimerEvent::SamplePointer => {}
                TimerEvent::AdvanceFrame | TimerEvent::StopEpisode => {
                    if let Some(frame) = self.controller.on_timer(fired, &mut self.timers) {
                        self.publish(frame);
                    }
                }
            }
        }
    }

    fn drain_signals(&mut self) {
        while let Ok(direction) = self.signals.try_recv() {
            log::debug!("direction signal: {}", direction.label());
            if let Some(frame) = self
                .controller
                .on_direction_signal(direction, &mut self.timers)
            {
                self.publish(frame);
            }
        }
    }

    fn publish(&mut self, frame: FrameChanged) {
        for sink in &mut self.sinks {
            sink.frame_changed(&frame);
        }
    }

    /// When the host should next call [`Follower::pump`].
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Cancel the poll, the frame ticker and any pending stop. Idempotent.
    pub fn stop(&mut self) {
        if let Some(id) = self.poll.take() {
            self.timers.cancel(id);
            log::info!("Follower stopped");
        }
        self.controller.shutdown(&mut self.timers);
        // Drop any signal sampled but never delivered.
        while self.signals.try_recv().is_ok() {}
        debug_assert!(self.timers.is_empty(), "timer left armed after stop");
    }
}
