//! Wall-clock tick pacing: a fixed-interval accumulator plus a rolling
//! measured-fps window, decoupled from whatever rate the host polls at.

use std::time::Duration;

/// Drives script ticks at `target_fps`, independent of the UI's own frame
/// rate. Call [`Scheduler::advance`] once per UI frame with the elapsed
/// wall-clock time; it returns whether exactly one script tick should run.
#[derive(Debug, Clone)]
pub struct Scheduler {
    target_fps: u32,
    once: bool,
    once_ran: bool,
    accumulator: Duration,
    measured_fps: f64,
    window_elapsed: Duration,
    window_ticks: u32,
}

const MEASURED_FPS_WINDOW: Duration = Duration::from_secs(1);

impl Scheduler {
    pub fn new(target_fps: u32, once: bool) -> Self {
        Self {
            target_fps: target_fps.clamp(1, 240),
            once,
            once_ran: false,
            accumulator: Duration::ZERO,
            measured_fps: 0.0,
            window_elapsed: Duration::ZERO,
            window_ticks: 0,
        }
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    pub fn set_target_fps(&mut self, fps: u32) {
        self.target_fps = fps.clamp(1, 240);
    }

    pub fn measured_fps(&self) -> f64 {
        self.measured_fps
    }

    pub fn is_once(&self) -> bool {
        self.once
    }

    /// True once a one-shot scheduler has already run its single tick.
    pub fn once_exhausted(&self) -> bool {
        self.once && self.once_ran
    }

    fn interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps as f64)
    }

    /// Advance the accumulator by `dt` and report whether a tick should run
    /// this frame. At most one tick ever fires per call, regardless of how
    /// large `dt` is — excess accumulated time is dropped, not queued.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.once {
            if self.once_ran {
                return false;
            }
            self.once_ran = true;
            return true;
        }

        self.accumulator += dt;
        let interval = self.interval();
        if self.accumulator >= interval {
            let nanos = self.accumulator.as_nanos() % interval.as_nanos().max(1);
            self.accumulator = Duration::from_nanos(nanos as u64);
            self.record_tick(dt);
            true
        } else {
            false
        }
    }

    fn record_tick(&mut self, dt: Duration) {
        self.window_ticks += 1;
        self.window_elapsed += dt;
        if self.window_elapsed >= MEASURED_FPS_WINDOW {
            self.measured_fps = self.window_ticks as f64 / self.window_elapsed.as_secs_f64();
            self.window_elapsed = Duration::ZERO;
            self.window_ticks = 0;
        }
    }

    /// Reset accumulator/measured-fps/once state, e.g. after a recompile.
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
        self.once_ran = false;
        self.measured_fps = 0.0;
        self.window_elapsed = Duration::ZERO;
        self.window_ticks = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_fps_over_one_second_at_sixty_hz_ticks_about_thirty_times() {
        let mut sched = Scheduler::new(30, false);
        let dt = Duration::from_secs_f64(1.0 / 60.0);
        let mut ticks = 0u32;
        for _ in 0..60 {
            if sched.advance(dt) {
                ticks += 1;
            }
        }
        assert!((29..=31).contains(&ticks), "ticks = {ticks}");
    }

    #[test]
    fn never_bursts_more_than_one_tick_per_frame() {
        let mut sched = Scheduler::new(10, false);
        // A single huge dt (several intervals' worth) must still fire once.
        assert!(sched.advance(Duration::from_secs(5)));
        // The accumulator should have been folded down below one interval,
        // so the very next tiny step does not also fire.
        assert!(!sched.advance(Duration::from_millis(1)));
    }

    #[test]
    fn once_mode_runs_exactly_one_tick_no_matter_how_long_it_lingers() {
        let mut sched = Scheduler::new(5, true);
        assert!(sched.advance(Duration::from_millis(1)));
        for _ in 0..100 {
            assert!(!sched.advance(Duration::from_secs(1)));
        }
    }

    #[test]
    fn measured_fps_settles_near_target_after_a_full_window() {
        let mut sched = Scheduler::new(20, false);
        let dt = Duration::from_secs_f64(1.0 / 20.0);
        for _ in 0..21 {
            sched.advance(dt);
        }
        assert!((sched.measured_fps() - 20.0).abs() < 3.0, "measured = {}", sched.measured_fps());
    }
}
