//! Completion tracking for an in-flight render, polled from the host tick.

use crate::host::{adapter, ProcessControl, TickControl};
use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Monotonic time source. Only differences between readings matter.
pub trait Clock {
    fn now(&self) -> Duration;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock. Clones share the same reading.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum RenderPhase {
    Configured,
    Launched,
    Polling,
    Finished { success: bool },
    TimedOut,
}

impl RenderPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished { .. } | Self::TimedOut)
    }
}

/// Slot the executor's finish callback writes the success flag into.
pub type Completion = Rc<Cell<Option<bool>>>;

#[derive(Debug)]
pub struct RenderMonitor {
    phase: RenderPhase,
    completion: Completion,
    timeout: Duration,
    heartbeat: Duration,
    started: Duration,
    last_heartbeat: Duration,
    exit_requested: bool,
}

impl RenderMonitor {
    pub fn new(timeout: Duration, heartbeat: Duration) -> Self {
        Self {
            phase: RenderPhase::Configured,
            completion: Rc::new(Cell::new(None)),
            timeout,
            heartbeat,
            started: Duration::ZERO,
            last_heartbeat: Duration::ZERO,
            exit_requested: false,
        }
    }

    pub fn completion(&self) -> Completion {
        Rc::clone(&self.completion)
    }

    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Starts the timeout and heartbeat clocks.
    pub fn mark_launched(&mut self, now: Duration) {
        self.phase = RenderPhase::Launched;
        self.started = now;
        self.last_heartbeat = now;
    }

    /// One tick: finished, then timed out, then heartbeat.
    pub fn poll(&mut self, now: Duration, process: &mut dyn ProcessControl) -> TickControl {
        if self.phase.is_terminal() {
            return TickControl::Unregister;
        }
        self.phase = RenderPhase::Polling;
        let elapsed = now.saturating_sub(self.started);

        if let Some(success) = self.completion.get() {
            if success {
                info!(elapsed_secs = elapsed.as_secs(), "render finished");
            } else {
                error!(elapsed_secs = elapsed.as_secs(), "render finished with failure");
            }
            self.phase = RenderPhase::Finished { success };
            self.request_exit(process);
            return TickControl::Unregister;
        }

        if elapsed > self.timeout {
            warn!(timeout_secs = self.timeout.as_secs(), "render timed out");
            self.phase = RenderPhase::TimedOut;
            self.request_exit(process);
            return TickControl::Unregister;
        }

        if now.saturating_sub(self.last_heartbeat) >= self.heartbeat {
            info!(elapsed_secs = elapsed.as_secs(), "rendering");
            self.last_heartbeat = now;
        }
        TickControl::Continue
    }

    fn request_exit(&mut self, process: &mut dyn ProcessControl) {
        if self.exit_requested {
            return;
        }
        self.exit_requested = true;
        adapter::request_exit(process);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostResult;

    #[derive(Default)]
    struct RecordingProcess {
        quits: u32,
    }

    impl ProcessControl for RecordingProcess {
        fn quit_editor(&mut self) -> HostResult<()> {
            self.quits += 1;
            Ok(())
        }

        fn execute_console_command(&mut self, _command: &str) -> HostResult<()> {
            Ok(())
        }
    }

    fn launched(clock: &ManualClock) -> RenderMonitor {
        let mut monitor = RenderMonitor::new(Duration::from_secs(3600), Duration::from_secs(10));
        monitor.mark_launched(clock.now());
        monitor
    }

    #[test]
    fn test_finish_requests_exit_once() {
        let clock = ManualClock::new();
        let mut process = RecordingProcess::default();
        let mut monitor = launched(&clock);

        assert_eq!(monitor.poll(clock.now(), &mut process), TickControl::Continue);
        assert_eq!(monitor.phase(), RenderPhase::Polling);

        monitor.completion().set(Some(true));
        assert_eq!(monitor.poll(clock.now(), &mut process), TickControl::Unregister);
        assert_eq!(monitor.poll(clock.now(), &mut process), TickControl::Unregister);
        assert_eq!(process.quits, 1);
        assert_eq!(monitor.phase(), RenderPhase::Finished { success: true });
    }

    #[test]
    fn test_failure_still_exits() {
        let clock = ManualClock::new();
        let mut process = RecordingProcess::default();
        let mut monitor = launched(&clock);
        monitor.completion().set(Some(false));
        monitor.poll(clock.now(), &mut process);
        assert_eq!(monitor.phase(), RenderPhase::Finished { success: false });
        assert_eq!(process.quits, 1);
    }

    #[test]
    fn test_timeout() {
        let clock = ManualClock::new();
        let mut process = RecordingProcess::default();
        let mut monitor = launched(&clock);

        clock.advance(Duration::from_secs(3600));
        assert_eq!(monitor.poll(clock.now(), &mut process), TickControl::Continue);
        clock.advance(Duration::from_secs(1));
        assert_eq!(monitor.poll(clock.now(), &mut process), TickControl::Unregister);
        assert_eq!(monitor.phase(), RenderPhase::TimedOut);

        // A late finish does not produce a second exit.
        monitor.completion().set(Some(true));
        monitor.poll(clock.now(), &mut process);
        assert_eq!(process.quits, 1);
    }

    #[test]
    fn test_finish_wins_over_timeout() {
        let clock = ManualClock::new();
        let mut process = RecordingProcess::default();
        let mut monitor = launched(&clock);
        clock.advance(Duration::from_secs(7200));
        monitor.completion().set(Some(true));
        monitor.poll(clock.now(), &mut process);
        assert_eq!(monitor.phase(), RenderPhase::Finished { success: true });
    }

    #[test]
    fn test_heartbeat_interval() {
        let clock = ManualClock::new();
        let mut process = RecordingProcess::default();
        let mut monitor = launched(&clock);

        clock.advance(Duration::from_secs(9));
        monitor.poll(clock.now(), &mut process);
        assert_eq!(monitor.last_heartbeat, Duration::ZERO);

        clock.advance(Duration::from_secs(1));
        monitor.poll(clock.now(), &mut process);
        assert_eq!(monitor.last_heartbeat, Duration::from_secs(10));
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(Duration::from_secs(5));
        assert_eq!(other.now(), Duration::from_secs(5));
    }
}
