use super::job::RenderJobConfig;
use super::monitor::{Clock, RenderMonitor, RenderPhase, SystemClock};
use crate::cmdline::LaunchRequest;
use crate::error::RenderError;
use crate::host::{adapter, EditorHost, ExecutorId, ExecutorKind, JobId, TickHandle};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3600);
pub const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTuning {
    pub timeout: Duration,
    pub heartbeat: Duration,
}

impl Default for RenderTuning {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            heartbeat: DEFAULT_HEARTBEAT,
        }
    }
}

/// Everything that has to stay alive while the job is in flight.
struct ActiveRender {
    config: RenderJobConfig,
    job: JobId,
    executor: ExecutorId,
    tick: Option<TickHandle>,
    monitor: Rc<RefCell<RenderMonitor>>,
}

/// Configures, launches and awaits one render job at a time.
pub struct RenderJobController {
    tuning: RenderTuning,
    clock: Rc<dyn Clock>,
    active: Option<ActiveRender>,
}

impl RenderJobController {
    pub fn new(tuning: RenderTuning) -> Self {
        Self::with_clock(tuning, Rc::new(SystemClock::new()))
    }

    pub fn with_clock(tuning: RenderTuning, clock: Rc<dyn Clock>) -> Self {
        Self {
            tuning,
            clock,
            active: None,
        }
    }

    /// Phase of the most recent job, if any was launched.
    pub fn phase(&self) -> Option<RenderPhase> {
        self.active.as_ref().map(|active| active.monitor.borrow().phase())
    }

    pub fn config(&self) -> Option<&RenderJobConfig> {
        self.active.as_ref().map(|active| &active.config)
    }

    pub fn job(&self) -> Option<JobId> {
        self.active.as_ref().map(|active| active.job)
    }

    pub fn executor(&self) -> Option<ExecutorId> {
        self.active.as_ref().map(|active| active.executor)
    }

    /// Validates the request, queues the job and hooks completion into the host tick.
    ///
    /// Argument errors surface before the host is touched. Returns once the
    /// job is queued; the host process exits when the job completes or times out.
    pub fn launch<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        request: &LaunchRequest,
    ) -> Result<(), RenderError> {
        let config = RenderJobConfig::from_request(request)?;
        ensure_output_dir(&config.output_dir)?;

        info!(
            map = %config.map,
            sequence = %config.sequence,
            output = %config.output_dir.display(),
            width = config.resolution.0,
            height = config.resolution.1,
            fps = config.fps,
            "starting render"
        );

        self.release(host);
        adapter::load_map(host, &config.map_package);

        if let Err(err) = host.delete_all_jobs() {
            debug!(%err, "could not clear render queue");
        }
        let job = host.allocate_job()?;
        host.set_job_map(job, &config.map)?;
        host.set_job_sequence(job, &config.sequence)?;
        config.apply(host, job);

        let executor = host.create_executor(ExecutorKind::InProcess)?;
        let monitor = Rc::new(RefCell::new(RenderMonitor::new(
            self.tuning.timeout,
            self.tuning.heartbeat,
        )));

        let completion = monitor.borrow().completion();
        if let Err(err) = host.on_executor_finished(
            executor,
            Box::new(move |success| completion.set(Some(success))),
        ) {
            warn!(%err, "no finish callback, completion relies on the timeout");
        }

        monitor.borrow_mut().mark_launched(self.clock.now());
        host.render_queue_with_executor(executor)?;

        let tick = {
            let monitor = Rc::clone(&monitor);
            let clock = Rc::clone(&self.clock);
            host.register_post_tick(Box::new(move |process| {
                monitor.borrow_mut().poll(clock.now(), process)
            }))
        };
        let tick = match tick {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!(%err, "no post-tick hook, render may stall");
                None
            }
        };

        self.active = Some(ActiveRender {
            config,
            job,
            executor,
            tick,
            monitor,
        });
        Ok(())
    }

    /// Drops the previous job's tick hook if it is still polling.
    fn release<H: EditorHost + ?Sized>(&mut self, host: &mut H) {
        let Some(previous) = self.active.take() else {
            return;
        };
        if previous.monitor.borrow().phase().is_terminal() {
            return;
        }
        if let Some(handle) = previous.tick {
            if let Err(err) = host.unregister_post_tick(handle) {
                debug!(%err, "could not drop previous render tick hook");
            }
        }
    }
}

fn ensure_output_dir(path: &Path) -> Result<(), RenderError> {
    std::fs::create_dir_all(path).map_err(|source| RenderError::OutputDirectory {
        path: path.to_path_buf(),
        source,
    })
}
