//! Render job controller.
//!
//! A render is configured and queued in one call, then awaited without
//! blocking: the executor's finish callback records the outcome and a
//! post-tick hook polls a [`RenderMonitor`] until the job finishes or times
//! out, at which point the host process is asked to exit exactly once.

pub mod controller;
pub mod job;
pub mod monitor;
pub mod reference;

pub use controller::{RenderJobController, RenderTuning, DEFAULT_HEARTBEAT, DEFAULT_TIMEOUT};
pub use job::{ImageFormat, RenderJobConfig, FILE_NAME_FORMAT};
pub use monitor::{Clock, ManualClock, RenderMonitor, RenderPhase, SystemClock};
pub use reference::{extract_object_path, extract_package_path, parse_resolution};
