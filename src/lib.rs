pub mod cmdline;
pub mod config;
pub mod error;
pub mod host;
pub mod materials;
pub mod math;
pub mod media;
pub mod render;
pub mod session;
pub mod studio;

pub use cmdline::{LaunchArguments, LaunchRequest};
pub use config::AppConfig;
pub use error::{HostError, MediaError, RenderError, SessionError};
pub use host::{EditorHost, HeadlessHost};
pub use media::{MediaScreen, MediaSettings};
pub use render::{RenderJobConfig, RenderJobController, RenderTuning};
pub use session::{Session, StartupOutcome};
pub use studio::{LayoutParser, StudioBuilder, StudioLayout, StudioSettings};
