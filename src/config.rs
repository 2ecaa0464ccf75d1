use crate::media::MediaSettings;
use crate::render::RenderTuning;
use crate::studio::{StudioSettings, DEFAULT_AVATAR_BLUEPRINT, DEFAULT_STUDIO_TAG};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    pub studio: StudioConfig,
    pub media: MediaConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StudioConfig {
    pub tag: String,
    /// Empty string disables the avatar.
    pub avatar_blueprint: String,
    pub ceiling_rig: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MediaConfig {
    pub package_path: String,
    pub default_video: PathBuf,
    pub state_file: PathBuf,
    pub autoplay: bool,
    pub looping: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RenderConfig {
    pub timeout_secs: u64,
    pub heartbeat_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let media = MediaSettings::default();
        let render = RenderTuning::default();
        Self {
            studio: StudioConfig {
                tag: DEFAULT_STUDIO_TAG.to_string(),
                avatar_blueprint: DEFAULT_AVATAR_BLUEPRINT.to_string(),
                ceiling_rig: false,
            },
            media: MediaConfig {
                package_path: media.package_path,
                default_video: media.default_video,
                state_file: media.state_file,
                autoplay: media.autoplay,
                looping: media.looping,
            },
            render: RenderConfig {
                timeout_secs: render.timeout.as_secs(),
                heartbeat_secs: render.heartbeat.as_secs(),
            },
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("virtucast")
    }

    /// Defaults, then the optional `<name>.{toml,json,yaml}` file, then `VIRTUCAST__*` variables.
    pub fn load_from(name: &str) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let builder = config::Config::builder()
            .set_default("studio.tag", defaults.studio.tag)?
            .set_default("studio.avatar_blueprint", defaults.studio.avatar_blueprint)?
            .set_default("studio.ceiling_rig", defaults.studio.ceiling_rig)?
            .set_default("media.package_path", defaults.media.package_path)?
            .set_default(
                "media.default_video",
                defaults.media.default_video.to_string_lossy().into_owned(),
            )?
            .set_default(
                "media.state_file",
                defaults.media.state_file.to_string_lossy().into_owned(),
            )?
            .set_default("media.autoplay", defaults.media.autoplay)?
            .set_default("media.looping", defaults.media.looping)?
            .set_default("render.timeout_secs", defaults.render.timeout_secs)?
            .set_default("render.heartbeat_secs", defaults.render.heartbeat_secs)?
            // Load from file if exists
            .add_source(config::File::with_name(name).required(false))
            // Allow env var overrides (e.g. VIRTUCAST__RENDER__TIMEOUT_SECS=600)
            .add_source(config::Environment::with_prefix("VIRTUCAST").separator("__"));

        builder.build()?.try_deserialize()
    }

    pub fn studio_settings(&self) -> StudioSettings {
        let blueprint = self.studio.avatar_blueprint.trim();
        StudioSettings {
            tag: self.studio.tag.clone(),
            avatar_blueprint: (!blueprint.is_empty()).then(|| blueprint.to_string()),
            ceiling_rig: self.studio.ceiling_rig,
        }
    }

    pub fn media_settings(&self) -> MediaSettings {
        MediaSettings {
            package_path: self.media.package_path.clone(),
            default_video: self.media.default_video.clone(),
            state_file: self.media.state_file.clone(),
            autoplay: self.media.autoplay,
            looping: self.media.looping,
        }
    }

    pub fn render_tuning(&self) -> RenderTuning {
        RenderTuning {
            timeout: Duration::from_secs(self.render.timeout_secs),
            heartbeat: Duration::from_secs(self.render.heartbeat_secs),
        }
    }
}
