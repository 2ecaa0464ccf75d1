use super::reference::{extract_object_path, extract_package_path, parse_resolution};
use crate::cmdline::{LaunchRequest, ARG_MAP, ARG_OUTPUT, ARG_SEQUENCE};
use crate::error::RenderError;
use crate::host::{JobId, MoviePipeline, PipelineSetting, PropertyValue};
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

pub const FILE_NAME_FORMAT: &str = "{sequence_name}.{frame_number}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    Png,
}

impl ImageFormat {
    fn setting(self) -> PipelineSetting {
        match self {
            Self::Png => PipelineSetting::PngSequence,
        }
    }
}

/// Fully normalized render job parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderJobConfig {
    /// Map object path, e.g. `/Game/Maps/Test1.Test1`.
    pub map: String,
    /// Map package path, e.g. `/Game/Maps/Test1`.
    pub map_package: String,
    pub sequence: String,
    pub output_dir: PathBuf,
    pub resolution: (u32, u32),
    pub fps: u32,
    pub format: ImageFormat,
    pub file_name_format: String,
    pub overwrite_existing: bool,
}

impl RenderJobConfig {
    /// Validates the request. Fails when map, sequence or output directory is missing.
    pub fn from_request(request: &LaunchRequest) -> Result<Self, RenderError> {
        let map = request.map.as_deref().map(extract_object_path).unwrap_or_default();
        let sequence = request
            .sequence
            .as_deref()
            .map(extract_object_path)
            .unwrap_or_default();
        let output_dir = request.output_dir.clone().unwrap_or_default();

        let mut missing = Vec::new();
        if map.is_empty() {
            missing.push(ARG_MAP);
        }
        if sequence.is_empty() {
            missing.push(ARG_SEQUENCE);
        }
        if output_dir.as_os_str().is_empty() {
            missing.push(ARG_OUTPUT);
        }
        if !missing.is_empty() {
            return Err(RenderError::MissingArguments(missing));
        }

        Ok(Self {
            map_package: extract_package_path(&map),
            map,
            sequence,
            output_dir,
            resolution: parse_resolution(&request.resolution),
            fps: request.fps,
            format: ImageFormat::Png,
            file_name_format: FILE_NAME_FORMAT.to_string(),
            overwrite_existing: true,
        })
    }

    /// Writes output settings onto `job` and makes sure it has a render pass and an image writer.
    pub fn apply<H: MoviePipeline + ?Sized>(&self, host: &mut H, job: JobId) {
        let (width, height) = self.resolution;
        set_output(host, job, "output_directory", PropertyValue::Path(self.output_dir.clone()));
        set_output(host, job, "output_resolution", PropertyValue::IntPoint(width, height));
        set_output(
            host,
            job,
            "file_name_format",
            PropertyValue::Text(self.file_name_format.clone()),
        );
        set_output(
            host,
            job,
            "override_existing_output",
            PropertyValue::Bool(self.overwrite_existing),
        );

        let rate = PropertyValue::FrameRate {
            numerator: self.fps,
            denominator: 1,
        };
        if host.has_output_property(job, "use_custom_frame_rate") {
            set_output(host, job, "use_custom_frame_rate", PropertyValue::Bool(true));
            set_output(host, job, "custom_frame_rate", rate);
        } else {
            set_output(host, job, "output_frame_rate", rate);
        }

        // A job without a pass finishes "successfully" with zero frames.
        let pass = [PipelineSetting::DeferredPassBase, PipelineSetting::DeferredPass]
            .into_iter()
            .find(|setting| host.has_setting_class(*setting));
        match pass {
            Some(pass) => add_setting(host, job, pass),
            None => warn!("no render pass class available, output may be empty"),
        }
        add_setting(host, job, self.format.setting());
    }
}

fn set_output<H: MoviePipeline + ?Sized>(host: &mut H, job: JobId, property: &str, value: PropertyValue) {
    if let Err(err) = host.set_output_property(job, property, value) {
        warn!(property, %err, "output setting not applied");
    }
}

fn add_setting<H: MoviePipeline + ?Sized>(host: &mut H, job: JobId, setting: PipelineSetting) {
    if let Err(err) = host.find_or_add_setting(job, setting) {
        warn!(?setting, %err, "could not add job setting");
    }
}
