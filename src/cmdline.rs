use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

pub const ARG_AUTO_RENDER: &str = "VirtuCastAutoRender";
pub const ARG_SCRIPT: &str = "VirtuCastScript";
pub const ARG_MAP: &str = "VirtuCastMap";
pub const ARG_SEQUENCE: &str = "VirtuCastSequence";
pub const ARG_OUTPUT: &str = "VirtuCastOut";
pub const ARG_RESOLUTION: &str = "VirtuCastRes";
pub const ARG_FPS: &str = "VirtuCastFps";

pub const DEFAULT_RESOLUTION: &str = "1920x1080";
pub const DEFAULT_FPS: u32 = 30;

fn argument_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?:^|\s)-([A-Za-z0-9_.]+)=(?:"([^"]*)"|(\S+))"#).expect("valid argument regex")
    })
}

/// Named `-Name=value` arguments extracted from the host's raw launch line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchArguments {
    entries: Vec<(String, String)>,
}

impl LaunchArguments {
    /// Parse a raw command line. Fragments that do not match the grammar are ignored.
    pub fn parse(raw: &str) -> Self {
        let entries = argument_pattern()
            .captures_iter(raw)
            .filter_map(|caps| {
                let name = caps.get(1)?.as_str().to_string();
                let value = caps.get(2).or_else(|| caps.get(3))?.as_str();
                Some((name, value.to_string()))
            })
            .collect();
        Self { entries }
    }

    /// Value of the first occurrence of `name`. Empty quoted values count as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }

    pub fn flag(&self, name: &str) -> bool {
        truthy(self.get(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// `1`, `true`, `yes`, `y`, `on` (trimmed, any case) are true. Everything else, absence included, is false.
pub fn truthy(value: Option<&str>) -> bool {
    match value {
        Some(v) => matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "on"
        ),
        None => false,
    }
}

/// Typed view over the arguments the launcher passes to the editor.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchRequest {
    pub auto_render: bool,
    pub script_override: Option<PathBuf>,
    pub map: Option<String>,
    pub sequence: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub resolution: String,
    pub fps: u32,
}

impl LaunchRequest {
    pub fn from_args(args: &LaunchArguments) -> Self {
        let fps = args
            .get(ARG_FPS)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|fps| *fps > 0)
            .unwrap_or(DEFAULT_FPS);

        Self {
            auto_render: args.flag(ARG_AUTO_RENDER),
            script_override: args.get(ARG_SCRIPT).map(PathBuf::from),
            map: args.get(ARG_MAP).map(str::to_string),
            sequence: args.get(ARG_SEQUENCE).map(str::to_string),
            output_dir: args.get(ARG_OUTPUT).map(PathBuf::from),
            resolution: args.get(ARG_RESOLUTION).unwrap_or(DEFAULT_RESOLUTION).to_string(),
            fps,
        }
    }

    pub fn parse(raw: &str) -> Self {
        Self::from_args(&LaunchArguments::parse(raw))
    }
}
