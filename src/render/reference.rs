//! Normalization of asset references and resolution strings from the launch line.

use regex::Regex;
use std::sync::OnceLock;

pub const DEFAULT_DIMENSIONS: (u32, u32) = (1920, 1080);

fn soft_reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"'(/[^']+)'").expect("valid soft reference regex"))
}

fn resolution_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)x(\d+)$").expect("valid resolution regex"))
}

/// `/Script/Engine.World'/Game/Maps/Test1.Test1'` -> `/Game/Maps/Test1.Test1`.
/// Bare paths come back trimmed of whitespace and stray quotes.
pub fn extract_object_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(caps) = soft_reference_pattern().captures(trimmed) {
        return caps[1].to_string();
    }
    trimmed
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

/// `/Game/Maps/Test1.Test1` -> `/Game/Maps/Test1`. Accepts decorated references too.
pub fn extract_package_path(raw: &str) -> String {
    let object_path = extract_object_path(raw);
    let name_start = object_path.rfind('/').map_or(0, |slash| slash + 1);
    match object_path[name_start..].find('.') {
        Some(dot) => object_path[..name_start + dot].to_string(),
        None => object_path,
    }
}

/// `WIDTHxHEIGHT`; anything else, zero sizes included, gives 1920x1080.
pub fn parse_resolution(raw: &str) -> (u32, u32) {
    resolution_pattern()
        .captures(raw.trim())
        .and_then(|caps| Some((caps[1].parse::<u32>().ok()?, caps[2].parse::<u32>().ok()?)))
        .filter(|(w, h)| *w > 0 && *h > 0)
        .unwrap_or(DEFAULT_DIMENSIONS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_reference_is_unwrapped() {
        assert_eq!(
            extract_object_path("/Script/Engine.World'/Game/Maps/Test1.Test1'"),
            "/Game/Maps/Test1.Test1"
        );
        assert_eq!(
            extract_object_path("LevelSequence'/Game/Cinematics/Intro.Intro'"),
            "/Game/Cinematics/Intro.Intro"
        );
    }

    #[test]
    fn test_bare_path_is_idempotent() {
        assert_eq!(extract_object_path("/Game/Maps/Test1"), "/Game/Maps/Test1");
        let once = extract_object_path("/Script/Engine.World'/Game/Maps/Test1.Test1'");
        assert_eq!(extract_object_path(&once), once);
    }

    #[test]
    fn test_quotes_and_whitespace_are_stripped() {
        assert_eq!(extract_object_path("  \"/Game/Maps/Test1\" "), "/Game/Maps/Test1");
    }

    #[test]
    fn test_package_path() {
        assert_eq!(extract_package_path("/Game/Maps/Test1.Test1"), "/Game/Maps/Test1");
        assert_eq!(
            extract_package_path("/Script/Engine.World'/Game/Maps/Test1.Test1'"),
            "/Game/Maps/Test1"
        );
        assert_eq!(extract_package_path("/Game/Maps/Test1"), "/Game/Maps/Test1");
    }

    #[test]
    fn test_plugin_content_is_accepted() {
        assert_eq!(
            extract_object_path("World'/VirtuCast/Maps/Studio.Studio'"),
            "/VirtuCast/Maps/Studio.Studio"
        );
    }

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("1920x1080"), (1920, 1080));
        assert_eq!(parse_resolution(" 1280x720 "), (1280, 720));
        assert_eq!(parse_resolution("1280X720"), DEFAULT_DIMENSIONS);
        assert_eq!(parse_resolution("720p"), DEFAULT_DIMENSIONS);
        assert_eq!(parse_resolution(""), DEFAULT_DIMENSIONS);
        assert_eq!(parse_resolution("0x720"), DEFAULT_DIMENSIONS);
        assert_eq!(parse_resolution("99999999999x1"), DEFAULT_DIMENSIONS);
    }
}
