use std::path::PathBuf;

/// Failure reported by a host capability.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum HostError {
    /// The running host version does not expose this API.
    #[error("host API unavailable: {0}")]
    Unsupported(String),

    #[error("host object not found: {0}")]
    NotFound(String),

    #[error("host call failed: {0}")]
    Failed(String),
}

impl HostError {
    pub fn unsupported(api: impl Into<String>) -> Self {
        Self::Unsupported(api.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

pub type HostResult<T> = Result<T, HostError>;

/// Render attempt failures. Raised before any map load or job allocation.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("missing required arguments: {}", .0.join(", "))]
    MissingArguments(Vec<&'static str>),

    #[error("cannot create output directory {path}: {source}")]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("render queue rejected the job: {0}")]
    Queue(#[from] HostError),
}

/// Screen video binding failures.
#[derive(thiserror::Error, Debug)]
pub enum MediaError {
    #[error("video not found: {}", .0.display())]
    VideoNotFound(PathBuf),

    #[error("failed to create or load media asset {0}")]
    AssetCreation(String),

    #[error("failed to create screen video material {0}")]
    MaterialCreation(String),

    #[error("screen actor {0} not found; build the studio first")]
    ScreenMissing(String),

    #[error("screen actor {0} has no static mesh component")]
    NoMeshComponent(String),
}

/// Failures surfaced by the startup hook and registered actions.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error("startup script not found: {}", .0.display())]
    ScriptNotFound(PathBuf),

    #[error("startup script failed: {0}")]
    Script(HostError),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("no video selected")]
    NoSelection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_arguments_lists_names() {
        let err = RenderError::MissingArguments(vec!["VirtuCastMap", "VirtuCastOut"]);
        assert_eq!(
            err.to_string(),
            "missing required arguments: VirtuCastMap, VirtuCastOut"
        );
    }

    #[test]
    fn test_display_prefixes_are_stable() {
        assert!(HostError::unsupported("x").to_string().contains("unavailable"));
        assert!(HostError::not_found("x").to_string().contains("not found"));
        assert!(MediaError::ScreenMissing("VC_Screen".into())
            .to_string()
            .contains("VC_Screen"));
    }

    #[test]
    fn test_session_error_is_transparent() {
        let err: SessionError = MediaError::VideoNotFound(PathBuf::from("a.mp4")).into();
        assert_eq!(err.to_string(), "video not found: a.mp4");
    }
}
