//! Process-scoped entry points: the startup hook and the editor actions.

use crate::cmdline::LaunchRequest;
use crate::error::{MediaError, SessionError};
use crate::host::{adapter, EditorHost, MenuAction};
use crate::media::{MediaScreen, MediaSettings, ScreenAssets};
use crate::render::{RenderJobController, RenderTuning};
use crate::studio::{BuildReport, StudioBuilder, StudioLayout, StudioSettings};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub const ACTION_REBUILD_STUDIO: &str = "virtucast.rebuild_studio";
pub const ACTION_APPLY_SCREEN_VIDEO: &str = "virtucast.apply_screen_video";
pub const ACTION_SELECT_SCREEN_VIDEO: &str = "virtucast.select_screen_video";
pub const ACTION_RELOAD: &str = "virtucast.reload";

const MENU_SECTION: &str = "VirtuCast";

/// Native file dialog, supplied by whatever shell embeds the session.
pub trait FilePicker {
    /// Asks the user for a video file, starting in `start_dir`. `None` when cancelled.
    fn pick_video(&mut self, start_dir: &Path) -> Option<PathBuf>;
}

/// Picker for hosts without any dialog support.
#[derive(Debug, Default)]
pub struct NoPicker;

impl FilePicker for NoPicker {
    fn pick_video(&mut self, _start_dir: &Path) -> Option<PathBuf> {
        None
    }
}

/// What the startup hook did.
#[derive(Debug, Clone, PartialEq)]
pub enum StartupOutcome {
    /// Auto-render was not requested.
    Idle,
    /// The hook already ran in this process.
    AlreadyRan,
    ScriptRan(PathBuf),
    RenderLaunched,
    /// The auto-run failed; exit was requested.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Rebuilt(BuildReport),
    ScreenVideo(ScreenAssets),
    Reloaded { registered: usize, build: BuildReport },
}

fn menu_actions() -> Vec<MenuAction> {
    let action = |name: &str, label: &str, tooltip: &str| MenuAction {
        name: name.to_string(),
        label: label.to_string(),
        section: MENU_SECTION.to_string(),
        tooltip: tooltip.to_string(),
    };
    vec![
        action(
            ACTION_REBUILD_STUDIO,
            "Rebuild News Studio",
            "Delete and recreate every studio actor",
        ),
        action(
            ACTION_APPLY_SCREEN_VIDEO,
            "Apply Screen Video",
            "Play the last used (or default) video on the studio screen",
        ),
        action(
            ACTION_SELECT_SCREEN_VIDEO,
            "Select Screen Video...",
            "Pick a video file and play it on the studio screen",
        ),
        action(ACTION_RELOAD, "Reload VirtuCast", "Re-register actions and rebuild the studio"),
    ]
}

/// Owns the per-process latches and the long-lived render controller.
pub struct Session {
    studio: StudioSettings,
    media: MediaScreen,
    render: RenderJobController,
    picker: Box<dyn FilePicker>,
    auto_ran: bool,
    actions_registered: bool,
}

impl Session {
    pub fn new(studio: StudioSettings, media: MediaSettings, tuning: RenderTuning) -> Self {
        Self {
            studio,
            media: MediaScreen::new(media),
            render: RenderJobController::new(tuning),
            picker: Box::new(NoPicker),
            auto_ran: false,
            actions_registered: false,
        }
    }

    pub fn with_picker(mut self, picker: Box<dyn FilePicker>) -> Self {
        self.picker = picker;
        self
    }

    pub fn with_render_controller(mut self, render: RenderJobController) -> Self {
        self.render = render;
        self
    }

    pub fn render(&self) -> &RenderJobController {
        &self.render
    }

    pub fn media(&self) -> &MediaScreen {
        &self.media
    }

    pub fn layout(&self) -> StudioLayout {
        StudioLayout::news_studio(&self.studio)
    }

    /// Startup hook. Registers actions, then performs the auto-run once per
    /// process when the launch line asks for it.
    pub fn on_startup<H: EditorHost + ?Sized>(&mut self, host: &mut H) -> StartupOutcome {
        self.register_actions(host);

        let raw = host.command_line().unwrap_or_else(|err| {
            warn!(%err, "command line unavailable");
            String::new()
        });
        let request = LaunchRequest::parse(&raw);
        if !request.auto_render {
            return StartupOutcome::Idle;
        }
        if self.auto_ran {
            return StartupOutcome::AlreadyRan;
        }
        self.auto_ran = true;

        match self.auto_run(host, &request) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(%err, "auto-run failed");
                adapter::request_exit(host);
                StartupOutcome::Failed(err.to_string())
            }
        }
    }

    fn auto_run<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        request: &LaunchRequest,
    ) -> Result<StartupOutcome, SessionError> {
        match &request.script_override {
            Some(script) => {
                let path = if script.is_absolute() {
                    script.clone()
                } else {
                    host.project_dir().join(script)
                };
                if !path.is_file() {
                    return Err(SessionError::ScriptNotFound(path));
                }
                info!(script = %path.display(), "running startup script");
                host.run_script(&path).map_err(SessionError::Script)?;
                Ok(StartupOutcome::ScriptRan(path))
            }
            None => {
                self.render.launch(host, request)?;
                Ok(StartupOutcome::RenderLaunched)
            }
        }
    }

    /// Registers actions once per session. Returns how many were newly added.
    pub fn register_actions<H: EditorHost + ?Sized>(&mut self, host: &mut H) -> usize {
        if self.actions_registered {
            return 0;
        }
        self.actions_registered = true;
        register_missing(host)
    }

    pub fn rebuild_studio<H: EditorHost + ?Sized>(&self, host: &mut H) -> BuildReport {
        StudioBuilder::new(self.studio.tag.clone()).rebuild(host, &self.layout())
    }

    pub fn apply_screen_video<H: EditorHost + ?Sized>(
        &self,
        host: &mut H,
        video: Option<&Path>,
    ) -> Result<ScreenAssets, MediaError> {
        self.media.apply(host, video)
    }

    pub fn invoke_action<H: EditorHost + ?Sized>(
        &mut self,
        host: &mut H,
        name: &str,
    ) -> Result<ActionOutcome, SessionError> {
        match name {
            ACTION_REBUILD_STUDIO => Ok(ActionOutcome::Rebuilt(self.rebuild_studio(host))),
            ACTION_APPLY_SCREEN_VIDEO => {
                Ok(ActionOutcome::ScreenVideo(self.apply_screen_video(host, None)?))
            }
            ACTION_SELECT_SCREEN_VIDEO => {
                let start_dir = self
                    .media
                    .resolve_video(host, None)
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| host.project_dir());
                let video = self
                    .picker
                    .pick_video(&start_dir)
                    .ok_or(SessionError::NoSelection)?;
                Ok(ActionOutcome::ScreenVideo(
                    self.apply_screen_video(host, Some(&video))?,
                ))
            }
            ACTION_RELOAD => {
                let registered = register_missing(host);
                self.actions_registered = true;
                let build = self.rebuild_studio(host);
                Ok(ActionOutcome::Reloaded { registered, build })
            }
            other => Err(SessionError::UnknownAction(other.to_string())),
        }
    }
}

fn register_missing<H: EditorHost + ?Sized>(host: &mut H) -> usize {
    let mut registered = 0;
    for action in menu_actions() {
        if host.has_action(&action.name) {
            continue;
        }
        let name = action.name.clone();
        match host.register_action(action) {
            Ok(()) => registered += 1,
            Err(err) => warn!(action = %name, %err, "could not register action"),
        }
    }
    if registered > 0 {
        info!(registered, "registered editor actions");
    }
    registered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HeadlessHost;
    use crate::render::RenderPhase;
    use crate::studio::SCREEN_LABEL;
    use tempfile::TempDir;

    struct FixedPicker(Option<PathBuf>);

    impl FilePicker for FixedPicker {
        fn pick_video(&mut self, _start_dir: &Path) -> Option<PathBuf> {
            self.0.clone()
        }
    }

    fn session() -> Session {
        Session::new(
            StudioSettings::default(),
            MediaSettings::default(),
            RenderTuning::default(),
        )
    }

    #[test]
    fn test_idle_without_auto_render() {
        let dir = TempDir::new().unwrap();
        let mut host = HeadlessHost::new(dir.path());
        host.set_command_line("Studio.uproject -log");
        let mut session = session();
        assert_eq!(session.on_startup(&mut host), StartupOutcome::Idle);
        assert_eq!(host.actions().count(), 4);
        assert_eq!(host.exit_requests(), 0);
    }

    #[test]
    fn test_registration_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut host = HeadlessHost::new(dir.path());
        let mut session = session();
        assert_eq!(session.register_actions(&mut host), 4);
        assert_eq!(session.register_actions(&mut host), 0);

        // A fresh session in the same editor finds them already there.
        let mut reloaded = self::session();
        assert_eq!(reloaded.register_actions(&mut host), 0);
        assert_eq!(host.actions().count(), 4);
    }

    #[test]
    fn test_auto_render_runs_once() {
        let dir = TempDir::new().unwrap();
        let mut host = HeadlessHost::new(dir.path());
        host.set_command_line(format!(
            "-VirtuCastAutoRender=true -VirtuCastMap=/Game/Maps/Test1 \
             -VirtuCastSequence=/Game/Seq/Main -VirtuCastOut=\"{}\"",
            dir.path().join("out").display()
        ));
        let mut session = session();

        assert_eq!(session.on_startup(&mut host), StartupOutcome::RenderLaunched);
        assert_eq!(session.on_startup(&mut host), StartupOutcome::AlreadyRan);
        assert_eq!(host.jobs().count(), 1);

        host.run_until_exit(10).unwrap();
        assert_eq!(
            session.render().phase(),
            Some(RenderPhase::Finished { success: true })
        );
    }

    #[test]
    fn test_failed_auto_render_requests_exit() {
        let dir = TempDir::new().unwrap();
        let mut host = HeadlessHost::new(dir.path());
        host.set_command_line("-VirtuCastAutoRender=1 -VirtuCastMap=/Game/Maps/Test1");
        let mut session = session();

        let outcome = session.on_startup(&mut host);
        assert!(matches!(outcome, StartupOutcome::Failed(msg) if msg.contains("VirtuCastSequence")));
        assert_eq!(host.exit_requests(), 1);
        assert_eq!(host.jobs().count(), 0);
    }

    #[test]
    fn test_script_override_relative_to_project() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("Scripts")).unwrap();
        std::fs::write(dir.path().join("Scripts/custom.py"), "").unwrap();
        let mut host = HeadlessHost::new(dir.path());
        host.set_command_line("-VirtuCastAutoRender=yes -VirtuCastScript=Scripts/custom.py");
        let mut session = session();

        let expected = dir.path().join("Scripts/custom.py");
        assert_eq!(
            session.on_startup(&mut host),
            StartupOutcome::ScriptRan(expected.clone())
        );
        assert_eq!(host.scripts_run(), [expected]);
        assert_eq!(host.exit_requests(), 0);
    }

    #[test]
    fn test_missing_script_requests_exit() {
        let dir = TempDir::new().unwrap();
        let mut host = HeadlessHost::new(dir.path());
        host.set_command_line("-VirtuCastAutoRender=1 -VirtuCastScript=Scripts/missing.py");
        let mut session = session();
        let outcome = session.on_startup(&mut host);
        assert!(matches!(outcome, StartupOutcome::Failed(msg) if msg.contains("not found")));
        assert!(host.scripts_run().is_empty());
        assert_eq!(host.exit_requests(), 1);
    }

    #[test]
    fn test_failing_script_requests_exit() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("boom.py"), "").unwrap();
        let mut host = HeadlessHost::new(dir.path());
        host.fail_scripts();
        host.set_command_line("-VirtuCastAutoRender=1 -VirtuCastScript=boom.py");
        let mut session = session();
        assert!(matches!(session.on_startup(&mut host), StartupOutcome::Failed(_)));
        assert_eq!(host.exit_requests(), 1);
    }

    #[test]
    fn test_select_screen_video_uses_picker() {
        let dir = TempDir::new().unwrap();
        let clip = dir.path().join("clip.mp4");
        std::fs::write(&clip, b"video").unwrap();
        let mut host = HeadlessHost::with_engine_content(dir.path());
        let mut session = session().with_picker(Box::new(FixedPicker(Some(clip.clone()))));

        session.invoke_action(&mut host, ACTION_REBUILD_STUDIO).unwrap();
        let outcome = session
            .invoke_action(&mut host, ACTION_SELECT_SCREEN_VIDEO)
            .unwrap();
        assert!(matches!(outcome, ActionOutcome::ScreenVideo(_)));
        assert!(!host.actor_by_label(SCREEN_LABEL).unwrap().materials.is_empty());
        assert_eq!(session.media().resolve_video(&host, None), clip);
    }

    #[test]
    fn test_cancelled_picker() {
        let dir = TempDir::new().unwrap();
        let mut host = HeadlessHost::with_engine_content(dir.path());
        let mut session = session();
        let err = session
            .invoke_action(&mut host, ACTION_SELECT_SCREEN_VIDEO)
            .unwrap_err();
        assert!(matches!(err, SessionError::NoSelection));
    }

    #[test]
    fn test_reload_rebuilds() {
        let dir = TempDir::new().unwrap();
        let mut host = HeadlessHost::with_engine_content(dir.path());
        let mut session = session();
        session.invoke_action(&mut host, ACTION_REBUILD_STUDIO).unwrap();
        let count = host.actor_count();

        let ActionOutcome::Reloaded { registered, build } =
            session.invoke_action(&mut host, ACTION_RELOAD).unwrap()
        else {
            panic!("expected reload outcome");
        };
        assert_eq!(registered, 4);
        assert_eq!(build.removed, count);
        assert_eq!(host.actor_count(), count);
    }

    #[test]
    fn test_unknown_action() {
        let dir = TempDir::new().unwrap();
        let mut host = HeadlessHost::new(dir.path());
        let err = session().invoke_action(&mut host, "virtucast.nope").unwrap_err();
        assert!(matches!(err, SessionError::UnknownAction(name) if name == "virtucast.nope"));
    }
}
