use std::fs;
use tempfile::TempDir;
use virtucast::host::{PipelineSetting, PropertyValue};
use virtucast::render::RenderPhase;
use virtucast::session::ACTION_APPLY_SCREEN_VIDEO;
use virtucast::studio::SCREEN_LABEL;
use virtucast::{
    HeadlessHost, MediaSettings, RenderTuning, Session, StartupOutcome, StudioSettings,
};

fn session() -> Session {
    Session::new(
        StudioSettings::default(),
        MediaSettings::default(),
        RenderTuning::default(),
    )
}

#[test]
fn startup_render_exits_once() {
    let project = TempDir::new().unwrap();
    let out = project.path().join("Saved/Renders/take1");
    let mut host = HeadlessHost::with_engine_content(project.path());
    host.set_frames_per_render(5);
    host.set_command_line(format!(
        "Studio.uproject -game -VirtuCastAutoRender=1 \
         -VirtuCastMap=/Script/Engine.World'/Game/Maps/Studio.Studio' \
         -VirtuCastSequence=/Game/Cinematics/Intro.Intro \
         -VirtuCastOut=\"{}\" -VirtuCastRes=1280x720 -VirtuCastFps=24",
        out.display()
    ));

    let mut session = session();
    assert_eq!(session.on_startup(&mut host), StartupOutcome::RenderLaunched);
    assert!(out.is_dir());
    assert_eq!(host.loaded_map(), Some("/Game/Maps/Studio"));

    let ticks = host.run_until_exit(1_000).expect("render should request exit");
    assert_eq!(ticks, 5);

    // Further ticks must not request exit again.
    for _ in 0..10 {
        host.tick();
    }
    assert_eq!(host.exit_requests(), 1);
    assert_eq!(
        session.render().phase(),
        Some(RenderPhase::Finished { success: true })
    );

    let job = host.job(session.render().job().unwrap()).unwrap();
    assert_eq!(job.sequence.as_deref(), Some("/Game/Cinematics/Intro.Intro"));
    assert!(job.settings.contains(&PipelineSetting::PngSequence));
    assert!(job.settings.contains(&PipelineSetting::DeferredPassBase));
    assert_eq!(
        job.output.get("output_resolution"),
        Some(&PropertyValue::IntPoint(1280, 720))
    );
}

#[test]
fn failed_render_still_exits() {
    let project = TempDir::new().unwrap();
    let mut host = HeadlessHost::with_engine_content(project.path());
    host.fail_renders();
    host.set_command_line(format!(
        "-VirtuCastAutoRender=on -VirtuCastMap=/Game/Maps/Studio \
         -VirtuCastSequence=/Game/Cinematics/Intro -VirtuCastOut=\"{}\"",
        project.path().join("out").display()
    ));

    let mut session = session();
    assert_eq!(session.on_startup(&mut host), StartupOutcome::RenderLaunched);
    assert!(host.run_until_exit(100).is_some());
    assert_eq!(
        session.render().phase(),
        Some(RenderPhase::Finished { success: false })
    );
    assert_eq!(host.exit_requests(), 1);
}

#[test]
fn studio_then_screen_video_from_saved_state() {
    let project = TempDir::new().unwrap();
    let clip = project.path().join("Footage/clip.mp4");
    fs::create_dir_all(clip.parent().unwrap()).unwrap();
    fs::write(&clip, b"frames").unwrap();

    let mut host = HeadlessHost::with_engine_content(project.path());
    let mut session = session();
    assert_eq!(session.on_startup(&mut host), StartupOutcome::Idle);

    let report = session.rebuild_studio(&mut host);
    assert!(report.spawned.contains(&SCREEN_LABEL.to_string()));
    assert!(host.actor_by_label(SCREEN_LABEL).is_some());

    session.apply_screen_video(&mut host, Some(&clip)).unwrap();

    // A fresh session in the same project picks the saved video back up.
    let mut next = self::session();
    next.invoke_action(&mut host, ACTION_APPLY_SCREEN_VIDEO).unwrap();
    assert_eq!(next.media().resolve_video(&host, None), clip);

    let screens: Vec<_> = host
        .actors()
        .filter(|(_, actor)| actor.label == SCREEN_LABEL)
        .collect();
    assert_eq!(screens.len(), 1);
}
