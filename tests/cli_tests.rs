use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn virtucast() -> Command {
    Command::new(env!("CARGO_BIN_EXE_virtucast"))
}

#[test]
fn test_cli_help() {
    virtucast()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Virtual news studio builder"));
}

#[test]
fn test_cli_layout_prints_catalogue() {
    virtucast()
        .arg("layout")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"label\": \"VC_Screen\""))
        .stdout(predicate::str::contains("VC_KeyLight"));
}

#[test]
fn test_cli_studio_summary() {
    let project = TempDir::new().unwrap();
    virtucast()
        .arg("studio")
        .arg("--project")
        .arg(project.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Elements:"))
        .stdout(predicate::str::contains("Cameras: 3"))
        .stdout(predicate::str::contains("Skipped: VC_Anchor"));
}

#[test]
fn test_cli_studio_json_manifest() {
    virtucast()
        .arg("studio")
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"VirtuCastStudio\""))
        .stdout(predicate::str::contains("\"material_instances\""));
}

#[test]
fn test_cli_studio_custom_layout() {
    let dir = TempDir::new().unwrap();
    let layout = dir.path().join("booth.toml");
    fs::write(
        &layout,
        r#"
[[elements]]
label = "Booth_Floor"
mesh = "/Engine/BasicShapes/Plane.Plane"
location = { x = 0.0, y = 0.0, z = 0.0 }
scale = { x = 4.0, y = 4.0, z = 1.0 }
"#,
    )
    .unwrap();

    virtucast()
        .arg("studio")
        .arg("--layout")
        .arg(&layout)
        .assert()
        .success()
        .stdout(predicate::str::contains("'Booth_Floor'"))
        .stdout(predicate::str::contains("Spawned: 1"));
}

#[test]
fn test_cli_studio_rejects_invalid_layout() {
    let dir = TempDir::new().unwrap();
    let layout = dir.path().join("empty.json");
    fs::write(&layout, r#"{"elements": []}"#).unwrap();

    virtucast()
        .arg("studio")
        .arg("--layout")
        .arg(&layout)
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one element"));
}

#[test]
fn test_cli_render_runs_to_exit() {
    let project = TempDir::new().unwrap();
    let out = project.path().join("renders");
    let cmdline = format!(
        "-VirtuCastAutoRender=1 -VirtuCastMap=/Script/Engine.World'/Game/Maps/Test1.Test1' \
         -VirtuCastSequence=/Game/Seq/Main.Main -VirtuCastOut=\"{}\" \
         -VirtuCastRes=1280x720 -VirtuCastFps=24",
        out.display()
    );

    virtucast()
        .arg("render")
        .arg("--project")
        .arg(project.path())
        .arg("--cmdline")
        .arg(&cmdline)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"map_package\": \"/Game/Maps/Test1\""))
        .stdout(predicate::str::contains("1280"))
        .stdout(predicate::str::contains("\"fps\": 24"))
        .stdout(predicate::str::contains("finished"))
        .stdout(predicate::str::contains("Exit requested after 3 ticks"));

    assert!(out.is_dir());
}

#[test]
fn test_cli_render_missing_arguments() {
    virtucast()
        .arg("render")
        .arg("--cmdline")
        .arg("-VirtuCastAutoRender=1 -VirtuCastMap=/Game/Maps/Test1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required arguments"));
}

#[test]
fn test_cli_render_without_flag_is_idle() {
    virtucast()
        .arg("render")
        .arg("--cmdline")
        .arg("Studio.uproject -log")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to do"));
}

#[test]
fn test_cli_screen_binds_video() {
    let project = TempDir::new().unwrap();
    let video = project.path().join("clip.mp4");
    fs::write(&video, b"frames").unwrap();

    virtucast()
        .arg("screen")
        .arg("--project")
        .arg(project.path())
        .arg("--video")
        .arg(&video)
        .assert()
        .success()
        .stdout(predicate::str::contains("M_VC_ScreenVideo"));

    let state = project.path().join("Saved/VirtuCast/last_screen_video.txt");
    assert!(fs::read_to_string(state).unwrap().contains("clip.mp4"));
}

#[test]
fn test_cli_screen_missing_video() {
    let project = TempDir::new().unwrap();
    virtucast()
        .arg("screen")
        .arg("--project")
        .arg(project.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("video not found"));
}
