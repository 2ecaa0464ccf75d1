//! Binds an external video file to the studio screen through a chain of
//! media assets: file source, player, texture and an unlit material that
//! feeds the texture into the emissive output.

mod state;

pub use state::LastVideoStore;

use crate::error::MediaError;
use crate::host::{adapter, AssetClass, AssetHandle, EditorHost, MaterialRef, ObjectRef, PropertyValue};
use crate::studio::SCREEN_LABEL;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub const MEDIA_SOURCE_NAME: &str = "VC_ScreenMediaSource";
pub const MEDIA_PLAYER_NAME: &str = "VC_ScreenMediaPlayer";
pub const MEDIA_TEXTURE_NAME: &str = "VC_ScreenMediaTexture";
pub const SCREEN_MATERIAL_NAME: &str = "M_VC_ScreenVideo";

#[derive(Debug, Clone, PartialEq)]
pub struct MediaSettings {
    /// Content folder the media assets live in.
    pub package_path: String,
    /// Fallback video, relative to the project content directory.
    pub default_video: PathBuf,
    /// Last-video side file, relative to the project directory.
    pub state_file: PathBuf,
    pub autoplay: bool,
    pub looping: bool,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            package_path: "/Game/VirtuCast/Media".to_string(),
            default_video: PathBuf::from("Movies/screen.mp4"),
            state_file: PathBuf::from("Saved/VirtuCast/last_screen_video.txt"),
            autoplay: true,
            looping: true,
        }
    }
}

/// One request to put a video on a screen actor.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaScreenBinding {
    pub video: PathBuf,
    pub screen_label: String,
    pub autoplay: bool,
    pub looping: bool,
}

/// The asset chain backing the screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenAssets {
    pub source: AssetHandle,
    pub player: AssetHandle,
    pub texture: AssetHandle,
    pub material: AssetHandle,
}

/// Screen video front end: picks the video, applies it and remembers the choice.
#[derive(Debug, Clone)]
pub struct MediaScreen {
    settings: MediaSettings,
}

impl MediaScreen {
    pub fn new(settings: MediaSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MediaSettings {
        &self.settings
    }

    pub fn store<H: EditorHost + ?Sized>(&self, host: &H) -> LastVideoStore {
        LastVideoStore::new(host.project_dir().join(&self.settings.state_file))
    }

    /// Explicit path, else the last applied one, else the default under the content directory.
    /// Relative paths resolve against the project directory.
    pub fn resolve_video<H: EditorHost + ?Sized>(&self, host: &H, explicit: Option<&Path>) -> PathBuf {
        let project_dir = host.project_dir();
        let chosen = match explicit {
            Some(path) => path.to_path_buf(),
            None => match self.store(host).load() {
                Some(last) => last,
                None => host
                    .content_dir()
                    .unwrap_or_else(|_| project_dir.join("Content"))
                    .join(&self.settings.default_video),
            },
        };
        if chosen.is_absolute() {
            chosen
        } else {
            project_dir.join(chosen)
        }
    }

    pub fn binding_for(&self, video: PathBuf) -> MediaScreenBinding {
        MediaScreenBinding {
            video,
            screen_label: SCREEN_LABEL.to_string(),
            autoplay: self.settings.autoplay,
            looping: self.settings.looping,
        }
    }

    /// Applies the resolved video to the studio screen and persists the choice on success.
    pub fn apply<H: EditorHost + ?Sized>(
        &self,
        host: &mut H,
        explicit: Option<&Path>,
    ) -> Result<ScreenAssets, MediaError> {
        let binding = self.binding_for(self.resolve_video(host, explicit));
        let assets = apply_screen_video(host, &binding, &self.settings.package_path)?;

        let store = self.store(host);
        if let Err(err) = store.save(&binding.video) {
            warn!(path = %store.path().display(), %err, "could not remember screen video");
        }
        Ok(assets)
    }
}

fn ensure_directory<H: EditorHost + ?Sized>(host: &mut H, package_path: &str) {
    if let Ok(true) = host.does_directory_exist(package_path) {
        return;
    }
    if let Err(err) = host.make_directory(package_path) {
        debug!(package_path, %err, "could not create media package directory");
    }
}

/// Loads `package_path/name` when it exists, otherwise creates it.
fn load_or_create<H: EditorHost + ?Sized>(
    host: &mut H,
    name: &str,
    package_path: &str,
    class: AssetClass,
) -> Option<AssetHandle> {
    let asset_path = format!("{}/{}", package_path.trim_end_matches('/'), name);
    if let Ok(true) = host.does_asset_exist(&asset_path) {
        if let Some(asset) = adapter::load_asset(host, &asset_path) {
            return Some(asset);
        }
    }
    match host.create_asset(name, package_path, class) {
        Ok(asset) => Some(asset),
        Err(err) => {
            warn!(asset = %asset_path, %err, "failed to create asset");
            None
        }
    }
}

fn save_best_effort<H: EditorHost + ?Sized>(host: &mut H, asset: &AssetHandle) {
    if let Err(err) = host.save_asset(asset) {
        warn!(asset = asset.path(), %err, "could not save asset");
    }
}

/// Unlit material whose emissive output samples the media texture.
fn build_screen_material<H: EditorHost + ?Sized>(
    host: &mut H,
    package_path: &str,
    texture: &AssetHandle,
) -> Option<AssetHandle> {
    ensure_directory(host, package_path);
    let material = load_or_create(host, SCREEN_MATERIAL_NAME, package_path, AssetClass::Material)?;

    adapter::try_set(
        host,
        &ObjectRef::Asset(material.clone()),
        "shading_model",
        PropertyValue::Text("MSM_Unlit".to_string()),
    );
    if let Err(err) = host.clear_expressions(&material) {
        debug!(%err, "could not clear screen material graph");
    }

    match host.create_texture_sample(&material, -400, 0) {
        Ok(sample) => {
            adapter::try_set(
                host,
                &ObjectRef::Expression(sample),
                "texture",
                PropertyValue::Asset(texture.clone()),
            );
            if let Err(err) = host.connect_emissive(sample, "RGB") {
                warn!(%err, "failed to build material graph");
            }
        }
        Err(err) => warn!(%err, "failed to build material graph"),
    }

    if let Err(err) = host.recompile_material(&material) {
        warn!(%err, "could not recompile screen material");
    }
    save_best_effort(host, &material);
    Some(material)
}

/// Creates or reuses the media chain and puts it on the screen actor.
///
/// The video must exist before anything is touched. Each stage depends on the
/// one before, so any creation failure aborts the whole operation.
pub fn apply_screen_video<H: EditorHost + ?Sized>(
    host: &mut H,
    binding: &MediaScreenBinding,
    package_path: &str,
) -> Result<ScreenAssets, MediaError> {
    if !binding.video.is_file() {
        error!(video = %binding.video.display(), "video not found");
        info!("put a file at Content/Movies/screen.mp4 or pass an explicit path");
        return Err(MediaError::VideoNotFound(binding.video.clone()));
    }

    ensure_directory(host, package_path);
    let source = load_or_create(host, MEDIA_SOURCE_NAME, package_path, AssetClass::FileMediaSource);
    let player = load_or_create(host, MEDIA_PLAYER_NAME, package_path, AssetClass::MediaPlayer);
    let texture = load_or_create(host, MEDIA_TEXTURE_NAME, package_path, AssetClass::MediaTexture);
    let (Some(source), Some(player), Some(texture)) = (source, player, texture) else {
        error!(package_path, "failed to create or load media assets");
        return Err(MediaError::AssetCreation(package_path.to_string()));
    };

    adapter::try_set(
        host,
        &ObjectRef::Asset(source.clone()),
        "file_path",
        PropertyValue::Path(binding.video.clone()),
    );
    save_best_effort(host, &source);

    adapter::try_set(
        host,
        &ObjectRef::Asset(texture.clone()),
        "media_player",
        PropertyValue::Asset(player.clone()),
    );
    save_best_effort(host, &texture);

    let Some(material) = build_screen_material(host, package_path, &texture) else {
        error!("failed to create screen video material");
        return Err(MediaError::MaterialCreation(format!(
            "{package_path}/{SCREEN_MATERIAL_NAME}"
        )));
    };

    let Some(screen) = adapter::find_actor_by_label(host, &binding.screen_label) else {
        error!(label = %binding.screen_label, "screen actor not found, build the studio first");
        return Err(MediaError::ScreenMissing(binding.screen_label.clone()));
    };
    if !adapter::has_mesh_component(host, screen) {
        error!(label = %binding.screen_label, "screen has no static mesh component");
        return Err(MediaError::NoMeshComponent(binding.screen_label.clone()));
    }
    if let Err(err) = host.set_material(screen, 0, &MaterialRef::Asset(material.clone())) {
        warn!(%err, "failed to set material on screen");
    }

    if let Err(err) = host.set_looping(&player, binding.looping) {
        debug!(%err, "media player looping not settable");
    }
    match host.open_source(&player, &source) {
        Ok(opened) => info!(opened, "media source opened"),
        Err(err) => warn!(%err, "failed to open media source"),
    }
    if binding.autoplay {
        if let Err(err) = host.play(&player) {
            warn!(%err, "failed to play media");
        }
    }

    info!(video = %binding.video.display(), screen = %binding.screen_label, "screen video applied");
    Ok(ScreenAssets {
        source,
        player,
        texture,
        material,
    })
}
