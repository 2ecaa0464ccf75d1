//! Capability traits over the editor process that hosts the core.
//!
//! Each trait groups one concern of the host's object model. Every call may
//! fail with [`HostError::Unsupported`] when the running host version lacks
//! the API; the [`adapter`] module owns the fallback chains so the studio,
//! media and render code never probe the host themselves.

pub mod adapter;
pub mod headless;

use crate::error::HostResult;
use crate::math::{LinearColor, Rotator, Vec3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use headless::HeadlessHost;

/// Level actor identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u64);

/// Loaded asset, addressed by its package path (`/Game/Dir/Name`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetHandle(pub String);

impl AssetHandle {
    pub fn path(&self) -> &str {
        &self.0
    }
}

/// A material applied to a mesh slot: a material asset or a dynamic instance of one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialRef {
    Asset(AssetHandle),
    Instance(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExpressionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExecutorId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TickHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightClass {
    RectLight,
    SpotLight,
    PointLight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraClass {
    CineCamera,
    Camera,
}

/// Spawnable actor classes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorClass {
    StaticMesh,
    Light(LightClass),
    Camera(CameraClass),
    /// Class generated from a blueprint asset.
    Blueprint(String),
}

/// Asset classes the core creates through the host's asset tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    FileMediaSource,
    MediaPlayer,
    MediaTexture,
    Material,
}

/// Target of a generic property write.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectRef {
    Actor(ActorId),
    MeshComponent(ActorId),
    Asset(AssetHandle),
    Expression(ExpressionId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    Bool(bool),
    Float(f32),
    Text(String),
    TextList(Vec<String>),
    Path(PathBuf),
    Asset(AssetHandle),
    Vector(Vec3),
    IntPoint(u32, u32),
    FrameRate { numerator: u32, denominator: u32 },
}

/// Settings blocks a render job configuration can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineSetting {
    Output,
    DeferredPassBase,
    DeferredPass,
    PngSequence,
}

impl PipelineSetting {
    pub fn is_render_pass(self) -> bool {
        matches!(self, Self::DeferredPassBase | Self::DeferredPass)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutorKind {
    /// Runs the job inside the editor process (play-in-editor).
    InProcess,
    /// Spawns a separate render process.
    OutOfProcess,
}

/// Named editor action registered into the host's menus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuAction {
    pub name: String,
    pub label: String,
    pub section: String,
    pub tooltip: String,
}

/// Whether a post-tick callback stays registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Unregister,
}

pub type TickCallback = Box<dyn FnMut(&mut dyn ProcessControl) -> TickControl>;
pub type FinishCallback = Box<dyn FnMut(bool)>;

pub trait AssetTools {
    fn load_asset(&self, path: &str) -> HostResult<Option<AssetHandle>>;
    /// Lower-level object lookup, used when `load_asset` is unavailable.
    fn load_object(&self, path: &str) -> HostResult<Option<AssetHandle>>;
    fn does_asset_exist(&self, path: &str) -> HostResult<bool>;
    fn does_directory_exist(&self, path: &str) -> HostResult<bool>;
    fn make_directory(&mut self, path: &str) -> HostResult<()>;
    fn create_asset(
        &mut self,
        name: &str,
        package_path: &str,
        class: AssetClass,
    ) -> HostResult<AssetHandle>;
    fn save_asset(&mut self, asset: &AssetHandle) -> HostResult<()>;
    fn generated_class(&self, blueprint: &AssetHandle) -> HostResult<Option<String>>;
}

pub trait PropertyAccess {
    /// Reflected editor property write.
    fn set_editor_property(
        &mut self,
        target: &ObjectRef,
        name: &str,
        value: PropertyValue,
    ) -> HostResult<()>;
    /// Plain attribute write, the generic mechanism behind editor properties.
    fn set_attribute(&mut self, target: &ObjectRef, name: &str, value: PropertyValue)
        -> HostResult<()>;
}

pub trait LevelEditor {
    fn all_level_actors(&self) -> HostResult<Vec<ActorId>>;
    fn actor_label(&self, actor: ActorId) -> HostResult<String>;
    fn set_actor_label(&mut self, actor: ActorId, label: &str) -> HostResult<()>;
    fn actor_tags(&self, actor: ActorId) -> HostResult<Vec<String>>;
    fn set_actor_tags(&mut self, actor: ActorId, tags: Vec<String>) -> HostResult<()>;
    fn is_class_available(&self, class: &ActorClass) -> bool;
    fn spawn_actor(
        &mut self,
        class: &ActorClass,
        location: Vec3,
        rotation: Rotator,
    ) -> HostResult<ActorId>;
    fn destroy_actors(&mut self, actors: &[ActorId]) -> HostResult<()>;
    fn destroy_actor(&mut self, actor: ActorId) -> HostResult<()>;
    /// Direct accessor for the actor's static mesh component.
    fn has_static_mesh_component(&self, actor: ActorId) -> HostResult<bool>;
    /// Component search by class, used when the direct accessor is missing.
    fn find_static_mesh_component(&self, actor: ActorId) -> HostResult<bool>;
    fn set_static_mesh(&mut self, actor: ActorId, mesh: &AssetHandle) -> HostResult<()>;
    fn set_world_scale(&mut self, actor: ActorId, scale: Vec3) -> HostResult<()>;
    fn set_actor_scale(&mut self, actor: ActorId, scale: Vec3) -> HostResult<()>;
    fn set_material(&mut self, actor: ActorId, slot: usize, material: &MaterialRef)
        -> HostResult<()>;
}

pub trait MaterialEditing {
    fn create_material_instance(
        &mut self,
        parent: &AssetHandle,
        outer: ActorId,
    ) -> HostResult<MaterialRef>;
    fn set_vector_parameter(
        &mut self,
        material: &MaterialRef,
        name: &str,
        value: LinearColor,
    ) -> HostResult<()>;
    fn set_scalar_parameter(&mut self, material: &MaterialRef, name: &str, value: f32)
        -> HostResult<()>;
    fn clear_expressions(&mut self, material: &AssetHandle) -> HostResult<()>;
    fn create_texture_sample(
        &mut self,
        material: &AssetHandle,
        x: i32,
        y: i32,
    ) -> HostResult<ExpressionId>;
    fn connect_emissive(&mut self, expression: ExpressionId, output: &str) -> HostResult<()>;
    fn recompile_material(&mut self, material: &AssetHandle) -> HostResult<()>;
}

pub trait MediaPlayback {
    fn set_looping(&mut self, player: &AssetHandle, looping: bool) -> HostResult<()>;
    fn open_source(&mut self, player: &AssetHandle, source: &AssetHandle) -> HostResult<bool>;
    fn play(&mut self, player: &AssetHandle) -> HostResult<()>;
}

pub trait MoviePipeline {
    /// Synchronous map load through the editor's loading utilities.
    fn load_map(&mut self, package: &str) -> HostResult<()>;
    /// Older level-library entry point for the same operation.
    fn load_level(&mut self, package: &str) -> HostResult<()>;
    fn delete_all_jobs(&mut self) -> HostResult<()>;
    fn allocate_job(&mut self) -> HostResult<JobId>;
    fn set_job_map(&mut self, job: JobId, object_path: &str) -> HostResult<()>;
    fn set_job_sequence(&mut self, job: JobId, object_path: &str) -> HostResult<()>;
    fn has_setting_class(&self, setting: PipelineSetting) -> bool;
    fn find_or_add_setting(&mut self, job: JobId, setting: PipelineSetting) -> HostResult<()>;
    fn has_output_property(&self, job: JobId, name: &str) -> bool;
    fn set_output_property(&mut self, job: JobId, name: &str, value: PropertyValue)
        -> HostResult<()>;
    fn create_executor(&mut self, kind: ExecutorKind) -> HostResult<ExecutorId>;
    fn on_executor_finished(
        &mut self,
        executor: ExecutorId,
        callback: FinishCallback,
    ) -> HostResult<()>;
    fn render_queue_with_executor(&mut self, executor: ExecutorId) -> HostResult<()>;
}

pub trait TickScheduler {
    fn register_post_tick(&mut self, callback: TickCallback) -> HostResult<TickHandle>;
    fn unregister_post_tick(&mut self, handle: TickHandle) -> HostResult<()>;
}

pub trait ProcessControl {
    fn quit_editor(&mut self) -> HostResult<()>;
    fn execute_console_command(&mut self, command: &str) -> HostResult<()>;
}

pub trait ActionRegistry {
    fn has_action(&self, name: &str) -> bool;
    fn register_action(&mut self, action: MenuAction) -> HostResult<()>;
}

pub trait ScriptRunner {
    fn run_script(&mut self, path: &Path) -> HostResult<()>;
}

/// Everything the core needs from the editor process.
pub trait EditorHost:
    AssetTools
    + PropertyAccess
    + LevelEditor
    + MaterialEditing
    + MediaPlayback
    + MoviePipeline
    + TickScheduler
    + ProcessControl
    + ActionRegistry
    + ScriptRunner
{
    /// Raw command line the editor was launched with.
    fn command_line(&self) -> HostResult<String>;
    fn project_dir(&self) -> PathBuf;
    fn content_dir(&self) -> HostResult<PathBuf>;
}
