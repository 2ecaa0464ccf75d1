//! In-process host that keeps the whole editor state in memory.
//!
//! Used by the command-line harness to preview studio builds and render
//! flows, and by the test suite. Individual APIs and classes can be switched
//! off to reproduce older or stripped-down host versions.

use super::{
    ActionRegistry, ActorClass, ActorId, AssetClass, AssetHandle, AssetTools, EditorHost,
    ExecutorId, ExecutorKind, ExpressionId, FinishCallback, JobId, LevelEditor, MaterialEditing,
    MaterialRef, MediaPlayback, MenuAction, MoviePipeline, ObjectRef, PipelineSetting,
    ProcessControl, PropertyAccess, PropertyValue, ScriptRunner, TickCallback, TickControl,
    TickHandle, TickScheduler,
};
use crate::error::{HostError, HostResult};
use crate::host::adapter::QUIT_COMMAND;
use crate::math::{LinearColor, Rotator, Vec3};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Output properties exposed by current render output settings.
const OUTPUT_PROPERTIES: &[&str] = &[
    "output_directory",
    "output_resolution",
    "file_name_format",
    "override_existing_output",
    "use_custom_frame_rate",
    "custom_frame_rate",
];

/// Output properties on hosts that predate the custom frame rate override.
const LEGACY_OUTPUT_PROPERTIES: &[&str] = &[
    "output_directory",
    "output_resolution",
    "file_name_format",
    "override_existing_output",
    "output_frame_rate",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    StaticMesh,
    Material,
    Blueprint,
    FileMediaSource,
    MediaPlayer,
    MediaTexture,
}

impl From<AssetClass> for AssetKind {
    fn from(class: AssetClass) -> Self {
        match class {
            AssetClass::FileMediaSource => Self::FileMediaSource,
            AssetClass::MediaPlayer => Self::MediaPlayer,
            AssetClass::MediaTexture => Self::MediaTexture,
            AssetClass::Material => Self::Material,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HeadlessAsset {
    pub kind: AssetKind,
    pub properties: BTreeMap<String, PropertyValue>,
    /// Parameter names a material exposes to dynamic instances.
    pub parameters: Vec<String>,
    pub generated_class: Option<String>,
    pub save_count: u32,
}

impl HeadlessAsset {
    fn new(kind: AssetKind) -> Self {
        Self {
            kind,
            properties: BTreeMap::new(),
            parameters: Vec::new(),
            generated_class: None,
            save_count: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HeadlessActor {
    pub class: ActorClass,
    pub label: String,
    pub tags: Vec<String>,
    pub location: Vec3,
    pub rotation: Rotator,
    pub scale: Vec3,
    pub mesh: Option<String>,
    pub materials: BTreeMap<usize, MaterialRef>,
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(skip)]
    has_mesh_component: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaterialInstance {
    pub parent: String,
    pub outer: ActorId,
    pub vectors: BTreeMap<String, LinearColor>,
    pub scalars: BTreeMap<String, f32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MaterialGraph {
    pub expressions: Vec<ExpressionId>,
    pub emissive: Option<(ExpressionId, String)>,
    pub compile_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Expression {
    pub material: String,
    pub position: (i32, i32),
    pub properties: BTreeMap<String, PropertyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerState {
    pub looping: bool,
    pub opened: Option<String>,
    pub playing: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderJob {
    pub map: Option<String>,
    pub sequence: Option<String>,
    pub settings: BTreeSet<PipelineSetting>,
    pub output: BTreeMap<String, PropertyValue>,
    pub frames_written: u32,
}

impl RenderJob {
    fn has_render_pass(&self) -> bool {
        self.settings.iter().any(|s| s.is_render_pass())
    }
}

struct Executor {
    kind: ExecutorKind,
    callbacks: Vec<FinishCallback>,
}

struct ActiveRender {
    executor: ExecutorId,
    frames_done: u32,
}

/// Exit and console state, kept apart so tick callbacks can borrow it alone.
#[derive(Debug, Default)]
pub struct HeadlessProcess {
    quit_unavailable: bool,
    console_unavailable: bool,
    exit_requests: u32,
    console: Vec<String>,
}

impl ProcessControl for HeadlessProcess {
    fn quit_editor(&mut self) -> HostResult<()> {
        if self.quit_unavailable {
            return Err(HostError::unsupported("quit_editor"));
        }
        self.exit_requests += 1;
        Ok(())
    }

    fn execute_console_command(&mut self, command: &str) -> HostResult<()> {
        if self.console_unavailable {
            return Err(HostError::unsupported("execute_console_command"));
        }
        self.console.push(command.to_string());
        if command == QUIT_COMMAND {
            self.exit_requests += 1;
        }
        Ok(())
    }
}

struct TickSlot {
    handle: TickHandle,
    callback: Option<TickCallback>,
}

pub struct HeadlessHost {
    command_line: String,
    project_dir: PathBuf,
    disabled: BTreeSet<String>,
    missing_classes: BTreeSet<ActorClass>,
    failing_assets: BTreeSet<AssetClass>,
    assets: BTreeMap<String, HeadlessAsset>,
    directories: BTreeSet<String>,
    actors: BTreeMap<ActorId, HeadlessActor>,
    instances: BTreeMap<u64, MaterialInstance>,
    graphs: BTreeMap<String, MaterialGraph>,
    expressions: BTreeMap<ExpressionId, Expression>,
    players: BTreeMap<String, PlayerState>,
    loaded_map: Option<String>,
    jobs: Vec<(JobId, RenderJob)>,
    executors: BTreeMap<ExecutorId, Executor>,
    active_render: Option<ActiveRender>,
    frames_per_render: u32,
    fail_renders: bool,
    available_settings: BTreeSet<PipelineSetting>,
    legacy_frame_rate: bool,
    ticks: Vec<TickSlot>,
    tick_count: u64,
    process: HeadlessProcess,
    actions: BTreeMap<String, MenuAction>,
    scripts: Vec<PathBuf>,
    fail_scripts: bool,
    next_id: u64,
}

impl HeadlessHost {
    /// Empty host with no content.
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            command_line: String::new(),
            project_dir: project_dir.into(),
            disabled: BTreeSet::new(),
            missing_classes: BTreeSet::new(),
            failing_assets: BTreeSet::new(),
            assets: BTreeMap::new(),
            directories: BTreeSet::new(),
            actors: BTreeMap::new(),
            instances: BTreeMap::new(),
            graphs: BTreeMap::new(),
            expressions: BTreeMap::new(),
            players: BTreeMap::new(),
            loaded_map: None,
            jobs: Vec::new(),
            executors: BTreeMap::new(),
            active_render: None,
            frames_per_render: 3,
            fail_renders: false,
            available_settings: [
                PipelineSetting::Output,
                PipelineSetting::DeferredPassBase,
                PipelineSetting::DeferredPass,
                PipelineSetting::PngSequence,
            ]
            .into_iter()
            .collect(),
            legacy_frame_rate: false,
            ticks: Vec::new(),
            tick_count: 0,
            process: HeadlessProcess::default(),
            actions: BTreeMap::new(),
            scripts: Vec::new(),
            fail_scripts: false,
            next_id: 1,
        }
    }

    /// Host seeded with the engine's basic shapes and stock materials.
    pub fn with_engine_content(project_dir: impl Into<PathBuf>) -> Self {
        let mut host = Self::new(project_dir);
        for shape in ["Plane", "Cube", "Cylinder", "Sphere"] {
            host.add_mesh(&format!("/Engine/BasicShapes/{shape}"));
        }
        host.add_material("/Engine/BasicShapes/BasicShapeMaterial", &["Color"]);
        host.add_material("/Engine/EngineMaterials/DefaultMaterial", &[]);
        host.add_material("/Engine/EngineMaterials/EmissiveMeshMaterial", &["Color"]);
        host
    }

    pub fn set_command_line(&mut self, raw: impl Into<String>) {
        self.command_line = raw.into();
    }

    /// Makes an API behave as if the host version did not expose it.
    pub fn disable_api(&mut self, api: &str) {
        match api {
            "quit_editor" => self.process.quit_unavailable = true,
            "execute_console_command" => self.process.console_unavailable = true,
            _ => {
                self.disabled.insert(api.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, class: ActorClass) {
        self.missing_classes.insert(class);
    }

    pub fn fail_asset_creation(&mut self, class: AssetClass) {
        self.failing_assets.insert(class);
    }

    pub fn remove_setting_class(&mut self, setting: PipelineSetting) {
        self.available_settings.remove(&setting);
    }

    /// Switches render output settings to the older frame rate property.
    pub fn use_legacy_frame_rate(&mut self) {
        self.legacy_frame_rate = true;
    }

    pub fn set_frames_per_render(&mut self, frames: u32) {
        self.frames_per_render = frames;
    }

    /// Makes every render finish with a false success flag.
    pub fn fail_renders(&mut self) {
        self.fail_renders = true;
    }

    pub fn fail_scripts(&mut self) {
        self.fail_scripts = true;
    }

    pub fn add_mesh(&mut self, path: &str) {
        self.assets
            .insert(canonical(path), HeadlessAsset::new(AssetKind::StaticMesh));
    }

    pub fn add_material(&mut self, path: &str, parameters: &[&str]) {
        let mut asset = HeadlessAsset::new(AssetKind::Material);
        asset.parameters = parameters.iter().map(|p| p.to_string()).collect();
        self.assets.insert(canonical(path), asset);
    }

    pub fn add_blueprint(&mut self, path: &str, generated_class: Option<&str>) {
        let mut asset = HeadlessAsset::new(AssetKind::Blueprint);
        asset.generated_class = generated_class.map(str::to_string);
        self.assets.insert(canonical(path), asset);
    }

    /// Spawns an actor the way a user would, outside the core.
    pub fn add_user_actor(&mut self, label: &str) -> ActorId {
        let id = self.insert_actor(ActorClass::StaticMesh, Vec3::default(), Rotator::default());
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.label = label.to_string();
        }
        id
    }

    /// Advances the render subsystem by one frame, then runs post-tick callbacks.
    pub fn tick(&mut self) {
        self.tick_count += 1;
        self.advance_render();

        let mut slots = std::mem::take(&mut self.ticks);
        for slot in slots.iter_mut() {
            if let Some(callback) = slot.callback.as_mut() {
                if callback(&mut self.process) == TickControl::Unregister {
                    slot.callback = None;
                }
            }
        }
        slots.retain(|slot| slot.callback.is_some());
        slots.append(&mut self.ticks);
        self.ticks = slots;
    }

    /// Ticks until an exit has been requested. Returns the ticks used, or `None` if
    /// `max_ticks` ran out first.
    pub fn run_until_exit(&mut self, max_ticks: u64) -> Option<u64> {
        for n in 1..=max_ticks {
            self.tick();
            if self.exit_requests() > 0 {
                return Some(n);
            }
        }
        None
    }

    pub fn actor(&self, id: ActorId) -> Option<&HeadlessActor> {
        self.actors.get(&id)
    }

    pub fn actors(&self) -> impl Iterator<Item = (ActorId, &HeadlessActor)> {
        self.actors.iter().map(|(id, actor)| (*id, actor))
    }

    pub fn actor_by_label(&self, label: &str) -> Option<&HeadlessActor> {
        self.actors.values().find(|a| a.label == label)
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn asset(&self, path: &str) -> Option<&HeadlessAsset> {
        self.assets.get(&canonical(path))
    }

    pub fn instance(&self, id: u64) -> Option<&MaterialInstance> {
        self.instances.get(&id)
    }

    pub fn material_graph(&self, path: &str) -> Option<&MaterialGraph> {
        self.graphs.get(&canonical(path))
    }

    pub fn expression(&self, id: ExpressionId) -> Option<&Expression> {
        self.expressions.get(&id)
    }

    pub fn player(&self, path: &str) -> Option<&PlayerState> {
        self.players.get(&canonical(path))
    }

    pub fn jobs(&self) -> impl Iterator<Item = &RenderJob> {
        self.jobs.iter().map(|(_, job)| job)
    }

    pub fn job(&self, id: JobId) -> Option<&RenderJob> {
        self.jobs.iter().find(|(j, _)| *j == id).map(|(_, job)| job)
    }

    pub fn executor_kind(&self, id: ExecutorId) -> Option<ExecutorKind> {
        self.executors.get(&id).map(|e| e.kind)
    }

    pub fn is_rendering(&self) -> bool {
        self.active_render.is_some()
    }

    pub fn loaded_map(&self) -> Option<&str> {
        self.loaded_map.as_deref()
    }

    pub fn tick_callbacks(&self) -> usize {
        self.ticks.len()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn exit_requests(&self) -> u32 {
        self.process.exit_requests
    }

    pub fn console_commands(&self) -> &[String] {
        &self.process.console
    }

    pub fn actions(&self) -> impl Iterator<Item = &MenuAction> {
        self.actions.values()
    }

    pub fn scripts_run(&self) -> &[PathBuf] {
        &self.scripts
    }

    fn check(&self, api: &str) -> HostResult<()> {
        if self.disabled.contains(api) {
            Err(HostError::unsupported(api))
        } else {
            Ok(())
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn insert_actor(&mut self, class: ActorClass, location: Vec3, rotation: Rotator) -> ActorId {
        let id = ActorId(self.next_id());
        let has_mesh_component = class == ActorClass::StaticMesh;
        self.actors.insert(
            id,
            HeadlessActor {
                class,
                label: format!("Actor_{}", id.0),
                tags: Vec::new(),
                location,
                rotation,
                scale: Vec3::splat(1.0),
                mesh: None,
                materials: BTreeMap::new(),
                properties: BTreeMap::new(),
                has_mesh_component,
            },
        );
        id
    }

    fn actor_mut(&mut self, id: ActorId) -> HostResult<&mut HeadlessActor> {
        self.actors
            .get_mut(&id)
            .ok_or_else(|| HostError::not_found(format!("actor {}", id.0)))
    }

    fn job_mut(&mut self, id: JobId) -> HostResult<&mut RenderJob> {
        self.jobs
            .iter_mut()
            .find(|(j, _)| *j == id)
            .map(|(_, job)| job)
            .ok_or_else(|| HostError::not_found(format!("job {}", id.0)))
    }

    fn material_parameters(&self, material: &MaterialRef) -> HostResult<&[String]> {
        let parent = match material {
            MaterialRef::Asset(handle) => handle.path().to_string(),
            MaterialRef::Instance(id) => self
                .instances
                .get(id)
                .map(|i| i.parent.clone())
                .ok_or_else(|| HostError::not_found(format!("material instance {id}")))?,
        };
        self.assets
            .get(&parent)
            .map(|asset| asset.parameters.as_slice())
            .ok_or_else(|| HostError::not_found(parent))
    }

    /// Generic writes to the fields the host tracks directly land on those fields.
    fn write_property(&mut self, target: &ObjectRef, name: &str, value: PropertyValue) -> HostResult<()> {
        let properties = match target {
            ObjectRef::Actor(id) | ObjectRef::MeshComponent(id) => {
                let actor = self.actor_mut(*id)?;
                match (name, value) {
                    ("actor_label", PropertyValue::Text(label)) => actor.label = label,
                    ("tags", PropertyValue::TextList(tags)) => actor.tags = tags,
                    ("static_mesh", PropertyValue::Asset(mesh)) => {
                        actor.mesh = Some(mesh.path().to_string())
                    }
                    ("world_scale3d", PropertyValue::Vector(scale)) => actor.scale = scale,
                    (name, value) => {
                        actor.properties.insert(name.to_string(), value);
                    }
                }
                return Ok(());
            }
            ObjectRef::Asset(handle) => {
                &mut self
                    .assets
                    .get_mut(handle.path())
                    .ok_or_else(|| HostError::not_found(handle.path()))?
                    .properties
            }
            ObjectRef::Expression(id) => {
                &mut self
                    .expressions
                    .get_mut(id)
                    .ok_or_else(|| HostError::not_found(format!("expression {}", id.0)))?
                    .properties
            }
        };
        properties.insert(name.to_string(), value);
        Ok(())
    }

    fn advance_render(&mut self) {
        let Some(active) = self.active_render.as_mut() else {
            return;
        };
        active.frames_done += 1;
        if active.frames_done < self.frames_per_render {
            return;
        }
        let executor_id = active.executor;
        self.active_render = None;

        let success = !self.fail_renders;
        let frames = self.frames_per_render;
        for (_, job) in self.jobs.iter_mut() {
            let writes_png = job.settings.contains(&PipelineSetting::PngSequence);
            // Without a render pass the pipeline still reports success but writes nothing.
            job.frames_written = if job.has_render_pass() && writes_png && success {
                frames
            } else {
                0
            };
        }

        if let Some(executor) = self.executors.get_mut(&executor_id) {
            for callback in executor.callbacks.iter_mut() {
                callback(success);
            }
        }
    }
}

/// Maps `/Pkg/Asset.Asset` and `/Pkg/Asset` to the same key.
fn canonical(path: &str) -> String {
    let path = path.trim();
    match path.rfind('/') {
        Some(slash) => match path[slash..].find('.') {
            Some(dot) => path[..slash + dot].to_string(),
            None => path.to_string(),
        },
        None => path.to_string(),
    }
}

impl AssetTools for HeadlessHost {
    fn load_asset(&self, path: &str) -> HostResult<Option<AssetHandle>> {
        self.check("load_asset")?;
        let key = canonical(path);
        Ok(self.assets.contains_key(&key).then(|| AssetHandle(key)))
    }

    fn load_object(&self, path: &str) -> HostResult<Option<AssetHandle>> {
        self.check("load_object")?;
        let key = canonical(path);
        Ok(self.assets.contains_key(&key).then(|| AssetHandle(key)))
    }

    fn does_asset_exist(&self, path: &str) -> HostResult<bool> {
        self.check("does_asset_exist")?;
        Ok(self.assets.contains_key(&canonical(path)))
    }

    fn does_directory_exist(&self, path: &str) -> HostResult<bool> {
        self.check("does_directory_exist")?;
        Ok(self.directories.contains(path.trim_end_matches('/')))
    }

    fn make_directory(&mut self, path: &str) -> HostResult<()> {
        self.check("make_directory")?;
        self.directories.insert(path.trim_end_matches('/').to_string());
        Ok(())
    }

    fn create_asset(
        &mut self,
        name: &str,
        package_path: &str,
        class: AssetClass,
    ) -> HostResult<AssetHandle> {
        self.check("create_asset")?;
        if self.failing_assets.contains(&class) {
            return Err(HostError::failed(format!("factory for {class:?} failed")));
        }
        let key = format!("{}/{}", package_path.trim_end_matches('/'), name);
        if self.assets.contains_key(&key) {
            return Err(HostError::failed(format!("asset {key} already exists")));
        }
        if class == AssetClass::MediaPlayer {
            self.players.insert(key.clone(), PlayerState::default());
        }
        if class == AssetClass::Material {
            self.graphs.insert(key.clone(), MaterialGraph::default());
        }
        self.assets.insert(key.clone(), HeadlessAsset::new(class.into()));
        Ok(AssetHandle(key))
    }

    fn save_asset(&mut self, asset: &AssetHandle) -> HostResult<()> {
        self.check("save_asset")?;
        let stored = self
            .assets
            .get_mut(asset.path())
            .ok_or_else(|| HostError::not_found(asset.path()))?;
        stored.save_count += 1;
        Ok(())
    }

    fn generated_class(&self, blueprint: &AssetHandle) -> HostResult<Option<String>> {
        self.check("generated_class")?;
        let asset = self
            .assets
            .get(blueprint.path())
            .ok_or_else(|| HostError::not_found(blueprint.path()))?;
        Ok(asset.generated_class.clone())
    }
}

impl PropertyAccess for HeadlessHost {
    fn set_editor_property(
        &mut self,
        target: &ObjectRef,
        name: &str,
        value: PropertyValue,
    ) -> HostResult<()> {
        self.check("set_editor_property")?;
        self.write_property(target, name, value)
    }

    fn set_attribute(
        &mut self,
        target: &ObjectRef,
        name: &str,
        value: PropertyValue,
    ) -> HostResult<()> {
        self.check("set_attribute")?;
        self.write_property(target, name, value)
    }
}

impl LevelEditor for HeadlessHost {
    fn all_level_actors(&self) -> HostResult<Vec<ActorId>> {
        self.check("all_level_actors")?;
        Ok(self.actors.keys().copied().collect())
    }

    fn actor_label(&self, actor: ActorId) -> HostResult<String> {
        self.check("actor_label")?;
        self.actors
            .get(&actor)
            .map(|a| a.label.clone())
            .ok_or_else(|| HostError::not_found(format!("actor {}", actor.0)))
    }

    fn set_actor_label(&mut self, actor: ActorId, label: &str) -> HostResult<()> {
        self.check("set_actor_label")?;
        self.actor_mut(actor)?.label = label.to_string();
        Ok(())
    }

    fn actor_tags(&self, actor: ActorId) -> HostResult<Vec<String>> {
        self.check("actor_tags")?;
        self.actors
            .get(&actor)
            .map(|a| a.tags.clone())
            .ok_or_else(|| HostError::not_found(format!("actor {}", actor.0)))
    }

    fn set_actor_tags(&mut self, actor: ActorId, tags: Vec<String>) -> HostResult<()> {
        self.check("set_actor_tags")?;
        self.actor_mut(actor)?.tags = tags;
        Ok(())
    }

    fn is_class_available(&self, class: &ActorClass) -> bool {
        if self.missing_classes.contains(class) {
            return false;
        }
        match class {
            ActorClass::Blueprint(name) => self
                .assets
                .values()
                .any(|a| a.generated_class.as_deref() == Some(name.as_str())),
            _ => true,
        }
    }

    fn spawn_actor(
        &mut self,
        class: &ActorClass,
        location: Vec3,
        rotation: Rotator,
    ) -> HostResult<ActorId> {
        self.check("spawn_actor")?;
        if !self.is_class_available(class) {
            return Err(HostError::not_found(format!("class {class:?}")));
        }
        Ok(self.insert_actor(class.clone(), location, rotation))
    }

    fn destroy_actors(&mut self, actors: &[ActorId]) -> HostResult<()> {
        self.check("destroy_actors")?;
        for actor in actors {
            self.actors.remove(actor);
        }
        Ok(())
    }

    fn destroy_actor(&mut self, actor: ActorId) -> HostResult<()> {
        self.check("destroy_actor")?;
        self.actors
            .remove(&actor)
            .map(|_| ())
            .ok_or_else(|| HostError::not_found(format!("actor {}", actor.0)))
    }

    fn has_static_mesh_component(&self, actor: ActorId) -> HostResult<bool> {
        self.check("has_static_mesh_component")?;
        self.find_static_mesh_component(actor)
    }

    fn find_static_mesh_component(&self, actor: ActorId) -> HostResult<bool> {
        self.actors
            .get(&actor)
            .map(|a| a.has_mesh_component)
            .ok_or_else(|| HostError::not_found(format!("actor {}", actor.0)))
    }

    fn set_static_mesh(&mut self, actor: ActorId, mesh: &AssetHandle) -> HostResult<()> {
        self.check("set_static_mesh")?;
        self.actor_mut(actor)?.mesh = Some(mesh.path().to_string());
        Ok(())
    }

    fn set_world_scale(&mut self, actor: ActorId, scale: Vec3) -> HostResult<()> {
        self.check("set_world_scale")?;
        self.actor_mut(actor)?.scale = scale;
        Ok(())
    }

    fn set_actor_scale(&mut self, actor: ActorId, scale: Vec3) -> HostResult<()> {
        self.check("set_actor_scale")?;
        self.actor_mut(actor)?.scale = scale;
        Ok(())
    }

    fn set_material(
        &mut self,
        actor: ActorId,
        slot: usize,
        material: &MaterialRef,
    ) -> HostResult<()> {
        self.check("set_material")?;
        let actor = self.actor_mut(actor)?;
        if !actor.has_mesh_component {
            return Err(HostError::not_found("static mesh component"));
        }
        actor.materials.insert(slot, material.clone());
        Ok(())
    }
}

impl MaterialEditing for HeadlessHost {
    fn create_material_instance(
        &mut self,
        parent: &AssetHandle,
        outer: ActorId,
    ) -> HostResult<MaterialRef> {
        self.check("create_material_instance")?;
        match self.assets.get(parent.path()) {
            Some(asset) if asset.kind == AssetKind::Material => {}
            _ => return Err(HostError::not_found(parent.path())),
        }
        let id = self.next_id();
        self.instances.insert(
            id,
            MaterialInstance {
                parent: parent.path().to_string(),
                outer,
                vectors: BTreeMap::new(),
                scalars: BTreeMap::new(),
            },
        );
        Ok(MaterialRef::Instance(id))
    }

    fn set_vector_parameter(
        &mut self,
        material: &MaterialRef,
        name: &str,
        value: LinearColor,
    ) -> HostResult<()> {
        self.check("set_vector_parameter")?;
        if !self.material_parameters(material)?.iter().any(|p| p == name) {
            return Err(HostError::not_found(format!("parameter {name}")));
        }
        if let MaterialRef::Instance(id) = material {
            if let Some(instance) = self.instances.get_mut(id) {
                instance.vectors.insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    fn set_scalar_parameter(
        &mut self,
        material: &MaterialRef,
        name: &str,
        value: f32,
    ) -> HostResult<()> {
        self.check("set_scalar_parameter")?;
        if !self.material_parameters(material)?.iter().any(|p| p == name) {
            return Err(HostError::not_found(format!("parameter {name}")));
        }
        if let MaterialRef::Instance(id) = material {
            if let Some(instance) = self.instances.get_mut(id) {
                instance.scalars.insert(name.to_string(), value);
            }
        }
        Ok(())
    }

    fn clear_expressions(&mut self, material: &AssetHandle) -> HostResult<()> {
        self.check("clear_expressions")?;
        let graph = self.graphs.entry(material.path().to_string()).or_default();
        let removed = std::mem::take(&mut graph.expressions);
        graph.emissive = None;
        for id in removed {
            self.expressions.remove(&id);
        }
        Ok(())
    }

    fn create_texture_sample(
        &mut self,
        material: &AssetHandle,
        x: i32,
        y: i32,
    ) -> HostResult<ExpressionId> {
        self.check("create_texture_sample")?;
        let id = ExpressionId(self.next_id());
        self.expressions.insert(
            id,
            Expression {
                material: material.path().to_string(),
                position: (x, y),
                properties: BTreeMap::new(),
            },
        );
        self.graphs
            .entry(material.path().to_string())
            .or_default()
            .expressions
            .push(id);
        Ok(id)
    }

    fn connect_emissive(&mut self, expression: ExpressionId, output: &str) -> HostResult<()> {
        self.check("connect_emissive")?;
        let material = self
            .expressions
            .get(&expression)
            .map(|e| e.material.clone())
            .ok_or_else(|| HostError::not_found(format!("expression {}", expression.0)))?;
        self.graphs.entry(material).or_default().emissive = Some((expression, output.to_string()));
        Ok(())
    }

    fn recompile_material(&mut self, material: &AssetHandle) -> HostResult<()> {
        self.check("recompile_material")?;
        self.graphs
            .entry(material.path().to_string())
            .or_default()
            .compile_count += 1;
        Ok(())
    }
}

impl MediaPlayback for HeadlessHost {
    fn set_looping(&mut self, player: &AssetHandle, looping: bool) -> HostResult<()> {
        self.check("set_looping")?;
        self.players.entry(player.path().to_string()).or_default().looping = looping;
        Ok(())
    }

    fn open_source(&mut self, player: &AssetHandle, source: &AssetHandle) -> HostResult<bool> {
        self.check("open_source")?;
        let has_file = self
            .assets
            .get(source.path())
            .map(|a| a.properties.contains_key("file_path"))
            .unwrap_or(false);
        if has_file {
            self.players.entry(player.path().to_string()).or_default().opened =
                Some(source.path().to_string());
        }
        Ok(has_file)
    }

    fn play(&mut self, player: &AssetHandle) -> HostResult<()> {
        self.check("play")?;
        self.players.entry(player.path().to_string()).or_default().playing = true;
        Ok(())
    }
}

impl MoviePipeline for HeadlessHost {
    fn load_map(&mut self, package: &str) -> HostResult<()> {
        self.check("load_map")?;
        self.loaded_map = Some(package.to_string());
        Ok(())
    }

    fn load_level(&mut self, package: &str) -> HostResult<()> {
        self.check("load_level")?;
        self.loaded_map = Some(package.to_string());
        Ok(())
    }

    fn delete_all_jobs(&mut self) -> HostResult<()> {
        self.check("delete_all_jobs")?;
        self.jobs.clear();
        Ok(())
    }

    fn allocate_job(&mut self) -> HostResult<JobId> {
        self.check("allocate_job")?;
        let id = JobId(self.next_id());
        self.jobs.push((id, RenderJob::default()));
        Ok(id)
    }

    fn set_job_map(&mut self, job: JobId, object_path: &str) -> HostResult<()> {
        self.job_mut(job)?.map = Some(object_path.to_string());
        Ok(())
    }

    fn set_job_sequence(&mut self, job: JobId, object_path: &str) -> HostResult<()> {
        self.job_mut(job)?.sequence = Some(object_path.to_string());
        Ok(())
    }

    fn has_setting_class(&self, setting: PipelineSetting) -> bool {
        self.available_settings.contains(&setting)
    }

    fn find_or_add_setting(&mut self, job: JobId, setting: PipelineSetting) -> HostResult<()> {
        if !self.has_setting_class(setting) {
            return Err(HostError::unsupported(format!("{setting:?}")));
        }
        self.job_mut(job)?.settings.insert(setting);
        Ok(())
    }

    fn has_output_property(&self, _job: JobId, name: &str) -> bool {
        let properties = if self.legacy_frame_rate {
            LEGACY_OUTPUT_PROPERTIES
        } else {
            OUTPUT_PROPERTIES
        };
        properties.contains(&name)
    }

    fn set_output_property(
        &mut self,
        job: JobId,
        name: &str,
        value: PropertyValue,
    ) -> HostResult<()> {
        if !self.has_output_property(job, name) {
            return Err(HostError::unsupported(name));
        }
        let job = self.job_mut(job)?;
        job.settings.insert(PipelineSetting::Output);
        job.output.insert(name.to_string(), value);
        Ok(())
    }

    fn create_executor(&mut self, kind: ExecutorKind) -> HostResult<ExecutorId> {
        self.check("create_executor")?;
        let id = ExecutorId(self.next_id());
        self.executors.insert(
            id,
            Executor {
                kind,
                callbacks: Vec::new(),
            },
        );
        Ok(id)
    }

    fn on_executor_finished(
        &mut self,
        executor: ExecutorId,
        callback: FinishCallback,
    ) -> HostResult<()> {
        self.executors
            .get_mut(&executor)
            .ok_or_else(|| HostError::not_found(format!("executor {}", executor.0)))?
            .callbacks
            .push(callback);
        Ok(())
    }

    fn render_queue_with_executor(&mut self, executor: ExecutorId) -> HostResult<()> {
        self.check("render_queue_with_executor")?;
        if !self.executors.contains_key(&executor) {
            return Err(HostError::not_found(format!("executor {}", executor.0)));
        }
        if self.active_render.is_some() {
            return Err(HostError::failed("a render is already in progress"));
        }
        self.active_render = Some(ActiveRender {
            executor,
            frames_done: 0,
        });
        Ok(())
    }
}

impl TickScheduler for HeadlessHost {
    fn register_post_tick(&mut self, callback: TickCallback) -> HostResult<TickHandle> {
        self.check("register_post_tick")?;
        let handle = TickHandle(self.next_id());
        self.ticks.push(TickSlot {
            handle,
            callback: Some(callback),
        });
        Ok(handle)
    }

    fn unregister_post_tick(&mut self, handle: TickHandle) -> HostResult<()> {
        self.check("unregister_post_tick")?;
        let before = self.ticks.len();
        self.ticks.retain(|slot| slot.handle != handle);
        if self.ticks.len() == before {
            return Err(HostError::not_found(format!("tick handle {}", handle.0)));
        }
        Ok(())
    }
}

impl ProcessControl for HeadlessHost {
    fn quit_editor(&mut self) -> HostResult<()> {
        self.process.quit_editor()
    }

    fn execute_console_command(&mut self, command: &str) -> HostResult<()> {
        self.process.execute_console_command(command)
    }
}

impl ActionRegistry for HeadlessHost {
    fn has_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    fn register_action(&mut self, action: MenuAction) -> HostResult<()> {
        self.check("register_action")?;
        if self.actions.contains_key(&action.name) {
            return Err(HostError::failed(format!("action {} already registered", action.name)));
        }
        self.actions.insert(action.name.clone(), action);
        Ok(())
    }
}

impl ScriptRunner for HeadlessHost {
    fn run_script(&mut self, path: &Path) -> HostResult<()> {
        self.check("run_script")?;
        self.scripts.push(path.to_path_buf());
        if self.fail_scripts {
            return Err(HostError::failed(format!("script {} raised", path.display())));
        }
        Ok(())
    }
}

impl EditorHost for HeadlessHost {
    fn command_line(&self) -> HostResult<String> {
        self.check("command_line")?;
        Ok(self.command_line.clone())
    }

    fn project_dir(&self) -> PathBuf {
        self.project_dir.clone()
    }

    fn content_dir(&self) -> HostResult<PathBuf> {
        self.check("content_dir")?;
        Ok(self.project_dir.join("Content"))
    }
}

impl std::fmt::Debug for HeadlessHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessHost")
            .field("project_dir", &self.project_dir)
            .field("actors", &self.actors.len())
            .field("assets", &self.assets.len())
            .field("jobs", &self.jobs.len())
            .field("ticks", &self.ticks.len())
            .finish()
    }
}

/// Serializable snapshot of the level, used by the command-line harness.
#[derive(Debug, Serialize)]
pub struct SceneManifest<'a> {
    pub actors: Vec<&'a HeadlessActor>,
    pub material_instances: usize,
}

impl HeadlessHost {
    pub fn manifest(&self) -> SceneManifest<'_> {
        SceneManifest {
            actors: self.actors.values().collect(),
            material_instances: self.instances.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::LightClass;

    #[test]
    fn test_canonical_paths() {
        assert_eq!(canonical("/Engine/BasicShapes/Cube.Cube"), "/Engine/BasicShapes/Cube");
        assert_eq!(canonical("/Engine/BasicShapes/Cube"), "/Engine/BasicShapes/Cube");
        assert_eq!(canonical("/Game/Dir.v2/Asset"), "/Game/Dir.v2/Asset");
    }

    #[test]
    fn test_missing_class_cannot_spawn() {
        let mut host = HeadlessHost::new("/tmp/project");
        let class = ActorClass::Light(LightClass::RectLight);
        host.remove_class(class.clone());
        assert!(host
            .spawn_actor(&class, Vec3::default(), Rotator::default())
            .is_err());
    }

    #[test]
    fn test_unknown_material_parameter_is_rejected() {
        let mut host = HeadlessHost::with_engine_content("/tmp/project");
        let actor = host.add_user_actor("A");
        let parent = AssetHandle("/Engine/BasicShapes/BasicShapeMaterial".into());
        let mid = host.create_material_instance(&parent, actor).unwrap();
        assert!(host
            .set_vector_parameter(&mid, "BaseColor", LinearColor::rgb(1.0, 0.0, 0.0))
            .is_err());
        assert!(host
            .set_vector_parameter(&mid, "Color", LinearColor::rgb(1.0, 0.0, 0.0))
            .is_ok());
    }

    #[test]
    fn test_tick_callback_unregisters_itself() {
        let mut host = HeadlessHost::new("/tmp/project");
        let mut calls = 0;
        host.register_post_tick(Box::new(move |_| {
            calls += 1;
            if calls == 2 {
                TickControl::Unregister
            } else {
                TickControl::Continue
            }
        }))
        .unwrap();
        host.tick();
        assert_eq!(host.tick_callbacks(), 1);
        host.tick();
        assert_eq!(host.tick_callbacks(), 0);
    }

    #[test]
    fn test_render_without_pass_writes_nothing() {
        let mut host = HeadlessHost::new("/tmp/project");
        host.set_frames_per_render(1);
        let job = host.allocate_job().unwrap();
        host.find_or_add_setting(job, PipelineSetting::PngSequence).unwrap();
        let executor = host.create_executor(ExecutorKind::InProcess).unwrap();
        host.render_queue_with_executor(executor).unwrap();
        host.tick();
        assert!(!host.is_rendering());
        assert_eq!(host.job(job).unwrap().frames_written, 0);
    }
}
