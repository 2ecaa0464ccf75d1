//! Fallback chains over the host capabilities.
//!
//! Every helper here tries the primary API, then a secondary one, and
//! otherwise gives up quietly (or with a warning where the caller needs
//! one). Nothing in this module returns a host error.

use super::{
    ActorId, AssetHandle, AssetTools, LevelEditor, ObjectRef, ProcessControl, PropertyAccess,
    PropertyValue,
};
use crate::math::Vec3;
use tracing::{debug, warn};

/// Console command that shuts the editor down when no quit API exists.
pub const QUIT_COMMAND: &str = "QUIT_EDITOR";

/// Loads `/Pkg/Asset` or `/Pkg/Asset.Asset`, trying the asset loader then the object loader.
pub fn load_asset<H: AssetTools + ?Sized>(host: &H, path: &str) -> Option<AssetHandle> {
    if let Ok(Some(asset)) = host.load_asset(path) {
        return Some(asset);
    }
    host.load_object(path).ok().flatten()
}

/// Sets a property through the editor-property API, then as a plain attribute.
pub fn try_set<H: PropertyAccess + ?Sized>(
    host: &mut H,
    target: &ObjectRef,
    name: &str,
    value: PropertyValue,
) -> bool {
    if host.set_editor_property(target, name, value.clone()).is_ok() {
        return true;
    }
    match host.set_attribute(target, name, value) {
        Ok(()) => true,
        Err(err) => {
            debug!(property = name, %err, "property not settable");
            false
        }
    }
}

pub fn label_actor<H: LevelEditor + PropertyAccess + ?Sized>(
    host: &mut H,
    actor: ActorId,
    label: &str,
) {
    if host.set_actor_label(actor, label).is_ok() {
        return;
    }
    try_set(
        host,
        &ObjectRef::Actor(actor),
        "actor_label",
        PropertyValue::Text(label.to_string()),
    );
}

/// Adds `tag` to the actor's tags. Returns `false` when neither the tag API
/// nor the `tags` property could be written.
pub fn tag_actor<H: LevelEditor + PropertyAccess + ?Sized>(
    host: &mut H,
    actor: ActorId,
    tag: &str,
) -> bool {
    let mut tags = host.actor_tags(actor).unwrap_or_default();
    if !tags.iter().any(|t| t == tag) {
        tags.push(tag.to_string());
    }
    match host.set_actor_tags(actor, tags.clone()) {
        Ok(()) => true,
        Err(err) => {
            debug!(%err, "tag API unavailable, writing tags property");
            try_set(host, &ObjectRef::Actor(actor), "tags", PropertyValue::TextList(tags))
        }
    }
}

pub fn has_tag<H: LevelEditor + ?Sized>(host: &H, actor: ActorId, tag: &str) -> bool {
    host.actor_tags(actor)
        .map(|tags| tags.iter().any(|t| t == tag))
        .unwrap_or(false)
}

pub fn actors_with_tag<H: LevelEditor + ?Sized>(host: &H, tag: &str) -> Vec<ActorId> {
    host.all_level_actors()
        .unwrap_or_default()
        .into_iter()
        .filter(|actor| has_tag(host, *actor, tag))
        .collect()
}

pub fn find_actor_by_label<H: LevelEditor + ?Sized>(host: &H, label: &str) -> Option<ActorId> {
    host.all_level_actors()
        .unwrap_or_default()
        .into_iter()
        .find(|actor| host.actor_label(*actor).map(|l| l == label).unwrap_or(false))
}

pub fn has_mesh_component<H: LevelEditor + ?Sized>(host: &H, actor: ActorId) -> bool {
    match host.has_static_mesh_component(actor) {
        Ok(found) => found,
        Err(_) => host.find_static_mesh_component(actor).unwrap_or(false),
    }
}

pub fn assign_mesh<H: LevelEditor + PropertyAccess + ?Sized>(
    host: &mut H,
    actor: ActorId,
    mesh: &AssetHandle,
) {
    if host.set_static_mesh(actor, mesh).is_ok() {
        return;
    }
    try_set(
        host,
        &ObjectRef::MeshComponent(actor),
        "static_mesh",
        PropertyValue::Asset(mesh.clone()),
    );
}

/// Scales the mesh component when there is one, otherwise the actor root.
pub fn apply_scale<H: LevelEditor + PropertyAccess + ?Sized>(
    host: &mut H,
    actor: ActorId,
    scale: Vec3,
    has_component: bool,
) {
    if has_component {
        if host.set_world_scale(actor, scale).is_ok() {
            return;
        }
        try_set(
            host,
            &ObjectRef::MeshComponent(actor),
            "world_scale3d",
            PropertyValue::Vector(scale),
        );
    } else if let Err(err) = host.set_actor_scale(actor, scale) {
        debug!(%err, "actor scale not settable");
    }
}

/// Destroys actors in one batch call, falling back to one call per actor.
/// Returns how many actors were removed.
pub fn destroy_all<H: LevelEditor + ?Sized>(host: &mut H, actors: &[ActorId]) -> usize {
    if actors.is_empty() {
        return 0;
    }
    if host.destroy_actors(actors).is_ok() {
        return actors.len();
    }
    actors
        .iter()
        .filter(|actor| host.destroy_actor(**actor).is_ok())
        .count()
}

/// How the exit request reached the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitPath {
    Quit,
    ConsoleCommand,
    Unavailable,
}

pub fn request_exit<P: ProcessControl + ?Sized>(process: &mut P) -> ExitPath {
    if process.quit_editor().is_ok() {
        return ExitPath::Quit;
    }
    match process.execute_console_command(QUIT_COMMAND) {
        Ok(()) => ExitPath::ConsoleCommand,
        Err(err) => {
            warn!(%err, "could not request editor exit");
            ExitPath::Unavailable
        }
    }
}

/// Loads a map package synchronously through whichever loader the host exposes.
pub fn load_map<H: super::MoviePipeline + ?Sized>(host: &mut H, package: &str) -> bool {
    if host.load_map(package).is_ok() {
        return true;
    }
    if host.load_level(package).is_ok() {
        return true;
    }
    warn!(package, "could not load map through any loader");
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ActorClass, HeadlessHost};
    use crate::math::Rotator;

    fn spawn(host: &mut HeadlessHost) -> ActorId {
        host.spawn_actor(&ActorClass::StaticMesh, Vec3::default(), Rotator::default())
            .unwrap()
    }

    #[test]
    fn test_load_asset_falls_back_to_object_loader() {
        let mut host = HeadlessHost::with_engine_content("/tmp/project");
        host.disable_api("load_asset");
        assert!(load_asset(&host, "/Engine/BasicShapes/Cube.Cube").is_some());
        assert!(load_asset(&host, "/Engine/BasicShapes/Missing").is_none());
    }

    #[test]
    fn test_label_falls_back_to_property() {
        let mut host = HeadlessHost::new("/tmp/project");
        host.disable_api("set_actor_label");
        let actor = spawn(&mut host);
        label_actor(&mut host, actor, "VC_Test");
        assert_eq!(host.actor(actor).unwrap().label, "VC_Test");
    }

    #[test]
    fn test_mesh_and_scale_fall_back_to_properties() {
        let mut host = HeadlessHost::with_engine_content("/tmp/project");
        host.disable_api("set_static_mesh");
        host.disable_api("set_world_scale");
        let actor = spawn(&mut host);
        let cube = load_asset(&host, "/Engine/BasicShapes/Cube.Cube").unwrap();

        assign_mesh(&mut host, actor, &cube);
        apply_scale(&mut host, actor, Vec3::new(2.0, 3.0, 0.5), true);

        let spawned = host.actor(actor).unwrap();
        assert_eq!(spawned.mesh.as_deref(), Some(cube.path()));
        assert_eq!(spawned.scale, Vec3::new(2.0, 3.0, 0.5));
    }

    #[test]
    fn test_actor_scale_failure_is_quiet() {
        let mut host = HeadlessHost::new("/tmp/project");
        host.disable_api("set_actor_scale");
        let actor = spawn(&mut host);
        let before = host.actor(actor).unwrap().scale;
        apply_scale(&mut host, actor, Vec3::new(4.0, 4.0, 4.0), false);
        assert_eq!(host.actor(actor).unwrap().scale, before);
    }

    #[test]
    fn test_tag_falls_back_to_property() {
        let mut host = HeadlessHost::new("/tmp/project");
        host.disable_api("set_actor_tags");
        let actor = spawn(&mut host);
        assert!(tag_actor(&mut host, actor, "Studio"));
        assert!(has_tag(&host, actor, "Studio"));
    }

    #[test]
    fn test_tag_reports_failure() {
        let mut host = HeadlessHost::new("/tmp/project");
        host.disable_api("set_actor_tags");
        host.disable_api("set_editor_property");
        host.disable_api("set_attribute");
        let actor = spawn(&mut host);
        assert!(!tag_actor(&mut host, actor, "Studio"));
        assert!(!has_tag(&host, actor, "Studio"));
    }

    #[test]
    fn test_try_set_silently_fails() {
        let mut host = HeadlessHost::new("/tmp/project");
        host.disable_api("set_editor_property");
        host.disable_api("set_attribute");
        let actor = spawn(&mut host);
        assert!(!try_set(
            &mut host,
            &ObjectRef::Actor(actor),
            "intensity",
            PropertyValue::Float(1.0)
        ));
    }

    #[test]
    fn test_tag_is_not_duplicated() {
        let mut host = HeadlessHost::new("/tmp/project");
        let actor = spawn(&mut host);
        assert!(tag_actor(&mut host, actor, "Studio"));
        assert!(tag_actor(&mut host, actor, "Studio"));
        assert_eq!(host.actor(actor).unwrap().tags, vec!["Studio".to_string()]);
        assert!(has_tag(&host, actor, "Studio"));
    }

    #[test]
    fn test_destroy_all_falls_back_per_actor() {
        let mut host = HeadlessHost::new("/tmp/project");
        host.disable_api("destroy_actors");
        let a = spawn(&mut host);
        let b = spawn(&mut host);
        assert_eq!(destroy_all(&mut host, &[a, b]), 2);
        assert_eq!(host.actor_count(), 0);
    }

    #[test]
    fn test_request_exit_falls_back_to_console() {
        let mut host = HeadlessHost::new("/tmp/project");
        host.disable_api("quit_editor");
        assert_eq!(request_exit(&mut host), ExitPath::ConsoleCommand);
        assert_eq!(host.console_commands(), [QUIT_COMMAND.to_string()]);
        assert_eq!(host.exit_requests(), 1);
    }

    #[test]
    fn test_load_map_falls_back_to_level_loader() {
        let mut host = HeadlessHost::new("/tmp/project");
        host.disable_api("load_map");
        assert!(load_map(&mut host, "/Game/Maps/Test1"));
        assert_eq!(host.loaded_map(), Some("/Game/Maps/Test1"));

        host.disable_api("load_level");
        assert!(!load_map(&mut host, "/Game/Maps/Other"));
    }
}
