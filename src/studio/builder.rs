//! Idempotent studio build: remove everything carrying the studio tag, then
//! spawn the layout element by element. A missing mesh, class or template
//! skips that element only.

use super::{AvatarSpec, CameraSpec, LightSpec, StudioElementSpec, StudioLayout};
use crate::host::{adapter, ActorClass, ActorId, CameraClass, EditorHost, ObjectRef, PropertyValue};
use crate::materials::{apply_material, MaterialOutcome};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedElement {
    pub label: String,
    pub reason: String,
}

/// Outcome of one rebuild.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildReport {
    /// Tagged actors removed before building.
    pub removed: usize,
    pub spawned: Vec<String>,
    pub skipped: Vec<SkippedElement>,
}

impl BuildReport {
    fn skip(&mut self, label: &str, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(label, %reason, "skipping studio element");
        self.skipped.push(SkippedElement {
            label: label.to_string(),
            reason,
        });
    }
}

pub struct StudioBuilder {
    tag: String,
}

impl StudioBuilder {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Removes every actor carrying the studio tag. User content is left alone.
    pub fn clear<H: EditorHost + ?Sized>(&self, host: &mut H) -> usize {
        let existing = adapter::actors_with_tag(host, &self.tag);
        let removed = adapter::destroy_all(host, &existing);
        if removed > 0 {
            info!(removed, tag = %self.tag, "removed previous studio actors");
        }
        removed
    }

    pub fn rebuild<H: EditorHost + ?Sized>(&self, host: &mut H, layout: &StudioLayout) -> BuildReport {
        let mut report = BuildReport {
            removed: self.clear(host),
            ..BuildReport::default()
        };

        for element in &layout.elements {
            self.spawn_element(host, element, &mut report);
        }
        if let Some(avatar) = &layout.avatar {
            self.spawn_avatar(host, avatar, &mut report);
        }
        for light in &layout.lights {
            self.spawn_light(host, light, &mut report);
        }
        for camera in &layout.cameras {
            self.spawn_camera(host, camera, &mut report);
        }

        info!(
            spawned = report.spawned.len(),
            skipped = report.skipped.len(),
            "studio build complete"
        );
        report
    }

    fn finish_actor<H: EditorHost + ?Sized>(
        &self,
        host: &mut H,
        actor: ActorId,
        label: &str,
        report: &mut BuildReport,
    ) {
        adapter::label_actor(host, actor, label);
        if !adapter::tag_actor(host, actor, &self.tag) {
            // An untagged actor would survive the next clear.
            adapter::destroy_all(host, &[actor]);
            report.skip(label, "could not tag actor");
            return;
        }
        report.spawned.push(label.to_string());
    }

    fn spawn_element<H: EditorHost + ?Sized>(
        &self,
        host: &mut H,
        element: &StudioElementSpec,
        report: &mut BuildReport,
    ) {
        let Some(mesh) = adapter::load_asset(host, &element.mesh) else {
            report.skip(&element.label, format!("mesh {} not found", element.mesh));
            return;
        };
        let actor = match host.spawn_actor(&ActorClass::StaticMesh, element.location, element.rotation) {
            Ok(actor) => actor,
            Err(err) => {
                report.skip(&element.label, err.to_string());
                return;
            }
        };

        let has_component = adapter::has_mesh_component(host, actor);
        if has_component {
            adapter::assign_mesh(host, actor, &mesh);
        }
        adapter::apply_scale(host, actor, element.scale, has_component);

        for (slot, binding) in element.materials.iter().enumerate() {
            match apply_material(host, actor, slot, binding) {
                MaterialOutcome::Unresolved => {
                    debug!(label = %element.label, slot, "no material candidate resolved")
                }
                outcome => debug!(label = %element.label, slot, ?outcome, "material applied"),
            }
        }

        self.finish_actor(host, actor, &element.label, report);
    }

    fn spawn_light<H: EditorHost + ?Sized>(&self, host: &mut H, light: &LightSpec, report: &mut BuildReport) {
        let Some(class) = light
            .classes
            .iter()
            .map(|class| ActorClass::Light(*class))
            .find(|class| host.is_class_available(class))
        else {
            report.skip(&light.label, "no light class available");
            return;
        };
        let actor = match host.spawn_actor(&class, light.location, light.rotation) {
            Ok(actor) => actor,
            Err(err) => {
                report.skip(&light.label, err.to_string());
                return;
            }
        };

        let target = ObjectRef::Actor(actor);
        adapter::try_set(host, &target, "intensity", PropertyValue::Float(light.intensity));
        adapter::try_set(host, &target, "use_temperature", PropertyValue::Bool(true));
        adapter::try_set(host, &target, "temperature", PropertyValue::Float(light.temperature));

        self.finish_actor(host, actor, &light.label, report);
    }

    fn spawn_camera<H: EditorHost + ?Sized>(&self, host: &mut H, camera: &CameraSpec, report: &mut BuildReport) {
        let Some(class) = [CameraClass::CineCamera, CameraClass::Camera]
            .into_iter()
            .map(ActorClass::Camera)
            .find(|class| host.is_class_available(class))
        else {
            report.skip(&camera.label, "no camera class available");
            return;
        };
        match host.spawn_actor(&class, camera.location, camera.rotation()) {
            Ok(actor) => self.finish_actor(host, actor, &camera.label, report),
            Err(err) => report.skip(&camera.label, err.to_string()),
        }
    }

    fn spawn_avatar<H: EditorHost + ?Sized>(&self, host: &mut H, avatar: &AvatarSpec, report: &mut BuildReport) {
        let Some(blueprint) = adapter::load_asset(host, &avatar.blueprint) else {
            report.skip(&avatar.label, format!("avatar template {} not found", avatar.blueprint));
            return;
        };
        let class = match host.generated_class(&blueprint) {
            Ok(Some(class)) => class,
            Ok(None) => {
                report.skip(&avatar.label, "avatar template has no generated class");
                return;
            }
            Err(err) => {
                report.skip(&avatar.label, err.to_string());
                return;
            }
        };
        match host.spawn_actor(&ActorClass::Blueprint(class), avatar.location, avatar.rotation) {
            Ok(actor) => self.finish_actor(host, actor, &avatar.label, report),
            Err(err) => report.skip(&avatar.label, err.to_string()),
        }
    }
}
