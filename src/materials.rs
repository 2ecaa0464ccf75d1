//! Material resolution with two levels of fallback: the first parent material
//! that exists wins, then the first parameter name a template accepts wins.

use crate::host::{adapter, ActorId, AssetHandle, EditorHost, MaterialEditing, MaterialRef};
use crate::math::LinearColor;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const COLOR_PARAMETERS: &[&str] = &["Color", "BaseColor", "Tint", "Albedo"];
pub const ROUGHNESS_PARAMETERS: &[&str] = &["Roughness", "roughness"];
pub const METALLIC_PARAMETERS: &[&str] = &["Metallic", "metallic"];

/// Engine material every basic shape ships with.
pub const BASIC_SHAPE_MATERIAL: &str = "/Engine/BasicShapes/BasicShapeMaterial.BasicShapeMaterial";
pub const DEFAULT_MATERIAL: &str = "/Engine/EngineMaterials/DefaultMaterial.DefaultMaterial";
pub const EMISSIVE_MESH_MATERIAL: &str =
    "/Engine/EngineMaterials/EmissiveMeshMaterial.EmissiveMeshMaterial";

/// Material for one mesh slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaterialBinding {
    /// Parent material references, most preferred first.
    pub candidates: Vec<String>,
    #[serde(default)]
    pub color: Option<LinearColor>,
    #[serde(default)]
    pub roughness: Option<f32>,
    #[serde(default)]
    pub metallic: Option<f32>,
}

impl MaterialBinding {
    /// Tinted engine material, falling back to the engine default.
    pub fn tinted(color: LinearColor) -> Self {
        Self {
            candidates: vec![BASIC_SHAPE_MATERIAL.into(), DEFAULT_MATERIAL.into()],
            color: Some(color),
            roughness: None,
            metallic: None,
        }
    }

    /// Tinted material with explicit surface response.
    pub fn surface(color: LinearColor, roughness: f32, metallic: f32) -> Self {
        Self {
            roughness: Some(roughness),
            metallic: Some(metallic),
            ..Self::tinted(color)
        }
    }

    pub fn with_preferred(mut self, path: impl Into<String>) -> Self {
        self.candidates.insert(0, path.into());
        self
    }

    fn has_parameters(&self) -> bool {
        self.color.is_some() || self.roughness.is_some() || self.metallic.is_some()
    }
}

/// What [`apply_material`] ended up putting on the slot.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialOutcome {
    /// A parameterised dynamic instance of the resolved parent.
    Instance { parent: String, material: MaterialRef },
    /// The resolved parent itself.
    Parent { parent: String },
    /// No candidate resolved; the mesh keeps its default surface.
    Unresolved,
    /// The actor has no mesh component to take a material.
    NoMeshComponent,
}

/// First candidate reference that resolves to an existing asset.
pub fn first_existing<H, S>(host: &H, candidates: &[S]) -> Option<String>
where
    H: EditorHost + ?Sized,
    S: AsRef<str>,
{
    candidates
        .iter()
        .map(AsRef::as_ref)
        .find(|path| adapter::load_asset(host, path).is_some())
        .map(str::to_string)
}

/// Sets the first accepted vector parameter name; returns the name that took.
pub fn set_first_vector<H: MaterialEditing + ?Sized>(
    host: &mut H,
    material: &MaterialRef,
    names: &[&'static str],
    value: LinearColor,
) -> Option<&'static str> {
    names
        .iter()
        .copied()
        .find(|name| host.set_vector_parameter(material, name, value).is_ok())
}

/// Sets the first accepted scalar parameter name; returns the name that took.
pub fn set_first_scalar<H: MaterialEditing + ?Sized>(
    host: &mut H,
    material: &MaterialRef,
    names: &[&'static str],
    value: f32,
) -> Option<&'static str> {
    names
        .iter()
        .copied()
        .find(|name| host.set_scalar_parameter(material, name, value).is_ok())
}

/// Dynamic instance of `parent` with the binding's color, roughness and metallic applied.
pub fn make_instance<H: EditorHost + ?Sized>(
    host: &mut H,
    parent: &AssetHandle,
    outer: ActorId,
    binding: &MaterialBinding,
) -> Option<MaterialRef> {
    let instance = host.create_material_instance(parent, outer).ok()?;

    if let Some(color) = binding.color {
        if set_first_vector(host, &instance, COLOR_PARAMETERS, color).is_none() {
            debug!(parent = parent.path(), "no color parameter on template");
        }
    }
    if let Some(roughness) = binding.roughness {
        if set_first_scalar(host, &instance, ROUGHNESS_PARAMETERS, roughness).is_none() {
            debug!(parent = parent.path(), "no roughness parameter on template");
        }
    }
    if let Some(metallic) = binding.metallic {
        if set_first_scalar(host, &instance, METALLIC_PARAMETERS, metallic).is_none() {
            debug!(parent = parent.path(), "no metallic parameter on template");
        }
    }

    Some(instance)
}

/// Resolves the binding and applies it to `slot` of the actor's mesh component.
pub fn apply_material<H: EditorHost + ?Sized>(
    host: &mut H,
    actor: ActorId,
    slot: usize,
    binding: &MaterialBinding,
) -> MaterialOutcome {
    let Some(parent_path) = first_existing(host, &binding.candidates) else {
        return MaterialOutcome::Unresolved;
    };
    let Some(parent) = adapter::load_asset(host, &parent_path) else {
        return MaterialOutcome::Unresolved;
    };
    if !adapter::has_mesh_component(host, actor) {
        return MaterialOutcome::NoMeshComponent;
    }

    let instance = if binding.has_parameters() {
        make_instance(host, &parent, actor, binding)
    } else {
        None
    };

    let material = instance.clone().unwrap_or(MaterialRef::Asset(parent));
    if let Err(err) = host.set_material(actor, slot, &material) {
        debug!(slot, %err, "material slot not settable");
    }
    match instance {
        Some(material) => MaterialOutcome::Instance {
            parent: parent_path,
            material,
        },
        None => MaterialOutcome::Parent {
            parent: parent_path,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ActorClass, HeadlessHost, LevelEditor};
    use crate::math::{Rotator, Vec3};

    fn mesh_actor(host: &mut HeadlessHost) -> ActorId {
        host.spawn_actor(&ActorClass::StaticMesh, Vec3::default(), Rotator::default())
            .unwrap()
    }

    #[test]
    fn test_first_existing_skips_missing() {
        let host = HeadlessHost::with_engine_content("/tmp/project");
        let found = first_existing(
            &host,
            &[
                "/Game/Missing/M_Rubber.M_Rubber",
                BASIC_SHAPE_MATERIAL,
                DEFAULT_MATERIAL,
            ],
        );
        assert_eq!(found.as_deref(), Some(BASIC_SHAPE_MATERIAL));
    }

    #[test]
    fn test_first_existing_none() {
        let host = HeadlessHost::new("/tmp/project");
        assert_eq!(first_existing(&host, &["/Game/A", "/Game/B"]), None);
        assert_eq!(first_existing::<_, &str>(&host, &[]), None);
    }

    #[test]
    fn test_parameter_name_fallback() {
        let mut host = HeadlessHost::new("/tmp/project");
        host.add_material("/Game/M_Albedo", &["Albedo", "roughness"]);
        let actor = mesh_actor(&mut host);

        let binding = MaterialBinding {
            candidates: vec!["/Game/M_Albedo".into()],
            color: Some(LinearColor::rgb(0.4, 0.3, 0.2)),
            roughness: Some(0.7),
            metallic: Some(0.0),
        };
        let outcome = apply_material(&mut host, actor, 0, &binding);
        let MaterialOutcome::Instance {
            material: MaterialRef::Instance(id),
            ..
        } = outcome
        else {
            panic!("expected a dynamic instance, got {outcome:?}");
        };

        let instance = host.instance(id).unwrap();
        assert_eq!(instance.vectors.get("Albedo"), Some(&LinearColor::rgb(0.4, 0.3, 0.2)));
        assert_eq!(instance.scalars.get("roughness"), Some(&0.7));
        assert!(!instance.scalars.contains_key("Metallic"));
        assert_eq!(
            host.actor(actor).unwrap().materials.get(&0),
            Some(&MaterialRef::Instance(id))
        );
    }

    #[test]
    fn test_unresolved_leaves_default_surface() {
        let mut host = HeadlessHost::new("/tmp/project");
        let actor = mesh_actor(&mut host);
        let outcome = apply_material(
            &mut host,
            actor,
            0,
            &MaterialBinding::tinted(LinearColor::rgb(1.0, 1.0, 1.0)),
        );
        assert_eq!(outcome, MaterialOutcome::Unresolved);
        assert!(host.actor(actor).unwrap().materials.is_empty());
    }

    #[test]
    fn test_parent_used_when_instances_unavailable() {
        let mut host = HeadlessHost::with_engine_content("/tmp/project");
        host.disable_api("create_material_instance");
        let actor = mesh_actor(&mut host);
        let outcome = apply_material(
            &mut host,
            actor,
            0,
            &MaterialBinding::tinted(LinearColor::rgb(0.1, 0.1, 0.1)),
        );
        assert_eq!(
            outcome,
            MaterialOutcome::Parent {
                parent: BASIC_SHAPE_MATERIAL.to_string()
            }
        );
    }

    #[test]
    fn test_actor_without_mesh_component() {
        let mut host = HeadlessHost::with_engine_content("/tmp/project");
        let light = host
            .spawn_actor(
                &ActorClass::Light(crate::host::LightClass::PointLight),
                Vec3::default(),
                Rotator::default(),
            )
            .unwrap();
        let outcome = apply_material(
            &mut host,
            light,
            0,
            &MaterialBinding::tinted(LinearColor::rgb(0.1, 0.1, 0.1)),
        );
        assert_eq!(outcome, MaterialOutcome::NoMeshComponent);
    }

    #[test]
    fn test_with_preferred_goes_first() {
        let binding = MaterialBinding::tinted(LinearColor::rgb(0.0, 0.0, 0.0))
            .with_preferred("/Game/Custom/M.M");
        assert_eq!(binding.candidates[0], "/Game/Custom/M.M");
        assert_eq!(binding.candidates.len(), 3);
    }
}
