//! Procedural studio: a declarative layout plus the builder that turns it into
//! tagged level actors.

pub mod builder;
pub mod catalogue;
pub mod parser;

use crate::host::LightClass;
use crate::materials::MaterialBinding;
use crate::math::{yaw_towards, Rotator, Vec3};
use serde::{Deserialize, Serialize};

pub use builder::{BuildReport, SkippedElement, StudioBuilder};
pub use parser::LayoutParser;

/// Tag carried by every actor the builder creates.
pub const DEFAULT_STUDIO_TAG: &str = "VirtuCastStudio";

/// Label of the screen plane the media subsystem binds video to.
pub const SCREEN_LABEL: &str = "VC_Screen";

pub const DEFAULT_AVATAR_BLUEPRINT: &str = "/Game/MetaHumans/Vivian/BP_Vivian.BP_Vivian";

/// Plain values the studio build consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct StudioSettings {
    pub tag: String,
    /// Blueprint spawned as the presenter; `None` skips the avatar.
    pub avatar_blueprint: Option<String>,
    pub ceiling_rig: bool,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            tag: DEFAULT_STUDIO_TAG.to_string(),
            avatar_blueprint: Some(DEFAULT_AVATAR_BLUEPRINT.to_string()),
            ceiling_rig: false,
        }
    }
}

/// A static mesh placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudioElementSpec {
    pub label: String,
    pub mesh: String,
    pub location: Vec3,
    #[serde(default)]
    pub rotation: Rotator,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    /// Material per slot, slot 0 first.
    #[serde(default)]
    pub materials: Vec<MaterialBinding>,
}

fn unit_scale() -> Vec3 {
    Vec3::splat(1.0)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LightSpec {
    pub label: String,
    /// Light classes in order of preference.
    pub classes: Vec<LightClass>,
    pub location: Vec3,
    #[serde(default)]
    pub rotation: Rotator,
    pub intensity: f32,
    /// Color temperature in Kelvin.
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CameraSpec {
    pub label: String,
    pub location: Vec3,
    pub target: Vec3,
    #[serde(default)]
    pub pitch: f32,
}

impl CameraSpec {
    /// Yaw aimed at the target, fixed pitch, no roll.
    pub fn rotation(&self) -> Rotator {
        Rotator::new(self.pitch, yaw_towards(self.location, self.target), 0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvatarSpec {
    pub label: String,
    pub blueprint: String,
    pub location: Vec3,
    #[serde(default)]
    pub rotation: Rotator,
}

/// Everything one studio build creates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StudioLayout {
    pub elements: Vec<StudioElementSpec>,
    #[serde(default)]
    pub lights: Vec<LightSpec>,
    #[serde(default)]
    pub cameras: Vec<CameraSpec>,
    #[serde(default)]
    pub avatar: Option<AvatarSpec>,
}

impl StudioLayout {
    /// Every label in build order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.elements
            .iter()
            .map(|e| e.label.as_str())
            .chain(self.avatar.iter().map(|a| a.label.as_str()))
            .chain(self.lights.iter().map(|l| l.label.as_str()))
            .chain(self.cameras.iter().map(|c| c.label.as_str()))
    }

    pub fn element(&self, label: &str) -> Option<&StudioElementSpec> {
        self.elements.iter().find(|e| e.label == label)
    }

    pub fn light(&self, label: &str) -> Option<&LightSpec> {
        self.lights.iter().find(|l| l.label == label)
    }

    pub fn camera(&self, label: &str) -> Option<&CameraSpec> {
        self.cameras.iter().find(|c| c.label == label)
    }
}
