//! The built-in news studio, laid out from real-world measurements.
//!
//! All distances are centimetres (1 scene unit = 1 cm). Basic shapes are
//! 100 units on a side, so a 180 cm desk top is a cube scaled to 1.8.
//! The presenter stands at [`ANCHOR_POSITION`] facing the cameras, which
//! sit on the negative X side of the set looking towards the back wall.

use super::{AvatarSpec, CameraSpec, LightSpec, StudioElementSpec, StudioLayout, StudioSettings};
use super::SCREEN_LABEL;
use crate::host::LightClass;
use crate::materials::{MaterialBinding, EMISSIVE_MESH_MATERIAL};
use crate::math::{shape_scale, LinearColor, Rotator, Vec3};

/// Feet of the presenter, behind the desk and right of center.
pub const ANCHOR_POSITION: Vec3 = Vec3::new(100.0, 200.0, 0.0);
/// Eye height of a standing presenter.
pub const ANCHOR_EYE_HEIGHT: f32 = 160.0;

pub const FLOOR_FOOTPRINT_CM: (f32, f32) = (2000.0, 2000.0);
pub const DESK_TOP_HEIGHT: f32 = 75.0;
pub const SCREEN_WIDTH_CM: f32 = 250.0;
pub const SCREEN_ASPECT: f32 = 16.0 / 9.0;

pub const GRID_SPACING_Y: f32 = 200.0;
pub const GRID_SPACING_Z: f32 = 120.0;
pub const GRID_CENTER_Z: f32 = 240.0;
const GRID_PLANE_X: f32 = 705.0;

pub const KEY_INTENSITY: f32 = 5500.0;
pub const FILL_INTENSITY: f32 = 2400.0;
pub const RIM_INTENSITY: f32 = 1600.0;
pub const LIGHT_TEMPERATURE: f32 = 5200.0;

/// Reference to one of the engine's basic shapes.
pub fn basic_shape(name: &str) -> String {
    format!("/Engine/BasicShapes/{name}.{name}")
}

fn element(
    label: impl Into<String>,
    shape: &str,
    location: Vec3,
    rotation: Rotator,
    scale: Vec3,
    material: MaterialBinding,
) -> StudioElementSpec {
    StudioElementSpec {
        label: label.into(),
        mesh: basic_shape(shape),
        location,
        rotation,
        scale,
        materials: vec![material],
    }
}

impl StudioLayout {
    pub fn news_studio(settings: &StudioSettings) -> Self {
        let mut elements = vec![floor()];
        elements.extend(desk());
        elements.extend(backdrop());
        elements.extend(screen());
        if settings.ceiling_rig {
            elements.extend(ceiling_rig());
        }

        Self {
            elements,
            lights: three_point_rig(ANCHOR_POSITION, ANCHOR_EYE_HEIGHT).to_vec(),
            cameras: camera_rig().to_vec(),
            avatar: settings.avatar_blueprint.as_ref().map(|blueprint| AvatarSpec {
                label: "VC_Anchor".to_string(),
                blueprint: blueprint.clone(),
                location: ANCHOR_POSITION,
                rotation: Rotator::new(0.0, 0.0, 90.0),
            }),
        }
    }
}

fn floor() -> StudioElementSpec {
    let (width, depth) = FLOOR_FOOTPRINT_CM;
    element(
        "VC_Floor",
        "Plane",
        Vec3::default(),
        Rotator::default(),
        shape_scale(width, depth, 100.0),
        MaterialBinding::tinted(LinearColor::rgb(0.04, 0.05, 0.08))
            .with_preferred("/Game/BungeeMan/Materials/Mat_BungeeMan_Rubber.Mat_BungeeMan_Rubber"),
    )
}

/// 180 x 80 cm desk, 75 cm high, in wood tones with a glossy tablet prop.
fn desk() -> Vec<StudioElementSpec> {
    vec![
        element(
            "VC_DeskTop",
            "Cube",
            Vec3::new(80.0, 180.0, DESK_TOP_HEIGHT),
            Rotator::default(),
            shape_scale(180.0, 80.0, 2.0),
            MaterialBinding::surface(LinearColor::rgb(0.42, 0.28, 0.18), 0.7, 0.0),
        ),
        element(
            "VC_DeskBase",
            "Cube",
            Vec3::new(80.0, 180.0, 35.0),
            Rotator::default(),
            shape_scale(160.0, 75.0, 70.0),
            MaterialBinding::surface(LinearColor::rgb(0.38, 0.25, 0.16), 0.75, 0.0),
        ),
        element(
            "VC_DeskFront",
            "Cylinder",
            Vec3::new(80.0, 140.0, 35.0),
            Rotator::new(0.0, 90.0, 0.0),
            shape_scale(70.0, 75.0, 70.0),
            MaterialBinding::surface(LinearColor::rgb(0.35, 0.23, 0.15), 0.8, 0.0),
        ),
        element(
            "VC_Desk_Tablet",
            "Cube",
            Vec3::new(60.0, 165.0, DESK_TOP_HEIGHT + 1.0),
            Rotator::new(0.0, -15.0, 0.0),
            shape_scale(25.0, 18.0, 0.8),
            MaterialBinding::surface(LinearColor::rgb(0.02, 0.02, 0.02), 0.2, 0.1),
        ),
    ]
}

/// Back wall with a panel grid of thin bars in front of it.
fn backdrop() -> Vec<StudioElementSpec> {
    let grid_color = LinearColor::rgb(0.10, 0.18, 0.35);
    let mut elements = vec![element(
        "VC_BackWall",
        "Cube",
        Vec3::new(720.0, 0.0, 235.0),
        Rotator::default(),
        shape_scale(15.0, 1800.0, 520.0),
        MaterialBinding::tinted(LinearColor::rgb(0.02, 0.07, 0.18)),
    )];

    for i in -4..=4 {
        elements.push(element(
            format!("VC_BackGrid_V_{i:+}"),
            "Cube",
            Vec3::new(GRID_PLANE_X, i as f32 * GRID_SPACING_Y, GRID_CENTER_Z),
            Rotator::default(),
            shape_scale(2.0, 5.0, 500.0),
            MaterialBinding::tinted(grid_color),
        ));
    }
    for i in -2..=3 {
        elements.push(element(
            format!("VC_BackGrid_H_{i:+}"),
            "Cube",
            Vec3::new(GRID_PLANE_X, 0.0, GRID_CENTER_Z + i as f32 * GRID_SPACING_Z),
            Rotator::default(),
            shape_scale(2.0, 1800.0, 5.0),
            MaterialBinding::tinted(grid_color),
        ));
    }
    elements
}

/// 16:9 screen on the left of the back wall, plus placeholder "X" markers.
fn screen() -> Vec<StudioElementSpec> {
    let mut elements = vec![element(
        SCREEN_LABEL,
        "Plane",
        Vec3::new(650.0, -250.0, 170.0),
        Rotator::new(90.0, 0.0, 90.0),
        shape_scale(SCREEN_WIDTH_CM, SCREEN_WIDTH_CM / SCREEN_ASPECT, 100.0),
        MaterialBinding::tinted(LinearColor::rgb(0.35, 0.35, 0.35)),
    )];

    let marker_color = LinearColor::new(0.72, 0.86, 0.72, 0.55);
    let markers = [(-250.0, 170.0, 1.0), (-375.0, 240.0, 0.45), (-125.0, 100.0, 0.45)];
    for (idx, (y, z, size)) in markers.into_iter().enumerate() {
        for (suffix, roll) in [("XA", 45.0), ("XB", -45.0)] {
            elements.push(element(
                format!("VC_Screen_{suffix}_{idx}"),
                "Cube",
                Vec3::new(648.0, y, z),
                Rotator::new(0.0, 90.0, roll),
                Vec3::new(0.02, 1.4 * size, 0.02),
                MaterialBinding::tinted(marker_color),
            ));
        }
    }
    elements
}

/// Overhead truss and two emissive panels standing in for soft boxes.
fn ceiling_rig() -> Vec<StudioElementSpec> {
    let z = 460.0;
    let beam = MaterialBinding::tinted(LinearColor::rgb(0.03, 0.03, 0.035));
    let panel = MaterialBinding::tinted(LinearColor::rgb(0.35, 0.35, 0.33))
        .with_preferred(EMISSIVE_MESH_MATERIAL);

    vec![
        element(
            "VC_Rig_Beam_A",
            "Cube",
            Vec3::new(-50.0, 0.0, z),
            Rotator::default(),
            shape_scale(1400.0, 12.0, 12.0),
            beam.clone(),
        ),
        element(
            "VC_Rig_Beam_B",
            "Cube",
            Vec3::new(250.0, 0.0, z),
            Rotator::default(),
            shape_scale(1400.0, 12.0, 12.0),
            beam.clone(),
        ),
        element(
            "VC_Rig_Beam_C",
            "Cube",
            Vec3::new(100.0, -350.0, z),
            Rotator::new(0.0, 90.0, 0.0),
            shape_scale(850.0, 12.0, 12.0),
            beam.clone(),
        ),
        element(
            "VC_Rig_Beam_D",
            "Cube",
            Vec3::new(100.0, 350.0, z),
            Rotator::new(0.0, 90.0, 0.0),
            shape_scale(850.0, 12.0, 12.0),
            beam,
        ),
        element(
            "VC_LightPanel_Key",
            "Plane",
            Vec3::new(40.0, -320.0, 430.0),
            Rotator::new(-55.0, 0.0, 0.0),
            shape_scale(280.0, 180.0, 100.0),
            panel.clone(),
        ),
        element(
            "VC_LightPanel_Fill",
            "Plane",
            Vec3::new(40.0, 320.0, 420.0),
            Rotator::new(-50.0, 0.0, 0.0),
            shape_scale(260.0, 160.0, 100.0),
            panel,
        ),
    ]
}

/// Key, fill and rim lights around a subject standing at `subject` with eyes at `eye_height`.
///
/// Key is brightest, in front and to the left. Fill sits in front on the
/// opposite side at under half the key. Rim is dimmest, behind and above.
pub fn three_point_rig(subject: Vec3, eye_height: f32) -> [LightSpec; 3] {
    let eye = subject.offset(0.0, 0.0, eye_height);
    let soft = vec![LightClass::RectLight, LightClass::SpotLight, LightClass::PointLight];
    [
        LightSpec {
            label: "VC_KeyLight".into(),
            classes: soft.clone(),
            location: eye.offset(-200.0, -120.0, 60.0),
            rotation: Rotator::new(-30.0, 25.0, 0.0),
            intensity: KEY_INTENSITY,
            temperature: LIGHT_TEMPERATURE,
        },
        LightSpec {
            label: "VC_FillLight".into(),
            classes: soft,
            location: eye.offset(-180.0, 120.0, 40.0),
            rotation: Rotator::new(-25.0, -15.0, 0.0),
            intensity: FILL_INTENSITY,
            temperature: LIGHT_TEMPERATURE,
        },
        LightSpec {
            label: "VC_RimLight".into(),
            classes: vec![LightClass::SpotLight, LightClass::PointLight],
            location: eye.offset(80.0, 120.0, 40.0),
            rotation: Rotator::new(-20.0, -120.0, 0.0),
            intensity: RIM_INTENSITY,
            temperature: LIGHT_TEMPERATURE,
        },
    ]
}

/// Wide, medium and close cameras framing the presenter with the screen behind.
pub fn camera_rig() -> [CameraSpec; 3] {
    [
        CameraSpec {
            label: "VC_Cam_Wide".into(),
            location: Vec3::new(-550.0, -100.0, 155.0),
            // Between the screen and the presenter.
            target: Vec3::new(250.0, 0.0, 155.0),
            pitch: -2.0,
        },
        CameraSpec {
            label: "VC_Cam_Medium".into(),
            location: Vec3::new(-420.0, -50.0, 150.0),
            target: Vec3::new(150.0, 100.0, 150.0),
            pitch: -2.0,
        },
        CameraSpec {
            label: "VC_Cam_Close".into(),
            location: Vec3::new(-320.0, 0.0, 145.0),
            target: ANCHOR_POSITION.offset(0.0, 0.0, 150.0),
            pitch: -1.0,
        },
    ]
}
