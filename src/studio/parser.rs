use super::StudioLayout;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

/// Layout parser that handles JSON/TOML studio layouts
pub struct LayoutParser;

impl LayoutParser {
    /// Parse a layout file, picking the format from its extension (`.toml`, otherwise JSON)
    pub fn parse_file(path: &Path) -> Result<StudioLayout> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::parse_toml(path),
            _ => Self::parse_json(path),
        }
    }

    /// Parse a JSON layout file
    pub fn parse_json(path: &Path) -> Result<StudioLayout> {
        let content = read_layout(path)?;

        let layout: StudioLayout = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON layout: {}", path.display()))?;

        Self::validate_layout(&layout)?;

        Ok(layout)
    }

    /// Parse a TOML layout file
    pub fn parse_toml(path: &Path) -> Result<StudioLayout> {
        let content = read_layout(path)?;

        let layout: StudioLayout = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML layout: {}", path.display()))?;

        Self::validate_layout(&layout)?;

        Ok(layout)
    }

    /// Validate the layout structure
    pub fn validate_layout(layout: &StudioLayout) -> Result<()> {
        if layout.elements.is_empty() {
            anyhow::bail!("Layout must contain at least one element");
        }

        let mut seen = HashSet::new();
        for label in layout.labels() {
            if label.trim().is_empty() {
                anyhow::bail!("Layout contains an empty label");
            }
            if !seen.insert(label) {
                anyhow::bail!("Duplicate label '{}'", label);
            }
        }

        for element in &layout.elements {
            if element.mesh.trim().is_empty() {
                anyhow::bail!("Element '{}' has empty mesh reference", element.label);
            }

            if !element.scale.all_positive() {
                anyhow::bail!("Element '{}' scale must be positive", element.label);
            }

            for (slot, binding) in element.materials.iter().enumerate() {
                if binding.candidates.is_empty() {
                    anyhow::bail!(
                        "Element '{}' slot {} has no material candidates",
                        element.label,
                        slot
                    );
                }
            }
        }

        for light in &layout.lights {
            if light.classes.is_empty() {
                anyhow::bail!("Light '{}' must list at least one light class", light.label);
            }

            if light.intensity < 0.0 {
                anyhow::bail!("Light '{}' intensity cannot be negative", light.label);
            }
        }

        if let Some(avatar) = &layout.avatar {
            if avatar.blueprint.trim().is_empty() {
                anyhow::bail!("Avatar '{}' has empty blueprint reference", avatar.label);
            }
        }

        if layout.cameras.is_empty() {
            warn!("layout defines no cameras");
        }

        Ok(())
    }

    /// Get a summary of the layout structure
    pub fn summarize(layout: &StudioLayout) -> String {
        let mut summary = String::new();
        summary.push_str(&format!("Elements: {}\n", layout.elements.len()));

        for (idx, element) in layout.elements.iter().enumerate() {
            summary.push_str(&format!(
                "  Element {}: '{}' ({}, scale {:.2}x{:.2}x{:.2})\n",
                idx + 1,
                element.label,
                mesh_name(&element.mesh),
                element.scale.x,
                element.scale.y,
                element.scale.z
            ));
        }

        summary.push_str(&format!("Lights: {}\n", layout.lights.len()));
        for light in &layout.lights {
            summary.push_str(&format!(
                "  '{}' ({:.0}, {:.0}K)\n",
                light.label, light.intensity, light.temperature
            ));
        }

        summary.push_str(&format!("Cameras: {}\n", layout.cameras.len()));
        for camera in &layout.cameras {
            summary.push_str(&format!(
                "  '{}' (yaw {:.1})\n",
                camera.label,
                camera.rotation().yaw
            ));
        }

        if let Some(avatar) = &layout.avatar {
            summary.push_str(&format!("Avatar: '{}' from {}\n", avatar.label, avatar.blueprint));
        }

        summary
    }
}

fn read_layout(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read layout file: {}", path.display()))
}

/// `/Engine/BasicShapes/Cube.Cube` -> `Cube`
fn mesh_name(mesh: &str) -> &str {
    let name = mesh.rsplit('/').next().unwrap_or(mesh);
    name.split('.').next().unwrap_or(name)
}
