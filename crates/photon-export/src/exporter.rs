//! One-shot scene export
//!
//! Reads already-computed paths; never touches simulation state.

use crate::error::ExportError;
use crate::gltf::{Material, SceneBuilder};
use crate::mesh::{tube, uv_sphere};
use photon_physics::{Photon, Trail, SPHERE_RADIUS};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Color of the sphere shell (before opacity)
const SPHERE_COLOR: [f32; 3] = [0.537, 0.706, 0.98];

/// Tube geometry and sphere appearance for an export
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneExporter {
    /// Opacity of the sphere shell
    pub sphere_opacity: f32,
    pub tube_radius: f32,
    pub radial_segments: u32,
    pub sphere_rings: u32,
    pub sphere_segments: u32,
}

impl Default for SceneExporter {
    fn default() -> Self {
        Self {
            sphere_opacity: 0.25,
            tube_radius: 0.03,
            radial_segments: 8,
            sphere_rings: 24,
            sphere_segments: 48,
        }
    }
}

impl SceneExporter {
    pub fn with_sphere_opacity(sphere_opacity: f32) -> Self {
        Self {
            sphere_opacity: sphere_opacity.clamp(0.0, 1.0),
            ..Default::default()
        }
    }

    /// Build the GLB bytes for the sphere plus one tube per drawable path.
    ///
    /// Paths with fewer than two points are skipped.
    pub fn to_glb(&self, photons: &[Photon], trails: &[Trail]) -> Result<Vec<u8>, ExportError> {
        let mut builder = SceneBuilder::new("photons");

        let [r, g, b] = SPHERE_COLOR;
        let sphere_material =
            builder.add_material(Material::blended("sphere", [r, g, b, self.sphere_opacity]));
        let tube_material = builder.add_material(Material::blended("path", [1.0, 1.0, 1.0, 1.0]));

        let sphere = uv_sphere(SPHERE_RADIUS, self.sphere_rings, self.sphere_segments);
        builder.add_mesh("sphere".to_string(), &sphere, sphere_material)?;

        let paths = trails
            .iter()
            .map(|t| (format!("trail-{}", t.id()), t.path()))
            .chain(
                photons
                    .iter()
                    .map(|p| (format!("photon-{}", p.id), p.path.as_slice())),
            );

        let mut tubes = 0;
        for (name, path) in paths {
            if let Some(mesh) = tube(path, self.tube_radius, self.radial_segments) {
                builder.add_mesh(name, &mesh, tube_material)?;
                tubes += 1;
            }
        }

        let bytes = builder.finish()?;
        log::debug!("Built GLB with {} tubes ({} bytes)", tubes, bytes.len());
        Ok(bytes)
    }

    /// Export to `path`
    pub fn write_glb(
        &self,
        path: &Path,
        photons: &[Photon],
        trails: &[Trail],
    ) -> Result<(), ExportError> {
        let bytes = self.to_glb(photons, trails)?;
        std::fs::write(path, bytes)?;
        log::info!("✓ Exported scene to {}", path.display());
        Ok(())
    }
}

/// `photons-<unix seconds>.glb` inside `dir`
pub fn export_file_path(dir: &Path, now: SystemTime) -> PathBuf {
    let secs = now.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
    dir.join(format!("photons-{}.glb", secs))
}
