//! Triangle meshes for the sphere shell and path tubes

use glam::Vec3;
use photon_physics::color_at;
use std::f32::consts::{PI, TAU};

/// Indexed triangle list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// Per-vertex RGBA, empty when the mesh is uniformly colored
    pub colors: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds of the positions, `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }
}

/// UV sphere centered at the origin
///
/// `rings` latitude bands and `segments` longitude bands; the seam column is
/// duplicated so every ring has `segments + 1` vertices.
pub fn uv_sphere(radius: f32, rings: u32, segments: u32) -> Mesh {
    let rings = rings.max(2);
    let segments = segments.max(3);
    let mut mesh = Mesh::default();

    for ring in 0..=rings {
        let phi = PI * ring as f32 / rings as f32;
        for segment in 0..=segments {
            let theta = TAU * segment as f32 / segments as f32;
            let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            mesh.positions.push(normal * radius);
            mesh.normals.push(normal);
        }
    }

    let stride = segments + 1;
    for ring in 0..rings {
        for segment in 0..segments {
            let a = ring * stride + segment;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            mesh.indices.extend_from_slice(&[a, b, c, b, d, c]);
        }
    }

    mesh
}

/// Tube of `radius` swept along `path`, colored per ring by [`color_at`]
///
/// Returns `None` for paths with fewer than two points. Frames are carried
/// along the path by projecting the previous normal onto each new tangent,
/// which keeps the tube from twisting.
pub fn tube(path: &[Vec3], radius: f32, radial_segments: u32) -> Option<Mesh> {
    if path.len() < 2 {
        return None;
    }
    let radial_segments = radial_segments.max(3);
    let mut mesh = Mesh::default();

    let mut tangent = Vec3::Z;
    let mut normal = Vec3::X;

    for (i, &center) in path.iter().enumerate() {
        let ahead = path[(i + 1).min(path.len() - 1)];
        let behind = path[i.saturating_sub(1)];
        tangent = (ahead - behind).normalize_or(tangent);

        normal = if i == 0 {
            tangent.any_orthonormal_vector()
        } else {
            (normal - tangent * normal.dot(tangent)).normalize_or(tangent.any_orthonormal_vector())
        };
        let binormal = tangent.cross(normal);

        let rgba = color_at(center).to_rgba();
        for j in 0..radial_segments {
            let angle = TAU * j as f32 / radial_segments as f32;
            let direction = normal * angle.cos() + binormal * angle.sin();
            mesh.positions.push(center + direction * radius);
            mesh.normals.push(direction);
            mesh.colors.push(rgba);
        }
    }

    for ring in 0..(path.len() as u32 - 1) {
        for j in 0..radial_segments {
            let next = (j + 1) % radial_segments;
            let a = ring * radial_segments + j;
            let b = ring * radial_segments + next;
            let c = a + radial_segments;
            let d = b + radial_segments;
            mesh.indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    Some(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_vertices_on_surface() {
        let mesh = uv_sphere(3.5, 8, 12);
        assert_eq!(mesh.vertex_count(), 9 * 13);
        assert_eq!(mesh.triangle_count(), 8 * 12 * 2);
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            assert!((p.length() - 3.5).abs() < 1e-4);
            assert!((n.length() - 1.0).abs() < 1e-4);
        }
        assert!(mesh.colors.is_empty());
    }

    #[test]
    fn test_sphere_indices_in_range() {
        let mesh = uv_sphere(1.0, 4, 4);
        let count = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn test_tube_rejects_short_paths() {
        assert!(tube(&[], 0.1, 8).is_none());
        assert!(tube(&[Vec3::ZERO], 0.1, 8).is_none());
    }

    #[test]
    fn test_tube_shape() {
        let path = [Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 0.0)];
        let mesh = tube(&path, 0.05, 8).unwrap();

        assert_eq!(mesh.vertex_count(), 3 * 8);
        assert_eq!(mesh.colors.len(), 3 * 8);
        assert_eq!(mesh.triangle_count(), 2 * 8 * 2);
        let count = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));

        // Every ring vertex sits one radius away from its center point
        for (ring, center) in path.iter().enumerate() {
            for j in 0..8 {
                let p = mesh.positions[ring * 8 + j];
                assert!((p.distance(*center) - 0.05).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_tube_colors_follow_color_map() {
        let path = [Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)];
        let mesh = tube(&path, 0.05, 4).unwrap();

        assert_eq!(mesh.colors[0], color_at(path[0]).to_rgba());
        assert_eq!(mesh.colors[4], color_at(path[1]).to_rgba());
    }

    #[test]
    fn test_tube_handles_coincident_points() {
        let p = Vec3::new(30.0, 0.0, 0.0);
        let mesh = tube(&[p, p], 0.05, 6).unwrap();

        assert!(mesh.positions.iter().all(|v| v.is_finite()));
        assert!(mesh.normals.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_bounds() {
        let mesh = uv_sphere(2.0, 8, 8);
        let (lo, hi) = mesh.bounds().unwrap();
        assert!((lo.y + 2.0).abs() < 1e-4);
        assert!((hi.y - 2.0).abs() < 1e-4);
        assert!(Mesh::default().bounds().is_none());
    }
}
