//! CPU-side vertex data built from simulation snapshots
//!
//! Every path segment is colored by [`color_at`] of its starting point, so
//! live paths and retired trails fade identically.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use photon_export::mesh::uv_sphere;
use photon_physics::{color_at, Photon, Trail, SPHERE_RADIUS};

/// One end of a line-list segment
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-instance data for a photon head quad
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PhotonInstance {
    pub center: [f32; 3],
    pub color: [f32; 4],
}

impl PhotonInstance {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Sphere shell vertex
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl SphereVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Append one line-list segment per consecutive pair of points
pub fn push_path_segments(vertices: &mut Vec<LineVertex>, path: &[Vec3]) {
    for pair in path.windows(2) {
        let color = color_at(pair[0]).to_rgba();
        vertices.push(LineVertex {
            position: pair[0].to_array(),
            color,
        });
        vertices.push(LineVertex {
            position: pair[1].to_array(),
            color,
        });
    }
}

/// Line vertices for all trails followed by all live paths
///
/// Live paths additionally get a closing segment from their last recorded
/// point to the photon's current position, so the line reaches the head.
pub fn build_line_vertices(photons: &[Photon], trails: &[Trail]) -> Vec<LineVertex> {
    let mut vertices = Vec::new();

    for trail in trails {
        push_path_segments(&mut vertices, trail.path());
    }

    for photon in photons {
        push_path_segments(&mut vertices, &photon.path);
        if let Some(&last) = photon.path.last() {
            if last != photon.position {
                push_path_segments(&mut vertices, &[last, photon.position]);
            }
        }
    }

    vertices
}

/// One head per live photon, opaque, tinted by the same color ramp
pub fn build_photon_instances(photons: &[Photon]) -> Vec<PhotonInstance> {
    photons
        .iter()
        .map(|photon| {
            let tint = color_at(photon.position);
            PhotonInstance {
                center: photon.position.to_array(),
                color: [tint.color.x, tint.color.y, tint.color.z, 1.0],
            }
        })
        .collect()
}

/// Sphere shell at the scattering radius
pub fn build_sphere_mesh(rings: u32, segments: u32) -> (Vec<SphereVertex>, Vec<u32>) {
    let mesh = uv_sphere(SPHERE_RADIUS, rings, segments);
    let vertices = mesh
        .positions
        .iter()
        .zip(&mesh.normals)
        .map(|(p, n)| SphereVertex {
            position: p.to_array(),
            normal: n.to_array(),
        })
        .collect();
    (vertices, mesh.indices)
}
