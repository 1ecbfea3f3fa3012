//! Minimal glTF 2.0 document model and GLB container writer
//!
//! Only what the photon scene needs: one buffer, float/u32 accessors,
//! triangle primitives and metallic-roughness materials.

use crate::error::ExportError;
use crate::mesh::Mesh;
use bytemuck::Pod;
use serde::Serialize;
use std::collections::BTreeMap;

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
const CHUNK_BIN: u32 = 0x004E_4942; // "BIN\0"

const COMPONENT_FLOAT: u32 = 5126;
const COMPONENT_UNSIGNED_INT: u32 = 5125;
const TARGET_ARRAY_BUFFER: u32 = 34962;
const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;
const MODE_TRIANGLES: u32 = 4;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Document {
    asset: Asset,
    scene: u32,
    scenes: Vec<Scene>,
    nodes: Vec<Node>,
    meshes: Vec<MeshDef>,
    materials: Vec<Material>,
    accessors: Vec<Accessor>,
    buffer_views: Vec<BufferView>,
    buffers: Vec<Buffer>,
}

#[derive(Serialize)]
struct Asset {
    version: &'static str,
    generator: &'static str,
}

#[derive(Serialize)]
struct Scene {
    nodes: Vec<u32>,
}

#[derive(Serialize)]
struct Node {
    name: String,
    mesh: u32,
}

#[derive(Serialize)]
struct MeshDef {
    name: String,
    primitives: Vec<Primitive>,
}

#[derive(Serialize)]
struct Primitive {
    attributes: BTreeMap<&'static str, u32>,
    indices: u32,
    material: u32,
    mode: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Material {
    name: &'static str,
    pbr_metallic_roughness: Pbr,
    alpha_mode: &'static str,
    double_sided: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Pbr {
    base_color_factor: [f32; 4],
    metallic_factor: f32,
    roughness_factor: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Accessor {
    buffer_view: u32,
    component_type: u32,
    count: usize,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<[f32; 3]>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BufferView {
    buffer: u32,
    byte_offset: usize,
    byte_length: usize,
    target: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Buffer {
    byte_length: usize,
}

impl Material {
    /// Blended material with a constant base color
    pub(crate) fn blended(name: &'static str, base_color: [f32; 4]) -> Self {
        Self {
            name,
            pbr_metallic_roughness: Pbr {
                base_color_factor: base_color,
                metallic_factor: 0.0,
                roughness_factor: 0.6,
            },
            alpha_mode: "BLEND",
            double_sided: true,
        }
    }
}

/// Accumulates meshes into a single-buffer glTF document
pub(crate) struct SceneBuilder {
    document: Document,
    bin: Vec<u8>,
}

impl SceneBuilder {
    pub(crate) fn new(generator: &'static str) -> Self {
        Self {
            document: Document {
                asset: Asset {
                    version: "2.0",
                    generator,
                },
                scene: 0,
                scenes: vec![Scene { nodes: Vec::new() }],
                nodes: Vec::new(),
                meshes: Vec::new(),
                materials: Vec::new(),
                accessors: Vec::new(),
                buffer_views: Vec::new(),
                buffers: Vec::new(),
            },
            bin: Vec::new(),
        }
    }

    /// Register a material and return its index
    pub(crate) fn add_material(&mut self, material: Material) -> u32 {
        self.document.materials.push(material);
        (self.document.materials.len() - 1) as u32
    }

    /// Add a mesh as a named node of the scene
    pub(crate) fn add_mesh(
        &mut self,
        name: String,
        mesh: &Mesh,
        material: u32,
    ) -> Result<(), ExportError> {
        if u32::try_from(mesh.vertex_count()).is_err() {
            return Err(ExportError::MeshTooLarge {
                vertices: mesh.vertex_count(),
            });
        }

        let positions: Vec<[f32; 3]> = mesh.positions.iter().map(|p| p.to_array()).collect();
        let normals: Vec<[f32; 3]> = mesh.normals.iter().map(|n| n.to_array()).collect();
        let (min, max) = mesh
            .bounds()
            .map(|(lo, hi)| (Some(lo.to_array()), Some(hi.to_array())))
            .unwrap_or((None, None));

        let mut attributes = BTreeMap::new();
        let position = self.push_accessor(&positions, COMPONENT_FLOAT, "VEC3", TARGET_ARRAY_BUFFER);
        self.document.accessors[position as usize].min = min;
        self.document.accessors[position as usize].max = max;
        attributes.insert("POSITION", position);
        attributes.insert(
            "NORMAL",
            self.push_accessor(&normals, COMPONENT_FLOAT, "VEC3", TARGET_ARRAY_BUFFER),
        );
        if !mesh.colors.is_empty() {
            attributes.insert(
                "COLOR_0",
                self.push_accessor(&mesh.colors, COMPONENT_FLOAT, "VEC4", TARGET_ARRAY_BUFFER),
            );
        }
        let indices = self.push_accessor(
            &mesh.indices,
            COMPONENT_UNSIGNED_INT,
            "SCALAR",
            TARGET_ELEMENT_ARRAY_BUFFER,
        );

        let mesh_index = self.document.meshes.len() as u32;
        self.document.meshes.push(MeshDef {
            name: name.clone(),
            primitives: vec![Primitive {
                attributes,
                indices,
                material,
                mode: MODE_TRIANGLES,
            }],
        });

        let node_index = self.document.nodes.len() as u32;
        self.document.nodes.push(Node {
            name,
            mesh: mesh_index,
        });
        self.document.scenes[0].nodes.push(node_index);
        Ok(())
    }

    fn push_accessor<T: Pod>(
        &mut self,
        data: &[T],
        component_type: u32,
        kind: &'static str,
        target: u32,
    ) -> u32 {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        let byte_offset = self.bin.len();
        self.bin.extend_from_slice(bytes);
        pad_to_four(&mut self.bin, 0);

        self.document.buffer_views.push(BufferView {
            buffer: 0,
            byte_offset,
            byte_length: bytes.len(),
            target,
        });
        self.document.accessors.push(Accessor {
            buffer_view: (self.document.buffer_views.len() - 1) as u32,
            component_type,
            count: data.len(),
            kind,
            min: None,
            max: None,
        });
        (self.document.accessors.len() - 1) as u32
    }

    /// Serialize into a GLB container
    pub(crate) fn finish(mut self) -> Result<Vec<u8>, ExportError> {
        self.document.buffers.push(Buffer {
            byte_length: self.bin.len(),
        });

        let mut json = serde_json::to_vec(&self.document)?;
        pad_to_four(&mut json, b' ');
        pad_to_four(&mut self.bin, 0);

        let total = 12 + 8 + json.len() + 8 + self.bin.len();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
        out.extend_from_slice(&GLB_VERSION.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());

        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
        out.extend_from_slice(&json);

        out.extend_from_slice(&(self.bin.len() as u32).to_le_bytes());
        out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
        out.extend_from_slice(&self.bin);

        Ok(out)
    }
}

fn pad_to_four(bytes: &mut Vec<u8>, fill: u8) {
    while bytes.len() % 4 != 0 {
        bytes.push(fill);
    }
}
