//! Procedural meshes for the garden, generated on the CPU.
//!
//! All shapes are built with their base on the `y = 0` plane so that scaling
//! along `y` grows them upwards.

use std::f32::consts::TAU;

use crate::data_structures::model::ModelVertex;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Non-uniform scale; normals are transformed with the inverse transpose
    /// so they stay perpendicular to the squashed surface.
    pub fn scale(mut self, sx: f32, sy: f32, sz: f32) -> Self {
        for v in self.vertices.iter_mut() {
            v.position = [v.position[0] * sx, v.position[1] * sy, v.position[2] * sz];
            v.normal = normalize([v.normal[0] / sx, v.normal[1] / sy, v.normal[2] / sz]);
        }
        self
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.vertices.is_empty() || self.indices.is_empty() {
            anyhow::bail!("Mesh has no geometry");
        }
        if self.indices.len() % 3 != 0 {
            anyhow::bail!("Index count {} is not a multiple of 3", self.indices.len());
        }
        let n = self.vertices.len() as u32;
        if let Some(bad) = self.indices.iter().find(|i| **i >= n) {
            anyhow::bail!("Index {} out of range for {} vertices", bad, n);
        }
        Ok(())
    }

    fn push(&mut self, position: [f32; 3], normal: [f32; 3]) -> u32 {
        self.vertices.push(ModelVertex { position, normal });
        (self.vertices.len() - 1) as u32
    }
}

/// Capped frustum of a cone; `radius_top == 0` yields a cone without top cap.
pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);
    let mut mesh = MeshData::default();
    let slope = (radius_bottom - radius_top) / height;

    let ring = |radius: f32, y: f32, mesh: &mut MeshData| -> u32 {
        let first = mesh.vertices.len() as u32;
        for i in 0..=segments {
            let theta = i as f32 / segments as f32 * TAU;
            let (sin, cos) = theta.sin_cos();
            mesh.push(
                [radius * sin, y, radius * cos],
                normalize([sin, slope, cos]),
            );
        }
        first
    };
    let bottom = ring(radius_bottom, 0.0, &mut mesh);
    let top = ring(radius_top, height, &mut mesh);

    for i in 0..segments {
        let (b0, b1) = (bottom + i, bottom + i + 1);
        let (t0, t1) = (top + i, top + i + 1);
        mesh.indices.extend_from_slice(&[b0, b1, t1]);
        if radius_top > 0.0 {
            mesh.indices.extend_from_slice(&[b0, t1, t0]);
        }
    }

    cap(&mut mesh, radius_bottom, 0.0, segments, false);
    if radius_top > 0.0 {
        cap(&mut mesh, radius_top, height, segments, true);
    }
    mesh
}

pub fn cone(radius: f32, height: f32, segments: u32) -> MeshData {
    cylinder(0.0, radius, height, segments)
}

fn cap(mesh: &mut MeshData, radius: f32, y: f32, segments: u32, up: bool) {
    let normal = if up { [0.0, 1.0, 0.0] } else { [0.0, -1.0, 0.0] };
    let center = mesh.push([0.0, y, 0.0], normal);
    let first = mesh.vertices.len() as u32;
    for i in 0..=segments {
        let theta = i as f32 / segments as f32 * TAU;
        let (sin, cos) = theta.sin_cos();
        mesh.push([radius * sin, y, radius * cos], normal);
    }
    for i in 0..segments {
        let (a, b) = (first + i, first + i + 1);
        if up {
            mesh.indices.extend_from_slice(&[center, a, b]);
        } else {
            mesh.indices.extend_from_slice(&[center, b, a]);
        }
    }
}

/// Square on the `xz` plane centred on the origin, facing `+y`.
pub fn plane(width: f32, depth: f32) -> MeshData {
    let (hw, hd) = (width / 2.0, depth / 2.0);
    let up = [0.0, 1.0, 0.0];
    let mut mesh = MeshData::default();
    let a = mesh.push([-hw, 0.0, hd], up);
    let b = mesh.push([hw, 0.0, hd], up);
    let c = mesh.push([hw, 0.0, -hd], up);
    let d = mesh.push([-hw, 0.0, -hd], up);
    mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
    mesh
}

/// Flat-shaded octahedron with the given tip-to-tip size, used as a point sprite.
pub fn octahedron(size: f32) -> MeshData {
    let r = size / 2.0;
    let tips = [[0.0, r, 0.0], [0.0, -r, 0.0]];
    let equator = [[r, 0.0, 0.0], [0.0, 0.0, r], [-r, 0.0, 0.0], [0.0, 0.0, -r]];
    let mut mesh = MeshData::default();
    for (t, tip) in tips.iter().enumerate() {
        for i in 0..4 {
            let (p, q) = (equator[i], equator[(i + 1) % 4]);
            // Upper faces wind q -> p -> tip, lower ones the other way round.
            let tri = if t == 0 { [q, p, *tip] } else { [p, q, *tip] };
            let normal = normalize(cross(sub(tri[1], tri[0]), sub(tri[2], tri[0])));
            for corner in tri {
                let idx = mesh.push(corner, normal);
                mesh.indices.push(idx);
            }
        }
    }
    mesh
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if len == 0.0 {
        v
    } else {
        [v[0] / len, v[1] / len, v[2] / len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(mesh: &MeshData) -> ([f32; 3], [f32; 3]) {
        let mut lo = [f32::MAX; 3];
        let mut hi = [f32::MIN; 3];
        for v in &mesh.vertices {
            for a in 0..3 {
                lo[a] = lo[a].min(v.position[a]);
                hi[a] = hi[a].max(v.position[a]);
            }
        }
        (lo, hi)
    }

    #[test]
    fn stem_stands_on_the_ground_with_unit_height() {
        let stem = cylinder(0.08, 0.12, 1.0, 8);
        stem.validate().unwrap();
        let (lo, hi) = bounds(&stem);
        assert_eq!(lo[1], 0.0);
        assert!((hi[1] - 1.0).abs() < 1e-6);
        assert!((hi[0] - 0.12).abs() < 1e-3);
        // 8 quads on the side plus two 8-triangle caps
        assert_eq!(stem.triangle_count(), 16 + 8 + 8);
    }

    #[test]
    fn flattened_petal_keeps_unit_normals() {
        let petal = cone(0.6, 2.5, 8).scale(1.0, 1.0, 0.15);
        petal.validate().unwrap();
        let (lo, hi) = bounds(&petal);
        assert!((hi[1] - 2.5).abs() < 1e-6);
        assert!(hi[2] <= 0.6 * 0.15 + 1e-6 && lo[2] >= -0.6 * 0.15 - 1e-6);
        for v in &petal.vertices {
            let n = v.normal;
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn side_faces_point_outwards() {
        let stem = cylinder(0.1, 0.1, 1.0, 6);
        let tri = &stem.indices[0..3];
        let p: Vec<[f32; 3]> = tri.iter().map(|i| stem.vertices[*i as usize].position).collect();
        let n = cross(sub(p[1], p[0]), sub(p[2], p[0]));
        let centre = [
            (p[0][0] + p[1][0] + p[2][0]) / 3.0,
            0.0,
            (p[0][2] + p[1][2] + p[2][2]) / 3.0,
        ];
        assert!(n[0] * centre[0] + n[2] * centre[2] > 0.0);
    }

    #[test]
    fn plane_and_sprite_are_well_formed() {
        let ground = plane(200.0, 200.0);
        ground.validate().unwrap();
        let (lo, hi) = bounds(&ground);
        assert_eq!((lo[0], hi[0], lo[2], hi[2]), (-100.0, 100.0, -100.0, 100.0));

        let sprite = octahedron(0.15);
        sprite.validate().unwrap();
        assert_eq!(sprite.triangle_count(), 8);
        for v in &sprite.vertices {
            let c = v.position;
            // every face normal points away from the centre
            assert!(c[0] * v.normal[0] + c[1] * v.normal[1] + c[2] * v.normal[2] >= 0.0);
        }
    }

    #[test]
    fn empty_mesh_fails_validation() {
        assert!(MeshData::default().validate().is_err());
    }
}
