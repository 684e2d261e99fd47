//! Indexed triangle meshes and the generators the scene uses.

pub mod plane;
pub mod text;
pub mod torus;

use glam::Vec3;

pub use plane::plane;
pub use text::extrude;
pub use torus::torus;

/// Indexed triangle list. `normals` and `uvs` are per-vertex and either empty or
/// the same length as `positions`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

/// Axis-aligned bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

impl Geometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounding_box(&self) -> Option<Aabb> {
        let mut it = self.positions.iter().map(|p| Vec3::from_array(*p));
        let first = it.next()?;
        let (min, max) = it.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Aabb { min, max })
    }

    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p = (Vec3::from_array(*p) + offset).to_array();
        }
    }

    /// Moves the geometry so its bounding-box centre sits on the local origin.
    pub fn center(&mut self) {
        if let Some(bb) = self.bounding_box() {
            self.translate(-bb.center());
        }
    }

    /// Appends `other`, offsetting its indices.
    pub fn merge(&mut self, other: &Geometry) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);
        self.indices.extend(other.indices.iter().map(|i| base + i));
    }

    /// Area-weighted smooth normals from the triangle list.
    pub fn compute_vertex_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let pa = Vec3::from_array(self.positions[a]);
            let pb = Vec3::from_array(self.positions[b]);
            let pc = Vec3::from_array(self.positions[c]);
            let n = (pb - pa).cross(pc - pa);
            acc[a] += n;
            acc[b] += n;
            acc[c] += n;
        }
        self.normals = acc
            .into_iter()
            .map(|n| n.normalize_or_zero().to_array())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_moves_bbox_to_origin() {
        let mut g = Geometry {
            positions: vec![[1.0, 2.0, 3.0], [3.0, 6.0, 5.0]],
            ..Default::default()
        };
        g.center();
        let bb = g.bounding_box().unwrap();
        assert!(bb.center().length() < 1e-6);
        assert_eq!(bb.size(), Vec3::new(2.0, 4.0, 2.0));
    }

    #[test]
    fn empty_geometry_has_no_bounds() {
        assert!(Geometry::default().bounding_box().is_none());
        let mut g = Geometry::default();
        g.center();
        assert!(g.positions.is_empty());
    }

    #[test]
    fn merge_offsets_indices() {
        let tri = Geometry {
            positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            indices: vec![0, 1, 2],
            ..Default::default()
        };
        let mut g = tri.clone();
        g.merge(&tri);
        assert_eq!(g.indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn normals_follow_winding() {
        let mut g = Geometry {
            positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            indices: vec![0, 1, 2],
            ..Default::default()
        };
        g.compute_vertex_normals();
        assert_eq!(g.normals, vec![[0.0, 0.0, 1.0]; 3]);
    }
}
