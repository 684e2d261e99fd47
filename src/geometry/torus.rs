use std::f32::consts::TAU;

use glam::Vec3;

use super::Geometry;
use crate::config::TorusOptions;

/// Torus in the XY plane around the Z axis.
///
/// `radius` is the distance from the centre to the middle of the tube, `tube`
/// the tube radius. Produces `(radial + 1) * (tubular + 1)` vertices with the
/// seam duplicated so uvs wrap cleanly.
pub fn torus(opts: &TorusOptions) -> Geometry {
    let radial = opts.radial_segments.max(2);
    let tubular = opts.tubular_segments.max(3);
    let row = tubular + 1;

    let mut g = Geometry::default();
    for j in 0..=radial {
        for i in 0..=tubular {
            let u = i as f32 / tubular as f32 * TAU;
            let v = j as f32 / radial as f32 * TAU;

            let ring = opts.radius + opts.tube * v.cos();
            let p = Vec3::new(ring * u.cos(), ring * u.sin(), opts.tube * v.sin());
            let center = Vec3::new(opts.radius * u.cos(), opts.radius * u.sin(), 0.0);

            g.positions.push(p.to_array());
            g.normals.push((p - center).normalize_or_zero().to_array());
            g.uvs
                .push([i as f32 / tubular as f32, j as f32 / radial as f32]);
        }
    }

    for j in 1..=radial {
        for i in 1..=tubular {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            g.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    g
}
