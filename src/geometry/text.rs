//! Extruded, bevelled solids from flattened glyph outlines.
//!
//! Each glyph becomes a front cap, a back cap and a ring of side walls. With
//! bevelling on, the walls are split into rings along Z: the back bevel, the
//! straight section from `z = 0` to `z = depth`, then the mirrored front bevel.
//! Ring `t` of a bevel sits `bevel_thickness * cos(t·π/2)` beyond the straight
//! section and pushes the contour outwards by
//! `bevel_size * sin(t·π/2) + bevel_offset`.

use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
};

use super::Geometry;
use crate::config::TextGeometryOptions;
use crate::error::{Error, Result};
use crate::font::Outline;

/// One ring of the side wall: its Z and how far the contour is pushed out.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Ring {
    z: f32,
    offset: f32,
}

fn rings(opts: &TextGeometryOptions) -> Vec<Ring> {
    if !opts.bevel_enabled {
        return vec![
            Ring { z: 0.0, offset: 0.0 },
            Ring {
                z: opts.depth,
                offset: 0.0,
            },
        ];
    }

    let segments = opts.bevel_segments.max(1);
    let profile = |k: u32| {
        let t = k as f32 / segments as f32;
        let z = opts.bevel_thickness * (t * FRAC_PI_2).cos();
        let offset = opts.bevel_size * (t * FRAC_PI_2).sin() + opts.bevel_offset;
        (z, offset)
    };

    let mut out = Vec::with_capacity(2 * segments as usize + 2);
    for k in 0..segments {
        let (z, offset) = profile(k);
        out.push(Ring { z: -z, offset });
    }
    let full = opts.bevel_size + opts.bevel_offset;
    out.push(Ring { z: 0.0, offset: full });
    out.push(Ring {
        z: opts.depth,
        offset: full,
    });
    for k in (0..segments).rev() {
        let (z, offset) = profile(k);
        out.push(Ring {
            z: opts.depth + z,
            offset,
        });
    }
    out
}

fn signed_area(contour: &[Vec2]) -> f32 {
    let n = contour.len();
    (0..n)
        .map(|i| contour[i].perp_dot(contour[(i + 1) % n]))
        .sum::<f32>()
        * 0.5
}

fn contains(contour: &[Vec2], p: Vec2) -> bool {
    let n = contour.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (contour[i], contour[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// A contour ready for extrusion.
struct Prepared<'a> {
    points: &'a [Vec2],
    /// Per-vertex direction that moves the contour out of the solid, scaled so
    /// that each adjacent edge moves by one unit.
    push: Vec<Vec2>,
    /// +1 when `(dy, -dx)` of each edge faces out of the solid, -1 otherwise.
    out_sign: f32,
}

fn prepare(contours: &[Vec<Vec2>]) -> Vec<Prepared<'_>> {
    contours
        .iter()
        .enumerate()
        .map(|(idx, points)| {
            let depth = contours
                .iter()
                .enumerate()
                .filter(|(other, c)| *other != idx && contains(c, points[0]))
                .count();
            let is_hole = depth % 2 == 1;
            let ccw = signed_area(points) > 0.0;
            let out_sign = match (ccw, is_hole) {
                (true, false) | (false, true) => 1.0,
                _ => -1.0,
            };

            let n = points.len();
            let edge_normal = |i: usize| {
                let d = points[(i + 1) % n] - points[i];
                Vec2::new(d.y, -d.x).normalize_or_zero() * out_sign
            };
            let push = (0..n)
                .map(|i| {
                    let prev = edge_normal((i + n - 1) % n);
                    let next = edge_normal(i);
                    let miter = (prev + next).normalize_or_zero();
                    // Clamp sharp corners so spikes stay bounded.
                    let cos = miter.dot(next).max(0.5);
                    miter / cos
                })
                .collect();

            Prepared {
                points,
                push,
                out_sign,
            }
        })
        .collect()
}

/// Cap outline with outer contours wound CCW and holes CW, so a non-zero fill
/// cuts holes out whatever winding the font used.
fn cap_path(prepared: &[Prepared<'_>], offset: f32) -> Path {
    let mut b = Path::builder();
    for c in prepared {
        let at = |i: usize| {
            let p = c.points[i] + c.push[i] * offset;
            point(p.x, p.y)
        };
        let n = c.points.len();
        let order: Vec<usize> = if c.out_sign > 0.0 {
            (0..n).collect()
        } else {
            (0..n).rev().collect()
        };
        b.begin(at(order[0]));
        for &i in &order[1..] {
            b.line_to(at(i));
        }
        b.close();
    }
    b.build()
}

fn tessellate_cap(path: &Path) -> Result<VertexBuffers<[f32; 2], u32>> {
    let mut buffers: VertexBuffers<[f32; 2], u32> = VertexBuffers::new();
    let mut tess = FillTessellator::new();
    tess.tessellate_path(
        path,
        &FillOptions::default().with_fill_rule(FillRule::NonZero),
        &mut BuffersBuilder::new(&mut buffers, |v: FillVertex| v.position().to_array()),
    )
    .map_err(|e| Error::Tessellation(format!("{e:?}")))?;
    Ok(buffers)
}

/// Emits a cap at `z`, wound to face `+Z` when `front`, `-Z` otherwise.
fn emit_cap(g: &mut Geometry, cap: &VertexBuffers<[f32; 2], u32>, z: f32, front: bool) {
    let base = g.positions.len() as u32;
    let nz = if front { 1.0 } else { -1.0 };
    for v in &cap.vertices {
        g.positions.push([v[0], v[1], z]);
        g.normals.push([0.0, 0.0, nz]);
        g.uvs.push(*v);
    }
    for tri in cap.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]];
        let (pa, pb, pc) = (
            Vec2::from_array(cap.vertices[a as usize]),
            Vec2::from_array(cap.vertices[b as usize]),
            Vec2::from_array(cap.vertices[c as usize]),
        );
        let ccw = (pb - pa).perp_dot(pc - pa) > 0.0;
        if ccw == front {
            g.indices.extend_from_slice(&[base + a, base + b, base + c]);
        } else {
            g.indices.extend_from_slice(&[base + a, base + c, base + b]);
        }
    }
}

fn emit_walls(g: &mut Geometry, c: &Prepared<'_>, rings: &[Ring]) {
    let n = c.points.len();
    let at = |i: usize, r: Ring| {
        let p = c.points[i % n] + c.push[i % n] * r.offset;
        Vec3::new(p.x, p.y, r.z)
    };

    for pair in rings.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if (hi.z - lo.z).abs() < f32::EPSILON && (hi.offset - lo.offset).abs() < f32::EPSILON {
            continue;
        }
        for i in 0..n {
            let a = at(i, lo);
            let b = at(i + 1, lo);
            let cc = at(i + 1, hi);
            let d = at(i, hi);
            let normal = ((cc - a).cross(d - b) * c.out_sign).normalize_or_zero();

            let base = g.positions.len() as u32;
            for p in [a, b, cc, d] {
                g.positions.push(p.to_array());
                g.normals.push(normal.to_array());
                g.uvs.push([p.x, p.z]);
            }
            if c.out_sign > 0.0 {
                g.indices
                    .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
            } else {
                g.indices
                    .extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
            }
        }
    }
}

/// Extrudes laid-out glyph outlines into one mesh. The result is not centred.
pub fn extrude(outlines: &[Outline], opts: &TextGeometryOptions) -> Result<Geometry> {
    let rings = rings(opts);
    let (back, front) = (rings[0], rings[rings.len() - 1]);
    let mut g = Geometry::default();

    for outline in outlines {
        let prepared = prepare(&outline.contours);
        if prepared.is_empty() {
            continue;
        }
        let cap = tessellate_cap(&cap_path(&prepared, back.offset))?;
        emit_cap(&mut g, &cap, back.z, false);
        emit_cap(&mut g, &cap, front.z, true);
        for c in &prepared {
            emit_walls(&mut g, c, &rings);
        }
    }
    Ok(g)
}
