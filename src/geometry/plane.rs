use super::Geometry;

/// Single-quad plane in the XY plane facing +Z, centred on the origin.
pub fn plane(width: f32, height: f32) -> Geometry {
    let (hw, hh) = (width * 0.5, height * 0.5);
    Geometry {
        positions: vec![
            [-hw, hh, 0.0],
            [hw, hh, 0.0],
            [-hw, -hh, 0.0],
            [hw, -hh, 0.0],
        ],
        normals: vec![[0.0, 0.0, 1.0]; 4],
        uvs: vec![[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]],
        indices: vec![0, 2, 1, 2, 3, 1],
    }
}
