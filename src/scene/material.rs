use super::TextureId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Double,
}

/// Metal/roughness surface lit by the scene lights, optionally reflecting a cube
/// map and cut out by an alpha map.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardMaterial {
    pub color: [f32; 3],
    pub metalness: f32,
    pub roughness: f32,
    pub transparent: bool,
    pub alpha_map: Option<TextureId>,
    pub env_map: Option<TextureId>,
    pub env_map_intensity: f32,
    pub side: Side,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            metalness: 0.0,
            roughness: 1.0,
            transparent: false,
            alpha_map: None,
            env_map: None,
            env_map_intensity: 1.0,
            side: Side::Front,
        }
    }
}

/// Colours each fragment by its view-space normal. Unlit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalMaterial {
    pub side: Side,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Standard(StandardMaterial),
    Normal(NormalMaterial),
}

impl Material {
    pub fn is_transparent(&self) -> bool {
        matches!(self, Material::Standard(m) if m.transparent)
    }

    pub fn side(&self) -> Side {
        match self {
            Material::Standard(m) => m.side,
            Material::Normal(m) => m.side,
        }
    }
}

/// Parses `#rrggbb` (or `rrggbb`) into linear-ish 0..1 floats.
pub fn parse_hex_color(s: &str) -> Option<[f32; 3]> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([
        channel(0)? as f32 / 255.0,
        channel(2)? as f32 / 255.0,
        channel(4)? as f32 / 255.0,
    ])
}
