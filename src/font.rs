//! Typeface JSON fonts.
//!
//! A typeface file maps each character to an advance (`ha`) and an outline
//! command string in font units:
//!
//! - `m x y` move to
//! - `l x y` line to
//! - `q x y cx cy` quadratic curve to `(x, y)` with control `(cx, cy)`
//! - `b x y c1x c1y c2x c2y` cubic curve to `(x, y)`
//!
//! Outlines are flattened to polylines when a string is laid out.

use std::collections::HashMap;
use std::str::SplitWhitespace;

use glam::Vec2;
use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    #[serde(default)]
    pub x_min: f32,
    #[serde(default)]
    pub x_max: f32,
    #[serde(default)]
    pub y_min: f32,
    #[serde(default)]
    pub y_max: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Glyph {
    pub ha: f32,
    #[serde(default)]
    pub x_min: Option<f32>,
    #[serde(default)]
    pub x_max: Option<f32>,
    /// Outline commands; absent for blank glyphs such as space.
    #[serde(default)]
    pub o: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    #[serde(default)]
    pub family_name: String,
    pub glyphs: HashMap<String, Glyph>,
    pub resolution: f32,
    #[serde(default)]
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub underline_thickness: f32,
}

/// One laid-out glyph: closed polylines, already scaled and positioned.
/// Outer contours and holes are both present; winding is whatever the font used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    pub contours: Vec<Vec<Vec2>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Move(Vec2),
    Line(Vec2),
    Quad { to: Vec2, ctrl: Vec2 },
    Cubic { to: Vec2, c1: Vec2, c2: Vec2 },
}

fn next_number(tokens: &mut SplitWhitespace<'_>) -> Result<f32> {
    let t = tokens
        .next()
        .ok_or_else(|| Error::Font("truncated outline".into()))?;
    t.parse::<f32>()
        .map_err(|_| Error::Font(format!("bad outline number {t:?}")))
}

fn next_point(tokens: &mut SplitWhitespace<'_>) -> Result<Vec2> {
    Ok(Vec2::new(next_number(tokens)?, next_number(tokens)?))
}

fn parse_commands(src: &str) -> Result<Vec<Command>> {
    let mut tokens = src.split_whitespace();
    let mut out = Vec::new();

    while let Some(op) = tokens.next() {
        let cmd = match op {
            "m" => Command::Move(next_point(&mut tokens)?),
            "l" => Command::Line(next_point(&mut tokens)?),
            "q" => {
                let to = next_point(&mut tokens)?;
                let ctrl = next_point(&mut tokens)?;
                Command::Quad { to, ctrl }
            }
            "b" => {
                let to = next_point(&mut tokens)?;
                let c1 = next_point(&mut tokens)?;
                let c2 = next_point(&mut tokens)?;
                Command::Cubic { to, c1, c2 }
            }
            // Some exporters emit an explicit close; contours are closed anyway.
            "z" => continue,
            other => return Err(Error::Font(format!("unknown outline command {other:?}"))),
        };
        out.push(cmd);
    }
    Ok(out)
}

fn push_point(contour: &mut Vec<Vec2>, p: Vec2) {
    if contour.last().is_some_and(|last| last.distance_squared(p) < 1e-12) {
        return;
    }
    contour.push(p);
}

fn finish_contour(contours: &mut Vec<Vec<Vec2>>, mut contour: Vec<Vec2>) {
    while contour.len() > 1 && contour[0].distance_squared(contour[contour.len() - 1]) < 1e-12 {
        contour.pop();
    }
    if contour.len() >= 3 {
        contours.push(contour);
    }
}

impl Font {
    pub fn from_json(src: &str) -> Result<Self> {
        let font: Font = serde_json::from_str(src)?;
        if font.resolution <= 0.0 {
            return Err(Error::Font(format!(
                "invalid resolution {}",
                font.resolution
            )));
        }
        Ok(font)
    }

    /// The glyph for `ch`, falling back to `?`.
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        let mut buf = [0u8; 4];
        self.glyphs
            .get(&*ch.encode_utf8(&mut buf))
            .or_else(|| self.glyphs.get("?"))
    }

    pub fn line_height(&self, size: f32) -> f32 {
        let bb = &self.bounding_box;
        (bb.y_max - bb.y_min + self.underline_thickness) * size / self.resolution
    }

    /// Flattens one glyph at `scale`, translated by `offset`.
    fn glyph_outline(
        &self,
        glyph: &Glyph,
        scale: f32,
        offset: Vec2,
        curve_segments: u32,
    ) -> Result<Outline> {
        let segments = curve_segments.max(1);
        let mut contours = Vec::new();
        let mut current: Vec<Vec2> = Vec::new();
        let map = |p: Vec2| p * scale + offset;

        let Some(src) = glyph.o.as_deref() else {
            return Ok(Outline::default());
        };

        for cmd in parse_commands(src)? {
            match cmd {
                Command::Move(p) => {
                    finish_contour(&mut contours, std::mem::take(&mut current));
                    current.push(map(p));
                }
                Command::Line(p) => push_point(&mut current, map(p)),
                Command::Quad { to, ctrl } => {
                    let p0 = *current
                        .last()
                        .ok_or_else(|| Error::Font("curve before move".into()))?;
                    let (c, p1) = (map(ctrl), map(to));
                    for i in 1..=segments {
                        let t = i as f32 / segments as f32;
                        let u = 1.0 - t;
                        push_point(&mut current, p0 * (u * u) + c * (2.0 * u * t) + p1 * (t * t));
                    }
                }
                Command::Cubic { to, c1, c2 } => {
                    let p0 = *current
                        .last()
                        .ok_or_else(|| Error::Font("curve before move".into()))?;
                    let (c1, c2, p1) = (map(c1), map(c2), map(to));
                    for i in 1..=segments {
                        let t = i as f32 / segments as f32;
                        let u = 1.0 - t;
                        let p = p0 * (u * u * u)
                            + c1 * (3.0 * u * u * t)
                            + c2 * (3.0 * u * t * t)
                            + p1 * (t * t * t);
                        push_point(&mut current, p);
                    }
                }
            }
        }
        finish_contour(&mut contours, current);
        Ok(Outline { contours })
    }

    /// Lays `text` out left to right at `size` units per em-resolution and
    /// returns one outline per visible glyph. `\n` starts a new line below.
    ///
    /// Characters with neither a glyph nor a `?` fallback are skipped.
    pub fn generate_shapes(&self, text: &str, size: f32, curve_segments: u32) -> Result<Vec<Outline>> {
        let scale = size / self.resolution;
        let line_height = self.line_height(size);
        let mut offset = Vec2::ZERO;
        let mut out = Vec::new();

        for ch in text.chars() {
            if ch == '\n' {
                offset.x = 0.0;
                offset.y -= line_height;
                continue;
            }
            let Some(glyph) = self.glyph(ch) else {
                log::error!(
                    "font {:?}: character {ch:?} does not exist in the font",
                    self.family_name
                );
                continue;
            };
            let outline = self.glyph_outline(glyph, scale, offset, curve_segments)?;
            if !outline.contours.is_empty() {
                out.push(outline);
            }
            offset.x += glyph.ha * scale;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FONT: &str = r#"{
        "familyName": "Test",
        "resolution": 1000,
        "underlineThickness": 50,
        "boundingBox": { "xMin": 0, "xMax": 1000, "yMin": -200, "yMax": 950 },
        "glyphs": {
            "I": { "ha": 400, "x_min": 0, "x_max": 300, "o": "m 0 0 l 300 0 l 300 700 l 0 700 l 0 0 z" },
            "?": { "ha": 500, "o": "m 0 0 l 100 0 l 100 100 l 0 100" },
            " ": { "ha": 250 },
            "D": { "ha": 600, "o": "m 0 0 l 500 0 q 500 700 600 350 l 0 700" },
            "S": { "ha": 600, "o": "m 0 0 l 500 0 b 500 700 600 200 600 500 l 0 700" }
        }
    }"#;

    fn font() -> Font {
        Font::from_json(FONT).unwrap()
    }

    fn near(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-5
    }

    #[test]
    fn parses_and_drops_closing_duplicate() {
        let shapes = font().generate_shapes("I", 1.0, 4).unwrap();
        assert_eq!(shapes.len(), 1);
        let c = &shapes[0].contours[0];
        assert_eq!(c.len(), 4);
        assert!(near(c[2], Vec2::new(0.3, 0.7)));
    }

    #[test]
    fn advances_by_ha_and_skips_blank_glyphs() {
        let shapes = font().generate_shapes("I I", 1.0, 4).unwrap();
        assert_eq!(shapes.len(), 2);
        // 0.4 for "I", 0.25 for the space.
        assert!((shapes[1].contours[0][0].x - 0.65).abs() < 1e-6);
    }

    #[test]
    fn unknown_characters_fall_back_to_question_mark() {
        let shapes = font().generate_shapes("#", 2.0, 4).unwrap();
        assert_eq!(shapes.len(), 1);
        assert!(near(shapes[0].contours[0][1], Vec2::new(0.2, 0.0)));
    }

    #[test]
    fn newline_moves_down_one_line() {
        let f = font();
        let shapes = f.generate_shapes("I\nI", 1.0, 4).unwrap();
        assert!((f.line_height(1.0) - 1.2).abs() < 1e-6);
        assert!(near(shapes[1].contours[0][0], Vec2::new(0.0, -1.2)));
    }

    #[test]
    fn curves_are_flattened_by_segment_count() {
        let f = font();
        let d = &f.generate_shapes("D", 1.0, 8).unwrap()[0].contours[0];
        // move, line, 8 curve points, line
        assert_eq!(d.len(), 11);
        assert!(near(d[9], Vec2::new(0.5, 0.7)));
        let s = &f.generate_shapes("S", 1.0, 5).unwrap()[0].contours[0];
        assert_eq!(s.len(), 8);
    }

    #[test]
    fn rejects_bad_outline() {
        let bad = r#"{"resolution": 1000, "glyphs": {"A": {"ha": 1, "o": "m 0 x"}}}"#;
        let f = Font::from_json(bad).unwrap();
        assert!(matches!(f.generate_shapes("A", 1.0, 4), Err(Error::Font(_))));
        assert!(Font::from_json("{").is_err());
        assert!(Font::from_json(r#"{"resolution": 0, "glyphs": {}}"#).is_err());
    }
}
