use serde::{Deserialize, Serialize};
use std::path::Path;

/// How texel values should be interpreted when sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorSpace {
    /// Colour data (albedo, sky).
    #[default]
    Srgb,
    /// Non-colour data such as normal maps.
    Linear,
}

/// Errors from texture loading.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("texture has zero size")]
    Empty,
    #[error("{size}px texture exceeds the {max}px limit")]
    TooLarge { size: u32, max: u32 },
    #[error("cubemap face {face} is {width}x{height}, faces must be square")]
    NonSquareFace { face: usize, width: u32, height: u32 },
    #[error("cubemap face {face} is {found}px, expected {expected}px")]
    FaceSizeMismatch {
        face: usize,
        expected: u32,
        found: u32,
    },
}

/// Largest edge of a generated texture, matching wgpu's default
/// `max_texture_dimension_2d`.
pub const MAX_GENERATED_SIZE: u32 = 8192;

fn generated_len(size: u32) -> Result<usize, TextureError> {
    if size > MAX_GENERATED_SIZE {
        return Err(TextureError::TooLarge {
            size,
            max: MAX_GENERATED_SIZE,
        });
    }
    let side = size as usize;
    side.checked_mul(side)
        .and_then(|n| n.checked_mul(4))
        .ok_or(TextureError::TooLarge {
            size,
            max: MAX_GENERATED_SIZE,
        })
}

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    /// Decode a PNG or JPEG file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let image = image::open(path)?.to_rgba8();
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty);
        }
        tracing::info!(path = %path.display(), width, height, "loaded texture");
        Ok(Self {
            width,
            height,
            rgba: image.into_raw(),
        })
    }

    /// Decode an in-memory PNG or JPEG.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, TextureError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty);
        }
        Ok(Self {
            width,
            height,
            rgba: image.into_raw(),
        })
    }

    /// 1x1 texture of a single colour.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: rgba.to_vec(),
        }
    }

    /// Square checkerboard of `cells x cells` squares alternating `a` and `b`.
    pub fn checker(size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> Result<Self, TextureError> {
        let size = size.max(1);
        let cell = (size / cells.max(1)).max(1);
        let mut rgba = Vec::with_capacity(generated_len(size)?);
        for y in 0..size {
            for x in 0..size {
                let c = if ((x / cell) + (y / cell)) % 2 == 0 { a } else { b };
                rgba.extend_from_slice(&c);
            }
        }
        Ok(Self {
            width: size,
            height: size,
            rgba,
        })
    }

    /// Tangent-space normal map pointing straight out of the surface.
    pub fn flat_normal() -> Self {
        Self::solid([128, 128, 255, 255])
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let p = self.rgba.get(i..i + 4)?;
        Some([p[0], p[1], p[2], p[3]])
    }
}

/// Six square faces of equal size, ordered +X, -X, +Y, -Y, +Z, -Z.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubemapData {
    size: u32,
    faces: [TextureData; 6],
}

impl CubemapData {
    pub const FACE_LABELS: [&'static str; 6] = ["right", "left", "up", "down", "front", "back"];

    pub fn from_faces(faces: [TextureData; 6]) -> Result<Self, TextureError> {
        let size = faces[0].width;
        for (face, tex) in faces.iter().enumerate() {
            if tex.width != tex.height {
                return Err(TextureError::NonSquareFace {
                    face,
                    width: tex.width,
                    height: tex.height,
                });
            }
            if tex.width != size {
                return Err(TextureError::FaceSizeMismatch {
                    face,
                    expected: size,
                    found: tex.width,
                });
            }
        }
        if size == 0 {
            return Err(TextureError::Empty);
        }
        Ok(Self { size, faces })
    }

    /// Load six face images in +X, -X, +Y, -Y, +Z, -Z order.
    pub fn load<P: AsRef<Path>>(paths: &[P; 6]) -> Result<Self, TextureError> {
        let faces = [
            TextureData::load(&paths[0])?,
            TextureData::load(&paths[1])?,
            TextureData::load(&paths[2])?,
            TextureData::load(&paths[3])?,
            TextureData::load(&paths[4])?,
            TextureData::load(&paths[5])?,
        ];
        Self::from_faces(faces)
    }

    /// Uniformly coloured cubemap.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            size: 1,
            faces: std::array::from_fn(|_| TextureData::solid(rgba)),
        }
    }

    /// Vertical gradient: `top` on +Y, `bottom` on -Y, blended on the sides.
    pub fn gradient(size: u32, top: [u8; 4], bottom: [u8; 4]) -> Result<Self, TextureError> {
        let size = size.max(2);
        let len = generated_len(size)?;
        let lerp = |t: f32| -> [u8; 4] {
            std::array::from_fn(|i| (top[i] as f32 + (bottom[i] as f32 - top[i] as f32) * t) as u8)
        };
        let side = {
            let mut rgba = Vec::with_capacity(len);
            for y in 0..size {
                let c = lerp(y as f32 / (size - 1) as f32);
                for _ in 0..size {
                    rgba.extend_from_slice(&c);
                }
            }
            TextureData {
                width: size,
                height: size,
                rgba,
            }
        };
        let flat = |c: [u8; 4]| TextureData {
            width: size,
            height: size,
            rgba: c.repeat(len / 4),
        };
        Ok(Self {
            size,
            faces: [
                side.clone(),
                side.clone(),
                flat(top),
                flat(bottom),
                side.clone(),
                side,
            ],
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn faces(&self) -> &[TextureData; 6] {
        &self.faces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_is_single_pixel() {
        let t = TextureData::solid([1, 2, 3, 4]);
        assert_eq!((t.width, t.height), (1, 1));
        assert_eq!(t.pixel(0, 0), Some([1, 2, 3, 4]));
        assert_eq!(t.pixel(1, 0), None);
    }

    #[test]
    fn checker_alternates() {
        let a = [255, 255, 255, 255];
        let b = [0, 0, 0, 255];
        let t = TextureData::checker(8, 4, a, b).unwrap();
        assert_eq!(t.rgba.len(), 8 * 8 * 4);
        assert_eq!(t.pixel(0, 0), Some(a));
        assert_eq!(t.pixel(2, 0), Some(b));
        assert_eq!(t.pixel(2, 2), Some(a));
    }

    #[test]
    fn flat_normal_points_out() {
        assert_eq!(TextureData::flat_normal().pixel(0, 0), Some([128, 128, 255, 255]));
    }

    #[test]
    fn round_trip_through_png_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        let t = TextureData::checker(4, 2, [255, 0, 0, 255], [0, 0, 255, 255]).unwrap();
        image::RgbaImage::from_raw(t.width, t.height, t.rgba.clone())
            .unwrap()
            .save(&path)
            .unwrap();

        let loaded = TextureData::load(&path).unwrap();
        assert_eq!(loaded, t);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TextureData::load(dir.path().join("missing.png")).is_err());
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            TextureData::from_encoded(b"not an image"),
            Err(TextureError::Image(_))
        ));
    }

    #[test]
    fn cubemap_requires_matching_square_faces() {
        let face = || TextureData::checker(4, 2, [0; 4], [255; 4]).unwrap();
        let ok = CubemapData::from_faces(std::array::from_fn(|_| face())).unwrap();
        assert_eq!(ok.size(), 4);

        let mut faces: [TextureData; 6] = std::array::from_fn(|_| face());
        faces[3] = TextureData::checker(8, 2, [0; 4], [255; 4]).unwrap();
        assert!(matches!(
            CubemapData::from_faces(faces),
            Err(TextureError::FaceSizeMismatch { face: 3, .. })
        ));

        let mut faces: [TextureData; 6] = std::array::from_fn(|_| face());
        faces[0] = TextureData {
            width: 4,
            height: 2,
            rgba: vec![0; 32],
        };
        assert!(matches!(
            CubemapData::from_faces(faces),
            Err(TextureError::NonSquareFace { face: 0, .. })
        ));
    }

    #[test]
    fn gradient_sides_blend_top_to_bottom() {
        let sky = CubemapData::gradient(4, [0, 0, 255, 255], [255, 255, 255, 255]).unwrap();
        let side = &sky.faces()[0];
        assert_eq!(side.pixel(0, 0), Some([0, 0, 255, 255]));
        assert_eq!(side.pixel(0, 3), Some([255, 255, 255, 255]));
        assert_eq!(sky.faces()[2].pixel(1, 1), Some([0, 0, 255, 255]));
    }

    #[test]
    fn oversized_generated_textures_are_rejected() {
        assert!(matches!(
            TextureData::checker(40_000, 8, [0; 4], [255; 4]),
            Err(TextureError::TooLarge { size: 40_000, .. })
        ));
        assert!(matches!(
            CubemapData::gradient(70_000, [0; 4], [255; 4]),
            Err(TextureError::TooLarge { .. })
        ));
    }
}
