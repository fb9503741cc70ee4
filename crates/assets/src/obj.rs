//! Wavefront OBJ loading.
//!
//! Supports `v`, `vt`, `vn` and `f` records; everything else is skipped.
//! Faces may use any of the `v`, `v/vt`, `v//vn` and `v/vt/vn` corner forms,
//! with positive (1-based) or negative (relative) indices. Polygons with more
//! than three corners are fan-triangulated.
//!
//! OBJ indexes attributes separately, so every face corner becomes its own
//! vertex and the index buffer is sequential.

use crate::mesh::{MeshData, Vertex};
use glam::{Vec2, Vec3};
use std::io::BufRead;
use std::path::Path;

/// Conversions applied while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjOptions {
    /// Map `v` to `1 - v` so (0, 0) is the top-left texel.
    pub flip_v: bool,
    /// Negate Z of positions and normals and reverse the winding, for
    /// left-handed consumers.
    pub to_left_handed: bool,
}

impl Default for ObjOptions {
    fn default() -> Self {
        Self {
            flip_v: true,
            to_left_handed: false,
        }
    }
}

/// Errors from OBJ parsing.
#[derive(Debug, thiserror::Error)]
pub enum ObjError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
    #[error("line {line}: {kind} index {index} out of range (have {available})")]
    IndexOutOfRange {
        line: usize,
        kind: &'static str,
        index: i64,
        available: usize,
    },
    #[error("line {line}: face has {corners} corners, need at least 3")]
    DegenerateFace { line: usize, corners: usize },
    #[error("no faces found")]
    NoFaces,
}

/// One `v/vt/vn` reference, still unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Corner {
    position: i64,
    uv: Option<i64>,
    normal: Option<i64>,
}

#[derive(Default)]
struct ObjBuilder {
    positions: Vec<Vec3>,
    uvs: Vec<Vec2>,
    normals: Vec<Vec3>,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

/// Load an OBJ file from disk.
pub fn load_obj(path: impl AsRef<Path>, options: &ObjOptions) -> Result<MeshData, ObjError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let mesh = parse_obj(std::io::BufReader::new(file), options)?;
    tracing::info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "loaded OBJ mesh"
    );
    Ok(mesh)
}

/// Parse OBJ text held in memory.
pub fn parse_obj_str(source: &str, options: &ObjOptions) -> Result<MeshData, ObjError> {
    parse_obj(source.as_bytes(), options)
}

/// Parse OBJ records from any buffered reader and compute tangents.
pub fn parse_obj(reader: impl BufRead, options: &ObjOptions) -> Result<MeshData, ObjError> {
    let mut builder = ObjBuilder::default();

    for (n, line) in reader.lines().enumerate() {
        let line_no = n + 1;
        let line = line?;
        let content = line.split('#').next().unwrap_or_default();
        let mut parts = content.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };

        match tag {
            "v" => {
                let [x, y, z] = parse_floats::<3>(&mut parts, 3, line_no)?;
                builder.positions.push(Vec3::new(x, y, z));
            }
            "vt" => {
                // The third (w) component is optional and unused.
                let [u, v] = parse_floats::<2>(&mut parts, 1, line_no)?;
                builder.uvs.push(Vec2::new(u, v));
            }
            "vn" => {
                let [x, y, z] = parse_floats::<3>(&mut parts, 3, line_no)?;
                builder.normals.push(Vec3::new(x, y, z));
            }
            "f" => {
                let corners = parts
                    .map(|token| parse_corner(token, line_no))
                    .collect::<Result<Vec<_>, _>>()?;
                builder.add_face(&corners, line_no, options)?;
            }
            _ => {}
        }
    }

    if builder.indices.is_empty() {
        return Err(ObjError::NoFaces);
    }

    let mut mesh = MeshData::new(builder.vertices, builder.indices);
    let skipped = mesh.recompute_tangents();
    if skipped > 0 {
        tracing::warn!(skipped, "OBJ mesh has triangles with degenerate uv mapping");
    }
    Ok(mesh)
}

impl ObjBuilder {
    fn add_face(
        &mut self,
        corners: &[Corner],
        line: usize,
        options: &ObjOptions,
    ) -> Result<(), ObjError> {
        if corners.len() < 3 {
            return Err(ObjError::DegenerateFace {
                line,
                corners: corners.len(),
            });
        }

        let positions = corners
            .iter()
            .map(|c| resolve(c.position, &self.positions, "position", line))
            .collect::<Result<Vec<_>, _>>()?;
        let face_normal = (positions[1] - positions[0])
            .cross(positions[2] - positions[0])
            .normalize_or_zero();

        let mut face = Vec::with_capacity(corners.len());
        for (corner, position) in corners.iter().zip(positions) {
            let uv = match corner.uv {
                Some(i) => {
                    let uv = resolve(i, &self.uvs, "uv", line)?;
                    if options.flip_v {
                        Vec2::new(uv.x, 1.0 - uv.y)
                    } else {
                        uv
                    }
                }
                None => Vec2::ZERO,
            };
            let normal = match corner.normal {
                Some(i) => resolve(i, &self.normals, "normal", line)?,
                None => face_normal,
            };
            let mut vertex = Vertex::new(position, normal, uv);
            if options.to_left_handed {
                vertex.position.z = -vertex.position.z;
                vertex.normal.z = -vertex.normal.z;
            }
            face.push(vertex);
        }

        for i in 1..face.len() - 1 {
            let tri = if options.to_left_handed {
                [face[0], face[i + 1], face[i]]
            } else {
                [face[0], face[i], face[i + 1]]
            };
            for vertex in tri {
                self.indices.push(self.vertices.len() as u32);
                self.vertices.push(vertex);
            }
        }
        Ok(())
    }
}

/// Resolve a 1-based or negative OBJ index against an attribute list.
fn resolve<T: Copy>(raw: i64, items: &[T], kind: &'static str, line: usize) -> Result<T, ObjError> {
    let len = items.len() as i64;
    let index = if raw > 0 { raw - 1 } else { len + raw };
    if raw == 0 || index < 0 || index >= len {
        return Err(ObjError::IndexOutOfRange {
            line,
            kind,
            index: raw,
            available: items.len(),
        });
    }
    Ok(items[index as usize])
}

fn parse_corner(token: &str, line: usize) -> Result<Corner, ObjError> {
    let mut fields = token.split('/');
    let parse = |field: Option<&str>, required: bool| -> Result<Option<i64>, ObjError> {
        match field {
            Some(s) if !s.is_empty() => s.parse::<i64>().map(Some).map_err(|_| {
                ObjError::Malformed {
                    line,
                    message: format!("invalid face index '{s}' in '{token}'"),
                }
            }),
            _ if required => Err(ObjError::Malformed {
                line,
                message: format!("face corner '{token}' has no position index"),
            }),
            _ => Ok(None),
        }
    };

    let position = parse(fields.next(), true)?.unwrap_or_default();
    let uv = parse(fields.next(), false)?;
    let normal = parse(fields.next(), false)?;
    if fields.next().is_some() {
        return Err(ObjError::Malformed {
            line,
            message: format!("face corner '{token}' has too many fields"),
        });
    }
    Ok(Corner {
        position,
        uv,
        normal,
    })
}

/// Read up to `N` floats, requiring at least `required` of them. Missing
/// trailing values are zero.
fn parse_floats<'a, const N: usize>(
    parts: &mut impl Iterator<Item = &'a str>,
    required: usize,
    line: usize,
) -> Result<[f32; N], ObjError> {
    let mut out = [0.0; N];
    for (i, slot) in out.iter_mut().enumerate() {
        match parts.next() {
            Some(s) => {
                *slot = s.parse().map_err(|_| ObjError::Malformed {
                    line,
                    message: format!("invalid number '{s}'"),
                })?;
            }
            None if i < required => {
                return Err(ObjError::Malformed {
                    line,
                    message: format!("expected {required} values, found {i}"),
                });
            }
            None => break,
        }
    }
    Ok(out)
}
