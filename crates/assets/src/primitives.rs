//! Procedural meshes. All are centred on the origin, roughly two units
//! across, wound counter-clockwise when seen from outside, and carry
//! normals, uvs and tangents.

use crate::mesh::{MeshData, Vertex};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

/// Built-in shapes that scenes can reference by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    Cube,
    Sphere,
    Cylinder,
    Torus,
    Quad,
    QuadDoubleSided,
}

impl Primitive {
    pub const ALL: [Primitive; 6] = [
        Primitive::Cube,
        Primitive::Sphere,
        Primitive::Cylinder,
        Primitive::Torus,
        Primitive::Quad,
        Primitive::QuadDoubleSided,
    ];

    pub fn build(self) -> MeshData {
        match self {
            Primitive::Cube => cube(1.0),
            Primitive::Sphere => sphere(1.0, 32, 16),
            Primitive::Cylinder => cylinder(1.0, 2.0, 32),
            Primitive::Torus => torus(0.75, 0.25, 32, 16),
            Primitive::Quad => quad(1.0, false),
            Primitive::QuadDoubleSided => quad(1.0, true),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Primitive::Cube => "Cube",
            Primitive::Sphere => "Sphere",
            Primitive::Cylinder => "Cylinder",
            Primitive::Torus => "Torus",
            Primitive::Quad => "Quad",
            Primitive::QuadDoubleSided => "Quad_Double",
        }
    }
}

/// Axis-aligned cube with the given half extent, 24 vertices.
pub fn cube(half: f32) -> MeshData {
    let p = half;
    // Each face lists bottom-left, bottom-right, top-right, top-left as seen
    // from outside.
    #[rustfmt::skip]
    let faces: [(Vec3, [[f32; 3]; 4]); 6] = [
        (Vec3::Z,     [[-p, -p,  p], [ p, -p,  p], [ p,  p,  p], [-p,  p,  p]]),
        (Vec3::NEG_Z, [[ p, -p, -p], [-p, -p, -p], [-p,  p, -p], [ p,  p, -p]]),
        (Vec3::X,     [[ p, -p,  p], [ p, -p, -p], [ p,  p, -p], [ p,  p,  p]]),
        (Vec3::NEG_X, [[-p, -p, -p], [-p, -p,  p], [-p,  p,  p], [-p,  p, -p]]),
        (Vec3::Y,     [[-p,  p,  p], [ p,  p,  p], [ p,  p, -p], [-p,  p, -p]]),
        (Vec3::NEG_Y, [[-p, -p, -p], [ p, -p, -p], [ p, -p,  p], [-p, -p,  p]]),
    ];
    let uvs = [
        Vec2::new(0.0, 1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 0.0),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u32;
        for (corner, uv) in corners.iter().zip(uvs) {
            vertices.push(Vertex::new(Vec3::from_array(*corner), normal, uv));
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    finish(vertices, indices)
}

/// UV sphere.
pub fn sphere(radius: f32, slices: u32, stacks: u32) -> MeshData {
    grid(slices, stacks, |u, v| {
        let theta = u * TAU;
        let phi = v * PI;
        let n = Vec3::new(phi.sin() * theta.sin(), phi.cos(), phi.sin() * theta.cos());
        (n * radius, n)
    })
}

/// Capped cylinder along Y.
pub fn cylinder(radius: f32, height: f32, slices: u32) -> MeshData {
    let half = height * 0.5;
    let side = grid(slices, 1, |u, v| {
        let theta = u * TAU;
        let n = Vec3::new(theta.sin(), 0.0, theta.cos());
        (Vec3::new(n.x * radius, half - v * height, n.z * radius), n)
    });

    let mut vertices = side.vertices;
    let mut indices = side.indices;
    for (y, normal) in [(half, Vec3::Y), (-half, Vec3::NEG_Y)] {
        let center = vertices.len() as u32;
        vertices.push(Vertex::new(Vec3::new(0.0, y, 0.0), normal, Vec2::splat(0.5)));
        for j in 0..=slices {
            let theta = j as f32 / slices as f32 * TAU;
            let (s, c) = theta.sin_cos();
            vertices.push(Vertex::new(
                Vec3::new(s * radius, y, c * radius),
                normal,
                Vec2::new(0.5 + 0.5 * s, 0.5 + 0.5 * c),
            ));
        }
        for j in 0..slices {
            let a = center + 1 + j;
            let b = a + 1;
            if normal.y > 0.0 {
                indices.extend_from_slice(&[center, a, b]);
            } else {
                indices.extend_from_slice(&[center, b, a]);
            }
        }
    }
    finish(vertices, indices)
}

/// Torus around the Y axis.
pub fn torus(major: f32, minor: f32, segments: u32, sides: u32) -> MeshData {
    grid(segments, sides, |u, v| {
        let theta = u * TAU;
        let phi = -v * TAU;
        let (st, ct) = theta.sin_cos();
        let (sp, cp) = phi.sin_cos();
        let ring = major + minor * cp;
        let position = Vec3::new(ring * st, minor * sp, ring * ct);
        let normal = Vec3::new(cp * st, sp, cp * ct);
        (position, normal)
    })
}

/// Square in the XY plane facing +Z. A double-sided quad adds a back face.
pub fn quad(half: f32, double_sided: bool) -> MeshData {
    let h = half;
    let mut vertices = vec![
        Vertex::new(Vec3::new(-h, -h, 0.0), Vec3::Z, Vec2::new(0.0, 1.0)),
        Vertex::new(Vec3::new(h, -h, 0.0), Vec3::Z, Vec2::new(1.0, 1.0)),
        Vertex::new(Vec3::new(h, h, 0.0), Vec3::Z, Vec2::new(1.0, 0.0)),
        Vertex::new(Vec3::new(-h, h, 0.0), Vec3::Z, Vec2::new(0.0, 0.0)),
    ];
    let mut indices = vec![0, 1, 2, 2, 3, 0];
    if double_sided {
        let back: Vec<Vertex> = vertices
            .iter()
            .map(|v| Vertex::new(v.position, Vec3::NEG_Z, Vec2::new(1.0 - v.uv.x, v.uv.y)))
            .collect();
        vertices.extend(back);
        indices.extend_from_slice(&[4, 6, 5, 6, 4, 7]);
    }
    finish(vertices, indices)
}

/// Build a `(cols + 1) x (rows + 1)` vertex grid from a parametric surface.
/// Rows run top to bottom in uv space; `f(u, v)` returns position and normal.
fn grid(cols: u32, rows: u32, f: impl Fn(f32, f32) -> (Vec3, Vec3)) -> MeshData {
    let cols = cols.max(3);
    let rows = rows.max(1);
    let mut vertices = Vec::with_capacity(((cols + 1) * (rows + 1)) as usize);
    for i in 0..=rows {
        for j in 0..=cols {
            let uv = Vec2::new(j as f32 / cols as f32, i as f32 / rows as f32);
            let (position, normal) = f(uv.x, uv.y);
            vertices.push(Vertex::new(position, normal, uv));
        }
    }

    let stride = cols + 1;
    let mut indices = Vec::with_capacity((cols * rows * 6) as usize);
    for i in 0..rows {
        for j in 0..cols {
            let a = i * stride + j;
            let b = a + stride;
            let c = b + 1;
            let d = a + 1;
            indices.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }
    finish(vertices, indices)
}

fn finish(vertices: Vec<Vertex>, indices: Vec<u32>) -> MeshData {
    let mut mesh = MeshData::new(vertices, indices);
    mesh.recompute_tangents();
    mesh
}
