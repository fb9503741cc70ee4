//! Per-vertex tangent generation for normal mapping.
//!
//! Tangents are accumulated per triangle from the position and uv deltas of
//! its edges, then made orthogonal to the vertex normal (Gram-Schmidt).

use crate::mesh::Vertex;
use glam::Vec3;

/// Fill `tangent` on every vertex.
///
/// Triangles whose uv mapping is degenerate contribute nothing. A vertex
/// left without a usable tangent gets an arbitrary unit vector perpendicular
/// to its normal. Returns the number of skipped triangles.
pub fn compute_tangents(vertices: &mut [Vertex], indices: &[u32]) -> usize {
    for v in vertices.iter_mut() {
        v.tangent = Vec3::ZERO;
    }

    let mut skipped = 0;
    for tri in indices.chunks_exact(3) {
        let [i1, i2, i3] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (Some(v1), Some(v2), Some(v3)) = (vertices.get(i1), vertices.get(i2), vertices.get(i3))
        else {
            skipped += 1;
            continue;
        };

        let e1 = v2.position - v1.position;
        let e2 = v3.position - v1.position;
        let d1 = v2.uv - v1.uv;
        let d2 = v3.uv - v1.uv;

        let det = d1.x * d2.y - d2.x * d1.y;
        if det == 0.0 || !det.is_finite() {
            skipped += 1;
            continue;
        }
        let tangent = (e1 * d2.y - e2 * d1.y) / det;
        if !tangent.is_finite() {
            skipped += 1;
            continue;
        }

        for i in [i1, i2, i3] {
            vertices[i].tangent += tangent;
        }
    }

    let mut fallbacks = 0;
    for v in vertices.iter_mut() {
        let n = v.normal.try_normalize().unwrap_or(Vec3::Y);
        let t = v.tangent - n * n.dot(v.tangent);
        v.tangent = match t.try_normalize() {
            Some(t) => t,
            None => {
                fallbacks += 1;
                n.any_orthonormal_vector()
            }
        };
    }

    if skipped > 0 || fallbacks > 0 {
        tracing::debug!(skipped, fallbacks, "tangent generation used fallbacks");
    }
    skipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn quad() -> (Vec<Vertex>, Vec<u32>) {
        let n = Vec3::Z;
        let verts = vec![
            Vertex::new(Vec3::new(-1.0, -1.0, 0.0), n, Vec2::new(0.0, 1.0)),
            Vertex::new(Vec3::new(1.0, -1.0, 0.0), n, Vec2::new(1.0, 1.0)),
            Vertex::new(Vec3::new(1.0, 1.0, 0.0), n, Vec2::new(1.0, 0.0)),
            Vertex::new(Vec3::new(-1.0, 1.0, 0.0), n, Vec2::new(0.0, 0.0)),
        ];
        (verts, vec![0, 1, 2, 0, 2, 3])
    }

    #[test]
    fn tangent_follows_u_direction() {
        let (mut verts, indices) = quad();
        let skipped = compute_tangents(&mut verts, &indices);
        assert_eq!(skipped, 0);
        for v in &verts {
            assert!((v.tangent - Vec3::X).length() < 1e-5, "{:?}", v.tangent);
        }
    }

    #[test]
    fn tangents_are_orthogonal_unit_vectors() {
        let (mut verts, indices) = quad();
        // Tilt the normals so orthogonalization has work to do.
        for v in &mut verts {
            v.normal = Vec3::new(0.3, 0.0, 1.0).normalize();
        }
        compute_tangents(&mut verts, &indices);
        for v in &verts {
            assert!((v.tangent.length() - 1.0).abs() < 1e-5);
            assert!(v.tangent.dot(v.normal).abs() < 1e-5);
        }
    }

    #[test]
    fn degenerate_uvs_fall_back_without_nan() {
        let (mut verts, indices) = quad();
        for v in &mut verts {
            v.uv = Vec2::ZERO;
        }
        let skipped = compute_tangents(&mut verts, &indices);
        assert_eq!(skipped, 2);
        for v in &verts {
            assert!(!v.tangent.is_nan());
            assert!((v.tangent.length() - 1.0).abs() < 1e-5);
            assert!(v.tangent.dot(v.normal).abs() < 1e-5);
        }
    }

    #[test]
    fn small_uv_extent_still_produces_tangent() {
        let n = Vec3::Z;
        let mut verts = vec![
            Vertex::new(Vec3::ZERO, n, Vec2::ZERO),
            Vertex::new(Vec3::X, n, Vec2::new(1e-4, 0.0)),
            Vertex::new(Vec3::Y, n, Vec2::new(0.0, 1e-4)),
        ];
        let skipped = compute_tangents(&mut verts, &[0, 1, 2]);
        assert_eq!(skipped, 0);
        for v in &verts {
            assert!((v.tangent - Vec3::X).length() < 1e-5, "{:?}", v.tangent);
        }
    }

    #[test]
    fn stale_tangents_are_reset() {
        let (mut verts, indices) = quad();
        for v in &mut verts {
            v.tangent = Vec3::splat(100.0);
        }
        compute_tangents(&mut verts, &indices);
        assert!((verts[0].tangent - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn out_of_range_triangle_is_skipped() {
        let (mut verts, _) = quad();
        let skipped = compute_tangents(&mut verts, &[0, 1, 9]);
        assert_eq!(skipped, 1);
    }
}
