//! Built-in model geometry.
//!
//! All meshes are in the entity's local frame with +Y as forward.

use std::f32::consts::TAU;

use glam::{Vec2, Vec4};

use super::{Mesh, ObjectVertex};

/// Number of segments in the turret's circular base.
pub const TURRET_SEGMENTS: u32 = 60;

const TURRET_GREY: Vec4 = Vec4::new(0.7, 0.7, 0.7, 1.0);

fn vertex(x: f32, y: f32, color: Vec4) -> ObjectVertex {
    ObjectVertex::new(Vec2::new(x, y), Vec2::ZERO, color)
}

/// Tank hull: a rectangle with a narrowed nose so front and back are
/// distinguishable. Tinted entirely by the draw colour.
#[must_use]
pub fn tank_body() -> Mesh {
    Mesh {
        vertices: vec![
            vertex(-0.8, 0.8, Vec4::ONE),
            vertex(-0.8, -1.0, Vec4::ONE),
            vertex(0.8, 0.8, Vec4::ONE),
            vertex(0.8, -1.0, Vec4::ONE),
            vertex(0.6, 1.0, Vec4::ONE),
            vertex(-0.6, 1.0, Vec4::ONE),
        ],
        indices: vec![0, 1, 2, 1, 2, 3, 0, 2, 5, 2, 4, 5],
    }
}

/// Turret: a grey disc of radius 0.5 plus a barrel reaching to y = 1.2.
#[must_use]
pub fn tank_turret() -> Mesh {
    let n = TURRET_SEGMENTS;
    let mut vertices = Vec::with_capacity(n as usize + 5);
    let mut indices = Vec::with_capacity(n as usize * 3 + 6);

    #[allow(clippy::cast_precision_loss)]
    for i in 0..n {
        let theta = (i as f32 + 0.5) / n as f32 * TAU;
        vertices.push(vertex(theta.sin() * 0.5, theta.cos() * 0.5, TURRET_GREY));
        indices.extend_from_slice(&[i, (i + 1) % n, n]);
    }
    vertices.push(vertex(0.0, 0.0, TURRET_GREY));

    let barrel = n + 1;
    vertices.push(vertex(-0.1, 0.0, TURRET_GREY));
    vertices.push(vertex(0.1, 0.0, TURRET_GREY));
    vertices.push(vertex(-0.1, 1.2, TURRET_GREY));
    vertices.push(vertex(0.1, 1.2, TURRET_GREY));
    indices.extend_from_slice(&[barrel, barrel + 1, barrel + 2, barrel + 1, barrel + 2, barrel + 3]);

    Mesh { vertices, indices }
}

/// Unit quad spanning [-1, 1]² with texture coordinates, scaled per draw.
#[must_use]
pub fn bullet_quad() -> Mesh {
    Mesh {
        vertices: vec![
            ObjectVertex::new(Vec2::new(-1.0, -1.0), Vec2::new(0.0, 0.0), Vec4::ONE),
            ObjectVertex::new(Vec2::new(-1.0, 1.0), Vec2::new(0.0, 1.0), Vec4::ONE),
            ObjectVertex::new(Vec2::new(1.0, -1.0), Vec2::new(1.0, 0.0), Vec4::ONE),
            ObjectVertex::new(Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0), Vec4::ONE),
        ],
        indices: vec![0, 1, 2, 1, 2, 3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices_in_range(mesh: &Mesh) -> bool {
        mesh.indices
            .iter()
            .all(|&i| (i as usize) < mesh.vertices.len())
    }

    #[test]
    fn body_shape() {
        let mesh = tank_body();
        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(mesh.triangle_count(), 4);
        assert!(indices_in_range(&mesh));
    }

    #[test]
    fn turret_shape() {
        let mesh = tank_turret();
        assert_eq!(mesh.vertices.len(), TURRET_SEGMENTS as usize + 5);
        assert_eq!(mesh.triangle_count(), TURRET_SEGMENTS as usize + 2);
        assert!(indices_in_range(&mesh));
        assert!(mesh.vertices.iter().all(|v| v.color == TURRET_GREY));

        // Disc rim sits on radius 0.5.
        for v in &mesh.vertices[..TURRET_SEGMENTS as usize] {
            assert!((v.position.length() - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn quad_shape() {
        let mesh = bullet_quad();
        assert_eq!(mesh.triangle_count(), 2);
        assert!(indices_in_range(&mesh));
    }
}
