//! Section template primitives
//!
//! Closed meshes whose attachment vertices sit exactly on the axes, so the
//! hardpoint locator finds them without any tolerance.

use std::f32::consts::TAU;

use glam::Vec3;
use tracing::warn;

use super::types::{MAX_VERTICES, MeshBuilderUV};

/// Largest even segment count whose ring hull (5 vertices per segment plus
/// two cap centres) still fits u16 indices
pub const MAX_RING_SEGMENTS: u32 = ((MAX_VERTICES - 2) / 5 / 2 * 2) as u32;

fn clamp_extent(name: &str, axis: &str, value: f32) -> f32 {
    if value <= 0.0 {
        warn!("{name}: {axis} must be > 0.0, clamping to 0.001");
        0.001
    } else {
        value
    }
}

/// Snap values that trigonometry left a few ulps away from zero
fn snap(value: f32, scale: f32) -> f32 {
    if value.abs() <= scale * 1e-6 { 0.0 } else { value }
}

/// Generate a flat-shaded diamond (octahedron)
///
/// # Arguments
/// * `half_x` - Apex distance along X
/// * `half_y` - Apex distance along Y
/// * `half_z` - Apex distance along Z
///
/// # Returns
/// Mesh with 24 vertices (3 per face). Every apex lies exactly on its axis,
/// so all four horizontal hardpoints are present.
pub fn generate_diamond<M: MeshBuilderUV + Default>(half_x: f32, half_y: f32, half_z: f32) -> M {
    let half_x = clamp_extent("generate_diamond", "half_x", half_x);
    let half_y = clamp_extent("generate_diamond", "half_y", half_y);
    let half_z = clamp_extent("generate_diamond", "half_z", half_z);

    let mut mesh = M::default();
    let uv_of = |p: Vec3| (p.x / (2.0 * half_x) + 0.5, p.z / (2.0 * half_z) + 0.5);

    for sx in [1.0f32, -1.0] {
        for sy in [1.0f32, -1.0] {
            for sz in [1.0f32, -1.0] {
                let mut a = Vec3::new(sx * half_x, 0.0, 0.0);
                let b = Vec3::new(0.0, sy * half_y, 0.0);
                let mut c = Vec3::new(0.0, 0.0, sz * half_z);

                let mut normal = (b - a).cross(c - a).normalize();
                let centroid = (a + b + c) / 3.0;
                if normal.dot(centroid) < 0.0 {
                    std::mem::swap(&mut a, &mut c);
                    normal = -normal;
                }

                let i0 = mesh.add_vertex_uv(a, uv_of(a), normal);
                let i1 = mesh.add_vertex_uv(b, uv_of(b), normal);
                let i2 = mesh.add_vertex_uv(c, uv_of(c), normal);
                mesh.add_triangle(i0, i1, i2);
            }
        }
    }

    mesh
}

/// Generate a closed elliptical prism running along Z
///
/// # Arguments
/// * `half_x` - Cross-section radius along X
/// * `half_y` - Cross-section radius along Y
/// * `half_z` - Half length along Z
/// * `segments` - Cross-section segments (rounded up to an even count, clamped
///   to `4..=MAX_RING_SEGMENTS`)
///
/// # Returns
/// Mesh with three rings (z = -half_z, 0, +half_z) and cap centres on the Z
/// axis. The middle ring carries the left/right attachment vertices.
pub fn generate_ring_hull<M: MeshBuilderUV + Default>(
    half_x: f32,
    half_y: f32,
    half_z: f32,
    segments: u32,
) -> M {
    let half_x = clamp_extent("generate_ring_hull", "half_x", half_x);
    let half_y = clamp_extent("generate_ring_hull", "half_y", half_y);
    let half_z = clamp_extent("generate_ring_hull", "half_z", half_z);
    let segments = if segments < 4 {
        warn!("generate_ring_hull: segments must be >= 4, clamping to 4");
        4
    } else if segments > MAX_RING_SEGMENTS {
        warn!("generate_ring_hull: segments must be <= {MAX_RING_SEGMENTS}, clamping");
        MAX_RING_SEGMENTS
    } else {
        segments + segments % 2
    };

    let ring: Vec<(f32, f32)> = (0..segments)
        .map(|k| {
            let angle = TAU * k as f32 / segments as f32;
            (
                snap(half_x * angle.cos(), half_x),
                snap(half_y * angle.sin(), half_y),
            )
        })
        .collect();

    let mut mesh = M::default();
    let ring_z = [-half_z, 0.0, half_z];

    // Sides: one vertex ring per z station, smooth radial normals
    let mut stations = Vec::with_capacity(ring_z.len());
    for (r, &z) in ring_z.iter().enumerate() {
        let indices: Vec<u16> = ring
            .iter()
            .enumerate()
            .map(|(k, &(x, y))| {
                let normal = Vec3::new(x / (half_x * half_x), y / (half_y * half_y), 0.0)
                    .normalize_or_zero();
                let uv = (k as f32 / segments as f32, r as f32 / 2.0);
                mesh.add_vertex_uv(Vec3::new(x, y, z), uv, normal)
            })
            .collect();
        stations.push(indices);
    }

    for pair in stations.windows(2) {
        let (near, far) = (&pair[0], &pair[1]);
        for k in 0..near.len() {
            let next = (k + 1) % near.len();
            mesh.add_triangle(near[k], near[next], far[next]);
            mesh.add_triangle(near[k], far[next], far[k]);
        }
    }

    // Caps: centre vertex on the Z axis plus a flat-normal rim
    for (z, normal) in [(half_z, Vec3::Z), (-half_z, Vec3::NEG_Z)] {
        let centre = mesh.add_vertex_uv(Vec3::new(0.0, 0.0, z), (0.5, 0.5), normal);
        let rim: Vec<u16> = ring
            .iter()
            .map(|&(x, y)| {
                let uv = (x / (2.0 * half_x) + 0.5, y / (2.0 * half_y) + 0.5);
                mesh.add_vertex_uv(Vec3::new(x, y, z), uv, normal)
            })
            .collect();

        for k in 0..rim.len() {
            let next = (k + 1) % rim.len();
            if z > 0.0 {
                mesh.add_triangle(centre, rim[k], rim[next]);
            } else {
                mesh.add_triangle(centre, rim[next], rim[k]);
            }
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::hardpoints::{Direction, locate};
    use crate::mesh::types::MeshBuffer;

    #[test]
    fn test_diamond_counts() {
        let mesh: MeshBuffer = generate_diamond(1.0, 0.5, 2.0);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 8);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_diamond_has_horizontal_hardpoints() {
        let mesh: MeshBuffer = generate_diamond(1.0, 0.5, 2.0);
        let set = locate(&mesh);
        for d in Direction::HORIZONTAL {
            let p = mesh.vertex_at(set.get(d).unwrap()).unwrap();
            let expected = d.vector() * Vec3::new(1.0, 0.5, 2.0).dot(d.vector().abs());
            assert_eq!(p, expected, "{d}");
        }
    }

    #[test]
    fn test_diamond_normals_point_outward() {
        let mesh: MeshBuffer = generate_diamond(1.0, 1.0, 1.0);
        for tri in mesh.indices.chunks(3) {
            let centroid = tri
                .iter()
                .map(|&i| Vec3::from(mesh.positions[i as usize]))
                .sum::<Vec3>()
                / 3.0;
            let normal = Vec3::from(mesh.normals[tri[0] as usize]);
            assert!(normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn test_ring_hull_hardpoints() {
        let mesh: MeshBuffer = generate_ring_hull(1.0, 0.5, 1.5, 8);
        let set = locate(&mesh);

        let at = |d| mesh.vertex_at(set.get(d).unwrap());

        assert_eq!(at(Direction::Forward), Some(Vec3::new(0.0, 0.0, 1.5)));
        assert_eq!(at(Direction::Back), Some(Vec3::new(0.0, 0.0, -1.5)));
        assert_eq!(at(Direction::Right), Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(at(Direction::Left), Some(Vec3::new(-1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_ring_hull_rounds_segments_to_even() {
        let mesh: MeshBuffer = generate_ring_hull(1.0, 1.0, 1.0, 7);
        // 3 rings + 2 caps of (rim + centre), 8 segments
        assert_eq!(mesh.vertex_count(), 3 * 8 + 2 * (8 + 1));
        assert_eq!(mesh.triangle_count(), 2 * 2 * 8 + 2 * 8);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_ring_hull_caps_segments_to_index_range() {
        let mesh: MeshBuffer = generate_ring_hull(1.0, 1.0, 1.0, 30_000);
        let segments = MAX_RING_SEGMENTS as usize;

        assert_eq!(mesh.vertex_count(), 5 * segments + 2);
        assert!(mesh.vertex_count() <= MAX_VERTICES);
        assert_eq!(
            mesh.indices.iter().copied().max(),
            Some((mesh.vertex_count() - 1) as u16)
        );
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_clamps_non_positive_extent() {
        let mesh: MeshBuffer = generate_diamond(-1.0, 1.0, 1.0);
        let bounds = mesh.bounds().unwrap();
        assert!((bounds.max.x - 0.001).abs() < 1e-6);
    }
}
