//! Wavefront OBJ/MTL import and export

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use glam::Vec3;

use crate::assembler::Ship;
use crate::host::Material;
use crate::mesh::{MAX_VERTICES, MeshBuffer};

/// Parse OBJ text into a mesh buffer
///
/// Vertices are expanded per face corner and polygons are fan-triangulated.
/// Corners without a `vt` get a zero UV; corners without a `vn` get the
/// face normal.
pub fn parse_obj<R: BufRead>(reader: R) -> Result<MeshBuffer> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut tex_coords: Vec<[f32; 2]> = Vec::new();
    let mut normals_raw: Vec<[f32; 3]> = Vec::new();

    let mut mesh = MeshBuffer::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts[0] {
            "v" if parts.len() >= 4 => {
                positions.push(parse_floats(&parts[1..4], line_no)?);
            }
            "vt" if parts.len() >= 3 => {
                tex_coords.push(parse_floats(&parts[1..3], line_no)?);
            }
            "vn" if parts.len() >= 4 => {
                normals_raw.push(parse_floats(&parts[1..4], line_no)?);
            }
            "f" if parts.len() >= 4 => {
                let corners = parts[1..]
                    .iter()
                    .map(|v| {
                        parse_obj_vertex(v, positions.len(), tex_coords.len(), normals_raw.len())
                            .with_context(|| {
                                format!("line {}: bad face vertex {:?}", line_no + 1, v)
                            })
                    })
                    .collect::<Result<Vec<_>>>()?;

                // Fan triangulation for convex polygons
                for i in 1..corners.len() - 1 {
                    let tri = [corners[0], corners[i], corners[i + 1]];
                    let p = tri.map(|(vi, _, _)| Vec3::from(positions[vi]));
                    let face_normal = (p[1] - p[0]).cross(p[2] - p[0]).normalize_or_zero();

                    if mesh.positions.len() + 3 > MAX_VERTICES {
                        bail!(
                            "OBJ mesh exceeds maximum {} vertices for u16 indices",
                            MAX_VERTICES
                        );
                    }

                    for (k, &(_, vti, vni)) in tri.iter().enumerate() {
                        let index = mesh.positions.len() as u16;
                        mesh.positions.push(p[k].to_array());
                        mesh.uvs.push(vti.map_or([0.0; 2], |t| tex_coords[t]));
                        mesh.normals
                            .push(vni.map_or(face_normal.to_array(), |n| normals_raw[n]));
                        mesh.indices.push(index);
                    }
                }
            }
            _ => {}
        }
    }

    if mesh.positions.is_empty() {
        bail!("No faces found in OBJ file");
    }

    Ok(mesh)
}

fn parse_floats<const N: usize>(parts: &[&str], line_no: usize) -> Result<[f32; N]> {
    if parts.len() < N {
        bail!("line {}: expected {} numbers", line_no + 1, N);
    }
    let mut out = [0.0; N];
    for (slot, s) in out.iter_mut().zip(parts) {
        *slot = s
            .parse()
            .with_context(|| format!("line {}: invalid number {:?}", line_no + 1, s))?;
    }
    Ok(out)
}

/// Resolve a 1-based or negative (relative) OBJ index
fn resolve_index(s: &str, count: usize) -> Option<usize> {
    let i: i64 = s.parse().ok()?;
    let resolved = if i > 0 {
        i - 1
    } else if i < 0 {
        count as i64 + i
    } else {
        return None;
    };
    (0..count as i64).contains(&resolved).then_some(resolved as usize)
}

/// Parse OBJ vertex reference: "v", "v/vt", "v/vt/vn", or "v//vn"
fn parse_obj_vertex(
    s: &str,
    positions: usize,
    tex_coords: usize,
    normals: usize,
) -> Result<(usize, Option<usize>, Option<usize>)> {
    let mut parts = s.split('/');

    let vi = parts
        .next()
        .and_then(|p| resolve_index(p, positions))
        .context("position index out of range")?;

    let vti = match parts.next().filter(|p| !p.is_empty()) {
        Some(p) => Some(resolve_index(p, tex_coords).context("uv index out of range")?),
        None => None,
    };

    let vni = match parts.next().filter(|p| !p.is_empty()) {
        Some(p) => Some(resolve_index(p, normals).context("normal index out of range")?),
        None => None,
    };

    Ok((vi, vti, vni))
}

/// Parse MTL text (`newmtl`, `Kd`, `d`)
pub fn parse_mtl<R: BufRead>(reader: R) -> Result<Vec<Material>> {
    let mut materials: Vec<Material> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(&keyword) = parts.first() else {
            continue;
        };

        match keyword {
            "newmtl" => {
                let name = parts.get(1).context("newmtl without a name")?;
                materials.push(Material::new(*name));
            }
            "Kd" | "d" => {
                let Some(current) = materials.last_mut() else {
                    bail!("line {}: {} before newmtl", line_no + 1, keyword);
                };
                if keyword == "Kd" {
                    let [r, g, b] = parse_floats::<3>(parts.get(1..4).unwrap_or(&[]), line_no)?;
                    current.base_color[..3].copy_from_slice(&[r, g, b]);
                } else {
                    let [alpha] = parse_floats::<1>(parts.get(1..2).unwrap_or(&[]), line_no)?;
                    current.base_color[3] = alpha;
                }
            }
            _ => {}
        }
    }

    Ok(materials)
}

/// One named mesh placed at a world offset
pub struct ObjPart<'a> {
    pub name: &'a str,
    pub mesh: &'a MeshBuffer,
    pub offset: Vec3,
    pub material: Option<&'a str>,
}

/// Write parts as one OBJ document, one `o` group per part
pub fn write_obj<W: Write>(
    writer: &mut W,
    parts: &[ObjPart<'_>],
    mtllib: Option<&str>,
) -> Result<()> {
    writeln!(writer, "# shipgen")?;
    if let Some(lib) = mtllib {
        writeln!(writer, "mtllib {lib}")?;
    }

    let mut base = 1usize;
    for part in parts {
        writeln!(writer, "o {}", part.name)?;
        if let Some(material) = part.material {
            writeln!(writer, "usemtl {material}")?;
        }

        for p in &part.mesh.positions {
            let p = Vec3::from(*p) + part.offset;
            writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
        }
        for uv in &part.mesh.uvs {
            writeln!(writer, "vt {} {}", uv[0], uv[1])?;
        }
        for n in &part.mesh.normals {
            writeln!(writer, "vn {} {} {}", n[0], n[1], n[2])?;
        }
        for tri in part.mesh.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| base + i as usize);
            writeln!(writer, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
        }

        base += part.mesh.vertex_count();
    }

    Ok(())
}

/// Write materials as an MTL document
pub fn write_mtl<W: Write>(writer: &mut W, materials: &[&Material]) -> Result<()> {
    for material in materials {
        let [r, g, b, a] = material.base_color;
        writeln!(writer, "newmtl {}", material.name.replace(' ', "_"))?;
        writeln!(writer, "Kd {r} {g} {b}")?;
        writeln!(writer, "d {a}")?;
        writeln!(writer)?;
    }
    Ok(())
}

/// Export every section of a ship (hulls, then wings) at its ship-space position
pub fn write_ship_obj<W: Write, N>(
    writer: &mut W,
    ship: &Ship<N>,
    mtllib: Option<&str>,
) -> Result<()> {
    let names: Vec<String> = ship
        .sections()
        .map(|s| s.material.name.replace(' ', "_"))
        .collect();
    let parts: Vec<ObjPart<'_>> = ship
        .sections()
        .zip(&names)
        .map(|(section, material)| ObjPart {
            name: &section.name,
            mesh: &section.mesh,
            offset: section.position,
            material: mtllib.map(|_| material.as_str()),
        })
        .collect();

    write_obj(writer, &parts, mtllib)
}
