use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};

use crate::mesh::Mesh;
use crate::vector3::Vector3;

pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open mesh {}", path.display()))?;
    let mesh = parse_obj(BufReader::new(file)).with_context(|| format!("failed to parse mesh {}", path.display()))?;
    log::info!(
        "loaded {} vertices, {} texture coords, {} faces from {}",
        mesh.vertices.len(),
        mesh.tex_coords.len(),
        mesh.face_count(),
        path.display()
    );
    Ok(mesh)
}

/// Reads `v`, `vt` and `f` records. Polygons are fan-triangulated. Indices
/// stay 1-based; range checks happen when faces are set up.
pub fn parse_obj<R: BufRead>(reader: R) -> Result<Mesh> {
    let mut vertices: Vec<Vector3> = Vec::new();
    let mut tex_coords: Vec<Vector3> = Vec::new();
    let mut face_vertices: Vec<[usize; 3]> = Vec::new();
    let mut face_tex_coords: Vec<Option<[usize; 3]>> = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() || tokens[0].starts_with('#') {
            continue;
        }
        let line_no = number + 1;

        match tokens[0] {
            "v" => {
                let [x, y, z] = parse_floats::<3>(&tokens[1..], None).with_context(|| format!("line {line_no}: bad vertex"))?;
                vertices.push(Vector3::new(x, y, z));
            }
            "vt" => {
                let [u, v, w] = parse_floats::<3>(&tokens[1..], Some(0.0)).with_context(|| format!("line {line_no}: bad texture coord"))?;
                tex_coords.push(Vector3::new(u, v, w));
            }
            "f" => {
                let corners = tokens[1..]
                    .iter()
                    .map(|part| parse_face_vertex(part))
                    .collect::<Result<Vec<_>>>()
                    .with_context(|| format!("line {line_no}: bad face"))?;
                if corners.len() < 3 {
                    log::warn!("line {line_no}: skipping face with {} vertices", corners.len());
                    continue;
                }
                for i in 1..corners.len() - 1 {
                    let (a, b, c) = (corners[0], corners[i], corners[i + 1]);
                    face_vertices.push([a.0, b.0, c.0]);
                    face_tex_coords.push(match (a.1, b.1, c.1) {
                        (Some(ta), Some(tb), Some(tc)) => Some([ta, tb, tc]),
                        (None, None, None) => None,
                        _ => bail!("line {line_no}: face mixes corners with and without texture coords"),
                    });
                }
            }
            _ => {}
        }
    }

    if vertices.is_empty() {
        bail!("no vertices found");
    }

    let face_tex_coords = if face_tex_coords.iter().all(Option::is_some) {
        face_tex_coords.into_iter().flatten().collect()
    } else if face_tex_coords.iter().all(Option::is_none) {
        Vec::new()
    } else {
        bail!("some faces have texture coords and some do not");
    };

    Ok(Mesh { vertices, tex_coords, face_vertices, face_tex_coords })
}

fn parse_floats<const N: usize>(tokens: &[&str], fill: Option<f64>) -> Result<[f64; N]> {
    let mut out = [0.0; N];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = match (tokens.get(i), fill) {
            (Some(token), _) => token.parse()?,
            (None, Some(value)) if i > 0 => value,
            _ => bail!("expected {N} numbers, found {}", tokens.len()),
        };
    }
    Ok(out)
}

/// `v`, `v/vt`, `v//vn` or `v/vt/vn`; normals are ignored.
fn parse_face_vertex(s: &str) -> Result<(usize, Option<usize>)> {
    let mut parts = s.split('/');
    let v = parts
        .next()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| anyhow!("missing vertex index in {s:?}"))?
        .parse::<usize>()
        .with_context(|| format!("bad vertex index in {s:?}"))?;
    let vt = match parts.next() {
        Some("") | None => None,
        Some(p) => Some(p.parse::<usize>().with_context(|| format!("bad texture index in {s:?}"))?),
    };
    Ok((v, vt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_triangle_with_texcoords() {
        let src = "# comment\nv -1 -1 0\nv 1 -1 0\nv -1 1 0.5\nvt 0 0 0\nvt 1 0 0\nvt 0 1\nvn 0 0 1\nf 1/1/1 2/2/1 3/3/1\n";
        let mesh = parse_obj(Cursor::new(src)).unwrap();
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.vertices[2], Vector3::new(-1.0, 1.0, 0.5));
        assert_eq!(mesh.tex_coords[2], Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(mesh.face_vertices, vec![[1, 2, 3]]);
        assert_eq!(mesh.face_tex_coords, vec![[1, 2, 3]]);
    }

    #[test]
    fn quads_are_fan_triangulated() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = parse_obj(Cursor::new(src)).unwrap();
        assert_eq!(mesh.face_vertices, vec![[1, 2, 3], [1, 3, 4]]);
        assert!(mesh.face_tex_coords.is_empty());
    }

    #[test]
    fn normal_only_faces_have_no_texcoords() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//1 2//1 3//1\n";
        let mesh = parse_obj(Cursor::new(src)).unwrap();
        assert!(mesh.face_tex_coords.is_empty());
    }

    #[test]
    fn out_of_range_indices_are_kept_for_face_setup() {
        let src = "v 0 0 0\nf 1 2 9\n";
        let mesh = parse_obj(Cursor::new(src)).unwrap();
        assert_eq!(mesh.face_vertices, vec![[1, 2, 9]]);
    }

    #[test]
    fn malformed_lines_report_line_number() {
        let err = parse_obj(Cursor::new("v 0 0 0\nv 1 nope 0\n")).unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));

        let err = parse_obj(Cursor::new("v 0 0\n")).unwrap_err();
        assert!(format!("{err:#}").contains("line 1"));

        assert!(parse_obj(Cursor::new("v 0 0 0\nf 1 -2 3\n")).is_err());
    }

    #[test]
    fn mixed_texcoords_are_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nf 1/1 2/1 3/1\nf 1 2 3\n";
        assert!(parse_obj(Cursor::new(src)).is_err());
    }

    #[test]
    fn empty_mesh_is_rejected() {
        assert!(parse_obj(Cursor::new("# nothing\n")).is_err());
    }
}
