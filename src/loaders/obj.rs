//! Parser for Wavefront geometry (`.obj`) with index packing.
//!
//! OBJ faces index positions, texture coordinates and normals through three
//! independent lists. Device buffers want a single index per vertex, so each
//! distinct `position/texcoord/normal` triple becomes one output vertex and
//! repeated triples reuse the index assigned the first time.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::error::{AttributeKind, ImportError};
use crate::gfx::resources::{MaterialId, MaterialLibrary};
use crate::gfx::scene::Mesh;

/// Which vertex lines a face index counts through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexScope {
    /// Attribute lists restart at every `o` line.
    #[default]
    PerObject,
    /// One set of lists for the whole file, the way most exporters write it.
    File,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    pub index_scope: IndexScope,
    /// Compute smooth normals for meshes whose faces reference none.
    pub generate_missing_normals: bool,
}

/// A mesh produced by the importer, named after its `o` line.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedMesh {
    pub name: Option<String>,
    pub mesh: Mesh,
}

/// Everything one OBJ file (and its material libraries) produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedModel {
    pub meshes: Vec<ImportedMesh>,
    pub materials: MaterialLibrary,
}

/// Material library file names referenced by `mtllib` lines, in file order.
pub fn material_libraries(source: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            (tokens.next() == Some("mtllib")).then_some(tokens)
        })
        .flatten()
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Default)]
struct Staging {
    positions: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
}

/// Raw 1-based indices of one face corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Corner {
    position: i64,
    tex_coord: Option<i64>,
    normal: Option<i64>,
}

#[derive(Debug)]
struct Face {
    line: usize,
    corners: Vec<Corner>,
}

#[derive(Debug, Default)]
struct PendingMesh {
    name: Option<String>,
    material: Option<MaterialId>,
    staging: Staging,
    faces: Vec<Face>,
}

/// Parses OBJ text whose material libraries have already been loaded into
/// `materials`.
///
/// # Errors
/// Malformed numbers, faces with fewer than three corners, indices outside
/// the attribute lists and `usemtl` in a file without `mtllib` all reject the
/// whole import.
pub fn parse_obj(
    source: &str,
    materials: MaterialLibrary,
    options: &ImportOptions,
) -> Result<ImportedModel, ImportError> {
    let has_library = !material_libraries(source).is_empty();
    let mut meshes: Vec<PendingMesh> = Vec::new();
    let mut shared = Staging::default();

    for (number, raw_line) in source.lines().enumerate() {
        let line_number = number + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };
        let arguments: Vec<&str> = tokens.collect();

        match keyword {
            "o" => meshes.push(PendingMesh {
                name: Some(arguments.join(" ")),
                ..PendingMesh::default()
            }),
            "v" | "vt" | "vn" => {
                let mesh = current(&mut meshes, line_number);
                let staging = match options.index_scope {
                    IndexScope::PerObject => &mut mesh.staging,
                    IndexScope::File => &mut shared,
                };
                match keyword {
                    "v" => staging.positions.push(floats(&arguments, line_number, line)?),
                    "vn" => staging.normals.push(floats(&arguments, line_number, line)?),
                    _ => staging.tex_coords.push(tex_coord(&arguments, line_number, line)?),
                }
            }
            "f" => {
                let mesh = current(&mut meshes, line_number);
                let staging = match options.index_scope {
                    IndexScope::PerObject => &mesh.staging,
                    IndexScope::File => &shared,
                };
                let face = parse_face(&arguments, line_number, staging)?;
                mesh.faces.push(face);
            }
            "usemtl" => {
                let name = arguments.join(" ");
                if !has_library {
                    return Err(ImportError::MissingMaterialLibrary {
                        line: line_number,
                        material: name,
                    });
                }
                let mesh = current(&mut meshes, line_number);
                if materials.contains(&name) {
                    mesh.material = Some(name);
                } else {
                    log::warn!("line {}: unknown material '{}', mesh left without one", line_number, name);
                    mesh.material = None;
                }
            }
            "mtllib" | "s" | "g" => {}
            other => log::trace!("line {}: ignoring '{}'", line_number, other),
        }
    }

    let mut imported = Vec::with_capacity(meshes.len());
    for pending in meshes {
        let staging = match options.index_scope {
            IndexScope::PerObject => &pending.staging,
            IndexScope::File => &shared,
        };
        let mut mesh = pack(&pending, staging)?;
        if options.generate_missing_normals && !mesh.has_normals() && mesh.index_count() > 0 {
            mesh.generate_normals();
        }
        mesh.set_material(pending.material.clone());
        log::debug!(
            "Packed mesh '{}': {} vertices, {} triangles",
            pending.name.as_deref().unwrap_or("<unnamed>"),
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        imported.push(ImportedMesh {
            name: pending.name,
            mesh,
        });
    }

    Ok(ImportedModel {
        meshes: imported,
        materials,
    })
}

/// The mesh receiving geometry, created unnamed if no `o` line came first.
fn current(meshes: &mut Vec<PendingMesh>, line: usize) -> &mut PendingMesh {
    if meshes.is_empty() {
        log::warn!("line {}: geometry before any 'o' line, using an unnamed mesh", line);
        meshes.push(PendingMesh::default());
    }
    let last = meshes.len() - 1;
    &mut meshes[last]
}

fn malformed(line: usize, token: &str) -> ImportError {
    ImportError::MalformedNumber {
        line,
        token: token.to_string(),
    }
}

fn number(token: &str, line: usize) -> Result<f32, ImportError> {
    token.parse().map_err(|_| malformed(line, token))
}

/// First three components; an optional fourth (`w`) is ignored.
fn floats(arguments: &[&str], line: usize, text: &str) -> Result<[f32; 3], ImportError> {
    match arguments {
        [x, y, z, ..] => Ok([number(x, line)?, number(y, line)?, number(z, line)?]),
        _ => Err(malformed(line, text)),
    }
}

/// `u [v [w]]`; a missing `v` is 0.
fn tex_coord(arguments: &[&str], line: usize, text: &str) -> Result<[f32; 2], ImportError> {
    match arguments {
        [u] => Ok([number(u, line)?, 0.0]),
        [u, v, ..] => Ok([number(u, line)?, number(v, line)?]),
        [] => Err(malformed(line, text)),
    }
}

fn parse_face(arguments: &[&str], line: usize, staging: &Staging) -> Result<Face, ImportError> {
    if arguments.len() < 3 {
        return Err(ImportError::DegenerateFace {
            line,
            vertices: arguments.len(),
        });
    }

    let corners = arguments
        .iter()
        .map(|token| -> Result<Corner, ImportError> {
            let mut parts = token.split('/');
            let position = parts.next().unwrap_or("");
            let tex_coord = parts.next().filter(|part| !part.is_empty());
            let normal = parts.next().filter(|part| !part.is_empty());

            let index = |part: &str, available: usize| -> Result<i64, ImportError> {
                let raw: i64 = part.parse().map_err(|_| malformed(line, part))?;
                // Negative indices count back from the most recent entry.
                Ok(if raw < 0 { available as i64 + 1 + raw } else { raw })
            };

            Ok(Corner {
                position: index(position, staging.positions.len())?,
                tex_coord: tex_coord
                    .map(|part| index(part, staging.tex_coords.len()))
                    .transpose()?,
                normal: normal
                    .map(|part| index(part, staging.normals.len()))
                    .transpose()?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Face { line, corners })
}

fn lookup<'a, const N: usize>(
    list: &'a [[f32; N]],
    index: i64,
    attribute: AttributeKind,
    line: usize,
    mesh: &PendingMesh,
) -> Result<&'a [f32; N], ImportError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| list.get(i))
        .ok_or_else(|| ImportError::IndexOutOfRange {
            mesh: mesh.name.clone().unwrap_or_else(|| "<unnamed>".to_string()),
            line,
            attribute,
            index,
            available: list.len(),
        })
}

/// Turns the faces of one mesh into flat, deduplicated vertex arrays and a
/// fanned triangle index list.
///
/// A sub-attribute is only emitted when some corner references it; corners
/// without it then get zeros so every array stays aligned with the
/// positions.
fn pack(pending: &PendingMesh, staging: &Staging) -> Result<Mesh, ImportError> {
    let mut packed: HashMap<Corner, u32> = HashMap::new();
    let mut positions: Vec<f32> = Vec::new();
    let mut tex_coords: Vec<Option<[f32; 2]>> = Vec::new();
    let mut normals: Vec<Option<[f32; 3]>> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for face in &pending.faces {
        let mut corner_indices = Vec::with_capacity(face.corners.len());
        for corner in &face.corners {
            let index = match packed.entry(*corner) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => {
                    let position = lookup(
                        &staging.positions,
                        corner.position,
                        AttributeKind::Position,
                        face.line,
                        pending,
                    )?;
                    let tex_coord = corner
                        .tex_coord
                        .map(|i| lookup(&staging.tex_coords, i, AttributeKind::TexCoord, face.line, pending))
                        .transpose()?;
                    let normal = corner
                        .normal
                        .map(|i| lookup(&staging.normals, i, AttributeKind::Normal, face.line, pending))
                        .transpose()?;

                    positions.extend_from_slice(position);
                    tex_coords.push(tex_coord.copied());
                    normals.push(normal.copied());
                    *entry.insert((tex_coords.len() - 1) as u32)
                }
            };
            corner_indices.push(index);
        }

        for i in 1..corner_indices.len() - 1 {
            indices.extend_from_slice(&[corner_indices[0], corner_indices[i], corner_indices[i + 1]]);
        }
    }

    Ok(Mesh::new(positions, flatten(normals), indices).with_tex_coords(flatten(tex_coords)))
}

fn flatten<const N: usize>(values: Vec<Option<[f32; N]>>) -> Vec<f32> {
    if values.iter().all(Option::is_none) {
        return Vec::new();
    }
    values
        .into_iter()
        .flat_map(|value| value.unwrap_or([0.0; N]))
        .collect()
}
