//! Parser for Wavefront material libraries (`.mtl`).

use crate::error::ImportError;
use crate::gfx::resources::{ColorMaterial, Material, MaterialLibrary};
use crate::math::Vec3;

/// Parses a material library.
///
/// Every `newmtl` starts a colour material. A `map_*` directive upgrades the
/// current material to an image material, keeping its scalar properties.
/// Unknown directives are ignored, as are directives that appear before the
/// first `newmtl`. Dissolve (`d`) is converted to transparency as `1 - d`, so
/// it agrees with `Tr`.
pub fn parse_mtl(source: &str) -> Result<MaterialLibrary, ImportError> {
    let mut materials: Vec<Material> = Vec::new();

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

        if keyword == "newmtl" {
            let name = arguments.join(" ");
            log::trace!("newmtl '{}'", name);
            materials.push(Material::Color(ColorMaterial::new(name)));
            continue;
        }

        let Some(material) = materials.last_mut() else {
            log::warn!("line {}: '{}' before any newmtl, ignoring", line_number, keyword);
            continue;
        };

        match keyword {
            "Ns" => material.properties_mut().shininess = scalar(&arguments, line_number)?,
            "Ni" => material.properties_mut().refraction_index = scalar(&arguments, line_number)?,
            "d" => material.properties_mut().transparency = 1.0 - scalar(&arguments, line_number)?,
            "Tr" => material.properties_mut().transparency = scalar(&arguments, line_number)?,
            "illum" => {
                let token = first(&arguments);
                material.properties_mut().illumination_model =
                    token.parse().map_err(|_| malformed(line_number, token))?;
            }
            "Ka" | "Kd" | "Ks" | "Ke" => {
                let color = rgb(&arguments, line_number)?;
                match material {
                    Material::Color(color_material) => {
                        let slot = match keyword {
                            "Ka" => &mut color_material.ambient,
                            "Kd" => &mut color_material.diffuse,
                            "Ks" => &mut color_material.specular,
                            _ => &mut color_material.emissive,
                        };
                        *slot = Some(color);
                    }
                    Material::Image(_) => {
                        log::debug!("line {}: {} ignored on image material", line_number, keyword)
                    }
                }
            }
            "map_Ka" | "map_Kd" | "map_Ks" | "map_Ns" | "map_bump" | "bump" => {
                // Option flags such as `-s 1 1 1` precede the file name.
                let Some(file) = arguments.last().map(|s| s.to_string()) else {
                    log::warn!("line {}: {} without a file name", line_number, keyword);
                    continue;
                };
                let image = material.as_image_mut();
                let slot = match keyword {
                    "map_Ka" => &mut image.ambient_map,
                    "map_Kd" => &mut image.diffuse_map,
                    "map_Ks" => &mut image.specular_map,
                    "map_Ns" => &mut image.specular_power_map,
                    _ => &mut image.bump_map,
                };
                *slot = Some(file);
            }
            other => log::trace!("line {}: ignoring '{}'", line_number, other),
        }
    }

    let mut library = MaterialLibrary::new();
    for material in materials {
        library.add(material);
    }
    Ok(library)
}

fn first<'a>(arguments: &[&'a str]) -> &'a str {
    arguments.first().copied().unwrap_or("")
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

fn scalar(arguments: &[&str], line: usize) -> Result<f32, ImportError> {
    number(first(arguments), line)
}

/// One value is replicated to all three channels.
fn rgb(arguments: &[&str], line: usize) -> Result<Vec3, ImportError> {
    match arguments {
        [gray] => Ok(Vec3::splat(number(gray, line)?)),
        [r, g, b, ..] => Ok(Vec3::new(number(r, line)?, number(g, line)?, number(b, line)?)),
        _ => Err(malformed(line, &arguments.join(" "))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# Blender MTL File
newmtl Body
Ns 96.078431
Ka 1.000000 1.000000 1.000000
Kd 0.640000 0.100000 0.050000
Ks 0.5
Ke 0.000000 0.000000 0.000000
Ni 1.450000
d 0.25
illum 2

newmtl Label
Ns 10
d 1.0
map_Kd -s 1 1 1 label.png
map_bump label_normal.png
";

    #[test]
    fn test_color_material_fields() {
        let library = parse_mtl(SAMPLE).expect("valid file");
        assert_eq!(library.names(), vec!["Body", "Label"]);

        let Some(Material::Color(body)) = library.get("Body") else {
            panic!("Body should be a colour material");
        };
        assert_eq!(body.properties.shininess, 96.078431);
        assert_eq!(body.properties.refraction_index, 1.45);
        assert_eq!(body.properties.transparency, 0.75);
        assert_eq!(body.properties.illumination_model, 2);
        assert_eq!(body.ambient, Some(Vec3::splat(1.0)));
        assert_eq!(body.diffuse, Some(Vec3::new(0.64, 0.1, 0.05)));
        assert_eq!(body.specular, Some(Vec3::splat(0.5)));
        assert_eq!(body.emissive, Some(Vec3::ZERO));
    }

    #[test]
    fn test_map_directive_upgrades_to_image_material() {
        let library = parse_mtl(SAMPLE).expect("valid file");
        let Some(Material::Image(label)) = library.get("Label") else {
            panic!("Label should be an image material");
        };
        assert_eq!(label.properties.shininess, 10.0);
        assert_eq!(label.properties.transparency, 0.0);
        assert_eq!(label.diffuse_map.as_deref(), Some("label.png"));
        assert_eq!(label.bump_map.as_deref(), Some("label_normal.png"));
        assert!(label.specular_map.is_none());
    }

    #[test]
    fn test_dissolve_and_tr_agree() {
        let library = parse_mtl("newmtl a\nd 0.4\nnewmtl b\nTr 0.6\n").expect("valid file");
        let transparency = |name: &str| library.get(name).map(|m| m.properties().transparency);
        assert_eq!(transparency("a"), Some(1.0 - 0.4));
        assert_eq!(transparency("b"), Some(0.6));
    }

    #[test]
    fn test_malformed_number_reports_line() {
        let err = parse_mtl("newmtl a\nNs 1.0\nKd 0.1 zero 0.3\n").unwrap_err();
        match err {
            ImportError::MalformedNumber { line, token } => {
                assert_eq!(line, 3);
                assert_eq!(token, "zero");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_two_channel_color_is_malformed() {
        assert!(matches!(
            parse_mtl("newmtl a\nKa 0.1 0.2\n"),
            Err(ImportError::MalformedNumber { line: 2, .. })
        ));
    }

    #[test]
    fn test_unknown_and_orphan_directives_are_ignored() {
        let library = parse_mtl("Kd 1 1 1\nnewmtl a\nPr 0.5\nmap_Pr rough.png\n").expect("valid file");
        assert_eq!(library.len(), 1);
        assert!(!library.get("a").expect("present").is_image());
    }
}
