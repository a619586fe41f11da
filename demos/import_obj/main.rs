//! Imports an OBJ model with its material libraries and prints a summary of
//! the resulting scene.
//!
//! ```text
//! cargo run --example import_obj -- [path relative to demos/assets]
//! ```

use anyhow::{Context, Result};
use tartan::prelude::*;

fn main() -> Result<()> {
    init_logging(None);

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "models/crate.obj".to_string());
    let fetcher = FsFetcher::new(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/assets"));
    let loader = ObjLoader::new(fetcher).with_options(ImportOptions {
        generate_missing_normals: true,
        ..ImportOptions::default()
    });

    let mut app = App::new(RecordingBackend::new(), RendererConfig::default());
    pollster::block_on(app.load_program(
        loader.fetcher(),
        "shaders/phong.vert",
        "shaders/phong.frag",
        &ProgramConfig::default(),
    ))?;
    let model = pollster::block_on(app.load_model(&loader, &path))
        .with_context(|| format!("importing {}", path))?;

    let scene = app.scene();
    for visit in scene.depth_first_from(model) {
        let indent = "  ".repeat(visit.depth);
        let name = visit.node.name().unwrap_or("<unnamed>");
        match visit.node.as_mesh() {
            Some(mesh) => println!(
                "{}{} ({} vertices, {} triangles, material {})",
                indent,
                name,
                mesh.vertex_count(),
                mesh.triangle_count(),
                mesh.material().unwrap_or("none")
            ),
            None => println!("{}{}/", indent, name),
        }
    }

    for material in scene.materials() {
        let kind = if material.is_image() { "image" } else { "colour" };
        println!("material {} ({})", material.name(), kind);
    }

    app.camera_mut()
        .look_at(Vec3::new(2.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y);
    let stats = app.render_frame()?;
    println!("{:?}", app.scene().get_statistics());
    println!(
        "rendered {} draw(s), {} triangle(s)",
        stats.draw_calls, stats.triangles
    );
    Ok(())
}
