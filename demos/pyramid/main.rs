//! Spins a lit pyramid in front of the camera for a few frames against the
//! recording backend and logs what each frame sent to the device.
//!
//! Run with `RUST_LOG=debug cargo run --example pyramid` for per-upload detail.

use anyhow::Result;
use tartan::gfx::rendering::BackendCall;
use tartan::prelude::*;

const FRAMES: usize = 8;

fn main() -> Result<()> {
    init_logging(None);

    let fetcher = FsFetcher::new(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/assets"));
    let mut app = App::new(RecordingBackend::new(), RendererConfig::default());
    pollster::block_on(app.load_program(
        &fetcher,
        "shaders/phong.vert",
        "shaders/phong.frag",
        &ProgramConfig::default().with_label("phong"),
    ))?;
    app.resize(1200, 800);

    let root = app.scene().root();
    let pyramid = app
        .scene_mut()
        .add_mesh(root, Object3D::named("pyramid"), generate_pyramid().into_mesh());
    app.scene_mut()
        .add_light(Light::point(Vec3::new(2.0, 4.0, 3.0), LightColor::default()));
    app.camera_mut()
        .look_at(Vec3::new(0.0, 1.5, 4.0), Vec3::new(0.0, 0.5, 0.0), Vec3::Y);

    for frame in 0..FRAMES {
        if let Some(object) = app.scene_mut().object_mut(pyramid) {
            object.rotate(360.0 / FRAMES as f32, Vec3::Y);
        }
        // Drift sideways so the camera uniforms change too.
        app.camera_mut().move_right(0.1);

        let stats = app.render_frame()?;
        let calls = app.engine_mut().backend_mut().take_calls();
        let uniform_writes = calls
            .iter()
            .filter(|call| matches!(call, BackendCall::SetUniform(..)))
            .count();
        log::info!(
            "frame {}: {} draw(s), {} upload(s), {} triangle(s), {} uniform write(s)",
            frame,
            stats.draw_calls,
            stats.meshes_uploaded,
            stats.triangles,
            uniform_writes
        );
    }

    Ok(())
}
