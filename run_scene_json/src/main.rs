use std::{env, error::Error, fs::File, io};

use laser::{Canvas, TraceParams};
use laser_json::{deserialize_scene, serde_json, serialize_trace};

fn export_png(canvas: &Canvas, path: &str) -> Result<(), Box<dyn Error>> {
    let frame = laser_raster::render_frame(canvas);
    frame.save_with_format(path, image::ImageFormat::Png)?;

    let (width, height) = frame.dimensions();
    tracing::info!("exported a {width}x{height} frame to {path}");
    Ok(())
}

fn run_scene(
    json: &serde_json::Value,
    png_path: Option<&str>,
    max_bounces: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let scene = deserialize_scene(json)?;
    tracing::info!(
        "loaded {} lights, {} mirrors and {} flags",
        scene.lights().len(),
        scene.mirrors().len(),
        scene.flags().len(),
    );

    let mut canvas = Canvas::from_scene(scene);
    if let Some(max_bounces) = max_bounces {
        canvas.set_trace_params(TraceParams { max_bounces });
    }

    let traces = canvas.trace_all();
    serde_json::to_writer_pretty(io::stdout().lock(), &serialize_trace(&traces))?;
    println!();

    if let Some(path) = png_path {
        export_png(&canvas, path)?;
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);

    let file_path = args
        .next()
        .ok_or("expected a file path as a first argument.")?;

    // an empty second argument skips the export but still allows a bounce count
    let png_path = args.next().filter(|path| !path.is_empty());

    let max_bounces = args
        .next()
        .map(|arg| {
            arg.parse()
                .map_err(|_| format!("expected a number as third argument, got {arg:?}"))
        })
        .transpose()?;

    run_scene(
        &serde_json::from_reader(File::open(file_path)?)?,
        png_path.as_deref(),
        max_bounces,
    )
}
