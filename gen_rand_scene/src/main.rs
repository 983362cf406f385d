use std::{env, error::Error, fs::File};

use laser::{rand, Bounds};
use laser_json::{serde_json, JsonSer};
use laser_random::random_scene;

fn parse_or<T: std::str::FromStr>(arg: Option<String>, default: T, name: &str) -> Result<T, Box<dyn Error>> {
    arg.map_or(Ok(default), |arg| {
        arg.parse()
            .map_err(|_| format!("{name} must be a number, got {arg:?}").into())
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = env::args().skip(1);

    let file_path = args
        .next()
        .ok_or("please provide a path to serialize the scene json data")?;

    let width = parse_or(args.next(), 800.0, "width")?;
    let height = parse_or(args.next(), 600.0, "height")?;
    let num_lights = parse_or(args.next(), 2, "light count")?;
    let num_mirrors = parse_or(args.next(), 8, "mirror count")?;
    let num_flags = parse_or(args.next(), 2, "flag count")?;

    if !(width > 0.0 && height > 0.0) {
        return Err("canvas dimensions must be positive".into());
    }

    let scene = random_scene(
        &mut rand::thread_rng(),
        Bounds::new(width, height),
        num_lights,
        num_mirrors,
        num_flags,
    );

    serde_json::to_writer_pretty(File::create(&file_path)?, &scene.to_json())?;

    tracing::info!(
        "wrote {num_lights} lights, {num_mirrors} mirrors and {num_flags} flags to {file_path}"
    );

    Ok(())
}
