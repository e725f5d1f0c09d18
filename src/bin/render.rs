//! lumina-render: render one frame of a scene to a PNG without a window
//!
//! Usage:
//!   lumina-render --out moon.png
//!   lumina-render --scene scene.ron --width 400 --height 450 --rotate 0.3,0.5,0 --scale 1.2 --wireframe

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use lumina3d::export::save_png;
use lumina3d::logging::{init_logging, LoggingConfig};
use lumina3d::rasterizer::{Rasterizer, Transform, Vec3};
use lumina3d::scene::{load_scene_config, Controls, RenderMode, SceneConfig, SceneRenderer};
use std::path::PathBuf;

struct Args {
    scene: Option<PathBuf>,
    out: PathBuf,
    width: Option<usize>,
    height: Option<usize>,
    rotation: Vec3,
    scale: f32,
    wireframe: bool,
    light_marker: bool,
}

fn print_help() {
    println!("lumina-render v{}", lumina3d::VERSION);
    println!();
    println!("Options:");
    println!("  --scene <file.ron>   scene config (default: built-in moon)");
    println!("  --out <file.png>     output path (default: render.png)");
    println!("  --width <px>         override viewport width");
    println!("  --height <px>        override viewport height");
    println!("  --rotate <x,y,z>     model rotation in radians");
    println!("  --scale <s>          uniform model scale");
    println!("  --wireframe          draw triangle outlines");
    println!("  --light-marker       draw the light position");
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next().with_context(|| format!("missing value for {}", flag))
}

fn parse_rotation(s: &str) -> Result<Vec3> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid --rotate value '{}'", s))?;
    if parts.len() != 3 {
        bail!("--rotate takes three comma-separated angles (e.g. '0.3,0.5,0')");
    }
    Ok(Vec3::new(parts[0], parts[1], parts[2]))
}

fn parse_args() -> Result<Option<Args>> {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args {
        scene: None,
        out: PathBuf::from("render.png"),
        width: None,
        height: None,
        rotation: Vec3::ZERO,
        scale: 1.0,
        wireframe: false,
        light_marker: false,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--scene" => parsed.scene = Some(PathBuf::from(next_value(&mut args, "--scene")?)),
            "--out" => parsed.out = PathBuf::from(next_value(&mut args, "--out")?),
            "--width" => {
                let v = next_value(&mut args, "--width")?;
                parsed.width = Some(v.parse().with_context(|| format!("invalid width '{}'", v))?);
            }
            "--height" => {
                let v = next_value(&mut args, "--height")?;
                parsed.height = Some(v.parse().with_context(|| format!("invalid height '{}'", v))?);
            }
            "--rotate" => parsed.rotation = parse_rotation(&next_value(&mut args, "--rotate")?)?,
            "--scale" => {
                let v = next_value(&mut args, "--scale")?;
                parsed.scale = v.parse().with_context(|| format!("invalid scale '{}'", v))?;
            }
            "--wireframe" => parsed.wireframe = true,
            "--light-marker" => parsed.light_marker = true,
            "--help" | "-h" => {
                print_help();
                return Ok(None);
            }
            other => {
                print_help();
                bail!("unknown argument: {}", other);
            }
        }
    }

    Ok(Some(parsed))
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let Some(args) = parse_args()? else {
        return Ok(());
    };

    let mut config = match &args.scene {
        Some(path) => load_scene_config(path)
            .with_context(|| format!("failed to load scene {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if let Some(w) = args.width {
        config.viewport.width = w;
    }
    if let Some(h) = args.height {
        config.viewport.height = h;
    }
    if config.viewport.texture_size().is_none() {
        bail!(
            "viewport {}x{} must be 1..=65535 on each side",
            config.viewport.width,
            config.viewport.height
        );
    }

    let mut controls = Controls::from_config(&config);
    controls.rotation = args.rotation;
    controls.scale = args.scale;
    if args.wireframe {
        controls.mode = RenderMode::Wireframe;
    }
    if args.light_marker {
        controls.show_light_marker = true;
    }

    let renderer = SceneRenderer::new(config);
    let vp = renderer.config().viewport;
    let mut rasterizer = Rasterizer::new(vp.width, vp.height);
    let mut transform = Transform::new();
    renderer.setup_camera(&mut transform);

    let pb = ProgressBar::new(renderer.band_count(&controls) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} bands {msg}")
            .context("invalid progress template")?
            .progress_chars("##-"),
    );

    renderer.render_with_progress(&mut rasterizer, &mut transform, &controls, || pb.inc(1));
    pb.finish_with_message("done");

    save_png(&rasterizer, &args.out).with_context(|| format!("failed to write {}", args.out.display()))?;
    println!("Saved {}x{} render to {}", vp.width, vp.height, args.out.display());

    Ok(())
}
