//! Lumina3D interactive viewer
//!
//! Renders the scene on the CPU and shows the framebuffer as a texture:
//! - Arrow keys rotate, +/- scale, R resets
//! - W toggles wireframe, L toggles the light marker
//! - Optional `--scene <file.ron>` picks the scene config

use macroquad::prelude::*;
use lumina3d::export::rgb_to_rgba;
use lumina3d::logging::{init_logging, LoggingConfig};
use lumina3d::rasterizer::{Rasterizer, Transform};
use lumina3d::scene::{
    load_scene_config, ControlAction, Controls, RenderMode, SceneConfig, SceneRenderer, ViewportConfig,
};
use lumina3d::VERSION;
use std::path::PathBuf;

const PANEL_WIDTH: f32 = 320.0;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Lumina3D v{}", VERSION),
        window_width: 1120,
        window_height: 900,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// `--scene <path>` from the command line, if given
fn scene_arg() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--scene" => return args.next().map(PathBuf::from),
            other => log::warn!("ignoring unknown argument: {}", other),
        }
    }
    None
}

fn load_config() -> SceneConfig {
    let Some(path) = scene_arg() else {
        return SceneConfig::default();
    };
    let mut config = match load_scene_config(&path) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{}, using the default scene", e);
            return SceneConfig::default();
        }
    };
    if config.viewport.texture_size().is_none() {
        log::warn!(
            "viewport {}x{} must be 1..=65535 on each side, using {:?}",
            config.viewport.width,
            config.viewport.height,
            ViewportConfig::default()
        );
        config.viewport = ViewportConfig::default();
    }
    config
}

/// Key presses this frame, in a fixed order
fn pressed_actions() -> Vec<ControlAction> {
    let bindings: [(&[KeyCode], ControlAction); 9] = [
        (&[KeyCode::Up], ControlAction::RotateUp),
        (&[KeyCode::Down], ControlAction::RotateDown),
        (&[KeyCode::Left], ControlAction::RotateLeft),
        (&[KeyCode::Right], ControlAction::RotateRight),
        (&[KeyCode::Equal, KeyCode::KpAdd], ControlAction::ScaleUp),
        (&[KeyCode::Minus, KeyCode::KpSubtract], ControlAction::ScaleDown),
        (&[KeyCode::R], ControlAction::Reset),
        (&[KeyCode::W], ControlAction::ToggleWireframe),
        (&[KeyCode::L], ControlAction::ToggleLightMarker),
    ];

    bindings
        .iter()
        .filter(|(keys, _)| keys.iter().any(|k| is_key_pressed(*k)))
        .map(|(_, action)| *action)
        .collect()
}

fn draw_panel(controls: &Controls, triangles: usize, render_ms: f64) {
    let text_color = Color::from_rgba(220, 220, 220, 255);
    let dim = Color::from_rgba(140, 140, 150, 255);
    let mut y = 40.0;
    let mut line = |text: &str, color: Color| {
        draw_text(text, 20.0, y, 22.0, color);
        y += 28.0;
    };

    line(&format!("Lumina3D v{}", VERSION), text_color);
    line("", dim);
    line("Arrows   rotate", dim);
    line("+ / -    scale", dim);
    line("R        reset", dim);
    line("W        wireframe", dim);
    line("L        light marker", dim);
    line("Esc      quit", dim);
    line("", dim);

    let r = controls.rotation;
    line(&format!("rotation  {:.1} {:.1} {:.1}", r.x, r.y, r.z), text_color);
    line(&format!("scale     {:.2}", controls.scale), text_color);
    let mode = match controls.mode {
        RenderMode::Shaded => "shaded",
        RenderMode::Wireframe => "wireframe",
    };
    line(&format!("mode      {}", mode), text_color);
    line(&format!("triangles {}", triangles), text_color);
    line(&format!("frame     {:.0} ms", render_ms), text_color);
}

#[macroquad::main(window_conf)]
async fn main() {
    init_logging(LoggingConfig::default());
    log::info!("=== Lumina3D v{} ===", VERSION);

    let config = load_config();
    let mut controls = Controls::from_config(&config);
    let renderer = SceneRenderer::new(config);

    let vp = renderer.config().viewport;
    let Some((tex_w, tex_h)) = vp.texture_size() else {
        log::error!("viewport {}x{} cannot be shown as a texture", vp.width, vp.height);
        return;
    };
    let mut rasterizer = Rasterizer::new(vp.width, vp.height);
    let mut transform = Transform::new();
    renderer.setup_camera(&mut transform);

    let triangles = renderer.subject_mesh().triangles.len();
    let mut dirty = true;
    let mut render_ms = 0.0;
    let mut texture: Option<Texture2D> = None;

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        for action in pressed_actions() {
            controls.apply(action);
            dirty = true;
        }

        // The scene only changes on input, so skip re-rasterizing idle frames
        if dirty {
            let start = get_time();
            renderer.render(&mut rasterizer, &mut transform, &controls);
            render_ms = (get_time() - start) * 1000.0;

            let rgba = rgb_to_rgba(rasterizer.frame_buffer());
            let tex = Texture2D::from_rgba8(tex_w, tex_h, &rgba);
            tex.set_filter(FilterMode::Nearest);
            texture = Some(tex);
            dirty = false;
        }

        clear_background(Color::from_rgba(30, 30, 35, 255));

        if let Some(tex) = &texture {
            // Fit the framebuffer into the area right of the panel, keeping aspect
            let area_w = (screen_width() - PANEL_WIDTH).max(1.0);
            let area_h = screen_height();
            let scale = (area_w / vp.width as f32).min(area_h / vp.height as f32);
            let (draw_w, draw_h) = (vp.width as f32 * scale, vp.height as f32 * scale);

            draw_texture_ex(
                tex,
                PANEL_WIDTH + (area_w - draw_w) * 0.5,
                (area_h - draw_h) * 0.5,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(Vec2::new(draw_w, draw_h)),
                    ..Default::default()
                },
            );
        }

        draw_panel(&controls, triangles, render_ms);

        next_frame().await;
    }
}
