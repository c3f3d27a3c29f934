use macroquad::prelude::*;
use macroquad_tiled_platformer::{load_assets, register_textures, Intents, MacroquadRasterizer, Simulation};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const LEVEL: &str = "resources/level-village.json";
const ATLAS: &str = "resources/elf.json";

fn window_conf() -> Conf {
    Conf {
        window_title: "Village".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Same bindings as the browser build: WASD, space, E, Q/1 and left click.
fn read_intents() -> Intents {
    Intents {
        left: is_key_down(KeyCode::A),
        right: is_key_down(KeyCode::D),
        up: is_key_down(KeyCode::W),
        down: is_key_down(KeyCode::S),
        jump: is_key_down(KeyCode::Space),
        roll: false,
        attack1: is_key_down(KeyCode::E),
        attack2: is_mouse_button_down(MouseButton::Left),
        attack3: is_key_down(KeyCode::Q) || is_key_down(KeyCode::Key1),
    }
}

fn now_ms() -> f64 {
    get_time() * 1000.0
}

async fn start() -> anyhow::Result<(Simulation, MacroquadRasterizer)> {
    // usage: village [level.json] [sheet.json] [config.json]
    let args: Vec<String> = std::env::args().skip(1).collect();
    let level = args.first().map_or(LEVEL, String::as_str);
    let atlas = args.get(1).map_or(ATLAS, String::as_str);
    let config = args.get(2).map(String::as_str);

    let assets = load_assets(level, atlas, config).await?;
    let mut rasterizer = MacroquadRasterizer::new();
    let textures = register_textures(&mut rasterizer, &assets.images);
    let sim = Simulation::from_level(&assets.config, assets.level, assets.atlas, &textures, now_ms())?;
    Ok((sim, rasterizer))
}

#[macroquad::main(window_conf)]
async fn main() {
    init_tracing();

    let (mut sim, mut rasterizer) = match start().await {
        Ok(session) => session,
        Err(err) => {
            error!(error = %format!("{err:#}"), "startup_failed");
            std::process::exit(1);
        }
    };
    info!(
        width = sim.grid().width,
        height = sim.grid().height,
        "village_started"
    );

    let mut issues = 0;
    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        sim.tick(&read_intents(), now_ms());
        issues += sim.take_issues().len();

        clear_background(BLACK);
        set_camera(&Camera2D {
            target: sim.player().pos,
            zoom: vec2(2.0 / screen_width(), 2.0 / screen_height()),
            ..Default::default()
        });
        sim.present(&mut rasterizer);

        set_default_camera();
        draw_text(&format!("FPS: {}", get_fps()), 20.0, 30.0, 30.0, RED);
        if issues > 0 {
            draw_text(&format!("asset issues: {issues} (see log)"), 20.0, 60.0, 24.0, YELLOW);
        }

        next_frame().await;
    }
}
