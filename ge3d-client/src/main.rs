use std::path::PathBuf;

use ge3d_client::{
    error::Result,
    game::Game,
    logging,
    scene::{InstancingGameObjects, Plane},
};
use ge3d_core::config::EngineConfig;
use glam::Vec3;

/// Config file from the first argument, else the user config directory if it has one.
fn config_path() -> Option<PathBuf> {
    std::env::args().nth(1).map(PathBuf::from).or_else(|| {
        dirs::config_dir()
            .map(|dir| dir.join("ge3d").join("config.json"))
            .filter(|path| path.exists())
    })
}

fn run() -> Result<()> {
    let config = match config_path() {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    logging::init(&config.log)?;

    let mut game = Game::new(config)?;
    game.camera_mut()
        .model_mut()
        .set_position(Vec3::new(-15.0, 0.0, 4.0));

    let floor_texture = game.config().paths.resolve_texture("floor.jpg");
    let mut floor = Plane::new(
        game.resources(),
        floor_texture.exists().then_some(floor_texture.as_path()),
    )?;
    floor.set_texture_repeat(game.resources(), 20.0)?;
    floor.object.model.set_scale(Vec3::new(100.0, 100.0, 1.0));
    game.spawn(floor);

    let cube = game.config().paths.resolve_model("cube.obj");
    if cube.exists() {
        let mut cubes = InstancingGameObjects::new(game.resources(), &cube, 100)?;
        cubes.update_all(|i, model| {
            let angle = i as f32 / 100.0 * std::f32::consts::TAU;
            model
                .set_position(Vec3::new(angle.cos() * 10.0, angle.sin() * 10.0, 1.0))
                .rotate(angle, Vec3::Z);
        });
        game.spawn(cubes);
    } else {
        log::warn!("{} not found, skipping instanced cubes", cube.display());
    }

    let skybox = game.config().paths.resolve_skybox("default");
    if skybox.is_dir() {
        game.load_skybox("default")?;
    }

    game.run();
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}
