//! meshtint - click a mesh to paint it with the selected color.
//!
//! Usage: `meshtint [scene.json]`. Without a path the built-in two-jaw scene
//! is shown. Keys `1`-`9` pick a color, `O` opens a scene, `R` reloads it.

use std::path::PathBuf;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let scene_path = std::env::args_os().nth(1).map(PathBuf::from);
    if let Err(err) = meshtint::app::run(scene_path) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
